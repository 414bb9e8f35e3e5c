//! Report rendering
//!
//! Converts query results into markdown text. Rendering is deterministic:
//! row order equals input order, and an empty row set yields the caller's
//! empty message instead of a header-only table.

/// Render a markdown table with a title line.
///
/// Returns `empty_message` alone when there are no rows.
pub fn render_table(
    title: &str,
    empty_message: &str,
    headers: &[&str],
    rows: &[Vec<String>],
) -> String {
    if rows.is_empty() {
        return empty_message.to_string();
    }

    let mut out = format!("## {}\n\n", title);
    out.push_str(&header_line(headers));
    for row in rows {
        out.push('|');
        for cell in row {
            out.push(' ');
            out.push_str(cell);
            out.push_str(" |");
        }
        out.push('\n');
    }
    out
}

/// Header row plus separator row for a markdown table
pub fn header_line(headers: &[&str]) -> String {
    let mut out = String::from("|");
    for h in headers {
        out.push(' ');
        out.push_str(h);
        out.push_str(" |");
    }
    out.push_str("\n|");
    for h in headers {
        out.push_str(&"-".repeat(h.chars().count().max(1) + 2));
        out.push('|');
    }
    out.push('\n');
    out
}

/// Truncate a display string to `max` characters, appending an ellipsis
/// marker when anything was cut. Character-based so multibyte condition
/// messages never split mid-codepoint.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{}...", cut)
}

/// Hard cut without an ellipsis marker (used for timestamps)
pub fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Icon for a CAPI lifecycle phase
pub fn phase_icon(phase: &str) -> &'static str {
    match phase {
        "Provisioned" => "✅",
        "Provisioning" => "⏳",
        _ => "❌",
    }
}

/// Icon for a Kubernetes event type
pub fn event_icon(event_type: &str) -> &'static str {
    if event_type == "Warning" { "⚠️" } else { "ℹ️" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_basic() {
        let rows = vec![
            vec!["podinfo".to_string(), "Ready".to_string()],
            vec!["cert-manager".to_string(), "Failed".to_string()],
        ];
        let out = render_table("Releases", "No releases found", &["Name", "Status"], &rows);
        assert!(out.starts_with("## Releases\n\n"));
        assert!(out.contains("| Name | Status |"));
        assert!(out.contains("| podinfo | Ready |"));
        assert!(out.contains("| cert-manager | Failed |"));
        // Row order preserved
        let podinfo = out.find("podinfo").unwrap();
        let cert = out.find("cert-manager").unwrap();
        assert!(podinfo < cert);
    }

    #[test]
    fn test_render_table_is_idempotent() {
        let rows = vec![vec!["a".to_string()], vec!["b".to_string()]];
        let first = render_table("T", "empty", &["Col"], &rows);
        let second = render_table("T", "empty", &["Col"], &rows);
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_table_empty_never_emits_header() {
        let out = render_table("Releases", "No releases found", &["Name", "Status"], &[]);
        assert_eq!(out, "No releases found");
        assert!(!out.contains('|'));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 50), "short");
        let long = "x".repeat(60);
        let out = truncate(&long, 50);
        assert_eq!(out.chars().count(), 53);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_truncate_multibyte() {
        let s = "héllo wörld".repeat(10);
        let out = truncate(&s, 10);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 13);
    }

    #[test]
    fn test_icons() {
        assert_eq!(phase_icon("Provisioned"), "✅");
        assert_eq!(phase_icon("Provisioning"), "⏳");
        assert_eq!(phase_icon("Deleting"), "❌");
        assert_eq!(event_icon("Warning"), "⚠️");
        assert_eq!(event_icon("Normal"), "ℹ️");
    }
}
