//! Report renderer tests

use gitops_mcp::report::{header_line, render_table, truncate};

fn sample_rows() -> Vec<Vec<String>> {
    vec![
        vec![
            "flux-system".to_string(),
            "flux-system".to_string(),
            "Ready".to_string(),
        ],
        vec![
            "podinfo".to_string(),
            "apps".to_string(),
            "Failed".to_string(),
        ],
        vec![
            "legacy".to_string(),
            "apps".to_string(),
            "Suspended".to_string(),
        ],
    ]
}

#[test]
fn test_rendering_is_deterministic_and_order_preserving() {
    let rows = sample_rows();
    let headers = ["Name", "Namespace", "Status"];

    let first = render_table("Kustomizations", "none", &headers, &rows);
    let second = render_table("Kustomizations", "none", &headers, &rows);
    assert_eq!(first, second, "same input must render byte-identically");

    // Row order equals input order
    let positions: Vec<usize> = ["flux-system", "podinfo", "legacy"]
        .iter()
        .map(|name| first.find(name).unwrap())
        .collect();
    assert!(positions[0] < positions[1]);
    assert!(positions[1] < positions[2]);
}

#[test]
fn test_empty_input_renders_sentence_not_table() {
    let out = render_table(
        "Kustomizations",
        "No Kustomizations found",
        &["Name", "Namespace", "Status"],
        &[],
    );
    assert_eq!(out, "No Kustomizations found");
    assert!(!out.contains("Name"));
    assert!(!out.contains('|'));
}

#[test]
fn test_table_structure() {
    let out = render_table(
        "Machines",
        "empty",
        &["Name", "Phase"],
        &[vec!["m-1".to_string(), "Provisioned".to_string()]],
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "## Machines");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "| Name | Phase |");
    assert!(lines[3].starts_with("|-"));
    assert_eq!(lines[4], "| m-1 | Provisioned |");
}

#[test]
fn test_header_separator_matches_column_count() {
    let header = header_line(&["A", "B", "C"]);
    let separator = header.lines().nth(1).unwrap();
    assert_eq!(separator.matches('|').count(), 4); // 3 columns = 4 pipes
}

#[test]
fn test_truncation_marks_cut_messages() {
    let message = "artifact revision mismatch: expected sha256 to match the advertised checksum";
    let out = truncate(message, 50);
    assert!(out.ends_with("..."));
    assert_eq!(out.chars().count(), 53);

    // Short strings pass through untouched
    assert_eq!(truncate("ok", 50), "ok");
    // Exact-length strings get no marker
    let exact = "x".repeat(50);
    assert_eq!(truncate(&exact, 50), exact);
}
