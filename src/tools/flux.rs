//! Flux/GitOps query tools
//!
//! Queries Kustomizations, GitRepositories, and HelmReleases through the
//! dynamic API and renders their reconciliation state.

use serde_json::Value;

use crate::report;
use crate::resources::{self, FluxKind, QueryError};
use crate::status::{self, DerivedStatus};
use crate::tools::error_text;

/// Aggregate counts for one resource family
#[derive(Debug, Default, Clone, Copy)]
struct StatusCounts {
    ready: usize,
    failed: usize,
    suspended: usize,
    total: usize,
}

fn count_statuses(items: &[Value]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for item in items {
        match status::evaluate_object(item) {
            DerivedStatus::Ready => counts.ready += 1,
            DerivedStatus::Suspended => counts.suspended += 1,
            _ => counts.failed += 1,
        }
        counts.total += 1;
    }
    counts
}

fn family_heading(kind: FluxKind) -> &'static str {
    match kind {
        FluxKind::Kustomization => "Kustomizations",
        FluxKind::GitRepository => "GitRepositories",
        FluxKind::HelmRelease => "HelmReleases",
    }
}

/// `spec.sourceRef` rendered as "Kind/name"
fn source_ref(obj: &Value) -> String {
    let source = obj.get("spec").and_then(|s| s.get("sourceRef"));
    format!(
        "{}/{}",
        source
            .and_then(|s| s.get("kind"))
            .and_then(|v| v.as_str())
            .unwrap_or(""),
        source
            .and_then(|s| s.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
    )
}

/// Overall GitOps health: Ready/Failed/Suspended counts for Kustomizations
/// and GitRepositories, with failed resources called out individually.
///
/// Each family degrades independently - a missing CRD produces an inline
/// note rather than aborting the summary.
pub async fn get_gitops_status(client: &kube::Client, namespace: Option<&str>) -> String {
    let mut out = String::from("# GitOps Status Summary\n\n");

    for kind in [FluxKind::Kustomization, FluxKind::GitRepository] {
        let heading = family_heading(kind);
        match resources::list(client, &kind.resource_ref(), namespace).await {
            Ok(items) => {
                let counts = count_statuses(&items);
                out.push_str(&format!("## Flux {}\n\n", heading));
                out.push_str(&format!("- ✅ Ready: {}\n", counts.ready));
                out.push_str(&format!("- ❌ Failed: {}\n", counts.failed));
                out.push_str(&format!("- ⏸️ Suspended: {}\n", counts.suspended));
                out.push_str(&format!("- 📊 Total: {}\n\n", counts.total));

                if counts.failed > 0 {
                    out.push_str(&format!("### Failed {}\n\n", heading));
                    for item in &items {
                        if status::evaluate_object(item) != DerivedStatus::Failed {
                            continue;
                        }
                        let message = item
                            .get("status")
                            .and_then(|s| status::condition_message(s, "Ready"))
                            .unwrap_or("");
                        out.push_str(&format!(
                            "- **{}/{}**: {}\n",
                            status::namespace(item),
                            status::name(item),
                            report::truncate(message, 100)
                        ));
                    }
                    out.push('\n');
                }
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", heading, e);
                out.push_str(&format!("⚠️ Error fetching {}: {}\n\n", heading, e));
            }
        }
    }

    out
}

/// List Kustomizations with derived status and source reference
pub async fn list_kustomizations(
    client: &kube::Client,
    namespace: Option<&str>,
    status_filter: &str,
) -> String {
    if !matches!(status_filter, "all" | "ready" | "failed" | "suspended") {
        return error_text(&QueryError::InvalidArgument(format!(
            "unknown status filter '{}', use: all, ready, failed, suspended",
            status_filter
        )));
    }

    let items = match resources::list(client, &FluxKind::Kustomization.resource_ref(), namespace)
        .await
    {
        Ok(items) => items,
        Err(e) => return error_text(&e),
    };

    let mut rows = Vec::new();
    for item in &items {
        let derived = status::evaluate_object(item);
        if !derived.matches_filter(status_filter) {
            continue;
        }
        rows.push(vec![
            status::name(item).to_string(),
            status::namespace(item).to_string(),
            derived.to_string(),
            source_ref(item),
        ]);
    }

    report::render_table(
        "Flux Kustomizations",
        "No Kustomizations found",
        &["Name", "Namespace", "Status", "Source"],
        &rows,
    )
}

/// Detailed view of a single Kustomization including its condition table
pub async fn get_kustomization(client: &kube::Client, name: &str, namespace: &str) -> String {
    let obj = match resources::get(
        client,
        &FluxKind::Kustomization.resource_ref(),
        name,
        namespace,
    )
    .await
    {
        Ok(obj) => obj,
        Err(e) => return error_text(&e),
    };

    let suspended = obj
        .get("spec")
        .map(status::is_suspended)
        .unwrap_or(false);
    let source = obj.get("spec").and_then(|s| s.get("sourceRef"));

    let mut out = format!("## Kustomization: {}\n\n", name);
    out.push_str(&format!("**Namespace:** {}\n", namespace));
    out.push_str(&format!(
        "**Path:** {}\n",
        status::spec_str(&obj, "path").unwrap_or("N/A")
    ));
    out.push_str(&format!(
        "**Interval:** {}\n",
        status::spec_str(&obj, "interval").unwrap_or("N/A")
    ));
    out.push_str(&format!("**Suspended:** {}\n\n", suspended));

    out.push_str("### Source\n");
    out.push_str(&format!(
        "- **Kind:** {}\n",
        source
            .and_then(|s| s.get("kind"))
            .and_then(|v| v.as_str())
            .unwrap_or("N/A")
    ));
    out.push_str(&format!(
        "- **Name:** {}\n\n",
        source
            .and_then(|s| s.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or("N/A")
    ));

    out.push_str("### Conditions\n\n");
    out.push_str(&report::header_line(&[
        "Type", "Status", "Reason", "Message",
    ]));
    let empty_status = Value::Null;
    let obj_status = obj.get("status").unwrap_or(&empty_status);
    for c in status::conditions(obj_status) {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            c.get("type").and_then(|v| v.as_str()).unwrap_or(""),
            c.get("status").and_then(|v| v.as_str()).unwrap_or(""),
            c.get("reason").and_then(|v| v.as_str()).unwrap_or(""),
            report::truncate(c.get("message").and_then(|v| v.as_str()).unwrap_or(""), 60)
        ));
    }

    out
}

/// List GitRepository sources with their sync status
///
/// Sources have no suspend-aware view here: they report Ready or Failed
/// straight from the Ready condition.
pub async fn list_gitrepositories(client: &kube::Client, namespace: Option<&str>) -> String {
    let items = match resources::list(client, &FluxKind::GitRepository.resource_ref(), namespace)
        .await
    {
        Ok(items) => items,
        Err(e) => return error_text(&e),
    };

    let empty_status = Value::Null;
    let mut rows = Vec::new();
    for item in &items {
        let obj_status = item.get("status").unwrap_or(&empty_status);
        let ready = status::has_ready_condition(obj_status);
        let branch = item
            .get("spec")
            .and_then(|s| s.get("ref"))
            .and_then(|r| r.get("branch"))
            .and_then(|b| b.as_str())
            .unwrap_or("N/A");
        rows.push(vec![
            status::name(item).to_string(),
            status::namespace(item).to_string(),
            if ready { "Ready" } else { "Failed" }.to_string(),
            branch.to_string(),
        ]);
    }

    report::render_table(
        "GitRepositories",
        "No GitRepositories found",
        &["Name", "Namespace", "Status", "Branch"],
        &rows,
    )
}

/// List HelmReleases with derived status and chart name
pub async fn get_helmreleases(
    client: &kube::Client,
    namespace: Option<&str>,
    status_filter: &str,
) -> String {
    if !matches!(status_filter, "all" | "ready" | "failed" | "suspended") {
        return error_text(&QueryError::InvalidArgument(format!(
            "unknown status filter '{}', use: all, ready, failed, suspended",
            status_filter
        )));
    }

    let items =
        match resources::list(client, &FluxKind::HelmRelease.resource_ref(), namespace).await {
            Ok(items) => items,
            Err(e) => return error_text(&e),
        };

    let mut rows = Vec::new();
    for item in &items {
        let derived = status::evaluate_object(item);
        if !derived.matches_filter(status_filter) {
            continue;
        }
        let chart = item
            .get("spec")
            .and_then(|s| s.get("chart"))
            .and_then(|c| c.get("spec"))
            .and_then(|s| s.get("chart"))
            .and_then(|c| c.as_str())
            .unwrap_or("N/A");
        rows.push(vec![
            status::name(item).to_string(),
            status::namespace(item).to_string(),
            derived.to_string(),
            chart.to_string(),
        ]);
    }

    report::render_table(
        "HelmReleases",
        "No HelmReleases found",
        &["Name", "Namespace", "Status", "Chart"],
        &rows,
    )
}

/// Remediation hints keyed on substrings of a Ready=False reason.
///
/// Every matching substring contributes its own hint line.
pub(crate) fn recommendation_hints(reason: &str) -> Vec<&'static str> {
    let mut hints = Vec::new();
    if reason.contains("Source") {
        hints.push("Check if the source (GitRepository/HelmRepository) exists and is ready");
    }
    if reason.contains("Validation") {
        hints.push("Check the manifest syntax and Kubernetes API compatibility");
    }
    if reason.contains("Health") {
        hints.push("Check if deployed resources are healthy (pods running, etc.)");
    }
    hints
}

/// Debug view for a failing reconciliation: full condition table plus
/// remediation recommendations derived from failure reasons.
pub async fn debug_reconciliation(
    client: &kube::Client,
    resource_type: &str,
    name: &str,
    namespace: &str,
) -> String {
    let Some(kind) = FluxKind::from_str_case_insensitive(resource_type) else {
        return error_text(&QueryError::InvalidArgument(format!(
            "unknown resource type '{}', use: kustomization, gitrepository, helmrelease",
            resource_type
        )));
    };

    let obj = match resources::get(client, &kind.resource_ref(), name, namespace).await {
        Ok(obj) => obj,
        Err(e) => return error_text(&e),
    };

    let empty_status = Value::Null;
    let obj_status = obj.get("status").unwrap_or(&empty_status);
    let conditions = status::conditions(obj_status);

    let mut out = format!("## Debug: {}/{}\n\n", kind, name);
    out.push_str(&format!("**Namespace:** {}\n\n", namespace));

    out.push_str("### Conditions\n\n");
    out.push_str(&report::header_line(&[
        "Type",
        "Status",
        "Reason",
        "Last Transition",
        "Message",
    ]));
    for c in &conditions {
        let transition = c
            .get("lastTransitionTime")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            c.get("type").and_then(|v| v.as_str()).unwrap_or(""),
            c.get("status").and_then(|v| v.as_str()).unwrap_or(""),
            c.get("reason").and_then(|v| v.as_str()).unwrap_or(""),
            report::clip(transition, 19),
            report::truncate(c.get("message").and_then(|v| v.as_str()).unwrap_or(""), 50)
        ));
    }

    out.push_str("\n### Recommendations\n\n");
    for c in &conditions {
        let is_failed_ready = c.get("type").and_then(|v| v.as_str()) == Some("Ready")
            && c.get("status").and_then(|v| v.as_str()) == Some("False");
        if !is_failed_ready {
            continue;
        }
        let reason = c.get("reason").and_then(|v| v.as_str()).unwrap_or("");
        for hint in recommendation_hints(reason) {
            out.push_str(&format!("- {}\n", hint));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_statuses() {
        let items = vec![
            json!({"status": {"conditions": [{"type": "Ready", "status": "True"}]}}),
            json!({"spec": {"suspend": true}}),
            json!({"status": {"conditions": [{"type": "Ready", "status": "False"}]}}),
            json!({}),
        ];
        let counts = count_statuses(&items);
        assert_eq!(counts.ready, 1);
        assert_eq!(counts.suspended, 1);
        assert_eq!(counts.failed, 2);
        assert_eq!(counts.total, 4);
    }

    #[test]
    fn test_source_ref() {
        let obj = json!({
            "spec": {"sourceRef": {"kind": "GitRepository", "name": "flux-system"}}
        });
        assert_eq!(source_ref(&obj), "GitRepository/flux-system");
        assert_eq!(source_ref(&json!({})), "/");
    }

    #[test]
    fn test_validation_failure_gets_exactly_one_hint() {
        let hints = recommendation_hints("ValidationFailed");
        assert_eq!(
            hints,
            vec!["Check the manifest syntax and Kubernetes API compatibility"]
        );
    }

    #[test]
    fn test_multiple_substrings_each_append_a_hint() {
        let hints = recommendation_hints("SourceValidationError");
        assert_eq!(hints.len(), 2);
        assert!(hints[0].contains("source"));
        assert!(hints[1].contains("manifest syntax"));
    }

    #[test]
    fn test_unrelated_reason_has_no_hints() {
        assert!(recommendation_hints("ReconciliationSucceeded").is_empty());
    }
}
