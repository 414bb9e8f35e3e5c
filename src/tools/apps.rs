//! Kommander application query tools

use serde_json::Value;

use crate::report;
use crate::resources::{self, ResourceRef};
use crate::status;

/// Collect report rows for one application kind.
///
/// Readiness here is a two-state view: Ready when a Ready condition is
/// True, Not Ready otherwise (these kinds carry no suspend flag).
fn collect_apps(items: &[Value], kind: &str, app_name: Option<&str>, rows: &mut Vec<Vec<String>>) {
    let empty_status = Value::Null;
    for app in items {
        if let Some(filter) = app_name {
            if status::name(app) != filter {
                continue;
            }
        }
        let obj_status = app.get("status").unwrap_or(&empty_status);
        let ready = status::has_ready_condition(obj_status);
        rows.push(vec![
            kind.to_string(),
            status::name(app).to_string(),
            status::namespace(app).to_string(),
            if ready { "Ready" } else { "Not Ready" }.to_string(),
        ]);
    }
}

/// Application deployment status across workspaces.
///
/// Apps (namespaced) and ClusterApps (cluster-scoped) are queried
/// separately and each lookup degrades on its own: one family's API
/// being absent must not suppress results from the other.
pub async fn get_app_deployments(
    client: &kube::Client,
    workspace: Option<&str>,
    app_name: Option<&str>,
) -> String {
    let mut rows = Vec::new();

    let families: [(ResourceRef, &str, Option<&str>); 2] = [
        (resources::kommander_app(), "App", workspace),
        (resources::kommander_cluster_app(), "ClusterApp", None),
    ];

    for (resource, kind, namespace) in &families {
        match resources::list(client, resource, *namespace).await {
            Ok(items) => collect_apps(&items, kind, app_name, &mut rows),
            Err(e) => {
                // Kommander may not be installed at all; keep going so the
                // sibling kind can still report.
                tracing::debug!("Kommander {} query failed: {}", kind, e);
            }
        }
    }

    report::render_table(
        "Kommander Applications",
        "No Kommander Apps/ClusterApps found (Kommander may not be installed)",
        &["Type", "Name", "Namespace", "Status"],
        &rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_apps_ready_states() {
        let items = vec![
            json!({
                "metadata": {"name": "grafana", "namespace": "workspace-1"},
                "status": {"conditions": [{"type": "Ready", "status": "True"}]}
            }),
            json!({
                "metadata": {"name": "loki", "namespace": "workspace-1"},
                "status": {"conditions": [{"type": "Ready", "status": "False"}]}
            }),
        ];
        let mut rows = Vec::new();
        collect_apps(&items, "App", None, &mut rows);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["App", "grafana", "workspace-1", "Ready"]);
        assert_eq!(rows[1], vec!["App", "loki", "workspace-1", "Not Ready"]);
    }

    #[test]
    fn test_collect_apps_name_filter() {
        let items = vec![
            json!({"metadata": {"name": "grafana"}}),
            json!({"metadata": {"name": "loki"}}),
        ];
        let mut rows = Vec::new();
        collect_apps(&items, "ClusterApp", Some("loki"), &mut rows);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "loki");
    }
}
