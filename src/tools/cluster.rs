//! Cluster API (CAPI) query tools

use kube::api::ListParams;

use crate::report::{self, phase_icon};
use crate::resources::{self, CLUSTER_NAME_LABEL};
use crate::status;
use crate::tools::error_text;

/// Status of CAPI clusters: lifecycle phase plus infrastructure and
/// control plane readiness.
pub async fn get_cluster_status(
    client: &kube::Client,
    cluster_name: Option<&str>,
    namespace: Option<&str>,
) -> String {
    let items = match resources::list(client, &resources::capi_cluster(), namespace).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("CAPI cluster query failed: {}", e);
            return format!("Error: CAPI not installed or no access: {}", e);
        }
    };

    let mut rows = Vec::new();
    for cluster in &items {
        if let Some(filter) = cluster_name {
            if status::name(cluster) != filter {
                continue;
            }
        }
        let phase = status::status_str(cluster, "phase").unwrap_or("Unknown");
        let infra_ready = status::status_bool(cluster, "infrastructureReady");
        let cp_ready = status::status_bool(cluster, "controlPlaneReady");

        rows.push(vec![
            phase_icon(phase).to_string(),
            status::name(cluster).to_string(),
            status::namespace(cluster).to_string(),
            phase.to_string(),
            infra_ready.to_string(),
            cp_ready.to_string(),
        ]);
    }

    report::render_table(
        "CAPI Clusters",
        "No CAPI clusters found",
        &["", "Name", "Namespace", "Phase", "Infra Ready", "CP Ready"],
        &rows,
    )
}

/// List CAPI Machines, optionally narrowed to one cluster.
///
/// The cluster filter is pushed down as a label selector on the
/// cluster-name label CAPI stamps onto every Machine.
pub async fn list_machines(
    client: &kube::Client,
    cluster_name: Option<&str>,
    namespace: Option<&str>,
) -> String {
    let params = match cluster_name {
        Some(cluster) => {
            ListParams::default().labels(&format!("{}={}", CLUSTER_NAME_LABEL, cluster))
        }
        None => ListParams::default(),
    };

    let items =
        match resources::list_with(client, &resources::capi_machine(), namespace, &params).await {
            Ok(items) => items,
            Err(e) => return error_text(&e),
        };

    let mut rows = Vec::new();
    for machine in &items {
        let owning_cluster = status::label(machine, CLUSTER_NAME_LABEL).unwrap_or("");
        let phase = status::status_str(machine, "phase").unwrap_or("Unknown");
        let node_ref = machine
            .get("status")
            .and_then(|s| s.get("nodeRef"))
            .and_then(|n| n.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("N/A");

        rows.push(vec![
            status::name(machine).to_string(),
            status::namespace(machine).to_string(),
            owning_cluster.to_string(),
            phase.to_string(),
            node_ref.to_string(),
        ]);
    }

    report::render_table(
        "CAPI Machines",
        "No CAPI machines found",
        &["Name", "Namespace", "Cluster", "Phase", "Node"],
        &rows,
    )
}
