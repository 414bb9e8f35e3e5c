//! Kubeconfig context tools
//!
//! These read the local kubeconfig only and never touch the cluster.

use crate::report;

/// List all contexts from the merged kubeconfig, marking the active one
pub fn list_contexts() -> String {
    let kubeconfig = match crate::kube::load_kubeconfig() {
        Ok(kc) => kc,
        Err(e) => return format!("Error loading kubeconfig: {}", e),
    };

    let current = kubeconfig.current_context.clone().unwrap_or_default();
    let mut rows = Vec::new();
    for ctx in &kubeconfig.contexts {
        let (cluster, user) = ctx
            .context
            .as_ref()
            .map(|c| (c.cluster.clone(), c.user.clone().unwrap_or_default()))
            .unwrap_or_default();
        let marker = if ctx.name == current { "→" } else { "" };
        rows.push(vec![marker.to_string(), ctx.name.clone(), cluster, user]);
    }

    report::render_table(
        "Kubernetes Contexts",
        "No contexts found in kubeconfig",
        &["Current", "Name", "Cluster", "User"],
        &rows,
    )
}

/// Show the currently active context
pub fn get_current_context() -> String {
    let kubeconfig = match crate::kube::load_kubeconfig() {
        Ok(kc) => kc,
        Err(e) => return format!("Error: {}", e),
    };

    let Some(current) = kubeconfig.current_context.clone() else {
        return "Error: no current context set in kubeconfig".to_string();
    };

    let context = kubeconfig
        .contexts
        .iter()
        .find(|c| c.name == current)
        .and_then(|c| c.context.as_ref());

    format!(
        "## Current Context\n\n**Name:** {}\n**Cluster:** {}\n**User:** {}\n**Namespace:** {}\n",
        current,
        context.map(|c| c.cluster.as_str()).unwrap_or("N/A"),
        context
            .and_then(|c| c.user.as_deref())
            .unwrap_or("N/A"),
        context
            .and_then(|c| c.namespace.as_deref())
            .unwrap_or("default"),
    )
}
