//! Tool registry
//!
//! Declares every tool exposed over MCP (name, description, parameter
//! schema) and dispatches invocations to the query functions. Query
//! functions return report text for every outcome including cluster
//! failures; only malformed invocations (missing required argument,
//! invalid name syntax) surface as dispatch errors.

pub mod apps;
pub mod cluster;
pub mod context;
pub mod debug;
pub mod flux;
pub mod policy;

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::resources::QueryError;

/// Descriptor advertised for one tool via tools/list
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

/// JSON Schema for a tool's input object
#[derive(Debug, Clone, Serialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    pub properties: BTreeMap<&'static str, Property>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<&'static str>,
}

/// JSON Schema property - every tool parameter is an optional string
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub prop_type: &'static str,
    pub description: &'static str,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<&'static str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub default: &'static str,
}

impl Property {
    fn string(description: &'static str) -> Self {
        Self {
            prop_type: "string",
            description,
            allowed: Vec::new(),
            default: "",
        }
    }

    fn with_enum(mut self, allowed: &[&'static str], default: &'static str) -> Self {
        self.allowed = allowed.to_vec();
        self.default = default;
        self
    }
}

fn schema(props: &[(&'static str, Property)], required: &[&'static str]) -> InputSchema {
    InputSchema {
        schema_type: "object",
        properties: props.iter().cloned().collect(),
        required: required.to_vec(),
    }
}

/// All tools this server advertises
pub fn all_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_contexts",
            description: "List all available Kubernetes contexts from the kubeconfig",
            input_schema: schema(&[], &[]),
        },
        ToolSpec {
            name: "get_current_context",
            description: "Get the current active Kubernetes context",
            input_schema: schema(&[], &[]),
        },
        ToolSpec {
            name: "get_gitops_status",
            description: "Get overall GitOps status including all Flux Kustomizations and GitRepositories. Returns summary of healthy/unhealthy/suspended resources.",
            input_schema: schema(
                &[(
                    "namespace",
                    Property::string("Namespace to filter (default: all namespaces)"),
                )],
                &[],
            ),
        },
        ToolSpec {
            name: "list_kustomizations",
            description: "List all Flux Kustomizations with their reconciliation status",
            input_schema: schema(
                &[
                    (
                        "namespace",
                        Property::string("Namespace to filter (default: all namespaces)"),
                    ),
                    (
                        "status_filter",
                        Property::string("Filter by status: all, ready, failed, suspended")
                            .with_enum(&["all", "ready", "failed", "suspended"], "all"),
                    ),
                ],
                &[],
            ),
        },
        ToolSpec {
            name: "get_kustomization",
            description: "Get detailed information about a specific Flux Kustomization including conditions and source",
            input_schema: schema(
                &[
                    ("name", Property::string("Name of the Kustomization")),
                    ("namespace", Property::string("Namespace of the Kustomization")),
                ],
                &["name", "namespace"],
            ),
        },
        ToolSpec {
            name: "list_gitrepositories",
            description: "List all Flux GitRepository sources with their sync status",
            input_schema: schema(
                &[(
                    "namespace",
                    Property::string("Namespace to filter (default: all namespaces)"),
                )],
                &[],
            ),
        },
        ToolSpec {
            name: "get_helmreleases",
            description: "List Flux HelmReleases with their status",
            input_schema: schema(
                &[
                    (
                        "namespace",
                        Property::string("Namespace to filter (default: all namespaces)"),
                    ),
                    (
                        "status_filter",
                        Property::string("Filter by status: all, ready, failed, suspended")
                            .with_enum(&["all", "ready", "failed", "suspended"], "all"),
                    ),
                ],
                &[],
            ),
        },
        ToolSpec {
            name: "get_cluster_status",
            description: "Get status of CAPI (Cluster API) clusters. Shows phase, conditions, and infrastructure status.",
            input_schema: schema(
                &[
                    (
                        "cluster_name",
                        Property::string("Name of the cluster. Leave empty for all clusters."),
                    ),
                    (
                        "namespace",
                        Property::string("Namespace to filter (default: all namespaces)"),
                    ),
                ],
                &[],
            ),
        },
        ToolSpec {
            name: "list_machines",
            description: "List CAPI Machines for a cluster showing node status and provider info",
            input_schema: schema(
                &[
                    (
                        "cluster_name",
                        Property::string("Name of the cluster to filter machines"),
                    ),
                    (
                        "namespace",
                        Property::string("Namespace to filter (default: all namespaces)"),
                    ),
                ],
                &[],
            ),
        },
        ToolSpec {
            name: "get_app_deployments",
            description: "Get application deployment status across workspaces. Shows App and ClusterApp resources from Kommander.",
            input_schema: schema(
                &[
                    (
                        "workspace",
                        Property::string("Workspace name. Leave empty for all workspaces."),
                    ),
                    (
                        "app_name",
                        Property::string("Application name to filter. Leave empty for all apps."),
                    ),
                ],
                &[],
            ),
        },
        ToolSpec {
            name: "debug_reconciliation",
            description: "Debug a failing Flux reconciliation. Shows conditions and remediation recommendations.",
            input_schema: schema(
                &[
                    (
                        "resource_type",
                        Property::string("Type of resource: kustomization, gitrepository, helmrelease")
                            .with_enum(&["kustomization", "gitrepository", "helmrelease"], ""),
                    ),
                    ("name", Property::string("Name of the resource")),
                    ("namespace", Property::string("Namespace of the resource")),
                ],
                &["resource_type", "name", "namespace"],
            ),
        },
        ToolSpec {
            name: "get_events",
            description: "Get Kubernetes events for debugging. Can filter by namespace, resource, or event type.",
            input_schema: schema(
                &[
                    (
                        "namespace",
                        Property::string("Namespace to get events from (required)"),
                    ),
                    (
                        "resource_name",
                        Property::string("Filter events for a specific resource name"),
                    ),
                    (
                        "event_type",
                        Property::string("Filter by event type: all, Normal, Warning")
                            .with_enum(&["all", "Normal", "Warning"], "all"),
                    ),
                    (
                        "limit",
                        Property::string("Maximum number of events to return (default: 20)")
                            .with_enum(&[], "20"),
                    ),
                ],
                &["namespace"],
            ),
        },
        ToolSpec {
            name: "get_pod_logs",
            description: "Get logs from a pod for debugging",
            input_schema: schema(
                &[
                    ("pod_name", Property::string("Name of the pod")),
                    ("namespace", Property::string("Namespace of the pod")),
                    (
                        "container",
                        Property::string(
                            "Container name (optional, uses first container if not specified)",
                        ),
                    ),
                    (
                        "tail_lines",
                        Property::string("Number of lines to return from end (default: 100)")
                            .with_enum(&[], "100"),
                    ),
                ],
                &["pod_name", "namespace"],
            ),
        },
        ToolSpec {
            name: "check_policy_violations",
            description: "Check for Gatekeeper or Kyverno policy violations across the cluster",
            input_schema: schema(
                &[
                    (
                        "namespace",
                        Property::string("Namespace to filter (default: all namespaces)"),
                    ),
                    (
                        "policy_engine",
                        Property::string("Policy engine to check: gatekeeper, kyverno, or both")
                            .with_enum(&["gatekeeper", "kyverno", "both"], "both"),
                    ),
                ],
                &[],
            ),
        },
        ToolSpec {
            name: "list_constraints",
            description: "List Gatekeeper constraints and their enforcement status",
            input_schema: schema(
                &[(
                    "constraint_kind",
                    Property::string("Filter by constraint kind (e.g., K8sRequiredLabels)"),
                )],
                &[],
            ),
        },
    ]
}

/// Dispatches tool invocations against a shared cluster client.
///
/// The client handle is cheaply clonable and safe for concurrent use, so
/// a single registry serves all invocations.
pub struct ToolRegistry {
    client: kube::Client,
}

impl ToolRegistry {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// All advertised tool descriptors
    pub fn tools(&self) -> Vec<ToolSpec> {
        all_tools()
    }

    /// Invoke a tool by name.
    ///
    /// Returns `None` for an unknown tool name. `Some(Err(_))` marks an
    /// invalid invocation; cluster-access failures never appear here -
    /// they come back as report text.
    pub async fn call(&self, name: &str, args: &Map<String, Value>) -> Option<Result<String>> {
        if !all_tools().iter().any(|t| t.name == name) {
            return None;
        }
        Some(self.dispatch(name, args).await)
    }

    async fn dispatch(&self, name: &str, args: &Map<String, Value>) -> Result<String> {
        validate_args(args)?;

        let client = &self.client;
        let namespace = opt_arg(args, "namespace");

        let text = match name {
            "list_contexts" => context::list_contexts(),
            "get_current_context" => context::get_current_context(),
            "get_gitops_status" => flux::get_gitops_status(client, namespace).await,
            "list_kustomizations" => {
                let filter = opt_arg(args, "status_filter").unwrap_or("all");
                flux::list_kustomizations(client, namespace, filter).await
            }
            "get_kustomization" => {
                let name = req_arg(args, "name")?;
                let ns = req_arg(args, "namespace")?;
                flux::get_kustomization(client, name, ns).await
            }
            "list_gitrepositories" => flux::list_gitrepositories(client, namespace).await,
            "get_helmreleases" => {
                let filter = opt_arg(args, "status_filter").unwrap_or("all");
                flux::get_helmreleases(client, namespace, filter).await
            }
            "get_cluster_status" => {
                let cluster = opt_arg(args, "cluster_name");
                cluster::get_cluster_status(client, cluster, namespace).await
            }
            "list_machines" => {
                let cluster = opt_arg(args, "cluster_name");
                cluster::list_machines(client, cluster, namespace).await
            }
            "get_app_deployments" => {
                let workspace = opt_arg(args, "workspace");
                let app_name = opt_arg(args, "app_name");
                apps::get_app_deployments(client, workspace, app_name).await
            }
            "debug_reconciliation" => {
                let resource_type = req_arg(args, "resource_type")?;
                let name = req_arg(args, "name")?;
                let ns = req_arg(args, "namespace")?;
                flux::debug_reconciliation(client, resource_type, name, ns).await
            }
            "get_events" => {
                let ns = req_arg(args, "namespace")?;
                let resource_name = opt_arg(args, "resource_name");
                let event_type = opt_arg(args, "event_type").unwrap_or("all");
                let limit = opt_arg(args, "limit").unwrap_or("20");
                debug::get_events(client, ns, resource_name, event_type, limit).await
            }
            "get_pod_logs" => {
                let pod_name = req_arg(args, "pod_name")?;
                let ns = req_arg(args, "namespace")?;
                let container = opt_arg(args, "container");
                let tail_lines = opt_arg(args, "tail_lines").unwrap_or("100");
                debug::get_pod_logs(client, pod_name, ns, container, tail_lines).await
            }
            "check_policy_violations" => {
                let engine = opt_arg(args, "policy_engine").unwrap_or("both");
                policy::check_policy_violations(client, namespace, engine).await
            }
            "list_constraints" => {
                let kind = opt_arg(args, "constraint_kind");
                policy::list_constraints(client, kind).await
            }
            _ => unreachable!("dispatch called with unregistered tool"),
        };

        Ok(text)
    }
}

/// Extract a non-empty string argument
fn opt_arg<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

/// Extract a required string argument
fn req_arg<'a>(args: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    opt_arg(args, key).ok_or_else(|| anyhow!("{} is required", key))
}

/// Validate the common name-like arguments before they reach the cluster
fn validate_args(args: &Map<String, Value>) -> Result<()> {
    for key in ["namespace", "workspace"] {
        if let Some(ns) = opt_arg(args, key) {
            validate_namespace(ns).map_err(|e| anyhow!("invalid {}: {}", key, e))?;
        }
    }
    for key in ["name", "pod_name", "resource_name", "cluster_name"] {
        if let Some(name) = opt_arg(args, key) {
            validate_resource_name(name).map_err(|e| anyhow!("invalid {}: {}", key, e))?;
        }
    }
    Ok(())
}

/// Validate a Kubernetes namespace name (RFC 1123 label)
pub fn validate_namespace(ns: &str) -> Result<(), String> {
    if ns.is_empty() {
        return Ok(()); // empty means "all namespaces"
    }
    if ns.len() > 253 {
        return Err("namespace too long (max 253 characters)".to_string());
    }
    let valid = ns
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && ns.starts_with(|c: char| c.is_ascii_alphanumeric())
        && ns.ends_with(|c: char| c.is_ascii_alphanumeric());
    if !valid {
        return Err("invalid namespace format (must match Kubernetes naming rules)".to_string());
    }
    Ok(())
}

/// Validate a Kubernetes resource name
pub fn validate_resource_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("resource name is required".to_string());
    }
    if name.len() > 253 {
        return Err("resource name too long (max 253 characters)".to_string());
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        && name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.ends_with(|c: char| c.is_ascii_alphanumeric());
    if !valid {
        return Err("invalid resource name format (must match Kubernetes naming rules)".to_string());
    }
    Ok(())
}

/// Strip control characters and cap length before echoing user input
/// into log lines.
pub fn sanitize_for_logging(input: &str) -> String {
    let mut out: String = input
        .chars()
        .map(|c| if c.is_control() { '?' } else { c })
        .collect();
    if out.chars().count() > 500 {
        out = out.chars().take(500).collect::<String>() + "...";
    }
    out
}

/// Convert a classified query failure into the user-visible error text,
/// logging the typed distinction internally.
pub(crate) fn error_text(err: &QueryError) -> String {
    tracing::warn!("Cluster query failed: {}", err);
    format!("Error: {}", err)
}
