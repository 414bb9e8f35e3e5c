//! Tool descriptor tests
//!
//! The tool list is the server's public contract with MCP clients:
//! names, required parameters, and schema shape must stay stable.

use gitops_mcp::tools::all_tools;
use serde_json::Value;

const EXPECTED_TOOLS: &[&str] = &[
    "list_contexts",
    "get_current_context",
    "get_gitops_status",
    "list_kustomizations",
    "get_kustomization",
    "list_gitrepositories",
    "get_helmreleases",
    "get_cluster_status",
    "list_machines",
    "get_app_deployments",
    "debug_reconciliation",
    "get_events",
    "get_pod_logs",
    "check_policy_violations",
    "list_constraints",
];

#[test]
fn test_every_expected_tool_is_advertised() {
    let tools = all_tools();
    for expected in EXPECTED_TOOLS {
        assert!(
            tools.iter().any(|t| t.name == *expected),
            "missing tool: {}",
            expected
        );
    }
    assert_eq!(tools.len(), EXPECTED_TOOLS.len());
}

#[test]
fn test_required_parameters() {
    let tools = all_tools();
    let required_of = |name: &str| -> Vec<&'static str> {
        tools
            .iter()
            .find(|t| t.name == name)
            .unwrap()
            .input_schema
            .required
            .clone()
    };

    assert_eq!(required_of("get_kustomization"), vec!["name", "namespace"]);
    assert_eq!(
        required_of("debug_reconciliation"),
        vec!["resource_type", "name", "namespace"]
    );
    assert_eq!(required_of("get_events"), vec!["namespace"]);
    assert_eq!(required_of("get_pod_logs"), vec!["pod_name", "namespace"]);
    assert!(required_of("get_gitops_status").is_empty());
    assert!(required_of("check_policy_violations").is_empty());
}

#[test]
fn test_schema_serialization_shape() {
    let tools = all_tools();
    let raw = serde_json::to_value(&tools).unwrap();
    let list = raw.as_array().unwrap();

    for tool in list {
        let schema = tool
            .get("inputSchema")
            .expect("tool must carry an inputSchema");
        assert_eq!(schema.get("type"), Some(&Value::String("object".into())));

        // Every declared property is a string parameter
        if let Some(props) = schema.get("properties").and_then(|p| p.as_object()) {
            for (key, prop) in props {
                assert_eq!(
                    prop.get("type"),
                    Some(&Value::String("string".into())),
                    "parameter {} must be a string",
                    key
                );
            }
        }
    }
}

#[test]
fn test_enum_parameters_carry_defaults() {
    let raw = serde_json::to_value(all_tools()).unwrap();
    let tools = raw.as_array().unwrap();

    let prop = |tool_name: &str, prop_name: &str| -> Value {
        tools
            .iter()
            .find(|t| t.get("name") == Some(&Value::String(tool_name.into())))
            .and_then(|t| t.get("inputSchema"))
            .and_then(|s| s.get("properties"))
            .and_then(|p| p.get(prop_name))
            .cloned()
            .unwrap()
    };

    let filter = prop("list_kustomizations", "status_filter");
    assert_eq!(filter.get("default"), Some(&Value::String("all".into())));
    let allowed = filter.get("enum").unwrap().as_array().unwrap();
    assert_eq!(allowed.len(), 4);

    let engine = prop("check_policy_violations", "policy_engine");
    assert_eq!(engine.get("default"), Some(&Value::String("both".into())));

    let limit = prop("get_events", "limit");
    assert_eq!(limit.get("default"), Some(&Value::String("20".into())));
    assert!(limit.get("enum").is_none());
}
