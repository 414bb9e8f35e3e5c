//! Gatekeeper and Kyverno policy query tools
//!
//! Both engines are optional installs. Gatekeeper constraint kinds are
//! discovered at runtime by enumerating constraint templates; Kyverno
//! violations come from wg-policy PolicyReport/ClusterPolicyReport
//! documents.

use serde_json::Value;

use crate::report::{self, header_line};
use crate::resources::{self, QueryError};
use crate::status;
use crate::tools::error_text;

/// One policy violation, normalized across engines
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Violation {
    pub engine: &'static str,
    pub policy: String,
    pub resource: String,
    pub message: String,
}

/// Derive a Gatekeeper constraint kind from its template name.
///
/// Template names are hyphen-delimited lowercase; the constraint kind
/// capitalizes the first letter of each segment and concatenates:
/// "k8s-required-labels" -> "K8sRequiredLabels". Constraint lookups
/// silently return nothing if this mapping is off.
pub fn constraint_kind_for_template(template_name: &str) -> String {
    template_name
        .split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Flatten the violations embedded in constraint statuses, optionally
/// filtered to one namespace.
fn violations_from_constraints(constraints: &[Value], namespace: Option<&str>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for constraint in constraints {
        let total = constraint
            .get("status")
            .and_then(|s| s.get("totalViolations"))
            .and_then(|t| t.as_u64())
            .unwrap_or(0);
        if total == 0 {
            continue;
        }
        let entries = constraint
            .get("status")
            .and_then(|s| s.get("violations"))
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        for entry in &entries {
            if let Some(ns) = namespace {
                if entry.get("namespace").and_then(|n| n.as_str()) != Some(ns) {
                    continue;
                }
            }
            violations.push(Violation {
                engine: "Gatekeeper",
                policy: status::name(constraint).to_string(),
                resource: format!(
                    "{}/{}",
                    entry.get("kind").and_then(|k| k.as_str()).unwrap_or(""),
                    entry.get("name").and_then(|n| n.as_str()).unwrap_or("")
                ),
                message: entry
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("No message")
                    .to_string(),
            });
        }
    }
    violations
}

/// Flatten failed results out of policy report documents
fn failures_from_reports(reports: &[Value]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for report in reports {
        let results = report
            .get("results")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default();
        for result in &results {
            if result.get("result").and_then(|r| r.as_str()) != Some("fail") {
                continue;
            }
            let first_resource = result
                .get("resources")
                .and_then(|r| r.as_array())
                .and_then(|r| r.first())
                .cloned()
                .unwrap_or(Value::Null);
            violations.push(Violation {
                engine: "Kyverno",
                policy: result
                    .get("policy")
                    .and_then(|p| p.as_str())
                    .unwrap_or("Unknown")
                    .to_string(),
                resource: format!(
                    "{}/{}",
                    first_resource
                        .get("kind")
                        .and_then(|k| k.as_str())
                        .unwrap_or(""),
                    first_resource
                        .get("name")
                        .and_then(|n| n.as_str())
                        .unwrap_or("")
                ),
                message: result
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("No message")
                    .to_string(),
            });
        }
    }
    violations
}

async fn gatekeeper_violations(client: &kube::Client, namespace: Option<&str>) -> Vec<Violation> {
    let templates = match resources::list(client, &resources::constraint_template(), None).await {
        Ok(templates) => templates,
        Err(e) => {
            tracing::debug!("Gatekeeper constraint templates unavailable: {}", e);
            return Vec::new();
        }
    };

    let mut violations = Vec::new();
    for template in &templates {
        let kind = constraint_kind_for_template(status::name(template));
        let constraints =
            match resources::list(client, &resources::gatekeeper_constraint(&kind), None).await {
                Ok(constraints) => constraints,
                Err(e) => {
                    tracing::debug!("Constraint kind {} unavailable: {}", kind, e);
                    continue;
                }
            };
        violations.extend(violations_from_constraints(&constraints, namespace));
    }
    violations
}

async fn kyverno_violations(client: &kube::Client, namespace: Option<&str>) -> Vec<Violation> {
    let mut violations = Vec::new();

    match resources::list(client, &resources::cluster_policy_report(), None).await {
        Ok(reports) => violations.extend(failures_from_reports(&reports)),
        Err(e) => tracing::debug!("ClusterPolicyReports unavailable: {}", e),
    }

    match resources::list(client, &resources::policy_report(), namespace).await {
        Ok(reports) => violations.extend(failures_from_reports(&reports)),
        Err(e) => tracing::debug!("PolicyReports unavailable: {}", e),
    }

    violations
}

/// Check for policy violations across one or both engines
pub async fn check_policy_violations(
    client: &kube::Client,
    namespace: Option<&str>,
    policy_engine: &str,
) -> String {
    if !matches!(policy_engine, "gatekeeper" | "kyverno" | "both") {
        return error_text(&QueryError::InvalidArgument(format!(
            "unknown policy engine '{}', use: gatekeeper, kyverno, both",
            policy_engine
        )));
    }

    let mut violations = Vec::new();
    if matches!(policy_engine, "gatekeeper" | "both") {
        violations.extend(gatekeeper_violations(client, namespace).await);
    }
    if matches!(policy_engine, "kyverno" | "both") {
        violations.extend(kyverno_violations(client, namespace).await);
    }

    if violations.is_empty() {
        return format!(
            "## Policy Violations\n\n**Engine(s) checked:** {}\n**Result:** ✅ No violations found\n",
            policy_engine
        );
    }

    let mut out = format!(
        "## Policy Violations\n\n**Engine(s) checked:** {}\n**Violations found:** {}\n\n",
        policy_engine,
        violations.len()
    );
    out.push_str(&header_line(&["Engine", "Policy", "Resource", "Message"]));
    for v in &violations {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            v.engine,
            v.policy,
            v.resource,
            report::truncate(&v.message, 50)
        ));
    }
    out
}

/// List Gatekeeper constraints with enforcement action and violation counts
pub async fn list_constraints(client: &kube::Client, constraint_kind: Option<&str>) -> String {
    let templates = match resources::list(client, &resources::constraint_template(), None).await {
        Ok(templates) => templates,
        Err(e) => {
            tracing::warn!("Gatekeeper constraint templates unavailable: {}", e);
            return format!("Error: Gatekeeper not installed or no access: {}", e);
        }
    };

    let mut rows = Vec::new();
    for template in &templates {
        let template_name = status::name(template);
        let kind = constraint_kind_for_template(template_name);
        if let Some(filter) = constraint_kind {
            if !template_name.eq_ignore_ascii_case(filter) && !kind.eq_ignore_ascii_case(filter) {
                continue;
            }
        }

        let constraints =
            match resources::list(client, &resources::gatekeeper_constraint(&kind), None).await {
                Ok(constraints) => constraints,
                Err(e) => {
                    tracing::debug!("Constraint kind {} unavailable: {}", kind, e);
                    continue;
                }
            };

        for constraint in &constraints {
            let enforcement = status::spec_str(constraint, "enforcementAction").unwrap_or("deny");
            let total = constraint
                .get("status")
                .and_then(|s| s.get("totalViolations"))
                .and_then(|t| t.as_u64())
                .unwrap_or(0);
            let violation_str = if total > 0 {
                format!("❌ {}", total)
            } else {
                "✅ 0".to_string()
            };
            rows.push(vec![
                kind.clone(),
                status::name(constraint).to_string(),
                enforcement.to_string(),
                violation_str,
            ]);
        }
    }

    report::render_table(
        "Gatekeeper Constraints",
        "No Gatekeeper constraints found",
        &["Kind", "Name", "Enforcement", "Violations"],
        &rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constraint_kind_transform() {
        assert_eq!(
            constraint_kind_for_template("k8s-required-labels"),
            "K8sRequiredLabels"
        );
        assert_eq!(
            constraint_kind_for_template("k8s-allowed-repos"),
            "K8sAllowedRepos"
        );
        assert_eq!(constraint_kind_for_template("unique-labels"), "UniqueLabels");
        assert_eq!(constraint_kind_for_template("denyall"), "Denyall");
    }

    #[test]
    fn test_violations_from_constraints() {
        let constraints = vec![json!({
            "metadata": {"name": "require-team-label"},
            "status": {
                "totalViolations": 2,
                "violations": [
                    {"kind": "Namespace", "name": "sandbox", "namespace": "sandbox", "message": "missing team label"},
                    {"kind": "Pod", "name": "web-0", "namespace": "prod", "message": "missing team label"}
                ]
            }
        })];

        let all = violations_from_constraints(&constraints, None);
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|v| v.engine == "Gatekeeper"));
        assert_eq!(all[0].policy, "require-team-label");
        assert_eq!(all[0].resource, "Namespace/sandbox");

        let prod_only = violations_from_constraints(&constraints, Some("prod"));
        assert_eq!(prod_only.len(), 1);
        assert_eq!(prod_only[0].resource, "Pod/web-0");
    }

    #[test]
    fn test_violations_skipped_when_total_is_zero() {
        let constraints = vec![json!({
            "metadata": {"name": "quiet"},
            "status": {"totalViolations": 0, "violations": []}
        })];
        assert!(violations_from_constraints(&constraints, None).is_empty());
    }

    #[test]
    fn test_failures_from_reports_only_fail_results() {
        let reports = vec![json!({
            "results": [
                {"result": "pass", "policy": "disallow-latest"},
                {
                    "result": "fail",
                    "policy": "require-requests",
                    "message": "cpu requests missing",
                    "resources": [{"kind": "Deployment", "name": "api"}]
                }
            ]
        })];

        let violations = failures_from_reports(&reports);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].engine, "Kyverno");
        assert_eq!(violations[0].policy, "require-requests");
        assert_eq!(violations[0].resource, "Deployment/api");
    }

    #[test]
    fn test_engine_merge_tags_each_source() {
        let gatekeeper = violations_from_constraints(
            &[json!({
                "metadata": {"name": "labels"},
                "status": {
                    "totalViolations": 2,
                    "violations": [
                        {"kind": "Pod", "name": "a", "message": "m"},
                        {"kind": "Pod", "name": "b", "message": "m"}
                    ]
                }
            })],
            None,
        );
        let kyverno = failures_from_reports(&[json!({"results": []})]);

        let mut merged = gatekeeper;
        merged.extend(kyverno);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|v| v.engine == "Gatekeeper"));
    }
}
