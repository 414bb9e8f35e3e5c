//! Status derivation for cluster resources
//!
//! Most Flux-style CRDs report their state through a `status.conditions`
//! array plus a `spec.suspend` flag. This module centralizes the traversal
//! of those untyped documents so query functions never re-parse raw JSON.

use serde_json::Value;

/// Normalized status derived from a resource's spec and conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedStatus {
    Ready,
    Failed,
    Suspended,
    Unknown,
}

impl DerivedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedStatus::Ready => "Ready",
            DerivedStatus::Failed => "Failed",
            DerivedStatus::Suspended => "Suspended",
            DerivedStatus::Unknown => "Unknown",
        }
    }

    /// Whether this status passes a user-supplied filter string
    /// ("all" or a case-insensitive status name).
    pub fn matches_filter(&self, filter: &str) -> bool {
        filter == "all" || self.as_str().eq_ignore_ascii_case(filter)
    }
}

impl std::fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the normalized status from a resource's spec and status documents.
///
/// The evaluation order is load-bearing:
/// 1. `spec.suspend == true` wins over everything - a suspended resource
///    reports Suspended even when its Ready condition is still True.
/// 2. Any condition with `type == "Ready"` and `status == "True"` -> Ready.
///    Condition order is server-defined, so the whole array is scanned.
/// 3. Everything else -> Failed. This includes resources with no
///    conditions at all (not yet reconciled), matching the upstream
///    controller-facing behavior rather than mapping them to Unknown.
pub fn evaluate(spec: &Value, status: &Value) -> DerivedStatus {
    if is_suspended(spec) {
        return DerivedStatus::Suspended;
    }
    if has_ready_condition(status) {
        return DerivedStatus::Ready;
    }
    DerivedStatus::Failed
}

/// Convenience wrapper evaluating a whole object document.
///
/// Missing `spec` or `status` subtrees are treated as empty - an object
/// the controller has not touched yet must not crash the evaluator.
pub fn evaluate_object(obj: &Value) -> DerivedStatus {
    let spec = obj.get("spec").unwrap_or(&Value::Null);
    let status = obj.get("status").unwrap_or(&Value::Null);
    evaluate(spec, status)
}

/// Check the spec-level suspend flag (Flux uses "suspend" not "suspended")
pub fn is_suspended(spec: &Value) -> bool {
    spec.get("suspend").and_then(|s| s.as_bool()).unwrap_or(false)
}

/// Scan the conditions array for a Ready condition at status True
pub fn has_ready_condition(status: &Value) -> bool {
    conditions(status).iter().any(|c| {
        c.get("type").and_then(|t| t.as_str()) == Some("Ready")
            && c.get("status").and_then(|s| s.as_str()) == Some("True")
    })
}

/// The conditions array of a status document, empty when absent
pub fn conditions(status: &Value) -> Vec<&Value> {
    status
        .get("conditions")
        .and_then(|c| c.as_array())
        .map(|a| a.iter().collect())
        .unwrap_or_default()
}

/// Message of the first condition with the given type, if any
pub fn condition_message<'a>(status: &'a Value, condition_type: &str) -> Option<&'a str> {
    conditions(status)
        .into_iter()
        .find(|c| c.get("type").and_then(|t| t.as_str()) == Some(condition_type))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.as_str())
}

// Shared accessors for the well-known metadata fields

/// `metadata.name`, empty string when absent
pub fn name(obj: &Value) -> &str {
    obj.get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("")
}

/// `metadata.namespace`, empty string when absent (cluster-scoped objects)
pub fn namespace(obj: &Value) -> &str {
    obj.get("metadata")
        .and_then(|m| m.get("namespace"))
        .and_then(|n| n.as_str())
        .unwrap_or("")
}

/// A single label value from `metadata.labels`
pub fn label<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get("metadata")
        .and_then(|m| m.get("labels"))
        .and_then(|l| l.get(key))
        .and_then(|v| v.as_str())
}

/// A string field from the spec document, `None` when absent
pub fn spec_str<'a>(obj: &'a Value, field: &str) -> Option<&'a str> {
    obj.get("spec")
        .and_then(|s| s.get(field))
        .and_then(|v| v.as_str())
}

/// A string field from the status document, `None` when absent
pub fn status_str<'a>(obj: &'a Value, field: &str) -> Option<&'a str> {
    obj.get("status")
        .and_then(|s| s.get(field))
        .and_then(|v| v.as_str())
}

/// A boolean field from the status document, false when absent
pub fn status_bool(obj: &Value, field: &str) -> bool {
    obj.get("status")
        .and_then(|s| s.get(field))
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_suspend_overrides_ready() {
        let spec = json!({"suspend": true});
        let status = json!({
            "conditions": [
                {"type": "Ready", "status": "True", "reason": "ReconciliationSucceeded"}
            ]
        });
        assert_eq!(evaluate(&spec, &status), DerivedStatus::Suspended);
    }

    #[test]
    fn test_ready_condition_detected_anywhere_in_array() {
        let spec = json!({});
        let status = json!({
            "conditions": [
                {"type": "Healthy", "status": "False"},
                {"type": "Ready", "status": "True"}
            ]
        });
        assert_eq!(evaluate(&spec, &status), DerivedStatus::Ready);
    }

    #[test]
    fn test_no_conditions_is_failed() {
        assert_eq!(evaluate(&json!({}), &json!({})), DerivedStatus::Failed);
    }

    #[test]
    fn test_ready_false_is_failed() {
        let status = json!({
            "conditions": [
                {"type": "Ready", "status": "False", "reason": "BuildFailed"}
            ]
        });
        assert_eq!(evaluate(&json!({}), &status), DerivedStatus::Failed);
    }

    #[test]
    fn test_evaluate_object_tolerates_missing_subtrees() {
        assert_eq!(evaluate_object(&json!({})), DerivedStatus::Failed);
        assert_eq!(
            evaluate_object(&json!({"spec": {"suspend": true}})),
            DerivedStatus::Suspended
        );
    }

    #[test]
    fn test_metadata_accessors() {
        let obj = json!({
            "metadata": {
                "name": "podinfo",
                "namespace": "flux-system",
                "labels": {"cluster.x-k8s.io/cluster-name": "workload-1"}
            }
        });
        assert_eq!(name(&obj), "podinfo");
        assert_eq!(namespace(&obj), "flux-system");
        assert_eq!(
            label(&obj, "cluster.x-k8s.io/cluster-name"),
            Some("workload-1")
        );
        assert_eq!(label(&obj, "missing"), None);
    }

    #[test]
    fn test_condition_message() {
        let status = json!({
            "conditions": [
                {"type": "Ready", "status": "False", "message": "dependency not ready"}
            ]
        });
        assert_eq!(
            condition_message(&status, "Ready"),
            Some("dependency not ready")
        );
        assert_eq!(condition_message(&status, "Healthy"), None);
    }

    #[test]
    fn test_matches_filter() {
        assert!(DerivedStatus::Ready.matches_filter("all"));
        assert!(DerivedStatus::Ready.matches_filter("ready"));
        assert!(DerivedStatus::Suspended.matches_filter("Suspended"));
        assert!(!DerivedStatus::Failed.matches_filter("ready"));
    }
}
