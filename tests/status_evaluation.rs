//! Status derivation tests
//!
//! Covers the evaluation order guarantees: suspension wins over
//! readiness, Ready requires an explicit Ready=True condition, and
//! everything else (including not-yet-reconciled objects) is Failed.

use gitops_mcp::status::{evaluate, evaluate_object};
use gitops_mcp::DerivedStatus;
use serde_json::json;

#[test]
fn test_suspended_wins_regardless_of_conditions() {
    let spec = json!({"suspend": true});

    // Even a fully ready resource reports Suspended
    let ready_status = json!({
        "conditions": [
            {"type": "Ready", "status": "True", "reason": "ReconciliationSucceeded"}
        ]
    });
    assert_eq!(evaluate(&spec, &ready_status), DerivedStatus::Suspended);

    // And so does a failed one
    let failed_status = json!({
        "conditions": [
            {"type": "Ready", "status": "False", "reason": "BuildFailed"}
        ]
    });
    assert_eq!(evaluate(&spec, &failed_status), DerivedStatus::Suspended);

    // And one with no conditions at all
    assert_eq!(evaluate(&spec, &json!({})), DerivedStatus::Suspended);
}

#[test]
fn test_ready_requires_ready_true() {
    let spec = json!({"suspend": false});

    let status = json!({
        "conditions": [
            {"type": "Ready", "status": "True"}
        ]
    });
    assert_eq!(evaluate(&spec, &status), DerivedStatus::Ready);

    // Ready=Unknown is not ready
    let status = json!({
        "conditions": [
            {"type": "Ready", "status": "Unknown"}
        ]
    });
    assert_eq!(evaluate(&spec, &status), DerivedStatus::Failed);

    // A True condition of a different type is not ready
    let status = json!({
        "conditions": [
            {"type": "Healthy", "status": "True"}
        ]
    });
    assert_eq!(evaluate(&spec, &status), DerivedStatus::Failed);
}

#[test]
fn test_condition_position_does_not_matter() {
    // Condition ordering is server-defined; Ready may appear anywhere
    let status = json!({
        "conditions": [
            {"type": "Reconciling", "status": "False"},
            {"type": "Healthy", "status": "True"},
            {"type": "Ready", "status": "True"}
        ]
    });
    assert_eq!(evaluate(&json!({}), &status), DerivedStatus::Ready);
}

#[test]
fn test_absent_suspend_field_means_not_suspended() {
    let status = json!({
        "conditions": [{"type": "Ready", "status": "True"}]
    });
    assert_eq!(evaluate(&json!({}), &status), DerivedStatus::Ready);
}

#[test]
fn test_unreconciled_object_classifies_as_failed() {
    // An object the controller has not touched yet has no status at all.
    // It deliberately classifies as Failed, not Unknown.
    let obj = json!({
        "metadata": {"name": "fresh", "namespace": "default"},
        "spec": {"path": "./apps"}
    });
    assert_eq!(evaluate_object(&obj), DerivedStatus::Failed);
}

#[test]
fn test_full_object_evaluation() {
    let obj = json!({
        "metadata": {"name": "podinfo", "namespace": "flux-system"},
        "spec": {
            "suspend": false,
            "sourceRef": {"kind": "GitRepository", "name": "flux-system"}
        },
        "status": {
            "conditions": [
                {"type": "Ready", "status": "True", "reason": "ReconciliationSucceeded"}
            ]
        }
    });
    assert_eq!(evaluate_object(&obj), DerivedStatus::Ready);
}
