//! Dynamic resource access
//!
//! List/get over `Api<DynamicObject>` for arbitrary custom resources,
//! with transport failures classified into a small error taxonomy so
//! callers can tell "CRD not installed" apart from "RBAC denied".

mod registry;

pub use registry::*;

use kube::Api;
use kube::api::ListParams;
use kube::core::DynamicObject;
use serde_json::Value;

/// Classified failure of a cluster query
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The resource kind is not served by the API server, usually because
    /// the operator owning the CRD is not installed.
    #[error("{0} API not available (operator may not be installed)")]
    ApiUnavailable(String),

    #[error("access to {0} denied by RBAC")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cluster API request failed: {0}")]
    Transport(#[from] kube::Error),
}

/// Result type for cluster queries
pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    /// Classify an error from a typed API call, where a 404 means the
    /// named object rather than the resource kind is missing.
    pub fn from_kube(err: kube::Error, what: &str) -> Self {
        match &err {
            kube::Error::Api(ae) if ae.code == 404 => QueryError::NotFound(what.to_string()),
            kube::Error::Api(ae) if ae.code == 403 => QueryError::Forbidden(what.to_string()),
            _ => QueryError::Transport(err),
        }
    }
}

/// Map a kube error from a list call into the taxonomy.
///
/// A 404 on list means the group/kind itself is unknown to the server.
fn classify_list_error(err: kube::Error, resource: &ResourceRef) -> QueryError {
    match &err {
        kube::Error::Api(ae) if ae.code == 404 => {
            QueryError::ApiUnavailable(resource.kind.clone())
        }
        kube::Error::Api(ae) if ae.code == 403 => QueryError::Forbidden(resource.kind.clone()),
        _ => QueryError::Transport(err),
    }
}

/// Map a kube error from a get call into the taxonomy.
fn classify_get_error(err: kube::Error, resource: &ResourceRef, name: &str) -> QueryError {
    match &err {
        kube::Error::Api(ae) if ae.code == 404 => {
            QueryError::NotFound(format!("{} {}", resource.kind, name))
        }
        kube::Error::Api(ae) if ae.code == 403 => QueryError::Forbidden(resource.kind.clone()),
        _ => QueryError::Transport(err),
    }
}

fn dynamic_api(
    client: &kube::Client,
    resource: &ResourceRef,
    namespace: Option<&str>,
) -> Api<DynamicObject> {
    let ar = resource.api_resource();
    match namespace {
        Some(ns) => Api::namespaced_with(client.clone(), ns, &ar),
        None => Api::all_with(client.clone(), &ar),
    }
}

/// List objects of a resource kind as untyped JSON documents.
///
/// `namespace` absent means all namespaces (or the whole cluster for
/// cluster-scoped kinds).
pub async fn list(
    client: &kube::Client,
    resource: &ResourceRef,
    namespace: Option<&str>,
) -> QueryResult<Vec<Value>> {
    list_with(client, resource, namespace, &ListParams::default()).await
}

/// List with explicit list parameters (label selectors etc.)
pub async fn list_with(
    client: &kube::Client,
    resource: &ResourceRef,
    namespace: Option<&str>,
    params: &ListParams,
) -> QueryResult<Vec<Value>> {
    let api = dynamic_api(client, resource, namespace);
    let objects = api
        .list(params)
        .await
        .map_err(|e| classify_list_error(e, resource))?;

    let mut items = Vec::with_capacity(objects.items.len());
    for obj in objects {
        items.push(serde_json::to_value(&obj).unwrap_or_default());
    }
    Ok(items)
}

/// Fetch a single named object as an untyped JSON document.
pub async fn get(
    client: &kube::Client,
    resource: &ResourceRef,
    name: &str,
    namespace: &str,
) -> QueryResult<Value> {
    let api = dynamic_api(client, resource, Some(namespace));
    let obj = api
        .get(name)
        .await
        .map_err(|e| classify_get_error(e, resource, name))?;
    Ok(serde_json::to_value(&obj).unwrap_or_default())
}
