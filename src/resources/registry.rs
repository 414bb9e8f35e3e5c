//! Resource type registry
//!
//! Central place for the API coordinates of every custom resource this
//! server queries. Flux kinds get a dedicated enum because tools accept
//! them as user input; the CAPI, Kommander, and policy engine kinds are
//! fixed descriptors constructed on demand.

use std::fmt;

use kube::core::ApiResource;

/// Coordinates of a queryable resource type: API group, version, kind,
/// and plural name. Covers arbitrary CRDs not known at compile time
/// (Gatekeeper constraint kinds are discovered at runtime).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl ResourceRef {
    pub fn new(group: &str, version: &str, kind: &str, plural: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
            plural: plural.to_string(),
        }
    }

    /// Build the kube ApiResource used for dynamic API access
    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: if self.group.is_empty() {
                self.version.clone()
            } else {
                format!("{}/{}", self.group, self.version)
            },
            kind: self.kind.clone(),
            plural: self.plural.clone(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.{}", self.group, self.version, self.kind)
    }
}

/// Enumeration of the Flux resource kinds exposed by the Flux tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FluxKind {
    Kustomization,
    GitRepository,
    HelmRelease,
}

impl FluxKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FluxKind::Kustomization => "Kustomization",
            FluxKind::GitRepository => "GitRepository",
            FluxKind::HelmRelease => "HelmRelease",
        }
    }

    /// All Flux kinds this server knows about
    pub fn all() -> &'static [Self] {
        &[
            FluxKind::Kustomization,
            FluxKind::GitRepository,
            FluxKind::HelmRelease,
        ]
    }

    /// Try to parse a string (case-insensitive) into a FluxKind
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "kustomization" | "ks" | "kustomizations" => Some(FluxKind::Kustomization),
            "gitrepository" | "gitrepo" | "gitrepositories" => Some(FluxKind::GitRepository),
            "helmrelease" | "hr" | "helmreleases" => Some(FluxKind::HelmRelease),
            _ => None,
        }
    }

    /// API coordinates for this kind
    pub fn resource_ref(&self) -> ResourceRef {
        match self {
            FluxKind::Kustomization => ResourceRef::new(
                "kustomize.toolkit.fluxcd.io",
                "v1",
                "Kustomization",
                "kustomizations",
            ),
            FluxKind::GitRepository => ResourceRef::new(
                "source.toolkit.fluxcd.io",
                "v1",
                "GitRepository",
                "gitrepositories",
            ),
            FluxKind::HelmRelease => ResourceRef::new(
                "helm.toolkit.fluxcd.io",
                "v2",
                "HelmRelease",
                "helmreleases",
            ),
        }
    }
}

impl fmt::Display for FluxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Cluster API (CAPI) resources

pub fn capi_cluster() -> ResourceRef {
    ResourceRef::new("cluster.x-k8s.io", "v1beta1", "Cluster", "clusters")
}

pub fn capi_machine() -> ResourceRef {
    ResourceRef::new("cluster.x-k8s.io", "v1beta1", "Machine", "machines")
}

/// Label CAPI puts on every Machine to link it to its owning Cluster
pub const CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";

// Kommander application resources

pub fn kommander_app() -> ResourceRef {
    ResourceRef::new("apps.kommander.d2iq.io", "v1alpha2", "App", "apps")
}

pub fn kommander_cluster_app() -> ResourceRef {
    ResourceRef::new(
        "apps.kommander.d2iq.io",
        "v1alpha2",
        "ClusterApp",
        "clusterapps",
    )
}

// Gatekeeper policy resources

pub fn constraint_template() -> ResourceRef {
    ResourceRef::new(
        "templates.gatekeeper.sh",
        "v1",
        "ConstraintTemplate",
        "constrainttemplates",
    )
}

/// Descriptor for a dynamically-named Gatekeeper constraint kind.
///
/// Gatekeeper registers one CRD per constraint template; the plural is
/// the lowercased kind.
pub fn gatekeeper_constraint(kind: &str) -> ResourceRef {
    ResourceRef::new(
        "constraints.gatekeeper.sh",
        "v1beta1",
        kind,
        &kind.to_lowercase(),
    )
}

// Kyverno policy report resources (wg-policy CRDs)

pub fn policy_report() -> ResourceRef {
    ResourceRef::new("wgpolicyk8s.io", "v1alpha2", "PolicyReport", "policyreports")
}

pub fn cluster_policy_report() -> ResourceRef {
    ResourceRef::new(
        "wgpolicyk8s.io",
        "v1alpha2",
        "ClusterPolicyReport",
        "clusterpolicyreports",
    )
}
