//! Cluster resource model
//!
//! A closed set of resource kinds the cache knows how to store. Each kind is
//! a reduced view of the upstream object: identity plus the handful of fields
//! the completion rows are built from. Unknown fields in incoming objects are
//! ignored, so raw watch output deserializes directly.

pub mod key;
pub mod types;

pub use key::{resource_key, KEY_SEPARATOR};
pub use types::{
    ApiResource, ApiResourceList, ConfigMap, Container, Deployment, DeploymentSpec,
    DeploymentStatus, K8sResource, Namespace, NamespaceStatus, Node, NodeAddress, NodeSpec,
    NodeStatus, ObjectMeta, Pod, PodSpec, PodStatus, Service, ServicePort, ServiceSpec,
    StatefulSet, StatefulSetSpec, StatefulSetStatus,
};

use crate::error::KfzfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity accessor for anything a `Store` can hold
pub trait Resource: Clone + Send + Sync + 'static {
    /// Object name, unique within its namespace
    fn name(&self) -> &str;

    /// Namespace, `None` for cluster-scoped objects
    fn namespace(&self) -> Option<&str>;

    /// Cache key for this object
    fn key(&self) -> String {
        resource_key(self.namespace(), self.name())
    }
}

/// Resource types maintained by the cache, one dump file each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "pods", alias = "pod", alias = "po")]
    Pod,
    #[serde(rename = "services", alias = "service", alias = "svc")]
    Service,
    #[serde(rename = "configmaps", alias = "configmap", alias = "cm")]
    ConfigMap,
    #[serde(rename = "namespaces", alias = "namespace", alias = "ns")]
    Namespace,
    #[serde(rename = "nodes", alias = "node", alias = "no")]
    Node,
    #[serde(rename = "deployments", alias = "deployment", alias = "deploy")]
    Deployment,
    #[serde(rename = "statefulsets", alias = "statefulset", alias = "sts")]
    StatefulSet,
    #[serde(rename = "apiresources", alias = "apiresource")]
    ApiResource,
}

impl ResourceType {
    /// Plural name, used as the dump file name
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Pod => "pods",
            Self::Service => "services",
            Self::ConfigMap => "configmaps",
            Self::Namespace => "namespaces",
            Self::Node => "nodes",
            Self::Deployment => "deployments",
            Self::StatefulSet => "statefulsets",
            Self::ApiResource => "apiresources",
        }
    }

    /// Whether objects of this type live inside a namespace
    pub fn namespaced(&self) -> bool {
        !matches!(self, Self::Namespace | Self::Node | Self::ApiResource)
    }

    /// All resource types in dump order
    pub fn all() -> &'static [Self] {
        &[
            Self::Pod,
            Self::Service,
            Self::ConfigMap,
            Self::Namespace,
            Self::Node,
            Self::Deployment,
            Self::StatefulSet,
            Self::ApiResource,
        ]
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plural())
    }
}

impl FromStr for ResourceType {
    type Err = KfzfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let ty = match lower.as_str() {
            "pods" | "pod" | "po" => Self::Pod,
            "services" | "service" | "svc" => Self::Service,
            "configmaps" | "configmap" | "cm" => Self::ConfigMap,
            "namespaces" | "namespace" | "ns" => Self::Namespace,
            "nodes" | "node" | "no" => Self::Node,
            "deployments" | "deployment" | "deploy" => Self::Deployment,
            "statefulsets" | "statefulset" | "sts" => Self::StatefulSet,
            "apiresources" | "apiresource" | "apiresourcelist" => Self::ApiResource,
            _ => return Err(KfzfError::UnknownResourceType(s.to_string())),
        };
        Ok(ty)
    }
}
