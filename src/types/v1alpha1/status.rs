pub mod condition;
pub mod version;

use k8s_openapi::schemars::JsonSchema;
use kube::KubeSchema;
use serde::{Deserialize, Serialize};

/// Status sub-structure of a ClusterComponent record. Owned by this
/// operator; the control plane and users only read it.
#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterComponentStatus {
    /// One condition per type, ordered by type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<condition::Condition>,

    /// Operand versions, keyed by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<version::ComponentVersion>,

    /// Objects the stack lives in, for the control plane to collect on
    /// must-gather style inspection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_objects: Vec<ObjectReference>,
}

/// Minimal group/resource/name reference to a related object.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,

    pub resource: String,

    /// Empty for cluster-scoped objects.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    pub name: String,
}
