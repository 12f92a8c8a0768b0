// Copyright 2025 Argus Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::types::v1alpha1::status::condition::{Condition, ConditionType};
use k8s_openapi::schemars::JsonSchema;
use kube::{CustomResource, KubeSchema, ResourceExt};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Cluster-scoped record describing the health of one managed component.
/// The operator owns the record named after the component it manages and
/// keeps the status sub-structure current; the spec side belongs to users.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, KubeSchema, Default)]
#[kube(
    group = "argusmon.dev",
    version = "v1alpha1",
    kind = "ClusterComponent",
    status = "crate::types::v1alpha1::status::ClusterComponentStatus",
    shortname = "cc",
    plural = "clustercomponents",
    singular = "clustercomponent",
    printcolumn = r#"{"name":"Available", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Available\")].status"}"#,
    printcolumn = r#"{"name":"Progressing", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Progressing\")].status"}"#,
    printcolumn = r#"{"name":"Degraded", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Degraded\")].status"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#,
    crates(serde_json = "k8s_openapi::serde_json")
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterComponentSpec {
    /// Unmanaged pauses all reconciliation of the record; the operator
    /// neither updates the status nor emits events for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_state: Option<ManagementState>,
}

/// Whether the operator actively manages the record.
#[derive(Default, Deserialize, Serialize, Clone, Debug, JsonSchema, Display, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
#[schemars(rename_all = "PascalCase")]
pub enum ManagementState {
    #[strum(to_string = "Managed")]
    #[default]
    Managed,

    #[strum(to_string = "Unmanaged")]
    Unmanaged,
}

impl ClusterComponent {
    pub fn name(&self) -> String {
        ResourceExt::name_any(self)
    }

    pub fn management_state(&self) -> ManagementState {
        self.spec.management_state.clone().unwrap_or_default()
    }

    /// the persisted condition of the given type, if the record has one
    pub fn condition(&self, type_: &ConditionType) -> Option<&Condition> {
        self.status
            .as_ref()
            .and_then(|status| status.conditions.iter().find(|c| c.type_ == *type_))
    }

    /// the persisted version entry for the named operand
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|status| status.versions.iter().find(|v| v.name == name))
            .map(|v| v.version.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::v1alpha1::status::condition::ConditionStatus;

    #[test]
    fn test_management_state_defaults_to_managed() {
        let component = crate::tests::component_with_conditions(&[]);
        assert_eq!(component.management_state(), ManagementState::Managed);
    }

    #[test]
    fn test_unmanaged_spec_is_reported_as_unmanaged() {
        let mut component = crate::tests::component_with_conditions(&[]);
        component.spec.management_state = Some(ManagementState::Unmanaged);
        assert_eq!(component.management_state(), ManagementState::Unmanaged);
    }

    #[test]
    fn test_condition_lookup_finds_the_requested_type() {
        let component = crate::tests::component_with_conditions(&[
            (ConditionType::Available, ConditionStatus::True),
            (ConditionType::Degraded, ConditionStatus::False),
        ]);

        let degraded = component.condition(&ConditionType::Degraded);
        assert_eq!(degraded.map(|c| &c.status), Some(&ConditionStatus::False));
        assert!(component.condition(&ConditionType::Progressing).is_none());
    }

    #[test]
    fn test_version_lookup_is_keyed_by_operand_name() {
        let component =
            crate::tests::component_with_versions(&[("thanos", "0.30"), ("foo", "1.0")]);

        assert_eq!(component.version_of("foo"), Some("1.0"));
        assert_eq!(component.version_of("thanos"), Some("0.30"));
        assert_eq!(component.version_of("prometheus"), None);
    }

    #[test]
    fn test_records_without_status_have_no_versions() {
        let mut component = crate::tests::component_with_conditions(&[]);
        component.status = None;
        assert_eq!(component.version_of("foo"), None);
    }
}
