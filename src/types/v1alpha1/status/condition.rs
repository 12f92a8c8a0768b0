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

//! Condition types carried on a ClusterComponent status record

use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use k8s_openapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Tri-state value of a condition.
/// - True/False: the aspect has been evaluated
/// - Unknown: the aspect has not been evaluated yet
#[derive(Default, Deserialize, Serialize, Clone, Debug, JsonSchema, Display, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
#[schemars(rename_all = "PascalCase")]
pub enum ConditionStatus {
    #[strum(to_string = "True")]
    True,

    #[strum(to_string = "False")]
    False,

    #[strum(to_string = "Unknown")]
    #[default]
    Unknown,
}

/// The closed set of condition types on a record. Declaration order is
/// alphabetical so that sorting by type matches the serialized order the
/// control plane displays.
#[derive(
    Deserialize, Serialize, Clone, Debug, JsonSchema, Display, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "PascalCase")]
#[schemars(rename_all = "PascalCase")]
pub enum ConditionType {
    #[strum(to_string = "Available")]
    Available,

    #[strum(to_string = "Degraded")]
    Degraded,

    #[strum(to_string = "Progressing")]
    Progressing,

    #[strum(to_string = "Upgradeable")]
    Upgradeable,
}

/// One named health signal on the record. A record holds at most one
/// condition per type. `last_transition_time` tracks when `status` last
/// changed value; reason and message may change without moving it.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: ConditionType,

    pub status: ConditionStatus,

    /// Machine-readable token for the last status change.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Human-readable detail for the last status change.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<metav1::Time>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_types_order_alphabetically() {
        assert!(ConditionType::Available < ConditionType::Degraded);
        assert!(ConditionType::Degraded < ConditionType::Progressing);
        assert!(ConditionType::Progressing < ConditionType::Upgradeable);
    }

    #[test]
    fn test_status_serializes_as_pascal_case() {
        assert_eq!(ConditionStatus::True.to_string(), "True");
        assert_eq!(ConditionStatus::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_condition_wire_format_omits_empty_fields() {
        let condition = Condition {
            type_: ConditionType::Available,
            status: ConditionStatus::True,
            reason: String::new(),
            message: String::new(),
            last_transition_time: None,
        };

        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "Available", "status": "True"})
        );
    }
}
