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

use crate::types::v1alpha1::status::condition::{Condition, ConditionStatus, ConditionType};
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use std::collections::BTreeMap;

/// Type-keyed working set for one merge pass over a record's conditions.
///
/// Construction seeds every type as Unknown at the given time and then
/// overlays the persisted base entries verbatim, so types the current
/// operation does not touch keep their status, reason, message, and
/// transition time.
pub(crate) struct Conditions {
    entries: BTreeMap<ConditionType, Condition>,
}

impl Conditions {
    pub(crate) fn from_base(base: &[Condition], time: &metav1::Time) -> Self {
        let mut entries = BTreeMap::new();

        for type_ in [
            ConditionType::Available,
            ConditionType::Degraded,
            ConditionType::Progressing,
            ConditionType::Upgradeable,
        ] {
            entries.insert(
                type_.clone(),
                Condition {
                    type_,
                    status: ConditionStatus::Unknown,
                    reason: String::new(),
                    message: String::new(),
                    last_transition_time: Some(time.clone()),
                },
            );
        }

        for condition in base {
            entries.insert(condition.type_.clone(), condition.clone());
        }

        Self { entries }
    }

    /// Replaces one entry. The transition time moves to `time` only when the
    /// status value actually changes; reason and message update either way.
    pub(crate) fn set(
        &mut self,
        type_: ConditionType,
        status: ConditionStatus,
        reason: &str,
        message: &str,
        time: &metav1::Time,
    ) {
        match self.entries.get_mut(&type_) {
            Some(current) if current.status == status => {
                current.reason = reason.to_owned();
                current.message = message.to_owned();
            }
            _ => {
                self.entries.insert(
                    type_.clone(),
                    Condition {
                        type_,
                        status,
                        reason: reason.to_owned(),
                        message: message.to_owned(),
                        last_transition_time: Some(time.clone()),
                    },
                );
            }
        }
    }

    /// the merged conditions, ordered by type
    pub(crate) fn entries(&self) -> Vec<Condition> {
        self.entries.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::time;

    fn base_condition(
        type_: ConditionType,
        status: ConditionStatus,
        reason: &str,
        secs: i64,
    ) -> Condition {
        Condition {
            type_,
            status,
            reason: reason.to_owned(),
            message: String::new(),
            last_transition_time: Some(time(secs)),
        }
    }

    #[test]
    fn test_empty_base_seeds_all_types_as_unknown() {
        let conditions = Conditions::from_base(&[], &time(10));

        let entries = conditions.entries();
        assert_eq!(entries.len(), 4);
        assert!(
            entries
                .iter()
                .all(|c| c.status == ConditionStatus::Unknown
                    && c.last_transition_time == Some(time(10)))
        );
    }

    #[test]
    fn test_base_entries_overlay_the_seeds_verbatim() {
        let base = vec![base_condition(
            ConditionType::Available,
            ConditionStatus::True,
            "AsExpected",
            100,
        )];

        let conditions = Conditions::from_base(&base, &time(500));

        let entries = conditions.entries();
        assert_eq!(entries[0], base[0]);
        assert_eq!(entries[1].status, ConditionStatus::Unknown);
    }

    #[test]
    fn test_set_with_unchanged_status_keeps_the_transition_time() {
        let base = vec![base_condition(
            ConditionType::Degraded,
            ConditionStatus::False,
            "AsExpected",
            100,
        )];
        let mut conditions = Conditions::from_base(&base, &time(500));

        conditions.set(
            ConditionType::Degraded,
            ConditionStatus::False,
            "StillFine",
            "nothing to see",
            &time(500),
        );

        let degraded = &conditions.entries()[1];
        assert_eq!(degraded.last_transition_time, Some(time(100)));
        assert_eq!(degraded.reason, "StillFine");
        assert_eq!(degraded.message, "nothing to see");
    }

    #[test]
    fn test_set_with_changed_status_moves_the_transition_time() {
        let base = vec![base_condition(
            ConditionType::Degraded,
            ConditionStatus::False,
            "AsExpected",
            100,
        )];
        let mut conditions = Conditions::from_base(&base, &time(500));

        conditions.set(
            ConditionType::Degraded,
            ConditionStatus::True,
            "Unexpected",
            "pods are stuck",
            &time(500),
        );

        let degraded = &conditions.entries()[1];
        assert_eq!(degraded.last_transition_time, Some(time(500)));
        assert_eq!(degraded.status, ConditionStatus::True);
    }

    #[test]
    fn test_entries_are_ordered_by_type_regardless_of_base_order() {
        let base = vec![
            base_condition(ConditionType::Upgradeable, ConditionStatus::False, "", 1),
            base_condition(ConditionType::Available, ConditionStatus::True, "", 2),
            base_condition(ConditionType::Progressing, ConditionStatus::False, "", 3),
            base_condition(ConditionType::Degraded, ConditionStatus::False, "", 4),
        ];

        let conditions = Conditions::from_base(&base, &time(500));

        let types: Vec<ConditionType> = conditions
            .entries()
            .into_iter()
            .map(|c| c.type_)
            .collect();
        assert_eq!(
            types,
            vec![
                ConditionType::Available,
                ConditionType::Degraded,
                ConditionType::Progressing,
                ConditionType::Upgradeable,
            ],
        );
    }
}
