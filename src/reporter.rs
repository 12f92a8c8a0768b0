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

//! Publishes the operator's view of the stack's health to its
//! ClusterComponent record.
//!
//! Every operation follows the same protocol: fetch the record, merge the
//! operation's conditions and versions over the fetched state, and write the
//! result back through the status subresource. A missing record is created
//! first, carrying the merged status, and then written like any other. The
//! reporter never retries and never logs; errors surface to the caller as-is.

pub mod state;

mod conditions;

use crate::types::error::{Error, UnavailableWithoutMessageSnafu};
use crate::types::v1alpha1::component::{ClusterComponent, ClusterComponentSpec};
use crate::types::v1alpha1::status::condition::{ConditionStatus, ConditionType};
use crate::types::v1alpha1::status::version::ComponentVersion;
use crate::types::v1alpha1::status::{ClusterComponentStatus, ObjectReference};
use chrono::Utc;
use conditions::Conditions;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use snafu::ensure;
use state::StateReport;
use std::future::Future;

const ROLL_OUT_IN_PROGRESS_REASON: &str = "RollOutInProgress";
const ROLL_OUT_IN_PROGRESS_MESSAGE: &str =
    "Rollout of the metrics stack is in progress. Please wait until it finishes.";

const ROLL_OUT_DONE_REASON: &str = "RollOutDone";
const ROLL_OUT_DONE_MESSAGE: &str = "Successfully rolled out the metrics stack.";

/// Access to the persisted ClusterComponent records. `update_status` only
/// writes the status sub-structure of the named record; `Error::is_not_found`
/// distinguishes a missing record on `get` from every other failure.
pub trait ComponentStore {
    fn get(&self, name: &str) -> impl Future<Output = Result<ClusterComponent, Error>> + Send;

    fn create(
        &self,
        component: &ClusterComponent,
    ) -> impl Future<Output = Result<ClusterComponent, Error>> + Send;

    fn update_status(
        &self,
        component: &ClusterComponent,
    ) -> impl Future<Output = Result<ClusterComponent, Error>> + Send;
}

/// Writes health reports for one component to its record in the store.
///
/// The reporter holds no state between calls; each operation fetches the
/// record fresh, so at most one reporting call should be in flight per
/// record at a time.
pub struct StatusReporter<S> {
    store: S,
    component: String,
    namespace: String,
    user_workload_namespace: String,
    version: String,
}

impl<S: ComponentStore> StatusReporter<S> {
    pub fn new(
        store: S,
        component: &str,
        namespace: &str,
        user_workload_namespace: &str,
        version: &str,
    ) -> Self {
        Self {
            store,
            component: component.to_owned(),
            namespace: namespace.to_owned(),
            user_workload_namespace: user_workload_namespace.to_owned(),
            version: version.to_owned(),
        }
    }

    /// Marks the record as progressing towards a new version: Progressing
    /// becomes True and the remaining conditions Unknown. The version list
    /// stays as persisted until the rollout finishes.
    pub async fn set_roll_out_in_progress(&self) -> Result<(), Error> {
        self.publish(|base, now| {
            let mut conditions = Conditions::from_base(&base.conditions, now);
            for type_ in [
                ConditionType::Available,
                ConditionType::Degraded,
                ConditionType::Upgradeable,
            ] {
                conditions.set(
                    type_,
                    ConditionStatus::Unknown,
                    ROLL_OUT_IN_PROGRESS_REASON,
                    ROLL_OUT_IN_PROGRESS_MESSAGE,
                    now,
                );
            }
            conditions.set(
                ConditionType::Progressing,
                ConditionStatus::True,
                ROLL_OUT_IN_PROGRESS_REASON,
                ROLL_OUT_IN_PROGRESS_MESSAGE,
                now,
            );

            Ok(ClusterComponentStatus {
                conditions: conditions.entries(),
                versions: base.versions.clone(),
                ..Default::default()
            })
        })
        .await
    }

    /// Marks the rollout as finished and records the version this reporter
    /// was built with as the component's own version entry. Entries owned by
    /// other writers pass through untouched. The version parameters only
    /// describe the transition for the caller's benefit; the persisted entry
    /// always carries the configured version.
    pub async fn set_roll_out_done(&self, prev_version: &str, to_version: &str) -> Result<(), Error> {
        self.publish(|base, now| {
            let mut conditions = Conditions::from_base(&base.conditions, now);
            conditions.set(
                ConditionType::Available,
                ConditionStatus::True,
                ROLL_OUT_DONE_REASON,
                ROLL_OUT_DONE_MESSAGE,
                now,
            );
            conditions.set(
                ConditionType::Degraded,
                ConditionStatus::False,
                ROLL_OUT_DONE_REASON,
                ROLL_OUT_DONE_MESSAGE,
                now,
            );
            conditions.set(
                ConditionType::Progressing,
                ConditionStatus::False,
                ROLL_OUT_DONE_REASON,
                ROLL_OUT_DONE_MESSAGE,
                now,
            );
            conditions.set(
                ConditionType::Upgradeable,
                ConditionStatus::Unknown,
                ROLL_OUT_DONE_REASON,
                ROLL_OUT_DONE_MESSAGE,
                now,
            );

            Ok(ClusterComponentStatus {
                conditions: conditions.entries(),
                versions: self.next_versions(&base.versions),
                ..Default::default()
            })
        })
        .await
    }

    /// Publishes the supplied signals. A signal that is `None` leaves its
    /// condition exactly as persisted; Progressing, Upgradeable, and the
    /// version list are never touched here. An available signal of False
    /// must carry a message, otherwise the call fails without writing.
    pub async fn report_state<R>(&self, report: &R) -> Result<(), Error>
    where
        R: StateReport + ?Sized,
    {
        self.publish(|base, now| {
            let mut conditions = Conditions::from_base(&base.conditions, now);

            if let Some(degraded) = report.degraded() {
                conditions.set(
                    ConditionType::Degraded,
                    degraded.status(),
                    degraded.reason(),
                    degraded.message(),
                    now,
                );
            }

            if let Some(available) = report.available() {
                ensure!(
                    available.status() != ConditionStatus::False
                        || !available.message().is_empty(),
                    UnavailableWithoutMessageSnafu
                );
                conditions.set(
                    ConditionType::Available,
                    available.status(),
                    available.reason(),
                    available.message(),
                    now,
                );
            }

            Ok(ClusterComponentStatus {
                conditions: conditions.entries(),
                versions: base.versions.clone(),
                ..Default::default()
            })
        })
        .await
    }

    /// Fetch, merge, write. The record is created first when the fetch
    /// reports it missing; any other fetch error aborts before anything is
    /// written. The merged status is computed before the create, so a
    /// validation failure also leaves a missing record missing.
    async fn publish<F>(&self, next: F) -> Result<(), Error>
    where
        F: FnOnce(&ClusterComponentStatus, &metav1::Time) -> Result<ClusterComponentStatus, Error>,
    {
        let (mut component, missing) = match self.store.get(&self.component).await {
            Ok(component) => (component, false),
            Err(e) if e.is_not_found() => (
                ClusterComponent::new(&self.component, ClusterComponentSpec::default()),
                true,
            ),
            Err(e) => return Err(e),
        };

        let now = metav1::Time(Utc::now());
        let base = component.status.take().unwrap_or_default();
        let mut status = next(&base, &now)?;
        status.related_objects = self.related_objects();
        component.status = Some(status);

        if missing {
            // the server strips the status on create; carry it over to the
            // returned record for the status write
            let status = component.status.clone();
            component = self.store.create(&component).await?;
            component.status = status;
        }

        self.store.update_status(&component).await?;
        Ok(())
    }

    fn next_versions(&self, base: &[ComponentVersion]) -> Vec<ComponentVersion> {
        let mut versions = base.to_vec();
        match versions.iter_mut().find(|v| v.name == self.component) {
            Some(own) => own.version = self.version.clone(),
            None => versions.push(ComponentVersion {
                name: self.component.clone(),
                version: self.version.clone(),
            }),
        }
        versions
    }

    fn related_objects(&self) -> Vec<ObjectReference> {
        vec![
            ObjectReference {
                resource: "namespaces".to_owned(),
                name: self.namespace.clone(),
                ..Default::default()
            },
            ObjectReference {
                resource: "namespaces".to_owned(),
                name: self.user_workload_namespace.clone(),
                ..Default::default()
            },
        ]
    }
}
