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

use crate::context::{Context, Settings};
use crate::reporter::state::HealthReport;
use crate::types::error::Error;
use crate::types::v1alpha1::component::{ClusterComponent, ManagementState};
use crate::types::v1alpha1::status::condition::{ConditionStatus, ConditionType};
use k8s_openapi::api::apps::v1 as appsv1;
use kube::runtime::controller::Action;
use kube::runtime::events::EventType;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

const ROLL_OUT_REQUEUE: Duration = Duration::from_secs(15);
const STEADY_REQUEUE: Duration = Duration::from_secs(300);

/// Aggregated health of the stack deployments.
#[derive(Debug, PartialEq)]
pub enum StackHealth {
    Healthy,
    Degraded { message: String },
    Unknown,
}

pub async fn reconcile_component(
    component: Arc<ClusterComponent>,
    ctx: Arc<Context>,
) -> Result<Action, Error> {
    if component.metadata.deletion_timestamp.is_some() {
        debug!(
            "component {} is deleted, deletion_timestamp is {:?}",
            component.name(),
            component.metadata.deletion_timestamp
        );
        return Ok(Action::await_change());
    }

    if !handles(&component, &ctx.settings) {
        debug!("ignoring component {}", component.name());
        return Ok(Action::await_change());
    }

    let deployments = ctx.stack_deployments().await?;
    let health = stack_health(&deployments.items);

    // 1. Finish a pending rollout before steady-state reporting. The record
    //    keeps signalling Progressing until the stack deployments are ready.
    if rollout_pending(&component, &ctx.settings) {
        return match health {
            StackHealth::Healthy => {
                ctx.reporter
                    .set_roll_out_done(
                        component.version_of(&ctx.settings.component).unwrap_or(""),
                        &ctx.settings.version,
                    )
                    .await?;
                ctx.record(
                    &component,
                    EventType::Normal,
                    "RollOutComplete",
                    &format!("rolled out version {}", ctx.settings.version),
                )
                .await?;
                Ok(Action::requeue(STEADY_REQUEUE))
            }
            _ => {
                ctx.reporter.set_roll_out_in_progress().await?;
                Ok(Action::requeue(ROLL_OUT_REQUEUE))
            }
        };
    }

    // 2. Steady state: publish the aggregated deployment health.
    match health {
        StackHealth::Healthy => {
            ctx.reporter.report_state(&HealthReport::healthy()).await?;
        }
        StackHealth::Degraded { message } => {
            ctx.reporter
                .report_state(&HealthReport::failing(&message))
                .await?;
            if !was_degraded(&component) {
                ctx.record(&component, EventType::Warning, "StackDegraded", &message)
                    .await?;
            }
        }
        StackHealth::Unknown => {
            ctx.reporter
                .report_state(&HealthReport::inconclusive())
                .await?;
        }
    }

    Ok(Action::requeue(STEADY_REQUEUE))
}

pub fn error_policy(_object: Arc<ClusterComponent>, error: &Error, _ctx: Arc<Context>) -> Action {
    error!("error_policy: {:?}", error);

    if error.is_not_found() {
        Action::await_change()
    } else {
        Action::requeue(Duration::from_secs(5))
    }
}

/// A deployment counts as failing when fewer replicas are ready than the
/// spec asks for. No deployments at all means the rollout has not started,
/// which is no opinion rather than degraded.
pub fn stack_health(deployments: &[appsv1::Deployment]) -> StackHealth {
    if deployments.is_empty() {
        return StackHealth::Unknown;
    }

    let mut failing = Vec::new();
    for deployment in deployments {
        let wanted = deployment
            .spec
            .as_ref()
            .and_then(|spec| spec.replicas)
            .unwrap_or(1);
        let ready = deployment
            .status
            .as_ref()
            .and_then(|status| status.ready_replicas)
            .unwrap_or(0);
        if ready < wanted {
            let name = deployment.metadata.name.clone().unwrap_or_default();
            failing.push(format!(
                "deployment {} has {}/{} ready replicas",
                name, ready, wanted
            ));
        }
    }

    if failing.is_empty() {
        StackHealth::Healthy
    } else {
        StackHealth::Degraded {
            message: failing.join(", "),
        }
    }
}

fn handles(component: &ClusterComponent, settings: &Settings) -> bool {
    component.name() == settings.component
        && component.management_state() != ManagementState::Unmanaged
}

fn rollout_pending(component: &ClusterComponent, settings: &Settings) -> bool {
    component.version_of(&settings.component) != Some(settings.version.as_str())
}

fn was_degraded(component: &ClusterComponent) -> bool {
    component
        .condition(&ConditionType::Degraded)
        .is_some_and(|condition| condition.status == ConditionStatus::True)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::v1alpha1::component::ClusterComponentSpec;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn deployment(name: &str, wanted: Option<i32>, ready: Option<i32>) -> appsv1::Deployment {
        appsv1::Deployment {
            metadata: ObjectMeta {
                name: Some(name.to_owned()),
                ..Default::default()
            },
            spec: Some(appsv1::DeploymentSpec {
                replicas: wanted,
                ..Default::default()
            }),
            status: Some(appsv1::DeploymentStatus {
                ready_replicas: ready,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_stack_health_with_no_deployments_is_unknown() {
        assert_eq!(stack_health(&[]), StackHealth::Unknown);
    }

    #[test]
    fn test_stack_health_with_all_replicas_ready_is_healthy() {
        let deployments = vec![
            deployment("prometheus", Some(2), Some(2)),
            deployment("alertmanager", Some(3), Some(3)),
        ];

        assert_eq!(stack_health(&deployments), StackHealth::Healthy);
    }

    #[test]
    fn test_stack_health_reports_each_failing_deployment() {
        let deployments = vec![
            deployment("prometheus", Some(2), Some(0)),
            deployment("alertmanager", Some(3), Some(3)),
            deployment("thanos-querier", Some(3), Some(1)),
        ];

        assert_eq!(
            stack_health(&deployments),
            StackHealth::Degraded {
                message: "deployment prometheus has 0/2 ready replicas, \
                          deployment thanos-querier has 1/3 ready replicas"
                    .to_owned(),
            },
        );
    }

    #[test]
    fn test_stack_health_defaults_unset_replica_counts() {
        let deployments = vec![deployment("prometheus", None, None)];

        assert_eq!(
            stack_health(&deployments),
            StackHealth::Degraded {
                message: "deployment prometheus has 0/1 ready replicas".to_owned(),
            },
        );
    }

    #[test]
    fn test_handles_only_the_configured_component() {
        let settings = crate::tests::settings();
        let ours = ClusterComponent::new(&settings.component, ClusterComponentSpec::default());
        let other = ClusterComponent::new("other", ClusterComponentSpec::default());

        assert!(handles(&ours, &settings));
        assert!(!handles(&other, &settings));
    }

    #[test]
    fn test_unmanaged_components_are_ignored() {
        let settings = crate::tests::settings();
        let component = ClusterComponent::new(
            &settings.component,
            ClusterComponentSpec {
                management_state: Some(ManagementState::Unmanaged),
            },
        );

        assert!(!handles(&component, &settings));
    }

    #[test]
    fn test_rollout_is_pending_until_the_version_matches() {
        let settings = crate::tests::settings();

        let fresh = ClusterComponent::new(&settings.component, ClusterComponentSpec::default());
        assert!(rollout_pending(&fresh, &settings));

        let behind = crate::tests::component_with_versions(&[(crate::tests::COMPONENT, "0.9")]);
        assert!(rollout_pending(&behind, &settings));

        let current = crate::tests::component_with_versions(&[(
            crate::tests::COMPONENT,
            crate::tests::VERSION,
        )]);
        assert!(!rollout_pending(&current, &settings));
    }

    #[test]
    fn test_degraded_state_is_read_from_the_persisted_condition() {
        let degraded = crate::tests::component_with_conditions(&[(
            ConditionType::Degraded,
            ConditionStatus::True,
        )]);
        let healthy = crate::tests::component_with_conditions(&[(
            ConditionType::Degraded,
            ConditionStatus::False,
        )]);

        assert!(was_degraded(&degraded));
        assert!(!was_degraded(&healthy));
        assert!(!was_degraded(&crate::tests::component_with_conditions(&[])));
    }
}
