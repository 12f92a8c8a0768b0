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

use crate::reporter::{ComponentStore, StatusReporter};
use crate::types::error::{Error, KubeSnafu, RecordSnafu};
use crate::types::v1alpha1::component::ClusterComponent;
use k8s_openapi::api::apps::v1 as appsv1;
use kube::Resource;
use kube::api::{Api, ListParams, ObjectList, PostParams};
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use snafu::futures::TryFutureExt;

/// Runtime configuration of the operator, fixed at startup.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Name of the ClusterComponent record this operator owns.
    pub component: String,
    /// Namespace the metrics stack is deployed into.
    pub namespace: String,
    /// Namespace for user workload monitoring.
    pub user_workload_namespace: String,
    /// Version the operator rolls out; reported once the rollout is done.
    pub version: String,
}

pub struct Context {
    pub(crate) client: kube::Client,
    pub(crate) recorder: Recorder,
    pub(crate) settings: Settings,
    pub(crate) reporter: StatusReporter<ComponentClient>,
}

impl Context {
    pub fn new(client: kube::Client, settings: Settings) -> Self {
        let recorder = Recorder::new(
            client.clone(),
            Reporter {
                controller: "argus-operator".into(),
                instance: std::env::var("HOSTNAME").ok(),
            },
        );

        let reporter = StatusReporter::new(
            ComponentClient::new(client.clone()),
            &settings.component,
            &settings.namespace,
            &settings.user_workload_namespace,
            &settings.version,
        );

        Self {
            client,
            recorder,
            settings,
            reporter,
        }
    }

    /// send event
    #[inline]
    pub async fn record(
        &self,
        resource: &ClusterComponent,
        event_type: EventType,
        reason: &str,
        message: &str,
    ) -> Result<(), Error> {
        self.recorder
            .publish(
                &Event {
                    type_: event_type,
                    reason: reason.to_owned(),
                    note: Some(message.into()),
                    action: "Reconcile".into(),
                    secondary: None,
                },
                &resource.object_ref(&()),
            )
            .context(RecordSnafu)
            .await
    }

    /// Deployments that make up the metrics stack, selected by the part-of
    /// label in the stack namespace.
    pub async fn stack_deployments(&self) -> Result<ObjectList<appsv1::Deployment>, Error> {
        let api: Api<appsv1::Deployment> =
            Api::namespaced(self.client.clone(), &self.settings.namespace);
        let selector = format!("app.kubernetes.io/part-of={}", self.settings.component);
        api.list(&ListParams::default().labels(&selector))
            .context(KubeSnafu)
            .await
    }
}

/// ClusterComponent access backed by the cluster-scoped API.
pub struct ComponentClient {
    client: kube::Client,
}

impl ComponentClient {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    fn api(&self) -> Api<ClusterComponent> {
        Api::all(self.client.clone())
    }
}

impl ComponentStore for ComponentClient {
    async fn get(&self, name: &str) -> Result<ClusterComponent, Error> {
        self.api().get(name).context(KubeSnafu).await
    }

    async fn create(&self, component: &ClusterComponent) -> Result<ClusterComponent, Error> {
        self.api()
            .create(&PostParams::default(), component)
            .context(KubeSnafu)
            .await
    }

    async fn update_status(&self, component: &ClusterComponent) -> Result<ClusterComponent, Error> {
        let body = serde_json::to_vec(component)?;
        self.api()
            .replace_status(&component.name(), &PostParams::default(), body)
            .context(KubeSnafu)
            .await
    }
}
