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

use crate::context::Context;
use crate::reconcile::{error_policy, reconcile_component};
use crate::types::v1alpha1::component::ClusterComponent;
use futures::StreamExt;
use k8s_openapi::api::apps::v1 as appsv1;
use kube::CustomResourceExt;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::{Controller, watcher};
use kube::{Api, Client};
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

mod context;
pub mod reconcile;
pub mod reporter;
pub mod types;

pub use context::Settings;


pub async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let client = Client::try_default().await?;
    let components = Api::<ClusterComponent>::all(client.clone());
    let deployments = Api::<appsv1::Deployment>::namespaced(client.clone(), &settings.namespace);
    let selector = format!("app.kubernetes.io/part-of={}", settings.component);
    let component = settings.component.clone();

    let context = Context::new(client, settings);

    // The record signals Progressing from the moment the operator starts
    // until a reconcile finds the stack deployments ready.
    context.reporter.set_roll_out_in_progress().await?;

    Controller::new(components, watcher::Config::default())
        .watches(
            deployments,
            watcher::Config::default().labels(&selector),
            move |_| Some(ObjectRef::new(&component)),
        )
        .run(reconcile_component, error_policy, Arc::new(context))
        .for_each(|res| async move {
            match res {
                Ok((component, _)) => info!("reconciled {}", component.name),
                Err(e) => warn!("reconcile failed: {}", e),
            }
        })
        .await;

    Ok(())
}

pub async fn crd(file: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer: Pin<Box<dyn AsyncWrite + Send>> = if let Some(file) = file {
        Box::pin(
            tokio::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(file)
                .await?,
        )
    } else {
        Box::pin(tokio::io::stdout())
    };

    writer
        .write_all(serde_yaml_ng::to_string(&ClusterComponent::crd())?.as_bytes())
        .await?;

    Ok(())
}
