// Copyright 2024 Argus Team
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

use argus_operator::Settings;
use clap::{Parser, Subcommand};
use shadow_rs::shadow;

shadow!(build);

#[derive(Parser)]
#[command(name = "argus-op")]
#[command(version = build::PKG_VERSION)]
#[command(about = "Argus metrics stack operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Output CRDs in YAML
    Crd {
        /// Optional output path. If not set, the output will be written to stdout.
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Run the controller
    Server {
        /// Name of the ClusterComponent record the operator reports to.
        #[arg(long, default_value = "argus-metrics")]
        component: String,

        /// Namespace the metrics stack runs in.
        #[arg(long, default_value = "argus-system")]
        namespace: String,

        /// Namespace for user workload monitoring.
        #[arg(long, default_value = "argus-user-workload")]
        user_workload_namespace: String,

        /// Version reported once the rollout finishes.
        #[arg(long, default_value = build::PKG_VERSION)]
        operator_version: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crd { file } => argus_operator::crd(file).await?,
        Commands::Server {
            component,
            namespace,
            user_workload_namespace,
            operator_version,
        } => {
            argus_operator::run(Settings {
                component,
                namespace,
                user_workload_namespace,
                version: operator_version,
            })
            .await?
        }
    }

    Ok(())
}
