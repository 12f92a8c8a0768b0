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

//! Health signals handed to the status reporter

use crate::types::v1alpha1::status::condition::ConditionStatus;

/// One observed health aspect: a tri-state status plus the reason and
/// message to publish with it.
pub trait StateInfo {
    fn status(&self) -> ConditionStatus;
    fn reason(&self) -> &str;
    fn message(&self) -> &str;
}

/// A pre-aggregated pair of signals for one reporting call. `None` means
/// "no opinion" for that aspect: the persisted condition is left exactly
/// as it was, which is distinct from reporting Unknown.
pub trait StateReport {
    fn degraded(&self) -> Option<&dyn StateInfo>;
    fn available(&self) -> Option<&dyn StateInfo>;
}

/// Signal for an aspect that matches expectations.
pub struct AsExpected(pub ConditionStatus);

impl StateInfo for AsExpected {
    fn status(&self) -> ConditionStatus {
        self.0.clone()
    }

    fn reason(&self) -> &str {
        "AsExpected"
    }

    fn message(&self) -> &str {
        ""
    }
}

/// Signal for an aspect in an unexpected state, carrying the failure
/// description as the message.
pub struct Unexpected {
    pub status: ConditionStatus,
    pub message: String,
}

impl StateInfo for Unexpected {
    fn status(&self) -> ConditionStatus {
        self.status.clone()
    }

    fn reason(&self) -> &str {
        "Unexpected"
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// The report the reconcile driver builds from the observed state of the
/// stack's workloads.
pub struct HealthReport {
    degraded: Option<Box<dyn StateInfo + Send + Sync>>,
    available: Option<Box<dyn StateInfo + Send + Sync>>,
}

impl HealthReport {
    /// every workload is ready
    pub fn healthy() -> Self {
        Self {
            degraded: Some(Box::new(AsExpected(ConditionStatus::False))),
            available: Some(Box::new(AsExpected(ConditionStatus::True))),
        }
    }

    /// at least one workload is not ready
    pub fn failing(message: &str) -> Self {
        Self {
            degraded: Some(Box::new(Unexpected {
                status: ConditionStatus::True,
                message: message.to_owned(),
            })),
            available: Some(Box::new(Unexpected {
                status: ConditionStatus::False,
                message: message.to_owned(),
            })),
        }
    }

    /// nothing observed; leave the persisted conditions alone
    pub fn inconclusive() -> Self {
        Self {
            degraded: None,
            available: None,
        }
    }
}

impl StateReport for HealthReport {
    fn degraded(&self) -> Option<&dyn StateInfo> {
        self.degraded.as_deref().map(|signal| signal as &dyn StateInfo)
    }

    fn available(&self) -> Option<&dyn StateInfo> {
        self.available.as_deref().map(|signal| signal as &dyn StateInfo)
    }
}
