// Copyright 2024 FastLabs Developers
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

//! Destination POSTing log records to an HTTP endpoint.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::destination::Destination;
use crate::destination::Pipeline;
use crate::queue::DeliveryQueue;
use crate::record::Record;

/// A destination that serializes each record to JSON and POSTs it.
///
/// Delivery is fire-and-forget: transport errors and non-success responses
/// are reported to stderr and never reach the logging caller. Pair it with a
/// [`DeliveryQueue`] unless callers can absorb request latency.
#[derive(Debug)]
pub struct NetworkDestination {
    pipeline: Arc<Pipeline>,
    client: reqwest::blocking::Client,
    target: String,
    queue: Option<DeliveryQueue>,
}

impl NetworkDestination {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a destination POSTing to `target`.
    pub fn new(pipeline: Pipeline, target: impl Into<String>) -> NetworkDestination {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        NetworkDestination {
            pipeline: Arc::new(pipeline),
            client,
            target: target.into(),
            queue: None,
        }
    }

    /// Deliver through the given queue instead of the caller's thread.
    pub fn with_queue(mut self, queue: DeliveryQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    fn payload(record: &Record, message: &str) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "level": record.level().to_string(),
            "date": record.time().to_string(),
            "message": message,
            "functionName": record.function(),
            "fileName": record.file(),
            "lineNumber": record.line(),
        });
        if !record.user_info().is_empty() {
            payload["userInfo"] = serde_json::json!(record.user_info());
        }
        payload
    }

    fn post(client: &reqwest::blocking::Client, target: &str, payload: serde_json::Value) {
        let send = || -> anyhow::Result<()> {
            client
                .post(target)
                .json(&payload)
                .send()
                .context("failed to send log record")?
                .error_for_status()
                .context("log endpoint rejected record")?;
            Ok(())
        };
        if let Err(err) = send() {
            eprintln!("failed to POST log record to {target}: {err:#}");
        }
    }
}

impl Destination for NetworkDestination {
    fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn output(&self, record: &Record, message: String) {
        let payload = Self::payload(record, &message);
        match &self.queue {
            Some(queue) => {
                let client = self.client.clone();
                let target = self.target.clone();
                queue.dispatch(move || Self::post(&client, &target, payload));
            }
            None => Self::post(&self.client, &self.target, payload),
        }
    }

    fn flush(&self) {
        if let Some(queue) = &self.queue {
            queue.flush();
        }
    }
}
