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

use std::io::Write;
use std::sync::Arc;

use crate::destination::Destination;
use crate::destination::Pipeline;
use crate::queue::DeliveryQueue;
use crate::record::Record;

/// Which standard stream a [`ConsoleDestination`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

/// A destination that prints log records to stdout or stderr.
#[derive(Debug)]
pub struct ConsoleDestination {
    pipeline: Arc<Pipeline>,
    target: ConsoleTarget,
    queue: Option<DeliveryQueue>,
}

impl ConsoleDestination {
    /// Creates a console destination writing to stdout.
    pub fn new(pipeline: Pipeline) -> ConsoleDestination {
        ConsoleDestination {
            pipeline: Arc::new(pipeline),
            target: ConsoleTarget::Stdout,
            queue: None,
        }
    }

    /// Sets the standard stream to write to.
    pub fn with_target(mut self, target: ConsoleTarget) -> Self {
        self.target = target;
        self
    }

    /// Deliver through the given queue instead of the caller's thread.
    pub fn with_queue(mut self, queue: DeliveryQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    fn write(target: ConsoleTarget, message: &str) {
        let mut bytes = message.as_bytes().to_vec();
        bytes.push(b'\n');
        let _ = match target {
            ConsoleTarget::Stdout => std::io::stdout().write_all(&bytes),
            ConsoleTarget::Stderr => std::io::stderr().write_all(&bytes),
        };
    }
}

impl Destination for ConsoleDestination {
    fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn output(&self, _record: &Record, message: String) {
        let target = self.target;
        match &self.queue {
            Some(queue) => queue.dispatch(move || Self::write(target, &message)),
            None => Self::write(target, &message),
        }
    }

    fn flush(&self) {
        if let Some(queue) = &self.queue {
            queue.flush();
        }
        let _ = match self.target {
            ConsoleTarget::Stdout => std::io::stdout().flush(),
            ConsoleTarget::Stderr => std::io::stderr().flush(),
        };
    }
}
