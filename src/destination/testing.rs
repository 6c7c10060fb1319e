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

use std::sync::Arc;
use std::sync::Mutex;

use crate::destination::Destination;
use crate::destination::Pipeline;
use crate::destination::lock_ignore_poison;
use crate::record::Record;

/// A destination that captures decorated lines in memory.
///
/// Useful in test harnesses to assert what a pipeline delivered without
/// touching the file system or the standard streams.
#[derive(Debug)]
pub struct TestingDestination {
    pipeline: Arc<Pipeline>,
    lines: Arc<Mutex<Vec<String>>>,
}

impl TestingDestination {
    /// Creates a capturing destination.
    pub fn new(pipeline: Pipeline) -> TestingDestination {
        TestingDestination {
            pipeline: Arc::new(pipeline),
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A snapshot of the captured lines, in delivery order.
    pub fn lines(&self) -> Vec<String> {
        lock_ignore_poison(&self.lines).clone()
    }

    /// The number of captured lines.
    pub fn len(&self) -> usize {
        lock_ignore_poison(&self.lines).len()
    }

    /// Whether nothing was captured yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Destination for TestingDestination {
    fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn output(&self, _record: &Record, message: String) {
        lock_ignore_poison(&self.lines).push(message);
    }
}
