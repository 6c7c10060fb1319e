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

use crate::formatter::Formatter;
use crate::record::Record;

/// A formatter wrapping the decorated text in a fixed prefix and/or suffix.
#[derive(Debug, Default)]
pub struct PrePostFixFormatter {
    prefix: Option<String>,
    suffix: Option<String>,
}

impl PrePostFixFormatter {
    /// Creates a formatter that applies nothing until configured.
    pub fn new() -> PrePostFixFormatter {
        PrePostFixFormatter::default()
    }

    /// Sets the prefix to prepend to each message.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the suffix to append to each message.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

impl Formatter for PrePostFixFormatter {
    fn apply(&self, _record: &Record, message: &mut String) {
        if let Some(prefix) = &self.prefix {
            message.insert_str(0, prefix);
        }
        if let Some(suffix) = &self.suffix {
            message.push_str(suffix);
        }
    }
}
