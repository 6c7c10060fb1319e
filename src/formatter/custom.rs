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

use std::fmt::Debug;

use crate::formatter::Formatter;
use crate::record::Record;

/// A formatter backed by a custom function.
///
/// ```rust
/// use logward::formatter::CustomFormatter;
///
/// let formatter = CustomFormatter::new(|_record, message| {
///     message.insert_str(0, ">>> ");
/// });
/// ```
pub struct CustomFormatter {
    f: Box<dyn Fn(&Record, &mut String) + Send + Sync + 'static>,
}

impl Debug for CustomFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CustomFormatter {{ ... }}")
    }
}

impl CustomFormatter {
    /// Creates a new `CustomFormatter` from the given function.
    pub fn new(formatter: impl Fn(&Record, &mut String) + Send + Sync + 'static) -> Self {
        CustomFormatter {
            f: Box::new(formatter),
        }
    }
}

impl Formatter for CustomFormatter {
    fn apply(&self, record: &Record, message: &mut String) {
        (self.f)(record, message)
    }
}
