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

//! Formatters rewriting the decorated text of log records.

use std::fmt;

#[cfg(feature = "colored")]
pub use self::color::AnsiColorFormatter;
#[cfg(feature = "colored")]
pub use self::color::LevelColors;
pub use self::custom::CustomFormatter;
pub use self::prefix::PrePostFixFormatter;

#[cfg(feature = "colored")]
mod color;
mod custom;
mod prefix;

use crate::record::Record;

/// A transform applied to the decorated text of a record before output.
///
/// Formatters run in registration order; each sees the text produced by its
/// predecessors and may mutate it in place (color wrapping, prefixes, ...).
pub trait Formatter: fmt::Debug + Send + Sync + 'static {
    /// Rewrite `message` for the given record.
    fn apply(&self, record: &Record, message: &mut String);
}
