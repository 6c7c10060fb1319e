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

//! Filters for log records.

use std::fmt;

pub use self::custom::CustomFilter;
pub use self::tag::TagFilter;

mod custom;
mod tag;

use crate::record::Record;

/// A predicate that may suppress a record for one destination.
///
/// Filters run in registration order after the level gate; the first filter
/// that signals exclusion aborts the record silently for that destination.
pub trait Filter: fmt::Debug + Send + Sync + 'static {
    /// Whether the record should be dropped.
    fn should_exclude(&self, record: &Record) -> bool;
}
