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

use std::collections::BTreeSet;

use crate::filter::Filter;
use crate::record::Record;
use crate::user_info::TAGS_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Include,
    Exclude,
}

/// A filter matching records by their tag annotations.
///
/// In include mode, records without at least one of the named tags are
/// dropped; in exclude mode, records with any of the named tags are dropped.
/// Records produced by the internal diagnostic path never carry tags, so an
/// include-mode filter on a destination is usually paired with the internal
/// path being exempt from filtering.
#[derive(Debug)]
pub struct TagFilter {
    names: BTreeSet<String>,
    mode: Mode,
}

impl TagFilter {
    /// Only records carrying at least one of `names` pass.
    pub fn include_only<I, S>(names: I) -> TagFilter
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TagFilter {
            names: names.into_iter().map(Into::into).collect(),
            mode: Mode::Include,
        }
    }

    /// Records carrying any of `names` are dropped.
    pub fn exclude<I, S>(names: I) -> TagFilter
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TagFilter {
            names: names.into_iter().map(Into::into).collect(),
            mode: Mode::Exclude,
        }
    }

    fn matches(&self, record: &Record) -> bool {
        record
            .user_info()
            .values(TAGS_KEY)
            .iter()
            .any(|name| self.names.contains(name))
    }
}

impl Filter for TagFilter {
    fn should_exclude(&self, record: &Record) -> bool {
        match self.mode {
            Mode::Include => !self.matches(record),
            Mode::Exclude => self.matches(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;
    use crate::user_info::Tag;

    fn record_with_tags(names: &[&str]) -> Record {
        Record::builder()
            .level(Level::Debug)
            .message("tagged")
            .user_info(Tag::names(names.iter().copied()))
            .build()
    }

    #[test]
    fn test_include_only() {
        let filter = TagFilter::include_only(["network"]);
        assert!(!filter.should_exclude(&record_with_tags(&["network", "ui"])));
        assert!(filter.should_exclude(&record_with_tags(&["ui"])));
        assert!(filter.should_exclude(&record_with_tags(&[])));
    }

    #[test]
    fn test_exclude() {
        let filter = TagFilter::exclude(["noisy"]);
        assert!(filter.should_exclude(&record_with_tags(&["noisy"])));
        assert!(!filter.should_exclude(&record_with_tags(&["ui"])));
        assert!(!filter.should_exclude(&record_with_tags(&[])));
    }
}
