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

//! Typed annotation multimap attached to log records.

use std::collections::BTreeMap;

use serde::Serialize;

/// Key under which [`Tag`] names are stored.
pub const TAGS_KEY: &str = "tags";

/// Key under which [`Dev`] names are stored.
pub const DEVS_KEY: &str = "devs";

/// Key marking records produced by the engine's internal diagnostic path.
pub(crate) const INTERNAL_KEY: &str = "internal";

/// A multimap of `String` keys to ordered lists of `String` values.
///
/// Records carry a `UserInfo` so filters can match on tags or other
/// annotations. Merging is total: values of the right-hand side are appended
/// after the left-hand side's values for the same key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserInfo {
    entries: BTreeMap<String, Vec<String>>,
}

impl UserInfo {
    /// Creates an empty `UserInfo`.
    pub fn new() -> UserInfo {
        UserInfo::default()
    }

    pub(crate) fn internal() -> UserInfo {
        UserInfo::new().with(INTERNAL_KEY, "true")
    }

    /// Appends a value under the given key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// Builder-style [`insert`](UserInfo::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> UserInfo {
        self.insert(key, value);
        self
    }

    /// The values recorded under the given key, in insertion order.
    pub fn values(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether the given value appears under the given key.
    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.values(key).iter().any(|v| v == value)
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge two maps into one.
    ///
    /// Total for any pair of inputs: keys of both sides are kept, and when a
    /// key appears on both sides the right-hand values are appended after the
    /// left-hand values.
    pub fn merge(mut self, other: UserInfo) -> UserInfo {
        for (key, values) in other.entries {
            self.entries.entry(key).or_default().extend(values);
        }
        self
    }

    /// Iterate over `(key, values)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Convenience constructor for tag annotations.
#[derive(Clone, Copy, Debug)]
pub struct Tag;

impl Tag {
    /// A `UserInfo` holding a single tag name.
    pub fn name(name: impl Into<String>) -> UserInfo {
        UserInfo::new().with(TAGS_KEY, name)
    }

    /// A `UserInfo` holding several tag names.
    pub fn names<I, S>(names: I) -> UserInfo
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut info = UserInfo::new();
        for name in names {
            info.insert(TAGS_KEY, name);
        }
        info
    }
}

/// Convenience constructor for developer annotations.
#[derive(Clone, Copy, Debug)]
pub struct Dev;

impl Dev {
    /// A `UserInfo` holding a single developer name.
    pub fn name(name: impl Into<String>) -> UserInfo {
        UserInfo::new().with(DEVS_KEY, name)
    }

    /// A `UserInfo` holding several developer names.
    pub fn names<I, S>(names: I) -> UserInfo
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut info = UserInfo::new();
        for name in names {
            info.insert(DEVS_KEY, name);
        }
        info
    }
}
