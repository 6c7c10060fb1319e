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

//! Log record, severity levels, and call-site metadata.

use std::borrow::Cow;
use std::cmp;
use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use jiff::Timestamp;

use crate::user_info::UserInfo;

/// An enum representing the available severity levels of a log record.
///
/// Levels are ordered by increasing severity: `Verbose` is the chattiest,
/// `Severe` the most serious.
#[repr(usize)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Level {
    /// The "verbose" level.
    ///
    /// Designates extremely detailed tracing information.
    Verbose = 100,
    /// The "debug" level.
    ///
    /// Designates lower priority information.
    Debug = 200,
    /// The "info" level.
    ///
    /// Designates useful information.
    Info = 300,
    /// The "warning" level.
    ///
    /// Designates hazardous situations.
    Warning = 400,
    /// The "error" level.
    ///
    /// Designates serious errors.
    Error = 500,
    /// The "severe" level.
    ///
    /// Designates unrecoverable errors.
    Severe = 600,
}

impl Level {
    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Verbose => "Verbose",
            Level::Debug => "Debug",
            Level::Info => "Info",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Severe => "Severe",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// An enum representing the available output thresholds of a destination.
///
/// A record at level L is delivered when `L >= threshold`; `Off` is greater
/// than every level and thus never delivers.
#[repr(usize)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum LevelFilter {
    /// Corresponds to the `Verbose` log level.
    Verbose = 100,
    /// Corresponds to the `Debug` log level.
    Debug = 200,
    /// Corresponds to the `Info` log level.
    Info = 300,
    /// Corresponds to the `Warning` log level.
    Warning = 400,
    /// Corresponds to the `Error` log level.
    Error = 500,
    /// Corresponds to the `Severe` log level.
    Severe = 600,
    /// A threshold higher than all log levels.
    Off = 700,
}

impl LevelFilter {
    /// Return the string representation of the `LevelFilter`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelFilter::Verbose => "Verbose",
            LevelFilter::Debug => "Debug",
            LevelFilter::Info => "Info",
            LevelFilter::Warning => "Warning",
            LevelFilter::Error => "Error",
            LevelFilter::Severe => "Severe",
            LevelFilter::Off => "Off",
        }
    }

    pub(crate) fn from_ordinal(ordinal: usize) -> LevelFilter {
        match ordinal {
            100 => LevelFilter::Verbose,
            200 => LevelFilter::Debug,
            300 => LevelFilter::Info,
            400 => LevelFilter::Warning,
            500 => LevelFilter::Error,
            600 => LevelFilter::Severe,
            _ => LevelFilter::Off,
        }
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        match level {
            Level::Verbose => LevelFilter::Verbose,
            Level::Debug => LevelFilter::Debug,
            Level::Info => LevelFilter::Info,
            Level::Warning => LevelFilter::Warning,
            Level::Error => LevelFilter::Error,
            Level::Severe => LevelFilter::Severe,
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl PartialEq<LevelFilter> for Level {
    fn eq(&self, other: &LevelFilter) -> bool {
        PartialEq::eq(&(*self as usize), &(*other as usize))
    }
}

impl PartialOrd<LevelFilter> for Level {
    fn partial_cmp(&self, other: &LevelFilter) -> Option<cmp::Ordering> {
        Some(Ord::cmp(&(*self as usize), &(*other as usize)))
    }
}

impl PartialEq<Level> for LevelFilter {
    fn eq(&self, other: &Level) -> bool {
        other.eq(self)
    }
}

impl PartialOrd<Level> for LevelFilter {
    fn partial_cmp(&self, other: &Level) -> Option<cmp::Ordering> {
        Some(Ord::cmp(&(*self as usize), &(*other as usize)))
    }
}

/// The type returned by `from_str` when the string doesn't match any of the log levels.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ParseLevelError {}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("malformed log level")
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for (name, level) in [
            ("verbose", Level::Verbose),
            ("debug", Level::Debug),
            ("info", Level::Info),
            ("warning", Level::Warning),
            ("error", Level::Error),
            ("severe", Level::Severe),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(ParseLevelError {})
    }
}

impl FromStr for LevelFilter {
    type Err = ParseLevelError;
    fn from_str(s: &str) -> Result<LevelFilter, Self::Err> {
        for (name, level) in [
            ("verbose", LevelFilter::Verbose),
            ("debug", LevelFilter::Debug),
            ("info", LevelFilter::Info),
            ("warning", LevelFilter::Warning),
            ("error", LevelFilter::Error),
            ("severe", LevelFilter::Severe),
            ("off", LevelFilter::Off),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(ParseLevelError {})
    }
}

/// The call site a record was emitted from.
///
/// The per-level macros fill this in with `module_path!`/`file!`/`line!`; the
/// method call surface captures file and line via `#[track_caller]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallSite {
    /// Name of the enclosing module or function.
    pub function: &'static str,
    /// Source file the record was emitted from.
    pub file: &'static str,
    /// Line number within `file`.
    pub line: u32,
}

impl CallSite {
    /// A call site with no information, used by the internal diagnostic path.
    pub const EMPTY: CallSite = CallSite {
        function: "",
        file: "",
        line: 0,
    };

    /// Create a call site from explicit components.
    pub const fn new(function: &'static str, file: &'static str, line: u32) -> CallSite {
        CallSite {
            function,
            file,
            line,
        }
    }

    /// Capture the caller's file and line.
    ///
    /// The function name is not recoverable without a macro, so it is empty.
    #[track_caller]
    pub fn caller() -> CallSite {
        let location = Location::caller();
        CallSite {
            function: "",
            file: location.file(),
            line: location.line(),
        }
    }
}

/// One log event with its full context.
///
/// Immutable once constructed; a single `Record` is shared by reference across
/// all destinations of one dispatch.
#[derive(Clone, Debug)]
pub struct Record {
    level: Level,
    time: Timestamp,
    message: String,
    function: Cow<'static, str>,
    file: Cow<'static, str>,
    line: u32,
    user_info: UserInfo,
}

impl Record {
    /// Creates a new [`RecordBuilder`].
    #[must_use]
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    pub(crate) fn new(level: Level, message: String, site: CallSite, user_info: UserInfo) -> Record {
        Record {
            level,
            time: Timestamp::now(),
            message,
            function: Cow::Borrowed(site.function),
            file: Cow::Borrowed(site.file),
            line: site.line,
            user_info,
        }
    }

    pub(crate) fn internal(level: Level, message: String) -> Record {
        Record::new(level, message, CallSite::EMPTY, UserInfo::internal())
    }

    /// The severity of the record.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The observed time.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// The message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The name of the function (or module) that emitted the record.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// The source file that emitted the record.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The line within [`file`](Record::file) that emitted the record.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The tag/annotation multimap attached to the record.
    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                level: Level::Debug,
                time: Timestamp::now(),
                message: String::new(),
                function: Cow::Borrowed(""),
                file: Cow::Borrowed(""),
                line: 0,
                user_info: UserInfo::new(),
            },
        }
    }
}

impl RecordBuilder {
    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`time`](Record::time).
    pub fn time(mut self, time: Timestamp) -> Self {
        self.record.time = time;
        self
    }

    /// Set [`message`](Record::message).
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.record.message = message.into();
        self
    }

    /// Set [`function`](Record::function).
    pub fn function(mut self, function: impl Into<Cow<'static, str>>) -> Self {
        self.record.function = function.into();
        self
    }

    /// Set [`file`](Record::file).
    pub fn file(mut self, file: impl Into<Cow<'static, str>>) -> Self {
        self.record.file = file.into();
        self
    }

    /// Set [`line`](Record::line).
    pub fn line(mut self, line: u32) -> Self {
        self.record.line = line;
        self
    }

    /// Set [`user_info`](Record::user_info).
    pub fn user_info(mut self, user_info: UserInfo) -> Self {
        self.record.user_info = user_info;
        self
    }

    /// Invoke the builder and return a `Record`.
    pub fn build(self) -> Record {
        self.record
    }
}
