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

//! Output destinations for log records.

use std::fmt;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use jiff::tz::TimeZone;

pub use self::console::ConsoleDestination;
pub use self::console::ConsoleTarget;
pub use self::file::FileDestination;
pub use self::file::FileWriter;
#[cfg(feature = "network")]
pub use self::network::NetworkDestination;
pub use self::rotating::AutoRotatingFileDestination;
pub use self::rotating::RotatingWriter;
pub use self::rotating::RotatingWriterBuilder;
#[cfg(feature = "syslog")]
pub use self::syslog::SyslogDestination;
pub use self::testing::TestingDestination;

mod console;
mod file;
#[cfg(feature = "network")]
mod network;
mod rotating;
#[cfg(feature = "syslog")]
pub mod syslog;
mod testing;

use std::collections::BTreeMap;

use crate::filter::Filter;
use crate::formatter::Formatter;
use crate::logger::Logger;
use crate::logger::OwnerHandle;
use crate::record::Level;
use crate::record::LevelFilter;
use crate::record::Record;

/// A configured output sink for log records.
///
/// Implementations embed a [`Pipeline`] for the shared concerns (identifier,
/// threshold, filters, formatters, text decoration) and provide the sink
/// behavior in [`output`](Destination::output). The default `process` methods
/// wire the two together.
pub trait Destination: fmt::Debug + Send + Sync + 'static {
    /// The embedded pipeline.
    fn pipeline(&self) -> &Pipeline;

    /// Identifier for the destination, unique within one logger.
    fn identifier(&self) -> &str {
        self.pipeline().identifier()
    }

    /// The destination's output threshold.
    fn output_level(&self) -> LevelFilter {
        self.pipeline().output_level()
    }

    /// Replace the destination's output threshold.
    fn set_output_level(&self, level: LevelFilter) {
        self.pipeline().set_output_level(level)
    }

    /// Whether a record at `level` would be delivered here.
    fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.output_level()
    }

    /// Bind the destination to the logger registering it.
    ///
    /// Sinks that hold resources (file handles) acquire them here so failures
    /// can be reported through the owner's diagnostic path.
    fn attach(&self, owner: &Logger) {
        self.pipeline().attach(owner);
    }

    /// Run the record through the pipeline and deliver it.
    fn process(&self, record: &Record) {
        if let Some(message) = self.pipeline().prepare(record) {
            self.output(record, message);
        }
    }

    /// Deliver a self-diagnostic record, without call-site decoration and
    /// without filters or formatters.
    fn process_internal(&self, record: &Record) {
        if let Some(message) = self.pipeline().prepare_internal(record) {
            self.output(record, message);
        }
    }

    /// Deliver the decorated text to the sink, inline or via the
    /// destination's delivery queue.
    fn output(&self, record: &Record, message: String);

    /// Wait for pending deliveries and push them down to the sink.
    fn flush(&self) {}
}

pub(crate) fn lock_ignore_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Forward writer notices through the owner's diagnostic path; a destination
/// not yet registered with its owner additionally replays them to itself so
/// they land in its own sink (e.g. the head of a freshly opened log file).
pub(crate) fn report_notices(destination: &dyn Destination, notices: Vec<(Level, String)>) {
    if notices.is_empty() {
        return;
    }
    let owner = destination.pipeline().owner();
    let registered = owner
        .as_ref()
        .is_some_and(|owner| owner.destination(destination.identifier()).is_some());
    for (level, message) in notices {
        if !registered && destination.is_enabled_for(level) {
            destination.process_internal(&Record::internal(level, message.clone()));
        }
        if let Some(owner) = &owner {
            owner.internal_log(level, message);
        }
    }
}

/// The shared half of every destination: identity, threshold, filters,
/// formatters, and display options, plus the decorated-text construction.
///
/// Configure it with the builder-style methods before handing it to a
/// destination; only the output threshold may change afterwards (the logger
/// cascades onto it).
#[derive(Debug)]
pub struct Pipeline {
    identifier: String,
    output_level: AtomicUsize,
    filters: Vec<Box<dyn Filter>>,
    formatters: Vec<Box<dyn Formatter>>,
    level_descriptions: BTreeMap<Level, String>,
    show_date: bool,
    show_level: bool,
    show_identifier: bool,
    show_thread_name: bool,
    show_file_name: bool,
    show_line_number: bool,
    show_function_name: bool,
    date_format: String,
    time_zone: TimeZone,
    owner: RwLock<OwnerHandle>,
}

impl Pipeline {
    /// Creates a pipeline with the default display options: date, level,
    /// file:line, and function shown; identifier and thread name hidden.
    pub fn new(identifier: impl Into<String>) -> Pipeline {
        Pipeline {
            identifier: identifier.into(),
            output_level: AtomicUsize::new(LevelFilter::Debug as usize),
            filters: Vec::new(),
            formatters: Vec::new(),
            level_descriptions: BTreeMap::new(),
            show_date: true,
            show_level: true,
            show_identifier: false,
            show_thread_name: false,
            show_file_name: true,
            show_line_number: true,
            show_function_name: true,
            date_format: "%Y-%m-%d %H:%M:%S.%3f".to_string(),
            time_zone: TimeZone::system(),
            owner: RwLock::new(OwnerHandle::default()),
        }
    }

    /// Sets the output threshold.
    pub fn with_output_level(self, level: LevelFilter) -> Self {
        self.set_output_level(level);
        self
    }

    /// Appends a filter; filters run in the order they were added.
    pub fn filter(mut self, filter: impl Filter) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Appends a formatter; formatters run in the order they were added.
    pub fn formatter(mut self, formatter: impl Formatter) -> Self {
        self.formatters.push(Box::new(formatter));
        self
    }

    /// Overrides the display text of a level for this destination.
    pub fn level_description(mut self, level: Level, description: impl Into<String>) -> Self {
        self.level_descriptions.insert(level, description.into());
        self
    }

    /// Whether to show the record date.
    pub fn show_date(mut self, show: bool) -> Self {
        self.show_date = show;
        self
    }

    /// Whether to show the record level.
    pub fn show_level(mut self, show: bool) -> Self {
        self.show_level = show;
        self
    }

    /// Whether to show the owning logger's identifier.
    pub fn show_identifier(mut self, show: bool) -> Self {
        self.show_identifier = show;
        self
    }

    /// Whether to show the emitting thread's name.
    pub fn show_thread_name(mut self, show: bool) -> Self {
        self.show_thread_name = show;
        self
    }

    /// Whether to show the emitting file's name.
    pub fn show_file_name(mut self, show: bool) -> Self {
        self.show_file_name = show;
        self
    }

    /// Whether to show the emitting line number.
    pub fn show_line_number(mut self, show: bool) -> Self {
        self.show_line_number = show;
        self
    }

    /// Whether to show the emitting function's name.
    pub fn show_function_name(mut self, show: bool) -> Self {
        self.show_function_name = show;
        self
    }

    /// Sets the strftime format used for the date field.
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Sets the time zone the date field is rendered in.
    pub fn time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// The destination identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The current output threshold.
    pub fn output_level(&self) -> LevelFilter {
        LevelFilter::from_ordinal(self.output_level.load(Ordering::Relaxed))
    }

    /// Replace the output threshold.
    pub fn set_output_level(&self, level: LevelFilter) {
        self.output_level.store(level as usize, Ordering::Relaxed);
    }

    /// Whether a record at `level` passes the threshold.
    pub fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.output_level()
    }

    pub(crate) fn attach(&self, owner: &Logger) {
        *self.owner.write().unwrap_or_else(PoisonError::into_inner) = OwnerHandle::new(owner);
    }

    pub(crate) fn owner(&self) -> Option<Logger> {
        self.owner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .logger()
    }

    /// Report a self-diagnostic message through the owning logger.
    pub(crate) fn diag(&self, level: Level, message: impl Into<String>) {
        if let Some(owner) = self.owner() {
            owner.internal_log(level, message.into());
        }
    }

    /// Level gate, filters, decoration, formatters. `None` means the record
    /// is not delivered to this destination.
    pub fn prepare(&self, record: &Record) -> Option<String> {
        if !self.is_enabled_for(record.level()) {
            return None;
        }
        if self.filters.iter().any(|f| f.should_exclude(record)) {
            return None;
        }

        let mut message = self.build_message(record);
        for formatter in &self.formatters {
            formatter.apply(record, &mut message);
        }
        Some(message)
    }

    /// Level gate and internal decoration only; self-diagnostics bypass
    /// filters and formatters so a destination cannot suppress reports about
    /// itself.
    pub fn prepare_internal(&self, record: &Record) -> Option<String> {
        if !self.is_enabled_for(record.level()) {
            return None;
        }
        Some(self.build_internal_message(record))
    }

    /// Concatenate the enabled fields in fixed order, then `"> "` and the
    /// message body.
    pub fn build_message(&self, record: &Record) -> String {
        let mut text = String::new();

        if self.show_date {
            text.push_str(&self.format_time(record));
            text.push(' ');
        }

        if self.show_level {
            text.push('[');
            text.push_str(&self.describe_level(record.level()));
            text.push_str("] ");
        }

        if self.show_identifier {
            if let Some(owner) = self.owner() {
                text.push('[');
                text.push_str(owner.identifier());
                text.push_str("] ");
            }
        }

        if self.show_thread_name {
            let thread = std::thread::current();
            match thread.name() {
                Some(name) if !name.is_empty() => {
                    text.push('[');
                    text.push_str(name);
                    text.push_str("] ");
                }
                _ => {
                    text.push_str(&format!("[{:?}] ", thread.id()));
                }
            }
        }

        if self.show_file_name {
            text.push('[');
            text.push_str(short_file_name(record.file()));
            if self.show_line_number {
                text.push(':');
                text.push_str(&record.line().to_string());
            }
            text.push_str("] ");
        } else if self.show_line_number {
            text.push('[');
            text.push_str(&record.line().to_string());
            text.push_str("] ");
        }

        if self.show_function_name && !record.function().is_empty() {
            text.push_str(record.function());
            text.push(' ');
        }

        text.push_str("> ");
        text.push_str(record.message());
        text
    }

    /// Decoration for self-diagnostics: date, level, and identifier only.
    pub fn build_internal_message(&self, record: &Record) -> String {
        let mut text = String::new();

        if self.show_date {
            text.push_str(&self.format_time(record));
            text.push(' ');
        }

        if self.show_level {
            text.push('[');
            text.push_str(&self.describe_level(record.level()));
            text.push_str("] ");
        }

        if self.show_identifier {
            if let Some(owner) = self.owner() {
                text.push('[');
                text.push_str(owner.identifier());
                text.push_str("] ");
            }
        }

        text.push_str("> ");
        text.push_str(record.message());
        text
    }

    fn describe_level(&self, level: Level) -> String {
        if let Some(description) = self.level_descriptions.get(&level) {
            return description.clone();
        }
        if let Some(description) = self.owner().and_then(|owner| owner.level_description(level)) {
            return description;
        }
        level.as_str().to_string()
    }

    fn format_time(&self, record: &Record) -> String {
        let zoned = record.time().to_zoned(self.time_zone.clone());
        jiff::fmt::strtime::format(&self.date_format, &zoned)
            .unwrap_or_else(|_| record.time().to_string())
    }
}

fn short_file_name(file: &str) -> &str {
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use jiff::tz::TimeZone;

    use super::*;
    use crate::filter::CustomFilter;
    use crate::formatter::CustomFormatter;
    use crate::record::CallSite;

    fn epoch_record(level: Level) -> Record {
        Record::builder()
            .level(level)
            .time(Timestamp::UNIX_EPOCH)
            .message("hi")
            .function("f()")
            .file("some/dir/x.ext")
            .line(42)
            .build()
    }

    #[test]
    fn test_decoration_round_trip() {
        let pipeline = Pipeline::new("fixed")
            .time_zone(TimeZone::UTC)
            .show_line_number(false)
            .show_function_name(true);

        let message = pipeline.build_message(&epoch_record(Level::Debug));
        assert_eq!(message, "1970-01-01 00:00:00.000 [Debug] [x.ext] f() > hi");
    }

    #[test]
    fn test_decoration_with_line_number() {
        let pipeline = Pipeline::new("fixed").time_zone(TimeZone::UTC);
        let message = pipeline.build_message(&epoch_record(Level::Warning));
        assert_eq!(
            message,
            "1970-01-01 00:00:00.000 [Warning] [x.ext:42] f() > hi"
        );
    }

    #[test]
    fn test_decoration_line_number_only() {
        let pipeline = Pipeline::new("fixed")
            .time_zone(TimeZone::UTC)
            .show_date(false)
            .show_level(false)
            .show_file_name(false)
            .show_function_name(false);

        let message = pipeline.build_message(&epoch_record(Level::Info));
        assert_eq!(message, "[42] > hi");
    }

    #[test]
    fn test_internal_decoration_omits_call_site() {
        let pipeline = Pipeline::new("fixed").time_zone(TimeZone::UTC);
        let record = Record::builder()
            .level(Level::Info)
            .time(Timestamp::UNIX_EPOCH)
            .message("opened")
            .build();
        let message = pipeline.build_internal_message(&record);
        assert_eq!(message, "1970-01-01 00:00:00.000 [Info] > opened");
    }

    #[test]
    fn test_level_gate() {
        let pipeline = Pipeline::new("gated").with_output_level(LevelFilter::Error);
        assert!(pipeline.prepare(&epoch_record(Level::Debug)).is_none());
        assert!(pipeline.prepare(&epoch_record(Level::Error)).is_some());
        assert!(pipeline.prepare(&epoch_record(Level::Severe)).is_some());
    }

    #[test]
    fn test_monotonic_enablement() {
        let levels = [
            Level::Verbose,
            Level::Debug,
            Level::Info,
            Level::Warning,
            Level::Error,
            Level::Severe,
        ];
        let thresholds = [
            LevelFilter::Verbose,
            LevelFilter::Debug,
            LevelFilter::Info,
            LevelFilter::Warning,
            LevelFilter::Error,
            LevelFilter::Severe,
            LevelFilter::Off,
        ];

        for threshold in thresholds {
            let pipeline = Pipeline::new("gate").with_output_level(threshold);
            for level in levels {
                assert_eq!(
                    pipeline.is_enabled_for(level),
                    level as usize >= threshold as usize,
                    "level {level} against threshold {threshold}"
                );
            }
        }
    }

    #[test]
    fn test_filters_exclude_silently() {
        let pipeline = Pipeline::new("filtered")
            .filter(CustomFilter::new(|record| record.message().contains("drop")));

        let keep = Record::new(
            Level::Info,
            "keep this".to_string(),
            CallSite::EMPTY,
            Default::default(),
        );
        let drop = Record::new(
            Level::Info,
            "drop this".to_string(),
            CallSite::EMPTY,
            Default::default(),
        );

        assert!(pipeline.prepare(&keep).is_some());
        assert!(pipeline.prepare(&drop).is_none());
    }

    #[test]
    fn test_formatters_run_in_order() {
        let pipeline = Pipeline::new("formatted")
            .show_date(false)
            .show_level(false)
            .show_file_name(false)
            .show_line_number(false)
            .show_function_name(false)
            .formatter(CustomFormatter::new(|_, message| message.push_str(" one")))
            .formatter(CustomFormatter::new(|_, message| message.push_str(" two")));

        let record = Record::new(
            Level::Info,
            "m".to_string(),
            CallSite::EMPTY,
            Default::default(),
        );
        assert_eq!(pipeline.prepare(&record).as_deref(), Some("> m one two"));
    }

    #[test]
    fn test_level_description_override() {
        let pipeline = Pipeline::new("desc")
            .time_zone(TimeZone::UTC)
            .show_date(false)
            .show_file_name(false)
            .show_line_number(false)
            .show_function_name(false)
            .level_description(Level::Warning, "WARN");

        let message = pipeline.build_message(&epoch_record(Level::Warning));
        assert_eq!(message, "[WARN] > hi");
    }
}
