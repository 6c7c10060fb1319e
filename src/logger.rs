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

//! The dispatch core: level-gated record construction and fan-out.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::Weak;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::destination::Destination;
use crate::record::CallSite;
use crate::record::Level;
use crate::record::LevelFilter;
use crate::record::Record;
use crate::user_info::UserInfo;

/// Process metadata for the self-describing startup banner.
///
/// A narrow collaborator: the engine consumes it, the host may override it
/// with real release metadata via
/// [`log_app_details_with`](Logger::log_app_details_with).
#[derive(Debug, Clone)]
pub struct AppDetails {
    /// Short name of the running process.
    pub process_name: String,
    /// Marketing version, if the host knows one.
    pub version: Option<String>,
    /// Build number, if the host knows one.
    pub build: Option<String>,
    /// Operating system process id.
    pub pid: u32,
}

impl AppDetails {
    /// Derive details from the running process.
    pub fn detect() -> AppDetails {
        let process_name = std::env::current_exe()
            .ok()
            .and_then(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "unknown".to_string());
        AppDetails {
            process_name,
            version: None,
            build: None,
            pid: std::process::id(),
        }
    }
}

/// The owning half of the engine: an ordered collection of destinations and
/// the level-gated dispatch over them.
///
/// `Logger` is a cheap-clone handle; clones share the same destination list.
/// There is no process-wide default instance: construct one at startup, pass
/// it around (or register it in [`registry`](crate::registry)), and call the
/// leveled methods or macros on it.
#[derive(Clone, Debug)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

#[derive(Debug)]
struct LoggerInner {
    identifier: String,
    output_level: AtomicUsize,
    destinations: RwLock<Vec<Arc<dyn Destination>>>,
    level_descriptions: RwLock<BTreeMap<Level, String>>,
}

/// Non-owning back-reference from a destination to its logger.
///
/// Upgrading fails once the last user-held handle is gone, so a destination
/// can never extend its owner's lifetime.
#[derive(Clone, Default)]
pub(crate) struct OwnerHandle {
    inner: Weak<LoggerInner>,
}

impl fmt::Debug for OwnerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerHandle").finish_non_exhaustive()
    }
}

impl OwnerHandle {
    pub(crate) fn new(logger: &Logger) -> OwnerHandle {
        OwnerHandle {
            inner: Arc::downgrade(&logger.inner),
        }
    }

    pub(crate) fn logger(&self) -> Option<Logger> {
        self.inner.upgrade().map(|inner| Logger { inner })
    }
}

impl Logger {
    /// Creates a logger with no destinations and a `Debug` default level.
    pub fn new(identifier: impl Into<String>) -> Logger {
        Logger {
            inner: Arc::new(LoggerInner {
                identifier: identifier.into(),
                output_level: AtomicUsize::new(LevelFilter::Debug as usize),
                destinations: RwLock::new(Vec::new()),
                level_descriptions: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    /// Identifier for this logger.
    pub fn identifier(&self) -> &str {
        &self.inner.identifier
    }

    /// The level last cascaded onto the destinations.
    pub fn output_level(&self) -> LevelFilter {
        LevelFilter::from_ordinal(self.inner.output_level.load(Ordering::Relaxed))
    }

    /// Set the logger level and cascade it synchronously onto every
    /// registered destination. Per-destination overrides made after this call
    /// persist until the next cascade.
    pub fn set_output_level(&self, level: LevelFilter) {
        self.inner
            .output_level
            .store(level as usize, Ordering::Relaxed);
        for destination in self.destinations() {
            destination.set_output_level(level);
        }
    }

    /// Overrides the display text of a level for every destination that does
    /// not override it itself.
    pub fn set_level_description(&self, level: Level, description: impl Into<String>) {
        self.inner
            .level_descriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(level, description.into());
    }

    pub(crate) fn level_description(&self, level: Level) -> Option<String> {
        self.inner
            .level_descriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&level)
            .cloned()
    }

    /// Register a destination.
    ///
    /// Returns `false` without mutating the logger when a destination with
    /// the same identifier is already registered. On success the destination
    /// is bound to this logger first (file sinks open here), then appended,
    /// preserving registration order for dispatch.
    pub fn add(&self, destination: Arc<dyn Destination>) -> bool {
        if self.destination(destination.identifier()).is_some() {
            return false;
        }

        destination.attach(self);

        let mut destinations = self
            .inner
            .destinations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if destinations
            .iter()
            .any(|existing| existing.identifier() == destination.identifier())
        {
            return false;
        }
        destinations.push(destination);
        true
    }

    /// Remove the destination with the given identifier; a no-op if absent.
    pub fn remove(&self, identifier: &str) {
        self.inner
            .destinations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|destination| destination.identifier() != identifier);
    }

    /// Look up a registered destination by identifier.
    pub fn destination(&self, identifier: &str) -> Option<Arc<dyn Destination>> {
        self.inner
            .destinations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|destination| destination.identifier() == identifier)
            .cloned()
    }

    /// A snapshot of the registered destinations in registration order.
    ///
    /// Dispatch iterates snapshots, never the live list, so `add`/`remove`
    /// from other threads cannot deadlock against in-flight records.
    pub fn destinations(&self) -> Vec<Arc<dyn Destination>> {
        self.inner
            .destinations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether at least one registered destination accepts `level`.
    pub fn is_enabled_for(&self, level: Level) -> bool {
        self.destinations()
            .iter()
            .any(|destination| destination.is_enabled_for(level))
    }

    /// Log lazily at `level`.
    ///
    /// `producer` runs at most once, and not at all unless some destination
    /// accepts the level; returning `None` suppresses the whole record.
    #[track_caller]
    pub fn log<F>(&self, level: Level, producer: F)
    where
        F: FnOnce() -> Option<String>,
    {
        self.log_with(level, CallSite::caller(), UserInfo::new(), producer)
    }

    /// Log lazily with an explicit call site and annotations.
    ///
    /// One record is constructed on the first enabled destination and shared
    /// by reference with every other enabled destination, in registration
    /// order.
    pub fn log_with<F>(&self, level: Level, site: CallSite, user_info: UserInfo, producer: F)
    where
        F: FnOnce() -> Option<String>,
    {
        let destinations = self.destinations();

        let mut producer = Some(producer);
        let mut pending_info = Some(user_info);
        let mut record: Option<Record> = None;
        for destination in &destinations {
            if !destination.is_enabled_for(level) {
                continue;
            }

            if record.is_none() {
                let Some(producer) = producer.take() else {
                    break;
                };
                let Some(message) = producer() else {
                    break;
                };
                let info = pending_info.take().unwrap_or_default();
                record = Some(Record::new(level, message, site, info));
            }

            if let Some(record) = &record {
                destination.process(record);
            }
        }
    }

    /// Dispatch a pre-built record to every enabled destination.
    pub(crate) fn dispatch(&self, record: &Record) {
        for destination in self.destinations() {
            if destination.is_enabled_for(record.level()) {
                destination.process(record);
            }
        }
    }

    /// Run `block` only when `level` is currently enabled; for expensive
    /// side-effect-only diagnostics.
    pub fn exec(&self, level: Level, block: impl FnOnce()) {
        if self.is_enabled_for(level) {
            block();
        }
    }

    /// Log something at the Verbose log level.
    #[track_caller]
    pub fn verbose<F>(&self, producer: F)
    where
        F: FnOnce() -> Option<String>,
    {
        self.log_with(Level::Verbose, CallSite::caller(), UserInfo::new(), producer)
    }

    /// Log something at the Debug log level.
    #[track_caller]
    pub fn debug<F>(&self, producer: F)
    where
        F: FnOnce() -> Option<String>,
    {
        self.log_with(Level::Debug, CallSite::caller(), UserInfo::new(), producer)
    }

    /// Log something at the Info log level.
    #[track_caller]
    pub fn info<F>(&self, producer: F)
    where
        F: FnOnce() -> Option<String>,
    {
        self.log_with(Level::Info, CallSite::caller(), UserInfo::new(), producer)
    }

    /// Log something at the Warning log level.
    #[track_caller]
    pub fn warning<F>(&self, producer: F)
    where
        F: FnOnce() -> Option<String>,
    {
        self.log_with(Level::Warning, CallSite::caller(), UserInfo::new(), producer)
    }

    /// Log something at the Error log level.
    #[track_caller]
    pub fn error<F>(&self, producer: F)
    where
        F: FnOnce() -> Option<String>,
    {
        self.log_with(Level::Error, CallSite::caller(), UserInfo::new(), producer)
    }

    /// Log something at the Severe log level.
    #[track_caller]
    pub fn severe<F>(&self, producer: F)
    where
        F: FnOnce() -> Option<String>,
    {
        self.log_with(Level::Severe, CallSite::caller(), UserInfo::new(), producer)
    }

    /// The internal diagnostic path: fan a self-diagnostic message out to
    /// every enabled destination without call-site decoration.
    pub(crate) fn internal_log(&self, level: Level, message: String) {
        let record = Record::internal(level, message);
        for destination in self.destinations() {
            if destination.is_enabled_for(level) {
                destination.process_internal(&record);
            }
        }
    }

    /// Emit the self-describing startup banner (process name, version, PID,
    /// engine version and level) through the internal path.
    pub fn log_app_details(&self) {
        self.log_app_details_with(&AppDetails::detect());
    }

    /// Emit the startup banner from host-supplied details.
    pub fn log_app_details_with(&self, details: &AppDetails) {
        for line in self.app_details_lines(details) {
            self.internal_log(Level::Info, line);
        }
    }

    /// Replay the banner to a single destination, e.g. the head of a freshly
    /// opened log file.
    pub(crate) fn log_app_details_for(&self, destination: &dyn Destination) {
        if !destination.is_enabled_for(Level::Info) {
            return;
        }
        for line in self.app_details_lines(&AppDetails::detect()) {
            destination.process_internal(&Record::internal(Level::Info, line));
        }
    }

    fn app_details_lines(&self, details: &AppDetails) -> Vec<String> {
        let mut build_string = String::new();
        if let Some(version) = &details.version {
            build_string.push_str("Version: ");
            build_string.push_str(version);
            build_string.push(' ');
        }
        if let Some(build) = &details.build {
            build_string.push_str("Build: ");
            build_string.push_str(build);
            build_string.push(' ');
        }

        vec![
            format!(
                "{} {}PID: {}",
                details.process_name, build_string, details.pid
            ),
            format!(
                "{} Version: {} - Level: {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                self.output_level()
            ),
        ]
    }

    /// Flush every destination.
    pub fn flush(&self) {
        for destination in self.destinations() {
            destination.flush();
        }
    }
}
