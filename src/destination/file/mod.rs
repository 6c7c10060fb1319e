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

//! Destination writing log records to a single file.

pub use self::writer::FileWriter;

mod writer;

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use crate::destination::Destination;
use crate::destination::Pipeline;
use crate::destination::lock_ignore_poison;
use crate::destination::report_notices;
use crate::logger::Logger;
use crate::queue::DeliveryQueue;
use crate::record::Level;
use crate::record::Record;

/// A destination that appends log records to a file.
///
/// The file is opened when the destination is registered with a logger, so
/// open failures are reported through the owner's diagnostic path; a
/// destination whose open failed degrades to a silent no-op sink.
#[derive(Debug)]
pub struct FileDestination {
    pipeline: Arc<Pipeline>,
    writer: Arc<Mutex<FileWriter>>,
    queue: Option<DeliveryQueue>,
}

impl FileDestination {
    /// Default marker written where an append picked up after a restart.
    pub const DEFAULT_APPEND_MARKER: &'static str = "-- ** ** ** --";

    /// Creates a file destination that truncates the target on open.
    pub fn new(pipeline: Pipeline, path: impl Into<PathBuf>) -> FileDestination {
        FileDestination {
            pipeline: Arc::new(pipeline),
            writer: Arc::new(Mutex::new(FileWriter::new(path, false, None))),
            queue: None,
        }
    }

    /// Append to a pre-existing file instead of truncating it, writing the
    /// default append marker at the seam.
    pub fn should_append(self, should_append: bool) -> Self {
        let marker = should_append.then(|| Self::DEFAULT_APPEND_MARKER.to_string());
        self.configure_writer(should_append, marker)
    }

    /// Append to a pre-existing file, writing `marker` at the seam; `None`
    /// suppresses the marker line.
    pub fn append_with_marker(self, marker: Option<String>) -> Self {
        self.configure_writer(true, marker)
    }

    fn configure_writer(self, should_append: bool, marker: Option<String>) -> Self {
        {
            let mut writer = lock_ignore_poison(&self.writer);
            let path = writer.path().to_path_buf();
            *writer = FileWriter::new(path, should_append, marker);
        }
        self
    }

    /// Deliver through the given queue instead of the caller's thread.
    pub fn with_queue(mut self, queue: DeliveryQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// The path the destination writes to.
    pub fn path(&self) -> PathBuf {
        lock_ignore_poison(&self.writer).path().to_path_buf()
    }

    /// Retarget the destination to a new file, closing the current handle
    /// first and opening the new path immediately.
    pub fn set_path(&self, path: impl Into<PathBuf>) {
        if let Some(queue) = &self.queue {
            queue.flush();
        }
        {
            let mut writer = lock_ignore_poison(&self.writer);
            writer.set_path(path);
        }
        self.open_and_report();
    }

    /// Move the live file to `archive` and continue writing to a fresh file.
    ///
    /// Returns `false` (leaving the live file open and appendable) when the
    /// archive path already exists or the source cannot be resolved.
    pub fn rotate_file(&self, archive: impl AsRef<Path>) -> bool {
        let archive = archive.as_ref();
        if let Some(queue) = &self.queue {
            queue.flush();
        }

        let (rotated, notices) = {
            let mut writer = lock_ignore_poison(&self.writer);
            let from = writer.path().display().to_string();
            match writer.rotate_file(archive) {
                Ok(()) => {
                    let mut notices = vec![(
                        Level::Info,
                        format!("Rotated log file {from} to {}", archive.display()),
                    )];
                    if !writer.is_open() {
                        notices.push((
                            Level::Error,
                            format!("Failed to reopen log file after rotating {from}"),
                        ));
                    }
                    (true, notices)
                }
                Err(err) => (
                    false,
                    vec![(
                        Level::Error,
                        format!("Unable to rotate log file {from} to {}: {err}", archive.display()),
                    )],
                ),
            }
        };

        report_notices(self, notices);
        rotated
    }

    fn open_and_report(&self) {
        let notices = {
            let mut writer = lock_ignore_poison(&self.writer);
            let mode = if writer.should_append() && writer.path().exists() {
                "appending"
            } else {
                "writing"
            };
            match writer.open_file() {
                Ok(appended) => {
                    let mode = if appended { "Appending" } else { "Writing" };
                    vec![(
                        Level::Info,
                        format!("{mode} log to: {}", writer.path().display()),
                    )]
                }
                Err(err) => vec![(
                    Level::Error,
                    format!("Attempt to open log file for {mode} failed: {err}"),
                )],
            }
        };

        if let Some(owner) = self.pipeline.owner() {
            owner.log_app_details_for(self);
        }
        report_notices(self, notices);
    }
}

pub(crate) fn write_or_degrade(
    writer: &Mutex<FileWriter>,
    pipeline: &Pipeline,
    message: &str,
) {
    let failure = {
        let mut writer = lock_ignore_poison(writer);
        match writer.write_line(message) {
            Ok(()) => None,
            Err(err) => {
                // Drop the handle so the destination degrades to a no-op sink
                // instead of failing every subsequent record.
                writer.close_file();
                Some(format!(
                    "Failed to write log file {}: {err}",
                    writer.path().display()
                ))
            }
        }
    };
    if let Some(message) = failure {
        pipeline.diag(Level::Error, message);
    }
}

impl Destination for FileDestination {
    fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn attach(&self, owner: &Logger) {
        self.pipeline.attach(owner);
        self.open_and_report();
    }

    fn output(&self, _record: &Record, message: String) {
        match &self.queue {
            Some(queue) => {
                let writer = Arc::clone(&self.writer);
                let pipeline = Arc::clone(&self.pipeline);
                queue.dispatch(move || write_or_degrade(&writer, &pipeline, &message));
            }
            None => write_or_degrade(&self.writer, &self.pipeline, &message),
        }
    }

    fn flush(&self) {
        if let Some(queue) = &self.queue {
            queue.flush();
        }
        let _ = lock_ignore_poison(&self.writer).flush();
    }
}
