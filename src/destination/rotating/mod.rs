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

//! Destination writing to a file that rotates itself by size and age.

pub use self::writer::RotatingWriter;
pub use self::writer::RotatingWriterBuilder;

mod archive;
mod clock;
mod writer;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use crate::destination::Destination;
use crate::destination::Pipeline;
use crate::destination::lock_ignore_poison;
use crate::destination::report_notices;
use crate::logger::Logger;
use crate::queue::DeliveryQueue;
use crate::record::Record;

/// A file destination that rotates the live file to timestamped archives once
/// a size or age target is reached, and prunes old archives down to a
/// retention count.
///
/// The rotation policy lives in the embedded [`RotatingWriter`]; the
/// destination supplies the pipeline, delivery timing, and the diagnostic
/// reporting. The file opens when the destination is registered with a
/// logger.
#[derive(Debug)]
pub struct AutoRotatingFileDestination {
    pipeline: Arc<Pipeline>,
    writer: Arc<Mutex<RotatingWriter>>,
    queue: Option<DeliveryQueue>,
}

impl AutoRotatingFileDestination {
    /// Creates a destination around a configured rotating writer.
    ///
    /// Archives are tagged with the pipeline's identifier regardless of what
    /// the writer's builder was told, so ownership scoping follows the
    /// destination identity.
    pub fn new(pipeline: Pipeline, mut writer: RotatingWriter) -> AutoRotatingFileDestination {
        writer.set_identifier(pipeline.identifier());
        AutoRotatingFileDestination {
            pipeline: Arc::new(pipeline),
            writer: Arc::new(Mutex::new(writer)),
            queue: None,
        }
    }

    /// Deliver through the given queue instead of the caller's thread.
    pub fn with_queue(mut self, queue: DeliveryQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// The path of the live log file.
    pub fn path(&self) -> PathBuf {
        lock_ignore_poison(&self.writer).path().to_path_buf()
    }

    /// The owned archives, newest first.
    pub fn archived_file_paths(&self) -> Vec<PathBuf> {
        lock_ignore_poison(&self.writer).archived_file_paths()
    }

    /// Byte count of the live file as tracked by the rotation policy.
    pub fn current_log_file_size(&self) -> u64 {
        lock_ignore_poison(&self.writer).current_log_file_size()
    }

    /// Replace the retention count; archives now beyond it are deleted at
    /// once rather than at the next rotation.
    pub fn set_target_max_log_files(&self, count: u32) {
        let notices = {
            let mut writer = lock_ignore_poison(&self.writer);
            writer.set_target_max_log_files(count)
        };
        report_notices(self, notices);
    }

    /// Rotate the live file now, regardless of the targets.
    pub fn rotate_file(&self) -> bool {
        if let Some(queue) = &self.queue {
            queue.flush();
        }
        let (rotated, notices) = {
            let mut writer = lock_ignore_poison(&self.writer);
            let mut notices = Vec::new();
            let rotated = writer.rotate_with_notices(&mut notices);
            (rotated, notices)
        };
        report_notices(self, notices);
        rotated
    }

    /// Delete all owned archives.
    pub fn purge_archived_log_files(&self) {
        let notices = {
            let mut writer = lock_ignore_poison(&self.writer);
            writer.purge_archived_log_files()
        };
        report_notices(self, notices);
    }
}

impl Destination for AutoRotatingFileDestination {
    fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn attach(&self, owner: &Logger) {
        self.pipeline.attach(owner);
        let notices = {
            let mut writer = lock_ignore_poison(&self.writer);
            writer.open()
        };
        if let Some(owner) = self.pipeline.owner() {
            owner.log_app_details_for(self);
        }
        report_notices(self, notices);
    }

    fn output(&self, _record: &Record, message: String) {
        match &self.queue {
            Some(queue) => {
                let writer = Arc::clone(&self.writer);
                let pipeline = Arc::clone(&self.pipeline);
                queue.dispatch(move || deliver(&writer, &pipeline, &message));
            }
            None => deliver(&self.writer, &self.pipeline, &message),
        }
    }

    fn flush(&self) {
        if let Some(queue) = &self.queue {
            queue.flush();
        }
        let _ = lock_ignore_poison(&self.writer).flush();
    }
}

/// Write one line and apply the rotation policy, then report any notices once
/// the writer lock is released so an inline destination cannot re-enter its
/// own sink while holding it.
fn deliver(writer: &Mutex<RotatingWriter>, pipeline: &Pipeline, message: &str) {
    let notices = {
        let mut writer = lock_ignore_poison(writer);
        writer.write_line(message)
    };
    for (level, message) in notices {
        pipeline.diag(level, message);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use jiff::tz::TimeZone;
    use tempfile::TempDir;

    use super::*;
    use crate::logger::Logger;
    use crate::record::LevelFilter;

    // Thresholded above Info so the open notice and app-details banner do not
    // land in the file and skew byte counts.
    fn plain_pipeline(identifier: &str) -> Pipeline {
        Pipeline::new(identifier)
            .time_zone(TimeZone::UTC)
            .show_date(false)
            .show_level(false)
            .show_file_name(false)
            .show_line_number(false)
            .show_function_name(false)
            .with_output_level(LevelFilter::Error)
    }

    #[test]
    fn test_size_rotation_through_logger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.log");

        let writer = RotatingWriter::builder()
            .target_max_file_size(100)
            .target_max_time_interval(86_400)
            .build(&path);
        let destination = Arc::new(AutoRotatingFileDestination::new(
            plain_pipeline("rotating-e2e"),
            writer,
        ));

        let logger = Logger::new("engine");
        assert!(logger.add(destination.clone()));

        // Two 59-byte lines cross the 100-byte target exactly once.
        let payload = "p".repeat(58);
        logger.error(|| Some(payload.clone()));
        assert!(destination.archived_file_paths().is_empty());
        logger.error(|| Some(payload.clone()));

        let archives = destination.archived_file_paths();
        assert_eq!(archives.len(), 1);
        assert_eq!(destination.current_log_file_size(), 0);

        // Fresh live file keeps receiving records.
        logger.error(|| Some("after rotation".to_string()));
        destination.flush();
        assert!(
            fs::read_to_string(&path)
                .unwrap()
                .contains("after rotation")
        );
    }

    #[test]
    fn test_open_notice_lands_in_fresh_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noticed.log");

        let writer = RotatingWriter::builder().build(&path);
        let destination = Arc::new(AutoRotatingFileDestination::new(
            Pipeline::new("noticed")
                .show_file_name(false)
                .show_line_number(false)
                .show_function_name(false)
                .with_output_level(LevelFilter::Info),
            writer,
        ));

        let logger = Logger::new("engine");
        assert!(logger.add(destination.clone()));
        destination.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Writing log to:"), "got: {contents}");
    }

    #[test]
    fn test_runtime_retention_change_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pruned.log");

        let writer = RotatingWriter::builder()
            .target_max_file_size(10)
            .target_max_time_interval(86_400)
            .target_max_log_files(10)
            .build(&path);
        let destination = Arc::new(AutoRotatingFileDestination::new(
            plain_pipeline("pruned"),
            writer,
        ));

        let logger = Logger::new("engine");
        assert!(logger.add(destination.clone()));

        // Archive names have second granularity, so drive a single rotation
        // and assert the retention invariant rather than an exact count.
        logger.error(|| Some("0123456789abcdef".to_string()));
        destination.rotate_file();
        let before = destination.archived_file_paths().len();
        assert!(before >= 1);

        destination.set_target_max_log_files(0);
        assert!(destination.archived_file_paths().is_empty());
    }
}
