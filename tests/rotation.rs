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

use std::sync::Arc;

use logward::LevelFilter;
use logward::Logger;
use logward::destination::AutoRotatingFileDestination;
use logward::destination::FileDestination;
use logward::destination::Pipeline;
use logward::destination::RotatingWriter;
use tempfile::TempDir;

fn quiet_pipeline(identifier: &str) -> Pipeline {
    Pipeline::new(identifier)
        .show_date(false)
        .show_file_name(false)
        .show_line_number(false)
        .show_function_name(false)
        .with_output_level(LevelFilter::Error)
}

fn rotating(identifier: &str, path: &std::path::Path, max_size: u64) -> Arc<AutoRotatingFileDestination> {
    let writer = RotatingWriter::builder()
        .should_append(true)
        .append_marker(None)
        .target_max_file_size(max_size)
        .target_max_time_interval(86_400)
        .build(path);
    Arc::new(AutoRotatingFileDestination::new(
        quiet_pipeline(identifier),
        writer,
    ))
}

#[test]
fn test_append_marker_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("restart.log");

    {
        let logger = Logger::new("run-one");
        let destination = Arc::new(
            FileDestination::new(quiet_pipeline("file"), &path).should_append(true),
        );
        assert!(logger.add(destination));
        logger.error(|| Some("from the first run".to_string()));
        logger.flush();
    }

    {
        let logger = Logger::new("run-two");
        let destination = Arc::new(
            FileDestination::new(quiet_pipeline("file"), &path).should_append(true),
        );
        assert!(logger.add(destination));
        logger.error(|| Some("from the second run".to_string()));
        logger.flush();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    let first = contents.find("from the first run").unwrap();
    let marker = contents.find("-- ** ** ** --").unwrap();
    let second = contents.find("from the second run").unwrap();
    assert!(first < marker && marker < second);
}

#[test]
fn test_restart_seeds_size_and_rotates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seeded.log");

    {
        let logger = Logger::new("run-one");
        let destination = rotating("seeded", &path, 1_000_000);
        assert!(logger.add(destination.clone()));
        logger.error(|| Some("x".repeat(200)));
        logger.flush();
        assert!(destination.archived_file_paths().is_empty());
    }

    // The second run finds a 201-byte file against a 100-byte target: the
    // reconciled size triggers rotation at open, before any new write.
    {
        let logger = Logger::new("run-two");
        let destination = rotating("seeded", &path, 100);
        assert!(logger.add(destination.clone()));

        let archives = destination.archived_file_paths();
        assert_eq!(archives.len(), 1);
        assert_eq!(
            std::fs::read_to_string(&archives[0]).unwrap().len(),
            201
        );
        assert_eq!(destination.current_log_file_size(), 0);

        logger.error(|| Some("fresh".to_string()));
        destination.flush();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }
}

#[test]
fn test_archives_are_scoped_to_their_destination() {
    let dir = TempDir::new().unwrap();

    let first = rotating("first", &dir.path().join("first.log"), 10);
    let second = rotating("second", &dir.path().join("second.log"), 10);

    let logger = Logger::new("shared-folder");
    assert!(logger.add(first.clone()));
    assert!(logger.add(second.clone()));

    // Both cross their size target once and rotate into the shared folder.
    logger.error(|| Some("0123456789abcdef".to_string()));
    logger.flush();

    assert_eq!(first.archived_file_paths().len(), 1);
    assert_eq!(second.archived_file_paths().len(), 1);

    // Purging one owner leaves the other's archive alone.
    first.purge_archived_log_files();
    assert!(first.archived_file_paths().is_empty());
    assert_eq!(second.archived_file_paths().len(), 1);
}
