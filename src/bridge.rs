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

//! Bridge from the `log` facade into a [`Logger`].

use std::borrow::Cow;

use crate::logger::Logger;
use crate::record::Level;
use crate::record::Record;

fn level_from(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warning,
        log::Level::Info => Level::Info,
        log::Level::Debug => Level::Debug,
        log::Level::Trace => Level::Verbose,
    }
}

impl Logger {
    /// Install this logger as the global `log` facade backend, so
    /// `log::info!` and friends dispatch through it.
    pub fn install_global(self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.is_enabled_for(level_from(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        let level = level_from(record.level());
        if !self.is_enabled_for(level) {
            return;
        }

        let function: Cow<'static, str> = match record.module_path_static() {
            Some(path) => Cow::Borrowed(path),
            None => Cow::Owned(record.module_path().unwrap_or_default().to_owned()),
        };
        let file: Cow<'static, str> = match record.file_static() {
            Some(file) => Cow::Borrowed(file),
            None => Cow::Owned(record.file().unwrap_or_default().to_owned()),
        };

        // The facade evaluated its arguments already; no laziness to save.
        let translated = Record::builder()
            .level(level)
            .message(record.args().to_string())
            .function(function)
            .file(file)
            .line(record.line().unwrap_or_default())
            .build();
        self.dispatch(&translated);
    }

    fn flush(&self) {
        Logger::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use log::Log;

    use super::*;
    use crate::destination::Pipeline;
    use crate::destination::TestingDestination;
    use crate::record::LevelFilter;

    #[test]
    fn test_facade_records_dispatch() {
        let logger = Logger::new("bridged");
        let sink = Arc::new(TestingDestination::new(
            Pipeline::new("capture")
                .with_output_level(LevelFilter::Verbose)
                .show_date(false)
                .show_function_name(false),
        ));
        logger.add(sink.clone());

        Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("over the bridge"))
                .level(log::Level::Warn)
                .file_static(Some("src/caller.rs"))
                .line(Some(7))
                .module_path_static(Some("caller"))
                .build(),
        );

        assert_eq!(sink.lines(), vec!["[Warning] [caller.rs:7] > over the bridge"]);
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_from(log::Level::Trace), Level::Verbose);
        assert_eq!(level_from(log::Level::Debug), Level::Debug);
        assert_eq!(level_from(log::Level::Info), Level::Info);
        assert_eq!(level_from(log::Level::Warn), Level::Warning);
        assert_eq!(level_from(log::Level::Error), Level::Error);
    }
}
