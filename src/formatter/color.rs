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

use colored::Color;
use colored::Colorize;

use crate::formatter::Formatter;
use crate::record::Level;
use crate::record::Record;

/// Customize the display color of each log level.
#[derive(Debug, Clone)]
pub struct LevelColors {
    pub verbose: Color,
    pub debug: Color,
    pub info: Color,
    pub warning: Color,
    pub error: Color,
    pub severe: Color,
}

impl Default for LevelColors {
    fn default() -> Self {
        Self {
            verbose: Color::BrightBlack,
            debug: Color::Blue,
            info: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            severe: Color::BrightRed,
        }
    }
}

impl LevelColors {
    fn color_for(&self, level: Level) -> Color {
        match level {
            Level::Verbose => self.verbose,
            Level::Debug => self.debug,
            Level::Info => self.info,
            Level::Warning => self.warning,
            Level::Error => self.error,
            Level::Severe => self.severe,
        }
    }
}

/// A formatter wrapping the whole message in an ANSI color per level.
///
/// The level→color table is configuration consulted here; override it with
/// [`with_colors`](AnsiColorFormatter::with_colors).
#[derive(Debug, Default)]
pub struct AnsiColorFormatter {
    colors: LevelColors,
}

impl AnsiColorFormatter {
    /// Creates a formatter with the default color table.
    pub fn new() -> AnsiColorFormatter {
        AnsiColorFormatter::default()
    }

    /// Sets the level→color table.
    pub fn with_colors(mut self, colors: LevelColors) -> Self {
        self.colors = colors;
        self
    }
}

impl Formatter for AnsiColorFormatter {
    fn apply(&self, record: &Record, message: &mut String) {
        let color = self.colors.color_for(record.level());
        *message = message.as_str().color(color).to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_message_keeps_its_text() {
        // Whether escape codes are emitted depends on the terminal; the text
        // itself must survive either way.
        let record = Record::builder().level(Level::Error).message("m").build();
        let formatter = AnsiColorFormatter::new();

        let mut message = String::from("colored body");
        formatter.apply(&record, &mut message);
        assert!(message.contains("colored body"));
    }
}
