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

//! Leveled logging macros.
//!
//! The macros capture module path, file, and line at the call site and wrap
//! the format arguments in a producer closure, so the formatting runs only
//! when some destination accepts the level.

/// Log at an explicit level:
/// `log!(logger, Level::Warning, "disk {}% full", pct)`.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_with(
            $level,
            $crate::CallSite::new(module_path!(), file!(), line!()),
            $crate::UserInfo::new(),
            || Some(format!($($arg)+)),
        )
    };
}

/// Log at the Verbose level.
#[macro_export]
macro_rules! verbose {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Verbose, $($arg)+)
    };
}

/// Log at the Debug level.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log at the Info level.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log at the Warning level.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warning, $($arg)+)
    };
}

/// Log at the Error level.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log at the Severe level.
#[macro_export]
macro_rules! severe {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Severe, $($arg)+)
    };
}
