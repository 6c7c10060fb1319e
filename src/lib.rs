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

//! Logward is a structured logging engine: leveled records fan out to an
//! ordered set of destinations, each with its own threshold, filters,
//! formatters, and delivery timing.
//!
//! # Overview
//!
//! A [`Logger`] owns destinations. Message producers are closures that run at
//! most once, and not at all when no destination accepts the level. Console,
//! file, and auto-rotating file destinations are built in; the rotating
//! destination archives the live file by size and age and prunes archives to
//! a retention count.
//!
//! # Examples
//!
//! Console logging:
//!
//! ```
//! use logward::Logger;
//! use logward::destination::ConsoleDestination;
//! use logward::destination::Pipeline;
//! use std::sync::Arc;
//!
//! let logger = Logger::new("app");
//! logger.add(Arc::new(ConsoleDestination::new(Pipeline::new("console"))));
//!
//! logward::info!(logger, "starting up");
//! logger.debug(|| Some(format!("{} destinations", logger.destinations().len())));
//! ```
//!
//! An auto-rotating file destination with a delivery queue:
//!
//! ```no_run
//! use logward::Logger;
//! use logward::destination::AutoRotatingFileDestination;
//! use logward::destination::Pipeline;
//! use logward::destination::RotatingWriter;
//! use logward::queue::DeliveryQueue;
//! use std::sync::Arc;
//!
//! let writer = RotatingWriter::builder()
//!     .target_max_file_size(1024 * 1024)
//!     .target_max_time_interval(600)
//!     .target_max_log_files(10)
//!     .should_append(true)
//!     .build("logs/app.log");
//! let destination = AutoRotatingFileDestination::new(Pipeline::new("file"), writer)
//!     .with_queue(DeliveryQueue::new("app-file-log"));
//!
//! let logger = Logger::new("app");
//! logger.add(Arc::new(destination));
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod destination;
pub mod filter;
pub mod formatter;
pub mod queue;
pub mod registry;

pub use destination::Destination;
pub use filter::Filter;
pub use formatter::Formatter;

mod bridge;
mod error;
mod logger;
mod macros;
mod record;
mod user_info;

pub use error::RotationError;
pub use logger::AppDetails;
pub use logger::Logger;
pub use record::CallSite;
pub use record::Level;
pub use record::LevelFilter;
pub use record::ParseLevelError;
pub use record::Record;
pub use record::RecordBuilder;
pub use user_info::DEVS_KEY;
pub use user_info::Dev;
pub use user_info::TAGS_KEY;
pub use user_info::Tag;
pub use user_info::UserInfo;
