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

//! Destination forwarding log records to the system log.

use std::io;
use std::sync::Arc;
use std::sync::Mutex;

use fasyslog::sender::SyslogSender;

use crate::destination::Destination;
use crate::destination::Pipeline;
use crate::destination::lock_ignore_poison;
use crate::queue::DeliveryQueue;
use crate::record::Level;
use crate::record::Record;

// re-exports to avoid version conflicts
mod exported {
    pub use fasyslog::format::SyslogContext;
}
pub use exported::*;

/// The wire format of the syslog message.
#[derive(Debug, Copy, Clone)]
pub enum SyslogFormat {
    /// [RFC 3164] (BSD syslog Protocol)
    ///
    /// [RFC 3164]: https://datatracker.ietf.org/doc/html/rfc3164
    RFC3164,
    /// [RFC 5424] (The Syslog Protocol)
    ///
    /// [RFC 5424]: https://datatracker.ietf.org/doc/html/rfc5424
    RFC5424,
}

/// A destination that sends decorated records to a syslog daemon.
///
/// Send failures are reported to stderr, never to the logging caller.
#[derive(Debug)]
pub struct SyslogDestination {
    pipeline: Arc<Pipeline>,
    sender: Arc<Mutex<SyslogSender>>,
    context: SyslogContext,
    format: SyslogFormat,
    queue: Option<DeliveryQueue>,
}

impl SyslogDestination {
    /// Creates a syslog destination over an already-connected sender.
    pub fn new(pipeline: Pipeline, sender: SyslogSender) -> SyslogDestination {
        SyslogDestination {
            pipeline: Arc::new(pipeline),
            sender: Arc::new(Mutex::new(sender)),
            context: SyslogContext::default(),
            format: SyslogFormat::RFC3164,
            queue: None,
        }
    }

    /// Connects to the well-known local TCP port (514).
    pub fn tcp_well_known(pipeline: Pipeline) -> io::Result<SyslogDestination> {
        fasyslog::sender::tcp_well_known()
            .map(|sender| Self::new(pipeline, SyslogSender::Tcp(sender)))
    }

    /// Connects to the given TCP address.
    pub fn tcp<A: std::net::ToSocketAddrs>(
        pipeline: Pipeline,
        addr: A,
    ) -> io::Result<SyslogDestination> {
        fasyslog::sender::tcp(addr).map(|sender| Self::new(pipeline, SyslogSender::Tcp(sender)))
    }

    /// Connects to the well-known local UDP port (514).
    pub fn udp_well_known(pipeline: Pipeline) -> io::Result<SyslogDestination> {
        fasyslog::sender::udp_well_known()
            .map(|sender| Self::new(pipeline, SyslogSender::Udp(sender)))
    }

    /// Connects to the given Unix socket, choosing stream or datagram by the
    /// socket type.
    #[cfg(unix)]
    pub fn unix(
        pipeline: Pipeline,
        path: impl AsRef<std::path::Path>,
    ) -> io::Result<SyslogDestination> {
        fasyslog::sender::unix(path).map(|sender| Self::new(pipeline, sender))
    }

    /// Sets the wire format.
    pub fn with_format(mut self, format: SyslogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the syslog context (facility, hostname, app name, ...).
    pub fn with_context(mut self, context: SyslogContext) -> Self {
        self.context = context;
        self
    }

    /// Deliver through the given queue instead of the caller's thread.
    pub fn with_queue(mut self, queue: DeliveryQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    fn send(sender: &Mutex<SyslogSender>, line: String) {
        let mut sender = lock_ignore_poison(sender);
        if let Err(err) = sender.send_formatted(line.as_bytes()) {
            eprintln!("failed to send log record to syslog: {err}");
        }
    }
}

fn severity(level: Level) -> fasyslog::Severity {
    match level {
        Level::Verbose => fasyslog::Severity::DEBUG,
        Level::Debug => fasyslog::Severity::DEBUG,
        Level::Info => fasyslog::Severity::INFORMATIONAL,
        Level::Warning => fasyslog::Severity::WARNING,
        Level::Error => fasyslog::Severity::ERROR,
        Level::Severe => fasyslog::Severity::CRITICAL,
    }
}

impl Destination for SyslogDestination {
    fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn output(&self, record: &Record, message: String) {
        let severity = severity(record.level());
        let line = match self.format {
            SyslogFormat::RFC3164 => {
                format!("{}", self.context.format_rfc3164(severity, Some(message)))
            }
            SyslogFormat::RFC5424 => {
                const EMPTY_MSGID: Option<&str> = None;
                const EMPTY_STRUCTURED_DATA: Vec<fasyslog::SDElement> = Vec::new();
                format!(
                    "{}",
                    self.context.format_rfc5424(
                        severity,
                        EMPTY_MSGID,
                        EMPTY_STRUCTURED_DATA,
                        Some(message)
                    )
                )
            }
        };

        match &self.queue {
            Some(queue) => {
                let sender = Arc::clone(&self.sender);
                queue.dispatch(move || Self::send(&sender, line));
            }
            None => Self::send(&self.sender, line),
        }
    }

    fn flush(&self) {
        if let Some(queue) = &self.queue {
            queue.flush();
        }
        let mut sender = lock_ignore_poison(&self.sender);
        if let Err(err) = sender.flush() {
            eprintln!("failed to flush syslog sender: {err}");
        }
    }
}
