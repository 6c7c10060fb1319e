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

//! Per-destination delivery queues.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::SendTimeoutError;
use crossbeam_channel::Sender;
use crossbeam_channel::bounded;
use crossbeam_channel::unbounded;

enum Message {
    Task(Box<dyn FnOnce() + Send + 'static>),
    Shutdown,
}

/// A single-worker FIFO queue that runs output closures off the caller's
/// thread.
///
/// Each destination may own one. Tasks sent to the same queue run in enqueue
/// order on one dedicated thread; there is no ordering across queues, and no
/// cancellation: every enqueued task runs to completion.
///
/// Dropping the queue signals shutdown and gives the worker a bounded grace
/// period to drain; hosts that need stronger delivery guarantees should call
/// [`flush`](DeliveryQueue::flush) before exiting.
pub struct DeliveryQueue {
    sender: Sender<Message>,
    shutdown: Sender<()>,
    shutdown_timeout: Duration,
}

impl fmt::Debug for DeliveryQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryQueue").finish_non_exhaustive()
    }
}

impl DeliveryQueue {
    const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

    /// Creates a queue whose worker thread carries the given name.
    pub fn new(thread_name: impl Into<String>) -> DeliveryQueue {
        DeliveryQueue::with_shutdown_timeout(thread_name, Self::DEFAULT_SHUTDOWN_TIMEOUT)
    }

    /// Creates a queue with an explicit shutdown grace period.
    pub fn with_shutdown_timeout(
        thread_name: impl Into<String>,
        shutdown_timeout: Duration,
    ) -> DeliveryQueue {
        let (sender, receiver) = unbounded();
        let (shutdown_sender, shutdown_receiver) = bounded(0);

        run_worker(thread_name.into(), receiver, shutdown_receiver);

        DeliveryQueue {
            sender,
            shutdown: shutdown_sender,
            shutdown_timeout,
        }
    }

    /// Enqueue a task; returns immediately.
    pub fn dispatch(&self, task: impl FnOnce() + Send + 'static) {
        let _ = self.sender.send(Message::Task(Box::new(task)));
    }

    /// Block until every task enqueued before this call has run.
    pub fn flush(&self) {
        let (sender, receiver) = bounded(1);
        let barrier = move || {
            let _ = sender.send(());
        };
        if self.sender.send(Message::Task(Box::new(barrier))).is_ok() {
            let _ = receiver.recv_timeout(Duration::from_secs(5));
        }
    }
}

impl Drop for DeliveryQueue {
    fn drop(&mut self) {
        let shutdown_timeout = self.shutdown_timeout;
        match self
            .sender
            .send_timeout(Message::Shutdown, shutdown_timeout)
        {
            Ok(()) => {
                // Wait for the worker to finish pending tasks. The worker
                // receives on a zero-capacity channel, so this send completes
                // only once the worker reached its shutdown point. Use
                // `send_timeout` so that drop is not blocked indefinitely.
                let _ = self.shutdown.send_timeout((), shutdown_timeout);
            }
            Err(SendTimeoutError::Disconnected(_)) => (),
            Err(SendTimeoutError::Timeout(_)) => {
                eprintln!("failed to send shutdown signal to delivery queue worker");
            }
        }
    }
}

fn run_worker(name: String, receiver: Receiver<Message>, shutdown: Receiver<()>) {
    let worker = move || {
        loop {
            match receiver.recv() {
                Ok(Message::Task(task)) => task(),
                Ok(Message::Shutdown) | Err(_) => break,
            }
        }
        // Drain tasks that raced with the shutdown message.
        while let Ok(Message::Task(task)) = receiver.try_recv() {
            task();
        }
        let _ = shutdown.recv();
    };

    if let Err(err) = std::thread::Builder::new().name(name).spawn(worker) {
        eprintln!("failed to spawn the delivery queue worker thread: {err}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_tasks_run_in_enqueue_order() {
        let queue = DeliveryQueue::new("test-fifo");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..100 {
            let seen = Arc::clone(&seen);
            queue.dispatch(move || seen.lock().unwrap().push(i));
        }
        queue.flush();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_flush_is_a_barrier() {
        let queue = DeliveryQueue::new("test-flush");
        let done = Arc::new(Mutex::new(false));

        let flag = Arc::clone(&done);
        queue.dispatch(move || {
            std::thread::sleep(Duration::from_millis(50));
            *flag.lock().unwrap() = true;
        });
        queue.flush();

        assert!(*done.lock().unwrap());
    }
}
