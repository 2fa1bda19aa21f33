//! Background execution context for sequencer actions
//!
//! A small worker pool fed over a channel. Offloaded action bodies are
//! fire-and-forget: the sequencer never joins them, it only polls elapsed
//! time and exit conditions on the tick thread.

use std::sync::OnceLock;
use std::thread;

use crossbeam_channel::{unbounded, Sender};

type Job = Box<dyn FnOnce() + Send>;

/// Shared worker pool executing offloaded task bodies
pub struct Dispatcher {
    sender: Sender<Job>,
}

impl Dispatcher {
    fn with_workers(count: usize) -> Self {
        let (sender, receiver) = unbounded::<Job>();
        for index in 0..count {
            let receiver = receiver.clone();
            let spawned = thread::Builder::new()
                .name(format!("nova-dispatch-{index}"))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                });
            if let Err(error) = spawned {
                log::error!("failed to spawn dispatch worker {index}: {error}");
            }
        }
        Self { sender }
    }

    /// Process-wide pool, created on first use
    pub fn shared() -> &'static Dispatcher {
        static SHARED: OnceLock<Dispatcher> = OnceLock::new();
        SHARED.get_or_init(|| {
            let workers = thread::available_parallelism().map_or(2, |n| n.get().min(4));
            Dispatcher::with_workers(workers)
        })
    }

    /// Run a job on the pool
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) {
        if self.sender.send(Box::new(job)).is_err() {
            log::error!("background dispatcher is gone; dropping task");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::time::Duration;

    #[test]
    fn test_jobs_run_off_the_calling_thread() {
        let (done_tx, done_rx) = bounded(1);
        let caller = thread::current().id();
        Dispatcher::shared().execute(move || {
            let _ = done_tx.send(thread::current().id() != caller);
        });
        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)), Ok(true));
    }
}
