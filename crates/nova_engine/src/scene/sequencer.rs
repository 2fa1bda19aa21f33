//! Single-flight FIFO task sequencer
//!
//! Every script component owns one sequencer: a queue of (action, exit
//! condition) entries of which at most one executes at a time. Queue
//! mutation and exit-condition polling happen only on the tick thread;
//! an action body may optionally run on the background dispatcher.

use std::collections::VecDeque;

use crate::scene::dispatch::Dispatcher;

/// Action body of a sequencer entry, run exactly once when the entry begins
pub type TaskAction = Box<dyn FnOnce() + Send>;

/// Exit predicate over elapsed seconds since the entry began
pub type ExitCondition = Box<dyn FnMut(f32) -> bool + Send>;

/// Where a task's action body runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Synchronously on the tick thread when the entry begins
    Inline,
    /// Offloaded to the background dispatcher, fire-and-forget
    Background,
}

/// One sequencer entry
pub struct Task {
    action: Option<TaskAction>,
    exit: Option<ExitCondition>,
    mode: ExecutionMode,
}

impl Task {
    /// Entry that runs `action` and exits on the first poll after it began
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Some(Box::new(action)),
            exit: None,
            mode: ExecutionMode::Inline,
        }
    }

    /// Builder pattern: hold the entry until `exit(elapsed)` returns true
    pub fn until(mut self, exit: impl FnMut(f32) -> bool + Send + 'static) -> Self {
        self.exit = Some(Box::new(exit));
        self
    }

    /// Builder pattern: run the action body on the background dispatcher
    pub fn in_background(mut self) -> Self {
        self.mode = ExecutionMode::Background;
        self
    }
}

struct Running {
    exit: Option<ExitCondition>,
    elapsed: f32,
}

/// FIFO queue with at most one concurrently-running entry
#[derive(Default)]
pub struct Sequencer {
    queue: VecDeque<Task>,
    running: Option<Running>,
}

impl Sequencer {
    /// Create an idle sequencer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; begins immediately when nothing is executing
    pub fn enqueue(&mut self, task: Task) {
        if self.running.is_none() {
            self.begin(task);
        } else {
            self.queue.push_back(task);
        }
    }

    /// Whether nothing is executing and nothing is queued
    pub fn is_idle(&self) -> bool {
        self.running.is_none() && self.queue.is_empty()
    }

    /// Number of entries waiting behind the current one
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop the queue and the current entry
    ///
    /// An already-offloaded background body keeps running to completion;
    /// its exit condition is simply never polled again.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.running = None;
    }

    /// Advance the current entry by `delta` seconds; called once per tick
    pub(crate) fn poll(&mut self, delta: f32) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        running.elapsed += delta;
        let finished = match running.exit.as_mut() {
            None => true,
            Some(exit) => exit(running.elapsed),
        };
        if finished {
            self.running = None;
            if let Some(next) = self.queue.pop_front() {
                self.begin(next);
            }
        }
    }

    fn begin(&mut self, mut task: Task) {
        if let Some(action) = task.action.take() {
            match task.mode {
                ExecutionMode::Inline => action(),
                ExecutionMode::Background => Dispatcher::shared().execute(action),
            }
        }
        self.running = Some(Running {
            exit: task.exit,
            elapsed: 0.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn recorder(log: &Arc<std::sync::Mutex<Vec<usize>>>, id: usize) -> impl FnOnce() + Send {
        let log = Arc::clone(log);
        move || log.lock().unwrap().push(id)
    }

    #[test]
    fn test_enqueue_onto_idle_starts_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut sequencer = Sequencer::new();

        let c = Arc::clone(&counter);
        sequencer.enqueue(Task::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!sequencer.is_idle());

        sequencer.poll(0.016);
        assert!(sequencer.is_idle());
    }

    #[test]
    fn test_fifo_order_with_exit_conditions() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut sequencer = Sequencer::new();

        sequencer.enqueue(Task::new(recorder(&log, 0)).until(|t| t >= 1.0));
        sequencer.enqueue(Task::new(recorder(&log, 1)).until(|t| t >= 0.0));
        sequencer.enqueue(Task::new(recorder(&log, 2)).until(|t| t >= 2.0));

        // First entry began at enqueue time; the others wait their turn.
        assert_eq!(*log.lock().unwrap(), vec![0]);

        sequencer.poll(0.5);
        assert_eq!(*log.lock().unwrap(), vec![0]);

        sequencer.poll(0.5); // t >= 1.0, entry 1 begins
        assert_eq!(*log.lock().unwrap(), vec![0, 1]);

        sequencer.poll(0.5); // t >= 0.0 fires on first check, entry 2 begins
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);

        sequencer.poll(1.0);
        assert!(!sequencer.is_idle());
        sequencer.poll(1.0); // t >= 2.0
        assert!(sequencer.is_idle());
    }

    #[test]
    fn test_no_exit_condition_exits_on_first_poll() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut sequencer = Sequencer::new();

        sequencer.enqueue(Task::new(recorder(&log, 0)));
        sequencer.enqueue(Task::new(recorder(&log, 1)));
        assert_eq!(*log.lock().unwrap(), vec![0]);

        sequencer.poll(0.0);
        assert_eq!(*log.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_clear_drops_pending_entries() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut sequencer = Sequencer::new();

        sequencer.enqueue(Task::new(recorder(&log, 0)).until(|t| t >= 10.0));
        sequencer.enqueue(Task::new(recorder(&log, 1)));
        sequencer.clear();

        sequencer.poll(100.0);
        assert_eq!(*log.lock().unwrap(), vec![0]);
        assert!(sequencer.is_idle());
    }
}
