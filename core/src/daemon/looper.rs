//! Author: [Seclususs](https://github.com/seclususs)

//! Single-threaded cooperative task queue.
//!
//! Tasks are posted with a delay and only run when the owner pumps the queue
//! via [`Looper::run_due`] or [`Looper::run_until_idle`]. Every task carries a
//! [`CancelToken`]; a cancelled task is dropped without running.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

struct DelayedTask {
    due: Instant,
    seq: u64,
    token: CancelToken,
    run: Box<dyn FnOnce()>,
}

#[derive(Default)]
pub struct Looper {
    queue: RefCell<Vec<DelayedTask>>,
    next_seq: Cell<u64>,
}

impl Looper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_delayed<F>(&self, delay: Duration, token: &CancelToken, task: F)
    where
        F: FnOnce() + 'static,
    {
        let seq = self.next_seq.get();
        self.next_seq.set(seq.wrapping_add(1));
        self.queue.borrow_mut().push(DelayedTask {
            due: Instant::now() + delay,
            seq,
            token: token.clone(),
            run: Box::new(task),
        });
    }

    /// Runs every live task due at or before `now`, oldest deadline first.
    /// Tasks posted while this pass runs wait for the next pass.
    pub fn run_due(&self, now: Instant) -> usize {
        let mut due = {
            let mut queue = self.queue.borrow_mut();
            queue.retain(|t| !t.token.is_cancelled());
            let (ready, waiting): (Vec<_>, Vec<_>) = queue.drain(..).partition(|t| t.due <= now);
            *queue = waiting;
            ready
        };
        due.sort_by_key(|t| (t.due, t.seq));
        let mut executed = 0;
        for task in due {
            // A task earlier in this pass may have cancelled a later one.
            if task.token.is_cancelled() {
                continue;
            }
            (task.run)();
            executed += 1;
        }
        executed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue
            .borrow()
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .map(|t| t.due)
            .min()
    }

    pub fn pending(&self) -> usize {
        self.queue
            .borrow()
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }

    pub fn run_until_idle(&self) -> usize {
        let mut executed = 0;
        while let Some(deadline) = self.next_deadline() {
            let wait = deadline.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                thread::sleep(wait);
            }
            executed += self.run_due(Instant::now());
        }
        self.queue.borrow_mut().clear();
        executed
    }
}
