//! Single-threaded host run loop
//!
//! Work that must yield between slices (the console drain) is posted as a
//! task and picked up on the next turn of the loop. Nothing here is shared
//! across threads.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

/// A unit of deferred work
pub type Task = Box<dyn FnOnce()>;

/// Something that can run a task on a later turn of the host loop
pub trait Scheduler {
    /// Queue `task` for a later turn
    fn schedule(&self, task: Task);
}

/// FIFO task loop driven by the host
pub struct RunLoop {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

impl std::fmt::Debug for RunLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLoop")
            .field("pending", &self.rx.len())
            .finish()
    }
}

/// Cloneable handle for posting tasks to a [`RunLoop`]
#[derive(Clone)]
pub struct RunLoopHandle {
    tx: Sender<Task>,
}

impl Default for RunLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLoop {
    /// Create an empty loop
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Handle for scheduling onto this loop
    pub fn handle(&self) -> RunLoopHandle {
        RunLoopHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run one turn: only the tasks queued before this call.
    ///
    /// Tasks scheduled while the turn runs wait for the next turn.
    /// Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let queued = self.rx.len();
        let mut ran = 0;
        while ran < queued {
            match self.rx.try_recv() {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        ran
    }

    /// Keep turning until no task is left. Returns the number of turns.
    pub fn run_until_idle(&self) -> usize {
        let mut turns = 0;
        while !self.is_idle() {
            self.run_pending();
            turns += 1;
        }
        turns
    }

    /// Whether no task is waiting
    pub fn is_idle(&self) -> bool {
        self.rx.is_empty()
    }

    /// Number of waiting tasks
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Scheduler for RunLoopHandle {
    fn schedule(&self, task: Task) {
        if self.tx.send(task).is_err() {
            tracing::trace!("Run loop gone, dropping task");
        }
    }
}

impl Scheduler for RunLoop {
    fn schedule(&self, task: Task) {
        // The loop holds its own receiver, so this cannot fail
        let _ = self.tx.send(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_tasks_run_in_order() {
        let run_loop = RunLoop::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let seen = Rc::clone(&seen);
            run_loop.handle().schedule(Box::new(move || seen.borrow_mut().push(i)));
        }
        assert_eq!(run_loop.run_pending(), 3);
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_task_scheduled_during_turn_waits() {
        let run_loop = RunLoop::new();
        let handle = run_loop.handle();
        let seen = Rc::new(RefCell::new(0));
        let inner = Rc::clone(&seen);
        run_loop.schedule(Box::new(move || {
            *inner.borrow_mut() += 1;
            let again = Rc::clone(&inner);
            handle.schedule(Box::new(move || *again.borrow_mut() += 1));
        }));

        assert_eq!(run_loop.run_pending(), 1);
        assert_eq!(*seen.borrow(), 1);
        assert_eq!(run_loop.pending(), 1);
        assert_eq!(run_loop.run_until_idle(), 1);
        assert_eq!(*seen.borrow(), 2);
    }
}
