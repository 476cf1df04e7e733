use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

pub type Macrotask = Box<dyn FnOnce()>;

/// Runs a callback once, after the current synchronous pass and after any
/// finer grained continuations queued during it.
pub trait MacrotaskScheduler {
    fn schedule_macrotask(&self, task: Macrotask);
}

/// Deterministic queue, drained explicitly by the owner of the event loop.
#[derive(Default)]
pub struct MacrotaskQueue {
    tasks: RefCell<VecDeque<Macrotask>>,
}

impl MacrotaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run the tasks queued before this call. Tasks they schedule wait for the
    /// next turn. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let batch: Vec<Macrotask> = self.tasks.borrow_mut().drain(..).collect();
        let executed = batch.len();
        for task in batch {
            task();
        }
        if executed > 0 {
            trace!(target: "events", executed, "macrotasks ran");
        }
        executed
    }
}

impl MacrotaskScheduler for MacrotaskQueue {
    fn schedule_macrotask(&self, task: Macrotask) {
        self.tasks.borrow_mut().push_back(task);
    }
}

/// Schedules onto the current `tokio::task::LocalSet`. Must be used from
/// within one.
///
/// The task waits on the timer driver before running, so work that is already
/// ready (including continuations that yield) runs first.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioMacrotaskScheduler;

impl TokioMacrotaskScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl MacrotaskScheduler for TokioMacrotaskScheduler {
    fn schedule_macrotask(&self, task: Macrotask) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(Duration::ZERO).await;
            task();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn runs_tasks_in_order() {
        let queue = MacrotaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for index in 0..3 {
            let log = Rc::clone(&log);
            queue.schedule_macrotask(Box::new(move || log.borrow_mut().push(index)));
        }
        assert_eq!(queue.pending(), 3);
        assert!(log.borrow().is_empty());

        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn tasks_scheduled_while_draining_wait_for_next_turn() {
        let queue = Rc::new(MacrotaskQueue::new());
        let ran = Rc::new(Cell::new(0));

        let inner_queue = Rc::clone(&queue);
        let inner_ran = Rc::clone(&ran);
        queue.schedule_macrotask(Box::new(move || {
            inner_ran.set(inner_ran.get() + 1);
            let nested = Rc::clone(&inner_ran);
            inner_queue.schedule_macrotask(Box::new(move || nested.set(nested.get() + 10)));
        }));

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(ran.get(), 1);
        assert_eq!(queue.pending(), 1);

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(ran.get(), 11);
    }

    #[tokio::test]
    async fn tokio_scheduler_defers_until_yield() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let ran = Rc::new(Cell::new(false));
                let flag = Rc::clone(&ran);
                TokioMacrotaskScheduler::new().schedule_macrotask(Box::new(move || flag.set(true)));
                assert!(!ran.get());

                tokio::task::yield_now().await;
                assert!(!ran.get());

                tokio::time::sleep(Duration::from_millis(5)).await;
                assert!(ran.get());
            })
            .await;
    }
}
