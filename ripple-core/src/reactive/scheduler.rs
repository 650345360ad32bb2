//! Microtask Scheduler
//!
//! Effect re-runs never happen inside the `set` that triggered them. They
//! are queued as microtasks and executed at the next checkpoint, which is a
//! call to [`flush`]. There is no host event loop, so the engine owns the
//! queue and the embedder decides where checkpoints fall (after each
//! timer callback, after each request, at the end of a test step...).
//!
//! # Ordering
//!
//! The queue is strictly FIFO. Tasks queued while a checkpoint is draining
//! run in the same checkpoint, after everything queued before them. This
//! is what lets a derived value publish its new value before a dependent
//! effect that was notified in the same wave re-runs: the derived's
//! internal effect subscribed first, so its task was queued first.
//!
//! # Failures
//!
//! A panicking task fails only its own turn. The checkpoint catches the
//! panic, logs it, and keeps draining; the failure is then reported from
//! [`flush`]. Nothing is retried.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use super::runtime::with_runtime;
use crate::error::{ReactiveError, Result};

/// A unit of deferred work.
pub type Microtask = Box<dyn FnOnce()>;

/// FIFO queue of pending microtasks.
#[derive(Default)]
pub struct MicrotaskQueue {
    tasks: RefCell<VecDeque<Microtask>>,
    draining: Cell<bool>,
}

impl MicrotaskQueue {
    pub(crate) fn push(&self, task: Microtask) {
        self.tasks.borrow_mut().push_back(task);
    }

    pub(crate) fn pop(&self) -> Option<Microtask> {
        self.tasks.borrow_mut().pop_front()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Whether a checkpoint is currently draining this queue.
    pub fn is_draining(&self) -> bool {
        self.draining.get()
    }
}

/// Outcome of a successful checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Tasks executed, failed ones included.
    pub ran: usize,
    /// Tasks that panicked.
    pub failed: usize,
}

/// Queue `task` to run at the next checkpoint.
pub fn queue_microtask<F>(task: F)
where
    F: FnOnce() + 'static,
{
    with_runtime(|rt| {
        rt.queue().push(Box::new(task));
        rt.record_queued();
        tracing::trace!(pending = rt.queue().len(), "microtask queued");
    });
}

/// Number of microtasks waiting for the next checkpoint.
pub fn pending_microtasks() -> usize {
    with_runtime(|rt| rt.queue().len())
}

/// Clears the draining flag on every exit path.
struct DrainGuard;

impl Drop for DrainGuard {
    fn drop(&mut self) {
        with_runtime(|rt| rt.queue().draining.set(false));
    }
}

/// Run queued microtasks until the queue is empty.
///
/// This is the microtask checkpoint. Tasks queued by running tasks are
/// drained too. Returns an error if any task panicked, if called from
/// inside a running task, or if the configured turn limit was reached.
pub fn flush() -> Result<FlushReport> {
    let turn_limit = with_runtime(|rt| {
        if rt.queue().is_draining() {
            return Err(ReactiveError::ReentrantFlush);
        }
        rt.queue().draining.set(true);
        Ok(rt.config().turn_limit)
    })
    .inspect_err(|_| tracing::warn!("nested flush rejected"))?;
    let _guard = DrainGuard;

    let mut report = FlushReport::default();
    let mut first_failure: Option<String> = None;

    loop {
        if let Some(limit) = turn_limit {
            let pending = pending_microtasks();
            if report.ran >= limit && pending > 0 {
                tracing::warn!(limit, pending, "turn limit reached, deferring remaining microtasks");
                return Err(ReactiveError::TurnLimitExceeded { limit, pending });
            }
        }

        let Some(task) = with_runtime(|rt| rt.queue().pop()) else {
            break;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(task));
        report.ran += 1;
        let failed = outcome.is_err();
        with_runtime(|rt| rt.record_run(failed));

        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            tracing::error!(%message, "microtask panicked");
            report.failed += 1;
            first_failure.get_or_insert(message);
        }
    }

    tracing::debug!(ran = report.ran, failed = report.failed, "checkpoint drained");

    match first_failure {
        Some(message) => Err(ReactiveError::TaskPanicked {
            failed: report.failed,
            message,
        }),
        None => Ok(report),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::reactive::configure;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |label: &'static str| -> Box<dyn FnOnce()> {
            let log = log_clone.clone();
            Box::new(move || log.borrow_mut().push(label))
        };
        (log, make)
    }

    #[test]
    fn nothing_runs_before_flush() {
        let (log, task) = recorder();
        queue_microtask(task("a"));

        assert!(log.borrow().is_empty());
        assert_eq!(pending_microtasks(), 1);

        let report = flush().unwrap();
        assert_eq!(report, FlushReport { ran: 1, failed: 0 });
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(pending_microtasks(), 0);
    }

    #[test]
    fn tasks_run_in_fifo_order() {
        let (log, task) = recorder();
        queue_microtask(task("a"));
        queue_microtask(task("b"));
        queue_microtask(task("c"));

        flush().unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn tasks_queued_while_draining_run_in_same_checkpoint() {
        let (log, task) = recorder();
        let late = task("late");
        queue_microtask(move || queue_microtask(late));
        queue_microtask(task("second"));

        let report = flush().unwrap();
        assert_eq!(report.ran, 3);
        assert_eq!(*log.borrow(), vec!["second", "late"]);
    }

    #[test]
    fn panicking_task_does_not_stop_the_checkpoint() {
        let (log, task) = recorder();
        queue_microtask(|| panic!("boom"));
        queue_microtask(task("after"));

        let err = flush().unwrap_err();
        match err {
            ReactiveError::TaskPanicked { failed, message } => {
                assert_eq!(failed, 1);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*log.borrow(), vec!["after"]);
        assert!(!with_runtime(|rt| rt.queue().is_draining()));
    }

    #[test]
    fn nested_flush_is_rejected() {
        let nested = Rc::new(RefCell::new(None));
        let nested_clone = nested.clone();
        queue_microtask(move || {
            *nested_clone.borrow_mut() = Some(flush());
        });

        flush().unwrap();
        let nested = nested.borrow_mut().take().unwrap();
        assert!(matches!(nested, Err(ReactiveError::ReentrantFlush)));
    }

    #[test]
    fn turn_limit_defers_remaining_work() {
        configure(RuntimeConfig::default().with_turn_limit(2));
        let (log, task) = recorder();
        queue_microtask(task("a"));
        queue_microtask(task("b"));
        queue_microtask(task("c"));

        let err = flush().unwrap_err();
        assert!(matches!(
            err,
            ReactiveError::TurnLimitExceeded { limit: 2, pending: 1 }
        ));
        assert_eq!(*log.borrow(), vec!["a", "b"]);

        flush().unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_flush_is_a_no_op() {
        assert_eq!(flush().unwrap(), FlushReport::default());
    }
}
