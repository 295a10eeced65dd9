//! Queue of asynchronous checks waiting to be driven
//!
//! Checks started by [`AsyncValidator`](super::AsyncValidator) are parked here
//! instead of being spawned, so starting one works with or without a runtime.
//! The owner of the thread drives them with [`settle_validations`] or
//! [`poll_validations`].

use std::cell::RefCell;
use std::task::{Context, Poll, Waker};

use futures::future::{poll_fn, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::task::noop_waker_ref;
use tracing::trace;

#[derive(Default)]
struct PendingChecks {
    queue: FuturesUnordered<LocalBoxFuture<'static, ()>>,
    driver: Option<Waker>,
}

thread_local! {
    static PENDING: RefCell<PendingChecks> = RefCell::new(PendingChecks::default());
}

pub(crate) fn enqueue(check: LocalBoxFuture<'static, ()>) {
    PENDING.with(|pending| {
        let mut pending = pending.borrow_mut();
        pending.queue.push(check);
        if let Some(driver) = pending.driver.take() {
            driver.wake();
        }
    });
}

/// Poll every ready check and return how many are still running.
///
/// The queue is taken out while polling, since a finishing check may update
/// fields whose own validators enqueue further checks.
fn poll_pending(cx: &mut Context<'_>) -> usize {
    loop {
        let mut queue = PENDING.with(|pending| std::mem::take(&mut pending.borrow_mut().queue));
        while let Poll::Ready(Some(())) = queue.poll_next_unpin(cx) {}

        let (remaining, started) = PENDING.with(|pending| {
            let mut pending = pending.borrow_mut();
            let started = std::mem::replace(&mut pending.queue, queue);
            let count = started.len();
            for check in started {
                pending.queue.push(check);
            }
            (pending.queue.len(), count)
        });
        if started == 0 {
            return remaining;
        }
        trace!(started, "polling checks started while draining");
    }
}

/// Run pending checks as far as they can go without waiting.
///
/// Returns the number of checks still in flight.
pub fn poll_validations() -> usize {
    poll_pending(&mut Context::from_waker(noop_waker_ref()))
}

/// Drive pending checks until none is left, including checks started
/// while waiting.
pub async fn settle_validations() {
    poll_fn(|cx| match poll_pending(cx) {
        0 => Poll::Ready(()),
        remaining => {
            trace!(remaining, "waiting on async validations");
            PENDING.with(|pending| pending.borrow_mut().driver = Some(cx.waker().clone()));
            Poll::Pending
        }
    })
    .await
}
