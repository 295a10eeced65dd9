//! Validators whose check completes later
//!
//! An [`AsyncValidator`] starts its check on every value change and returns
//! immediately, so the mutation that triggered it is never blocked. Started
//! checks wait in a thread-local queue until the caller drives them with
//! [`settle_validations`](crate::settle_validations) or
//! [`poll_validations`](crate::poll_validations). While checks are in flight
//! the field reports [`is_validating`](crate::FieldRef::is_validating).
//!
//! Every run is stamped with a per-field sequence number. When a run
//! resolves after a newer one has started, its result is dropped, so the
//! errors always describe the latest value.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;
use tracing::{debug, warn};

use super::pending::enqueue;
use super::validator::reconcile_errors;
use crate::actions::{ActionEvent, ActionHandle};
use crate::field::FieldId;
use crate::validation_error::{ValidationError, ValidatorId};

/// Outcome of an asynchronous check; `Err` becomes a text error on the field.
pub type AsyncCheckResult = std::result::Result<Vec<ValidationError>, String>;

type AsyncCheck = dyn Fn(Value, Value) -> LocalBoxFuture<'static, AsyncCheckResult>;

/// A validator backed by a future.
#[derive(Clone)]
pub struct AsyncValidator {
    check: Rc<AsyncCheck>,
}

impl AsyncValidator {
    /// `check` receives the new and the previous value.
    pub fn new<F, Fut>(check: F) -> Self
    where
        F: Fn(Value, Value) -> Fut + 'static,
        Fut: Future<Output = AsyncCheckResult> + 'static,
    {
        Self {
            check: Rc::new(move |new, old| check(new, old).boxed_local()),
        }
    }
}

impl fmt::Debug for AsyncValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncValidator")
    }
}

/// Latest run number per field
#[derive(Default)]
struct RunLedger {
    latest: RefCell<HashMap<FieldId, u64>>,
}

impl RunLedger {
    fn start(&self, field: FieldId) -> u64 {
        let mut latest = self.latest.borrow_mut();
        let run = latest.entry(field).or_insert(0);
        *run += 1;
        *run
    }

    fn is_current(&self, field: FieldId, run: u64) -> bool {
        self.latest.borrow().get(&field) == Some(&run)
    }
}

impl From<AsyncValidator> for ActionHandle {
    fn from(validator: AsyncValidator) -> Self {
        let source = ValidatorId::new();
        let ledger = Rc::new(RunLedger::default());
        let detached = Rc::new(Cell::new(false));
        let on_detach = {
            let detached = detached.clone();
            Box::new(move || detached.set(true)) as Box<dyn Fn()>
        };

        ActionHandle::validator(
            move |field, next, event| {
                if let ActionEvent::ValueChanged { new, old } = event {
                    let run = ledger.start(field.id());
                    let pending = (validator.check)(new.clone(), old.clone());
                    let target = field.downgrade();
                    let ledger = ledger.clone();
                    let detached = detached.clone();
                    field.begin_validating();

                    enqueue(
                        async move {
                            let outcome = pending.await;
                            let Some(field) = target.upgrade() else {
                                return;
                            };
                            field.end_validating();
                            if detached.get() {
                                return;
                            }
                            if !ledger.is_current(field.id(), run) {
                                debug!(field = %field.id(), run, "dropping stale async validation");
                                return;
                            }
                            let errors = match outcome {
                                Ok(errors) => errors,
                                Err(message) => vec![ValidationError::text(message)],
                            };
                            if let Err(error) = reconcile_errors(&field, source, errors) {
                                warn!(field = %field.id(), %error, "async validation handler failed");
                            }
                        }
                        .boxed_local(),
                    );
                }
                next.call(field, event)
            },
            Some(on_detach),
        )
    }
}
