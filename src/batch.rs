//! Update coordinator.
//!
//! While a batch is open, cells queue themselves here instead of running
//! their readers. Closing the batch runs each queued cell's readers once, in
//! the order the cells first changed. Notifications are coalesced per cell
//! only: a reader of two changed cells runs twice.

use std::cell::RefCell;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::rc::Rc;

use fxhash::FxHashSet;

use crate::readers::Readers;
use crate::Error;

#[derive(Default)]
struct Coordinator {
	open: bool,
	pending: Vec<Rc<Readers>>,
	queued: FxHashSet<*const Readers>,
}

impl Coordinator {
	/// Closes the batch and hands back what was pending. The coordinator is
	/// empty afterwards.
	fn close(&mut self) -> Vec<Rc<Readers>> {
		self.open = false;
		self.queued.clear();
		std::mem::take(&mut self.pending)
	}
}

thread_local! {
	static COORDINATOR: RefCell<Coordinator> = RefCell::new(Coordinator::default());
}

pub fn in_batch() -> bool {
	COORDINATOR.with(|c| c.borrow().open)
}

/// Queues `readers` if a batch is open. Returns `false` when the caller
/// must notify immediately.
pub(crate) fn defer(readers: &Rc<Readers>) -> bool {
	COORDINATOR.with(|c| {
		let mut c = c.borrow_mut();
		if !c.open {
			return false;
		}

		if c.queued.insert(Rc::as_ptr(readers)) {
			c.pending.push(readers.clone());
		}

		true
	})
}

pub fn begin_batch() -> Result<(), Error> {
	COORDINATOR.with(|c| {
		let mut c = c.borrow_mut();
		if c.open {
			return Err(Error::BatchInProgress);
		}

		c.open = true;
		Ok(())
	})
}

/// Closes the open batch and notifies the readers of every cell that
/// changed during it.
///
/// The pending set is emptied before the first reader runs, so a failing
/// reader leaves the coordinator clean. Readers of cells queued after the
/// failing one are not run.
pub fn end_batch() -> Result<(), Error> {
	let pending = COORDINATOR.with(|c| {
		let mut c = c.borrow_mut();
		if !c.open {
			return Err(Error::NoBatch);
		}

		Ok(c.close())
	})?;

	tracing::trace!(cells = pending.len(), "flushing batch");

	for readers in pending {
		readers.run_readers();
	}

	Ok(())
}

/// Runs `func` inside a batch.
///
/// A call made while a batch is already open joins it, and the outermost
/// batch flushes. If `func` panics the batch is still closed and flushed,
/// then the panic continues. A panic raised by a reader during that flush
/// replaces the original one.
pub fn batch<R>(func: impl FnOnce() -> R) -> R {
	if begin_batch().is_err() {
		return func();
	}

	let result = catch_unwind(AssertUnwindSafe(func));
	if result.is_err() {
		tracing::warn!("batch closure panicked, flushing before unwinding");
	}

	if let Err(error) = end_batch() {
		tracing::error!(%error, "batch closed while still running");
	}

	match result {
		Ok(value) => value,
		Err(payload) => resume_unwind(payload),
	}
}

/// Closes any open batch and discards its pending notifications.
pub fn reset() {
	let discarded = COORDINATOR.with(|c| c.borrow_mut().close());
	if !discarded.is_empty() {
		tracing::debug!(discarded = discarded.len(), "coordinator reset");
	}
}
