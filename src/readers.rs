use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::batch;
use crate::computation::ComputationBody;

/// The computations subscribed to one cell, in registration order.
///
/// Entries are weak: a reader never keeps a computation alive, and
/// a computation only keeps a weak reference back to this list.
pub(crate) struct Readers {
	list: RefCell<SmallVec<[Weak<ComputationBody>; 4]>>,
}

impl Readers {
	pub fn new() -> Self {
		Readers {
			list: RefCell::new(SmallVec::new()),
		}
	}

	/// Registers `reader` unless it is already registered.
	pub fn add(&self, reader: &Rc<ComputationBody>) {
		let mut list = self.list.borrow_mut();
		prune(&mut list);

		let reader = Rc::downgrade(reader);
		if list.iter().any(|r| Weak::ptr_eq(r, &reader)) {
			return;
		}

		list.push(reader);
	}

	pub fn remove(&self, reader: &Weak<ComputationBody>) {
		let mut list = self.list.borrow_mut();
		list.retain(|r| !Weak::ptr_eq(r, reader));
		prune(&mut list);
	}

	pub fn len(&self) -> usize {
		self.list.borrow().iter().filter(|r| r.strong_count() > 0).count()
	}

	/// Runs every reader now, or queues this list when a batch is open.
	pub fn notify(self: &Rc<Self>) {
		if batch::defer(self) {
			return;
		}

		self.run_readers();
	}

	/// Runs every reader registered at the moment of the call, once each,
	/// in registration order.
	///
	/// Readers re-subscribe while they run, so the pass iterates a snapshot.
	pub fn run_readers(&self) {
		let snapshot = self.list.borrow().clone();
		tracing::trace!(readers = snapshot.len(), "notifying readers");

		for reader in snapshot {
			if let Some(reader) = reader.upgrade() {
				reader.run();
			}
		}
	}
}

fn prune(list: &mut SmallVec<[Weak<ComputationBody>; 4]>) {
	let before = list.len();
	list.retain(|r| r.strong_count() > 0);
	if list.len() != before {
		tracing::debug!(pruned = before - list.len(), "dropped dead readers");
	}
}
