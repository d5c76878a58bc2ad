use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use crate::addr::WeakAddr;
use crate::readers::Readers;
use crate::stack::{self, Frame};

/// Handle to a tracked computation.
///
/// The action runs once when the observer is created and again every time a
/// cell it read during its previous run changes. The computation lives as
/// long as a handle to it does; dropping the last `Observer` unsubscribes it
/// from every cell.
#[derive(Clone)]
#[must_use = "dropping an Observer stops it, use `detach` to keep it running"]
pub struct Observer {
	pub(crate) body: Rc<ComputationBody>,
}

pub(crate) struct ComputationBody {
	name: &'static str,
	action: Box<dyn Fn()>,
	subscriptions: RefCell<BTreeSet<WeakAddr<Readers>>>,
	this: Weak<ComputationBody>,
}

/// Creates an observer and runs `action` once to capture its dependencies.
pub fn observe(action: impl Fn() + 'static) -> Observer {
	observe_with_name("<unnamed>", action)
}

pub fn observe_with_name(name: &'static str, action: impl Fn() + 'static) -> Observer {
	let observer = Observer::new_with_name(name, Box::new(action));
	observer.run();
	observer
}

impl Observer {
	/// Creates an observer without running it. Nothing is tracked until the
	/// first [`Observer::run`].
	pub fn new(action: Box<dyn Fn()>) -> Self {
		Self::new_with_name("<unnamed>", action)
	}

	pub fn new_with_name(name: &'static str, action: Box<dyn Fn()>) -> Self {
		Observer {
			body: ComputationBody::new(name, action),
		}
	}

	/// Drops every current subscription, then runs the action and subscribes
	/// to the cells it reads.
	pub fn run(&self) {
		self.body.run()
	}

	pub fn name(&self) -> &'static str {
		self.body.name
	}

	/// Number of cells read during the last run.
	pub fn subscription_count(&self) -> usize {
		self.body.subscriptions.borrow().len()
	}

	/// Keeps the computation alive for the rest of the thread's life.
	pub fn detach(self) {
		std::mem::forget(self.body);
	}
}

impl ComputationBody {
	pub(crate) fn new(name: &'static str, action: Box<dyn Fn()>) -> Rc<Self> {
		Rc::new_cyclic(|this| ComputationBody {
			name,
			action,
			subscriptions: RefCell::new(BTreeSet::new()),
			this: this.clone(),
		})
	}

	pub(crate) fn run(self: &Rc<Self>) {
		self.unsubscribe();

		let frame = Frame::enter(self.clone());
		tracing::trace!(name = self.name, depth = frame.depth(), "running computation");
		(self.action)();
	}

	/// Records that `readers` now lists this computation. Idempotent.
	pub(crate) fn subscribed(&self, readers: &Rc<Readers>) {
		self.subscriptions
			.borrow_mut()
			.insert(WeakAddr::new(Rc::downgrade(readers)));
	}

	fn unsubscribe(&self) {
		let stale = std::mem::take(&mut *self.subscriptions.borrow_mut());
		if stale.is_empty() {
			return;
		}

		tracing::debug!(name = self.name, count = stale.len(), "dropping subscriptions");
		for readers in stale {
			if let Some(readers) = readers.upgrade() {
				readers.remove(&self.this);
			}
		}
	}
}

impl Drop for ComputationBody {
	fn drop(&mut self) {
		self.unsubscribe();
	}
}

/// Registers the running computation, if any, as a reader of `readers`.
pub(crate) fn track(readers: &Rc<Readers>) {
	if let Some(current) = stack::current() {
		readers.add(&current);
		current.subscribed(readers);
	}
}

impl std::fmt::Debug for Observer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Observer")
			.field("name", &self.body.name)
			.field("subscriptions", &self.subscription_count())
			.finish()
	}
}
