use std::cell::{OnceCell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use crate::computation::{self, Observer};
use crate::computed::compute;
use crate::readers::Readers;

/// A mutable value that records the computations reading it and re-runs
/// them when it changes.
///
/// `Cell` is a handle: clones share the same value and readers.
pub struct Cell<T> {
	pub(crate) body: Rc<CellBody<T>>,
}

pub(crate) struct CellBody<T> {
	value: RefCell<T>,
	readers: Rc<Readers>,
	/// The computation producing this cell, for derived cells.
	source: OnceCell<Observer>,
}

impl<T> Clone for Cell<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<T> Default for Cell<T>
where
	T: Default + PartialEq + 'static,
{
	fn default() -> Self {
		Cell::new(Default::default())
	}
}

impl<T> From<T> for Cell<T>
where
	T: PartialEq + 'static,
{
	fn from(value: T) -> Self {
		Cell::new(value)
	}
}

pub trait Toggle {
	fn toggle(&mut self);
}

impl Toggle for bool {
	fn toggle(&mut self) {
		*self = !*self
	}
}

impl<T> Cell<T>
where
	T: PartialEq + 'static,
{
	pub fn new(value: T) -> Self {
		Cell {
			body: Rc::new(CellBody {
				value: RefCell::new(value),
				readers: Rc::new(Readers::new()),
				source: OnceCell::new(),
			}),
		}
	}

	/// Returns a clone of the value, subscribing the running computation.
	#[inline]
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.with(T::clone)
	}

	/// Borrows the value, subscribing the running computation.
	///
	/// The value stays borrowed while `func` runs, so `func` must not write
	/// to this cell, neither directly nor through a reader it triggers by
	/// writing another cell. Such a write panics with `already borrowed`.
	pub fn with<R>(&self, func: impl FnOnce(&T) -> R) -> R {
		computation::track(&self.body.readers);
		let value = self.body.value.borrow();
		func(&*value)
	}

	/// Returns a clone of the value without subscribing anyone.
	#[inline]
	pub fn get_once(&self) -> T
	where
		T: Clone,
	{
		self.body.value.borrow().clone()
	}

	/// Stores `value` and notifies the readers, unless it equals the current
	/// value. Returns whether the value changed.
	pub fn set(&self, value: T) -> bool {
		{
			let mut current = self.body.value.borrow_mut();
			if *current == value {
				return false;
			}
			*current = value;
		}

		self.notify();
		true
	}

	/// Like [`Cell::set`], but hands back the previous value.
	pub fn replace(&self, value: T) -> T {
		let old = {
			let mut current = self.body.value.borrow_mut();
			if *current == value {
				return value;
			}
			std::mem::replace(&mut *current, value)
		};

		self.notify();
		old
	}

	/// Mutates the value in place and always notifies. Use this for
	/// containers, where equality of the old and new value can't be
	/// checked after the fact.
	///
	/// The value is mutably borrowed while `func` runs: `func` must not read
	/// or write this cell, directly or through readers of other cells it
	/// writes. Readers run after `func` returns and may read it freely.
	pub fn update(&self, func: impl FnOnce(&mut T)) {
		func(&mut self.body.value.borrow_mut());
		self.notify();
	}

	#[inline]
	pub fn toggle(&self)
	where
		T: Toggle,
	{
		self.update(T::toggle)
	}

	/// Runs every reader now, or queues this cell if a batch is open.
	pub fn notify(&self) {
		self.body.readers.notify();
	}

	/// A derived cell holding `func` applied to this cell's value.
	pub fn map<F, R>(&self, func: F) -> Cell<R>
	where
		F: Fn(&T) -> R + 'static,
		R: PartialEq + 'static,
	{
		let this = self.clone();
		compute(move || this.with(&func))
	}

	/// Number of live computations currently reading this cell.
	pub fn reader_count(&self) -> usize {
		self.body.readers.len()
	}

	pub(crate) fn bind_source(&self, observer: Observer) {
		if self.body.source.set(observer).is_err() {
			tracing::error!("derived cell already has a source");
		}
	}
}

impl<T> Debug for Cell<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.body.value.borrow().fmt(f)
	}
}
