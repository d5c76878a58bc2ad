use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::cell::{Cell, CellBody};
use crate::computation::Observer;

enum Target<T> {
	/// First run, before the cell exists.
	Unbound(Option<T>),
	Bound(Weak<CellBody<T>>),
}

/// Creates a cell whose value is `expression`, kept current as the cells it
/// reads change.
///
/// The returned cell owns the computation driving it: the derivation stops
/// when the last handle to the cell is dropped.
pub fn compute<T, F>(expression: F) -> Cell<T>
where
	T: PartialEq + 'static,
	F: Fn() -> T + 'static,
{
	compute_with_name("<computed>", expression)
}

pub fn compute_with_name<T, F>(name: &'static str, expression: F) -> Cell<T>
where
	T: PartialEq + 'static,
	F: Fn() -> T + 'static,
{
	let target = Rc::new(RefCell::new(Target::<T>::Unbound(None)));

	let observer = Observer::new_with_name(
		name,
		Box::new({
			let target = target.clone();
			move || {
				let value = expression();
				let cell = match &mut *target.borrow_mut() {
					Target::Unbound(slot) => {
						*slot = Some(value);
						return;
					}
					Target::Bound(body) => body.upgrade().map(|body| (Cell { body }, value)),
				};

				if let Some((cell, value)) = cell {
					cell.set(value);
				}
			}
		}),
	);

	observer.run();

	let initial = match target.replace(Target::Unbound(None)) {
		Target::Unbound(Some(value)) => value,
		_ => unreachable!("first run of a derived cell completed without a value"),
	};

	let cell = Cell::new(initial);
	target.replace(Target::Bound(Rc::downgrade(&cell.body)));
	cell.bind_source(observer);
	cell
}
