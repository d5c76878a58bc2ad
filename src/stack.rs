//! Tracking stack.
//!
//! The top frame is the computation that currently captures reads. Frames are
//! pushed through [`Frame::enter`] and popped when the returned guard is
//! dropped, which also happens while unwinding out of a failing action.

use std::cell::RefCell;
use std::rc::Rc;

use crate::computation::ComputationBody;

thread_local! {
	static STACK: RefCell<Vec<Rc<ComputationBody>>> = RefCell::new(Vec::new());
}

/// Returns `true` while some computation is capturing reads on this thread.
pub fn is_tracking() -> bool {
	STACK.with(|stack| !stack.borrow().is_empty())
}

pub(crate) fn current() -> Option<Rc<ComputationBody>> {
	STACK.with(|stack| stack.borrow().last().cloned())
}

#[must_use]
pub(crate) struct Frame {
	depth: usize,
}

impl Frame {
	pub(crate) fn enter(computation: Rc<ComputationBody>) -> Self {
		let depth = STACK.with(|stack| {
			let mut stack = stack.borrow_mut();
			stack.push(computation);
			stack.len()
		});

		Frame { depth }
	}

	pub(crate) fn depth(&self) -> usize {
		self.depth
	}
}

impl Drop for Frame {
	fn drop(&mut self) {
		STACK.with(|stack| {
			let mut stack = stack.borrow_mut();
			debug_assert_eq!(stack.len(), self.depth, "tracking stack frames popped out of order");
			stack.pop();
		});
	}
}

#[cfg(test)]
mod tests {
	use std::panic::{catch_unwind, AssertUnwindSafe};

	use super::*;
	use crate::computation::ComputationBody;

	#[test]
	fn frames_nest_in_lifo_order() {
		let outer = ComputationBody::new("outer", Box::new(|| {}));
		let inner = ComputationBody::new("inner", Box::new(|| {}));

		assert!(!is_tracking());
		{
			let _outer = Frame::enter(outer.clone());
			assert!(Rc::ptr_eq(&current().unwrap(), &outer));
			{
				let frame = Frame::enter(inner.clone());
				assert_eq!(frame.depth(), 2);
				assert!(Rc::ptr_eq(&current().unwrap(), &inner));
			}
			assert!(Rc::ptr_eq(&current().unwrap(), &outer));
		}
		assert!(current().is_none());
	}

	#[test]
	fn frame_pops_while_unwinding() {
		let body = ComputationBody::new("failing", Box::new(|| {}));

		let result = catch_unwind(AssertUnwindSafe(|| {
			let _frame = Frame::enter(body.clone());
			panic!("action failed");
		}));

		assert!(result.is_err());
		assert!(!is_tracking());
	}
}
