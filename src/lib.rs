//! Fine-grained reactive cells.
//!
//! A [`Cell`] remembers which computations read it and re-runs them when its
//! value changes. Dependencies are discovered while a computation runs, so
//! there is nothing to declare:
//!
//! ```
//! let first = signal::Cell::new("Kim".to_string());
//! let last = signal::Cell::new("West".to_string());
//! let full = signal::compute({
//! 	let (first, last) = (first.clone(), last.clone());
//! 	move || format!("{} {}", first.get(), last.get())
//! });
//!
//! last.set("Kardashian".to_string());
//! assert_eq!(full.get(), "Kim Kardashian");
//! ```
//!
//! Updates run synchronously and depth-first. There is no glitch-free
//! scheduling: a computation reading two cells that change in one [`batch`]
//! runs once for each of them.
//!
//! All state is thread-local. Each thread has its own independent graph.

pub mod macros;

mod addr;
mod batch;
mod cell;
mod computation;
mod computed;
mod error;
mod readers;
mod stack;

pub use batch::{batch, begin_batch, end_batch, in_batch, reset};
pub use cell::{Cell, Toggle};
pub use computation::{observe, observe_with_name, Observer};
pub use computed::{compute, compute_with_name};
pub use error::Error;
pub use stack::is_tracking;
