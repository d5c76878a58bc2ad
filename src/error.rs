/// Misuse of the batch protocol.
///
/// Failures raised by actions are not represented here: they unwind to the
/// caller of `set`, `notify`, `run` or `end_batch` unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("a batch is already open, nested `begin_batch` is not supported")]
	BatchInProgress,
	#[error("`end_batch` called without an open batch")]
	NoBatch,
}
