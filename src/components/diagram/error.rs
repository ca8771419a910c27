use thiserror::Error;

/// Reasons the diagram canvas could not be attached to the page.
#[derive(Debug, Error)]
pub enum MountError {
	#[error("no browser window")]
	NoWindow,
	#[error("failed to acquire 2d context: {0}")]
	Context(String),
	#[error("canvas has no 2d context")]
	NoContext,
	#[error("2d context has an unexpected type")]
	WrongContext,
}
