use thiserror::Error;

/// A text provider failed to produce a file's content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ReadError(pub String);

impl ReadError {
	/// Build an error from any message.
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

/// Errors surfaced by the architecture engine.
///
/// Build-time failures are never fatal: an unreadable file is logged and left out of
/// the import scan, and unresolved imports are dropped without an error at all.
#[derive(Debug, Error)]
pub enum ArchitectureError {
	/// File content could not be fetched.
	#[error("unreadable file {path}: {source}")]
	UnreadableFile {
		/// Path of the file.
		path: String,
		/// Provider error.
		#[source]
		source: ReadError,
	},

	/// Configuration JSON could not be parsed.
	#[error("invalid configuration: {0}")]
	Config(#[source] serde_json::Error),

	/// Snapshot could not be serialized.
	#[error("failed to serialize snapshot: {0}")]
	Export(#[source] serde_json::Error),
}

/// Result alias for the engine.
pub type Result<T> = std::result::Result<T, ArchitectureError>;
