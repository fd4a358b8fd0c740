//! The error kinds shared by the codecs, the detector and the remapper.
//!
//! All fallible functions in this crate return [`anyhow::Result`]; the errors below are the
//! "root causes" they carry. Use [`anyhow::Error::downcast_ref`] to tell the kinds apart:
//!
//! ```
//! use plume::error::MappingError;
//!
//! let err = anyhow::Error::from(MappingError::FormatUndetected);
//! assert!(matches!(err.downcast_ref(), Some(MappingError::FormatUndetected)));
//! ```

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
	/// A descriptor or readable type name that cannot be decoded. Never produced by silent
	/// truncation; the offending input is carried in full.
	#[error("malformed descriptor or type name {input:?}: {reason}")]
	MalformedDescriptor { input: String, reason: String },

	/// A mapping line with fewer columns than its format requires.
	#[error("truncated record on line {line}")]
	TruncatedRecord { line: usize },

	/// A member line referencing a class the stream has not declared, in a format that
	/// requires classes to be declared first.
	#[error("line {line} references undeclared class {class:?}")]
	UnknownClassReference { line: usize, class: String },

	/// Two entries under the same key where the format treats duplicates as ambiguous.
	#[error("duplicate entry for key {key:?}")]
	DuplicateEntry { key: String },

	/// No registered detection unit recognized the sample.
	#[error("cannot detect the mapping format of the given sample")]
	FormatUndetected,

	/// The hierarchy walk found two distinct mappings for one member on unrelated branches.
	#[error("ambiguous inherited mappings for {name:?} {desc:?} reachable from {owner:?}: both {first:?} and {second:?}")]
	AmbiguousInheritedSymbol {
		owner: String,
		name: String,
		desc: String,
		first: String,
		second: String,
	},

	/// More than one namespace qualifies as the default remap target.
	#[error("more than one candidate target namespace, an explicit target is required")]
	TargetNamespaceRequired,

	/// An operation that only exists on the other collection shape, e.g. reversing a
	/// namespaced collection.
	#[error("operation {operation:?} is not supported on a {shape} mapping collection")]
	UnsupportedOperationOnShape {
		operation: &'static str,
		shape: &'static str,
	},

	/// Local-variable renamer misuse: recording started twice, ended without starting, or a
	/// pending lambda renamer claimed before being prepared.
	#[error("renamer state error: {0}")]
	RenamerState(String),
}
