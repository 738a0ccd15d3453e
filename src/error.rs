// SPDX-License-Identifier: Apache-2.0

//! The error taxonomy shared by every stream, buffer, and transformation in
//! the crate: end-of-input, malformed input, format mismatch, already
//! closed, capacity violation, and argument invalid, plus the I/O and pool
//! failures those operations can bubble up through.

pub mod utf8;

use std::{error, fmt, io};
use amplify_derive::Display;
pub use utf8::Utf8Error;

/// The crate's result type.
pub type Result<T> = std::result::Result<T, Error>;

/// What the caller was doing when the error occurred.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Display)]
pub enum OperationKind {
	#[display("unknown operation")]
	Unknown,
	#[display("buffered read")]
	BufRead,
	#[display("buffered write")]
	BufWrite,
	#[display("buffer copy")]
	BufCopy,
	#[display("buffer clear")]
	BufClear,
	#[display("buffered flush")]
	BufFlush,
	#[display("segment compaction")]
	BufCompact,
	#[display("seek")]
	Seek,
	#[display("transformation")]
	Transform,
	#[display("options select")]
	Select,
	#[display("{0}")]
	Other(&'static str),
}

/// Why an operation failed, directly reflecting the error taxonomy: the
/// first six variants are the distinct kinds the design calls out by name;
/// `Io` and `Pool` are the boundary failures those operations route through.
#[derive(Debug, Display)]
pub enum ErrorKind {
	#[display("end of input")]
	Eos,
	#[display("malformed input: {0}")]
	Malformed(String),
	#[display("format mismatch: {0}")]
	FormatMismatch(String),
	#[display("stream already closed")]
	Closed,
	#[display("programmer error: capacity violation, {0}")]
	CapacityViolation(String),
	#[display("programmer error: invalid argument, {0}")]
	ArgumentInvalid(String),
	#[display("I/O error")]
	Io,
	#[display("pool error: {0}")]
	Pool(String),
}

/// A failure in a stream, buffer, or transformation operation.
#[derive(Debug)]
pub struct Error {
	op: OperationKind,
	kind: ErrorKind,
	source: Option<Box<dyn error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.op, self.kind)
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		self.source.as_deref().map(|e| e as &(dyn error::Error + 'static))
	}
}

impl Error {
	fn new(op: OperationKind, kind: ErrorKind) -> Self {
		Self { op, kind, source: None }
	}

	fn with_source(
		op: OperationKind,
		kind: ErrorKind,
		source: impl error::Error + Send + Sync + 'static,
	) -> Self {
		Self { op, kind, source: Some(Box::new(source)) }
	}

	pub fn kind(&self) -> &ErrorKind { &self.kind }
	pub fn operation(&self) -> OperationKind { self.op }

	pub fn eos(op: OperationKind) -> Self { Self::new(op, ErrorKind::Eos) }

	pub fn malformed(op: OperationKind, reason: impl Into<String>) -> Self {
		Self::new(op, ErrorKind::Malformed(reason.into()))
	}

	pub fn format_mismatch(op: OperationKind, reason: impl Into<String>) -> Self {
		Self::new(op, ErrorKind::FormatMismatch(reason.into()))
	}

	pub fn closed(op: OperationKind) -> Self { Self::new(op, ErrorKind::Closed) }

	pub fn capacity_violation(op: OperationKind, reason: impl Into<String>) -> Self {
		Self::new(op, ErrorKind::CapacityViolation(reason.into()))
	}

	pub fn argument_invalid(op: OperationKind, reason: impl Into<String>) -> Self {
		Self::new(op, ErrorKind::ArgumentInvalid(reason.into()))
	}

	pub fn io(op: OperationKind, source: io::Error) -> Self {
		Self::with_source(op, ErrorKind::Io, source)
	}

	pub fn pool(op: OperationKind, reason: impl Into<String>) -> Self {
		Self::new(op, ErrorKind::Pool(reason.into()))
	}

	pub fn invalid_utf8(op: OperationKind, source: Utf8Error) -> Self {
		Self::with_source(op, ErrorKind::Malformed("invalid UTF-8".into()), source)
	}

	/// Re-tags this error as having occurred during `op`, keeping its kind
	/// and source. Used by call sites that catch a lower-level error (e.g.
	/// from a transformation) and surface it under their own operation.
	pub fn with_operation(mut self, op: OperationKind) -> Self {
		self.op = op;
		self
	}

	/// Downcasts the wrapped source error back to `io::Error`, if this was
	/// constructed via [`Error::io`].
	pub fn io_source(&self) -> Option<&io::Error> {
		self.source.as_deref().and_then(|e| e.downcast_ref::<io::Error>())
	}

	/// `true` iff this is an end-of-input error.
	pub fn is_eos(&self) -> bool { matches!(self.kind, ErrorKind::Eos) }

	/// Converts back into a [`std::io::Error`], for use at a boundary that
	/// must speak `std::io`.
	pub fn into_io(self) -> io::Error {
		match self.kind {
			ErrorKind::Eos => io::Error::new(io::ErrorKind::UnexpectedEof, self.to_string()),
			ErrorKind::Io => self
				.source
				.and_then(|e| e.downcast::<io::Error>().ok())
				.map(|e| *e)
				.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "I/O error")),
			_ => io::Error::new(io::ErrorKind::Other, self.to_string()),
		}
	}
}

impl From<io::Error> for Error {
	fn from(value: io::Error) -> Self {
		if value.kind() == io::ErrorKind::UnexpectedEof {
			Error::eos(OperationKind::Unknown)
		} else {
			Error::io(OperationKind::Unknown, value)
		}
	}
}

/// Convenience builders mirroring `with_op_buf_read()` etc. from this
/// crate's stream layer: take a bare `io::Error`/`Error` and tag it with a
/// specific operation.
pub trait ResultExt<T> {
	fn with_op(self, op: OperationKind) -> Result<T>;
	fn with_op_buf_read(self) -> Result<T> where Self: Sized { self.with_op(OperationKind::BufRead) }
	fn with_op_buf_write(self) -> Result<T> where Self: Sized { self.with_op(OperationKind::BufWrite) }
	fn with_op_buf_flush(self) -> Result<T> where Self: Sized { self.with_op(OperationKind::BufFlush) }
}

impl<T> ResultExt<T> for Result<T> {
	fn with_op(self, op: OperationKind) -> Result<T> {
		self.map_err(|e| e.with_operation(op))
	}
}
