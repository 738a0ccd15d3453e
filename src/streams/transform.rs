// SPDX-License-Identifier: Apache-2.0

//! [`Transformation`]: a bidirectional byte processor (compressor, cipher,
//! hash) that sits between a buffered wrapper and a raw [`Source`]/[`Sink`]
//! (`§4.5`). Object-safe, so pipelines composed at runtime
//! (`sink.transformed_with(a).transformed_with(b)`) can chain through
//! `Box<dyn Transformation>` without a performance cliff — each layer
//! already does bulk byte work.

use crate::error::Result;
use crate::streams::{Sink, Source};
use crate::Buffer;

/// The result of one [`Transformation::transform_at_most_to`] call.
///
/// The source repo's transformation contract returns a consumed byte count
/// with `-1` as an end-of-transform sentinel; here that's a distinct
/// variant instead of a magic value baked into the return type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Progress {
	/// `byte_count` source bytes were consumed (possibly zero, meaning more
	/// input is needed before further progress can be made).
	Consumed(usize),
	/// The transformation will never consume or produce another byte.
	Done,
}

/// A bidirectional byte processor threaded between buffers rather than raw
/// I/O: GZIP (de)compression and hashing are both transformations.
pub trait Transformation {
	/// Consumes up to `byte_count` bytes from the head of `source`,
	/// appending any bytes it produces to the tail of `sink`. Insufficient
	/// input returns `Progress::Consumed(0)`, not an error; the caller is
	/// expected to pull more bytes into `source` and retry.
	fn transform_at_most_to(&mut self, source: &mut Buffer, sink: &mut Buffer, byte_count: usize) -> Result<Progress>;

	/// Appends any output still buffered inside the transformation and, for
	/// decoders, validates trailing framing (checksums, lengths, padding).
	/// Called exactly once, when the upstream has signalled end-of-stream.
	fn finish(&mut self, sink: &mut Buffer) -> Result<()>;

	/// Releases any resources the transformation holds. Idempotent.
	fn close(&mut self) -> Result<()> { Ok(()) }
}

/// A [`Source`] that pulls raw bytes from `source` and drives them through
/// `transform` before handing the result to the caller.
pub struct TransformedSource<S, T> {
	source: S,
	transform: T,
	pending: Buffer,
	finished: bool,
}

impl<S: Source, T: Transformation> TransformedSource<S, T> {
	fn new(source: S, transform: T) -> Self {
		Self { source, transform, pending: Buffer::new(), finished: false }
	}

	/// The wrapped transformation, e.g. to read a hash after the source has
	/// been drained to end-of-stream.
	pub fn transform(&self) -> &T { &self.transform }

	/// The wrapped transformation, mutably.
	pub fn transform_mut(&mut self) -> &mut T { &mut self.transform }
}

impl<S: Source, T: Transformation> Source for TransformedSource<S, T> {
	fn read(&mut self, sink: &mut Buffer, count: usize) -> Result<usize> {
		if self.finished {
			return Ok(0);
		}
		let before = sink.count();
		loop {
			if sink.count() - before >= count {
				break;
			}
			match self.transform.transform_at_most_to(&mut self.pending, sink, usize::MAX)? {
				Progress::Done => {
					self.finished = true;
					break;
				}
				Progress::Consumed(n) if n > 0 => continue,
				Progress::Consumed(_) => {}
			}
			match self.source.read(&mut self.pending, crate::DEFAULT_SEGMENT_SIZE) {
				Ok(_) => continue,
				Err(e) if e.is_eos() => {
					self.transform.finish(sink)?;
					self.finished = true;
					break;
				}
				Err(e) => return Err(e),
			}
		}
		Ok(sink.count() - before)
	}

	fn close_source(&mut self) -> Result<()> {
		self.transform.close()?;
		self.source.close_source()
	}
}

/// A [`Sink`] that drives incoming bytes through `transform` before
/// forwarding the result to `sink`.
pub struct TransformedSink<S, T> {
	sink: S,
	transform: T,
	pending: Buffer,
	closed: bool,
}

impl<S: Sink, T: Transformation> TransformedSink<S, T> {
	fn new(sink: S, transform: T) -> Self {
		Self { sink, transform, pending: Buffer::new(), closed: false }
	}

	/// The wrapped transformation, e.g. to read a hash after the sink has
	/// been closed.
	pub fn transform(&self) -> &T { &self.transform }

	/// The wrapped transformation, mutably.
	pub fn transform_mut(&mut self) -> &mut T { &mut self.transform }
}

impl<S: Sink, T: Transformation> Sink for TransformedSink<S, T> {
	fn write(&mut self, source: &mut Buffer, count: usize) -> Result<usize> {
		let count = count.min(source.count());
		let mut consumed = 0;
		while consumed < count {
			match self.transform.transform_at_most_to(source, &mut self.pending, count - consumed)? {
				Progress::Done => break,
				Progress::Consumed(0) => break,
				Progress::Consumed(n) => consumed += n,
			}
		}
		self.sink.write_all(&mut self.pending)?;
		Ok(consumed)
	}

	fn flush(&mut self) -> Result<()> {
		self.sink.write_all(&mut self.pending)?;
		self.sink.flush()
	}

	fn close_sink(&mut self) -> Result<()> {
		if !self.closed {
			self.transform.finish(&mut self.pending)?;
			self.sink.write_all(&mut self.pending)?;
			self.transform.close()?;
			self.closed = true;
		}
		self.sink.close_sink()
	}
}

/// Extension trait adding `.transformed_with(t)` to any [`Source`].
pub trait SourceTransformExt: Source + Sized {
	fn transformed_with<T: Transformation>(self, transform: T) -> TransformedSource<Self, T> {
		TransformedSource::new(self, transform)
	}
}

impl<S: Source> SourceTransformExt for S {}

/// Extension trait adding `.transformed_with(t)` to any [`Sink`].
pub trait SinkTransformExt: Sink + Sized {
	fn transformed_with<T: Transformation>(self, transform: T) -> TransformedSink<Self, T> {
		TransformedSink::new(self, transform)
	}
}

impl<S: Sink> SinkTransformExt for S {}
