// SPDX-License-Identifier: Apache-2.0

//! Buffered wrappers (`§4.4`): pull raw bytes from a [`Source`] into an
//! internal [`Buffer`] on demand, or drain an internal [`Buffer`] into a
//! [`Sink`] on flush/close — the bridge between the minimal [`Source`]/
//! [`Sink`] streaming endpoints and the richer [`BufSource`]/[`BufSink`]
//! surface (numeric, UTF-8, and line reads; typed writes).

use crate::error::{Error, OperationKind, Result, ResultExt};
use crate::streams::{BufSink, BufSource, BufStream, Sink, Source};
use crate::Buffer;

/// Wraps `source` in a [`BufferedSource`].
pub fn buffer_source<S: Source>(source: S) -> BufferedSource<S> {
	BufferedSource::new(source)
}

/// Wraps `sink` in a [`BufferedSink`].
pub fn buffer_sink<S: Sink>(sink: S) -> BufferedSink<S> {
	BufferedSink::new(sink)
}

/// A [`Source`] wrapping a raw source with a [`Buffer`] refilled from it on
/// demand.
pub struct BufferedSource<S: Source> {
	buffer: Buffer,
	source: S,
	closed: bool,
}

impl<S: Source> BufferedSource<S> {
	fn new(source: S) -> Self {
		Self { buffer: Buffer::new(), source, closed: false }
	}

	/// Unwraps this source, discarding any bytes still buffered but not yet
	/// read.
	pub fn into_inner(mut self) -> S where S: Default {
		std::mem::take(&mut self.source)
	}
}

impl<S: Source> Source for BufferedSource<S> {
	fn read(&mut self, sink: &mut Buffer, count: usize) -> Result<usize> {
		if self.closed {
			return Err(Error::closed(OperationKind::BufRead));
		}
		self.request(count)?;
		self.buffer.read(sink, count)
	}

	fn close_source(&mut self) -> Result<()> {
		if !self.closed {
			self.closed = true;
			let result = self.source.close_source();
			self.buffer.clear();
			result?;
		}
		Ok(())
	}
}

impl<S: Source> BufStream for BufferedSource<S> {
	fn buf(&self) -> &Buffer { &self.buffer }
	fn buf_mut(&mut self) -> &mut Buffer { &mut self.buffer }
}

impl<S: Source> BufSource for BufferedSource<S> {
	/// Pulls bytes from the wrapped source, rounding requests up to a whole
	/// segment, until either `byte_count` bytes are buffered or the source
	/// is exhausted.
	fn request(&mut self, byte_count: usize) -> Result<bool> {
		if self.closed {
			return Ok(false);
		}
		while self.buffer.count() < byte_count {
			let needed = byte_count - self.buffer.count();
			match self.source.read(&mut self.buffer, needed) {
				Ok(0) => break,
				Ok(_) => continue,
				Err(e) if e.is_eos() => break,
				Err(e) => return Err(e.with_operation(OperationKind::BufRead)),
			}
		}
		Ok(self.buffer.count() >= byte_count)
	}
}

impl<S: Source> Drop for BufferedSource<S> {
	fn drop(&mut self) { let _ = self.close_source(); }
}

/// A [`Sink`] wrapping a raw sink with a [`Buffer`] forwarded to it once its
/// contents exceed `high_water_mark`, on explicit [`Self::emit`]/[`flush`](Sink::flush),
/// or on close.
pub struct BufferedSink<S: Sink> {
	buffer: Buffer,
	sink: S,
	high_water_mark: usize,
	closed: bool,
}

impl<S: Sink> BufferedSink<S> {
	fn new(sink: S) -> Self {
		Self {
			buffer: Buffer::new(),
			sink,
			high_water_mark: crate::DEFAULT_SEGMENT_SIZE,
			closed: false,
		}
	}

	/// Sets the number of buffered bytes that, once exceeded by a write,
	/// triggers forwarding to the downstream sink.
	pub fn with_high_water_mark(mut self, byte_count: usize) -> Self {
		self.high_water_mark = byte_count;
		self
	}

	/// Forwards everything currently buffered to the downstream sink,
	/// without flushing the downstream sink itself (the design's `emit`
	/// contract: no guarantee of a downstream flush).
	pub fn emit(&mut self) -> Result<()> {
		if self.closed {
			return Err(Error::closed(OperationKind::BufWrite));
		}
		self.sink.write_all(&mut self.buffer).with_op_buf_write()
	}

	/// Flushes any buffered bytes and unwraps this sink.
	pub fn into_inner(mut self) -> Result<S> where S: Default {
		self.flush()?;
		Ok(std::mem::take(&mut self.sink))
	}
}

impl<S: Sink> Sink for BufferedSink<S> {
	fn write(&mut self, source: &mut Buffer, count: usize) -> Result<usize> {
		if self.closed {
			return Err(Error::closed(OperationKind::BufWrite));
		}
		let n = self.buffer.write(source, count)?;
		self.after_write()?;
		Ok(n)
	}

	fn flush(&mut self) -> Result<()> {
		if self.closed {
			return Err(Error::closed(OperationKind::BufFlush));
		}
		self.emit()?;
		self.sink.flush().with_op_buf_flush()
	}

	fn close_sink(&mut self) -> Result<()> {
		if !self.closed {
			self.closed = true;
			let drain = self.sink.write_all(&mut self.buffer).map(|_| ());
			let close = self.sink.close_sink();
			drain?;
			close?;
		}
		Ok(())
	}
}

impl<S: Sink> BufStream for BufferedSink<S> {
	fn buf(&self) -> &Buffer { &self.buffer }
	fn buf_mut(&mut self) -> &mut Buffer { &mut self.buffer }
}

impl<S: Sink> BufSink for BufferedSink<S> {
	fn after_write(&mut self) -> Result<()> {
		if self.buffer.count() > self.high_water_mark {
			self.emit()?;
		}
		Ok(())
	}
}

impl<S: Sink> Drop for BufferedSink<S> {
	fn drop(&mut self) { let _ = self.close_sink(); }
}

#[cfg(test)]
mod test {
	use crate::streams::{BufSink, BufSource, BufStream, Sink, Source};
	use super::{buffer_sink, buffer_source};

	#[test]
	fn buffered_source_reads_across_multiple_pulls() {
		let mut source = buffer_source(b"hello world".as_slice());
		let mut line = String::new();
		source.read_utf8(&mut line, 5).unwrap();
		assert_eq!(line, "hello");
	}

	#[test]
	fn buffered_source_request_reports_short_read_at_eos() {
		let mut source = buffer_source(b"hi".as_slice());
		assert!(!source.request(10).unwrap());
		assert!(source.request(2).unwrap());
	}

	#[derive(Default, Clone)]
	struct SharedVecSink(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

	impl Sink for SharedVecSink {
		fn write(&mut self, source: &mut crate::Buffer, count: usize) -> crate::error::Result<usize> {
			let chunk = source.read_byte_str(count)?;
			self.0.borrow_mut().extend_from_slice(chunk.as_slice());
			Ok(chunk.len())
		}
	}

	#[test]
	fn buffered_sink_flushes_writes_through() {
		let written = SharedVecSink::default();
		let mut sink = buffer_sink(written.clone());
		sink.write_utf8("hello").unwrap();
		sink.flush().unwrap();
		assert_eq!(&*written.0.borrow(), b"hello");
	}

	#[test]
	fn buffered_sink_amortizes_small_writes_below_high_water_mark() {
		let written = SharedVecSink::default();
		let mut sink = buffer_sink(written.clone()).with_high_water_mark(1024);
		sink.write_utf8("hello").unwrap();
		assert!(written.0.borrow().is_empty(), "write below the high-water mark must stay buffered");
		sink.flush().unwrap();
		assert_eq!(&*written.0.borrow(), b"hello");
	}

	#[test]
	fn buffered_sink_forwards_once_high_water_mark_exceeded() {
		let written = SharedVecSink::default();
		let mut sink = buffer_sink(written.clone()).with_high_water_mark(4);
		sink.write_utf8("hello").unwrap();
		assert_eq!(&*written.0.borrow(), b"hello", "write exceeding the high-water mark forwards immediately");
	}

	#[test]
	fn buffered_sink_emit_does_not_flush_downstream() {
		#[derive(Default, Clone)]
		struct TrackingSink {
			written: std::rc::Rc<std::cell::RefCell<Vec<u8>>>,
			flushed: std::rc::Rc<std::cell::RefCell<bool>>,
		}
		impl Sink for TrackingSink {
			fn write(&mut self, source: &mut crate::Buffer, count: usize) -> crate::error::Result<usize> {
				let chunk = source.read_byte_str(count)?;
				self.written.borrow_mut().extend_from_slice(chunk.as_slice());
				Ok(chunk.len())
			}
			fn flush(&mut self) -> crate::error::Result<()> {
				*self.flushed.borrow_mut() = true;
				Ok(())
			}
		}

		let inner = TrackingSink::default();
		let mut sink = buffer_sink(inner.clone());
		sink.write_utf8("hello").unwrap();
		sink.emit().unwrap();
		assert_eq!(&*inner.written.borrow(), b"hello");
		assert!(!*inner.flushed.borrow(), "emit must not flush the downstream sink");
	}

	#[test]
	fn buffered_sink_drains_remaining_bytes_on_close() {
		let written = SharedVecSink::default();
		let mut sink = buffer_sink(written.clone());
		sink.buf_mut().write_from_slice(b"buffered").unwrap();
		sink.close_sink().unwrap();
		assert_eq!(&*written.0.borrow(), b"buffered");
		assert!(sink.close_sink().is_ok(), "close_sink should be idempotent");
	}
}
