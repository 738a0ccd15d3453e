// SPDX-License-Identifier: Apache-2.0

//! [`Source`] and [`Sink`]: the minimal streaming endpoints a caller drives
//! by handing them a [`Buffer`] to fill or drain, and [`BufSource`]/
//! [`BufSink`]: the richer surface a [`Buffer`] itself (and anything wrapping
//! one, such as [`BufferedSource`](crate::buffered_wrappers::BufferedSource))
//! exposes once it owns the buffer it reads from or writes to.

use std::cmp::min;
use std::{fmt, mem};
use crate::error::{Error, OperationKind, Result};
use crate::streams::codec::{Decode, Encode};
use crate::{Buffer, ByteStr, ByteString, DEFAULT_SEGMENT_SIZE};

pub mod codec;
mod void;
pub mod transform;
pub mod gzip;
#[cfg(feature = "hash")]
pub mod hashing;
pub use void::*;

/// A data source: something a caller can read bytes out of by handing it a
/// buffer to append into.
pub trait Source {
	/// Reads up to `count` bytes from the source into `sink`, returning the
	/// number of bytes actually read, or an end-of-input error.
	fn read(&mut self, sink: &mut Buffer, count: usize) -> Result<usize>;

	/// Reads all remaining bytes from the source into `sink`.
	fn read_all(&mut self, sink: &mut Buffer) -> Result<usize> {
		let mut total = 0;
		loop {
			match self.read(sink, usize::MAX) {
				Ok(0) => break,
				Ok(n) => total += n,
				Err(e) if e.is_eos() => break,
				Err(e) => return Err(e),
			}
		}
		Ok(total)
	}

	/// Closes the source. Idempotent; streams close automatically on drop,
	/// so calling this explicitly is only needed to observe or propagate the
	/// close's result.
	fn close_source(&mut self) -> Result<()> { Ok(()) }
}

/// A data sink: something a caller can write bytes into by handing it a
/// buffer to drain from.
pub trait Sink {
	/// Writes `count` bytes from the head of `source` into this sink.
	fn write(&mut self, source: &mut Buffer, count: usize) -> Result<usize>;

	/// Writes all bytes currently in `source`.
	fn write_all(&mut self, source: &mut Buffer) -> Result<usize> {
		self.write(source, source.count())
	}

	/// Pushes any internally buffered data toward its final destination.
	fn flush(&mut self) -> Result<()> { Ok(()) }

	/// Flushes and closes the sink. Idempotent.
	fn close_sink(&mut self) -> Result<()> { self.flush() }
}

/// A stream (buffered source or sink) that owns a private [`Buffer`].
pub trait BufStream {
	fn buf(&self) -> &Buffer;
	fn buf_mut(&mut self) -> &mut Buffer;
}

fn calc_read_count(byte_count: usize, buf: &Buffer) -> usize {
	min(byte_count, DEFAULT_SEGMENT_SIZE.saturating_sub(buf.count()))
}

macro_rules! gen_int_reads {
	($($be_name:ident$($le_name:ident)?->$ty:ident,)+) => {
		$(gen_int_reads! { $be_name$($le_name)?->$ty })+
	};
	($be_name:ident$le_name:ident->$ty:ident) => {
		gen_int_reads! { $be_name->$ty " big-endian" }
		gen_int_reads! { $le_name->$ty " little-endian" }
	};
	($name:ident->$ty:ident$($endian:literal)?) => {
		#[doc = concat!(" Reads one", $($endian,)? " [`", stringify!($ty), "`].")]
		fn $name(&mut self) -> Result<$ty> {
			self.require(mem::size_of::<$ty>())?;
			self.buf_mut().$name()
		}
	}
}

/// The read-side surface of anything holding its own [`Buffer`]: a
/// [`Buffer`] itself, or a wrapper (buffered source, transformation) that
/// pulls more bytes into its buffer on demand.
pub trait BufSource: BufStream + Source {
	/// Fills the buffer until it holds at least `byte_count` bytes or the
	/// upstream is exhausted, returning whether `byte_count` is available.
	fn request(&mut self, byte_count: usize) -> Result<bool>;

	/// Like [`Self::request`], but fails with an end-of-input error instead
	/// of returning `false`.
	fn require(&mut self, byte_count: usize) -> Result<()> {
		if self.request(byte_count)? {
			Ok(())
		} else {
			Err(Error::eos(OperationKind::BufRead))
		}
	}

	fn read_into(&mut self, value: &mut impl Decode, byte_count: usize) -> Result<usize> {
		value.decode(self.buf_mut(), byte_count, false)
	}

	fn read_into_le(&mut self, value: &mut impl Decode, byte_count: usize) -> Result<usize> {
		value.decode(self.buf_mut(), byte_count, true)
	}

	gen_int_reads! {
		read_i8 -> i8,
		read_u8 -> u8,
		read_i16 read_i16_le -> i16,
		read_u16 read_u16_le -> u16,
		read_i32 read_i32_le -> i32,
		read_u32 read_u32_le -> u32,
		read_i64 read_i64_le -> i64,
		read_u64 read_u64_le -> u64,
		read_isize read_isize_le -> isize,
		read_usize read_usize_le -> usize,
	}

	/// Reads up to `byte_count` bytes into a [`ByteString`].
	fn read_byte_str(&mut self, byte_count: usize) -> Result<ByteString> {
		self.request(byte_count)?;
		self.buf_mut().read_byte_str(byte_count)
	}

	/// Discards `byte_count` bytes from the source.
	fn skip(&mut self, mut byte_count: usize) -> Result<usize> {
		let mut n = 0;
		while byte_count > 0 && self.request(calc_read_count(byte_count, self.buf()))? {
			let skipped = self.buf_mut().skip(byte_count)?;
			if skipped == 0 { break; }
			n += skipped;
			byte_count -= skipped;
		}
		Ok(n)
	}

	/// Fills `dst`, returning the number of bytes actually read.
	fn read_into_slice(&mut self, mut dst: &mut [u8]) -> Result<usize> {
		let mut n = 0;
		while !dst.is_empty() && self.request(calc_read_count(dst.len(), self.buf()))? {
			let read = self.buf_mut().read_into_slice(dst)?;
			if read == 0 { break; }
			n += read;
			dst = &mut dst[read..];
		}
		Ok(n)
	}

	/// Fills `dst` exactly, or fails with end-of-input leaving the source
	/// untouched.
	fn read_into_slice_exact(&mut self, dst: &mut [u8]) -> Result<()> {
		let len = dst.len();
		while self.request(len.saturating_sub(self.buf().count()))? {
			if self.buf().count() >= len { break; }
		}
		self.buf_mut().read_into_slice_exact(dst)
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let mut array = [0; N];
		self.read_into_slice_exact(&mut array)?;
		Ok(array)
	}

	/// Reads all remaining bytes, decoding as UTF-8 into `str`.
	fn read_all_utf8(&mut self, str: &mut String) -> Result<()> {
		while self.read_utf8(str, usize::MAX)? > 0 { }
		Ok(())
	}

	/// Reads at most `byte_count` bytes, decoding as UTF-8 into `str`.
	/// Returns the number of source bytes consumed.
	fn read_utf8(&mut self, str: &mut String, mut byte_count: usize) -> Result<usize> {
		let mut n = 0;
		while byte_count > 0 && self.request(calc_read_count(byte_count, self.buf()))? {
			let read = self.buf_mut().read_utf8(str, byte_count)?;
			if read == 0 { break; }
			n += read;
			byte_count -= read;
		}
		Ok(n)
	}

	/// Reads UTF-8 text up to and including a line terminator, which is not
	/// appended to `str`. Returns whether a terminator was found.
	fn read_utf8_line(&mut self, str: &mut String) -> Result<bool> {
		loop {
			if self.buf_mut().read_utf8_line(str)? {
				return Ok(true);
			}
			if !self.request(calc_read_count(usize::MAX, self.buf()).max(1))? {
				return Ok(false);
			}
		}
	}

	/// Like [`Self::read_utf8_line`], but fails with end-of-input instead of
	/// returning `false` if no terminator is found within the first `limit`
	/// bytes, or before end-of-input if fewer than `limit` bytes are
	/// available.
	fn read_utf8_line_strict(&mut self, str: &mut String, limit: usize) -> Result<()> {
		let _ = self.request(limit)?;
		self.buf_mut().read_utf8_line_strict(str, limit)
	}
}

macro_rules! gen_int_writes {
	($($be_name:ident$($le_name:ident)?->$ty:ident,)+) => {
		$(gen_int_writes! { $be_name$($le_name)?->$ty })+
	};
	($be_name:ident$le_name:ident->$ty:ident) => {
		gen_int_writes! { $be_name->$ty " big-endian" }
		gen_int_writes! { $le_name->$ty " little-endian" }
	};
	($name:ident->$ty:ident$($endian:literal)?) => {
		#[doc = concat!(" Writes one", $($endian,)? " [`", stringify!($ty), "`].")]
		fn $name(&mut self, value: $ty) -> Result<()> {
			self.buf_mut().$name(value)?;
			self.after_write()
		}
	}
}

/// The write-side surface of anything holding its own [`Buffer`].
pub trait BufSink: BufStream + Sink {
	/// Called after every write method below appends to this sink's buffer.
	/// The default is a no-op; a wrapper with a private buffer (such as
	/// [`BufferedSink`](crate::buffered_wrappers::BufferedSink)) overrides
	/// it to forward buffered bytes once they cross a high-water mark.
	fn after_write(&mut self) -> Result<()> { Ok(()) }

	/// Drains `source` entirely into this sink's buffer.
	fn write_all_from(&mut self, source: &mut impl Source) -> Result<usize> {
		let n = source.read_all(self.buf_mut())?;
		self.after_write()?;
		Ok(n)
	}

	fn write_from(&mut self, value: impl Encode) -> Result<usize> {
		let n = value.encode(self.buf_mut(), false)?;
		self.after_write()?;
		Ok(n)
	}

	fn write_from_le(&mut self, value: impl Encode) -> Result<usize> {
		let n = value.encode(self.buf_mut(), true)?;
		self.after_write()?;
		Ok(n)
	}

	gen_int_writes! {
		write_i8 -> i8,
		write_u8 -> u8,
		write_i16 write_i16_le -> i16,
		write_u16 write_u16_le -> u16,
		write_i32 write_i32_le -> i32,
		write_u32 write_u32_le -> u32,
		write_i64 write_i64_le -> i64,
		write_u64 write_u64_le -> u64,
		write_isize write_isize_le -> isize,
		write_usize write_usize_le -> usize,
	}

	fn write_byte_str(&mut self, value: &ByteStr) -> Result<()> {
		for slice in value.iter() {
			self.write_from_slice(slice)?;
		}
		Ok(())
	}

	fn write_byte_string(&mut self, value: &ByteString) -> Result<()> {
		self.write_from_slice(value.as_slice())
	}

	fn write_from_slice(&mut self, value: &[u8]) -> Result<()> {
		self.buf_mut().write_from_slice(value)?;
		self.after_write()
	}

	fn write_utf8(&mut self, value: &str) -> Result<()> {
		self.buf_mut().write_utf8(value)?;
		self.after_write()
	}
}

// Blanket Source/Sink wrapper traits, so `thing.buffer()` reads naturally at
// a call site without importing a constructor function.

pub trait SourceBuffer: Source + Sized {
	fn buffer(self) -> crate::buffered_wrappers::BufferedSource<Self> {
		crate::buffered_wrappers::buffer_source(self)
	}
}

impl<S: Source> SourceBuffer for S { }

pub trait SinkBuffer: Sink + Sized {
	fn buffer(self) -> crate::buffered_wrappers::BufferedSink<Self> {
		crate::buffered_wrappers::buffer_sink(self)
	}
}

impl<S: Sink> SinkBuffer for S { }

/// Converts some type into a [`Source`].
pub trait IntoSource<S: Source> {
	fn into_source(self) -> S;
}

impl<S: Source, T: Into<S>> IntoSource<S> for T {
	fn into_source(self) -> S { self.into() }
}

/// Converts some type into a [`Sink`].
pub trait IntoSink<S: Sink> {
	fn into_sink(self) -> S;
}

impl<S: Sink, T: Into<S>> IntoSink<S> for T {
	fn into_sink(self) -> S { self.into() }
}

impl Source for &[u8] {
	fn read(&mut self, sink: &mut Buffer, count: usize) -> Result<usize> {
		let count = min(count, self.len());
		sink.write_from_slice(&self[..count])?;
		*self = &self[count..];
		Ok(count)
	}
}

/// A UTF-8 decode error carrying the byte offset (within a larger stream)
/// at which it occurred, rather than just the offset within the slice that
/// failed to decode.
#[derive(Copy, Clone, Debug)]
pub struct OffsetUtf8Error {
	inner: simdutf8::compat::Utf8Error,
	offset: usize,
}

impl OffsetUtf8Error {
	pub(crate) fn new(inner: simdutf8::compat::Utf8Error, offset: usize) -> Self {
		Self { inner, offset }
	}

	pub fn into_inner(self) -> simdutf8::compat::Utf8Error { self.inner }

	pub fn valid_up_to(&self) -> usize { self.offset + self.inner.valid_up_to() }

	pub fn error_len(&self) -> Option<usize> { self.inner.error_len() }
}

impl fmt::Display for OffsetUtf8Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.error_len() {
			Some(len) => write!(f, "invalid UTF-8 sequence of {len} bytes from index {}", self.valid_up_to()),
			None => write!(f, "incomplete UTF-8 byte sequence from index {}", self.valid_up_to()),
		}
	}
}

impl std::error::Error for OffsetUtf8Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> { Some(&self.inner) }
}
