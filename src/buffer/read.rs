// SPDX-License-Identifier: Apache-2.0

//! Read-side inherent methods for [`Buffer`], and its [`BufSource`] impl.
//! Mirrors `write.rs`: numeric reads go through [`Buffer::read_segments`],
//! which never copies more than once and never blocks on an upstream (a
//! plain `Buffer` has none; [`BufferedSource`](crate::buffered_wrappers::BufferedSource)
//! is what pulls more bytes in before delegating here).

use std::cmp::min;
use std::mem::size_of;
use crate::error::{Error, OperationKind, Result};
use crate::streams::BufSource;
use crate::{Buffer, ByteString};

impl Buffer {
	fn read_segments(&mut self, count: usize, mut read: impl FnMut(&[u8]) -> usize) -> usize {
		let mut remaining = count;
		while remaining > 0 {
			let Some(seg) = self.segments.front_mut() else { break };
			if seg.is_empty() { break; }
			let data = seg.data();
			let limit = min(remaining, data.len());
			let n = read(&data[..limit]);
			if n == 0 { break; }
			seg.consume(n);
			self.count -= n;
			remaining -= n;
		}
		self.pop_head_if_empty();
		count - remaining
	}

	/// Discards up to `byte_count` bytes, returning the number actually
	/// discarded.
	pub fn skip(&mut self, byte_count: usize) -> Result<usize> {
		Ok(self.read_segments(byte_count, |data| data.len()))
	}

	/// Fills `dst` with as many bytes as are available, returning the
	/// number of bytes actually read.
	pub fn read_into_slice(&mut self, dst: &mut [u8]) -> Result<usize> {
		let mut offset = 0;
		let n = self.read_segments(dst.len(), |data| {
			let n = data.len();
			dst[offset..offset + n].copy_from_slice(data);
			offset += n;
			n
		});
		Ok(n)
	}

	/// Fills `dst` exactly, failing with end-of-input (and leaving the
	/// buffer untouched) if fewer bytes are available.
	pub fn read_into_slice_exact(&mut self, dst: &mut [u8]) -> Result<()> {
		if self.count < dst.len() {
			return Err(Error::eos(OperationKind::BufRead));
		}
		self.read_into_slice(dst)?;
		Ok(())
	}

	/// Reads one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		let mut byte = [0u8; 1];
		self.read_into_slice_exact(&mut byte)?;
		Ok(byte[0])
	}

	pub fn read_i8(&mut self) -> Result<i8> { self.read_u8().map(|b| b as i8) }

	/// Reads up to `byte_count` bytes into a [`ByteString`].
	pub fn read_byte_str(&mut self, byte_count: usize) -> Result<ByteString> {
		let n = byte_count.min(self.count);
		let mut data = vec![0u8; n];
		self.read_into_slice(&mut data)?;
		Ok(ByteString::from(data))
	}

	/// Decodes one UTF-8 code point, replacing a malformed or incomplete
	/// sequence with U+FFFD while consuming only the offending bytes (the
	/// design's `readCodePoint` contract).
	pub fn read_code_point(&mut self) -> Result<u32> {
		const REPLACEMENT: u32 = 0xFFFD;
		let Some(first) = self.get(0) else {
			return Err(Error::eos(OperationKind::BufRead));
		};
		let width = utf8_char_width(first);
		if width == 0 {
			self.skip(1)?;
			return Ok(REPLACEMENT);
		}
		if self.count < width {
			// Not enough bytes buffered to resolve the sequence; treat it
			// as malformed rather than blocking (callers needing more
			// should `request` the width first).
			self.skip(self.count)?;
			return Ok(REPLACEMENT);
		}
		let mut bytes = [0u8; 4];
		for (i, b) in bytes.iter_mut().enumerate().take(width) {
			*b = self.get(i).expect("checked count above");
		}
		match std::str::from_utf8(&bytes[..width]) {
			Ok(s) => {
				let c = s.chars().next().expect("non-empty");
				self.skip(width)?;
				Ok(c as u32)
			}
			Err(_) => {
				self.skip(1)?;
				Ok(REPLACEMENT)
			}
		}
	}

	/// Reads up to `byte_count` bytes, appending valid UTF-8 decoded text to
	/// `str`. Stops at the first malformed sequence or a segment boundary
	/// that splits a multi-byte character, returning the number of source
	/// bytes consumed (which can be less than `byte_count`, including zero
	/// at a split boundary; the caller's `request`/`read_utf8` loop drives
	/// it forward one segment at a time).
	pub fn read_utf8(&mut self, str: &mut String, byte_count: usize) -> Result<usize> {
		let mut consumed = 0;
		while consumed < byte_count {
			let Some(seg) = self.segments.front() else { break };
			let data = seg.data();
			if data.is_empty() { break; }
			let limit = min(byte_count - consumed, data.len());
			let chunk = &data[..limit];
			match simdutf8::compat::from_utf8(chunk) {
				Ok(valid) => {
					str.push_str(valid);
					let n = valid.len();
					self.read_segments(n, |data| data.len());
					consumed += n;
					if n < chunk.len() { break; }
				}
				Err(e) => {
					let valid_up_to = e.valid_up_to();
					if valid_up_to > 0 {
						let valid = std::str::from_utf8(&chunk[..valid_up_to])
							.expect("validated by simdutf8");
						str.push_str(valid);
						self.read_segments(valid_up_to, |data| data.len());
						consumed += valid_up_to;
					}
					match e.error_len() {
						Some(bad_len) => {
							str.push('\u{FFFD}');
							self.read_segments(bad_len, |data| data.len());
							consumed += bad_len;
						}
						// Incomplete sequence at the end of this segment;
						// let the caller pull more bytes before retrying.
						None => break,
					}
				}
			}
		}
		Ok(consumed)
	}

	/// Reads UTF-8 text up to and including a line terminator (`"\n"` or
	/// `"\r\n"`, neither appended to `str`). Returns `false`, leaving the
	/// buffer untouched, if no terminator is present yet.
	pub fn read_utf8_line(&mut self, str: &mut String) -> Result<bool> {
		let Some(nl) = self.index_of(b'\n', 0, self.count) else { return Ok(false) };
		let strip_cr = nl > 0 && self.get(nl - 1) == Some(b'\r');
		let text_len = if strip_cr { nl - 1 } else { nl };
		let mut data = vec![0u8; text_len];
		self.read_into_slice(&mut data)?;
		str.push_str(std::str::from_utf8(&data).map_err(|_| {
			Error::malformed(OperationKind::BufRead, "invalid UTF-8 in line")
		})?);
		self.skip(nl + 1 - text_len)?;
		Ok(true)
	}

	/// Like [`Self::read_utf8_line`], but fails with end-of-input instead of
	/// returning `false` if no terminator is found within the first `limit`
	/// bytes, or before end-of-input if fewer than `limit` bytes are
	/// buffered (the design's `readLineStrict` contract).
	pub fn read_utf8_line_strict(&mut self, str: &mut String, limit: usize) -> Result<()> {
		let scan_end = limit.min(self.count);
		if self.index_of(b'\n', 0, scan_end).is_none() {
			return Err(Error::eos(OperationKind::BufRead));
		}
		self.read_utf8_line(str)?;
		Ok(())
	}

	/// Reads the decimal text representation of a signed 64-bit integer: an
	/// optional leading `-`, then one or more decimal digits, stopping at
	/// the first non-digit byte (which is left in the buffer).
	pub fn read_decimal_long(&mut self) -> Result<i64> {
		let negative = self.starts_with(b'-');
		let mut i = if negative { 1 } else { 0 };
		let mut digits = 0;
		let mut value: i64 = 0;
		loop {
			let Some(b) = self.get(i) else { break };
			if !b.is_ascii_digit() { break; }
			digits += 1;
			let digit = (b - b'0') as i64;
			value = value
				.checked_mul(10)
				.and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) })
				.ok_or_else(|| Error::malformed(OperationKind::BufRead, "decimal long overflow"))?;
			i += 1;
		}
		if digits == 0 {
			return Err(Error::malformed(OperationKind::BufRead, "no decimal digits"));
		}
		self.skip(i)?;
		Ok(value)
	}

	/// Reads the hexadecimal text representation of an unsigned 64-bit
	/// integer, stopping at the first non-hex-digit byte.
	pub fn read_hexadecimal_unsigned_long(&mut self) -> Result<u64> {
		let mut i = 0;
		let mut value: u64 = 0;
		loop {
			let Some(b) = self.get(i) else { break };
			let Some(digit) = (b as char).to_digit(16) else { break };
			if i >= 16 {
				return Err(Error::malformed(OperationKind::BufRead, "hexadecimal long overflow"));
			}
			value = (value << 4) | digit as u64;
			i += 1;
		}
		if i == 0 {
			return Err(Error::malformed(OperationKind::BufRead, "no hexadecimal digits"));
		}
		self.skip(i)?;
		Ok(value)
	}
}

/// The number of bytes a UTF-8 sequence starting with `first` occupies, or
/// `0` if `first` can never start a valid sequence (a continuation byte or
/// an invalid leading byte).
fn utf8_char_width(first: u8) -> usize {
	match first {
		0x00..=0x7F => 1,
		0xC2..=0xDF => 2,
		0xE0..=0xEF => 3,
		0xF0..=0xF4 => 4,
		_ => 0,
	}
}

macro_rules! gen_int_reads {
	($($name:ident$le_name:ident$ty:ident),+ $(,)?) => {
		impl Buffer {
			$(
			pub fn $name(&mut self) -> Result<$ty> {
				let mut bytes = [0u8; size_of::<$ty>()];
				self.read_into_slice_exact(&mut bytes)?;
				Ok($ty::from_be_bytes(bytes))
			}

			pub fn $le_name(&mut self) -> Result<$ty> {
				let mut bytes = [0u8; size_of::<$ty>()];
				self.read_into_slice_exact(&mut bytes)?;
				Ok($ty::from_le_bytes(bytes))
			}
			)+
		}
	};
}

gen_int_reads! {
	read_i16   read_i16_le   i16,
	read_u16   read_u16_le   u16,
	read_i32   read_i32_le   i32,
	read_u32   read_u32_le   u32,
	read_i64   read_i64_le   i64,
	read_u64   read_u64_le   u64,
	read_isize read_isize_le isize,
	read_usize read_usize_le usize,
}

impl BufSource for Buffer {
	fn request(&mut self, byte_count: usize) -> Result<bool> {
		self.check_open(OperationKind::BufRead)?;
		Ok(self.count >= byte_count)
	}
}

#[cfg(test)]
mod test {
	use crate::streams::BufSink;
	use crate::Buffer;

	#[test]
	fn read_utf8_line_strips_crlf() {
		let mut buf = Buffer::new();
		buf.write_utf8("hello\r\nworld\n").unwrap();
		let mut line = String::new();
		assert!(buf.read_utf8_line(&mut line).unwrap());
		assert_eq!(line, "hello");
		line.clear();
		assert!(buf.read_utf8_line(&mut line).unwrap());
		assert_eq!(line, "world");
	}

	#[test]
	fn read_utf8_line_strict_within_limit() {
		let mut buf = Buffer::new();
		buf.write_utf8("hello\nworld").unwrap();
		let mut line = String::new();
		buf.read_utf8_line_strict(&mut line, 10).unwrap();
		assert_eq!(line, "hello");
	}

	#[test]
	fn read_utf8_line_strict_fails_past_limit() {
		let mut buf = Buffer::new();
		buf.write_utf8("hello world\n").unwrap();
		let mut line = String::new();
		assert!(buf.read_utf8_line_strict(&mut line, 5).is_err());
	}

	#[test]
	fn read_utf8_line_strict_fails_without_terminator() {
		let mut buf = Buffer::new();
		buf.write_utf8("no newline").unwrap();
		let mut line = String::new();
		assert!(buf.read_utf8_line_strict(&mut line, 100).is_err());
	}

	#[test]
	fn read_utf8_line_without_terminator_is_false() {
		let mut buf = Buffer::new();
		buf.write_utf8("no newline here").unwrap();
		let mut line = String::new();
		assert!(!buf.read_utf8_line(&mut line).unwrap());
		assert_eq!(buf.count(), "no newline here".len());
	}

	#[test]
	fn read_code_point_replaces_malformed_byte() {
		let mut buf = Buffer::new();
		buf.write_u8(0xFF).unwrap();
		buf.write_utf8("a").unwrap();
		assert_eq!(buf.read_code_point().unwrap(), 0xFFFD);
		assert_eq!(buf.read_code_point().unwrap(), 'a' as u32);
	}

	#[test]
	fn read_hex_overflow_is_malformed() {
		let mut buf = Buffer::new();
		buf.write_utf8("ffffffffffffffff1").unwrap();
		assert!(buf.read_hexadecimal_unsigned_long().is_err());
	}

	#[test]
	fn read_hex_roundtrip() {
		let mut buf = Buffer::new();
		buf.write_hexadecimal_unsigned_long(0xdead_beef).unwrap();
		assert_eq!(buf.read_hexadecimal_unsigned_long().unwrap(), 0xdead_beef);
	}
}
