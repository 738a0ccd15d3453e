// SPDX-License-Identifier: Apache-2.0

//! Write-side inherent methods for [`Buffer`], and its [`BufSink`] impl.
//! Numeric writes go through [`Buffer::write_segments`], which allocates
//! tail capacity from the pool on demand and never copies more than once.

use std::cmp::min;
use crate::error::Result;
use crate::streams::BufSink;
use crate::Buffer;

impl Buffer {
	fn write_segments(&mut self, count: usize, mut write: impl FnMut(&mut [u8]) -> usize) -> usize {
		let mut remaining = count;
		while remaining > 0 {
			let seg = self.tail_writable();
			let writable = seg.writable();
			if writable == 0 { break; }
			let n = {
				let data = seg.data_mut();
				let limit = min(remaining, data.len());
				write(&mut data[..limit])
			};
			if n == 0 { break; }
			seg.add(n);
			self.count += n;
			remaining -= n;
		}
		count - remaining
	}

	/// Copies all of `value` into the tail, allocating segments as needed.
	pub fn write_from_slice(&mut self, mut value: &[u8]) -> Result<()> {
		while !value.is_empty() {
			let n = self.write_segments(value.len(), |dst| {
				let n = min(dst.len(), value.len());
				dst[..n].copy_from_slice(&value[..n]);
				n
			});
			debug_assert!(n > 0, "tail_writable always yields a non-full segment");
			value = &value[n..];
		}
		self.maybe_compact();
		Ok(())
	}

	pub fn write_u8(&mut self, value: u8) -> Result<()> {
		self.write_segments(1, |dst| { dst[0] = value; 1 });
		Ok(())
	}

	pub fn write_i8(&mut self, value: i8) -> Result<()> { self.write_u8(value as u8) }

	/// Encodes the code point to 1-4 UTF-8 bytes, rejecting surrogates and
	/// out-of-range values by writing the replacement byte `?` (0x3F), per
	/// the design's `writeCodePoint` contract.
	pub fn write_code_point(&mut self, cp: u32) -> Result<()> {
		match char::from_u32(cp) {
			Some(c) => {
				let mut buf = [0u8; 4];
				self.write_from_slice(c.encode_utf8(&mut buf).as_bytes())
			}
			None => self.write_u8(b'?'),
		}
	}

	/// Writes UTF-8 text.
	pub fn write_utf8(&mut self, value: &str) -> Result<()> {
		self.write_from_slice(value.as_bytes())
	}

	/// Writes the signed decimal representation of `v`, computing its
	/// length first so the digits are filled right-to-left without
	/// allocation.
	pub fn write_decimal_long(&mut self, v: i64) -> Result<()> {
		let mut buf = [0u8; 20];
		let text = format_decimal(v, &mut buf);
		self.write_from_slice(text)
	}

	/// Writes the minimal unsigned hexadecimal representation of `v`
	/// (`"0"` for `v == 0`).
	pub fn write_hexadecimal_unsigned_long(&mut self, v: u64) -> Result<()> {
		let mut buf = [0u8; 16];
		let text = format_hex(v, &mut buf);
		self.write_from_slice(text)
	}
}

fn format_decimal(v: i64, buf: &mut [u8; 20]) -> &[u8] {
	if v == 0 { buf[19] = b'0'; return &buf[19..]; }
	let negative = v < 0;
	// `i64::MIN` has no positive counterpart; work in u64 via wrapping
	// negation so the boundary value round-trips exactly.
	let mut mag = if negative { (v as i128).unsigned_abs() as u64 } else { v as u64 };
	let mut i = 20;
	while mag > 0 {
		i -= 1;
		buf[i] = b'0' + (mag % 10) as u8;
		mag /= 10;
	}
	if negative {
		i -= 1;
		buf[i] = b'-';
	}
	&buf[i..]
}

fn format_hex(v: u64, buf: &mut [u8; 16]) -> &[u8] {
	if v == 0 { buf[15] = b'0'; return &buf[15..]; }
	const DIGITS: &[u8; 16] = b"0123456789abcdef";
	let mut mag = v;
	let mut i = 16;
	while mag > 0 {
		i -= 1;
		buf[i] = DIGITS[(mag & 0xF) as usize];
		mag >>= 4;
	}
	&buf[i..]
}

macro_rules! gen_int_writes {
	($($name:ident$le_name:ident$ty:ident),+ $(,)?) => {
		impl Buffer {
			$(
			pub fn $name(&mut self, value: $ty) -> Result<()> {
				self.write_from_slice(&value.to_be_bytes())
			}

			pub fn $le_name(&mut self, value: $ty) -> Result<()> {
				self.write_from_slice(&value.to_le_bytes())
			}
			)+
		}
	};
}

gen_int_writes! {
	write_i16   write_i16_le   i16,
	write_u16   write_u16_le   u16,
	write_i32   write_i32_le   i32,
	write_u32   write_u32_le   u32,
	write_i64   write_i64_le   i64,
	write_u64   write_u64_le   u64,
	write_isize write_isize_le isize,
	write_usize write_usize_le usize,
}

impl BufSink for Buffer { }
