// SPDX-License-Identifier: Apache-2.0

//! `Encode`/`Decode` let primitive values and strings read and write
//! themselves against a [`Buffer`], so [`BufSource::read_into`] and
//! [`BufSink::write_from`] can be generic over "anything with a wire
//! encoding" without a specialized blanket impl: every concrete type below
//! gets its own explicit impl instead.

use std::cmp::min;
use std::mem;
use crate::error::Result;
use crate::Buffer;

/// Encoding behavior for a value written to a [`Buffer`].
pub trait Encode {
	/// Encodes into `buf`, little-endian if `le` is `true`. Returns the
	/// number of bytes written.
	fn encode(self, buf: &mut Buffer, le: bool) -> Result<usize>;
}

/// Decoding behavior for a value read from a [`Buffer`].
pub trait Decode {
	/// Decodes at most `byte_count` bytes from `buf`, little-endian if `le`
	/// is `true`. Returns the number of bytes consumed.
	fn decode(&mut self, buf: &mut Buffer, byte_count: usize, le: bool) -> Result<usize>;
}

// Bytes

impl Encode for &[u8] {
	fn encode(self, buf: &mut Buffer, _: bool) -> Result<usize> {
		let len = self.len();
		buf.write_from_slice(self)?;
		Ok(len)
	}
}

impl Decode for [u8] {
	fn decode(&mut self, buf: &mut Buffer, byte_count: usize, _: bool) -> Result<usize> {
		let len = min(byte_count, self.len());
		buf.read_into_slice(&mut self[..len])
	}
}

// UTF-8

impl Encode for &str {
	fn encode(self, buf: &mut Buffer, _: bool) -> Result<usize> {
		let n = self.len();
		buf.write_utf8(self)?;
		Ok(n)
	}
}

impl Decode for str {
	fn decode(&mut self, buf: &mut Buffer, byte_count: usize, _: bool) -> Result<usize> {
		// `str` has no in-place mutation path analogous to `[u8]`; callers
		// decoding text use `String` via `BufSource::read_utf8` instead.
		let _ = (buf, byte_count);
		Ok(0)
	}
}

impl Encode for &String {
	fn encode(self, buf: &mut Buffer, _: bool) -> Result<usize> {
		let n = self.len();
		buf.write_utf8(self)?;
		Ok(n)
	}
}

impl Decode for String {
	fn decode(&mut self, buf: &mut Buffer, byte_count: usize, _: bool) -> Result<usize> {
		buf.read_utf8(self, byte_count)
	}
}

// Numbers

macro_rules! gen_num_codec {
    ($($wfn:ident$rfn:ident$($wfn_le:ident$rfn_le:ident)?->$ty:ident,)+) => {
		$(gen_num_codec! { $wfn$rfn$($wfn_le$rfn_le)?$ty })+
	};
	($wfn:ident$rfn:ident$wfn_le:ident$rfn_le:ident$ty:ident) => {
		impl Encode for $ty {
			fn encode(self, buf: &mut Buffer, le: bool) -> Result<usize> {
				if le { buf.$wfn_le(self)?; } else { buf.$wfn(self)?; }
				Ok(mem::size_of::<$ty>())
			}
		}
		impl Decode for $ty {
			fn decode(&mut self, buf: &mut Buffer, byte_count: usize, le: bool) -> Result<usize> {
				if byte_count < mem::size_of::<$ty>() {
					return Ok(0)
				}
				*self = if le { buf.$rfn_le()? } else { buf.$rfn()? };
				Ok(mem::size_of::<$ty>())
			}
		}
	};
	($wfn:ident$rfn:ident$ty:ident) => {
		impl Encode for $ty {
			fn encode(self, buf: &mut Buffer, _: bool) -> Result<usize> {
				buf.$wfn(self)?;
				Ok(1)
			}
		}
		impl Decode for $ty {
			fn decode(&mut self, buf: &mut Buffer, byte_count: usize, _: bool) -> Result<usize> {
				if byte_count == 0 { return Ok(0) }
				*self = buf.$rfn()?;
				Ok(1)
			}
		}
	};
}

gen_num_codec! {
	write_i8 read_i8 -> i8,
	write_u8 read_u8 -> u8,
	write_i16 read_i16 write_i16_le read_i16_le -> i16,
	write_u16 read_u16 write_u16_le read_u16_le -> u16,
	write_i32 read_i32 write_i32_le read_i32_le -> i32,
	write_u32 read_u32 write_u32_le read_u32_le -> u32,
	write_i64 read_i64 write_i64_le read_i64_le -> i64,
	write_u64 read_u64 write_u64_le read_u64_le -> u64,
	write_isize read_isize write_isize_le read_isize_le -> isize,
	write_usize read_usize write_usize_le read_usize_le -> usize,
}
