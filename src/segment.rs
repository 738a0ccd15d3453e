// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed-capacity byte pages and the ring of them a [`Buffer`](crate::Buffer)
//! is made of.
//!
//! A [`Segment`] owns its backing array through an [`Rc`], which doubles as
//! the "shared" flag from the design: `Rc::strong_count(&data) > 1` means at
//! least one other segment can see the same bytes. `share`/`split` clone the
//! `Rc`; any write goes through [`Rc::make_mut`], which copies the array the
//! moment it finds more than one owner. That single call is the entire
//! copy-on-write mechanism — there is no separate unshare step to forget.

use std::rc::Rc;
use crate::DEFAULT_SEGMENT_SIZE;

/// A fixed-capacity contiguous byte page with read (`pos`) and write
/// (`limit`) cursors.
pub struct Segment<const N: usize = DEFAULT_SEGMENT_SIZE> {
	data: Rc<[u8; N]>,
	pos: usize,
	limit: usize,
}

impl<const N: usize> Segment<N> {
	/// Returns a new, empty segment with the full capacity writable.
	pub fn empty() -> Self {
		Self { data: Rc::new([0; N]), pos: 0, limit: 0 }
	}

	/// The number of readable bytes, `limit - pos`.
	pub fn len(&self) -> usize { self.limit - self.pos }

	/// `true` iff there are no readable bytes.
	pub fn is_empty(&self) -> bool { self.pos == self.limit }

	/// `true` iff there is no writable capacity left.
	pub fn is_full(&self) -> bool { self.limit == N }

	/// The read cursor.
	pub fn pos(&self) -> usize { self.pos }

	/// The write cursor.
	pub fn limit(&self) -> usize { self.limit }

	/// The number of bytes that can still be written, `N - limit`.
	pub fn writable(&self) -> usize { N - self.limit }

	/// `true` iff this segment's data is visible to another segment.
	pub fn is_shared(&self) -> bool { Rc::strong_count(&self.data) > 1 }

	/// The readable slice `[pos, limit)`.
	pub fn data(&self) -> &[u8] { &self.data[self.pos..self.limit] }

	/// The writable slice `[limit, N)`, copy-on-writing first if shared.
	pub fn data_mut(&mut self) -> &mut [u8] {
		let limit = self.limit;
		&mut Rc::make_mut(&mut self.data)[limit..]
	}

	/// The full backing array, for expert callers that need raw access to
	/// bytes outside `[pos, limit)` alongside the cursors themselves.
	pub fn raw(&self) -> &[u8; N] { &self.data }

	/// The full backing array, mutably, copy-on-writing first if shared.
	pub fn raw_mut(&mut self) -> &mut [u8; N] { Rc::make_mut(&mut self.data) }

	/// Returns a new segment sharing this segment's full readable range.
	/// Both segments may be read from independently; either will
	/// copy-on-write before mutating.
	pub fn share_all(&self) -> Self { self.share(self.len()) }

	/// Returns a new segment sharing the first `byte_count` readable bytes
	/// of this segment. Does not consume those bytes from `self`; callers
	/// implementing `split` advance `self`'s `pos` themselves.
	pub fn share(&self, byte_count: usize) -> Self {
		assert!(byte_count <= self.len(), "share byte_count exceeds segment length");
		Self { data: Rc::clone(&self.data), pos: self.pos, limit: self.pos + byte_count }
	}

	/// Returns a new segment sharing the sub-range `[start, end)` of this
	/// segment's readable data (offsets relative to `pos`).
	pub fn share_range(&self, start: usize, end: usize) -> Self {
		assert!(start <= end && end <= self.len(), "share_range out of bounds");
		Self { data: Rc::clone(&self.data), pos: self.pos + start, limit: self.pos + end }
	}

	/// Splits this segment at `offset` bytes from `pos`, returning the
	/// suffix `[pos+offset, limit)` as a new segment sharing this one's
	/// data, and truncating `self` to the prefix `[pos, pos+offset)`.
	pub fn split(&mut self, offset: usize) -> Self {
		assert!(offset <= self.len(), "split offset exceeds segment length");
		let suffix = Self {
			data: Rc::clone(&self.data),
			pos: self.pos + offset,
			limit: self.limit,
		};
		self.limit = self.pos + offset;
		suffix
	}

	/// Resets the cursors to empty, dropping the reference to the shared
	/// data (the backing array is reused only if this is the sole owner).
	pub fn clear(&mut self) {
		self.pos = 0;
		self.limit = 0;
	}

	/// Shifts the readable range to start at index 0, compacting away the
	/// already-consumed prefix.
	pub fn shift(&mut self) {
		if self.pos == 0 { return; }
		let len = self.len();
		if len > 0 {
			let data = Rc::make_mut(&mut self.data);
			data.copy_within(self.pos..self.limit, 0);
		}
		self.pos = 0;
		self.limit = len;
	}

	/// Marks `n` bytes as consumed from the front.
	pub fn consume(&mut self, n: usize) {
		assert!(n <= self.len(), "consume n exceeds segment length");
		self.pos += n;
	}

	/// Marks `n` bytes as written to the back.
	pub fn add(&mut self, n: usize) {
		assert!(n <= self.writable(), "add n exceeds segment capacity");
		self.limit += n;
	}

	/// Moves up to `byte_count` bytes from `self` into `other`'s writable
	/// tail, returning the number of bytes actually moved.
	pub fn move_into(&mut self, other: &mut Self, byte_count: usize) -> usize {
		let n = byte_count.min(self.len()).min(other.writable());
		if n == 0 { return 0; }
		let src = self.data()[..n].to_vec();
		other.data_mut()[..n].copy_from_slice(&src);
		other.add(n);
		self.consume(n);
		n
	}

	/// Pushes one byte, returning `false` if the segment is full.
	pub fn push(&mut self, byte: u8) -> bool {
		if self.is_full() { return false; }
		self.data_mut()[0] = byte;
		self.limit += 1;
		true
	}

	/// Pops one byte from the front.
	pub fn pop(&mut self) -> Option<u8> {
		if self.is_empty() { return None; }
		let byte = self.data()[0];
		self.pos += 1;
		Some(byte)
	}

	/// Copies as much of `bytes` as fits into the writable tail, returning
	/// the number of bytes written.
	pub fn push_slice(&mut self, bytes: &[u8]) -> usize {
		let n = bytes.len().min(self.writable());
		self.data_mut()[..n].copy_from_slice(&bytes[..n]);
		self.limit += n;
		n
	}

	/// Copies as much of the readable range into `bytes` as fits, returning
	/// the number of bytes read.
	pub fn pop_into_slice(&mut self, bytes: &mut [u8]) -> usize {
		let n = bytes.len().min(self.len());
		bytes[..n].copy_from_slice(&self.data()[..n]);
		self.pos += n;
		n
	}
}

impl<const N: usize> Default for Segment<N> {
	fn default() -> Self { Self::empty() }
}

/// `compact(prev)` from the design: if `self`'s bytes fit in `prev`'s
/// remaining capacity and `prev` is not shared, copies `self` into `prev`
/// and returns `true` (the caller unlinks and recycles `self`).
pub fn compact<const N: usize>(prev: &mut Segment<N>, this: &Segment<N>) -> bool {
	!prev.is_shared() && this.len() <= prev.writable()
}
