// SPDX-License-Identifier: Apache-2.0

//! [`Buffer`]: a FIFO byte queue backed by a ring of [`Segment`]s, doubling
//! as both a [`Source`] and a [`Sink`] (see the design note on Buffer's
//! double semantics: the trait impls here and in `read`/`write` are thin
//! delegates to the inherent methods defined across this module and its
//! submodules).

mod options;
mod read;
mod write;
mod select;
mod peek;
mod unsafe_access;

pub use options::BufferOptions;
pub use select::Options;
pub use peek::PeekSource;
pub use unsafe_access::{iterate_segments, read_from_head, write_to_tail, SegmentCursor};

use std::collections::VecDeque;
use tracing::trace;
use crate::error::{Error, OperationKind, Result};
use crate::pool::{DefaultPool, Pool};
use crate::segment::{self, Segment};
use crate::streams::{BufStream, Sink, Source};
use crate::DEFAULT_SEGMENT_SIZE;

/// A FIFO byte queue: a circular arrangement of fixed-size [`Segment`]s,
/// growing at the tail as bytes are written and shrinking at the head as
/// bytes are read. Fixed at the crate's default segment size; see
/// `DESIGN.md` for why `Buffer` is concrete rather than generic over
/// segment size.
pub struct Buffer {
	pool: DefaultPool<DEFAULT_SEGMENT_SIZE>,
	segments: VecDeque<Segment<DEFAULT_SEGMENT_SIZE>>,
	count: usize,
	options: BufferOptions,
	closed: bool,
}

impl Default for Buffer {
	fn default() -> Self { Self::new() }
}

impl Buffer {
	/// Creates an empty buffer using the default pool.
	pub fn new() -> Self { Self::with_pool(DefaultPool::default()) }

	/// Creates an empty buffer backed by a specific pool.
	pub fn with_pool(pool: DefaultPool<DEFAULT_SEGMENT_SIZE>) -> Self {
		Self {
			pool,
			segments: VecDeque::new(),
			count: 0,
			options: BufferOptions::default(),
			closed: false,
		}
	}

	/// Replaces this buffer's tuning options.
	pub fn with_options(mut self, options: BufferOptions) -> Self {
		self.options = options;
		self
	}

	/// The number of readable bytes currently queued.
	pub fn count(&self) -> usize { self.count }

	/// `true` iff there are no readable bytes.
	pub fn is_empty(&self) -> bool { self.count == 0 }

	/// Recycles every segment, leaving the buffer empty. Idempotent.
	pub fn clear(&mut self) {
		for seg in self.segments.drain(..) {
			self.pool.recycle(seg);
		}
		self.count = 0;
	}

	/// The byte at logical offset `i`, or `None` if `i >= count()`.
	pub fn get(&self, i: usize) -> Option<u8> {
		if i >= self.count { return None; }
		let mut remaining = i;
		for seg in &self.segments {
			let len = seg.len();
			if remaining < len {
				return Some(seg.data()[remaining]);
			}
			remaining -= len;
		}
		None
	}

	/// `true` iff the head segment is non-empty and its first byte is
	/// `byte`.
	pub fn starts_with(&self, byte: u8) -> bool {
		self.segments.front().map_or(false, |s| !s.is_empty() && s.data()[0] == byte)
	}

	/// Scans `[start, end)` for `byte`, returning its logical index, or
	/// `None` if not found. `end` is clamped to `count()`.
	pub fn index_of(&self, byte: u8, start: usize, end: usize) -> Option<usize> {
		let end = end.min(self.count);
		if start >= end { return None; }
		let mut offset = 0;
		for seg in &self.segments {
			let len = seg.len();
			let seg_start = offset;
			let seg_end = offset + len;
			offset = seg_end;
			if seg_end <= start { continue; }
			if seg_start >= end { break; }
			let lo = start.saturating_sub(seg_start);
			let hi = (end - seg_start).min(len);
			if let Some(i) = seg.data()[lo..hi].iter().position(|&b| b == byte) {
				return Some(seg_start + lo + i);
			}
		}
		None
	}

	/// Naive substring search for `needle` starting at logical offset
	/// `start`. Does not copy buffer contents; only enough bytes are
	/// compared at each candidate position.
	pub fn index_of_bytes(&self, needle: &[u8], start: usize) -> Option<usize> {
		if needle.is_empty() { return Some(start.min(self.count)); }
		let last = self.count.checked_sub(needle.len())?;
		if start > last { return None; }
		'candidate: for i in start..=last {
			for (j, &b) in needle.iter().enumerate() {
				if self.get(i + j) != Some(b) {
					continue 'candidate;
				}
			}
			return Some(i);
		}
		None
	}

	/// Returns a deep-logical, shallow-physical clone: every segment is
	/// `share()`d, so the clone is independent (mutating either
	/// copy-on-writes) but construction is O(segment count), not O(bytes).
	pub fn copy(&self) -> Self {
		let segments = self.segments.iter().map(Segment::share_all).collect();
		Self {
			pool: self.pool.clone(),
			segments,
			count: self.count,
			options: self.options,
			closed: self.closed,
		}
	}

	/// Copies `[start, end)` into `sink`, sharing segment data where
	/// possible rather than duplicating bytes.
	pub fn copy_to(&self, sink: &mut Self, start: usize, end: usize) -> usize {
		let end = end.min(self.count);
		if start >= end { return 0; }
		let mut offset = 0;
		let mut copied = 0;
		for seg in &self.segments {
			let len = seg.len();
			let seg_start = offset;
			let seg_end = offset + len;
			offset = seg_end;
			if seg_end <= start || seg_start >= end { continue; }
			let lo = start.saturating_sub(seg_start);
			let hi = (end - seg_start).min(len);
			if hi <= lo { continue; }
			let shared = seg.share_range(lo, hi);
			copied += shared.len();
			sink.push_tail_segment(shared);
		}
		copied
	}

	/// Returns a non-consuming [`PeekSource`] snapshot of this buffer's
	/// current content: further reads or writes on either side are not
	/// visible to the other.
	pub fn peek(&self) -> PeekSource {
		let segments = self.segments.iter().map(Segment::share_all).collect();
		PeekSource::new(segments, self.count)
	}

	/// Compiles a trie over `options` for use with [`Buffer::select`].
	pub fn compile_options<B: AsRef<[u8]>>(options: impl IntoIterator<Item = B>) -> Options {
		Options::compile(options)
	}

	/// Matches the head of the buffer against a compiled [`Options`] trie,
	/// consuming and returning the index of the first fully-matched option,
	/// or leaving the buffer untouched and returning `None`.
	pub fn select(&mut self, options: &Options) -> Option<usize> {
		select::select(self, options)
	}

	fn check_open(&self, op: OperationKind) -> Result<()> {
		if self.closed {
			Err(Error::closed(op))
		} else {
			Ok(())
		}
	}

	fn tail_writable(&mut self) -> &mut Segment<DEFAULT_SEGMENT_SIZE> {
		if self.segments.back().map_or(true, Segment::is_full) {
			let seg = self.pool.take();
			self.segments.push_back(seg);
		}
		self.segments.back_mut().expect("segment just pushed")
	}

	fn push_tail_segment(&mut self, seg: Segment<DEFAULT_SEGMENT_SIZE>) {
		self.count += seg.len();
		if !seg.is_empty() {
			self.segments.push_back(seg);
		}
	}

	fn pop_head_if_empty(&mut self) {
		while self.segments.front().map_or(false, Segment::is_empty) {
			let seg = self.segments.pop_front().expect("front checked non-empty above");
			self.pool.recycle(seg);
		}
	}

	/// Compacts adjacent segments to reclaim fragmentation once the total
	/// slack exceeds the configured compact threshold (§4.2's `compact`).
	fn maybe_compact(&mut self) {
		let slack: usize = self.segments.iter().map(|s| DEFAULT_SEGMENT_SIZE - s.len()).sum();
		if slack >= self.options.compact_threshold() {
			self.compact();
		}
	}

	fn compact(&mut self) {
		let mut merged: VecDeque<Segment<DEFAULT_SEGMENT_SIZE>> = VecDeque::with_capacity(self.segments.len());
		let mut freed = 0;
		while let Some(mut seg) = self.segments.pop_front() {
			if seg.is_empty() {
				self.pool.recycle(seg);
				freed += 1;
				continue;
			}
			if let Some(prev) = merged.back_mut() {
				if segment::compact(prev, &seg) {
					seg.move_into(prev, seg.len());
					if seg.is_empty() {
						self.pool.recycle(seg);
						freed += 1;
						continue;
					}
				}
			}
			merged.push_back(seg);
		}
		if freed > 0 {
			trace!(freed, "buffer: compacted segments");
		}
		self.segments = merged;
	}

	/// Moves up to `byte_count` bytes from the head of `self` into the tail
	/// of `dst`, moving whole segments where possible and splitting a
	/// segment when `byte_count` falls in its interior. Returns the number
	/// of bytes actually moved.
	pub(crate) fn move_into(&mut self, dst: &mut Self, byte_count: usize) -> usize {
		let mut remaining = byte_count.min(self.count);
		let requested = remaining;
		while remaining > 0 {
			let Some(mut seg) = self.segments.pop_front() else { break };
			let len = seg.len();
			if len <= remaining {
				remaining -= len;
				self.count -= len;
				dst.push_tail_segment(seg);
			} else {
				let suffix = seg.split(remaining);
				self.count -= remaining;
				dst.push_tail_segment(seg);
				self.segments.push_front(suffix);
				remaining = 0;
			}
		}
		requested - remaining
	}
}

impl BufStream for Buffer {
	fn buf(&self) -> &Buffer { self }
	fn buf_mut(&mut self) -> &mut Buffer { self }
}

impl Source for Buffer {
	/// Moves up to `count` bytes from the head of `self` into `sink`'s tail.
	fn read(&mut self, sink: &mut Buffer, count: usize) -> Result<usize> {
		self.check_open(OperationKind::BufRead)?;
		Ok(self.move_into(sink, count))
	}

	fn read_all(&mut self, sink: &mut Buffer) -> Result<usize> {
		self.check_open(OperationKind::BufRead)?;
		Ok(self.move_into(sink, self.count))
	}
}

impl Sink for Buffer {
	/// Moves up to `count` bytes from `source`'s head into this buffer's
	/// tail.
	fn write(&mut self, source: &mut Buffer, count: usize) -> Result<usize> {
		self.check_open(OperationKind::BufWrite)?;
		Ok(source.move_into(self, count))
	}

	fn write_all(&mut self, source: &mut Buffer) -> Result<usize> {
		self.check_open(OperationKind::BufWrite)?;
		Ok(source.move_into(self, source.count))
	}

	fn close_sink(&mut self) -> Result<()> {
		self.closed = true;
		Ok(())
	}
}
