// SPDX-License-Identifier: Apache-2.0

//! Expert-only raw segment access (`§4.8`): bypasses the byte-at-a-time
//! read/write API to hand a callback the backing array directly. None of
//! this is `unsafe` Rust — "unsafe" here means "the contract is enforced by
//! convention, not the type system": a callback that retains the slice
//! past its call, or that reports a `consumed`/`written` count outside
//! `[0, limit-pos]`, breaks the buffer's invariants.

use std::collections::VecDeque;
use crate::pool::Pool;
use crate::segment::Segment;
use crate::{Buffer, DEFAULT_SEGMENT_SIZE};

/// A read-only view over every segment currently in a buffer, passed to the
/// callback given to [`iterate_segments`].
pub struct SegmentCursor<'a> {
	segments: &'a VecDeque<Segment<DEFAULT_SEGMENT_SIZE>>,
}

impl<'a> SegmentCursor<'a> {
	/// The number of segments.
	pub fn len(&self) -> usize { self.segments.len() }

	/// `true` iff there are no segments.
	pub fn is_empty(&self) -> bool { self.segments.is_empty() }

	/// Iterates each segment's readable `[pos, limit)` slice, head to tail.
	pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> {
		self.segments.iter().map(Segment::data)
	}
}

/// Invokes `f` with a read-only cursor over every segment in `buffer`.
pub fn iterate_segments<R>(buffer: &Buffer, f: impl FnOnce(SegmentCursor) -> R) -> R {
	f(SegmentCursor { segments: &buffer.segments })
}

/// Invokes `f(data, pos, limit)` with the head segment's full backing
/// array and its current cursors, then consumes the `consumed` bytes `f`
/// reports (clamped to `[0, limit-pos]`). Does nothing and returns `0` if
/// the buffer has no readable segment.
pub fn read_from_head(
	buffer: &mut Buffer,
	f: impl FnOnce(&[u8; DEFAULT_SEGMENT_SIZE], usize, usize) -> usize,
) -> usize {
	let Some(seg) = buffer.segments.front_mut() else { return 0 };
	let pos = seg.pos();
	let limit = seg.limit();
	let consumed = f(seg.raw(), pos, limit).min(limit - pos);
	seg.consume(consumed);
	buffer.count -= consumed;
	buffer.pop_head_if_empty();
	consumed
}

/// Ensures the tail segment has at least `min_capacity` writable bytes
/// (claiming a fresh segment from the pool if the current tail doesn't),
/// then invokes `f(data, pos, limit)` with its full backing array and
/// current cursors, and advances the write cursor by the `written` bytes
/// `f` reports (clamped to `[0, limit-pos]`, i.e. to the segment's
/// remaining capacity). `min_capacity` larger than the segment size can
/// never be satisfied; `f` still runs against whatever capacity is
/// available.
pub fn write_to_tail(
	buffer: &mut Buffer,
	min_capacity: usize,
	f: impl FnOnce(&mut [u8; DEFAULT_SEGMENT_SIZE], usize, usize) -> usize,
) -> usize {
	if buffer.segments.back().map_or(true, |s| s.writable() < min_capacity) {
		let seg = buffer.pool.take();
		buffer.segments.push_back(seg);
	}
	let seg = buffer.segments.back_mut().expect("segment just ensured above");
	let pos = seg.pos();
	let limit = seg.limit();
	let writable = seg.writable();
	let written = f(seg.raw_mut(), pos, limit).min(writable);
	seg.add(written);
	buffer.count += written;
	written
}

#[cfg(test)]
mod test {
	use crate::streams::BufSink;
	use crate::Buffer;
	use super::{iterate_segments, read_from_head, write_to_tail};

	#[test]
	fn write_to_tail_then_read_from_head_round_trips() {
		let mut buf = Buffer::new();
		let written = write_to_tail(&mut buf, 3, |data, _pos, limit| {
			data[limit] = b'h';
			data[limit + 1] = b'i';
			2
		});
		assert_eq!(written, 2);
		assert_eq!(buf.count(), 2);

		let mut out = [0u8; 2];
		let consumed = read_from_head(&mut buf, |data, pos, _limit| {
			out.copy_from_slice(&data[pos..pos + 2]);
			2
		});
		assert_eq!(consumed, 2);
		assert_eq!(&out, b"hi");
		assert_eq!(buf.count(), 0);
	}

	#[test]
	fn iterate_segments_sees_all_content() {
		let mut buf = Buffer::new();
		buf.write_utf8("hello").unwrap();
		let total: usize = iterate_segments(&buf, |cursor| cursor.iter().map(<[u8]>::len).sum());
		assert_eq!(total, 5);
	}
}
