// SPDX-License-Identifier: Apache-2.0

//! [`PeekSource`]: a non-consuming read view over a snapshot of a
//! [`Buffer`]'s segments (`§4.3`'s peek semantics). Reads from the peek and
//! reads/writes on the buffer it was taken from are independent of each
//! other: the segments were `share()`d at snapshot time, so peek reads only
//! ever copy-on-write its own copies.

use std::collections::VecDeque;
use crate::error::Result;
use crate::segment::Segment;
use crate::streams::Source;
use crate::{Buffer, DEFAULT_SEGMENT_SIZE};

/// A snapshot source returned by [`Buffer::peek`].
pub struct PeekSource {
	segments: VecDeque<Segment<DEFAULT_SEGMENT_SIZE>>,
	count: usize,
}

impl PeekSource {
	pub(super) fn new(segments: VecDeque<Segment<DEFAULT_SEGMENT_SIZE>>, count: usize) -> Self {
		Self { segments, count }
	}

	/// The number of bytes remaining to be read from this snapshot.
	pub fn count(&self) -> usize { self.count }

	/// `true` iff the snapshot has been fully read.
	pub fn is_empty(&self) -> bool { self.count == 0 }
}

impl Source for PeekSource {
	fn read(&mut self, sink: &mut Buffer, count: usize) -> Result<usize> {
		let mut remaining = count.min(self.count);
		let requested = remaining;
		while remaining > 0 {
			let Some(mut seg) = self.segments.pop_front() else { break };
			let len = seg.len();
			if len <= remaining {
				remaining -= len;
				self.count -= len;
				sink.push_tail_segment(seg);
			} else {
				let suffix = seg.split(remaining);
				self.count -= remaining;
				sink.push_tail_segment(seg);
				self.segments.push_front(suffix);
				remaining = 0;
			}
		}
		Ok(requested - remaining)
	}

	fn read_all(&mut self, sink: &mut Buffer) -> Result<usize> {
		let count = self.count;
		self.read(sink, count)
	}
}

#[cfg(test)]
mod test {
	use crate::streams::{BufSink, Source};
	use crate::Buffer;

	#[test]
	fn peek_is_independent_of_original() {
		let mut buf = Buffer::new();
		buf.write_utf8("hello world").unwrap();
		let mut peek = buf.peek();

		let mut head = Buffer::new();
		peek.read(&mut head, 5).unwrap();
		let mut text = String::new();
		head.read_utf8(&mut text, usize::MAX).unwrap();
		assert_eq!(text, "hello");
		assert_eq!(buf.count(), 11, "reading the peek must not drain the original");

		let mut all = Buffer::new();
		buf.read_all(&mut all).unwrap();
		let mut all_text = String::new();
		all.read_utf8(&mut all_text, usize::MAX).unwrap();
		assert_eq!(all_text, "hello world");

		let mut rest = Buffer::new();
		peek.read_all(&mut rest).unwrap();
		let mut rest_text = String::new();
		rest.read_utf8(&mut rest_text, usize::MAX).unwrap();
		assert_eq!(rest_text, " world");
	}
}
