// SPDX-License-Identifier: Apache-2.0

use orio::streams::{BufSink, BufSource, BufStream, Sink, Source, SinkBuffer, SourceBuffer};
use orio::Buffer;

const TEXT: &str = "the quick brown fox jumps over the lazy dog, repeated a few times. \
the quick brown fox jumps over the lazy dog, repeated a few times.";

#[test]
fn read_all_pulls_everything_from_the_wrapped_source() {
	let mut source = TEXT.as_bytes().buffer();
	let mut buffer = Buffer::default();
	assert_eq!(source.read_all(&mut buffer).unwrap(), TEXT.len());
	let mut string = String::with_capacity(TEXT.len());
	buffer.read_all_utf8(&mut string).unwrap();
	assert_eq!(string, TEXT);
}

#[test]
fn skip_then_read_advances_past_the_skipped_bytes() {
	let mut source = TEXT.as_bytes().buffer();
	assert_eq!(source.skip(10).unwrap(), 10);
	let mut string = String::new();
	assert_eq!(source.read_utf8(&mut string, 5).unwrap(), 5);
	assert_eq!(string, TEXT[10..][..5]);
}

#[derive(Default)]
struct VecSink {
	vec: Vec<u8>,
}

impl Sink for VecSink {
	fn write(&mut self, source: &mut Buffer, count: usize) -> orio::error::Result<usize> {
		let count = count.min(source.count());
		let chunk = source.read_byte_str(count)?;
		self.vec.extend_from_slice(chunk.as_slice());
		Ok(chunk.len())
	}
}

#[test]
fn write_all_drains_the_whole_source_through_the_buffer() {
	let mut file = TEXT.as_bytes();
	let mut sink = VecSink::default().buffer();
	let mut staging = Buffer::default();
	file.read_all(&mut staging).unwrap();
	assert_eq!(sink.write_all(&mut staging).unwrap(), TEXT.len());
	let written = sink.into_inner().unwrap().vec;
	assert_eq!(String::from_utf8(written).unwrap(), TEXT);
}

#[test]
fn write_writes_only_the_requested_count() {
	let mut sink = VecSink::default().buffer();
	let mut staging = Buffer::default();
	staging.write_utf8(TEXT).unwrap();
	assert_eq!(sink.write(&mut staging, 32).unwrap(), 32);
	let written = sink.into_inner().unwrap().vec;
	assert_eq!(String::from_utf8(written).unwrap(), &TEXT[..32]);
}

#[test]
fn buffered_source_request_reports_whether_enough_bytes_are_available() {
	let mut source = b"short".as_slice().buffer();
	assert!(!source.request(100).unwrap());
	assert!(source.request(5).unwrap());
	assert_eq!(source.buf().count(), 5);
}

#[test]
fn buffered_sink_close_is_idempotent_and_flushes_pending_bytes() {
	let mut sink = VecSink::default().buffer();
	sink.buf_mut().write_from_slice(b"pending").unwrap();
	sink.close_sink().unwrap();
	sink.close_sink().unwrap();
	assert_eq!(sink.into_inner().unwrap().vec, b"pending");
}
