// SPDX-License-Identifier: Apache-2.0

#![cfg(feature = "hash")]

use orio::streams::transform::{SinkTransformExt, SourceTransformExt};
use orio::streams::void_sink;
use orio::streams::{BufSink, Sink, Source};
use orio::Buffer;

#[cfg(feature = "sha2")]
#[test]
fn hash_source_over_many_segments_matches_direct_digest() {
	use digest::Digest;
	use orio::streams::hashing::sha256;

	let data = vec![b'z'; orio::DEFAULT_SEGMENT_SIZE * 3 + 17];
	let expected: orio::ByteString = sha2::Sha256::digest(&data).as_slice().into();

	let mut source = data.as_slice().transformed_with(sha256());
	let mut drained = Buffer::default();
	let read = source.read_all(&mut drained).unwrap();

	assert_eq!(read, data.len());
	assert_eq!(drained.count(), data.len());
	assert_eq!(source.transform().hash(), expected);
}

#[cfg(feature = "sha2")]
#[test]
fn hash_sink_discards_bytes_into_a_void_sink_while_hashing() {
	use digest::Digest;
	use orio::streams::hashing::sha256;

	let data = vec![b'q'; orio::DEFAULT_SEGMENT_SIZE + 1];
	let expected: orio::ByteString = sha2::Sha256::digest(&data).as_slice().into();

	let mut sink = void_sink().transformed_with(sha256());
	let mut buf = Buffer::default();
	buf.write_from_slice(&data).unwrap();
	sink.write_all(&mut buf).unwrap();
	sink.close_sink().unwrap();

	assert_eq!(sink.transform().hash(), expected);
}

#[cfg(feature = "sha2")]
#[test]
fn take_hash_resets_the_hasher_for_reuse() {
	use orio::streams::transform::Transformation;
	use orio::streams::hashing::sha256;

	let mut hasher = sha256();
	let mut first_in = Buffer::default();
	first_in.write_utf8("first message").unwrap();
	let mut scratch = Buffer::default();
	hasher.transform_at_most_to(&mut first_in, &mut scratch, usize::MAX).unwrap();
	let first_hash = hasher.take_hash();

	let mut second_in = Buffer::default();
	second_in.write_utf8("second message").unwrap();
	scratch.clear();
	hasher.transform_at_most_to(&mut second_in, &mut scratch, usize::MAX).unwrap();
	let second_hash = hasher.take_hash();

	assert_ne!(first_hash, second_hash);
}

#[cfg(all(feature = "md5", feature = "sha1"))]
#[test]
fn different_algorithms_over_the_same_bytes_disagree() {
	use orio::streams::hashing::{md5, sha1};

	let data = b"the quick brown fox jumps over the lazy dog".to_vec();

	let mut md5_source = data.as_slice().transformed_with(md5());
	let mut drained = Buffer::default();
	md5_source.read_all(&mut drained).unwrap();
	let md5_hash = md5_source.transform().hash();

	let mut sha1_source = data.as_slice().transformed_with(sha1());
	let mut drained = Buffer::default();
	sha1_source.read_all(&mut drained).unwrap();
	let sha1_hash = sha1_source.transform().hash();

	assert_ne!(md5_hash.as_slice(), sha1_hash.as_slice());
}
