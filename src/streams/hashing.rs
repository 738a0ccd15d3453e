// SPDX-License-Identifier: Apache-2.0

#![cfg(feature = "hash")]

//! A hashing [`Transformation`] (`§4.5`/`§4.9`): copies every byte it sees
//! through to the sink unchanged while feeding it to a [`digest::Digest`], so
//! hash pipelines compose with [`SourceTransformExt`](super::transform::SourceTransformExt)/
//! [`SinkTransformExt`](super::transform::SinkTransformExt) exactly like GZIP.

use digest::{Digest, FixedOutputReset};
use crate::error::Result;
use crate::streams::transform::{Progress, Transformation};
use crate::{Buffer, ByteString};
use crate::streams::{BufSink, BufSource};

/// Feeds every byte passed through it to a [`Digest`] while copying the
/// bytes through unchanged, so it can sit on either side of a
/// [`Source`](super::Source)/[`Sink`](super::Sink) via `transformed_with`.
pub struct HashTransformation<H> {
	hasher: H,
}

impl<H: Digest> HashTransformation<H> {
	pub fn new() -> Self { Self { hasher: H::new() } }

	/// Reads the digest of all bytes seen so far without resetting the
	/// hasher, for algorithms that support cloning mid-stream.
	pub fn hash(&self) -> ByteString where H: Clone {
		self.hasher.clone().finalize().as_slice().into()
	}

	/// Reads the digest of all bytes seen so far and resets the hasher so
	/// the transformation can be reused for another pass.
	pub fn take_hash(&mut self) -> ByteString where H: FixedOutputReset {
		self.hasher.finalize_reset().as_slice().into()
	}
}

impl<H: Digest> Transformation for HashTransformation<H> {
	fn transform_at_most_to(&mut self, source: &mut Buffer, sink: &mut Buffer, byte_count: usize) -> Result<Progress> {
		let n = byte_count.min(source.count());
		if n == 0 {
			return Ok(Progress::Consumed(0));
		}
		let chunk = source.read_byte_str(n)?;
		self.hasher.update(chunk.as_slice());
		sink.write_byte_string(&chunk)?;
		Ok(Progress::Consumed(n))
	}

	fn finish(&mut self, _sink: &mut Buffer) -> Result<()> { Ok(()) }
}

macro_rules! hash_ctor {
	(secure $feature:literal$fn:ident$module:ident$hasher:ident) => {
		#[cfg(feature = $feature)]
		#[doc = concat!(" A ", $feature, " hashing transformation.")]
		pub fn $fn() -> HashTransformation<$module::$hasher> { HashTransformation::new() }
	};
	(broken $feature:literal$fn:ident$module:ident$hasher:ident) => {
		#[cfg(feature = $feature)]
		#[doc = concat!(" A ", $feature, " hashing transformation. Broken; use for checksums only.")]
		pub fn $fn() -> HashTransformation<$module::$hasher> { HashTransformation::new() }
	};
}

macro_rules! hash_ctors {
    ($sec:tt$feature:literal$module:ident
	$($fn:ident$hasher:ident)+
	) => {
		$(hash_ctor! { $sec$feature$fn$module$hasher })+
	};
}

hash_ctors! {
	secure "groestl" groestl
	groestl224 Groestl224
	groestl256 Groestl256
	groestl384 Groestl384
	groestl512 Groestl512
}

hash_ctors! {
	broken "md5" md5
	md5 Md5
}

hash_ctors! {
	broken "sha1" sha1
	sha1 Sha1
}

hash_ctors! {
	secure "sha2" sha2
	sha224 Sha224
	sha256 Sha256
	sha384 Sha384
	sha512 Sha512
}

hash_ctors! {
	secure "sha3" sha3
	sha3_224 Sha3_224
	sha3_256 Sha3_256
	sha3_384 Sha3_384
	sha3_512 Sha3_512
}

hash_ctors! {
	secure "shabal" shabal
	shabal192 Shabal192
	shabal224 Shabal224
	shabal256 Shabal256
	shabal384 Shabal384
	shabal512 Shabal512
}

hash_ctors! {
	secure "whirlpool" whirlpool
	whirlpool Whirlpool
}
