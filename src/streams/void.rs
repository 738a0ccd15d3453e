// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::streams::{Sink, Source};
use crate::Buffer;

/// Returns a [`Sink`] that writes to nowhere, dropping any data written to
/// it.
pub fn void_sink() -> VoidSink { VoidSink }

/// Returns a [`Source`] that reads from nowhere, producing no data.
pub fn void_source() -> VoidSource { VoidSource }

/// A [`Sink`] that writes to nowhere, dropping any data written to it.
#[derive(Copy, Clone, Debug, Default)]
pub struct VoidSink;

impl Sink for VoidSink {
	/// Discards `count` bytes from `source`.
	fn write(&mut self, source: &mut Buffer, count: usize) -> Result<usize> {
		source.skip(count)
	}
}

/// A [`Source`] that reads from nowhere, producing no data.
#[derive(Copy, Clone, Debug, Default)]
pub struct VoidSource;

impl Source for VoidSource {
	/// Reads nothing, returning `0`.
	fn read(&mut self, _sink: &mut Buffer, _count: usize) -> Result<usize> { Ok(0) }
}
