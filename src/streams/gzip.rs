// SPDX-License-Identifier: Apache-2.0

//! GZIP framing (RFC 1952) over a raw DEFLATE (RFC 1951) body, implemented
//! as a [`Transformation`]. The header/trailer are hand-rolled; the
//! DEFLATE codec itself is `flate2::{Compress, Decompress}` and the
//! trailer checksum is `crc32fast`.
//!
//! The decoder's states mirror `§4.9`: *header-parsing* (itself a small
//! sub-machine over the optional FEXTRA/FNAME/FCOMMENT/FHCRC fields) →
//! *inflating* → *trailer-verifying* → *finished*. Each is driven by
//! [`Transformation::transform_at_most_to`]; insufficient input returns
//! `Progress::Consumed(0)`, never an error, so the caller simply feeds more
//! bytes and calls again.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use crc32fast::Hasher;
use crate::error::{Error, OperationKind, Result};
use crate::streams::transform::{Progress, Transformation};
use crate::Buffer;

const MAGIC: [u8; 2] = [0x1F, 0x8B];
const METHOD_DEFLATE: u8 = 0x08;
const FLAG_FHCRC: u8 = 0x02;
const FLAG_FEXTRA: u8 = 0x04;
const FLAG_FNAME: u8 = 0x08;
const FLAG_FCOMMENT: u8 = 0x10;
const SCRATCH_SIZE: usize = 8192;

/// Tuning and header metadata for a [`GzipEncoder`].
#[derive(Clone, Debug)]
pub struct GzipOptions {
	level: u32,
	mtime: u32,
	xfl: u8,
	os: u8,
	fname: Option<String>,
	fcomment: Option<String>,
	fhcrc: bool,
}

impl Default for GzipOptions {
	fn default() -> Self {
		Self { level: 6, mtime: 0, xfl: 0, os: 255, fname: None, fcomment: None, fhcrc: false }
	}
}

impl GzipOptions {
	/// Sets the DEFLATE compression level, clamped to `1..=9`.
	pub fn with_level(mut self, level: u32) -> Self {
		self.level = level.clamp(1, 9);
		self
	}

	pub fn with_mtime(mut self, mtime: u32) -> Self { self.mtime = mtime; self }
	pub fn with_xfl(mut self, xfl: u8) -> Self { self.xfl = xfl; self }
	pub fn with_os(mut self, os: u8) -> Self { self.os = os; self }

	pub fn with_fname(mut self, name: impl Into<String>) -> Self {
		self.fname = Some(name.into());
		self
	}

	pub fn with_fcomment(mut self, comment: impl Into<String>) -> Self {
		self.fcomment = Some(comment.into());
		self
	}

	/// Whether to emit the optional two-byte header CRC (FHCRC).
	pub fn with_fhcrc(mut self, enabled: bool) -> Self { self.fhcrc = enabled; self }

	pub fn level(&self) -> u32 { self.level }
}

/// Compresses a byte stream into GZIP framing.
pub struct GzipEncoder {
	options: GzipOptions,
	compress: Compress,
	crc: Hasher,
	total_in: u32,
	header_written: bool,
	finished: bool,
}

impl GzipEncoder {
	pub fn new(options: GzipOptions) -> Self {
		let compress = Compress::new(Compression::new(options.level), false);
		Self { options, compress, crc: Hasher::new(), total_in: 0, header_written: false, finished: false }
	}

	fn header_bytes(&self) -> Vec<u8> {
		let mut flg = 0u8;
		if self.options.fname.is_some() { flg |= FLAG_FNAME; }
		if self.options.fcomment.is_some() { flg |= FLAG_FCOMMENT; }
		if self.options.fhcrc { flg |= FLAG_FHCRC; }

		let mut header = Vec::with_capacity(10);
		header.extend_from_slice(&MAGIC);
		header.push(METHOD_DEFLATE);
		header.push(flg);
		header.extend_from_slice(&self.options.mtime.to_le_bytes());
		header.push(self.options.xfl);
		header.push(self.options.os);
		if let Some(name) = &self.options.fname {
			header.extend_from_slice(name.as_bytes());
			header.push(0);
		}
		if let Some(comment) = &self.options.fcomment {
			header.extend_from_slice(comment.as_bytes());
			header.push(0);
		}
		if self.options.fhcrc {
			let crc16 = (crc32fast::hash(&header) & 0xFFFF) as u16;
			header.extend_from_slice(&crc16.to_le_bytes());
		}
		header
	}

	fn compress_into(&mut self, input: &[u8], sink: &mut Buffer, flush: FlushCompress) -> Result<Status> {
		let mut remaining = input;
		let mut scratch = [0u8; SCRATCH_SIZE];
		loop {
			let before_in = self.compress.total_in();
			let before_out = self.compress.total_out();
			let status = self
				.compress
				.compress(remaining, &mut scratch, flush)
				.map_err(|e| Error::format_mismatch(OperationKind::Transform, e.to_string()))?;
			let consumed = (self.compress.total_in() - before_in) as usize;
			let produced = (self.compress.total_out() - before_out) as usize;
			if produced > 0 {
				sink.write_from_slice(&scratch[..produced])?;
			}
			remaining = &remaining[consumed..];
			if status == Status::StreamEnd || (remaining.is_empty() && produced == 0) {
				return Ok(status);
			}
		}
	}
}

impl Transformation for GzipEncoder {
	fn transform_at_most_to(&mut self, source: &mut Buffer, sink: &mut Buffer, byte_count: usize) -> Result<Progress> {
		if !self.header_written {
			let header = self.header_bytes();
			sink.write_from_slice(&header)?;
			self.header_written = true;
		}
		let n = byte_count.min(source.count());
		if n == 0 {
			return Ok(Progress::Consumed(0));
		}
		let chunk = source.read_byte_str(n)?;
		let data = chunk.as_slice();
		self.crc.update(data);
		self.total_in = self.total_in.wrapping_add(data.len() as u32);
		self.compress_into(data, sink, FlushCompress::None)?;
		Ok(Progress::Consumed(n))
	}

	fn finish(&mut self, sink: &mut Buffer) -> Result<()> {
		if self.finished {
			return Ok(());
		}
		if !self.header_written {
			let header = self.header_bytes();
			sink.write_from_slice(&header)?;
			self.header_written = true;
		}
		self.compress_into(&[], sink, FlushCompress::Finish)?;
		sink.write_u32_le(self.crc.clone().finalize())?;
		sink.write_u32_le(self.total_in)?;
		self.finished = true;
		Ok(())
	}
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum State {
	Header,
	Body,
	Trailer,
	Done,
}

/// Decompresses a GZIP stream, validating the trailer's CRC32 and length.
pub struct GzipDecoder {
	decompress: Decompress,
	state: State,
	crc: Hasher,
	total_out: u32,
}

impl GzipDecoder {
	pub fn new() -> Self {
		Self { decompress: Decompress::new(false), state: State::Header, crc: Hasher::new(), total_out: 0 }
	}

	/// Returns the full header length if enough bytes are buffered to
	/// parse every field, or `None` if more input is needed. Peeks only;
	/// never consumes.
	fn try_parse_header(source: &Buffer) -> Result<Option<usize>> {
		let count = source.count();
		if count < 10 {
			return Ok(None);
		}
		let byte = |i: usize| source.get(i).expect("checked count above");
		if [byte(0), byte(1)] != MAGIC {
			return Err(Error::format_mismatch(OperationKind::Transform, "bad gzip magic bytes"));
		}
		if byte(2) != METHOD_DEFLATE {
			return Err(Error::format_mismatch(OperationKind::Transform, "unsupported gzip compression method"));
		}
		let flg = byte(3);
		let mut offset = 10;
		if flg & FLAG_FEXTRA != 0 {
			if count < offset + 2 {
				return Ok(None);
			}
			let xlen = u16::from_le_bytes([byte(offset), byte(offset + 1)]) as usize;
			offset += 2;
			if count < offset + xlen {
				return Ok(None);
			}
			offset += xlen;
		}
		if flg & FLAG_FNAME != 0 {
			loop {
				if offset >= count {
					return Ok(None);
				}
				let b = byte(offset);
				offset += 1;
				if b == 0 { break; }
			}
		}
		if flg & FLAG_FCOMMENT != 0 {
			loop {
				if offset >= count {
					return Ok(None);
				}
				let b = byte(offset);
				offset += 1;
				if b == 0 { break; }
			}
		}
		if flg & FLAG_FHCRC != 0 {
			if count < offset + 2 {
				return Ok(None);
			}
			offset += 2;
		}
		Ok(Some(offset))
	}

	/// Copies up to one scratch buffer's worth of the head of `source`
	/// (without consuming it), feeds it to the inflater, writes any
	/// produced bytes to `sink`, then consumes only the input bytes the
	/// inflater actually used.
	fn inflate_step(&mut self, source: &mut Buffer, sink: &mut Buffer) -> Result<(usize, Status)> {
		let n = source.count().min(SCRATCH_SIZE);
		if n == 0 {
			return Ok((0, Status::Ok));
		}
		let input: Vec<u8> = (0..n).map(|i| source.get(i).expect("checked count above")).collect();
		let mut scratch = [0u8; SCRATCH_SIZE];
		let before_in = self.decompress.total_in();
		let before_out = self.decompress.total_out();
		let status = self
			.decompress
			.decompress(&input, &mut scratch, FlushDecompress::None)
			.map_err(|e| Error::format_mismatch(OperationKind::Transform, e.to_string()))?;
		let consumed = (self.decompress.total_in() - before_in) as usize;
		let produced = (self.decompress.total_out() - before_out) as usize;
		if produced > 0 {
			self.crc.update(&scratch[..produced]);
			self.total_out = self.total_out.wrapping_add(produced as u32);
			sink.write_from_slice(&scratch[..produced])?;
		}
		source.skip(consumed)?;
		Ok((consumed, status))
	}
}

impl Default for GzipDecoder {
	fn default() -> Self { Self::new() }
}

impl Transformation for GzipDecoder {
	fn transform_at_most_to(&mut self, source: &mut Buffer, sink: &mut Buffer, byte_count: usize) -> Result<Progress> {
		let mut total_consumed = 0;
		loop {
			match self.state {
				State::Header => match Self::try_parse_header(source)? {
					None => return Ok(Progress::Consumed(total_consumed)),
					Some(header_len) => {
						source.skip(header_len)?;
						total_consumed += header_len;
						self.state = State::Body;
					}
				},
				State::Body => {
					let (consumed, status) = self.inflate_step(source, sink)?;
					total_consumed += consumed;
					if status == Status::StreamEnd {
						self.state = State::Trailer;
						continue;
					}
					if consumed == 0 || total_consumed >= byte_count {
						return Ok(Progress::Consumed(total_consumed));
					}
				}
				State::Trailer => {
					if source.count() < 8 {
						return Ok(Progress::Consumed(total_consumed));
					}
					let byte = |i: usize| source.get(i).expect("checked count above");
					let crc_stored = u32::from_le_bytes([byte(0), byte(1), byte(2), byte(3)]);
					let isize_stored = u32::from_le_bytes([byte(4), byte(5), byte(6), byte(7)]);
					source.skip(8)?;
					total_consumed += 8;
					let actual_crc = self.crc.clone().finalize();
					if actual_crc != crc_stored || self.total_out != isize_stored {
						return Err(Error::format_mismatch(OperationKind::Transform, "gzip trailer CRC32/length mismatch"));
					}
					self.state = State::Done;
					return Ok(Progress::Done);
				}
				State::Done => return Ok(Progress::Done),
			}
		}
	}

	fn finish(&mut self, _sink: &mut Buffer) -> Result<()> {
		match self.state {
			State::Done => Ok(()),
			State::Header => Err(Error::format_mismatch(OperationKind::Transform, "truncated gzip header")),
			State::Body => Err(Error::format_mismatch(OperationKind::Transform, "truncated gzip body")),
			State::Trailer => Err(Error::format_mismatch(OperationKind::Transform, "truncated gzip trailer")),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn compress(data: &[u8], options: GzipOptions) -> Buffer {
		let mut plain = Buffer::new();
		plain.write_from_slice(data).unwrap();
		let mut compressed = Buffer::new();
		let mut encoder = GzipEncoder::new(options);
		encoder.transform_at_most_to(&mut plain, &mut compressed, usize::MAX).unwrap();
		encoder.finish(&mut compressed).unwrap();
		compressed
	}

	fn decompress(compressed: &mut Buffer) -> Result<Buffer> {
		let mut decompressed = Buffer::new();
		let mut decoder = GzipDecoder::new();
		loop {
			match decoder.transform_at_most_to(compressed, &mut decompressed, usize::MAX)? {
				Progress::Done | Progress::Consumed(0) => break,
				Progress::Consumed(_) => {}
			}
		}
		decoder.finish(&mut decompressed)?;
		Ok(decompressed)
	}

	#[test]
	fn round_trip_small_payload() {
		let mut compressed = compress(b"hello, gzip world", GzipOptions::default());
		assert!(compressed.starts_with(0x1F));
		let mut decompressed = decompress(&mut compressed).unwrap();
		let mut text = String::new();
		decompressed.read_utf8(&mut text, usize::MAX).unwrap();
		assert_eq!(text, "hello, gzip world");
	}

	#[test]
	fn round_trip_large_payload_with_header_fields() {
		let data = vec![b'x'; 100_000];
		let options = GzipOptions::default().with_level(6).with_fname("data.bin").with_fhcrc(true);
		let mut compressed = compress(&data, options);
		let mut decompressed = decompress(&mut compressed).unwrap();
		assert_eq!(decompressed.count(), data.len());
		let mut out = vec![0u8; data.len()];
		decompressed.read_into_slice(&mut out).unwrap();
		assert_eq!(out, data);
	}

	#[test]
	fn truncated_trailer_fails_finish() {
		let mut compressed = compress(&vec![b'x'; 1000], GzipOptions::default());
		let truncated_len = compressed.count() - 1;
		let mut truncated = Buffer::new();
		compressed.copy_to(&mut truncated, 0, truncated_len);
		assert!(decompress(&mut truncated).is_err());
	}

	#[test]
	fn bad_magic_is_format_mismatch() {
		let mut buf = Buffer::new();
		buf.write_from_slice(&[0x00, 0x00, 0x08, 0x00, 0, 0, 0, 0, 0, 0]).unwrap();
		assert!(decompress(&mut buf).is_err());
	}
}
