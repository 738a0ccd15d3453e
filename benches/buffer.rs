// SPDX-License-Identifier: Apache-2.0

use criterion::{BatchSize, Bencher, black_box, Criterion, criterion_group, criterion_main};
use orio::streams::{BufSink, BufSource};
use orio::{Buffer, DEFAULT_SEGMENT_SIZE};

const DATA: &[u8] = include_bytes!("buffer.rs");

fn write_slice(c: &mut Criterion) {
	c.bench_function("write_slice", |b| b.iter(|| {
		let mut buf = Buffer::default();
		buf.write_from_slice(DATA).unwrap();
		buf
	}));
}

fn write_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("write_numbers");
	let mut buffer = Buffer::default();

	macro_rules! gen {
		($($fn:ident$ty:ident),+) => {
			$(
			group.bench_function(stringify!($fn), |b| b.iter(|| {
				for _ in 0..DEFAULT_SEGMENT_SIZE / std::mem::size_of::<$ty>() {
					let _ = black_box(buffer.$fn($ty::MAX));
				}
				buffer.clear();
			}));
			)+
		};
	}

	gen!(
		write_u8 u8,
		write_u16 u16,
		write_u16_le u16,
		write_u32 u32,
		write_u32_le u32,
		write_u64 u64,
		write_u64_le u64
	);
	group.finish();
}

#[inline(always)]
fn read_loop<R>(b: &mut Bencher, buf: &Buffer, read: impl FnMut(&mut Buffer) -> R) {
	b.iter_batched_ref(|| buf.copy(), read, BatchSize::SmallInput);
}

fn read_slice(c: &mut Criterion) {
	let mut buffer = Buffer::default();
	buffer.write_from_slice(DATA).unwrap();
	let mut target = vec![0u8; DATA.len()];
	c.bench_function("read_slice", |b|
		read_loop(b, &buffer, |buf| buf.read_into_slice_exact(&mut target))
	);
}

fn read_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("read_numbers");
	let mut buffer = Buffer::default();
	for _ in 0..DEFAULT_SEGMENT_SIZE / 8 {
		let _ = buffer.write_u64(u64::MAX);
	}

	macro_rules! gen {
		($($fn:ident$ty:ident),+) => {
			$(
			group.bench_function(stringify!($fn), |b|
				read_loop(b, &buffer, |buf| {
					for _ in 0..DEFAULT_SEGMENT_SIZE / std::mem::size_of::<$ty>() {
						let _ = black_box(buf.$fn());
					}
				})
			);
			)+
		};
	}

	gen!(
		read_u8 u8,
		read_u16 u16,
		read_u16_le u16,
		read_u32 u32,
		read_u32_le u32,
		read_u64 u64,
		read_u64_le u64
	);
	group.finish();
}

fn skip(c: &mut Criterion) {
	let mut group = c.benchmark_group("skip");
	let mut buffer = Buffer::default();
	buffer.write_from_slice(DATA).unwrap();

	group.bench_function("skip all", |b|
		read_loop(b, &buffer, |buf| buf.skip(DATA.len()))
	);
	group.bench_function("skip partial", |b|
		read_loop(b, &buffer, |buf| buf.skip(DEFAULT_SEGMENT_SIZE / 2))
	);
	group.finish();
}

fn index_of(c: &mut Criterion) {
	let mut group = c.benchmark_group("index_of");
	let mut buffer = Buffer::default();
	buffer.write_from_slice(DATA).unwrap();

	group.bench_function("byte", |b| b.iter(|| buffer.index_of(b'<', 0, buffer.count())));
	group.bench_function("bytes", |b| b.iter(|| buffer.index_of_bytes(b"fn", 0)));
	group.finish();
}

#[cfg(feature = "sha2")]
fn hash(c: &mut Criterion) {
	use digest::Digest;
	let mut buffer = Buffer::default();
	buffer.write_from_slice(DATA).unwrap();
	c.bench_function("hash", |b| b.iter(|| {
		let chunk = buffer.copy().read_byte_str(buffer.count()).unwrap();
		black_box(sha2::Sha256::digest(chunk.as_slice()))
	}));
}

#[cfg(feature = "sha2")]
criterion_group!(read, read_slice, read_numbers, skip, index_of, hash);
#[cfg(not(feature = "sha2"))]
criterion_group!(read, read_slice, read_numbers, skip, index_of);

criterion_group!(write, write_slice, write_numbers);
criterion_main!(write, read);
