// SPDX-License-Identifier: Apache-2.0

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use orio::{Segment, DEFAULT_SEGMENT_SIZE};

const DATA: &[u8] = include_bytes!("segment.rs");

fn alloc_segment(c: &mut Criterion) {
	c.bench_function("alloc_empty", |b| b.iter(Segment::<DEFAULT_SEGMENT_SIZE>::empty));
}

fn write_segment(c: &mut Criterion) {
	let mut group = c.benchmark_group("write_segment");

	group.bench_function("push_slice", |b| b.iter_batched(
		Segment::<DEFAULT_SEGMENT_SIZE>::empty,
		|mut seg| assert_eq!(seg.push_slice(DATA), DATA.len().min(DEFAULT_SEGMENT_SIZE)),
		BatchSize::PerIteration,
	));

	group.bench_function("shared", |b| b.iter_batched(
		|| {
			let mut seg = Segment::<DEFAULT_SEGMENT_SIZE>::empty();
			seg.push_slice(&DATA[..DATA.len().min(512)]);
			seg.share_all()
		},
		|mut shared| shared.push_slice(DATA),
		BatchSize::PerIteration,
	));
	group.finish();
}

fn read_segment(c: &mut Criterion) {
	let mut seg = Segment::<DEFAULT_SEGMENT_SIZE>::empty();
	seg.push_slice(DATA);
	let mut target = vec![0u8; DATA.len().min(DEFAULT_SEGMENT_SIZE)];

	let mut group = c.benchmark_group("read_segment");
	group.bench_function("pop_into_slice", |b| b.iter_batched(
		|| seg.share_all(),
		|mut seg| seg.pop_into_slice(&mut target),
		BatchSize::SmallInput,
	));
	group.bench_function("shift", |b| b.iter_batched(
		|| {
			let mut seg = seg.share_all();
			seg.consume(seg.len().min(64));
			seg
		},
		|mut seg| seg.shift(),
		BatchSize::SmallInput,
	));
	group.finish();
}

fn push(c: &mut Criterion) {
	c.bench_function("push", |b| b.iter(|| {
		let mut seg = Segment::<DEFAULT_SEGMENT_SIZE>::empty();
		for &byte in DATA.iter().take(DEFAULT_SEGMENT_SIZE) {
			let _ = seg.push(byte);
		}
		seg
	}));
}

criterion_group!(benches, alloc_segment, write_segment, read_segment, push);
criterion_main!(benches);
