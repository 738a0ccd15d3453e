// SPDX-License-Identifier: Apache-2.0

//! The segment free list. `take()` hands out a segment, `recycle()` takes
//! one back; the pool is the only place allocation (or its avoidance)
//! happens.

use std::cell::RefCell;
#[cfg(feature = "shared-pool")]
use std::sync::{Arc, Mutex};
use cfg_if::cfg_if;
use tracing::trace;
use crate::segment::Segment;
use crate::DEFAULT_SEGMENT_SIZE;

/// Default per-thread (or per-pool) retained-byte bound: 64 KiB.
pub const DEFAULT_BYTE_BOUND: usize = 64 * 1024;

/// A free list of released [`Segment`]s, bounded by retained bytes.
pub trait Pool<const N: usize = DEFAULT_SEGMENT_SIZE> {
	/// Returns a segment with empty content and full writable capacity.
	fn take(&self) -> Segment<N>;

	/// Returns `seg` to the pool, unless doing so would exceed the pool's
	/// byte bound, in which case it is simply dropped.
	fn recycle(&self, seg: Segment<N>);

	/// Returns all of `segs` to the pool.
	fn recycle_all(&self, segs: impl IntoIterator<Item = Segment<N>>) {
		for seg in segs {
			self.recycle(seg);
		}
	}
}

/// Configuration for a [`Pool`]'s retained-byte bound.
#[derive(Copy, Clone, Debug)]
pub struct PoolOptions {
	byte_bound: usize,
}

impl Default for PoolOptions {
	fn default() -> Self { Self { byte_bound: DEFAULT_BYTE_BOUND } }
}

impl PoolOptions {
	/// Sets the maximum number of bytes the pool retains across all free
	/// segments before it starts dropping recycled segments instead.
	pub fn with_byte_bound(mut self, bound: usize) -> Self {
		self.byte_bound = bound;
		self
	}

	pub fn byte_bound(&self) -> usize { self.byte_bound }
}

/// A pool whose free list lives on the current thread only. Matches the
/// concurrency model's recommendation: `take`/`recycle` never cross threads,
/// so no synchronization is needed.
#[derive(Clone, Copy)]
pub struct LocalPool<const N: usize = DEFAULT_SEGMENT_SIZE> {
	options: PoolOptions,
}

impl<const N: usize> Default for LocalPool<N> {
	fn default() -> Self { Self::new(PoolOptions::default()) }
}

impl<const N: usize> LocalPool<N> {
	pub fn new(options: PoolOptions) -> Self { Self { options } }
}

// A `RefCell` stashed behind a generic function's own thread-local `SLOT`
// and downcast on access. A plain `thread_local! { static F: ...<N> }`
// inside a generic function would need `N` to appear in the static's type
// directly, which `thread_local!` does not support for const generics, so
// the free list is boxed as `dyn Any` and downcast back to the right `N`
// the first time each segment size is touched on this thread.
fn thread_local_free<const N: usize, R>(f: impl FnOnce(&mut Vec<Segment<N>>, &mut usize) -> R) -> R {
	std::thread_local! {
		static SLOT: RefCell<Option<Box<dyn std::any::Any>>> = RefCell::new(None);
	}
	SLOT.with(|slot| {
		let mut slot = slot.borrow_mut();
		let cell = slot.get_or_insert_with(|| {
			Box::new(RefCell::new((Vec::<Segment<N>>::new(), 0usize)))
		});
		let cell = cell
			.downcast_mut::<RefCell<(Vec<Segment<N>>, usize)>>()
			.expect("pool free-list type mismatch for this segment size");
		let mut inner = cell.borrow_mut();
		let (segs, bytes) = &mut *inner;
		f(segs, bytes)
	})
}

impl<const N: usize> Pool<N> for LocalPool<N> {
	fn take(&self) -> Segment<N> {
		thread_local_free::<N, _>(|free, bytes| {
			if let Some(seg) = free.pop() {
				*bytes -= N;
				trace!(size = N, remaining = *bytes, "pool: reused segment");
				seg
			} else {
				trace!(size = N, "pool: allocated fresh segment");
				Segment::empty()
			}
		})
	}

	fn recycle(&self, mut seg: Segment<N>) {
		seg.clear();
		if seg.is_shared() {
			trace!(size = N, "pool: dropped shared segment");
			return;
		}
		let bound = self.options.byte_bound();
		thread_local_free::<N, _>(|free, bytes| {
			if *bytes + N <= bound {
				*bytes += N;
				free.push(seg);
			} else {
				trace!(size = N, bound, "pool: byte bound exceeded, dropping segment");
			}
		})
	}
}

/// A pool whose free list is shared across threads behind a mutex. Enabled
/// by the `shared-pool` feature for callers who have already decided to
/// share a pool across threads outside this crate's core contract.
#[cfg(feature = "shared-pool")]
#[derive(Clone)]
pub struct SharedPool<const N: usize = DEFAULT_SEGMENT_SIZE> {
	options: PoolOptions,
	free: Arc<Mutex<(Vec<Segment<N>>, usize)>>,
}

#[cfg(feature = "shared-pool")]
impl<const N: usize> Default for SharedPool<N> {
	fn default() -> Self { Self::new(PoolOptions::default()) }
}

#[cfg(feature = "shared-pool")]
impl<const N: usize> SharedPool<N> {
	pub fn new(options: PoolOptions) -> Self {
		Self { options, free: Arc::new(Mutex::new((Vec::new(), 0))) }
	}
}

#[cfg(feature = "shared-pool")]
impl<const N: usize> Pool<N> for SharedPool<N> {
	fn take(&self) -> Segment<N> {
		let mut state = self.free.lock().unwrap_or_else(|e| e.into_inner());
		if let Some(seg) = state.0.pop() {
			state.1 -= N;
			seg
		} else {
			Segment::empty()
		}
	}

	fn recycle(&self, mut seg: Segment<N>) {
		seg.clear();
		if seg.is_shared() { return; }
		let mut state = self.free.lock().unwrap_or_else(|e| e.into_inner());
		if state.1 + N <= self.options.byte_bound() {
			state.1 += N;
			state.0.push(seg);
		}
	}
}

cfg_if! {
	if #[cfg(feature = "shared-pool")] {
		/// The pool flavor used when no explicit [`Pool`] is supplied.
		pub type DefaultPool<const N: usize = DEFAULT_SEGMENT_SIZE> = SharedPool<N>;
	} else {
		/// The pool flavor used when no explicit [`Pool`] is supplied.
		pub type DefaultPool<const N: usize = DEFAULT_SEGMENT_SIZE> = LocalPool<N>;
	}
}
