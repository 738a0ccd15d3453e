// SPDX-License-Identifier: Apache-2.0

//! [`Options`]: a trie over a fixed set of byte strings, compiled once and
//! matched against a buffer's head many times (`§4.7`). Construction is
//! `O(total bytes of all options)`; a `select` call is `O(length of the
//! matched option)`.

use crate::Buffer;

struct Node {
	children: Vec<(u8, usize)>,
	/// The option index accepted at this node, if its bytes end here.
	accept: Option<usize>,
}

/// A compiled trie of byte strings, built with [`Buffer::compile_options`]
/// and matched with [`Buffer::select`].
pub struct Options {
	nodes: Vec<Node>,
}

impl Options {
	pub(super) fn compile<B: AsRef<[u8]>>(options: impl IntoIterator<Item = B>) -> Self {
		let mut nodes = vec![Node { children: Vec::new(), accept: None }];
		for (idx, option) in options.into_iter().enumerate() {
			let mut node = 0;
			for &byte in option.as_ref() {
				node = match nodes[node].children.iter().find(|&&(b, _)| b == byte) {
					Some(&(_, next)) => next,
					None => {
						let next = nodes.len();
						nodes.push(Node { children: Vec::new(), accept: None });
						nodes[node].children.push((byte, next));
						next
					}
				};
			}
			nodes[node].accept = Some(idx);
		}
		Self { nodes }
	}
}

/// Walks `options`'s trie against the head of `buf`, greedily extending the
/// match as far as possible. Consumes and returns the index of the longest
/// fully-matched option, or leaves `buf` untouched and returns `None` if no
/// option's bytes prefix the buffer's content.
pub(super) fn select(buf: &mut Buffer, options: &Options) -> Option<usize> {
	let mut node = 0;
	let mut i = 0;
	let mut last_match = None;
	loop {
		if let Some(idx) = options.nodes[node].accept {
			last_match = Some((idx, i));
		}
		let Some(byte) = buf.get(i) else { break };
		match options.nodes[node].children.iter().find(|&&(b, _)| b == byte) {
			Some(&(_, next)) => {
				node = next;
				i += 1;
			}
			None => break,
		}
	}
	let (idx, len) = last_match?;
	buf.skip(len).ok()?;
	Some(idx)
}

#[cfg(test)]
mod test {
	use crate::Buffer;
	use crate::streams::BufSink;

	#[test]
	fn matches_one_of_several_options() {
		let options = Buffer::compile_options(["id", "name", "description"]);
		let mut buf = Buffer::new();
		buf.write_utf8("name=alice").unwrap();
		assert_eq!(buf.select(&options), Some(1));
		let mut rest = String::new();
		buf.read_utf8(&mut rest, usize::MAX).unwrap();
		assert_eq!(rest, "=alice");
	}

	#[test]
	fn no_match_leaves_buffer_untouched() {
		let options = Buffer::compile_options(["id", "name", "description"]);
		let mut buf = Buffer::new();
		buf.write_utf8("xyz").unwrap();
		assert_eq!(buf.select(&options), None);
		assert_eq!(buf.count(), 3);
	}

	#[test]
	fn prefers_longest_match() {
		let options = Buffer::compile_options(["id", "identifier"]);
		let mut buf = Buffer::new();
		buf.write_utf8("identifier_suffix").unwrap();
		assert_eq!(buf.select(&options), Some(1));
		assert_eq!(buf.count(), "_suffix".len());
	}
}
