// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#[macro_use]
mod common;

use std::fmt::Debug;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use orio::streams::codec::{Decode, Encode};
use orio::streams::{BufSink, BufSource};
use orio::{Buffer, Error};

#[quickcheck] fn    byte(b: u8) -> TestResult { read_write(b) }
#[quickcheck] fn  s_byte(b: i8) -> TestResult { read_write(b) }
#[quickcheck] fn   short(b: u16) -> TestResult { read_write(b) }
#[quickcheck] fn s_short(b: i16) -> TestResult { read_write(b) }
#[quickcheck] fn     int(b: u32) -> TestResult { read_write(b) }
#[quickcheck] fn   s_int(b: i32) -> TestResult { read_write(b) }
#[quickcheck] fn    long(b: u64) -> TestResult { read_write(b) }
#[quickcheck] fn  s_long(b: i64) -> TestResult { read_write(b) }
#[quickcheck] fn    size(b: usize) -> TestResult { read_write(b) }
#[quickcheck] fn  s_size(b: isize) -> TestResult { read_write(b) }

fn read_write<T>(value: T) -> TestResult where T: Copy +
												  Encode +
												  Decode +
												  Debug +
												  Default +
												  PartialEq {
	fn to_tr(error: Error) -> TestResult {
		TestResult::error(error.to_string())
	}

	let mut read_value = T::default();
	let mut buf = Buffer::default();
	if let Err(error) = buf.write_from(value) { return to_tr(error) }
	if let Err(error) = buf.read_into(&mut read_value, usize::MAX) {
		return to_tr(error)
	}

	qc_assert_eq!(value, read_value)
}

#[quickcheck]
fn str_round_trip(str: String) -> TestResult {
	let mut buf = Buffer::default();
	if let Err(error) = buf.write_utf8(&str) {
		return TestResult::error(error.to_string());
	}
	let mut read_back = String::new();
	if let Err(error) = buf.read_all_utf8(&mut read_back) {
		return TestResult::error(error.to_string());
	}

	qc_assert_eq!(str, read_back)
}

#[test]
fn line_reader_crosses_segment_boundary() {
	let mut buf = Buffer::default();
	let first_line = "x".repeat(orio::DEFAULT_SEGMENT_SIZE - 2);
	buf.write_utf8(&first_line).unwrap();
	buf.write_utf8("\r\nsecond\n").unwrap();

	let mut line = String::new();
	assert!(buf.read_utf8_line(&mut line).unwrap());
	assert_eq!(line, first_line);
	line.clear();
	assert!(buf.read_utf8_line(&mut line).unwrap());
	assert_eq!(line, "second");
}

#[test]
fn decimal_long_boundary() {
	let mut buf = Buffer::default();
	buf.write_utf8("-9223372036854775808 9223372036854775807").unwrap();
	assert_eq!(buf.read_decimal_long().unwrap(), i64::MIN);
	buf.skip(1).unwrap();
	assert_eq!(buf.read_decimal_long().unwrap(), i64::MAX);
}
