//! Stream used for serialization.

use std::io::{self, Write};
use byteorder::{LittleEndian, WriteBytesExt};
use bytes::Bytes;

pub fn serialize<T>(t: &T) -> Bytes where T: Serializable + ?Sized {
	let mut stream = Stream::default();
	stream.append(t);
	stream.out()
}

pub fn serialized_size<T>(t: &T) -> usize where T: Serializable + ?Sized {
	serialize(t).len()
}

pub trait Serializable {
	/// Serialize the struct and appends it to the end of stream.
	fn serialize(&self, s: &mut Stream);
}

/// Stream used for serialization.
#[derive(Default)]
pub struct Stream {
	buffer: Vec<u8>,
}

impl Stream {
	pub fn new() -> Self {
		Stream::default()
	}

	/// Serializes the struct and appends it to the end of stream.
	pub fn append<T>(&mut self, t: &T) -> &mut Self where T: Serializable + ?Sized {
		t.serialize(self);
		self
	}

	/// Appends raw bytes to the end of the stream.
	pub fn append_slice(&mut self, bytes: &[u8]) -> &mut Self {
		// discard error for now, since we write to simple vector
		self.buffer.write(bytes).unwrap();
		self
	}

	/// Appends a length-prefixed list of serializable structs.
	pub fn append_list<T>(&mut self, t: &[T]) -> &mut Self where T: Serializable {
		self.buffer.write_u64::<LittleEndian>(t.len() as u64).unwrap();
		for i in t {
			i.serialize(self);
		}
		self
	}

	/// Full stream.
	pub fn out(self) -> Bytes {
		self.buffer.into()
	}
}

impl Write for Stream {
	#[inline]
	fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
		self.buffer.write(buf)
	}

	#[inline]
	fn flush(&mut self) -> Result<(), io::Error> {
		self.buffer.flush()
	}
}

#[cfg(test)]
mod tests {
	use super::{Stream, serialized_size};

	#[test]
	fn test_stream_append() {
		let mut stream = Stream::default();
		stream
			.append(&1u32)
			.append(&2u8)
			.append_list(&[3u32, 4, 5]);

		let expected = vec![
			1, 0, 0, 0,
			2,
			3, 0, 0, 0, 0, 0, 0, 0,
			3, 0, 0, 0,
			4, 0, 0, 0,
			5, 0, 0, 0,
		].into();

		assert_eq!(stream.out(), expected);
	}

	#[test]
	fn test_serialized_size() {
		assert_eq!(serialized_size(&7u64), 8);
	}
}
