use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use hash::H256;
use {Serializable, Stream, Deserializable, Reader, Error};

impl Serializable for u8 {
	#[inline]
	fn serialize(&self, s: &mut Stream) {
		s.append_slice(&[*self]);
	}
}

impl Deserializable for u8 {
	#[inline]
	fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
		Ok(reader.read_slice(1)?[0])
	}
}

impl Serializable for u32 {
	#[inline]
	fn serialize(&self, s: &mut Stream) {
		let mut buffer = [0u8; 4];
		LittleEndian::write_u32(&mut buffer, *self);
		s.append_slice(&buffer);
	}
}

impl Deserializable for u32 {
	#[inline]
	fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
		Ok(LittleEndian::read_u32(reader.read_slice(4)?))
	}
}

impl Serializable for u64 {
	#[inline]
	fn serialize(&self, s: &mut Stream) {
		let mut buffer = [0u8; 8];
		LittleEndian::write_u64(&mut buffer, *self);
		s.append_slice(&buffer);
	}
}

impl Deserializable for u64 {
	#[inline]
	fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
		Ok(LittleEndian::read_u64(reader.read_slice(8)?))
	}
}

impl Serializable for H256 {
	#[inline]
	fn serialize(&self, s: &mut Stream) {
		s.append_slice(&**self);
	}
}

impl Deserializable for H256 {
	#[inline]
	fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
		Ok(reader.read_slice(32)?.into())
	}
}

impl Serializable for Bytes {
	fn serialize(&self, s: &mut Stream) {
		s.append(&(self.len() as u64))
			.append_slice(self);
	}
}

impl Deserializable for Bytes {
	fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
		let len: u64 = reader.read()?;
		Ok(reader.read_slice(len as usize)?.into())
	}
}

#[cfg(test)]
mod tests {
	use bytes::Bytes;
	use hash::H256;
	use {serialize, deserialize};

	#[test]
	fn test_hash_round_trip() {
		let hash = H256::from(7u8);
		let serialized = serialize(&hash);
		assert_eq!(serialized.len(), 32);
		assert_eq!(hash, deserialize(&serialized as &[u8]).unwrap());
	}

	#[test]
	fn test_bytes_round_trip() {
		let bytes: Bytes = vec![1, 2, 3].into();
		let serialized = serialize(&bytes);
		assert_eq!(serialized.len(), 8 + 3);
		assert_eq!(bytes, deserialize::<Bytes>(&serialized as &[u8]).unwrap());
	}
}
