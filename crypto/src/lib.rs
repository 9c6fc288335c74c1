extern crate sha2;
extern crate primitives;
extern crate serialization as ser;

use sha2::{Digest, Sha256};
use primitives::hash::H256;
use ser::{serialize, Serializable};

/// SHA-256
#[inline]
pub fn sha256(input: &[u8]) -> H256 {
	let mut hasher = Sha256::new();
	hasher.update(input);
	H256::from(&hasher.finalize()[..])
}

/// Content hash of a canonically-serialized object.
#[inline]
pub fn hash_object<T>(t: &T) -> H256 where T: Serializable {
	sha256(&serialize(t))
}

#[cfg(test)]
mod tests {
	use super::sha256;

	#[test]
	fn test_sha256() {
		let expected = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824".into();
		let result = sha256(b"hello");
		assert_eq!(result, expected);
	}

	#[test]
	fn test_sha256_empty() {
		let expected = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855".into();
		assert_eq!(sha256(b""), expected);
	}
}
