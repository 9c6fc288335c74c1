use std::fmt;
use primitives::hash::H256;
use primitives::uint::U256;
use ser::{Serializable, Deserializable, Stream, Reader, Error as ReaderError};

/// Proof-of-work target. A block satisfies the target when its id,
/// interpreted as a big-endian 256-bit integer, does not exceed it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Target(H256);

impl Target {
	pub fn max_value() -> Self {
		Target(H256::from([0xffu8; 32]))
	}

	/// Returns true if the given block id satisfies this target.
	pub fn holds(&self, id: &H256) -> bool {
		U256::from_big_endian(&**id) <= self.to_uint()
	}

	/// Expected number of hashes needed to find a block meeting this target.
	pub fn difficulty(&self) -> U256 {
		// 2^256 / (target + 1) does not fit in 256 bits; computed as
		// ((2^256 - target - 1) / (target + 1)) + 1 == (!target / (target + 1)) + 1
		let target = self.to_uint();
		if target == U256::max_value() {
			return U256::one();
		}
		(!target / (target + U256::one())) + U256::one()
	}

	/// Target scaled by `numerator / denominator`, saturating at the maximum.
	pub fn adjusted(&self, numerator: u64, denominator: u64) -> Target {
		debug_assert!(denominator != 0);
		// divide before multiplying so near-unity ratios cannot overflow,
		// then scale the remainder separately to stay exact
		let den = U256::from(denominator);
		let (quotient, remainder) = self.to_uint().div_rem(den);
		let scaled_quotient = match quotient.checked_mul_u64(numerator) {
			Some(value) => value,
			None => return Target::max_value(),
		};
		let scaled_remainder = remainder.checked_mul_u64(numerator)
			.expect("remainder and numerator both fit in 64 bits; qed");
		let (result, overflow) = scaled_quotient.overflowing_add(scaled_remainder / den);
		if overflow {
			return Target::max_value();
		}
		Target(H256::from(&result.to_big_endian()[..]))
	}

	fn to_uint(&self) -> U256 {
		U256::from_big_endian(&*self.0)
	}
}

impl From<H256> for Target {
	fn from(h: H256) -> Self {
		Target(h)
	}
}

impl From<Target> for H256 {
	fn from(t: Target) -> Self {
		t.0
	}
}

impl fmt::Debug for Target {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_tuple("Target").field(&self.0).finish()
	}
}

impl Serializable for Target {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&self.0);
	}
}

impl Deserializable for Target {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(Target(reader.read()?))
	}
}

#[cfg(test)]
mod tests {
	use primitives::hash::H256;
	use primitives::uint::U256;
	use super::Target;

	fn target_with_leading_byte(byte: u8) -> Target {
		let mut raw = [0u8; 32];
		raw[0] = byte;
		Target(H256::from(raw))
	}

	#[test]
	fn test_target_holds() {
		let target = target_with_leading_byte(0x20);
		assert!(target.holds(&H256::default()));

		let mut above = [0u8; 32];
		above[0] = 0x21;
		assert!(!target.holds(&H256::from(above)));

		let mut below = [0u8; 32];
		below[0] = 0x20;
		below[31] = 0xff;
		assert!(target.holds(&H256::from(below)));
	}

	#[test]
	fn test_max_target_holds_everything() {
		assert!(Target::max_value().holds(&H256::from([0xffu8; 32])));
	}

	#[test]
	fn test_difficulty() {
		assert_eq!(Target::max_value().difficulty(), U256::one());

		// halving the target roughly doubles the difficulty
		let easy = target_with_leading_byte(0x80).difficulty();
		let hard = target_with_leading_byte(0x40).difficulty();
		assert!(hard > easy);
	}

	#[test]
	fn test_adjusted_identity() {
		let target = target_with_leading_byte(0x20);
		assert_eq!(target.adjusted(1, 1), target);
		assert!(target.adjusted(2, 1) > target);
		assert!(target.adjusted(1, 2) < target);
	}
}
