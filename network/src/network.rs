use primitives::hash::H256;
use chain::Target;

/// Network the chain operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
	Mainnet,
	Testnet,
	/// Network for tests: a block is solved within a handful of nonce
	/// increments, yet most nonces still miss the target.
	Unitest,
}

impl Network {
	/// Target assigned to the genesis block.
	pub fn root_target(&self) -> Target {
		let mut raw = [0u8; 32];
		match *self {
			Network::Mainnet => raw[2] = 0x01,
			Network::Testnet => raw[1] = 0x01,
			Network::Unitest => raw[0] = 0x20,
		}
		Target::from(H256::from(raw))
	}

	pub fn genesis_timestamp(&self) -> u64 {
		match *self {
			Network::Mainnet => 1_433_600_000,
			Network::Testnet => 1_433_600_000,
			Network::Unitest => 1_400_000_000,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::Network;

	#[test]
	fn test_root_targets_ordered_by_hardness() {
		assert!(Network::Unitest.root_target() > Network::Testnet.root_target());
		assert!(Network::Testnet.root_target() > Network::Mainnet.root_target());
	}
}
