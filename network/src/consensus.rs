use primitives::hash::H256;
use ser::Stream;
use crypto::sha256;
use chain::constants::{SIAFUND_COUNT, COIN_PRECISION};
use chain::{
	Block, Target, Timestamp, SiacoinOutput, SiafundOutput,
	SiacoinOutputId, SiafundOutputId,
};

const SPECIFIER_GENESIS_SIACOIN: &'static [u8] = b"genesis siacoin output";
const SPECIFIER_GENESIS_SIAFUND: &'static [u8] = b"genesis siafund output";

/// Consensus parameters of a concrete network.
#[derive(Debug, Clone)]
pub struct ConsensusParams {
	pub network: ::Network,
	pub genesis_timestamp: Timestamp,
	pub root_target: Target,
	/// Per-block target adjustment clamps, as `numerator / denominator`
	/// rationals. `(1, 1)` on both sides pins the target to the root target.
	pub max_adjustment_up: (u64, u64),
	pub max_adjustment_down: (u64, u64),
	/// Siacoin outputs live in the genesis state.
	pub genesis_siacoin_allocation: Vec<(SiacoinOutputId, SiacoinOutput)>,
	/// Siafund outputs live in the genesis state.
	pub genesis_siafund_allocation: Vec<(SiafundOutputId, SiafundOutput)>,
	/// Capacity of the rejected-blocks cache.
	pub dos_cache_capacity: usize,
}

impl ConsensusParams {
	pub fn new(network: ::Network) -> Self {
		let (max_adjustment_up, max_adjustment_down) = match network {
			// at most 0.4% per block in either direction
			::Network::Mainnet | ::Network::Testnet => ((1004, 1000), (996, 1000)),
			// constant target, so test chains stay deterministic
			::Network::Unitest => ((1, 1), (1, 1)),
		};

		ConsensusParams {
			network: network,
			genesis_timestamp: network.genesis_timestamp(),
			root_target: network.root_target(),
			max_adjustment_up: max_adjustment_up,
			max_adjustment_down: max_adjustment_down,
			genesis_siacoin_allocation: genesis_siacoin_allocation(network),
			genesis_siafund_allocation: genesis_siafund_allocation(network),
			dos_cache_capacity: 1000,
		}
	}

	/// The genesis block. Its parent id is zero and it carries no payouts;
	/// the genesis allocations are seeded directly into the state.
	pub fn genesis_block(&self) -> Block {
		Block {
			parent_id: Default::default(),
			nonce: 0,
			timestamp: self.genesis_timestamp,
			miner_payouts: Vec::new(),
			transactions: Vec::new(),
		}
	}
}

fn genesis_siacoin_allocation(network: ::Network) -> Vec<(SiacoinOutputId, SiacoinOutput)> {
	match network {
		::Network::Mainnet | ::Network::Testnet => Vec::new(),
		// an anchored premine lets tests fund transactions without first
		// mining payouts to maturity
		::Network::Unitest => (0..3u64)
			.map(|index| {
				let output = SiacoinOutput {
					value: 100_000 * COIN_PRECISION,
					unlock_hash: H256::from(index as u8 + 1),
				};
				(genesis_id(SPECIFIER_GENESIS_SIACOIN, index), output)
			})
			.collect(),
	}
}

fn genesis_siafund_allocation(network: ::Network) -> Vec<(SiafundOutputId, SiafundOutput)> {
	let allocation: Vec<u64> = match network {
		::Network::Mainnet | ::Network::Testnet => vec![SIAFUND_COUNT],
		::Network::Unitest => vec![SIAFUND_COUNT / 2, SIAFUND_COUNT / 2],
	};

	allocation.into_iter()
		.enumerate()
		.map(|(index, value)| {
			let output = SiafundOutput {
				value: value,
				unlock_hash: H256::from(index as u8 + 1),
				claim_start: 0,
			};
			(genesis_id(SPECIFIER_GENESIS_SIAFUND, index as u64), output)
		})
		.collect()
}

fn genesis_id(specifier: &[u8], index: u64) -> H256 {
	let mut stream = Stream::new();
	stream.append_slice(specifier);
	stream.append(&index);
	sha256(&stream.out())
}

#[cfg(test)]
mod tests {
	use chain::constants::SIAFUND_COUNT;
	use {Network, ConsensusParams};

	#[test]
	fn test_genesis_block_is_stable() {
		let params = ConsensusParams::new(Network::Unitest);
		assert_eq!(params.genesis_block().id(), params.genesis_block().id());
		assert!(params.genesis_block().parent_id.is_zero());
	}

	#[test]
	fn test_full_siafund_allocation() {
		for network in &[Network::Mainnet, Network::Testnet, Network::Unitest] {
			let params = ConsensusParams::new(*network);
			let total: u64 = params.genesis_siafund_allocation.iter()
				.map(|&(_, ref output)| output.value)
				.sum();
			assert_eq!(total, SIAFUND_COUNT);
		}
	}

	#[test]
	fn test_unitest_premine_present() {
		let params = ConsensusParams::new(Network::Unitest);
		assert_eq!(params.genesis_siacoin_allocation.len(), 3);
	}
}
