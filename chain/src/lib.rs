extern crate time;
extern crate primitives;
extern crate serialization as ser;
extern crate siacrypto as crypto;

pub mod constants;

mod block;
mod target;
mod timestamp;
mod transaction;

pub use primitives::{hash, bytes};

pub use block::{Block, miner_payout_id};
pub use target::Target;
pub use timestamp::{Timestamp, current_timestamp};
pub use transaction::{
	Transaction, SiacoinInput, SiacoinOutput, SiafundInput, SiafundOutput,
	FileContract, StorageProof, siafund_claim_id, storage_proof_output_id,
};

use hash::H256;

/// Chain heights are measured in blocks from the genesis block.
pub type BlockHeight = u64;

/// All currency amounts are denominated in base units.
pub type Currency = u64;

pub type BlockId = H256;
pub type TransactionId = H256;
pub type SiacoinOutputId = H256;
pub type SiafundOutputId = H256;
pub type FileContractId = H256;
pub type UnlockHash = H256;

/// Block subsidy at the given height, excluding transaction fees.
pub fn subsidy(height: BlockHeight) -> Currency {
	use constants::{INITIAL_COINBASE, MINIMUM_COINBASE, COIN_PRECISION};

	let coinbase = if height < INITIAL_COINBASE - MINIMUM_COINBASE {
		INITIAL_COINBASE - height
	} else {
		MINIMUM_COINBASE
	};
	coinbase * COIN_PRECISION
}

#[cfg(test)]
mod tests {
	use constants::{INITIAL_COINBASE, MINIMUM_COINBASE, COIN_PRECISION};
	use super::subsidy;

	#[test]
	fn test_subsidy_decay() {
		assert_eq!(subsidy(0), INITIAL_COINBASE * COIN_PRECISION);
		assert_eq!(subsidy(1), (INITIAL_COINBASE - 1) * COIN_PRECISION);
		assert_eq!(subsidy(10_000_000), MINIMUM_COINBASE * COIN_PRECISION);
	}
}
