//! Builders and a deterministic proof-of-work solver for tests.

extern crate chain;

mod chain_builder;

pub use chain_builder::{BlockBuilder, TransactionBuilder};

use chain::{Block, Target};

/// Increments the nonce until the block satisfies the target.
pub fn solve(mut block: Block, target: Target) -> Block {
	while !block.check_target(&target) {
		block.nonce += 1;
	}
	block
}

#[cfg(test)]
mod tests {
	use chain::{Block, Target};
	use super::solve;

	#[test]
	fn test_solve_terminates_on_easy_target() {
		let mut raw = [0u8; 32];
		raw[0] = 0x80;
		let target = Target::from(chain::hash::H256::from(raw));
		let block = solve(Block::default(), target);
		assert!(block.check_target(&target));
	}
}
