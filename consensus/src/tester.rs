//! Shared scaffolding for consensus tests: a consensus set on the test
//! network plus helpers that assemble and solve blocks on the current tip.

use std::cell::Cell;
use std::cmp;
use network::{Network, ConsensusParams};
use chain::{
	Block, Target, Transaction, SiacoinOutput, SiacoinOutputId,
	current_timestamp, subsidy,
};
use test_data::solve;
use ConsensusSet;

pub struct ConsensusSetTester {
	pub params: ConsensusParams,
	pub cs: ConsensusSet,
	/// Distinguishes sibling blocks mined within the same second.
	salt: Cell<u8>,
}

impl ConsensusSetTester {
	pub fn new() -> Self {
		let params = ConsensusParams::new(Network::Unitest);
		ConsensusSetTester {
			cs: ConsensusSet::new(params.clone()),
			params: params,
			salt: Cell::new(0),
		}
	}

	/// An unsolved block on top of the current tip, carrying the given
	/// transactions and a correct miner payout.
	pub fn block_for_work(&self, transactions: Vec<Transaction>) -> (Block, Target) {
		self.salt.set(self.salt.get().wrapping_add(1));
		let height = self.cs.height() + 1;
		let fees: u64 = transactions.iter().map(Transaction::total_fees).sum();

		let block = Block {
			parent_id: self.cs.current_block().id(),
			nonce: 0,
			timestamp: cmp::max(current_timestamp(), self.cs.earliest_child_timestamp()),
			miner_payouts: vec![SiacoinOutput {
				value: subsidy(height) + fees,
				unlock_hash: self.salt.get().into(),
			}],
			transactions: transactions,
		};
		(block, self.cs.current_target())
	}

	/// A solved block on top of the current tip.
	pub fn find_block(&self, transactions: Vec<Transaction>) -> Block {
		let (block, target) = self.block_for_work(transactions);
		solve(block, target)
	}

	/// Mines a block and adds it to the consensus set.
	pub fn mine_and_apply(&self) -> Block {
		let block = self.find_block(Vec::new());
		self.cs.accept_block(block.clone()).expect("mined block is valid");
		block
	}

	/// First siacoin output of the test network's genesis allocation.
	pub fn genesis_funding(&self) -> (SiacoinOutputId, SiacoinOutput) {
		self.params.genesis_siacoin_allocation[0].clone()
	}
}
