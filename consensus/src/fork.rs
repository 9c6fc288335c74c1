//! Fork choice and chain reorganization.
//!
//! Walks from the current tip to a new tip through their common ancestor,
//! reverting cached diffs on the way down and applying (or generating) diffs
//! on the way up. A failure while applying rolls the whole walk back and
//! restores the original tip.

use chain::BlockId;
use diffs::{self, DiffDirection};
use error::Error;
use audit;
use Inner;

impl Inner {
	/// Makes the given linked node the tip. Returns the ids of the reverted
	/// and applied blocks, in walk order.
	///
	/// If a block on the apply path turns out to carry an invalid
	/// transaction, it is cached as a DoS block, unlinked from its parent
	/// and the original tip is restored; the offender's specific error is
	/// returned.
	pub fn fork_blockchain(&mut self, new_tip: &BlockId) -> Result<(Vec<BlockId>, Vec<BlockId>), Error> {
		let current_id = self.state.current_block_id();
		let ancestor = self.tree.common_ancestor(&current_id, new_tip);
		let revert_ids = self.tree.path_back(&current_id, &ancestor);
		let mut apply_ids = self.tree.path_back(new_tip, &ancestor);
		apply_ids.reverse();

		for id in &revert_ids {
			self.revert_block(id);
		}

		let mut applied: Vec<BlockId> = Vec::new();
		for id in &apply_ids {
			match self.apply_block(id) {
				Ok(()) => applied.push(id.clone()),
				Err(err) => {
					trace!(target: "consensus", "fork walk failed at {:?}: {}, rolling back", id, err);
					for done in applied.iter().rev() {
						self.revert_block(done);
					}
					for restore in revert_ids.iter().rev() {
						self.apply_block(restore)
							.expect("cached diffs reapply to the state they were reverted from; qed");
					}
					let parent_id = self.tree.node(id).parent_id.clone();
					self.dos_blocks.insert(id.clone());
					self.tree.unlink_child(&parent_id, id);
					return Err(err);
				},
			}
		}

		self.check_consistency();
		Ok((revert_ids, apply_ids))
	}

	fn revert_block(&mut self, id: &BlockId) {
		let diffs = self.tree.node(id).diffs.as_ref()
			.expect("a block on the current path has generated diffs; qed");
		diffs.commit(&mut self.state, DiffDirection::Revert);
		let popped = self.state.current_path.pop();
		debug_assert_eq!(popped.as_ref(), Some(id));
	}

	fn apply_block(&mut self, id: &BlockId) -> Result<(), Error> {
		if self.tree.node(id).diffs_generated() {
			let diffs = self.tree.node(id).diffs.as_ref()
				.expect("diffs_generated was just checked; qed");
			diffs.commit(&mut self.state, DiffDirection::Apply);
		} else {
			let (block, height) = {
				let node = self.tree.node(id);
				(node.block.clone(), node.height)
			};
			let generated = diffs::generate_and_apply(&mut self.state, &block, id, height)?;
			self.tree.node_mut(id).diffs = Some(generated);
		}
		self.state.current_path.push(id.clone());
		Ok(())
	}

	/// Refolds the siafund pool diffs along the current path and aborts with
	/// a distinguished tag when they disagree with the state scalar.
	pub fn check_consistency(&self) {
		let mut running = 0;
		for id in self.state.current_path.iter().skip(1) {
			let diff = self.tree.node(id).diffs.as_ref()
				.expect("a block on the current path has generated diffs; qed")
				.siafund_pool_diff();
			if diff.previous != running {
				panic!("{}", audit::SIACOIN_MISCOUNT);
			}
			running = diff.adjusted;
		}
		if running != self.state.siafund_pool {
			panic!("{}", audit::SIACOIN_MISCOUNT);
		}
	}
}

#[cfg(test)]
mod tests {
	use test_data::{solve, TransactionBuilder};
	use chain::{Block, SiacoinOutput, subsidy, current_timestamp};
	use error::{Error, TransactionError};
	use tester::ConsensusSetTester;

	/// Solved block on an arbitrary parent, for side chains the tester's
	/// tip-following helpers cannot build.
	fn side_block(cst: &ConsensusSetTester, parent: &Block, height: u64, salt: u8) -> Block {
		let block = Block {
			parent_id: parent.id(),
			timestamp: current_timestamp(),
			miner_payouts: vec![SiacoinOutput {
				value: subsidy(height),
				unlock_hash: salt.into(),
			}],
			..Default::default()
		};
		solve(block, cst.params.root_target)
	}

	#[test]
	fn test_revert_apply_round_trip() {
		let cst = ConsensusSetTester::new();
		let initial_hash = cst.cs.consensus_set_hash();

		let block = cst.mine_and_apply();
		let resulting_hash = cst.cs.consensus_set_hash();
		assert!(resulting_hash != initial_hash);

		// revert the block; the state must return to its original form
		let genesis_id = cst.cs.current_path()[0].clone();
		cst.cs.inner.write().fork_blockchain(&genesis_id).unwrap();
		assert_eq!(cst.cs.consensus_set_hash(), initial_hash);
		assert_eq!(cst.cs.height(), 0);

		// re-apply it; this walks the cached-diff codepath
		cst.cs.inner.write().fork_blockchain(&block.id()).unwrap();
		assert_eq!(cst.cs.consensus_set_hash(), resulting_hash);
		assert_eq!(cst.cs.current_block().id(), block.id());
	}

	#[test]
	fn test_reorg_to_heavier_fork() {
		let cst = ConsensusSetTester::new();
		let genesis = cst.params.genesis_block();

		let main1 = cst.mine_and_apply();
		let main2 = cst.mine_and_apply();

		let side1 = side_block(&cst, &genesis, 1, 0xb1);
		let side2 = side_block(&cst, &side1, 2, 0xb2);
		let side3 = side_block(&cst, &side2, 3, 0xb3);

		assert_eq!(cst.cs.accept_block(side1.clone()), Err(Error::NonExtendingBlock));
		// equal cumulative work does not switch chains
		assert_eq!(cst.cs.accept_block(side2.clone()), Err(Error::NonExtendingBlock));
		assert_eq!(cst.cs.current_block().id(), main2.id());

		cst.cs.accept_block(side3.clone()).unwrap();
		assert_eq!(cst.cs.height(), 3);
		let path = cst.cs.current_path();
		assert_eq!(path, vec![genesis.id(), side1.id(), side2.id(), side3.id()]);
		assert!(cst.cs.block(&main1.id()).is_some());
	}

	#[test]
	fn test_failed_fork_walk_restores_tip() {
		let cst = ConsensusSetTester::new();
		let genesis = cst.params.genesis_block();

		cst.mine_and_apply();
		let main2 = cst.mine_and_apply();
		let before_hash = cst.cs.consensus_set_hash();

		let side1 = side_block(&cst, &genesis, 1, 0xc1);

		// structurally valid, but spends an output that does not exist
		let bad_transaction = TransactionBuilder::new()
			.siacoin_input(0xeeu8.into())
			.build();
		let side2 = {
			let block = Block {
				parent_id: side1.id(),
				timestamp: current_timestamp(),
				miner_payouts: vec![SiacoinOutput {
					value: subsidy(2),
					unlock_hash: 0xc2u8.into(),
				}],
				transactions: vec![bad_transaction],
				..Default::default()
			};
			solve(block, cst.params.root_target)
		};
		let side3 = side_block(&cst, &side2, 3, 0xc3);

		assert_eq!(cst.cs.accept_block(side1.clone()), Err(Error::NonExtendingBlock));
		assert_eq!(cst.cs.accept_block(side2.clone()), Err(Error::NonExtendingBlock));

		// the walk reverts the main chain, applies side1, fails at side2 and
		// rolls everything back
		assert_eq!(
			cst.cs.accept_block(side3.clone()),
			Err(Error::Transaction(0, TransactionError::MissingSiacoinOutput))
		);
		assert_eq!(cst.cs.current_block().id(), main2.id());
		assert_eq!(cst.cs.consensus_set_hash(), before_hash);

		// the offender is memoized, its descendant stays known
		assert_eq!(cst.cs.accept_block(side2), Err(Error::DoSBlock));
		assert_eq!(cst.cs.accept_block(side3), Err(Error::BlockKnown));
	}

	#[test]
	#[should_panic(expected = "SiacoinMiscount")]
	fn test_inconsistent_pool_aborts() {
		let cst = ConsensusSetTester::new();
		cst.mine_and_apply();

		// corrupt the consensus set, then trigger the audit with a new block
		cst.cs.inner.write().state.siafund_pool += 1;
		let block = cst.find_block(Vec::new());
		let _ = cst.cs.accept_block(block);
	}
}
