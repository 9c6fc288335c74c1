use chain::Block;

/// One consensus state transition: the blocks that left the current path and
/// the blocks that joined it, both in walk order. A reorg that swaps chains
/// is a single update with both lists populated.
#[derive(Debug, Clone, Default)]
pub struct ConsensusChange {
	pub reverted_blocks: Vec<Block>,
	pub applied_blocks: Vec<Block>,
}

/// Consumer of consensus updates.
///
/// Updates are delivered synchronously, in registration order, after the
/// consensus lock has been released. Each accepted block produces exactly one
/// update. A subscriber must not call back into the engine from within the
/// callback; doing so is a logic error.
pub trait ConsensusSubscriber: Send + Sync {
	fn receive_consensus_update(&self, reverted_blocks: &[Block], applied_blocks: &[Block]);
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use parking_lot::Mutex;
	use test_data::solve;
	use network::{Network, ConsensusParams};
	use chain::{Block, BlockId, SiacoinOutput, subsidy, current_timestamp};
	use error::Error;
	use tester::ConsensusSetTester;
	use ConsensusSet;
	use super::ConsensusSubscriber;

	#[derive(Default)]
	struct RecordingSubscriber {
		updates: Mutex<Vec<(Vec<BlockId>, Vec<BlockId>)>>,
	}

	impl RecordingSubscriber {
		fn updates(&self) -> Vec<(Vec<BlockId>, Vec<BlockId>)> {
			self.updates.lock().clone()
		}
	}

	impl ConsensusSubscriber for RecordingSubscriber {
		fn receive_consensus_update(&self, reverted: &[Block], applied: &[Block]) {
			self.updates.lock().push((
				reverted.iter().map(Block::id).collect(),
				applied.iter().map(Block::id).collect(),
			));
		}
	}

	#[test]
	fn test_initial_synthetic_update() {
		let cst = ConsensusSetTester::new();
		cst.mine_and_apply();
		cst.mine_and_apply();

		let subscriber = Arc::new(RecordingSubscriber::default());
		cst.cs.subscribe(subscriber.clone());

		let updates = subscriber.updates();
		assert_eq!(updates.len(), 1);
		assert!(updates[0].0.is_empty());
		assert_eq!(updates[0].1, cst.cs.current_path());
	}

	#[test]
	fn test_one_update_per_accepted_block() {
		let cst = ConsensusSetTester::new();
		let subscriber = Arc::new(RecordingSubscriber::default());
		cst.cs.subscribe(subscriber.clone());

		let block1 = cst.mine_and_apply();
		let block2 = cst.mine_and_apply();

		let updates = subscriber.updates();
		assert_eq!(updates.len(), 3);
		assert_eq!(updates[1].1, vec![block1.id()]);
		assert_eq!(updates[2].1, vec![block2.id()]);

		// rejected blocks produce no update
		assert_eq!(cst.cs.accept_block(block2), Err(Error::BlockKnown));
		assert_eq!(subscriber.updates().len(), 3);
	}

	#[test]
	fn test_reorg_is_one_update() {
		let cst = ConsensusSetTester::new();
		let genesis = cst.params.genesis_block();
		cst.mine_and_apply();

		let subscriber = Arc::new(RecordingSubscriber::default());
		cst.cs.subscribe(subscriber.clone());

		let side = |parent: &Block, height: u64, salt: u8| {
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
		};
		let side1 = side(&genesis, 1, 0xd1);
		let side2 = side(&side1, 2, 0xd2);

		assert_eq!(cst.cs.accept_block(side1.clone()), Err(Error::NonExtendingBlock));
		cst.cs.accept_block(side2.clone()).unwrap();

		let updates = subscriber.updates();
		assert_eq!(updates.len(), 2);
		// the chain swap is one update with both lists populated
		assert_eq!(updates[1].0.len(), 1);
		assert_eq!(updates[1].1, vec![side1.id(), side2.id()]);
	}

	struct LockProbe {
		cs: Arc<ConsensusSet>,
		observed_free: Mutex<bool>,
	}

	impl ConsensusSubscriber for LockProbe {
		fn receive_consensus_update(&self, _reverted: &[Block], _applied: &[Block]) {
			*self.observed_free.lock() = self.cs.inner.try_read().is_some();
		}
	}

	#[test]
	fn test_dispatch_fires_after_lock_release() {
		let params = ConsensusParams::new(Network::Unitest);
		let cs = Arc::new(ConsensusSet::new(params.clone()));
		let probe = Arc::new(LockProbe {
			cs: cs.clone(),
			observed_free: Mutex::new(false),
		});
		cs.subscribe(probe.clone());

		let block = {
			let block = Block {
				parent_id: params.genesis_block().id(),
				timestamp: current_timestamp(),
				miner_payouts: vec![SiacoinOutput {
					value: subsidy(1),
					unlock_hash: 0xe1u8.into(),
				}],
				..Default::default()
			};
			solve(block, params.root_target)
		};
		cs.accept_block(block).unwrap();

		assert!(*probe.observed_free.lock());
	}
}
