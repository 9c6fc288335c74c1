//! Block acceptance pipeline.
//!
//! Classifies every incoming block as known, DoS, orphan, futuristic or
//! valid, links valid blocks into the tree and hands them to fork choice.
//! The future queue is drained at the top of every call, and orphans waiting
//! on a freshly linked block are re-submitted through the pipeline.

use network::ConsensusParams;
use chain::{Block, Timestamp, current_timestamp};
use error::Error;
use subscribe::ConsensusChange;
use validation;
use {ConsensusSet, Inner};

impl ConsensusSet {
	/// Adds a block to the consensus set, reorganizing to the heaviest chain
	/// when the block extends it. Synchronous; subscriber callbacks have
	/// fired by the time this returns.
	pub fn accept_block(&self, block: Block) -> Result<(), Error> {
		let now = current_timestamp();

		let ready = self.inner.write().future_blocks.ready(now);
		for deferred in ready {
			let id = deferred.id();
			if let Err(err) = self.submit_block(deferred, now) {
				trace!(target: "consensus", "deferred block {} rejected: {}", id, err);
			}
		}

		self.submit_block(block, now)
	}

	fn submit_block(&self, block: Block, now: Timestamp) -> Result<(), Error> {
		let block_id = block.id();
		let (result, changes, orphans) = {
			let mut inner = self.inner.write();
			let mut changes = Vec::new();
			let result = inner.process_block(&self.params, block, now, &mut changes);
			let orphans = match result {
				// a node was linked either way; its orphans can be replayed
				Ok(()) | Err(Error::NonExtendingBlock) =>
					inner.orphans.remove_blocks_for_parent(&block_id),
				_ => Vec::new(),
			};
			(result, changes, orphans)
		};

		for change in &changes {
			self.dispatch(change);
		}

		for orphan in orphans {
			let id = orphan.id();
			if let Err(err) = self.submit_block(orphan, now) {
				trace!(target: "consensus", "replayed orphan {} rejected: {}", id, err);
			}
		}

		result
	}
}

impl Inner {
	fn process_block(&mut self, params: &ConsensusParams, block: Block, now: Timestamp, changes: &mut Vec<ConsensusChange>) -> Result<(), Error> {
		let block_id = block.id();

		if self.dos_blocks.contains(&block_id) {
			return Err(Error::DoSBlock);
		}
		if self.tree.contains(&block_id) {
			return Err(Error::BlockKnown);
		}
		if !self.tree.contains(&block.parent_id) {
			self.orphans.insert(block_id, block);
			return Err(Error::Orphan);
		}

		match validation::valid_header(&block, &block_id, self.tree.node(&block.parent_id), now) {
			Ok(()) => (),
			Err(Error::FutureTimestamp) => {
				self.future_blocks.insert(block);
				return Err(Error::FutureTimestamp);
			},
			Err(err) => {
				self.dos_blocks.insert(block_id);
				return Err(err);
			},
		}

		let id = self.tree.insert(block, params);

		let current_id = self.state.current_block_id();
		if self.tree.node(&id).cumulative_work <= self.tree.node(&current_id).cumulative_work {
			trace!(target: "consensus", "block {} does not extend the heaviest chain", id);
			return Err(Error::NonExtendingBlock);
		}

		let (reverted, applied) = self.fork_blockchain(&id)?;
		info!(target: "consensus", "new tip {} at height {}", id, self.state.height());

		changes.push(ConsensusChange {
			reverted_blocks: reverted.iter().map(|id| self.tree.node(id).block.clone()).collect(),
			applied_blocks: applied.iter().map(|id| self.tree.node(id).block.clone()).collect(),
		});
		Ok(())
	}
}
