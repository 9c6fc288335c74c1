//! Consensus engine.
//!
//! Takes candidate blocks from peers or a local miner, validates them under
//! the chain rules, integrates accepted blocks into a tree of known blocks,
//! selects the heaviest valid chain and transitions the in-memory consensus
//! state atomically to the new tip. Every revert/apply transition is
//! broadcast to registered subscribers so downstream modules stay coherent
//! across reorgs.

#[macro_use]
extern crate log;
extern crate linked_hash_map;
extern crate parking_lot;
extern crate chain;
extern crate network;
extern crate primitives;
extern crate serialization as ser;
extern crate siacrypto as crypto;

#[cfg(test)]
extern crate test_data;

mod accept;
mod audit;
mod block_node;
mod diffs;
mod dos_cache;
mod error;
mod fork;
mod future_blocks;
mod orphans;
mod state;
mod subscribe;
mod validation;

#[cfg(test)]
mod tester;

pub use error::{Error, TransactionError};
pub use subscribe::{ConsensusChange, ConsensusSubscriber};

use std::sync::Arc;
use parking_lot::{RwLock, Mutex};
use primitives::hash::H256;
use network::ConsensusParams;
use chain::{
	Block, BlockId, BlockHeight, Target, Timestamp,
	SiacoinOutput, SiacoinOutputId, SiafundOutput, SiafundOutputId,
	FileContract, FileContractId,
};
use block_node::BlockTree;
use dos_cache::DosCache;
use future_blocks::FutureBlocksQueue;
use orphans::OrphanPool;
use state::State;

/// The consensus set. All state is guarded by a single read/write lock;
/// block acceptance holds it exclusively, queries hold it shared. Subscriber
/// callbacks fire after the lock has been released.
pub struct ConsensusSet {
	params: ConsensusParams,
	inner: RwLock<Inner>,
	subscribers: Mutex<Vec<Arc<dyn ConsensusSubscriber>>>,
}

struct Inner {
	tree: BlockTree,
	state: State,
	dos_blocks: DosCache,
	future_blocks: FutureBlocksQueue,
	orphans: OrphanPool,
}

impl ConsensusSet {
	pub fn new(params: ConsensusParams) -> Self {
		let genesis = params.genesis_block();
		let state = State::genesis(&params, &genesis);
		let tree = BlockTree::new(genesis, &params);
		let dos_capacity = params.dos_cache_capacity;

		ConsensusSet {
			params: params,
			inner: RwLock::new(Inner {
				tree: tree,
				state: state,
				dos_blocks: DosCache::new(dos_capacity),
				future_blocks: FutureBlocksQueue::new(),
				orphans: OrphanPool::new(),
			}),
			subscribers: Mutex::new(Vec::new()),
		}
	}

	/// Block at the current tip.
	pub fn current_block(&self) -> Block {
		let inner = self.inner.read();
		let tip = inner.state.current_block_id();
		inner.tree.node(&tip).block.clone()
	}

	/// Block ids from genesis to the current tip, indexed by height.
	pub fn current_path(&self) -> Vec<BlockId> {
		self.inner.read().state.current_path.clone()
	}

	pub fn height(&self) -> BlockHeight {
		self.inner.read().state.height()
	}

	/// Block by id, if it is linked into the block tree.
	pub fn block(&self, id: &BlockId) -> Option<Block> {
		self.inner.read().tree.get(id).map(|node| node.block.clone())
	}

	/// Target the next block must satisfy.
	pub fn current_target(&self) -> Target {
		let inner = self.inner.read();
		let tip = inner.state.current_block_id();
		inner.tree.node(&tip).child_target
	}

	/// Minimum timestamp the next block may carry.
	pub fn earliest_child_timestamp(&self) -> Timestamp {
		let inner = self.inner.read();
		let tip = inner.state.current_block_id();
		inner.tree.node(&tip).earliest_child_timestamp()
	}

	pub fn siacoin_output(&self, id: &SiacoinOutputId) -> Option<SiacoinOutput> {
		self.inner.read().state.siacoin_output(id).cloned()
	}

	/// All live siacoin outputs.
	pub fn siacoin_outputs(&self) -> Vec<(SiacoinOutputId, SiacoinOutput)> {
		self.inner.read().state.siacoin_outputs.iter()
			.map(|(id, output)| (id.clone(), output.clone()))
			.collect()
	}

	pub fn siafund_output(&self, id: &SiafundOutputId) -> Option<SiafundOutput> {
		self.inner.read().state.siafund_output(id).cloned()
	}

	pub fn file_contract(&self, id: &FileContractId) -> Option<FileContract> {
		self.inner.read().state.file_contract(id).cloned()
	}

	pub fn siafund_pool(&self) -> chain::Currency {
		self.inner.read().state.siafund_pool
	}

	/// Diagnostic hash over the canonical serialization of the consensus
	/// state at the current tip.
	pub fn consensus_set_hash(&self) -> H256 {
		audit::consensus_set_hash(&self.inner.read().state)
	}

	/// Registers a subscriber. The subscriber immediately receives a
	/// synthetic update conveying the current path as applied blocks.
	pub fn subscribe(&self, subscriber: Arc<dyn ConsensusSubscriber>) {
		let applied: Vec<Block> = {
			let inner = self.inner.read();
			inner.state.current_path.iter()
				.map(|id| inner.tree.node(id).block.clone())
				.collect()
		};
		subscriber.receive_consensus_update(&[], &applied);
		self.subscribers.lock().push(subscriber);
	}

	fn dispatch(&self, change: &ConsensusChange) {
		let subscribers = self.subscribers.lock().clone();
		for subscriber in &subscribers {
			subscriber.receive_consensus_update(&change.reverted_blocks, &change.applied_blocks);
		}
	}
}
