use std::collections::HashMap;
use primitives::uint::U256;
use network::ConsensusParams;
use chain::constants::{BLOCK_FREQUENCY, MEDIAN_TIMESTAMP_WINDOW};
use chain::{Block, BlockId, BlockHeight, Target, Timestamp};
use diffs::BlockDiffs;

/// A block linked into the block tree. Created once the block passes
/// structural validation; never deleted for the lifetime of the process.
pub struct BlockNode {
	pub block: Block,
	pub id: BlockId,
	pub parent_id: BlockId,
	pub height: BlockHeight,
	/// Sum of target-implied difficulty over all ancestors; the fork-choice
	/// metric.
	pub cumulative_work: U256,
	/// Target a child of this node must satisfy.
	pub child_target: Target,
	/// Timestamps of this block and its closest ancestors, newest first,
	/// capped at the median window size.
	ancestor_timestamps: Vec<Timestamp>,
	/// Diffs generated on the first application; reused on every later
	/// traversal.
	pub diffs: Option<BlockDiffs>,
	pub children: Vec<BlockId>,
}

impl BlockNode {
	/// Minimum timestamp a child block may carry: the median of the ancestor
	/// timestamp window.
	pub fn earliest_child_timestamp(&self) -> Timestamp {
		let mut sorted = self.ancestor_timestamps.clone();
		sorted.sort();
		sorted[sorted.len() / 2]
	}

	pub fn diffs_generated(&self) -> bool {
		self.diffs.is_some()
	}
}

/// Arena of all known valid blocks, keyed by block id. Nodes refer to each
/// other by id, so revert/apply walks are plain map lookups.
pub struct BlockTree {
	nodes: HashMap<BlockId, BlockNode>,
	genesis_id: BlockId,
}

impl BlockTree {
	pub fn new(genesis: Block, params: &ConsensusParams) -> BlockTree {
		let genesis_id = genesis.id();
		let genesis_timestamp = genesis.timestamp;
		let node = BlockNode {
			block: genesis,
			id: genesis_id.clone(),
			parent_id: Default::default(),
			height: 0,
			cumulative_work: U256::zero(),
			child_target: params.root_target,
			ancestor_timestamps: vec![genesis_timestamp],
			diffs: None,
			children: Vec::new(),
		};

		let mut nodes = HashMap::new();
		nodes.insert(genesis_id.clone(), node);
		BlockTree {
			nodes: nodes,
			genesis_id: genesis_id,
		}
	}

	pub fn genesis_id(&self) -> &BlockId {
		&self.genesis_id
	}

	pub fn contains(&self, id: &BlockId) -> bool {
		self.nodes.contains_key(id)
	}

	pub fn get(&self, id: &BlockId) -> Option<&BlockNode> {
		self.nodes.get(id)
	}

	pub fn node(&self, id: &BlockId) -> &BlockNode {
		self.nodes.get(id).expect("only ids of linked nodes are walked; qed")
	}

	pub fn node_mut(&mut self, id: &BlockId) -> &mut BlockNode {
		self.nodes.get_mut(id).expect("only ids of linked nodes are walked; qed")
	}

	/// Links a structurally valid block under its parent and returns the new
	/// node id.
	pub fn insert(&mut self, block: Block, params: &ConsensusParams) -> BlockId {
		let id = block.id();
		let (height, cumulative_work, child_target, ancestor_timestamps) = {
			let parent = self.node(&block.parent_id);

			let mut timestamps = Vec::with_capacity(MEDIAN_TIMESTAMP_WINDOW);
			timestamps.push(block.timestamp);
			timestamps.extend(parent.ancestor_timestamps.iter()
				.take(MEDIAN_TIMESTAMP_WINDOW - 1)
				.cloned());

			let work = parent.cumulative_work + parent.child_target.difficulty();
			let target = child_target(parent.child_target, &timestamps, params);
			(parent.height + 1, work, target, timestamps)
		};

		let parent_id = block.parent_id.clone();
		let node = BlockNode {
			block: block,
			id: id.clone(),
			parent_id: parent_id.clone(),
			height: height,
			cumulative_work: cumulative_work,
			child_target: child_target,
			ancestor_timestamps: ancestor_timestamps,
			diffs: None,
			children: Vec::new(),
		};

		self.nodes.insert(id.clone(), node);
		self.node_mut(&parent_id).children.push(id.clone());
		id
	}

	/// Removes the child link of a node found invalid during a fork walk.
	/// The node itself stays in the arena, so a re-submission is classified
	/// as a known block.
	pub fn unlink_child(&mut self, parent_id: &BlockId, child_id: &BlockId) {
		let children = &mut self.node_mut(parent_id).children;
		children.retain(|id| id != child_id);
	}

	/// Closest common ancestor of two linked nodes.
	pub fn common_ancestor(&self, a: &BlockId, b: &BlockId) -> BlockId {
		let mut a = self.node(a);
		let mut b = self.node(b);

		while a.height > b.height {
			a = self.node(&a.parent_id);
		}
		while b.height > a.height {
			b = self.node(&b.parent_id);
		}
		while a.id != b.id {
			a = self.node(&a.parent_id);
			b = self.node(&b.parent_id);
		}
		a.id.clone()
	}

	/// Node ids from `from` back to the common ancestor, tip first, ancestor
	/// excluded.
	pub fn path_back(&self, from: &BlockId, ancestor: &BlockId) -> Vec<BlockId> {
		let mut path = Vec::new();
		let mut current = from.clone();
		while current != *ancestor {
			let node = self.node(&current);
			path.push(current);
			current = node.parent_id.clone();
		}
		path
	}
}

/// Target for the next block, derived from the parent target and the pace of
/// the recent chain, clamped to the per-network adjustment bounds.
fn child_target(parent_target: Target, window: &[Timestamp], params: &ConsensusParams) -> Target {
	if window.len() < 2 {
		return parent_target;
	}

	let newest = window[0];
	let oldest = window[window.len() - 1];
	let elapsed = newest.saturating_sub(oldest);
	let expected = BLOCK_FREQUENCY * (window.len() as u64 - 1);

	let (up_num, up_den) = params.max_adjustment_up;
	let (down_num, down_den) = params.max_adjustment_down;

	let (numerator, denominator) = if elapsed * up_den > expected * up_num {
		(up_num, up_den)
	} else if elapsed * down_den < expected * down_num {
		(down_num, down_den)
	} else {
		(::std::cmp::max(elapsed, 1), expected)
	};

	parent_target.adjusted(numerator, denominator)
}

#[cfg(test)]
mod tests {
	use network::{Network, ConsensusParams};
	use chain::Block;
	use super::BlockTree;

	fn tree_with_chain(length: u64) -> (BlockTree, Vec<Block>) {
		let params = ConsensusParams::new(Network::Unitest);
		let genesis = params.genesis_block();
		let mut tree = BlockTree::new(genesis.clone(), &params);

		let mut blocks = vec![genesis];
		for height in 1..length {
			let block = Block {
				parent_id: blocks[height as usize - 1].id(),
				timestamp: params.genesis_timestamp + height * 600,
				..Default::default()
			};
			tree.insert(block.clone(), &params);
			blocks.push(block);
		}
		(tree, blocks)
	}

	#[test]
	fn test_heights_and_work_accumulate() {
		let (tree, blocks) = tree_with_chain(4);
		let first = tree.node(&blocks[1].id());
		let last = tree.node(&blocks[3].id());
		assert_eq!(first.height, 1);
		assert_eq!(last.height, 3);
		assert!(last.cumulative_work > first.cumulative_work);
	}

	#[test]
	fn test_common_ancestor_of_fork() {
		let params = ConsensusParams::new(Network::Unitest);
		let (mut tree, blocks) = tree_with_chain(3);

		let side = Block {
			parent_id: blocks[1].id(),
			timestamp: params.genesis_timestamp + 7,
			..Default::default()
		};
		tree.insert(side.clone(), &params);

		assert_eq!(tree.common_ancestor(&blocks[2].id(), &side.id()), blocks[1].id());
		assert_eq!(tree.common_ancestor(&blocks[2].id(), &blocks[2].id()), blocks[2].id());
	}

	#[test]
	fn test_path_back_excludes_ancestor() {
		let (tree, blocks) = tree_with_chain(4);
		let path = tree.path_back(&blocks[3].id(), &blocks[1].id());
		assert_eq!(path, vec![blocks[3].id(), blocks[2].id()]);
		assert!(tree.path_back(&blocks[1].id(), &blocks[1].id()).is_empty());
	}

	#[test]
	fn test_earliest_child_timestamp_is_median() {
		let (tree, blocks) = tree_with_chain(4);
		// window, newest first: [g + 1800, g + 1200, g + 600, g]
		let params = ConsensusParams::new(Network::Unitest);
		let node = tree.node(&blocks[3].id());
		assert_eq!(node.earliest_child_timestamp(), params.genesis_timestamp + 1200);
	}

	#[test]
	fn test_unitest_target_is_constant() {
		let params = ConsensusParams::new(Network::Unitest);
		let (tree, blocks) = tree_with_chain(4);
		assert_eq!(tree.node(&blocks[3].id()).child_target, params.root_target);
	}
}
