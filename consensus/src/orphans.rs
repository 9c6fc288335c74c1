use std::collections::HashMap;
use chain::{Block, BlockId};

/// Blocks whose parent is not yet in the block tree. An orphan is never
/// validated; it is re-submitted through the acceptance pipeline once its
/// parent lands.
pub struct OrphanPool {
	/// Orphans indexed by the parent id they are waiting for.
	blocks: HashMap<BlockId, Vec<(BlockId, Block)>>,
}

impl OrphanPool {
	pub fn new() -> Self {
		OrphanPool {
			blocks: HashMap::new(),
		}
	}

	pub fn insert(&mut self, id: BlockId, block: Block) {
		let waiting = self.blocks.entry(block.parent_id.clone()).or_insert_with(Vec::new);
		if waiting.iter().any(|&(ref known, _)| *known == id) {
			return;
		}
		waiting.push((id, block));
	}

	/// Removes and returns all blocks waiting on the given parent.
	pub fn remove_blocks_for_parent(&mut self, parent_id: &BlockId) -> Vec<Block> {
		self.blocks.remove(parent_id)
			.unwrap_or_default()
			.into_iter()
			.map(|(_, block)| block)
			.collect()
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.blocks.values().map(Vec::len).sum()
	}
}

#[cfg(test)]
mod tests {
	use chain::Block;
	use super::OrphanPool;

	#[test]
	fn test_orphans_keyed_by_parent() {
		let mut pool = OrphanPool::new();
		let first = Block { parent_id: 1u8.into(), nonce: 1, ..Default::default() };
		let second = Block { parent_id: 1u8.into(), nonce: 2, ..Default::default() };
		let third = Block { parent_id: 2u8.into(), nonce: 3, ..Default::default() };

		pool.insert(first.id(), first.clone());
		pool.insert(second.id(), second);
		pool.insert(third.id(), third);
		assert_eq!(pool.len(), 3);

		let removed = pool.remove_blocks_for_parent(&1u8.into());
		assert_eq!(removed.len(), 2);
		assert_eq!(pool.len(), 1);
	}

	#[test]
	fn test_duplicate_orphan_kept_once() {
		let mut pool = OrphanPool::new();
		let orphan = Block { parent_id: 1u8.into(), ..Default::default() };

		pool.insert(orphan.id(), orphan.clone());
		pool.insert(orphan.id(), orphan);
		assert_eq!(pool.len(), 1);
	}
}
