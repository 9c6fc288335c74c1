use linked_hash_map::LinkedHashMap;
use chain::BlockId;

/// Bounded memoization of permanently invalid block ids. Membership means a
/// re-submission is rejected without any further checks. Eviction is FIFO.
pub struct DosCache {
	blocks: LinkedHashMap<BlockId, ()>,
	capacity: usize,
}

impl DosCache {
	pub fn new(capacity: usize) -> Self {
		DosCache {
			blocks: LinkedHashMap::new(),
			capacity: capacity,
		}
	}

	pub fn contains(&self, id: &BlockId) -> bool {
		self.blocks.contains_key(id)
	}

	pub fn insert(&mut self, id: BlockId) {
		if self.blocks.contains_key(&id) {
			return;
		}
		self.blocks.insert(id, ());
		while self.blocks.len() > self.capacity {
			self.blocks.pop_front();
		}
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.blocks.len()
	}
}
