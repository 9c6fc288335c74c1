use std::collections::BTreeMap;
use chain::constants::FUTURE_THRESHOLD;
use chain::{Block, Timestamp};

/// Blocks whose timestamp is ahead of the wall clock by more than the future
/// threshold, but by no more than the extreme threshold. Each block is keyed
/// by the time at which it stops being futuristic and can be re-submitted.
pub struct FutureBlocksQueue {
	blocks: BTreeMap<Timestamp, Vec<Block>>,
}

impl FutureBlocksQueue {
	pub fn new() -> Self {
		FutureBlocksQueue {
			blocks: BTreeMap::new(),
		}
	}

	pub fn insert(&mut self, block: Block) {
		let ready_at = block.timestamp - FUTURE_THRESHOLD;
		self.blocks.entry(ready_at).or_insert_with(Vec::new).push(block);
	}

	/// Removes and returns every block that is no longer futuristic.
	pub fn ready(&mut self, now: Timestamp) -> Vec<Block> {
		let mut ready = Vec::new();
		loop {
			let key = match self.blocks.keys().next() {
				Some(&key) if key <= now => key,
				_ => break,
			};
			let mut blocks = self.blocks.remove(&key)
				.expect("key was just read from the map; qed");
			ready.append(&mut blocks);
		}
		ready
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.blocks.values().map(Vec::len).sum()
	}
}

#[cfg(test)]
mod tests {
	use chain::constants::FUTURE_THRESHOLD;
	use chain::Block;
	use super::FutureBlocksQueue;

	fn block_with_timestamp(timestamp: u64) -> Block {
		Block {
			timestamp: timestamp,
			..Default::default()
		}
	}

	#[test]
	fn test_ready_drains_in_order() {
		let now = 10_000_000;
		let mut queue = FutureBlocksQueue::new();
		queue.insert(block_with_timestamp(now + FUTURE_THRESHOLD + 2));
		queue.insert(block_with_timestamp(now + FUTURE_THRESHOLD + 100));

		assert!(queue.ready(now).is_empty());
		assert_eq!(queue.len(), 2);

		let ready = queue.ready(now + 2);
		assert_eq!(ready.len(), 1);
		assert_eq!(ready[0].timestamp, now + FUTURE_THRESHOLD + 2);

		let ready = queue.ready(now + 100);
		assert_eq!(ready.len(), 1);
		assert_eq!(queue.len(), 0);
	}
}
