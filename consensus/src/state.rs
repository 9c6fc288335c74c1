use std::collections::{HashMap, BTreeMap};
use network::ConsensusParams;
use chain::{
	Block, BlockId, BlockHeight, Currency,
	SiacoinOutput, SiacoinOutputId, SiafundOutput, SiafundOutputId,
	FileContract, FileContractId,
};

/// In-memory consensus state at the current tip.
///
/// An output id is present in at most one of the live set, the delayed
/// buckets and the spent past; the delayed bucket at height `h` is emptied
/// into the live set by the block at height `h`.
#[derive(Clone)]
pub struct State {
	pub siacoin_outputs: HashMap<SiacoinOutputId, SiacoinOutput>,
	pub siafund_outputs: HashMap<SiafundOutputId, SiafundOutput>,
	pub file_contracts: HashMap<FileContractId, FileContract>,
	pub delayed_siacoin_outputs: BTreeMap<BlockHeight, BTreeMap<SiacoinOutputId, SiacoinOutput>>,
	pub siafund_pool: Currency,
	/// Block ids from the genesis block to the current tip, indexed by height.
	pub current_path: Vec<BlockId>,
}

impl State {
	pub fn genesis(params: &ConsensusParams, genesis_block: &Block) -> State {
		State {
			siacoin_outputs: params.genesis_siacoin_allocation.iter().cloned().collect(),
			siafund_outputs: params.genesis_siafund_allocation.iter().cloned().collect(),
			file_contracts: HashMap::new(),
			delayed_siacoin_outputs: BTreeMap::new(),
			siafund_pool: 0,
			current_path: vec![genesis_block.id()],
		}
	}

	pub fn height(&self) -> BlockHeight {
		(self.current_path.len() - 1) as BlockHeight
	}

	pub fn current_block_id(&self) -> BlockId {
		*self.current_path.last()
			.expect("the current path always contains the genesis block; qed")
	}

	pub fn siacoin_output(&self, id: &SiacoinOutputId) -> Option<&SiacoinOutput> {
		self.siacoin_outputs.get(id)
	}

	pub fn siafund_output(&self, id: &SiafundOutputId) -> Option<&SiafundOutput> {
		self.siafund_outputs.get(id)
	}

	pub fn file_contract(&self, id: &FileContractId) -> Option<&FileContract> {
		self.file_contracts.get(id)
	}

	pub fn add_delayed_siacoin_output(&mut self, maturity: BlockHeight, id: SiacoinOutputId, output: SiacoinOutput) {
		let replaced = self.delayed_siacoin_outputs
			.entry(maturity)
			.or_insert_with(BTreeMap::new)
			.insert(id, output);
		debug_assert!(replaced.is_none(), "a delayed output is created at most once");
	}

	pub fn remove_delayed_siacoin_output(&mut self, maturity: BlockHeight, id: &SiacoinOutputId) -> Option<SiacoinOutput> {
		let (removed, now_empty) = match self.delayed_siacoin_outputs.get_mut(&maturity) {
			Some(bucket) => (bucket.remove(id), bucket.is_empty()),
			None => (None, false),
		};
		if now_empty {
			self.delayed_siacoin_outputs.remove(&maturity);
		}
		removed
	}

	/// Delayed outputs maturing at the given height, in id order.
	pub fn matured_outputs(&self, height: BlockHeight) -> Vec<(SiacoinOutputId, SiacoinOutput)> {
		self.delayed_siacoin_outputs.get(&height)
			.map(|bucket| bucket.iter().map(|(id, output)| (id.clone(), output.clone())).collect())
			.unwrap_or_default()
	}

	/// File contracts expiring at the given height, in id order.
	pub fn expired_contracts(&self, height: BlockHeight) -> Vec<(FileContractId, FileContract)> {
		let mut expired: Vec<_> = self.file_contracts.iter()
			.filter(|&(_, contract)| contract.expiration == height)
			.map(|(id, contract)| (id.clone(), contract.clone()))
			.collect();
		expired.sort_by(|a, b| a.0.cmp(&b.0));
		expired
	}
}
