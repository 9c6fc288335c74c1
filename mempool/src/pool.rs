use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use parking_lot::Mutex;
use chain::{
	Block, BlockHeight, Transaction, TransactionId,
	SiacoinOutput, SiacoinOutputId, SiafundOutputId, FileContractId,
};
use consensus::{ConsensusSet, ConsensusSubscriber};
use error::Error;

/// Maximum serialized size of a standard transaction.
pub const TRANSACTION_SIZE_LIMIT: usize = 16 * 1024;

/// Standard transactions may only carry tagged arbitrary data.
const ARBITRARY_DATA_PREFIX: &'static [u8] = b"NonSia";

/// Consumer of transaction pool updates: the blocks that drove the change
/// plus the transactions that left the pool and the ones that returned to it.
pub trait MempoolSubscriber: Send + Sync {
	fn receive_mempool_update(
		&self,
		reverted_blocks: &[Block],
		applied_blocks: &[Block],
		reverted_transactions: &[Transaction],
		applied_transactions: &[Transaction],
	);
}

/// Pool of unconfirmed transactions, indexed by every object they spend or
/// settle so chain updates can find stale entries without replaying the
/// whole pool.
pub struct TransactionPool {
	consensus: Arc<ConsensusSet>,
	inner: Mutex<Inner>,
	subscribers: Mutex<Vec<Arc<dyn MempoolSubscriber>>>,
}

#[derive(Default)]
struct Inner {
	transactions: HashMap<TransactionId, Transaction>,
	/// Mining order; rewound transactions are put at the front so existing
	/// unconfirmed transactions keep depending on them.
	order: VecDeque<TransactionId>,
	used_siacoin_outputs: HashMap<SiacoinOutputId, TransactionId>,
	/// Outputs created by unconfirmed transactions.
	siacoin_outputs: HashMap<SiacoinOutputId, SiacoinOutput>,
	used_siafund_outputs: HashMap<SiafundOutputId, TransactionId>,
	file_contracts: HashMap<FileContractId, TransactionId>,
	new_file_contracts: HashMap<BlockHeight, HashMap<FileContractId, TransactionId>>,
	storage_proofs: HashMap<FileContractId, TransactionId>,
	storage_proofs_by_start: HashMap<BlockHeight, HashMap<FileContractId, TransactionId>>,
	storage_proofs_by_expiration: HashMap<BlockHeight, HashMap<FileContractId, TransactionId>>,
	/// Start/expiration of every contract seen in the chain or the pool.
	/// Contract ids are content-derived, so entries never go stale.
	contract_windows: HashMap<FileContractId, (BlockHeight, BlockHeight)>,
	height: BlockHeight,
	primed: bool,
}

impl TransactionPool {
	/// Creates a pool and registers it with the consensus set. The synthetic
	/// registration update primes the contract-window index from the current
	/// path.
	pub fn new(consensus: Arc<ConsensusSet>) -> Arc<TransactionPool> {
		let height = consensus.height();
		let pool = Arc::new(TransactionPool {
			consensus: consensus.clone(),
			inner: Mutex::new(Inner {
				height: height,
				..Default::default()
			}),
			subscribers: Mutex::new(Vec::new()),
		});
		consensus.subscribe(pool.clone());
		pool
	}

	/// Admits an unconfirmed transaction into the pool.
	pub fn accept_transaction(&self, transaction: Transaction) -> Result<(), Error> {
		if !is_standard(&transaction) {
			return Err(Error::NonStandard);
		}

		let id = transaction.hash();
		let mut inner = self.inner.lock();
		if inner.transactions.contains_key(&id) {
			return Err(Error::DuplicateTransaction);
		}

		for input in &transaction.siacoin_inputs {
			if inner.used_siacoin_outputs.contains_key(&input.parent_id) {
				return Err(Error::Conflict);
			}
			let known = self.consensus.siacoin_output(&input.parent_id).is_some()
				|| inner.siacoin_outputs.contains_key(&input.parent_id);
			if !known {
				return Err(Error::UnknownReference);
			}
		}
		for input in &transaction.siafund_inputs {
			if inner.used_siafund_outputs.contains_key(&input.parent_id) {
				return Err(Error::Conflict);
			}
			if self.consensus.siafund_output(&input.parent_id).is_none() {
				return Err(Error::UnknownReference);
			}
		}
		for proof in &transaction.storage_proofs {
			if inner.storage_proofs.contains_key(&proof.parent_id) {
				return Err(Error::Conflict);
			}
			let window = self.consensus.file_contract(&proof.parent_id)
				.map(|contract| (contract.start, contract.expiration))
				.or_else(|| inner.contract_windows.get(&proof.parent_id).cloned());
			match window {
				Some(window) => {
					inner.contract_windows.insert(proof.parent_id.clone(), window);
				},
				None => return Err(Error::UnknownReference),
			}
		}

		trace!(target: "mempool", "accepted transaction {}", id);
		inner.insert_transaction(id, transaction, false);
		Ok(())
	}

	/// Unconfirmed transactions in mining order.
	pub fn transactions(&self) -> Vec<Transaction> {
		let inner = self.inner.lock();
		inner.order.iter()
			.map(|id| inner.transactions[id].clone())
			.collect()
	}

	pub fn transaction(&self, id: &TransactionId) -> Option<Transaction> {
		self.inner.lock().transactions.get(id).cloned()
	}

	pub fn subscribe(&self, subscriber: Arc<dyn MempoolSubscriber>) {
		self.subscribers.lock().push(subscriber);
	}
}

impl ConsensusSubscriber for TransactionPool {
	fn receive_consensus_update(&self, reverted_blocks: &[Block], applied_blocks: &[Block]) {
		let (removed, readded) = {
			let mut inner = self.inner.lock();
			if !inner.primed {
				// registration update: the pool was initialized at the
				// current height, only the contract windows are missing
				inner.primed = true;
				for block in applied_blocks {
					for transaction in &block.transactions {
						inner.record_contract_windows(transaction);
					}
				}
				(Vec::new(), Vec::new())
			} else {
				inner.update(reverted_blocks, applied_blocks)
			}
		};

		trace!(
			target: "mempool",
			"consensus update: {} reverted, {} applied, {} transactions removed, {} returned",
			reverted_blocks.len(), applied_blocks.len(), removed.len(), readded.len(),
		);

		let subscribers = self.subscribers.lock().clone();
		for subscriber in &subscribers {
			subscriber.receive_mempool_update(reverted_blocks, applied_blocks, &removed, &readded);
		}
	}
}

impl Inner {
	fn update(&mut self, reverted_blocks: &[Block], applied_blocks: &[Block]) -> (Vec<Transaction>, Vec<Transaction>) {
		let mut removed = Vec::new();
		let mut readded = Vec::new();

		for block in reverted_blocks {
			// storage proofs whose contract window opened at this height
			// anchor to the block being reverted
			let invalidated: Vec<TransactionId> = self.storage_proofs_by_start
				.get(&self.height)
				.map(|bucket| bucket.values().cloned().collect())
				.unwrap_or_default();
			for id in invalidated {
				self.purge_transaction(&id, &mut removed);
			}
			self.storage_proofs_by_start.remove(&self.height);

			// return the block's transactions to the pool in reverse order
			// to preserve dependencies; non-standard ones are dropped along
			// with anything built on them
			for transaction in block.transactions.iter().rev() {
				self.record_contract_windows(transaction);
				if !is_standard(transaction) {
					self.remove_dependent_transactions(transaction, &mut removed);
					continue;
				}
				let id = transaction.hash();
				if self.transactions.contains_key(&id) {
					continue;
				}
				self.insert_transaction(id, transaction.clone(), true);
				readded.push(transaction.clone());
			}

			self.height -= 1;
		}

		for block in applied_blocks {
			self.height += 1;

			for transaction in &block.transactions {
				self.record_contract_windows(transaction);
				let id = transaction.hash();
				if self.transactions.contains_key(&id) {
					// confirmed; dependents remain valid and stay behind
					if let Some(transaction) = self.remove_transaction(&id) {
						removed.push(transaction);
					}
				} else {
					self.remove_conflicting_transactions(transaction, &mut removed);
				}
			}

			// unconfirmed file contracts whose start height has passed can
			// no longer be confirmed in time
			let stale: Vec<TransactionId> = self.new_file_contracts
				.get(&self.height)
				.map(|bucket| bucket.values().cloned().collect())
				.unwrap_or_default();
			for id in stale {
				self.purge_transaction(&id, &mut removed);
			}
			self.new_file_contracts.remove(&self.height);

			// storage proofs whose contract has just expired
			let expired: Vec<TransactionId> = self.storage_proofs_by_expiration
				.get(&self.height)
				.map(|bucket| bucket.values().cloned().collect())
				.unwrap_or_default();
			for id in expired {
				self.purge_transaction(&id, &mut removed);
			}
			self.storage_proofs_by_expiration.remove(&self.height);
		}

		(removed, readded)
	}

	fn insert_transaction(&mut self, id: TransactionId, transaction: Transaction, front: bool) {
		for input in &transaction.siacoin_inputs {
			self.used_siacoin_outputs.insert(input.parent_id.clone(), id.clone());
		}
		for (index, output) in transaction.siacoin_outputs.iter().enumerate() {
			self.siacoin_outputs.insert(transaction.siacoin_output_id(index as u64), output.clone());
		}
		for (index, contract) in transaction.file_contracts.iter().enumerate() {
			let contract_id = transaction.file_contract_id(index as u64);
			self.contract_windows.insert(contract_id.clone(), (contract.start, contract.expiration));
			self.file_contracts.insert(contract_id.clone(), id.clone());
			self.new_file_contracts
				.entry(contract.start)
				.or_insert_with(HashMap::new)
				.insert(contract_id, id.clone());
		}
		for proof in &transaction.storage_proofs {
			let (start, expiration) = self.contract_windows.get(&proof.parent_id)
				.cloned()
				.expect("proof admission and chain replay record the contract window; qed");
			self.storage_proofs.insert(proof.parent_id.clone(), id.clone());
			self.storage_proofs_by_start
				.entry(start)
				.or_insert_with(HashMap::new)
				.insert(proof.parent_id.clone(), id.clone());
			self.storage_proofs_by_expiration
				.entry(expiration)
				.or_insert_with(HashMap::new)
				.insert(proof.parent_id.clone(), id.clone());
		}
		for input in &transaction.siafund_inputs {
			self.used_siafund_outputs.insert(input.parent_id.clone(), id.clone());
		}

		if front {
			self.order.push_front(id.clone());
		} else {
			self.order.push_back(id.clone());
		}
		self.transactions.insert(id, transaction);
	}

	/// Removes one transaction and all its indexes, leaving dependents in
	/// place.
	fn remove_transaction(&mut self, id: &TransactionId) -> Option<Transaction> {
		let transaction = self.transactions.remove(id)?;

		for input in &transaction.siacoin_inputs {
			self.used_siacoin_outputs.remove(&input.parent_id);
		}
		for index in 0..transaction.siacoin_outputs.len() {
			self.siacoin_outputs.remove(&transaction.siacoin_output_id(index as u64));
		}
		for (index, contract) in transaction.file_contracts.iter().enumerate() {
			let contract_id = transaction.file_contract_id(index as u64);
			self.file_contracts.remove(&contract_id);
			remove_from_bucket(&mut self.new_file_contracts, contract.start, &contract_id);
		}
		for proof in &transaction.storage_proofs {
			self.storage_proofs.remove(&proof.parent_id);
			if let Some(&(start, expiration)) = self.contract_windows.get(&proof.parent_id) {
				remove_from_bucket(&mut self.storage_proofs_by_start, start, &proof.parent_id);
				remove_from_bucket(&mut self.storage_proofs_by_expiration, expiration, &proof.parent_id);
			}
		}
		for input in &transaction.siafund_inputs {
			self.used_siafund_outputs.remove(&input.parent_id);
		}

		self.order.retain(|known| known != id);
		Some(transaction)
	}

	/// Removes every unconfirmed transaction built on top of the given one,
	/// then the transaction itself.
	fn purge_transaction(&mut self, id: &TransactionId, removed: &mut Vec<Transaction>) {
		let transaction = match self.transactions.get(id) {
			Some(transaction) => transaction.clone(),
			None => return,
		};
		self.remove_dependent_transactions(&transaction, removed);
		if let Some(transaction) = self.remove_transaction(id) {
			removed.push(transaction);
		}
	}

	fn remove_dependent_transactions(&mut self, transaction: &Transaction, removed: &mut Vec<Transaction>) {
		for index in 0..transaction.siacoin_outputs.len() {
			let output_id = transaction.siacoin_output_id(index as u64);
			if let Some(dependent) = self.used_siacoin_outputs.get(&output_id).cloned() {
				self.purge_transaction(&dependent, removed);
			}
		}
		for index in 0..transaction.file_contracts.len() {
			let contract_id = transaction.file_contract_id(index as u64);
			if let Some(dependent) = self.storage_proofs.get(&contract_id).cloned() {
				self.purge_transaction(&dependent, removed);
			}
		}
		for index in 0..transaction.siafund_outputs.len() {
			let output_id = transaction.siafund_output_id(index as u64);
			if let Some(dependent) = self.used_siafund_outputs.get(&output_id).cloned() {
				self.purge_transaction(&dependent, removed);
			}
		}
	}

	/// Removes pool transactions in conflict with a confirmed one.
	fn remove_conflicting_transactions(&mut self, transaction: &Transaction, removed: &mut Vec<Transaction>) {
		for input in &transaction.siacoin_inputs {
			if let Some(conflict) = self.used_siacoin_outputs.get(&input.parent_id).cloned() {
				self.purge_transaction(&conflict, removed);
			}
		}
		for proof in &transaction.storage_proofs {
			if let Some(conflict) = self.storage_proofs.get(&proof.parent_id).cloned() {
				self.purge_transaction(&conflict, removed);
			}
		}
		for input in &transaction.siafund_inputs {
			if let Some(conflict) = self.used_siafund_outputs.get(&input.parent_id).cloned() {
				self.purge_transaction(&conflict, removed);
			}
		}
	}

	fn record_contract_windows(&mut self, transaction: &Transaction) {
		for (index, contract) in transaction.file_contracts.iter().enumerate() {
			self.contract_windows.insert(
				transaction.file_contract_id(index as u64),
				(contract.start, contract.expiration),
			);
		}
	}
}

fn remove_from_bucket(
	buckets: &mut HashMap<BlockHeight, HashMap<FileContractId, TransactionId>>,
	height: BlockHeight,
	id: &FileContractId,
) {
	let now_empty = match buckets.get_mut(&height) {
		Some(bucket) => {
			bucket.remove(id);
			bucket.is_empty()
		},
		None => false,
	};
	if now_empty {
		buckets.remove(&height);
	}
}

fn is_standard(transaction: &Transaction) -> bool {
	if transaction.size() > TRANSACTION_SIZE_LIMIT {
		return false;
	}
	transaction.arbitrary_data.iter()
		.all(|data| data.starts_with(ARBITRARY_DATA_PREFIX))
}
