use chain::{
	Block, BlockId, BlockHeight, Currency, Timestamp, Transaction,
	SiacoinInput, SiacoinOutput, SiacoinOutputId, SiafundInput, SiafundOutput,
	SiafundOutputId, FileContract, FileContractId, StorageProof, UnlockHash,
};

/// Chainable transaction builder.
#[derive(Default)]
pub struct TransactionBuilder {
	transaction: Transaction,
}

impl TransactionBuilder {
	pub fn new() -> Self {
		TransactionBuilder::default()
	}

	pub fn siacoin_input(mut self, parent_id: SiacoinOutputId) -> Self {
		self.transaction.siacoin_inputs.push(SiacoinInput { parent_id: parent_id });
		self
	}

	pub fn siacoin_output(mut self, value: Currency, unlock_hash: UnlockHash) -> Self {
		self.transaction.siacoin_outputs.push(SiacoinOutput {
			value: value,
			unlock_hash: unlock_hash,
		});
		self
	}

	pub fn file_contract(mut self, start: BlockHeight, expiration: BlockHeight, payout: Currency) -> Self {
		self.transaction.file_contracts.push(FileContract {
			file_size: 0,
			file_merkle_root: Default::default(),
			start: start,
			expiration: expiration,
			payout: payout,
			valid_proof_unlock_hash: 0xaau8.into(),
			missed_proof_unlock_hash: 0xbbu8.into(),
		});
		self
	}

	pub fn storage_proof(mut self, parent_id: FileContractId) -> Self {
		self.transaction.storage_proofs.push(StorageProof { parent_id: parent_id });
		self
	}

	pub fn siafund_input(mut self, parent_id: SiafundOutputId) -> Self {
		self.transaction.siafund_inputs.push(SiafundInput { parent_id: parent_id });
		self
	}

	pub fn siafund_output(mut self, value: Currency, unlock_hash: UnlockHash) -> Self {
		self.transaction.siafund_outputs.push(SiafundOutput {
			value: value,
			unlock_hash: unlock_hash,
			claim_start: 0,
		});
		self
	}

	pub fn miner_fee(mut self, value: Currency) -> Self {
		self.transaction.miner_fees.push(value);
		self
	}

	pub fn arbitrary_data(mut self, data: Vec<u8>) -> Self {
		self.transaction.arbitrary_data.push(data.into());
		self
	}

	pub fn build(self) -> Transaction {
		self.transaction
	}
}

/// Chainable block builder.
#[derive(Default)]
pub struct BlockBuilder {
	block: Block,
}

impl BlockBuilder {
	pub fn new() -> Self {
		BlockBuilder::default()
	}

	pub fn parent(mut self, parent_id: BlockId) -> Self {
		self.block.parent_id = parent_id;
		self
	}

	pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
		self.block.timestamp = timestamp;
		self
	}

	pub fn nonce(mut self, nonce: u64) -> Self {
		self.block.nonce = nonce;
		self
	}

	pub fn miner_payout(mut self, value: Currency, unlock_hash: UnlockHash) -> Self {
		self.block.miner_payouts.push(SiacoinOutput {
			value: value,
			unlock_hash: unlock_hash,
		});
		self
	}

	pub fn transaction(mut self, transaction: Transaction) -> Self {
		self.block.transactions.push(transaction);
		self
	}

	pub fn build(self) -> Block {
		self.block
	}
}
