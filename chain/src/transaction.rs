//! Chain transactions.
//!
//! A transaction spends siacoin and siafund outputs and may create new
//! outputs, open file contracts, or settle them with storage proofs. Child
//! object identifiers are derived from the transaction id and a specifier,
//! so they are stable across chains containing the same transaction.

use bytes::Bytes;
use hash::H256;
use ser::{
	Serializable, Deserializable, Stream, Reader, Error as ReaderError,
	serialized_size,
};
use crypto::{sha256, hash_object};
use constants::SIAFUND_FEE_DIVISOR;
use {Currency, BlockHeight, TransactionId, SiacoinOutputId, SiafundOutputId,
	FileContractId, UnlockHash};

const SPECIFIER_SIACOIN_OUTPUT: &'static [u8] = b"siacoin output";
const SPECIFIER_SIAFUND_OUTPUT: &'static [u8] = b"siafund output";
const SPECIFIER_FILE_CONTRACT: &'static [u8] = b"file contract";
const SPECIFIER_SIAFUND_CLAIM: &'static [u8] = b"siafund claim";
const SPECIFIER_STORAGE_PROOF_VALID: &'static [u8] = b"storage proof valid";
const SPECIFIER_STORAGE_PROOF_MISSED: &'static [u8] = b"storage proof missed";

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SiacoinInput {
	pub parent_id: SiacoinOutputId,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SiacoinOutput {
	pub value: Currency,
	pub unlock_hash: UnlockHash,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SiafundInput {
	pub parent_id: SiafundOutputId,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SiafundOutput {
	pub value: Currency,
	pub unlock_hash: UnlockHash,
	/// Size of the siafund pool when this output was created. The accrued
	/// claim of a spend is measured against it.
	pub claim_start: Currency,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct FileContract {
	pub file_size: u64,
	pub file_merkle_root: H256,
	pub start: BlockHeight,
	pub expiration: BlockHeight,
	pub payout: Currency,
	pub valid_proof_unlock_hash: UnlockHash,
	pub missed_proof_unlock_hash: UnlockHash,
}

impl FileContract {
	/// Portion of the payout accrued to the siafund pool when the contract
	/// is opened.
	pub fn fee(&self) -> Currency {
		self.payout / SIAFUND_FEE_DIVISOR
	}

	/// Payout actually delivered to the valid or missed proof address.
	pub fn net_payout(&self) -> Currency {
		self.payout - self.fee()
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct StorageProof {
	pub parent_id: FileContractId,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Transaction {
	pub siacoin_inputs: Vec<SiacoinInput>,
	pub siacoin_outputs: Vec<SiacoinOutput>,
	pub file_contracts: Vec<FileContract>,
	pub storage_proofs: Vec<StorageProof>,
	pub siafund_inputs: Vec<SiafundInput>,
	pub siafund_outputs: Vec<SiafundOutput>,
	pub miner_fees: Vec<Currency>,
	pub arbitrary_data: Vec<Bytes>,
}

impl Transaction {
	pub fn hash(&self) -> TransactionId {
		hash_object(self)
	}

	pub fn siacoin_output_id(&self, index: u64) -> SiacoinOutputId {
		derive_id(&self.hash(), SPECIFIER_SIACOIN_OUTPUT, index)
	}

	pub fn siafund_output_id(&self, index: u64) -> SiafundOutputId {
		derive_id(&self.hash(), SPECIFIER_SIAFUND_OUTPUT, index)
	}

	pub fn file_contract_id(&self, index: u64) -> FileContractId {
		derive_id(&self.hash(), SPECIFIER_FILE_CONTRACT, index)
	}

	pub fn total_fees(&self) -> Currency {
		self.miner_fees.iter().sum()
	}

	pub fn size(&self) -> usize {
		serialized_size(self)
	}
}

/// Id of the delayed siacoin output created when a siafund output is spent.
pub fn siafund_claim_id(siafund_output_id: &SiafundOutputId) -> SiacoinOutputId {
	derive_id(siafund_output_id, SPECIFIER_SIAFUND_CLAIM, 0)
}

/// Id of the delayed siacoin output paying out a settled file contract.
pub fn storage_proof_output_id(file_contract_id: &FileContractId, valid: bool) -> SiacoinOutputId {
	let specifier = if valid {
		SPECIFIER_STORAGE_PROOF_VALID
	} else {
		SPECIFIER_STORAGE_PROOF_MISSED
	};
	derive_id(file_contract_id, specifier, 0)
}

fn derive_id(parent: &H256, specifier: &[u8], index: u64) -> H256 {
	let mut stream = Stream::new();
	stream.append(parent)
		.append_slice(specifier)
		.append(&index);
	sha256(&stream.out())
}

impl Serializable for SiacoinInput {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&self.parent_id);
	}
}

impl Deserializable for SiacoinInput {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(SiacoinInput {
			parent_id: reader.read()?,
		})
	}
}

impl Serializable for SiacoinOutput {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&self.value)
			.append(&self.unlock_hash);
	}
}

impl Deserializable for SiacoinOutput {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(SiacoinOutput {
			value: reader.read()?,
			unlock_hash: reader.read()?,
		})
	}
}

impl Serializable for SiafundInput {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&self.parent_id);
	}
}

impl Deserializable for SiafundInput {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(SiafundInput {
			parent_id: reader.read()?,
		})
	}
}

impl Serializable for SiafundOutput {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&self.value)
			.append(&self.unlock_hash)
			.append(&self.claim_start);
	}
}

impl Deserializable for SiafundOutput {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(SiafundOutput {
			value: reader.read()?,
			unlock_hash: reader.read()?,
			claim_start: reader.read()?,
		})
	}
}

impl Serializable for FileContract {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&self.file_size)
			.append(&self.file_merkle_root)
			.append(&self.start)
			.append(&self.expiration)
			.append(&self.payout)
			.append(&self.valid_proof_unlock_hash)
			.append(&self.missed_proof_unlock_hash);
	}
}

impl Deserializable for FileContract {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(FileContract {
			file_size: reader.read()?,
			file_merkle_root: reader.read()?,
			start: reader.read()?,
			expiration: reader.read()?,
			payout: reader.read()?,
			valid_proof_unlock_hash: reader.read()?,
			missed_proof_unlock_hash: reader.read()?,
		})
	}
}

impl Serializable for StorageProof {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&self.parent_id);
	}
}

impl Deserializable for StorageProof {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(StorageProof {
			parent_id: reader.read()?,
		})
	}
}

impl Serializable for Transaction {
	fn serialize(&self, stream: &mut Stream) {
		stream.append_list(&self.siacoin_inputs)
			.append_list(&self.siacoin_outputs)
			.append_list(&self.file_contracts)
			.append_list(&self.storage_proofs)
			.append_list(&self.siafund_inputs)
			.append_list(&self.siafund_outputs)
			.append_list(&self.miner_fees)
			.append_list(&self.arbitrary_data);
	}
}

impl Deserializable for Transaction {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(Transaction {
			siacoin_inputs: reader.read_list()?,
			siacoin_outputs: reader.read_list()?,
			file_contracts: reader.read_list()?,
			storage_proofs: reader.read_list()?,
			siafund_inputs: reader.read_list()?,
			siafund_outputs: reader.read_list()?,
			miner_fees: reader.read_list()?,
			arbitrary_data: reader.read_list()?,
		})
	}
}
