use std::fmt;
use ser::{
	Serializable, Deserializable, Stream, Reader, Error as ReaderError,
	serialized_size,
};
use crypto::hash_object;
use transaction::{Transaction, SiacoinOutput};
use target::Target;
use {BlockId, SiacoinOutputId, Currency, Timestamp};

const SPECIFIER_MINER_PAYOUT: &'static [u8] = b"miner payout";

/// A block. Identified by the hash of its canonical serialization.
#[derive(PartialEq, Eq, Clone, Default)]
pub struct Block {
	pub parent_id: BlockId,
	pub nonce: u64,
	pub timestamp: Timestamp,
	pub miner_payouts: Vec<SiacoinOutput>,
	pub transactions: Vec<Transaction>,
}

impl Block {
	pub fn id(&self) -> BlockId {
		hash_object(self)
	}

	/// Id of the delayed siacoin output created by the miner payout at `index`.
	pub fn miner_payout_id(&self, index: u64) -> SiacoinOutputId {
		miner_payout_id(&self.id(), index)
	}

	/// Returns true if the block id satisfies the given target.
	pub fn check_target(&self, target: &Target) -> bool {
		target.holds(&self.id())
	}

	pub fn size(&self) -> usize {
		serialized_size(self)
	}

	pub fn total_payout(&self) -> Currency {
		self.miner_payouts.iter().map(|payout| payout.value).sum()
	}

	/// Fees carried by all transactions in the block.
	pub fn total_fees(&self) -> Currency {
		self.transactions.iter().map(Transaction::total_fees).sum()
	}
}

/// Id of the delayed siacoin output created by a miner payout.
pub fn miner_payout_id(block_id: &BlockId, index: u64) -> SiacoinOutputId {
	use crypto::sha256;

	let mut stream = Stream::new();
	stream.append(block_id)
		.append_slice(SPECIFIER_MINER_PAYOUT)
		.append(&index);
	sha256(&stream.out())
}

impl fmt::Debug for Block {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Block")
			.field("id", &self.id())
			.field("parent_id", &self.parent_id)
			.field("timestamp", &self.timestamp)
			.field("transactions", &self.transactions.len())
			.finish()
	}
}

impl Serializable for Block {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&self.parent_id)
			.append(&self.nonce)
			.append(&self.timestamp)
			.append_list(&self.miner_payouts)
			.append_list(&self.transactions);
	}
}

impl Deserializable for Block {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(Block {
			parent_id: reader.read()?,
			nonce: reader.read()?,
			timestamp: reader.read()?,
			miner_payouts: reader.read_list()?,
			transactions: reader.read_list()?,
		})
	}
}
