use std::fmt;

/// All possible block rejection reasons.
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
	/// Block was previously rejected and cached as a DoS block.
	DoSBlock,
	/// Block is already present in the block tree.
	BlockKnown,
	/// Parent of the block is not known.
	Orphan,
	/// Serialized block exceeds the block size limit.
	LargeBlock,
	/// Block id does not satisfy the target set by its parent.
	MissedTarget,
	/// Timestamp is earlier than the median of the ancestor window.
	EarlyTimestamp,
	/// Timestamp is ahead of the wall clock; the block has been deferred.
	FutureTimestamp,
	/// Timestamp is too far ahead of the wall clock; the block is discarded.
	ExtremeFutureTimestamp,
	/// Miner payouts do not match subsidy plus fees.
	BadMinerPayouts,
	/// Block does not make its chain the heaviest.
	NonExtendingBlock,
	/// One of the transactions is invalid (index and specific error).
	Transaction(usize, TransactionError),
}

/// Possible transaction rejection reasons.
#[derive(Debug, PartialEq, Clone)]
pub enum TransactionError {
	/// Referenced siacoin output is not in the live set.
	MissingSiacoinOutput,
	/// An output is spent twice.
	DoubleSpend,
	/// Sum of siacoin inputs does not equal outputs + contract payouts + fees.
	SiacoinInputOutputMismatch,
	/// File contract window is malformed or already open.
	InvalidFileContract,
	/// Storage proof references an unknown or expired file contract.
	MissingFileContract,
	/// Storage proof submitted before the contract window opened.
	EarlyStorageProof,
	/// Two proofs for the same contract in one transaction.
	DuplicateStorageProof,
	/// Referenced siafund output is not in the live set.
	MissingSiafundOutput,
	/// Sum of siafund inputs does not equal sum of siafund outputs.
	SiafundInputOutputMismatch,
	/// Created siafund outputs must leave the claim start to consensus.
	NonZeroClaimStart,
	/// A currency sum does not fit the currency type.
	ValueOverflow,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::DoSBlock => write!(f, "DoSBlock"),
			Error::BlockKnown => write!(f, "BlockKnown"),
			Error::Orphan => write!(f, "Orphan"),
			Error::LargeBlock => write!(f, "LargeBlock"),
			Error::MissedTarget => write!(f, "MissedTarget"),
			Error::EarlyTimestamp => write!(f, "EarlyTimestamp"),
			Error::FutureTimestamp => write!(f, "FutureTimestamp"),
			Error::ExtremeFutureTimestamp => write!(f, "ExtremeFutureTimestamp"),
			Error::BadMinerPayouts => write!(f, "BadMinerPayouts"),
			Error::NonExtendingBlock => write!(f, "NonExtendingBlock"),
			Error::Transaction(_, ref err) => write!(f, "{}", err),
		}
	}
}

impl fmt::Display for TransactionError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let tag = match *self {
			TransactionError::MissingSiacoinOutput => "MissingSiacoinOutput",
			TransactionError::DoubleSpend => "DoubleSpend",
			TransactionError::SiacoinInputOutputMismatch => "SiacoinInputOutputMismatch",
			TransactionError::InvalidFileContract => "InvalidFileContract",
			TransactionError::MissingFileContract => "MissingFileContract",
			TransactionError::EarlyStorageProof => "EarlyStorageProof",
			TransactionError::DuplicateStorageProof => "DuplicateStorageProof",
			TransactionError::MissingSiafundOutput => "MissingSiafundOutput",
			TransactionError::SiafundInputOutputMismatch => "SiafundInputOutputMismatch",
			TransactionError::NonZeroClaimStart => "NonZeroClaimStart",
			TransactionError::ValueOverflow => "ValueOverflow",
		};
		f.write_str(tag)
	}
}
