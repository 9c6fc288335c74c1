//! Stateless-with-respect-to-the-tree block checks and per-transaction
//! legality checks against a state snapshot. Checks run in a fixed order and
//! the first failure is returned.

use std::collections::HashSet;
use chain::constants::{BLOCK_SIZE_LIMIT, FUTURE_THRESHOLD, EXTREME_FUTURE_THRESHOLD};
use chain::{Block, BlockId, BlockHeight, Currency, Transaction, Timestamp, subsidy};
use block_node::BlockNode;
use error::{Error, TransactionError};
use state::State;

/// Validates everything about a candidate block that can be judged from its
/// parent node alone: size, target, timestamp window and miner payouts.
/// Transaction legality is checked when the block joins the canonical chain.
pub fn valid_header(block: &Block, block_id: &BlockId, parent: &BlockNode, now: Timestamp) -> Result<(), Error> {
	if block.size() > BLOCK_SIZE_LIMIT {
		return Err(Error::LargeBlock);
	}

	if !parent.child_target.holds(block_id) {
		return Err(Error::MissedTarget);
	}

	if block.timestamp < parent.earliest_child_timestamp() {
		return Err(Error::EarlyTimestamp);
	}

	if block.timestamp > now + EXTREME_FUTURE_THRESHOLD {
		return Err(Error::ExtremeFutureTimestamp);
	}

	if block.timestamp > now + FUTURE_THRESHOLD {
		return Err(Error::FutureTimestamp);
	}

	valid_miner_payouts(block, parent.height + 1)?;

	Ok(())
}

fn valid_miner_payouts(block: &Block, height: BlockHeight) -> Result<(), Error> {
	if block.miner_payouts.is_empty() {
		return Err(Error::BadMinerPayouts);
	}
	if block.miner_payouts.iter().any(|payout| payout.value == 0) {
		return Err(Error::BadMinerPayouts);
	}

	let paid = checked_sum(block.miner_payouts.iter().map(|payout| payout.value))
		.ok_or(Error::BadMinerPayouts)?;
	let fees = checked_sum(block.transactions.iter().map(Transaction::total_fees))
		.ok_or(Error::BadMinerPayouts)?;
	let earned = fees.checked_add(subsidy(height))
		.ok_or(Error::BadMinerPayouts)?;

	if paid != earned {
		return Err(Error::BadMinerPayouts);
	}

	Ok(())
}

/// Checks one transaction against the given state snapshot. The snapshot is
/// never mutated; intra-block interactions are covered by the caller applying
/// each transaction before validating the next.
pub fn valid_transaction(state: &State, transaction: &Transaction, height: BlockHeight) -> Result<(), TransactionError> {
	valid_siacoin_flow(state, transaction)?;
	valid_file_contracts(transaction, height)?;
	valid_storage_proofs(state, transaction, height)?;
	valid_siafund_flow(state, transaction)?;
	Ok(())
}

fn valid_siacoin_flow(state: &State, transaction: &Transaction) -> Result<(), TransactionError> {
	let mut spent = HashSet::new();
	let mut input_sum: Currency = 0;
	for input in &transaction.siacoin_inputs {
		if !spent.insert(input.parent_id.clone()) {
			return Err(TransactionError::DoubleSpend);
		}
		let output = state.siacoin_output(&input.parent_id)
			.ok_or(TransactionError::MissingSiacoinOutput)?;
		input_sum = input_sum.checked_add(output.value)
			.ok_or(TransactionError::ValueOverflow)?;
	}

	let outputs = checked_sum(transaction.siacoin_outputs.iter().map(|output| output.value))
		.ok_or(TransactionError::ValueOverflow)?;
	let payouts = checked_sum(transaction.file_contracts.iter().map(|contract| contract.payout))
		.ok_or(TransactionError::ValueOverflow)?;
	let fees = checked_sum(transaction.miner_fees.iter().cloned())
		.ok_or(TransactionError::ValueOverflow)?;

	let output_sum = outputs.checked_add(payouts)
		.and_then(|sum| sum.checked_add(fees))
		.ok_or(TransactionError::ValueOverflow)?;

	if input_sum != output_sum {
		return Err(TransactionError::SiacoinInputOutputMismatch);
	}

	Ok(())
}

fn valid_file_contracts(transaction: &Transaction, height: BlockHeight) -> Result<(), TransactionError> {
	for contract in &transaction.file_contracts {
		if contract.payout == 0 {
			return Err(TransactionError::InvalidFileContract);
		}
		if contract.start <= height {
			return Err(TransactionError::InvalidFileContract);
		}
		if contract.expiration <= contract.start {
			return Err(TransactionError::InvalidFileContract);
		}
	}
	Ok(())
}

fn valid_storage_proofs(state: &State, transaction: &Transaction, height: BlockHeight) -> Result<(), TransactionError> {
	let mut proven = HashSet::new();
	for proof in &transaction.storage_proofs {
		if !proven.insert(proof.parent_id.clone()) {
			return Err(TransactionError::DuplicateStorageProof);
		}
		let contract = state.file_contract(&proof.parent_id)
			.ok_or(TransactionError::MissingFileContract)?;
		if height < contract.start {
			return Err(TransactionError::EarlyStorageProof);
		}
	}
	Ok(())
}

fn valid_siafund_flow(state: &State, transaction: &Transaction) -> Result<(), TransactionError> {
	let mut spent = HashSet::new();
	let mut input_sum: Currency = 0;
	for input in &transaction.siafund_inputs {
		if !spent.insert(input.parent_id.clone()) {
			return Err(TransactionError::DoubleSpend);
		}
		let output = state.siafund_output(&input.parent_id)
			.ok_or(TransactionError::MissingSiafundOutput)?;
		input_sum = input_sum.checked_add(output.value)
			.ok_or(TransactionError::ValueOverflow)?;
	}

	let output_sum = checked_sum(transaction.siafund_outputs.iter().map(|output| output.value))
		.ok_or(TransactionError::ValueOverflow)?;

	if input_sum != output_sum {
		return Err(TransactionError::SiafundInputOutputMismatch);
	}

	if transaction.siafund_outputs.iter().any(|output| output.claim_start != 0) {
		return Err(TransactionError::NonZeroClaimStart);
	}

	Ok(())
}

fn checked_sum<I>(values: I) -> Option<Currency> where I: Iterator<Item = Currency> {
	let mut sum: Currency = 0;
	for value in values {
		sum = sum.checked_add(value)?;
	}
	Some(sum)
}
