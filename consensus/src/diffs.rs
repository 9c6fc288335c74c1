//! Reversible deltas describing one block's effect on the consensus state.
//!
//! Every primitive carries a direction. Committing a block diff in the apply
//! direction replays its entries in order; committing in the revert direction
//! replays them backwards with the meaning of each entry flipped, which
//! exactly undoes the block.

use chain::constants::{MATURITY_DELAY, SIAFUND_COUNT};
use chain::{
	Block, BlockId, BlockHeight, Currency, Transaction,
	SiacoinOutput, SiacoinOutputId, SiafundOutput, SiafundOutputId,
	FileContract, FileContractId,
	miner_payout_id, siafund_claim_id, storage_proof_output_id,
};
use error::{Error, TransactionError};
use state::State;
use validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffDirection {
	Apply,
	Revert,
}

#[derive(Debug, Clone)]
pub struct SiacoinOutputDiff {
	pub direction: DiffDirection,
	pub id: SiacoinOutputId,
	pub output: SiacoinOutput,
}

#[derive(Debug, Clone)]
pub struct SiafundOutputDiff {
	pub direction: DiffDirection,
	pub id: SiafundOutputId,
	pub output: SiafundOutput,
}

#[derive(Debug, Clone)]
pub struct FileContractDiff {
	pub direction: DiffDirection,
	pub id: FileContractId,
	pub contract: FileContract,
}

#[derive(Debug, Clone)]
pub struct DelayedOutputDiff {
	pub direction: DiffDirection,
	pub maturity: BlockHeight,
	pub id: SiacoinOutputId,
	pub output: SiacoinOutput,
}

/// Scalar delta of the siafund pool. `previous` must match the pool the diff
/// is committed against; the consistency auditor folds these along the
/// current path.
#[derive(Debug, Clone, PartialEq)]
pub struct SiafundPoolDiff {
	pub previous: Currency,
	pub adjusted: Currency,
}

#[derive(Debug, Clone)]
pub enum DiffEntry {
	Siacoin(SiacoinOutputDiff),
	Siafund(SiafundOutputDiff),
	FileContract(FileContractDiff),
	Delayed(DelayedOutputDiff),
}

/// All diffs generated by one block, cached on its tree node after the first
/// application.
#[derive(Debug, Clone)]
pub struct BlockDiffs {
	entries: Vec<DiffEntry>,
	siafund_pool: SiafundPoolDiff,
}

impl BlockDiffs {
	pub fn siafund_pool_diff(&self) -> &SiafundPoolDiff {
		&self.siafund_pool
	}

	/// Replays the diff onto the state in the given direction.
	pub fn commit(&self, state: &mut State, direction: DiffDirection) {
		match direction {
			DiffDirection::Apply => {
				for entry in &self.entries {
					commit_entry(state, entry, direction);
				}
				state.siafund_pool = self.siafund_pool.adjusted;
			},
			DiffDirection::Revert => {
				for entry in self.entries.iter().rev() {
					commit_entry(state, entry, direction);
				}
				state.siafund_pool = self.siafund_pool.previous;
			},
		}
	}
}

fn commit_entry(state: &mut State, entry: &DiffEntry, direction: DiffDirection) {
	match *entry {
		DiffEntry::Siacoin(ref diff) => {
			if diff.direction == direction {
				state.siacoin_outputs.insert(diff.id.clone(), diff.output.clone());
			} else {
				state.siacoin_outputs.remove(&diff.id)
					.expect("diff is committed against the state it was generated from; qed");
			}
		},
		DiffEntry::Siafund(ref diff) => {
			if diff.direction == direction {
				state.siafund_outputs.insert(diff.id.clone(), diff.output.clone());
			} else {
				state.siafund_outputs.remove(&diff.id)
					.expect("diff is committed against the state it was generated from; qed");
			}
		},
		DiffEntry::FileContract(ref diff) => {
			if diff.direction == direction {
				state.file_contracts.insert(diff.id.clone(), diff.contract.clone());
			} else {
				state.file_contracts.remove(&diff.id)
					.expect("diff is committed against the state it was generated from; qed");
			}
		},
		DiffEntry::Delayed(ref diff) => {
			if diff.direction == direction {
				state.add_delayed_siacoin_output(diff.maturity, diff.id.clone(), diff.output.clone());
			} else {
				state.remove_delayed_siacoin_output(diff.maturity, &diff.id)
					.expect("diff is committed against the state it was generated from; qed");
			}
		},
	}
}

/// Validates the block's transactions against the live state and applies
/// them, recording every state change. On a transaction failure the partial
/// application is undone and the state is left untouched.
pub fn generate_and_apply(state: &mut State, block: &Block, block_id: &BlockId, height: BlockHeight) -> Result<BlockDiffs, Error> {
	let pool_previous = state.siafund_pool;
	let mut generator = Generator {
		state: state,
		entries: Vec::new(),
		pool_previous: pool_previous,
	};

	for (index, transaction) in block.transactions.iter().enumerate() {
		if let Err(err) = generator.transaction(transaction, height) {
			generator.rollback();
			return Err(Error::Transaction(index, err));
		}
	}
	generator.expirations(height);
	generator.miner_payouts(block, block_id, height);
	generator.maturation(height);

	let pool_adjusted = generator.state.siafund_pool;
	Ok(BlockDiffs {
		entries: generator.entries,
		siafund_pool: SiafundPoolDiff {
			previous: generator.pool_previous,
			adjusted: pool_adjusted,
		},
	})
}

struct Generator<'a> {
	state: &'a mut State,
	entries: Vec<DiffEntry>,
	pool_previous: Currency,
}

impl<'a> Generator<'a> {
	fn record(&mut self, entry: DiffEntry) {
		commit_entry(self.state, &entry, DiffDirection::Apply);
		self.entries.push(entry);
	}

	fn rollback(&mut self) {
		let entries = ::std::mem::replace(&mut self.entries, Vec::new());
		for entry in entries.iter().rev() {
			commit_entry(self.state, entry, DiffDirection::Revert);
		}
		self.state.siafund_pool = self.pool_previous;
	}

	fn transaction(&mut self, transaction: &Transaction, height: BlockHeight) -> Result<(), TransactionError> {
		validation::valid_transaction(self.state, transaction, height)?;

		for input in &transaction.siacoin_inputs {
			let output = self.state.siacoin_output(&input.parent_id)
				.expect("the transaction was validated against this state; qed")
				.clone();
			self.record(DiffEntry::Siacoin(SiacoinOutputDiff {
				direction: DiffDirection::Revert,
				id: input.parent_id.clone(),
				output: output,
			}));
		}

		for (index, output) in transaction.siacoin_outputs.iter().enumerate() {
			self.record(DiffEntry::Siacoin(SiacoinOutputDiff {
				direction: DiffDirection::Apply,
				id: transaction.siacoin_output_id(index as u64),
				output: output.clone(),
			}));
		}

		for (index, contract) in transaction.file_contracts.iter().enumerate() {
			self.record(DiffEntry::FileContract(FileContractDiff {
				direction: DiffDirection::Apply,
				id: transaction.file_contract_id(index as u64),
				contract: contract.clone(),
			}));
			self.state.siafund_pool += contract.fee();
		}

		for proof in &transaction.storage_proofs {
			let contract = self.state.file_contract(&proof.parent_id)
				.expect("the transaction was validated against this state; qed")
				.clone();
			self.record(DiffEntry::FileContract(FileContractDiff {
				direction: DiffDirection::Revert,
				id: proof.parent_id.clone(),
				contract: contract.clone(),
			}));
			self.record(DiffEntry::Delayed(DelayedOutputDiff {
				direction: DiffDirection::Apply,
				maturity: height + MATURITY_DELAY,
				id: storage_proof_output_id(&proof.parent_id, true),
				output: SiacoinOutput {
					value: contract.net_payout(),
					unlock_hash: contract.valid_proof_unlock_hash.clone(),
				},
			}));
		}

		for input in &transaction.siafund_inputs {
			let output = self.state.siafund_output(&input.parent_id)
				.expect("the transaction was validated against this state; qed")
				.clone();
			let claim = siafund_claim(self.state.siafund_pool, &output);
			self.record(DiffEntry::Siafund(SiafundOutputDiff {
				direction: DiffDirection::Revert,
				id: input.parent_id.clone(),
				output: output.clone(),
			}));
			if claim > 0 {
				self.record(DiffEntry::Delayed(DelayedOutputDiff {
					direction: DiffDirection::Apply,
					maturity: height + MATURITY_DELAY,
					id: siafund_claim_id(&input.parent_id),
					output: SiacoinOutput {
						value: claim,
						unlock_hash: output.unlock_hash.clone(),
					},
				}));
			}
		}

		for (index, output) in transaction.siafund_outputs.iter().enumerate() {
			let mut output = output.clone();
			output.claim_start = self.state.siafund_pool;
			self.record(DiffEntry::Siafund(SiafundOutputDiff {
				direction: DiffDirection::Apply,
				id: transaction.siafund_output_id(index as u64),
				output: output,
			}));
		}

		Ok(())
	}

	/// Contracts whose proof window closes at this height pay out to the
	/// missed proof address.
	fn expirations(&mut self, height: BlockHeight) {
		for (id, contract) in self.state.expired_contracts(height) {
			self.record(DiffEntry::FileContract(FileContractDiff {
				direction: DiffDirection::Revert,
				id: id.clone(),
				contract: contract.clone(),
			}));
			self.record(DiffEntry::Delayed(DelayedOutputDiff {
				direction: DiffDirection::Apply,
				maturity: height + MATURITY_DELAY,
				id: storage_proof_output_id(&id, false),
				output: SiacoinOutput {
					value: contract.net_payout(),
					unlock_hash: contract.missed_proof_unlock_hash.clone(),
				},
			}));
		}
	}

	fn miner_payouts(&mut self, block: &Block, block_id: &BlockId, height: BlockHeight) {
		for (index, payout) in block.miner_payouts.iter().enumerate() {
			self.record(DiffEntry::Delayed(DelayedOutputDiff {
				direction: DiffDirection::Apply,
				maturity: height + MATURITY_DELAY,
				id: miner_payout_id(block_id, index as u64),
				output: payout.clone(),
			}));
		}
	}

	/// Delayed outputs whose maturity height equals this block's height move
	/// to the live set.
	fn maturation(&mut self, height: BlockHeight) {
		for (id, output) in self.state.matured_outputs(height) {
			self.record(DiffEntry::Delayed(DelayedOutputDiff {
				direction: DiffDirection::Revert,
				maturity: height,
				id: id.clone(),
				output: output.clone(),
			}));
			self.record(DiffEntry::Siacoin(SiacoinOutputDiff {
				direction: DiffDirection::Apply,
				id: id,
				output: output,
			}));
		}
	}
}

fn siafund_claim(pool: Currency, output: &SiafundOutput) -> Currency {
	let accrued = pool - output.claim_start;
	(accrued as u128 * output.value as u128 / SIAFUND_COUNT as u128) as Currency
}

#[cfg(test)]
mod tests {
	use test_data::TransactionBuilder;
	use chain::constants::{MATURITY_DELAY, SIAFUND_COUNT, SIAFUND_FEE_DIVISOR};
	use chain::{subsidy, siafund_claim_id, storage_proof_output_id};
	use tester::ConsensusSetTester;

	#[test]
	fn test_miner_payout_matures() {
		let cst = ConsensusSetTester::new();
		let block = cst.mine_and_apply();
		let payout_id = block.miner_payout_id(0);

		// the payout is delayed, not live
		assert!(cst.cs.siacoin_output(&payout_id).is_none());

		for _ in 0..MATURITY_DELAY - 1 {
			cst.mine_and_apply();
		}
		assert!(cst.cs.siacoin_output(&payout_id).is_none());

		// the block at height 1 + MATURITY_DELAY moves it into the live set
		cst.mine_and_apply();
		let payout = cst.cs.siacoin_output(&payout_id).unwrap();
		assert_eq!(payout.value, subsidy(1));
	}

	#[test]
	fn test_contract_lifecycle() {
		let cst = ConsensusSetTester::new();
		let (funding0_id, funding0) = cst.genesis_funding();
		let (funding1_id, funding1) = cst.params.genesis_siacoin_allocation[1].clone();

		// two contracts: one will be proven, the other left to expire
		let open_proven = TransactionBuilder::new()
			.siacoin_input(funding0_id)
			.file_contract(2, 10, funding0.value)
			.build();
		let open_expiring = TransactionBuilder::new()
			.siacoin_input(funding1_id)
			.file_contract(2, 4, funding1.value)
			.build();
		let proven_id = open_proven.file_contract_id(0);
		let expiring_id = open_expiring.file_contract_id(0);

		let block = cst.find_block(vec![open_proven, open_expiring]);
		cst.cs.accept_block(block).unwrap();

		assert!(cst.cs.file_contract(&proven_id).is_some());
		let expected_pool = funding0.value / SIAFUND_FEE_DIVISOR
			+ funding1.value / SIAFUND_FEE_DIVISOR;
		assert_eq!(cst.cs.siafund_pool(), expected_pool);

		// height 2: window opens
		cst.mine_and_apply();

		// height 3: the proof settles the first contract
		let proof = TransactionBuilder::new()
			.storage_proof(proven_id.clone())
			.build();
		let block = cst.find_block(vec![proof]);
		cst.cs.accept_block(block).unwrap();
		assert!(cst.cs.file_contract(&proven_id).is_none());

		// height 4: the second contract expires on its own
		cst.mine_and_apply();
		assert!(cst.cs.file_contract(&expiring_id).is_none());

		// both payouts mature with the fee already deducted
		let valid_id = storage_proof_output_id(&proven_id, true);
		let missed_id = storage_proof_output_id(&expiring_id, false);
		while cst.cs.height() < 4 + MATURITY_DELAY {
			cst.mine_and_apply();
		}
		let valid = cst.cs.siacoin_output(&valid_id).unwrap();
		let missed = cst.cs.siacoin_output(&missed_id).unwrap();
		assert_eq!(valid.value, funding0.value - funding0.value / SIAFUND_FEE_DIVISOR);
		assert_eq!(missed.value, funding1.value - funding1.value / SIAFUND_FEE_DIVISOR);
	}

	#[test]
	fn test_siafund_spend_accrues_claim() {
		let cst = ConsensusSetTester::new();
		let (funding_id, funding) = cst.genesis_funding();
		let (siafund_id, siafund) = cst.params.genesis_siafund_allocation[0].clone();

		// fill the pool with a contract fee
		let open = TransactionBuilder::new()
			.siacoin_input(funding_id)
			.file_contract(5, 10, funding.value)
			.build();
		let block = cst.find_block(vec![open]);
		cst.cs.accept_block(block).unwrap();
		let pool = cst.cs.siafund_pool();
		assert!(pool > 0);

		// spend the siafund output; its claim is proportional to its share
		let spend = TransactionBuilder::new()
			.siafund_input(siafund_id.clone())
			.siafund_output(siafund.value, 0x77u8.into())
			.build();
		let new_siafund_id = spend.siafund_output_id(0);
		let spend_height = cst.cs.height() + 1;
		let block = cst.find_block(vec![spend]);
		cst.cs.accept_block(block).unwrap();

		assert!(cst.cs.siafund_output(&siafund_id).is_none());
		let moved = cst.cs.siafund_output(&new_siafund_id).unwrap();
		assert_eq!(moved.claim_start, pool);

		// the claim matures like any delayed output
		let claim_id = siafund_claim_id(&siafund_id);
		while cst.cs.height() < spend_height + MATURITY_DELAY {
			cst.mine_and_apply();
		}
		let claim = cst.cs.siacoin_output(&claim_id).unwrap();
		assert_eq!(claim.value, pool * siafund.value / SIAFUND_COUNT);
	}
}
