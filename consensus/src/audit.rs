//! Consistency auditing over the consensus state.

use primitives::hash::H256;
use ser::Stream;
use crypto::sha256;
use state::State;

/// Tag carried by the abort raised when the consensus state disagrees with
/// the diff history. This signals a programmer error, never a bad block.
pub const SIACOIN_MISCOUNT: &'static str = "SiacoinMiscount";

/// Hash over the canonical serialization of the consensus state at the
/// current tip. Deterministic over equivalent states regardless of the path
/// taken to reach them.
pub fn consensus_set_hash(state: &State) -> H256 {
	let mut stream = Stream::new();

	stream.append(&(state.current_path.len() as u64));
	for id in &state.current_path {
		stream.append(id);
	}

	let mut siacoin_ids: Vec<_> = state.siacoin_outputs.keys().cloned().collect();
	siacoin_ids.sort();
	stream.append(&(siacoin_ids.len() as u64));
	for id in &siacoin_ids {
		stream.append(id);
		stream.append(&state.siacoin_outputs[id]);
	}

	let mut siafund_ids: Vec<_> = state.siafund_outputs.keys().cloned().collect();
	siafund_ids.sort();
	stream.append(&(siafund_ids.len() as u64));
	for id in &siafund_ids {
		stream.append(id);
		stream.append(&state.siafund_outputs[id]);
	}

	let mut contract_ids: Vec<_> = state.file_contracts.keys().cloned().collect();
	contract_ids.sort();
	stream.append(&(contract_ids.len() as u64));
	for id in &contract_ids {
		stream.append(id);
		stream.append(&state.file_contracts[id]);
	}

	stream.append(&(state.delayed_siacoin_outputs.len() as u64));
	for (maturity, bucket) in &state.delayed_siacoin_outputs {
		stream.append(maturity);
		stream.append(&(bucket.len() as u64));
		for (id, output) in bucket {
			stream.append(id);
			stream.append(output);
		}
	}

	stream.append(&state.siafund_pool);

	sha256(&stream.out())
}
