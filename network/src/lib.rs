extern crate chain;
extern crate primitives;
extern crate serialization as ser;
extern crate siacrypto as crypto;

mod consensus;
mod network;

pub use consensus::ConsensusParams;
pub use network::Network;
