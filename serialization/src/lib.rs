extern crate byteorder;
extern crate primitives;

mod impls;
mod reader;
mod stream;

pub use primitives::{hash, bytes};

pub use reader::{Reader, Deserializable, deserialize, Error};
pub use stream::{Stream, Serializable, serialize, serialized_size};
