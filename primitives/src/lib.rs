extern crate rustc_hex;

pub mod bytes;
pub mod hash;
pub mod uint;
