//! Anchor SPV Client Library
//!
//! Fetches Bitcoin transaction inclusion proofs from a node, validates them
//! offline and wraps them into contract calls for the sidechain.

pub mod call;
pub mod fetch;
pub mod format;
pub mod header;
pub mod verify;

pub use fetch::{fetch_proof, load_proof, save_proof};
