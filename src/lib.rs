//! A proof-of-solvency audit database: an append-only data file of
//! power-of-two-many signed balance records is compiled into a keyed
//! summation Merkle tree file, from which both the signed total and
//! per-leaf inclusion proofs can be served.
//!
//! See [`format`] for the on-disk layout, [`hash`] for the keyed hashing
//! scheme, and [`tree`] for construction and queries.

pub mod cli;
pub mod error;
pub mod format;
pub mod hash;
pub mod render;
pub mod testdata;
pub mod tree;

pub use error::Error;
pub use tree::{
    Db,
    RootTriple,
};
