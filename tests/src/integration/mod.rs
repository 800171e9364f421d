//! Integration tests across consensus, sharding, rollup and anchoring.

#[cfg(test)]
mod fixtures;

mod anchoring;
mod consensus;
mod rollup;
mod sharding;
