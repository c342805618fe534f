//! Shared utilities.

pub mod find;

#[cfg(test)]
pub mod testutil;
