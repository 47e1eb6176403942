//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from vision and routing code.

use std::hash::Hasher;

use super::*;
use xxhash_rust::xxh3::Xxh3;

impl SquareMap {
    /// Hash of the dimensions and every cell's flag bits, stable across runs and platforms.
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.width as u64);
        hasher.write_u64(self.height as u64);
        for cell in &self.cells {
            hasher.write_u8(cell.bits());
        }
        hasher.finish()
    }
}
