//! Deterministic random number generation.
//!
//! Each system draws from its own named ChaCha8 stream whose seed is
//! derived by hashing the stream name into the master seed, so adding or
//! reordering systems never perturbs another system's draws.

use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    master_seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master_seed: seed,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let seed = derive_stream_seed(self.master_seed, name);
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed));
        SystemRng { inner: entry }
    }
}

fn derive_stream_seed(master: u64, name: &str) -> u64 {
    // FNV-1a over the stream name, folded into the master seed through a
    // splitmix round.
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let mut seed = master ^ hash;
    seed = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    seed = (seed ^ (seed >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    seed = (seed ^ (seed >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    seed ^ (seed >> 31)
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngManager::new(42);
        let mut b = RngManager::new(42);
        let va: f64 = a.stream("war").gen();
        let vb: f64 = b.stream("war").gen();
        assert_eq!(va, vb);
    }

    #[test]
    fn streams_are_independent_of_request_order() {
        let mut a = RngManager::new(42);
        let mut b = RngManager::new(42);
        let _: f64 = a.stream("economy").gen();
        let va: f64 = a.stream("war").gen();
        let vb: f64 = b.stream("war").gen();
        assert_eq!(va, vb);
    }

    #[test]
    fn different_streams_diverge() {
        let mut mgr = RngManager::new(42);
        let va: f64 = mgr.stream("economy").gen();
        let vb: f64 = mgr.stream("war").gen();
        assert_ne!(va, vb);
    }

    #[test]
    fn stream_state_persists_across_calls() {
        let mut mgr = RngManager::new(7);
        let first: u64 = mgr.stream("war").gen();
        let second: u64 = mgr.stream("war").gen();
        assert_ne!(first, second);
    }
}
