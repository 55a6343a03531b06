//! Announced peers per info hash.

use std::{net::SocketAddrV4, num::NonZeroUsize};

use lru::LruCache;
use rand::{thread_rng, Rng};

use crate::common::Id;

/// Number of peers returned by [PeersStore::get_random_peers].
const PEERS_SAMPLE_SIZE: usize = 20;

#[derive(Debug)]
/// An LRU cache of peer addresses per info hash.
pub struct PeersStore {
    info_hashes: LruCache<Id, LruCache<SocketAddrV4, ()>>,
    max_peers: NonZeroUsize,
}

impl PeersStore {
    pub fn new(max_info_hashes: NonZeroUsize, max_peers: NonZeroUsize) -> Self {
        Self {
            info_hashes: LruCache::new(max_info_hashes),
            max_peers,
        }
    }

    pub fn add_peer(&mut self, info_hash: Id, peer: SocketAddrV4) {
        if let Some(info_hash_lru) = self.info_hashes.get_mut(&info_hash) {
            info_hash_lru.put(peer, ());
        } else {
            let mut info_hash_lru = LruCache::new(self.max_peers);
            info_hash_lru.put(peer, ());
            self.info_hashes.put(info_hash, info_hash_lru);
        };
    }

    /// Up to 20 peers for `info_hash`, sampled uniformly when more are known.
    pub fn get_random_peers(&mut self, info_hash: &Id) -> Option<Vec<SocketAddrV4>> {
        let info_hash_lru = self.info_hashes.get(info_hash)?;
        let size = info_hash_lru.len();

        if size == 0 {
            return None;
        }
        if size <= PEERS_SAMPLE_SIZE {
            return Some(info_hash_lru.iter().map(|(addr, _)| *addr).collect());
        }

        let mut results = Vec::with_capacity(PEERS_SAMPLE_SIZE);
        let mut rng = thread_rng();

        for (index, (addr, _)) in info_hash_lru.iter().enumerate() {
            let remaining_slots = PEERS_SAMPLE_SIZE - results.len();
            let remaining_items = size - index;
            let chance = remaining_slots as f64 / remaining_items as f64;

            if rng.gen_bool(chance) {
                results.push(*addr);
                if results.len() == PEERS_SAMPLE_SIZE {
                    break;
                }
            }
        }

        Some(results)
    }
}
