//! Ketama-compatible consistent hashing over the server pool

use cachette_config::ServerEndpoint;

/// Digests per server; each digest yields four points on the ring
const DIGESTS_PER_SERVER: usize = 40;

/// Consistent hash ring mapping keys to server indexes
#[derive(Debug, Clone)]
pub struct HashRing {
    /// (point, server index), sorted by point
    points: Vec<(u32, usize)>,
}

impl HashRing {
    pub fn new(servers: &[ServerEndpoint]) -> Self {
        let mut points = Vec::with_capacity(servers.len() * DIGESTS_PER_SERVER * 4);

        for (index, server) in servers.iter().enumerate() {
            for i in 0..DIGESTS_PER_SERVER {
                let digest = md5::compute(format!("{}-{}", server, i));
                for chunk in digest.0.chunks_exact(4) {
                    let point = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                    points.push((point, index));
                }
            }
        }

        points.sort_unstable();
        Self { points }
    }

    /// Index of the server responsible for `key`
    pub fn node_for(&self, key: &str) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }

        let hash = key_hash(key);
        let position = self.points.partition_point(|(point, _)| *point < hash);
        let (_, index) = self.points[position % self.points.len()];
        Some(index)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn key_hash(key: &str) -> u32 {
    let digest = md5::compute(key);
    u32::from_le_bytes([digest.0[0], digest.0[1], digest.0[2], digest.0[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn servers(n: usize) -> Vec<ServerEndpoint> {
        (0..n)
            .map(|i| ServerEndpoint::new(format!("cache{}", i), 6379))
            .collect()
    }

    #[test]
    fn test_empty_ring() {
        let ring = HashRing::new(&[]);
        assert!(ring.is_empty());
        assert_eq!(ring.node_for("key"), None);
    }

    #[test]
    fn test_single_server_takes_everything() {
        let ring = HashRing::new(&servers(1));
        for i in 0..100 {
            assert_eq!(ring.node_for(&format!("key:{}", i)), Some(0));
        }
    }

    #[test]
    fn test_mapping_is_stable_and_spread() {
        let pool = servers(3);
        let ring = HashRing::new(&pool);
        let again = HashRing::new(&pool);

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for i in 0..3000 {
            let key = format!("key:{}", i);
            let node = ring.node_for(&key).unwrap();
            assert_eq!(again.node_for(&key), Some(node));
            *counts.entry(node).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|&count| count > 500));
    }

    #[test]
    fn test_adding_a_server_moves_few_keys() {
        let ring = HashRing::new(&servers(4));
        let grown = HashRing::new(&servers(5));

        let moved = (0..2000)
            .map(|i| format!("key:{}", i))
            .filter(|key| ring.node_for(key) != grown.node_for(key))
            .count();

        // Roughly a fifth of the keys should move to the new server
        assert!(moved < 800, "{} keys moved", moved);
    }
}
