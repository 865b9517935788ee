use crate::board::Color;
use crate::moves::types::Move;
use std::collections::HashMap;

/// Default capacity of a fresh `TranspositionTable`, chosen to bound memory
/// use on a 10x10 board's much larger search space without the fixed
/// power-of-2 sizing a direct-mapped table would need.
pub const DEFAULT_CAPACITY: usize = 500_000;

/// How many entries an eviction scan samples before picking the shallowest
/// one to drop.
const EVICTION_SCAN: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug)]
pub struct TtEntry {
    pub depth: u8,
    pub score: f64,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

/// Transposition table keyed by `(zobrist, maximizing color)` rather than by
/// zobrist alone: the same position hashes identically regardless of which
/// side is to move next in the encoding, but a score stored while White was
/// maximizing is not interchangeable with one stored while Black was —
/// keeping the perspective in the key avoids ever returning a sign-flipped
/// score from the wrong search.
pub struct TranspositionTable {
    capacity: usize,
    map: HashMap<(u64, Color), TtEntry>,
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: HashMap::with_capacity(capacity.min(DEFAULT_CAPACITY)),
        }
    }

    pub fn get(&self, zobrist: u64, maximizing: Color) -> Option<&TtEntry> {
        self.map.get(&(zobrist, maximizing))
    }

    pub fn store(
        &mut self,
        zobrist: u64,
        maximizing: Color,
        depth: u8,
        score: f64,
        bound: Bound,
        best_move: Option<Move>,
    ) {
        let key = (zobrist, maximizing);
        if !self.map.contains_key(&key) && self.map.len() >= self.capacity {
            self.evict_shallowest();
        }
        let slot = self.map.entry(key).or_insert(TtEntry {
            depth,
            score,
            bound,
            best_move,
        });
        if slot.depth <= depth {
            slot.depth = depth;
            slot.score = score;
            slot.bound = bound;
            slot.best_move = best_move.or(slot.best_move);
        }
    }

    fn evict_shallowest(&mut self) {
        let victim = self
            .map
            .iter()
            .take(EVICTION_SCAN)
            .min_by_key(|(_, entry)| entry.depth)
            .map(|(key, _)| *key);
        if let Some(key) = victim {
            self.map.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_retrieves_by_perspective() {
        let mut tt = TranspositionTable::new(16);
        tt.store(7, Color::White, 4, 1.5, Bound::Exact, None);
        assert!(tt.get(7, Color::White).is_some());
        assert!(tt.get(7, Color::Black).is_none());
    }

    #[test]
    fn deeper_entry_overwrites_shallower_one() {
        let mut tt = TranspositionTable::new(16);
        tt.store(7, Color::White, 2, 1.0, Bound::Exact, None);
        tt.store(7, Color::White, 6, 2.0, Bound::Exact, None);
        let entry = tt.get(7, Color::White).unwrap();
        assert_eq!(entry.depth, 6);
        assert_eq!(entry.score, 2.0);
    }

    #[test]
    fn shallower_entry_does_not_overwrite_deeper_one() {
        let mut tt = TranspositionTable::new(16);
        tt.store(7, Color::White, 6, 2.0, Bound::Exact, None);
        tt.store(7, Color::White, 2, 1.0, Bound::Exact, None);
        let entry = tt.get(7, Color::White).unwrap();
        assert_eq!(entry.depth, 6);
    }

    #[test]
    fn evicts_when_over_capacity() {
        let mut tt = TranspositionTable::new(4);
        for i in 0..8u64 {
            tt.store(i, Color::White, (i % 3) as u8, i as f64, Bound::Exact, None);
        }
        assert!(tt.len() <= 4);
    }
}
