use crate::board::{Board, Color, Piece, Square};
use crate::moves::types::Move;
use std::collections::{HashMap, VecDeque};

/// One cached answer to `legal_moves(board, color)`, stored by the mover's
/// `(row, col)` rather than by `Piece` identity. A layout can be reached by
/// two different move orders that assign different identities to
/// same-colored pieces occupying the same squares; resolving by coordinate
/// at lookup time means the cache never hands back a stale `Piece` whose
/// `id` no longer matches what is actually on the board.
struct CacheEntry {
    by_start: HashMap<Square, Vec<Move>>,
}

/// Bounded FIFO cache for `legal_moves`, keyed by `(size, zobrist, color)`.
/// On overflow the oldest entry (by insertion order) is evicted — a small
/// fixed cost per insert rather than the bookkeeping of true LRU, which the
/// move generator's workload (many distinct positions, rarely revisited in
/// a hot loop, except at shallow search depths and in MCTS rollouts) does
/// not reward.
pub struct MoveCache {
    capacity: usize,
    map: HashMap<(u8, u64, Color), CacheEntry>,
    order: VecDeque<(u8, u64, Color)>,
}

impl MoveCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, size: u8, zobrist: u64, color: Color, start: Square) -> Option<&[Move]> {
        self.map
            .get(&(size, zobrist, color))
            .and_then(|entry| entry.by_start.get(&start))
            .map(|v| v.as_slice())
    }

    /// Reconstructs a full `legal_moves`-shaped result from a cached entry,
    /// resolving each cached start square back to whatever `Piece` currently
    /// sits there rather than handing back a stale cached identity. Returns
    /// `None` on a cache miss or if `board` no longer matches the entry
    /// (which should not happen given an exact zobrist key match, but a
    /// piece-at lookup failing is treated as a miss rather than a panic).
    pub fn get_all(
        &self,
        size: u8,
        zobrist: u64,
        color: Color,
        board: &Board,
    ) -> Option<Vec<(Piece, Vec<Move>)>> {
        let entry = self.map.get(&(size, zobrist, color))?;
        let mut out = Vec::with_capacity(entry.by_start.len());
        for (&sq, mvs) in &entry.by_start {
            let piece = board.piece_at(sq)?;
            out.push((piece, mvs.clone()));
        }
        out.sort_by_key(|(p, _)| (p.square.row, p.square.col));
        Some(out)
    }

    pub fn insert(&mut self, size: u8, zobrist: u64, color: Color, moves: &[(Piece, Vec<Move>)]) {
        let key = (size, zobrist, color);
        if self.map.contains_key(&key) {
            return;
        }
        if self.map.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
        let mut by_start = HashMap::with_capacity(moves.len());
        for (piece, mvs) in moves {
            by_start.insert(piece.square, mvs.clone());
        }
        self.map.insert(key, CacheEntry { by_start });
        self.order.push_back(key);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Variant};
    use crate::moves::generate::legal_moves;

    #[test]
    fn evicts_oldest_entry_on_overflow() {
        let mut cache = MoveCache::new(2);
        let board = Board::new(Variant::British);
        let moves = legal_moves(&board, Color::White);

        cache.insert(8, 1, Color::White, &moves);
        cache.insert(8, 2, Color::White, &moves);
        assert_eq!(cache.len(), 2);

        cache.insert(8, 3, Color::White, &moves);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(8, 1, Color::White, moves[0].0.square).is_none());
        assert!(cache.get(8, 3, Color::White, moves[0].0.square).is_some());
    }

    #[test]
    fn lookup_resolves_by_coordinate() {
        let mut cache = MoveCache::new(8);
        let board = Board::new(Variant::British);
        let moves = legal_moves(&board, Color::White);
        let (piece, mvs) = &moves[0];

        cache.insert(8, 42, Color::White, &moves);
        let hit = cache.get(8, 42, Color::White, piece.square).unwrap();
        assert_eq!(hit.len(), mvs.len());
    }

    #[test]
    fn get_all_reconstructs_the_full_legal_moves_shape() {
        let mut cache = MoveCache::new(8);
        let board = Board::new(Variant::British);
        let moves = legal_moves(&board, Color::White);

        cache.insert(board.size, board.zobrist, Color::White, &moves);
        let rebuilt = cache
            .get_all(board.size, board.zobrist, Color::White, &board)
            .unwrap();

        assert_eq!(rebuilt.len(), moves.len());
        for (piece, mvs) in &rebuilt {
            let original = moves.iter().find(|(p, _)| p.square == piece.square).unwrap();
            assert_eq!(mvs.len(), original.1.len());
        }
    }

    #[test]
    fn get_all_misses_for_an_unseen_key() {
        let cache = MoveCache::new(8);
        let board = Board::new(Variant::British);
        assert!(
            cache
                .get_all(board.size, board.zobrist, Color::White, &board)
                .is_none()
        );
    }
}
