use crate::board::{Color, PieceKind, Square};
use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use std::collections::HashMap;
use std::sync::Mutex;

#[cfg(feature = "deterministic_zobrist")]
const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

fn make_zobrist_rng(size: u8) -> StdRng {
    #[cfg(feature = "deterministic_zobrist")]
    {
        StdRng::seed_from_u64(ZOBRIST_SEED ^ size as u64)
    }
    #[cfg(not(feature = "deterministic_zobrist"))]
    {
        // Deterministic-by-default: key tables must be stable across process
        // restarts regardless of the `deterministic_zobrist` feature, since
        // tests assert (size -> keys) determinism and a serialized TT would
        // otherwise desync on restart.
        StdRng::seed_from_u64(0x9E37_79B9_AAAC_5C87 ^ size as u64)
    }
}

/// Per-board-size Zobrist key table: one key per (row, col, color, kind),
/// plus two distinct turn keys, one per `Color`. The hash of a position is
/// `turn_key(side_to_move) XOR (XOR of all occupant keys)`; flipping the
/// side to move XORs out the old color's turn key and XORs in the new
/// color's, never a single toggle-for-one-color bit.
pub struct ZobristKeys {
    size: u8,
    // [row][col][color][kind]
    piece: Vec<[[u64; 2]; 2]>,
    turn: [u64; 2],
}

impl ZobristKeys {
    #[inline(always)]
    fn piece_index(&self, sq: Square) -> usize {
        sq.row as usize * self.size as usize + sq.col as usize
    }

    #[inline(always)]
    pub fn piece_key(&self, sq: Square, color: Color, kind: PieceKind) -> u64 {
        let c = match color {
            Color::White => 0,
            Color::Black => 1,
        };
        let k = match kind {
            PieceKind::Man => 0,
            PieceKind::King => 1,
        };
        self.piece[self.piece_index(sq)][c][k]
    }

    #[inline(always)]
    pub fn turn_key(&self, color: Color) -> u64 {
        match color {
            Color::White => self.turn[0],
            Color::Black => self.turn[1],
        }
    }
}

fn generate_keys(size: u8) -> ZobristKeys {
    let mut rng = make_zobrist_rng(size);

    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        // Avoid zero keys to reduce degenerate collisions.
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let cells = size as usize * size as usize;
    let mut piece = vec![[[0u64; 2]; 2]; cells];
    for slot in piece.iter_mut() {
        for color_slot in slot.iter_mut() {
            for kind_slot in color_slot.iter_mut() {
                *kind_slot = non_zero(&mut rng);
            }
        }
    }

    let turn = [non_zero(&mut rng), non_zero(&mut rng)];

    ZobristKeys { size, piece, turn }
}

/// Returns the lazily built, process-wide key table for `size`, building it
/// on first use and reusing it for every subsequent `Board` of the same
/// size. Keyed per size since 8x8 and 10x10 boards need differently shaped
/// tables; a single `OnceCell` (as a one-size engine would use) cannot serve
/// both.
pub fn zobrist_keys(size: u8) -> &'static ZobristKeys {
    static REGISTRY: OnceCell<Mutex<HashMap<u8, &'static ZobristKeys>>> = OnceCell::new();
    let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));

    let mut guard = registry.lock().expect("zobrist key registry poisoned");
    if let Some(keys) = guard.get(&size) {
        return keys;
    }
    let keys: &'static ZobristKeys = Box::leak(Box::new(generate_keys(size)));
    guard.insert(size, keys);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_per_size() {
        let a = zobrist_keys(8);
        let b = zobrist_keys(8);
        assert_eq!(a.turn[0], b.turn[0]);
        assert_eq!(
            a.piece_key(Square::new(1, 2), Color::White, PieceKind::Man),
            b.piece_key(Square::new(1, 2), Color::White, PieceKind::Man)
        );
    }

    #[test]
    fn turn_keys_are_distinct_per_color() {
        let keys = zobrist_keys(8);
        assert_ne!(keys.turn_key(Color::White), keys.turn_key(Color::Black));
    }

    #[test]
    fn different_sizes_get_different_tables() {
        let k8 = zobrist_keys(8);
        let k10 = zobrist_keys(10);
        assert_ne!(k8.turn_key(Color::White), k10.turn_key(Color::White));
    }
}
