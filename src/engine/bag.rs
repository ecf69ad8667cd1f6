//! The shared pool of undrawn tiles.
//!
//! `TileBag` is an owned value: drawing consumes the bag and hands back the
//! remainder together with the drawn tiles, so every tile is always in exactly
//! one place (bag, a rack, or the board).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::tiles::build_tile_bag;
use super::types::Tile;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileBag {
    tiles: Vec<Tile>,
}

impl TileBag {
    /// Wrap tiles in draw order: the last tile is drawn first.
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    /// A full bag in random order.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut tiles = build_tile_bag();
        tiles.shuffle(rng);
        Self { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Draw up to `n` tiles. Fewer are returned when the bag runs out.
    #[must_use]
    pub fn draw(mut self, n: usize) -> (Self, Vec<Tile>) {
        let split = self.tiles.len().saturating_sub(n);
        let drawn = self.tiles.split_off(split);
        (self, drawn)
    }

    /// Put tiles back and reshuffle the whole bag.
    #[must_use]
    pub fn return_tiles<R: Rng + ?Sized>(
        mut self,
        tiles: impl IntoIterator<Item = Tile>,
        rng: &mut R,
    ) -> Self {
        self.tiles.extend(tiles);
        self.tiles.shuffle(rng);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_shuffled_bag_is_full() {
        let mut rng = StdRng::seed_from_u64(7);
        let bag = TileBag::shuffled(&mut rng);
        assert_eq!(bag.len(), 100);
    }

    #[test]
    fn test_draw_takes_requested_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let (bag, drawn) = TileBag::shuffled(&mut rng).draw(7);
        assert_eq!(drawn.len(), 7);
        assert_eq!(bag.len(), 93);
    }

    #[test]
    fn test_draw_caps_at_bag_size() {
        let tiles = build_tile_bag().into_iter().take(2).collect();
        let (bag, drawn) = TileBag::new(tiles).draw(5);
        assert_eq!(drawn.len(), 2);
        assert!(bag.is_empty());

        let (bag, drawn) = bag.draw(3);
        assert!(drawn.is_empty());
        assert!(bag.is_empty());
    }

    #[test]
    fn test_return_tiles_conserves_count() {
        let mut rng = StdRng::seed_from_u64(11);
        let (bag, drawn) = TileBag::shuffled(&mut rng).draw(7);
        let bag = bag.return_tiles(drawn, &mut rng);
        assert_eq!(bag.len(), 100);
    }

    #[test]
    fn test_same_seed_same_order() {
        let a = TileBag::shuffled(&mut StdRng::seed_from_u64(3));
        let b = TileBag::shuffled(&mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
