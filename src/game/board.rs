//! Board, tile and coordinate types.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{PlayerId, Unit};

/// A coordinate on the board.
///
/// Coordinates order row-major (by `y`, then `x`), which is the order the
/// board iterates its tiles in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Get adjacent coordinates (up, down, left, right).
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains valid coordinates in indices 0..count.
    #[must_use]
    #[inline]
    pub fn adjacent(&self, width: u16, height: u16) -> ([Coord; 4], u8) {
        let mut result = [Coord::new(0, 0); 4];
        let mut count = 0u8;

        if self.y > 0 {
            result[count as usize] = Coord::new(self.x, self.y - 1); // up
            count += 1;
        }
        if self.y + 1 < height {
            result[count as usize] = Coord::new(self.x, self.y + 1); // down
            count += 1;
        }
        if self.x > 0 {
            result[count as usize] = Coord::new(self.x - 1, self.y); // left
            count += 1;
        }
        if self.x + 1 < width {
            result[count as usize] = Coord::new(self.x + 1, self.y); // right
            count += 1;
        }

        (result, count)
    }

    /// Iterate the in-bounds orthogonal neighbours of this coordinate.
    pub fn neighbors(self, width: u16, height: u16) -> impl Iterator<Item = Coord> {
        let (adjacent, count) = self.adjacent(width, height);
        adjacent.into_iter().take(usize::from(count))
    }

    /// Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan(self, other: Coord) -> u32 {
        u32::from(self.x.abs_diff(other.x)) + u32::from(self.y.abs_diff(other.y))
    }

    /// Whether `other` is exactly one orthogonal step away.
    #[must_use]
    pub fn is_adjacent_to(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Terrain of a tile. Fixed at board generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Terrain {
    /// Paths along the edges and through the centre.
    Normal,
    /// Open plain covering most of the interior.
    Forest,
    /// Impassable; units can neither enter nor be summoned onto it.
    Mountain,
    /// Arid band across the middle of the board.
    Wasteland,
}

impl Terrain {
    /// Check if units can enter this terrain.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Terrain::Mountain)
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Terrain::Normal => "Path",
            Terrain::Forest => "Plain",
            Terrain::Mountain => "Mountain",
            Terrain::Wasteland => "Wasteland",
        }
    }
}

/// A single tile on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Type of terrain.
    pub terrain: Terrain,
    /// Whether the tile has been claimed by deployment or movement.
    pub unfolded: bool,
    /// Owner of this tile. Once set it is never cleared.
    pub owner: Option<PlayerId>,
    /// Unit standing here, at most one. It belongs to the tile's owner.
    pub content: Option<Unit>,
}

impl Tile {
    /// Create a new unclaimed, empty tile.
    #[must_use]
    pub const fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            unfolded: false,
            owner: None,
            content: None,
        }
    }

    /// Whether anything stands on this tile.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.content.is_some()
    }

    /// The unit on this tile, if any.
    #[must_use]
    pub const fn unit(&self) -> Option<&Unit> {
        self.content.as_ref()
    }

    /// Mutable access to the unit on this tile, if any.
    #[must_use]
    pub fn unit_mut(&mut self) -> Option<&mut Unit> {
        self.content.as_mut()
    }

    /// Mark the tile as claimed by `player`.
    pub fn claim(&mut self, player: PlayerId) {
        self.unfolded = true;
        self.owner = Some(player);
    }
}

/// The game board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    /// Width of the board in tiles.
    width: u16,
    /// Height of the board in tiles.
    height: u16,
    /// Tiles stored in row-major order.
    tiles: Vec<Tile>,
}

/// Board as stored on disk, before its dimensions are checked.
#[derive(Deserialize)]
struct RawBoard {
    width: u16,
    height: u16,
    tiles: Vec<Tile>,
}

impl TryFrom<RawBoard> for Board {
    type Error = String;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        let expected = usize::from(raw.width) * usize::from(raw.height);
        if expected == 0 {
            return Err(format!("empty board {}x{}", raw.width, raw.height));
        }
        if raw.tiles.len() != expected {
            return Err(format!(
                "board {}x{} needs {expected} tiles, found {}",
                raw.width,
                raw.height,
                raw.tiles.len()
            ));
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            tiles: raw.tiles,
        })
    }
}

impl Board {
    /// Create a new board filled with unclaimed normal tiles.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        let tiles = vec![Tile::new(Terrain::Normal); size];

        Some(Self {
            width,
            height,
            tiles,
        })
    }

    /// Generate the banded terrain layout and claim each player's castle tile.
    ///
    /// Edges are paths, a wasteland band crosses the middle rows with a path
    /// opening at its centre, the rest of the interior is plain, and two
    /// mountains sit on the centre column a quarter of the way in from the
    /// top and bottom edges. Mountains never land on or next to a castle.
    ///
    /// Returns `None` for a zero-sized board or an out-of-bounds castle.
    #[must_use]
    pub fn generate(width: u16, height: u16, castles: &[(PlayerId, Coord)]) -> Option<Self> {
        let mut board = Self::new(width, height)?;
        if castles.iter().any(|&(_, pos)| !board.in_bounds(pos)) {
            return None;
        }

        let cx = width / 2;
        let mountains = [
            Coord::new(cx, height / 4),
            Coord::new(cx, height - 1 - height / 4),
        ];
        let near_castle = |pos: Coord| {
            castles
                .iter()
                .any(|&(_, castle)| castle == pos || castle.is_adjacent_to(pos))
        };

        for (pos, tile) in board.iter_mut() {
            tile.terrain = if mountains.contains(&pos) && !near_castle(pos) {
                Terrain::Mountain
            } else {
                band_terrain(width, height, pos)
            };
        }

        for &(player, pos) in castles {
            if let Some(tile) = board.get_mut(pos) {
                tile.terrain = Terrain::Normal;
                tile.claim(player);
            }
        }

        Some(board)
    }

    /// Get the width of the board.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the height of the board.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Get a reference to the raw tiles slice in row-major order.
    #[must_use]
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Check if a coordinate is within the board bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Flattened `y * width + x` index of a coordinate.
    #[must_use]
    pub fn index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
        } else {
            None
        }
    }

    /// Get a reference to the tile at the given coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.index(coord).and_then(|idx| self.tiles.get(idx))
    }

    /// Get a mutable reference to the tile at the given coordinate.
    #[must_use]
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.index(coord).and_then(|idx| self.tiles.get_mut(idx))
    }

    /// Set the tile at the given coordinate.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set(&mut self, coord: Coord, tile: Tile) -> bool {
        match self.get_mut(coord) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// In-bounds orthogonal neighbours of `coord`.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> {
        coord.neighbors(self.width, self.height)
    }

    /// Iterate over all coordinates and tiles.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        let width = usize::from(self.width);
        self.tiles.iter().enumerate().map(move |(idx, tile)| {
            #[allow(clippy::cast_possible_truncation)]
            let coord = Coord::new((idx % width) as u16, (idx / width) as u16);
            (coord, tile)
        })
    }

    /// Iterate over all coordinates and mutable tiles.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Coord, &mut Tile)> {
        let width = usize::from(self.width);
        self.tiles.iter_mut().enumerate().map(move |(idx, tile)| {
            #[allow(clippy::cast_possible_truncation)]
            let coord = Coord::new((idx % width) as u16, (idx / width) as u16);
            (coord, tile)
        })
    }

    /// Get all tiles owned by a specific player.
    pub fn tiles_owned_by(&self, player: PlayerId) -> impl Iterator<Item = (Coord, &Tile)> {
        self.iter().filter(move |(_, tile)| tile.owner == Some(player))
    }

    /// The unit standing at `coord`, if any.
    #[must_use]
    pub fn unit_at(&self, coord: Coord) -> Option<&Unit> {
        self.get(coord).and_then(Tile::unit)
    }

    /// All units on the board belonging to `player`, in row-major order.
    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = (Coord, &Unit)> {
        self.tiles_owned_by(player)
            .filter_map(|(coord, tile)| tile.unit().map(|unit| (coord, unit)))
    }

    /// Count the units `player` has on the board.
    #[must_use]
    pub fn count_units(&self, player: PlayerId) -> usize {
        self.units_of(player).count()
    }
}

/// Terrain for a cell when no mountain or castle overrides it.
fn band_terrain(width: u16, height: u16, pos: Coord) -> Terrain {
    let (cx, cy) = (width / 2, height / 2);
    let in_band = |v: u16, centre: u16| v + 1 >= centre && v <= centre + 1;

    let on_edge = pos.x == 0 || pos.y == 0 || pos.x + 1 == width || pos.y + 1 == height;
    if on_edge {
        return Terrain::Normal;
    }
    if in_band(pos.y, cy) {
        if in_band(pos.x, cx) {
            Terrain::Normal
        } else {
            Terrain::Wasteland
        }
    } else {
        Terrain::Forest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn castles_9x9() -> [(PlayerId, Coord); 2] {
        [(1, Coord::new(4, 8)), (2, Coord::new(4, 0))]
    }

    #[test]
    fn test_deserialize_checks_tile_count() {
        let board = Board::new(3, 2).unwrap();
        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, board);

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["tiles"].as_array_mut().unwrap().truncate(4);
        let err = serde_json::from_value::<Board>(value).unwrap_err();
        assert!(err.to_string().contains("needs 6 tiles, found 4"));

        let empty = r#"{"width":0,"height":5,"tiles":[]}"#;
        assert!(serde_json::from_str::<Board>(empty).is_err());
    }

    #[test]
    fn test_coord_adjacent() {
        let coord = Coord::new(5, 5);
        let (adj, count) = coord.adjacent(10, 10);
        let adj_slice = &adj[..count as usize];
        assert_eq!(count, 4);
        assert!(adj_slice.contains(&Coord::new(5, 4)));
        assert!(adj_slice.contains(&Coord::new(5, 6)));
        assert!(adj_slice.contains(&Coord::new(4, 5)));
        assert!(adj_slice.contains(&Coord::new(6, 5)));
    }

    #[test]
    fn test_coord_adjacent_corner() {
        let neighbors: Vec<_> = Coord::new(0, 0).neighbors(10, 10).collect();
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains(&Coord::new(0, 1)));
        assert!(neighbors.contains(&Coord::new(1, 0)));
    }

    #[test]
    fn test_coord_row_major_order() {
        assert!(Coord::new(5, 0) < Coord::new(0, 1));
        assert!(Coord::new(0, 1) < Coord::new(1, 1));
    }

    #[test]
    fn test_manhattan_and_adjacency() {
        let a = Coord::new(2, 3);
        assert_eq!(a.manhattan(Coord::new(5, 1)), 5);
        assert!(a.is_adjacent_to(Coord::new(2, 4)));
        assert!(!a.is_adjacent_to(Coord::new(3, 4)));
        assert!(!a.is_adjacent_to(a));
    }

    #[test]
    fn test_board_zero_size() {
        assert!(Board::new(0, 10).is_none());
        assert!(Board::new(10, 0).is_none());
    }

    #[test]
    fn test_board_index_is_row_major() {
        let board = Board::new(9, 7).unwrap();
        assert_eq!(board.index(Coord::new(0, 0)), Some(0));
        assert_eq!(board.index(Coord::new(3, 2)), Some(21));
        assert_eq!(board.index(Coord::new(9, 0)), None);
    }

    #[test]
    fn test_generate_13x13_matches_bands() {
        let castles = [(1, Coord::new(6, 12)), (2, Coord::new(6, 0))];
        let board = Board::generate(13, 13, &castles).unwrap();
        let terrain = |x, y| board.get(Coord::new(x, y)).unwrap().terrain;

        assert_eq!(terrain(0, 4), Terrain::Normal);
        assert_eq!(terrain(12, 9), Terrain::Normal);
        assert_eq!(terrain(3, 3), Terrain::Forest);
        assert_eq!(terrain(2, 6), Terrain::Wasteland);
        assert_eq!(terrain(6, 6), Terrain::Normal);
        assert_eq!(terrain(6, 3), Terrain::Mountain);
        assert_eq!(terrain(6, 9), Terrain::Mountain);
    }

    #[test]
    fn test_generate_places_castles() {
        let board = Board::generate(9, 9, &castles_9x9()).unwrap();
        for (player, pos) in castles_9x9() {
            let tile = board.get(pos).unwrap();
            assert!(tile.unfolded);
            assert_eq!(tile.owner, Some(player));
            assert!(!tile.is_occupied());
            assert_eq!(tile.terrain, Terrain::Normal);
        }
        let owned = board.iter().filter(|(_, t)| t.owner.is_some()).count();
        assert_eq!(owned, 2);
    }

    #[test]
    fn test_generate_never_puts_mountain_near_castle() {
        for size in 3..=15u16 {
            let castles = [(1, Coord::new(size / 2, size - 1)), (2, Coord::new(size / 2, 0))];
            let board = Board::generate(size, size, &castles).unwrap();
            for (_, castle) in castles {
                assert!(board.get(castle).unwrap().terrain.is_passable());
                for n in board.neighbors(castle) {
                    assert_ne!(board.get(n).unwrap().terrain, Terrain::Mountain, "size {size}");
                }
            }
        }
    }

    #[test]
    fn test_generate_rejects_castle_out_of_bounds() {
        assert!(Board::generate(5, 5, &[(1, Coord::new(5, 0))]).is_none());
    }

    #[test]
    fn test_terrain_passable() {
        assert!(Terrain::Normal.is_passable());
        assert!(Terrain::Forest.is_passable());
        assert!(Terrain::Wasteland.is_passable());
        assert!(!Terrain::Mountain.is_passable());
    }
}
