//! Grid distances for the opponent's movement heuristic.
//!
//! All steps cost one, so a breadth-first search from the goal yields the
//! same distances as a uniform-cost search. Mountains block; units do not,
//! since they move away over the course of a game.

use std::collections::VecDeque;

use crate::game::{Board, Coord};

/// Shortest-path distance from every tile to one goal tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField {
    goal: Coord,
    width: u16,
    /// Row-major, `None` where the goal is unreachable.
    distances: Vec<Option<u32>>,
}

impl DistanceField {
    /// Flood the board outward from `goal`.
    ///
    /// The goal itself always has distance 0, whatever its terrain.
    #[must_use]
    pub fn from_goal(board: &Board, goal: Coord) -> Self {
        let mut distances = vec![None; board.tiles().len()];
        let mut queue = VecDeque::new();

        if let Some(idx) = board.index(goal) {
            distances[idx] = Some(0);
            queue.push_back((goal, 0u32));
        }

        while let Some((pos, dist)) = queue.pop_front() {
            for next in board.neighbors(pos) {
                let Some(idx) = board.index(next) else {
                    continue;
                };
                if distances[idx].is_some() {
                    continue;
                }
                if !board.tiles()[idx].terrain.is_passable() {
                    continue;
                }
                distances[idx] = Some(dist + 1);
                queue.push_back((next, dist + 1));
            }
        }

        Self {
            goal,
            width: board.width(),
            distances,
        }
    }

    /// The tile distances are measured to.
    #[must_use]
    pub const fn goal(&self) -> Coord {
        self.goal
    }

    /// Steps from `pos` to the goal, or `None` if there is no path.
    #[must_use]
    pub fn distance(&self, pos: Coord) -> Option<u32> {
        if pos.x >= self.width {
            return None;
        }
        let idx = usize::from(pos.y) * usize::from(self.width) + usize::from(pos.x);
        self.distances.get(idx).copied().flatten()
    }

    /// Ordering key for a move target: reachable tiles first by path
    /// distance, then Manhattan distance, then row-major position.
    #[must_use]
    pub fn rank(&self, pos: Coord) -> (bool, u32, u32, Coord) {
        let path = self.distance(pos);
        (
            path.is_none(),
            path.unwrap_or(u32::MAX),
            pos.manhattan(self.goal),
            pos,
        )
    }
}
