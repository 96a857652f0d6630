// Snake-order turn scheduling.

use serde::{Deserialize, Serialize};

/// Which way the draft order is currently being walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Tracks whose turn it is in a draft order of fixed length.
///
/// Walking off either end clamps back onto the last index and flips the
/// direction, so the captain at each end picks twice in a row:
/// for three captains the sequence is `0, 1, 2, 2, 1, 0, 0, 1, 2, 2, ...`.
/// There is no terminal state; callers stop when the pool runs out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnScheduler {
    len: usize,
    current: usize,
    direction: Direction,
}

impl TurnScheduler {
    /// Scheduler over `len` captains, starting at index 0 going forward.
    /// Returns `None` for an empty order.
    pub fn new(len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Some(TurnScheduler {
            len,
            current: 0,
            direction: Direction::Forward,
        })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Move to the next turn and return the new index.
    pub fn advance(&mut self) -> usize {
        let next = self.current as isize + self.direction.step();

        if next >= self.len as isize {
            self.current = self.len - 1;
            self.direction = Direction::Backward;
        } else if next < 0 {
            self.current = 0;
            self.direction = Direction::Forward;
        } else {
            self.current = next as usize;
        }

        self.current
    }
}
