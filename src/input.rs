//! # Input Decoding
//!
//! The four player buttons are sampled once per task tick and turned into
//! explicit commands by pure functions, so the decision logic is independent
//! of any drawing.
//!
//! ## Ball steering
//!
//! The ball is steered directly by the paddle buttons, checked in this fixed
//! order (first pressed wins):
//!
//! | Button      | Steer   | Velocity   |
//! |-------------|---------|------------|
//! | right up    | `Up`    | (0, +1)    |
//! | right down  | `Down`  | (0, −1)    |
//! | left down   | `Right` | (−1, 0)    |
//! | left up     | `Left`  | (+1, 0)    |
//! | none        | `Idle`  | unchanged  |
//!
//! Note the mapping is crossed: `Up` moves the ball down the screen and
//! `Right` moves it towards column 1. This is the established behavior of the
//! game and is kept as is.

use crate::playfield::{Side, Velocity};

/// A snapshot of the four buttons.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    pub left_up: bool,
    pub left_down: bool,
    pub right_up: bool,
    pub right_down: bool,
}

/// Source of button snapshots. Polled, never interrupt driven.
pub trait Buttons {
    fn read(&self) -> ButtonState;
}

/// Ball steering command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Steer {
    Up,
    Down,
    Left,
    Right,
    Idle,
}

impl Steer {
    /// The velocity this command selects; `None` keeps the current one.
    pub const fn velocity(self) -> Option<Velocity> {
        match self {
            Steer::Up => Some(Velocity::SOUTH),
            Steer::Down => Some(Velocity::NORTH),
            Steer::Right => Some(Velocity::WEST),
            Steer::Left => Some(Velocity::EAST),
            Steer::Idle => None,
        }
    }
}

/// Paddle movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaddleMove {
    Up,
    Down,
    Hold,
}

impl PaddleMove {
    /// Row delta; up is towards row 1.
    pub const fn rows(self) -> i32 {
        match self {
            PaddleMove::Up => -1,
            PaddleMove::Down => 1,
            PaddleMove::Hold => 0,
        }
    }
}

impl ButtonState {
    /// Decode the ball steering command.
    pub const fn steer(self) -> Steer {
        if self.right_up {
            Steer::Up
        } else if self.right_down {
            Steer::Down
        } else if self.left_down {
            Steer::Right
        } else if self.left_up {
            Steer::Left
        } else {
            Steer::Idle
        }
    }

    /// Decode the movement of one paddle from its own two buttons. Pressing
    /// both cancels out.
    pub const fn paddle(self, side: Side) -> PaddleMove {
        let (up, down) = match side {
            Side::Left => (self.left_up, self.left_down),
            Side::Right => (self.right_up, self.right_down),
        };
        match (up, down) {
            (true, false) => PaddleMove::Up,
            (false, true) => PaddleMove::Down,
            _ => PaddleMove::Hold,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
