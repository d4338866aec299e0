//! # Playfield
//!
//! Ball and paddle state. Each value is owned by exactly one task and never
//! shared; the only thing the tasks have in common is the screen.

use crate::config::{
    BALL_X_START, BALL_Y_START, PADDLE_LEFT_X, PADDLE_LENGTH, PADDLE_RIGHT_X, PADDLE_Y_MAX,
    PADDLE_Y_START, SCREEN_Y_START,
};

/// A terminal cell, column `x` and row `y`. Rows grow downwards.
///
/// A position may lie off-screen; the renderer refuses to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell one step along `velocity`.
    pub const fn step(self, velocity: Velocity) -> Self {
        Self {
            x: self.x.saturating_add(velocity.dx as i32),
            y: self.y.saturating_add(velocity.dy as i32),
        }
    }
}

/// One-cell-per-tick motion along exactly one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Velocity {
    dx: i8,
    dy: i8,
}

impl Velocity {
    /// Towards higher columns.
    pub const EAST: Velocity = Velocity { dx: 1, dy: 0 };
    /// Towards lower columns.
    pub const WEST: Velocity = Velocity { dx: -1, dy: 0 };
    /// Towards higher rows (down the screen).
    pub const SOUTH: Velocity = Velocity { dx: 0, dy: 1 };
    /// Towards lower rows (up the screen).
    pub const NORTH: Velocity = Velocity { dx: 0, dy: -1 };

    pub const fn dx(self) -> i8 {
        self.dx
    }

    pub const fn dy(self) -> i8 {
        self.dy
    }
}

/// The ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ball {
    pub position: Position,
    pub velocity: Velocity,
}

impl Ball {
    /// A ball at the screen centre, moving east.
    pub const fn new() -> Self {
        Self {
            position: Position::new(BALL_X_START, BALL_Y_START),
            velocity: Velocity::EAST,
        }
    }

    /// Move one step. There is no collision handling: the ball may leave the
    /// screen.
    pub fn advance(&mut self) {
        self.position = self.position.step(self.velocity);
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

/// Which side of the screen a paddle guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const fn column(self) -> i32 {
        match self {
            Side::Left => PADDLE_LEFT_X,
            Side::Right => PADDLE_RIGHT_X,
        }
    }
}

/// A vertical paddle of `PADDLE_LENGTH` cells. `top` is its upper cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Paddle {
    side: Side,
    top: i32,
}

impl Paddle {
    pub const fn new(side: Side) -> Self {
        Self {
            side,
            top: PADDLE_Y_START,
        }
    }

    /// A paddle with its top cell at `top`, clamped on-screen.
    pub const fn at(side: Side, top: i32) -> Self {
        Self {
            side,
            top: clamp_top(top),
        }
    }

    pub const fn side(self) -> Side {
        self.side
    }

    pub const fn top(self) -> i32 {
        self.top
    }

    /// Reference point: the top cell.
    pub const fn position(self) -> Position {
        Position::new(self.side.column(), self.top)
    }

    /// Move the paddle by `rows` (negative is up), keeping every cell on-screen.
    pub fn shift(&mut self, rows: i32) {
        self.top = clamp_top(self.top.saturating_add(rows));
    }

    /// The cells the paddle occupies, top to bottom.
    pub fn cells(self) -> impl Iterator<Item = Position> {
        let x = self.side.column();
        (self.top..self.top + PADDLE_LENGTH).map(move |y| Position::new(x, y))
    }
}

const fn clamp_top(top: i32) -> i32 {
    if top < SCREEN_Y_START {
        SCREEN_Y_START
    } else if top > PADDLE_Y_MAX {
        PADDLE_Y_MAX
    } else {
        top
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
