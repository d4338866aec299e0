//! # Paddle Tasks
//!
//! One task per side. Each tick the paddle is erased, moved one row if its
//! up or down button is held (never leaving the screen), and redrawn. The
//! paddle is redrawn even when it did not move, which also repairs cells the
//! ball has wiped while passing through.

use crate::config::{BLANK_GLYPH, PADDLE_GLYPH, PADDLE_PERIOD_MS};
use crate::input::Buttons;
use crate::kernel::Kernel;
use crate::playfield::{Paddle, Side};
use crate::screen::{Screen, Terminal};
use crate::sync::Backoff;

/// State owned by one paddle task.
pub struct PaddleTask {
    paddle: Paddle,
}

impl PaddleTask {
    pub const fn new(side: Side) -> Self {
        Self {
            paddle: Paddle::new(side),
        }
    }

    pub const fn with_paddle(paddle: Paddle) -> Self {
        Self { paddle }
    }

    pub fn paddle(&self) -> Paddle {
        self.paddle
    }

    /// Draw every cell of the paddle.
    pub fn draw<T: Terminal, B: Backoff>(&self, screen: &Screen<T, B>) {
        paint(screen, self.paddle, PADDLE_GLYPH);
    }

    /// One tick without the delay: erase, read buttons, move, draw.
    pub fn tick<T, B, I>(&mut self, screen: &Screen<T, B>, buttons: &I)
    where
        T: Terminal,
        B: Backoff,
        I: Buttons,
    {
        paint(screen, self.paddle, BLANK_GLYPH);

        let step = buttons.read().paddle(self.paddle.side());
        self.paddle.shift(step.rows());

        self.draw(screen);
    }

    /// The task body. Never returns.
    pub fn run<K, T, B, I>(mut self, kernel: &K, screen: &Screen<T, B>, buttons: &I) -> !
    where
        K: Kernel,
        T: Terminal,
        B: Backoff,
        I: Buttons,
    {
        info!("paddle task started, column {}", self.paddle.side().column());
        self.draw(screen);
        loop {
            kernel.delay_ms(PADDLE_PERIOD_MS);
            self.tick(screen, buttons);
        }
    }
}

/// One locked write per cell, so a higher-priority task can still get a cell
/// in between.
fn paint<T: Terminal, B: Backoff>(screen: &Screen<T, B>, paddle: Paddle, glyph: u8) {
    for cell in paddle.cells() {
        // Paddles are clamped on-screen; a refusal would be a geometry bug.
        if let Err(e) = screen.write_char(cell.x, cell.y, glyph) {
            warn!("paddle draw refused: {}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
