//! # Ball Task
//!
//! Every `BALL_PERIOD_MS` the ball is erased, steered by whatever button is
//! held, moved one cell and drawn again. With no button held it keeps its
//! direction. There are no walls: a ball steered off the edge keeps going and
//! its draws are silently refused by the renderer until it is steered back.

use crate::config::{BALL_GLYPH, BALL_PERIOD_MS, BLANK_GLYPH};
use crate::input::Buttons;
use crate::kernel::Kernel;
use crate::playfield::{Ball, Position};
use crate::screen::{Screen, Terminal};
use crate::sync::Backoff;

/// State owned by the ball task.
pub struct BallTask {
    ball: Ball,
}

impl BallTask {
    /// A ball at the screen centre moving east.
    pub const fn new() -> Self {
        Self { ball: Ball::new() }
    }

    pub const fn with_ball(ball: Ball) -> Self {
        Self { ball }
    }

    pub fn ball(&self) -> Ball {
        self.ball
    }

    /// Draw the ball where it currently is.
    pub fn draw<T: Terminal, B: Backoff>(&self, screen: &Screen<T, B>) {
        draw_at(screen, self.ball.position, BALL_GLYPH);
    }

    /// One tick without the delay: erase, steer, move, draw.
    pub fn tick<T, B, I>(&mut self, screen: &Screen<T, B>, buttons: &I)
    where
        T: Terminal,
        B: Backoff,
        I: Buttons,
    {
        draw_at(screen, self.ball.position, BLANK_GLYPH);

        if let Some(velocity) = buttons.read().steer().velocity() {
            self.ball.velocity = velocity;
        }
        self.ball.advance();

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
        info!("ball task started");
        self.draw(screen);
        loop {
            kernel.delay_ms(BALL_PERIOD_MS);
            self.tick(screen, buttons);
        }
    }
}

impl Default for BallTask {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_at<T: Terminal, B: Backoff>(screen: &Screen<T, B>, at: Position, glyph: u8) {
    if let Err(e) = screen.write_char(at.x, at.y, glyph) {
        trace!("ball draw skipped: {}", e);
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ButtonState;
    use crate::playfield::Velocity;
    use core::cell::Cell;

    #[derive(Default)]
    struct Recorder(Vec<u8>);

    impl Terminal for Recorder {
        fn write_byte(&mut self, byte: u8) {
            self.0.push(byte);
        }
    }

    struct Held(Cell<ButtonState>);

    impl Buttons for Held {
        fn read(&self) -> ButtonState {
            self.0.get()
        }
    }

    fn idle() -> Held {
        Held(Cell::new(ButtonState::default()))
    }

    #[test_log::test]
    fn test_idle_tick_erases_then_draws_one_cell_east() {
        let screen: Screen<Recorder> = Screen::new(Recorder::default());
        let mut task = BallTask::new();
        assert_eq!(task.ball().position, Position::new(40, 12));

        task.tick(&screen, &idle());

        assert_eq!(task.ball().position, Position::new(41, 12));
        assert_eq!(screen.into_inner().0, b"\x1b[12;40H \x1b[12;41H*");
    }

    #[test]
    fn test_idle_keeps_velocity() {
        let screen: Screen<Recorder> = Screen::new(Recorder::default());
        let mut task = BallTask::with_ball(Ball {
            position: Position::new(10, 10),
            velocity: Velocity::NORTH,
        });
        for _ in 0..3 {
            task.tick(&screen, &idle());
            assert_eq!(task.ball().velocity, Velocity::NORTH);
        }
        assert_eq!(task.ball().position, Position::new(10, 7));
    }

    #[test]
    fn test_button_changes_direction_before_moving() {
        let screen: Screen<Recorder> = Screen::new(Recorder::default());
        let mut task = BallTask::new();
        let buttons = Held(Cell::new(ButtonState {
            right_up: true,
            ..ButtonState::default()
        }));

        task.tick(&screen, &buttons);
        assert_eq!(task.ball().velocity, Velocity::SOUTH);
        assert_eq!(task.ball().position, Position::new(40, 13));

        // Direction persists once the button is released
        buttons.0.set(ButtonState::default());
        task.tick(&screen, &buttons);
        assert_eq!(task.ball().position, Position::new(40, 14));
    }

    #[test]
    fn test_left_down_sends_ball_west() {
        let screen: Screen<Recorder> = Screen::new(Recorder::default());
        let mut task = BallTask::new();
        let buttons = Held(Cell::new(ButtonState {
            left_down: true,
            ..ButtonState::default()
        }));
        task.tick(&screen, &buttons);
        assert_eq!(task.ball().position, Position::new(39, 12));
    }

    #[test]
    fn test_off_screen_ball_draws_nothing() {
        let screen: Screen<Recorder> = Screen::new(Recorder::default());
        let mut task = BallTask::with_ball(Ball {
            position: Position::new(81, 12),
            velocity: Velocity::EAST,
        });
        task.tick(&screen, &idle());
        assert_eq!(task.ball().position, Position::new(82, 12));
        assert!(screen.into_inner().0.is_empty());
    }

    #[test]
    fn test_ball_leaving_the_edge_erases_last_visible_cell() {
        let screen: Screen<Recorder> = Screen::new(Recorder::default());
        let mut task = BallTask::with_ball(Ball {
            position: Position::new(80, 12),
            velocity: Velocity::EAST,
        });
        task.tick(&screen, &idle());
        assert_eq!(screen.into_inner().0, b"\x1b[12;80H ");
    }
}
