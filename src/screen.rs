//! # Terminal Renderer
//!
//! Turns grid coordinates and glyphs into a VT100 escape-sequence byte
//! stream for a [`Terminal`].
//!
//! ## Protocol
//!
//! | Operation   | Bytes                       |
//! |-------------|-----------------------------|
//! | clear       | `ESC c`                     |
//! | cursor hide | `ESC [ ? 2 5 l`             |
//! | cursor show | `ESC [ ? 2 5 h`             |
//! | move        | `ESC [ r r ; c c H`         |
//!
//! Row and column are always sent as exactly two ASCII digits. A coordinate
//! of 100 or more would corrupt the sequence, which is why every drawing
//! operation rejects cells outside the screen instead of clamping them.
//!
//! Every public operation holds the screen lock for its whole byte sequence,
//! so a preempting task can never move the cursor between another task's
//! move and write.

use crate::config::{SCREEN_X_END, SCREEN_X_START, SCREEN_Y_END, SCREEN_Y_START};
use crate::error::ScreenError;
use crate::sync::{Backoff, ScreenLock, Spin};

const ESC: u8 = 0x1B;

/// `ESC c`
pub const CLEAR: [u8; 2] = [ESC, b'c'];

/// `ESC [ ? 2 5 l`
pub const CURSOR_HIDE: [u8; 6] = [ESC, b'[', b'?', b'2', b'5', b'l'];

/// `ESC [ ? 2 5 h`
pub const CURSOR_SHOW: [u8; 6] = [ESC, b'[', b'?', b'2', b'5', b'h'];

/// Byte sink the renderer draws on. On the board this is the UART transmit
/// path; transmission cannot fail.
pub trait Terminal {
    fn write_byte(&mut self, byte: u8);

    fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Two ASCII decimal digits, zero-padded. Only meaningful for 0–99.
pub const fn two_digits(n: u8) -> [u8; 2] {
    [b'0' + n / 10, b'0' + n % 10]
}

/// Three ASCII decimal digits, zero-padded. Values above 999 are reduced
/// modulo 1000.
pub const fn three_digits(n: u16) -> [u8; 3] {
    let n = n % 1000;
    [
        b'0' + (n / 100) as u8,
        b'0' + (n % 100 / 10) as u8,
        b'0' + (n % 10) as u8,
    ]
}

/// `ESC [ <row> ; <col> H` for column `x`, row `y`.
pub const fn cursor_sequence(x: u8, y: u8) -> [u8; 8] {
    let row = two_digits(y);
    let col = two_digits(x);
    [ESC, b'[', row[0], row[1], b';', col[0], col[1], b'H']
}

/// Whether a cell may be drawn on.
pub const fn in_bounds(x: i32, y: i32) -> bool {
    x >= SCREEN_X_START && x <= SCREEN_X_END && y >= SCREEN_Y_START && y <= SCREEN_Y_END
}

/// Validate a cell and narrow it to the two-digit range the protocol carries.
fn checked_cell(x: i32, y: i32) -> Result<(u8, u8), ScreenError> {
    if in_bounds(x, y) {
        // In bounds implies 0..100, see the config invariants.
        Ok((x as u8, y as u8))
    } else {
        Err(ScreenError::OutOfBounds { x, y })
    }
}

// ---------------------------------------------------------------------------
// Pen: drawing under a held lock
// ---------------------------------------------------------------------------

/// Drawing handle valid for one lock hold. Obtained through
/// [`Screen::block`] when several fields must be written atomically.
pub struct Pen<'a, T> {
    terminal: &'a mut T,
}

impl<T: Terminal> Pen<'_, T> {
    /// Emit a cursor move without any bounds check.
    pub fn move_cursor(&mut self, x: u8, y: u8) {
        self.terminal.write_bytes(&cursor_sequence(x, y));
    }

    /// Write raw bytes at the current cursor position.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.terminal.write_bytes(bytes);
    }

    pub fn write_char(&mut self, x: i32, y: i32, c: u8) -> Result<(), ScreenError> {
        let (x, y) = checked_cell(x, y)?;
        self.move_cursor(x, y);
        self.terminal.write_byte(c);
        Ok(())
    }

    pub fn write_number(&mut self, x: i32, y: i32, n: u8) -> Result<(), ScreenError> {
        let (x, y) = checked_cell(x, y)?;
        self.move_cursor(x, y);
        self.terminal.write_bytes(&two_digits(n));
        Ok(())
    }

    pub fn write_number3(&mut self, x: i32, y: i32, n: u16) -> Result<(), ScreenError> {
        let (x, y) = checked_cell(x, y)?;
        self.move_cursor(x, y);
        self.terminal.write_bytes(&three_digits(n));
        Ok(())
    }

    /// Write `s` left to right from (x, y). Both the first and the last cell
    /// must be on-screen; there is no wrapping.
    pub fn write_str(&mut self, x: i32, y: i32, s: &str) -> Result<(), ScreenError> {
        let len = s.len() as i32;
        let (cx, cy) = checked_cell(x, y)?;
        if len > 0 {
            checked_cell(x + len - 1, y)?;
        }
        self.move_cursor(cx, cy);
        self.terminal.write_bytes(s.as_bytes());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// The shared renderer. One instance per terminal; tasks share it by
/// reference.
pub struct Screen<T, B = Spin> {
    terminal: ScreenLock<T, B>,
}

impl<T, B> Screen<T, B> {
    pub const fn new(terminal: T) -> Self {
        Self {
            terminal: ScreenLock::new(terminal),
        }
    }

    /// Whether a draw is in progress.
    pub fn is_busy(&self) -> bool {
        self.terminal.is_locked()
    }

    /// Give the terminal back, e.g. to inspect what was drawn.
    pub fn into_inner(self) -> T {
        self.terminal.into_inner()
    }
}

impl<T: Terminal, B: Backoff> Screen<T, B> {
    /// Hide the cursor, then clear the screen.
    pub fn init(&self) {
        let mut terminal = self.terminal.lock();
        terminal.write_bytes(&CURSOR_HIDE);
        terminal.write_bytes(&CLEAR);
    }

    pub fn clear(&self) {
        self.terminal.lock().write_bytes(&CLEAR);
    }

    pub fn cursor_show(&self) {
        self.terminal.lock().write_bytes(&CURSOR_SHOW);
    }

    pub fn cursor_hide(&self) {
        self.terminal.lock().write_bytes(&CURSOR_HIDE);
    }

    /// Emit a cursor move. No bounds enforcement at this layer.
    pub fn move_cursor(&self, x: u8, y: u8) {
        self.terminal.lock().write_bytes(&cursor_sequence(x, y));
    }

    /// Draw one glyph. Out-of-bounds cells are rejected before the lock is
    /// taken and nothing reaches the terminal.
    pub fn write_char(&self, x: i32, y: i32, c: u8) -> Result<(), ScreenError> {
        checked_cell(x, y)?;
        self.block(|pen| pen.write_char(x, y, c))
    }

    /// Draw a two-digit number (0–99).
    pub fn write_number(&self, x: i32, y: i32, n: u8) -> Result<(), ScreenError> {
        checked_cell(x, y)?;
        self.block(|pen| pen.write_number(x, y, n))
    }

    /// Draw a three-digit number (0–999).
    pub fn write_number3(&self, x: i32, y: i32, n: u16) -> Result<(), ScreenError> {
        checked_cell(x, y)?;
        self.block(|pen| pen.write_number3(x, y, n))
    }

    /// Draw a horizontal run of text.
    pub fn write_str(&self, x: i32, y: i32, s: &str) -> Result<(), ScreenError> {
        self.block(|pen| pen.write_str(x, y, s))
    }

    /// Run `f` with the screen locked for its whole duration.
    pub fn block<R>(&self, f: impl FnOnce(&mut Pen<'_, T>) -> R) -> R {
        let mut terminal = self.terminal.lock();
        let mut pen = Pen {
            terminal: &mut *terminal,
        };
        f(&mut pen)
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        bytes: Vec<u8>,
        writes: usize,
    }

    impl Terminal for Recorder {
        fn write_byte(&mut self, byte: u8) {
            self.bytes.push(byte);
        }

        fn write_bytes(&mut self, bytes: &[u8]) {
            self.writes += 1;
            self.bytes.extend_from_slice(bytes);
        }
    }

    fn screen() -> Screen<Recorder> {
        Screen::new(Recorder::default())
    }

    #[test]
    fn test_move_cursor_sequence() {
        let screen = screen();
        screen.move_cursor(13, 12);
        assert_eq!(screen.into_inner().bytes, b"\x1b[12;13H");
    }

    #[test]
    fn test_single_digit_coordinates_are_zero_padded() {
        assert_eq!(cursor_sequence(3, 2), *b"\x1b[02;03H");
    }

    #[test]
    fn test_init_hides_then_clears() {
        let screen = screen();
        screen.init();
        let recorder = screen.into_inner();
        assert_eq!(recorder.writes, 2);
        assert_eq!(recorder.bytes, b"\x1b[?25l\x1bc");
    }

    #[test]
    fn test_cursor_show_and_clear() {
        let screen = screen();
        screen.cursor_show();
        screen.clear();
        assert_eq!(screen.into_inner().bytes, b"\x1b[?25h\x1bc");
    }

    #[test]
    fn test_write_char_moves_then_writes() {
        let screen = screen();
        screen.write_char(41, 12, b'*').unwrap();
        assert_eq!(screen.into_inner().bytes, b"\x1b[12;41H*");
    }

    #[test]
    fn test_write_number_two_digits() {
        let screen = screen();
        screen.write_number(3, 3, 7).unwrap();
        assert_eq!(screen.into_inner().bytes, b"\x1b[03;03H07");
    }

    #[test]
    fn test_write_number3_three_digits() {
        let screen = screen();
        screen.write_number3(40, 3, 42).unwrap();
        screen.write_number3(40, 4, 999).unwrap();
        assert_eq!(screen.into_inner().bytes, b"\x1b[03;40H042\x1b[04;40H999");
    }

    #[test]
    fn test_three_digits_wraps_above_999() {
        assert_eq!(three_digits(1234), *b"234");
    }

    #[test]
    fn test_screen_corners_are_drawable() {
        let screen = screen();
        for (x, y) in [(1, 1), (80, 1), (1, 25), (80, 25)] {
            assert!(screen.write_char(x, y, b'+').is_ok());
        }
    }

    #[test]
    fn test_out_of_bounds_writes_nothing() {
        let screen = screen();
        for (x, y) in [(0, 1), (81, 1), (1, 0), (1, 26), (-5, 12), (100, 100)] {
            assert_eq!(
                screen.write_char(x, y, b'*'),
                Err(ScreenError::OutOfBounds { x, y })
            );
            assert_eq!(
                screen.write_number(x, y, 1),
                Err(ScreenError::OutOfBounds { x, y })
            );
        }
        let recorder = screen.into_inner();
        assert!(recorder.bytes.is_empty());
        assert_eq!(recorder.writes, 0);
    }

    #[test]
    fn test_write_str_rejects_overflowing_run() {
        let screen = screen();
        assert_eq!(
            screen.write_str(78, 1, "PONG"),
            Err(ScreenError::OutOfBounds { x: 81, y: 1 })
        );
        assert!(screen.write_str(77, 1, "PONG").is_ok());
        assert_eq!(screen.into_inner().bytes, b"\x1b[01;77HPONG");
    }

    #[test]
    fn test_block_writes_fields_in_one_hold() {
        let screen = screen();
        screen.block(|pen| {
            assert!(pen.write_number(40, 2, 4).is_ok());
            assert!(pen.write_number3(40, 3, 12).is_ok());
        });
        assert!(!screen.is_busy());
        assert_eq!(screen.into_inner().bytes, b"\x1b[02;40H04\x1b[03;40H012");
    }

    #[test]
    fn test_lock_is_held_during_block() {
        let screen = screen();
        let busy = screen.block(|_| screen.is_busy());
        assert!(busy);
    }
}
