//! Several drawers hammering one screen from OS threads. Each thread owns one
//! row and one glyph; any interleaving inside a draw shows up as a frame with
//! the wrong glyph for its row, or as a malformed frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rtpong::screen::{Screen, Terminal};

const DRAWERS: u8 = 4;
const DRAWS: i32 = 400;
const FRAME_LEN: usize = 9;

/// Hands the processor away after every byte to widen the race window, and
/// fails if two writers are ever inside it at once.
#[derive(Default)]
struct SlowWire {
    bytes: Vec<u8>,
    inside: AtomicBool,
}

impl Terminal for SlowWire {
    fn write_byte(&mut self, byte: u8) {
        assert!(
            !self.inside.swap(true, Ordering::SeqCst),
            "terminal entered twice"
        );
        self.bytes.push(byte);
        thread::yield_now();
        self.inside.store(false, Ordering::SeqCst);
    }
}

fn digits(pair: &[u8]) -> i32 {
    assert!(pair.iter().all(u8::is_ascii_digit), "not digits: {pair:?}");
    i32::from(pair[0] - b'0') * 10 + i32::from(pair[1] - b'0')
}

#[test_log::test]
fn test_draws_from_many_threads_never_interleave() {
    let screen: Screen<SlowWire> = Screen::new(SlowWire::default());

    thread::scope(|scope| {
        for drawer in 0..DRAWERS {
            let screen = &screen;
            scope.spawn(move || {
                let row = i32::from(drawer) + 1;
                let glyph = b'a' + drawer;
                for n in 0..DRAWS {
                    screen.write_char(n % 80 + 1, row, glyph).unwrap();
                }
            });
        }
    });

    assert!(!screen.is_busy());
    let bytes = screen.into_inner().bytes;
    assert_eq!(bytes.len(), FRAME_LEN * DRAWS as usize * DRAWERS as usize);

    for frame in bytes.chunks(FRAME_LEN) {
        assert_eq!(&frame[..2], b"\x1b[");
        assert_eq!(frame[4], b';');
        assert_eq!(frame[7], b'H');
        let row = digits(&frame[2..4]);
        let col = digits(&frame[5..7]);
        assert!((1..=80).contains(&col));
        assert_eq!(frame[8], b'a' + (row - 1) as u8, "row {row} has a foreign glyph");
    }
}

#[test]
fn test_block_keeps_multi_field_update_together() {
    let screen: Screen<SlowWire> = Screen::new(SlowWire::default());

    thread::scope(|scope| {
        scope.spawn(|| {
            for n in 0..100u8 {
                screen.block(|pen| {
                    pen.write_number(40, 2, n % 100).unwrap();
                    pen.write_number3(40, 3, u16::from(n)).unwrap();
                });
            }
        });
        scope.spawn(|| {
            for n in 0..200 {
                screen.write_char(n % 80 + 1, 20, b'*').unwrap();
            }
        });
    });

    // Every status update is 8 + 2 + 8 + 3 bytes with nothing in between.
    let bytes = screen.into_inner().bytes;
    let mut rest = bytes.as_slice();
    let mut status = 0;
    while !rest.is_empty() {
        if rest.starts_with(b"\x1b[02;40H") {
            assert!(rest[10..].starts_with(b"\x1b[03;40H"));
            rest = &rest[21..];
            status += 1;
        } else {
            assert!(rest.starts_with(b"\x1b[20;"));
            assert_eq!(rest[8], b'*');
            rest = &rest[FRAME_LEN..];
        }
    }
    assert_eq!(status, 100);
}
