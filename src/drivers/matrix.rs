//! 5×5 addressable LED matrix animations.
//!
//! The matrix is a single WS2812 chain wired serpentine: even rows run
//! left to right, odd rows right to left.
//!
//! ```text
//!   row 0:  0  1  2  3  4
//!   row 1:  9  8  7  6  5
//!   row 2: 10 11 12 13 14
//!   row 3: 19 18 17 16 15
//!   row 4: 20 21 22 23 24
//! ```
//!
//! Animations are built in logical (row, column) space and mapped to chain
//! positions when the frame is assembled.  Every animation ends on a blank
//! frame.  Playback blocks on the supplied delay for the whole animation.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::drivers::led_patterns::Rgb;

pub const MATRIX_SIDE: usize = 5;
pub const MATRIX_PIXELS: usize = MATRIX_SIDE * MATRIX_SIDE;
/// Upper bound on frames in one animation.
pub const MAX_FRAMES: usize = 8;

/// One frame in chain order.
pub type Frame = [Rgb; MATRIX_PIXELS];
pub type Animation = Vec<Frame, MAX_FRAMES>;

const BLANK: Frame = [(0, 0, 0); MATRIX_PIXELS];

const SCAN_COLOUR: Rgb = (0, 24, 0);
const STARTUP_COLOUR: Rgb = (0, 80, 160);
const TRIP_COLOUR: Rgb = (160, 0, 0);

/// Named animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixPattern {
    /// Square growing out from the centre; played on arming.
    Startup,
    /// Full-panel red flashes; played on entry to critical stop.
    TripSignal,
    /// Column sweep right to left; played on each pass that counted cans.
    Scan,
}

impl MatrixPattern {
    /// Time each frame stays up.
    pub fn frame_interval_ms(self) -> u32 {
        match self {
            Self::Startup => 120,
            Self::TripSignal => 150,
            Self::Scan => 50,
        }
    }

    pub fn frames(self) -> Animation {
        let mut frames = Animation::new();
        match self {
            Self::Startup => {
                for radius in 0..=2 {
                    push(&mut frames, square(radius, STARTUP_COLOUR));
                }
            }
            Self::TripSignal => {
                for _ in 0..3 {
                    push(&mut frames, [TRIP_COLOUR; MATRIX_PIXELS]);
                    push(&mut frames, BLANK);
                }
                return frames;
            }
            Self::Scan => {
                for col in (0..MATRIX_SIDE).rev() {
                    push(&mut frames, column(col, SCAN_COLOUR));
                }
            }
        }
        push(&mut frames, BLANK);
        frames
    }

    /// Wall-clock length of the animation.
    pub fn duration_ms(self) -> u32 {
        self.frames().len() as u32 * self.frame_interval_ms()
    }
}

/// Chain position of a logical pixel.
pub fn chain_index(row: usize, col: usize) -> usize {
    if row % 2 == 0 {
        row * MATRIX_SIDE + col
    } else {
        row * MATRIX_SIDE + (MATRIX_SIDE - 1 - col)
    }
}

fn push(frames: &mut Animation, frame: Frame) {
    let pushed = frames.push(frame).is_ok();
    debug_assert!(pushed, "animation exceeds {MAX_FRAMES} frames");
}

fn column(col: usize, colour: Rgb) -> Frame {
    let mut frame = BLANK;
    for row in 0..MATRIX_SIDE {
        frame[chain_index(row, col)] = colour;
    }
    frame
}

fn square(radius: usize, colour: Rgb) -> Frame {
    let centre = MATRIX_SIDE / 2;
    let mut frame = BLANK;
    for row in centre - radius..=centre + radius {
        for col in centre - radius..=centre + radius {
            frame[chain_index(row, col)] = colour;
        }
    }
    frame
}

/// Sink for whole frames in chain order.
pub trait LedMatrix {
    fn write_frame(&mut self, frame: &Frame);
}

/// Play `pattern` on `matrix`, holding each frame for its interval.
pub fn play<M: LedMatrix>(matrix: &mut M, pattern: MatrixPattern, delay: &mut impl DelayNs) {
    let interval = pattern.frame_interval_ms();
    for frame in &pattern.frames() {
        matrix.write_frame(frame);
        delay.delay_ms(interval);
    }
}

// ── Host simulation matrix ───────────────────────────────────

/// In-memory matrix that keeps the last frame written.
#[derive(Debug)]
pub struct SimMatrix {
    last: Frame,
    frames_written: u32,
}

impl Default for SimMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl SimMatrix {
    pub fn new() -> Self {
        Self {
            last: BLANK,
            frames_written: 0,
        }
    }

    pub fn last_frame(&self) -> &Frame {
        &self.last
    }

    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    pub fn is_blank(&self) -> bool {
        self.last == BLANK
    }
}

impl LedMatrix for SimMatrix {
    fn write_frame(&mut self, frame: &Frame) {
        self.last = *frame;
        self.frames_written += 1;
    }
}
