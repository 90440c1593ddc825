//! Scripted gamepad.
//!
//! Replays a fixed sequence of input frames, then neutral frames forever.
//! Edge semantics are the script author's responsibility: a new-press flag
//! set in two consecutive frames means two distinct presses.

use std::collections::VecDeque;

use otis_common::devices::{Gamepad, PadFrame};

/// Gamepad that replays a pre-recorded frame script.
pub struct ScriptedPad {
    frames: VecDeque<PadFrame>,
}

impl ScriptedPad {
    pub fn from_frames(frames: impl IntoIterator<Item = PadFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Frames left before the pad goes neutral.
    pub fn frames_remaining(&self) -> usize {
        self.frames.len()
    }
}

impl Gamepad for ScriptedPad {
    fn sample(&mut self) -> PadFrame {
        self.frames.pop_front().unwrap_or_else(PadFrame::neutral)
    }
}
