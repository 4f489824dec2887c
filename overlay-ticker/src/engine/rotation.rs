use log::*;
use std::fmt::{Display, Formatter};
use ticker_common::{game::GameRecord, timing::WINDOW_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStep {
    /// The old window is fading out; the cursor has not moved yet
    FadingOut,
    /// The cursor has moved and the new window is fading in
    FadingIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationState {
    #[default]
    Stable,
    Transitioning(TransitionStep),
}

impl Display for RotationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stable => write!(f, "Stable"),
            Self::Transitioning(TransitionStep::FadingOut) => write!(f, "Fading Out"),
            Self::Transitioning(TransitionStep::FadingIn) => write!(f, "Fading In"),
        }
    }
}

/// Tracks which slice of the roster is on screen and walks it through the
/// fade-out, swap, fade-in choreography.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rotation {
    cursor: usize,
    state: RotationState,
}

impl Rotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    /// Starts a rotation cycle. Returns `false` if there is nothing to rotate
    /// to, or if a cycle is already underway.
    pub fn begin(&mut self, roster_len: usize) -> bool {
        if roster_len <= WINDOW_SIZE {
            trace!("Only {roster_len} games, not rotating");
            return false;
        }
        if self.state != RotationState::Stable {
            debug!("Rotation requested while {}, ignoring", self.state);
            return false;
        }
        self.state = RotationState::Transitioning(TransitionStep::FadingOut);
        true
    }

    /// Moves the cursor to the next window. Only valid while fading out.
    pub fn swap(&mut self, roster_len: usize) -> bool {
        if self.state != RotationState::Transitioning(TransitionStep::FadingOut) {
            warn!("Rotation swap while {}, ignoring", self.state);
            return false;
        }

        if self.cursor >= roster_len {
            self.cursor = 0;
        }
        self.cursor += WINDOW_SIZE;
        if self.cursor >= roster_len {
            self.cursor = 0;
        }
        debug!("Ticker now starts at game #{}", self.cursor + 1);

        self.state = RotationState::Transitioning(TransitionStep::FadingIn);
        true
    }

    /// Finishes the cycle. Only valid while fading in.
    pub fn settle(&mut self) -> bool {
        if self.state != RotationState::Transitioning(TransitionStep::FadingIn) {
            warn!("Rotation settle while {}, ignoring", self.state);
            return false;
        }
        self.state = RotationState::Stable;
        true
    }

    /// The games currently on screen. Indices wrap around the end of the
    /// roster, so a roster shorter than the window shows some games twice.
    pub fn window<'a>(&self, games: &'a [GameRecord]) -> [Option<&'a GameRecord>; WINDOW_SIZE] {
        std::array::from_fn(|i| {
            if games.is_empty() {
                None
            } else {
                games.get((self.cursor + i) % games.len())
            }
        })
    }
}
