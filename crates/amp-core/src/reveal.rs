//! One-shot reveal latch.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealState {
    #[default]
    Hidden,
    Revealed,
}

/// Tracks whether a window instance has been shown after its first
/// correctly-sized layout. Hidden -> Revealed happens at most once.
#[derive(Debug, Default)]
pub struct RevealGate {
    state: RevealState,
}

impl RevealGate {
    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn is_revealed(&self) -> bool {
        self.state == RevealState::Revealed
    }

    /// Open the gate. Returns `true` only for the call that performed the
    /// transition.
    pub fn open(&mut self) -> bool {
        match self.state {
            RevealState::Hidden => {
                self.state = RevealState::Revealed;
                true
            }
            RevealState::Revealed => false,
        }
    }
}
