//! What happens after an item has been decided.

use super::state::ReviewMode;

/// Next step once an item is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Ask the moderator whether to take the next item from the same queue.
    OfferAnother { remaining: usize },
    /// End the session. `remaining` items are still queued.
    Finish { remaining: usize },
}

impl Continuation {
    /// Manual reviews offer the next item while the queue has work; assisted
    /// reviews always finish and leave the next item for a new keyword.
    pub fn decide(mode: ReviewMode, remaining: usize) -> Self {
        if !mode.assisted && remaining > 0 {
            Self::OfferAnother { remaining }
        } else {
            Self::Finish { remaining }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_covers_every_mode() {
        for mode in [
            ReviewMode::MANUAL,
            ReviewMode::DETECTED,
            ReviewMode::MANUAL_ASSISTED,
            ReviewMode::DETECTED_ASSISTED,
        ] {
            assert_eq!(
                Continuation::decide(mode, 0),
                Continuation::Finish { remaining: 0 },
                "{mode}"
            );
            let expected = if mode.assisted {
                Continuation::Finish { remaining: 2 }
            } else {
                Continuation::OfferAnother { remaining: 2 }
            };
            assert_eq!(Continuation::decide(mode, 2), expected, "{mode}");
        }
    }
}
