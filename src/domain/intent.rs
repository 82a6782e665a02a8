/// Intents: the discrete actions a host submits once per movement tick.

use std::fmt;
use std::str::FromStr;

use crate::error::IntentError;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    /// Place or destroy stardust in the facing cell.
    PlaceOrDestroy,
    /// Same, but aimed one row below the player instead of beside.
    PlaceOrDestroyDown,
    /// Raise a green stardust platform under the player, or retract it.
    RaiseGreenStardust,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::MoveLeft,
        Intent::MoveRight,
        Intent::PlaceOrDestroy,
        Intent::PlaceOrDestroyDown,
        Intent::RaiseGreenStardust,
    ];

    /// Stable textual tag, used by config files.
    pub fn tag(self) -> &'static str {
        match self {
            Intent::MoveLeft => "move_left",
            Intent::MoveRight => "move_right",
            Intent::PlaceOrDestroy => "place_or_destroy",
            Intent::PlaceOrDestroyDown => "place_or_destroy_down",
            Intent::RaiseGreenStardust => "raise_green_stardust",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Intent {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Intent::ALL
            .into_iter()
            .find(|i| i.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| IntentError::Unrecognized(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_back() {
        for intent in Intent::ALL {
            assert_eq!(intent.tag().parse::<Intent>(), Ok(intent));
        }
        assert_eq!(" Move_Left ".parse::<Intent>(), Ok(Intent::MoveLeft));
    }

    #[test]
    fn unknown_tag_is_an_error() {
        assert_eq!(
            "jump".parse::<Intent>(),
            Err(IntentError::Unrecognized("jump".to_string()))
        );
    }
}
