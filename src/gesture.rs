//! Gesture labels recognised by the classifier.

use std::fmt;

/// A Makaton sign recognised from a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// All fingers spread away from the thumb
    Hello,
    /// All fingertips clustered at the thumb
    Goodbye,
    /// Thumb tucked in and above the wrist
    Please,
    /// Thumb tucked in and below the wrist
    ThankYou,
    /// Thumb left of the index fingertip
    Yes,
}

impl Gesture {
    /// Every gesture, in rule order
    pub const ALL: [Self; 5] = [Self::Hello, Self::Goodbye, Self::Please, Self::ThankYou, Self::Yes];

    /// Label shown to the user
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hello => "Hello",
            Self::Goodbye => "Goodbye",
            Self::Please => "Please",
            Self::ThankYou => "Thank You",
            Self::Yes => "Yes",
        }
    }

    /// How the sign is performed
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Hello => "Open hand, palm facing forward, all fingers extended.",
            Self::Goodbye => "Open hand, palm facing forward, moving fingers as if waving.",
            Self::Please => "Flat hand, palm facing up, moving in a small circular motion.",
            Self::ThankYou => "Flat hand, palm facing up, moving away from the chin.",
            Self::Yes => "Fist with thumb up.",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Label and description for a frame result, `("None", "None")` when nothing matched
#[must_use]
pub fn describe(gesture: Option<Gesture>) -> (&'static str, &'static str) {
    gesture.map_or(("None", "None"), |g| (g.name(), g.description()))
}
