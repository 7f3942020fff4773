use alloc::string::String;

/// Typed sequence that shows every mine for one frame.
pub const CHEAT_CODE: &str = "cheat";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CheatProgress {
    /// The character does not continue the code; the accumulator was cleared.
    Rejected,
    /// The typed characters so far are a strict prefix of the code.
    Pending,
    /// The code was completed; the accumulator was cleared.
    Matched,
}

impl CheatProgress {
    /// Whether the key that produced this progress was taken by the detector.
    pub const fn consumed(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Prefix-matching accumulator for a secret code typed among regular key presses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheatDetector {
    code: &'static str,
    typed: String,
}

impl CheatDetector {
    pub fn new(code: &'static str) -> Self {
        Self {
            code,
            typed: String::new(),
        }
    }

    pub fn feed(&mut self, ch: char) -> CheatProgress {
        self.typed.extend(ch.to_lowercase());

        if !self.code.starts_with(self.typed.as_str()) {
            self.typed.clear();
            CheatProgress::Rejected
        } else if self.typed.len() == self.code.len() {
            self.typed.clear();
            CheatProgress::Matched
        } else {
            CheatProgress::Pending
        }
    }

    pub fn reset(&mut self) {
        self.typed.clear();
    }
}

impl Default for CheatDetector {
    fn default() -> Self {
        Self::new(CHEAT_CODE)
    }
}
