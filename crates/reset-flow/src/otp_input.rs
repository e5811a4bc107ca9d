//! Four-slot OTP entry with focus hints for the presentation layer.

/// Number of digits in an OTP.
pub const OTP_LENGTH: usize = 4;

/// Where the presentation layer should move input focus after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusHint {
    /// Leave focus where it is.
    Stay,
    /// Move focus to the slot at this index.
    Focus(usize),
}

/// The OTP digits entered so far, one optional ASCII digit per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpDigits {
    slots: [Option<char>; OTP_LENGTH],
}

impl OtpDigits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the new contents of slot `index`.
    ///
    /// Only the last character typed is kept. Non-digit input is ignored.
    /// Filling a slot advances focus; emptying one retreats it.
    pub fn input(&mut self, index: usize, value: &str) -> FocusHint {
        if index >= OTP_LENGTH {
            return FocusHint::Stay;
        }

        match value.chars().last() {
            None => {
                self.slots[index] = None;
                retreat(index)
            }
            Some(c) if c.is_ascii_digit() => {
                self.slots[index] = Some(c);
                if index + 1 < OTP_LENGTH {
                    FocusHint::Focus(index + 1)
                } else {
                    FocusHint::Stay
                }
            }
            Some(_) => FocusHint::Stay,
        }
    }

    /// Backspace pressed in slot `index`: clears a filled slot, or moves back
    /// from an empty one.
    pub fn backspace(&mut self, index: usize) -> FocusHint {
        if index >= OTP_LENGTH {
            return FocusHint::Stay;
        }

        if self.slots[index].take().is_some() {
            FocusHint::Stay
        } else {
            retreat(index)
        }
    }

    /// Fill every slot from a pasted code. Anything other than exactly four
    /// digits is ignored and returns `None`.
    pub fn paste(&mut self, text: &str) -> Option<FocusHint> {
        let text = text.trim();
        if text.chars().count() != OTP_LENGTH || !text.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        for (slot, c) in self.slots.iter_mut().zip(text.chars()) {
            *slot = Some(c);
        }
        Some(FocusHint::Focus(OTP_LENGTH - 1))
    }

    /// The entered code, only once every slot is filled.
    pub fn code(&self) -> Option<String> {
        self.slots.iter().copied().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    /// Slot contents as strings, empty for unfilled slots.
    pub fn as_strings(&self) -> [String; OTP_LENGTH] {
        self.slots
            .map(|slot| slot.map(String::from).unwrap_or_default())
    }
}

fn retreat(index: usize) -> FocusHint {
    if index > 0 {
        FocusHint::Focus(index - 1)
    } else {
        FocusHint::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_entry_advances_focus() {
        let mut digits = OtpDigits::new();

        assert_eq!(digits.input(0, "1"), FocusHint::Focus(1));
        assert_eq!(digits.input(1, "2"), FocusHint::Focus(2));
        assert_eq!(digits.input(2, "3"), FocusHint::Focus(3));
        assert_eq!(digits.input(3, "4"), FocusHint::Stay);

        assert!(digits.is_complete());
        assert_eq!(digits.code(), Some("1234".into()));
    }

    #[test]
    fn test_incomplete_code() {
        let mut digits = OtpDigits::new();
        digits.input(0, "1");
        digits.input(1, "2");

        assert!(!digits.is_complete());
        assert_eq!(digits.code(), None);
        assert_eq!(digits.as_strings(), ["1".to_string(), "2".into(), "".into(), "".into()]);
    }

    #[test]
    fn test_non_digit_ignored() {
        let mut digits = OtpDigits::new();

        assert_eq!(digits.input(0, "a"), FocusHint::Stay);
        assert_eq!(digits.code(), None);
        assert_eq!(digits.as_strings()[0], "");
    }

    #[test]
    fn test_overtyping_keeps_last_character() {
        let mut digits = OtpDigits::new();
        digits.input(0, "1");

        assert_eq!(digits.input(0, "17"), FocusHint::Focus(1));
        assert_eq!(digits.as_strings()[0], "7");
    }

    #[test]
    fn test_clearing_slot_retreats_focus() {
        let mut digits = OtpDigits::new();
        digits.input(0, "1");
        digits.input(1, "2");

        assert_eq!(digits.input(1, ""), FocusHint::Focus(0));
        assert_eq!(digits.as_strings()[1], "");
        assert_eq!(digits.input(0, ""), FocusHint::Stay);
    }

    #[test]
    fn test_backspace() {
        let mut digits = OtpDigits::new();
        digits.input(0, "1");
        digits.input(1, "2");

        // Filled slot is cleared in place
        assert_eq!(digits.backspace(1), FocusHint::Stay);
        assert_eq!(digits.as_strings()[1], "");

        // Empty slot moves back
        assert_eq!(digits.backspace(1), FocusHint::Focus(0));
        assert_eq!(digits.backspace(0), FocusHint::Stay);
        assert_eq!(digits.backspace(0), FocusHint::Stay);
    }

    #[test]
    fn test_paste_fills_all_slots() {
        let mut digits = OtpDigits::new();
        digits.input(0, "9");

        assert_eq!(digits.paste(" 4321\n"), Some(FocusHint::Focus(3)));
        assert_eq!(digits.code(), Some("4321".into()));
    }

    #[test]
    fn test_paste_rejects_other_shapes() {
        let mut digits = OtpDigits::new();

        assert_eq!(digits.paste("123"), None);
        assert_eq!(digits.paste("12345"), None);
        assert_eq!(digits.paste("12a4"), None);
        assert_eq!(digits.paste(""), None);
        assert_eq!(digits.code(), None);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut digits = OtpDigits::new();
        assert_eq!(digits.input(4, "1"), FocusHint::Stay);
        assert_eq!(digits.backspace(7), FocusHint::Stay);
        assert_eq!(digits, OtpDigits::new());
    }

    #[test]
    fn test_clear() {
        let mut digits = OtpDigits::new();
        digits.paste("1234");
        digits.clear();
        assert_eq!(digits, OtpDigits::new());
    }
}
