// text.rs — text-input buffer
//
// One shared buffer backs every name/replay entry field. Characters come
// in as Unicode scalars from the platform layer or the on-screen
// keyboard; length is measured in code points because the GUI truncates
// by glyph, not by byte.

pub const TEXT_MAX: usize = 256;

/// Number of code points in a string.
pub fn text_length(s: &str) -> usize {
    s.chars().count()
}

type InputCallback = Box<dyn FnMut(bool)>;

#[derive(Default)]
pub struct TextInput {
    buffer: String,
    callback: Option<InputCallback>,
    active: bool,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin an input session. Clears the buffer and fires the callback
    /// once so the field label can sync.
    pub fn start(&mut self, cb: impl FnMut(bool) + 'static) {
        self.buffer.clear();
        self.callback = Some(Box::new(cb));
        self.active = true;
        self.notify(false);
    }

    pub fn stop(&mut self) {
        self.callback = None;
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        text_length(&self.buffer)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append a whole string (seed value). `typing` tells the callback
    /// whether to play the key blip.
    pub fn set_str(&mut self, input: &str, typing: bool) -> bool {
        if input.is_empty() {
            return false;
        }
        let budget = TEXT_MAX.saturating_sub(self.buffer.len());
        let mut take = String::new();
        for c in input.chars() {
            if take.len() + c.len_utf8() > budget {
                break;
            }
            take.push(c);
        }
        if take.is_empty() {
            return false;
        }
        self.buffer.push_str(&take);
        self.notify(typing);
        true
    }

    /// Append one character. Rejected when the buffer is full.
    pub fn input_char(&mut self, c: char) -> bool {
        if self.buffer.len() + c.len_utf8() >= TEXT_MAX {
            return false;
        }
        self.buffer.push(c);
        self.notify(false);
        true
    }

    /// Delete the last character (one code point, however many bytes).
    pub fn input_del(&mut self) -> bool {
        if self.buffer.pop().is_none() {
            return false;
        }
        self.notify(false);
        true
    }

    fn notify(&mut self, typing: bool) {
        if let Some(cb) = self.callback.as_mut() {
            cb(typing);
        }
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn char_entry_and_deletion() {
        let mut t = TextInput::new();
        t.start(|_| {});
        assert!(t.input_char('a'));
        assert!(t.input_char('\u{00e9}'));
        assert_eq!(t.len(), 2);

        assert!(t.input_del());
        assert_eq!(t.text(), "a");
        assert!(t.input_del());
        assert!(!t.input_del());
    }

    #[test]
    fn seed_string_counts_as_not_typing() {
        let typed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&typed);

        let mut t = TextInput::new();
        t.start(move |typing| sink.borrow_mut().push(typing));
        t.set_str("Player", false);
        t.input_char('!');

        assert_eq!(*typed.borrow(), vec![false, false, false]);
        assert_eq!(t.text(), "Player!");
    }

    #[test]
    fn start_clears_previous_session() {
        let mut t = TextInput::new();
        t.start(|_| {});
        t.set_str("old", false);
        t.start(|_| {});
        assert!(t.is_empty());
    }

    #[test]
    fn buffer_is_bounded() {
        let mut t = TextInput::new();
        t.start(|_| {});
        let long = "x".repeat(TEXT_MAX * 2);
        t.set_str(&long, false);
        assert!(t.text().len() <= TEXT_MAX);
        assert!(!t.input_char('y'));
    }
}
