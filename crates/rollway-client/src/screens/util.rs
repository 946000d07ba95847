// util.rs — score boards and the on-screen keyboard
//
// Shared widget assemblies: the top-three score table the result
// screens show, and the QWERTY board used wherever text is entered
// with a controller.

use crate::gui::{FontSize, Gui, Token, WidgetId, GUI_GRY, GUI_WHT, GUI_YEL};
use crate::progress::{Progress, RANKS};

// ============================================================
// Score board
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreView {
    #[default]
    Coins,
    Times,
}

impl ScoreView {
    pub fn next(self) -> Self {
        match self {
            ScoreView::Coins => ScoreView::Times,
            ScoreView::Times => ScoreView::Coins,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ScoreView::Coins => 0,
            ScoreView::Times => 1,
        }
    }

    pub fn from_code(code: i32) -> Self {
        if code == 1 { ScoreView::Times } else { ScoreView::Coins }
    }
}

/// Top-three table for the current level. The row holding this run's
/// new record is drawn highlighted.
pub fn score_board(
    gui: &mut Gui,
    progress: &Progress,
    parent: WidgetId,
    view: ScoreView,
    highlight: Option<usize>,
) -> WidgetId {
    let id = gui.varray(parent);
    let level = progress.curr_level();

    for rank in 0..RANKS {
        let row = gui.harray(id);
        let color = if highlight == Some(rank) { GUI_YEL } else { GUI_WHT };

        gui.label(row, &format!("{}.", rank + 1), FontSize::Sml, GUI_GRY, GUI_GRY);

        match view {
            ScoreView::Coins => {
                let coins = progress.level_best_coins(level)[rank];
                gui.label(row, &coins.to_string(), FontSize::Sml, color, color);
            }
            ScoreView::Times => {
                let ms = progress.level_best_times(level)[rank];
                if ms == i32::MAX {
                    gui.label(row, "--:--", FontSize::Sml, GUI_GRY, GUI_GRY);
                } else {
                    let clock = gui.clock(row, ms, FontSize::Sml);
                    gui.set_color(clock, color, color);
                }
            }
        }
    }

    // The whole board is a button that cycles the view.
    gui.set_state(id, Token::Score, view.next().code());
    id
}

// ============================================================
// On-screen keyboard
// ============================================================

const ROW_DIGITS: [(char, char); 10] = [
    ('1', '!'),
    ('2', '@'),
    ('3', '#'),
    ('4', '$'),
    ('5', '%'),
    ('6', '^'),
    ('7', '&'),
    ('8', '*'),
    ('9', '('),
    ('0', ')'),
];

const ROW_TOP: &str = "QWERTYUIOP";
const ROW_HOME: &str = "ASDFGHJKL";
const ROW_BOTTOM: &str = "ZXCVBNM";

const PAIRS: [(char, char); 9] = [
    ('-', '_'),
    ('=', '+'),
    ('[', '{'),
    (']', '}'),
    (';', ':'),
    ('\'', '"'),
    (',', '<'),
    ('.', '>'),
    ('/', '?'),
];

/// On-screen keyboard state: the built key widgets plus the caps lock.
/// Keys carry `Token::Char` with the *unshifted* character as value; the
/// screen resolves the actual character through `char_for`.
pub struct Keyboard {
    keys: Vec<(WidgetId, char)>,
    locked: bool,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            locked: true,
        }
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    fn key(&mut self, gui: &mut Gui, row: WidgetId, c: char) {
        let label = self.display(c);
        let id = gui.state(row, &label.to_string(), FontSize::Sml, Token::Char, c as i32);
        self.keys.push((id, c));
    }

    /// Build the board under `parent`. Call again only after `leave`.
    pub fn build(&mut self, gui: &mut Gui, parent: WidgetId) {
        self.keys.clear();
        self.locked = true;

        let board = gui.vstack(parent);

        let row = gui.hstack(board);
        gui.state(row, "\u{25c0}", FontSize::Sml, Token::Bs, 0);
        for (c, _) in ROW_DIGITS {
            self.key(gui, row, c);
        }
        self.key(gui, row, '-');
        self.key(gui, row, '=');

        let row = gui.hstack(board);
        for c in ROW_TOP.chars() {
            self.key(gui, row, c);
        }
        self.key(gui, row, '[');
        self.key(gui, row, ']');

        let row = gui.hstack(board);
        gui.state(row, "\u{21e9}", FontSize::Sml, Token::Cl, 0);
        for c in ROW_HOME.chars() {
            self.key(gui, row, c);
        }
        self.key(gui, row, ';');
        self.key(gui, row, '\'');

        let row = gui.hstack(board);
        for c in ROW_BOTTOM.chars() {
            self.key(gui, row, c);
        }
        self.key(gui, row, ',');
        self.key(gui, row, '.');
        self.key(gui, row, '/');
    }

    fn display(&self, c: char) -> char {
        if c.is_ascii_alphabetic() {
            if self.locked {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        } else if self.locked {
            ROW_DIGITS
                .iter()
                .chain(PAIRS.iter())
                .find(|&&(base, _)| base == c)
                .map(|&(_, shifted)| shifted)
                .unwrap_or(c)
        } else {
            c
        }
    }

    /// Toggle caps lock and relabel every key.
    pub fn toggle_lock(&mut self, gui: &mut Gui) {
        self.locked = !self.locked;
        let keys = self.keys.clone();
        for (id, c) in keys {
            gui.set_label(id, &self.display(c).to_string());
        }
    }

    /// Resolve a `Token::Char` value to the character it currently
    /// types.
    pub fn char_for(&self, value: i32) -> char {
        let c = char::from_u32(value as u32).unwrap_or(' ');
        self.display(c)
    }
}

/// Password echo: one asterisk per typed character.
pub fn mask_password(len: usize) -> String {
    "*".repeat(len)
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::NONE;

    #[test]
    fn keyboard_types_upper_then_lower() {
        let mut gui = Gui::default();
        let root = gui.vstack(NONE);
        let mut kb = Keyboard::new();
        kb.build(&mut gui, root);

        assert!(kb.locked());
        assert_eq!(kb.char_for('Q' as i32), 'Q');

        kb.toggle_lock(&mut gui);
        assert_eq!(kb.char_for('Q' as i32), 'q');
        // Shifted pairs follow the lock too.
        kb.toggle_lock(&mut gui);
        assert_eq!(kb.char_for('1' as i32), '!');
        kb.toggle_lock(&mut gui);
        assert_eq!(kb.char_for('1' as i32), '1');
    }

    #[test]
    fn score_view_cycles() {
        assert_eq!(ScoreView::Coins.next(), ScoreView::Times);
        assert_eq!(ScoreView::Times.next(), ScoreView::Coins);
        assert_eq!(ScoreView::from_code(1), ScoreView::Times);
    }

    #[test]
    fn mask_matches_length() {
        assert_eq!(mask_password(0), "");
        assert_eq!(mask_password(4), "****");
    }
}
