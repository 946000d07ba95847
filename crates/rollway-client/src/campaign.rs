// campaign.rs — level-group campaign state
//
// Campaigns group levels by theme and gate the career and hardcore
// modes. Hardcore keeps a little run record (how deep the player got)
// that the game-over screen turns into a report.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Sky,
    Ice,
    Cave,
    Cloud,
    Lava,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Sky => "Sky",
            Theme::Ice => "Ice",
            Theme::Cave => "Cave",
            Theme::Cloud => "Cloud",
            Theme::Lava => "Lava",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Theme::Sky => 1,
            Theme::Ice => 2,
            Theme::Cave => 3,
            Theme::Cloud => 4,
            Theme::Lava => 5,
        }
    }

    /// How the over screen rates a run that ended in this theme.
    pub fn report_line(self) -> &'static str {
        match self {
            Theme::Sky => "Keep trying, you will get there!",
            Theme::Ice => "Nice one!",
            Theme::Cave => "Incredible!",
            Theme::Cloud => "Unbelievable! Well done!",
            Theme::Lava => "Er, how did you do that?",
        }
    }
}

/// Levels per theme in the hardcore ladder.
pub const LEVELS_PER_THEME: usize = 6;

#[derive(Debug, Clone, Copy)]
pub struct HardcoreData {
    pub theme: Theme,
    pub level_number: usize,
    pub coordinates: [f32; 2],
}

impl Default for HardcoreData {
    fn default() -> Self {
        Self {
            theme: Theme::Sky,
            level_number: 1,
            coordinates: [0.0, 0.0],
        }
    }
}

impl HardcoreData {
    /// Completed-level count across themes, for the report.
    pub fn levels_completed(&self) -> usize {
        (self.level_number + (self.theme.index() - 1) * LEVELS_PER_THEME)
            .saturating_sub(1)
    }
}

#[derive(Default)]
pub struct Campaign {
    used: bool,
    theme_used: bool,
    hardcore: bool,
    hardcore_data: HardcoreData,
    career_unlocked: bool,
    hardcore_unlocked: bool,
    /// Hardcore can be configured to suppress replay recording.
    norecordings: bool,
}

impl Campaign {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn used(&self) -> bool {
        self.used
    }

    pub fn start(&mut self, hardcore: bool) {
        self.used = true;
        self.theme_used = true;
        self.hardcore = hardcore;
        if hardcore {
            self.hardcore_data = HardcoreData::default();
        }
    }

    pub fn quit(&mut self) {
        self.used = false;
        self.hardcore = false;
    }

    pub fn theme_quit(&mut self) {
        self.theme_used = false;
    }

    pub fn hardcore(&self) -> bool {
        self.used && self.hardcore
    }

    pub fn hardcore_quit(&mut self) {
        self.hardcore = false;
    }

    pub fn hardcore_norecordings(&self) -> bool {
        self.hardcore() && self.norecordings
    }

    pub fn set_norecordings(&mut self, v: bool) {
        self.norecordings = v;
    }

    pub fn career_unlocked(&self) -> bool {
        self.career_unlocked
    }

    pub fn unlock_career(&mut self) {
        self.career_unlocked = true;
    }

    pub fn hardcore_unlocked(&self) -> bool {
        self.hardcore_unlocked
    }

    pub fn unlock_hardcore(&mut self) {
        self.hardcore_unlocked = true;
    }

    pub fn hardcore_data(&self) -> HardcoreData {
        self.hardcore_data
    }

    pub fn set_coordinates(&mut self, x: f32, y: f32) {
        self.hardcore_data.coordinates = [x, y];
    }

    /// Step the hardcore ladder; rolls into the next theme after the
    /// last level of the current one.
    pub fn hardcore_next_level(&mut self) {
        let d = &mut self.hardcore_data;
        if d.level_number < LEVELS_PER_THEME {
            d.level_number += 1;
        } else {
            d.level_number = 1;
            d.theme = match d.theme {
                Theme::Sky => Theme::Ice,
                Theme::Ice => Theme::Cave,
                Theme::Cave => Theme::Cloud,
                Theme::Cloud => Theme::Lava,
                Theme::Lava => Theme::Lava,
            };
        }
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardcore_requires_campaign() {
        let mut c = Campaign::new();
        assert!(!c.hardcore());
        c.start(true);
        assert!(c.hardcore());
        c.quit();
        assert!(!c.hardcore());
    }

    #[test]
    fn ladder_rolls_into_next_theme() {
        let mut c = Campaign::new();
        c.start(true);
        for _ in 0..LEVELS_PER_THEME {
            c.hardcore_next_level();
        }
        assert_eq!(c.hardcore_data().theme, Theme::Ice);
        assert_eq!(c.hardcore_data().level_number, 1);
    }

    #[test]
    fn completed_count_spans_themes() {
        let d = HardcoreData {
            theme: Theme::Cave,
            level_number: 2,
            coordinates: [0.0, 0.0],
        };
        // Two full themes plus one completed level of the third.
        assert_eq!(d.levels_completed(), 13);
    }

    #[test]
    fn norecordings_only_bites_in_hardcore() {
        let mut c = Campaign::new();
        c.set_norecordings(true);
        assert!(!c.hardcore_norecordings());
        c.start(true);
        assert!(c.hardcore_norecordings());
    }
}
