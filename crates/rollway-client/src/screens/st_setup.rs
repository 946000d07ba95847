// st_setup.rs — first-run wizard
//
// Runs once on a fresh install: pick a language, pick a controls
// preset, accept the terms cards, then hand off into name entry. While
// the wizard is active the rest of the UI refuses to cancel out of
// flows it starts.

use rollway_common::config;

use crate::gui::{
    FontSize, Token, WidgetId, GLYPH_BALLOT_X, GLYPH_CHECKMARK, GUI_GRN, GUI_GRY, GUI_WHT,
    GUI_YEL, NONE,
};
use crate::keys::KEY_EXIT;
use crate::state::{Ctx, Screen, ScreenId};
use crate::transition::Intent;

use super::st_name::goto_name;
use super::st_shared::action_gate;

const LANG_DEFAULT: Token = Token::Action(1);
const LANG_SELECT: Token = Token::Action(2);
const CONTROLS_SELECT: Token = Token::Action(3);
const TERMS_TOGGLE: Token = Token::Action(4);
const TERMS_TOGGLE_ALL: Token = Token::Action(5);
const TERMS_READMORE: Token = Token::Action(6);
const SETUP_FINISHED: Token = Token::Action(7);

/// Languages shown per page.
const LANG_STEP: usize = 7;

const LANGUAGES: &[(&str, &str)] = &[
    ("de_DE", "Deutsch"),
    ("en_GB", "English (UK)"),
    ("en_US", "English (US)"),
    ("es_ES", "Espa\u{00f1}ol"),
    ("fr_FR", "Fran\u{00e7}ais"),
    ("hu_HU", "Magyar"),
    ("id_ID", "Bahasa Indonesia"),
    ("it_IT", "Italiano"),
    ("ja_JP", "\u{65e5}\u{672c}\u{8a9e}"),
    ("ko_KR", "\u{d55c}\u{ad6d}\u{c5b4}"),
    ("nl_NL", "Nederlands"),
    ("th_TH", "\u{0e44}\u{0e17}\u{0e22}"),
];

const TERMS_CARDS: [&str; 3] = [
    "Terms of Service",
    "Privacy Policy",
    "Replay Guidelines",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Language,
    Controls,
    Terms,
}

/// Begin the wizard; `finish` is where the flow lands after name entry.
pub fn goto_game_setup(ctx: &mut Ctx, finish: ScreenId) {
    ctx.setup_active = true;
    ctx.links.name_ok = finish;
    ctx.links.name_cancel = finish;
    ctx.goto(ScreenId::Setup);
}

pub struct SetupScreen {
    page: Page,
    langs_first: usize,
    terms_accepted: [bool; TERMS_CARDS.len()],
    confirm_id: WidgetId,
    toggle_ids: [WidgetId; TERMS_CARDS.len()],
}

impl Default for SetupScreen {
    fn default() -> Self {
        Self {
            page: Page::Language,
            langs_first: 0,
            terms_accepted: [false; TERMS_CARDS.len()],
            confirm_id: NONE,
            toggle_ids: [NONE; TERMS_CARDS.len()],
        }
    }
}

impl SetupScreen {
    fn language_gui(&mut self, ctx: &mut Ctx) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "Select language", FontSize::Med, GUI_WHT, GUI_WHT);
        ctx.gui.space(id);

        if self.langs_first == 0 {
            ctx.gui
                .start(id, "System default", FontSize::Sml, LANG_DEFAULT, 0);
        }

        for (i, (_, name)) in LANGUAGES
            .iter()
            .enumerate()
            .skip(self.langs_first)
            .take(LANG_STEP)
        {
            ctx.gui.state(id, name, FontSize::Sml, LANG_SELECT, i as i32);
        }

        ctx.gui.space(id);
        ctx.gui
            .navig(id, LANGUAGES.len(), self.langs_first, LANG_STEP, true);

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn controls_gui(&mut self, ctx: &mut Ctx) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "Controls", FontSize::Med, GUI_WHT, GUI_WHT);
        ctx.gui.space(id);
        ctx.gui.multi(
            id,
            "Pick a control preset.\nYou can change individual bindings later.",
            FontSize::Sml,
            GUI_WHT,
            GUI_WHT,
        );
        ctx.gui.space(id);

        let row = ctx.gui.harray(id);
        ctx.gui.start(row, "Classic", FontSize::Sml, CONTROLS_SELECT, 0);
        ctx.gui.state(row, "Modern", FontSize::Sml, CONTROLS_SELECT, 1);

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn terms_gui(&mut self, ctx: &mut Ctx) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "Before you roll", FontSize::Med, GUI_WHT, GUI_WHT);
        ctx.gui.space(id);

        for (i, name) in TERMS_CARDS.iter().enumerate() {
            let card = ctx.gui.harray(id);
            let mark = if self.terms_accepted[i] {
                GLYPH_CHECKMARK
            } else {
                GLYPH_BALLOT_X
            };
            let color = if self.terms_accepted[i] { GUI_GRN } else { GUI_GRY };
            self.toggle_ids[i] = ctx
                .gui
                .state(card, &format!("{mark} {name}"), FontSize::Sml, TERMS_TOGGLE, i as i32);
            ctx.gui.set_color(self.toggle_ids[i], color, color);
            ctx.gui
                .state(card, "Read More", FontSize::Sml, TERMS_READMORE, i as i32);
        }

        ctx.gui.space(id);
        ctx.gui
            .state(id, "Accept all", FontSize::Sml, TERMS_TOGGLE_ALL, 0);
        ctx.gui.space(id);

        self.confirm_id = ctx.gui.start(id, "Continue", FontSize::Sml, SETUP_FINISHED, 0);
        self.refresh_confirm(ctx);

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn refresh_confirm(&self, ctx: &mut Ctx) {
        let all = self.terms_accepted.iter().all(|&a| a);
        ctx.gui.set_state(
            self.confirm_id,
            if all { SETUP_FINISHED } else { Token::None },
            0,
        );
        let c = if all { GUI_YEL } else { GUI_GRY };
        ctx.gui.set_color(self.confirm_id, c, c);
    }

    fn refresh_toggles(&self, ctx: &mut Ctx) {
        for (i, name) in TERMS_CARDS.iter().enumerate() {
            let mark = if self.terms_accepted[i] {
                GLYPH_CHECKMARK
            } else {
                GLYPH_BALLOT_X
            };
            let color = if self.terms_accepted[i] { GUI_GRN } else { GUI_GRY };
            ctx.gui
                .set_label(self.toggle_ids[i], &format!("{mark} {name}"));
            ctx.gui.set_color(self.toggle_ids[i], color, color);
        }
        self.refresh_confirm(ctx);
    }

    fn apply_controls_preset(ctx: &mut Ctx, preset: i32) {
        match preset {
            // Classic: restart on r, y-axes as shipped.
            0 => {
                ctx.cfg.set_d(config::KEY_RESTART, b'r' as i32);
                ctx.cfg.set_d(config::JOYSTICK_AXIS_Y0_INVERT, 0);
            }
            // Modern: restart on backquote, inverted camera y.
            _ => {
                ctx.cfg.set_d(config::KEY_RESTART, b'`' as i32);
                ctx.cfg.set_d(config::JOYSTICK_AXIS_Y0_INVERT, 1);
            }
        }
    }
}

impl Screen for SetupScreen {
    fn enter(&mut self, ctx: &mut Ctx, prev: ScreenId, _intent: Intent) -> WidgetId {
        ctx.setup_active = true;
        if prev != ScreenId::Setup {
            self.page = Page::Language;
            self.langs_first = 0;
            self.terms_accepted = [false; TERMS_CARDS.len()];
        }

        match self.page {
            Page::Language => self.language_gui(ctx),
            Page::Controls => self.controls_gui(ctx),
            Page::Terms => self.terms_gui(ctx),
        }
    }

    fn keybd(&mut self, ctx: &mut Ctx, c: i32, d: bool) -> bool {
        // No escaping the wizard.
        if d && c == KEY_EXIT {
            ctx.audio.play(crate::audio::AUD_DISABLED, 1.0);
        }
        true
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            Token::Prev => {
                self.langs_first = self.langs_first.saturating_sub(LANG_STEP);
                ctx.goto(ScreenId::Setup);
            }
            Token::Next => {
                if self.langs_first + LANG_STEP < LANGUAGES.len() {
                    self.langs_first += LANG_STEP;
                }
                ctx.goto(ScreenId::Setup);
            }

            LANG_DEFAULT => {
                ctx.cfg.set_s(config::LANGUAGE, "");
                self.page = Page::Controls;
                ctx.goto(ScreenId::Setup);
            }
            LANG_SELECT => {
                let lang = LANGUAGES[value as usize].0;
                ctx.cfg.set_s(config::LANGUAGE, lang);
                self.page = Page::Controls;
                ctx.goto(ScreenId::Setup);
            }

            CONTROLS_SELECT => {
                Self::apply_controls_preset(ctx, value);
                self.page = Page::Terms;
                ctx.goto(ScreenId::Setup);
            }

            TERMS_TOGGLE => {
                let i = value as usize;
                self.terms_accepted[i] = !self.terms_accepted[i];
                self.refresh_toggles(ctx);
            }
            TERMS_TOGGLE_ALL => {
                let all = self.terms_accepted.iter().all(|&a| a);
                self.terms_accepted = [!all; TERMS_CARDS.len()];
                self.refresh_toggles(ctx);
            }
            TERMS_READMORE => {
                // Platform layer opens the document.
                log::info!("setup: read more for {}", TERMS_CARDS[value as usize]);
            }

            SETUP_FINISHED => {
                let cfg_path = ctx.dirs.config_file();
                if let Err(e) = ctx.cfg.save(&cfg_path) {
                    log::error!("config save: {e}");
                }
                ctx.setup_active = false;
                let finish = ctx.links.name_ok;
                goto_name(ctx, finish, finish, true);
            }

            _ => {}
        }
        true
    }
}

// ============================================================
// Tests
// ============================================================
