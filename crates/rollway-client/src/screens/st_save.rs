// st_save.rs — replay naming
//
// Reached from the goal and fail screens once a recording is waiting
// under the Last name. The player gives it a real name; an existing
// name asks before clobbering, and a rename failure lands on the error
// screen instead of silently losing the recording.

use std::cell::Cell;
use std::rc::Rc;

use rollway_common::config;

use crate::audio::AUD_MENU;
use crate::demo::DEMO_LAST;
use crate::gui::{FontSize, Token, Trunc, WidgetId, GUI_GRY, GUI_RED, GUI_WHT, GUI_YEL, NONE};
use crate::keys::{is_char_key, K_BACKSPACE, K_DELETE, KEY_EXIT};
use crate::progress::Mode;
use crate::state::{Ctx, Screen, ScreenId};
use crate::transition::Intent;

use super::st_shared::{action_gate, has_reserved_chars};
use super::util::Keyboard;

const SAVE_OK: Token = Token::Action(1);

/// Route a flow into the save screen, remembering where OK and Cancel
/// should land.
pub fn goto_save(ctx: &mut Ctx, ok: ScreenId, cancel: ScreenId) {
    ctx.links.save_ok = ok;
    ctx.links.save_cancel = cancel;
    ctx.goto(ScreenId::Save);
}

fn name_accepted(name: &str) -> bool {
    name.chars().count() >= 3 && name != DEMO_LAST && !has_reserved_chars(name)
}

fn do_rename(ctx: &mut Ctx) {
    let name = ctx.input.text().to_string();
    match ctx.demos.rename(&name) {
        Ok(()) => ctx.goto(ctx.links.save_ok),
        Err(e) => {
            ctx.last_error = e.to_string();
            ctx.goto(ScreenId::SaveError);
        }
    }
}

// ============================================================
// Save
// ============================================================

#[derive(Default)]
pub struct SaveScreen {
    file_id: WidgetId,
    enter_id: WidgetId,
    keyboard: Keyboard,
    /// Set by the text-input callback; drained in `timer`.
    touched: Rc<Cell<bool>>,
    typed: Rc<Cell<bool>>,
}

impl SaveScreen {
    fn seed_name(ctx: &Ctx) -> String {
        let fmt = ctx.cfg.get_s(config::REPLAY_NAME).to_string();
        let player = ctx.cfg.get_s(config::PLAYER).to_string();
        let level = ctx.progress.level_name(ctx.progress.curr_level());

        if ctx.campaign.used() {
            let set = if ctx.campaign.hardcore() { "hardcore" } else { "campaign" };
            ctx.demos.format_name(&fmt, set, &level, &player)
        } else if ctx.progress.curr_mode() == Mode::Standalone {
            "standalone".to_string()
        } else {
            let set = ctx.progress.set_id().to_string();
            ctx.demos.format_name(&fmt, &set, &level, &player)
        }
    }

    fn refresh_enter_btn(&self, ctx: &mut Ctx) {
        let accepted = name_accepted(ctx.input.text());
        ctx.gui
            .set_state(self.enter_id, if accepted { SAVE_OK } else { Token::None }, 0);
        let c = if accepted { GUI_WHT } else { GUI_GRY };
        ctx.gui.set_color(self.enter_id, c, c);
    }
}

impl Screen for SaveScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        let name = Self::seed_name(ctx);

        self.touched = Rc::new(Cell::new(false));
        self.typed = Rc::new(Cell::new(false));
        let touched = Rc::clone(&self.touched);
        let typed = Rc::clone(&self.typed);
        ctx.input.start(move |typing| {
            touched.set(true);
            if typing {
                typed.set(true);
            }
        });
        ctx.input.set_str(&name, false);

        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "Replay Name", FontSize::Med, GUI_WHT, GUI_RED);
        ctx.gui.space(id);

        self.file_id = ctx.gui.label(
            id,
            "XXXXXXXXXXXXXXXXXXXXXXXXXXXXX",
            FontSize::Sml,
            GUI_YEL,
            GUI_YEL,
        );

        ctx.gui.space(id);
        let row = ctx.gui.hstack(id);
        ctx.gui.filler(row);
        let Ctx { gui, .. } = ctx;
        self.keyboard.build(gui, row);
        ctx.gui.filler(row);
        ctx.gui.space(id);

        let buttons = ctx.gui.harray(id);
        self.enter_id = ctx.gui.start(buttons, "Save", FontSize::Sml, SAVE_OK, 0);
        ctx.gui.space(buttons);
        ctx.gui
            .state(buttons, "Cancel", FontSize::Sml, Token::Back, 0);

        ctx.gui.layout(id, 0, 0);

        ctx.gui.set_trunc(self.file_id, Trunc::Head);
        let text = ctx.input.text().to_string();
        ctx.gui.set_label(self.file_id, &text);
        self.refresh_enter_btn(ctx);

        id
    }

    fn leave(&mut self, ctx: &mut Ctx, _next: ScreenId, id: WidgetId, _intent: Intent) {
        ctx.input.stop();
        ctx.gui.delete(id);
    }

    fn timer(&mut self, ctx: &mut Ctx, id: WidgetId, dt: f32) {
        if self.touched.take() {
            let text = ctx.input.text().to_string();
            ctx.gui.set_label(self.file_id, &text);
            self.refresh_enter_btn(ctx);
            if self.typed.take() {
                ctx.audio.play(AUD_MENU, 1.0);
            }
        }
        ctx.gui.timer(id, dt);
    }

    fn keybd(&mut self, ctx: &mut Ctx, c: i32, d: bool) -> bool {
        if d {
            if c == KEY_EXIT {
                return self.action(ctx, Token::Back, 0);
            }
            if c == K_BACKSPACE || c == K_DELETE {
                ctx.gui.focus(self.enter_id);
                return self.action(ctx, Token::Bs, 0);
            }
            if is_char_key(c) {
                ctx.gui.focus(self.enter_id);
                if let Some(ch) = char::from_u32(c as u32) {
                    ctx.input.set_str(&ch.to_string(), true);
                }
                return true;
            }
        }
        true
    }

    fn buttn(&mut self, ctx: &mut Ctx, b: i32, d: bool) -> bool {
        if d {
            if ctx.cfg.tst_d(config::JOYSTICK_BUTTON_A, b) {
                let active = ctx.gui.active();
                let token = ctx.gui.token(active);
                let value = ctx.gui.value(active);
                let value = if token == Token::Char {
                    self.keyboard.char_for(value) as i32
                } else {
                    value
                };
                return self.action(ctx, token, value);
            }
            if ctx.cfg.tst_d(config::JOYSTICK_BUTTON_B, b) {
                return self.action(ctx, Token::Back, 0);
            }
        }
        true
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            Token::Back => ctx.goto(ctx.links.save_cancel),

            SAVE_OK => {
                let name = ctx.input.text().to_string();

                if has_reserved_chars(&name) {
                    log::error!("replay name rejected: {name:?}");
                    return true;
                }
                if !name_accepted(&name) {
                    return true;
                }

                if ctx.demos.exists(&name) {
                    ctx.goto(ScreenId::Clobber);
                } else {
                    do_rename(ctx);
                }
            }

            Token::Cl => {
                let Ctx { gui, .. } = ctx;
                self.keyboard.toggle_lock(gui);
            }
            Token::Bs => {
                ctx.input.input_del();
            }
            Token::Char => {
                if let Some(ch) = char::from_u32(value as u32) {
                    ctx.input.input_char(ch);
                }
            }

            _ => {}
        }
        true
    }
}

// ============================================================
// Clobber confirmation
// ============================================================

#[derive(Default)]
pub struct ClobberScreen;

impl Screen for ClobberScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        let title = ctx
            .gui
            .title_header(id, "Overwrite?", FontSize::Med, GUI_RED, GUI_RED);
        ctx.gui.space(id);

        let file_id = ctx.gui.label(
            id,
            "XXXXXXXXXXXXXXXXXXXXXXXXXXXXX",
            FontSize::Sml,
            GUI_YEL,
            GUI_YEL,
        );

        ctx.gui.space(id);
        let buttons = ctx.gui.harray(id);
        ctx.gui.start(buttons, "Cancel", FontSize::Sml, Token::Back, 0);
        ctx.gui.state(buttons, "Overwrite", FontSize::Sml, SAVE_OK, 0);

        ctx.gui.pulse(title, 1.2);
        ctx.gui.layout(id, 0, 0);

        ctx.gui.set_trunc(file_id, Trunc::Tail);
        let text = ctx.input.text().to_string();
        ctx.gui.set_label(file_id, &text);

        id
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, _value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        if token == SAVE_OK {
            do_rename(ctx);
        } else {
            ctx.goto(ScreenId::Save);
        }
        true
    }
}

// ============================================================
// Save error
// ============================================================

#[derive(Default)]
pub struct SaveErrorScreen;

impl Screen for SaveErrorScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "Save failed!", FontSize::Med, GUI_GRY, GUI_RED);
        ctx.gui.space(id);

        let desc = format!(
            "Please check your permissions\nbefore saving your replay.\n{}",
            ctx.last_error
        );
        ctx.gui.multi(id, &desc, FontSize::Sml, GUI_WHT, GUI_WHT);
        ctx.gui.space(id);
        ctx.gui.start(id, "OK", FontSize::Sml, Token::Back, 0);

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, _value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }
        ctx.goto(ScreenId::Save);
        true
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Status;
    use crate::screens::testutil::machine;

    fn record(ctx: &mut Ctx) {
        ctx.progress.set_meta("easy", &[]);
        ctx.demos
            .play_init("Marble", "easy", "level1", crate::progress::Mode::Normal, 0, 0);
        ctx.demos.play_stat(1_000, 5, Status::Goal);
        ctx.demos.play_stop(true).unwrap();
    }

    #[test]
    fn cancel_returns_to_the_cancel_screen() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        record(&mut ctx);

        goto_save(&mut ctx, ScreenId::Goal, ScreenId::Fail);
        sm.tick(&mut ctx, 0.0);
        assert_eq!(sm.curr(), Some(ScreenId::Save));

        sm.keybd(&mut ctx, KEY_EXIT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Fail));
    }

    #[test]
    fn save_renames_last_and_returns_to_ok_screen() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        record(&mut ctx);

        goto_save(&mut ctx, ScreenId::Goal, ScreenId::Fail);
        sm.tick(&mut ctx, 0.0);

        // Seeded name is valid; confirm it.
        sm.click(&mut ctx, crate::keys::BUTTON_LEFT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Goal));
        assert!(ctx.demos.exists("easy-01"));
        assert!(!ctx.demos.exists(DEMO_LAST));
    }

    #[test]
    fn short_or_reserved_names_disable_save() {
        assert!(!name_accepted("ab"));
        assert!(!name_accepted("Last"));
        assert!(!name_accepted("a/b/c"));
        assert!(name_accepted("good-name"));
    }

    #[test]
    fn existing_name_asks_before_clobbering() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        record(&mut ctx);
        ctx.demos.rename("easy-01").unwrap();
        record(&mut ctx);

        goto_save(&mut ctx, ScreenId::Goal, ScreenId::Fail);
        sm.tick(&mut ctx, 0.0);

        // Seed avoided the collision; retype the taken name.
        for _ in 0..16 {
            ctx.input.input_del();
        }
        ctx.input.set_str("easy-01", false);
        sm.click(&mut ctx, crate::keys::BUTTON_LEFT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Clobber));

        // Overwrite lands on the OK screen.
        // Cancel holds focus; move right to Overwrite and confirm.
        let a = ctx.cfg.get_d(rollway_common::config::JOYSTICK_BUTTON_A);
        sm.stick(&mut ctx, crate::keys::AXIS_X0, 1.0);
        sm.buttn(&mut ctx, a, true);
        assert_eq!(sm.curr(), Some(ScreenId::Goal));
    }

    #[test]
    fn typing_updates_label_after_timer() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        record(&mut ctx);

        goto_save(&mut ctx, ScreenId::Goal, ScreenId::Fail);
        sm.tick(&mut ctx, 0.0);

        sm.keybd(&mut ctx, 'x' as i32, true);
        sm.tick(&mut ctx, 0.02);
        assert!(ctx.input.text().ends_with('x'));
        assert_eq!(ctx.audio.last_cue(), Some(AUD_MENU));
    }
}
