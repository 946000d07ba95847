// st_name.rs — player naming
//
// Entered from the shop, the result screens or first-run setup. Saving
// the name links it into config and the account file; a name that
// creates a brand-new account gets the new-player interstitial before
// the flow continues.

use std::cell::Cell;
use std::rc::Rc;

use rollway_common::config;

use crate::audio::AUD_MENU;
use crate::gui::{FontSize, Token, Trunc, WidgetId, GUI_GRY, GUI_WHT, GUI_YEL, NONE};
use crate::keys::{is_char_key, K_BACKSPACE, K_DELETE, KEY_EXIT};
use crate::state::{Ctx, Screen, ScreenId};
use crate::transition::Intent;

use super::st_shared::{action_gate, has_reserved_chars};
use super::util::Keyboard;

const NAME_OK: Token = Token::Action(1);
const NAME_CONTINUE: Token = Token::Action(2);

/// Route a flow into name entry.
pub fn goto_name(ctx: &mut Ctx, ok: ScreenId, cancel: ScreenId, draw_back: bool) {
    ctx.links.name_ok = ok;
    ctx.links.name_cancel = cancel;
    ctx.links.name_draw_back = draw_back;
    ctx.goto(ScreenId::Name);
}

fn name_accepted(name: &str) -> bool {
    name.chars().count() >= 3 && !has_reserved_chars(name)
}

#[derive(Default)]
pub struct NameScreen {
    name_id: WidgetId,
    enter_id: WidgetId,
    keyboard: Keyboard,
    new_player: bool,
    touched: Rc<Cell<bool>>,
    typed: Rc<Cell<bool>>,
}

impl NameScreen {
    fn refresh_enter_btn(&self, ctx: &mut Ctx) {
        let accepted = name_accepted(ctx.input.text());
        ctx.gui
            .set_state(self.enter_id, if accepted { NAME_OK } else { Token::None }, 0);
        let c = if accepted { GUI_WHT } else { GUI_GRY };
        ctx.gui.set_color(self.enter_id, c, c);
    }

    fn entry_gui(&mut self, ctx: &mut Ctx) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "Player Name", FontSize::Med, GUI_WHT, GUI_WHT);
        ctx.gui.space(id);

        self.name_id = ctx
            .gui
            .label(id, "XXXXXXXXXXXXXXXX", FontSize::Med, GUI_YEL, GUI_YEL);

        ctx.gui.space(id);
        let row = ctx.gui.hstack(id);
        ctx.gui.filler(row);
        let Ctx { gui, .. } = ctx;
        self.keyboard.build(gui, row);
        ctx.gui.filler(row);
        ctx.gui.space(id);

        let buttons = ctx.gui.harray(id);
        self.enter_id = ctx.gui.start(buttons, "OK", FontSize::Sml, NAME_OK, 0);
        if ctx.console.is_pc() {
            ctx.gui.space(buttons);
            ctx.gui
                .state(buttons, "Cancel", FontSize::Sml, Token::Back, 0);
        }

        ctx.gui.set_trunc(self.name_id, Trunc::Head);
        let text = ctx.input.text().to_string();
        ctx.gui.set_label(self.name_id, &text);

        ctx.gui.layout(id, 0, 0);
        self.refresh_enter_btn(ctx);
        id
    }

    fn new_player_gui(&mut self, ctx: &mut Ctx) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "New Players!", FontSize::Med, GUI_WHT, GUI_WHT);
        ctx.gui.space(id);
        ctx.gui.multi(
            id,
            "As a new player, you can\nstart new Campaign levels first\nbefore selecting other game modes.",
            FontSize::Sml,
            GUI_WHT,
            GUI_WHT,
        );
        ctx.gui.space(id);
        ctx.gui.start(id, "OK", FontSize::Sml, NAME_CONTINUE, 0);
        ctx.gui.layout(id, 0, 0);
        id
    }
}

impl Screen for NameScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        if self.new_player {
            return self.new_player_gui(ctx);
        }

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
        let player = ctx.cfg.get_s(config::PLAYER).to_string();
        ctx.input.set_str(&player, false);

        self.entry_gui(ctx)
    }

    fn leave(&mut self, ctx: &mut Ctx, _next: ScreenId, id: WidgetId, _intent: Intent) {
        ctx.input.stop();
        ctx.gui.delete(id);
    }

    fn timer(&mut self, ctx: &mut Ctx, id: WidgetId, dt: f32) {
        if !self.new_player && self.touched.take() {
            let text = ctx.input.text().to_string();
            ctx.gui.set_label(self.name_id, &text);
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
            if self.new_player {
                return true;
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
            Token::Back => {
                // Abandon the edit; local account state reloads from
                // disk so a half-typed name leaves no trace.
                let path = ctx.dirs.account_file();
                if path.is_file() {
                    if let Err(e) = ctx.account.load(&path) {
                        log::warn!("account reload: {e}");
                    }
                }
                ctx.goto(ctx.links.name_cancel);
            }

            NAME_OK => {
                let name = ctx.input.text().to_string();
                if !name_accepted(&name) {
                    return true;
                }

                ctx.cfg.set_s(config::PLAYER, &name);
                ctx.input.stop();

                let path = ctx.dirs.account_file();
                let existed = crate::account::Account::exists(&path);
                if !existed {
                    self.new_player = true;
                }

                ctx.account.set_s(crate::account::PLAYER, &name);
                if let Err(e) = ctx.account.save(&path) {
                    log::error!("account save: {e}");
                }
                let cfg_path = ctx.dirs.config_file();
                if let Err(e) = ctx.cfg.save(&cfg_path) {
                    log::error!("config save: {e}");
                }

                if self.new_player {
                    ctx.goto(ScreenId::Name);
                } else {
                    ctx.goto(ctx.links.name_ok);
                }
            }

            NAME_CONTINUE => {
                self.new_player = false;
                ctx.goto(ctx.links.name_ok);
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
// Tests
// ============================================================
