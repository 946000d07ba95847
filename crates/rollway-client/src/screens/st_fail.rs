// st_fail.rs — fall-out / time-out flow
//
// Shown when a level ends badly. Besides retry/exit it carries the
// monetized escape hatches: buy extra balls when the run is dead, ask
// for more time (or buy Mediation outright) on a timeout, and the Zen
// switch for players who own Mediation. The replay retention policy is
// enforced here: depending on the account save level the pending
// recording may be discarded instead of offered for saving.

use std::cell::Cell;
use std::rc::Rc;

use rollway_common::config;

use crate::account::{PRODUCT_MEDIATION, WALLET_COINS, WALLET_GEMS};
use crate::audio::{AUD_BUY_PRODUCT, AUD_SHATTER};
use crate::gui::{FontSize, Token, WidgetId, GUI_BLU, GUI_GRN, GUI_GRY, GUI_RED, GUI_WHT, NONE};
use crate::keys::KEY_EXIT;
use crate::progress::{Mode, Status, EXTEND_SECONDS};
use crate::shop::{ASK_MORE_BALLS_GEMS, MEDIATION_COINS, MEDIATION_GEMS};
use crate::state::{Ctx, Screen, ScreenId};
use crate::transition::Intent;

use super::st_save::goto_save;
use super::st_shared::action_gate;
use super::st_shop::goto_shop_iap;

const FAIL_SAME: Token = Token::Action(1);
const FAIL_OVER: Token = Token::Action(2);
const FAIL_SAVE: Token = Token::Action(3);
const FAIL_ZEN_SWITCH: Token = Token::Action(4);
const FAIL_ASK_MORE: Token = Token::Action(5);

pub const ASK_MORE_TIME: i32 = 0;
pub const ASK_MORE_BALLS: i32 = 1;

/// Balls bought from this flow; the fail screen swaps its banner for
/// "Purchased!" when nonzero. Shared between the fail screen and the
/// ask-more screens the way the original shared a file static.
pub type BallsBought = Rc<Cell<i32>>;

/// Whether the pending recording survives the retention policy.
fn replay_retained(ctx: &Ctx, status: Status) -> bool {
    let save = ctx.cfg.get_d(config::ACCOUNT_SAVE);

    if ctx.campaign.hardcore_norecordings() {
        return false;
    }
    match status {
        Status::Fall => save >= 3,
        Status::Time => save >= 2,
        _ => true,
    }
}

fn shop_open(ctx: &Ctx) -> bool {
    ctx.policy.get_d(config::POLICY_EDITION) > -1
        && ctx.policy.get_d(config::POLICY_SHOP_ENABLED) != 0
        && ctx.policy.get_d(config::POLICY_SHOP_ENABLED_MANAGED) != 0
}

fn retry_target(ctx: &Ctx) -> ScreenId {
    if ctx.campaign.used() {
        ScreenId::Play
    } else {
        ScreenId::Level
    }
}

// ============================================================
// Fail
// ============================================================

pub struct FailScreen {
    resume: bool,
    status: Status,
    balls_bought: BallsBought,
}

impl FailScreen {
    pub fn new(balls_bought: BallsBought) -> Self {
        Self {
            resume: false,
            status: Status::None,
            balls_bought,
        }
    }

    fn build(&mut self, ctx: &mut Ctx) -> WidgetId {
        let save = ctx.cfg.get_d(config::ACCOUNT_SAVE);
        let id = ctx.gui.vstack(NONE);

        let banner = ctx.gui.vstack(id);
        let title_id;

        if self.balls_bought.get() > 0 {
            title_id = ctx
                .gui
                .title_header(banner, "Purchased!", FontSize::Lrg, GUI_BLU, GUI_GRN);
        } else {
            let label = match self.status {
                Status::Time => "Time's Up!",
                _ => "Fall-out!",
            };
            title_id = ctx
                .gui
                .title_header(banner, label, FontSize::Lrg, GUI_GRY, GUI_RED);

            if !replay_retained(ctx, self.status) {
                ctx.audio.music_fade_out(0.0);
                ctx.audio.play(AUD_SHATTER, 1.0);
                if let Err(e) = ctx.demos.play_stop(false) {
                    log::warn!("discarding replay: {e}");
                }
                let msg = ctx
                    .gui
                    .multi(banner, "You can't save new replays anymore!", FontSize::Sml, GUI_RED, GUI_RED);
                ctx.gui.pulse(msg, 1.2);
            } else {
                ctx.audio.play(AUD_SHATTER, 1.0);
            }

            if ctx.progress.dead() && !shop_open(ctx) {
                ctx.gui.multi(
                    banner,
                    "The shop is disabled by server policy!",
                    FontSize::Sml,
                    GUI_RED,
                    GUI_RED,
                );
            }
        }

        ctx.gui.set_rect(banner, crate::gui::GUI_ALL);
        ctx.gui.space(id);

        // Mediation offer on a Normal-mode timeout.
        if self.status == Status::Time
            && ctx.progress.curr_mode() == Mode::Normal
            && ctx.progress.same_avail()
            && shop_open(ctx)
        {
            let label = if ctx.account.get_d(PRODUCT_MEDIATION) == 0 {
                "Buy Mediation!"
            } else {
                "Ask for more time!"
            };
            ctx.gui
                .state(id, label, FontSize::Sml, FAIL_ASK_MORE, ASK_MORE_TIME);
            ctx.gui.space(id);
        }

        let buttons = ctx.gui.harray(id);
        ctx.gui.start(buttons, "Exit", FontSize::Sml, FAIL_OVER, 0);

        if ctx.progress.same_avail() && !ctx.campaign.hardcore() {
            ctx.gui
                .state(buttons, "Retry Level", FontSize::Sml, FAIL_SAME, 0);
        } else if ctx.progress.dead() && !ctx.campaign.hardcore() && shop_open(ctx) {
            ctx.gui
                .state(buttons, "Buy more balls!", FontSize::Sml, FAIL_ASK_MORE, ASK_MORE_BALLS);
        }

        if ctx.account.get_d(PRODUCT_MEDIATION) == 1
            && self.status == Status::Time
            && ctx.progress.curr_mode() == Mode::Normal
        {
            ctx.gui
                .state(buttons, "Switch to Zen", FontSize::Sml, FAIL_ZEN_SWITCH, 0);
        }

        if ctx.demos.saved() && replay_retained(ctx, self.status) {
            ctx.gui
                .state(buttons, "Save Replay", FontSize::Sml, FAIL_SAVE, 0);
        }

        ctx.gui.pulse(title_id, 1.2);
        ctx.gui.layout(id, 0, 0);
        id
    }
}

impl Screen for FailScreen {
    fn paint(&self, ctx: &Ctx, id: WidgetId, _t: f32, renderer: &mut dyn crate::gui::Renderer) {
        ctx.gui.paint(id, renderer);
        ctx.console
            .paint(&ctx.gui, crate::console_control::HintBar::Death, renderer);
    }

    fn enter(&mut self, ctx: &mut Ctx, prev: ScreenId, _intent: Intent) -> WidgetId {
        ctx.audio.music_fade_out(1.0);

        self.resume = prev != ScreenId::Play;
        if !self.resume {
            self.status = ctx.progress.curr_status();
            self.balls_bought.set(0);
        }

        self.build(ctx)
    }

    fn keybd(&mut self, ctx: &mut Ctx, c: i32, d: bool) -> bool {
        if d {
            // Escape does nothing here: leaving goes through Exit.
            if c == KEY_EXIT && ctx.console.is_pc() {
                return true;
            }
            if ctx.cfg.tst_d(config::KEY_RESTART, c) && ctx.progress.same_avail() {
                if ctx.progress.same() {
                    ctx.goto(ScreenId::Play);
                }
                return true;
            }
        }
        true
    }

    fn buttn(&mut self, ctx: &mut Ctx, b: i32, d: bool) -> bool {
        if d && ctx.cfg.tst_d(config::JOYSTICK_BUTTON_A, b) {
            let active = ctx.gui.active();
            let token = ctx.gui.token(active);
            let value = ctx.gui.value(active);
            return self.action(ctx, token, value);
        }
        true
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            Token::Back | FAIL_OVER => {
                ctx.progress.stop();
                if !replay_retained(ctx, self.status) {
                    if let Err(e) = ctx.demos.play_stop(false) {
                        log::warn!("discarding replay: {e}");
                    }
                }
                ctx.goto(ScreenId::Over);
            }

            FAIL_SAVE => {
                ctx.progress.stop();
                goto_save(ctx, ScreenId::Fail, ScreenId::Fail);
            }

            FAIL_SAME => {
                if ctx.progress.same() {
                    ctx.goto(retry_target(ctx));
                }
            }

            FAIL_ZEN_SWITCH => ctx.goto(ScreenId::ZenWarning),

            FAIL_ASK_MORE => {
                ctx.links.ask_more_balls = value == ASK_MORE_BALLS;
                ctx.goto(ScreenId::AskMore);
            }

            _ => {}
        }
        true
    }
}

// ============================================================
// Zen warning
// ============================================================

const ZEN_ACCEPT: Token = Token::Action(1);

pub struct ZenWarningScreen;

impl Screen for ZenWarningScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "Warning!", FontSize::Med, GUI_RED, GUI_RED);
        ctx.gui.space(id);
        ctx.gui.multi(
            id,
            "If you switch to Zen Mode,\nall Achievements will be disabled!\nAre you sure you want to do that?",
            FontSize::Sml,
            GUI_WHT,
            GUI_WHT,
        );
        ctx.gui.space(id);

        let buttons = ctx.gui.harray(id);
        ctx.gui.start(buttons, "Cancel", FontSize::Sml, Token::Back, 0);
        ctx.gui.state(buttons, "Switch", FontSize::Sml, ZEN_ACCEPT, 0);

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, _value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            ZEN_ACCEPT => {
                let levels = ctx.progress.level_count();
                ctx.progress.init(Mode::Zen, levels);
                if ctx.progress.same() {
                    ctx.goto(retry_target(ctx));
                }
            }
            _ => ctx.goto(ScreenId::Fail),
        }
        true
    }
}

// ============================================================
// Ask more (time or balls)
// ============================================================

const ASK_ACCEPT: Token = Token::Action(1);
const ASK_BUY: Token = Token::Action(2);
const ASK_GET_COINS: Token = Token::Action(3);
const ASK_GET_GEMS: Token = Token::Action(4);

pub struct AskMoreScreen {
    balls_bought: BallsBought,
}

impl AskMoreScreen {
    pub fn new(balls_bought: BallsBought) -> Self {
        Self { balls_bought }
    }

    fn buy_balls(&self, ctx: &mut Ctx) {
        let gems = ctx.account.get_d(WALLET_GEMS);
        if gems < ASK_MORE_BALLS_GEMS {
            return;
        }

        ctx.audio.play(AUD_BUY_PRODUCT, 1.0);
        ctx.account.set_d(WALLET_GEMS, gems - ASK_MORE_BALLS_GEMS);
        let path = ctx.dirs.account_file();
        if let Err(e) = ctx.account.save(&path) {
            log::error!("account save: {e}");
        }

        ctx.progress.buy_balls(1);
        self.balls_bought.set(self.balls_bought.get() + 1);

        if ctx.progress.same() {
            ctx.goto(retry_target(ctx));
        } else {
            ctx.goto(ScreenId::Fail);
        }
    }

    fn buy_mediation(&self, ctx: &mut Ctx) {
        let coins = ctx.account.get_d(WALLET_COINS);
        let gems = ctx.account.get_d(WALLET_GEMS);

        if coins >= MEDIATION_COINS {
            ctx.account.set_d(WALLET_COINS, coins - MEDIATION_COINS);
        } else if gems >= MEDIATION_GEMS {
            ctx.account.set_d(WALLET_GEMS, gems - MEDIATION_GEMS);
        } else {
            return;
        }

        ctx.audio.play(AUD_BUY_PRODUCT, 1.0);
        ctx.account.set_d(PRODUCT_MEDIATION, 1);
        let path = ctx.dirs.account_file();
        if let Err(e) = ctx.account.save(&path) {
            log::error!("account save: {e}");
        }

        let levels = ctx.progress.level_count();
        ctx.progress.init(Mode::Zen, levels);
        if ctx.progress.same() {
            ctx.goto(retry_target(ctx));
        }
    }
}

impl Screen for AskMoreScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        let coins = ctx.account.get_d(WALLET_COINS);
        let gems = ctx.account.get_d(WALLET_GEMS);
        let balls = ctx.links.ask_more_balls;

        let id = ctx.gui.vstack(NONE);

        let topbar = ctx.gui.hstack(id);
        ctx.gui.filler(topbar);
        if ctx.progress.curr_mode() == Mode::Normal {
            ctx.gui
                .label(topbar, &format!("Coins: {coins}"), FontSize::Sml, GUI_WHT, crate::gui::GUI_YEL);
        }
        if ctx.progress.dead() {
            ctx.gui
                .label(topbar, &format!("Gems: {gems}"), FontSize::Sml, GUI_WHT, crate::gui::GUI_CYA);
        }
        ctx.gui.filler(topbar);
        ctx.gui.space(id);

        if balls {
            let affordable = gems >= ASK_MORE_BALLS_GEMS;
            let iap = ctx.policy.get_d(config::POLICY_SHOP_ENABLED_IAP) != 0;

            let title = if affordable || iap { "Buy more balls?" } else { "Sorry!" };
            ctx.gui.title_header(id, title, FontSize::Med, GUI_GRY, GUI_RED);
            ctx.gui.space(id);

            let desc = if affordable {
                format!(
                    "You want to buy more balls\nand restart the level?\n\nYou need {ASK_MORE_BALLS_GEMS} gems from your wallet!"
                )
            } else {
                "You don't have enough gems\nto buy more balls!".to_string()
            };
            ctx.gui.multi(id, &desc, FontSize::Sml, GUI_WHT, GUI_WHT);
            ctx.gui.space(id);

            let buttons = ctx.gui.harray(id);
            if affordable {
                ctx.gui.start(buttons, "No, thanks!", FontSize::Sml, Token::Back, 0);
                ctx.gui.state(buttons, "Buy now!", FontSize::Sml, ASK_BUY, 0);
            } else if iap {
                ctx.gui.start(buttons, "No, thanks!", FontSize::Sml, Token::Back, 0);
                ctx.gui
                    .state(buttons, "Get Gems", FontSize::Sml, ASK_GET_GEMS, ASK_MORE_BALLS_GEMS);
            } else {
                ctx.gui.start(buttons, "OK", FontSize::Sml, Token::Back, 0);
            }
        } else {
            let affordable = coins >= MEDIATION_COINS || gems >= MEDIATION_GEMS;
            let iap = ctx.policy.get_d(config::POLICY_SHOP_ENABLED_IAP) != 0;

            let title = if !ctx.progress.extended() {
                "Ask for more time?"
            } else if affordable || iap {
                "Buy Mediation?"
            } else {
                "Sorry!"
            };
            ctx.gui.title_header(id, title, FontSize::Med, GUI_GRY, GUI_RED);
            ctx.gui.space(id);

            let desc = if affordable {
                format!(
                    "If you want to extend your time,\nbuy Mediation for {MEDIATION_COINS} coins or {MEDIATION_GEMS} gems.\nOnce bought, you will not be able\nto unlock achievements."
                )
            } else if iap {
                format!("You need at least {MEDIATION_COINS} coins to buy Mediation,\nbut you can purchase from the coin shop.")
            } else {
                "You don't have enough coins\nto buy Mediation!".to_string()
            };
            ctx.gui.multi(id, &desc, FontSize::Sml, GUI_WHT, GUI_WHT);
            ctx.gui.space(id);

            let buttons = ctx.gui.harray(id);
            ctx.gui.start(buttons, "No, thanks!", FontSize::Sml, Token::Back, 0);
            if !ctx.progress.extended() {
                let label = format!("Extend (+{EXTEND_SECONDS}s)");
                ctx.gui.state(buttons, &label, FontSize::Sml, ASK_ACCEPT, EXTEND_SECONDS);
            }
            if affordable {
                ctx.gui.state(buttons, "Purchase", FontSize::Sml, ASK_BUY, 0);
            } else if iap {
                ctx.gui
                    .state(buttons, "Get Coins", FontSize::Sml, ASK_GET_COINS, MEDIATION_COINS);
            }
        }

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            Token::Back => ctx.goto(ScreenId::Fail),

            ASK_ACCEPT => {
                ctx.audio.music_fade_in(0.5);
                ctx.progress.extend();
                let _ = value; // extension length is fixed for now
                ctx.goto(ScreenId::Play);
            }

            ASK_BUY => {
                if ctx.links.ask_more_balls {
                    self.buy_balls(ctx);
                } else {
                    self.buy_mediation(ctx);
                }
            }

            ASK_GET_COINS => {
                goto_shop_iap(ctx, ScreenId::AskMorePurchased, ScreenId::Fail, value, false, false);
            }
            ASK_GET_GEMS => {
                goto_shop_iap(ctx, ScreenId::AskMorePurchased, ScreenId::Fail, value, true, false);
            }

            _ => {}
        }
        true
    }
}

// ============================================================
// Post-IAP hand-off
// ============================================================

pub struct AskMorePurchasedScreen {
    balls_bought: BallsBought,
}

impl AskMorePurchasedScreen {
    pub fn new(balls_bought: BallsBought) -> Self {
        Self { balls_bought }
    }
}

impl Screen for AskMorePurchasedScreen {
    /// Not a visible screen: applies the topped-up wallet and forwards.
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        ctx.audio.play(AUD_BUY_PRODUCT, 1.0);

        if ctx.links.ask_more_balls {
            let mut gems = ctx.account.get_d(WALLET_GEMS);
            while gems >= ASK_MORE_BALLS_GEMS {
                gems -= ASK_MORE_BALLS_GEMS;
                ctx.progress.buy_balls(1);
                self.balls_bought.set(self.balls_bought.get() + 1);
            }
            ctx.account.set_d(WALLET_GEMS, gems);

            let path = ctx.dirs.account_file();
            if let Err(e) = ctx.account.save(&path) {
                log::error!("account save: {e}");
            }

            if ctx.progress.same() {
                ctx.goto(retry_target(ctx));
            } else {
                ctx.goto(ScreenId::Fail);
            }
        } else {
            let coins = ctx.account.get_d(WALLET_COINS) - MEDIATION_COINS;
            ctx.account.set_d(WALLET_COINS, coins);
            let path = ctx.dirs.account_file();
            if let Err(e) = ctx.account.save(&path) {
                log::error!("account save: {e}");
            }
            ctx.goto(ScreenId::ZenWarning);
        }

        NONE
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::BUTTON_LEFT;
    use crate::screens::testutil::machine;

    fn fail_after_death(ctx: &mut Ctx) {
        ctx.progress.init(Mode::Challenge, 3);
        ctx.progress.stat(Status::Fall, 0, 10, 1_000);
        ctx.progress.stat(Status::Fall, 0, 10, 1_000);
        ctx.progress.stat(Status::Fall, 0, 10, 1_000);
        assert!(ctx.progress.dead());
    }

    #[test]
    fn exit_leads_to_game_over() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Play);
        ctx.progress.init(Mode::Normal, 3);
        ctx.progress.stat(Status::Fall, 0, 10, 1_000);

        ctx.goto(ScreenId::Fail);
        sm.tick(&mut ctx, 0.0);
        assert_eq!(sm.curr(), Some(ScreenId::Fail));

        // Exit holds initial focus.
        sm.click(&mut ctx, BUTTON_LEFT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Over));
    }

    #[test]
    fn dead_run_offers_balls_and_purchase_revives() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Play);
        fail_after_death(&mut ctx);
        ctx.account.set_d(WALLET_GEMS, 20);

        ctx.goto(ScreenId::Fail);
        sm.tick(&mut ctx, 0.0);

        ctx.links.ask_more_balls = true;
        ctx.goto(ScreenId::AskMore);
        sm.tick(&mut ctx, 0.0);
        assert_eq!(sm.curr(), Some(ScreenId::AskMore));

        // Focus starts on "No, thanks!"; move right to "Buy now!".
        sm.stick(&mut ctx, crate::keys::AXIS_X0, 1.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);

        assert_eq!(ctx.account.get_d(WALLET_GEMS), 5);
        assert!(!ctx.progress.dead());
        assert_eq!(sm.curr(), Some(ScreenId::Level));
    }

    #[test]
    fn extend_returns_to_play_once() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Play);
        ctx.progress.init(Mode::Normal, 3);
        ctx.progress.stat(Status::Time, 0, 10, 1_000);
        ctx.account.set_d(WALLET_COINS, 500);

        ctx.links.ask_more_balls = false;
        ctx.goto(ScreenId::AskMore);
        sm.tick(&mut ctx, 0.0);

        // Move to "Extend".
        sm.stick(&mut ctx, crate::keys::AXIS_X0, 1.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);
        assert!(ctx.progress.extended());
        assert_eq!(sm.curr(), Some(ScreenId::Play));
    }

    #[test]
    fn post_iap_balls_drain_the_gem_wallet() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Play);
        fail_after_death(&mut ctx);
        ctx.account.set_d(WALLET_GEMS, 47);
        ctx.links.ask_more_balls = true;

        ctx.goto(ScreenId::AskMorePurchased);
        sm.tick(&mut ctx, 0.0);

        // 47 gems buys three balls at 15 each.
        assert_eq!(ctx.account.get_d(WALLET_GEMS), 2);
        assert!(!ctx.progress.dead());
        assert_eq!(sm.curr(), Some(ScreenId::Level));
    }

    #[test]
    fn zen_warning_cancel_returns_to_fail() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Play);
        ctx.progress.init(Mode::Normal, 3);

        ctx.goto(ScreenId::ZenWarning);
        sm.tick(&mut ctx, 0.0);
        sm.keybd(&mut ctx, KEY_EXIT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Fail));
    }

    #[test]
    fn zen_switch_restarts_in_zen_mode() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Play);
        ctx.progress.init(Mode::Normal, 3);

        ctx.goto(ScreenId::ZenWarning);
        sm.tick(&mut ctx, 0.0);
        sm.stick(&mut ctx, crate::keys::AXIS_X0, 1.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);

        assert_eq!(ctx.progress.curr_mode(), Mode::Zen);
        assert_eq!(sm.curr(), Some(ScreenId::Level));
    }

    #[test]
    fn low_save_level_discards_the_recording() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Play);
        ctx.cfg.set_d(config::ACCOUNT_SAVE, 0);
        ctx.progress.init(Mode::Normal, 3);
        ctx.progress.stat(Status::Fall, 0, 10, 1_000);

        ctx.demos
            .play_init("Marble", "easy", "lvl", Mode::Normal, 0, 0);
        ctx.demos.play_stat(1_000, 0, Status::Fall);
        ctx.demos.play_stop(true).unwrap();
        assert!(ctx.demos.saved());

        ctx.goto(ScreenId::Fail);
        sm.tick(&mut ctx, 0.0);

        // The retention check ran during enter; Last.nbr is spared but
        // the save button is absent and the pending flag dropped.
        let mut trace = crate::gui::TraceRenderer::default();
        sm.paint(&mut ctx, 0.0, &mut trace);
        assert!(!trace.texts.iter().any(|t| t == "Save Replay"));
    }
}
