// st_done.rs — set / campaign complete
//
// End of a level group. Campaign runs get their own text; set runs show
// the record board and the wallet summary. The Capital splash is a
// short interstitial shown before the summary when a wealth milestone
// was hit.

use rollway_common::config;

use crate::account;
use crate::audio::AUD_SCORE;
use crate::gui::{
    FontSize, Token, WidgetId, GLYPH_CROWN, GLYPH_DIAMOND, GUI_ALL, GUI_BLU, GUI_GRN, GUI_WHT,
    GUI_YEL, NONE,
};
use crate::keys::KEY_EXIT;
use crate::state::{Ctx, Screen, ScreenId};
use crate::transition::Intent;

use super::st_shared::action_gate;
use super::util::{score_board, ScoreView};

const DONE_SHOP: Token = Token::Action(1);
const DONE_TO_GROUP: Token = Token::Action(2);

fn shop_allowed(ctx: &Ctx) -> bool {
    ctx.policy.get_d(config::POLICY_EDITION) > -1
        && ctx.policy.get_d(config::POLICY_SHOP_ENABLED) != 0
}

pub struct DoneScreen {
    resume: bool,
    view: ScoreView,
}

impl Default for DoneScreen {
    fn default() -> Self {
        Self {
            resume: false,
            view: ScoreView::Coins,
        }
    }
}

impl DoneScreen {
    fn campaign_gui(&mut self, ctx: &mut Ctx) -> WidgetId {
        let id = ctx.gui.vstack(NONE);

        let (title, desc) = if ctx.campaign.hardcore() {
            (
                "WOW",
                format!(
                    "You completed all levels\nand you collected {} coins.\n\nA new trophy has been awarded to\nacknowledge your achievement!",
                    ctx.progress.curr_score()
                ),
            )
        } else {
            (
                "Campaign Complete",
                "If you want to keep exploring\nmore levels, select LEVEL SET\nfrom the level group.".to_string(),
            )
        };

        ctx.gui.title_header(id, title, FontSize::Lrg, GUI_BLU, GUI_GRN);
        ctx.gui.space(id);
        ctx.gui.multi(id, &desc, FontSize::Sml, GUI_WHT, GUI_WHT);
        ctx.gui.space(id);

        let buttons = ctx.gui.harray(id);
        ctx.gui
            .start(buttons, "Return to group", FontSize::Sml, DONE_TO_GROUP, 0);
        if shop_allowed(ctx) {
            ctx.gui.state(buttons, "Shop", FontSize::Sml, DONE_SHOP, 0);
        }

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn set_gui(&mut self, ctx: &mut Ctx) -> WidgetId {
        let high = ctx.progress.set_high();
        let id = ctx.gui.vstack(NONE);

        let title_id = if high {
            ctx.gui
                .title_header(id, "New Set Record", FontSize::Med, GUI_GRN, GUI_GRN)
        } else {
            ctx.gui
                .title_header(id, "Set Complete", FontSize::Med, GUI_BLU, GUI_GRN)
        };

        if ctx.policy.get_d(config::POLICY_EDITION) > -1 {
            ctx.gui.space(id);

            let row = ctx.gui.hstack(id);
            ctx.gui.filler(row);

            let pair = ctx.gui.harray(row);
            let gems_id = ctx.gui.count(pair, 1000, FontSize::Med);
            ctx.gui.label(pair, "Gems", FontSize::Sml, GUI_WHT, GUI_WHT);
            let coins_id = ctx.gui.count(pair, 100000, FontSize::Med);
            ctx.gui.label(pair, "Coins", FontSize::Sml, GUI_WHT, GUI_WHT);

            ctx.gui
                .set_count(coins_id, ctx.account.get_d(account::WALLET_COINS));
            ctx.gui
                .set_count(gems_id, ctx.account.get_d(account::WALLET_GEMS));

            ctx.gui.filler(row);
            ctx.gui.set_rect(row, GUI_ALL);
        }

        ctx.gui.space(id);
        let Ctx { gui, progress, .. } = ctx;
        score_board(gui, progress, id, self.view, None);
        ctx.gui.space(id);

        let buttons = ctx.gui.harray(id);
        ctx.gui
            .start(buttons, "Select Level", FontSize::Sml, Token::Back, 0);
        if shop_allowed(ctx) {
            ctx.gui.state(buttons, "Shop", FontSize::Sml, DONE_SHOP, 0);
        }

        if !self.resume {
            ctx.gui.pulse(title_id, 1.2);
        }

        ctx.gui.layout(id, 0, 0);
        id
    }
}

impl Screen for DoneScreen {
    fn enter(&mut self, ctx: &mut Ctx, prev: ScreenId, _intent: Intent) -> WidgetId {
        let high = ctx.progress.set_high();
        if high && (prev == ScreenId::Goal || prev == ScreenId::Capital) {
            ctx.audio.narrator_play(AUD_SCORE);
        }

        self.resume =
            prev == ScreenId::Done || prev == ScreenId::Goal || prev == ScreenId::Capital;

        if ctx.campaign.used() {
            self.campaign_gui(ctx)
        } else {
            self.set_gui(ctx)
        }
    }

    fn keybd(&mut self, ctx: &mut Ctx, c: i32, d: bool) -> bool {
        if d {
            if c == KEY_EXIT && ctx.console.is_pc() {
                return self.action(ctx, Token::Back, 0);
            }
            if ctx.cfg.tst_d(config::KEY_SCORE_NEXT, c) {
                return self.action(ctx, Token::Score, self.view.next().code());
            }
        }
        true
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        ctx.campaign.hardcore_quit();

        match token {
            Token::Back | DONE_TO_GROUP => {
                if ctx.campaign.used() {
                    ctx.campaign.theme_quit();
                    ctx.campaign.quit();
                }
                ctx.goto(ScreenId::Level);
            }

            Token::Score => {
                self.view = ScoreView::from_code(value);
                ctx.goto(ScreenId::Done);
            }

            DONE_SHOP => {
                if ctx.campaign.used() {
                    ctx.campaign.theme_quit();
                    ctx.campaign.quit();
                }
                ctx.goto(ScreenId::Shop);
            }

            _ => {}
        }
        true
    }
}

// ============================================================
// Capital splash
// ============================================================

/// Wealth the splash celebrates.
const CAPITAL_GEMS: i32 = 1500;

pub struct CapitalScreen {
    dismissed: bool,
}

impl Default for CapitalScreen {
    fn default() -> Self {
        Self { dismissed: false }
    }
}

impl Screen for CapitalScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        self.dismissed = false;

        let id = ctx.gui.vstack(NONE);
        let logo = ctx.gui.label(id, GLYPH_CROWN, FontSize::Lrg, GUI_YEL, GUI_YEL);
        let amount = ctx.gui.label(
            id,
            &format!("{GLYPH_DIAMOND} {CAPITAL_GEMS}"),
            FontSize::Med,
            GUI_WHT,
            GUI_YEL,
        );
        let caption = ctx
            .gui
            .label(id, "Wealthiest Capital", FontSize::Sml, GUI_WHT, GUI_WHT);

        ctx.gui.pulse(logo, 1.2);
        ctx.gui.pulse(amount, 1.2);
        ctx.gui.pulse(caption, 1.2);

        ctx.gui.set_rect(id, GUI_ALL);
        ctx.gui.layout(id, 0, 0);
        id
    }

    fn timer(&mut self, ctx: &mut Ctx, id: WidgetId, dt: f32) {
        ctx.gui.timer(id, dt);
        if ctx.state_time > 3.0 && !self.dismissed {
            self.dismissed = true;
            ctx.goto(ScreenId::Done);
        }
    }

    fn keybd(&mut self, ctx: &mut Ctx, c: i32, d: bool) -> bool {
        if d && c == KEY_EXIT && !self.dismissed {
            self.dismissed = true;
            ctx.goto(ScreenId::Done);
        }
        true
    }

    fn buttn(&mut self, ctx: &mut Ctx, b: i32, d: bool) -> bool {
        if d
            && !self.dismissed
            && (ctx.cfg.tst_d(config::JOYSTICK_BUTTON_A, b)
                || ctx.cfg.tst_d(config::JOYSTICK_BUTTON_B, b))
        {
            self.dismissed = true;
            ctx.goto(ScreenId::Done);
        }
        true
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::BUTTON_LEFT;
    use crate::progress::{Mode, Status};
    use crate::screens::testutil::machine;

    fn finish_set(ctx: &mut Ctx) {
        ctx.progress.init(Mode::Normal, 1);
        ctx.progress.stat(Status::Goal, 10, 10, 5_000);
        ctx.progress.next();
        assert!(ctx.progress.done());
    }

    #[test]
    fn select_level_goes_back_to_the_group() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Goal);
        finish_set(&mut ctx);

        ctx.goto(ScreenId::Done);
        sm.tick(&mut ctx, 0.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Level));
    }

    #[test]
    fn shop_button_respects_policy() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Goal);
        finish_set(&mut ctx);
        ctx.policy.set_d(config::POLICY_SHOP_ENABLED, 0);

        ctx.goto(ScreenId::Done);
        sm.tick(&mut ctx, 0.0);

        let mut trace = crate::gui::TraceRenderer::default();
        sm.paint(&mut ctx, 0.0, &mut trace);
        assert!(!trace.texts.iter().any(|t| t == "Shop"));
    }

    #[test]
    fn shop_button_enters_the_shop() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Goal);
        finish_set(&mut ctx);

        ctx.goto(ScreenId::Done);
        sm.tick(&mut ctx, 0.0);

        sm.stick(&mut ctx, crate::keys::AXIS_X0, 1.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Shop));
    }

    #[test]
    fn campaign_variant_quits_the_campaign() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Goal);
        finish_set(&mut ctx);
        ctx.campaign.start(false);

        ctx.goto(ScreenId::Done);
        sm.tick(&mut ctx, 0.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);

        assert!(!ctx.campaign.used());
        assert_eq!(sm.curr(), Some(ScreenId::Level));
    }

    #[test]
    fn capital_auto_advances() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Goal);
        finish_set(&mut ctx);

        ctx.goto(ScreenId::Capital);
        sm.tick(&mut ctx, 0.0);
        sm.paint(&mut ctx, 0.0, &mut crate::gui::NullRenderer);

        sm.tick(&mut ctx, 1.0);
        assert_eq!(sm.curr(), Some(ScreenId::Capital));
        sm.tick(&mut ctx, 2.5);
        assert_eq!(sm.curr(), Some(ScreenId::Done));
    }
}
