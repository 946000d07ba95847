// st_over.rs — game over
//
// A dead challenge run ends here (a bankrupt account gets its own
// banner). Whatever the run was worth — remaining balls at a hundred
// apiece plus the score — is salvaged into the wallet exactly once, on
// the entry that came from the fail screen.

use rollway_common::config;

use crate::audio::{AUD_BANKRUPT, AUD_OVER, AUD_SHATTER};
use crate::campaign::HardcoreData;
use crate::gui::{FontSize, Token, WidgetId, GUI_ALL, GUI_BLK, GUI_RED, GUI_WHT, NONE};
use crate::keys::KEY_EXIT;
use crate::state::{Ctx, Screen, ScreenId};
use crate::transition::Intent;

use super::st_shared::action_gate;
use super::util::{score_board, ScoreView};

const OVER_TO_GROUP: Token = Token::Action(1);
const OVER_SHOP: Token = Token::Action(2);

pub struct OverScreen {
    resume: bool,
    view: ScoreView,
}

impl Default for OverScreen {
    fn default() -> Self {
        Self {
            resume: false,
            view: ScoreView::Coins,
        }
    }
}

impl OverScreen {
    fn hardcore_gui(&mut self, ctx: &mut Ctx) -> WidgetId {
        let data: HardcoreData = ctx.campaign.hardcore_data();

        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "GAME OVER", FontSize::Med, GUI_BLK, GUI_RED);
        ctx.gui.space(id);

        let report = format!(
            "You completed {} levels\nand collected {} coins.\n\nYou managed to reach:\n{} (X: {:.0}; Y: {:.0})\n\n{}",
            data.levels_completed(),
            ctx.progress.curr_score(),
            data.theme.name(),
            data.coordinates[0],
            data.coordinates[1],
            data.theme.report_line(),
        );
        ctx.gui.multi(id, &report, FontSize::Sml, GUI_WHT, GUI_WHT);
        ctx.gui.space(id);

        let buttons = ctx.gui.harray(id);
        ctx.gui
            .start(buttons, "Return to group", FontSize::Sml, OVER_TO_GROUP, 0);
        if ctx.policy.get_d(config::POLICY_EDITION) > -1
            && ctx.policy.get_d(config::POLICY_SHOP_ENABLED) != 0
        {
            ctx.gui.state(buttons, "Shop", FontSize::Sml, OVER_SHOP, 0);
        }

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn set_gui(&mut self, ctx: &mut Ctx) -> WidgetId {
        let id = ctx.gui.vstack(NONE);

        let banner = if ctx.account.bankrupt() {
            "Bankrupt"
        } else {
            "GAME OVER"
        };
        let title_id = ctx
            .gui
            .title_header(id, banner, FontSize::Med, GUI_BLK, GUI_RED);

        ctx.gui.space(id);

        let row = ctx.gui.hstack(id);
        ctx.gui.filler(row);
        let pair = ctx.gui.harray(row);
        let salvage_id = ctx.gui.count(pair, 1000, FontSize::Med);
        ctx.gui.label(pair, "Coins", FontSize::Sml, GUI_WHT, GUI_WHT);
        ctx.gui.set_count(salvage_id, ctx.progress.curr_score());
        ctx.gui.filler(row);
        ctx.gui.set_rect(row, GUI_ALL);

        ctx.gui.space(id);
        let Ctx { gui, progress, .. } = ctx;
        score_board(gui, progress, id, self.view, None);
        ctx.gui.space(id);

        let buttons = ctx.gui.harray(id);
        ctx.gui
            .start(buttons, "Select Level", FontSize::Sml, Token::Back, 0);

        if !self.resume && ctx.policy.get_d(config::POLICY_EDITION) > -1 {
            ctx.gui.pulse(title_id, 1.2);

            // Salvage payout, once.
            let salvage = ctx.progress.curr_balls().max(0) * 100 + ctx.progress.curr_score();
            ctx.account.add_coins(salvage);
            let path = ctx.dirs.account_file();
            if let Err(e) = ctx.account.save(&path) {
                log::error!("account save: {e}");
            }
        }

        ctx.gui.layout(id, 0, 0);
        id
    }
}

impl Screen for OverScreen {
    fn enter(&mut self, ctx: &mut Ctx, prev: ScreenId, _intent: Intent) -> WidgetId {
        self.resume = prev != ScreenId::Fail;

        if !self.resume {
            ctx.audio.music_fade_out(0.0);
            ctx.audio.narrator_play(AUD_OVER);
            ctx.audio.play(AUD_SHATTER, 1.0);
            if ctx.account.bankrupt() {
                ctx.audio.play(AUD_BANKRUPT, 1.0);
            }
        }

        if ctx.campaign.used() && ctx.campaign.hardcore() {
            self.hardcore_gui(ctx)
        } else {
            self.set_gui(ctx)
        }
    }

    fn keybd(&mut self, ctx: &mut Ctx, c: i32, d: bool) -> bool {
        if d {
            if c == KEY_EXIT {
                let token = if ctx.campaign.hardcore() {
                    OVER_TO_GROUP
                } else {
                    Token::Back
                };
                return self.action(ctx, token, 0);
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

        match token {
            Token::Back | OVER_TO_GROUP => {
                ctx.campaign.hardcore_quit();
                ctx.campaign.theme_quit();
                ctx.campaign.quit();
                ctx.goto(ScreenId::Level);
            }

            Token::Score => {
                self.view = ScoreView::from_code(value);
                ctx.goto(ScreenId::Over);
            }

            OVER_SHOP => {
                ctx.campaign.hardcore_quit();
                ctx.campaign.theme_quit();
                ctx.campaign.quit();
                ctx.goto(ScreenId::Shop);
            }

            _ => {}
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
    use crate::account;
    use crate::keys::BUTTON_LEFT;
    use crate::progress::{Mode, Status};
    use crate::screens::testutil::machine;

    fn dead_run(ctx: &mut Ctx) {
        ctx.progress.init(Mode::Challenge, 3);
        ctx.progress.stat(Status::Goal, 50, 50, 5_000);
        ctx.progress.stat(Status::Fall, 0, 10, 1_000);
        ctx.progress.stat(Status::Fall, 0, 10, 1_000);
        ctx.progress.stat(Status::Fall, 0, 10, 1_000);
    }

    #[test]
    fn salvage_pays_once() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Fail);
        dead_run(&mut ctx);

        ctx.goto(ScreenId::Over);
        sm.tick(&mut ctx, 0.0);

        // Dead run: -1 balls clamp to zero, salvage = score only.
        assert_eq!(ctx.account.get_d(account::WALLET_COINS), 50);

        // Re-entering from elsewhere does not pay again.
        ctx.goto(ScreenId::Title);
        sm.tick(&mut ctx, 0.0);
        ctx.goto(ScreenId::Over);
        sm.tick(&mut ctx, 0.0);
        assert_eq!(ctx.account.get_d(account::WALLET_COINS), 50);
    }

    #[test]
    fn bankrupt_banner_and_cue() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Fail);
        dead_run(&mut ctx);
        ctx.account.set_d(account::WALLET_GEMS, -5);

        ctx.goto(ScreenId::Over);
        sm.tick(&mut ctx, 0.0);

        let mut trace = crate::gui::TraceRenderer::default();
        sm.paint(&mut ctx, 0.0, &mut trace);
        assert!(trace.texts.iter().any(|t| t == "Bankrupt"));
        assert!(ctx.audio.cues().iter().any(|c| c == AUD_BANKRUPT));
    }

    #[test]
    fn back_returns_to_level_select() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Fail);
        dead_run(&mut ctx);

        ctx.goto(ScreenId::Over);
        sm.tick(&mut ctx, 0.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Level));
    }

    #[test]
    fn hardcore_over_shows_the_run_report() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Fail);
        dead_run(&mut ctx);
        ctx.campaign.start(true);
        ctx.campaign.hardcore_next_level();
        ctx.campaign.set_coordinates(12.0, 34.0);

        ctx.goto(ScreenId::Over);
        sm.tick(&mut ctx, 0.0);

        let mut trace = crate::gui::TraceRenderer::default();
        sm.paint(&mut ctx, 0.0, &mut trace);
        assert!(trace
            .texts
            .iter()
            .any(|t| t.contains("You completed 1 levels")));
    }
}
