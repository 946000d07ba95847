// screens — the st_* family
//
// One module per flow, mirroring the screens the game presents. Every
// screen registers against its ScreenId here.

pub mod st_done;
pub mod st_fail;
pub mod st_goal;
pub mod st_name;
pub mod st_over;
pub mod st_save;
pub mod st_setup;
pub mod st_shared;
pub mod st_shop;
pub mod st_wgcl;
pub mod util;

use std::cell::Cell;
use std::rc::Rc;

use crate::state::{ScreenId, StateMachine};

/// Register every screen. The fail-flow screens share a purchase
/// counter, created here.
pub fn register_all(sm: &mut StateMachine) {
    let balls_bought: st_fail::BallsBought = Rc::new(Cell::new(0));

    sm.register(ScreenId::Fail, Box::new(st_fail::FailScreen::new(Rc::clone(&balls_bought))));
    sm.register(ScreenId::ZenWarning, Box::new(st_fail::ZenWarningScreen));
    sm.register(ScreenId::AskMore, Box::new(st_fail::AskMoreScreen::new(Rc::clone(&balls_bought))));
    sm.register(
        ScreenId::AskMorePurchased,
        Box::new(st_fail::AskMorePurchasedScreen::new(balls_bought)),
    );

    sm.register(ScreenId::Goal, Box::new(st_goal::GoalScreen::default()));
    sm.register(ScreenId::GoalExtraBalls, Box::new(st_goal::GoalExtraBallsScreen));
    sm.register(ScreenId::GoalShop, Box::new(st_goal::GoalShopScreen));

    sm.register(ScreenId::Done, Box::new(st_done::DoneScreen::default()));
    sm.register(ScreenId::Capital, Box::new(st_done::CapitalScreen::default()));
    sm.register(ScreenId::Over, Box::new(st_over::OverScreen::default()));

    sm.register(ScreenId::Save, Box::new(st_save::SaveScreen::default()));
    sm.register(ScreenId::Clobber, Box::new(st_save::ClobberScreen));
    sm.register(ScreenId::SaveError, Box::new(st_save::SaveErrorScreen));
    sm.register(ScreenId::Name, Box::new(st_name::NameScreen::default()));

    sm.register(ScreenId::Shop, Box::new(st_shop::ShopScreen));
    sm.register(ScreenId::ShopRename, Box::new(st_shop::ShopRenameScreen));
    sm.register(ScreenId::ShopUnregistered, Box::new(st_shop::ShopUnregisteredScreen));
    sm.register(ScreenId::ShopIap, Box::new(st_shop::ShopIapScreen));
    sm.register(ScreenId::ShopBuy, Box::new(st_shop::ShopBuyScreen::default()));
    sm.register(ScreenId::ExpensesExport, Box::new(st_shop::ExpensesExportScreen::default()));

    sm.register(ScreenId::WgclLogin, Box::new(st_wgcl::WgclLoginScreen::new()));
    sm.register(ScreenId::WgclLoginResult, Box::new(st_wgcl::WgclLoginResultScreen));
    sm.register(ScreenId::WgclLogoutConfirm, Box::new(st_wgcl::WgclLogoutConfirmScreen));
    sm.register(ScreenId::WgclErrorOffline, Box::new(st_wgcl::WgclErrorOfflineScreen));

    sm.register(ScreenId::Setup, Box::new(st_setup::SetupScreen::default()));

    sm.register(ScreenId::Play, Box::new(st_shared::PlayScreen));
    sm.register(ScreenId::Level, Box::new(st_shared::LevelScreen));
    sm.register(ScreenId::Title, Box::new(st_shared::TitleScreen));
    sm.register(ScreenId::Exit, Box::new(st_shared::ExitScreen));
}

// ============================================================
// Test harness
// ============================================================

#[cfg(test)]
pub(crate) mod testutil {
    use rollway_common::config;
    use rollway_common::fs::UserDirs;

    use crate::console_control::Platform;
    use crate::state::{Ctx, ScreenId, StateMachine};
    use crate::wgcl::{WgclBackend, WgclDelta, WgclSession};

    /// A machine with every screen registered, animations off, rooted
    /// in a temp dir, initialized at `start`.
    pub fn machine(start: ScreenId) -> (StateMachine, Ctx, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let dirs = UserDirs::at(dir.path().to_path_buf()).unwrap();
        let mut ctx = Ctx::new(dirs, Platform::Pc);
        ctx.cfg.set_d(config::SCREEN_ANIMATIONS, 0);

        let mut sm = StateMachine::new();
        super::register_all(&mut sm);
        sm.init(&mut ctx, start);
        (sm, ctx, dir)
    }

    struct TestBackend {
        accept: bool,
    }

    impl WgclBackend for TestBackend {
        fn login(&mut self, _: &str, _: &str) -> bool {
            self.accept
        }
        fn logout(&mut self) -> bool {
            true
        }
        fn push_add(&mut self, _: &WgclDelta) -> bool {
            true
        }
        fn push_set(&mut self, _: &WgclDelta) -> bool {
            true
        }
        fn online(&self) -> bool {
            true
        }
    }

    /// Same, but with an online WGCL backend that accepts or rejects
    /// every login.
    pub fn machine_with_backend(
        start: ScreenId,
        accept: bool,
    ) -> (StateMachine, Ctx, tempfile::TempDir) {
        let (sm, mut ctx, dir) = machine(start);
        ctx.wgcl = WgclSession::new(Box::new(TestBackend { accept }));
        (sm, ctx, dir)
    }
}

// ============================================================
// Flow tests across screens
// ============================================================

#[cfg(test)]
mod tests {
    use super::testutil::machine;
    use crate::keys::KEY_EXIT;
    use crate::state::ScreenId;

    #[test]
    fn every_screen_is_registered() {
        // init would log an error for unregistered screens; walking a
        // few long flows end to end exercises the registry.
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);

        for id in [
            ScreenId::Shop,
            ScreenId::ShopIap,
            ScreenId::WgclLogin,
            ScreenId::Setup,
            ScreenId::Title,
        ] {
            ctx.goto(id);
            sm.tick(&mut ctx, 0.0);
            assert_eq!(sm.curr(), Some(id));
        }
    }

    #[test]
    fn back_from_shop_returns_to_previous_screen() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        ctx.cfg.set_s(rollway_common::config::PLAYER, "Marble");

        ctx.goto(ScreenId::Shop);
        sm.tick(&mut ctx, 0.0);
        sm.keybd(&mut ctx, KEY_EXIT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Title));
    }

    #[test]
    fn exit_screen_tears_down_and_requests_quit() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        ctx.progress.init(crate::progress::Mode::Normal, 2);
        ctx.campaign.start(false);

        ctx.goto(ScreenId::Exit);
        sm.tick(&mut ctx, 0.0);

        assert!(ctx.quit_requested());
        assert!(!ctx.campaign.used());
        assert!(!ctx.progress.playing());
    }
}
