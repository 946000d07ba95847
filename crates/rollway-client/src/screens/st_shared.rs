// st_shared.rs — handlers and helpers every screen leans on
//
// The default Screen trait methods already cover hot-tracking and
// activation; what lives here is the action audio gate, player/replay
// name validation, and the session teardown run when a flow leaves play
// entirely.

use crate::audio::{AUD_BACK, AUD_DISABLED, AUD_MENU};
use crate::gui::{FontSize, Token, WidgetId, GUI_WHT, NONE};
use crate::state::{Ctx, Screen, ScreenId};
use crate::transition::Intent;

/// Action entry gate: while a screen transition is animating every
/// action is refused with the disabled blip; otherwise the appropriate
/// menu sound plays. Returns false when the action must not proceed.
pub fn action_gate(ctx: &mut Ctx, token: Token) -> bool {
    if ctx.animating {
        ctx.audio.play(AUD_DISABLED, 1.0);
        return false;
    }

    let cue = match token {
        Token::Back => AUD_BACK,
        Token::None => AUD_DISABLED,
        _ => AUD_MENU,
    };
    ctx.audio.play(cue, 1.0);

    token != Token::None
}

/// Characters that cannot appear in player or replay names (they are
/// used in filesystem paths).
pub fn has_reserved_chars(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
}

/// A usable player name: at least three characters, no reserved ones.
pub fn player_name_ok(s: &str) -> bool {
    s.chars().count() >= 3 && !has_reserved_chars(s)
}

/// Full teardown when a flow leaves play for good: stop the recorder,
/// close out progress and campaign state.
pub fn session_teardown(ctx: &mut Ctx) {
    if let Err(e) = ctx.demos.play_stop(false) {
        log::warn!("discarding replay on teardown: {e}");
    }
    ctx.progress.exit();
    ctx.campaign.quit();
}

// ============================================================
// Boundary screens
//
// Real gameplay, the level selector and the title menu live outside this
// layer; these minimal bodies give the menu flows concrete places to
// land.
// ============================================================

pub struct TitleScreen;

impl Screen for TitleScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        ctx.gui.title_header(id, "Rollway", FontSize::Lrg, GUI_WHT, GUI_WHT);
        ctx.gui.layout(id, 0, 0);
        id
    }
}

pub struct LevelScreen;

impl Screen for LevelScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        ctx.gui.label(id, "Level", FontSize::Med, GUI_WHT, GUI_WHT);
        ctx.gui.layout(id, 0, 0);
        id
    }
}

pub struct PlayScreen;

impl Screen for PlayScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        // Gameplay renders the world; there is no menu GUI here.
        let _ = ctx;
        NONE
    }
}

pub struct ExitScreen;

impl Screen for ExitScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        session_teardown(ctx);
        ctx.request_quit();
        NONE
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_chars() {
        assert!(has_reserved_chars("a/b"));
        assert!(has_reserved_chars("what?"));
        assert!(!has_reserved_chars("plain-name_01"));
    }

    #[test]
    fn player_names() {
        assert!(player_name_ok("Rob"));
        assert!(!player_name_ok("ab"));
        assert!(!player_name_ok("a*c"));
        assert!(player_name_ok("\u{00e9}\u{00e9}\u{00e9}"));
    }
}
