// state.rs — screen dispatch
//
// One screen is active at a time; every input and timer event routes to
// it. Screens are trait objects registered per ScreenId, and everything
// they share lives in the explicit Ctx they all receive. Navigation is
// queued: handlers push a request, the machine applies it after the
// dispatch returns.
//
// Screen fades don't block. A goto with animations on runs a fade-out
// phase (old screen still painted), switches, then a fade-in phase.
// Requests arriving mid-fade wait for it; the action-sound gate keeps
// screens from queueing more while one is running.

use rollway_common::config::{self, Config, ServerPolicy};
use rollway_common::fs::UserDirs;
use rollway_common::text::TextInput;

use crate::account::Account;
use crate::audio::Audio;
use crate::campaign::Campaign;
use crate::console_control::{ConsoleControl, Platform};
use crate::demo::DemoKeeper;
use crate::gui::{Gui, Renderer, Token, WidgetId, NONE};
use crate::keys::{BUTTON_LEFT, KEY_EXIT};
use crate::progress::Progress;
use crate::transition::{Intent, Transition};
use crate::wgcl::WgclSession;

// ============================================================
// Screen ids
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    Fail,
    ZenWarning,
    AskMore,
    AskMorePurchased,
    Goal,
    GoalExtraBalls,
    GoalShop,
    Done,
    Capital,
    Over,
    Save,
    Clobber,
    SaveError,
    Name,
    Shop,
    ShopRename,
    ShopUnregistered,
    ShopIap,
    ShopBuy,
    ExpensesExport,
    WgclLogin,
    WgclLoginResult,
    WgclLogoutConfirm,
    WgclErrorOffline,
    Setup,
    Play,
    Level,
    Title,
    Exit,
}

impl ScreenId {
    pub const COUNT: usize = 29;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Direction hint for the fade/slide a goto carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimDir {
    #[default]
    None,
    N,
    E,
    S,
    W,
}

// ============================================================
// Context
// ============================================================

#[derive(Debug, Clone, Copy)]
struct GotoRequest {
    id: ScreenId,
    from: AnimDir,
    to: AnimDir,
    no_animation: bool,
    intent: Intent,
}

/// Parameters one screen sets for another before navigating there: where
/// Save/Name/IAP flows return to, which product the buy screen is
/// confirming. The original kept these in per-file statics behind
/// `goto_*` entry points.
pub struct ScreenLinks {
    pub save_ok: ScreenId,
    pub save_cancel: ScreenId,

    pub name_ok: ScreenId,
    pub name_cancel: ScreenId,
    pub name_draw_back: bool,

    pub login_back: ScreenId,
    pub login_next: ScreenId,

    pub iap_ok: ScreenId,
    pub iap_cancel: ScreenId,
    /// Balance still needed to complete a pending transaction; filters
    /// the tier grid.
    pub iap_min: i32,
    pub iap_page_gems: bool,
    pub iap_multipage: bool,

    pub shop_product: Option<crate::shop::ProductKey>,
    pub shop_use_gems: bool,

    /// Fail screen's "ask more": balls rather than time.
    pub ask_more_balls: bool,
}

impl Default for ScreenLinks {
    fn default() -> Self {
        Self {
            save_ok: ScreenId::Title,
            save_cancel: ScreenId::Title,
            name_ok: ScreenId::Title,
            name_cancel: ScreenId::Title,
            name_draw_back: false,
            login_back: ScreenId::Title,
            login_next: ScreenId::Title,
            iap_ok: ScreenId::Shop,
            iap_cancel: ScreenId::Shop,
            iap_min: 0,
            iap_page_gems: false,
            iap_multipage: false,
            shop_product: None,
            shop_use_gems: false,
            ask_more_balls: false,
        }
    }
}

pub struct Ctx {
    pub gui: Gui,
    pub cfg: Config,
    pub policy: ServerPolicy,
    pub audio: Audio,
    pub input: TextInput,
    pub account: Account,
    pub wgcl: WgclSession,
    pub progress: Progress,
    pub campaign: Campaign,
    pub demos: DemoKeeper,
    pub console: ConsoleControl,
    pub transition: Transition,
    pub dirs: UserDirs,
    pub links: ScreenLinks,

    /// Message for the generic error screens.
    pub last_error: String,

    /// First-run setup wizard in progress; gates Cancel/Back elsewhere.
    pub setup_active: bool,

    /// Seconds since the active screen was entered.
    pub state_time: f32,
    /// True while a screen fade is running; actions gate on this.
    pub animating: bool,

    pending: Vec<GotoRequest>,
    quit: bool,
}

impl Ctx {
    pub fn new(dirs: UserDirs, platform: Platform) -> Self {
        Self {
            gui: Gui::default(),
            cfg: Config::new(),
            policy: ServerPolicy::new(),
            audio: Audio::new(),
            input: TextInput::new(),
            account: Account::new(),
            wgcl: WgclSession::default(),
            progress: Progress::new(),
            campaign: Campaign::new(),
            demos: DemoKeeper::new(dirs.clone()),
            console: ConsoleControl::new(platform),
            transition: Transition::new(),
            dirs,
            links: ScreenLinks::default(),
            last_error: String::new(),
            setup_active: false,
            state_time: 0.0,
            animating: false,
            pending: Vec::new(),
            quit: false,
        }
    }

    /// Request a forward transition to `id`.
    pub fn goto(&mut self, id: ScreenId) {
        self.goto_full(id, AnimDir::None, AnimDir::None, false);
    }

    /// Request a backward transition (slides reverse).
    pub fn back(&mut self, id: ScreenId) {
        self.pending.push(GotoRequest {
            id,
            from: AnimDir::None,
            to: AnimDir::None,
            no_animation: false,
            intent: Intent::Back,
        });
    }

    pub fn goto_full(&mut self, id: ScreenId, from: AnimDir, to: AnimDir, no_animation: bool) {
        self.pending.push(GotoRequest {
            id,
            from,
            to,
            no_animation,
            intent: Intent::Forward,
        });
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    fn animations_on(&self) -> bool {
        self.cfg.get_d(config::SCREEN_ANIMATIONS) != 0
    }
}

// ============================================================
// Screen trait
// ============================================================

#[allow(unused_variables)]
pub trait Screen {
    /// Build the screen's GUI; returns the root widget.
    fn enter(&mut self, ctx: &mut Ctx, prev: ScreenId, intent: Intent) -> WidgetId;

    fn leave(&mut self, ctx: &mut Ctx, next: ScreenId, id: WidgetId, intent: Intent) {
        ctx.gui.delete(id);
    }

    fn paint(&self, ctx: &Ctx, id: WidgetId, t: f32, renderer: &mut dyn Renderer) {
        ctx.gui.paint(id, renderer);
    }

    fn timer(&mut self, ctx: &mut Ctx, id: WidgetId, dt: f32) {
        ctx.gui.timer(id, dt);
    }

    fn point(&mut self, ctx: &mut Ctx, id: WidgetId, x: i32, y: i32, dx: i32, dy: i32) {
        if ctx.console.is_pc() {
            ctx.console.toggle(false);
        }
        let hot = ctx.gui.point(id, x, y);
        if hot != NONE {
            ctx.gui.pulse(hot, 1.2);
        }
    }

    fn stick(&mut self, ctx: &mut Ctx, id: WidgetId, axis: i32, v: f32, bump: bool) {
        let hot = ctx.gui.stick(id, axis, v, bump);
        if hot != NONE {
            ctx.gui.pulse(hot, 1.2);
        }
    }

    fn angle(&mut self, ctx: &mut Ctx, id: WidgetId, x: f32, z: f32) {}

    /// Mouse click; activate the hot widget.
    fn click(&mut self, ctx: &mut Ctx, b: i32, d: bool) -> bool {
        if b == BUTTON_LEFT && d {
            let active = ctx.gui.active();
            let token = ctx.gui.token(active);
            let value = ctx.gui.value(active);
            return self.action(ctx, token, value);
        }
        true
    }

    fn keybd(&mut self, ctx: &mut Ctx, c: i32, d: bool) -> bool {
        if d && c == KEY_EXIT {
            return self.action(ctx, Token::Back, 0);
        }
        true
    }

    fn buttn(&mut self, ctx: &mut Ctx, b: i32, d: bool) -> bool {
        if d {
            let active = ctx.gui.active();
            if ctx.cfg.tst_d(config::JOYSTICK_BUTTON_A, b) {
                let token = ctx.gui.token(active);
                let value = ctx.gui.value(active);
                return self.action(ctx, token, value);
            }
            if ctx.cfg.tst_d(config::JOYSTICK_BUTTON_B, b) {
                return self.action(ctx, Token::Back, 0);
            }
        }
        true
    }

    /// Menu action: a token was activated. Default does nothing.
    fn action(&mut self, ctx: &mut Ctx, token: Token, value: i32) -> bool {
        true
    }
}

// ============================================================
// Stick repeat cache
// ============================================================

const STICK_MAX: usize = 32;
const STICK_HOLD_TIME: f32 = 0.5;
const STICK_REPEAT_TIME: f32 = 0.2;

#[derive(Debug, Clone, Copy)]
struct StickCache {
    axis: i32,
    v: f32,
    prev: f32,
    /// When to re-deliver a held axis; zero = not held.
    t: f32,
}

// ============================================================
// Machine
// ============================================================

const ANIM_SPEED: f32 = 6.0;
const FRAME_SMOOTH: f32 = 1.0 / 25.0;

enum Fade {
    None,
    Out(GotoRequest),
    In,
}

pub struct StateMachine {
    screens: Vec<Option<Box<dyn Screen>>>,
    active: Option<ScreenId>,
    gui_id: WidgetId,
    time: f32,
    drawn: bool,
    sticks: Vec<StickCache>,
    fade: Fade,
    alpha: f32,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            screens: (0..ScreenId::COUNT).map(|_| None).collect(),
            active: None,
            gui_id: NONE,
            time: 0.0,
            drawn: false,
            sticks: Vec::new(),
            fade: Fade::None,
            alpha: 1.0,
        }
    }

    pub fn register(&mut self, id: ScreenId, screen: Box<dyn Screen>) {
        self.screens[id.index()] = Some(screen);
    }

    pub fn curr(&self) -> Option<ScreenId> {
        self.active
    }

    pub fn gui_id(&self) -> WidgetId {
        self.gui_id
    }

    pub fn time_state(&self) -> f32 {
        self.time
    }

    pub fn animating(&self) -> bool {
        !matches!(self.fade, Fade::None)
    }

    /// Install the first screen without any transition.
    pub fn init(&mut self, ctx: &mut Ctx, id: ScreenId) {
        self.switch(ctx, id, Intent::Forward);
        self.alpha = 1.0;
        ctx.animating = false;
    }

    fn with_screen<R>(
        &mut self,
        ctx: &mut Ctx,
        f: impl FnOnce(&mut dyn Screen, &mut Ctx, WidgetId) -> R,
    ) -> Option<R> {
        let id = self.active?;
        let mut screen = self.screens[id.index()].take()?;
        let result = f(screen.as_mut(), ctx, self.gui_id);
        // A screen never re-registers itself mid-dispatch.
        self.screens[id.index()] = Some(screen);
        Some(result)
    }

    /// Leave the old screen and enter the new one.
    fn switch(&mut self, ctx: &mut Ctx, next: ScreenId, intent: Intent) {
        let prev = self.active.unwrap_or(next);

        if let Some(id) = self.active {
            if let Some(mut screen) = self.screens[id.index()].take() {
                screen.leave(ctx, next, self.gui_id, intent);
                self.screens[id.index()] = Some(screen);
            }
        }

        self.active = Some(next);
        self.time = 0.0;
        self.drawn = false;
        self.sticks.clear();
        ctx.state_time = 0.0;

        if let Some(mut screen) = self.screens[next.index()].take() {
            self.gui_id = screen.enter(ctx, prev, intent);
            self.screens[next.index()] = Some(screen);
        } else {
            log::error!("no screen registered for {next:?}");
            self.gui_id = NONE;
        }
    }

    /// Apply queued navigation. Requests made while a fade is running
    /// wait until it completes; the action-sound gate keeps screens from
    /// piling more on in the meantime.
    fn process(&mut self, ctx: &mut Ctx) {
        while !ctx.pending.is_empty() {
            if self.animating() {
                return;
            }

            let request = ctx.pending.remove(0);

            if request.no_animation || !ctx.animations_on() {
                self.switch(ctx, request.id, request.intent);
                self.alpha = 1.0;
            } else {
                self.fade = Fade::Out(request);
                ctx.animating = true;
            }
        }
    }

    fn apply_alpha(&self, ctx: &mut Ctx) {
        if self.gui_id != NONE {
            ctx.gui.set_alpha(self.gui_id, self.alpha);
        }
        let Ctx { gui, console, .. } = ctx;
        console.set_alpha(gui, self.alpha);
    }

    /// Advance time: fades, the active screen's timer, stick repeats and
    /// orphaned transition trees.
    pub fn tick(&mut self, ctx: &mut Ctx, dt: f32) {
        let smooth = ctx.cfg.get_d(config::SMOOTH_FIX) != 0;
        let eff = if smooth { dt.min(FRAME_SMOOTH) } else { dt.min(0.1) };

        match self.fade {
            Fade::Out(request) => {
                self.alpha -= eff * ANIM_SPEED;
                if self.alpha <= 0.0 {
                    self.alpha = 0.0;
                    self.apply_alpha(ctx);
                    self.switch(ctx, request.id, request.intent);
                    self.fade = Fade::In;
                } else {
                    self.apply_alpha(ctx);
                }
            }
            Fade::In => {
                self.alpha += eff * ANIM_SPEED;
                if self.alpha >= 1.0 {
                    self.alpha = 1.0;
                    self.fade = Fade::None;
                    ctx.animating = false;
                }
                self.apply_alpha(ctx);
            }
            Fade::None => {}
        }

        // No timers until the first frame has been seen.
        if self.drawn {
            self.time += dt;
            ctx.state_time = self.time;

            self.with_screen(ctx, |screen, ctx, id| screen.timer(ctx, id, dt));

            // Held sticks re-deliver as fresh bumps.
            let due: Vec<(i32, f32)> = self
                .sticks
                .iter()
                .filter(|sc| sc.t > 0.0 && self.time >= sc.t)
                .map(|sc| (sc.axis, sc.v))
                .collect();
            for (axis, v) in due {
                self.with_screen(ctx, |screen, ctx, id| screen.stick(ctx, id, axis, v, true));
                if let Some(sc) = self.sticks.iter_mut().find(|sc| sc.axis == axis) {
                    sc.t = self.time + STICK_REPEAT_TIME;
                }
            }
        }

        {
            let Ctx { gui, transition, .. } = ctx;
            transition.timer(gui, dt);
        }

        self.process(ctx);
    }

    pub fn paint(&mut self, ctx: &mut Ctx, t: f32, renderer: &mut dyn Renderer) {
        self.drawn = true;

        if let Some(id) = self.active {
            if let Some(screen) = self.screens[id.index()].as_ref() {
                screen.paint(ctx, self.gui_id, t, renderer);
            }
        }

        ctx.transition.paint(&ctx.gui, renderer);
    }

    // ============================================================
    // Event entry points
    // ============================================================

    pub fn point(&mut self, ctx: &mut Ctx, x: i32, y: i32, dx: i32, dy: i32) {
        self.with_screen(ctx, |screen, ctx, id| screen.point(ctx, id, x, y, dx, dy));
        self.process(ctx);
    }

    pub fn stick(&mut self, ctx: &mut Ctx, axis: i32, v: f32) {
        let v = if invert_axis(ctx, axis) { -v } else { v };

        self.cache_stick(axis, v);
        let bump = self.bump_stick(axis);

        self.with_screen(ctx, |screen, ctx, id| screen.stick(ctx, id, axis, v, bump));
        self.process(ctx);
    }

    pub fn angle(&mut self, ctx: &mut Ctx, x: f32, z: f32) {
        self.with_screen(ctx, |screen, ctx, id| screen.angle(ctx, id, x, z));
        self.process(ctx);
    }

    pub fn click(&mut self, ctx: &mut Ctx, b: i32, d: bool) -> bool {
        let r = self
            .with_screen(ctx, |screen, ctx, _| screen.click(ctx, b, d))
            .unwrap_or(true);
        self.process(ctx);
        r
    }

    pub fn keybd(&mut self, ctx: &mut Ctx, c: i32, d: bool) -> bool {
        let r = self
            .with_screen(ctx, |screen, ctx, _| screen.keybd(ctx, c, d))
            .unwrap_or(true);
        self.process(ctx);
        r
    }

    pub fn buttn(&mut self, ctx: &mut Ctx, b: i32, d: bool) -> bool {
        let r = self
            .with_screen(ctx, |screen, ctx, _| screen.buttn(ctx, b, d))
            .unwrap_or(true);
        self.process(ctx);
        r
    }

    fn cache_stick(&mut self, axis: i32, v: f32) {
        let hold_at = self.time + STICK_HOLD_TIME;

        if let Some(sc) = self.sticks.iter_mut().find(|sc| sc.axis == axis) {
            sc.prev = sc.v;
            sc.v = v;
            if v.abs() >= 0.5 && sc.t == 0.0 {
                sc.t = hold_at;
            } else if v.abs() < 0.5 {
                sc.t = 0.0;
            }
            return;
        }

        if self.sticks.len() < STICK_MAX {
            self.sticks.push(StickCache {
                axis,
                v,
                prev: 0.0,
                t: if v.abs() >= 0.5 { hold_at } else { 0.0 },
            });
        }
    }

    /// A bump is the transition from centered to leaned.
    fn bump_stick(&self, axis: i32) -> bool {
        self.sticks
            .iter()
            .find(|sc| sc.axis == axis)
            .map(|sc| (-0.5..=0.5).contains(&sc.prev) && sc.v.abs() > 0.5)
            .unwrap_or(false)
    }
}

fn invert_axis(ctx: &Ctx, axis: i32) -> bool {
    let table = [
        (config::JOYSTICK_AXIS_X0, config::JOYSTICK_AXIS_X0_INVERT),
        (config::JOYSTICK_AXIS_Y0, config::JOYSTICK_AXIS_Y0_INVERT),
        (config::JOYSTICK_AXIS_X1, config::JOYSTICK_AXIS_X1_INVERT),
        (config::JOYSTICK_AXIS_Y1, config::JOYSTICK_AXIS_Y1_INVERT),
    ];
    table
        .iter()
        .any(|&(num, inv)| ctx.cfg.tst_d(num, axis) && ctx.cfg.get_d(inv) != 0)
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::{FontSize, NullRenderer};
    use crate::keys::AXIS_X0;

    struct Probe {
        label: &'static str,
        next: Option<ScreenId>,
    }

    impl Probe {
        fn new(label: &'static str, next: Option<ScreenId>) -> Self {
            Self { label, next }
        }
    }

    impl Screen for Probe {
        fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
            let id = ctx.gui.vstack(NONE);
            ctx.gui.start(id, self.label, FontSize::Sml, Token::Action(1), 0);
            ctx.gui.layout(id, 0, 0);
            id
        }

        fn action(&mut self, ctx: &mut Ctx, token: Token, _value: i32) -> bool {
            if token == Token::Action(1) {
                if let Some(next) = self.next {
                    ctx.goto(next);
                }
            }
            true
        }
    }

    fn harness() -> (StateMachine, Ctx, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let dirs = UserDirs::at(dir.path().to_path_buf()).unwrap();
        let mut ctx = Ctx::new(dirs, Platform::Pc);
        ctx.cfg.set_d(config::SCREEN_ANIMATIONS, 0);

        let mut sm = StateMachine::new();
        sm.register(ScreenId::Title, Box::new(Probe::new("title", Some(ScreenId::Shop))));
        sm.register(ScreenId::Shop, Box::new(Probe::new("shop", None)));
        sm.init(&mut ctx, ScreenId::Title);
        (sm, ctx, dir)
    }

    #[test]
    fn button_a_activates_and_switches() {
        let (mut sm, mut ctx, _dir) = harness();
        assert_eq!(sm.curr(), Some(ScreenId::Title));

        let a = ctx.cfg.get_d(config::JOYSTICK_BUTTON_A);
        sm.buttn(&mut ctx, a, true);
        assert_eq!(sm.curr(), Some(ScreenId::Shop));
    }

    #[test]
    fn click_activates_the_focused_widget() {
        let (mut sm, mut ctx, _dir) = harness();
        sm.click(&mut ctx, BUTTON_LEFT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Shop));
    }

    #[test]
    fn timer_waits_for_first_paint() {
        let (mut sm, mut ctx, _dir) = harness();
        sm.tick(&mut ctx, 1.0);
        assert_eq!(sm.time_state(), 0.0);

        sm.paint(&mut ctx, 0.0, &mut NullRenderer);
        sm.tick(&mut ctx, 1.0);
        assert!(sm.time_state() > 0.9);
    }

    #[test]
    fn fade_runs_out_then_in() {
        let (mut sm, mut ctx, _dir) = harness();
        ctx.cfg.set_d(config::SCREEN_ANIMATIONS, 1);
        sm.paint(&mut ctx, 0.0, &mut NullRenderer);

        ctx.goto(ScreenId::Shop);
        sm.tick(&mut ctx, 0.0);
        assert!(sm.animating());
        // Still on the old screen while fading out.
        assert_eq!(sm.curr(), Some(ScreenId::Title));

        // Walk the fade to the switch point and through fade-in.
        for _ in 0..60 {
            sm.tick(&mut ctx, 0.02);
        }
        assert_eq!(sm.curr(), Some(ScreenId::Shop));
        assert!(!sm.animating());
    }

    #[test]
    fn requests_during_a_fade_wait_their_turn() {
        let (mut sm, mut ctx, _dir) = harness();
        ctx.cfg.set_d(config::SCREEN_ANIMATIONS, 1);
        sm.paint(&mut ctx, 0.0, &mut NullRenderer);

        ctx.goto(ScreenId::Shop);
        sm.tick(&mut ctx, 0.0);
        assert!(sm.animating());

        // Queued mid-fade; applies only after the first fade completes.
        ctx.goto(ScreenId::Title);
        for _ in 0..30 {
            sm.tick(&mut ctx, 0.02);
        }
        assert_eq!(sm.curr(), Some(ScreenId::Shop));
        for _ in 0..60 {
            sm.tick(&mut ctx, 0.02);
        }
        assert_eq!(sm.curr(), Some(ScreenId::Title));
    }

    #[test]
    fn held_stick_repeats_after_hold_time() {
        let (mut sm, mut ctx, _dir) = harness();
        sm.paint(&mut ctx, 0.0, &mut NullRenderer);

        sm.stick(&mut ctx, AXIS_X0, 1.0);
        // Within the hold window nothing re-delivers.
        sm.tick(&mut ctx, 0.3);
        assert!(sm.sticks.iter().any(|sc| sc.t > 0.0));

        // Past the hold time the axis re-delivers and re-arms.
        sm.tick(&mut ctx, 0.3);
        let sc = sm.sticks.iter().find(|sc| sc.axis == AXIS_X0).unwrap();
        assert!(sc.t > sm.time_state());
    }

    #[test]
    fn releasing_the_stick_disarms_repeat() {
        let (mut sm, mut ctx, _dir) = harness();
        sm.paint(&mut ctx, 0.0, &mut NullRenderer);

        sm.stick(&mut ctx, AXIS_X0, 1.0);
        sm.stick(&mut ctx, AXIS_X0, 0.1);
        let sc = sm.sticks.iter().find(|sc| sc.axis == AXIS_X0).unwrap();
        assert_eq!(sc.t, 0.0);
    }

    #[test]
    fn axis_inversion_flips_values() {
        let (mut sm, mut ctx, _dir) = harness();
        ctx.cfg.set_d(config::JOYSTICK_AXIS_X0_INVERT, 1);
        sm.paint(&mut ctx, 0.0, &mut NullRenderer);

        sm.stick(&mut ctx, AXIS_X0, 1.0);
        let sc = sm.sticks.iter().find(|sc| sc.axis == AXIS_X0).unwrap();
        assert_eq!(sc.v, -1.0);
    }

    #[test]
    fn switch_resets_clock_and_sticks() {
        let (mut sm, mut ctx, _dir) = harness();
        sm.paint(&mut ctx, 0.0, &mut NullRenderer);
        sm.stick(&mut ctx, AXIS_X0, 1.0);
        sm.tick(&mut ctx, 1.0);

        ctx.goto(ScreenId::Shop);
        sm.tick(&mut ctx, 0.0);
        assert_eq!(sm.time_state(), 0.0);
        assert!(sm.sticks.is_empty());
    }
}
