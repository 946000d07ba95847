// console_control.rs — controller button hints
//
// Consoles show a hint bar naming the physical buttons for the current
// screen. Two lookups stack: the player may have rebound a role to a
// different physical button, so the configured index re-routes first,
// then the platform picks the vendor glyph.

use rollway_common::config::{self, Config};

use crate::gui::{FontSize, Gui, Renderer, WidgetId, GUI_GRY, GUI_WHT, NONE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Pc,
    Xbox,
    Ps,
    Switch,
    SteamDeck,
    Handset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    A,
    B,
    X,
    Y,
    Lb,
    Rb,
    Lt,
    Rt,
    Ls,
    Rs,
    Start,
    Select,
}

/// Physical button index as the pad reports it.
pub fn role_for_index(index: i32) -> Option<ButtonRole> {
    match index {
        0 => Some(ButtonRole::A),
        1 => Some(ButtonRole::B),
        2 => Some(ButtonRole::X),
        3 => Some(ButtonRole::Y),
        4 => Some(ButtonRole::Lb),
        5 => Some(ButtonRole::Lt),
        6 => Some(ButtonRole::Rb),
        7 => Some(ButtonRole::Rt),
        8 => Some(ButtonRole::Start),
        9 => Some(ButtonRole::Select),
        13 => Some(ButtonRole::Ls),
        15 => Some(ButtonRole::Rs),
        _ => None,
    }
}

/// Vendor glyph for a role.
pub fn glyph(platform: Platform, role: ButtonRole) -> &'static str {
    use ButtonRole::*;
    use Platform::*;

    match platform {
        Pc => "",
        Xbox | Handset => match role {
            A => "A",
            B => "B",
            X => "X",
            Y => "Y",
            Lb => "LB",
            Rb => "RB",
            Lt => "LT",
            Rt => "RT",
            Ls => "LS",
            Rs => "RS",
            Start => "\u{25c0}",
            Select => "\u{25b6}",
        },
        Ps => match role {
            A => "\u{00d7}",
            B => "\u{25cb}",
            X => "\u{25fb}",
            Y => "\u{25b3}",
            Lb => "L1",
            Rb => "R1",
            Lt => "L2",
            Rt => "R2",
            Ls => "L3",
            Rs => "R3",
            Start => "\u{25c0}",
            Select => "\u{25b6}",
        },
        SteamDeck => match role {
            A => "A",
            B => "B",
            X => "X",
            Y => "Y",
            Lb => "L1",
            Rb => "R1",
            Lt => "L2",
            Rt => "R2",
            Ls => "L3",
            Rs => "R3",
            Start => "-",
            Select => "+",
        },
        Switch => match role {
            A => "A",
            B => "B",
            X => "X",
            Y => "Y",
            Lb => "L",
            Rb => "R",
            Lt => "ZL",
            Rt => "ZR",
            Ls => "LS",
            Rs => "RS",
            Start => "+",
            Select => "-",
        },
    }
}

/// Glyph for a role, honoring the configured physical binding: a pad
/// with B bound where A usually sits shows B's glyph.
pub fn button_glyph(platform: Platform, role: ButtonRole, configured_index: i32) -> &'static str {
    let actual = role_for_index(configured_index).unwrap_or(role);
    glyph(platform, actual)
}

// ============================================================
// Hint bars
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintBar {
    Title,
    List,
    Paused,
    Shop,
    GetCoins,
    Death,
    Keyboard,
}

const BAR_COUNT: usize = 7;

fn bar_slot(bar: HintBar) -> usize {
    match bar {
        HintBar::Title => 0,
        HintBar::List => 1,
        HintBar::Paused => 2,
        HintBar::Shop => 3,
        HintBar::GetCoins => 4,
        HintBar::Death => 5,
        HintBar::Keyboard => 6,
    }
}

#[derive(Default)]
pub struct ConsoleControl {
    platform: Platform,
    /// On PC the hints stay hidden until a pad is touched.
    shown: bool,
    bars: [WidgetId; BAR_COUNT],
}

impl ConsoleControl {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            shown: platform != Platform::Pc,
            bars: [NONE; BAR_COUNT],
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_pc(&self) -> bool {
        self.platform == Platform::Pc
    }

    pub fn shown(&self) -> bool {
        self.shown
    }

    /// Mouse movement hides the hints on PC; pad input brings them back.
    pub fn toggle(&mut self, shown: bool) {
        if self.platform == Platform::Pc {
            self.shown = shown;
        }
    }

    fn hint(&self, gui: &mut Gui, bar: WidgetId, text: &str, role: ButtonRole, index: i32) {
        gui.label(bar, text, FontSize::Sml, GUI_WHT, GUI_WHT);
        gui.label(
            bar,
            button_glyph(self.platform, role, index),
            FontSize::Sml,
            GUI_GRY,
            GUI_WHT,
        );
        gui.space(bar);
    }

    /// Build every hint bar. Cheap enough to rebuild wholesale when the
    /// bindings change.
    pub fn init(&mut self, gui: &mut Gui, cfg: &Config) {
        self.free(gui);

        let a = cfg.get_d(config::JOYSTICK_BUTTON_A);
        let b = cfg.get_d(config::JOYSTICK_BUTTON_B);
        let y = cfg.get_d(config::JOYSTICK_BUTTON_Y);
        let x = cfg.get_d(config::JOYSTICK_BUTTON_X);
        let l2 = cfg.get_d(config::JOYSTICK_BUTTON_L2);
        let r2 = cfg.get_d(config::JOYSTICK_BUTTON_R2);

        // Title: Switch and Steam Deck have system-level quit, no Exit
        // hint there.
        let title = gui.hstack(NONE);
        if self.platform != Platform::Switch && self.platform != Platform::SteamDeck {
            self.hint(gui, title, "Exit", ButtonRole::B, b);
        }
        self.hint(gui, title, "Select", ButtonRole::A, a);
        gui.layout(title, 0, -1);
        self.bars[bar_slot(HintBar::Title)] = title;

        let list = gui.hstack(NONE);
        self.hint(gui, list, "Back", ButtonRole::B, b);
        self.hint(gui, list, "Select", ButtonRole::A, a);
        gui.layout(list, 0, -1);
        self.bars[bar_slot(HintBar::List)] = list;

        let paused = gui.hstack(NONE);
        self.hint(gui, paused, "Back", ButtonRole::B, b);
        self.hint(gui, paused, "Select", ButtonRole::A, a);
        gui.layout(paused, 0, -1);
        self.bars[bar_slot(HintBar::Paused)] = paused;

        let shop = gui.hstack(NONE);
        self.hint(gui, shop, "Back", ButtonRole::B, b);
        self.hint(gui, shop, "Get Coins", ButtonRole::Y, y);
        self.hint(gui, shop, "Select", ButtonRole::A, a);
        gui.layout(shop, 0, -1);
        self.bars[bar_slot(HintBar::Shop)] = shop;

        let getcoins = gui.hstack(NONE);
        self.hint(gui, getcoins, "Back", ButtonRole::B, b);
        self.hint(gui, getcoins, "Select", ButtonRole::A, a);
        gui.layout(getcoins, 0, -1);
        self.bars[bar_slot(HintBar::GetCoins)] = getcoins;

        let death = gui.hstack(NONE);
        self.hint(gui, death, "Select", ButtonRole::A, a);
        gui.layout(death, 0, -1);
        self.bars[bar_slot(HintBar::Death)] = death;

        let keyboard = gui.hstack(NONE);
        self.hint(gui, keyboard, "Erase", ButtonRole::X, x);
        self.hint(gui, keyboard, "Caps", ButtonRole::Lt, l2);
        self.hint(gui, keyboard, "Submit", ButtonRole::Rt, r2);
        self.hint(gui, keyboard, "Select", ButtonRole::A, a);
        gui.layout(keyboard, 0, -1);
        self.bars[bar_slot(HintBar::Keyboard)] = keyboard;
    }

    pub fn free(&mut self, gui: &mut Gui) {
        for bar in self.bars.iter_mut() {
            if *bar != NONE {
                gui.delete(*bar);
                *bar = NONE;
            }
        }
    }

    /// Hint bars fade with the screen they annotate.
    pub fn set_alpha(&self, gui: &mut Gui, alpha: f32) {
        if self.platform == Platform::Pc {
            return;
        }
        for &bar in &self.bars {
            if bar != NONE {
                gui.set_alpha(bar, alpha);
            }
        }
    }

    pub fn paint(&self, gui: &Gui, bar: HintBar, renderer: &mut dyn Renderer) {
        if self.platform == Platform::Pc && !self.shown {
            return;
        }
        let id = self.bars[bar_slot(bar)];
        if id != NONE {
            gui.paint(id, renderer);
        }
    }

    pub fn bar_id(&self, bar: HintBar) -> WidgetId {
        self.bars[bar_slot(bar)]
    }
}

// ============================================================
// Tests
// ============================================================
