// gui.rs — id-based widget arena
//
// Screens build their layout out of integer widget ids: containers
// (arrays divide space evenly, stacks sum it), labels, buttons, counters
// and images. The arena owns everything; screens only keep ids. Painting
// goes through a Renderer trait because the actual drawing lives in the
// platform layer.

use bitflags::bitflags;

use rollway_common::common::truncate_display;

pub type WidgetId = usize;

pub const NONE: WidgetId = 0;

// ============================================================
// Flags, colors, sizes
// ============================================================

bitflags! {
    /// Side and animation bits. The low nibble doubles as rounded-corner
    /// selection and slide direction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GuiFlags: u32 {
        const N = 1;
        const E = 2;
        const S = 4;
        const W = 8;

        const BACKWARD = 8 << 1;
        const FLING    = 8 << 2;
        const REMOVE   = 8 << 3;
    }
}

pub const GUI_NW: GuiFlags = GuiFlags::N.union(GuiFlags::W);
pub const GUI_SW: GuiFlags = GuiFlags::S.union(GuiFlags::W);
pub const GUI_NE: GuiFlags = GuiFlags::N.union(GuiFlags::E);
pub const GUI_SE: GuiFlags = GuiFlags::S.union(GuiFlags::E);
pub const GUI_LFT: GuiFlags = GUI_NW.union(GUI_SW);
pub const GUI_RGT: GuiFlags = GUI_NE.union(GUI_SE);
pub const GUI_TOP: GuiFlags = GUI_NW.union(GUI_NE);
pub const GUI_BOT: GuiFlags = GUI_SW.union(GUI_SE);
pub const GUI_ALL: GuiFlags = GUI_TOP.union(GUI_BOT);

pub type Color = [u8; 4];

pub const GUI_WHT: Color = [255, 255, 255, 255];
pub const GUI_YEL: Color = [255, 255, 0, 255];
pub const GUI_CYA: Color = [0, 255, 255, 255];
pub const GUI_RED: Color = [255, 0, 0, 255];
pub const GUI_GRN: Color = [0, 255, 0, 255];
pub const GUI_BLU: Color = [0, 0, 255, 255];
pub const GUI_BLK: Color = [0, 0, 0, 255];
pub const GUI_GRY: Color = [85, 85, 85, 255];
pub const GUI_PNK: Color = [255, 128, 176, 255];

// Glyph strings shared by labels.
pub const GLYPH_DIAMOND: &str = "\u{2666}";
pub const GLYPH_CROWN: &str = "\u{2655}";
pub const GLYPH_COIN: &str = "\u{26c1}";
pub const GLYPH_STAR: &str = "\u{272f}";
pub const GLYPH_TRIANGLE_LEFT: &str = "\u{25c0}";
pub const GLYPH_TRIANGLE_RIGHT: &str = "\u{25b6}";
pub const GLYPH_CHECKMARK: &str = "\u{2714}";
pub const GLYPH_BALLOT_X: &str = "\u{2718}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSize {
    Tny,
    Xs,
    Sml,
    Med,
    Lrg,
}

impl FontSize {
    fn char_w(self) -> i32 {
        match self {
            FontSize::Tny => 8,
            FontSize::Xs => 10,
            FontSize::Sml => 13,
            FontSize::Med => 19,
            FontSize::Lrg => 29,
        }
    }

    fn char_h(self) -> i32 {
        match self {
            FontSize::Tny => 14,
            FontSize::Xs => 18,
            FontSize::Sml => 24,
            FontSize::Med => 36,
            FontSize::Lrg => 56,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trunc {
    #[default]
    None,
    Head,
    Tail,
}

/// Activation token. Screen-specific actions wrap their own small enums
/// or indices in `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Token {
    #[default]
    None,
    Back,
    Prev,
    Next,
    Bs,
    Cl,
    Char,
    Name,
    Score,
    Action(i32),
}

// ============================================================
// Widgets
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Harray,
    Varray,
    Hstack,
    Vstack,
    Filler,
    Space,
    Label,
    Multi,
    Count,
    Clock,
    Image,
}

#[derive(Debug, Clone)]
struct Slide {
    flags: GuiFlags,
    delay: f32,
    duration: f32,
    elapsed: f32,
}

struct Widget {
    kind: Kind,
    alive: bool,
    parent: WidgetId,
    children: Vec<WidgetId>,

    text: String,
    /// Display capacity in characters, fixed by the text present at
    /// layout time. Zero = unlimited.
    cap_chars: usize,
    size: FontSize,
    color0: Color,
    color1: Color,
    trunc: Trunc,

    token: Token,
    value: i32,
    number: i32,

    rect: GuiFlags,
    hidden: bool,
    fill: bool,

    x: i32,
    y: i32,
    w: i32,
    h: i32,

    scale: f32,
    alpha: f32,
    slide: Option<Slide>,
}

impl Widget {
    fn new(kind: Kind, parent: WidgetId) -> Self {
        Self {
            kind,
            alive: true,
            parent,
            children: Vec::new(),
            text: String::new(),
            cap_chars: 0,
            size: FontSize::Sml,
            color0: GUI_WHT,
            color1: GUI_WHT,
            trunc: Trunc::None,
            token: Token::None,
            value: 0,
            number: 0,
            rect: GuiFlags::empty(),
            hidden: false,
            fill: false,
            x: 0,
            y: 0,
            w: 0,
            h: 0,
            scale: 1.0,
            alpha: 1.0,
            slide: None,
        }
    }
}

// ============================================================
// Renderer
// ============================================================

pub trait Renderer {
    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, corners: GuiFlags, alpha: f32);
    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        size: FontSize,
        color0: Color,
        color1: Color,
        scale: f32,
        alpha: f32,
    );
    fn draw_image(&mut self, x: i32, y: i32, w: i32, h: i32, path: &str, alpha: f32);
}

/// Renderer that draws nothing. Headless runs and most tests.
#[derive(Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw_rect(&mut self, _: i32, _: i32, _: i32, _: i32, _: GuiFlags, _: f32) {}
    fn draw_text(&mut self, _: i32, _: i32, _: &str, _: FontSize, _: Color, _: Color, _: f32, _: f32) {}
    fn draw_image(&mut self, _: i32, _: i32, _: i32, _: i32, _: &str, _: f32) {}
}

/// Renderer that records what would be drawn, for tests.
#[derive(Default)]
pub struct TraceRenderer {
    pub texts: Vec<String>,
    pub images: Vec<String>,
    pub rects: usize,
}

impl Renderer for TraceRenderer {
    fn draw_rect(&mut self, _: i32, _: i32, _: i32, _: i32, _: GuiFlags, _: f32) {
        self.rects += 1;
    }
    fn draw_text(&mut self, _: i32, _: i32, text: &str, _: FontSize, _: Color, _: Color, _: f32, _: f32) {
        self.texts.push(text.to_string());
    }
    fn draw_image(&mut self, _: i32, _: i32, _: i32, _: i32, path: &str, _: f32) {
        self.images.push(path.to_string());
    }
}

// ============================================================
// Arena
// ============================================================

const SPACE_PX: i32 = 12;

pub struct Gui {
    widgets: Vec<Widget>,
    active: WidgetId,
    view_w: i32,
    view_h: i32,
}

impl Default for Gui {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl Gui {
    pub fn new(view_w: i32, view_h: i32) -> Self {
        // Slot 0 is the reserved "no widget" id.
        let mut sentinel = Widget::new(Kind::Space, NONE);
        sentinel.alive = false;

        Self {
            widgets: vec![sentinel],
            active: NONE,
            view_w,
            view_h,
        }
    }

    pub fn resize(&mut self, w: i32, h: i32) {
        self.view_w = w;
        self.view_h = h;
    }

    pub fn view(&self) -> (i32, i32) {
        (self.view_w, self.view_h)
    }

    fn add(&mut self, kind: Kind, parent: WidgetId) -> WidgetId {
        let id = self.widgets.len();
        self.widgets.push(Widget::new(kind, parent));
        if parent != NONE {
            self.widgets[parent].children.push(id);
        }
        id
    }

    fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id).filter(|w| w.alive)
    }

    fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id).filter(|w| w.alive)
    }

    pub fn is_alive(&self, id: WidgetId) -> bool {
        self.get(id).is_some()
    }

    // ============================================================
    // Builders
    // ============================================================

    pub fn harray(&mut self, parent: WidgetId) -> WidgetId {
        self.add(Kind::Harray, parent)
    }

    pub fn varray(&mut self, parent: WidgetId) -> WidgetId {
        self.add(Kind::Varray, parent)
    }

    pub fn hstack(&mut self, parent: WidgetId) -> WidgetId {
        self.add(Kind::Hstack, parent)
    }

    pub fn vstack(&mut self, parent: WidgetId) -> WidgetId {
        self.add(Kind::Vstack, parent)
    }

    pub fn filler(&mut self, parent: WidgetId) -> WidgetId {
        let id = self.add(Kind::Filler, parent);
        self.widgets[id].fill = true;
        id
    }

    pub fn space(&mut self, parent: WidgetId) -> WidgetId {
        self.add(Kind::Space, parent)
    }

    pub fn label(
        &mut self,
        parent: WidgetId,
        text: &str,
        size: FontSize,
        c0: Color,
        c1: Color,
    ) -> WidgetId {
        let id = self.add(Kind::Label, parent);
        let w = &mut self.widgets[id];
        w.text = text.to_string();
        w.size = size;
        w.color0 = c0;
        w.color1 = c1;
        id
    }

    /// Multi-line label. Lines split on '\n'.
    pub fn multi(
        &mut self,
        parent: WidgetId,
        text: &str,
        size: FontSize,
        c0: Color,
        c1: Color,
    ) -> WidgetId {
        let id = self.add(Kind::Multi, parent);
        let w = &mut self.widgets[id];
        w.text = text.to_string();
        w.size = size;
        w.color0 = c0;
        w.color1 = c1;
        id
    }

    /// Screen title: a label wrapped in its own rect.
    pub fn title_header(
        &mut self,
        parent: WidgetId,
        text: &str,
        size: FontSize,
        c0: Color,
        c1: Color,
    ) -> WidgetId {
        let id = self.label(parent, text, size, c0, c1);
        self.widgets[id].rect = GUI_ALL;
        id
    }

    /// Button that takes initial focus.
    pub fn start(
        &mut self,
        parent: WidgetId,
        text: &str,
        size: FontSize,
        token: Token,
        value: i32,
    ) -> WidgetId {
        let id = self.state(parent, text, size, token, value);
        self.active = id;
        id
    }

    /// Button.
    pub fn state(
        &mut self,
        parent: WidgetId,
        text: &str,
        size: FontSize,
        token: Token,
        value: i32,
    ) -> WidgetId {
        let id = self.label(parent, text, size, GUI_WHT, GUI_WHT);
        let w = &mut self.widgets[id];
        w.token = token;
        w.value = value;
        w.rect = GUI_ALL;
        id
    }

    /// Button that is grayed out and inert unless enabled.
    pub fn maybe(
        &mut self,
        parent: WidgetId,
        text: &str,
        size: FontSize,
        token: Token,
        value: i32,
        enabled: bool,
    ) -> WidgetId {
        let id = self.state(parent, text, size, token, value);
        if !enabled {
            self.set_state(id, Token::None, 0);
            self.set_color(id, GUI_GRY, GUI_GRY);
        }
        id
    }

    pub fn count(&mut self, parent: WidgetId, max: i32, size: FontSize) -> WidgetId {
        let id = self.add(Kind::Count, parent);
        let w = &mut self.widgets[id];
        w.size = size;
        w.number = 0;
        // Reserve digits for the largest value it will show.
        w.cap_chars = max.max(1).to_string().len();
        id
    }

    pub fn clock(&mut self, parent: WidgetId, ms: i32, size: FontSize) -> WidgetId {
        let id = self.add(Kind::Clock, parent);
        let w = &mut self.widgets[id];
        w.size = size;
        w.number = ms;
        w.cap_chars = 7;
        id
    }

    pub fn image(&mut self, parent: WidgetId, path: &str, w: i32, h: i32) -> WidgetId {
        let id = self.add(Kind::Image, parent);
        let widget = &mut self.widgets[id];
        widget.text = path.to_string();
        widget.w = w;
        widget.h = h;
        id
    }

    /// Paged navigation bar: prev/next when there are more items than
    /// one page holds, plus Back unless the host screen forbids it.
    pub fn navig(
        &mut self,
        parent: WidgetId,
        total: usize,
        first: usize,
        step: usize,
        back_disabled: bool,
    ) -> WidgetId {
        let id = self.hstack(parent);
        if first + step < total {
            self.state(id, GLYPH_TRIANGLE_RIGHT, FontSize::Sml, Token::Next, 0);
        }
        if first > 0 {
            self.state(id, GLYPH_TRIANGLE_LEFT, FontSize::Sml, Token::Prev, 0);
        }
        self.filler(id);
        if !back_disabled {
            self.state(id, "Back", FontSize::Sml, Token::Back, 0);
        }
        id
    }

    // ============================================================
    // Mutators
    // ============================================================

    pub fn set_label(&mut self, id: WidgetId, text: &str) {
        if let Some(w) = self.get_mut(id) {
            w.text = text.to_string();
        }
    }

    pub fn set_multi(&mut self, id: WidgetId, text: &str) {
        self.set_label(id, text);
    }

    pub fn set_count(&mut self, id: WidgetId, n: i32) {
        if let Some(w) = self.get_mut(id) {
            w.number = n;
        }
    }

    pub fn set_clock(&mut self, id: WidgetId, ms: i32) {
        if let Some(w) = self.get_mut(id) {
            w.number = ms;
        }
    }

    pub fn set_color(&mut self, id: WidgetId, c0: Color, c1: Color) {
        if let Some(w) = self.get_mut(id) {
            w.color0 = c0;
            w.color1 = c1;
        }
    }

    pub fn set_trunc(&mut self, id: WidgetId, trunc: Trunc) {
        if let Some(w) = self.get_mut(id) {
            w.trunc = trunc;
        }
    }

    pub fn set_state(&mut self, id: WidgetId, token: Token, value: i32) {
        if let Some(w) = self.get_mut(id) {
            w.token = token;
            w.value = value;
        }
    }

    pub fn set_rect(&mut self, id: WidgetId, corners: GuiFlags) {
        if let Some(w) = self.get_mut(id) {
            w.rect = corners;
        }
    }

    pub fn set_hidden(&mut self, id: WidgetId, hidden: bool) {
        if let Some(w) = self.get_mut(id) {
            w.hidden = hidden;
        }
    }

    pub fn set_fill(&mut self, id: WidgetId) {
        if let Some(w) = self.get_mut(id) {
            w.fill = true;
        }
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn active(&self) -> WidgetId {
        self.active
    }

    pub fn token(&self, id: WidgetId) -> Token {
        self.get(id).map(|w| w.token).unwrap_or(Token::None)
    }

    pub fn value(&self, id: WidgetId) -> i32 {
        self.get(id).map(|w| w.value).unwrap_or(0)
    }

    pub fn label_text(&self, id: WidgetId) -> &str {
        self.get(id).map(|w| w.text.as_str()).unwrap_or("")
    }

    pub fn count_value(&self, id: WidgetId) -> i32 {
        self.get(id).map(|w| w.number).unwrap_or(0)
    }

    pub fn child(&self, id: WidgetId, index: usize) -> WidgetId {
        self.get(id)
            .and_then(|w| w.children.get(index).copied())
            .unwrap_or(NONE)
    }

    pub fn focus(&mut self, id: WidgetId) {
        if self.is_alive(id) {
            self.active = id;
        }
    }

    // ============================================================
    // Layout
    // ============================================================

    /// Lay the tree out and anchor it in the viewport. `xd`/`yd` in
    /// {-1, 0, +1} select left/center/right and bottom/center/top.
    pub fn layout(&mut self, id: WidgetId, xd: i32, yd: i32) {
        if !self.is_alive(id) {
            return;
        }

        self.measure(id);

        let (w, h) = {
            let wd = &self.widgets[id];
            (wd.w, wd.h)
        };

        let x = match xd {
            x if x < 0 => 0,
            x if x > 0 => self.view_w - w,
            _ => (self.view_w - w) / 2,
        };
        let y = match yd {
            y if y < 0 => self.view_h - h,
            y if y > 0 => 0,
            _ => (self.view_h - h) / 2,
        };

        self.position(id, x, y, w, h);
    }

    fn measure(&mut self, id: WidgetId) {
        let children = self.widgets[id].children.clone();
        for &c in &children {
            if self.widgets[c].alive {
                self.measure(c);
            }
        }

        let kind = self.widgets[id].kind;
        let live: Vec<WidgetId> = children
            .iter()
            .copied()
            .filter(|&c| self.widgets[c].alive)
            .collect();

        let (w, h) = match kind {
            Kind::Label | Kind::Count | Kind::Clock => {
                let wd = &mut self.widgets[id];
                let chars = match wd.kind {
                    Kind::Label => {
                        if wd.cap_chars == 0 {
                            wd.cap_chars = wd.text.chars().count();
                        }
                        wd.cap_chars.max(1)
                    }
                    _ => wd.cap_chars,
                };
                (
                    chars as i32 * wd.size.char_w() + SPACE_PX,
                    wd.size.char_h(),
                )
            }
            Kind::Multi => {
                let wd = &self.widgets[id];
                let lines: Vec<&str> = wd.text.split('\n').collect();
                let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
                (
                    widest as i32 * wd.size.char_w() + SPACE_PX,
                    lines.len() as i32 * wd.size.char_h(),
                )
            }
            Kind::Image => {
                let wd = &self.widgets[id];
                (wd.w, wd.h)
            }
            Kind::Space => (SPACE_PX, SPACE_PX),
            Kind::Filler => (0, 0),
            Kind::Harray => {
                let max_w = live.iter().map(|&c| self.widgets[c].w).max().unwrap_or(0);
                let max_h = live.iter().map(|&c| self.widgets[c].h).max().unwrap_or(0);
                (max_w * live.len() as i32, max_h)
            }
            Kind::Varray => {
                let max_w = live.iter().map(|&c| self.widgets[c].w).max().unwrap_or(0);
                let max_h = live.iter().map(|&c| self.widgets[c].h).max().unwrap_or(0);
                (max_w, max_h * live.len() as i32)
            }
            Kind::Hstack => {
                let sum_w: i32 = live.iter().map(|&c| self.widgets[c].w).sum();
                let max_h = live.iter().map(|&c| self.widgets[c].h).max().unwrap_or(0);
                (sum_w, max_h)
            }
            Kind::Vstack => {
                let max_w = live.iter().map(|&c| self.widgets[c].w).max().unwrap_or(0);
                let sum_h: i32 = live.iter().map(|&c| self.widgets[c].h).sum();
                (max_w, sum_h)
            }
        };

        let wd = &mut self.widgets[id];
        wd.w = w;
        wd.h = h;
    }

    fn position(&mut self, id: WidgetId, x: i32, y: i32, w: i32, h: i32) {
        {
            let wd = &mut self.widgets[id];
            wd.x = x;
            wd.y = y;
            wd.w = w;
            wd.h = h;
        }

        let kind = self.widgets[id].kind;
        let live: Vec<WidgetId> = self.widgets[id]
            .children
            .clone()
            .into_iter()
            .filter(|&c| self.widgets[c].alive)
            .collect();
        if live.is_empty() {
            return;
        }

        match kind {
            Kind::Harray => {
                let cw = w / live.len() as i32;
                for (i, &c) in live.iter().enumerate() {
                    self.position(c, x + cw * i as i32, y, cw, h);
                }
            }
            Kind::Varray => {
                let ch = h / live.len() as i32;
                for (i, &c) in live.iter().enumerate() {
                    self.position(c, x, y + ch * i as i32, w, ch);
                }
            }
            Kind::Hstack => {
                let content: i32 = live.iter().map(|&c| self.widgets[c].w).sum();
                let fillers = live.iter().filter(|&&c| self.widgets[c].fill).count() as i32;
                let extra = (w - content).max(0);
                let per_fill = if fillers > 0 { extra / fillers } else { 0 };

                let mut cx = x;
                for &c in &live {
                    let cw = self.widgets[c].w + if self.widgets[c].fill { per_fill } else { 0 };
                    self.position(c, cx, y, cw, h);
                    cx += cw;
                }
            }
            Kind::Vstack => {
                let content: i32 = live.iter().map(|&c| self.widgets[c].h).sum();
                let fillers = live.iter().filter(|&&c| self.widgets[c].fill).count() as i32;
                let extra = (h - content).max(0);
                let per_fill = if fillers > 0 { extra / fillers } else { 0 };

                let mut cy = y;
                for &c in &live {
                    let ch = self.widgets[c].h + if self.widgets[c].fill { per_fill } else { 0 };
                    self.position(c, x, cy, w, ch);
                    cy += ch;
                }
            }
            _ => {}
        }
    }

    // ============================================================
    // Interaction
    // ============================================================

    fn hit(&self, id: WidgetId, x: i32, y: i32) -> WidgetId {
        let Some(w) = self.get(id) else {
            return NONE;
        };
        if w.hidden {
            return NONE;
        }

        for &c in &w.children {
            let found = self.hit(c, x, y);
            if found != NONE {
                return found;
            }
        }

        if w.token != Token::None && x >= w.x && x < w.x + w.w && y >= w.y && y < w.y + w.h {
            id
        } else {
            NONE
        }
    }

    /// Track the pointer. Focus follows the widget under it; returns the
    /// newly hot widget or NONE when nothing changed.
    pub fn point(&mut self, id: WidgetId, x: i32, y: i32) -> WidgetId {
        let hot = self.hit(id, x, y);
        if hot != NONE && hot != self.active {
            self.active = hot;
            return hot;
        }
        NONE
    }

    fn focusable(&self, root: WidgetId, out: &mut Vec<WidgetId>) {
        let Some(w) = self.get(root) else { return };
        if w.hidden {
            return;
        }
        if w.token != Token::None {
            out.push(root);
        }
        for &c in &w.children {
            self.focusable(c, out);
        }
    }

    /// Move focus directionally on a stick bump. Returns the widget
    /// focus landed on, or NONE.
    pub fn stick(&mut self, id: WidgetId, axis: i32, v: f32, bump: bool) -> WidgetId {
        if !bump || v.abs() <= 0.5 {
            return NONE;
        }

        let horizontal = axis == crate::keys::AXIS_X0 || axis == crate::keys::AXIS_X1;
        let positive = v > 0.0;

        let mut candidates = Vec::new();
        self.focusable(id, &mut candidates);
        if candidates.is_empty() {
            return NONE;
        }

        let Some(cur) = self.get(self.active) else {
            let first = candidates[0];
            self.active = first;
            return first;
        };
        let (cx, cy) = (cur.x + cur.w / 2, cur.y + cur.h / 2);

        let mut best = NONE;
        let mut best_dist = i64::MAX;

        for cand in candidates {
            if cand == self.active {
                continue;
            }
            let w = &self.widgets[cand];
            let (wx, wy) = (w.x + w.w / 2, w.y + w.h / 2);

            let forward = if horizontal {
                if positive { wx > cx } else { wx < cx }
            } else if positive {
                wy > cy
            } else {
                wy < cy
            };
            if !forward {
                continue;
            }

            let dx = i64::from(wx - cx);
            let dy = i64::from(wy - cy);
            // Weight off-axis distance so focus prefers the same row or
            // column.
            let dist = if horizontal {
                dx * dx + 4 * dy * dy
            } else {
                4 * dx * dx + dy * dy
            };
            if dist < best_dist {
                best_dist = dist;
                best = cand;
            }
        }

        if best != NONE {
            self.active = best;
        }
        best
    }

    // ============================================================
    // Animation
    // ============================================================

    pub fn pulse(&mut self, id: WidgetId, k: f32) {
        if let Some(w) = self.get_mut(id) {
            w.scale = k;
        }
    }

    pub fn set_alpha(&mut self, id: WidgetId, alpha: f32) {
        if !self.is_alive(id) {
            return;
        }
        self.widgets[id].alpha = alpha;
        let children = self.widgets[id].children.clone();
        for c in children {
            self.set_alpha(c, alpha);
        }
    }

    pub fn alpha(&self, id: WidgetId) -> f32 {
        self.get(id).map(|w| w.alpha).unwrap_or(0.0)
    }

    /// Start a slide animation. `REMOVE` deletes the subtree when the
    /// animation finishes.
    pub fn slide(&mut self, id: WidgetId, flags: GuiFlags, delay: f32, t: f32, _stagger: f32) {
        if let Some(w) = self.get_mut(id) {
            w.slide = Some(Slide {
                flags,
                delay,
                duration: t.max(0.001),
                elapsed: 0.0,
            });
        }
    }

    pub fn slide_running(&self, id: WidgetId) -> bool {
        self.get(id).map(|w| w.slide.is_some()).unwrap_or(false)
    }

    /// Step animations for a subtree. Pulse scales decay back toward
    /// 1.0; finished REMOVE slides delete their widgets.
    pub fn timer(&mut self, id: WidgetId, dt: f32) {
        if !self.is_alive(id) {
            return;
        }

        let mut remove = false;
        {
            let w = &mut self.widgets[id];

            if w.scale > 1.0 {
                w.scale = (w.scale - dt).max(1.0);
            }

            if let Some(slide) = w.slide.as_mut() {
                slide.elapsed += dt;
                if slide.elapsed >= slide.delay + slide.duration {
                    remove = slide.flags.contains(GuiFlags::REMOVE);
                    w.slide = None;
                }
            }
        }

        if remove {
            self.delete(id);
            return;
        }

        let children = self.widgets[id].children.clone();
        for c in children {
            self.timer(c, dt);
        }
    }

    // ============================================================
    // Paint
    // ============================================================

    pub fn paint(&self, id: WidgetId, renderer: &mut dyn Renderer) {
        let Some(w) = self.get(id) else { return };
        if w.hidden {
            return;
        }

        if !w.rect.is_empty() {
            renderer.draw_rect(w.x, w.y, w.w, w.h, w.rect & GUI_ALL, w.alpha);
        }

        match w.kind {
            Kind::Label => {
                let text = match w.trunc {
                    Trunc::None => w.text.clone(),
                    Trunc::Head => truncate_display(&w.text, w.cap_chars.max(1), true),
                    Trunc::Tail => truncate_display(&w.text, w.cap_chars.max(1), false),
                };
                renderer.draw_text(w.x, w.y, &text, w.size, w.color0, w.color1, w.scale, w.alpha);
            }
            Kind::Multi => {
                for (i, line) in w.text.split('\n').enumerate() {
                    renderer.draw_text(
                        w.x,
                        w.y + i as i32 * w.size.char_h(),
                        line,
                        w.size,
                        w.color0,
                        w.color1,
                        w.scale,
                        w.alpha,
                    );
                }
            }
            Kind::Count => {
                renderer.draw_text(
                    w.x,
                    w.y,
                    &w.number.to_string(),
                    w.size,
                    w.color0,
                    w.color1,
                    w.scale,
                    w.alpha,
                );
            }
            Kind::Clock => {
                let total = w.number.max(0) / 1000;
                let text = format!("{}:{:02}", total / 60, total % 60);
                renderer.draw_text(w.x, w.y, &text, w.size, w.color0, w.color1, w.scale, w.alpha);
            }
            Kind::Image => {
                renderer.draw_image(w.x, w.y, w.w, w.h, &w.text, w.alpha);
            }
            _ => {}
        }

        for &c in &w.children {
            self.paint(c, renderer);
        }
    }

    // ============================================================
    // Deletion
    // ============================================================

    pub fn delete(&mut self, id: WidgetId) {
        if !self.is_alive(id) {
            return;
        }

        let children = self.widgets[id].children.clone();
        for c in children {
            self.delete(c);
        }

        let parent = self.widgets[id].parent;
        if parent != NONE {
            if let Some(p) = self.widgets.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }

        self.widgets[id].alive = false;
        if self.active == id {
            self.active = NONE;
        }
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn two_button_row(gui: &mut Gui) -> (WidgetId, WidgetId, WidgetId) {
        let root = gui.vstack(NONE);
        let row = gui.harray(root);
        let no = gui.start(row, "No", FontSize::Sml, Token::Back, 0);
        let yes = gui.state(row, "Yes", FontSize::Sml, Token::Action(1), 7);
        gui.layout(root, 0, 0);
        (root, no, yes)
    }

    #[test]
    fn start_takes_focus() {
        let mut gui = Gui::default();
        let (_, no, _) = two_button_row(&mut gui);
        assert_eq!(gui.active(), no);
        assert_eq!(gui.token(no), Token::Back);
    }

    #[test]
    fn stick_bump_moves_focus_right() {
        let mut gui = Gui::default();
        let (root, no, yes) = two_button_row(&mut gui);

        assert_eq!(gui.active(), no);
        // No bump, no move.
        assert_eq!(gui.stick(root, crate::keys::AXIS_X0, 1.0, false), NONE);
        // Bump right lands on Yes.
        assert_eq!(gui.stick(root, crate::keys::AXIS_X0, 1.0, true), yes);
        assert_eq!(gui.value(gui.active()), 7);
        // Bump left goes back.
        assert_eq!(gui.stick(root, crate::keys::AXIS_X0, -1.0, true), no);
    }

    #[test]
    fn point_lands_on_button_centers() {
        let mut gui = Gui::default();
        let (root, _, yes) = two_button_row(&mut gui);

        let w = &gui.widgets[yes];
        let (cx, cy) = (w.x + w.w / 2, w.y + w.h / 2);
        assert_eq!(gui.point(root, cx, cy), yes);
        // Second report of the same position is not a change.
        assert_eq!(gui.point(root, cx, cy), NONE);
    }

    #[test]
    fn harray_divides_evenly() {
        let mut gui = Gui::default();
        let (_, no, yes) = two_button_row(&mut gui);
        assert_eq!(gui.widgets[no].w, gui.widgets[yes].w);
        assert_eq!(gui.widgets[no].y, gui.widgets[yes].y);
        assert!(gui.widgets[no].x < gui.widgets[yes].x);
    }

    #[test]
    fn label_capacity_truncates_at_paint() {
        let mut gui = Gui::default();
        let root = gui.vstack(NONE);
        let file = gui.label(root, "XXXXX", FontSize::Sml, GUI_YEL, GUI_YEL);
        gui.layout(root, 0, 0);

        gui.set_trunc(file, Trunc::Head);
        gui.set_label(file, "a-very-long-replay-name");

        let mut trace = TraceRenderer::default();
        gui.paint(root, &mut trace);
        assert_eq!(trace.texts.len(), 1);
        assert!(trace.texts[0].starts_with('\u{2026}'));
        assert_eq!(trace.texts[0].chars().count(), 5);
    }

    #[test]
    fn pulse_decays_to_one() {
        let mut gui = Gui::default();
        let (root, no, _) = two_button_row(&mut gui);
        gui.pulse(no, 1.2);
        gui.timer(root, 0.1);
        assert!(gui.widgets[no].scale < 1.2);
        gui.timer(root, 1.0);
        assert_eq!(gui.widgets[no].scale, 1.0);
    }

    #[test]
    fn remove_slide_deletes_when_done() {
        let mut gui = Gui::default();
        let (root, _, _) = two_button_row(&mut gui);
        gui.slide(root, GuiFlags::W | GuiFlags::BACKWARD | GuiFlags::REMOVE, 0.0, 0.16, 0.0);
        assert!(gui.slide_running(root));
        gui.timer(root, 0.2);
        assert!(!gui.is_alive(root));
    }

    #[test]
    fn delete_clears_focus_and_children() {
        let mut gui = Gui::default();
        let (root, no, yes) = two_button_row(&mut gui);
        gui.delete(root);
        assert!(!gui.is_alive(no));
        assert!(!gui.is_alive(yes));
        assert_eq!(gui.active(), NONE);
    }

    #[test]
    fn hidden_widgets_neither_hit_nor_paint() {
        let mut gui = Gui::default();
        let (root, no, _) = two_button_row(&mut gui);
        gui.set_hidden(root, true);

        let w = &gui.widgets[no];
        let (cx, cy) = (w.x + w.w / 2, w.y + w.h / 2);
        assert_eq!(gui.point(root, cx, cy), NONE);

        let mut trace = TraceRenderer::default();
        gui.paint(root, &mut trace);
        assert!(trace.texts.is_empty());
    }
}
