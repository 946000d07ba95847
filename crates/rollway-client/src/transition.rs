// transition.rs — screen exit animations
//
// How a screen transition works:
//
// 1. the `leave` handler sets up an exit animation (e.g. via `slide`)
// 2. the `leave` handler does NOT delete its widget tree
// 3. the `enter` handler of the next screen sets up an enter animation
//
// While an exit animation runs, the old GUI has to coexist with the new
// screen's GUI: it still needs painting and stepping. This table tracks
// those orphaned roots until their REMOVE slides finish.

use log::error;

use crate::gui::{Gui, GuiFlags, Renderer, WidgetId, NONE};

pub const SLIDE_TIME: f32 = 0.16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Forward,
    Back,
}

const SLOTS: usize = 16;

#[derive(Default)]
pub struct Transition {
    slots: [WidgetId; SLOTS],
}

impl Transition {
    pub fn new() -> Self {
        Self { slots: [NONE; SLOTS] }
    }

    pub fn add(&mut self, gui: &mut Gui, id: WidgetId) {
        for slot in self.slots.iter_mut() {
            if *slot == NONE {
                *slot = id;
                return;
            }
        }

        error!("out of transition slots");
        gui.delete(id);
    }

    pub fn remove(&mut self, id: WidgetId) {
        for slot in self.slots.iter_mut() {
            if *slot == id {
                *slot = NONE;
                break;
            }
        }
    }

    /// Step registered trees. Slots whose REMOVE slide completed (and so
    /// whose widget died) are released.
    pub fn timer(&mut self, gui: &mut Gui, dt: f32) {
        for slot in self.slots.iter_mut() {
            if *slot != NONE {
                gui.timer(*slot, dt);
                if !gui.is_alive(*slot) {
                    *slot = NONE;
                }
            }
        }
    }

    pub fn paint(&self, gui: &Gui, renderer: &mut dyn Renderer) {
        for &slot in &self.slots {
            if slot != NONE {
                gui.paint(slot, renderer);
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.slots.iter().filter(|&&s| s != NONE).count()
    }

    /// Standard slide: enter flings in from the intent side, exit flings
    /// out the other way and removes itself.
    pub fn slide(&mut self, gui: &mut Gui, animations: bool, id: WidgetId, entering: bool, intent: Intent) -> WidgetId {
        let (enter_flags, exit_flags) = match intent {
            Intent::Back => (GuiFlags::W, GuiFlags::E),
            Intent::Forward => (GuiFlags::E, GuiFlags::W),
        };
        self.slide_full(gui, animations, id, entering, enter_flags, exit_flags)
    }

    pub fn slide_full(
        &mut self,
        gui: &mut Gui,
        animations: bool,
        id: WidgetId,
        entering: bool,
        enter_flags: GuiFlags,
        exit_flags: GuiFlags,
    ) -> WidgetId {
        if entering {
            if animations {
                gui.slide(id, enter_flags | GuiFlags::FLING, 0.0, SLIDE_TIME, 0.0);
            }
        } else if animations {
            gui.slide(
                id,
                exit_flags | GuiFlags::BACKWARD | GuiFlags::FLING | GuiFlags::REMOVE,
                0.0,
                SLIDE_TIME,
                0.0,
            );
            self.add(gui, id);
        } else {
            gui.delete(id);
        }

        id
    }

    /// Page variant: the header hides instantly (the next page's header
    /// takes over), only the body slides.
    pub fn page(&mut self, gui: &mut Gui, animations: bool, id: WidgetId, entering: bool, intent: Intent) -> WidgetId {
        let head = gui.child(id, 0);
        let body = gui.child(id, 1);

        let (enter_flags, exit_flags) = match intent {
            Intent::Back => (GuiFlags::W, GuiFlags::E),
            Intent::Forward => (GuiFlags::E, GuiFlags::W),
        };

        if entering {
            if animations {
                gui.slide(body, enter_flags | GuiFlags::FLING, 0.0, SLIDE_TIME, 0.0);
            }
        } else if animations {
            gui.set_hidden(head, true);
            gui.slide(id, GuiFlags::REMOVE, 0.0, SLIDE_TIME, 0.0);
            gui.slide(body, exit_flags | GuiFlags::BACKWARD | GuiFlags::FLING, 0.0, SLIDE_TIME, 0.0);
            self.add(gui, id);
        } else {
            gui.delete(id);
        }

        id
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::{FontSize, Token, GUI_WHT};

    fn tree(gui: &mut Gui) -> WidgetId {
        let id = gui.vstack(NONE);
        gui.label(id, "old", FontSize::Sml, GUI_WHT, GUI_WHT);
        gui.state(id, "btn", FontSize::Sml, Token::Back, 0);
        gui.layout(id, 0, 0);
        id
    }

    #[test]
    fn exit_slide_lives_until_done_then_frees_slot() {
        let mut gui = Gui::default();
        let mut tr = Transition::new();
        let id = tree(&mut gui);

        tr.slide(&mut gui, true, id, false, Intent::Forward);
        assert_eq!(tr.pending(), 1);
        assert!(gui.is_alive(id));

        tr.timer(&mut gui, SLIDE_TIME + 0.05);
        assert!(!gui.is_alive(id));
        assert_eq!(tr.pending(), 0);
    }

    #[test]
    fn without_animations_exit_deletes_immediately() {
        let mut gui = Gui::default();
        let mut tr = Transition::new();
        let id = tree(&mut gui);

        tr.slide(&mut gui, false, id, false, Intent::Back);
        assert!(!gui.is_alive(id));
        assert_eq!(tr.pending(), 0);
    }

    #[test]
    fn overflow_deletes_instead_of_leaking() {
        let mut gui = Gui::default();
        let mut tr = Transition::new();

        let mut last = NONE;
        for _ in 0..(SLOTS + 1) {
            last = tree(&mut gui);
            tr.slide(&mut gui, true, last, false, Intent::Forward);
        }

        // The overflowing tree was deleted on the spot.
        assert_eq!(tr.pending(), SLOTS);
        assert!(!gui.is_alive(last));
    }

    #[test]
    fn enter_slide_does_not_register() {
        let mut gui = Gui::default();
        let mut tr = Transition::new();
        let id = tree(&mut gui);

        tr.slide(&mut gui, true, id, true, Intent::Forward);
        assert_eq!(tr.pending(), 0);
        assert!(gui.slide_running(id));
    }
}
