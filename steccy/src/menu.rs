//! Interactive menu state machine (C7): idle → main → sub-state → idle
//! (spec §4.7), plus the POKE list and autostart keystroke sequence
//! supplemented from the original firmware (SPEC_FULL §10).
use crate::memory::Memory;
use steccy_core::ZXKeyboardMap;

/// Top-level menu entries (spec §3 "Menu state").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Joystick,
    Reset,
    Rom,
    Poke,
    Save,
    Snapshot,
    Autostart,
}

const TOP_LEVEL: [MenuEntry; 7] = [
    MenuEntry::Joystick,
    MenuEntry::Reset,
    MenuEntry::Rom,
    MenuEntry::Poke,
    MenuEntry::Save,
    MenuEntry::Snapshot,
    MenuEntry::Autostart,
];

/// Transient sub-states entered from `Main` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Idle,
    Main,
    Joystick,
    Load,
    Poke,
    Snapshot,
}

/// What the embedder should do in response to a menu keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Reset,
    ToggleRecording,
    RequestLoad,
    RequestSnapshot,
    ToggleAutostart,
    /// The menu was torn down; the caller must force a full screen redraw
    /// and resume the CPU loop (spec §9 "Menu → CPU resumption").
    Resume,
}

pub struct Menu {
    state: MenuState,
    selected: usize,
    recording_active: bool,
}

impl Default for Menu {
    fn default() -> Self {
        Menu {
            state: MenuState::Idle,
            selected: 0,
            recording_active: false,
        }
    }
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != MenuState::Idle
    }

    pub fn recording_active(&self) -> bool {
        self.recording_active
    }

    /// Open the main menu, suspending the CPU loop (spec §4.7).
    pub fn open(&mut self) {
        self.state = MenuState::Main;
        self.selected = 0;
    }

    /// Drive the state machine with one keypress. Returns `None` while the
    /// menu stays open with nothing for the embedder to do yet, or
    /// `Some(action)` — including `Resume` when ESC cancels back to idle
    /// (spec §5 "the menu is the only cancellable operation").
    pub fn handle_key(&mut self, key: ZXKeyboardMap) -> Option<MenuAction> {
        match self.state {
            MenuState::Idle => None,
            MenuState::Main => self.handle_main_key(key),
            MenuState::Joystick | MenuState::Load | MenuState::Poke | MenuState::Snapshot => {
                if key == ZXKeyboardMap::BR {
                    self.state = MenuState::Main;
                }
                None
            }
        }
    }

    fn handle_main_key(&mut self, key: ZXKeyboardMap) -> Option<MenuAction> {
        if key == ZXKeyboardMap::BR {
            self.state = MenuState::Idle;
            return Some(MenuAction::Resume);
        }
        if key == ZXKeyboardMap::N7 {
            self.selected = (self.selected + TOP_LEVEL.len() - 1) % TOP_LEVEL.len();
            return None;
        }
        if key == ZXKeyboardMap::N6 {
            self.selected = (self.selected + 1) % TOP_LEVEL.len();
            return None;
        }
        if key != ZXKeyboardMap::EN {
            return None;
        }
        match TOP_LEVEL[self.selected] {
            MenuEntry::Joystick => {
                self.state = MenuState::Joystick;
                None
            }
            MenuEntry::Reset => {
                self.state = MenuState::Idle;
                Some(MenuAction::Reset)
            }
            MenuEntry::Rom => {
                self.state = MenuState::Load;
                Some(MenuAction::RequestLoad)
            }
            MenuEntry::Poke => {
                self.state = MenuState::Poke;
                None
            }
            MenuEntry::Save => {
                self.recording_active = !self.recording_active;
                Some(MenuAction::ToggleRecording)
            }
            MenuEntry::Snapshot => {
                self.state = MenuState::Snapshot;
                Some(MenuAction::RequestSnapshot)
            }
            MenuEntry::Autostart => Some(MenuAction::ToggleAutostart),
        }
    }
}

/// One POKE entry: a fixed address/value pair applied to RAM on demand
/// (SPEC_FULL §10, grounded on `original_source/src/menu/menu.c`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PokeEntry {
    pub address: u16,
    pub value: u8,
}

#[derive(Debug, Clone, Default)]
pub struct PokeList {
    entries: Vec<PokeEntry>,
}

impl PokeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PokeEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[PokeEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write every entry's value to its address.
    pub fn apply(&self, mem: &mut Memory) {
        for entry in &self.entries {
            mem.write8(entry.address, entry.value);
        }
    }
}

/// The `LOAD ""` keystroke sequence synthesised after a successful tape
/// load when autostart is enabled (SPEC_FULL §10): `J` for the LOAD token,
/// `SYMBOL SHIFT + P` twice for the quotes, then `ENTER`.
pub fn autostart_sequence() -> &'static [ZXKeyboardMap] {
    use std::sync::OnceLock;
    static SEQUENCE: OnceLock<[ZXKeyboardMap; 4]> = OnceLock::new();
    SEQUENCE.get_or_init(|| {
        [
            ZXKeyboardMap::J,
            ZXKeyboardMap::SS | ZXKeyboardMap::P,
            ZXKeyboardMap::SS | ZXKeyboardMap::P,
            ZXKeyboardMap::EN,
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_then_escaping_returns_to_idle_and_resumes() {
        let mut menu = Menu::new();
        menu.open();
        assert_eq!(menu.state(), MenuState::Main);
        let action = menu.handle_key(ZXKeyboardMap::BR);
        assert_eq!(action, Some(MenuAction::Resume));
        assert_eq!(menu.state(), MenuState::Idle);
    }

    #[test]
    fn selecting_reset_from_main_fires_reset_action() {
        let mut menu = Menu::new();
        menu.open();
        // TOP_LEVEL[0] == Joystick; move to Reset (index 1).
        menu.handle_key(ZXKeyboardMap::N6);
        let action = menu.handle_key(ZXKeyboardMap::EN);
        assert_eq!(action, Some(MenuAction::Reset));
        assert_eq!(menu.state(), MenuState::Idle);
    }

    #[test]
    fn selecting_rom_enters_load_substate_and_fires_request_load() {
        let mut menu = Menu::new();
        menu.open();
        // TOP_LEVEL[0] == Joystick; move to Rom (index 2).
        menu.handle_key(ZXKeyboardMap::N6);
        menu.handle_key(ZXKeyboardMap::N6);
        let action = menu.handle_key(ZXKeyboardMap::EN);
        assert_eq!(action, Some(MenuAction::RequestLoad));
        assert_eq!(menu.state(), MenuState::Load);
        // BR from the sub-state falls back to Main, not Idle.
        assert_eq!(menu.handle_key(ZXKeyboardMap::BR), None);
        assert_eq!(menu.state(), MenuState::Main);
    }

    #[test]
    fn selecting_snapshot_enters_snapshot_substate_and_fires_request_snapshot() {
        let mut menu = Menu::new();
        menu.open();
        // TOP_LEVEL[0] == Joystick; move to Snapshot (index 5).
        for _ in 0..5 {
            menu.handle_key(ZXKeyboardMap::N6);
        }
        let action = menu.handle_key(ZXKeyboardMap::EN);
        assert_eq!(action, Some(MenuAction::RequestSnapshot));
        assert_eq!(menu.state(), MenuState::Snapshot);
    }

    #[test]
    fn save_entry_toggles_recording() {
        let mut menu = Menu::new();
        menu.open();
        for _ in 0..4 {
            menu.handle_key(ZXKeyboardMap::N6); // Joystick->Reset->Rom->Poke->Save
        }
        let action = menu.handle_key(ZXKeyboardMap::EN);
        assert_eq!(action, Some(MenuAction::ToggleRecording));
        assert!(menu.recording_active());
    }

    #[test]
    fn poke_list_applies_entries_to_memory() {
        let mut mem = Memory::new(false, &[[0u8; crate::memory::PAGE_SIZE]]);
        let mut pokes = PokeList::new();
        pokes.push(PokeEntry { address: 0x8000, value: 0x42 });
        pokes.apply(&mut mem);
        assert_eq!(mem.read8(0x8000), 0x42);
    }

    #[test]
    fn autostart_sequence_is_j_quote_quote_enter() {
        let seq = autostart_sequence();
        assert_eq!(seq.len(), 4);
        assert_eq!(seq[0], ZXKeyboardMap::J);
        assert_eq!(seq[1], ZXKeyboardMap::SS | ZXKeyboardMap::P);
        assert_eq!(seq[3], ZXKeyboardMap::EN);
    }
}
