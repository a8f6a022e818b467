//! Physical key identities and the held-modifier set.
//!
//! The classifier only cares about three kinds of key: the required
//! modifiers, the mapped letter keys, and everything else. Translation from
//! Windows virtual-key codes happens here so the classifier itself stays
//! platform-free.

/// A modifier key the classifier tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Ctrl,
    Alt,
    Shift,
    Meta,
}

impl ModifierKey {
    /// Whether this modifier is part of the fixed Ctrl+Alt chord.
    pub fn is_required(&self) -> bool {
        matches!(self, ModifierKey::Ctrl | ModifierKey::Alt)
    }
}

/// Physical key identity as seen by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Modifier(ModifierKey),
    /// Uppercase ASCII letter.
    Letter(char),
    /// Any key the classifier never acts on.
    Other,
}

/// The set of modifiers currently held down.
///
/// Mutated only by the classifier, which runs only on the interception
/// thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Record a modifier going down.
    pub fn press(&mut self, key: ModifierKey) {
        self.set(key, true);
    }

    /// Record a modifier going up.
    pub fn release(&mut self, key: ModifierKey) {
        self.set(key, false);
    }

    fn set(&mut self, key: ModifierKey, held: bool) {
        match key {
            ModifierKey::Ctrl => self.ctrl = held,
            ModifierKey::Alt => self.alt = held,
            ModifierKey::Shift => self.shift = held,
            ModifierKey::Meta => self.meta = held,
        }
    }

    /// True when exactly the required chord is held: Ctrl and Alt, and
    /// nothing else. Extra modifiers disqualify the chord so that e.g.
    /// Ctrl+Alt+Shift+E never triggers.
    pub fn chord_exact(&self) -> bool {
        self.ctrl && self.alt && !self.shift && !self.meta
    }
}

/// Map a Windows virtual-key code to a [`Key`].
///
/// Left/right variants collapse into one logical modifier. Values are the
/// documented VK_* constants; letters are `0x41..=0x5A`.
pub fn key_from_vk(vk: u32) -> Key {
    match vk {
        // VK_CONTROL, VK_LCONTROL, VK_RCONTROL
        0x11 | 0xA2 | 0xA3 => Key::Modifier(ModifierKey::Ctrl),
        // VK_MENU, VK_LMENU, VK_RMENU
        0x12 | 0xA4 | 0xA5 => Key::Modifier(ModifierKey::Alt),
        // VK_SHIFT, VK_LSHIFT, VK_RSHIFT
        0x10 | 0xA0 | 0xA1 => Key::Modifier(ModifierKey::Shift),
        // VK_LWIN, VK_RWIN
        0x5B | 0x5C => Key::Modifier(ModifierKey::Meta),
        0x41..=0x5A => Key::Letter(vk as u8 as char),
        _ => Key::Other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_modifiers() {
        assert!(ModifierKey::Ctrl.is_required());
        assert!(ModifierKey::Alt.is_required());
        assert!(!ModifierKey::Shift.is_required());
        assert!(!ModifierKey::Meta.is_required());
    }

    #[test]
    fn test_modifiers_press_release() {
        let mut mods = Modifiers::default();
        assert!(!mods.chord_exact());

        mods.press(ModifierKey::Ctrl);
        mods.press(ModifierKey::Alt);
        assert!(mods.chord_exact());

        mods.release(ModifierKey::Alt);
        assert!(!mods.chord_exact());
    }

    #[test]
    fn test_extra_modifier_breaks_chord() {
        let mut mods = Modifiers::default();
        mods.press(ModifierKey::Ctrl);
        mods.press(ModifierKey::Alt);
        mods.press(ModifierKey::Shift);
        assert!(!mods.chord_exact());

        mods.release(ModifierKey::Shift);
        assert!(mods.chord_exact());

        mods.press(ModifierKey::Meta);
        assert!(!mods.chord_exact());
    }

    #[test]
    fn test_vk_mapping_modifiers() {
        assert_eq!(key_from_vk(0x11), Key::Modifier(ModifierKey::Ctrl));
        assert_eq!(key_from_vk(0xA2), Key::Modifier(ModifierKey::Ctrl));
        assert_eq!(key_from_vk(0xA3), Key::Modifier(ModifierKey::Ctrl));
        assert_eq!(key_from_vk(0x12), Key::Modifier(ModifierKey::Alt));
        assert_eq!(key_from_vk(0xA4), Key::Modifier(ModifierKey::Alt));
        assert_eq!(key_from_vk(0x10), Key::Modifier(ModifierKey::Shift));
        assert_eq!(key_from_vk(0x5B), Key::Modifier(ModifierKey::Meta));
    }

    #[test]
    fn test_vk_mapping_letters() {
        assert_eq!(key_from_vk(0x41), Key::Letter('A'));
        assert_eq!(key_from_vk(0x45), Key::Letter('E'));
        assert_eq!(key_from_vk(0x5A), Key::Letter('Z'));
    }

    #[test]
    fn test_vk_mapping_other() {
        assert_eq!(key_from_vk(0x0D), Key::Other); // Enter
        assert_eq!(key_from_vk(0x20), Key::Other); // Space
        assert_eq!(key_from_vk(0x70), Key::Other); // F1
        assert_eq!(key_from_vk(0x30), Key::Other); // digit 0
    }
}
