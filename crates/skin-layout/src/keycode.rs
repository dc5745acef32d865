//! Key codes reported by skin buttons.
//!
//! Values are Android `KeyEvent` key codes. Skin files name their buttons
//! (`dpad-up`, `volume-down`, `ENTER`, ...) and the name selects the code.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const NONE: KeyCode = KeyCode(0);
    pub const SOFT_LEFT: KeyCode = KeyCode(1);
    pub const SOFT_RIGHT: KeyCode = KeyCode(2);
    pub const HOME: KeyCode = KeyCode(3);
    pub const BACK: KeyCode = KeyCode(4);
    pub const CALL: KeyCode = KeyCode(5);
    pub const END_CALL: KeyCode = KeyCode(6);
    pub const NUM_0: KeyCode = KeyCode(7);
    pub const NUM_1: KeyCode = KeyCode(8);
    pub const NUM_2: KeyCode = KeyCode(9);
    pub const NUM_3: KeyCode = KeyCode(10);
    pub const NUM_4: KeyCode = KeyCode(11);
    pub const NUM_5: KeyCode = KeyCode(12);
    pub const NUM_6: KeyCode = KeyCode(13);
    pub const NUM_7: KeyCode = KeyCode(14);
    pub const NUM_8: KeyCode = KeyCode(15);
    pub const NUM_9: KeyCode = KeyCode(16);
    pub const STAR: KeyCode = KeyCode(17);
    pub const POUND: KeyCode = KeyCode(18);
    pub const DPAD_UP: KeyCode = KeyCode(19);
    pub const DPAD_DOWN: KeyCode = KeyCode(20);
    pub const DPAD_LEFT: KeyCode = KeyCode(21);
    pub const DPAD_RIGHT: KeyCode = KeyCode(22);
    pub const DPAD_CENTER: KeyCode = KeyCode(23);
    pub const VOLUME_UP: KeyCode = KeyCode(24);
    pub const VOLUME_DOWN: KeyCode = KeyCode(25);
    pub const POWER: KeyCode = KeyCode(26);
    pub const CAMERA: KeyCode = KeyCode(27);
    pub const A: KeyCode = KeyCode(29);
    pub const B: KeyCode = KeyCode(30);
    pub const C: KeyCode = KeyCode(31);
    pub const D: KeyCode = KeyCode(32);
    pub const E: KeyCode = KeyCode(33);
    pub const F: KeyCode = KeyCode(34);
    pub const G: KeyCode = KeyCode(35);
    pub const H: KeyCode = KeyCode(36);
    pub const I: KeyCode = KeyCode(37);
    pub const J: KeyCode = KeyCode(38);
    pub const K: KeyCode = KeyCode(39);
    pub const L: KeyCode = KeyCode(40);
    pub const M: KeyCode = KeyCode(41);
    pub const N: KeyCode = KeyCode(42);
    pub const O: KeyCode = KeyCode(43);
    pub const P: KeyCode = KeyCode(44);
    pub const Q: KeyCode = KeyCode(45);
    pub const R: KeyCode = KeyCode(46);
    pub const S: KeyCode = KeyCode(47);
    pub const T: KeyCode = KeyCode(48);
    pub const U: KeyCode = KeyCode(49);
    pub const V: KeyCode = KeyCode(50);
    pub const W: KeyCode = KeyCode(51);
    pub const X: KeyCode = KeyCode(52);
    pub const Y: KeyCode = KeyCode(53);
    pub const Z: KeyCode = KeyCode(54);
    pub const COMMA: KeyCode = KeyCode(55);
    pub const PERIOD: KeyCode = KeyCode(56);
    pub const ALT_LEFT: KeyCode = KeyCode(57);
    pub const ALT_RIGHT: KeyCode = KeyCode(58);
    pub const CAP_LEFT: KeyCode = KeyCode(59);
    pub const CAP_RIGHT: KeyCode = KeyCode(60);
    pub const SPACE: KeyCode = KeyCode(62);
    pub const SYM: KeyCode = KeyCode(63);
    pub const NEWLINE: KeyCode = KeyCode(66);
    pub const DEL: KeyCode = KeyCode(67);
    pub const SLASH: KeyCode = KeyCode(76);
    pub const AT: KeyCode = KeyCode(77);
    pub const SEARCH: KeyCode = KeyCode(84);
    pub const PLAYPAUSE: KeyCode = KeyCode(85);
    pub const STOP: KeyCode = KeyCode(86);
    pub const NEXT: KeyCode = KeyCode(87);
    pub const PREVIOUS: KeyCode = KeyCode(88);
    pub const REWIND: KeyCode = KeyCode(89);
    pub const FAST_FORWARD: KeyCode = KeyCode(90);
    pub const PLAY: KeyCode = KeyCode(126);
    pub const PAUSE: KeyCode = KeyCode(127);
    pub const CHANNEL_UP: KeyCode = KeyCode(166);
    pub const CHANNEL_DOWN: KeyCode = KeyCode(167);
    pub const TV: KeyCode = KeyCode(170);
    pub const CYCLE_WINDOWS: KeyCode = KeyCode(171);
    pub const EPG: KeyCode = KeyCode(172);
    pub const DVR: KeyCode = KeyCode(173);
    pub const BOOKMARKS: KeyCode = KeyCode(174);
    pub const APP_SWITCH: KeyCode = KeyCode(187);
    pub const SLEEP: KeyCode = KeyCode(223);
    pub const STEM_PRIMARY: KeyCode = KeyCode(264);
    pub const STEM_1: KeyCode = KeyCode(265);
    pub const STEM_2: KeyCode = KeyCode(266);
    pub const STEM_3: KeyCode = KeyCode(267);

    /// Look up the key code for a skin button name.
    pub fn from_button_name(name: &str) -> Option<KeyCode> {
        BUTTON_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, code)| *code)
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match BUTTON_NAMES.iter().find(|(_, code)| code == self) {
            Some((name, _)) => write!(f, "{name}"),
            None => write!(f, "#{}", self.0),
        }
    }
}

/// Button names accepted in skin files. Lookups are case sensitive.
const BUTTON_NAMES: &[(&str, KeyCode)] = &[
    ("dpad-up", KeyCode::DPAD_UP),
    ("dpad-down", KeyCode::DPAD_DOWN),
    ("dpad-left", KeyCode::DPAD_LEFT),
    ("dpad-right", KeyCode::DPAD_RIGHT),
    ("dpad-center", KeyCode::DPAD_CENTER),
    ("soft-left", KeyCode::SOFT_LEFT),
    ("soft-right", KeyCode::SOFT_RIGHT),
    ("search", KeyCode::SEARCH),
    ("camera", KeyCode::CAMERA),
    ("volume-up", KeyCode::VOLUME_UP),
    ("volume-down", KeyCode::VOLUME_DOWN),
    ("power", KeyCode::POWER),
    ("home", KeyCode::HOME),
    ("homepage", KeyCode::HOME),
    ("back", KeyCode::BACK),
    ("del", KeyCode::DEL),
    ("0", KeyCode::NUM_0),
    ("1", KeyCode::NUM_1),
    ("2", KeyCode::NUM_2),
    ("3", KeyCode::NUM_3),
    ("4", KeyCode::NUM_4),
    ("5", KeyCode::NUM_5),
    ("6", KeyCode::NUM_6),
    ("7", KeyCode::NUM_7),
    ("8", KeyCode::NUM_8),
    ("9", KeyCode::NUM_9),
    ("star", KeyCode::STAR),
    ("pound", KeyCode::POUND),
    ("phone-dial", KeyCode::CALL),
    ("phone-hangup", KeyCode::END_CALL),
    ("q", KeyCode::Q),
    ("w", KeyCode::W),
    ("e", KeyCode::E),
    ("r", KeyCode::R),
    ("t", KeyCode::T),
    ("y", KeyCode::Y),
    ("u", KeyCode::U),
    ("i", KeyCode::I),
    ("o", KeyCode::O),
    ("p", KeyCode::P),
    ("a", KeyCode::A),
    ("s", KeyCode::S),
    ("d", KeyCode::D),
    ("f", KeyCode::F),
    ("g", KeyCode::G),
    ("h", KeyCode::H),
    ("j", KeyCode::J),
    ("k", KeyCode::K),
    ("l", KeyCode::L),
    ("DEL", KeyCode::DEL),
    ("z", KeyCode::Z),
    ("x", KeyCode::X),
    ("c", KeyCode::C),
    ("v", KeyCode::V),
    ("b", KeyCode::B),
    ("n", KeyCode::N),
    ("m", KeyCode::M),
    ("COMMA", KeyCode::COMMA),
    ("PERIOD", KeyCode::PERIOD),
    ("ENTER", KeyCode::NEWLINE),
    ("AT", KeyCode::AT),
    ("SPACE", KeyCode::SPACE),
    ("SLASH", KeyCode::SLASH),
    ("CAP", KeyCode::CAP_LEFT),
    ("SYM", KeyCode::SYM),
    ("ALT", KeyCode::ALT_LEFT),
    ("ALT2", KeyCode::ALT_RIGHT),
    ("CAP2", KeyCode::CAP_RIGHT),
    ("tv", KeyCode::TV),
    ("epg", KeyCode::EPG),
    ("dvr", KeyCode::DVR),
    ("prev", KeyCode::PREVIOUS),
    ("next", KeyCode::NEXT),
    ("play", KeyCode::PLAY),
    ("playpause", KeyCode::PLAYPAUSE),
    ("pause", KeyCode::PAUSE),
    ("stop", KeyCode::STOP),
    ("rev", KeyCode::REWIND),
    ("ffwd", KeyCode::FAST_FORWARD),
    ("bookmarks", KeyCode::BOOKMARKS),
    ("window", KeyCode::CYCLE_WINDOWS),
    ("channel-up", KeyCode::CHANNEL_UP),
    ("channel-down", KeyCode::CHANNEL_DOWN),
    ("app-switch", KeyCode::APP_SWITCH),
    ("sleep", KeyCode::SLEEP),
    ("stem-primary", KeyCode::STEM_PRIMARY),
    ("stem1", KeyCode::STEM_1),
    ("stem2", KeyCode::STEM_2),
    ("stem3", KeyCode::STEM_3),
];

#[cfg(test)]
mod tests {
    use super::KeyCode;

    #[test]
    fn known_names_resolve() {
        assert_eq!(KeyCode::from_button_name("dpad-up"), Some(KeyCode::DPAD_UP));
        assert_eq!(KeyCode::from_button_name("ENTER"), Some(KeyCode::NEWLINE));
        assert_eq!(KeyCode::from_button_name("DEL"), Some(KeyCode::DEL));
        assert_eq!(KeyCode::from_button_name("7"), Some(KeyCode::NUM_7));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(KeyCode::from_button_name("Dpad-Up"), None);
        assert_eq!(KeyCode::from_button_name("enter"), None);
    }

    #[test]
    fn display_uses_first_name() {
        assert_eq!(KeyCode::DEL.to_string(), "del");
        assert_eq!(KeyCode(999).to_string(), "#999");
    }
}
