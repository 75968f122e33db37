use std::fmt;

/// Modifier bits as accepted by `RegisterHotKey`.
pub const MOD_ALT: u32 = 0x0001;
pub const MOD_CONTROL: u32 = 0x0002;
pub const MOD_SHIFT: u32 = 0x0004;
pub const MOD_WIN: u32 = 0x0008;

pub const VK_SHIFT: u32 = 0x10;
pub const VK_CONTROL: u32 = 0x11;
pub const VK_MENU: u32 = 0x12;
pub const VK_LWIN: u32 = 0x5B;
pub const VK_RWIN: u32 = 0x5C;

/// A parsed shortcut: modifier mask plus at most one non-modifier virtual key.
///
/// `vk == None` means the string named no usable key; such a shortcut cannot be bound.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Shortcut {
    pub mods: u32,
    pub vk: Option<u32>,
}

/// Modifier bit and the virtual keys that satisfy it.
///
/// Win has no generic virtual key, so either the left or the right key counts.
pub const MODIFIER_KEYS: [(u32, &[u32]); 4] = [
    (MOD_CONTROL, &[VK_CONTROL]),
    (MOD_SHIFT, &[VK_SHIFT]),
    (MOD_ALT, &[VK_MENU]),
    (MOD_WIN, &[VK_LWIN, VK_RWIN]),
];

const MODS_ORDER: &[(u32, &str)] = &[
    (MOD_CONTROL, "Ctrl"),
    (MOD_ALT, "Alt"),
    (MOD_SHIFT, "Shift"),
    (MOD_WIN, "Win"),
];

fn modifier_for_token(token: &str) -> Option<u32> {
    match token {
        "CTRL" | "CONTROL" => Some(MOD_CONTROL),
        "SHIFT" => Some(MOD_SHIFT),
        "ALT" => Some(MOD_ALT),
        "WIN" => Some(MOD_WIN),
        _ => None,
    }
}

fn vk_for_token(token: &str) -> Option<u32> {
    let bytes = token.as_bytes();

    if let [c] = bytes {
        return match *c {
            b'A'..=b'Z' | b'0'..=b'9' => Some(u32::from(*c)),
            b'\\' => Some(0xDC),
            b'/' => Some(0xBF),
            b'.' => Some(0xBE),
            b',' => Some(0xBC),
            b';' => Some(0xBA),
            b'\'' => Some(0xDE),
            b'[' => Some(0xDB),
            b']' => Some(0xDD),
            b'-' => Some(0xBD),
            b'=' => Some(0xBB),
            b'`' => Some(0xC0),
            _ => None,
        };
    }

    if let Some(n) = token.strip_prefix('F').and_then(|n| n.parse::<u32>().ok())
        && (1..=24).contains(&n)
    {
        return Some(0x70 + n - 1);
    }

    match token {
        "ESC" | "ESCAPE" => Some(0x1B),
        "TAB" => Some(0x09),
        "CAPSLOCK" => Some(0x14),
        "SPACE" => Some(0x20),
        "ENTER" | "RETURN" => Some(0x0D),
        "BACKSPACE" => Some(0x08),
        "DELETE" | "DEL" => Some(0x2E),
        "INSERT" | "INS" => Some(0x2D),
        "HOME" => Some(0x24),
        "END" => Some(0x23),
        "PAGEUP" => Some(0x21),
        "PAGEDOWN" => Some(0x22),
        "LEFT" => Some(0x25),
        "UP" => Some(0x26),
        "RIGHT" => Some(0x27),
        "DOWN" => Some(0x28),
        _ => None,
    }
}

fn name_for_vk(vk: u32) -> Option<String> {
    let name = match vk {
        0x30..=0x39 | 0x41..=0x5A => return char::from_u32(vk).map(String::from),
        0x70..=0x87 => return Some(format!("F{}", vk - 0x70 + 1)),
        0xDC => "\\",
        0xBF => "/",
        0xBE => ".",
        0xBC => ",",
        0xBA => ";",
        0xDE => "'",
        0xDB => "[",
        0xDD => "]",
        0xBD => "-",
        0xBB => "=",
        0xC0 => "`",
        0x1B => "Esc",
        0x09 => "Tab",
        0x14 => "CapsLock",
        0x20 => "Space",
        0x0D => "Enter",
        0x08 => "Backspace",
        0x2E => "Delete",
        0x2D => "Insert",
        0x24 => "Home",
        0x23 => "End",
        0x21 => "PageUp",
        0x22 => "PageDown",
        0x25 => "Left",
        0x26 => "Up",
        0x27 => "Right",
        0x28 => "Down",
        _ => return None,
    };
    Some(name.to_string())
}

/// Parses a human-readable shortcut such as `"Ctrl+Shift+\\"`.
///
/// Tokens are joined by `+` and matched case-insensitively. Modifiers are OR-ed into the
/// mask; the last recognised non-modifier token becomes the key. Unknown tokens are
/// dropped without error.
#[must_use]
pub fn parse_shortcut(text: &str) -> Shortcut {
    let mut out = Shortcut::default();

    for token in text.split('+') {
        let token = token.trim().to_ascii_uppercase();
        if token.is_empty() {
            continue;
        }

        if let Some(m) = modifier_for_token(&token) {
            out.mods |= m;
        } else if let Some(vk) = vk_for_token(&token) {
            out.vk = Some(vk);
        }
    }

    out
}

impl Shortcut {
    #[must_use]
    pub const fn is_bindable(&self) -> bool {
        self.vk.is_some()
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = MODS_ORDER
            .iter()
            .filter_map(|(mask, label)| ((self.mods & mask) != 0).then(|| (*label).to_string()))
            .collect();

        if let Some(vk) = self.vk {
            parts.push(name_for_vk(vk).unwrap_or_else(|| format!("VK 0x{vk:02X}")));
        }

        if parts.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&parts.join("+"))
        }
    }
}
