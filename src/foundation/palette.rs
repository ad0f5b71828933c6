use crate::foundation::error::{PlaceError, PlaceResult};

/// Straight 8-bit RGB triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

const fn rgb(hex: u32) -> Rgb8 {
    Rgb8 {
        r: (hex >> 16) as u8,
        g: (hex >> 8) as u8,
        b: hex as u8,
    }
}

pub(crate) const COLORS_2017: [Rgb8; 16] = [
    rgb(0xFFFFFF),
    rgb(0xE4E4E4),
    rgb(0x888888),
    rgb(0x222222),
    rgb(0xFFA7D1),
    rgb(0xE50000),
    rgb(0xE59500),
    rgb(0xA06A42),
    rgb(0xE5D900),
    rgb(0x94E044),
    rgb(0x02BE01),
    rgb(0x00E5F0),
    rgb(0x0083C7),
    rgb(0x0000EA),
    rgb(0xE04AFF),
    rgb(0x820080),
];

// 2022 grew the palette in two steps; indices 16.. and 24.. only appear after each expansion.
pub(crate) const COLORS_2022: [Rgb8; 32] = [
    rgb(0xFFFFFF),
    rgb(0xD4D7D9),
    rgb(0x898D90),
    rgb(0x000000),
    rgb(0x9C6926),
    rgb(0xFF99AA),
    rgb(0xB44AC0),
    rgb(0x811E9F),
    rgb(0x51E9F4),
    rgb(0x3690EA),
    rgb(0x2450A4),
    rgb(0x7EED56),
    rgb(0x00A368),
    rgb(0xFFD635),
    rgb(0xFFA800),
    rgb(0xFF4500),

    rgb(0x6D482F),
    rgb(0xFF3881),
    rgb(0x6A5CFF),
    rgb(0x493AC1),
    rgb(0x009EAA),
    rgb(0x00756F),
    rgb(0x00CC78),
    rgb(0xBE0039),

    rgb(0x515252),
    rgb(0xFFB470),
    rgb(0xDE107F),
    rgb(0xE4ABFF),
    rgb(0x94B3FF),
    rgb(0x00CCC0),
    rgb(0xFFF8B8),
    rgb(0x6D001A),
];

pub(crate) const COLORS_2023: [Rgb8; 32] = [
    rgb(0xFF4500),
    rgb(0xFFA800),
    rgb(0xFFD635),
    rgb(0x00A368),
    rgb(0x3690EA),
    rgb(0xB44AC0),
    rgb(0x000000),
    rgb(0xFFFFFF),

    rgb(0x7EED56),
    rgb(0x2450A4),
    rgb(0x51E9F4),
    rgb(0x811E9F),
    rgb(0xFF99AA),
    rgb(0x9C6926),
    rgb(0x898D90),
    rgb(0xD4D7D9),

    rgb(0xBE0039),
    rgb(0x00CC78),
    rgb(0x00756F),
    rgb(0x009EAA),
    rgb(0x493AC1),
    rgb(0x6A5CFF),
    rgb(0xFF3881),
    rgb(0x6D482F),

    rgb(0x6D001A),
    rgb(0xFFF8B8),
    rgb(0x00CCC0),
    rgb(0x94B3FF),
    rgb(0xE4ABFF),
    rgb(0xDE107F),
    rgb(0xFFB470),
    rgb(0x515252),
];

/// Ordered color table; a color's position is its palette index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: &'static [Rgb8],
}

impl Palette {
    pub(crate) const fn new(colors: &'static [Rgb8]) -> Self {
        Self { colors }
    }

    /// Number of valid color indices.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Return `true` when the palette holds no colors.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// All colors in index order.
    pub fn colors(&self) -> &'static [Rgb8] {
        self.colors
    }

    /// The first `len` colors, as used by a canvas epoch with a reduced palette.
    pub fn prefix(&self, len: usize) -> &'static [Rgb8] {
        &self.colors[..len.min(self.colors.len())]
    }

    /// Resolve a `#RRGGBB` string (case-insensitive) to its palette index.
    pub fn index_of_hex(&self, hex: &str) -> PlaceResult<u8> {
        let unknown = || PlaceError::format(format!("unknown color key '{hex}'"));
        let digits = hex.strip_prefix('#').ok_or_else(unknown)?;
        if digits.len() != 6 || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(unknown());
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| unknown())?;
        let want = rgb(value);
        self.colors
            .iter()
            .position(|c| *c == want)
            .map(|i| i as u8)
            .ok_or_else(unknown)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/palette.rs"]
mod tests;
