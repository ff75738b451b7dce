/// RGB color parsed from a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a hex color string like "#a6e3a1" or "a6e3a1".
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        Some(Self {
            r: u8::from_str_radix(&hex[0..2], 16).ok()?,
            g: u8::from_str_radix(&hex[2..4], 16).ok()?,
            b: u8::from_str_radix(&hex[4..6], 16).ok()?,
        })
    }

    /// Linear interpolation towards `other`; `t` is clamped to 0.0–1.0.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Packs the color as premultiplied BGRA (`0xAARRGGBB` in memory order
    /// expected by 32-bit top-down DIB sections).
    pub fn premultiplied(self, alpha: u8) -> u32 {
        let a = u32::from(alpha);
        let scale = |c: u8| (u32::from(c) * a + 127) / 255;
        (a << 24) | (scale(self.r) << 16) | (scale(self.g) << 8) | scale(self.b)
    }
}
