//! Tier to brush lookup.
//!
//! A [`Palette`] is built once per gadget from the theme settings. Every
//! tier always has a brush: the themed gradient when it resolves, the
//! fixed fallback color otherwise.

use crate::color::Color;
use crate::log::LogSink;
use crate::log_warn;
use crate::settings::ThemeConfig;
use crate::tier::ColorTier;

/// Paint used for a ring fill or the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brush {
    Solid(Color),
    /// Vertical gradient from `top` (y = 0) to `bottom`.
    Gradient { top: Color, bottom: Color },
}

impl Brush {
    /// Color at vertical fraction `t` (0.0 at the top, 1.0 at the bottom).
    pub fn color_at(&self, t: f64) -> Color {
        match *self {
            Self::Solid(c) => c,
            Self::Gradient { top, bottom } => top.lerp(bottom, t),
        }
    }
}

/// Fixed colors used when no theme applies.
pub mod fallback {
    use crate::color::Color;

    pub const GREEN: Color = Color::rgb(0x00, 0x80, 0x00);
    pub const YELLOW: Color = Color::rgb(0xFF, 0xFF, 0x00);
    pub const ORANGE: Color = Color::rgb(0xFF, 0xA5, 0x00);
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);
    pub const TRACK: Color = Color::rgb(0x2B, 0x2B, 0x2B);
}

/// Fallback color for a tier.
pub fn fallback_color(tier: ColorTier) -> Color {
    match tier {
        ColorTier::Low => fallback::GREEN,
        ColorTier::LowMedium => fallback::YELLOW,
        ColorTier::Medium | ColorTier::MediumHigh => fallback::ORANGE,
        ColorTier::High | ColorTier::Extreme => fallback::RED,
    }
}

/// Resolved brushes for every tier plus the track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    tiers: [Brush; 6],
    track: Brush,
}

impl Default for Palette {
    fn default() -> Self {
        Self::fallback()
    }
}

impl Palette {
    /// The plain palette with no theme applied.
    pub fn fallback() -> Self {
        Self {
            tiers: ColorTier::ALL.map(|t| Brush::Solid(fallback_color(t))),
            track: Brush::Solid(fallback::TRACK),
        }
    }

    /// Builds the palette from theme settings.
    ///
    /// Entries that do not resolve to a color are logged once here and
    /// fall back for that tier only.
    pub fn from_theme(theme: &ThemeConfig, log: &dyn LogSink) -> Self {
        let mut palette = Self::fallback();
        if !theme.enabled {
            return palette;
        }
        let resolved = theme.resolve();

        for (i, tier) in ColorTier::ALL.into_iter().enumerate() {
            let overrides = theme.gradients.get(tier);
            let (top, bottom) = if overrides.is_empty() {
                let (t, b) = resolved.gradient(tier);
                (Some(t), Some(b))
            } else if overrides.len() == 2 {
                (
                    resolved.resolve_color(&overrides[0]),
                    resolved.resolve_color(&overrides[1]),
                )
            } else {
                (None, None)
            };

            match (top.and_then(Color::from_hex), bottom.and_then(Color::from_hex)) {
                (Some(top), Some(bottom)) => palette.tiers[i] = Brush::Gradient { top, bottom },
                _ => log_warn!(
                    log,
                    "theme gradient for '{}' is invalid ({:?}), using fallback color",
                    tier.key(),
                    overrides
                ),
            }
        }

        let track = if theme.track.is_empty() {
            Some(resolved.track())
        } else {
            resolved.resolve_color(&theme.track)
        };
        match track.and_then(Color::from_hex) {
            Some(c) => palette.track = Brush::Solid(c),
            None => log_warn!(
                log,
                "theme track color '{}' is invalid, using fallback color",
                theme.track
            ),
        }

        palette
    }

    /// Brush for a tier.
    pub fn brush(&self, tier: ColorTier) -> Brush {
        self.tiers[tier as usize]
    }

    /// Brush for a utilization value.
    pub fn brush_for(&self, value: u8) -> Brush {
        self.brush(ColorTier::for_value(value))
    }

    pub fn track(&self) -> Brush {
        self.track
    }
}
