//! Ring color themes.
//!
//! [`ThemeConfig`] deserializes from the `[theme]` table in
//! `settings.toml`. With the theme disabled (or an entry that does not
//! parse) the ring falls back to the plain green/yellow/orange/red
//! palette.

use serde::{Deserialize, Serialize};

use crate::tier::ColorTier;

/// User-facing theme configuration.
///
/// ```toml
/// [theme]
/// enabled = true
/// name = "catppuccin"
/// flavor = "mocha"
///
/// [theme.gradients]
/// high = ["maroon", "#ff0000"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Use themed gradients. `false` selects the fallback palette.
    pub enabled: bool,
    /// Theme family name (e.g. "catppuccin").
    pub name: String,
    /// Flavor within the theme (e.g. "mocha", "latte").
    pub flavor: String,
    /// Track (unfilled ring) color. Empty uses the flavor default.
    pub track: String,
    /// Per-tier gradient overrides.
    pub gradients: GradientOverrides,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "catppuccin".into(),
            flavor: "mocha".into(),
            track: String::new(),
            gradients: GradientOverrides::default(),
        }
    }
}

/// Optional `[top, bottom]` color pairs per tier. Each color is a hex code
/// or a Catppuccin color name. An empty list keeps the flavor default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientOverrides {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub low: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub low_medium: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub medium: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub medium_high: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub high: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extreme: Vec<String>,
}

impl GradientOverrides {
    /// Override entries for `tier`.
    pub fn get(&self, tier: ColorTier) -> &[String] {
        match tier {
            ColorTier::Low => &self.low,
            ColorTier::LowMedium => &self.low_medium,
            ColorTier::Medium => &self.medium,
            ColorTier::MediumHigh => &self.medium_high,
            ColorTier::High => &self.high,
            ColorTier::Extreme => &self.extreme,
        }
    }
}

impl ThemeConfig {
    /// Resolves the name and flavor. Unknown combinations fall back to
    /// Catppuccin Mocha.
    pub fn resolve(&self) -> Theme {
        match self.name.to_ascii_lowercase().as_str() {
            "catppuccin" => match self.flavor.to_ascii_lowercase().as_str() {
                "macchiato" => Theme::Macchiato,
                "frappe" | "frappé" => Theme::Frappe,
                "latte" => Theme::Latte,
                _ => Theme::Mocha,
            },
            _ => Theme::Mocha,
        }
    }
}

/// A resolved Catppuccin flavor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Mocha,
    Macchiato,
    Frappe,
    Latte,
}

impl Theme {
    /// Default `(top, bottom)` gradient stops for a tier, as hex codes.
    ///
    /// Each tier blends into the next tier's base color, so the ring
    /// drifts from teal through green, yellow, peach and maroon to red.
    pub fn gradient(self, tier: ColorTier) -> (&'static str, &'static str) {
        let c = |name| self.named_color(name).unwrap_or("#000000");
        match tier {
            ColorTier::Low => (c("teal"), c("green")),
            ColorTier::LowMedium => (c("green"), c("yellow")),
            ColorTier::Medium => (c("yellow"), c("peach")),
            ColorTier::MediumHigh => (c("peach"), c("maroon")),
            ColorTier::High => (c("maroon"), c("red")),
            ColorTier::Extreme => (c("red"), self.deep_red()),
        }
    }

    /// Track color (Catppuccin Surface0).
    pub fn track(self) -> &'static str {
        match self {
            Self::Mocha => "#313244",
            Self::Macchiato => "#363a4f",
            Self::Frappe => "#414559",
            Self::Latte => "#ccd0da",
        }
    }

    fn deep_red(self) -> &'static str {
        match self {
            Self::Latte => "#a10d2d",
            _ => "#d20f39",
        }
    }

    /// Resolves a Catppuccin color name to its hex code for this flavor.
    pub fn named_color(self, name: &str) -> Option<&'static str> {
        let table = match self {
            Self::Mocha => MOCHA,
            Self::Macchiato => MACCHIATO,
            Self::Frappe => FRAPPE,
            Self::Latte => LATTE,
        };
        table
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(_, hex)| *hex)
    }

    /// Resolves a value that is either a hex code or a color name.
    pub fn resolve_color<'a>(self, value: &'a str) -> Option<&'a str> {
        let value = value.trim();
        if value.starts_with('#') {
            return Some(value);
        }
        self.named_color(value)
    }
}

const MOCHA: &[(&str, &str)] = &[
    ("red", "#f38ba8"),
    ("maroon", "#eba0ac"),
    ("peach", "#fab387"),
    ("yellow", "#f9e2af"),
    ("green", "#a6e3a1"),
    ("teal", "#94e2d5"),
    ("sky", "#89dceb"),
    ("blue", "#89b4fa"),
    ("mauve", "#cba6f7"),
];

const MACCHIATO: &[(&str, &str)] = &[
    ("red", "#ed8796"),
    ("maroon", "#ee99a0"),
    ("peach", "#f5a97f"),
    ("yellow", "#eed49f"),
    ("green", "#a6da95"),
    ("teal", "#8bd5ca"),
    ("sky", "#91d7e3"),
    ("blue", "#8aadf4"),
    ("mauve", "#c6a0f6"),
];

const FRAPPE: &[(&str, &str)] = &[
    ("red", "#e78284"),
    ("maroon", "#ea999c"),
    ("peach", "#ef9f76"),
    ("yellow", "#e5c890"),
    ("green", "#a6d189"),
    ("teal", "#81c8be"),
    ("sky", "#99d1db"),
    ("blue", "#8caaee"),
    ("mauve", "#ca9ee6"),
];

const LATTE: &[(&str, &str)] = &[
    ("red", "#d20f39"),
    ("maroon", "#e64553"),
    ("peach", "#fe640b"),
    ("yellow", "#df8e1d"),
    ("green", "#40a02b"),
    ("teal", "#179299"),
    ("sky", "#04a5e5"),
    ("blue", "#1e66f5"),
    ("mauve", "#8839ef"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_enabled_catppuccin_mocha() {
        let tc = ThemeConfig::default();
        assert!(tc.enabled);
        assert_eq!(tc.resolve(), Theme::Mocha);
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let tc = ThemeConfig {
            name: "Catppuccin".into(),
            flavor: "Latte".into(),
            ..Default::default()
        };
        assert_eq!(tc.resolve(), Theme::Latte);
    }

    #[test]
    fn unknown_theme_falls_back_to_mocha() {
        let tc = ThemeConfig {
            name: "tokyo".into(),
            flavor: "night".into(),
            ..Default::default()
        };
        assert_eq!(tc.resolve(), Theme::Mocha);
    }

    #[test]
    fn mocha_gradients_chain_tier_to_tier() {
        let t = Theme::Mocha;
        assert_eq!(t.gradient(ColorTier::Low), ("#94e2d5", "#a6e3a1"));
        assert_eq!(t.gradient(ColorTier::Extreme), ("#f38ba8", "#d20f39"));
        for pair in ColorTier::ALL.windows(2) {
            assert_eq!(t.gradient(pair[0]).1, t.gradient(pair[1]).0);
        }
    }

    #[test]
    fn resolve_color_accepts_hex_and_names() {
        let t = Theme::Latte;
        assert_eq!(t.resolve_color("#123456"), Some("#123456"));
        assert_eq!(t.resolve_color("Green"), Some("#40a02b"));
        assert_eq!(t.resolve_color("chartreuse"), None);
    }

    #[test]
    fn gradient_overrides_parse_from_toml() {
        // Act
        let tc: ThemeConfig = toml::from_str(
            r##"
            flavor = "frappe"
            [gradients]
            high = ["maroon", "#ff0000"]
            "##,
        )
        .unwrap();

        // Assert
        assert_eq!(tc.resolve(), Theme::Frappe);
        assert_eq!(tc.gradients.get(ColorTier::High), ["maroon", "#ff0000"]);
        assert!(tc.gradients.get(ColorTier::Low).is_empty());
    }
}
