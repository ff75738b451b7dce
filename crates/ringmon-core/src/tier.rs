/// Utilization band used to pick the ring color.
///
/// Lower bounds are inclusive: 15 is `LowMedium`, 14 is `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorTier {
    Low,
    LowMedium,
    Medium,
    MediumHigh,
    High,
    Extreme,
}

impl ColorTier {
    /// Every tier, lowest first.
    pub const ALL: [ColorTier; 6] = [
        Self::Low,
        Self::LowMedium,
        Self::Medium,
        Self::MediumHigh,
        Self::High,
        Self::Extreme,
    ];

    /// Maps a utilization percentage to its tier.
    pub fn for_value(value: u8) -> Self {
        match value {
            0..15 => Self::Low,
            15..30 => Self::LowMedium,
            30..50 => Self::Medium,
            50..70 => Self::MediumHigh,
            70..85 => Self::High,
            _ => Self::Extreme,
        }
    }

    /// Key used for this tier in the `[theme.gradients]` table.
    pub fn key(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::LowMedium => "low_medium",
            Self::Medium => "medium",
            Self::MediumHigh => "medium_high",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive_lower_bounds() {
        // Arrange
        let cases = [
            (0, ColorTier::Low),
            (14, ColorTier::Low),
            (15, ColorTier::LowMedium),
            (29, ColorTier::LowMedium),
            (30, ColorTier::Medium),
            (49, ColorTier::Medium),
            (50, ColorTier::MediumHigh),
            (69, ColorTier::MediumHigh),
            (70, ColorTier::High),
            (84, ColorTier::High),
            (85, ColorTier::Extreme),
            (100, ColorTier::Extreme),
        ];

        // Act / Assert
        for (value, expected) in cases {
            assert_eq!(ColorTier::for_value(value), expected, "value {value}");
        }
    }

    #[test]
    fn tiers_never_decrease_as_value_rises() {
        // Act
        let tiers: Vec<_> = (0..=100).map(ColorTier::for_value).collect();

        // Assert
        assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
    }
}
