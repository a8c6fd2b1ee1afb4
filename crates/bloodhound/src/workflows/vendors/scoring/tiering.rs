use serde::Serialize;

use super::super::domain::{RiskLevel, RiskScore};

pub const CRITICAL_FLOOR: u8 = 90;
pub const HIGH_FLOOR: u8 = 70;
pub const MEDIUM_FLOOR: u8 = 40;

/// Closed-open step function over `[0, 100]`; a boundary value belongs to the
/// more severe tier.
pub fn tier(score: RiskScore) -> RiskLevel {
    match score.value() {
        value if value >= CRITICAL_FLOOR => RiskLevel::Critical,
        value if value >= HIGH_FLOOR => RiskLevel::High,
        value if value >= MEDIUM_FLOOR => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// Foreground/background pair used by dashboards to render a tier badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeColors {
    pub foreground: &'static str,
    pub background: &'static str,
}

impl RiskLevel {
    /// Lowest score that maps to this tier.
    pub const fn floor(self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => MEDIUM_FLOOR,
            RiskLevel::High => HIGH_FLOOR,
            RiskLevel::Critical => CRITICAL_FLOOR,
        }
    }

    pub const fn badge(self) -> BadgeColors {
        match self {
            RiskLevel::Critical => BadgeColors {
                foreground: "#FF4444",
                background: "#FFE5E5",
            },
            RiskLevel::High => BadgeColors {
                foreground: "#FFA500",
                background: "#FFF3E0",
            },
            RiskLevel::Medium => BadgeColors {
                foreground: "#FFD700",
                background: "#FFFACD",
            },
            RiskLevel::Low => BadgeColors {
                foreground: "#4CAF50",
                background: "#E8F5E9",
            },
        }
    }
}
