//! Breed classification and baseline girth/height ratios
//!
//! Baseline ratios were fitted against scale-verified animals from the herd:
//! European beef breeds are the deepest-chested and carry the highest ratio,
//! zebu-dominant animals the leanest frame and the lowest.

use serde::{Deserialize, Serialize};

/// Cattle breed groups recognized by the platform
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Breed {
    /// Zebu-dominant (>70% Brahman/Gyr): lean frame, large ears, prominent hump
    ZebuPure,
    /// F1 zebu x European beef cross: medium build, moderate hump
    ZebuEuropeanCross,
    /// Gyr x Holstein tropical dairy cross (Girolando)
    TropicalDairyCross,
    /// Pure Holstein/Jersey type: angular dairy frame, no hump
    EuropeanDairy,
    /// Angus/Simmental/Charolais type: deep barrel chest, heavy muscling
    EuropeanBeef,
}

impl Breed {
    pub const ALL: [Breed; 5] = [
        Breed::ZebuPure,
        Breed::ZebuEuropeanCross,
        Breed::TropicalDairyCross,
        Breed::EuropeanDairy,
        Breed::EuropeanBeef,
    ];

    /// Baseline girth/height ratio used before any calibration data exists
    pub fn baseline_ratio(&self) -> f64 {
        match self {
            Breed::ZebuPure => 1.34,
            Breed::ZebuEuropeanCross => 1.35,
            Breed::TropicalDairyCross => 1.35,
            Breed::EuropeanDairy => 1.35,
            Breed::EuropeanBeef => 1.42,
        }
    }

    /// Map a free-form breed label (manual entry or AI detection) to a breed
    /// group. Returns `None` when the label matches nothing known.
    pub fn from_label(label: &str) -> Option<Breed> {
        let name = label.to_lowercase();
        if name.is_empty() {
            return None;
        }

        // Girolando first: "gyr" alone would otherwise match the zebu group
        if name.contains("girolando") || (name.contains("gyr") && name.contains("holstein")) {
            return Some(Breed::TropicalDairyCross);
        }

        if ["cebu", "cebú", "brahman", "gyr", "nelore"]
            .iter()
            .any(|kw| name.contains(kw))
        {
            let crossed = ["cruce", "cruza", "europeo", "×", " x ", "f1"]
                .iter()
                .any(|kw| name.contains(kw));
            return Some(if crossed {
                Breed::ZebuEuropeanCross
            } else {
                Breed::ZebuPure
            });
        }

        if ["holstein", "jersey", "ayrshire"]
            .iter()
            .any(|kw| name.contains(kw))
        {
            return Some(Breed::EuropeanDairy);
        }

        if ["angus", "hereford", "charolais", "simmental", "limousin"]
            .iter()
            .any(|kw| name.contains(kw))
        {
            return Some(Breed::EuropeanBeef);
        }

        None
    }
}

impl std::fmt::Display for Breed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Breed::ZebuPure => write!(f, "Cebú Puro"),
            Breed::ZebuEuropeanCross => write!(f, "Cebú × Europeo"),
            Breed::TropicalDairyCross => write!(f, "Girolando"),
            Breed::EuropeanDairy => write!(f, "Europeo Lechero"),
            Breed::EuropeanBeef => write!(f, "Europeo Carne"),
        }
    }
}
