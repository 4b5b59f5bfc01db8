//! Body condition score (BCS)

use serde::{Deserialize, Serialize};

use crate::error::EstimateError;

/// Standardized 1-9 fatness scale used in cattle husbandry
///
/// 5 is "moderate" (ribs palpable but not visible). Each point away from 5
/// shifts the girth/height ratio by one configured step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BodyConditionScore(u8);

impl BodyConditionScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 9;
    pub const MODERATE: BodyConditionScore = BodyConditionScore(5);

    pub fn new(score: u8) -> Result<Self, EstimateError> {
        if (Self::MIN..=Self::MAX).contains(&score) {
            Ok(Self(score))
        } else {
            Err(EstimateError::InvalidBodyCondition(score))
        }
    }

    pub fn score(&self) -> u8 {
        self.0
    }

    /// Ratio adjustment relative to the moderate midpoint
    pub fn ratio_offset(&self, step: f64) -> f64 {
        (self.0 as f64 - 5.0) * step
    }

    /// Whether the score sits in the normal 4-6 husbandry range
    pub fn is_normal_range(&self) -> bool {
        (4..=6).contains(&self.0)
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1..=3 => "Muy Flaco",
            4 => "Delgado",
            5 => "Moderado",
            6 => "Bueno",
            _ => "Gordo",
        }
    }
}

impl Default for BodyConditionScore {
    fn default() -> Self {
        Self::MODERATE
    }
}

impl TryFrom<u8> for BodyConditionScore {
    type Error = EstimateError;

    fn try_from(score: u8) -> Result<Self, Self::Error> {
        Self::new(score)
    }
}

impl From<BodyConditionScore> for u8 {
    fn from(bcs: BodyConditionScore) -> u8 {
        bcs.0
    }
}
