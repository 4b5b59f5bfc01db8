//! Scale-verified anchor animals
//!
//! The five animals the herd's ratio model was originally fitted against,
//! weighed on the chute scale on 2024-12-30. A fresh herd configured with
//! `seed_when_empty` starts from these instead of the bare default ratio.

use chrono::{DateTime, TimeZone, Utc};
use shared::{Breed, CalibrationPoint, Measurement};

struct Anchor {
    id: &'static str,
    length_cm: f64,
    height_cm: f64,
    width_cm: f64,
    true_weight_kg: f64,
    implied_ratio: f64,
    breed: Breed,
}

const ANCHORS: [Anchor; 5] = [
    Anchor {
        id: "#278",
        length_cm: 125.0,
        height_cm: 105.0,
        width_cm: 55.0,
        true_weight_kg: 231.0,
        implied_ratio: 1.348,
        breed: Breed::ZebuPure,
    },
    Anchor {
        id: "TAN_204",
        length_cm: 115.0,
        height_cm: 102.0,
        width_cm: 50.0,
        true_weight_kg: 204.0,
        implied_ratio: 1.360,
        breed: Breed::ZebuEuropeanCross,
    },
    Anchor {
        id: "TAN_210",
        length_cm: 118.0,
        height_cm: 103.0,
        width_cm: 52.0,
        true_weight_kg: 210.0,
        implied_ratio: 1.348,
        breed: Breed::ZebuEuropeanCross,
    },
    Anchor {
        id: "GIROLANDO_255",
        length_cm: 130.0,
        height_cm: 108.0,
        width_cm: 58.0,
        true_weight_kg: 255.0,
        implied_ratio: 1.350,
        breed: Breed::TropicalDairyCross,
    },
    Anchor {
        id: "#274",
        length_cm: 128.0,
        height_cm: 107.0,
        width_cm: 55.0,
        true_weight_kg: 272.0,
        implied_ratio: 1.418,
        breed: Breed::EuropeanBeef,
    },
];

fn weigh_in_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap()
}

/// The five anchor calibration points
pub fn anchor_points() -> Vec<CalibrationPoint> {
    let date = weigh_in_date();
    ANCHORS
        .iter()
        .map(|a| CalibrationPoint {
            id: a.id.to_string(),
            date,
            measurement: Measurement::with_width(a.height_cm, a.length_cm, a.width_cm),
            true_weight_kg: a.true_weight_kg,
            breed: Some(a.breed),
            implied_ratio: a.implied_ratio,
        })
        .collect()
}
