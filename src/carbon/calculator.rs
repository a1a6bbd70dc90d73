use serde::{Deserialize, Serialize};

/// Energy used per gigabyte transferred (kWh/GB).
pub const ENERGY_PER_GB: f64 = 0.81;
/// Grid carbon intensity (g CO2 per kWh).
pub const CO2_PER_KWH: f64 = 475.0;
/// Emissions at which the eco-score bottoms out.
const ZERO_SCORE_CO2_GRAMS: f64 = 5.0;

/// Qualitative bucket over the eco-score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EcoRating {
    Green,
    Moderate,
    Heavy,
}

impl EcoRating {
    pub fn from_score(eco_score: u8) -> Self {
        match eco_score {
            70.. => EcoRating::Green,
            40..=69 => EcoRating::Moderate,
            _ => EcoRating::Heavy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EcoRating::Green => "green",
            EcoRating::Moderate => "moderate",
            EcoRating::Heavy => "heavy",
        }
    }
}

impl std::str::FromStr for EcoRating {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "green" => Ok(EcoRating::Green),
            "moderate" => Ok(EcoRating::Moderate),
            "heavy" => Ok(EcoRating::Heavy),
            other => anyhow::bail!("unknown eco rating: {other}"),
        }
    }
}

/// Footprint estimate derived from page weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CarbonResult {
    pub energy_kwh: f64,
    pub co2_grams: f64,
    pub eco_score: u8,
    pub rating: EcoRating,
}

/// Estimates energy and emissions for a page of `total_weight_mb` megabytes.
///
/// Negative, NaN and infinite weights are treated as 0 MB. Energy is rounded
/// to 6 decimals and CO2 to 4; the score is taken from the unrounded CO2.
pub fn calculate(total_weight_mb: f64) -> CarbonResult {
    let weight_mb = if total_weight_mb.is_finite() && total_weight_mb > 0.0 {
        total_weight_mb
    } else {
        0.0
    };

    let total_gb = weight_mb / 1024.0;
    let energy_kwh = total_gb * ENERGY_PER_GB;
    let co2_grams = energy_kwh * CO2_PER_KWH;
    let eco_score = eco_score(co2_grams);

    CarbonResult {
        energy_kwh: round_to(energy_kwh, 6),
        co2_grams: round_to(co2_grams, 4),
        eco_score,
        rating: EcoRating::from_score(eco_score),
    }
}

/// 0 g maps to 100, 5 g or more maps to 0, linear in between.
pub fn eco_score(co2_grams: f64) -> u8 {
    let score = (100.0 - (co2_grams / ZERO_SCORE_CO2_GRAMS) * 100.0).round();
    score.clamp(0.0, 100.0) as u8
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_is_perfect() {
        let r = calculate(0.0);
        assert_eq!(r.eco_score, 100);
        assert_eq!(r.rating, EcoRating::Green);
        assert_eq!(r.co2_grams, 0.0);
        assert_eq!(r.energy_kwh, 0.0);
    }

    #[test]
    fn average_page_follows_formula() {
        // 2.5 / 1024 * 0.81 * 475 = 0.93933...
        let r = calculate(2.5);
        assert_eq!(r.energy_kwh, 0.001978);
        assert_eq!(r.co2_grams, 0.9393);
        assert_eq!(r.eco_score, 81);
        assert_eq!(r.rating, EcoRating::Green);
    }

    #[test]
    fn score_bottoms_out_at_five_grams() {
        // 5 g needs 5 / 475 / 0.81 * 1024 MB
        let threshold_mb = 5.0 / CO2_PER_KWH / ENERGY_PER_GB * 1024.0;
        assert_eq!(calculate(threshold_mb).eco_score, 0);
        assert_eq!(calculate(threshold_mb * 3.0).eco_score, 0);
        assert_eq!(calculate(threshold_mb).rating, EcoRating::Heavy);
    }

    #[test]
    fn score_is_monotonic_in_weight() {
        let mut prev = u8::MAX;
        for step in 0..=400 {
            let score = calculate(step as f64 * 0.05).eco_score;
            assert!(score <= prev, "score rose at step {step}");
            prev = score;
        }
    }

    #[test]
    fn rating_boundaries() {
        assert_eq!(EcoRating::from_score(100), EcoRating::Green);
        assert_eq!(EcoRating::from_score(70), EcoRating::Green);
        assert_eq!(EcoRating::from_score(69), EcoRating::Moderate);
        assert_eq!(EcoRating::from_score(40), EcoRating::Moderate);
        assert_eq!(EcoRating::from_score(39), EcoRating::Heavy);
        assert_eq!(EcoRating::from_score(0), EcoRating::Heavy);
    }

    #[test]
    fn rating_tracks_score() {
        for tenth in 0..200 {
            let r = calculate(tenth as f64 / 10.0);
            assert_eq!(r.rating, EcoRating::from_score(r.eco_score));
        }
    }

    #[test]
    fn malformed_weight_is_clamped_to_zero() {
        assert_eq!(calculate(-3.0), calculate(0.0));
        assert_eq!(calculate(f64::NAN), calculate(0.0));
        assert_eq!(calculate(f64::INFINITY), calculate(0.0));
    }

    #[test]
    fn rating_parses_and_serializes_lowercase() {
        assert_eq!("moderate".parse::<EcoRating>().unwrap(), EcoRating::Moderate);
        assert!("Green".parse::<EcoRating>().is_err());
        let json = serde_json::to_string(&EcoRating::Heavy).unwrap();
        assert_eq!(json, "\"heavy\"");
    }
}
