use serde::Serialize;

use super::calculator::EcoRating;

/// Human-readable figures for a scan, as shown on result pages.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DisplaySummary {
    pub co2: String,
    pub energy: String,
    pub weight: String,
    pub rating_label: &'static str,
    pub rating_color: &'static str,
}

impl DisplaySummary {
    pub fn new(co2_grams: f64, energy_kwh: f64, weight_mb: f64, rating: EcoRating) -> Self {
        Self {
            co2: format_co2(co2_grams),
            energy: format_kwh(energy_kwh),
            weight: format_mb(weight_mb),
            rating_label: rating_label(rating),
            rating_color: rating_color(rating),
        }
    }
}

pub fn format_co2(grams: f64) -> String {
    if grams < 1.0 {
        format!("{:.1} mg", grams * 1000.0)
    } else {
        format!("{grams:.2} g")
    }
}

pub fn format_kwh(kwh: f64) -> String {
    if kwh < 0.001 {
        format!("{:.1} µWh", kwh * 1_000_000.0)
    } else if kwh < 1.0 {
        format!("{:.2} mWh", kwh * 1000.0)
    } else {
        format!("{kwh:.4} kWh")
    }
}

pub fn format_mb(mb: f64) -> String {
    if mb < 1.0 {
        format!("{:.0} KB", mb * 1024.0)
    } else {
        format!("{mb:.2} MB")
    }
}

pub fn rating_label(rating: EcoRating) -> &'static str {
    match rating {
        EcoRating::Green => "Efficient",
        EcoRating::Moderate => "Moderate",
        EcoRating::Heavy => "Heavy",
    }
}

pub fn rating_color(rating: EcoRating) -> &'static str {
    match rating {
        EcoRating::Green => "#22c55e",
        EcoRating::Moderate => "#eab308",
        EcoRating::Heavy => "#ef4444",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn co2_switches_to_milligrams_below_one_gram() {
        assert_eq!(format_co2(0.9393), "939.3 mg");
        assert_eq!(format_co2(3.0059), "3.01 g");
    }

    #[test]
    fn energy_units() {
        assert_eq!(format_kwh(0.000396), "396.0 µWh");
        assert_eq!(format_kwh(0.001978), "1.98 mWh");
        assert_eq!(format_kwh(2.5), "2.5000 kWh");
    }

    #[test]
    fn weight_units() {
        assert_eq!(format_mb(0.5), "512 KB");
        assert_eq!(format_mb(2.5), "2.50 MB");
    }

    #[test]
    fn summary_uses_rating_palette() {
        let s = DisplaySummary::new(0.9393, 0.001978, 2.5, EcoRating::Green);
        assert_eq!(s.rating_label, "Efficient");
        assert_eq!(s.rating_color, "#22c55e");
        assert_eq!(s.weight, "2.50 MB");
    }
}
