use super::MetricsRecord;
use crate::carbon::calculator::round_to;

/// Stand-in metrics served while the provider is throttling us.
///
/// Derived only from the URL length (in UTF-16 code units), so the same URL
/// always yields the same numbers.
pub fn mock_metrics(url: &str) -> MetricsRecord {
    let seed = url.encode_utf16().count() as u32;

    MetricsRecord {
        total_weight_mb: round_to(1.5 + f64::from(seed % 30) / 10.0, 4),
        total_requests: 20 + seed % 50,
        js_size_kb: f64::from(400 + seed % 200),
        css_size_kb: f64::from(50 + seed % 50),
        image_size_kb: f64::from(800 + seed % 500),
        performance_score: (60 + seed % 35) as u8,
    }
}
