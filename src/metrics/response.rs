//! Typed view of the PageSpeed Insights v5 response.
//!
//! Every field is optional. Numbers and objects of the wrong JSON type read as
//! absent so a drifting provider schema degrades to zeros instead of failing
//! the scan.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::MetricsRecord;
use crate::carbon::calculator::round_to;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct PageSpeedResponse {
    #[serde(deserialize_with = "lenient_option")]
    pub lighthouse_result: Option<LighthouseResult>,
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorBody {
    #[serde(deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LighthouseResult {
    #[serde(deserialize_with = "lenient_object")]
    pub categories: Categories,
    #[serde(deserialize_with = "lenient_object")]
    pub audits: Audits,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Categories {
    #[serde(deserialize_with = "lenient_option")]
    pub performance: Option<Category>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Category {
    #[serde(deserialize_with = "lenient_number")]
    pub score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Audits {
    #[serde(rename = "total-byte-weight", deserialize_with = "lenient_option")]
    pub total_byte_weight: Option<Audit>,
    #[serde(rename = "network-requests", deserialize_with = "lenient_option")]
    pub network_requests: Option<Audit>,
    #[serde(rename = "resource-summary", deserialize_with = "lenient_option")]
    pub resource_summary: Option<Audit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Audit {
    #[serde(deserialize_with = "lenient_number")]
    pub numeric_value: Option<f64>,
    #[serde(deserialize_with = "lenient_option")]
    pub details: Option<AuditDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AuditDetails {
    #[serde(deserialize_with = "lenient_items")]
    pub items: Vec<Value>,
}

/// Resource categories broken out of the page weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResourceKind {
    Script,
    Stylesheet,
    Image,
    Other,
}

impl ResourceKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "script" => ResourceKind::Script,
            "stylesheet" | "css" => ResourceKind::Stylesheet,
            "image" => ResourceKind::Image,
            _ => ResourceKind::Other,
        }
    }
}

/// One row of the `resource-summary` audit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResourceSummaryItem {
    pub kind: ResourceKind,
    pub transfer_size: f64,
}

impl ResourceSummaryItem {
    /// Rows without a type tag or a numeric transfer size are skipped.
    /// Negative sizes count as zero.
    fn from_value(v: &Value) -> Option<Self> {
        let tag = v.get("resourceType")?.as_str()?;
        let transfer_size = v.get("transferSize")?.as_f64()?.max(0.0);
        Some(Self {
            kind: ResourceKind::from_tag(tag),
            transfer_size,
        })
    }
}

impl PageSpeedResponse {
    pub fn into_metrics(self) -> MetricsRecord {
        let lighthouse = self.lighthouse_result.unwrap_or_default();
        let audits = lighthouse.audits;

        let score = lighthouse
            .categories
            .performance
            .and_then(|c| c.score)
            .unwrap_or(0.0);
        let performance_score = (score * 100.0).round().clamp(0.0, 100.0) as u8;

        let total_bytes = audits
            .total_byte_weight
            .and_then(|a| a.numeric_value)
            .unwrap_or(0.0)
            .max(0.0);
        let total_weight_mb = total_bytes / (1024.0 * 1024.0);

        let total_requests = audits
            .network_requests
            .and_then(|a| a.details)
            .map(|d| d.items.len() as u32)
            .unwrap_or(0);

        let (mut js_bytes, mut css_bytes, mut image_bytes) = (0.0, 0.0, 0.0);
        let resource_items = audits
            .resource_summary
            .and_then(|a| a.details)
            .map(|d| d.items)
            .unwrap_or_default();
        for item in resource_items.iter().filter_map(ResourceSummaryItem::from_value) {
            match item.kind {
                ResourceKind::Script => js_bytes += item.transfer_size,
                ResourceKind::Stylesheet => css_bytes += item.transfer_size,
                ResourceKind::Image => image_bytes += item.transfer_size,
                ResourceKind::Other => {}
            }
        }

        MetricsRecord {
            total_weight_mb: round_to(total_weight_mb, 4),
            total_requests,
            js_size_kb: round_to(js_bytes / 1024.0, 2),
            css_size_kb: round_to(css_bytes / 1024.0, 2),
            image_size_kb: round_to(image_bytes / 1024.0, 2),
            performance_score,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| {
            e.message
                .clone()
                .unwrap_or_else(|| "unknown provider error".into())
        })
    }
}

fn lenient_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(d)?.as_f64())
}

fn lenient_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(d)?.as_str().map(str::to_owned))
}

/// Non-object values read as `T::default()`.
fn lenient_object<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient_option(d)?.unwrap_or_default())
}

/// Non-object values read as `None`.
fn lenient_option<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(d)? {
        v @ Value::Object(_) => Ok(serde_json::from_value(v).ok()),
        _ => Ok(None),
    }
}

fn lenient_items<'de, D>(d: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(d)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> MetricsRecord {
        serde_json::from_value::<PageSpeedResponse>(v)
            .expect("response should deserialize")
            .into_metrics()
    }

    #[test]
    fn extracts_full_report() {
        let m = parse(json!({
            "lighthouseResult": {
                "categories": { "performance": { "score": 0.87 } },
                "audits": {
                    "total-byte-weight": { "numericValue": 2621440 },
                    "network-requests": { "details": { "items": [{}, {}, {}] } },
                    "resource-summary": { "details": { "items": [
                        { "resourceType": "total", "transferSize": 2621440 },
                        { "resourceType": "script", "transferSize": 512000 },
                        { "resourceType": "Stylesheet", "transferSize": 51200 },
                        { "resourceType": "image", "transferSize": 1048576 },
                        { "resourceType": "font", "transferSize": 90000 }
                    ] } }
                }
            }
        }));
        assert_eq!(m.performance_score, 87);
        assert_eq!(m.total_weight_mb, 2.5);
        assert_eq!(m.total_requests, 3);
        assert_eq!(m.js_size_kb, 500.0);
        assert_eq!(m.css_size_kb, 50.0);
        assert_eq!(m.image_size_kb, 1024.0);
    }

    #[test]
    fn empty_document_reads_as_zeros() {
        let m = parse(json!({}));
        assert_eq!(m.performance_score, 0);
        assert_eq!(m.total_weight_mb, 0.0);
        assert_eq!(m.total_requests, 0);
        assert_eq!(m.js_size_kb, 0.0);
    }

    #[test]
    fn wrong_types_fail_closed() {
        let m = parse(json!({
            "lighthouseResult": {
                "categories": { "performance": { "score": "fast" } },
                "audits": {
                    "total-byte-weight": { "numericValue": "lots" },
                    "network-requests": { "details": { "items": "none" } },
                    "resource-summary": { "details": { "items": [
                        { "resourceType": "script", "transferSize": "big" },
                        { "transferSize": 1024 },
                        { "resourceType": "image", "transferSize": 2048 }
                    ] } }
                }
            }
        }));
        assert_eq!(m.performance_score, 0);
        assert_eq!(m.total_weight_mb, 0.0);
        assert_eq!(m.total_requests, 0);
        assert_eq!(m.js_size_kb, 0.0);
        assert_eq!(m.image_size_kb, 2.0);
    }

    #[test]
    fn null_containers_read_as_empty() {
        let m = parse(json!({
            "lighthouseResult": { "categories": null, "audits": null }
        }));
        assert_eq!(m.performance_score, 0);
        assert_eq!(m.total_weight_mb, 0.0);

        let m = parse(json!({ "lighthouseResult": "pending" }));
        assert_eq!(m.total_requests, 0);
    }

    #[test]
    fn malformed_audits_do_not_hide_the_rest() {
        let m = parse(json!({
            "lighthouseResult": {
                "categories": { "performance": null },
                "audits": {
                    "total-byte-weight": "n/a",
                    "network-requests": { "details": [1, 2] },
                    "resource-summary": { "details": { "items": [
                        { "resourceType": "image", "transferSize": 4096 }
                    ] } }
                }
            }
        }));
        assert_eq!(m.performance_score, 0);
        assert_eq!(m.total_weight_mb, 0.0);
        assert_eq!(m.total_requests, 0);
        assert_eq!(m.image_size_kb, 4.0);
    }

    #[test]
    fn negative_transfer_sizes_count_as_zero() {
        let m = parse(json!({
            "lighthouseResult": { "audits": { "resource-summary": { "details": { "items": [
                { "resourceType": "script", "transferSize": -2048 },
                { "resourceType": "script", "transferSize": 1024 },
                { "resourceType": "stylesheet", "transferSize": -1 }
            ] } } } }
        }));
        assert_eq!(m.js_size_kb, 1.0);
        assert_eq!(m.css_size_kb, 0.0);
    }

    #[test]
    fn duplicate_resource_types_are_summed() {
        let m = parse(json!({
            "lighthouseResult": { "audits": { "resource-summary": { "details": { "items": [
                { "resourceType": "script", "transferSize": 1024 },
                { "resourceType": "Script", "transferSize": 2048 },
                { "resourceType": "CSS", "transferSize": 512 }
            ] } } } }
        }));
        assert_eq!(m.js_size_kb, 3.0);
        assert_eq!(m.css_size_kb, 0.5);
    }

    #[test]
    fn sizes_are_rounded() {
        let m = parse(json!({
            "lighthouseResult": { "audits": {
                "total-byte-weight": { "numericValue": 1234567 },
                "resource-summary": { "details": { "items": [
                    { "resourceType": "script", "transferSize": 1000 }
                ] } }
            } }
        }));
        assert_eq!(m.total_weight_mb, 1.1774);
        assert_eq!(m.js_size_kb, 0.98);
    }

    #[test]
    fn resource_tags_are_case_insensitive() {
        assert_eq!(ResourceKind::from_tag("SCRIPT"), ResourceKind::Script);
        assert_eq!(ResourceKind::from_tag("css"), ResourceKind::Stylesheet);
        assert_eq!(ResourceKind::from_tag("Image"), ResourceKind::Image);
        assert_eq!(ResourceKind::from_tag("document"), ResourceKind::Other);
    }

    #[test]
    fn error_body_is_surfaced() {
        let r: PageSpeedResponse =
            serde_json::from_value(json!({ "error": { "code": 400, "message": "Bad url" } }))
                .unwrap();
        assert_eq!(r.error_message().as_deref(), Some("Bad url"));
    }
}
