//! Types for the Prometheus HTTP API query response envelope.
//!
//! The JSON layout follows `/api/v1/query`:
//! `{"status":"success","data":{"resultType":"vector","result":[...]},"warnings":[...]}`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

/// Label name that carries the metric name inside a label set.
pub const METRIC_NAME_LABEL: &str = "__name__";

/// Top-level `status` field of every API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Raw response envelope as returned by the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub data: Option<QueryValue>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub infos: Vec<String>,
}

/// A successfully decoded query result with its non-fatal annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub value: QueryValue,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
}

/// The `data` section of a query response, tagged by `resultType`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
pub enum QueryValue {
    Vector(Vec<Sample>),
    Matrix(Vec<SampleStream>),
    Scalar(SamplePair),
    String(StringPair),
}

impl QueryValue {
    pub fn result_type(&self) -> ResultType {
        match self {
            QueryValue::Vector(_) => ResultType::Vector,
            QueryValue::Matrix(_) => ResultType::Matrix,
            QueryValue::Scalar(_) => ResultType::Scalar,
            QueryValue::String(_) => ResultType::String,
        }
    }
}

/// Shape of a query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Vector,
    Matrix,
    Scalar,
    String,
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultType::Vector => "vector",
            ResultType::Matrix => "matrix",
            ResultType::Scalar => "scalar",
            ResultType::String => "string",
        };
        f.write_str(name)
    }
}

/// One element of an instant vector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub value: Option<SamplePair>,
    /// Present instead of `value` for native histogram series.
    #[serde(default)]
    pub histogram: Option<HistogramPair>,
}

impl Sample {
    /// Timestamp and scalar value of this sample. Histogram samples report their count.
    pub fn pair(&self) -> Option<SamplePair> {
        if let Some(pair) = self.value {
            return Some(pair);
        }
        self.histogram.as_ref().map(|h| SamplePair {
            timestamp: h.0,
            value: h.1.count,
        })
    }
}

/// One series of a range vector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleStream {
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub values: Vec<SamplePair>,
}

/// `[<unix seconds>, "<value>"]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePair {
    /// Unix time in seconds, with millisecond precision.
    pub timestamp: f64,
    pub value: f64,
}

impl SamplePair {
    /// Timestamp truncated to whole Unix seconds.
    pub fn unix_seconds(&self) -> i64 {
        self.timestamp.trunc() as i64
    }
}

impl<'de> Deserialize<'de> for SamplePair {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (timestamp, raw): (f64, String) = Deserialize::deserialize(deserializer)?;
        let value = parse_sample_value(&raw).map_err(serde::de::Error::custom)?;
        Ok(SamplePair { timestamp, value })
    }
}

/// `[<unix seconds>, "<string>"]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StringPair(pub f64, pub String);

/// `[<unix seconds>, {"count": "...", "sum": "...", "buckets": [...]}]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistogramPair(pub f64, pub SampleHistogram);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleHistogram {
    #[serde(deserialize_with = "deserialize_sample_value")]
    pub count: f64,
    #[serde(deserialize_with = "deserialize_sample_value")]
    pub sum: f64,
}

fn deserialize_sample_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_sample_value(&raw).map_err(serde::de::Error::custom)
}

/// Parses a sample value string, including the Prometheus spellings of the special floats.
pub fn parse_sample_value(raw: &str) -> Result<f64, std::num::ParseFloatError> {
    match raw {
        "+Inf" | "Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        "NaN" => Ok(f64::NAN),
        other => other.parse(),
    }
}

/// The label set identifying a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Metric(BTreeMap<String, String>);

impl Metric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a label.
    pub fn label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get(METRIC_NAME_LABEL).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metric {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Metric(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Renders `name{a="x", b="y"}`, a bare `name`, or `{}` for an empty set.
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels: Vec<String> = self
            .0
            .iter()
            .filter(|(name, _)| name.as_str() != METRIC_NAME_LABEL)
            .map(|(name, value)| format!("{name}={}", quote(value)))
            .collect();
        let name = self.name().unwrap_or_default();

        if labels.is_empty() {
            return if self.name().is_some() {
                f.write_str(name)
            } else {
                f.write_str("{}")
            };
        }

        labels.sort();
        write!(f, "{name}{{{}}}", labels.join(", "))
    }
}

/// Double-quotes a label value the way Go's `strconv.Quote` does, so label sets
/// print exactly like the Prometheus client libraries print them.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if is_printable(c) => out.push(c),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            c if c < ' ' || c == '\u{7f}' => out.push_str(&format!("\\x{:02x}", c as u32)),
            c if (c as u32) < 0x10000 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push_str(&format!("\\U{:08x}", c as u32)),
        }
    }
    out.push('"');
    out
}

/// Printable in the sense of Go's `unicode.IsPrint`: no control, format,
/// private-use or non-ASCII space characters.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c as u32,
        0x00AD
            | 0x0600..=0x0605
            | 0x061C
            | 0x06DD
            | 0x070F
            | 0x180E
            | 0x200B..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x206F
            | 0xE000..=0xF8FF
            | 0xFEFF
            | 0xFFF9..=0xFFFB
            | 0xFFFE..=0xFFFF
            | 0x110BD
            | 0x1D173..=0x1D17A
            | 0xE0001
            | 0xE0020..=0xE007F
            | 0xF0000..=0x10FFFF
    )
}
