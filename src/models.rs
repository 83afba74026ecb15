use crate::error::{MinichartsError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Geographic anchor of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lng: f64,
    pub lat: f64,
}

impl Location {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Id used when the caller gives none, e.g. `"_minichart (0,0)"`.
    ///
    /// Two anchors at the same coordinates get the same id.
    pub fn default_layer_id(&self) -> String {
        format!("_minichart ({},{})", self.lng, self.lat)
    }
}

/// Chart glyph kinds understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    /// Decided from the number of variables (see `resolve::resolve_chart_type`).
    #[default]
    Auto,
    Bar,
    Pie,
    PolarArea,
    PolarRadius,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Auto => "auto",
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::PolarArea => "polar-area",
            ChartType::PolarRadius => "polar-radius",
        }
    }
}

impl FromStr for ChartType {
    type Err = MinichartsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ChartType::Auto),
            "bar" => Ok(ChartType::Bar),
            "pie" => Ok(ChartType::Pie),
            "polar-area" => Ok(ChartType::PolarArea),
            "polar-radius" => Ok(ChartType::PolarRadius),
            other => Err(MinichartsError::validation(format!(
                "unknown chart type {other:?}, expected one of auto, bar, pie, polar-area, polar-radius"
            ))),
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Corner of the map hosting the legend control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl FromStr for LegendPosition {
    type Err = MinichartsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topleft" => Ok(LegendPosition::TopLeft),
            "topright" => Ok(LegendPosition::TopRight),
            "bottomleft" => Ok(LegendPosition::BottomLeft),
            "bottomright" => Ok(LegendPosition::BottomRight),
            other => Err(MinichartsError::validation(format!(
                "unknown legend position {other:?}"
            ))),
        }
    }
}

/// One value of the time-key vector.
///
/// Plain values (numbers, text) are labelled by their string form; dates and
/// datetimes are labelled with a strftime pattern.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TimeKey {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl TimeKey {
    /// Best-effort parse of a textual cell: number, then date, then datetime,
    /// falling back to plain text.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if let Ok(n) = s.parse::<f64>() {
            return TimeKey::Number(n);
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return TimeKey::Date(d);
        }
        for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
                return TimeKey::DateTime(dt);
            }
        }
        TimeKey::Text(s.to_string())
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, TimeKey::Date(_) | TimeKey::DateTime(_))
    }
}

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Bitwise so that Eq/Hash stay consistent (NaN == NaN, 0.0 != -0.0).
            (TimeKey::Number(a), TimeKey::Number(b)) => a.to_bits() == b.to_bits(),
            (TimeKey::Text(a), TimeKey::Text(b)) => a == b,
            (TimeKey::Date(a), TimeKey::Date(b)) => a == b,
            (TimeKey::DateTime(a), TimeKey::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TimeKey {}

impl Hash for TimeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            TimeKey::Number(n) => n.to_bits().hash(state),
            TimeKey::Text(s) => s.hash(state),
            TimeKey::Date(d) => d.hash(state),
            TimeKey::DateTime(dt) => dt.hash(state),
        }
    }
}

impl From<f64> for TimeKey {
    fn from(v: f64) -> Self {
        TimeKey::Number(v)
    }
}

impl From<i32> for TimeKey {
    fn from(v: i32) -> Self {
        TimeKey::Number(v as f64)
    }
}

impl From<&str> for TimeKey {
    fn from(v: &str) -> Self {
        TimeKey::Text(v.to_string())
    }
}

impl From<NaiveDate> for TimeKey {
    fn from(v: NaiveDate) -> Self {
        TimeKey::Date(v)
    }
}

impl From<NaiveDateTime> for TimeKey {
    fn from(v: NaiveDateTime) -> Self {
        TimeKey::DateTime(v)
    }
}

/// Long-format numeric table: one row per (time step, anchor), one column per
/// variable. Column names, when present, double as legend and popup labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMatrix {
    columns: Option<Vec<String>>,
    rows: Vec<Vec<f64>>,
}

impl SeriesMatrix {
    /// Build from rows; every row must have the same, non-zero, width.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let width = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| MinichartsError::data_shape("chartdata has no rows"))?;
        if width == 0 {
            return Err(MinichartsError::data_shape("chartdata has no columns"));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(MinichartsError::data_shape(format!(
                "row {i} has {} values, expected {width}",
                row.len()
            )));
        }
        Ok(Self {
            columns: None,
            rows,
        })
    }

    /// Build from a flat vector. With a single anchor and no time vector the values
    /// are the variables of that one chart (one row); otherwise each value is one
    /// row of a single-variable table.
    pub fn from_vector(values: Vec<f64>, anchors: usize, has_time: bool) -> Result<Self> {
        if anchors == 1 && !has_time {
            Self::new(vec![values])
        } else {
            Self::new(values.into_iter().map(|v| vec![v]).collect())
        }
    }

    /// Attach variable names; the count must match the column count.
    pub fn with_columns<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != self.ncols() {
            return Err(MinichartsError::validation(format!(
                "{} column names given for {} columns",
                names.len(),
                self.ncols()
            )));
        }
        self.columns = Some(names);
        Ok(self)
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn has_column_names(&self) -> bool {
        self.columns.is_some()
    }

    /// Column names, or `V1..Vk` when the table is unnamed.
    pub fn column_names(&self) -> Vec<String> {
        match &self.columns {
            Some(names) => names.clone(),
            None => (1..=self.ncols()).map(|i| format!("V{i}")).collect(),
        }
    }
}

/// Caller-supplied scaling ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxValues {
    /// One ceiling shared by every variable.
    Shared(f64),
    /// One ceiling per variable.
    PerVariable(Vec<f64>),
}

impl FromStr for MaxValues {
    type Err = MinichartsError;

    /// `"6"` or `"1,2,3"`.
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split([',', ';'])
            .map(str::trim)
            .filter(|x| !x.is_empty())
            .map(|x| {
                x.parse::<f64>()
                    .map_err(|_| MinichartsError::validation(format!("invalid maxValues entry {x:?}")))
            })
            .collect::<Result<Vec<f64>>>()?;
        match values.as_slice() {
            [] => Err(MinichartsError::validation("empty maxValues")),
            [single] => Ok(MaxValues::Shared(*single)),
            _ => Ok(MaxValues::PerVariable(values)),
        }
    }
}

/// How labels are drawn inside the charts.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelMode {
    /// Renderer derives label text from chart values.
    Auto,
    /// No labels.
    None,
    /// Explicit text, one entry per anchor.
    Text(Vec<String>),
}

impl Serialize for LabelMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            LabelMode::Auto => serializer.serialize_str("auto"),
            LabelMode::None => serializer.serialize_str("none"),
            LabelMode::Text(text) => text.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for LabelMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct LabelModeVisitor;

        impl<'de> Visitor<'de> for LabelModeVisitor {
            type Value = LabelMode;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "\"auto\", \"none\" or an array of label strings")
            }

            fn visit_str<E>(self, s: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                match s {
                    "auto" => Ok(LabelMode::Auto),
                    "none" => Ok(LabelMode::None),
                    other => Err(E::custom(format!("unknown label mode {other:?}"))),
                }
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut text = Vec::new();
                while let Some(s) = seq.next_element::<String>()? {
                    text.push(s);
                }
                Ok(LabelMode::Text(text))
            }
        }

        deserializer.deserialize_any(LabelModeVisitor)
    }
}
