//! Long-format to per-time-step reshaping.
//!
//! Row convention: within each time key, rows appear in anchor order. The usual
//! layout is time-major (every anchor for step 1, then every anchor for step 2...),
//! but any interleaving works as long as each key lists its anchors in the same
//! order. Rows are assigned to slices by an explicit key index, never by position.

use crate::error::{MinichartsError, Result};
use crate::models::{SeriesMatrix, TimeKey};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{Display, Write};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Chartdata split by time step.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    /// Distinct keys in first-seen order.
    pub keys: Vec<TimeKey>,
    /// One display label per key.
    pub labels: Vec<String>,
    /// `slices[t][a]` = values of anchor `a` at step `t`.
    pub slices: Vec<Vec<Vec<f64>>>,
    /// Step shown first.
    pub initial_index: usize,
}

impl TimeSeries {
    pub fn steps(&self) -> usize {
        self.keys.len()
    }

    pub fn anchors(&self) -> usize {
        self.slices.first().map_or(0, Vec::len)
    }
}

/// Reshape `matrix` into one slice per distinct time key.
///
/// `time` must hold one key per row; `None` means every row belongs to a single
/// implicit step labelled `"1"`. Each distinct key must occur equally often.
///
/// An `initial_time` that matches no key falls back to the first step.
pub fn reshape(
    matrix: &SeriesMatrix,
    time: Option<&[TimeKey]>,
    time_format: Option<&str>,
    initial_time: Option<&TimeKey>,
) -> Result<TimeSeries> {
    let nrows = matrix.nrows();
    let time: Cow<'_, [TimeKey]> = match time {
        Some(t) => Cow::Borrowed(t),
        None => Cow::Owned(vec![TimeKey::Number(1.0); nrows]),
    };
    if time.len() != nrows {
        return Err(MinichartsError::data_shape(format!(
            "time has {} entries but chartdata has {nrows} rows",
            time.len()
        )));
    }

    // Distinct keys and, for every row, the index of its key.
    let mut keys: Vec<TimeKey> = Vec::new();
    let mut position: HashMap<&TimeKey, usize> = HashMap::new();
    let mut row_key = Vec::with_capacity(nrows);
    for key in time.iter() {
        let idx = *position.entry(key).or_insert_with(|| {
            keys.push(key.clone());
            keys.len() - 1
        });
        row_key.push(idx);
    }

    let steps = keys.len();
    if steps == 0 {
        return Err(MinichartsError::data_shape("chartdata has no rows"));
    }
    if nrows % steps != 0 {
        return Err(MinichartsError::data_shape(format!(
            "{nrows} rows cannot be split evenly across {steps} time steps"
        )));
    }
    let anchors = nrows / steps;

    let mut counts = vec![0usize; steps];
    for &k in &row_key {
        counts[k] += 1;
    }
    if let Some((k, &count)) = counts.iter().enumerate().find(|&(_, &c)| c != anchors) {
        return Err(MinichartsError::data_shape(format!(
            "time key {:?} occurs {count} times, expected {anchors}",
            keys[k]
        )));
    }

    let mut slices: Vec<Vec<Vec<f64>>> = vec![Vec::with_capacity(anchors); steps];
    for (row, &k) in matrix.rows().iter().zip(&row_key) {
        slices[k].push(row.clone());
    }

    let labels = keys
        .iter()
        .map(|k| time_label(k, time_format))
        .collect::<Result<Vec<_>>>()?;

    let initial_index = match initial_time {
        None => 0,
        Some(wanted) => match position.get(wanted) {
            Some(&idx) => idx,
            None => {
                log::warn!("initial time {wanted:?} not found among time keys, showing first step");
                0
            }
        },
    };

    log::debug!("reshaped {nrows} rows into {steps} steps x {anchors} anchors");
    Ok(TimeSeries {
        keys,
        labels,
        slices,
        initial_index,
    })
}

/// Display label for one key. The pattern only applies to date/datetime keys.
pub fn time_label(key: &TimeKey, pattern: Option<&str>) -> Result<String> {
    match key {
        TimeKey::Number(n) => Ok(n.to_string()),
        TimeKey::Text(s) => Ok(s.clone()),
        TimeKey::Date(d) => render(d.format(pattern.unwrap_or(DEFAULT_DATE_FORMAT)), pattern),
        TimeKey::DateTime(dt) => {
            render(dt.format(pattern.unwrap_or(DEFAULT_DATETIME_FORMAT)), pattern)
        }
    }
}

// chrono reports a bad strftime item as a formatting error instead of a parse error.
fn render(formatted: impl Display, pattern: Option<&str>) -> Result<String> {
    let mut out = String::new();
    write!(out, "{formatted}").map_err(|_| {
        MinichartsError::validation(format!("invalid time format {:?}", pattern.unwrap_or_default()))
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn keys(v: &[i32]) -> Vec<TimeKey> {
        v.iter().map(|&x| TimeKey::from(x)).collect()
    }

    #[test]
    fn implicit_single_step() {
        let m = SeriesMatrix::new(vec![vec![1.0], vec![2.0]]).unwrap();
        let ts = reshape(&m, None, None, None).unwrap();
        assert_eq!(ts.steps(), 1);
        assert_eq!(ts.anchors(), 2);
        assert_eq!(ts.labels, vec!["1"]);
        assert_eq!(ts.initial_index, 0);
    }

    #[test]
    fn interleaved_rows_keep_anchor_order() {
        // anchor-major: a@2000, a@2001, b@2000, b@2001
        let m = SeriesMatrix::new(vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
        let t = keys(&[2000, 2001, 2000, 2001]);
        let ts = reshape(&m, Some(&t), None, None).unwrap();
        assert_eq!(ts.slices[0], vec![vec![1.0], vec![3.0]]);
        assert_eq!(ts.slices[1], vec![vec![2.0], vec![4.0]]);
        assert_eq!(ts.labels, vec!["2000", "2001"]);
    }

    #[test]
    fn date_labels_use_pattern() {
        let d1 = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        let m = SeriesMatrix::new(vec![vec![1.0], vec![2.0]]).unwrap();
        let t = vec![TimeKey::from(d1), TimeKey::from(d2)];
        let ts = reshape(&m, Some(&t), Some("%b %Y"), None).unwrap();
        assert_eq!(ts.labels, vec!["Jan 2020", "Feb 2020"]);
        let ts = reshape(&m, Some(&t), None, Some(&TimeKey::from(d2))).unwrap();
        assert_eq!(ts.labels, vec!["2020-01-31", "2020-02-29"]);
        assert_eq!(ts.initial_index, 1);
    }

    #[test]
    fn bad_pattern_is_a_validation_error() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let m = SeriesMatrix::new(vec![vec![1.0]]).unwrap();
        let err = reshape(&m, Some(&[TimeKey::from(d)]), Some("%Q"), None).unwrap_err();
        assert!(matches!(err, MinichartsError::Validation(_)));
    }
}
