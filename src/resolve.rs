//! Chart type and scaling ceiling resolution.

use crate::error::{MinichartsError, Result};
use crate::field::Field;
use crate::models::{ChartType, MaxValues, SeriesMatrix};

/// Turn `auto` into a concrete type: one variable is drawn as a single circle
/// (`polar-area`), several as bars. Explicit types pass through.
pub fn resolve_chart_type(requested: ChartType, ncols: usize) -> ChartType {
    match requested {
        ChartType::Auto if ncols <= 1 => ChartType::PolarArea,
        ChartType::Auto => ChartType::Bar,
        explicit => explicit,
    }
}

/// Largest absolute value of each column. Non-finite cells are ignored.
pub fn observed_max_abs(matrix: &SeriesMatrix) -> Vec<f64> {
    let mut out = vec![0.0_f64; matrix.ncols()];
    for row in matrix.rows() {
        for (max, v) in out.iter_mut().zip(row) {
            if v.is_finite() {
                *max = max.max(v.abs());
            }
        }
    }
    out
}

/// Expand a caller ceiling to exactly `ncols` entries.
fn broadcast(explicit: &MaxValues, ncols: usize) -> Result<Vec<f64>> {
    match explicit {
        MaxValues::Shared(m) => Ok(vec![*m; ncols]),
        MaxValues::PerVariable(v) if v.len() == 1 => Ok(vec![v[0]; ncols]),
        MaxValues::PerVariable(v) if v.len() == ncols => Ok(v.clone()),
        MaxValues::PerVariable(v) => Err(MinichartsError::validation(format!(
            "maxValues has {} entries, expected 1 or {ncols}",
            v.len()
        ))),
    }
}

/// Per-variable ceiling for an add call: the caller's value broadcast to every
/// variable, or the observed maximum of each column.
pub fn resolve_max_values(explicit: Option<&MaxValues>, matrix: &SeriesMatrix) -> Result<Vec<f64>> {
    match explicit {
        Some(m) => broadcast(m, matrix.ncols()),
        None => Ok(observed_max_abs(matrix)),
    }
}

/// Ceiling for an update call.
///
/// With new chartdata the ceiling follows the new series: the caller's value is
/// broadcast to its variables, or the observed maxima are sent when it was omitted
/// or cleared.
/// Without new chartdata the variable count is unknown here, so a shared value is
/// sent as a single entry and a per-variable vector is forwarded as given.
pub fn resolve_update_max_values(
    requested: Field<MaxValues>,
    matrix: Option<&SeriesMatrix>,
) -> Result<Field<Vec<f64>>> {
    match (requested, matrix) {
        (Field::Unset | Field::Clear, Some(m)) => Ok(Field::Value(observed_max_abs(m))),
        (requested, Some(m)) => requested.try_map(|v| broadcast(&v, m.ncols())),
        (requested, None) => requested.try_map(|v| {
            Ok(match v {
                MaxValues::Shared(v) => vec![v],
                MaxValues::PerVariable(v) => v,
            })
        }),
    }
}
