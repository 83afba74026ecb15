use crate::models::{Location, SeriesMatrix, TimeKey};
use crate::payload::Command;
use anyhow::{Context, Result, anyhow, bail};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Long-format table read from CSV.
///
/// Recognised columns (case-insensitive): `lng`/`lon`/`longitude`,
/// `lat`/`latitude`, `layerId`/`layer_id`/`id`, `time`. Every other column is a
/// numeric variable; empty cells become `NaN`.
#[derive(Debug, Clone)]
pub struct ChartTable {
    /// One per anchor, taken from the rows of the first time step.
    pub locations: Vec<Location>,
    pub layer_ids: Option<Vec<String>>,
    pub time: Option<Vec<TimeKey>>,
    pub chartdata: SeriesMatrix,
}

enum Role {
    Lng,
    Lat,
    LayerId,
    Time,
    Variable,
}

fn role_of(header: &str) -> Role {
    match header.trim().to_ascii_lowercase().as_str() {
        "lng" | "lon" | "longitude" => Role::Lng,
        "lat" | "latitude" => Role::Lat,
        "layerid" | "layer_id" | "id" => Role::LayerId,
        "time" => Role::Time,
        _ => Role::Variable,
    }
}

fn parse_number(raw: &str, line: usize, column: &str) -> Result<f64> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("na") {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .with_context(|| format!("line {line}: {column:?} is not a number: {s:?}"))
}

/// Read a long-format CSV file.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<ChartTable> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = rdr.headers()?.clone();
    let roles: Vec<Role> = headers.iter().map(role_of).collect();
    let variable_names: Vec<String> = headers
        .iter()
        .zip(&roles)
        .filter(|(_, r)| matches!(r, Role::Variable))
        .map(|(h, _)| h.to_string())
        .collect();
    if variable_names.is_empty() {
        bail!("{}: no variable columns", path.display());
    }
    let has_coords = roles.iter().any(|r| matches!(r, Role::Lng))
        && roles.iter().any(|r| matches!(r, Role::Lat));
    let has_ids = roles.iter().any(|r| matches!(r, Role::LayerId));
    let has_time = roles.iter().any(|r| matches!(r, Role::Time));

    let mut rows = Vec::new();
    let mut coords = Vec::new();
    let mut ids = Vec::new();
    let mut time = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let line = i + 2;
        let (mut lng, mut lat) = (f64::NAN, f64::NAN);
        let mut values = Vec::with_capacity(variable_names.len());
        for ((cell, role), name) in record.iter().zip(&roles).zip(headers.iter()) {
            match role {
                Role::Lng => lng = parse_number(cell, line, name)?,
                Role::Lat => lat = parse_number(cell, line, name)?,
                Role::LayerId => ids.push(cell.to_string()),
                Role::Time => time.push(TimeKey::parse(cell)),
                Role::Variable => values.push(parse_number(cell, line, name)?),
            }
        }
        coords.push(Location::new(lng, lat));
        rows.push(values);
    }

    let chartdata = SeriesMatrix::new(rows)?.with_columns(variable_names)?;

    // Anchors are the rows carrying the first time key.
    let first_step: Vec<usize> = match time.first() {
        Some(first) if has_time => (0..time.len()).filter(|&i| &time[i] == first).collect(),
        _ => (0..coords.len()).collect(),
    };
    let locations = if has_coords {
        first_step.iter().map(|&i| coords[i]).collect()
    } else {
        Vec::new()
    };
    let layer_ids = has_ids.then(|| first_step.iter().map(|&i| ids[i].clone()).collect());

    log::debug!(
        "loaded {} rows x {} variables from {}",
        chartdata.nrows(),
        chartdata.ncols(),
        path.display()
    );
    Ok(ChartTable {
        locations,
        layer_ids,
        time: has_time.then_some(time),
        chartdata,
    })
}

impl ChartTable {
    /// Locations, or an error when the file had no coordinate columns.
    pub fn require_locations(&self) -> Result<&[Location]> {
        if self.locations.is_empty() {
            return Err(anyhow!("input has no lng/lat columns"));
        }
        Ok(&self.locations)
    }
}

/// Save a command batch as a pretty JSON array.
pub fn save_json<P: AsRef<Path>>(commands: &[Command], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(commands)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Minicharts;
    use tempfile::tempdir;

    #[test]
    fn read_long_csv_and_write_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        std::fs::write(
            &csvp,
            "lng,lat,layerId,time,a,b\n\
             1,2,p,2000,1,2\n\
             3,4,q,2000,3,4\n\
             1,2,p,2001,5,6\n\
             3,4,q,2001,,8\n",
        )
        .unwrap();
        let table = load_csv(&csvp).unwrap();
        assert_eq!(table.locations, vec![Location::new(1.0, 2.0), Location::new(3.0, 4.0)]);
        assert_eq!(table.layer_ids, Some(vec!["p".to_string(), "q".to_string()]));
        assert_eq!(table.chartdata.column_names(), vec!["a", "b"]);
        assert!(table.chartdata.rows()[3][0].is_nan());

        let cmds = Minicharts::default().clear();
        save_json(&cmds, &jsonp).unwrap();
        assert!(jsonp.exists());
    }
}
