//! Command payloads for the rendering client.
//!
//! An add payload is fully populated. An update payload only carries what the caller
//! supplied: unset fields are omitted from the JSON, cleared fields are `null`.

use crate::config::Defaults;
use crate::error::{MinichartsError, Result};
use crate::field::Field;
use crate::legend::{LEGEND_CONTROL_ID, LegendControl, compute_legend, shows_legend};
use crate::models::LegendPosition;
use crate::options::{
    AddRequest, ChartOptions, PopupArgs, PopupSpec, UpdateRequest, check_palette,
    resolve_add_options, resolve_popup, resolve_update_options,
};
use crate::resolve::{resolve_max_values, resolve_update_max_values};
use crate::timeseries::{TimeSeries, reshape};
use serde::{Deserialize, Serialize};

/// Data and options for one add/update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub options: ChartOptions,
    /// `chartdata[t][a]`: values of anchor `a` at time step `t`.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub chartdata: Field<Vec<Vec<Vec<f64>>>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub max_values: Field<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub color_palette: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub time_labels: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub initial_time_index: Field<usize>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub popup: Field<PopupSpec>,
    /// Only set by updates that carry new chartdata. The renderer redraws its legend
    /// with these labels and the charts' palette, or removes it on `null`.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub legend_labels: Field<Vec<String>>,
    /// Moves the redrawn legend. Unset keeps it where it is.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub legend_position: Field<LegendPosition>,
    /// Callback source, never inspected.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub on_change: Field<String>,
}

/// One instruction for the rendering client or its host map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "args", rename_all = "camelCase")]
pub enum Command {
    AddMinicharts(Box<Payload>),
    UpdateMinicharts(Box<Payload>),
    RemoveMinicharts {
        #[serde(rename = "layerId")]
        layer_id: Vec<String>,
    },
    ClearMinicharts,
    /// Goes through the map's control interface.
    AddLegend(LegendControl),
    /// Goes through the map's control interface.
    RemoveControl {
        #[serde(rename = "layerId")]
        layer_id: String,
    },
}

impl Command {
    /// Method name as seen by the rendering client.
    pub fn method(&self) -> &'static str {
        match self {
            Command::AddMinicharts(_) => "addMinicharts",
            Command::UpdateMinicharts(_) => "updateMinicharts",
            Command::RemoveMinicharts { .. } => "removeMinicharts",
            Command::ClearMinicharts => "clearMinicharts",
            Command::AddLegend(_) => "addLegend",
            Command::RemoveControl { .. } => "removeControl",
        }
    }

    /// The payload of an add/update command.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Command::AddMinicharts(p) | Command::UpdateMinicharts(p) => Some(p.as_ref()),
            _ => None,
        }
    }
}

fn check_anchor_count(series: &TimeSeries, ids: &[String]) -> Result<()> {
    if series.anchors() != ids.len() {
        return Err(MinichartsError::data_shape(format!(
            "chartdata describes {} charts per time step but {} layer ids are given",
            series.anchors(),
            ids.len()
        )));
    }
    Ok(())
}

/// Build the commands for an add call: the add payload, plus a legend control
/// when several variables are shown with the legend enabled.
pub fn build_add(req: &AddRequest, defaults: &Defaults) -> Result<Vec<Command>> {
    let mut options = resolve_add_options(req, defaults)?;
    let palette = req
        .color_palette
        .clone()
        .unwrap_or_else(|| defaults.color_palette.clone());
    check_palette(&palette)?;
    let max_values = resolve_max_values(req.max_values.as_ref(), &req.chartdata)?;

    let series = reshape(
        &req.chartdata,
        req.time.as_deref(),
        req.time_format.as_deref(),
        req.initial_time.as_ref(),
    )?;
    check_anchor_count(&series, &options.layer_id)?;
    options.time = Field::Value(series.initial_index);

    let columns = req.chartdata.column_names();
    let popup = resolve_popup(&req.popup, defaults, Some(&columns), series.anchors())?;
    let legend = compute_legend(&columns, &palette, req.legend.unwrap_or(defaults.legend));

    log::debug!(
        "add {} minichart(s), {} variable(s), {} time step(s)",
        series.anchors(),
        columns.len(),
        series.steps()
    );

    let payload = Payload {
        options,
        chartdata: Field::Value(series.slices),
        max_values: Field::Value(max_values),
        color_palette: Field::Value(palette),
        time_labels: Field::Value(series.labels),
        initial_time_index: Field::Value(series.initial_index),
        popup: Field::Value(popup),
        legend_labels: Field::Unset,
        legend_position: Field::Unset,
        on_change: Field::from(req.on_change.clone()),
    };

    let mut commands = vec![Command::AddMinicharts(Box::new(payload))];
    if let Some(entries) = legend {
        let position = req.legend_position.unwrap_or(defaults.legend_position);
        commands.push(Command::AddLegend(LegendControl::new(&entries, position)));
    }
    Ok(commands)
}

/// Build the commands for an update call.
///
/// Without new chartdata the legend, time labels and popup are left alone. New
/// chartdata brings its own scaling ceilings, popup labels and legend labels; the
/// renderer recolors the legend from the palette the charts already use. When the
/// new data needs no legend the control is removed as well.
pub fn build_update(req: &UpdateRequest, defaults: &Defaults) -> Result<Vec<Command>> {
    let mut options = resolve_update_options(req)?;
    if let Field::Value(palette) = &req.color_palette {
        check_palette(palette)?;
    }

    let mut chartdata = Field::Unset;
    let mut time_labels = Field::Unset;
    let mut initial_time_index = Field::Unset;
    let mut legend_labels = Field::Unset;
    let mut legend_position = Field::Unset;
    let mut remove_legend = None;
    let mut columns = None;

    match &req.chartdata {
        Some(matrix) => {
            let series = reshape(
                matrix,
                req.time.as_deref(),
                req.time_format.as_deref(),
                req.initial_time.as_ref(),
            )?;
            check_anchor_count(&series, &req.layer_ids)?;
            options.time = Field::Value(series.initial_index);

            let names = matrix.column_names();
            if shows_legend(names.len(), req.legend) {
                legend_labels = Field::Value(names.clone());
                legend_position = Field::supplied(req.legend_position);
            } else {
                log::debug!("removing legend control: new chartdata does not need one");
                legend_labels = Field::Clear;
                remove_legend = Some(Command::RemoveControl {
                    layer_id: LEGEND_CONTROL_ID.to_string(),
                });
            }

            initial_time_index = Field::Value(series.initial_index);
            time_labels = Field::Value(series.labels);
            chartdata = Field::Value(series.slices);
            columns = Some(names);
        }
        None => {
            if req.time.is_some() || req.initial_time.is_some() {
                log::warn!("time settings ignored: update carries no chartdata");
            }
        }
    }

    let max_values = resolve_update_max_values(req.max_values.clone(), req.chartdata.as_ref())?;

    // New columns invalidate the popup labels shown so far.
    let popup_args = match (&req.popup, &columns) {
        (Some(args), _) => Some(args.clone()),
        (None, Some(_)) => Some(PopupArgs::default()),
        (None, None) => None,
    };
    let popup = match popup_args {
        Some(args) => Field::Value(resolve_popup(
            &args,
            defaults,
            columns.as_deref(),
            req.layer_ids.len(),
        )?),
        None => Field::Unset,
    };

    let payload = Payload {
        options,
        chartdata,
        max_values,
        color_palette: req.color_palette.clone(),
        time_labels,
        initial_time_index,
        popup,
        legend_labels,
        legend_position,
        on_change: req.on_change.clone(),
    };

    let mut commands = vec![Command::UpdateMinicharts(Box::new(payload))];
    commands.extend(remove_legend);
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, SeriesMatrix};

    #[test]
    fn add_emits_legend_for_named_multi_variable_data() {
        let data = SeriesMatrix::new(vec![vec![1.0, 2.0]])
            .unwrap()
            .with_columns(["a", "b"])
            .unwrap();
        let req = AddRequest::new(vec![Location::new(1.0, 2.0)], data);
        let cmds = build_add(&req, &Defaults::default()).unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].method(), "addMinicharts");
        match &cmds[1] {
            Command::AddLegend(ctl) => assert_eq!(ctl.labels, vec!["a", "b"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn update_without_data_touches_nothing_else() {
        let mut req = UpdateRequest::new(["c1"]);
        req.width = Field::Value(10.0);
        let cmds = build_update(&req, &Defaults::default()).unwrap();
        assert_eq!(cmds.len(), 1);
        let json = serde_json::to_value(&cmds[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "method": "updateMinicharts",
                "args": { "options": { "layerId": ["c1"], "width": 10.0 } }
            })
        );
    }

    #[test]
    fn update_with_single_variable_data_removes_legend() {
        let req = UpdateRequest::new(["c1"])
            .with_chartdata(SeriesMatrix::new(vec![vec![4.0]]).unwrap());
        let cmds = build_update(&req, &Defaults::default()).unwrap();
        assert_eq!(
            cmds[1],
            Command::RemoveControl {
                layer_id: LEGEND_CONTROL_ID.into()
            }
        );
        let payload = cmds[0].payload().unwrap();
        assert_eq!(payload.legend_labels, Field::Clear);
        assert!(payload.legend_position.is_unset());
    }

    #[test]
    fn update_with_data_refreshes_ceilings_and_popup_labels() {
        let data = SeriesMatrix::new(vec![vec![10.0, -20.0, 30.0]])
            .unwrap()
            .with_columns(["x", "y", "z"])
            .unwrap();
        let req = UpdateRequest::new(["c1"]).with_chartdata(data);
        let cmds = build_update(&req, &Defaults::default()).unwrap();
        let payload = cmds[0].payload().unwrap();
        assert_eq!(payload.max_values, Field::Value(vec![10.0, 20.0, 30.0]));
        let popup = payload.popup.as_value().unwrap();
        assert_eq!(popup.labels, Some(vec!["x".into(), "y".into(), "z".into()]));
        assert_eq!(
            payload.legend_labels,
            Field::Value(vec!["x".into(), "y".into(), "z".into()])
        );
    }
}
