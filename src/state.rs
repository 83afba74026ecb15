//! In-memory model of the rendering client.
//!
//! `MapState` applies commands the way the browser side does: add replaces,
//! update merges (unset = keep, null = clear), remove/clear drop charts. Updates
//! carrying legend labels redraw the legend in the charts' own colors. It is
//! what the crate tests its own commands against, and a convenient stand-in for
//! callers that want to check a command stream without a browser.

use crate::error::{MinichartsError, Result};
use crate::field::Field;
use crate::legend::{LegendControl, compute_legend};
use crate::models::{ChartType, LabelMode, Location};
use crate::options::PopupSpec;
use crate::payload::{Command, Payload};
use std::collections::BTreeMap;

/// What the renderer currently shows for one chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartState {
    pub location: Option<Location>,
    pub chart_type: Option<ChartType>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub opacity: Option<f64>,
    pub labels: Option<LabelMode>,
    pub label_min_size: Option<f64>,
    pub label_max_size: Option<f64>,
    pub label_style: Option<String>,
    pub transition_time: Option<u32>,
    pub fill_color: Option<String>,
    /// Values of this chart, one entry per time step.
    pub data: Option<Vec<Vec<f64>>>,
    pub max_values: Option<Vec<f64>>,
    pub color_palette: Option<Vec<String>>,
    pub time_labels: Option<Vec<String>>,
    pub current_time: Option<usize>,
    pub popup: Option<PopupSpec>,
    pub on_change: Option<String>,
}

/// Element `i` of a per-anchor field.
fn nth<T: Clone>(field: &Field<Vec<T>>, i: usize) -> Field<T> {
    match field {
        Field::Unset => Field::Unset,
        Field::Clear => Field::Clear,
        Field::Value(v) => v.get(i).cloned().into(),
    }
}

impl ChartState {
    fn merge(&mut self, payload: &Payload, i: usize) {
        let o = &payload.options;
        if let (Some(lng), Some(lat)) = (nth(&o.lng, i).into_value(), nth(&o.lat, i).into_value()) {
            self.location = Some(Location::new(lng, lat));
        }
        o.chart_type.clone().merge_into(&mut self.chart_type);
        o.width.clone().merge_into(&mut self.width);
        o.height.clone().merge_into(&mut self.height);
        o.opacity.clone().merge_into(&mut self.opacity);
        o.labels.clone().merge_into(&mut self.labels);
        o.label_min_size.clone().merge_into(&mut self.label_min_size);
        o.label_max_size.clone().merge_into(&mut self.label_max_size);
        o.label_style.clone().merge_into(&mut self.label_style);
        o.transition_time.clone().merge_into(&mut self.transition_time);
        o.fill_color.clone().merge_into(&mut self.fill_color);
        o.time.clone().merge_into(&mut self.current_time);

        payload
            .chartdata
            .clone()
            .map(|steps| steps.iter().filter_map(|slice| slice.get(i).cloned()).collect::<Vec<_>>())
            .merge_into(&mut self.data);
        payload.max_values.clone().merge_into(&mut self.max_values);
        payload.color_palette.clone().merge_into(&mut self.color_palette);
        payload.time_labels.clone().merge_into(&mut self.time_labels);
        payload.popup.clone().merge_into(&mut self.popup);
        payload.on_change.clone().merge_into(&mut self.on_change);
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapState {
    charts: BTreeMap<String, ChartState>,
    legend: Option<LegendControl>,
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(&self, layer_id: &str) -> Option<&ChartState> {
        self.charts.get(layer_id)
    }

    pub fn layer_ids(&self) -> impl Iterator<Item = &str> {
        self.charts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn legend(&self) -> Option<&LegendControl> {
        self.legend.as_ref()
    }

    fn ensure_known(&self, ids: &[String]) -> Result<()> {
        match ids.iter().find(|id| !self.charts.contains_key(id.as_str())) {
            Some(missing) => Err(MinichartsError::NotFound(missing.clone())),
            None => Ok(()),
        }
    }

    /// Follow `legendLabels` of an update: redraw with the palette of the updated
    /// charts at the current (or requested) position, or drop the legend.
    fn redraw_legend(&mut self, payload: &Payload) {
        let labels = match &payload.legend_labels {
            Field::Unset => return,
            Field::Clear => {
                self.legend = None;
                return;
            }
            Field::Value(labels) => labels,
        };
        let palette = payload
            .options
            .layer_id
            .first()
            .and_then(|id| self.charts.get(id))
            .and_then(|chart| chart.color_palette.clone())
            .unwrap_or_default();
        let position = payload
            .legend_position
            .as_value()
            .copied()
            .or_else(|| self.legend.as_ref().map(|l| l.position))
            .unwrap_or_default();
        self.legend =
            compute_legend(labels, &palette, true).map(|entries| LegendControl::new(&entries, position));
    }

    /// Apply one command. Update and remove fail with `NotFound`, leaving the
    /// state untouched, if any id is unknown.
    pub fn apply(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::AddMinicharts(payload) => {
                for (i, id) in payload.options.layer_id.iter().enumerate() {
                    let mut chart = ChartState::default();
                    chart.merge(payload, i);
                    self.charts.insert(id.clone(), chart);
                }
            }
            Command::UpdateMinicharts(payload) => {
                self.ensure_known(&payload.options.layer_id)?;
                for (i, id) in payload.options.layer_id.iter().enumerate() {
                    if let Some(chart) = self.charts.get_mut(id) {
                        chart.merge(payload, i);
                    }
                }
                self.redraw_legend(payload);
            }
            Command::RemoveMinicharts { layer_id } => {
                self.ensure_known(layer_id)?;
                for id in layer_id {
                    self.charts.remove(id);
                }
            }
            Command::ClearMinicharts => self.charts.clear(),
            Command::AddLegend(control) => self.legend = Some(control.clone()),
            Command::RemoveControl { layer_id } => {
                if self.legend.as_ref().is_some_and(|l| &l.layer_id == layer_id) {
                    self.legend = None;
                }
            }
        }
        Ok(())
    }

    /// Apply a batch in order, stopping at the first failure.
    pub fn apply_all<'a>(&mut self, commands: impl IntoIterator<Item = &'a Command>) -> Result<()> {
        for command in commands {
            self.apply(command)?;
        }
        Ok(())
    }
}
