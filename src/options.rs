//! Caller requests and option resolution.
//!
//! - **Add** requests carry plain `Option`s: anything missing takes the value from
//!   [`Defaults`].
//! - **Update** requests carry [`Field`]s: anything `Unset` stays `Unset` in the
//!   resolved options so the renderer leaves that piece of state alone.

use crate::config::Defaults;
use crate::error::{MinichartsError, Result};
use crate::field::Field;
use crate::models::{ChartType, LabelMode, LegendPosition, Location, MaxValues, SeriesMatrix, TimeKey};
use crate::resolve::resolve_chart_type;
use serde::{Deserialize, Serialize};

/// Popup preferences as given by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopupArgs {
    pub show_title: Option<bool>,
    pub show_values: Option<bool>,
    /// Variable labels; default to the chartdata column names.
    pub labels: Option<Vec<String>>,
    /// Supplementary values, one row per anchor.
    pub sup_values: Option<Vec<Vec<String>>>,
    pub sup_labels: Vec<String>,
    /// Custom HTML, one entry per anchor. Replaces the generated popup.
    pub html: Option<Vec<String>>,
    pub no_popup: bool,
    pub digits: Option<u32>,
}

/// Popup settings shipped to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub show_title: bool,
    pub show_values: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sup_values: Option<Vec<Vec<String>>>,
    #[serde(default)]
    pub sup_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<Vec<String>>,
    pub no_popup: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digits: Option<u32>,
}

/// Everything needed to create one or more charts.
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub locations: Vec<Location>,
    pub chartdata: SeriesMatrix,
    /// One key per chartdata row; `None` means a single implicit time step.
    pub time: Option<Vec<TimeKey>>,
    pub max_values: Option<MaxValues>,
    pub chart_type: Option<ChartType>,
    pub fill_color: Option<String>,
    pub color_palette: Option<Vec<String>>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub opacity: Option<f64>,
    pub show_labels: bool,
    pub label_text: Option<Vec<String>>,
    pub label_min_size: Option<f64>,
    pub label_max_size: Option<f64>,
    pub label_style: Option<String>,
    pub transition_time: Option<u32>,
    pub popup: PopupArgs,
    /// Defaults to ids derived from the coordinates.
    pub layer_ids: Option<Vec<String>>,
    pub legend: Option<bool>,
    pub legend_position: Option<LegendPosition>,
    /// strftime pattern for date/datetime time keys.
    pub time_format: Option<String>,
    pub initial_time: Option<TimeKey>,
    /// Opaque callback source, forwarded untouched.
    pub on_change: Option<String>,
}

impl AddRequest {
    pub fn new(locations: Vec<Location>, chartdata: SeriesMatrix) -> Self {
        Self {
            locations,
            chartdata,
            time: None,
            max_values: None,
            chart_type: None,
            fill_color: None,
            color_palette: None,
            width: None,
            height: None,
            opacity: None,
            show_labels: false,
            label_text: None,
            label_min_size: None,
            label_max_size: None,
            label_style: None,
            transition_time: None,
            popup: PopupArgs::default(),
            layer_ids: None,
            legend: None,
            legend_position: None,
            time_format: None,
            initial_time: None,
            on_change: None,
        }
    }

    pub fn with_layer_ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.layer_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_time(mut self, time: Vec<TimeKey>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_type(mut self, chart_type: ChartType) -> Self {
        self.chart_type = Some(chart_type);
        self
    }

    pub fn with_max_values(mut self, max_values: MaxValues) -> Self {
        self.max_values = Some(max_values);
        self
    }
}

/// Partial modification of existing charts.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub layer_ids: Vec<String>,
    /// New data; `None` leaves data, time labels and legend untouched.
    pub chartdata: Option<SeriesMatrix>,
    pub time: Option<Vec<TimeKey>>,
    pub max_values: Field<MaxValues>,
    pub chart_type: Field<ChartType>,
    pub fill_color: Field<String>,
    pub color_palette: Field<Vec<String>>,
    pub width: Field<f64>,
    pub height: Field<f64>,
    pub opacity: Field<f64>,
    /// `None` leaves label display as it is.
    pub show_labels: Option<bool>,
    pub label_text: Option<Vec<String>>,
    pub label_min_size: Field<f64>,
    pub label_max_size: Field<f64>,
    pub label_style: Field<String>,
    pub transition_time: Field<u32>,
    pub popup: Option<PopupArgs>,
    pub legend: bool,
    pub legend_position: Option<LegendPosition>,
    pub time_format: Option<String>,
    pub initial_time: Option<TimeKey>,
    pub on_change: Field<String>,
}

impl UpdateRequest {
    pub fn new<S: Into<String>>(layer_ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            layer_ids: layer_ids.into_iter().map(Into::into).collect(),
            chartdata: None,
            time: None,
            max_values: Field::Unset,
            chart_type: Field::Unset,
            fill_color: Field::Unset,
            color_palette: Field::Unset,
            width: Field::Unset,
            height: Field::Unset,
            opacity: Field::Unset,
            show_labels: None,
            label_text: None,
            label_min_size: Field::Unset,
            label_max_size: Field::Unset,
            label_style: Field::Unset,
            transition_time: Field::Unset,
            popup: None,
            legend: true,
            legend_position: None,
            time_format: None,
            initial_time: None,
            on_change: Field::Unset,
        }
    }

    pub fn with_chartdata(mut self, chartdata: SeriesMatrix) -> Self {
        self.chartdata = Some(chartdata);
        self
    }

    pub fn with_max_values(mut self, max_values: MaxValues) -> Self {
        self.max_values = Field::Value(max_values);
        self
    }
}

/// Resolved per-call chart options. `layer_id` is always populated; every other
/// field may be `Unset` on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub layer_id: Vec<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub lng: Field<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub lat: Field<Vec<f64>>,
    /// Index of the time step shown first.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub time: Field<usize>,
    #[serde(rename = "type", default, skip_serializing_if = "Field::is_unset")]
    pub chart_type: Field<ChartType>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub width: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub height: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub opacity: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub labels: Field<LabelMode>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub label_min_size: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub label_max_size: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub label_style: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub transition_time: Field<u32>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub fill_color: Field<String>,
}

/// Collapse the label flag and optional text into one label mode.
///
/// `show` is `None` only on update, where it means "no instruction".
pub fn resolve_labels(show: Option<bool>, text: Option<&[String]>) -> Field<LabelMode> {
    match (show, text) {
        (None, _) => Field::Unset,
        (Some(false), _) => Field::Value(LabelMode::None),
        (Some(true), Some(text)) => Field::Value(LabelMode::Text(text.to_vec())),
        (Some(true), None) => Field::Value(LabelMode::Auto),
    }
}

fn check_label_text(text: Option<&[String]>, anchors: usize) -> Result<()> {
    match text {
        Some(t) if t.len() != anchors => Err(MinichartsError::validation(format!(
            "{} label texts given for {anchors} charts",
            t.len()
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn check_palette(palette: &[String]) -> Result<()> {
    if palette.is_empty() {
        return Err(MinichartsError::validation("color palette is empty"));
    }
    Ok(())
}

/// Layer ids for an add call: the caller's, or ids derived from coordinates.
pub fn resolve_layer_ids(explicit: Option<&[String]>, locations: &[Location]) -> Result<Vec<String>> {
    match explicit {
        Some(ids) if ids.len() != locations.len() => Err(MinichartsError::validation(format!(
            "{} layer ids given for {} locations",
            ids.len(),
            locations.len()
        ))),
        Some(ids) => Ok(ids.to_vec()),
        None => Ok(locations.iter().map(Location::default_layer_id).collect()),
    }
}

/// Fully populated options for an add call.
///
/// `time` is left `Unset` here; the payload builder fills it once the time series
/// has been reshaped.
pub fn resolve_add_options(req: &AddRequest, defaults: &Defaults) -> Result<ChartOptions> {
    let layer_id = resolve_layer_ids(req.layer_ids.as_deref(), &req.locations)?;
    if req.show_labels {
        check_label_text(req.label_text.as_deref(), layer_id.len())?;
    }
    let requested = req.chart_type.unwrap_or(defaults.chart_type);

    Ok(ChartOptions {
        lng: Field::Value(req.locations.iter().map(|l| l.lng).collect()),
        lat: Field::Value(req.locations.iter().map(|l| l.lat).collect()),
        layer_id,
        time: Field::Unset,
        chart_type: Field::Value(resolve_chart_type(requested, req.chartdata.ncols())),
        width: Field::Value(req.width.unwrap_or(defaults.width)),
        height: Field::Value(req.height.unwrap_or(defaults.height)),
        opacity: Field::Value(req.opacity.unwrap_or(defaults.opacity)),
        labels: resolve_labels(Some(req.show_labels), req.label_text.as_deref()),
        label_min_size: Field::Value(req.label_min_size.unwrap_or(defaults.label_min_size)),
        label_max_size: Field::Value(req.label_max_size.unwrap_or(defaults.label_max_size)),
        label_style: Field::from(req.label_style.clone().or_else(|| defaults.label_style.clone())),
        transition_time: Field::Value(req.transition_time.unwrap_or(defaults.transition_time)),
        fill_color: Field::Value(
            req.fill_color
                .clone()
                .unwrap_or_else(|| defaults.fill_color.clone()),
        ),
    })
}

/// Options for an update call: only what the caller supplied.
pub fn resolve_update_options(req: &UpdateRequest) -> Result<ChartOptions> {
    if req.layer_ids.is_empty() {
        return Err(MinichartsError::validation("update needs at least one layer id"));
    }
    if req.show_labels == Some(true) {
        check_label_text(req.label_text.as_deref(), req.layer_ids.len())?;
    }

    Ok(ChartOptions {
        layer_id: req.layer_ids.clone(),
        lng: Field::Unset,
        lat: Field::Unset,
        time: Field::Unset,
        chart_type: req.chart_type.clone(),
        width: req.width.clone(),
        height: req.height.clone(),
        opacity: req.opacity.clone(),
        labels: resolve_labels(req.show_labels, req.label_text.as_deref()),
        label_min_size: req.label_min_size.clone(),
        label_max_size: req.label_max_size.clone(),
        label_style: req.label_style.clone(),
        transition_time: req.transition_time.clone(),
        fill_color: req.fill_color.clone(),
    })
}

/// Popup settings; labels default to `columns` when the caller gave none.
pub fn resolve_popup(
    args: &PopupArgs,
    defaults: &Defaults,
    columns: Option<&[String]>,
    anchors: usize,
) -> Result<PopupSpec> {
    if let (Some(labels), Some(columns)) = (&args.labels, columns)
        && labels.len() != columns.len()
    {
        return Err(MinichartsError::validation(format!(
            "{} popup labels given for {} variables",
            labels.len(),
            columns.len()
        )));
    }
    if let Some(sup) = &args.sup_values
        && sup.len() != anchors
    {
        return Err(MinichartsError::data_shape(format!(
            "{} rows of supplementary popup values for {anchors} charts",
            sup.len()
        )));
    }
    if let Some(html) = &args.html
        && html.len() != anchors
    {
        return Err(MinichartsError::data_shape(format!(
            "{} popup html entries for {anchors} charts",
            html.len()
        )));
    }

    Ok(PopupSpec {
        labels: args
            .labels
            .clone()
            .or_else(|| columns.map(<[String]>::to_vec)),
        show_title: args.show_title.unwrap_or(defaults.popup_show_title),
        show_values: args.show_values.unwrap_or(defaults.popup_show_values),
        sup_values: args.sup_values.clone(),
        sup_labels: args.sup_labels.clone(),
        html: args.html.clone(),
        no_popup: args.no_popup,
        digits: args.digits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_chart() -> AddRequest {
        AddRequest::new(
            vec![Location::new(0.0, 0.0)],
            SeriesMatrix::new(vec![vec![1.0, 2.0, 3.0]]).unwrap(),
        )
    }

    #[test]
    fn label_policy_tri_state() {
        let text = vec!["a".to_string()];
        assert_eq!(resolve_labels(None, Some(&text)), Field::Unset);
        assert_eq!(resolve_labels(Some(false), Some(&text)), Field::Value(LabelMode::None));
        assert_eq!(resolve_labels(Some(true), None), Field::Value(LabelMode::Auto));
        assert_eq!(
            resolve_labels(Some(true), Some(&text)),
            Field::Value(LabelMode::Text(text.clone()))
        );
    }

    #[test]
    fn add_options_take_defaults() {
        let opts = resolve_add_options(&one_chart(), &Defaults::default()).unwrap();
        assert_eq!(opts.layer_id, vec!["_minichart (0,0)"]);
        assert_eq!(opts.width, Field::Value(30.0));
        assert_eq!(opts.opacity, Field::Value(1.0));
        assert_eq!(opts.transition_time, Field::Value(750));
        assert_eq!(opts.labels, Field::Value(LabelMode::None));
        assert_eq!(opts.label_style, Field::Clear);
        assert_eq!(opts.chart_type, Field::Value(ChartType::Bar));
    }

    #[test]
    fn add_rejects_mismatched_ids() {
        let req = one_chart().with_layer_ids(["a", "b"]);
        let err = resolve_add_options(&req, &Defaults::default()).unwrap_err();
        assert!(matches!(err, MinichartsError::Validation(_)));
    }

    #[test]
    fn label_text_length_only_matters_when_labels_are_shown() {
        let mut req = one_chart();
        req.label_text = Some(vec!["a".into(), "b".into()]);
        let opts = resolve_add_options(&req, &Defaults::default()).unwrap();
        assert_eq!(opts.labels, Field::Value(LabelMode::None));

        req.show_labels = true;
        let err = resolve_add_options(&req, &Defaults::default()).unwrap_err();
        assert!(matches!(err, MinichartsError::Validation(_)));

        let mut update = UpdateRequest::new(["c1"]);
        update.label_text = Some(vec!["a".into(), "b".into()]);
        assert!(resolve_update_options(&update).is_ok());
        update.show_labels = Some(true);
        assert!(resolve_update_options(&update).is_err());
    }

    #[test]
    fn update_options_only_carry_supplied_fields() {
        let mut req = UpdateRequest::new(["c1"]);
        req.width = Field::Value(50.0);
        let opts = resolve_update_options(&req).unwrap();
        assert_eq!(opts.width, Field::Value(50.0));
        assert!(opts.opacity.is_unset());
        assert!(opts.labels.is_unset());
        assert!(opts.chart_type.is_unset());
    }

    #[test]
    fn popup_labels_default_to_columns() {
        let cols = vec!["x".to_string(), "y".to_string()];
        let spec = resolve_popup(&PopupArgs::default(), &Defaults::default(), Some(&cols), 1).unwrap();
        assert_eq!(spec.labels, Some(cols));
        assert!(spec.show_title && spec.show_values);

        let bad = PopupArgs {
            html: Some(vec!["<b>a</b>".into(), "<b>b</b>".into()]),
            ..PopupArgs::default()
        };
        let err = resolve_popup(&bad, &Defaults::default(), None, 1).unwrap_err();
        assert!(matches!(err, MinichartsError::DataShape(_)));
    }
}
