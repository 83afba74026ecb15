use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use minicharts::models::LegendPosition;
use minicharts::storage::{self, ChartTable};
use minicharts::{
    AddRequest, ChartType, Command, Defaults, Field, MaxValues, Minicharts, PopupArgs, TimeKey,
    UpdateRequest,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "minicharts",
    version,
    about = "Build command payloads for animated map minicharts"
)]
struct Cli {
    /// JSON file overriding the built-in defaults.
    #[arg(long, global = true)]
    defaults: Option<PathBuf>,
    /// Write the command batch to this file instead of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create charts from a long-format CSV file.
    Add(AddArgs),
    /// Modify existing charts; only the given options are sent.
    Update(UpdateArgs),
    /// Remove charts by id.
    Remove {
        /// Layer ids separated by comma or semicolon.
        #[arg(long)]
        layer_ids: String,
    },
    /// Remove all charts and the legend.
    Clear,
}

/// Options shared by add and update.
#[derive(Args, Debug)]
struct StyleArgs {
    /// auto, bar, pie, polar-area or polar-radius.
    #[arg(long = "type")]
    chart_type: Option<String>,
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
    #[arg(long)]
    opacity: Option<f64>,
    /// Show labels inside the charts (`--show-labels` or `--show-labels=false`).
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    show_labels: Option<bool>,
    /// Explicit label text, one per chart, separated by comma or semicolon.
    #[arg(long)]
    label_text: Option<String>,
    #[arg(long)]
    label_min_size: Option<f64>,
    #[arg(long)]
    label_max_size: Option<f64>,
    /// CSS applied to labels.
    #[arg(long)]
    label_style: Option<String>,
    /// Transition duration in milliseconds.
    #[arg(long)]
    transition_time: Option<u32>,
    /// Color of single-variable charts.
    #[arg(long)]
    fill_color: Option<String>,
    /// Colors of multi-variable charts, separated by comma or semicolon.
    #[arg(long)]
    palette: Option<String>,
    /// One ceiling (`6`) or one per variable (`10,20,5`).
    #[arg(long)]
    max_values: Option<String>,
    /// Do not show a legend.
    #[arg(long, default_value_t = false)]
    no_legend: bool,
    /// topleft, topright, bottomleft or bottomright.
    #[arg(long)]
    legend_position: Option<String>,
    /// strftime pattern for date/datetime time labels.
    #[arg(long)]
    time_format: Option<String>,
    /// Time value shown first.
    #[arg(long)]
    initial_time: Option<String>,
    /// Popup variable labels, separated by comma or semicolon.
    #[arg(long)]
    popup_labels: Option<String>,
    /// Callback source forwarded to the renderer as-is.
    #[arg(long)]
    on_change: Option<String>,
}

#[derive(Args, Debug)]
struct AddArgs {
    /// CSV with lng, lat, optional layerId and time columns, and one column per variable.
    #[arg(short, long)]
    input: PathBuf,
    /// Layer ids (default: layerId column, else derived from coordinates).
    #[arg(long)]
    layer_ids: Option<String>,
    #[command(flatten)]
    style: StyleArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ClearField {
    LabelStyle,
    FillColor,
    Palette,
    MaxValues,
    OnChange,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    /// Layer ids (default: layerId column of --input).
    #[arg(long)]
    layer_ids: Option<String>,
    /// New chartdata.
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Fields to reset on the renderer side.
    #[arg(long, value_enum, value_delimiter = ',')]
    clear: Vec<ClearField>,
    #[command(flatten)]
    style: StyleArgs,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_type(s: &Option<String>) -> Result<Option<ChartType>> {
    Ok(s.as_deref().map(str::parse::<ChartType>).transpose()?)
}

fn parse_max_values(s: &Option<String>) -> Result<Option<MaxValues>> {
    Ok(s.as_deref().map(str::parse::<MaxValues>).transpose()?)
}

fn parse_position(s: &Option<String>) -> Result<Option<LegendPosition>> {
    Ok(s.as_deref().map(str::parse::<LegendPosition>).transpose()?)
}

fn popup_args(style: &StyleArgs) -> Option<PopupArgs> {
    style.popup_labels.as_deref().map(|labels| PopupArgs {
        labels: Some(parse_list(labels)),
        ..PopupArgs::default()
    })
}

/// `Value` when given, `Clear` when listed in `--clear`, else `Unset`.
fn field<T>(value: Option<T>, clear: &[ClearField], which: ClearField) -> Field<T> {
    match value {
        None if clear.contains(&which) => Field::Clear,
        other => Field::supplied(other),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let defaults = match &cli.defaults {
        Some(path) => Defaults::load(path)?,
        None => Defaults::default(),
    };
    let charts = Minicharts::new(defaults);

    let commands = match cli.cmd {
        Cmd::Add(args) => cmd_add(&charts, args)?,
        Cmd::Update(args) => cmd_update(&charts, args)?,
        Cmd::Remove { layer_ids } => charts.remove(parse_list(&layer_ids)),
        Cmd::Clear => charts.clear(),
    };

    match cli.out.as_ref() {
        Some(path) => {
            storage::save_json(&commands, path)?;
            eprintln!("Wrote {} command(s) to {}", commands.len(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&commands)?),
    }
    Ok(())
}

fn cmd_add(charts: &Minicharts, args: AddArgs) -> Result<Vec<Command>> {
    let table = storage::load_csv(&args.input)?;
    let locations = table.require_locations()?.to_vec();
    let ChartTable {
        layer_ids,
        time,
        chartdata,
        ..
    } = table;
    let style = args.style;

    let mut req = AddRequest::new(locations, chartdata);
    req.layer_ids = args.layer_ids.as_deref().map(parse_list).or(layer_ids);
    req.time = time;
    req.chart_type = parse_type(&style.chart_type)?;
    req.max_values = parse_max_values(&style.max_values)?;
    req.width = style.width;
    req.height = style.height;
    req.opacity = style.opacity;
    req.show_labels = style.show_labels.unwrap_or(false);
    req.label_text = style.label_text.as_deref().map(parse_list);
    req.label_min_size = style.label_min_size;
    req.label_max_size = style.label_max_size;
    req.label_style = style.label_style.clone();
    req.transition_time = style.transition_time;
    req.fill_color = style.fill_color.clone();
    req.color_palette = style.palette.as_deref().map(parse_list);
    req.legend = style.no_legend.then_some(false);
    req.legend_position = parse_position(&style.legend_position)?;
    req.time_format = style.time_format.clone();
    req.initial_time = style.initial_time.as_deref().map(TimeKey::parse);
    req.popup = popup_args(&style).unwrap_or_default();
    req.on_change = style.on_change.clone();

    charts.add(&req).context("building add command")
}

fn cmd_update(charts: &Minicharts, args: UpdateArgs) -> Result<Vec<Command>> {
    let table = args.input.as_ref().map(storage::load_csv).transpose()?;
    let layer_ids = match (&args.layer_ids, table.as_ref().and_then(|t| t.layer_ids.clone())) {
        (Some(ids), _) => parse_list(ids),
        (None, Some(ids)) => ids,
        (None, None) => anyhow::bail!("update needs --layer-ids or an input with a layerId column"),
    };
    let style = args.style;
    let clear = &args.clear;

    let mut req = UpdateRequest::new(layer_ids);
    if let Some(table) = table {
        req.chartdata = Some(table.chartdata);
        req.time = table.time;
    }
    req.chart_type = Field::supplied(parse_type(&style.chart_type)?);
    req.max_values = field(parse_max_values(&style.max_values)?, clear, ClearField::MaxValues);
    req.width = Field::supplied(style.width);
    req.height = Field::supplied(style.height);
    req.opacity = Field::supplied(style.opacity);
    req.show_labels = style.show_labels;
    req.label_text = style.label_text.as_deref().map(parse_list);
    req.label_min_size = Field::supplied(style.label_min_size);
    req.label_max_size = Field::supplied(style.label_max_size);
    req.label_style = field(style.label_style.clone(), clear, ClearField::LabelStyle);
    req.transition_time = Field::supplied(style.transition_time);
    req.fill_color = field(style.fill_color.clone(), clear, ClearField::FillColor);
    req.color_palette = field(style.palette.as_deref().map(parse_list), clear, ClearField::Palette);
    req.legend = !style.no_legend;
    req.legend_position = parse_position(&style.legend_position)?;
    req.time_format = style.time_format.clone();
    req.initial_time = style.initial_time.as_deref().map(TimeKey::parse);
    req.popup = popup_args(&style);
    req.on_change = field(style.on_change.clone(), clear, ClearField::OnChange);

    charts.update(&req).context("building update command")
}
