//! minicharts
//!
//! Turns loosely specified chart inputs into normalized command payloads for a
//! map renderer that draws small animated charts (bars, pies, polar glyphs) at
//! geographic anchors.
//!
//! ### Features
//! - Defaults and tri-state overrides (unset / clear / value) for every option
//! - Long-format time series reshaped into one data slice per time step
//! - Automatic chart type, scaling ceilings and legend colors
//! - Add / update / remove / clear command batches, serializable with serde
//! - An in-memory renderer model (`state::MapState`) to check command streams
//!
//! ### Example
//! ```
//! use minicharts::{AddRequest, Location, MapState, Minicharts, SeriesMatrix, TimeKey};
//!
//! let data = SeriesMatrix::new(vec![
//!     vec![1.0, 2.0], // anchor A, 2020
//!     vec![3.0, 4.0], // anchor B, 2020
//!     vec![5.0, 6.0], // anchor A, 2021
//!     vec![7.0, 8.0], // anchor B, 2021
//! ])?
//! .with_columns(["wind", "solar"])?;
//! let time = [2020, 2020, 2021, 2021].map(TimeKey::from).to_vec();
//! let req = AddRequest::new(vec![Location::new(2.35, 48.85), Location::new(4.85, 45.76)], data)
//!     .with_layer_ids(["paris", "lyon"])
//!     .with_time(time);
//!
//! let commands = Minicharts::default().add(&req)?;
//! let mut map = MapState::new();
//! map.apply_all(&commands)?;
//! assert_eq!(map.chart("lyon").unwrap().data, Some(vec![vec![3.0, 4.0], vec![7.0, 8.0]]));
//! # Ok::<(), minicharts::MinichartsError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod field;
pub mod legend;
pub mod models;
pub mod options;
pub mod payload;
pub mod resolve;
pub mod state;
pub mod storage;
pub mod timeseries;

pub use client::Minicharts;
pub use config::Defaults;
pub use error::{MinichartsError, Result};
pub use field::Field;
pub use models::{ChartType, LabelMode, Location, MaxValues, SeriesMatrix, TimeKey};
pub use options::{AddRequest, PopupArgs, UpdateRequest};
pub use payload::{Command, Payload};
pub use state::MapState;
