//! Entry point for the four outward operations.
//!
//! Each call is a pure transform: caller inputs in, an ordered batch of commands
//! out. Nothing is sent anywhere and no state is kept between calls; delivering the
//! batch to the renderer (see [`crate::state::MapState`]) is up to the caller.
//!
//! ```
//! use minicharts::{AddRequest, Location, Minicharts, SeriesMatrix, UpdateRequest};
//! use minicharts::models::MaxValues;
//!
//! let charts = Minicharts::default();
//! let data = SeriesMatrix::new(vec![vec![1.0, 2.0, 3.0]])?;
//! let add = charts.add(&AddRequest::new(vec![Location::new(0.0, 0.0)], data))?;
//! assert_eq!(add[0].method(), "addMinicharts");
//!
//! let update = UpdateRequest::new(["_minichart (0,0)"]).with_max_values(MaxValues::Shared(6.0));
//! let cmds = charts.update(&update)?;
//! assert_eq!(cmds.len(), 1);
//! # Ok::<(), minicharts::MinichartsError>(())
//! ```

use crate::config::Defaults;
use crate::error::Result;
use crate::legend::LEGEND_CONTROL_ID;
use crate::options::{AddRequest, UpdateRequest};
use crate::payload::{Command, build_add, build_update};

#[derive(Debug, Clone, Default)]
pub struct Minicharts {
    pub defaults: Defaults,
}

impl Minicharts {
    pub fn new(defaults: Defaults) -> Self {
        Self { defaults }
    }

    /// Create charts. Every option is resolved; missing ones take the defaults.
    ///
    /// ### Errors
    /// - `Validation`: bad ids, label text, palette, `maxValues` length or time format
    /// - `DataShape`: unbalanced time keys, or rows not matching the number of locations
    pub fn add(&self, req: &AddRequest) -> Result<Vec<Command>> {
        build_add(req, &self.defaults)
    }

    /// Modify existing charts. Fields the caller left unset are not sent.
    pub fn update(&self, req: &UpdateRequest) -> Result<Vec<Command>> {
        build_update(req, &self.defaults)
    }

    /// Remove charts by id. No normalization happens.
    pub fn remove<S: Into<String>>(&self, layer_ids: impl IntoIterator<Item = S>) -> Vec<Command> {
        vec![Command::RemoveMinicharts {
            layer_id: layer_ids.into_iter().map(Into::into).collect(),
        }]
    }

    /// Remove every chart and the legend control.
    pub fn clear(&self) -> Vec<Command> {
        vec![
            Command::ClearMinicharts,
            Command::RemoveControl {
                layer_id: LEGEND_CONTROL_ID.to_string(),
            },
        ]
    }
}
