use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FpError, Result};

/// Photometric filter (band) of an exposure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Filter {
    U,
    G,
    R,
    I,
    Z,
    Y,
}

impl Filter {
    pub const ALL: [Filter; 6] = [
        Filter::U,
        Filter::G,
        Filter::R,
        Filter::I,
        Filter::Z,
        Filter::Y,
    ];

    pub fn symbol(self) -> char {
        match self {
            Self::U => 'u',
            Self::G => 'g',
            Self::R => 'r',
            Self::I => 'i',
            Self::Z => 'z',
            Self::Y => 'y',
        }
    }

    /// 1-based filter index (`u` = 1 ... `y` = 6).
    pub fn index(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_symbol(c: char) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.symbol() == c)
            .ok_or_else(|| FpError::UnknownFilter(c.to_string()))
    }

    /// Parse a filter from a configuration string; only the first
    /// character is significant, as in the file naming scheme.
    pub fn parse(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match chars.next() {
            Some(c) => Self::from_symbol(c),
            None => Err(FpError::UnknownFilter(s.to_string())),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Camera column, 1..=6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CamCol(u8);

impl CamCol {
    pub fn new(id: u8) -> Result<Self> {
        if (1..=6).contains(&id) {
            Ok(Self(id))
        } else {
            Err(FpError::InvalidCamCol(id))
        }
    }

    pub fn id(self) -> u8 {
        self.0
    }
}

impl fmt::Display for CamCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A run with an inclusive range of field numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFieldMinMax {
    pub run: u32,
    pub field_min: u32,
    pub field_max: u32,
}

/// A single `[run, field, camcol]` triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFieldCamCol {
    pub run: u32,
    pub field: u32,
    pub camcol: u8,
}

/// One forced-photometry exposure file of the plan.
#[derive(Clone, Debug, PartialEq)]
pub struct ExposureFile {
    pub path: PathBuf,
    pub filter: Filter,
    pub camcol: CamCol,
    pub field: u32,
    pub run: u32,
}

impl ExposureFile {
    /// Build the descriptor, deriving the path from the naming convention:
    /// `{base}/{run}/{camcol}/{filter}/forcedsources-{run:06}-{filter}{camcol}-{field:04}.fits`
    pub fn new(base_dir: &Path, run: u32, field: u32, camcol: CamCol, filter: Filter) -> Self {
        let name = format!(
            "forcedsources-{:06}-{}{}-{:04}.fits",
            run, filter, camcol, field
        );
        let path = base_dir
            .join(run.to_string())
            .join(camcol.to_string())
            .join(filter.to_string())
            .join(name);
        Self {
            path,
            filter,
            camcol,
            field,
            run,
        }
    }

    /// Packed camcol/filter code: `10 * camcol + filter index`.
    pub fn camcol_filter(&self) -> i32 {
        10 * self.camcol.id() as i32 + self.filter.index() as i32
    }
}

/// Min/max field number seen per run, ordered by run.
#[derive(Clone, Debug, Default)]
pub struct RunFieldDb {
    runs: BTreeMap<u32, RunFieldMinMax>,
}

impl RunFieldDb {
    pub fn record(&mut self, run: u32, field: u32) {
        self.runs
            .entry(run)
            .and_modify(|rf| {
                rf.field_min = rf.field_min.min(field);
                rf.field_max = rf.field_max.max(field);
            })
            .or_insert(RunFieldMinMax {
                run,
                field_min: field,
                field_max: field,
            });
    }

    pub fn get(&self, run: u32) -> Option<&RunFieldMinMax> {
        self.runs.get(&run)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunFieldMinMax> {
        self.runs.values()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
