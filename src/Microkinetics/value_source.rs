//! Where table values come from.
//!
//! The reaction network arrives as three column-oriented tables (the sheets of the input
//! workbook). Deck assembly only ever asks a `ValueSource` for a named column, so a static read
//! and a per-sweep-point override go through the same assembly path.
use super::errors::MissingFieldError;
use super::number_format::Numeric;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub const REACTION_COLUMN: &str = "Reactions";
pub const G_F_COLUMN: &str = "G_f";
pub const G_B_COLUMN: &str = "G_b";
pub const PH_COLUMN: &str = "pH";
pub const POTENTIAL_COLUMN: &str = "V";
pub const PRESSURE_COLUMN: &str = "Pressure";
pub const SPECIES_COLUMN: &str = "Species";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Reactions,
    LocalEnvironment,
    Species,
}

impl TableKind {
    pub fn all() -> [TableKind; 3] {
        [
            TableKind::Reactions,
            TableKind::LocalEnvironment,
            TableKind::Species,
        ]
    }

    /// Sheet name in the input workbook.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            TableKind::Reactions => "Reactions",
            TableKind::LocalEnvironment => "Local Environment",
            TableKind::Species => "Input-Output Species",
        }
    }

    /// Section header in a task file.
    pub fn section_header(&self) -> &'static str {
        match self {
            TableKind::Reactions => "REACTIONS",
            TableKind::LocalEnvironment => "LOCAL_ENVIRONMENT",
            TableKind::Species => "INPUT_OUTPUT_SPECIES",
        }
    }

    pub fn from_section_header(header: &str) -> Option<TableKind> {
        TableKind::all()
            .into_iter()
            .find(|kind| kind.section_header() == header)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sheet_name())
    }
}

/// column name -> cells, top to bottom
pub type Columns = BTreeMap<String, Vec<Value>>;

#[enum_dispatch]
pub trait ValueSource {
    fn column(&self, table: TableKind, column: &str) -> Result<Vec<Value>, MissingFieldError>;
}

/// The three tables as read, no recomputation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticTables {
    #[serde(rename = "Reactions")]
    pub reactions: Columns,
    #[serde(rename = "Local Environment")]
    pub local_environment: Columns,
    #[serde(rename = "Input-Output Species")]
    pub species: Columns,
}

impl StaticTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, kind: TableKind) -> &Columns {
        match kind {
            TableKind::Reactions => &self.reactions,
            TableKind::LocalEnvironment => &self.local_environment,
            TableKind::Species => &self.species,
        }
    }

    pub fn table_mut(&mut self, kind: TableKind) -> &mut Columns {
        match kind {
            TableKind::Reactions => &mut self.reactions,
            TableKind::LocalEnvironment => &mut self.local_environment,
            TableKind::Species => &mut self.species,
        }
    }

    /// Builder-style column setter, handy for programmatic tables and tests.
    pub fn with_column(mut self, kind: TableKind, column: &str, cells: Vec<Value>) -> Self {
        self.table_mut(kind).insert(column.to_string(), cells);
        self
    }
}

impl ValueSource for StaticTables {
    fn column(&self, table: TableKind, column: &str) -> Result<Vec<Value>, MissingFieldError> {
        self.table(table)
            .get(column)
            .cloned()
            .ok_or_else(|| MissingFieldError {
                table: table.sheet_name().to_string(),
                column: column.to_string(),
                row: None,
            })
    }
}

/// Shared base tables with `pH` and `V` replaced by one grid point.
#[derive(Debug, Clone)]
pub struct EnvironmentOverride {
    base: Arc<StaticTables>,
    ph: Numeric,
    potential: Numeric,
}

impl EnvironmentOverride {
    pub fn new(base: Arc<StaticTables>, ph: Numeric, potential: Numeric) -> Self {
        Self {
            base,
            ph,
            potential,
        }
    }

    fn overridden(&self, column: &str, value: Numeric) -> Vec<Value> {
        let cell = serde_json::to_value(value).unwrap_or(Value::Null);
        let mut cells = self
            .base
            .column(TableKind::LocalEnvironment, column)
            .unwrap_or_default();
        // every filled row takes the grid value, an absent column gets one row
        for existing in cells.iter_mut().filter(|c| !c.is_null()) {
            *existing = cell.clone();
        }
        if cells.first().is_none_or(Value::is_null) {
            if cells.is_empty() {
                cells.push(cell);
            } else {
                cells[0] = cell;
            }
        }
        cells
    }
}

impl ValueSource for EnvironmentOverride {
    fn column(&self, table: TableKind, column: &str) -> Result<Vec<Value>, MissingFieldError> {
        match (table, column) {
            (TableKind::LocalEnvironment, PH_COLUMN) => Ok(self.overridden(column, self.ph)),
            (TableKind::LocalEnvironment, POTENTIAL_COLUMN) => {
                Ok(self.overridden(column, self.potential))
            }
            _ => self.base.column(table, column),
        }
    }
}

#[derive(Debug, Clone)]
#[enum_dispatch(ValueSource)]
pub enum TableSource {
    StaticTables(StaticTables),
    EnvironmentOverride(EnvironmentOverride),
}
