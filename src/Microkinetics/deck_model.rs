//! # Input deck model
//!
//! `InputDeckModel` is everything a deck needs, assembled in one pass by [`parse_table`]:
//! gas species with concentrations, the adsorbate catalog, parsed reactions with energies, the
//! free site and the environment scalars. A model is built once per deck (once per grid point
//! in a sweep) and is not mutated after it is handed to the writer.
//!
//! ## Assembly steps
//! 1. read `Reactions`, `G_f`, `G_b` and check the three columns have the same length
//! 2. parse every equation; the first malformed one aborts assembly
//! 3. build the adsorbate catalog from the parsed reactions
//! 4. read gas species and their concentration column
//! 5. read `pH`, `V`, `Pressure` from row 0 of the environment table
//!
//! Trailing blank rows (exported spreadsheets often carry them) are ignored. A table ends at
//! the last row any of its columns fills; a blank cell above that row is a `MissingFieldError`
//! for that row, and a column that simply stops early is an inconsistent table.
use super::errors::{DeckError, MissingFieldError};
use super::number_format::Numeric;
use super::reaction_parser::{
    ParsedReaction, ReactionEquationParser, ReactionSide, bare_name, is_surface_term,
};
use super::species_catalog::{Species, SpeciesCatalog, SpeciesKind};
use super::value_source::{
    G_B_COLUMN, G_F_COLUMN, PH_COLUMN, POTENTIAL_COLUMN, PRESSURE_COLUMN, REACTION_COLUMN,
    SPECIES_COLUMN, TableKind, ValueSource,
};
use crate::settings::RunSettings;
use indexmap::IndexSet;
use log::{debug, info, warn};
use prettytable::{Cell, Row, Table, row};
use serde_json::Value;

/// Scalars of the `&settings` and `&runs` blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub temperature: Numeric,
    pub potential: Numeric,
    /// not rendered in the deck, kept to label the run
    pub ph: Numeric,
    pub pressure: Numeric,
    pub run_time: f64,
    pub abs_tol: Numeric,
    pub rel_tol: Numeric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputDeckModel {
    pub gas_species: Vec<Species>,
    pub adsorbates: Vec<Species>,
    pub free_site: Species,
    pub reactions: Vec<ParsedReaction>,
    pub environment: Environment,
}

impl InputDeckModel {
    /// Prints species and reactions as tables.
    pub fn pretty_print(&self) {
        let mut species = Table::new();
        species.add_row(row!["Name", "isSite", "concentration / activity"]);
        for s in self
            .gas_species
            .iter()
            .chain(self.adsorbates.iter())
            .chain(std::iter::once(&self.free_site))
        {
            let (is_site, value) = match &s.kind {
                SpeciesKind::Gas { concentration } => (0, concentration.to_string()),
                SpeciesKind::Surface { activity, .. } => (1, Numeric::Float(*activity).to_string()),
            };
            species.add_row(Row::new(vec![
                Cell::new(&s.name),
                Cell::new(&is_site.to_string()),
                Cell::new(&value),
            ]));
        }
        species.printstd();

        let mut reactions = Table::new();
        reactions.add_row(row!["#", "Equation", "Layout", "G_f", "G_b"]);
        for (i, r) in self.reactions.iter().enumerate() {
            reactions.add_row(Row::new(vec![
                Cell::new(&(i + 1).to_string()),
                Cell::new(&r.term_form()),
                Cell::new(&format!("{:?}", r.arity)),
                Cell::new(&r.g_f.to_string()),
                Cell::new(&r.g_b.to_string()),
            ]));
        }
        reactions.printstd();
    }
}

/// Drops the blank rows below the last row any of `columns` fills. Blanks above it stay and
/// are reported by the readers.
fn trim_trailing_rows(mut columns: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    let rows = columns
        .iter()
        .filter_map(|cells| cells.iter().rposition(|c| !c.is_null()))
        .map(|last| last + 1)
        .max()
        .unwrap_or(0);
    for cells in &mut columns {
        cells.truncate(rows);
    }
    columns
}

fn missing_row(table: TableKind, column: &str, row: usize) -> DeckError {
    MissingFieldError {
        table: table.sheet_name().to_string(),
        column: column.to_string(),
        row: Some(row),
    }
    .into()
}

fn text_column(
    table: TableKind,
    column: &str,
    cells: Vec<Value>,
) -> Result<Vec<String>, DeckError> {
    cells
        .into_iter()
        .enumerate()
        .map(|(row, cell)| match cell {
            Value::String(s) => Ok(s),
            Value::Null => Err(missing_row(table, column, row)),
            other => Err(DeckError::inconsistent(
                table.sheet_name(),
                format!("column '{}' row {}: expected text, found {}", column, row, other),
            )),
        })
        .collect()
}

fn numeric_column(
    table: TableKind,
    column: &str,
    cells: Vec<Value>,
) -> Result<Vec<Numeric>, DeckError> {
    cells
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            if cell.is_null() {
                return Err(missing_row(table, column, row));
            }
            Numeric::from_value(&cell).ok_or_else(|| {
                DeckError::inconsistent(
                    table.sheet_name(),
                    format!("column '{}' row {}: expected a number, found {}", column, row, cell),
                )
            })
        })
        .collect()
}

/// Row 0 of an environment column.
fn first_numeric<S: ValueSource + ?Sized>(source: &S, column: &str) -> Result<Numeric, DeckError> {
    let table = TableKind::LocalEnvironment;
    let cells = source.column(table, column)?;
    match cells.first() {
        None | Some(Value::Null) => Err(missing_row(table, column, 0)),
        Some(cell) => Numeric::from_value(cell).ok_or_else(|| {
            DeckError::inconsistent(
                table.sheet_name(),
                format!("column '{}' row 0: expected a number, found {}", column, cell),
            )
        }),
    }
}

fn check_same_length(table: TableKind, columns: &[(&str, usize)]) -> Result<(), DeckError> {
    if let Some((first_name, first_len)) = columns.first() {
        for (name, len) in &columns[1..] {
            if len != first_len {
                return Err(DeckError::inconsistent(
                    table.sheet_name(),
                    format!(
                        "column '{}' has {} rows but column '{}' has {}",
                        name, len, first_name, first_len
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn read_reactions<S: ValueSource + ?Sized>(
    source: &S,
    parser: &ReactionEquationParser,
) -> Result<Vec<ParsedReaction>, DeckError> {
    let table = TableKind::Reactions;
    let mut cells = trim_trailing_rows(vec![
        source.column(table, REACTION_COLUMN)?,
        source.column(table, G_F_COLUMN)?,
        source.column(table, G_B_COLUMN)?,
    ])
    .into_iter();
    let equations = text_column(table, REACTION_COLUMN, cells.next().unwrap_or_default())?;
    let g_f = numeric_column(table, G_F_COLUMN, cells.next().unwrap_or_default())?;
    let g_b = numeric_column(table, G_B_COLUMN, cells.next().unwrap_or_default())?;
    check_same_length(
        table,
        &[
            (REACTION_COLUMN, equations.len()),
            (G_F_COLUMN, g_f.len()),
            (G_B_COLUMN, g_b.len()),
        ],
    )?;
    let mut reactions = Vec::with_capacity(equations.len());
    for ((equation, g_f), g_b) in equations.iter().zip(g_f).zip(g_b) {
        reactions.push(parser.parse(equation.trim(), g_f, g_b)?);
    }
    Ok(reactions)
}

fn read_gas_species<S: ValueSource + ?Sized>(
    source: &S,
    concentration_column: &str,
) -> Result<Vec<Species>, DeckError> {
    let table = TableKind::Species;
    let mut cells = trim_trailing_rows(vec![
        source.column(table, SPECIES_COLUMN)?,
        source.column(table, concentration_column)?,
    ])
    .into_iter();
    let names = text_column(table, SPECIES_COLUMN, cells.next().unwrap_or_default())?;
    let concentrations =
        numeric_column(table, concentration_column, cells.next().unwrap_or_default())?;
    check_same_length(
        table,
        &[
            (SPECIES_COLUMN, names.len()),
            (concentration_column, concentrations.len()),
        ],
    )?;
    let mut seen = IndexSet::new();
    let mut species = Vec::with_capacity(names.len());
    for (name, concentration) in names.iter().zip(concentrations) {
        let name = name.trim();
        if !seen.insert(name.to_string()) {
            return Err(DeckError::inconsistent(
                table.sheet_name(),
                format!("gas species '{}' is listed more than once", name),
            ));
        }
        if is_surface_term(name) {
            warn!("gas species '{}' carries the surface marker", name);
        }
        species.push(Species::gas(name, concentration));
    }
    Ok(species)
}

/// Gas-phase terms used by reactions but absent from the species table.
fn undeclared_gas_terms<'a>(reactions: &'a [ParsedReaction], gas: &[Species]) -> Vec<&'a str> {
    let mut undeclared = IndexSet::new();
    for term in reactions.iter().flat_map(|r| r.terms()) {
        let name = bare_name(term);
        if !is_surface_term(name) && !gas.iter().any(|s| s.name == name) {
            undeclared.insert(name);
        }
    }
    undeclared.into_iter().collect()
}

/// Adsorbates that are only ever produced or only ever consumed.
fn one_sided_adsorbates<'a>(
    reactions: &[ParsedReaction],
    catalog: &'a SpeciesCatalog,
) -> Vec<&'a str> {
    let occurs = |side: &ReactionSide, name: &str| side.present().any(|t| bare_name(t) == name);
    catalog
        .names()
        .filter(|name| {
            let consumed = reactions.iter().any(|r| occurs(&r.reactants, name));
            let produced = reactions.iter().any(|r| occurs(&r.products, name));
            !(consumed && produced)
        })
        .collect()
}

/// Assembles a fresh deck model from `source`. Nothing is shared between calls.
pub fn parse_table<S: ValueSource + ?Sized>(
    source: &S,
    settings: &RunSettings,
) -> Result<InputDeckModel, DeckError> {
    let parser = ReactionEquationParser::new(settings.pre_exponential);
    let reactions = read_reactions(source, &parser)?;
    if reactions.is_empty() {
        warn!("reaction table is empty, the deck will have no &reactions lines");
    }
    let catalog = SpeciesCatalog::from_reactions(&reactions);
    debug!("{} adsorbates cataloged", catalog.len());
    for name in one_sided_adsorbates(&reactions, &catalog) {
        warn!("adsorbate '{}' appears on only one side of the network", name);
    }

    let gas_species = read_gas_species(source, &settings.concentration_column)?;
    for name in undeclared_gas_terms(&reactions, &gas_species) {
        warn!("'{}' appears in a reaction but not in the gas species table", name);
    }

    let environment = Environment {
        temperature: settings.temperature,
        potential: first_numeric(source, POTENTIAL_COLUMN)?,
        ph: first_numeric(source, PH_COLUMN)?,
        pressure: first_numeric(source, PRESSURE_COLUMN)?,
        run_time: settings.run_time,
        abs_tol: settings.abs_tol,
        rel_tol: settings.rel_tol,
    };
    info!(
        "deck model assembled: {} reactions, {} gas species, {} adsorbates (pH={}, V={})",
        reactions.len(),
        gas_species.len(),
        catalog.len(),
        environment.ph,
        environment.potential
    );
    Ok(InputDeckModel {
        gas_species,
        adsorbates: catalog.into_species(),
        free_site: Species::free_site(),
        reactions,
        environment,
    })
}
