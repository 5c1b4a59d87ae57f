//! Task files: the three input tables in a plain text file.
//!
//! Each table is an upper-case section header followed by a JSON object that maps column
//! names to cell arrays (the sheet in column-major form):
//! ```text
//! REACTIONS
//! { "Reactions": ["CO2 + H2O* → CO* + OH*"], "G_f": [0.5], "G_b": [0.3] }
//! LOCAL_ENVIRONMENT
//! { "pH": [7.0], "V": [-0.5], "Pressure": [1] }
//! INPUT_OUTPUT_SPECIES
//! { "Species": ["CO2", "CO"], "Concentration": [0.9, 0.1] }
//! ```
//! A section runs until the next header line (upper-case letters and `_` only) or the end of
//! the file. Unknown sections are skipped with a warning.
use crate::Microkinetics::errors::DeckError;
use crate::Microkinetics::value_source::{Columns, StaticTables, TableKind};
use log::{error, info, warn};
use std::fs;
use std::path::Path;

pub struct LoadData {
    pub file_name: String,
}

impl LoadData {
    pub fn new(file_name: String) -> Self {
        LoadData { file_name }
    }
    pub fn load_tables(&self) -> Result<StaticTables, DeckError> {
        load_tables_from_file(&self.file_name)
    }
}

fn is_header(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_uppercase() || c == '_')
}

/// (header, first body line, end) for every section, in file order.
fn find_sections(lines: &[&str]) -> Vec<(String, usize, usize)> {
    let headers: Vec<usize> = (0..lines.len()).filter(|&i| is_header(lines[i])).collect();
    headers
        .iter()
        .enumerate()
        .map(|(k, &i)| {
            let end = headers.get(k + 1).copied().unwrap_or(lines.len());
            (lines[i].trim().to_string(), i + 1, end)
        })
        .collect()
}

fn task_error(file_name: &str, details: impl Into<String>) -> DeckError {
    DeckError::TaskFile {
        file: file_name.to_string(),
        details: details.into(),
    }
}

fn parse_section(
    file_name: &str,
    kind: TableKind,
    lines: &[&str],
    start: usize,
    end: usize,
) -> Result<Columns, DeckError> {
    let body = lines[start..end].join("\n");
    match serde_json::from_str::<Columns>(&body) {
        Ok(columns) => Ok(columns),
        Err(e) => {
            // 1-based line in the file
            let file_line = start + e.line();
            let msg = format!(
                "section {}: invalid JSON at line {}, column {}: {}",
                kind.section_header(),
                file_line,
                e.column(),
                e
            );
            error!("{}", msg);
            if let Some(problem_line) = lines.get(file_line.wrapping_sub(1)) {
                error!("Problematic line: {}", problem_line);
                if e.column() >= 1 && e.column() <= problem_line.len() + 1 {
                    error!("{}^", " ".repeat(e.column() - 1));
                }
            }
            Err(task_error(file_name, msg))
        }
    }
}

/// Parses task file text. `file_name` only labels errors.
pub fn parse_tables(text: &str, file_name: &str) -> Result<StaticTables, DeckError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut tables = StaticTables::new();
    let mut found: Vec<TableKind> = Vec::new();
    for (header, start, end) in find_sections(&lines) {
        let Some(kind) = TableKind::from_section_header(&header) else {
            warn!("{}: unknown section '{}' skipped", file_name, header);
            continue;
        };
        if found.contains(&kind) {
            return Err(task_error(
                file_name,
                format!("section {} appears more than once", header),
            ));
        }
        let columns = parse_section(file_name, kind, &lines, start, end)?;
        for (column, cells) in &columns {
            if cells.iter().all(|c| c.is_null()) {
                warn!("{}: column '{}' of {} is empty", file_name, column, kind);
            }
        }
        *tables.table_mut(kind) = columns;
        found.push(kind);
    }
    for kind in TableKind::all() {
        if !found.contains(&kind) {
            return Err(task_error(
                file_name,
                format!("no {} section", kind.section_header()),
            ));
        }
    }
    Ok(tables)
}

pub fn load_tables_from_file(file_name: &str) -> Result<StaticTables, DeckError> {
    let path = Path::new(file_name);
    let text = fs::read_to_string(path).map_err(|e| DeckError::io(path, e))?;
    let tables = parse_tables(&text, file_name)?;
    info!(
        "Successfully loaded tables from '{}': {} reactions, {} species",
        file_name,
        tables
            .reactions
            .get("Reactions")
            .map(Vec::len)
            .unwrap_or(0),
        tables.species.get("Species").map(Vec::len).unwrap_or(0)
    );
    Ok(tables)
}

const TEMPLATE: &str = r#"REACTIONS
{
  "Reactions": ["CO2 + H2O* → CO* + OH*", "CO* → CO + *"],
  "G_f": [0.5, 1.0],
  "G_b": [0.3, 0.25]
}
LOCAL_ENVIRONMENT
{
  "pH": [7.0],
  "V": [-0.5],
  "Pressure": [1]
}
INPUT_OUTPUT_SPECIES
{
  "Species": ["CO2", "CO"],
  "Concentration": [0.9, 0.1]
}
"#;

/// Writes an example task file to start from.
pub fn create_template(path: impl AsRef<Path>) -> Result<(), DeckError> {
    let path = path.as_ref();
    fs::write(path, TEMPLATE).map_err(|e| DeckError::io(path, e))?;
    info!("template written to {}", path.display());
    Ok(())
}
