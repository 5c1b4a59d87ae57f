//! Reader for the `coverage.dat` table the solver leaves next to each deck.
//!
//! The file is whitespace separated: a header row of species names, then one row of
//! coverages per time step. Only the final row matters for steady-state coverages.
use super::errors::DeckError;
use super::reaction_parser::is_surface_term;
use super::sweep::SweepPoint;
use log::{info, warn};
use prettytable::{Cell, Row, Table, row};
use std::fs;
use std::path::Path;

pub const COVERAGE_FILE: &str = "coverage.dat";

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageTable {
    pub species: Vec<String>,
    /// one row per time step, same length as `species`
    pub rows: Vec<Vec<f64>>,
}

impl CoverageTable {
    pub fn parse(text: &str, origin: &str) -> Result<Self, DeckError> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let species: Vec<String> = lines
            .next()
            .ok_or_else(|| DeckError::inconsistent(origin, "file is empty"))?
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            let values = line
                .split_whitespace()
                .map(|v| v.parse::<f64>())
                .collect::<Result<Vec<f64>, _>>()
                .map_err(|e| DeckError::inconsistent(origin, format!("row {}: {}", i + 1, e)))?;
            if values.len() != species.len() {
                return Err(DeckError::inconsistent(
                    origin,
                    format!(
                        "row {} has {} values for {} species",
                        i + 1,
                        values.len(),
                        species.len()
                    ),
                ));
            }
            rows.push(values);
        }
        Ok(Self { species, rows })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DeckError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| DeckError::io(path, e))?;
        let table = Self::parse(&text, &path.display().to_string())?;
        info!(
            "{}: {} species, {} time steps",
            path.display(),
            table.species.len(),
            table.rows.len()
        );
        Ok(table)
    }

    /// Surface species with their coverage at the last time step, in header order.
    pub fn final_surface_coverages(&self) -> Vec<(String, f64)> {
        let Some(last) = self.rows.last() else {
            return Vec::new();
        };
        self.species
            .iter()
            .zip(last)
            .filter(|(name, _)| is_surface_term(name))
            .map(|(name, value)| (name.clone(), *value))
            .collect()
    }

    pub fn pretty_print(&self) {
        let mut table = Table::new();
        table.add_row(row!["Adsorbates", "Coverage"]);
        for (name, value) in self.final_surface_coverages() {
            table.add_row(Row::new(vec![Cell::new(&name), Cell::new(&value.to_string())]));
        }
        table.printstd();
    }
}

/// Final surface coverages of every sweep point, read from
/// `<root>/pH_<pH>/V_<V>/coverage.dat`. A point without a readable file keeps its error.
pub fn collect_sweep_coverages(
    root: &Path,
    points: &[SweepPoint],
) -> Vec<(SweepPoint, Result<Vec<(String, f64)>, DeckError>)> {
    points
        .iter()
        .map(|point| {
            let path = point.directory(root).join(COVERAGE_FILE);
            let result = CoverageTable::from_file(&path).map(|t| t.final_surface_coverages());
            if let Err(e) = &result {
                warn!("no coverages for {}: {}", point, e);
            }
            (*point, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    const SAMPLE: &str = "Time  CO2  CO*  OH*  *\n\
                          0.0  0.9  0.0  0.0  1.0\n\
                          1e8  0.9  0.25 0.05 0.7\n";

    #[test]
    fn final_row_surface_species_only() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let table = CoverageTable::from_file(file.path()).unwrap();
        assert_eq!(table.rows.len(), 2);
        let cov = table.final_surface_coverages();
        let names: Vec<&str> = cov.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["CO*", "OH*", "*"]);
        assert_relative_eq!(cov[0].1, 0.25);
        assert_relative_eq!(cov[2].1, 0.7);
    }

    #[test]
    fn ragged_and_non_numeric_rows_rejected() {
        assert!(CoverageTable::parse("A* B*\n0.1\n", "x").is_err());
        assert!(CoverageTable::parse("A* B*\n0.1 abc\n", "x").is_err());
        assert!(CoverageTable::parse("", "x").is_err());
    }

    #[test]
    fn header_only_has_no_coverages() {
        let table = CoverageTable::parse("A* B*\n", "x").unwrap();
        assert!(table.final_surface_coverages().is_empty());
    }

    #[test]
    fn sweep_collection_reports_missing_points() {
        let dir = tempdir().unwrap();
        let present = SweepPoint::new(7.0, -0.5);
        let missing = SweepPoint::new(0.0, -0.5);
        let deck_dir = present.directory(dir.path());
        fs::create_dir_all(&deck_dir).unwrap();
        fs::write(deck_dir.join(COVERAGE_FILE), SAMPLE).unwrap();

        let collected = collect_sweep_coverages(dir.path(), &[present, missing]);
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].1.as_ref().unwrap().len(), 3);
        assert!(matches!(collected[1].1, Err(DeckError::Io { .. })));
    }
}
