/// Parsing of surface reaction equations such as "CO2 + H2O* → CO* + OH*" into brace-wrapped
/// reactant and product terms, and selection of the arity class that fixes the deck line layout.
/// # Examples
/// ```
/// use mkm_deck::Microkinetics::reaction_parser::{ArityClass, parse_equation};
/// let terms = parse_equation("CO* → CO + *").unwrap();
/// assert_eq!(terms.arity, ArityClass::OneToTwo);
/// assert_eq!(terms.products.second(), "{*}");
/// ```
pub mod reaction_parser;
/// Adsorbate catalog: the distinct surface species of a network in first-occurrence order,
/// the free site excluded.
pub mod species_catalog;
/// Column access to the input tables, either as read or with pH and potential replaced for
/// one sweep point.
pub mod value_source;
/// Assembly of an input deck model from the three input tables
pub mod deck_model;
/// Byte-exact rendering of the `input_file.mkm` deck and atomic publishing to disk.
/// # Examples
/// ```
/// use mkm_deck::Microkinetics::deck_model::parse_table;
/// use mkm_deck::Microkinetics::deck_writer::InputDeckWriter;
/// use mkm_deck::Microkinetics::value_source::{StaticTables, TableKind};
/// use mkm_deck::settings::RunSettings;
/// use serde_json::json;
/// let tables = StaticTables::new()
///     .with_column(TableKind::Reactions, "Reactions", vec![json!("CO + * → CO*")])
///     .with_column(TableKind::Reactions, "G_f", vec![json!(0.0)])
///     .with_column(TableKind::Reactions, "G_b", vec![json!(1.2)])
///     .with_column(TableKind::LocalEnvironment, "pH", vec![json!(7)])
///     .with_column(TableKind::LocalEnvironment, "V", vec![json!(-0.5)])
///     .with_column(TableKind::LocalEnvironment, "Pressure", vec![json!(1)])
///     .with_column(TableKind::Species, "Species", vec![json!("CO")])
///     .with_column(TableKind::Species, "Concentration", vec![json!(1.0)]);
/// let model = parse_table(&tables, &RunSettings::default()).unwrap();
/// let deck = InputDeckWriter::new().render(&model).unwrap();
/// assert!(deck.starts_with("&compounds\n\n"));
/// assert!(deck.contains("CO*            ; 1; 0.0\n"));
/// ```
pub mod deck_writer;
/// Text form of numeric cells (`1`, `1.0`, `1e-12`, `6.21e+12`)
pub mod number_format;
/// One deck per (pH, potential) grid point, generated on a worker pool with per-point
/// failure reporting.
pub mod sweep;
/// Reader for the solver's coverage.dat output
pub mod coverage;
pub mod errors;

#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod sweep_tests;
