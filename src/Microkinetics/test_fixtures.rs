//! Shared tables for unit tests.
use super::value_source::{
    G_B_COLUMN, G_F_COLUMN, PH_COLUMN, POTENTIAL_COLUMN, PRESSURE_COLUMN, REACTION_COLUMN,
    SPECIES_COLUMN, StaticTables, TableKind,
};
use serde_json::json;

/// CO2 reduction fragment: one 2->2 and one 1->2 reaction, two gas species.
pub(crate) fn co2_tables() -> StaticTables {
    StaticTables::new()
        .with_column(
            TableKind::Reactions,
            REACTION_COLUMN,
            vec![json!("CO2 + H2O* → CO* + OH*"), json!("CO* → CO + *")],
        )
        .with_column(TableKind::Reactions, G_F_COLUMN, vec![json!(0.5), json!(1)])
        .with_column(TableKind::Reactions, G_B_COLUMN, vec![json!(0.3), json!(0.25)])
        .with_column(TableKind::LocalEnvironment, PH_COLUMN, vec![json!(7.0)])
        .with_column(TableKind::LocalEnvironment, POTENTIAL_COLUMN, vec![json!(-0.5)])
        .with_column(TableKind::LocalEnvironment, PRESSURE_COLUMN, vec![json!(1)])
        .with_column(TableKind::Species, SPECIES_COLUMN, vec![json!("CO2"), json!("CO")])
        .with_column(TableKind::Species, "Concentration", vec![json!(0.9), json!(0.1)])
}

/// Same environment and species as [`co2_tables`] with the given equations, all energies 0.1/0.2.
pub(crate) fn tables_with_reactions(equations: &[&str]) -> StaticTables {
    let n = equations.len();
    co2_tables()
        .with_column(
            TableKind::Reactions,
            REACTION_COLUMN,
            equations.iter().map(|e| json!(e)).collect(),
        )
        .with_column(TableKind::Reactions, G_F_COLUMN, vec![json!(0.1); n])
        .with_column(TableKind::Reactions, G_B_COLUMN, vec![json!(0.2); n])
}
