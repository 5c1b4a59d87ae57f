//! # mkm_deck
//!
//! Input decks for the MKMCXX microkinetic solver, built from a tabular description of a
//! surface reaction network.
//!
//! - `Microkinetics`: reaction equation parsing, adsorbate catalog, deck model assembly,
//!   byte-exact deck rendering, (pH, potential) sweeps, coverage output reading
//! - `Utils`: task file loading and logging set-up
//! - `settings`: run parameters persisted as JSON
//! - `cli`: the `mkm_deck` command line
#[allow(non_snake_case)]
pub mod Microkinetics;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cli;
pub mod settings;
