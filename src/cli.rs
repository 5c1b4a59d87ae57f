/// Command-line entry points: single deck, (pH, V) sweep, template and coverage viewer.
pub mod cli_main;
