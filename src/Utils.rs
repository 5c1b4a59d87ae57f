/// Loading the three input tables from a task file, and writing a template task file.
pub mod load_from_file;
/// simplelog initialisation
pub mod logging;
