//! # Input deck writer
//!
//! Serialises an [`InputDeckModel`] into the `input_file.mkm` text read by the microkinetic
//! solver. The solver reads reaction lines by fixed columns, so every arity class has its own
//! hand-fixed layout and the output has to stay byte-for-byte stable:
//!
//! ```text
//! AR; {CO2}           + {H2O*}          => {CO*}           + {OH*}               ;6.21e+12   ;  6.21e+12   ;  0.5        ;  0.3
//! ```
//!
//! Rendering is a pure function of the model. Publishing goes through a temporary file in the
//! destination directory that is renamed over the target, so a reader never sees a half
//! written deck and re-running a generation replaces the previous deck in one step.
use super::deck_model::InputDeckModel;
use super::errors::DeckError;
use super::number_format::{Numeric, float_sci};
use super::reaction_parser::{ArityClass, ParsedReaction};
use super::species_catalog::SpeciesKind;
use log::{debug, info};
use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const COMPOUNDS_HEADER: &str = "&compounds\n\n";
const GAS_HEADER: &str = "#gas-phase compounds\n\n#Name; isSite; concentration\n\n";
const ADSORBATE_HEADER: &str = "\n\n#adsorbates\n\n#Name; isSite; activity\n\n";
const FREE_SITE_HEADER: &str = "\n#free sites on the surface \n\n#Name; isSite; activity\n\n";
const REACTIONS_HEADER: &str = "&reactions\n\n";
const SOLVER_FLAGS: &str = "\nPOTAXIS=1\nDEBUG=0\nNETWORK_RATES=1\nNETWORK_FLUX=1\nUSETIMESTAMP=0";
const RUNS_HEADER: &str = "\n\n&runs\n# Temp; Potential;Time;AbsTol;RelTol\n";

/// Stateless; one writer can render any number of models, from any thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputDeckWriter;

impl InputDeckWriter {
    pub fn new() -> Self {
        Self
    }

    /// Full deck text. The last line (the run line) has no trailing newline.
    pub fn render(&self, model: &InputDeckModel) -> Result<String, DeckError> {
        let mut out = String::new();
        out.push_str(COMPOUNDS_HEADER);
        out.push_str(GAS_HEADER);
        for gas in &model.gas_species {
            match &gas.kind {
                SpeciesKind::Gas { concentration } => {
                    writeln!(out, "{:<15}; 0; {}", gas.name, concentration)?
                }
                SpeciesKind::Surface { .. } => {
                    return Err(DeckError::Render(format!(
                        "'{}' is listed as a gas but modelled as a surface species",
                        gas.name
                    )));
                }
            }
        }

        out.push_str(ADSORBATE_HEADER);
        for adsorbate in &model.adsorbates {
            writeln!(
                out,
                "{:<15}; 1; {}",
                adsorbate.name,
                surface_activity(&adsorbate.kind, &adsorbate.name)?
            )?;
        }

        out.push_str(FREE_SITE_HEADER);
        writeln!(
            out,
            "{}; 1; {}\n",
            model.free_site.name,
            surface_activity(&model.free_site.kind, &model.free_site.name)?
        )?;

        out.push_str(REACTIONS_HEADER);
        for reaction in &model.reactions {
            out.push_str(&reaction_line(reaction)?);
        }

        let env = &model.environment;
        write!(
            out,
            "\n\n&settings\nTYPE = SEQUENCERUN\nPRESSURE = {}",
            env.pressure
        )?;
        out.push_str(SOLVER_FLAGS);
        out.push_str(RUNS_HEADER);
        write!(
            out,
            "{:<5};{:<5};{:<5};{:<5};{:<5}",
            env.temperature,
            env.potential,
            float_sci(env.run_time, 2),
            env.abs_tol,
            env.rel_tol
        )?;
        debug!("rendered deck: {} bytes", out.len());
        Ok(out)
    }

    /// Renders `model` and publishes it at `path`, creating parent directories as needed.
    pub fn write_atomically(&self, model: &InputDeckModel, path: &Path) -> Result<(), DeckError> {
        let text = self.render(model)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| DeckError::io(dir, e))?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DeckError::io(dir, e))?;
        tmp.write_all(text.as_bytes())
            .and_then(|_| tmp.flush())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| DeckError::io(tmp.path(), e))?;
        // temp files are created owner-only, a deck is an ordinary file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .map_err(|e| DeckError::io(tmp.path(), e))?;
        }
        tmp.persist(path).map_err(|e| DeckError::io(path, e.error))?;
        info!("input deck written to {}", path.display());
        Ok(())
    }
}

fn surface_activity(kind: &SpeciesKind, name: &str) -> Result<Numeric, DeckError> {
    match kind {
        SpeciesKind::Surface { activity, .. } => Ok(Numeric::Float(*activity)),
        SpeciesKind::Gas { .. } => Err(DeckError::Render(format!(
            "'{}' is listed as a surface species but modelled as a gas",
            name
        ))),
    }
}

/// Terms part of a reaction line, up to and including the last product column.
fn terms_field(r: &ParsedReaction) -> String {
    let (re, pr) = (&r.reactants, &r.products);
    match r.arity {
        ArityClass::ThreeReactants => {
            let products = if pr.has_second() {
                format!("{:<15} + {:<15}", pr.first(), pr.second())
            } else {
                format!("{:<15}{:<15}", pr.first(), "")
            };
            format!(
                "AR; {:<15} + {:<15} + {:<5} => {}",
                re.first(),
                re.second(),
                re.third(),
                products
            )
        }
        ArityClass::ThreeProducts => {
            // a missing 2nd reactant is blanked at the same width as " + {R2}"
            let second = if re.has_second() {
                format!(" + {:<14}", re.second())
            } else {
                format!(" {:<16}", "")
            };
            format!(
                "AR; {:<15}{}  => {:<10} + {:<15} + {:<7}",
                re.first(),
                second,
                pr.first(),
                pr.second(),
                pr.third()
            )
        }
        ArityClass::TwoToTwo => format!(
            "AR; {:<15} + {:<15} => {:<15} + {:<20}",
            re.first(),
            re.second(),
            pr.first(),
            pr.second()
        ),
        ArityClass::OneToTwo => format!(
            "AR; {:<15} {:<17} => {:<15} + {:<20}",
            re.first(),
            "",
            pr.first(),
            pr.second()
        ),
        ArityClass::TwoToOne => format!(
            "AR; {:<15} + {:<15} => {:<15}{:<23}",
            re.first(),
            re.second(),
            pr.first(),
            ""
        ),
        ArityClass::OneToOne => format!(
            "AR; {:<15} {:<17} => {:<15}{:<23}",
            re.first(),
            "",
            pr.first(),
            ""
        ),
    }
}

/// One `&reactions` line, newline included.
pub fn reaction_line(r: &ParsedReaction) -> Result<String, DeckError> {
    // a hand-built reaction whose class disagrees with its terms would shift columns
    let consistent = !r.reactants.first().is_empty()
        && !r.products.first().is_empty()
        && ArityClass::classify(&r.reactants, &r.products) == Ok(r.arity);
    if !consistent {
        return Err(DeckError::Render(format!(
            "reaction '{}' does not fit the {:?} layout",
            r.equation, r.arity
        )));
    }
    Ok(format!(
        "{};{:<10} ;  {:<10} ;  {:<10} ;  {:<10} \n",
        terms_field(r),
        float_sci(r.k_f, 2),
        float_sci(r.k_b, 2),
        r.g_f,
        r.g_b
    ))
}
