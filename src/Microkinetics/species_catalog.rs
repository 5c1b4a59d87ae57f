//! Species of a deck and the catalog of adsorbates found in the reaction network.
//!
//! The catalog is filled column by column: all first reactants, all second reactants, all third
//! reactants, then the same for products. The first occurrence fixes the position of an
//! adsorbate, which is the order the deck lists them in.
use super::number_format::Numeric;
use super::reaction_parser::{FREE_SITE, MAX_TERMS, ParsedReaction, bare_name, is_surface_term};
use indexmap::IndexSet;

#[derive(Debug, Clone, PartialEq)]
pub enum SpeciesKind {
    Gas { concentration: Numeric },
    Surface { activity: f64, is_site: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub name: String,
    pub kind: SpeciesKind,
}

impl Species {
    pub fn gas(name: &str, concentration: Numeric) -> Self {
        Self {
            name: name.to_string(),
            kind: SpeciesKind::Gas { concentration },
        }
    }

    /// Adsorbates start with zero activity.
    pub fn adsorbate(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: SpeciesKind::Surface {
                activity: 0.0,
                is_site: false,
            },
        }
    }

    /// The free surface site, always at unit activity.
    pub fn free_site() -> Self {
        Self {
            name: FREE_SITE.to_string(),
            kind: SpeciesKind::Surface {
                activity: 1.0,
                is_site: true,
            },
        }
    }

    pub fn is_gas(&self) -> bool {
        matches!(self.kind, SpeciesKind::Gas { .. })
    }
}

/// Insertion-ordered set of adsorbate names (brace-free, marker kept: `H2O*`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesCatalog {
    adsorbates: IndexSet<String>,
}

impl SpeciesCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `term` if it is a surface species other than the free site.
    /// Returns true when the adsorbate was not seen before.
    pub fn observe(&mut self, term: &str) -> bool {
        let name = bare_name(term);
        if !is_surface_term(name) || name == FREE_SITE {
            return false;
        }
        self.adsorbates.insert(name.to_string())
    }

    pub fn from_reactions(reactions: &[ParsedReaction]) -> Self {
        let mut catalog = Self::new();
        for slot in 0..MAX_TERMS {
            for reaction in reactions {
                catalog.observe(reaction.reactants.slot(slot));
            }
        }
        for slot in 0..MAX_TERMS {
            for reaction in reactions {
                catalog.observe(reaction.products.slot(slot));
            }
        }
        catalog
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.adsorbates.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adsorbates.contains(name)
    }

    pub fn len(&self) -> usize {
        self.adsorbates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adsorbates.is_empty()
    }

    pub fn into_species(self) -> Vec<Species> {
        self.adsorbates
            .into_iter()
            .map(|name| Species::adsorbate(&name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Microkinetics::reaction_parser::ReactionEquationParser;

    fn reactions(eqs: &[&str]) -> Vec<ParsedReaction> {
        let parser = ReactionEquationParser::new(6.21e12);
        eqs.iter()
            .map(|eq| parser.parse(eq, Numeric::Int(0), Numeric::Int(0)).unwrap())
            .collect()
    }

    #[test]
    fn reference_equation_order() {
        let catalog = SpeciesCatalog::from_reactions(&reactions(&["CO2 + H2O* → CO* + OH*"]));
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["H2O*", "CO*", "OH*"]);
    }

    #[test]
    fn column_major_scan_order() {
        // first reactants of every reaction come before any second reactant
        let catalog = SpeciesCatalog::from_reactions(&reactions(&[
            "A* + B* → C*",
            "D* + E* → F* + G*",
            "H* + I* + J* → K*",
        ]));
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(
            names,
            vec!["A*", "D*", "H*", "B*", "E*", "I*", "J*", "C*", "F*", "K*", "G*"]
        );
    }

    #[test]
    fn free_site_and_gas_excluded_duplicates_collapsed() {
        let catalog = SpeciesCatalog::from_reactions(&reactions(&[
            "CO + * → CO*",
            "CO* + O* → CO2 + *",
            "O2 + * + * → O* + O*",
        ]));
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["CO*", "O*"]);
        assert!(!catalog.contains("*"));
        assert!(!catalog.contains("CO"));
    }

    #[test]
    fn species_constructors() {
        let site = Species::free_site();
        assert_eq!(site.name, "*");
        assert_eq!(
            site.kind,
            SpeciesKind::Surface {
                activity: 1.0,
                is_site: true
            }
        );
        let species = SpeciesCatalog::from_reactions(&reactions(&["A → A*"])).into_species();
        assert_eq!(species, vec![Species::adsorbate("A*")]);
        assert!(Species::gas("CO2", Numeric::Float(0.1)).is_gas());
    }
}
