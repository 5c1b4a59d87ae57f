//! # Reaction equation parser
//!
//! ## Aim
//! Turns a free-form surface reaction such as `"CO2 + H2O* → CO* + OH*"` into a `ParsedReaction`:
//! two sides of at most three brace-wrapped terms (`{CO2}`, `{H2O*}`, ...), the arity class
//! that later picks the deck line layout, and the energies carried over from the reaction table.
//!
//! ## Rules
//! - exactly one arrow: `→` (what the spreadsheets use), `->` or `=>`
//! - each side is a `+`-joined list of 1..=3 terms, each trimmed of surrounding whitespace
//! - absent 2nd/3rd terms are stored as empty strings; the writer relies on that
//! - a term containing `*` is a surface species, the bare `*` is the free site
//!
//! ## Usage
//! ```rust
//! use mkm_deck::Microkinetics::reaction_parser::{ArityClass, ReactionEquationParser};
//! use mkm_deck::Microkinetics::number_format::Numeric;
//! let parser = ReactionEquationParser::new(6.21e12);
//! let r = parser
//!     .parse("CO2 + H2O* → CO* + OH*", Numeric::Float(0.5), Numeric::Float(0.3))
//!     .unwrap();
//! assert_eq!(r.reactants.first(), "{CO2}");
//! assert_eq!(r.arity, ArityClass::TwoToTwo);
//! assert_eq!(r.term_form(), "{CO2}+{H2O*}=>{CO*}+{OH*}");
//! ```
use super::errors::{ParseError, ParseErrorKind, Side};
use super::number_format::Numeric;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Marks a species as surface bound.
pub const SURFACE_MARKER: char = '*';
/// The unoccupied surface site.
pub const FREE_SITE: &str = "*";
/// The deck format has no row for more terms than this on either side.
pub const MAX_TERMS: usize = 3;

fn arrow_regex() -> &'static Regex {
    static ARROW: OnceLock<Regex> = OnceLock::new();
    ARROW.get_or_init(|| Regex::new(r"→|->|=>").expect("arrow pattern is a valid regex"))
}

/// `{H2O*}` -> `H2O*`
pub fn bare_name(term: &str) -> &str {
    term.trim_start_matches('{').trim_end_matches('}')
}

pub fn is_surface_term(term: &str) -> bool {
    term.contains(SURFACE_MARKER)
}

/// One side of a reaction: three term slots, unused slots hold `""`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReactionSide {
    terms: [String; MAX_TERMS],
}

impl ReactionSide {
    pub fn first(&self) -> &str {
        &self.terms[0]
    }
    pub fn second(&self) -> &str {
        &self.terms[1]
    }
    pub fn third(&self) -> &str {
        &self.terms[2]
    }
    /// Term in slot `index` (0-based), `""` when the slot is unused.
    pub fn slot(&self, index: usize) -> &str {
        self.terms.get(index).map(String::as_str).unwrap_or("")
    }
    pub fn has_second(&self) -> bool {
        !self.terms[1].is_empty()
    }
    pub fn has_third(&self) -> bool {
        !self.terms[2].is_empty()
    }
    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.terms.iter().filter(|t| !t.is_empty()).count()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Occupied terms in source order.
    pub fn present(&self) -> impl Iterator<Item = &str> {
        self.terms
            .iter()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    fn parse(equation: &str, text: &str, side: Side) -> Result<Self, ParseError> {
        let raw: Vec<&str> = text.split('+').collect();
        if raw.len() > MAX_TERMS {
            return Err(ParseError::new(
                equation,
                ParseErrorKind::TooManyTerms {
                    side,
                    count: raw.len(),
                },
            ));
        }
        let mut terms: [String; MAX_TERMS] = Default::default();
        for (i, term) in raw.iter().enumerate() {
            let term = term.trim();
            if term.is_empty() {
                return Err(ParseError::new(
                    equation,
                    ParseErrorKind::EmptyTerm {
                        side,
                        position: i + 1,
                    },
                ));
            }
            terms[i] = format!("{{{}}}", term);
        }
        Ok(Self { terms })
    }
}

impl fmt::Display for ReactionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.present().collect();
        write!(f, "{}", joined.join("+"))
    }
}

/// Layout class of a deck reaction line. The deck format has a hand-fixed column layout per
/// class, there is no generic variable-arity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArityClass {
    /// 3 reactants, 1 or 2 products
    ThreeReactants,
    /// 3 products, 1 or 2 reactants
    ThreeProducts,
    TwoToTwo,
    OneToTwo,
    TwoToOne,
    OneToOne,
}

impl ArityClass {
    /// The 3rd-reactant check wins over the 3rd-product check, then the 2nd-term checks.
    pub fn classify(
        reactants: &ReactionSide,
        products: &ReactionSide,
    ) -> Result<Self, ParseErrorKind> {
        let class = match (
            reactants.has_third(),
            products.has_third(),
            reactants.has_second(),
            products.has_second(),
        ) {
            (true, true, _, _) => {
                return Err(ParseErrorKind::UnsupportedArity {
                    reactants: reactants.len(),
                    products: products.len(),
                });
            }
            (true, false, _, _) => ArityClass::ThreeReactants,
            (false, true, _, _) => ArityClass::ThreeProducts,
            (false, false, true, true) => ArityClass::TwoToTwo,
            (false, false, false, true) => ArityClass::OneToTwo,
            (false, false, true, false) => ArityClass::TwoToOne,
            (false, false, false, false) => ArityClass::OneToOne,
        };
        Ok(class)
    }
}

/// Structural result of parsing an equation, before energies are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionTerms {
    pub reactants: ReactionSide,
    pub products: ReactionSide,
    pub arity: ArityClass,
}

/// Splits an equation into its two sides and classifies the layout.
pub fn parse_equation(equation: &str) -> Result<ReactionTerms, ParseError> {
    let arrows: Vec<_> = arrow_regex().find_iter(equation).collect();
    let arrow = match arrows.as_slice() {
        [] => return Err(ParseError::new(equation, ParseErrorKind::MissingArrow)),
        [arrow] => *arrow,
        more => {
            return Err(ParseError::new(
                equation,
                ParseErrorKind::MultipleArrows(more.len()),
            ));
        }
    };
    let lhs = &equation[..arrow.start()];
    let rhs = &equation[arrow.end()..];
    let reactants = ReactionSide::parse(equation, lhs, Side::Reactants)?;
    let products = ReactionSide::parse(equation, rhs, Side::Products)?;
    let arity = ArityClass::classify(&reactants, &products)
        .map_err(|kind| ParseError::new(equation, kind))?;
    Ok(ReactionTerms {
        reactants,
        products,
        arity,
    })
}

/// A reaction ready for the deck: terms, layout class, energies and rate prefactors.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReaction {
    /// source text, kept for error reports
    pub equation: String,
    pub reactants: ReactionSide,
    pub products: ReactionSide,
    pub arity: ArityClass,
    pub g_f: Numeric,
    pub g_b: Numeric,
    /// forward pre-exponential factor
    pub k_f: f64,
    /// backward pre-exponential factor
    pub k_b: f64,
}

impl ParsedReaction {
    /// `{A}+{B}=>{C}+{D}`
    pub fn term_form(&self) -> String {
        format!("{}=>{}", self.reactants, self.products)
    }

    /// Every occupied term, reactants first.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.reactants.present().chain(self.products.present())
    }
}

/// Stateless parser; the only thing it carries is the pre-exponential factor shared by all
/// reactions in both directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionEquationParser {
    pub pre_exponential: f64,
}

impl ReactionEquationParser {
    pub fn new(pre_exponential: f64) -> Self {
        Self { pre_exponential }
    }

    pub fn parse(
        &self,
        equation: &str,
        g_f: Numeric,
        g_b: Numeric,
    ) -> Result<ParsedReaction, ParseError> {
        let ReactionTerms {
            reactants,
            products,
            arity,
        } = parse_equation(equation)?;
        Ok(ParsedReaction {
            equation: equation.to_string(),
            reactants,
            products,
            arity,
            g_f,
            g_b,
            k_f: self.pre_exponential,
            k_b: self.pre_exponential,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(eq: &str) -> ArityClass {
        parse_equation(eq).unwrap().arity
    }

    #[test]
    fn parses_reference_equation() {
        let parser = ReactionEquationParser::new(6.21e12);
        let r = parser
            .parse("CO2 + H2O* → CO* + OH*", Numeric::Float(0.5), Numeric::Float(0.3))
            .unwrap();
        assert_eq!(r.reactants.first(), "{CO2}");
        assert_eq!(r.reactants.second(), "{H2O*}");
        assert_eq!(r.reactants.third(), "");
        assert_eq!(r.products.first(), "{CO*}");
        assert_eq!(r.products.second(), "{OH*}");
        assert_eq!(r.products.third(), "");
        assert_eq!(r.g_f, Numeric::Float(0.5));
        assert_eq!(r.g_b, Numeric::Float(0.3));
        assert_eq!(r.k_f, 6.21e12);
        assert_eq!(r.k_b, 6.21e12);
    }

    #[test]
    fn six_layout_classes() {
        assert_eq!(classify("A* + B* + C* → D* + E"), ArityClass::ThreeReactants);
        assert_eq!(classify("A* + B* + C* → D*"), ArityClass::ThreeReactants);
        assert_eq!(classify("A* + B → C* + D + E"), ArityClass::ThreeProducts);
        assert_eq!(classify("CO2 + H2O* → CO* + OH*"), ArityClass::TwoToTwo);
        assert_eq!(classify("H2O* → OH* + H*"), ArityClass::OneToTwo);
        assert_eq!(classify("CO* + O* → CO2"), ArityClass::TwoToOne);
        assert_eq!(classify("CO → CO*"), ArityClass::OneToOne);
    }

    #[test]
    fn three_and_three_is_rejected() {
        let err = parse_equation("A + B + C → D + E + F").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnsupportedArity {
                reactants: 3,
                products: 3
            }
        );
    }

    #[test]
    fn whitespace_is_trimmed_and_order_kept() {
        let t = parse_equation("  B*   +A  ->   C*+ *  ").unwrap();
        assert_eq!(t.reactants.first(), "{B*}");
        assert_eq!(t.reactants.second(), "{A}");
        assert_eq!(t.products.first(), "{C*}");
        assert_eq!(t.products.second(), "{*}");
    }

    #[test]
    fn alternative_arrows() {
        assert_eq!(classify("A => B"), ArityClass::OneToOne);
        assert_eq!(classify("A -> B"), ArityClass::OneToOne);
    }

    #[test]
    fn term_form_round_trip() {
        let parser = ReactionEquationParser::new(1.0);
        for (eq, form) in [
            ("A → B", "{A}=>{B}"),
            ("A + B* → C*", "{A}+{B*}=>{C*}"),
            ("A* + B* + * → C + D*", "{A*}+{B*}+{*}=>{C}+{D*}"),
            ("CO2 + H2O* → CO* + OH*", "{CO2}+{H2O*}=>{CO*}+{OH*}"),
        ] {
            let r = parser.parse(eq, Numeric::Int(0), Numeric::Int(0)).unwrap();
            assert_eq!(r.term_form(), form);
            let reparsed = parser
                .parse(&r.term_form().replace("=>", "→"), Numeric::Int(0), Numeric::Int(0))
                .unwrap();
            // re-wrapping adds a second pair of braces, bare names must agree
            let names: Vec<&str> = reparsed.terms().map(bare_name).collect();
            let original: Vec<&str> = r.terms().map(bare_name).collect();
            assert_eq!(names, original);
        }
    }

    #[test]
    fn malformed_equations() {
        let missing = parse_equation("CO2 + H2O* CO* + OH*").unwrap_err();
        assert_eq!(missing.kind, ParseErrorKind::MissingArrow);
        assert_eq!(missing.equation, "CO2 + H2O* CO* + OH*");

        let twice = parse_equation("A → B → C").unwrap_err();
        assert_eq!(twice.kind, ParseErrorKind::MultipleArrows(2));

        let many = parse_equation("A + B + C + D → E").unwrap_err();
        assert_eq!(
            many.kind,
            ParseErrorKind::TooManyTerms {
                side: Side::Reactants,
                count: 4
            }
        );

        let empty = parse_equation("A + → B").unwrap_err();
        assert_eq!(
            empty.kind,
            ParseErrorKind::EmptyTerm {
                side: Side::Reactants,
                position: 2
            }
        );

        // a charged species written with `+` splits into an empty term
        let charged = parse_equation("H+ + e- → H*").unwrap_err();
        assert_eq!(
            charged.kind,
            ParseErrorKind::EmptyTerm {
                side: Side::Reactants,
                position: 2
            }
        );

        let no_products = parse_equation("A → ").unwrap_err();
        assert_eq!(
            no_products.kind,
            ParseErrorKind::EmptyTerm {
                side: Side::Products,
                position: 1
            }
        );
    }

    #[test]
    fn side_helpers() {
        let t = parse_equation("A* + * → B*").unwrap();
        assert_eq!(t.reactants.len(), 2);
        assert_eq!(t.products.len(), 1);
        assert_eq!(t.reactants.slot(5), "");
        assert_eq!(t.reactants.to_string(), "{A*}+{*}");
        assert_eq!(bare_name("{A*}"), "A*");
        assert!(is_surface_term("{*}"));
        assert!(!is_surface_term("{CO2}"));
    }
}
