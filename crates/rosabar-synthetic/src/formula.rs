//! Synthetic instrument formulas.

use std::collections::HashMap;

/// Evaluates a formula over component prices, given in component order.
pub type Evaluate = fn(&[f64]) -> f64;

/// One way of computing a synthetic instrument.
#[derive(Debug, Clone, Copy)]
pub enum ComponentSet {
    /// Fewest components, typically built on another index.
    Fast {
        /// Component symbols.
        symbols: &'static [&'static str],
        /// The formula.
        evaluate: Evaluate,
    },
    /// Built on the USD majors.
    Majors {
        /// Component symbols.
        symbols: &'static [&'static str],
        /// The formula.
        evaluate: Evaluate,
    },
    /// Built on the crosses of the index currency.
    Crosses {
        /// Component symbols.
        symbols: &'static [&'static str],
        /// The formula.
        evaluate: Evaluate,
    },
}

impl ComponentSet {
    /// Returns the set name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fast { .. } => "fast",
            Self::Majors { .. } => "majors",
            Self::Crosses { .. } => "crosses",
        }
    }

    /// Returns the component symbols.
    #[must_use]
    pub const fn symbols(&self) -> &'static [&'static str] {
        match *self {
            Self::Fast { symbols, .. } | Self::Majors { symbols, .. } | Self::Crosses { symbols, .. } => {
                symbols
            }
        }
    }

    /// Evaluates the formula for prices given in the order of [`Self::symbols`].
    #[must_use]
    pub fn evaluate(&self, prices: &[f64]) -> f64 {
        match *self {
            Self::Fast { evaluate, .. } | Self::Majors { evaluate, .. } | Self::Crosses { evaluate, .. } => {
                evaluate(prices)
            }
        }
    }
}

/// A synthetic instrument: its quote digits and equivalent component sets in
/// order of preference.
#[derive(Debug, Clone)]
pub struct SyntheticFormula {
    /// Formula identifier, the synthetic symbol.
    pub id: &'static str,
    /// Quote digits of the result.
    pub digits: u8,
    /// Component sets, preferred first.
    pub sets: &'static [ComponentSet],
}

impl SyntheticFormula {
    /// Returns the point size of the result.
    #[must_use]
    pub fn point(&self) -> f64 {
        10f64.powi(-i32::from(self.digits))
    }

    /// Returns all symbols any component set refers to, sorted and deduplicated.
    #[must_use]
    pub fn all_components(&self) -> Vec<&'static str> {
        let mut symbols: Vec<_> = self.sets.iter().flat_map(ComponentSet::symbols).copied().collect();
        symbols.sort_unstable();
        symbols.dedup();
        symbols
    }
}

/// Maps formula identifiers to formulas.
#[derive(Debug, Clone)]
pub struct FormulaRegistry {
    formulas: HashMap<&'static str, SyntheticFormula>,
}

impl FormulaRegistry {
    /// Creates a registry with the built-in formulas.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(SyntheticFormula {
            id: "USDLFX",
            digits: 5,
            sets: USDLFX,
        });
        registry.register(SyntheticFormula {
            id: "AUDFXI",
            digits: 5,
            sets: AUDFXI,
        });
        registry.register(SyntheticFormula {
            id: "NZDFX7",
            digits: 5,
            sets: NZDFX7,
        });
        registry
    }

    /// Creates a registry without formulas.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            formulas: HashMap::new(),
        }
    }

    /// Adds or replaces a formula.
    pub fn register(&mut self, formula: SyntheticFormula) {
        self.formulas.insert(formula.id, formula);
    }

    /// Looks up a formula (case-insensitive).
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SyntheticFormula> {
        self.formulas.get(id.to_uppercase().as_str())
    }

    /// Returns all formula identifiers, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.formulas.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for FormulaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const USDLFX: &[ComponentSet] = &[ComponentSet::Majors {
    symbols: &["AUDUSD", "EURUSD", "GBPUSD", "USDCAD", "USDCHF", "USDJPY"],
    evaluate: usdlfx_majors,
}];

const AUDFXI: &[ComponentSet] = &[
    ComponentSet::Fast {
        symbols: &["AUDUSD", "USDLFX"],
        evaluate: audfxi_fast,
    },
    ComponentSet::Majors {
        symbols: &["AUDUSD", "EURUSD", "GBPUSD", "USDCAD", "USDCHF", "USDJPY"],
        evaluate: audfxi_majors,
    },
    ComponentSet::Crosses {
        symbols: &["AUDCAD", "AUDCHF", "AUDJPY", "AUDUSD", "EURAUD", "GBPAUD"],
        evaluate: audfxi_crosses,
    },
];

const NZDFX7: &[ComponentSet] = &[
    ComponentSet::Fast {
        symbols: &["NZDUSD", "USDLFX"],
        evaluate: nzdfx7_fast,
    },
    ComponentSet::Majors {
        symbols: &["AUDUSD", "EURUSD", "GBPUSD", "NZDUSD", "USDCAD", "USDCHF", "USDJPY"],
        evaluate: nzdfx7_majors,
    },
    ComponentSet::Crosses {
        symbols: &["AUDNZD", "EURNZD", "GBPNZD", "NZDCAD", "NZDCHF", "NZDJPY", "NZDUSD"],
        evaluate: nzdfx7_crosses,
    },
];

// Prices arrive in the order of the set's symbols. A wrong arity yields NaN.

fn usdlfx_majors(p: &[f64]) -> f64 {
    match *p {
        [audusd, eurusd, gbpusd, usdcad, usdchf, usdjpy] => {
            (usdcad * usdchf * usdjpy / (audusd * eurusd * gbpusd)).powf(1.0 / 7.0)
        }
        _ => f64::NAN,
    }
}

fn audfxi_fast(p: &[f64]) -> f64 {
    match *p {
        [audusd, usdlfx] => (usdlfx * audusd).powf(7.0 / 6.0),
        _ => f64::NAN,
    }
}

fn audfxi_majors(p: &[f64]) -> f64 {
    match *p {
        [audusd, eurusd, gbpusd, usdcad, usdchf, usdjpy] => {
            (usdcad * usdchf * usdjpy / (eurusd * gbpusd)).powf(1.0 / 6.0) * audusd
        }
        _ => f64::NAN,
    }
}

fn audfxi_crosses(p: &[f64]) -> f64 {
    match *p {
        [audcad, audchf, audjpy, audusd, euraud, gbpaud] => {
            (audcad * audchf * audjpy * audusd / (euraud * gbpaud)).powf(1.0 / 6.0)
        }
        _ => f64::NAN,
    }
}

fn nzdfx7_fast(p: &[f64]) -> f64 {
    match *p {
        [nzdusd, usdlfx] => usdlfx * nzdusd,
        _ => f64::NAN,
    }
}

fn nzdfx7_majors(p: &[f64]) -> f64 {
    match *p {
        [audusd, eurusd, gbpusd, nzdusd, usdcad, usdchf, usdjpy] => {
            (usdcad * usdchf * usdjpy / (audusd * eurusd * gbpusd)).powf(1.0 / 7.0) * nzdusd
        }
        _ => f64::NAN,
    }
}

fn nzdfx7_crosses(p: &[f64]) -> f64 {
    match *p {
        [audnzd, eurnzd, gbpnzd, nzdcad, nzdchf, nzdjpy, nzdusd] => {
            (nzdcad * nzdchf * nzdjpy * nzdusd / (audnzd * eurnzd * gbpnzd)).powf(1.0 / 7.0)
        }
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const AUDUSD: f64 = 0.6612;
    const EURUSD: f64 = 1.0875;
    const GBPUSD: f64 = 1.2701;
    const USDCAD: f64 = 1.3542;
    const USDCHF: f64 = 0.8834;
    const USDJPY: f64 = 149.12;

    fn usdlfx() -> f64 {
        usdlfx_majors(&[AUDUSD, EURUSD, GBPUSD, USDCAD, USDCHF, USDJPY])
    }

    #[test]
    fn test_registry_lookup() {
        let registry = FormulaRegistry::new();
        assert_eq!(registry.ids(), ["AUDFXI", "NZDFX7", "USDLFX"]);
        let audfxi = registry.get("audfxi").unwrap();
        assert_eq!(audfxi.sets.len(), 3);
        assert_eq!(audfxi.sets[0].name(), "fast");
        assert_eq!(audfxi.sets[0].symbols(), ["AUDUSD", "USDLFX"]);
        assert!(registry.get("EURUSD").is_none());
        assert!(FormulaRegistry::empty().ids().is_empty());
    }

    #[test]
    fn test_audfxi_sets_agree() {
        let fast = audfxi_fast(&[AUDUSD, usdlfx()]);
        let majors = audfxi_majors(&[AUDUSD, EURUSD, GBPUSD, USDCAD, USDCHF, USDJPY]);
        assert_relative_eq!(fast, majors, max_relative = 1e-12);
    }

    #[test]
    fn test_nzdfx7_sets_agree() {
        let nzdusd = 0.6104;
        let fast = nzdfx7_fast(&[nzdusd, usdlfx()]);
        let majors = nzdfx7_majors(&[AUDUSD, EURUSD, GBPUSD, nzdusd, USDCAD, USDCHF, USDJPY]);
        assert_relative_eq!(fast, majors, max_relative = 1e-12);
    }

    #[test]
    fn test_audfxi_crosses_agree() {
        let audcad = AUDUSD * USDCAD;
        let audchf = AUDUSD * USDCHF;
        let audjpy = AUDUSD * USDJPY;
        let euraud = EURUSD / AUDUSD;
        let gbpaud = GBPUSD / AUDUSD;
        let crosses = audfxi_crosses(&[audcad, audchf, audjpy, AUDUSD, euraud, gbpaud]);
        let majors = audfxi_majors(&[AUDUSD, EURUSD, GBPUSD, USDCAD, USDCHF, USDJPY]);
        assert_relative_eq!(crosses, majors, max_relative = 1e-12);
    }

    #[test]
    fn test_wrong_arity() {
        assert!(audfxi_fast(&[1.0]).is_nan());
        assert!(AUDFXI[1].evaluate(&[1.0, 2.0]).is_nan());
    }

    #[test]
    fn test_all_components() {
        let registry = FormulaRegistry::new();
        let components = registry.get("NZDFX7").unwrap().all_components();
        assert!(components.contains(&"USDLFX"));
        assert!(components.contains(&"NZDCHF"));
        assert_eq!(components.len(), 14);
    }
}
