//! Instrument registry for the rosabar bar history toolkit.
//!
//! This crate provides access to the instruments rosabar knows about, with
//! their quote digits, Dukascopy symbol mapping and M1 history start.
//!
//! # Example
//!
//! ```
//! use rosabar_instruments::InstrumentRegistry;
//!
//! let registry = InstrumentRegistry::global();
//!
//! // Lookup by symbol
//! if let Some(instrument) = registry.get("eurusd") {
//!     println!("{}: {} digits", instrument.symbol(), instrument.digits());
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rosasurfer/rosabar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::OnceLock;

use rosabar_types::{Category, HistoryError, Instrument, Result};

/// The instrument metadata JSON embedded at compile time.
const INSTRUMENTS_JSON: &str = include_str!("../data/instruments.json");

/// Global instrument registry instance.
static REGISTRY: OnceLock<InstrumentRegistry> = OnceLock::new();

/// Registry of all known instruments, keyed by lower-case symbol.
#[derive(Debug)]
pub struct InstrumentRegistry {
    instruments: HashMap<String, Instrument>,
}

impl InstrumentRegistry {
    /// Returns the global instrument registry.
    ///
    /// The registry is initialized lazily on first access.
    #[must_use]
    pub fn global() -> &'static Self {
        REGISTRY.get_or_init(Self::load)
    }

    /// Loads instruments from the embedded JSON data.
    fn load() -> Self {
        Self::from_json(INSTRUMENTS_JSON).expect("Invalid instruments.json")
    }

    /// Builds a registry from a JSON object mapping lower-case symbols to instruments.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self> {
        let instruments: HashMap<String, Instrument> = serde_json::from_str(json)?;
        Ok(Self { instruments })
    }

    /// Looks up an instrument by symbol (case-insensitive).
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.get(&symbol.to_lowercase())
    }

    /// Looks up an instrument by symbol, failing for unknown symbols.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UnknownInstrument`] if the symbol is not registered.
    pub fn require(&self, symbol: &str) -> Result<&Instrument> {
        self.get(symbol)
            .ok_or_else(|| HistoryError::UnknownInstrument(symbol.to_string()))
    }

    /// Returns all instruments as an iterator.
    pub fn all(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.values()
    }

    /// Returns the total number of instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Returns all instruments published by Dukascopy, sorted by symbol.
    pub fn dukascopy_mapped(&self) -> Vec<&Instrument> {
        let mut mapped: Vec<&Instrument> = self
            .instruments
            .values()
            .filter(|i| i.dukascopy_symbol().is_some())
            .collect();
        mapped.sort_by(|a, b| a.symbol().cmp(b.symbol()));
        mapped
    }

    /// Returns all synthetic instruments.
    pub fn synthetic(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.values().filter(|i| i.is_synthetic())
    }

    /// Returns instruments matching the given category.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Instrument> {
        self.instruments
            .values()
            .filter(move |i| i.category() == category)
    }

    /// Searches instruments by symbol or description (case-insensitive).
    pub fn search(&self, pattern: &str) -> Vec<&Instrument> {
        let pattern = pattern.to_lowercase();
        self.instruments
            .values()
            .filter(|i| {
                i.symbol().to_lowercase().contains(&pattern)
                    || i.description().to_lowercase().contains(&pattern)
            })
            .collect()
    }

    /// Returns all symbols sorted alphabetically.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.instruments.values().map(Instrument::symbol).collect();
        symbols.sort_unstable();
        symbols
    }
}
