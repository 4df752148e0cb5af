//! Synthetic currency index calculation for rosabar.
//!
//! - [`FormulaRegistry`] - Formula identifiers mapped to their component sets
//! - [`ComponentHistory`] - Access to component history
//! - [`SyntheticComposer`] - Computes one day of a synthetic instrument

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rosasurfer/rosabar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod composer;
mod formula;
mod source;

pub use composer::{SyntheticComposer, compute_synthetic_day};
pub use formula::{ComponentSet, Evaluate, FormulaRegistry, SyntheticFormula};
pub use source::{ComponentHistory, InMemoryHistory, StoredHistory};
