//! GMT to FXT time alignment for the rosabar bar history toolkit.
//!
//! - [`TimezoneRules`] - Source of UTC offsets and transitions
//! - [`Fxt`] - The FXT clock (New York + 7h)
//! - [`TransitionTable`] - Explicit offset rules
//! - [`align_bars`] - Attaches GMT and FXT times to a vendor file's bars

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rosasurfer/rosabar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod align;
mod rules;

pub use align::{AlignedDay, align_bars, align_daily, fxt_time, to_local_time};
pub use rules::{Fxt, TimezoneRules, Transition, TransitionTable};
