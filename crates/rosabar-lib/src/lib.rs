//! Dukascopy M1 bar history and synthetic FX indexes.
//!
//! This is a facade crate that re-exports functionality from the rosabar
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use rosabar_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let instrument = InstrumentRegistry::global().require("audusd")?;
//!     let client = DownloadClient::with_defaults()?;
//!     let mut run = UpdateRun::new(instrument, Timeframe::Minute1)?;
//!     let day = FxtDay::from_date(chrono::NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
//!
//!     for (price_type, gmt_day) in run.required_files(day)? {
//!         let date = gmt_day.date().unwrap();
//!         if let Some(data) = fetch_candles(&client, instrument.symbol(), price_type, date).await? {
//!             run.process_vendor_day(price_type, gmt_day, &data)?;
//!         }
//!     }
//!     let bars = run.merge_day(day)?;
//!     let bytes = run.save_day(day, &bars)?;
//!     run.finish_day(day);
//!     println!("{} bars, {} bytes", bars.len(), bytes.len());
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rosasurfer/rosabar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use rosabar_types::*;

pub use rosabar_instruments::InstrumentRegistry;

pub use rosabar_codec::{
    DecodeContext, DecodedBars, HistoryStart, decode_bars, decode_bars_checked,
    decode_history_start_section, decode_history_starts, decode_ticks, encode_bars,
    read_stored_bars, stored_bar_count,
};

pub use rosabar_time::{
    AlignedDay, Fxt, TimezoneRules, Transition, TransitionTable, align_bars, align_daily, fxt_time,
    to_local_time,
};

pub use rosabar_history::{
    BoundedCache, DEFAULT_CACHE_CAPACITY, DayBarBuffer, HistoryStartCache, HistoryStore,
    UpdateConfig, UpdateRun, atomic_write, merge, merge_day, process_vendor_day, save_day,
};

#[cfg(feature = "fetch")]
pub use rosabar_fetch::{
    ClientConfig, DecompressError, DownloadClient, DownloadError, decompress, decompress_bi5,
    fetch_all_history_starts, fetch_candles, fetch_history_start, is_lzma, url,
};

#[cfg(feature = "synthetic")]
pub use rosabar_synthetic::{
    ComponentHistory, ComponentSet, FormulaRegistry, InMemoryHistory, StoredHistory,
    SyntheticComposer, SyntheticFormula, compute_synthetic_day,
};

/// Prelude module for convenient imports.
///
/// ```
/// use rosabar_lib::prelude::*;
/// ```
pub mod prelude {
    pub use rosabar_types::{
        Bar, Category, DateRange, FxtDay, HistoryError, Instrument, PriceBar, PriceType, Result,
        Timeframe,
    };

    pub use rosabar_instruments::InstrumentRegistry;

    pub use rosabar_codec::{decode_bars, encode_bars, read_stored_bars};

    pub use rosabar_history::{HistoryStore, UpdateRun, merge_day, process_vendor_day, save_day};

    #[cfg(feature = "fetch")]
    pub use rosabar_fetch::{ClientConfig, DownloadClient, fetch_candles};

    #[cfg(feature = "synthetic")]
    pub use rosabar_synthetic::{ComponentHistory, SyntheticComposer, compute_synthetic_day};
}
