//! Local storage layout: stored history and downloaded vendor files.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rosabar_lib::{BoundedCache, DEFAULT_CACHE_CAPACITY, UpdateConfig, url::candle_file_name};
use rosabar_lib::prelude::*;

/// Returns the default storage root.
///
/// Uses the platform data directory (e.g. `~/.local/share/rosabar/` on
/// Linux) and falls back to `./data`.
pub(crate) fn default_storage() -> PathBuf {
    ProjectDirs::from("", "", "rosabar").map_or_else(
        || PathBuf::from("data"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Paths of a downloaded vendor file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VendorPaths {
    /// The compressed file as downloaded.
    pub(crate) compressed: PathBuf,
    /// Marker written when the vendor has no file for the day.
    pub(crate) missing: PathBuf,
}

/// Storage layout of an update, with a bounded cache of resolved paths.
#[derive(Debug)]
pub(crate) struct Layout {
    store: HistoryStore,
    keep_downloads: bool,
    paths: BoundedCache<(String, PriceType, FxtDay), VendorPaths>,
}

impl Layout {
    pub(crate) fn new(config: &UpdateConfig) -> Self {
        Self {
            store: HistoryStore::new(&config.storage),
            keep_downloads: config.keep_downloads,
            paths: BoundedCache::new(DEFAULT_CACHE_CAPACITY),
        }
    }

    pub(crate) const fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub(crate) const fn keep_downloads(&self) -> bool {
        self.keep_downloads
    }

    /// Returns the paths of the vendor file of a GMT day.
    ///
    /// Vendor files live in the directory of the stored day with the same date.
    pub(crate) fn vendor_paths(&mut self, instrument: &Instrument, price_type: PriceType, day_gmt: FxtDay) -> Option<&VendorPaths> {
        let name = candle_file_name(price_type)?;
        let store = &self.store;
        let key = (instrument.symbol().to_string(), price_type, day_gmt);
        Some(self.paths.get_or_insert_with(key, || {
            let day_file = store.day_file(instrument.category(), instrument.symbol(), day_gmt, Timeframe::Minute1);
            let dir = day_file.parent().map_or_else(PathBuf::new, Path::to_path_buf);
            let compressed = dir.join(&name);
            let missing = compressed.with_extension("404");
            VendorPaths { compressed, missing }
        }))
    }
}
