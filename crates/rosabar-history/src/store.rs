//! The local history store.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Datelike;
use rosabar_codec::{encode_bars, read_stored_bars};
use rosabar_types::{Bar, Category, FxtDay, Result, Timeframe};
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes a file so that no partial content is ever visible at `path`.
///
/// The data goes to a temporary file in the target directory which then
/// replaces `path`. Missing parent directories are created.
///
/// # Errors
///
/// Returns an I/O error if the directory, temporary file or rename fails.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), bytes = data.len(), "file written");
    Ok(())
}

/// On-disk layout of the local bar history.
///
/// Day files live at
/// `{root}/history/rosatrader/{category}/{SYMBOL}/{yyyy}/{mm}/{dd}/{TF}.bin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    /// Creates a store rooted at the given storage directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory of a symbol's history.
    #[must_use]
    pub fn symbol_dir(&self, category: Category, symbol: &str) -> PathBuf {
        self.root
            .join("history")
            .join("rosatrader")
            .join(category.as_str())
            .join(symbol.to_uppercase())
    }

    /// Returns the path of a day file.
    #[must_use]
    pub fn day_file(&self, category: Category, symbol: &str, day: FxtDay, timeframe: Timeframe) -> PathBuf {
        let mut path = self.symbol_dir(category, symbol);
        if let Some(date) = day.date() {
            path.push(format!("{:04}", date.year()));
            path.push(format!("{:02}", date.month()));
            path.push(format!("{:02}", date.day()));
        } else {
            path.push(day.index().to_string());
        }
        path.push(format!("{}.bin", timeframe.as_str().to_uppercase()));
        path
    }

    /// Returns true if a day file exists.
    #[must_use]
    pub fn exists(&self, category: Category, symbol: &str, day: FxtDay, timeframe: Timeframe) -> bool {
        self.day_file(category, symbol, day, timeframe).is_file()
    }

    /// Loads a stored day, or `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or is malformed.
    pub fn load_day(
        &self,
        category: Category,
        symbol: &str,
        day: FxtDay,
        timeframe: Timeframe,
    ) -> Result<Option<Vec<Bar>>> {
        let path = self.day_file(category, symbol, day, timeframe);
        match fs::read(&path) {
            Ok(data) => read_stored_bars(&data).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stores a day atomically, replacing an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`rosabar_types::HistoryError::InvalidBar`] if a bar is invalid
    /// and an I/O error if writing fails.
    pub fn save_day(
        &self,
        category: Category,
        symbol: &str,
        day: FxtDay,
        timeframe: Timeframe,
        bars: &[Bar],
    ) -> Result<PathBuf> {
        let data = encode_bars(bars)?;
        let path = self.day_file(category, symbol, day, timeframe);
        atomic_write(&path, &data)?;
        Ok(path)
    }
}
