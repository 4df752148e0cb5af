//! CLI command implementations.

pub(crate) mod decode;
pub(crate) mod history_start;
pub(crate) mod list;
pub(crate) mod synthetic;
pub(crate) mod update;
