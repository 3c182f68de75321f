pub mod complex;
pub mod compression;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod format;
pub mod grid;
pub mod header;
pub mod reader;
