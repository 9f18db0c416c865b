//! Chess study model: a main line with one level of variations, the
//! reducer that edits it, and the import/export formats around it.

pub mod board;
pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod notation;
pub mod reducer;
pub mod rules;
pub mod serializer;
pub mod tree;

pub use error::StudyError;
