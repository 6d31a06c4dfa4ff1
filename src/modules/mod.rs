//! Feature modules: external catalogs and the library CSV format

pub mod export;
pub mod import;
pub mod integrations;
