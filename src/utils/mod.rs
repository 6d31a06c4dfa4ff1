pub mod filename;
pub mod isbn;

pub use filename::sanitize_filename;
pub use isbn::normalize_isbn;
