pub mod api;
pub mod api_docs;
pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod modules;
pub mod services;
pub mod utils;

pub use infrastructure::config;
pub use infrastructure::db;
pub use infrastructure::server;
pub use modules::import;
pub use modules::integrations::google_books;
pub use modules::integrations::openlibrary;
