pub mod composer;
pub mod config;
pub mod diff;
pub mod driver;
pub mod edit;
pub mod error;
pub mod extractor;
pub mod imports;
pub mod locator;
pub mod migrator;
pub mod report;
pub mod source_file;
pub mod synthesizer;
pub mod syntax;


pub use config::MigrationConfig;
pub use error::{MigrateError, SkipReason};
pub use migrator::{MigrationReport, migrate_source};
