pub mod config;
pub mod csv_import;
pub mod generator;
pub mod manifest;
pub mod prompt;
pub mod report;
pub mod scanner;

pub use config::Config;
pub use csv_import::{convert, read_csv, read_records, CsvError, CsvRecord};
pub use generator::{generate, GenerateOptions, GenerateOutcome, WriteAction};
pub use manifest::{
    is_current, load_persisted, parse_mapping, save_mapping, PersistedLoad, PersistedStatus,
};
pub use prompt::TerminalResolver;
pub use report::{format_reconcile_report, format_summary};
pub use scanner::{scan_assets, to_discovered, Layout, ScanOptions, ScannedAsset};
