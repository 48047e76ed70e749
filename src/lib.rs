// Olympic Reconciliation Pipeline - Core Library
// Exposes all modules for use in the CLI and tests

pub mod table;
pub mod dates;
pub mod names;
pub mod records;
pub mod age;
pub mod resolver;
pub mod synthesis;
pub mod tally;
pub mod pipeline;

// Re-export commonly used types
pub use table::{load_table, store_table, ColumnIndex, Table};
pub use dates::{
    format_date, is_addendum_edition, normalize_date, normalize_edition_date,
    normalize_edition_range, DateRange, ADDENDUM_EDITION_LABEL, ADDENDUM_YEAR,
};
pub use names::{format_display_name, normalize_roster_name};
pub use records::{Athlete, Country, Edition, Medal, ResultRow, RosterEntry};
pub use age::{age_at, reference_date};
pub use resolver::EntityResolver;
pub use synthesis::{CatalogEntry, EventSynthesizer, Medallist, SynthesisReport, TeamRoster};
pub use tally::{AggregationEngine, TallyRow};
pub use pipeline::{run, PipelineInputs, PipelineOutputs, RunSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
