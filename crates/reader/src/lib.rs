//! Reader for DDF datasets served by a Big Waffle service.
//!
//! Builds request URLs for a dataset, hands them to a [`Transport`], and turns
//! the service's tabular responses into keyed [`Record`]s using caller-supplied
//! per-field parsers.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies. HTTP is
//! performed by whatever implements [`Transport`]; the `transport` crate
//! provides the `reqwest` implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`DatasetId`, `Version`, `AssetPath`) |
//! | [`config`] | [`ReaderOptions`] and the validated [`ReaderConfig`] |
//! | [`types`] | Wire body [`TabularResult`], [`Record`], [`Asset`] |
//! | [`parsers`] | [`ParserRegistry`] and stock field parsers |
//! | [`reshape`] | Row-to-record decoding |
//! | [`transport`] | The [`Transport`] port |
//! | [`client`] | [`BigWaffleReader`] and the [`DdfReader`] trait |
//! | [`errors`] | [`ReaderError`] |
//!
//! ## Example
//!
//! ```no_run
//! # async fn run(transport: std::sync::Arc<dyn reader::Transport>) -> Result<(), reader::ReaderError> {
//! use reader::{parsers::parse_int, BigWaffleReader, ParserRegistry, ReaderConfig, ReaderOptions};
//! use serde_json::json;
//!
//! let config = ReaderConfig::try_from(ReaderOptions::default())?;
//! let reader = BigWaffleReader::new(config, transport);
//!
//! let query = json!({
//!     "select": { "key": ["geo", "time"], "value": ["population_total"] },
//!     "from": "datapoints",
//!     "where": { "geo": { "$in": ["usa", "swe"] } }
//! });
//! let parsers = ParserRegistry::new().with("time", parse_int);
//! for record in reader.read(&query, &parsers).await? {
//!     println!("{:?}", record.get("population_total"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod identifiers;
pub mod parsers;
pub mod reshape;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use client::{BigWaffleReader, DdfReader};
pub use config::{ReaderConfig, ReaderOptions, DEFAULT_DATASET, DEFAULT_SERVICE};
pub use errors::ReaderError;
pub use identifiers::{AssetPath, DatasetId, Version};
pub use parsers::{FieldParser, ParserRegistry};
pub use reshape::decode_rows;
pub use transport::{Transport, TransportResponse};
pub use types::{Asset, Record, TabularResult};
