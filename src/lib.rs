//! # Tributary
//!
//! Server-side composition of pages from independently served HTML
//! fragments.
//!
//! ## Architecture
//!
//! ```text
//! FetchDefinition → ContentFetcher → ContentLoader → ContentParser → Content
//!                        ↑                                            │
//!                        └──────────── required fragments ───────────┘
//! ```
//!
//! A fragment may declare further fragments it needs. The
//! [`ContentFetcher`](fetcher::ContentFetcher) discovers them as fragments
//! arrive and fetches every distinct fragment exactly once, concurrently.
//! Stylesheet declarations collected from all fragments are reconciled by
//! a [`DeduplicationStrategy`](dedup::DeduplicationStrategy).
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch a layout and everything it requires
//! tributary compose http://localhost:8080/static/layout.html --meta lang=de
//!
//! # Print the fingerprint of a fragment request
//! tributary hash http://localhost:8080/static/layout.html -H "Accept-Language: de"
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: Configuration file handling
//! - [`dedup`]: Stylesheet deduplication strategies
//! - [`domain`]: Fetch definitions, results and content
//! - [`fetcher`]: Concurrent fetching and HTTP loading
//! - [`parser`]: Content parsing by content type

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the loader
/// and the deduplication strategy.
pub mod app;

/// Command-line interface using clap.
///
/// - `compose <url>...` - Fetch fragments and their dependencies
/// - `hash <url>` - Print a fragment fingerprint
pub mod cli;

/// Configuration loaded from `~/.config/tributary/config.toml`.
pub mod config;

/// Reconciliation of duplicate stylesheet and script declarations.
///
/// - [`IdentityDeduplicationStrategy`](dedup::IdentityDeduplicationStrategy): keeps everything
/// - [`SimpleDeduplicationStrategy`](dedup::SimpleDeduplicationStrategy): drops exact repeats
pub mod dedup;

/// Core domain models.
///
/// - [`FetchDefinition`](domain::FetchDefinition): what to fetch, with its SHA256 fingerprint
/// - [`FetchResult`](domain::FetchResult): outcome of one fetch job
/// - [`Content`](domain::Content): a loaded fragment
pub mod domain;

/// Fetching of fragment trees.
///
/// - [`ContentLoader`](fetcher::ContentLoader): Async trait for loading one fragment
/// - [`HttpContentLoader`](fetcher::HttpContentLoader): reqwest-based implementation
/// - [`ContentFetcher`](fetcher::ContentFetcher): Concurrent, deduplicating scheduler
pub mod fetcher;

/// Content parsers, selected by response content type.
///
/// - [`HtmlContentParser`](parser::HtmlContentParser): composable HTML fragments
pub mod parser;
