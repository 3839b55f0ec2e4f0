//! Preload - discover the assets a page references and announce them as
//! `Link: <url>; rel=preload` response headers.
//!
//! # Module Structure
//!
//! ```text
//! preload/
//! ├── asset     # Asset model and HTML scanner
//! ├── manifest  # Path -> assets map, concurrent generation, JSON persistence
//! ├── cache     # Load-once manifest cache
//! ├── preload   # Header synthesis and request middleware
//! ├── serve     # Static file server wired through the middleware
//! ├── cli       # Command-line arguments and subcommands
//! ├── config    # preload.toml
//! ├── logger    # Colored, module-prefixed logging
//! └── utils     # HTML entities, MIME types
//! ```

pub mod asset;
pub mod cache;
pub mod cli;
pub mod config;
pub mod logger;
pub mod manifest;
pub mod preload;
pub mod serve;
pub mod utils;
