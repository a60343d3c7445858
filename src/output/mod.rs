//! Output formatters for scan results.
//!
//! - Text tables for interactive review
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use halcyon::error::ExitCode;
//! use halcyon::output::json::JsonReport;
//! use halcyon::scanner::{traverse, ScanOptions};
//! use halcyon::signal::CancellationToken;
//! use std::path::Path;
//!
//! let result = traverse(Path::new("."), &ScanOptions::default(), &CancellationToken::new()).unwrap();
//! let report = JsonReport::new(&result, ExitCode::Success);
//! println!("{}", report.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod table;

pub use json::{JsonOutputError, JsonReport};
pub use table::{render_group, render_heading, render_summary};
