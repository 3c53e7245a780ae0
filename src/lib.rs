#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]
//! Reader and writer for INI-style configuration files.
//!
//! ```text
//! ; comments start with ';', '#' or "rem"
//! [server]
//! host = example.org
//! motd: first line
//!   second line
//! ```
//!
//! Options found before the first section header belong to the default section, which is also
//! consulted when an option is missing from the section being queried.

mod config;
mod error;
pub mod parser;
mod section;
mod util;
mod writer;

pub use config::{CaseMode, Config, DEFAULT_SECTION, Format, Options};
pub use error::{Error, ExpandError, GetError};
pub use parser::{Line, Store, classify, parse};
pub use section::Section;
