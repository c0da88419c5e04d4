//! `inidot` is a "document-oriented" parser and API for an INI dialect with
//! nested sections and typed values. It preserves comments and entry order,
//! so a config file can be loaded, modified programmatically, and written
//! back without losing its documentation.
//!
//! The format looks like this:
//!
//! ```text
//! # how to reach the database
//! [database]
//! host = 'db.internal'
//! port = 5432
//!
//! [[pool]]
//! # keep this below the server-side cap
//! max_connections = 10
//! timeouts = (1.5, 30.0)
//! ```
//!
//! Section headers nest by bracket count: `[a]` opens a top-level section,
//! `[[b]]` a subsection of the section above it, and so on. Values on the
//! right of `=` are restricted Python-style literals: strings, byte-strings,
//! integers (decimal, hex, octal, binary), floats, `True`/`False`/`None`,
//! and arbitrarily nested lists, tuples, dicts, and sets thereof. Nothing is
//! ever evaluated; `2 + 2` is a parse error, not `4`.
//!
//! Comment lines (`#` or `;`) attach to the item or section directly below
//! them, and a blank line breaks that attachment.
//!
//! # Example
//!
//! ```rust
//! use inidot::{IniContainer, IniValue};
//!
//! # fn main() -> miette::Result<()> {
//! let mut config: IniContainer = r#"
//! ## how to reach the database
//! [database]
//! host = 'db.internal'
//! port = 5432
//! "#.parse()?;
//!
//! let db = config.get_section_mut("database").unwrap();
//! assert_eq!(db.get_value("port"), Some(&IniValue::Integer(5432)));
//! db.set_value("port", 6432);
//!
//! assert_eq!(
//!     config.to_string(),
//!     "# how to reach the database\n[database]\nhost = 'db.internal'\nport = 6432\n"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Layering one config over another (user settings over packaged defaults)
//! is done with [`IniContainer::update`] and tuned with [`UpdateOptions`].
//!
//! # Error reporting
//!
//! Parse errors implement [`miette::Diagnostic`], with a span into the
//! source text. Enable `miette`'s `"fancy"` feature in your application to
//! render them with source snippets.
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod container;
mod error;
mod item;
mod merge;
mod parser;
mod value;

pub use container::*;
pub use error::*;
pub use item::*;
pub use merge::*;
pub use value::*;
