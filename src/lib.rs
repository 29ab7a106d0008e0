//! Combine multi-file OpenAPI YAML documents by resolving `$ref` references.
//!
//! Remote references (`other.yaml#/components/schemas/Pet`) are always
//! materialized: the target is copied into the same place in the combining
//! document and the reference is rewritten to the local pointer. Local
//! references (`#/components/schemas/Pet`) are left alone unless
//! [`ResolveConfig::inline_local`] is set.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use oas_combine::{Document, ResolveConfig};
//!
//! let mut document = Document::read_file(Path::new("api.yaml"))?;
//! oas_combine::resolve(&mut document, &ResolveConfig::default())?;
//! print!("{}", document.to_yaml_string()?);
//! # Ok::<(), oas_combine::Error>(())
//! ```

pub mod config;
pub mod discovery;
pub mod document;
pub mod error;
pub mod location;
pub mod pointer;
pub mod resolve;
pub mod schema;
pub mod tree;

pub use config::ResolveConfig;
pub use document::{Document, Session};
pub use error::Error;
pub use resolve::{resolve, resolve_in};
