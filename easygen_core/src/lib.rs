//! `easygen_core` is the core library for the easygen code/text generator.
//! It loads a YAML data file, compiles a template, and renders the template
//! against the data. A small set of identifier case converters is available
//! to every template.
//!
//! ## Processing Pipeline
//!
//! ```text
//! <name>.yaml
//!   → Data loader (YAML document → GenericValue tree)
//! <name>.tmpl or inline template
//!   → Engine (compile in Raw or Markup mode, with case helpers registered)
//!   → Render (buffered; returned only on success)
//! ```
//!
//! ## Modules
//!
//! - [`caser`] — Naming convention conversion (`snake_case`, `kebab-case`,
//!   `lowerCamelCase`, `UpperCamelCase`, `SCREAMING_SNAKE_CASE`).
//! - [`config`] — Run options, engine settings and the optional
//!   `easygen.toml` file.
//! - [`data`] — Loading the YAML data document.
//!
//! ## Key Types
//!
//! - [`Options`] — Immutable options for one generator run.
//! - [`CompiledTemplate`] — A template set compiled in either Raw or Markup
//!   mode.
//! - [`GenericValue`] — The parsed data tree.
//! - [`EasygenError`] — Every failure the generator reports.
//!
//! ## Template Helpers
//!
//! | helper   | converts                                    |
//! | -------- | ------------------------------------------- |
//! | `cls2lc` | `lower_snake_case` → `lowerCamelCase`       |
//! | `cls2uc` | `lower_snake_case` → `UpperCamelCase`       |
//! | `cls2ss` | `lower_snake_case` → `SCREAMING_SNAKE_CASE` |
//! | `ck2lc`  | `kebab-case` → `lowerCamelCase`             |
//! | `ck2uc`  | `kebab-case` → `UpperCamelCase`             |
//! | `ck2ls`  | `kebab-case` → `lower_snake_case`           |
//! | `ck2ss`  | `kebab-case` → `SCREAMING_SNAKE_CASE`       |
//! | `clc2ss` | `lowerCamelCase` → `SCREAMING_SNAKE_CASE`   |
//! | `cuc2ss` | `UpperCamelCase` → `SCREAMING_SNAKE_CASE`   |
//!
//! Each helper works as a filter (`{{ name | cls2uc }}`) or a function
//! (`{{ cls2uc(name) }}`). `minus1` subtracts one from an integer.
//!
//! ## Markup Escaping
//!
//! In markup mode every output of an HTML template is escaped for where it
//! lands. Element text and quoted attributes are HTML-escaped. URL attributes
//! are percent-encoded, and a URL whose scheme is not `http`, `https` or
//! `mailto` is replaced with [`UNSAFE_URL`]. Script blocks and `on*`
//! attributes get JavaScript string or literal escaping. Styles get CSS
//! escaping. Templates named `*.json`, `*.js` or `*.yaml` use JSON escaping
//! instead.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use easygen_core::Options;
//! use easygen_core::generate;
//!
//! // Renders `api.tmpl` against `api.yaml`.
//! let output = generate(&Options::default(), "api").unwrap();
//! print!("{output}");
//! ```

pub use caser::*;
pub use config::*;
pub use data::GenericValue;
pub use engine::*;
pub use error::*;
pub use escape::UNSAFE_URL;
pub use generate::*;

pub mod caser;
pub mod config;
pub mod data;
mod engine;
#[allow(unused_assignments)]
mod error;
mod escape;
mod generate;

#[cfg(test)]
mod __fixtures;
