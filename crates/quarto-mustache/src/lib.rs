/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Streaming Mustache template renderer for Quarto.
//!
//! Templates are scanned and rendered in a single pass, and the input may be
//! delivered in pieces of any size. It supports:
//!
//! - Variable interpolation: `{{name}}` (HTML-escaped), `{{{name}}}` or `{{&name}}` (raw)
//! - Dotted names: `{{author.name}}`, and `{{.}}` for the current item
//! - Sections: `{{#items}}...{{/items}}`, inverted sections: `{{^items}}...{{/items}}`
//! - Partials: `{{> header}}`, with indentation of standalone partials
//! - Comments: `{{! comment }}`
//! - Delimiter changes: `{{=<% %>=}}`
//!
//! Standalone tags (sections, partials, comments and delimiter changes alone
//! on their line) remove their whole line from the output, as the Mustache
//! specification requires.
//!
//! # Architecture
//!
//! Template data is a [`serde_json::Value`]; anything `Serialize` can be used
//! through [`render_serializable`]. Partials come from a [`PartialResolver`].
//! Output goes to any [`std::io::Write`].
//!
//! # Example
//!
//! ```
//! use quarto_mustache::render_to_string;
//! use serde_json::json;
//!
//! let data = json!({"items": [{"title": "one"}, {"title": "two"}]});
//! let partials = json!({"item": "<li>{{title}}</li>\n"});
//!
//! let output = render_to_string("<ul>\n{{#items}}\n  {{> item}}\n{{/items}}\n</ul>\n", &data, &partials)?;
//! assert_eq!(output, "<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>\n");
//! # Ok::<(), quarto_mustache::MustacheError>(())
//! ```

pub mod context;
pub mod delimiters;
pub mod error;
mod machine;
mod output;
pub mod render;
pub mod renderer;
pub mod resolver;
mod section;
pub mod tag;
pub mod value;

// Re-export main types at crate root
pub use context::ContextStack;
pub use delimiters::Delimiters;
pub use error::{MustacheError, MustacheResult};
pub use render::{render, render_serializable, render_to_string};
pub use renderer::{RenderOptions, Renderer};
pub use resolver::{FileSystemResolver, MemoryResolver, NullResolver, PartialResolver};
pub use tag::Tag;
pub use value::{escape_html, format_double, format_value, is_truthy};
