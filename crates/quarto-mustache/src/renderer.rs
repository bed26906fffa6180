/*
 * renderer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The incremental rendering entry point.

use crate::context::ContextStack;
use crate::error::MustacheResult;
use crate::machine::{Env, Machine};
use crate::output::{Indentation, Output};
use crate::resolver::PartialResolver;
use serde_json::Value;
use std::io::Write;

/// Configuration for a render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    max_partial_depth: usize,
}

impl RenderOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            max_partial_depth: 50,
        }
    }

    /// Set the maximum partial nesting depth.
    ///
    /// Rendering fails with [`crate::MustacheError::PartialDepthExceeded`]
    /// instead of recursing further, which stops self-referential partials.
    pub fn with_max_partial_depth(mut self, depth: usize) -> Self {
        self.max_partial_depth = depth;
        self
    }

    pub fn max_partial_depth(&self) -> usize {
        self.max_partial_depth
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A render in progress.
///
/// Feed the template with any number of [`Renderer::render_some`] calls,
/// split wherever is convenient, then call [`Renderer::finish`] once. The
/// output is the same however the template was split.
///
/// # Example
///
/// ```
/// use quarto_mustache::{NullResolver, Renderer};
/// use serde_json::json;
///
/// let data = json!({"name": "World"});
/// let mut out = Vec::new();
///
/// let mut renderer = Renderer::new(&data, &NullResolver);
/// renderer.render_some("Hello, {", &mut out)?;
/// renderer.render_some("{name}}!", &mut out)?;
/// renderer.finish(&mut out)?;
///
/// assert_eq!(out, b"Hello, World!");
/// # Ok::<(), quarto_mustache::MustacheError>(())
/// ```
pub struct Renderer<'a> {
    stack: ContextStack<'a>,
    partials: &'a dyn PartialResolver,
    options: RenderOptions,
    indentation: Indentation,
    machine: Machine<'a>,
}

impl<'a> Renderer<'a> {
    /// Create a renderer for `data`, expanding partials from `partials`.
    pub fn new(data: &'a Value, partials: &'a dyn PartialResolver) -> Self {
        Self::with_options(data, partials, RenderOptions::default())
    }

    /// Create a renderer with explicit options.
    pub fn with_options(
        data: &'a Value,
        partials: &'a dyn PartialResolver,
        options: RenderOptions,
    ) -> Self {
        Self {
            stack: ContextStack::new(data),
            partials,
            options,
            indentation: Indentation::new(),
            machine: Machine::new(),
        }
    }

    /// Render the next piece of the template into `out`.
    ///
    /// Pieces may split the template anywhere, including inside tags,
    /// delimiters and multi-byte characters.
    pub fn render_some<W: Write>(
        &mut self,
        chunk: impl AsRef<[u8]>,
        out: &mut W,
    ) -> MustacheResult<()> {
        let mut env = Env {
            stack: &mut self.stack,
            partials: self.partials,
            options: &self.options,
            output: Output::new(out, &mut self.indentation),
            partial_depth: 0,
        };
        self.machine.feed(chunk.as_ref(), &mut env)
    }

    /// Signal end of input and flush everything still held back.
    pub fn finish<W: Write>(mut self, out: &mut W) -> MustacheResult<()> {
        let mut env = Env {
            stack: &mut self.stack,
            partials: self.partials,
            options: &self.options,
            output: Output::new(out, &mut self.indentation),
            partial_depth: 0,
        };
        self.machine.finish(&mut env)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MustacheError;
    use crate::resolver::NullResolver;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render_chunks(chunks: &[&str], data: &Value, partials: &dyn PartialResolver) -> String {
        let mut out = Vec::new();
        let mut renderer = Renderer::new(data, partials);
        for chunk in chunks {
            renderer.render_some(chunk, &mut out).unwrap();
        }
        renderer.finish(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn render_str(template: &str, data: &Value, partials: &dyn PartialResolver) -> String {
        render_chunks(&[template], data, partials)
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(render_str("no-tags", &json!({}), &NullResolver), "no-tags");
        assert_eq!(
            render_str("  indented\n\n  \t\n", &json!({}), &NullResolver),
            "  indented\n\n  \t\n"
        );
    }

    #[test]
    fn test_split_inside_tag() {
        let data = json!({"name": "World"});
        assert_eq!(
            render_chunks(&["Hello, {", "{na", "me}", "}!"], &data, &NullResolver),
            "Hello, World!"
        );
    }

    #[test]
    fn test_split_inside_multibyte_character() {
        let template = "«{{x}}» — ok";
        let bytes = template.as_bytes();
        let data = json!({"x": "é"});
        let mut out = Vec::new();
        let mut renderer = Renderer::new(&data, &NullResolver);
        for byte in bytes {
            renderer.render_some([*byte], &mut out).unwrap();
        }
        renderer.finish(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "«é» — ok");
    }

    #[test]
    fn test_incomplete_input_is_flushed_literally() {
        let data = json!({});
        assert_eq!(render_str("a {", &data, &NullResolver), "a {");
        assert_eq!(render_str("a {{", &data, &NullResolver), "a {{");
        assert_eq!(render_str("a {{name", &data, &NullResolver), "a {{name");
        assert_eq!(render_str("a {{name}", &data, &NullResolver), "a {{name}");
        assert_eq!(render_str("  {{b", &data, &NullResolver), "  {{b");
    }

    #[test]
    fn test_trailing_whitespace_is_kept() {
        assert_eq!(render_str("a\n  ", &json!({}), &NullResolver), "a\n  ");
    }

    #[test]
    fn test_close_without_open_is_an_error() {
        let data = json!({});
        let mut out = Vec::new();
        let mut renderer = Renderer::new(&data, &NullResolver);
        let err = renderer.render_some("x{{/a}}y", &mut out).unwrap_err();
        assert!(matches!(err, MustacheError::UnopenedSection { ref name } if name == "a"));
        assert_eq!(out, b"x");
    }

    #[test]
    fn test_unclosed_section_is_reported_at_finish() {
        let data = json!({"a": true});
        let mut out = Vec::new();
        let mut renderer = Renderer::new(&data, &NullResolver);
        renderer.render_some("before {{#a}}inside", &mut out).unwrap();
        let err = renderer.finish(&mut out).unwrap_err();
        assert!(matches!(err, MustacheError::UnclosedSection { ref name } if name == "a"));
        assert_eq!(out, b"before ");
    }

    #[test]
    fn test_partial_depth_limit() {
        let partials = json!({"loop": "x{{>loop}}"});
        let options = RenderOptions::new().with_max_partial_depth(3);
        let data = json!({});
        let mut out = Vec::new();
        let mut renderer = Renderer::with_options(&data, &partials, options);
        let err = renderer.render_some("-{{>loop}}", &mut out).unwrap_err();
        assert!(matches!(
            err,
            MustacheError::PartialDepthExceeded { ref name, max_depth: 3 } if name == "loop"
        ));
        assert_eq!(out, b"-xxx");
    }

    #[test]
    fn test_default_options() {
        assert_eq!(RenderOptions::default().max_partial_depth(), 50);
    }
}
