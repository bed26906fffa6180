/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! One-shot rendering helpers.

use crate::error::MustacheResult;
use crate::renderer::Renderer;
use crate::resolver::PartialResolver;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// Render a complete template into `out`.
pub fn render<W: Write>(
    template: &str,
    out: &mut W,
    data: &Value,
    partials: &dyn PartialResolver,
) -> MustacheResult<()> {
    let mut renderer = Renderer::new(data, partials);
    renderer.render_some(template, out)?;
    renderer.finish(out)
}

/// Render a complete template to a `String`.
pub fn render_to_string(
    template: &str,
    data: &Value,
    partials: &dyn PartialResolver,
) -> MustacheResult<String> {
    let mut out = Vec::with_capacity(template.len());
    render(template, &mut out, data, partials)?;
    Ok(String::from_utf8(out)?)
}

/// Render a complete template against any serializable data.
///
/// The data is converted to a [`Value`] first, so field names become keys and
/// sequences become arrays.
pub fn render_serializable<W: Write, T: Serialize + ?Sized>(
    template: &str,
    out: &mut W,
    data: &T,
    partials: &dyn PartialResolver,
) -> MustacheResult<()> {
    let value = serde_json::to_value(data)?;
    render(template, out, &value, partials)
}
