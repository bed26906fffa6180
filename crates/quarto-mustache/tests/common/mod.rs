/*
 * common/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Shared helpers for the quarto-mustache integration tests.
 */

#![allow(dead_code)]

use pretty_assertions::assert_eq;
use quarto_mustache::{PartialResolver, Renderer};
use serde_json::Value;

/// Render `template` fed in pieces of at most `chunk_size` bytes.
pub fn render_chunked(
    template: &str,
    data: &Value,
    partials: &dyn PartialResolver,
    chunk_size: usize,
) -> String {
    let mut out = Vec::new();
    let mut renderer = Renderer::new(data, partials);
    for chunk in template.as_bytes().chunks(chunk_size) {
        renderer
            .render_some(chunk, &mut out)
            .unwrap_or_else(|e| panic!("render failed for {:?}: {}", template, e));
    }
    renderer
        .finish(&mut out)
        .unwrap_or_else(|e| panic!("finish failed for {:?}: {}", template, e));
    String::from_utf8(out).expect("invalid utf8")
}

/// Render `template` in one piece.
pub fn render_whole(template: &str, data: &Value, partials: &dyn PartialResolver) -> String {
    render_chunked(template, data, partials, template.len().max(1))
}

/// Check the output of `template` fed whole, and fed in pieces of 1 to 8 bytes.
pub fn assert_renders(template: &str, data: &Value, partials: &dyn PartialResolver, expected: &str) {
    assert_eq!(render_whole(template, data, partials), expected, "template: {:?}", template);

    for chunk_size in 1..=8 {
        assert_eq!(
            render_chunked(template, data, partials, chunk_size),
            expected,
            "template: {:?}, chunk size {}",
            template,
            chunk_size
        );
    }
}
