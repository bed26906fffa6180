/*
 * section.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Section body collection and replay.
//!
//! When a section opens, its value is resolved immediately and the raw body
//! text is collected byte for byte, nested tags included, until the matching
//! close tag. The body is then re-scanned by a fresh [`Machine`] once for each
//! repetition the value calls for.

use crate::delimiters::Delimiters;
use crate::error::{MustacheError, MustacheResult};
use crate::machine::{Env, Machine};
use crate::value::is_truthy;
use serde_json::Value;

/// A section whose body is being collected.
#[derive(Debug)]
pub(crate) struct Section<'a> {
    /// Open section names, outermost first. Never empty while collecting.
    names: Vec<String>,
    inverted: bool,
    value: Option<&'a Value>,
    /// Delimiters in effect right after the opening tag.
    delimiters: Delimiters,
    /// The opening tag stood alone, so the body starts on a fresh line.
    starts_line: bool,
    body: Vec<u8>,
}

impl<'a> Section<'a> {
    pub(crate) fn open(
        name: &str,
        inverted: bool,
        value: Option<&'a Value>,
        delimiters: Delimiters,
        starts_line: bool,
    ) -> Self {
        Self {
            names: vec![name.to_string()],
            inverted,
            value,
            delimiters,
            starts_line,
            body: Vec::new(),
        }
    }

    /// Name of the outermost section.
    pub(crate) fn name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }

    /// How many sections (this one plus nested ones) are currently open.
    pub(crate) fn open_count(&self) -> usize {
        self.names.len()
    }

    /// A nested section opened inside the body.
    pub(crate) fn enter(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    /// A section closed inside the body. Returns `true` when it was the
    /// outermost one, i.e. the body is complete.
    pub(crate) fn leave(&mut self, name: &str) -> MustacheResult<bool> {
        let Some(expected) = self.names.last() else {
            return Err(MustacheError::UnopenedSection {
                name: name.to_string(),
            });
        };
        if expected.trim() != name.trim() {
            return Err(MustacheError::MismatchedSection {
                expected: expected.clone(),
                found: name.to_string(),
            });
        }
        self.names.pop();
        Ok(self.names.is_empty())
    }

    pub(crate) fn push_text(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Copy a tag into the body exactly as it appeared in the template.
    pub(crate) fn push_tag(&mut self, delimiters: &Delimiters, raw: &[u8]) {
        self.body.extend_from_slice(delimiters.start());
        self.body.extend_from_slice(raw);
        self.body.extend_from_slice(delimiters.end());
    }

    /// Render the collected body as many times as the section's value asks.
    pub(crate) fn replay(self, env: &mut Env<'a, '_>) -> MustacheResult<()> {
        let truthy = self.value.is_some_and(is_truthy);

        if self.inverted {
            if !truthy {
                tracing::debug!(section = self.name(), "Rendering inverted section");
                return self.render_once(env, None);
            }
            return Ok(());
        }

        match self.value {
            Some(Value::Array(items)) if truthy => {
                tracing::debug!(
                    section = self.name(),
                    iterations = items.len(),
                    "Rendering section"
                );
                for item in items {
                    self.render_once(env, Some(item))?;
                }
                Ok(())
            }
            Some(value) if truthy => {
                tracing::debug!(section = self.name(), iterations = 1, "Rendering section");
                self.render_once(env, Some(value))
            }
            _ => Ok(()),
        }
    }

    fn render_once(&self, env: &mut Env<'a, '_>, scope: Option<&'a Value>) -> MustacheResult<()> {
        if let Some(value) = scope {
            env.stack.push(value);
        }

        let result =
            Machine::resume(self.delimiters.clone(), self.starts_line).run(&self.body, env);

        if scope.is_some() {
            env.stack.pop();
        }
        result
    }
}
