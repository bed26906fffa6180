/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The context stack used for name resolution.
//!
//! The bottom frame is the root data value and is never popped. Each section
//! iteration pushes the value it is rendering against; names are resolved by
//! scanning from the most recent frame down to the root.

use serde_json::Value;

/// An ordered stack of borrowed data scopes, most recent last.
#[derive(Debug, Clone)]
pub struct ContextStack<'a> {
    frames: Vec<&'a Value>,
}

impl<'a> ContextStack<'a> {
    /// Create a stack whose only frame is the root data value.
    pub fn new(root: &'a Value) -> Self {
        Self { frames: vec![root] }
    }

    /// Push a new innermost scope.
    pub fn push(&mut self, value: &'a Value) {
        self.frames.push(value);
    }

    /// Pop the innermost scope. The root frame is never removed.
    pub fn pop(&mut self) -> Option<&'a Value> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// The innermost scope (what `.` refers to).
    pub fn top(&self) -> &'a Value {
        self.frames[self.frames.len() - 1]
    }

    /// Number of frames, including the root.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Resolve a (possibly dotted) name.
    ///
    /// The first segment is looked up in the innermost object frame that has
    /// it; the remaining segments must then resolve strictly inside that value.
    /// A broken chain yields `None` and never falls back to outer frames.
    pub fn lookup(&self, name: &str) -> Option<&'a Value> {
        if name == "." {
            return Some(self.top());
        }

        let mut segments = name.split('.');
        let first = segments.next()?;
        let mut value = self
            .frames
            .iter()
            .rev()
            .copied()
            .find_map(|frame| frame.as_object()?.get(first))?;

        for segment in segments {
            value = value.as_object()?.get(segment)?;
        }
        Some(value)
    }
}
