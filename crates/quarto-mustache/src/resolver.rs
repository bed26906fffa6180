/*
 * resolver.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Partial template resolution.
//!
//! This module provides the [`PartialResolver`] trait and implementations for
//! looking up partial templates by name from various sources (JSON objects,
//! maps, the filesystem).

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

/// Trait for looking up partial templates.
///
/// The table is consulted every time a `{{> name}}` tag is expanded and must
/// not change for the duration of a render.
pub trait PartialResolver {
    /// Look up a partial template by its (trimmed) name.
    ///
    /// # Returns
    /// The partial template text, or `None` if there is no such partial. A
    /// missing partial expands to nothing.
    fn get_partial(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// A JSON object mapping names to template strings.
///
/// Entries that are not strings are treated as missing; any other kind of
/// value has no partials at all.
impl PartialResolver for Value {
    fn get_partial(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.get(name)? {
            Value::String(s) => Some(Cow::Borrowed(s)),
            _ => None,
        }
    }
}

impl PartialResolver for Map<String, Value> {
    fn get_partial(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.get(name)? {
            Value::String(s) => Some(Cow::Borrowed(s)),
            _ => None,
        }
    }
}

impl<S: BuildHasher> PartialResolver for HashMap<String, String, S> {
    fn get_partial(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|s| Cow::Borrowed(s.as_str()))
    }
}

impl PartialResolver for BTreeMap<String, String> {
    fn get_partial(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|s| Cow::Borrowed(s.as_str()))
    }
}

/// Resolver that has no partials.
///
/// Use this resolver when rendering templates that don't use partials.
#[derive(Debug, Clone, Default)]
pub struct NullResolver;

impl PartialResolver for NullResolver {
    fn get_partial(&self, _name: &str) -> Option<Cow<'_, str>> {
        None
    }
}

/// Resolver that holds partials in memory.
///
/// Useful for tests and for templates bundled into the application.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    partials: HashMap<String, String>,
}

impl MemoryResolver {
    /// Create a new empty memory resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a partial to the resolver.
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.partials.insert(name.into(), content.into());
        self
    }

    /// Create a resolver with the given partials.
    pub fn with_partials(
        partials: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        let mut resolver = Self::new();
        for (name, content) in partials {
            resolver.add(name, content);
        }
        resolver
    }
}

impl PartialResolver for MemoryResolver {
    fn get_partial(&self, name: &str) -> Option<Cow<'_, str>> {
        self.partials.get(name).map(|s| Cow::Borrowed(s.as_str()))
    }
}

/// Resolver that reads partials from a directory.
///
/// A partial name without an extension gets the resolver's extension
/// (`mustache` by default); a name with an extension is used as-is. Files that
/// cannot be read resolve to nothing.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    directory: PathBuf,
    extension: String,
}

impl FileSystemResolver {
    /// Create a resolver rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            extension: "mustache".to_string(),
        }
    }

    /// Use a different default extension (without the leading dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// The path a partial name resolves to.
    pub fn partial_path(&self, name: &str) -> PathBuf {
        resolve_partial_path(name, &self.directory, &self.extension)
    }
}

impl PartialResolver for FileSystemResolver {
    fn get_partial(&self, name: &str) -> Option<Cow<'_, str>> {
        let path = self.partial_path(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(Cow::Owned(content)),
            Err(err) => {
                tracing::trace!(partial = name, path = %path.display(), error = %err, "Partial not readable");
                None
            }
        }
    }
}

/// Resolve the path to a partial file.
///
/// 1. If the partial name has an extension: use it as-is
/// 2. Otherwise: append `default_extension` (if non-empty)
/// 3. The directory is always `directory`
pub fn resolve_partial_path(name: &str, directory: &Path, default_extension: &str) -> PathBuf {
    let path = directory.join(name);
    if Path::new(name).extension().is_some() || default_extension.is_empty() {
        path
    } else {
        path.with_extension(default_extension)
    }
}
