/*
 * tag.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Classification of completed tags.
//!
//! The scanner collects the raw text between the delimiters; [`Tag::parse`]
//! decodes it once by its leading sigil.

use crate::delimiters::Delimiters;

/// A decoded tag. Names are trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag<'t> {
    /// `{{! … }}`
    Comment,

    /// `{{> name}}`
    Partial(&'t str),

    /// `{{#name}}` or, when `inverted`, `{{^name}}`
    SectionOpen { name: &'t str, inverted: bool },

    /// `{{/name}}`
    SectionClose(&'t str),

    /// `{{name}}` (escaped), `{{&name}}` or `{{{name}}}` (raw)
    Interpolation { name: &'t str, escaped: bool },

    /// `{{=a b=}}`; `None` when the body is malformed.
    SetDelimiters(Option<Delimiters>),
}

impl<'t> Tag<'t> {
    /// Decode raw tag text (everything between the delimiters).
    pub fn parse(text: &'t str) -> Self {
        let Some(&sigil) = text.as_bytes().first() else {
            return Tag::Interpolation {
                name: "",
                escaped: true,
            };
        };

        // Sigils are ASCII; any other first character keeps the whole text.
        let rest = text.get(1..).unwrap_or_default();
        match sigil {
            b'!' => Tag::Comment,
            b'>' => Tag::Partial(rest.trim()),
            b'#' => Tag::SectionOpen {
                name: rest.trim(),
                inverted: false,
            },
            b'^' => Tag::SectionOpen {
                name: rest.trim(),
                inverted: true,
            },
            b'/' => Tag::SectionClose(rest.trim()),
            b'&' => Tag::Interpolation {
                name: rest.trim(),
                escaped: false,
            },
            b'{' => Tag::Interpolation {
                name: rest.strip_suffix('}').unwrap_or(rest).trim(),
                escaped: false,
            },
            b'=' => Tag::SetDelimiters(Delimiters::parse_change(text)),
            _ => Tag::Interpolation {
                name: text.trim(),
                escaped: true,
            },
        }
    }
}

/// Whether a tag starting with `sigil` may stand alone on a line.
///
/// Standalone tags have their line's whitespace and line terminator removed.
pub fn allows_standalone(sigil: u8) -> bool {
    matches!(sigil, b'!' | b'>' | b'#' | b'^' | b'/' | b'=')
}
