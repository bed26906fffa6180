/*
 * delimiters.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tag delimiters and the `{{=<% %>=}}` change directive.

const DEFAULT_START: &[u8] = b"{{";
const DEFAULT_END: &[u8] = b"}}";

/// The active start and end delimiters. Both are non-empty byte sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    start: Vec<u8>,
    end: Vec<u8>,
}

impl Delimiters {
    /// Create delimiters from explicit start and end sequences.
    ///
    /// Returns `None` if either sequence is empty.
    pub fn new(start: impl Into<Vec<u8>>, end: impl Into<Vec<u8>>) -> Option<Self> {
        let start = start.into();
        let end = end.into();
        if start.is_empty() || end.is_empty() {
            return None;
        }
        Some(Self { start, end })
    }

    /// Parse the text of a delimiter-change tag, e.g. `=<% %>=`.
    ///
    /// The body between the `=` signs must hold exactly two whitespace
    /// separated tokens. Anything else is rejected and the caller keeps the
    /// delimiters it had.
    pub fn parse_change(tag: &str) -> Option<Self> {
        let body = tag.strip_prefix('=')?.strip_suffix('=')?;
        let mut tokens = body.split_whitespace();
        let start = tokens.next()?;
        let end = tokens.next()?;
        if tokens.next().is_some() {
            return None;
        }
        Self::new(start, end)
    }

    pub fn start(&self) -> &[u8] {
        &self.start
    }

    pub fn end(&self) -> &[u8] {
        &self.end
    }

    /// Whether these are the standard `{{` / `}}` pair (enables `{{{…}}}`).
    pub fn is_default(&self) -> bool {
        self.start == DEFAULT_START && self.end == DEFAULT_END
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            start: DEFAULT_START.to_vec(),
            end: DEFAULT_END.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let d = Delimiters::default();
        assert_eq!(d.start(), b"{{");
        assert_eq!(d.end(), b"}}");
        assert!(d.is_default());
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(Delimiters::new("", "%>").is_none());
        assert!(Delimiters::new("<%", "").is_none());
        assert!(!Delimiters::new("<%", "%>").unwrap().is_default());
    }

    #[test]
    fn test_parse_change() {
        let d = Delimiters::parse_change("=<% %>=").unwrap();
        assert_eq!(d.start(), b"<%");
        assert_eq!(d.end(), b"%>");

        // Padding is ignored
        let d = Delimiters::parse_change("= @   @ =").unwrap();
        assert_eq!(d.start(), b"@");
        assert_eq!(d.end(), b"@");

        let d = Delimiters::parse_change("={{ }}=").unwrap();
        assert!(d.is_default());
    }

    #[test]
    fn test_parse_change_malformed() {
        assert!(Delimiters::parse_change("==").is_none());
        assert!(Delimiters::parse_change("= <% =").is_none());
        assert!(Delimiters::parse_change("=<% %> ||=").is_none());
        assert!(Delimiters::parse_change("=<% %>").is_none());
        assert!(Delimiters::parse_change("<% %>=").is_none());
        assert!(Delimiters::parse_change("=").is_none());
    }
}
