/*
 * machine.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The resumable scanner/emitter at the heart of the renderer.
//!
//! A [`Machine`] consumes template bytes in arbitrary pieces. Literal text is
//! written as soon as it is known to be literal; bytes that might still turn
//! out to be part of a tag, or whitespace that might belong to a standalone
//! line, are held in small buffers until the question is settled. All state
//! lives in the struct, so splitting the input at any byte gives the same
//! output as feeding it in one piece.
//!
//! Sections and partials re-enter the machine recursively: a section body is
//! collected verbatim and replayed through a fresh machine once per
//! repetition, and a partial's text is run through a fresh machine with
//! default delimiters. Nested machines share the caller's [`Env`].

use crate::context::ContextStack;
use crate::delimiters::Delimiters;
use crate::error::{MustacheError, MustacheResult};
use crate::output::Output;
use crate::renderer::RenderOptions;
use crate::resolver::PartialResolver;
use crate::section::Section;
use crate::tag::{Tag, allows_standalone};
use crate::value::{escape_html, format_value};
use memchr::{memchr, memchr2};

/// Everything a machine (and the machines nested inside it) renders against.
pub(crate) struct Env<'a, 'r> {
    pub(crate) stack: &'r mut ContextStack<'a>,
    pub(crate) partials: &'a dyn PartialResolver,
    pub(crate) options: &'r RenderOptions,
    pub(crate) output: Output<'r>,
    pub(crate) partial_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At the start of a line, collecting spaces and tabs.
    LeadingWhitespace,
    /// Matching the start delimiter.
    StartDelimiter,
    /// Collecting tag text.
    Tag,
    /// Matching the end delimiter.
    EndDelimiter,
    /// After `{{{name}}`, looking for the third closing brace.
    EndTriple,
    /// Copying literal text.
    Passthrough,
    /// A standalone-eligible tag was read; waiting for the line terminator.
    Standalone,
    /// As above, after a `\r`.
    Standalone2,
}

/// Scanner state for one run over a template or section body.
#[derive(Debug)]
pub(crate) struct Machine<'a> {
    state: State,
    /// Spaces and tabs at the start of the current line.
    whitespace: Vec<u8>,
    /// Text of the tag being read.
    tag: Vec<u8>,
    /// Bytes of the current delimiter matched so far.
    matched: usize,
    /// Only whitespace preceded the current tag on its line.
    standalone: bool,
    delimiters: Delimiters,
    /// End of input also ends the current line.
    input_ends_line: bool,
    /// The section whose body is being collected, if any.
    section: Option<Section<'a>>,
}

impl<'a> Machine<'a> {
    /// A machine at the start of a template, with default delimiters.
    pub(crate) fn new() -> Self {
        Self {
            input_ends_line: true,
            ..Self::resume(Delimiters::default(), true)
        }
    }

    /// A machine for a section body that starts with `delimiters`, either at
    /// the start of a line or in the middle of one. The line the body ends on
    /// continues after the close tag.
    pub(crate) fn resume(delimiters: Delimiters, at_line_start: bool) -> Self {
        Self {
            state: if at_line_start {
                State::LeadingWhitespace
            } else {
                State::Passthrough
            },
            whitespace: Vec::new(),
            tag: Vec::new(),
            matched: 0,
            standalone: false,
            delimiters,
            input_ends_line: false,
            section: None,
        }
    }

    /// Feed a complete input and finish.
    pub(crate) fn run(mut self, input: &[u8], env: &mut Env<'a, '_>) -> MustacheResult<()> {
        self.feed(input, env)?;
        self.finish(env)
    }

    /// Consume one chunk of input.
    pub(crate) fn feed(&mut self, input: &[u8], env: &mut Env<'a, '_>) -> MustacheResult<()> {
        let mut pos = 0;
        while pos < input.len() {
            let byte = input[pos];
            match self.state {
                State::LeadingWhitespace => {
                    if byte == b' ' || byte == b'\t' {
                        self.whitespace.push(byte);
                        pos += 1;
                    } else if byte == self.delimiters.start()[0] {
                        self.standalone = true;
                        self.matched = 0;
                        self.state = State::StartDelimiter;
                    } else {
                        self.flush_whitespace(env)?;
                        self.state = State::Passthrough;
                    }
                }

                State::StartDelimiter => {
                    if byte == self.delimiters.start()[self.matched] {
                        self.matched += 1;
                        pos += 1;
                        if self.matched == self.delimiters.start().len() {
                            self.tag.clear();
                            self.state = State::Tag;
                        }
                    } else {
                        // Not a tag after all; the mismatching byte is reread as text.
                        self.flush_whitespace(env)?;
                        emit(&mut self.section, env, &self.delimiters.start()[..self.matched])?;
                        self.state = State::Passthrough;
                    }
                }

                State::Tag => {
                    let rest = &input[pos..];
                    match memchr(self.delimiters.end()[0], rest) {
                        Some(n) => {
                            self.tag.extend_from_slice(&rest[..n]);
                            pos += n;
                            self.matched = 0;
                            self.state = State::EndDelimiter;
                        }
                        None => {
                            self.tag.extend_from_slice(rest);
                            pos = input.len();
                        }
                    }
                }

                State::EndDelimiter => {
                    let end = self.delimiters.end();
                    if byte == end[self.matched] {
                        self.matched += 1;
                        pos += 1;
                        if self.matched == end.len() {
                            if self.delimiters.is_default() && self.tag.first() == Some(&b'{') {
                                self.state = State::EndTriple;
                            } else {
                                self.complete_tag(env)?;
                            }
                        }
                    } else {
                        // A prefix of the end delimiter inside the tag text.
                        self.tag.extend_from_slice(&end[..self.matched]);
                        self.state = State::Tag;
                    }
                }

                State::EndTriple => {
                    if byte == b'}' {
                        self.tag.push(b'}');
                        pos += 1;
                    }
                    self.complete_tag(env)?;
                }

                State::Passthrough => {
                    let rest = &input[pos..];
                    match memchr2(b'\n', self.delimiters.start()[0], rest) {
                        Some(n) => {
                            if n > 0 {
                                emit(&mut self.section, env, &rest[..n])?;
                            }
                            if rest[n] == b'\n' {
                                emit_newline(&mut self.section, env)?;
                                pos += n + 1;
                                self.state = State::LeadingWhitespace;
                            } else {
                                pos += n;
                                self.standalone = false;
                                self.matched = 0;
                                self.state = State::StartDelimiter;
                            }
                        }
                        None => {
                            emit(&mut self.section, env, rest)?;
                            pos = input.len();
                        }
                    }
                }

                State::Standalone => match byte {
                    b'\r' => {
                        pos += 1;
                        self.state = State::Standalone2;
                    }
                    b'\n' => {
                        pos += 1;
                        self.confirm_standalone(env)?;
                    }
                    _ => self.reject_standalone(env)?,
                },

                State::Standalone2 => {
                    if byte == b'\n' {
                        pos += 1;
                        self.confirm_standalone(env)?;
                    } else {
                        self.reject_standalone(env)?;
                        emit(&mut self.section, env, b"\r")?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Flush whatever is still held back at end of input.
    ///
    /// Incomplete tags are written out literally. A standalone tag waiting for
    /// its line terminator is confirmed when end of input also ends the line.
    pub(crate) fn finish(&mut self, env: &mut Env<'a, '_>) -> MustacheResult<()> {
        if self.state == State::EndTriple {
            self.complete_tag(env)?;
        }

        match self.state {
            State::LeadingWhitespace => {
                if !self.whitespace.is_empty() {
                    self.flush_whitespace(env)?;
                }
            }
            State::StartDelimiter => {
                self.flush_whitespace(env)?;
                emit(&mut self.section, env, &self.delimiters.start()[..self.matched])?;
            }
            State::Tag => {
                self.flush_whitespace(env)?;
                emit(&mut self.section, env, self.delimiters.start())?;
                emit(&mut self.section, env, &self.tag)?;
            }
            State::EndDelimiter => {
                self.flush_whitespace(env)?;
                emit(&mut self.section, env, self.delimiters.start())?;
                emit(&mut self.section, env, &self.tag)?;
                emit(&mut self.section, env, &self.delimiters.end()[..self.matched])?;
            }
            State::Standalone if self.input_ends_line => self.confirm_standalone(env)?,
            State::Standalone => self.reject_standalone(env)?,
            State::Standalone2 => {
                self.reject_standalone(env)?;
                emit(&mut self.section, env, b"\r")?;
            }
            State::EndTriple | State::Passthrough => {}
        }

        self.whitespace.clear();
        self.tag.clear();
        self.matched = 0;
        self.state = State::LeadingWhitespace;

        match self.section.take() {
            Some(section) => Err(MustacheError::UnclosedSection {
                name: section.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// The end delimiter was matched: defer standalone-eligible tags until the
    /// rest of the line is known, dispatch everything else now.
    fn complete_tag(&mut self, env: &mut Env<'a, '_>) -> MustacheResult<()> {
        if self.standalone && self.may_stand_alone() {
            self.state = State::Standalone;
            Ok(())
        } else {
            self.flush_whitespace(env)?;
            self.state = State::Passthrough;
            self.dispatch(env, None)
        }
    }

    fn may_stand_alone(&self) -> bool {
        let Some(&sigil) = self.tag.first() else {
            return false;
        };
        match &self.section {
            None => allows_standalone(sigil),
            // While collecting a body only the closing tag is judged here;
            // everything else is judged again when the body is replayed.
            Some(section) => sigil == b'/' && section.open_count() == 1,
        }
    }

    /// The tag is alone on its line: drop the line's whitespace and terminator.
    fn confirm_standalone(&mut self, env: &mut Env<'a, '_>) -> MustacheResult<()> {
        let indent = std::mem::take(&mut self.whitespace);
        self.state = State::LeadingWhitespace;
        self.dispatch(env, Some(indent.as_slice()))
    }

    /// Something other than a line terminator followed the tag.
    fn reject_standalone(&mut self, env: &mut Env<'a, '_>) -> MustacheResult<()> {
        self.flush_whitespace(env)?;
        self.state = State::Passthrough;
        self.dispatch(env, None)
    }

    fn flush_whitespace(&mut self, env: &mut Env<'a, '_>) -> MustacheResult<()> {
        emit(&mut self.section, env, &self.whitespace)?;
        self.whitespace.clear();
        Ok(())
    }

    /// Act on the completed tag.
    ///
    /// `standalone` holds the elided leading whitespace when the tag was
    /// confirmed to stand alone on its line.
    fn dispatch(&mut self, env: &mut Env<'a, '_>, standalone: Option<&[u8]>) -> MustacheResult<()> {
        let raw = std::mem::take(&mut self.tag);
        let text = String::from_utf8_lossy(&raw);
        let tag = Tag::parse(&text);

        if self.section.is_some() {
            return self.collect_tag(env, &raw, tag);
        }

        match tag {
            Tag::Comment => Ok(()),
            Tag::Interpolation { name, escaped } => interpolate(env, name, escaped),
            Tag::SectionOpen { name, inverted } => {
                let value = env.stack.lookup(name);
                self.section = Some(Section::open(
                    name,
                    inverted,
                    value,
                    self.delimiters.clone(),
                    standalone.is_some(),
                ));
                Ok(())
            }
            Tag::SectionClose(name) => Err(MustacheError::UnopenedSection {
                name: name.to_string(),
            }),
            Tag::Partial(name) => expand_partial(env, name, standalone),
            Tag::SetDelimiters(Some(delimiters)) => {
                self.delimiters = delimiters;
                Ok(())
            }
            Tag::SetDelimiters(None) => {
                tracing::trace!(tag = %text, "Ignoring malformed delimiter change");
                Ok(())
            }
        }
    }

    /// Handle a tag inside a section body: track nesting, copy the tag into
    /// the body, and replay the body once the section closes.
    fn collect_tag(&mut self, env: &mut Env<'a, '_>, raw: &[u8], tag: Tag<'_>) -> MustacheResult<()> {
        let Some(section) = self.section.as_mut() else {
            return Ok(());
        };

        match tag {
            Tag::SectionOpen { name, .. } => section.enter(name),
            Tag::SectionClose(name) => {
                if section.leave(name)? {
                    if let Some(section) = self.section.take() {
                        return section.replay(env);
                    }
                    return Ok(());
                }
            }
            Tag::SetDelimiters(Some(delimiters)) => {
                section.push_tag(&self.delimiters, raw);
                self.delimiters = delimiters;
                return Ok(());
            }
            _ => {}
        }

        section.push_tag(&self.delimiters, raw);
        Ok(())
    }
}

/// Route literal bytes into the section body being collected, or out.
fn emit(section: &mut Option<Section<'_>>, env: &mut Env<'_, '_>, bytes: &[u8]) -> MustacheResult<()> {
    match section {
        Some(section) => {
            section.push_text(bytes);
            Ok(())
        }
        None => env.output.write(bytes),
    }
}

fn emit_newline(section: &mut Option<Section<'_>>, env: &mut Env<'_, '_>) -> MustacheResult<()> {
    match section {
        Some(section) => {
            section.push_text(b"\n");
            Ok(())
        }
        None => env.output.newline(),
    }
}

fn interpolate(env: &mut Env<'_, '_>, name: &str, escaped: bool) -> MustacheResult<()> {
    let text = match env.stack.lookup(name) {
        Some(value) => format_value(value),
        None => {
            tracing::trace!(name, "Unresolved name renders as empty");
            Default::default()
        }
    };
    if escaped {
        env.output.write(escape_html(&text).as_bytes())
    } else {
        env.output.write(text.as_bytes())
    }
}

/// Render a partial in place, against the same context stack.
///
/// The partial is scanned with default delimiters. When the partial tag stood
/// alone on its line, the whitespace in front of it indents every line the
/// partial produces.
fn expand_partial(
    env: &mut Env<'_, '_>,
    name: &str,
    standalone: Option<&[u8]>,
) -> MustacheResult<()> {
    let partials = env.partials;
    let Some(text) = partials.get_partial(name) else {
        tracing::trace!(partial = name, "Partial not found");
        return Ok(());
    };

    let max_depth = env.options.max_partial_depth();
    if env.partial_depth >= max_depth {
        return Err(MustacheError::PartialDepthExceeded {
            name: name.to_string(),
            max_depth,
        });
    }

    tracing::debug!(partial = name, depth = env.partial_depth + 1, "Expanding partial");

    let mark = env.output.indent_mark();
    if let Some(indent) = standalone {
        env.output.push_indent(indent);
    }
    env.partial_depth += 1;

    let result = Machine::new().run(text.as_bytes(), env);

    env.partial_depth -= 1;
    env.output.restore_indent(mark);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Indentation;
    use crate::resolver::NullResolver;
    use serde_json::{Value, json};

    fn run(machine: Machine<'_>, input: &str, data: &Value) -> String {
        let mut stack = ContextStack::new(data);
        let options = RenderOptions::new();
        let mut indentation = Indentation::new();
        let mut sink = Vec::new();
        let mut env = Env {
            stack: &mut stack,
            partials: &NullResolver,
            options: &options,
            output: Output::new(&mut sink, &mut indentation),
            partial_depth: 0,
        };
        machine.run(input.as_bytes(), &mut env).unwrap();
        drop(env);
        String::from_utf8(sink).unwrap()
    }

    #[test]
    fn test_template_end_confirms_standalone() {
        let data = json!({});
        assert_eq!(run(Machine::new(), "x\n  {{! c }}", &data), "x\n");
    }

    #[test]
    fn test_body_end_rejects_standalone() {
        let data = json!({});
        let machine = Machine::resume(Delimiters::default(), true);
        assert_eq!(run(machine, "  {{! c }}", &data), "  ");
    }

    #[test]
    fn test_resume_mid_line() {
        let data = json!({});
        let machine = Machine::resume(Delimiters::default(), false);
        assert_eq!(run(machine, "{{! c }}\nx", &data), "\nx");
    }

    #[test]
    fn test_withheld_carriage_return() {
        let data = json!({});
        assert_eq!(run(Machine::new(), "{{! c }}\rx", &data), "\rx");
        assert_eq!(run(Machine::new(), "{{! c }}\r", &data), "\r");
    }

    #[test]
    fn test_end_delimiter_prefix_inside_tag() {
        let data = json!({"a}b": "odd", "a": "plain"});
        assert_eq!(run(Machine::new(), "[{{a}b}}]", &data), "[odd]");
    }
}
