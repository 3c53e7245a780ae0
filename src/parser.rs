use std::io::BufRead;

use tracing::{debug, trace, warn};

use crate::error::Error;

/// UTF-8 encoded Byte Order Mark. Some editors on Windows prepend it to text files.
const BOM: char = '\u{FEFF}';

/// Receives the mutations produced while parsing.
pub trait Store {
    /// Returns `true` if a new section was created.
    fn add_section(&mut self, name: &str) -> bool;

    /// Sets `option` in `section`, replacing any previous value. An empty `section` refers to the
    /// store's default section. Returns `true` if the option did not exist before.
    fn add_option(&mut self, section: &str, option: &str, value: String) -> bool;

    fn raw_value(&self, section: &str, option: &str) -> Option<&str>;
}

/// The shape of a single line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Comment,
    Section(&'a str),
    KeyValue(&'a str, &'a str),
    Continuation(&'a str),
    Invalid(&'a str),
}

/// Classify `line` without touching any store.
///
/// `continuable` tells whether a section and an option are currently open, which is the only
/// situation in which a line without a delimiter is accepted.
#[must_use]
pub fn classify(line: &str, continuable: bool) -> Line<'_> {
    let line = line.trim();

    if line.is_empty() {
        return Line::Blank;
    }

    // `rem` matches regardless of what follows, so `remote = 1` is a comment too.
    if line.starts_with(['#', ';']) || line.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("rem"))
    {
        return Line::Comment;
    }

    if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
        return Line::Section(name.trim());
    }

    match line.find(['=', ':']) {
        Some(i) if i > 0 => {
            let key = line[..i].trim_end();
            let value = strip_inline_comment(&line[i + 1..]).trim();
            Line::KeyValue(key, value)
        }
        _ if continuable => Line::Continuation(strip_inline_comment(line).trim()),
        _ => Line::Invalid(line),
    }
}

/// Cut `text` at the first `#` or `;` that follows a space or a tab.
fn strip_inline_comment(text: &str) -> &str {
    text.as_bytes()
        .windows(2)
        .position(|w| matches!(w, [b' ' | b'\t', b'#' | b';']))
        .map_or(text, |i| &text[..i])
}

/// Section and option the next continuation line would extend.
#[derive(Debug, Default)]
struct State {
    section: String,
    option: String,
}

impl State {
    fn continuable(&self) -> bool {
        !self.section.is_empty() && !self.option.is_empty()
    }
}

/// Read `reader` to the end, feeding every recognized line into `store`.
///
/// Mutations applied before an error are kept.
pub fn parse<R, S>(mut reader: R, store: &mut S) -> Result<(), Error>
where
    R: BufRead,
    S: Store + ?Sized,
{
    let mut state = State::default();
    let mut buffer = Vec::<u8>::with_capacity(256);
    let mut line_number = 0_usize;

    loop {
        buffer.clear();

        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }

        line_number += 1;

        // Bytes that are not UTF-8 (e.g. Latin-1 text in a comment) become U+FFFD.
        let decoded = String::from_utf8_lossy(&buffer);
        let mut line: &str = &decoded;
        if line_number == 1 {
            line = line.strip_prefix(BOM).unwrap_or(line);
        }

        match classify(line, state.continuable()) {
            Line::Blank | Line::Comment => {}
            Line::Section(name) => {
                debug!(line = line_number, section = name, "entering section");
                store.add_section(name);
                name.clone_into(&mut state.section);
                state.option.clear();
            }
            Line::KeyValue(key, value) => {
                trace!(line = line_number, key, value, "option");
                store.add_option(&state.section, key, value.to_owned());
                key.clone_into(&mut state.option);
            }
            Line::Continuation(text) => {
                trace!(line = line_number, text, "continuation");
                let previous = store
                    .raw_value(&state.section, &state.option)
                    .unwrap_or_default();
                let value = format!("{previous}\n{text}");
                store.add_option(&state.section, &state.option, value);
            }
            Line::Invalid(raw) => {
                warn!(line = line_number, text = raw, "could not parse line");
                return Err(Error::Parse {
                    line: raw.to_owned(),
                });
            }
        }
    }

    Ok(())
}
