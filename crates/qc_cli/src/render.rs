//! Terminal rendering of answers and their sources.

use std::io::{self, Write};

use crossterm::style::Stylize as _;
use qc_citation::{SourceEntry, SourceInspector, Segment, citations, resolve};
use qc_conversation::Turn;

/// Writes a streamed answer as it grows.
///
/// Markers that resolve at the time they are written are highlighted. A
/// trailing `[` followed only by digits may still become a marker, so it is
/// held back until more text arrives or the answer is finished.
pub(crate) struct AnswerPrinter {
    /// Bytes of the answer written so far.
    written: usize,
    colors: bool,
}

impl AnswerPrinter {
    pub(crate) fn new(colors: bool) -> Self {
        Self { written: 0, colors }
    }

    pub(crate) fn update(&mut self, turn: &Turn, out: &mut impl Write) -> io::Result<()> {
        self.write_until(turn, settled_len(turn.text()), out)
    }

    /// Write whatever was held back, and end the answer.
    pub(crate) fn finish(&mut self, turn: &Turn, out: &mut impl Write) -> io::Result<()> {
        self.write_until(turn, turn.text().len(), out)?;
        if self.written > 0 {
            writeln!(out)?;
        }

        out.flush()
    }

    fn write_until(&mut self, turn: &Turn, end: usize, out: &mut impl Write) -> io::Result<()> {
        if end <= self.written {
            return Ok(());
        }

        let mut offset = 0;
        for segment in resolve(&turn.text()[..end], turn.sources()) {
            let text = segment.as_str();
            let start = offset;
            offset += text.len();

            if offset <= self.written {
                continue;
            }

            let unwritten = &text[self.written.saturating_sub(start)..];
            match segment {
                Segment::Citation(_) if self.colors => {
                    write!(out, "{}", unwritten.cyan().bold())?;
                }
                _ => out.write_all(unwritten.as_bytes())?,
            }
        }

        self.written = end;
        out.flush()
    }
}

/// Length of the part of `text` that can no longer turn into a marker.
fn settled_len(text: &str) -> usize {
    match text.rfind('[') {
        Some(index) if text[index + 1..].bytes().all(|b| b.is_ascii_digit()) => index,
        _ => text.len(),
    }
}

/// List the sources cited by a finished answer, once per ordinal.
pub(crate) fn write_cited_sources(
    turn: &Turn,
    colors: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    let mut cited = citations(turn.text(), turn.sources())
        .filter_map(|citation| citation.source().map(|source| (citation.ordinal, source)))
        .collect::<Vec<_>>();

    cited.sort_by_key(|(ordinal, _)| *ordinal);
    cited.dedup_by_key(|(ordinal, _)| *ordinal);

    if cited.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    for (ordinal, source) in cited {
        let entry = SourceEntry::new(ordinal, source);
        write_heading(&entry, colors, out)?;
    }

    out.flush()
}

/// Show the sources of an open inspector.
pub(crate) fn write_inspector(
    inspector: &SourceInspector,
    colors: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    let entries = inspector.entries();
    if entries.is_empty() {
        writeln!(out, "No sources.")?;
    }

    for entry in entries {
        write_heading(&entry, colors, out)?;

        if let Some(headings) = &entry.headings {
            if colors {
                writeln!(out, "    {}", headings.as_str().dim())?;
            } else {
                writeln!(out, "    {headings}")?;
            }
        }

        if let Some(excerpt) = &entry.excerpt {
            let excerpt = format!("\"{excerpt}\"");
            if colors {
                writeln!(out, "    {}", excerpt.italic())?;
            } else {
                writeln!(out, "    {excerpt}")?;
            }
        }
    }

    out.flush()
}

fn write_heading(entry: &SourceEntry<'_>, colors: bool, out: &mut impl Write) -> io::Result<()> {
    let ordinal = format!("[{}]", entry.ordinal);
    let label: &str = &entry.label;
    if colors {
        write!(out, "{} {}", ordinal.cyan(), label.bold())?;
    } else {
        write!(out, "{ordinal} {label}")?;
    }

    if let Some(locator) = entry.locator {
        write!(out, ", {locator}")?;
    }

    writeln!(out)
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
