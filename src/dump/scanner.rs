// Mon Jan 19 2026 - Alex

use super::error::{DumpError, DumpResult};
use std::fmt;
use std::fs;
use std::path::Path;

/// Named sections of a dump, each introduced by a `*** NAME` banner line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Types,
    SectionHeaders,
    Publics,
    Symbols,
    Globals,
}

impl Section {
    pub fn banner(&self) -> &'static str {
        match self {
            Section::Types => "*** TYPES",
            Section::SectionHeaders => "*** SECTION HEADERS",
            Section::Publics => "*** PUBLICS",
            Section::Symbols => "*** SYMBOLS",
            Section::Globals => "*** GLOBALS",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.banner())
    }
}

const BANNER_PREFIX: &str = "*** ";

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_banner(line: &str) -> bool {
    line.starts_with(BANNER_PREFIX)
}

/// The whole dump held in memory, one entry per line.
#[derive(Debug, Clone, Default)]
pub struct Dump {
    lines: Vec<String>,
}

impl Dump {
    pub fn read<P: AsRef<Path>>(path: P) -> DumpResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DumpError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // cvdump output is ASCII in practice; stray bytes in names are not fatal.
        let text = String::from_utf8_lossy(&bytes);
        let dump = Self::from_text(&text);
        log::debug!("read {} lines from {}", dump.line_count(), path.display());
        Ok(dump)
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn has_section(&self, section: Section) -> bool {
        self.lines.iter().any(|line| line.starts_with(section.banner()))
    }

    pub fn scanner(&self) -> LineScanner<'_> {
        LineScanner::new(&self.lines)
    }

    /// Scanner positioned on the first line after `section`'s banner.
    pub fn section(&self, section: Section) -> DumpResult<LineScanner<'_>> {
        let mut scanner = self.scanner();
        scanner.seek_section(section)?;
        Ok(scanner)
    }
}

/// Forward-only cursor over dump lines.
///
/// Inside a section, records are separated by blank lines; the next `*** `
/// banner ends the section and is never handed out as record content.
#[derive(Debug, Clone)]
pub struct LineScanner<'a> {
    lines: &'a [String],
    pos: usize,
}

impl<'a> LineScanner<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Self { lines, pos: 0 }
    }

    /// Moves to the first line after the banner of `section`. The search
    /// always starts from the top so sections can be visited in any order.
    pub fn seek_section(&mut self, section: Section) -> DumpResult<()> {
        let banner = section.banner();
        match self.lines.iter().position(|line| line.starts_with(banner)) {
            Some(index) => {
                self.pos = index + 1;
                Ok(())
            }
            None => Err(DumpError::SectionNotFound { banner }),
        }
    }

    /// Skips the rest of the current record (including the current line when
    /// blank) and returns the first line of the next record.
    pub fn next_record(&mut self) -> Option<&'a str> {
        while let Some(line) = self.lines.get(self.pos) {
            if is_blank(line) {
                break;
            }
            if is_banner(line) {
                return None;
            }
            self.pos += 1;
        }

        while self.lines.get(self.pos).is_some_and(|line| is_blank(line)) {
            self.pos += 1;
        }

        let line = self.lines.get(self.pos)?;
        if is_banner(line) {
            return None;
        }
        self.pos += 1;
        Some(line.as_str())
    }

    /// Consumes and returns the next line of the current section.
    pub fn next_line(&mut self) -> Option<&'a str> {
        let line = self.peek_line()?;
        self.pos += 1;
        Some(line)
    }

    pub fn peek_line(&self) -> Option<&'a str> {
        self.lines
            .get(self.pos)
            .filter(|line| !is_banner(line))
            .map(String::as_str)
    }

    /// 1-based number of the most recently consumed line.
    pub fn line_number(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.peek_line().is_none()
    }
}
