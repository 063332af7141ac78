// Mon Jan 19 2026 - Alex

use crate::dump::error::{DumpError, DumpResult};
use crate::dump::extract::parse_hex;
use crate::dump::scanner::{Dump, Section};
use crate::structure::types::{SectionHeaderRecord, VirtualAddress};

const HEADER_PREFIX: &str = "SECTION HEADER #";
const NAME_SUFFIX: &str = " name";
const VIRTUAL_SIZE_SUFFIX: &str = " virtual size";
const VIRTUAL_ADDRESS_SUFFIX: &str = " virtual address";

/// Section layout of the image, used to turn `[section:offset]` pairs into
/// absolute addresses.
#[derive(Debug, Clone)]
pub struct SectionTable {
    headers: Vec<SectionHeaderRecord>,
    image_base: u64,
    present: bool,
}

impl SectionTable {
    pub fn new(image_base: u64, headers: Vec<SectionHeaderRecord>) -> Self {
        Self {
            headers,
            image_base,
            present: true,
        }
    }

    /// Table for a dump without a `*** SECTION HEADERS` section.
    pub fn absent(image_base: u64) -> Self {
        Self {
            headers: Vec::new(),
            image_base,
            present: false,
        }
    }

    pub fn from_dump(dump: &Dump, image_base: u64) -> DumpResult<Self> {
        if !dump.has_section(Section::SectionHeaders) {
            return Ok(Self::absent(image_base));
        }
        let headers = parse_section_headers(dump)?;
        log::debug!("{} section headers, image base 0x{:x}", headers.len(), image_base);
        Ok(Self::new(image_base, headers))
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn image_base(&self) -> u64 {
        self.image_base
    }

    pub fn headers(&self) -> &[SectionHeaderRecord] {
        &self.headers
    }

    pub fn get(&self, number: u16) -> Option<&SectionHeaderRecord> {
        self.headers.iter().find(|header| header.number == number)
    }

    /// Absolute address of `offset` inside section `number` (1-based).
    /// `None` for an unknown section or an address past `u64::MAX`.
    pub fn absolute(&self, number: u16, offset: u64) -> Option<VirtualAddress> {
        let header = self.get(number)?;
        VirtualAddress::new(self.image_base)
            .checked_add(header.virtual_address)?
            .checked_add(offset)
    }

    /// Resolves a `section:offset` pair read from `line`, failing when the
    /// dump has no section headers, names an unknown section, or the sum
    /// overflows the address space.
    pub fn resolve(&self, number: u16, offset: u64, line_number: usize, line: &str) -> DumpResult<VirtualAddress> {
        if !self.present {
            return Err(DumpError::SectionNotFound {
                banner: Section::SectionHeaders.banner(),
            });
        }
        if self.get(number).is_none() {
            return Err(DumpError::grammar("known section number", line_number, line));
        }
        self.absolute(number, offset)
            .ok_or_else(|| DumpError::grammar("address within image", line_number, line))
    }
}

#[derive(Default)]
struct PartialHeader {
    number: u16,
    name: Option<String>,
    virtual_size: Option<u64>,
    virtual_address: Option<u64>,
    line_number: usize,
}

impl PartialHeader {
    fn finish(self) -> DumpResult<SectionHeaderRecord> {
        let context = format!("{}{}", HEADER_PREFIX, self.number);
        let virtual_address = self
            .virtual_address
            .ok_or_else(|| DumpError::grammar(VIRTUAL_ADDRESS_SUFFIX.trim(), self.line_number, &context))?;

        Ok(SectionHeaderRecord {
            number: self.number,
            name: self.name.unwrap_or_default(),
            virtual_size: self.virtual_size.unwrap_or(0),
            virtual_address,
        })
    }
}

fn leading_hex(line: &str, suffix: &str, line_number: usize) -> DumpResult<u64> {
    let token = line.trim().split_whitespace().next().unwrap_or("");
    parse_hex(token).ok_or_else(|| DumpError::grammar(suffix.trim(), line_number, line))
}

pub fn parse_section_headers(dump: &Dump) -> DumpResult<Vec<SectionHeaderRecord>> {
    let mut scanner = dump.section(Section::SectionHeaders)?;
    let mut headers = Vec::new();
    let mut current: Option<PartialHeader> = None;

    while let Some(line) = scanner.next_line() {
        let line_number = scanner.line_number();
        let trimmed = line.trim();

        if let Some(number) = trimmed.strip_prefix(HEADER_PREFIX) {
            if let Some(done) = current.take() {
                headers.push(done.finish()?);
            }
            let number = number
                .trim()
                .parse::<u16>()
                .map_err(|_| DumpError::grammar(HEADER_PREFIX, line_number, line))?;
            current = Some(PartialHeader {
                number,
                line_number,
                ..PartialHeader::default()
            });
            continue;
        }

        let Some(header) = current.as_mut() else {
            continue;
        };

        if trimmed.ends_with(VIRTUAL_ADDRESS_SUFFIX) {
            header.virtual_address = Some(leading_hex(trimmed, VIRTUAL_ADDRESS_SUFFIX, line_number)?);
        } else if trimmed.ends_with(VIRTUAL_SIZE_SUFFIX) {
            header.virtual_size = Some(leading_hex(trimmed, VIRTUAL_SIZE_SUFFIX, line_number)?);
        } else if header.name.is_none() && trimmed.ends_with(NAME_SUFFIX) {
            header.name = Some(trimmed[..trimmed.len() - NAME_SUFFIX.len()].trim().to_string());
        }
    }

    if let Some(done) = current.take() {
        headers.push(done.finish()?);
    }
    Ok(headers)
}
