// Mon Jan 19 2026 - Alex

use super::demangle::demangle_member;
use super::section::SectionTable;
use crate::dump::error::{DumpError, DumpResult};
use crate::dump::extract::parse_hex;
use crate::dump::scanner::{Dump, Section};
use crate::structure::types::{PublicSymbol, VirtualAddress};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const PUBLIC_MARKER: &str = "S_PUB32";

/// `S_PUB32: [0001:00001010], Flags: 00000002, ?Bar@Base@@QAEXXZ`
static PUBLIC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"S_PUB32: \[([0-9A-Fa-f]+):([0-9A-Fa-f]+)\], Flags: [0-9A-Fa-f]+, (\S+)")
        .expect("public symbol pattern is valid")
});

pub fn parse_public(line: &str, line_number: usize, sections: &SectionTable) -> DumpResult<PublicSymbol> {
    let captures = PUBLIC_LINE
        .captures(line)
        .ok_or_else(|| DumpError::grammar(PUBLIC_MARKER, line_number, line))?;

    let section = u16::from_str_radix(&captures[1], 16)
        .map_err(|_| DumpError::grammar("section number", line_number, line))?;
    let offset = parse_hex(&captures[2]).ok_or_else(|| DumpError::grammar("section offset", line_number, line))?;

    Ok(PublicSymbol {
        mangled_name: captures[3].to_string(),
        virtual_address: sections.resolve(section, offset, line_number, line)?,
    })
}

pub fn parse_publics(dump: &Dump, sections: &SectionTable) -> DumpResult<Vec<PublicSymbol>> {
    if !dump.has_section(Section::Publics) {
        log::debug!("no public symbols in dump");
        return Ok(Vec::new());
    }

    let mut scanner = dump.section(Section::Publics)?;
    let mut publics = Vec::new();
    while let Some(line) = scanner.next_line() {
        if line.contains(PUBLIC_MARKER) {
            publics.push(parse_public(line, scanner.line_number(), sections)?);
        }
    }

    log::info!("parsed {} public symbols", publics.len());
    Ok(publics)
}

/// Public symbols grouped by mangled class scope and member name.
#[derive(Debug, Clone, Default)]
pub struct PublicIndex {
    by_scope: HashMap<String, HashMap<String, Vec<VirtualAddress>>>,
}

impl PublicIndex {
    pub fn build(publics: &[PublicSymbol]) -> Self {
        let mut index = Self::default();
        for public in publics {
            if let Some(member) = demangle_member(&public.mangled_name) {
                index
                    .by_scope
                    .entry(member.scope)
                    .or_default()
                    .entry(member.name)
                    .or_default()
                    .push(public.virtual_address);
            }
        }
        index
    }

    /// Address of `name` in `scope`, only when exactly one public symbol matches.
    pub fn unique_address(&self, scope: &str, name: &str) -> Option<VirtualAddress> {
        match self.by_scope.get(scope)?.get(name)?.as_slice() {
            [address] => Some(*address),
            _ => None,
        }
    }

    pub fn scope_count(&self) -> usize {
        self.by_scope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_scope.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::types::SectionHeaderRecord;

    fn sections() -> SectionTable {
        SectionTable::new(
            0x10000000,
            vec![SectionHeaderRecord {
                number: 1,
                name: ".text".to_string(),
                virtual_size: 0x10000,
                virtual_address: 0x1000,
            }],
        )
    }

    #[test]
    fn test_parse_public_line() {
        let public = parse_public("S_PUB32: [0001:00000010], Flags: 00000002, ?Bar@Base@@QAEXXZ", 3, &sections()).unwrap();
        assert_eq!(public.mangled_name, "?Bar@Base@@QAEXXZ");
        assert_eq!(public.virtual_address, VirtualAddress::new(0x10001010));
    }

    #[test]
    fn test_public_index_requires_unique_match() {
        let dump = Dump::from_text(
            "*** PUBLICS\n\
             S_PUB32: [0001:00000010], Flags: 00000002, ?Bar@Base@@QAEXXZ\n\
             S_PUB32: [0001:00000020], Flags: 00000002, ?Get@Base@@QAEHXZ\n\
             S_PUB32: [0001:00000030], Flags: 00000002, ?Get@Base@@QBEHXZ\n\
             S_PUB32: [0001:00000040], Flags: 00000002, _main\n",
        );
        let publics = parse_publics(&dump, &sections()).unwrap();
        assert_eq!(publics.len(), 4);

        let index = PublicIndex::build(&publics);
        assert_eq!(index.scope_count(), 1);
        assert_eq!(index.unique_address("Base@@", "Bar"), Some(VirtualAddress::new(0x10001010)));
        assert_eq!(index.unique_address("Base@@", "Get"), None);
        assert_eq!(index.unique_address("Other@@", "Bar"), None);
    }

    #[test]
    fn test_missing_publics_section() {
        let dump = Dump::from_text("*** TYPES\n");
        assert!(parse_publics(&dump, &sections()).unwrap().is_empty());
    }
}
