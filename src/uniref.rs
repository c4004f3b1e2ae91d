//src/uniref.rs

use std::io::{self, BufRead};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ExtractError;
use crate::fasta::open_reader;
use crate::types::{Entry, MemberRef, UNKNOWN_TAXON};

// Which element the reader is currently inside, as far as entry fields care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    EntryLevel,
    Representative,
    Member,
}

// Element whose text content is being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    Name,
    Sequence,
}

/// Streaming reader over a UniRef XML document.
///
/// Drives quick-xml's event reader directly instead of deserializing the
/// document: only one `Entry` is ever materialized at a time, which keeps
/// memory bounded over multi-gigabyte inputs. Forward-only, single pass.
pub struct UniRefReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> UniRefReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: Reader::from_reader(inner),
            buf: Vec::new(),
        }
    }

    // Consumes events from just after <entry> up to and including </entry>,
    // flattening the subtree into an Entry.
    fn parse_entry(&mut self, id: String) -> Result<Entry, ExtractError> {
        let mut entry = Entry::new(id);
        let mut section = Section::EntryLevel;
        let mut in_dbref = false;
        let mut current_member: Option<MemberRef> = None;
        let mut text_target: Option<TextTarget> = None;
        let mut text = String::new();

        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf)?;
            match event {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"representativeMember" => section = Section::Representative,
                    b"member" => section = Section::Member,
                    b"dbReference" => {
                        in_dbref = true;
                        match section {
                            Section::Representative => {}
                            Section::Member => {
                                current_member = Some(member_from_dbref(e)?);
                            }
                            Section::EntryLevel => {}
                        }
                    }
                    b"name" if section == Section::EntryLevel => {
                        text_target = Some(TextTarget::Name);
                        text.clear();
                    }
                    b"sequence" if section == Section::Representative => {
                        text_target = Some(TextTarget::Sequence);
                        text.clear();
                    }
                    b"property" => {
                        apply_property(e, section, in_dbref, &mut entry, &mut current_member)?;
                    }
                    _ => {}
                },
                Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"property" => {
                        apply_property(e, section, in_dbref, &mut entry, &mut current_member)?;
                    }
                    b"dbReference" if section == Section::Member => {
                        entry.members.push(member_from_dbref(e)?);
                    }
                    _ => {}
                },
                Event::Text(ref t) => {
                    if text_target.is_some() {
                        text.push_str(&t.unescape()?);
                    }
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"entry" => return Ok(entry),
                    b"representativeMember" | b"member" => section = Section::EntryLevel,
                    b"dbReference" => {
                        in_dbref = false;
                        if section == Section::Member {
                            if let Some(member) = current_member.take() {
                                entry.members.push(member);
                            }
                        }
                    }
                    b"name" => {
                        if text_target == Some(TextTarget::Name) {
                            entry.name = text.trim().to_string();
                            text_target = None;
                        }
                    }
                    b"sequence" => {
                        if text_target == Some(TextTarget::Sequence) {
                            entry.rep_sequence =
                                Some(text.chars().filter(|c| !c.is_whitespace()).collect());
                            text_target = None;
                        }
                    }
                    _ => {}
                },
                Event::Eof => {
                    return Err(ExtractError::TruncatedEntry(entry.id));
                }
                _ => {}
            }
        }
    }
}

// Routes a <property type=".." value=".."/> element to the field it
// annotates, depending on where in the entry it appears.
fn apply_property(
    e: &BytesStart<'_>,
    section: Section,
    in_dbref: bool,
    entry: &mut Entry,
    current_member: &mut Option<MemberRef>,
) -> Result<(), ExtractError> {
    let Some(prop_type) = attr_value(e, b"type")? else {
        return Ok(());
    };
    let value = attr_value(e, b"value")?.unwrap_or_default();

    match section {
        Section::EntryLevel => {
            if prop_type == "common taxon ID" {
                entry.common_tax_id = value.parse().unwrap_or(UNKNOWN_TAXON);
            }
        }
        Section::Representative if in_dbref => match prop_type.as_str() {
            "protein name" => entry.rep_protein_name = value,
            "source organism" => entry.rep_organism = value,
            "NCBI taxonomy" => entry.rep_tax_id = value.parse().unwrap_or(UNKNOWN_TAXON),
            "isSeed" => entry.rep_is_seed = true,
            _ => {}
        },
        Section::Member if in_dbref => {
            if let Some(member) = current_member.as_mut() {
                match prop_type.as_str() {
                    "isSeed" => member.is_seed = true,
                    "UniParc ID" => member.uniparc_id = Some(value),
                    _ => {}
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn member_from_dbref(e: &BytesStart<'_>) -> Result<MemberRef, ExtractError> {
    Ok(MemberRef {
        db_type: attr_value(e, b"type")?.unwrap_or_default(),
        db_id: attr_value(e, b"id")?.unwrap_or_default(),
        is_seed: false,
        uniparc_id: None,
    })
}

fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, ExtractError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

impl<R: BufRead> Iterator for UniRefReader<R> {
    type Item = Result<Entry, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        // Find the next <entry> start tag, then hand off to parse_entry.
        let id = loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf);
            match event {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"entry" => {
                    match attr_value(e, b"id") {
                        Ok(id) => break id.unwrap_or_default(),
                        Err(err) => return Some(Err(err)),
                    }
                }
                Ok(Event::Eof) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
        };
        Some(self.parse_entry(id))
    }
}

/// Opens a (possibly gzipped) UniRef XML file as a streaming entry iterator.
pub fn open_entries<P: AsRef<Path>>(path: P) -> io::Result<UniRefReader<Box<dyn BufRead>>> {
    Ok(UniRefReader::new(open_reader(path)?))
}
