// Copyright 2026 the terminfo-db authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decoding compiled terminfo database entries
//!
//! The legacy compiled format is a fixed-layout header followed by the
//! capability regions (names, booleans, numbers, string table) and an
//! optional extended region whose string table holds both the extended
//! string values and the names of every extended capability.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

use crate::{caps, decoder::Decoder};

/// Magic number of the legacy 16-bit compiled format
const MAGIC: i16 = 0x011a;

/// Compiled entries must be smaller than this many bytes
const MAX_FILE_SIZE: usize = 4096;

/// Errors reported when decoding a terminfo database entry
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The input buffer exceeds the legacy format's size ceiling
    #[error("Invalid file size")]
    InvalidFileSize,
    /// The magic number is not the legacy 16-bit format magic
    #[error("Invalid magic")]
    InvalidMagic,
    /// A header field is negative or exceeds the known capability counts
    #[error("Invalid header")]
    InvalidHeader,
    /// The extended header fields are inconsistent with each other or with
    /// the number of bytes left in the buffer
    #[error("Invalid extended header")]
    InvalidExtendedHeader,
    /// A declared region extends past the end of the buffer
    #[error("Unexpected file end")]
    UnexpectedFileEnd,
    /// A string offset does not resolve to a NUL-terminated string, or an
    /// extended capability name is empty
    #[error("Invalid string table")]
    InvalidStringTable,
    /// A name or string capability is not valid UTF-8
    #[error("Invalid UTF-8 string")]
    Utf8(#[from] std::str::Utf8Error),
    /// Lookup was called with an empty terminal name
    #[error("Empty terminal name")]
    EmptyTermName,
    /// Neither candidate database path exists for the terminal name
    #[error("File not found")]
    FileNotFound,
    /// The database root directory does not exist
    #[error("Database directory not found")]
    DatabaseDirectoryNotFound,
}

/// Legacy header fields, validated on read
struct Header {
    name_size: usize,
    bool_count: usize,
    num_count: usize,
    str_count: usize,
    table_size: usize,
}

impl Header {
    fn read(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        let fields = decoder.read_ints(5)?;
        if fields.iter().any(|field| *field < 0) {
            return Err(Error::InvalidHeader);
        }
        let header = Self {
            name_size: fields[0] as usize,
            bool_count: fields[1] as usize,
            num_count: fields[2] as usize,
            str_count: fields[3] as usize,
            table_size: fields[4] as usize,
        };
        if header.bool_count > caps::BOOL_NAMES.len()
            || header.num_count > caps::NUM_NAMES.len()
            || header.str_count > caps::STR_NAMES.len()
        {
            return Err(Error::InvalidHeader);
        }
        Ok(header)
    }

    /// Byte length of the capability region the header declares
    const fn region_len(&self) -> usize {
        self.name_size
            + self.bool_count
            + 2 * self.num_count
            + 2 * self.str_count
            + self.table_size
    }
}

/// Extended header fields, validated on read
struct ExtHeader {
    bool_count: usize,
    num_count: usize,
    str_count: usize,
    table_size: usize,
}

impl ExtHeader {
    fn read(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        let fields = decoder.read_ints(5)?;
        if fields.iter().any(|field| *field < 0) {
            return Err(Error::InvalidExtendedHeader);
        }
        let header = Self {
            bool_count: fields[0] as usize,
            num_count: fields[1] as usize,
            str_count: fields[2] as usize,
            table_size: fields[4] as usize,
        };
        // The table must have an offset slot for every extended value and
        // every extended capability name.
        let offset_count = fields[3] as usize;
        if header.offsets() > offset_count {
            return Err(Error::InvalidExtendedHeader);
        }
        Ok(header)
    }

    /// Offsets into the combined table: one per string value, one per name
    const fn offsets(&self) -> usize {
        self.bool_count + self.num_count + 2 * self.str_count
    }

    /// Byte length of the extended region past the extended header
    const fn region_len(&self) -> usize {
        self.bool_count + 2 * self.num_count + 2 * self.offsets() + self.table_size
    }
}

/// Decoded terminfo database entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Terminfo {
    /// Original source file, empty when decoded from a buffer
    pub path: PathBuf,
    /// Alias names declared by the entry
    pub names: Vec<String>,
    /// Boolean capabilities by canonical index
    pub booleans: Vec<bool>,
    /// Canonical indices of absent boolean capabilities
    pub booleans_absent: BTreeSet<usize>,
    /// Numeric capabilities by canonical index
    pub numbers: Vec<i32>,
    /// Canonical indices of absent numeric capabilities
    pub numbers_absent: BTreeSet<usize>,
    /// String capabilities by canonical index
    pub strings: Vec<String>,
    /// Canonical indices of absent string capabilities
    pub strings_absent: BTreeSet<usize>,
    /// Extended boolean capabilities
    pub ext_booleans: Vec<bool>,
    /// Extended numeric capabilities
    pub ext_numbers: Vec<i32>,
    /// Extended string capabilities
    pub ext_strings: Vec<String>,
    /// Extended boolean capability name to its index in `ext_booleans`
    pub ext_boolean_names: BTreeMap<String, usize>,
    /// Extended numeric capability name to its index in `ext_numbers`
    pub ext_number_names: BTreeMap<String, usize>,
    /// Extended string capability name to its index in `ext_strings`
    pub ext_string_names: BTreeMap<String, usize>,
}

impl Terminfo {
    /// Boolean capability by canonical index, `None` when absent
    #[must_use]
    pub fn boolean(&self, index: usize) -> Option<bool> {
        if self.booleans_absent.contains(&index) {
            return None;
        }
        self.booleans.get(index).copied()
    }

    /// Numeric capability by canonical index, `None` when absent
    #[must_use]
    pub fn number(&self, index: usize) -> Option<i32> {
        if self.numbers_absent.contains(&index) {
            return None;
        }
        self.numbers.get(index).copied()
    }

    /// String capability by canonical index, `None` when absent
    #[must_use]
    pub fn string(&self, index: usize) -> Option<&str> {
        if self.strings_absent.contains(&index) {
            return None;
        }
        self.strings.get(index).map(String::as_str)
    }

    /// Extended boolean capability by name
    #[must_use]
    pub fn ext_boolean(&self, name: &str) -> Option<bool> {
        let index = self.ext_boolean_names.get(name)?;
        self.ext_booleans.get(*index).copied()
    }

    /// Extended numeric capability by name
    #[must_use]
    pub fn ext_number(&self, name: &str) -> Option<i32> {
        let index = self.ext_number_names.get(name)?;
        self.ext_numbers.get(*index).copied()
    }

    /// Extended string capability by name
    #[must_use]
    pub fn ext_string(&self, name: &str) -> Option<&str> {
        let index = self.ext_string_names.get(name)?;
        self.ext_strings.get(*index).map(String::as_str)
    }

    /// Expand the string capability at `index` through an external
    /// parameter interpreter
    ///
    /// The interpreter receives the raw capability string and the
    /// parameters; this crate never interprets `%` escapes itself.
    /// Returns `None` when the capability is absent.
    pub fn expand_with<F>(&self, index: usize, params: &[i32], expand: F) -> Option<String>
    where
        F: FnOnce(&str, &[i32]) -> String,
    {
        self.string(index).map(|cap| expand(cap, params))
    }
}

/// Decode the compiled terminfo entry contained in `buf`
pub fn decode(buf: &[u8]) -> Result<Terminfo, Error> {
    if buf.len() >= MAX_FILE_SIZE {
        return Err(Error::InvalidFileSize);
    }

    let mut decoder = Decoder::new(buf);

    if decoder.read_i16()? != MAGIC {
        return Err(Error::InvalidMagic);
    }

    let header = Header::read(&mut decoder)?;
    if decoder.remaining() < header.region_len() {
        return Err(Error::UnexpectedFileEnd);
    }

    let names = decoder.read_bytes(header.name_size)?;
    let names = str::from_utf8(names)?
        .trim_end_matches('\0')
        .split('|')
        .map(str::to_owned)
        .collect();

    let (booleans, booleans_absent) = decoder.read_bools(header.bool_count)?;
    let (numbers, numbers_absent) = read_numbers(&mut decoder, header.num_count)?;
    let (strings, strings_absent) =
        decoder.read_strings(header.str_count, header.table_size)?;

    let mut terminfo = Terminfo {
        names,
        booleans,
        booleans_absent,
        numbers,
        numbers_absent,
        strings,
        strings_absent,
        ..Terminfo::default()
    };

    // Most entries stop here; the extended region is optional.
    if decoder.remaining() == 0 {
        return Ok(terminfo);
    }

    decode_extended(&mut decoder, &mut terminfo)?;
    Ok(terminfo)
}

/// Read `count` numeric capabilities
///
/// The absent and canceled sentinels leave zero in the slot and record the
/// index in the returned set.
fn read_numbers(
    decoder: &mut Decoder<'_>,
    count: usize,
) -> Result<(Vec<i32>, BTreeSet<usize>), Error> {
    let mut absent = BTreeSet::new();
    let mut numbers = Vec::with_capacity(count);
    for (index, value) in decoder.read_ints(count)?.into_iter().enumerate() {
        if value < 0 {
            absent.insert(index);
            numbers.push(0);
        } else {
            numbers.push(i32::from(value));
        }
    }
    Ok((numbers, absent))
}

fn decode_extended(decoder: &mut Decoder<'_>, terminfo: &mut Terminfo) -> Result<(), Error> {
    let header = ExtHeader::read(decoder)?;

    // The extended region is self-describing: the bytes left over after the
    // legacy region must match its declared length exactly.
    if decoder.remaining() != header.region_len() {
        return Err(Error::InvalidExtendedHeader);
    }

    (terminfo.ext_booleans, _) = decoder.read_bools(header.bool_count)?;
    (terminfo.ext_numbers, _) = read_numbers(decoder, header.num_count)?;

    // One combined table holds the extended string values followed by the
    // names of all extended capabilities, in the fixed order: values,
    // boolean names, numeric names, string names.
    let (table, _) = decoder.read_strings(header.offsets(), header.table_size)?;
    let mut entries = table.into_iter();

    terminfo.ext_strings = entries.by_ref().take(header.str_count).collect();
    if terminfo.ext_strings.len() != header.str_count {
        return Err(Error::InvalidStringTable);
    }
    terminfo.ext_boolean_names = take_names(&mut entries, header.bool_count)?;
    terminfo.ext_number_names = take_names(&mut entries, header.num_count)?;
    terminfo.ext_string_names = take_names(&mut entries, header.str_count)?;

    Ok(())
}

/// Collect the next `count` entries as a capability name to index mapping
fn take_names(
    entries: &mut impl Iterator<Item = String>,
    count: usize,
) -> Result<BTreeMap<String, usize>, Error> {
    let mut names = BTreeMap::new();
    for index in 0..count {
        let name = entries.next().ok_or(Error::InvalidStringTable)?;
        if name.is_empty() {
            return Err(Error::InvalidStringTable);
        }
        names.insert(name, index);
    }
    Ok(names)
}
