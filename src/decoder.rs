// Copyright 2026 the terminfo-db authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sequential reader over a compiled terminfo buffer
//!
//! All bounds arithmetic lives here; the decode logic never indexes the
//! buffer directly.

use std::collections::BTreeSet;

use crate::decode::Error;

/// Byte value marking a boolean capability as absent
const ABSENT_BYTE: u8 = 0xff;

pub(crate) struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left to consume
    pub(crate) const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Read the next `n` raw bytes
    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let slice = self
            .buf
            .get(self.pos..self.pos + n)
            .ok_or(Error::UnexpectedFileEnd)?;
        self.pos += n;
        Ok(slice)
    }

    /// Read the next two bytes as a little-endian signed 16-bit integer
    pub(crate) fn read_i16(&mut self) -> Result<i16, Error> {
        let bytes = self.read_bytes(2)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read `count` little-endian signed 16-bit integers
    pub(crate) fn read_ints(&mut self, count: usize) -> Result<Vec<i16>, Error> {
        let bytes = self.read_bytes(2 * count)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect())
    }

    /// Read `count` boolean capability bytes
    ///
    /// The sentinel byte means the capability is absent rather than false;
    /// its index is recorded in the returned set and the slot holds `false`.
    pub(crate) fn read_bools(
        &mut self,
        count: usize,
    ) -> Result<(Vec<bool>, BTreeSet<usize>), Error> {
        let bytes = self.read_bytes(count)?;
        let mut absent = BTreeSet::new();
        let mut bools = Vec::with_capacity(count);
        for (index, byte) in bytes.iter().enumerate() {
            if *byte == ABSENT_BYTE {
                absent.insert(index);
            }
            bools.push(*byte == 1);
        }
        Ok((bools, absent))
    }

    /// Read `count` string-table offsets followed by the table blob of
    /// `table_size` bytes, resolving each offset to a NUL-terminated string
    ///
    /// Sentinel offsets yield an empty string and an entry in the returned
    /// absent set. An offset that does not reach a NUL within the table is
    /// an [`Error::InvalidStringTable`].
    pub(crate) fn read_strings(
        &mut self,
        count: usize,
        table_size: usize,
    ) -> Result<(Vec<String>, BTreeSet<usize>), Error> {
        let offsets = self.read_ints(count)?;
        let table = self.read_bytes(table_size)?;

        let mut absent = BTreeSet::new();
        let mut strings = Vec::with_capacity(count);
        for (index, offset) in offsets.into_iter().enumerate() {
            // -1 is the absent sentinel, -2 the canceled one; neither
            // resolves into the table.
            if offset < 0 {
                absent.insert(index);
                strings.push(String::new());
                continue;
            }
            let tail = table
                .get(offset as usize..)
                .ok_or(Error::InvalidStringTable)?;
            let length = tail
                .iter()
                .position(|byte| *byte == 0)
                .ok_or(Error::InvalidStringTable)?;
            strings.push(str::from_utf8(&tail[..length])?.to_owned());
        }
        Ok((strings, absent))
    }
}
