/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::Result;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// How many zero words a backend serves past the end of the data before
/// erroring out. A [`BitReader`](super::BitReader) refill needs at most two
/// words beyond the last meaningful bit, so this bounds corrupt unary runs
/// without making legitimate reads near the end fail.
const PAST_END_WORDS: u32 = 2;

/// A seekable source of big-endian `u64` words.
///
/// The last word of a stream whose byte length is not a multiple of 8 is
/// zero-padded on the right.
pub trait WordRead {
    /// Reads the next word and advances the position.
    fn read_word(&mut self) -> Result<u64>;

    /// Returns the index of the word the next [`read_word`](WordRead::read_word)
    /// call will return.
    fn position(&self) -> u64;

    /// Sets the position so that the `word_index`-th word is read next.
    fn set_position(&mut self, word_index: u64) -> Result<()>;
}

fn past_end_error() -> crate::Error {
    crate::Error::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "read past the end of the bit stream",
    ))
}

/// A [`WordRead`] over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct MemWordReader<'a> {
    data: &'a [u8],
    word_index: u64,
    past_end: u32,
}

impl<'a> MemWordReader<'a> {
    /// Creates a new reader over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            word_index: 0,
            past_end: 0,
        }
    }
}

impl WordRead for MemWordReader<'_> {
    #[inline]
    fn read_word(&mut self) -> Result<u64> {
        let start = (self.word_index as usize).saturating_mul(8);
        if start >= self.data.len() {
            if self.past_end >= PAST_END_WORDS {
                return Err(past_end_error());
            }
            self.past_end += 1;
            self.word_index += 1;
            return Ok(0);
        }
        let mut buf = [0u8; 8];
        let end = (start + 8).min(self.data.len());
        buf[..end - start].copy_from_slice(&self.data[start..end]);
        self.word_index += 1;
        Ok(u64::from_be_bytes(buf))
    }

    #[inline]
    fn position(&self) -> u64 {
        self.word_index
    }

    #[inline]
    fn set_position(&mut self, word_index: u64) -> Result<()> {
        self.word_index = word_index;
        self.past_end = 0;
        Ok(())
    }
}

/// A [`WordRead`] over a file, with a 16 KiB read-ahead buffer.
///
/// Seeking discards the read-ahead buffer, so random access through this
/// backend pays one refill per seek. It owns its file handle: it cannot be
/// shared across threads, but any number of them can be opened on the same
/// path.
#[derive(Debug)]
pub struct FileWordReader {
    file: BufReader<File>,
    len: u64,
    word_index: u64,
    past_end: u32,
}

/// Read-ahead for [`FileWordReader`].
const READ_AHEAD_BYTES: usize = 16 * 1024;

impl FileWordReader {
    /// Opens the file at `path` for word-level reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let len = path.as_ref().metadata()?.len();
        let file = BufReader::with_capacity(READ_AHEAD_BYTES, File::open(path)?);
        Ok(Self {
            file,
            len,
            word_index: 0,
            past_end: 0,
        })
    }
}

impl WordRead for FileWordReader {
    #[inline]
    fn read_word(&mut self) -> Result<u64> {
        let start = self.word_index * 8;
        if start >= self.len {
            if self.past_end >= PAST_END_WORDS {
                return Err(past_end_error());
            }
            self.past_end += 1;
            self.word_index += 1;
            return Ok(0);
        }
        let mut buf = [0u8; 8];
        let valid = (self.len - start).min(8) as usize;
        self.file.read_exact(&mut buf[..valid])?;
        self.word_index += 1;
        Ok(u64::from_be_bytes(buf))
    }

    #[inline]
    fn position(&self) -> u64 {
        self.word_index
    }

    fn set_position(&mut self, word_index: u64) -> Result<()> {
        if word_index * 8 < self.len {
            self.file.seek(SeekFrom::Start(word_index * 8))?;
        }
        self.word_index = word_index;
        self.past_end = 0;
        Ok(())
    }
}

/// Either of the two word backends, chosen at graph-load time.
///
/// The dispatch cost is one branch per 64 decoded bits, which keeps the
/// iterator types non-generic.
#[derive(Debug)]
pub enum WordBackend<'a> {
    /// The graph bytes are in memory (owned, borrowed, or mapped).
    Mem(MemWordReader<'a>),
    /// The graph bytes stay on disk.
    File(FileWordReader),
}

impl WordRead for WordBackend<'_> {
    #[inline]
    fn read_word(&mut self) -> Result<u64> {
        match self {
            WordBackend::Mem(r) => r.read_word(),
            WordBackend::File(r) => r.read_word(),
        }
    }

    #[inline]
    fn position(&self) -> u64 {
        match self {
            WordBackend::Mem(r) => r.position(),
            WordBackend::File(r) => r.position(),
        }
    }

    #[inline]
    fn set_position(&mut self, word_index: u64) -> Result<()> {
        match self {
            WordBackend::Mem(r) => r.set_position(word_index),
            WordBackend::File(r) => r.set_position(word_index),
        }
    }
}
