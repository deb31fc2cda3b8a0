/*
 * SPDX-FileCopyrightText: 2023 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::{Error, Result};
use mmap_rs::{Mmap, MmapFlags, MmapOptions};
use std::path::Path;

/// A read-only memory mapping of a file, exposed as a byte slice.
///
/// The main use case is to read the `.graph` bit stream without copying it
/// into allocated memory.
pub struct MmapBackend {
    mmap: Mmap,
    len: usize,
}

impl core::fmt::Debug for MmapBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MmapBackend")
            .field("mmap", &self.mmap.as_ptr())
            .field("len", &self.len)
            .finish()
    }
}

fn mmap_err(e: mmap_rs::Error) -> Error {
    Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}

impl MmapBackend {
    /// Maps the file at `path` read-only.
    pub fn load<P: AsRef<Path>>(path: P, flags: MmapFlags) -> Result<Self> {
        let file_len = path.as_ref().metadata()?.len() as usize;
        let file = std::fs::File::open(path.as_ref())?;
        // mmap_rs rejects zero-length mappings
        let capacity = file_len.max(1);
        let mmap = unsafe {
            MmapOptions::new(capacity)
                .map_err(mmap_err)?
                .with_flags(flags)
                .with_file(&file, 0)
                .map()
                .map_err(mmap_err)?
        };

        Ok(Self {
            mmap,
            len: file_len,
        })
    }

    /// The length of the mapped file in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the mapped file is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for MmapBackend {
    fn as_ref(&self) -> &[u8] {
        &self.mmap[..self.len]
    }
}
