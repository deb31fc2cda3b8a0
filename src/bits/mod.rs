/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Bit streams and instantaneous codes.
//!
//! The BV format is a plain sequence of bits, read from each byte most
//! significant bit first. [`BitReader`] presents such a stream on top of a
//! [`WordRead`] backend (a memory buffer or a file with a small read-ahead
//! buffer), and [`CodesRead`] layers the universal codes the format uses on
//! top of any [`BitRead`]. [`BitWriter`]/[`CodesWrite`] are the write-side
//! mirrors; the crate itself only needs them to build test fixtures, as it
//! does not compress graphs.

mod word;
pub use word::{FileWordReader, MemWordReader, WordBackend, WordRead};

mod reader;
pub use reader::{BitRead, BitReader};

mod writer;
pub use writer::{BitWrite, BitWriter};

mod codes;
pub use codes::{CodesRead, CodesWrite};
