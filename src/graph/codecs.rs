/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::properties::Properties;
use crate::bits::{BitRead, BitReader, CodesRead, WordRead};
use crate::{Error, Result};

/// The instantaneous codes a `.properties` file can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// Unary code.
    Unary,
    /// Elias γ code.
    Gamma,
    /// Elias δ code.
    Delta,
    /// Boldi–Vigna ζ code with parameter `k`.
    Zeta {
        /// The shrinking parameter.
        k: u64,
    },
    /// Nibble code.
    Nibble,
}

/// Decoding of the fields of a successor record.
///
/// One method per field kind, so the code of each can be chosen
/// independently at construction time.
pub trait Decode {
    /// Reads an outdegree.
    fn read_outdegree(&mut self) -> Result<u64>;
    /// Reads a reference offset.
    fn read_reference_offset(&mut self) -> Result<u64>;
    /// Reads the number of copy blocks.
    fn read_block_count(&mut self) -> Result<u64>;
    /// Reads a copy-block length.
    fn read_block(&mut self) -> Result<u64>;
    /// Reads the number of intervals.
    fn read_interval_count(&mut self) -> Result<u64>;
    /// Reads the left extreme of an interval.
    fn read_interval_start(&mut self) -> Result<u64>;
    /// Reads the length of an interval.
    fn read_interval_len(&mut self) -> Result<u64>;
    /// Reads the first residual gap.
    fn read_first_residual(&mut self) -> Result<u64>;
    /// Reads a later residual gap.
    fn read_residual(&mut self) -> Result<u64>;
}

pub(crate) type ReadFn<WR> = fn(&mut BitReader<WR>, u64) -> Result<u64>;

/// A record decoder whose codes are selected once, at construction, from
/// the graph properties.
///
/// Each field kind dispatches through a plain function pointer, so there is
/// no per-bit or per-code branching during decoding.
#[derive(Debug)]
pub struct DynDecoder<WR> {
    reader: BitReader<WR>,
    zeta_k: u64,
    read_outdegree: ReadFn<WR>,
    read_reference_offset: ReadFn<WR>,
    read_block_count: ReadFn<WR>,
    read_block: ReadFn<WR>,
    read_interval_count: ReadFn<WR>,
    read_interval_start: ReadFn<WR>,
    read_interval_len: ReadFn<WR>,
    read_first_residual: ReadFn<WR>,
    read_residual: ReadFn<WR>,
}

impl<WR: WordRead> DynDecoder<WR> {
    const READ_UNARY: ReadFn<WR> = |reader, _| reader.read_unary();
    const READ_GAMMA: ReadFn<WR> = |reader, _| reader.read_gamma();
    const READ_DELTA: ReadFn<WR> = |reader, _| reader.read_delta();
    const READ_ZETA: ReadFn<WR> = |reader, k| reader.read_zeta(k);
    const READ_NIBBLE: ReadFn<WR> = |reader, _| reader.read_nibble();

    /// Returns the decode function for `code`.
    pub(crate) fn select_code(code: Code) -> Result<ReadFn<WR>> {
        match code {
            Code::Unary => Ok(Self::READ_UNARY),
            Code::Gamma | Code::Zeta { k: 1 } => Ok(Self::READ_GAMMA),
            Code::Delta => Ok(Self::READ_DELTA),
            Code::Zeta { k } if (2..=62).contains(&k) => Ok(Self::READ_ZETA),
            Code::Nibble => Ok(Self::READ_NIBBLE),
            code => Err(Error::UnsupportedCoding(format!("{:?}", code))),
        }
    }

    /// Creates a decoder for the codes named by `props`.
    pub fn new(reader: BitReader<WR>, props: &Properties) -> Result<Self> {
        Ok(Self {
            reader,
            zeta_k: props.zeta_k,
            read_outdegree: Self::select_code(props.outdegree_code)?,
            read_reference_offset: Self::select_code(props.reference_code)?,
            read_block_count: Self::select_code(props.block_code)?,
            read_block: Self::select_code(props.block_code)?,
            read_interval_count: Self::select_code(props.interval_code)?,
            read_interval_start: Self::select_code(props.interval_code)?,
            read_interval_len: Self::select_code(props.interval_code)?,
            read_first_residual: Self::select_code(props.residual_code)?,
            read_residual: Self::select_code(props.residual_code)?,
        })
    }

    /// Returns the bit offset of the next bit the decoder will consume.
    pub fn bit_pos(&self) -> u64 {
        self.reader.bit_pos()
    }

    /// Repositions the decoder on an absolute bit offset.
    pub fn seek_bit(&mut self, bit_index: u64) -> Result<()> {
        self.reader.seek_bit(bit_index)
    }
}

impl<WR: WordRead> Decode for DynDecoder<WR> {
    #[inline(always)]
    fn read_outdegree(&mut self) -> Result<u64> {
        (self.read_outdegree)(&mut self.reader, self.zeta_k)
    }

    #[inline(always)]
    fn read_reference_offset(&mut self) -> Result<u64> {
        (self.read_reference_offset)(&mut self.reader, self.zeta_k)
    }

    #[inline(always)]
    fn read_block_count(&mut self) -> Result<u64> {
        (self.read_block_count)(&mut self.reader, self.zeta_k)
    }

    #[inline(always)]
    fn read_block(&mut self) -> Result<u64> {
        (self.read_block)(&mut self.reader, self.zeta_k)
    }

    #[inline(always)]
    fn read_interval_count(&mut self) -> Result<u64> {
        (self.read_interval_count)(&mut self.reader, self.zeta_k)
    }

    #[inline(always)]
    fn read_interval_start(&mut self) -> Result<u64> {
        (self.read_interval_start)(&mut self.reader, self.zeta_k)
    }

    #[inline(always)]
    fn read_interval_len(&mut self) -> Result<u64> {
        (self.read_interval_len)(&mut self.reader, self.zeta_k)
    }

    #[inline(always)]
    fn read_first_residual(&mut self) -> Result<u64> {
        (self.read_first_residual)(&mut self.reader, self.zeta_k)
    }

    #[inline(always)]
    fn read_residual(&mut self) -> Result<u64> {
        (self.read_residual)(&mut self.reader, self.zeta_k)
    }
}
