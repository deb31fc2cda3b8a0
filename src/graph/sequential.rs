/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::codecs::{Decode, DynDecoder};
use super::decode::decode_successors;
use super::BvGraph;
use crate::bits::{BitReader, WordBackend};
use crate::utils::CircularBuffer;
use crate::{Error, Result};
use lender::*;

/// A sequential iterator over the nodes of a graph and their successors.
///
/// The iterator needs no offsets: it decodes every record in node order,
/// keeping the last `window_size` successor lists in a circular buffer to
/// serve reference copies. Its total work is linear in the size of the
/// `.graph` stream.
///
/// A decoding error invalidates the iterator: the failing call returns the
/// error, and afterwards [`valid`](SequentialIter::valid) is false.
#[derive(Debug)]
pub struct SequentialIter<'a> {
    decoder: DynDecoder<WordBackend<'a>>,
    backrefs: CircularBuffer<Vec<usize>>,
    window_size: usize,
    min_interval_length: usize,
    number_of_nodes: usize,
    curr: usize,
    failed: bool,
}

impl<'a> SequentialIter<'a> {
    pub(crate) fn new(graph: &'a BvGraph) -> Result<Self> {
        let decoder = DynDecoder::new(BitReader::new(graph.word_backend()?), graph.properties())?;
        Ok(Self {
            decoder,
            // one extra slot so the list being decoded does not overwrite a
            // referable one
            backrefs: CircularBuffer::new(graph.window_size() + 1),
            window_size: graph.window_size(),
            min_interval_length: graph.min_interval_length(),
            number_of_nodes: graph.num_nodes(),
            curr: 0,
            failed: false,
        })
    }

    /// Whether the iterator still has nodes to yield.
    pub fn valid(&self) -> bool {
        !self.failed && self.curr < self.number_of_nodes
    }

    /// The node the next call to
    /// [`next_successors`](SequentialIter::next_successors) will decode.
    pub fn current_node(&self) -> usize {
        self.curr
    }

    /// The bit offset the decoder will read next; right before decoding a
    /// node this is where its record begins.
    pub fn bit_pos(&self) -> u64 {
        self.decoder.bit_pos()
    }

    /// Decodes the next node, returning it with its successors.
    ///
    /// The returned slice stays valid until the next call. Returns `None`
    /// when the nodes are exhausted.
    pub fn next_successors(&mut self) -> Result<Option<(usize, &[usize])>> {
        if self.failed {
            return Err(Error::Unsupported);
        }
        if self.curr >= self.number_of_nodes {
            return Ok(None);
        }
        let node = self.curr;
        let mut successors = self.backrefs.take(node);
        successors.clear();
        match self.decode_node(node, &mut successors) {
            Ok(()) => {
                let successors = self.backrefs.replace(node, successors).as_slice();
                self.curr += 1;
                Ok(Some((node, successors)))
            }
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    fn decode_node(&mut self, node: usize, out: &mut Vec<usize>) -> Result<()> {
        let degree = self.decoder.read_outdegree()? as usize;
        if degree == 0 {
            return Ok(());
        }
        out.reserve(degree.saturating_sub(out.capacity()));
        let reference_node = if self.window_size != 0 {
            let ref_delta = self.decoder.read_reference_offset()? as usize;
            if ref_delta == 0 {
                None
            } else {
                if ref_delta > node || ref_delta > self.window_size {
                    return Err(Error::CorruptGraph("reference outside the window"));
                }
                Some(node - ref_delta)
            }
        } else {
            None
        };
        let reference = reference_node.map(|reference| self.backrefs[reference].as_slice());
        decode_successors(
            &mut self.decoder,
            node,
            degree,
            reference,
            self.min_interval_length,
            out,
        )
    }
}

impl<'a, 'succ> Lending<'succ> for SequentialIter<'a> {
    type Lend = (usize, &'succ [usize]);
}

impl<'a> Lender for SequentialIter<'a> {
    #[inline]
    fn next(&mut self) -> Option<Lend<'_, Self>> {
        self.next_successors().ok().flatten()
    }
}
