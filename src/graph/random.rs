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

/// A random-access iterator over the successors of arbitrary nodes.
///
/// Construction requires the graph to be loaded with offsets. Every query
/// seeks to the record of the requested node; reference copies are honored
/// by transitively decoding the referenced nodes, which by construction are
/// at most `max_ref_count` seeks away. A cache of `window_size + 1`
/// recently decoded lists, keyed by node, makes reference chains and nearby
/// queries cheap.
///
/// The iterator is not meant to be shared: callers wanting concurrency
/// create one iterator per thread.
#[derive(Debug)]
pub struct RandomIter<'a> {
    graph: &'a BvGraph,
    decoder: DynDecoder<WordBackend<'a>>,
    cache: CircularBuffer<Option<(usize, Vec<usize>)>>,
}

impl<'a> RandomIter<'a> {
    pub(crate) fn new(graph: &'a BvGraph) -> Result<Self> {
        if graph.offsets().is_none() {
            return Err(Error::RequiresOffsets);
        }
        let decoder = DynDecoder::new(BitReader::new(graph.word_backend()?), graph.properties())?;
        Ok(Self {
            graph,
            decoder,
            cache: CircularBuffer::new(graph.window_size() + 1),
        })
    }

    fn check_node(&self, node: usize) -> Result<()> {
        if node >= self.graph.num_nodes() {
            return Err(Error::VertexOutOfRange {
                node,
                nodes: self.graph.num_nodes(),
            });
        }
        Ok(())
    }

    /// Returns the outdegree of `node`, reading nothing else of its record.
    pub fn outdegree(&mut self, node: usize) -> Result<u64> {
        self.check_node(node)?;
        self.decoder.seek_bit(self.graph.offsets().get(node))?;
        self.decoder.read_outdegree()
    }

    /// Returns the successors of `node`, in strictly increasing order.
    ///
    /// The returned slice stays valid until the next call.
    pub fn successors(&mut self, node: usize) -> Result<&[usize]> {
        self.check_node(node)?;
        self.decode_cached(node, 0)?;
        let Some((cached, successors)) = &self.cache[node] else {
            unreachable!("the list was just decoded");
        };
        debug_assert_eq!(*cached, node);
        Ok(successors.as_slice())
    }

    /// Decodes the record of `node` into the cache, chasing references.
    ///
    /// `depth` is the length of the reference chain walked so far; a stream
    /// encoded with `max_ref_count` cannot exceed it.
    fn decode_cached(&mut self, node: usize, depth: usize) -> Result<()> {
        if let Some((cached, _)) = &self.cache[node] {
            if *cached == node {
                return Ok(());
            }
        }
        let max_ref_count = self.graph.max_ref_count();
        if max_ref_count != 0 && depth > max_ref_count {
            return Err(Error::CorruptGraph("reference chain too long"));
        }
        self.decoder.seek_bit(self.graph.offsets().get(node))?;
        let degree = self.decoder.read_outdegree()? as usize;
        let mut successors = Vec::with_capacity(degree);
        if degree != 0 {
            let reference_node = if self.graph.window_size() != 0 {
                let ref_delta = self.decoder.read_reference_offset()? as usize;
                if ref_delta == 0 {
                    None
                } else {
                    if ref_delta > node || ref_delta > self.graph.window_size() {
                        return Err(Error::CorruptGraph("reference outside the window"));
                    }
                    Some(node - ref_delta)
                }
            } else {
                None
            };
            match reference_node {
                Some(reference_node) => {
                    // park the stream, decode the referenced list, come back
                    let resume_at = self.decoder.bit_pos();
                    self.decode_cached(reference_node, depth + 1)?;
                    self.decoder.seek_bit(resume_at)?;
                    let Some((cached, reference)) = &self.cache[reference_node] else {
                        unreachable!("the referenced list was just decoded");
                    };
                    debug_assert_eq!(*cached, reference_node);
                    decode_successors(
                        &mut self.decoder,
                        node,
                        degree,
                        Some(reference.as_slice()),
                        self.graph.min_interval_length(),
                        &mut successors,
                    )?;
                }
                None => decode_successors(
                    &mut self.decoder,
                    node,
                    degree,
                    None,
                    self.graph.min_interval_length(),
                    &mut successors,
                )?,
            }
        }
        self.cache.replace(node, Some((node, successors)));
        Ok(())
    }
}
