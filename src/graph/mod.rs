/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Reading of graphs in the Bv format.
//!
//! The format has been described by Paolo Boldi and Sebastiano Vigna in "[The
//! WebGraph Framework I: Compression
//! Techniques](https://dl.acm.org/doi/10.1145/988672.988752)", *Proc. of the
//! Thirteenth World–Wide Web Conference*, pages 595–601, 2004, ACM Press.
//!
//! [`BvGraph::load`] reads the `.properties`, `.graph`, and optionally
//! `.offsets` files sharing a basename, and yields an immutable graph
//! object from which any number of [sequential](SequentialIter) and
//! [random-access](RandomIter) iterators can be created.

use crate::bits::{BitReader, FileWordReader, MemWordReader, WordBackend};
use crate::eflist::EliasFanoList;
use crate::utils::MmapBackend;
use crate::{Error, Result};
use dsi_progress_logger::prelude::*;
use std::path::{Path, PathBuf};

pub const GRAPH_EXTENSION: &str = "graph";
pub const PROPERTIES_EXTENSION: &str = "properties";
pub const OFFSETS_EXTENSION: &str = "offsets";

pub mod properties;
pub use properties::Properties;

pub mod codecs;
pub use codecs::{Code, Decode, DynDecoder};

mod decode;

pub mod offsets;
pub use offsets::Offsets;

pub mod sequential;
pub use sequential::SequentialIter;

pub mod random;
pub use random::RandomIter;

/// Prelude module to import the main graph types.
pub mod prelude {
    pub use super::{
        BvGraph, Code, Offsets, Properties, RandomIter, RequiredMemory, SequentialIter,
    };
}

/// Where the `.graph` bit stream lives.
#[derive(Debug)]
enum GraphData {
    /// Owned by the graph.
    Bytes(Box<[u8]>),
    /// Memory-mapped from disk.
    Mmap(MmapBackend),
    /// Left on disk; iterators open their own file handle.
    Disk(PathBuf),
}

impl GraphData {
    fn byte_len(&self) -> Result<u64> {
        Ok(match self {
            GraphData::Bytes(bytes) => bytes.len() as u64,
            GraphData::Mmap(mmap) => mmap.len() as u64,
            GraphData::Disk(path) => path.metadata()?.len(),
        })
    }
}

/// The memory a graph would need under a given `offset_step`, as reported
/// by [`BvGraph::required_memory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredMemory {
    /// Bytes for the `.graph` stream.
    pub graph_bytes: u64,
    /// Bytes for a dense offset array.
    pub offset_bytes: u64,
    /// Bytes for an Elias–Fano offset list.
    pub ef_bytes: u64,
}

/// An immutable graph in the Bv format.
///
/// The `offset_step` argument of the loading constructors selects the
/// offset index:
///
/// * `-1`: no offsets; the `.graph` stream stays on disk and only
///   sequential iteration is possible.
/// * `0`: no offsets; the stream is loaded in memory.
/// * `1`: a dense array of 64-bit offsets, read from the `.offsets` file
///   when possible and otherwise reconstructed by a sequential scan.
/// * `2`: an Elias–Fano list over the offsets, from the same sources.
/// * above `2`: a budget in MiB; dense offsets are used if they fit,
///   otherwise the Elias–Fano list.
///
/// The graph is immutable after loading, so iterators can be created
/// freely; each owns its decoding state. Dropping the graph releases the
/// stream and the offsets, and the borrow checker guarantees no iterator
/// outlives it.
#[derive(Debug)]
pub struct BvGraph {
    props: Properties,
    data: GraphData,
    offsets: Offsets,
    offset_step: i64,
}

impl BvGraph {
    /// Loads the graph with basename `basename`, reading the stream into
    /// memory when `offset_step` is non-negative.
    pub fn load<P: AsRef<Path>>(basename: P, offset_step: i64) -> Result<Self> {
        let basename = basename.as_ref();
        let props = Properties::from_file(basename.with_extension(PROPERTIES_EXTENSION))?;
        let graph_path = basename.with_extension(GRAPH_EXTENSION);
        let data = if offset_step >= 0 {
            GraphData::Bytes(std::fs::read(&graph_path)?.into_boxed_slice())
        } else {
            // make open failures surface at load time, not at first use
            let _ = graph_path.metadata()?;
            GraphData::Disk(graph_path)
        };
        Self::with_data(props, data, offset_step, Some(basename))
    }

    /// Loads the graph with basename `basename`, memory-mapping the stream
    /// instead of reading it.
    pub fn load_mmap<P: AsRef<Path>>(basename: P, offset_step: i64) -> Result<Self> {
        let basename = basename.as_ref();
        let props = Properties::from_file(basename.with_extension(PROPERTIES_EXTENSION))?;
        let data = GraphData::Mmap(MmapBackend::load(
            basename.with_extension(GRAPH_EXTENSION),
            mmap_rs::MmapFlags::empty(),
        )?);
        Self::with_data(props, data, offset_step, Some(basename))
    }

    /// Builds a graph over a caller-supplied `.graph` stream.
    ///
    /// There is no `.offsets` file to read, so `offset_step` values of 1
    /// and above always reconstruct the offsets from the stream; negative
    /// values are not meaningful here and are rejected with
    /// [`Error::Unsupported`].
    pub fn from_bytes(
        bytes: impl Into<Box<[u8]>>,
        props: Properties,
        offset_step: i64,
    ) -> Result<Self> {
        if offset_step < 0 {
            return Err(Error::Unsupported);
        }
        Self::with_data(props, GraphData::Bytes(bytes.into()), offset_step, None)
    }

    fn with_data(
        props: Properties,
        data: GraphData,
        offset_step: i64,
        basename: Option<&Path>,
    ) -> Result<Self> {
        let mut graph = Self {
            props,
            data,
            offsets: Offsets::None,
            offset_step,
        };
        match offset_step {
            i64::MIN..=0 => {}
            1 => graph.offsets = Offsets::Dense(graph.build_dense(basename)?),
            2 => graph.offsets = Offsets::EliasFano(graph.build_ef(basename)?),
            budget_mib => {
                let dense_bytes = 8 * graph.props.nodes as u64;
                if dense_bytes <= (budget_mib as u64) << 20 {
                    graph.offsets = Offsets::Dense(graph.build_dense(basename)?);
                } else {
                    log::warn!(
                        "the {} bytes required for dense offsets exceed the {} MiB budget, loading an Elias-Fano list instead",
                        dense_bytes,
                        budget_mib
                    );
                    graph.offsets = Offsets::EliasFano(graph.build_ef(basename)?);
                }
            }
        }
        Ok(graph)
    }

    /// The number of nodes of the graph.
    pub fn num_nodes(&self) -> usize {
        self.props.nodes
    }

    /// The number of arcs of the graph.
    pub fn num_arcs(&self) -> u64 {
        self.props.arcs
    }

    /// The size of the reference window.
    pub fn window_size(&self) -> usize {
        self.props.window_size
    }

    /// The maximum length of a reference chain.
    pub fn max_ref_count(&self) -> usize {
        self.props.max_ref_count
    }

    /// The minimum interval length; 0 means intervals are disabled.
    pub fn min_interval_length(&self) -> usize {
        self.props.min_interval_length
    }

    /// The parameter of the ζ code.
    pub fn zeta_k(&self) -> u64 {
        self.props.zeta_k
    }

    /// The average number of bits per arc, from the properties.
    pub fn bits_per_link(&self) -> f64 {
        self.props.bits_per_link
    }

    /// The `offset_step` the graph was loaded with.
    pub fn offset_step(&self) -> i64 {
        self.offset_step
    }

    /// The full graph descriptor.
    pub fn properties(&self) -> &Properties {
        &self.props
    }

    /// The offset index of the graph.
    pub fn offsets(&self) -> &Offsets {
        &self.offsets
    }

    /// Returns a sequential iterator positioned on node 0.
    pub fn iter(&self) -> Result<SequentialIter<'_>> {
        SequentialIter::new(self)
    }

    /// Returns a random-access iterator.
    ///
    /// Fails with [`Error::RequiresOffsets`] if the graph was loaded
    /// without offsets.
    pub fn random_iter(&self) -> Result<RandomIter<'_>> {
        RandomIter::new(self)
    }

    /// Opens a word-level view of the `.graph` stream for an iterator.
    pub(crate) fn word_backend(&self) -> Result<WordBackend<'_>> {
        Ok(match &self.data {
            GraphData::Bytes(bytes) => WordBackend::Mem(MemWordReader::new(bytes)),
            GraphData::Mmap(mmap) => WordBackend::Mem(MemWordReader::new(mmap.as_ref())),
            GraphData::Disk(path) => WordBackend::File(FileWordReader::open(path)?),
        })
    }

    /// Streams the offsets read from the `.offsets` file into `push`.
    ///
    /// Returns `Ok(false)` when the file cannot be opened, the single
    /// failure the loading path recovers from (by reconstructing the
    /// offsets online).
    fn stream_offsets_file(
        &self,
        basename: Option<&Path>,
        mut push: impl FnMut(u64) -> Result<()>,
    ) -> Result<bool> {
        let Some(basename) = basename else {
            return Ok(false);
        };
        let path = basename.with_extension(OFFSETS_EXTENSION);
        let words = match FileWordReader::open(&path) {
            Ok(words) => words,
            Err(e) => {
                log::info!(
                    "cannot open {}: {}; reconstructing the offsets from the graph",
                    path.display(),
                    e
                );
                return Ok(false);
            }
        };
        let mut reader = BitReader::new(words);
        let read_offset = DynDecoder::<FileWordReader>::select_code(self.props.offset_code)?;
        let mut offset = 0u64;
        for node in 0..self.props.nodes {
            offset += read_offset(&mut reader, self.props.zeta_k)?;
            if node == 0 && offset != 0 {
                return Err(Error::CorruptGraph("the first offset must be zero"));
            }
            push(offset)?;
        }
        Ok(true)
    }

    /// Streams the offsets reconstructed by a full sequential decoding pass
    /// into `push`.
    fn stream_offsets_online(&self, mut push: impl FnMut(u64) -> Result<()>) -> Result<()> {
        let mut iter = self.iter()?;
        let mut pl = ProgressLogger::default();
        pl.item_name("offset")
            .expected_updates(Some(self.props.nodes));
        pl.start("Reconstructing offsets...");
        for _ in 0..self.props.nodes {
            push(iter.bit_pos())?;
            iter.next_successors()?;
            pl.light_update();
        }
        pl.done();
        Ok(())
    }

    fn build_dense(&self, basename: Option<&Path>) -> Result<Box<[u64]>> {
        let mut offsets = Vec::with_capacity(self.props.nodes);
        let loaded = self.stream_offsets_file(basename, |offset| {
            offsets.push(offset);
            Ok(())
        })?;
        if !loaded {
            offsets.clear();
            self.stream_offsets_online(|offset| {
                offsets.push(offset);
                Ok(())
            })?;
        }
        Ok(offsets.into_boxed_slice())
    }

    fn build_ef(&self, basename: Option<&Path>) -> Result<EliasFanoList> {
        // the properties only provide an estimate of the last offset; the
        // stream length is an exact bound
        let estimate = (self.props.bits_per_link * self.props.arcs as f64) as u64;
        let u = estimate.max(self.data.byte_len()? * 8) + 1;
        let mut ef = EliasFanoList::new(self.props.nodes, u);
        let loaded = self.stream_offsets_file(basename, |offset| ef.push(offset))?;
        if !loaded {
            self.stream_offsets_online(|offset| ef.push(offset))?;
        }
        ef.build_select(true)?;
        Ok(ef)
    }

    /// Computes the memory loading this graph with `offset_step` would
    /// need.
    ///
    /// The typical use is to load the graph with `offset_step = -1` first
    /// and then size the buffers for a full load.
    pub fn required_memory(&self, offset_step: i64) -> Result<RequiredMemory> {
        let mut required = RequiredMemory {
            graph_bytes: 0,
            offset_bytes: 0,
            ef_bytes: 0,
        };
        if offset_step >= 0 {
            required.graph_bytes = self.data.byte_len()?;
            let dense_bytes = 8 * self.props.nodes as u64;
            match offset_step {
                0 => {}
                1 => required.offset_bytes = dense_bytes,
                2 => required.ef_bytes = self.eflist_size_estimate(),
                budget_mib => {
                    if dense_bytes <= (budget_mib as u64) << 20 {
                        required.offset_bytes = dense_bytes;
                    } else {
                        required.ef_bytes = self.eflist_size_estimate();
                    }
                }
            }
        }
        Ok(required)
    }

    /// Estimates the size in bytes of the Elias–Fano offset list, from the
    /// properties alone.
    fn eflist_size_estimate(&self) -> u64 {
        let nodes = self.props.nodes as u64;
        let last = (self.props.bits_per_link * self.props.arcs as f64) as u64;
        let u = last + 1;
        let s = if nodes == 0 {
            0
        } else {
            (u / nodes).max(1).ilog2()
        };
        let mut bytes = (s as u64 * nodes).div_ceil(64) * 8;
        let upper_bits = nodes + (last >> s);
        bytes += upper_bits.div_ceil(64) * 8;
        let window = if upper_bits == 0 {
            1
        } else {
            (nodes * crate::eflist::MAX_ONES_PER_INVENTORY).div_ceil(upper_bits)
        };
        let ones_per_inventory = 1u64 << window.max(1).ilog2();
        bytes += nodes.div_ceil(ones_per_inventory) * 8;
        bytes += crate::eflist::DEFAULT_SPILL_SIZE as u64 * 8;
        bytes
    }
}
