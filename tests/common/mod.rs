/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Fixture support: a minimal encoder for the record layout the crate
//! decodes, plus writers for the `.graph`/`.properties`/`.offsets` files.
//!
//! The encoder picks references greedily by intersection size, bounds
//! reference chains like a real compressor would, and emits copy blocks,
//! intervals, and residuals; it exists to produce test inputs, not to
//! compress well.

// not every test binary uses every helper
#![allow(dead_code)]

use bvg::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Compression parameters of a fixture graph.
#[derive(Debug, Clone, Copy)]
pub struct Params {
    pub window_size: usize,
    pub max_ref_count: usize,
    pub min_interval_length: usize,
    pub zeta_k: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            window_size: 7,
            max_ref_count: 3,
            min_interval_length: 3,
            zeta_k: 3,
        }
    }
}

/// An encoded graph: the `.graph` bytes and the bit offset of every record.
pub struct Encoded {
    pub graph: Vec<u8>,
    pub offsets: Vec<u64>,
    pub arcs: u64,
}

fn write_gamma_nat(writer: &mut BitWriter, value: i64) {
    writer.write_gamma(int2nat(value)).unwrap();
}

/// Splits `values` (sorted, unique) into maximal runs of consecutive
/// integers at least `min_len` long, returning `(runs, rest)`.
fn intervalize(values: &[usize], min_len: usize) -> (Vec<(usize, usize)>, Vec<usize>) {
    let mut runs = Vec::new();
    let mut rest = Vec::new();
    let mut i = 0;
    while i < values.len() {
        let mut j = i + 1;
        while j < values.len() && values[j] == values[j - 1] + 1 {
            j += 1;
        }
        if j - i >= min_len {
            runs.push((values[i], j - i));
        } else {
            rest.extend_from_slice(&values[i..j]);
        }
        i = j;
    }
    (runs, rest)
}

/// Encodes `lists` into a `.graph` bit stream.
pub fn encode(lists: &[Vec<usize>], params: Params) -> Encoded {
    let mut writer = BitWriter::new();
    let mut offsets = Vec::with_capacity(lists.len());
    let mut arcs = 0u64;
    // length of the reference chain ending at each node
    let mut chain = vec![0usize; lists.len()];

    for (node, successors) in lists.iter().enumerate() {
        offsets.push(writer.bit_len());
        arcs += successors.len() as u64;
        writer.write_gamma(successors.len() as u64).unwrap();
        if successors.is_empty() {
            continue;
        }

        let mut copied: Vec<usize> = Vec::new();
        if params.window_size > 0 {
            let mut best: Option<(usize, Vec<usize>)> = None;
            for delta in 1..=params.window_size.min(node) {
                if chain[node - delta] + 1 > params.max_ref_count {
                    continue;
                }
                let shared: Vec<usize> = lists[node - delta]
                    .iter()
                    .copied()
                    .filter(|v| successors.binary_search(v).is_ok())
                    .collect();
                if !shared.is_empty()
                    && best.as_ref().map_or(true, |(_, b)| shared.len() > b.len())
                {
                    best = Some((delta, shared));
                }
            }
            match best {
                Some((delta, shared)) => {
                    // reference offsets use the unary code by default
                    writer.write_unary(delta as u64).unwrap();
                    chain[node] = chain[node - delta] + 1;
                    let reference = &lists[node - delta];
                    if shared.len() == reference.len() {
                        // every successor of the reference is copied
                        writer.write_gamma(0).unwrap();
                    } else {
                        let mut runs: Vec<usize> = Vec::new();
                        let mut included = true;
                        let mut run = 0usize;
                        for value in reference {
                            let this = shared.binary_search(value).is_ok();
                            if this == included {
                                run += 1;
                            } else {
                                runs.push(run);
                                included = this;
                                run = 1;
                            }
                        }
                        runs.push(run);
                        writer.write_gamma(runs.len() as u64).unwrap();
                        writer.write_gamma(runs[0] as u64).unwrap();
                        for &run in &runs[1..] {
                            writer.write_gamma(run as u64 - 1).unwrap();
                        }
                    }
                    copied = shared;
                }
                None => writer.write_unary(0).unwrap(),
            }
        }

        let remaining: Vec<usize> = successors
            .iter()
            .copied()
            .filter(|v| copied.binary_search(v).is_err())
            .collect();
        let mut residuals = remaining.clone();
        if !remaining.is_empty() && params.min_interval_length > 0 {
            let (runs, rest) = intervalize(&remaining, params.min_interval_length);
            residuals = rest;
            writer.write_gamma(runs.len() as u64).unwrap();
            let mut prev_end: Option<usize> = None;
            for &(start, len) in &runs {
                match prev_end {
                    None => write_gamma_nat(&mut writer, start as i64 - node as i64),
                    Some(end) => writer.write_gamma((start - end - 1) as u64).unwrap(),
                }
                writer
                    .write_gamma((len - params.min_interval_length) as u64)
                    .unwrap();
                prev_end = Some(start + len);
            }
        }
        if !residuals.is_empty() {
            let mut prev = residuals[0];
            let first = int2nat(residuals[0] as i64 - node as i64);
            writer.write_zeta(first, params.zeta_k).unwrap();
            for &value in &residuals[1..] {
                writer
                    .write_zeta((value - prev - 1) as u64, params.zeta_k)
                    .unwrap();
                prev = value;
            }
        }
    }

    Encoded {
        graph: writer.into_bytes(),
        offsets,
        arcs,
    }
}

/// A graph written to disk under a temporary directory.
pub struct Fixture {
    // dropping the directory deletes the files
    #[allow(dead_code)]
    dir: tempfile::TempDir,
    pub basename: PathBuf,
    pub lists: Vec<Vec<usize>>,
    pub offsets: Vec<u64>,
    pub arcs: u64,
}

/// Encodes `lists` and writes `basename.{graph,properties}` (plus
/// `basename.offsets` when `with_offsets_file` is set) in a fresh
/// temporary directory.
pub fn write_fixture(
    lists: Vec<Vec<usize>>,
    params: Params,
    with_offsets_file: bool,
) -> anyhow::Result<Fixture> {
    let encoded = encode(&lists, params);
    let dir = tempfile::TempDir::new()?;
    let basename = dir.path().join("graph");

    std::fs::write(basename.with_extension("graph"), &encoded.graph)?;
    write_properties(&basename, lists.len(), &encoded, params)?;
    if with_offsets_file {
        write_offsets_file(&basename, &encoded.offsets)?;
    }

    Ok(Fixture {
        dir,
        basename,
        lists,
        offsets: encoded.offsets,
        arcs: encoded.arcs,
    })
}

fn write_properties(
    basename: &Path,
    nodes: usize,
    encoded: &Encoded,
    params: Params,
) -> anyhow::Result<()> {
    let bits_per_link = if encoded.arcs == 0 {
        0.0
    } else {
        encoded.graph.len() as f64 * 8.0 / encoded.arcs as f64
    };
    let mut file = std::fs::File::create(basename.with_extension("properties"))?;
    writeln!(file, "#BVGraph properties")?;
    writeln!(file, "version=0")?;
    writeln!(file, "nodes={}", nodes)?;
    writeln!(file, "arcs={}", encoded.arcs)?;
    writeln!(file, "windowsize={}", params.window_size)?;
    writeln!(file, "maxrefcount={}", params.max_ref_count)?;
    writeln!(file, "minintervallength={}", params.min_interval_length)?;
    writeln!(file, "zetak={}", params.zeta_k)?;
    writeln!(file, "bitsperlink={}", bits_per_link)?;
    writeln!(file, "compressionflags=")?;
    Ok(())
}

fn write_offsets_file(basename: &Path, offsets: &[u64]) -> anyhow::Result<()> {
    let mut writer = BitWriter::new();
    let mut prev = 0;
    for &offset in offsets {
        writer.write_gamma(offset - prev).unwrap();
        prev = offset;
    }
    std::fs::write(basename.with_extension("offsets"), writer.into_bytes())?;
    Ok(())
}

/// Collects every `(node, successors)` pair of a sequential walk.
pub fn collect_sequential(graph: &BvGraph) -> anyhow::Result<Vec<Vec<usize>>> {
    let mut iter = graph.iter()?;
    let mut lists = Vec::with_capacity(graph.num_nodes());
    while let Some((node, successors)) = iter.next_successors()? {
        assert_eq!(node, lists.len());
        lists.push(successors.to_vec());
    }
    Ok(lists)
}
