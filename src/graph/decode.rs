/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Decoding of a single successor record.
//!
//! A record, after its outdegree and reference offset, consists of three
//! groups: block-masked copies from the referenced list, intervals of
//! consecutive successors, and residual gaps. The three resulting lists are
//! sorted and pairwise disjoint, so a three-way merge reconstructs the
//! successor list.
//!
//! The caller resolves the reference offset to an actual successor list
//! (from its window or its cache), so this module stays independent of how
//! back references are kept.

use super::codecs::Decode;
use crate::utils::nat2int;
use crate::{Error, Result};

/// Adds a signed offset to a node identifier.
fn signed_offset(node: usize, offset: i64) -> Result<usize> {
    let value = node as i64 + offset;
    if value < 0 {
        return Err(Error::CorruptGraph("negative successor"));
    }
    Ok(value as usize)
}

/// Copies the successors of the referenced list selected by the block mask.
///
/// The first block length may be zero, the following ones are stored
/// decremented; blocks alternate copy and skip, starting with copy, and the
/// part of the list after the last block is copied when the number of
/// blocks is even.
fn copy_blocks<D: Decode>(
    decoder: &mut D,
    reference: &[usize],
    out: &mut Vec<usize>,
) -> Result<()> {
    let block_count = decoder.read_block_count()? as usize;
    if block_count == 0 {
        out.extend_from_slice(reference);
        return Ok(());
    }
    let mut idx = decoder.read_block()? as usize;
    if idx > reference.len() {
        return Err(Error::CorruptGraph("copy block beyond referenced list"));
    }
    out.extend_from_slice(&reference[..idx]);
    for block_id in 1..block_count {
        let block = decoder.read_block()? as usize + 1;
        let end = idx + block;
        if end > reference.len() {
            return Err(Error::CorruptGraph("copy block beyond referenced list"));
        }
        if block_id % 2 == 0 {
            out.extend_from_slice(&reference[idx..end]);
        }
        idx = end;
    }
    if block_count % 2 == 0 {
        out.extend_from_slice(&reference[idx..]);
    }
    Ok(())
}

/// Merges three sorted, disjoint lists.
fn merge3(a: &[usize], b: &[usize], c: &[usize], out: &mut Vec<usize>) {
    out.reserve(a.len() + b.len() + c.len());
    let (mut i, mut j, mut k) = (0, 0, 0);
    loop {
        let x = a.get(i).copied().unwrap_or(usize::MAX);
        let y = b.get(j).copied().unwrap_or(usize::MAX);
        let z = c.get(k).copied().unwrap_or(usize::MAX);
        if x <= y && x <= z {
            if x == usize::MAX {
                return;
            }
            out.push(x);
            i += 1;
        } else if y <= z {
            out.push(y);
            j += 1;
        } else {
            out.push(z);
            k += 1;
        }
    }
}

/// Decodes the body of the record of `node` into `out`.
///
/// The decoder must be positioned just after the reference offset (or after
/// the outdegree when the window is disabled), with `reference` holding the
/// resolved referenced list when the reference offset was non-zero.
pub(crate) fn decode_successors<D: Decode>(
    decoder: &mut D,
    node: usize,
    degree: usize,
    reference: Option<&[usize]>,
    min_interval_length: usize,
    out: &mut Vec<usize>,
) -> Result<()> {
    debug_assert!(out.is_empty());
    if degree == 0 {
        return Ok(());
    }

    let mut copied = Vec::new();
    if let Some(reference) = reference {
        copy_blocks(decoder, reference, &mut copied)?;
        if copied.len() > degree {
            return Err(Error::CorruptGraph("copied more successors than the outdegree"));
        }
    }

    let mut intervals = Vec::new();
    let mut left_to_decode = degree - copied.len();
    if left_to_decode != 0 && min_interval_length != 0 {
        let interval_count = decoder.read_interval_count()? as usize;
        if interval_count != 0 {
            let mut start = signed_offset(node, nat2int(decoder.read_interval_start()?))?;
            let mut len = decoder.read_interval_len()? as usize + min_interval_length;
            if len > left_to_decode {
                return Err(Error::CorruptGraph("intervals cover more than the outdegree"));
            }
            intervals.extend(start..start + len);
            for _ in 1..interval_count {
                start = start + len + 1 + decoder.read_interval_start()? as usize;
                len = decoder.read_interval_len()? as usize + min_interval_length;
                if intervals.len() + len > left_to_decode {
                    return Err(Error::CorruptGraph("intervals cover more than the outdegree"));
                }
                intervals.extend(start..start + len);
            }
        }
    }
    left_to_decode -= intervals.len();

    let mut residuals = Vec::with_capacity(left_to_decode);
    if left_to_decode != 0 {
        let mut prev = signed_offset(node, nat2int(decoder.read_first_residual()?))?;
        residuals.push(prev);
        for _ in 1..left_to_decode {
            prev = prev + 1 + decoder.read_residual()? as usize;
            residuals.push(prev);
        }
    }

    merge3(&copied, &intervals, &residuals, out);
    Ok(())
}
