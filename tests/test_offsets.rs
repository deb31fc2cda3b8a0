/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use bvg::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

mod common;
use common::{write_fixture, Params};

fn random_lists(n: usize, rng: &mut SmallRng) -> Vec<Vec<usize>> {
    (0..n)
        .map(|_| {
            let degree = rng.random_range(0..10);
            let mut successors = std::collections::BTreeSet::new();
            for _ in 0..degree {
                successors.insert(rng.random_range(0..n));
            }
            successors.into_iter().collect()
        })
        .collect()
}

#[test]
fn test_offsets_match_record_starts() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(1);
    let lists = random_lists(200, &mut rng);
    let fixture = write_fixture(lists, Params::default(), true)?;
    let graph = BvGraph::load(&fixture.basename, 1)?;

    for (node, &offset) in fixture.offsets.iter().enumerate() {
        assert_eq!(graph.offsets().get(node), offset);
    }
    Ok(())
}

#[test]
fn test_reconstruction_matches_offsets_file() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(2);
    let lists = random_lists(500, &mut rng);

    // one fixture with the .offsets file, one forcing reconstruction
    let with_file = write_fixture(lists.clone(), Params::default(), true)?;
    let without_file = write_fixture(lists, Params::default(), false)?;

    let from_file = BvGraph::load(&with_file.basename, 1)?;
    let reconstructed = BvGraph::load(&without_file.basename, 1)?;

    assert_eq!(from_file.num_nodes(), reconstructed.num_nodes());
    for node in 0..from_file.num_nodes() {
        assert_eq!(
            from_file.offsets().get(node),
            reconstructed.offsets().get(node)
        );
    }
    Ok(())
}

#[test]
fn test_elias_fano_matches_dense() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(3);
    let lists = random_lists(500, &mut rng);
    let fixture = write_fixture(lists.clone(), Params::default(), true)?;

    let dense = BvGraph::load(&fixture.basename, 1)?;
    let elias_fano = BvGraph::load(&fixture.basename, 2)?;
    assert!(matches!(dense.offsets(), Offsets::Dense(_)));
    assert!(matches!(elias_fano.offsets(), Offsets::EliasFano(_)));

    for node in 0..dense.num_nodes() {
        assert_eq!(dense.offsets().get(node), elias_fano.offsets().get(node));
    }

    // random access works identically through the Elias-Fano index
    let mut random = elias_fano.random_iter()?;
    for (node, expected) in lists.iter().enumerate() {
        itertools::assert_equal(random.successors(node)?, expected);
    }
    Ok(())
}

#[test]
fn test_elias_fano_without_offsets_file() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(4);
    let lists = random_lists(300, &mut rng);
    let fixture = write_fixture(lists, Params::default(), false)?;

    let dense = BvGraph::load(&fixture.basename, 1)?;
    let elias_fano = BvGraph::load(&fixture.basename, 2)?;
    for node in 0..dense.num_nodes() {
        assert_eq!(dense.offsets().get(node), elias_fano.offsets().get(node));
    }
    Ok(())
}

#[test]
fn test_budget_selects_representation() -> Result<()> {
    // 500k nodes need more than 3 MiB of dense offsets
    let lists = vec![vec![]; 500_000];
    let fixture = write_fixture(lists, Params::default(), true)?;

    let graph = BvGraph::load(&fixture.basename, 3)?;
    assert!(matches!(graph.offsets(), Offsets::EliasFano(_)));

    let graph = BvGraph::load(&fixture.basename, 100)?;
    assert!(matches!(graph.offsets(), Offsets::Dense(_)));

    let required = graph.required_memory(3)?;
    assert_eq!(required.offset_bytes, 0);
    assert!(required.ef_bytes > 0);
    let required = graph.required_memory(100)?;
    assert_eq!(required.offset_bytes, 8 * 500_000);
    assert_eq!(required.ef_bytes, 0);
    Ok(())
}

#[test]
fn test_required_memory() -> Result<()> {
    let lists = vec![vec![1], vec![], vec![0, 1]];
    let fixture = write_fixture(lists, Params::default(), false)?;
    let graph = BvGraph::load(&fixture.basename, 0)?;

    let required = graph.required_memory(-1)?;
    assert_eq!(required.graph_bytes, 0);
    let required = graph.required_memory(1)?;
    assert!(required.graph_bytes > 0);
    assert_eq!(required.offset_bytes, 8 * 3);
    let required = graph.required_memory(2)?;
    assert!(required.ef_bytes > 0);
    Ok(())
}
