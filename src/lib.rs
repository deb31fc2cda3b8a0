/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A reader for web graphs compressed in the Boldi–Vigna (BV) format.
//!
//! The format has been described by Paolo Boldi and Sebastiano Vigna in "[The
//! WebGraph Framework I: Compression
//! Techniques](https://dl.acm.org/doi/10.1145/988672.988752)", *Proc. of the
//! Thirteenth World–Wide Web Conference*, pages 595–601, 2004, ACM Press.
//!
//! A graph is stored as three files sharing a basename: a `.graph` bit stream
//! holding the compressed successor lists, a `.properties` file describing
//! how they were compressed, and an optional `.offsets` file mapping node
//! identifiers to bit offsets into the stream. This crate decodes successor
//! lists straight out of the bit stream, either sequentially (no offsets
//! needed) or randomly through a dense or [Elias–Fano](crate::eflist) coded
//! offset index.
//!
//! The main access point is [`BvGraph::load`](graph::BvGraph::load):
//!
//! ```no_run
//! use bvg::prelude::*;
//!
//! let graph = BvGraph::load("cnr-2000", 1)?;
//! let mut iter = graph.iter()?;
//! while let Some((node, successors)) = iter.next_successors()? {
//!     println!("{node} -> {successors:?}");
//! }
//! # Ok::<(), bvg::Error>(())
//! ```

#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]

pub mod bits;
pub mod eflist;
mod error;
pub mod graph;
pub mod utils;

pub use error::{strerror, Error, Result};

/// Prelude module to import everything from this crate
pub mod prelude {
    pub use crate::bits::*;
    pub use crate::eflist::EliasFanoList;
    pub use crate::graph::prelude::*;
    pub use crate::utils::*;
    pub use crate::{Error, Result};
}
