/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::codecs::Code;
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;

/// The graph descriptor read from a `.properties` file.
///
/// The file is in the Java properties format, one `key = value` pair per
/// line, `#` starting a comment. Keys are matched case-insensitively.
/// Everything but `nodes` and `arcs` has a default, the same as the Java
/// implementation.
#[derive(Debug, Clone)]
pub struct Properties {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of arcs.
    pub arcs: u64,
    /// Size of the window over previous nodes a record may reference.
    pub window_size: usize,
    /// Maximum length of a reference chain.
    pub max_ref_count: usize,
    /// Minimum length of a run of consecutive successors stored as an
    /// interval; 0 disables intervals.
    pub min_interval_length: usize,
    /// The parameter of the ζ code used for residuals.
    pub zeta_k: u64,
    /// Average number of bits per arc, used to size the Elias–Fano offset
    /// list before the actual offsets are known.
    pub bits_per_link: f64,
    /// The code of the outdegrees.
    pub outdegree_code: Code,
    /// The code of the reference offsets.
    pub reference_code: Code,
    /// The code of the block counts and block lengths.
    pub block_code: Code,
    /// The code of the interval counts, left extremes, and lengths.
    pub interval_code: Code,
    /// The code of the residual gaps.
    pub residual_code: Code,
    /// The code of the gaps in the `.offsets` file.
    pub offset_code: Code,
}

impl Properties {
    /// Parses the `.properties` file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let map = java_properties::read(BufReader::new(file))
            .map_err(|e| Error::PropertyFile(e.to_string()))?;
        Self::from_map(map)
    }

    /// Builds a descriptor from raw key-value pairs.
    pub fn from_map(map: HashMap<String, String>) -> Result<Self> {
        let map: HashMap<String, String> = map
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();

        if let Some(version) = map.get("version") {
            let version = version
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::PropertyFile("cannot parse 'version'".into()))?;
            if version != 0 {
                return Err(Error::UnsupportedVersion(version));
            }
        }

        let nodes = required(&map, "nodes")?;
        let arcs = required(&map, "arcs")?;
        let window_size = optional(&map, "windowsize", 7)?;
        let max_ref_count = optional(&map, "maxrefcount", 3)?;
        let min_interval_length = optional(&map, "minintervallength", 3)?;
        let zeta_k: u64 = optional(&map, "zetak", 3)?;
        if zeta_k == 0 {
            return Err(Error::UnsupportedCoding("zeta with k = 0".into()));
        }
        let bits_per_link = match map.get("bitsperlink") {
            Some(v) => v
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::PropertyFile("cannot parse 'bitsperlink'".into()))?,
            None => 0.0,
        };

        let mut props = Properties {
            nodes,
            arcs,
            window_size,
            max_ref_count,
            min_interval_length,
            zeta_k,
            bits_per_link,
            outdegree_code: Code::Gamma,
            reference_code: Code::Unary,
            block_code: Code::Gamma,
            interval_code: Code::Gamma,
            residual_code: Code::Zeta { k: zeta_k },
            offset_code: Code::Gamma,
        };

        if let Some(flags) = map.get("compressionflags") {
            for flag in flags.split('|') {
                let flag = flag.trim();
                if flag.is_empty() {
                    continue;
                }
                props.apply_flag(flag)?;
            }
        }
        Ok(props)
    }

    fn apply_flag(&mut self, flag: &str) -> Result<()> {
        let unknown = || Error::PropertyFileCompressionFlag(flag.to_string());
        let (field, name) = flag.rsplit_once('_').ok_or_else(unknown)?;
        let code = match name.to_uppercase().as_str() {
            "UNARY" => Code::Unary,
            "GAMMA" => Code::Gamma,
            "DELTA" => Code::Delta,
            "ZETA" => Code::Zeta { k: self.zeta_k },
            "NIBBLE" => Code::Nibble,
            _ => return Err(unknown()),
        };
        match field.to_uppercase().as_str() {
            "OUTDEGREES" => self.outdegree_code = code,
            "REFERENCES" => self.reference_code = code,
            "BLOCKS" => self.block_code = code,
            "INTERVALS" => self.interval_code = code,
            "RESIDUALS" => self.residual_code = code,
            "OFFSETS" => self.offset_code = code,
            _ => return Err(unknown()),
        }
        Ok(())
    }
}

fn required<T: std::str::FromStr>(map: &HashMap<String, String>, key: &str) -> Result<T> {
    map.get(key)
        .ok_or_else(|| Error::PropertyFile(format!("missing required key '{}'", key)))?
        .trim()
        .parse()
        .map_err(|_| Error::PropertyFile(format!("cannot parse '{}'", key)))
}

fn optional<T: std::str::FromStr>(
    map: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T> {
    match map.get(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| Error::PropertyFile(format!("cannot parse '{}'", key))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn base_map() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("nodes".into(), "4".into());
        map.insert("arcs".into(), "4".into());
        map
    }

    #[test]
    fn test_defaults() {
        let props = Properties::from_map(base_map()).unwrap();
        assert_eq!(props.nodes, 4);
        assert_eq!(props.arcs, 4);
        assert_eq!(props.window_size, 7);
        assert_eq!(props.max_ref_count, 3);
        assert_eq!(props.min_interval_length, 3);
        assert_eq!(props.zeta_k, 3);
        assert_eq!(props.outdegree_code, Code::Gamma);
        assert_eq!(props.reference_code, Code::Unary);
        assert_eq!(props.residual_code, Code::Zeta { k: 3 });
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut map = HashMap::new();
        map.insert("Nodes".into(), "1".into());
        map.insert("ARCS".into(), "0".into());
        map.insert("WindowSize".into(), "0".into());
        let props = Properties::from_map(map).unwrap();
        assert_eq!(props.nodes, 1);
        assert_eq!(props.window_size, 0);
    }

    #[test]
    fn test_compression_flags() {
        let mut map = base_map();
        map.insert("zetak".into(), "5".into());
        map.insert(
            "compressionflags".into(),
            "OUTDEGREES_DELTA|RESIDUALS_NIBBLE|OFFSETS_GAMMA".into(),
        );
        let props = Properties::from_map(map).unwrap();
        assert_eq!(props.outdegree_code, Code::Delta);
        assert_eq!(props.residual_code, Code::Nibble);
        assert_eq!(props.offset_code, Code::Gamma);
        assert_eq!(props.zeta_k, 5);
    }

    #[test]
    fn test_unknown_flag() {
        let mut map = base_map();
        map.insert("compressionflags".into(), "RESIDUALS_MORSE".into());
        assert!(matches!(
            Properties::from_map(map),
            Err(Error::PropertyFileCompressionFlag(_))
        ));
    }

    #[test]
    fn test_missing_required_key() {
        let mut map = base_map();
        map.remove("arcs");
        assert!(matches!(
            Properties::from_map(map),
            Err(Error::PropertyFile(_))
        ));
    }

    #[test]
    fn test_version() {
        let mut map = base_map();
        map.insert("version".into(), "0".into());
        assert!(Properties::from_map(map.clone()).is_ok());
        map.insert("version".into(), "1".into());
        assert!(matches!(
            Properties::from_map(map),
            Err(Error::UnsupportedVersion(1))
        ));
    }
}
