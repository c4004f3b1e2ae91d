//src/taxdb.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;

use crate::error::ExtractError;

/// A parent map: taxon -> parent taxon. For example, parent_map[562] = 561.
pub type ParentMap = AHashMap<u32, u32>;

/// Root of the taxonomy. Its parent pointer is self-referential and it
/// terminates every ancestor walk without matching.
pub const ROOT_TAXON: u32 = 1;

/// Ancestor-closure index over the NCBI taxonomy parent table.
///
/// Loaded once at startup and read-only afterwards. The table is small
/// relative to the entry stream (a few million nodes), so it is held fully
/// in memory.
#[derive(Debug)]
pub struct TaxonomyIndex {
    parents: ParentMap,
}

impl TaxonomyIndex {
    /// Parses a taxonomy parent table in the format:
    /// ```text
    /// <taxid>\t<parentid>[\t<ignored>...]
    /// ```
    /// NCBI `nodes.dmp` files, which pad fields with `|` separators
    /// (`<taxid>\t|\t<parentid>\t|\t...`), are accepted too: `|` tokens are
    /// skipped.
    ///
    /// A line without both id columns is fatal; a partially built index
    /// cannot be trusted.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut parents: ParentMap = AHashMap::new();

        for (lineno, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line
                .split('\t')
                .map(str::trim)
                .filter(|f| !f.is_empty() && *f != "|");

            let taxid = fields.next().and_then(|f| f.parse::<u32>().ok());
            let parentid = fields.next().and_then(|f| f.parse::<u32>().ok());

            match (taxid, parentid) {
                (Some(taxid), Some(parentid)) => {
                    parents.insert(taxid, parentid);
                }
                _ => {
                    return Err(ExtractError::Taxonomy {
                        line: lineno + 1,
                        reason: "expected numeric node id and parent id columns".to_string(),
                    });
                }
            }
        }

        Ok(Self { parents })
    }

    /// Builds an index from an already-populated parent map.
    pub fn from_parents(parents: ParentMap) -> Self {
        Self { parents }
    }

    /// Walks parent pointers from `candidate`, returning true if `ancestor`
    /// lies on the chain. The candidate itself is never a match; reaching
    /// the root or an unknown id ends the walk without a match.
    ///
    /// O(depth) per query. Taxonomic trees are shallow (< ~30 levels), so
    /// no memoization is needed.
    pub fn is_descendant(&self, candidate: u32, ancestor: u32) -> bool {
        let mut node = self.parents.get(&candidate).copied();
        while let Some(parent) = node {
            if parent == ROOT_TAXON {
                return false;
            }
            if parent == ancestor {
                return true;
            }
            node = self.parents.get(&parent).copied();
        }
        false
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
