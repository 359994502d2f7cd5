//! Assignment and pair key types.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Partial injective mapping from source vertices to destination vertices.
///
/// `src[k] -> dst[k]` for every `k`. Values in `src` are pairwise distinct,
/// values in `dst` are pairwise distinct, and both sequences have the same
/// length. The mapping need not cover every vertex of either mesh.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAssignment")]
pub struct Assignment {
    src: Vec<usize>,
    dst: Vec<usize>,
}

/// Unchecked serialized form, validated through [`Assignment::new`].
#[derive(Deserialize)]
struct RawAssignment {
    src: Vec<usize>,
    dst: Vec<usize>,
}

impl TryFrom<RawAssignment> for Assignment {
    type Error = &'static str;

    fn try_from(raw: RawAssignment) -> Result<Self, Self::Error> {
        Self::new(raw.src, raw.dst)
            .ok_or("src and dst must have equal length and distinct indices")
    }
}

impl Assignment {
    /// Create an assignment, checking lengths and uniqueness.
    ///
    /// Returns `None` if the sequences differ in length or either contains
    /// a repeated index.
    pub fn new(src: Vec<usize>, dst: Vec<usize>) -> Option<Self> {
        if src.len() != dst.len() || !all_distinct(&src) || !all_distinct(&dst) {
            return None;
        }
        Some(Self { src, dst })
    }

    /// Build from a row -> column table (`None` = unassigned row).
    ///
    /// Callers guarantee the assigned columns are distinct.
    pub(crate) fn from_row_table(table: &[Option<usize>]) -> Self {
        let (src, dst) = table
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.map(|c| (row, c)))
            .unzip();
        Self { src, dst }
    }

    /// Identity assignment on `n` vertices.
    pub fn identity(n: usize) -> Self {
        Self {
            src: (0..n).collect(),
            dst: (0..n).collect(),
        }
    }

    /// Source indices (`i`).
    pub fn src(&self) -> &[usize] {
        &self.src
    }

    /// Destination indices (`j`).
    pub fn dst(&self) -> &[usize] {
        &self.dst
    }

    /// Number of matched pairs.
    pub fn len(&self) -> usize {
        self.src.len()
    }

    /// Whether no pair is matched.
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Iterate `(i, j)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    /// Swap source and destination roles.
    pub fn swapped(&self) -> Self {
        Self {
            src: self.dst.clone(),
            dst: self.src.clone(),
        }
    }

    /// Whether every index lies within the given vertex counts.
    pub fn fits(&self, src_vertices: usize, dst_vertices: usize) -> bool {
        self.src.iter().all(|&i| i < src_vertices) && self.dst.iter().all(|&j| j < dst_vertices)
    }
}

fn all_distinct(values: &[usize]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(*v))
}

/// Canonical mesh pair: the source never has more vertices than the
/// destination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    /// Source mesh identifier
    pub source: String,
    /// Destination mesh identifier
    pub destination: String,
}

impl PairKey {
    /// Create a key in the given order.
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Order two meshes so the smaller one is the source.
    ///
    /// Equal vertex counts keep the original order.
    pub fn canonical(a: &str, a_vertices: usize, b: &str, b_vertices: usize) -> Self {
        if b_vertices < a_vertices {
            Self::new(b, a)
        } else {
            Self::new(a, b)
        }
    }

    /// Same pair with roles exchanged.
    pub fn reversed(&self) -> Self {
        Self::new(self.destination.clone(), self.source.clone())
    }

    /// Cache file name for this pair.
    pub fn file_name(&self) -> String {
        format!("{}_{}.npy", self.source, self.destination)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}
