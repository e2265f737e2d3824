// Copyright 2026 notes_rag_engine contributors
// SPDX-License-Identifier: MIT
//
//! Exact nearest-neighbor index over squared L2 distance.
//!
//! Brute-force by construction: retrieval correctness at single-document
//! scale depends on exact results, so every stored vector is scanned on
//! every search. Position `i` in the index always corresponds to chunk
//! `i` of the session that built it.

use log::debug;
use ndarray::{Array1, ArrayView1};

use crate::error::RagError;

/// One search result: stored-vector position and squared L2 distance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub distance: f32,
}

/// Append-only store of fixed-dimension embedding vectors.
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Array1<f32>>,
}

impl FlatIndex {
    /// Create an empty index for vectors of the given dimension.
    pub fn new(dimension: usize) -> Result<Self, RagError> {
        if dimension == 0 {
            return Err(RagError::InvalidConfiguration(
                "index dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            vectors: Vec::new(),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append vectors in order. Every vector must match the index
    /// dimension; a mismatch rejects the whole batch (no partial append).
    pub fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), RagError> {
        for v in &vectors {
            if v.len() != self.dimension {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimension,
                    actual: v.len(),
                });
            }
        }
        self.vectors.extend(vectors.into_iter().map(Array1::from));
        debug!("[flat_index] {} vectors stored", self.vectors.len());
        Ok(())
    }

    /// Return up to `k` stored vectors nearest to `query`, ascending by
    /// squared L2 distance, ties broken by lowest stored position. If `k`
    /// exceeds the number of stored vectors, everything is returned.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, RagError> {
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let q = ArrayView1::from(query);
        let mut hits: Vec<SearchHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| {
                let diff = v - &q;
                SearchHit {
                    position,
                    distance: diff.mapv(|x| x * x).sum(),
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);

        debug!("[flat_index] search returned {} hits", hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatIndex {
        let mut index = FlatIndex::new(3).unwrap();
        index
            .add(vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ])
            .unwrap();
        index
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            FlatIndex::new(0),
            Err(RagError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_inserted_vector_is_its_own_nearest_neighbor() {
        let index = sample_index();
        let hits = index.search(&[0.0, 1.0, 0.0], 1).unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].position, 1);
        assert_eq!(hits[0].distance, 0.0);
    }

    #[test]
    fn test_results_ascend_by_distance() {
        let index = sample_index();
        let hits = index.search(&[0.9, 0.1, 0.0], 3).unwrap();

        assert_eq!(hits[0].position, 0);
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[1].distance <= hits[2].distance);
    }

    #[test]
    fn test_ties_break_by_lowest_position() {
        let mut index = FlatIndex::new(2).unwrap();
        index
            .add(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]])
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].position, 0);
        assert_eq!(hits[1].position, 1);
    }

    #[test]
    fn test_k_larger_than_len_returns_all() {
        let index = sample_index();
        let hits = index.search(&[1.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_add_dimension_mismatch_rejects_whole_batch() {
        let mut index = FlatIndex::new(3).unwrap();
        let err = index
            .add(vec![vec![1.0, 0.0, 0.0], vec![1.0, 0.0]])
            .unwrap_err();

        assert!(matches!(
            err,
            RagError::DimensionMismatch { expected: 3, actual: 2 }
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let index = sample_index();
        assert!(matches!(
            index.search(&[1.0, 0.0], 1),
            Err(RagError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_search_empty_index_returns_nothing() {
        let index = FlatIndex::new(4).unwrap();
        assert!(index.search(&[0.0, 0.0, 0.0, 0.0], 5).unwrap().is_empty());
    }
}
