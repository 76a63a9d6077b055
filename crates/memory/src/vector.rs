//! Vector similarity ranking shared by every store.

use memochat_core::error::MemoryError;
use memochat_core::memory::MemoryRecord;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if the lengths differ, either vector is empty or all zeros,
/// or a non-finite component makes the score undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    let score = dot / denom;
    if !score.is_finite() {
        return 0.0;
    }
    score as f32
}

/// Rank records by cosine similarity to a query embedding.
///
/// Returns at most `limit` records, most similar first. Records whose
/// embedding has a different dimension than the query are skipped. Equal
/// scores keep their original (insertion) order.
pub fn rank_by_similarity<'a>(
    records: impl IntoIterator<Item = &'a MemoryRecord>,
    query_embedding: &[f32],
    limit: usize,
) -> Vec<(f32, &'a MemoryRecord)> {
    let mut scored: Vec<(f32, &MemoryRecord)> = records
        .into_iter()
        .filter(|r| r.embedding.len() == query_embedding.len())
        .map(|r| (cosine_similarity(&r.embedding, query_embedding), r))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(limit);
    scored
}

/// Dimension shared by existing records, taken from the first one.
pub fn existing_dimension<'a>(records: impl IntoIterator<Item = &'a MemoryRecord>) -> Option<usize> {
    records.into_iter().next().map(|r| r.embedding.len())
}

/// Reject a new embedding whose dimension differs from the collection's.
pub fn ensure_dimension(expected: Option<usize>, actual: usize) -> Result<(), MemoryError> {
    match expected {
        Some(expected) if expected != actual => {
            Err(MemoryError::DimensionMismatch { expected, actual })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str, embedding: Vec<f32>) -> MemoryRecord {
        MemoryRecord::new("test", content, embedding)
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_opposite_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn cosine_empty_and_mismatched() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn cosine_zero_vector() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_known_value() {
        // [1,1] · [1,0] = 1, |[1,1]| = sqrt(2), |[1,0]| = 1
        let sim = cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((sim - 0.7071).abs() < 0.001);
    }

    #[test]
    fn ranks_by_similarity() {
        let records = vec![
            record("a", vec![0.0, 1.0, 0.0]), // orthogonal = 0
            record("b", vec![1.0, 0.0, 0.0]), // identical = 1
            record("c", vec![0.5, 0.5, 0.0]), // partial = ~0.707
        ];

        let ranked = rank_by_similarity(&records, &[1.0, 0.0, 0.0], 10);
        let order: Vec<&str> = ranked.iter().map(|(_, r)| r.content.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert!((ranked[0].0 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn respects_limit() {
        let records: Vec<_> = (0..10)
            .map(|i| record(&format!("e{i}"), vec![1.0, i as f32 * 0.1]))
            .collect();
        assert_eq!(rank_by_similarity(&records, &[1.0, 0.0], 3).len(), 3);
    }

    #[test]
    fn skips_other_dimensions() {
        let records = vec![
            record("two", vec![1.0, 0.0]),
            record("three", vec![1.0, 0.0, 0.0]),
        ];
        let ranked = rank_by_similarity(&records, &[1.0, 0.0], 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].1.content, "two");
    }

    #[test]
    fn ties_keep_insertion_order() {
        let records: Vec<_> = ["first", "second", "third"]
            .iter()
            .map(|c| record(c, vec![0.0, 0.0]))
            .collect();
        let ranked = rank_by_similarity(&records, &[1.0, 0.0], 10);
        let order: Vec<&str> = ranked.iter().map(|(_, r)| r.content.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn non_finite_components_score_zero() {
        assert_eq!(cosine_similarity(&[f32::INFINITY, 1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn ranking_survives_non_finite_embeddings() {
        let mut records: Vec<_> = (0..40)
            .map(|i| record(&format!("e{i}"), vec![1.0, i as f32 * 0.05]))
            .collect();
        records.insert(7, record("inf", vec![f32::INFINITY, 0.0]));
        records.insert(20, record("nan", vec![f32::NAN, 1.0]));
        records.push(record("exact", vec![1.0, 0.0]));

        let ranked = rank_by_similarity(&records, &[1.0, 0.0], 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].1.content, "e0");
        assert_eq!(ranked[1].1.content, "exact");
        assert!(ranked.iter().all(|(_, r)| r.content != "inf" && r.content != "nan"));
    }

    #[test]
    fn existing_dimension_from_first_record() {
        assert_eq!(existing_dimension(&Vec::<MemoryRecord>::new()), None);
        let records = vec![record("x", vec![1.0, 2.0, 3.0])];
        assert_eq!(existing_dimension(&records), Some(3));
    }

    #[test]
    fn ensure_dimension_checks() {
        assert!(ensure_dimension(None, 768).is_ok());
        assert!(ensure_dimension(Some(768), 768).is_ok());
        assert!(matches!(
            ensure_dimension(Some(768), 3),
            Err(MemoryError::DimensionMismatch { expected: 768, actual: 3 })
        ));
    }
}
