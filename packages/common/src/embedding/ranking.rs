use serde::Serialize;

use super::similarity::cosine_similarity;

/// A candidate that passed the similarity threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<T> {
    pub candidate: T,
    pub similarity: f32,
}

/// Score every candidate against `query` and keep the best `limit` whose
/// similarity is at least `threshold`, highest first.
///
/// Equal scores keep the order in which candidates were supplied.
pub fn rank<T, V>(
    query: &[f32],
    candidates: impl IntoIterator<Item = (T, V)>,
    threshold: f32,
    limit: usize,
) -> Vec<Ranked<T>>
where
    V: AsRef<[f32]>,
{
    let mut hits: Vec<Ranked<T>> = candidates
        .into_iter()
        .filter_map(|(candidate, vector)| {
            let similarity = cosine_similarity(query, vector.as_ref());
            (similarity >= threshold).then_some(Ranked {
                candidate,
                similarity,
            })
        })
        .collect();

    hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    hits.truncate(limit);
    hits
}
