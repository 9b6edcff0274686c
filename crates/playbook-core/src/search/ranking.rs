//! Ranking engine shared by every search provider

use std::borrow::Borrow;

use super::SearchProvider;
use crate::document::Playbook;

/// Rank `playbooks` against `query` and keep at most `top_k` of them.
///
/// Non-matching playbooks are dropped and the rest are sorted by score,
/// highest first. The sort is stable, so playbooks with equal scores keep
/// their input order. A `top_k` of zero yields an empty list.
pub fn rank<P>(
    provider: &dyn SearchProvider,
    playbooks: impl IntoIterator<Item = P>,
    query: &str,
    top_k: usize,
) -> Vec<P>
where
    P: Borrow<Playbook>,
{
    if top_k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(P, f32)> = playbooks
        .into_iter()
        .filter_map(|playbook| {
            let (matches, score) = provider.score(playbook.borrow(), query);
            matches.then_some((playbook, score))
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_k);

    tracing::debug!(
        provider = provider.name(),
        query,
        results = scored.len(),
        "Ranked playbooks"
    );

    scored.into_iter().map(|(playbook, _)| playbook).collect()
}
