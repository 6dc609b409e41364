//! Rank-based selection among viable candidates.
//!
//! This module handles selecting the best match from multiple viable
//! candidates by overall conversion rank, with the one tie-breaking rule
//! this resolver knows.

use overmatch_core::{Candidate, ResolutionError, Span};
use overmatch_registry::SignatureRegistry;

use super::ViableMatch;

/// Find the best match from viable candidates.
///
/// Selects the candidate whose worst per-argument rank is best. Ties at
/// the best rank resolve in favor of the single non-template candidate
/// when exactly one is tied; any other tie is ambiguous.
///
/// # Returns
///
/// * `Ok(ViableMatch)` - The best matching candidate
/// * `Err(ResolutionError::AmbiguousCall)` - Multiple candidates tie
pub(crate) fn select_best<'a>(
    mut viable: Vec<ViableMatch<'a>>,
    registry: &SignatureRegistry,
    name: &str,
    span: Span,
) -> Result<ViableMatch<'a>, ResolutionError> {
    assert!(!viable.is_empty());

    if viable.len() == 1 {
        return Ok(viable.swap_remove(0));
    }

    // Stable sort: declaration order breaks nothing, it only makes the
    // ambiguity rendering deterministic.
    viable.sort_by_key(|m| m.overall);

    let best_rank = viable[0].overall;
    let tied = viable.iter().take_while(|m| m.overall == best_rank).count();
    if tied == 1 {
        return Ok(viable.swap_remove(0));
    }

    // A lone non-template beats template instantiations at equal rank.
    let mut non_templates = viable[..tied]
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.candidate.is_template());
    if let Some((index, _)) = non_templates.next()
        && non_templates.next().is_none()
    {
        return Ok(viable.swap_remove(index));
    }

    let candidates: Vec<&Candidate> = viable[..tied].iter().map(|m| m.candidate).collect();
    Err(ResolutionError::AmbiguousCall {
        name: name.to_owned(),
        candidates: registry.display_candidate_list(&candidates),
        span,
    })
}
