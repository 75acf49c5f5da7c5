use std::collections::HashMap;

use exposure_common::{ExposureError, FollowEdge, RawFollowEdge, User};

use crate::IdentityIndex;

/// Follow edges with both endpoints resolved to RePEc ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedGraph {
    pub edges: Vec<FollowEdge>,
    /// Input edges dropped because an endpoint had no RePEc id.
    pub dropped: usize,
}

/// Attach RePEc ids to both endpoints of every follow edge.
///
/// Edges with an unresolvable endpoint are dropped, not reported as errors.
/// Input order is kept and duplicate edges are passed through as-is.
pub fn resolve_follow_graph(
    users: &[User],
    raw: &[RawFollowEdge],
) -> Result<ResolvedGraph, ExposureError> {
    let index = IdentityIndex::from_users(users)?;

    let edges: Vec<FollowEdge> = raw
        .iter()
        .filter_map(|edge| {
            let repec_id = index.resolve(&edge.author_id)?;
            let follower_repec_id = index.resolve(&edge.follower_id)?;
            Some(FollowEdge {
                author_id: edge.author_id.clone(),
                follower_id: edge.follower_id.clone(),
                repec_id: repec_id.to_string(),
                follower_repec_id: follower_repec_id.to_string(),
            })
        })
        .collect();

    let dropped = raw.len() - edges.len();
    Ok(ResolvedGraph { edges, dropped })
}

/// RePEc id -> RePEc ids of its direct followers.
pub fn followers_by_author(edges: &[FollowEdge]) -> HashMap<&str, Vec<&str>> {
    let mut followers: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        followers
            .entry(edge.repec_id.as_str())
            .or_default()
            .push(edge.follower_repec_id.as_str());
    }
    followers
}
