pub mod identity;
pub mod follow_graph;
pub mod roster;
pub mod matrix;
pub mod prep;
pub mod stages;

pub use follow_graph::{followers_by_author, resolve_follow_graph, ResolvedGraph};
pub use identity::IdentityIndex;
pub use matrix::activity_matrix;
pub use roster::{authors_roster, exposed_roster, RosterBuild};
pub use stages::StageStats;
