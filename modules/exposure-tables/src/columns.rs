//! Column names shared by the table readers and the preparation stages.

pub const ID: &str = "id";
pub const USERNAME: &str = "username";
pub const REPEC_ID: &str = "RePEc_id";
pub const FOLLOWERS_COUNT: &str = "followers_count";
pub const FOLLOWING_COUNT: &str = "following_count";

pub const AUTHOR_ID: &str = "author_id";
pub const FOLLOWER_ID: &str = "follower_id";

pub const CREATED_AT: &str = "created_at";
pub const TEXT: &str = "text";

pub const WEEK: &str = "week";
pub const REPEC_USERS: &str = "repec_users";
