use std::collections::{BTreeSet, HashMap};

use exposure_common::{ExposureError, User};

/// Lookup from source-platform account id to RePEc id.
///
/// Account ids must be unique; a user table with repeated ids cannot be used
/// as a join key and is rejected with every offending id listed.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    by_id: HashMap<String, Option<String>>,
}

impl IdentityIndex {
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ExposureError>
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut by_id = HashMap::new();
        let mut duplicates = BTreeSet::new();

        for (id, repec_id) in pairs {
            if by_id.contains_key(&id) {
                duplicates.insert(id);
            } else {
                by_id.insert(id, repec_id);
            }
        }

        if !duplicates.is_empty() {
            return Err(ExposureError::DuplicateUserId(duplicates.into_iter().collect()));
        }
        Ok(Self { by_id })
    }

    pub fn from_users(users: &[User]) -> Result<Self, ExposureError> {
        Self::from_pairs(users.iter().map(|u| (u.id.clone(), u.repec_id.clone())))
    }

    /// RePEc id for `id`, or `None` when the account is unknown or unmatched.
    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).and_then(|r| r.as_deref())
    }
}
