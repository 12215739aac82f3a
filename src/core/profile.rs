//! User profile persistence - the identity block printed on exports.

use crate::{
    errors::Result,
    models::UserProfile,
    store::{RecordStore, USER_DATA_KEY},
};
use tracing::warn;

/// Loads the stored user profile. Missing or unreadable data yields the
/// empty default so export headers simply print blank identity lines.
pub async fn load_profile<S: RecordStore>(store: &S) -> UserProfile {
    match store.get(USER_DATA_KEY).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
        Ok(None) => UserProfile::default(),
        Err(error) => {
            warn!(%error, "failed to read user profile, using defaults");
            UserProfile::default()
        }
    }
}

/// Persists the user profile. Write failures propagate to the caller.
pub async fn save_profile<S: RecordStore>(store: &S, profile: &UserProfile) -> Result<()> {
    let payload = serde_json::to_string(profile)?;
    store.set(USER_DATA_KEY, &payload).await
}
