//! Session-scoped copy-count overrides for batch label printing.
//!
//! The map lives only in the caller's session, keyed by item row id, and is
//! consulted when an export session is assembled. It is never persisted to
//! the inventory store.

use std::collections::HashMap;

use tower_sessions::Session;

use crate::labels::MAX_COPIES;

const COPY_COUNTS_KEY: &str = "label_copy_counts";

pub async fn load(
    session: &Session,
) -> Result<HashMap<String, u32>, tower_sessions::session::Error> {
    Ok(session
        .get::<HashMap<String, u32>>(COPY_COUNTS_KEY)
        .await?
        .unwrap_or_default())
}

/// Sets the override for one item. Values clamp to `[1, 99]`; zero or
/// negative removes the override, reverting to the default of 1.
pub async fn set(
    session: &Session,
    item_id: &str,
    copies: i64,
) -> Result<(), tower_sessions::session::Error> {
    let mut map = load(session).await?;
    if copies <= 0 {
        map.remove(item_id);
    } else {
        map.insert(item_id.to_string(), copies.min(MAX_COPIES as i64) as u32);
    }
    session.insert(COPY_COUNTS_KEY, map).await
}
