//! Live-process session records.

use metascope_core::{CoreError, CoreResult, Session};
use metascope_metadata::{ListResult, MetaAccessor, Stored};

/// Lists every session record; undecodable ones are skipped and counted.
pub async fn list_sessions(accessor: &MetaAccessor) -> CoreResult<ListResult<Session>> {
    accessor.list_sessions().await
}

/// First session registered for `role` (e.g. `rootcoord`), in key order.
pub fn find_by_role<'a>(sessions: &'a [Stored<Session>], role: &str) -> Option<&'a Stored<Session>> {
    sessions
        .iter()
        .find(|stored| stored.value.server_name.eq_ignore_ascii_case(role))
}

/// Looks up the session of `role`, failing with `NotFound` when none is registered.
pub async fn session_for_role(accessor: &MetaAccessor, role: &str) -> CoreResult<Stored<Session>> {
    let sessions = list_sessions(accessor).await?;
    find_by_role(&sessions.entities, role)
        .cloned()
        .ok_or_else(|| CoreError::not_found("session", role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use metascope_core::{MetaVersion, ServerId};

    fn stored(name: &str, id: i64) -> Stored<Session> {
        Stored {
            key: format!("meta/session/{name}-{id}"),
            revision: 1,
            version: MetaVersion::V2_2,
            value: Session {
                server_id: ServerId::new(id),
                server_name: name.into(),
                address: format!("10.0.0.{id}:19530"),
                ..Session::default()
            },
        }
    }

    #[test]
    fn finds_first_session_of_a_role() {
        let sessions = vec![stored("datacoord", 1), stored("querynode", 2), stored("querynode", 3)];
        let found = find_by_role(&sessions, "QueryNode").expect("role present");
        assert_eq!(found.value.server_id, ServerId::new(2));
        assert!(find_by_role(&sessions, "rootcoord").is_none());
    }
}
