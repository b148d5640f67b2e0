//! Logged-in principal identity.

use serde::{Deserialize, Serialize};
use studenthub_proto::{UserId, UserRef};

/// The logged-in principal's identity and credential scope.
///
/// Created on successful authentication, destroyed on logout. Serializable so
/// the host can cache it (the browser client keeps it in local storage and
/// rehydrates it at startup). Owned exclusively by one sync client for its
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend-assigned user id.
    pub user_id: UserId,

    /// Display first name, used to stamp optimistic messages.
    pub first_name: String,

    /// Display last name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Bearer token presented when the realtime transport connects.
    pub token: String,
}

impl Session {
    /// Sender reference for messages this principal authors.
    pub fn user_ref(&self) -> UserRef {
        UserRef {
            id: self.user_id.clone(),
            first_name: Some(self.first_name.clone()),
            last_name: self.last_name.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: UserId::from("u1"),
            first_name: "Asha".to_string(),
            last_name: Some("Rao".to_string()),
            token: "tok".to_string(),
        }
    }

    #[test]
    fn user_ref_carries_display_name() {
        let user_ref = session().user_ref();
        assert_eq!(user_ref.id, UserId::from("u1"));
        assert_eq!(user_ref.first_name.as_deref(), Some("Asha"));
    }

    #[test]
    fn cache_roundtrip() {
        let original = session();
        let cached = serde_json::to_string(&original).unwrap();
        let rehydrated: Session = serde_json::from_str(&cached).unwrap();
        assert_eq!(rehydrated, original);
    }
}
