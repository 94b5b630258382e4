use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller identity for remote mirroring. Remote writes are keyed per user;
/// without a signed-in user the mirror step is skipped outright.
pub trait AuthSession: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

/// Fixed identity, resolved once at startup from configuration.
#[derive(Clone, Debug, Default)]
pub struct StaticAuth {
    user: Option<UserId>,
}

impl StaticAuth {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self { user: Some(UserId(user_id.into())) }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

impl AuthSession for StaticAuth {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthSession, StaticAuth};

    #[test]
    fn static_auth_reports_its_fixed_identity() {
        let signed_in = StaticAuth::signed_in("user-1");
        assert_eq!(signed_in.current_user().map(|user| user.0), Some("user-1".to_string()));

        let signed_out = StaticAuth::signed_out();
        assert!(signed_out.current_user().is_none());
    }
}
