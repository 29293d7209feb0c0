use serde::{Deserialize, Serialize};

/// Mock login state. The store only records what the caller already
/// validated; there is no token or expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub logged_in: bool,
    pub username: String,
}

impl Session {
    pub fn logged_in(username: String) -> Self {
        Self {
            logged_in: true,
            username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_logged_out() {
        let session = Session::default();
        assert!(!session.logged_in);
        assert_eq!(session.username, "");
    }
}
