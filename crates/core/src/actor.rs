//! Authenticated actor identity attached to audited mutations.

use serde::{Deserialize, Serialize};

/// The authenticated identity behind a mutating call.
///
/// Credential verification happens outside this workspace; repositories only
/// carry the resolved identity into the audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Actor {
    /// Create an actor with a fixed identity.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            id: "test-user".to_string(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            role: "admin".to_string(),
        }
    }

    /// Free-text haystack used by audit-trail actor filters.
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.id, self.name, self.email).to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_text_is_lowercased() {
        let actor = Actor {
            id: "U1".to_string(),
            name: "Maria Souza".to_string(),
            email: "Maria@Example.com".to_string(),
            role: "staff".to_string(),
        };
        assert_eq!(actor.search_text(), "u1 maria souza maria@example.com");
    }
}
