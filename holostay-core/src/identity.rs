use serde::{Deserialize, Serialize};
use async_trait::async_trait;
use uuid::Uuid;
use holostay_shared::Masked;

/// The authenticated caller of a user-facing operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<Masked<String>>,
    pub full_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id, email: None, full_name: None }
    }

    /// Profile name, else the local part of the e-mail address, else "Jedi"
    pub fn display_name(&self) -> String {
        if let Some(name) = self.full_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        if let Some(email) = &self.email {
            if let Some(local) = email.expose().split('@').next().filter(|l| !l.is_empty()) {
                return local.to_string();
            }
        }

        "Jedi".to_string()
    }
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Verify a bearer credential and return the identity it was issued to
    async fn resolve(
        &self,
        token: &str,
    ) -> Result<Identity, Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        let mut identity = Identity::new(Uuid::new_v4());
        assert_eq!(identity.display_name(), "Jedi");

        identity.email = Some(Masked::from("obiwan@kenobi.org"));
        assert_eq!(identity.display_name(), "obiwan");

        identity.full_name = Some("Obi-Wan Kenobi".to_string());
        assert_eq!(identity.display_name(), "Obi-Wan Kenobi");
    }
}
