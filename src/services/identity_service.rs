use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::get_config;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityProfile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl IdentityProfile {
    pub fn display_name(&self) -> Option<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

#[derive(Clone)]
pub struct IdentityService {
    http: Client,
}

impl IdentityService {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Fetches the provider profile for an authenticated user. A provider 404
    /// means the session refers to a user that no longer exists there.
    pub async fn fetch_profile(&self, external_id: &str) -> Result<IdentityProfile> {
        let config = get_config();
        let response = self
            .http
            .get(format!("{}/v1/users/{}", config.identity_api_url, external_id))
            .bearer_auth(&config.identity_api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::Unauthorized(
                "Unknown user at identity provider".to_string(),
            )),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, body, "identity profile lookup failed");
                Err(Error::Internal(
                    "Identity provider request failed".to_string(),
                ))
            }
            _ => Ok(response.json().await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_present_parts() {
        let profile = IdentityProfile {
            id: "user_1".into(),
            email: "jo@acme.io".into(),
            first_name: Some("Jo".into()),
            last_name: Some("Martin".into()),
            avatar_url: None,
        };
        assert_eq!(profile.display_name().as_deref(), Some("Jo Martin"));

        let partial = IdentityProfile {
            first_name: None,
            ..profile.clone()
        };
        assert_eq!(partial.display_name().as_deref(), Some("Martin"));

        let empty = IdentityProfile {
            first_name: None,
            last_name: None,
            ..profile
        };
        assert_eq!(empty.display_name(), None);
    }
}
