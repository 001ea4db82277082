use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::ApiError;

const MAX_USERNAME_LEN: usize = 64;
const MAX_SYMBOL_LEN: usize = 16;
const MAX_NAME_LEN: usize = 200;

/// `Json<T>` whose rejections render as a 400 `{"error": ...}` body.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Body of `/api/register` and `/api/login`. Missing fields read as empty.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Returns `(username, password)` as given. Login uses this form: a name
    /// that could never have registered is simply an unknown user.
    pub fn into_parts(self) -> (String, String) {
        (
            self.username.unwrap_or_default(),
            self.password.unwrap_or_default(),
        )
    }

    /// Like [`Self::into_parts`], with the username length limit applied.
    pub fn into_registration(self) -> Result<(String, String), ApiError> {
        let (username, password) = self.into_parts();
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(ApiError::validation(format!(
                "username must be {MAX_USERNAME_LEN} characters or less"
            )));
        }
        Ok((username, password))
    }
}

#[derive(Debug, Deserialize)]
pub struct AddWatchRequest {
    pub symbol: Option<String>,
    pub name: Option<String>,
}

impl AddWatchRequest {
    /// Returns `(symbol, name)`; the symbol is normalized downstream.
    pub fn into_parts(self) -> Result<(String, String), ApiError> {
        let symbol = self.symbol.unwrap_or_default();
        if symbol.trim().chars().count() > MAX_SYMBOL_LEN {
            return Err(ApiError::validation(format!(
                "symbol must be {MAX_SYMBOL_LEN} characters or less"
            )));
        }

        let name = self.name.unwrap_or_default();
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ApiError::validation(format!(
                "name must be {MAX_NAME_LEN} characters or less"
            )));
        }

        Ok((symbol, name))
    }
}

/// Trimmed query, or `None` when blank.
pub fn validate_search_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_default_missing_fields() {
        let request: CredentialsRequest = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(request.into_parts(), ("alice".to_string(), String::new()));
    }

    #[test]
    fn test_registration_rejects_long_username() {
        let request = CredentialsRequest {
            username: Some("a".repeat(65)),
            password: Some("pw".to_string()),
        };
        assert!(request.into_registration().is_err());

        let at_limit = CredentialsRequest {
            username: Some("a".repeat(64)),
            password: Some("pw".to_string()),
        };
        assert!(at_limit.into_registration().is_ok());
    }

    #[test]
    fn test_login_parts_accept_any_username_length() {
        let request = CredentialsRequest {
            username: Some("a".repeat(65)),
            password: Some("pw".to_string()),
        };
        assert_eq!(request.into_parts().0.len(), 65);
    }

    #[test]
    fn test_add_watch_request_limits() {
        let ok = AddWatchRequest {
            symbol: Some(" tsla ".to_string()),
            name: None,
        };
        assert_eq!(
            ok.into_parts().unwrap(),
            (" tsla ".to_string(), String::new())
        );

        let long = AddWatchRequest {
            symbol: Some("X".repeat(17)),
            name: None,
        };
        assert!(long.into_parts().is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query(Some(" aapl ")), Some("aapl"));
        assert_eq!(validate_search_query(Some("   ")), None);
        assert_eq!(validate_search_query(None), None);
    }
}
