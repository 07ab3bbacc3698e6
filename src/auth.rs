//! API key authentication.
//!
//! Every catalog endpoint except the health check requires one of the
//! configured keys, presented as `Authorization: Bearer <key>`. Handlers
//! opt in by taking an [`Authenticated`] argument; missing and invalid
//! credentials produce the same 403 envelope.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};

use crate::routes::{ApiError, AppState};

/// Proof that the request presented a valid API key
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

impl FromRequest for Authenticated {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, ApiError> {
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let key = match presented {
        Some(key) => key,
        None => return Err(ApiError::forbidden()),
    };

    let known = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.auth.api_keys.as_slice())
        .unwrap_or_default();

    if known.iter().any(|candidate| candidate == key) {
        Ok(Authenticated)
    } else {
        Err(ApiError::forbidden())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use std::sync::Arc;

    use crate::config::{AuthSettings, PaginationSettings};
    use crate::services::CatalogStore;

    async fn test_state(keys: Vec<String>) -> web::Data<AppState> {
        let store = CatalogStore::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory store");
        web::Data::new(AppState {
            store,
            auth: Arc::new(AuthSettings { api_keys: keys }),
            pagination: PaginationSettings::default(),
        })
    }

    #[tokio::test]
    async fn test_configured_key_passes() {
        let state = test_state(vec!["secret".to_string()]).await;
        let req = TestRequest::default()
            .app_data(state)
            .insert_header((header::AUTHORIZATION, "Bearer secret"))
            .to_http_request();

        assert!(authenticate(&req).is_ok());
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected() {
        let state = test_state(vec!["secret".to_string()]).await;
        let req = TestRequest::default().app_data(state).to_http_request();

        assert!(authenticate(&req).is_err());
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let state = test_state(vec!["secret".to_string()]).await;
        let req = TestRequest::default()
            .app_data(state)
            .insert_header((header::AUTHORIZATION, "Bearer guess"))
            .to_http_request();

        assert!(authenticate(&req).is_err());
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_rejected() {
        let state = test_state(vec!["secret".to_string()]).await;
        let req = TestRequest::default()
            .app_data(state)
            .insert_header((header::AUTHORIZATION, "Token secret"))
            .to_http_request();

        assert!(authenticate(&req).is_err());
    }

    #[tokio::test]
    async fn test_no_configured_keys_rejects_everything() {
        let state = test_state(Vec::new()).await;
        let req = TestRequest::default()
            .app_data(state)
            .insert_header((header::AUTHORIZATION, "Bearer secret"))
            .to_http_request();

        assert!(authenticate(&req).is_err());
    }
}
