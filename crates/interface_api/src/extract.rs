//! Extractors that reject with [`ApiError`] instead of axum's plain-text bodies

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// `Path` with a JSON error body on malformed segments
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(verdi) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(verdi))
    }
}

/// `Json` body that must also pass its `validator` rules
pub struct ValidertJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidertJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(verdi) = Json::<T>::from_request(request, state).await?;
        verdi.validate()?;
        Ok(Self(verdi))
    }
}
