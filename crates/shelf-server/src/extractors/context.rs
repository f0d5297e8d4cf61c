use axum::{extract::FromRequestParts, http::request::Parts};
use shelf_core::RequestContext;

use crate::middleware::RequestId;

/// Header con el token del canal de venta.
pub const CHANNEL_HEADER: &str = "vendure-token";

/// Extractor que arma el [`RequestContext`] de la request.
///
/// El canal sale del header `vendure-token` (canal por defecto si falta) y
/// el request id del middleware de request id.
#[derive(Debug, Clone)]
pub struct CatalogContext(pub RequestContext);

impl CatalogContext {
    pub fn into_inner(self) -> RequestContext {
        self.0
    }
}

impl<S> FromRequestParts<S> for CatalogContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let channel = parts
            .headers
            .get(CHANNEL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(RequestContext::DEFAULT_CHANNEL);

        let mut ctx = RequestContext::shop(channel);
        if let Some(id) = parts.extensions.get::<RequestId>() {
            ctx = ctx.with_request_id(id.as_str());
        }

        Ok(CatalogContext(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> RequestContext {
        let (mut parts, _) = request.into_parts();
        CatalogContext::from_request_parts(&mut parts, &())
            .await
            .unwrap()
            .into_inner()
    }

    #[tokio::test]
    async fn test_default_channel() {
        let ctx = extract(Request::new(())).await;
        assert_eq!(ctx.channel, RequestContext::DEFAULT_CHANNEL);
        assert!(ctx.request_id.is_none());
    }

    #[tokio::test]
    async fn test_channel_and_request_id() {
        let mut request = Request::builder()
            .header(CHANNEL_HEADER, "eu-store")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(RequestId("req-1".to_string()));

        let ctx = extract(request).await;
        assert_eq!(ctx.channel, "eu-store");
        assert_eq!(ctx.request_id.as_deref(), Some("req-1"));
    }
}
