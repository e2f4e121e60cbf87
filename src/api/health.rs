//! Liveness check, public.

/// `GET /api/health`
pub async fn health() -> &'static str {
    "OK - Alive"
}
