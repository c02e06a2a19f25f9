//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CSP nonce (generate per-request nonce for inline scripts)
//! 5. Session layer (tower-sessions with a bounded moka store)
//! 6. Security headers (CSP, frame options, etc.)
//! 7. Rate limiting on render and upload endpoints (governor)

pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{
    background_rate_limiter, export_rate_limiter, frame_rate_limiter, preview_rate_limiter,
};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{MokaSessionStore, create_session_layer};
