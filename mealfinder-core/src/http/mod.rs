//! Outbound HTTP transport.
//!
//! Every remote call to the recipe provider goes through `HttpClient` so the
//! provider can be exercised against canned responses in tests.

mod client;
mod rate_limiter;

pub use client::{HttpClient, MockClient, MockResponse, ReqwestClient, ReqwestClientBuilder};
pub use rate_limiter::RateLimiter;
