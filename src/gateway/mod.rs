//! Calling platform integration
//!
//! - Credential validation against the applications listing
//! - Outbound call submission (simulated or live)
//!
//! ```rust,ignore
//! let gateway = ProviderGateway::new(
//!     "https://app.dasha.ai/api/v2",
//!     5000,
//!     SubmissionMode::Simulated,
//!     CallSettings::default(),
//! )?;
//!
//! if gateway.connect(&api_key, &app_id).await {
//!     gateway.submit_call(&request).await?;
//! }
//! ```

mod client;
mod types;

pub use client::{CallGateway, GatewayError, ProviderGateway};
#[cfg(test)]
pub use client::MockCallGateway;
pub use types::*;
