//! HTTP carrier for Courier.
//!
//! Talks to any carrier exposing a small JSON API:
//!
//! - `POST {base}/messages` accepts a message and answers `{"id": "..."}`
//! - `GET {base}/messages/{id}` answers `{"status": "delivered" | "pending" | "queued" | "failed" | "bounced"}`
//! - `GET {base}/health` answers any 2xx while the carrier is up
//!
//! # Example
//!
//! ```no_run
//! use courier_http::{AuthMethod, HttpCarrier, HttpCarrierConfig};
//!
//! let config = HttpCarrierConfig::new("https://sms.example.com/api")
//!     .with_auth(AuthMethod::Bearer("token".into()));
//! let carrier = HttpCarrier::new("sms-gateway", config).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::{AuthMethod, HttpCarrierConfig};
pub use error::HttpCarrierError;
pub use provider::HttpCarrier;
pub use types::{CarrierState, StatusResponse, SubmitRequest, SubmitResponse};
