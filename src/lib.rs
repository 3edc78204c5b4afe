//! Traffic Fines Client Library
//!
//! Client-side access layer for the traffic fines backend: document types,
//! users, infractions, payments and payment agreements, with runtime
//! validation of every response, a session cache, and debounced search and
//! totals over the cached results.
//!
//! # Modules
//!
//! - `api_client`: HTTP client (URL building, timeout, error normalization).
//! - `civic_code`: Bundled civic code reference text.
//! - `config`: Configuration management.
//! - `debounce`: Cancellable delayed task.
//! - `document_types`: Document type lookups.
//! - `errors`: Error handling types.
//! - `fines`: Fines consultation workflow.
//! - `formatters`: Currency, date, document and phone formatting.
//! - `infractions`: Infraction queries and detail view.
//! - `minimum_wage`: Fines in daily minimum-wage units.
//! - `models`: Backend data models and field alias resolution.
//! - `obs`: Observability and logging.
//! - `payment_agreements`: Payment agreement listing.
//! - `payments`: Checkout preference, status, history and health.
//! - `search`: Filtering, totals and selection.
//! - `session`: In-memory session cache.
//! - `state`: Application context.
//! - `users`: User lookup by document.
//! - `validation`: Response schemas.

pub mod api_client;
pub mod civic_code;
pub mod config;
pub mod debounce;
pub mod document_types;
pub mod errors;
pub mod fines;
pub mod formatters;
pub mod infractions;
pub mod minimum_wage;
pub mod models;
pub mod obs;
pub mod payment_agreements;
pub mod payments;
pub mod search;
pub mod session;
pub mod state;
pub mod users;
pub mod validation;
