//! Request driving routes from an external directions service.
//!
//! The [`DirectionsProvider`] trait abstracts the third-party turn-by-turn
//! service. Callers supply an ordered list of coordinates (origin, via points,
//! destination) and receive one or more [`DirectionsRoute`] values carrying the
//! polyline, the authoritative distance and the expected duration.
//!
//! Providers that cannot compute alternatives for a request must report
//! [`DirectionsError::AlternativesUnsupported`] so callers can retry without
//! them.

mod error;
mod provider;

pub use error::DirectionsError;
pub use provider::{DirectionsProvider, DirectionsRoute};
