//! HTTP-based directions providers for routing services.
//!
//! This module provides [`HttpDirectionsProvider`], an implementation of
//! [`chargeline_core::DirectionsProvider`] that fetches driving routes from an
//! OSRM route service.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use geo::Coord;
//! use chargeline_core::DirectionsProvider;
//! use chargeline_data::routing::{HttpDirectionsProvider, HttpDirectionsProviderConfig};
//!
//! let config = HttpDirectionsProviderConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_user_agent("my-app/1.0");
//! let provider = HttpDirectionsProvider::with_config(config)?;
//!
//! let stops = [Coord { x: -1.55, y: 53.8 }, Coord { x: -0.13, y: 51.51 }];
//! let routes = provider.directions(&stops, true)?;
//! println!("{:.0} miles", routes[0].distance_miles());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod osrm;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{DEFAULT_USER_AGENT, HttpDirectionsProvider, HttpDirectionsProviderConfig};
