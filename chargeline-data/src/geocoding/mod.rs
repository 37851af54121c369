//! HTTP geocoding against a Nominatim search endpoint.
//!
//! [`HttpGeocoder`] implements [`chargeline_core::Geocoder`], resolving free
//! text to the best-ranked match.
//!
//! ```no_run
//! use chargeline_core::Geocoder;
//! use chargeline_data::geocoding::HttpGeocoder;
//!
//! let geocoder = HttpGeocoder::new("https://nominatim.openstreetmap.org")?;
//! if let Some(place) = geocoder.geocode("Leeds")? {
//!     println!("{} at {:?}", place.label, place.location);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod nominatim;
mod provider;

pub use provider::{DEFAULT_GEOCODER_USER_AGENT, HttpGeocoder, HttpGeocoderConfig};
