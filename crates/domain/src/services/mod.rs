//! Domain services for the tracking engine.
//!
//! Pure rules over domain models plus the collaborator traits the engine
//! depends on.

pub mod address;
pub mod clock;
pub mod geo;
pub mod geofence;
pub mod location_source;
pub mod reconciliation;
pub mod schedule_conflict;

pub use address::{AddressError, AddressResolver, MockAddressResolver, NoopAddressResolver};
pub use clock::{Clock, ManualClock, SystemClock};
pub use geo::{distance_meters, EARTH_RADIUS_METERS};
pub use geofence::{validate as validate_geofence, GeofenceValidation};
pub use location_source::{
    LatestLocationCache, LocationSource, LocationSourceError, MockLocationSource,
};
pub use schedule_conflict::{find_conflict, has_conflict};
