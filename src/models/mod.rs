// Artifact data model (snapshot shape served to the dashboard)

mod snapshot;
mod traffic;

pub use snapshot::{AccountResult, Snapshot, ZoneResult};
pub use traffic::{CountryAggregate, DailyPoint, HourlyPoint};
