//! Provider implementation for Lexington, MA using the town's published web pages.
//!
//! The town lists one collection weekday per street and a set of official
//! holidays. Trash, recycling and compost share the street's weekday.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use tonneli_core::{
    model::{Address, AddressId, Cities, CityId, CityMeta, DateRange, Fraction, PickupEvent},
    plugin::CityPlugin,
    ports::{AddressPort, AddressSearch, PortError, SchedulePort},
    resolve::closest_matches,
};

/// Provider configuration and environment overrides.
pub mod config;
mod parse;
/// Page fetching, street resolution and pickup projection.
pub mod source;

pub use config::{ConfigError, LexingtonConfig};
pub use source::{LexingtonSource, Upcoming};

/// Street search implementation for Lexington.
pub struct LexingtonAddressPort {
    source: LexingtonSource,
    meta: CityMeta,
}

impl LexingtonAddressPort {
    /// Create a new address port backed by the given source.
    #[must_use]
    pub fn new(source: LexingtonSource) -> Self {
        Self {
            source,
            meta: city_meta(),
        }
    }
}

#[async_trait]
impl AddressPort for LexingtonAddressPort {
    fn city(&self) -> &CityMeta {
        &self.meta
    }

    async fn search(&self, query: &AddressSearch, limit: usize) -> Result<Vec<Address>, PortError> {
        if limit == 0 || query.is_empty() {
            return Ok(Vec::new());
        }

        let directory = self.source.fetch_directory().await?;
        let cutoff = self.source.config().match_cutoff;

        let results = closest_matches(&query.street, &directory, cutoff, limit)
            .into_iter()
            .map(|candidate| Address {
                id: AddressId(candidate.entry.name.clone()),
                city: self.meta.id.clone(),
                label: format!("{}, {}", candidate.entry.name, self.meta.name),
                street: candidate.entry.name.clone(),
                confidence: candidate.score,
            })
            .collect();

        Ok(results)
    }
}

/// Pickup schedule implementation for Lexington.
pub struct LexingtonSchedulePort {
    source: LexingtonSource,
    meta: CityMeta,
}

impl LexingtonSchedulePort {
    /// Create a new schedule port backed by the given source.
    #[must_use]
    pub fn new(source: LexingtonSource) -> Self {
        Self {
            source,
            meta: city_meta(),
        }
    }
}

#[async_trait]
impl SchedulePort for LexingtonSchedulePort {
    fn city(&self) -> &CityMeta {
        &self.meta
    }

    /// The address id is a street name, canonical or free text. Pickups are
    /// projected from `range.start` and cut off at `range.end`; at most the
    /// configured horizon of pickups per stream is returned.
    async fn schedule(
        &self,
        address_id: &AddressId,
        range: DateRange,
    ) -> Result<Vec<PickupEvent>, PortError> {
        let street = address_id.0.trim();
        if street.is_empty() {
            return Err(PortError::InvalidAddressId);
        }

        let upcoming = self.source.upcoming(street, range.start).await?;

        let events = upcoming
            .projection
            .pickups()
            .filter(|(date, _fraction)| range.contains(*date))
            .map(|(date, fraction)| PickupEvent {
                date,
                fraction,
                note: Some(pickup_note(fraction).to_owned()),
            })
            .collect();

        Ok(events)
    }
}

/// Build the plugin bundle for the Lexington provider.
#[must_use]
pub fn plugin(client: Client, config: LexingtonConfig) -> CityPlugin {
    let source = LexingtonSource::new(client, config);
    let address_port = Arc::new(LexingtonAddressPort::new(source.clone()));
    let schedule_port = Arc::new(LexingtonSchedulePort::new(source));

    CityPlugin {
        meta: city_meta(),
        address_port,
        schedule_port,
    }
}

/// Identifier of the Lexington provider.
#[must_use]
pub fn city_id() -> CityId {
    CityId::from(Cities::Lexington)
}

fn city_meta() -> CityMeta {
    CityMeta {
        id: city_id(),
        name: String::from("Lexington, MA"),
    }
}

fn pickup_note(fraction: Fraction) -> &'static str {
    match fraction {
        Fraction::Trash => "Curbside trash",
        Fraction::Recycling => "Single-stream recycling",
        Fraction::Compost => "Curbside compost",
    }
}
