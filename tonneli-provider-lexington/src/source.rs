//! Fetching the town pages and turning a street into upcoming pickups.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use reqwest::Client;
use url::Url;

use tonneli_core::{
    directory::Directory,
    ports::PortError,
    projection::{HolidaySet, ScheduleProjection, project_with_rule},
    resolve::{Resolution, resolve},
};

use crate::config::LexingtonConfig;
use crate::parse::{parse_holidays, parse_street_directory};

/// Resolved street together with its projected pickups.
#[derive(Debug, Clone, PartialEq)]
pub struct Upcoming {
    /// How the requested street was matched.
    pub resolution: Resolution,
    /// Upcoming pickups for the matched street.
    pub projection: ScheduleProjection,
}

/// Client for the town's street schedule and holiday pages.
///
/// Nothing is cached: every call fetches a fresh snapshot.
#[derive(Debug, Clone)]
pub struct LexingtonSource {
    client: Client,
    config: Arc<LexingtonConfig>,
}

impl LexingtonSource {
    /// Create a source bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: LexingtonConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &LexingtonConfig {
        &self.config
    }

    /// Fetch the street directory and the holiday list.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Network`] when a page cannot be loaded and
    /// [`PortError::Structure`] when a page no longer has the expected shape.
    pub async fn fetch(&self) -> Result<(Directory, HolidaySet), PortError> {
        let directory = self.fetch_directory().await?;
        let holidays = self.fetch_holidays().await?;
        Ok((directory, holidays))
    }

    /// Fetch only the street directory.
    ///
    /// # Errors
    ///
    /// See [`LexingtonSource::fetch`].
    pub async fn fetch_directory(&self) -> Result<Directory, PortError> {
        let html = self.fetch_html(&self.config.street_schedule_url).await?;
        parse_street_directory(&html)
    }

    /// Fetch only the holiday list.
    ///
    /// # Errors
    ///
    /// See [`LexingtonSource::fetch`].
    pub async fn fetch_holidays(&self) -> Result<HolidaySet, PortError> {
        let html = self.fetch_html(&self.config.holiday_url).await?;
        parse_holidays(&html)
    }

    /// Resolve `street` and project its pickups starting at `today`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnresolvedStreet`] when no known street is close
    /// enough, or any error of [`LexingtonSource::fetch`].
    pub async fn upcoming(&self, street: &str, today: NaiveDate) -> Result<Upcoming, PortError> {
        let (directory, holidays) = self.fetch().await?;

        let resolution = resolve(street, &directory, self.config.match_cutoff);
        let Some(entry) = resolution
            .matched
            .as_deref()
            .and_then(|name| directory.get(name))
        else {
            tracing::warn!(street, streets = directory.len(), "street not found");
            return Err(PortError::UnresolvedStreet(street.trim().to_owned()));
        };
        tracing::info!(
            street,
            matched = %entry.name,
            match_type = ?resolution.match_type,
            confidence = resolution.confidence,
            "resolved street"
        );

        let projection = project_with_rule(
            entry,
            &holidays,
            self.config.horizon,
            today,
            self.config.shift_rule,
        );
        Ok(Upcoming {
            resolution,
            projection,
        })
    }

    /// [`LexingtonSource::upcoming`] starting at the local date.
    ///
    /// # Errors
    ///
    /// See [`LexingtonSource::upcoming`].
    pub async fn upcoming_from_today(&self, street: &str) -> Result<Upcoming, PortError> {
        self.upcoming(street, Local::now().date_naive()).await
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, PortError> {
        tracing::debug!(%url, "fetching page");
        self.client
            .get(url.clone())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(PortError::from)?
            .error_for_status()
            .map_err(PortError::from)?
            .text()
            .await
            .map_err(PortError::from)
    }
}
