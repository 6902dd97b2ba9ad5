//! Projection of a street's weekly collection days onto concrete dates.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::directory::StreetEntry;
use crate::model::Fraction;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Holidays that delay collection, as local calendar dates.
pub struct HolidaySet(BTreeSet<NaiveDate>);

impl HolidaySet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a holiday; returns `false` if it was already present.
    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.0.insert(date)
    }

    /// Whether `date` is a holiday.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    /// Whether any holiday falls within `start..=end`.
    #[must_use]
    pub fn any_between(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= end && self.0.range(start..=end).next().is_some()
    }

    /// Holidays in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.iter().copied()
    }

    /// Number of holidays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no holidays.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// When a holiday delays a pickup.
pub enum ShiftRule {
    /// Only a pickup falling on a holiday moves, one day at a time until it
    /// lands on a regular day.
    #[default]
    OnHoliday,
    /// A holiday between the Monday of the pickup's week and the pickup day
    /// (inclusive) delays the pickup by one day, further if that day is a
    /// holiday too.
    WeekDelay,
}

impl ShiftRule {
    /// Apply the rule to a regular pickup date.
    ///
    /// Returns `None` only when the shifted date would leave the calendar.
    #[must_use]
    pub fn shift(self, candidate: NaiveDate, holidays: &HolidaySet) -> Option<NaiveDate> {
        let mut date = candidate;
        if self == ShiftRule::WeekDelay {
            let since_monday = u64::from(candidate.weekday().num_days_from_monday());
            let week_start = candidate.checked_sub_days(Days::new(since_monday))?;
            if holidays.any_between(week_start, candidate) {
                date = date.succ_opt()?;
            }
        }
        while holidays.contains(date) {
            date = date.succ_opt()?;
        }
        Some(date)
    }
}

impl fmt::Display for ShiftRule {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            ShiftRule::OnHoliday => "on-holiday",
            ShiftRule::WeekDelay => "week-delay",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shift rule `{0}`, expected `on-holiday` or `week-delay`")]
/// Returned when a shift rule name is not recognized.
pub struct UnknownShiftRule(pub String);

impl FromStr for ShiftRule {
    type Err = UnknownShiftRule;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().replace('_', "-").as_str() {
            "on-holiday" => Ok(ShiftRule::OnHoliday),
            "week-delay" => Ok(ShiftRule::WeekDelay),
            _ => Err(UnknownShiftRule(raw.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Streams collected on one date.
pub struct ScheduledDay {
    /// Pickup date, never a holiday.
    pub date: NaiveDate,
    /// Streams collected that day.
    pub fractions: BTreeSet<Fraction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Upcoming pickups in strictly increasing date order.
pub struct ScheduleProjection {
    days: Vec<ScheduledDay>,
}

impl ScheduleProjection {
    /// Scheduled days in chronological order.
    #[must_use]
    pub fn days(&self) -> &[ScheduledDay] {
        &self.days
    }

    /// Flatten into `(date, stream)` pairs, chronological, streams in
    /// presentation order within a day.
    pub fn pickups(&self) -> impl Iterator<Item = (NaiveDate, Fraction)> + '_ {
        self.days.iter().flat_map(|day| {
            day.fractions
                .iter()
                .map(move |fraction| (day.date, *fraction))
        })
    }

    /// Dates on which `fraction` is collected.
    #[must_use]
    pub fn dates_for(&self, fraction: Fraction) -> Vec<NaiveDate> {
        self.days
            .iter()
            .filter(|day| day.fractions.contains(&fraction))
            .map(|day| day.date)
            .collect()
    }

    /// Number of distinct pickup dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Project the next `horizon` pickups per stream starting at `today`, using
/// [`ShiftRule::OnHoliday`].
#[must_use]
pub fn project(
    entry: &StreetEntry,
    holidays: &HolidaySet,
    horizon: usize,
    today: NaiveDate,
) -> ScheduleProjection {
    project_with_rule(entry, holidays, horizon, today, ShiftRule::default())
}

/// Project the next `horizon` pickups per stream starting at `today`.
///
/// Each stream is walked independently and the results are merged by date.
/// A shifted date that does not come strictly after the stream's previous
/// pickup is dropped.
#[must_use]
pub fn project_with_rule(
    entry: &StreetEntry,
    holidays: &HolidaySet,
    horizon: usize,
    today: NaiveDate,
    rule: ShiftRule,
) -> ScheduleProjection {
    let mut merged: BTreeMap<NaiveDate, BTreeSet<Fraction>> = BTreeMap::new();
    for (fraction, weekdays) in &entry.schedule {
        for date in project_stream(weekdays, holidays, horizon, today, rule) {
            merged.entry(date).or_default().insert(*fraction);
        }
    }
    ScheduleProjection {
        days: merged
            .into_iter()
            .map(|(date, fractions)| ScheduledDay { date, fractions })
            .collect(),
    }
}

fn project_stream(
    weekdays: &[Weekday],
    holidays: &HolidaySet,
    horizon: usize,
    today: NaiveDate,
    rule: ShiftRule,
) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = Vec::with_capacity(horizon);
    if horizon == 0 || weekdays.is_empty() {
        return dates;
    }

    let candidates = today
        .iter_days()
        .filter(|day| weekdays.contains(&day.weekday()));
    for candidate in candidates {
        if dates.len() == horizon {
            break;
        }
        let Some(shifted) = rule.shift(candidate, holidays) else {
            break;
        };
        if dates.last().is_none_or(|last| shifted > *last) {
            dates.push(shifted);
        } else {
            tracing::trace!(%candidate, %shifted, "pickup absorbed by earlier shifted date");
        }
    }
    dates
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{NaiveDate, Weekday};

    use super::{HolidaySet, ShiftRule, project, project_with_rule};
    use crate::directory::StreetEntry;
    use crate::model::Fraction;

    fn date(day: &str) -> NaiveDate {
        day.parse().expect("valid ISO date")
    }

    fn dates(days: &[&str]) -> Vec<NaiveDate> {
        days.iter().map(|day| date(day)).collect()
    }

    fn holidays(days: &[&str]) -> HolidaySet {
        days.iter().map(|day| date(day)).collect()
    }

    // 2024-01-01 is a Monday.
    const MONDAY: &str = "2024-01-01";

    #[test]
    fn weekly_pickups_without_holidays() {
        let entry = StreetEntry::uniform("Abbott Rd", &[Weekday::Wed]);
        let projection = project(&entry, &HolidaySet::new(), 3, date(MONDAY));

        assert_eq!(projection.len(), 3);
        for fraction in Fraction::ALL {
            assert_eq!(
                projection.dates_for(fraction),
                dates(&["2024-01-03", "2024-01-10", "2024-01-17"])
            );
        }
        let first = projection.days().first().expect("three days projected");
        assert_eq!(first.fractions.len(), 3);
    }

    #[test]
    fn today_is_included() {
        let entry = StreetEntry::uniform("Abbott Rd", &[Weekday::Mon]);
        let projection = project(&entry, &HolidaySet::new(), 1, date(MONDAY));
        assert_eq!(projection.dates_for(Fraction::Trash), dates(&[MONDAY]));
    }

    #[test]
    fn holiday_shifts_by_one_day() {
        let entry = StreetEntry::uniform("Abbott Rd", &[Weekday::Wed]);
        let holidays = holidays(&["2024-01-10"]);
        let projection = project(&entry, &holidays, 3, date(MONDAY));

        let trash = projection.dates_for(Fraction::Trash);
        assert_eq!(trash, dates(&["2024-01-03", "2024-01-11", "2024-01-17"]));
        assert!(
            trash.iter().all(|day| !holidays.contains(*day)),
            "no pickup on a holiday"
        );
    }

    #[test]
    fn consecutive_holidays_cascade() {
        let entry = StreetEntry::uniform("Abbott Rd", &[Weekday::Wed]);
        let holidays = holidays(&["2024-01-10", "2024-01-11", "2024-01-12"]);
        let projection = project(&entry, &holidays, 2, date(MONDAY));

        assert_eq!(
            projection.dates_for(Fraction::Trash),
            dates(&["2024-01-03", "2024-01-13"])
        );
    }

    #[test]
    fn projection_is_idempotent() {
        let entry = StreetEntry::uniform("Abbott Rd", &[Weekday::Fri]);
        let holidays = holidays(&["2024-01-05", "2024-01-19"]);
        let first = project(&entry, &holidays, 8, date(MONDAY));
        let second = project(&entry, &holidays, 8, date(MONDAY));
        assert_eq!(first, second);
    }

    #[test]
    fn streams_are_projected_independently_and_merged() {
        let entry = StreetEntry {
            name: "Oak St".to_owned(),
            schedule: BTreeMap::from([
                (Fraction::Trash, vec![Weekday::Mon]),
                (Fraction::Recycling, vec![Weekday::Thu]),
            ]),
        };
        let projection = project(&entry, &HolidaySet::new(), 2, date(MONDAY));

        let merged: Vec<(NaiveDate, Vec<Fraction>)> = projection
            .days()
            .iter()
            .map(|day| (day.date, day.fractions.iter().copied().collect()))
            .collect();
        assert_eq!(
            merged,
            vec![
                (date("2024-01-01"), vec![Fraction::Trash]),
                (date("2024-01-04"), vec![Fraction::Recycling]),
                (date("2024-01-08"), vec![Fraction::Trash]),
                (date("2024-01-11"), vec![Fraction::Recycling]),
            ]
        );
        assert!(
            projection.dates_for(Fraction::Compost).is_empty(),
            "compost is not served"
        );
    }

    #[test]
    fn shifted_pickup_absorbs_colliding_candidate() {
        let entry = StreetEntry::uniform("Oak St", &[Weekday::Mon, Weekday::Tue]);
        let holidays = holidays(&["2024-01-08"]);
        let projection = project(&entry, &holidays, 4, date(MONDAY));

        assert_eq!(
            projection.dates_for(Fraction::Trash),
            dates(&["2024-01-01", "2024-01-02", "2024-01-09", "2024-01-15"])
        );
    }

    #[test]
    fn week_delay_rule_follows_earlier_holiday() {
        let entry = StreetEntry::uniform("Abbott Rd", &[Weekday::Wed]);
        let holidays = holidays(&["2024-01-08"]);

        let delayed = project_with_rule(&entry, &holidays, 3, date(MONDAY), ShiftRule::WeekDelay);
        assert_eq!(
            delayed.dates_for(Fraction::Trash),
            dates(&["2024-01-03", "2024-01-11", "2024-01-17"])
        );

        let on_holiday = project(&entry, &holidays, 3, date(MONDAY));
        assert_eq!(
            on_holiday.dates_for(Fraction::Trash),
            dates(&["2024-01-03", "2024-01-10", "2024-01-17"])
        );
    }

    #[test]
    fn week_delay_rule_cascades() {
        let entry = StreetEntry::uniform("Abbott Rd", &[Weekday::Wed]);
        let holidays = holidays(&["2024-01-08", "2024-01-11"]);
        let projection =
            project_with_rule(&entry, &holidays, 2, date(MONDAY), ShiftRule::WeekDelay);
        assert_eq!(
            projection.dates_for(Fraction::Trash),
            dates(&["2024-01-03", "2024-01-12"])
        );
    }

    #[test]
    fn no_pickup_ever_lands_on_a_holiday() {
        let entry = StreetEntry::uniform("Oak St", &[Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        let holidays = holidays(&[
            "2024-01-01",
            "2024-01-02",
            "2024-01-05",
            "2024-01-06",
            "2024-01-10",
            "2024-01-15",
            "2024-01-16",
            "2024-01-17",
        ]);
        for rule in [ShiftRule::OnHoliday, ShiftRule::WeekDelay] {
            let projection = project_with_rule(&entry, &holidays, 10, date(MONDAY), rule);
            assert!(
                projection.days().iter().all(|day| !holidays.contains(day.date)),
                "{rule} produced a holiday pickup"
            );
            let trash = projection.dates_for(Fraction::Trash);
            assert!(
                trash.windows(2).all(|pair| pair.first() < pair.last()),
                "{rule} produced out-of-order dates"
            );
        }
    }

    #[test]
    fn empty_horizon_or_weekdays_yield_nothing() {
        let entry = StreetEntry::uniform("Abbott Rd", &[Weekday::Wed]);
        assert!(
            project(&entry, &HolidaySet::new(), 0, date(MONDAY)).is_empty(),
            "horizon 0"
        );
        let unserved = StreetEntry::uniform("Nowhere Ln", &[]);
        assert!(
            project(&unserved, &HolidaySet::new(), 8, date(MONDAY)).is_empty(),
            "no weekdays"
        );
    }

    #[test]
    fn pickups_flatten_in_order() {
        let entry = StreetEntry::uniform("Abbott Rd", &[Weekday::Tue]);
        let projection = project(&entry, &HolidaySet::new(), 1, date(MONDAY));
        let pickups: Vec<(NaiveDate, Fraction)> = projection.pickups().collect();
        assert_eq!(
            pickups,
            vec![
                (date("2024-01-02"), Fraction::Trash),
                (date("2024-01-02"), Fraction::Recycling),
                (date("2024-01-02"), Fraction::Compost),
            ]
        );
    }

    #[test]
    fn shift_rule_names() {
        assert_eq!("on-holiday".parse::<ShiftRule>(), Ok(ShiftRule::OnHoliday));
        assert_eq!(" Week_Delay ".parse::<ShiftRule>(), Ok(ShiftRule::WeekDelay));
        assert!("sometimes".parse::<ShiftRule>().is_err(), "unknown name");
        assert_eq!(ShiftRule::WeekDelay.to_string(), "week-delay");
    }

    #[test]
    fn holiday_range_check() {
        let holidays = holidays(&["2024-01-10"]);
        assert!(
            holidays.any_between(date("2024-01-08"), date("2024-01-10")),
            "inclusive end"
        );
        assert!(
            !holidays.any_between(date("2024-01-11"), date("2024-01-08")),
            "reversed range is empty"
        );
    }
}
