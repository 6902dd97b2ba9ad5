//! HTML parsing for the town's street schedule and holiday pages.

use chrono::{NaiveDate, Weekday};
use scraper::{ElementRef, Html, Selector};

use tonneli_core::{
    directory::{Directory, StreetEntry},
    ports::PortError,
    projection::HolidaySet,
};

const HOLIDAY_DATE_FORMAT: &str = "%A, %B %d, %Y";
const HOLIDAY_DATE_FORMAT_NO_WEEKDAY: &str = "%B %d, %Y";

/// Parse the "collection schedule by street" page.
///
/// The page lists one `<li>` per street inside the first `div.fr-view`, each
/// reading `Street Name - WEEKDAY`.
pub(crate) fn parse_street_directory(html: &str) -> Result<Directory, PortError> {
    let document = Html::parse_document(html);

    let container = document
        .select(&selector("div.fr-view")?)
        .next()
        .ok_or_else(|| PortError::Structure("street list container div.fr-view missing".into()))?;
    let list = container
        .select(&selector("ul")?)
        .next()
        .ok_or_else(|| PortError::Structure("street list <ul> missing".into()))?;

    let mut directory = Directory::new();
    let mut skipped = 0_usize;
    for item in list.select(&selector("li")?) {
        let line = element_text(item);
        let Some((street, days)) = split_street_line(&line) else {
            tracing::debug!(%line, "skipping line without street/day separator");
            skipped += 1;
            continue;
        };
        let Some(weekdays) = parse_weekdays(days) else {
            tracing::warn!(%line, "skipping street with unknown collection day");
            skipped += 1;
            continue;
        };
        if directory
            .insert(StreetEntry::uniform(street, &weekdays))
            .is_some()
        {
            tracing::debug!(street, "street listed twice, keeping the later line");
        }
    }

    if directory.is_empty() {
        return Err(PortError::Structure(
            "street list contains no usable lines".into(),
        ));
    }
    tracing::debug!(streets = directory.len(), skipped, "parsed street directory");
    Ok(directory)
}

/// Parse the "official town holidays" page.
///
/// Holidays live in `table.fr-alternate-rows`, one per body row, with the
/// date in the second cell as `Monday, January 15, 2024`.
pub(crate) fn parse_holidays(html: &str) -> Result<HolidaySet, PortError> {
    let document = Html::parse_document(html);
    let table_selector = selector("table.fr-alternate-rows")?;
    let body_selector = selector("tbody")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let mut holidays = HolidaySet::new();
    let mut tables = 0_usize;
    for table in document.select(&table_selector) {
        tables += 1;
        let Some(body) = table.select(&body_selector).next() else {
            continue;
        };
        for row in body.select(&row_selector) {
            let Some(cell) = row.select(&cell_selector).nth(1) else {
                continue;
            };
            let text = element_text(cell);
            match parse_holiday_date(&text) {
                Ok(date) => {
                    holidays.insert(date);
                }
                Err(err) => tracing::debug!(%text, %err, "skipping holiday row"),
            }
        }
    }

    if tables == 0 {
        return Err(PortError::Structure(
            "holiday table table.fr-alternate-rows missing".into(),
        ));
    }
    if holidays.is_empty() {
        tracing::warn!(tables, "holiday tables contain no dates");
    }
    Ok(holidays)
}

/// Split `Street - DAY` at the last separator. An en dash is accepted too.
fn split_street_line(line: &str) -> Option<(&str, &str)> {
    let (street, days) = line
        .rsplit_once(" - ")
        .or_else(|| line.rsplit_once(" \u{2013} "))?;
    let street = street.trim();
    let days = days.trim();
    (!street.is_empty() && !days.is_empty()).then_some((street, days))
}

/// Parse `MONDAY`, `Mon & Thu`, `Tuesday/Friday` or `Monday and Thursday`.
pub(crate) fn parse_weekdays(raw: &str) -> Option<Vec<Weekday>> {
    let lowered = raw.to_lowercase().replace(" and ", "&");
    let mut weekdays = Vec::new();
    for token in lowered.split(['&', '/', ',']) {
        let token = token.trim_matches(|ch: char| !ch.is_alphabetic());
        if token.is_empty() {
            continue;
        }
        let day = token.parse::<Weekday>().ok()?;
        if !weekdays.contains(&day) {
            weekdays.push(day);
        }
    }
    (!weekdays.is_empty()).then_some(weekdays)
}

fn parse_holiday_date(text: &str) -> Result<NaiveDate, PortError> {
    NaiveDate::parse_from_str(text, HOLIDAY_DATE_FORMAT).or_else(|err| {
        // a weekday that disagrees with the date is rejected by the full format
        text.split_once(", ")
            .and_then(|(_weekday, rest)| {
                NaiveDate::parse_from_str(rest, HOLIDAY_DATE_FORMAT_NO_WEEKDAY).ok()
            })
            .ok_or(PortError::Parse(err))
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector(css: &str) -> Result<Selector, PortError> {
    Selector::parse(css).map_err(|err| PortError::Internal(format!("invalid selector {css}: {err}")))
}
