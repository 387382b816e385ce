//! Calculs de dates pour le planning hebdomadaire.
//!
//! Toutes les fonctions sont pures : la date du jour est toujours passée en
//! paramètre, `today()` n'est lue qu'aux bords (CLI).

mod recurrence;
mod types;
mod week;

pub use recurrence::{dates_until, dates_until_strings, WeeklyOccurrences};
pub use types::{DateFallback, InvalidDate};
pub use week::{
    same_weekday, sunday_week_start, week_bounds, week_bounds_of, week_date_strings, week_dates,
};

use chrono::{Duration, Local, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date locale du jour.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse une date `YYYY-MM-DD` (année sur quatre chiffres, sans signe). Un
/// horodatage (`2024-01-10T08:00:00`) est ramené à sa partie date.
pub fn parse_date(input: &str) -> Result<NaiveDate, InvalidDate> {
    let trimmed = input.trim();
    let day_part = trimmed
        .split_once(['T', ' '])
        .map_or(trimmed, |(day, _)| day);
    if !is_plain_date(day_part) {
        return Err(InvalidDate::new(input));
    }
    NaiveDate::parse_from_str(day_part, DATE_FORMAT).map_err(|_| InvalidDate::new(input))
}

// `%Y` accepte aussi les années signées étendues (`+262142-12-31`).
fn is_plain_date(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// `date` décalée de `days` jours, bornée à `NaiveDate::MIN`/`MAX`.
pub(crate) fn add_days_saturating(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Résout une date optionnelle selon `policy`.
pub fn resolve_date(
    input: Option<&str>,
    today: NaiveDate,
    policy: DateFallback,
) -> Result<NaiveDate, InvalidDate> {
    let parsed = match input {
        Some(raw) => parse_date(raw),
        None => Err(InvalidDate::new("")),
    };
    match (parsed, policy) {
        (Ok(date), _) => Ok(date),
        (Err(err), DateFallback::Strict) => Err(err),
        (Err(_err), DateFallback::Today) => {
            debug_event!(input = %_err.input, %today, "unreadable date, falling back to today");
            Ok(today)
        }
    }
}

/// Variante tolérante : toute entrée illisible vaut `today`.
pub fn date_or_today(input: Option<&str>, today: NaiveDate) -> NaiveDate {
    match input.map(parse_date) {
        Some(Ok(date)) => date,
        _ => {
            debug_event!(?input, %today, "unreadable date, falling back to today");
            today
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Vrai si `date` est strictement avant `today` (comparaison au jour).
pub fn is_day_in_past(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}
