use super::{add_days_saturating, date_or_today, format_date};
use chrono::{Datelike, NaiveDate};

/// Lundi et dimanche de la semaine ISO de `date`.
///
/// Aux extrémités du calendrier, les jours hors plage sont ramenés à
/// `NaiveDate::MIN`/`MAX`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = add_days_saturating(date, -i64::from(date.weekday().num_days_from_monday()));
    (monday, add_days_saturating(monday, 6))
}

/// Les sept jours de la semaine ISO de `date`, du lundi au dimanche.
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let (monday, _) = week_bounds(date);
    std::array::from_fn(|i| add_days_saturating(monday, i as i64))
}

/// Bornes de semaine pour une saisie brute ; illisible ou absente vaut `today`.
pub fn week_bounds_of(input: Option<&str>, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    week_bounds(date_or_today(input, today))
}

/// Jours de la semaine formatés `YYYY-MM-DD` ; illisible ou absente vaut `today`.
pub fn week_date_strings(input: Option<&str>, today: NaiveDate) -> [String; 7] {
    week_dates(date_or_today(input, today)).map(format_date)
}

/// Dimanche qui ouvre la semaine de `date` (semaine calendaire dimanche → samedi).
pub fn sunday_week_start(date: NaiveDate) -> NaiveDate {
    add_days_saturating(date, -i64::from(date.weekday().num_days_from_sunday()))
}

/// Date portant le même jour de semaine que `reference` dans la semaine de
/// `target`. Si elle tombe strictement avant `target`, on avance de 7 jours ;
/// une égalité ne déclenche pas de report.
pub fn same_weekday(reference: NaiveDate, target: NaiveDate) -> NaiveDate {
    let offset = i64::from(reference.weekday().num_days_from_sunday());
    let candidate = add_days_saturating(sunday_week_start(target), offset);
    if candidate < target {
        add_days_saturating(candidate, 7)
    } else {
        candidate
    }
}
