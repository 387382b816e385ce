//! Affichage des horaires de shift (horloge 12 h, minutes nulles élidées).

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Serialize;

const READABLE: &str = "%-I:%M%P";
const WIRE: &str = "%H:%M:%S";

fn compact(time: NaiveTime) -> String {
    time.format(READABLE).to_string().replacen(":00", "", 1)
}

/// `13:00:00`, `21:00:00` → `1pm - 9pm`
pub fn shift_times(start: NaiveTime, end: NaiveTime) -> String {
    format!("{} - {}", compact(start), compact(end))
}

/// `2024-01-10`, `08:00`, `16:30` → `Wed, Jan 10, 8am - 4:30pm`
pub fn shift_details_time(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> String {
    format!("{}, {}", date.format("%a, %b %-d"), shift_times(start, end))
}

/// `13:00:00` → `1:00pm` ; chaîne vide si illisible.
pub fn time_to_readable(raw: &str) -> String {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, WIRE)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map(|t| t.format(READABLE).to_string())
        .unwrap_or_default()
}

/// `1:00pm` → `13:00:00` ; chaîne vide si illisible.
pub fn readable_to_time(raw: &str) -> String {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%I:%M%p")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%I:%M %p"))
        .map(|t| t.format(WIRE).to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeOption {
    pub value: String,
    pub label: String,
}

/// Options de 30 minutes depuis `from` jusqu'à la fin de la journée.
pub fn time_options(from: NaiveTime) -> Vec<TimeOption> {
    let mut out = Vec::new();
    for hour in from.hour()..24 {
        let mut minute = if hour == from.hour() { from.minute() } else { 0 };
        while minute < 60 {
            if let Some(t) = NaiveTime::from_hms_opt(hour, minute, 0) {
                out.push(TimeOption {
                    value: t.format(WIRE).to_string(),
                    label: t.format(READABLE).to_string(),
                });
            }
            minute += 30;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn compact_shift_times() {
        assert_eq!(shift_times(t(13, 0), t(21, 0)), "1pm - 9pm");
        assert_eq!(shift_times(t(0, 0), t(8, 30)), "12am - 8:30am");
        assert_eq!(shift_times(t(10, 0), t(12, 0)), "10am - 12pm");
    }

    #[test]
    fn details_include_weekday_and_month() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(
            shift_details_time(date, t(8, 0), t(16, 30)),
            "Wed, Jan 10, 8am - 4:30pm"
        );
    }

    #[test]
    fn readable_conversions() {
        assert_eq!(time_to_readable("13:00:00"), "1:00pm");
        assert_eq!(time_to_readable("07:30"), "7:30am");
        assert_eq!(time_to_readable("nope"), "");
        assert_eq!(readable_to_time("1:00pm"), "13:00:00");
        assert_eq!(readable_to_time("12:30am"), "00:30:00");
        assert_eq!(readable_to_time("25:00pm"), "");
    }

    #[test]
    fn options_step_by_half_hour() {
        let all = time_options(t(0, 0));
        assert_eq!(all.len(), 48);
        assert_eq!(all[1].value, "00:30:00");
        assert_eq!(all[1].label, "12:30am");
        assert_eq!(all.last().unwrap().label, "11:30pm");

        let evening = time_options(t(22, 30));
        let values: Vec<_> = evening.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["22:30:00", "23:00:00", "23:30:00"]);
    }
}
