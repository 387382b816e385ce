use super::format_date;
use chrono::{Duration, NaiveDate};

/// Occurrences hebdomadaires d'une date de base, jusqu'à `until` inclus.
/// La suite s'arrête aussi en fin de calendrier.
#[derive(Debug, Clone)]
pub struct WeeklyOccurrences {
    next: Option<NaiveDate>,
    until: NaiveDate,
}

impl WeeklyOccurrences {
    /// Une base déjà passée (ou égale à `today`) démarre une semaine plus tard.
    pub fn new(base: NaiveDate, until: NaiveDate, today: NaiveDate) -> Self {
        let next = if base <= today {
            base.checked_add_signed(Duration::weeks(1))
        } else {
            Some(base)
        };
        Self { next, until }
    }
}

impl Iterator for WeeklyOccurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|date| *date <= self.until)?;
        self.next = current.checked_add_signed(Duration::weeks(1));
        Some(current)
    }
}

/// Projette chaque base semaine après semaine jusqu'à `until`.
/// Résultat à plat, base par base : ni trié globalement, ni dédoublonné.
pub fn dates_until(bases: &[NaiveDate], until: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    bases
        .iter()
        .flat_map(|&base| WeeklyOccurrences::new(base, until, today))
        .collect()
}

pub fn dates_until_strings(bases: &[NaiveDate], until: NaiveDate, today: NaiveDate) -> Vec<String> {
    dates_until(bases, until, today)
        .into_iter()
        .map(format_date)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn base_equal_to_today_starts_one_week_later() {
        let today = d(2024, 1, 10);
        let got = dates_until(&[today], d(2024, 1, 31), today);
        assert_eq!(got, vec![d(2024, 1, 17), d(2024, 1, 24), d(2024, 1, 31)]);
    }

    #[test]
    fn future_base_is_emitted_as_is() {
        let today = d(2024, 1, 10);
        let got = dates_until_strings(&[d(2024, 1, 12)], d(2024, 1, 26), today);
        assert_eq!(got, vec!["2024-01-12", "2024-01-19", "2024-01-26"]);
    }

    #[test]
    fn empty_when_first_candidate_exceeds_until() {
        let today = d(2024, 1, 10);
        assert!(dates_until(&[d(2024, 1, 9)], d(2024, 1, 15), today).is_empty());
        assert!(dates_until(&[d(2024, 2, 1)], d(2024, 1, 31), today).is_empty());
    }

    #[test]
    fn output_keeps_base_order_without_sorting_or_dedup() {
        let today = d(2024, 1, 1);
        let bases = [d(2024, 1, 10), d(2024, 1, 3), d(2024, 1, 10)];
        let got = dates_until(&bases, d(2024, 1, 17), today);
        assert_eq!(
            got,
            vec![
                d(2024, 1, 10),
                d(2024, 1, 17),
                d(2024, 1, 3),
                d(2024, 1, 10),
                d(2024, 1, 17),
                d(2024, 1, 10),
                d(2024, 1, 17),
            ]
        );
        assert!(got.iter().all(|x| *x <= d(2024, 1, 17)));
    }

    #[test]
    fn sequence_ends_at_calendar_end() {
        let base = NaiveDate::MAX - Duration::days(3);
        assert_eq!(
            dates_until(&[base], NaiveDate::MAX, NaiveDate::MIN),
            vec![base]
        );
        assert!(dates_until(&[NaiveDate::MAX], NaiveDate::MAX, NaiveDate::MAX).is_empty());
    }
}
