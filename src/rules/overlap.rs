use crate::model::{Shift, ShiftId};
use chrono::Timelike;

const DAY_SECONDS: u32 = 24 * 60 * 60;

/// Ids des shifts qui se chevauchent dans un même jour.
///
/// Doublons d'id ignorés (le premier gagne), tri stable par heure de début,
/// puis comparaison des seules paires adjacentes : le suivant chevauche s'il
/// commence dans `[début, fin)` du courant. Une fin inférieure ou égale au
/// début passe au lendemain.
pub fn find_overlapping_shifts<'a, I>(shifts: I) -> Vec<ShiftId>
where
    I: IntoIterator<Item = &'a Shift>,
{
    let mut unique: Vec<&Shift> = Vec::new();
    for shift in shifts {
        if !unique.iter().any(|s| s.shift_id == shift.shift_id) {
            unique.push(shift);
        }
    }
    unique.sort_by_key(|s| s.start_time);

    let mut out: Vec<ShiftId> = Vec::new();
    for pair in unique.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let (start, end) = bounds_seconds(current);
        let next_start = next.start_time.num_seconds_from_midnight();
        if start <= next_start && next_start < end {
            for id in [current.shift_id, next.shift_id] {
                if !out.contains(&id) {
                    out.push(id);
                }
            }
        }
    }
    out
}

fn bounds_seconds(shift: &Shift) -> (u32, u32) {
    let start_secs = shift.start_time.num_seconds_from_midnight();
    let mut end_secs = shift.end_time.num_seconds_from_midnight();
    if shift.is_overnight() {
        end_secs += DAY_SECONDS;
    }
    (start_secs, end_secs)
}
