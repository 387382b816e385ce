use crate::api::DataResponse;
use crate::calendar::week_dates;
use crate::model::{NewShift, ScheduleTemplate, Staff};
use crate::rules::Evaluation;
use crate::storage::{JsonStorage, Storage};
use crate::table::{ScheduleTable, Snapshot};
use anyhow::Context;
use chrono::NaiveDate;
use csv::WriterBuilder;
use std::fs;
use std::path::Path;

/// Charge un snapshot de planning.
///
/// Deux formes acceptées : un `Snapshot` (`dates`, `staffs`, `holidays`), ou
/// la réponse brute `{"content": [staff...], ...}` de `/shift-planning`,
/// auquel cas les dates affichées sont la semaine de `week_of`.
pub fn load_snapshot_json<P: AsRef<Path>>(path: P, week_of: NaiveDate) -> anyhow::Result<Snapshot> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))?;

    if value.get("staffs").is_some() {
        return serde_json::from_value(value)
            .with_context(|| format!("parsing snapshot {}", path.display()));
    }

    let response: DataResponse<Vec<Staff>> = serde_json::from_value(value)
        .with_context(|| format!("parsing shift-planning response {}", path.display()))?;
    let staffs = response.into_result()?;
    Ok(Snapshot {
        dates: week_dates(week_of).to_vec(),
        staffs,
        holidays: Vec::new(),
    })
}

/// Charge une semaine type depuis un fichier JSON isolé.
pub fn load_schedule_template<P: AsRef<Path>>(path: P) -> anyhow::Result<ScheduleTemplate> {
    JsonStorage::open(path)?.load()
}

/// Écrit la charge utile de `POST /shifts/add/multiple`.
pub fn export_new_shifts_json<P: AsRef<Path>>(path: P, shifts: &[NewShift]) -> anyhow::Result<()> {
    JsonStorage::open(path)?.save(shifts)
}

/// Rapport CSV des règles non respectées :
/// header `shift_id,shift_name,username,date,holiday,rule,error`
pub fn export_violations_csv<P: AsRef<Path>>(
    path: P,
    table: &ScheduleTable,
    evaluations: &[Evaluation],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "shift_id",
        "shift_name",
        "username",
        "date",
        "holiday",
        "rule",
        "error",
    ])?;
    for evaluation in evaluations {
        let shift_id = evaluation.shift.to_string();
        let shift_name = table
            .shift(evaluation.shift)
            .map(|s| s.name.as_str())
            .unwrap_or("");
        let username = table
            .staff(evaluation.staff)
            .map(|s| s.username.as_str())
            .unwrap_or("");
        let date = evaluation.date.to_string();
        let holiday = table
            .holiday_on(evaluation.date)
            .map(|h| h.name.as_str())
            .unwrap_or("");
        for failure in evaluation.failures() {
            w.write_record([
                shift_id.as_str(),
                shift_name,
                username,
                date.as_str(),
                holiday,
                failure.id.as_str(),
                failure.error_name.as_str(),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn raw_response_uses_week_of_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resp.json");
        fs::write(
            &path,
            r#"{"content":[{"staffId":1,"staffName":"Alice","username":"alice",
                "role":"CASHIER","status":"ACTIVE","shifts":[],"leaveRequests":[]}],
                "errors":[],"status":200}"#,
        )
        .unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let snapshot = load_snapshot_json(&path, wednesday).unwrap();
        assert_eq!(snapshot.staffs.len(), 1);
        assert_eq!(snapshot.dates.len(), 7);
        assert_eq!(snapshot.dates[0], NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    }

    #[test]
    fn error_response_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resp.json");
        fs::write(&path, r#"{"content":null,"errors":"Invalid input","status":400}"#).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let err = load_snapshot_json(&path, today).unwrap_err();
        assert!(err.to_string().contains("Invalid input"));
    }
}
