//! Génération de shifts : création ou modification d'un shift isolé, copie
//! d'un shift sur plusieurs jours, application d'une semaine type, copie
//! d'une semaine entière.
//!
//! Les jours déjà passés sont toujours écartés ; le résultat est la charge
//! utile d'un `POST /shifts/add/multiple`.

use crate::calendar::{dates_until, is_day_in_past, same_weekday, week_dates};
use crate::model::{NewShift, ScheduleShiftTemplate, ScheduleTemplate, Shift, StaffId};
use crate::rules::{evaluate_in_cell, RuleSet};
use crate::table::ScheduleTable;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("the until date {0} is not valid, pick a date in the future")]
    UntilNotInFuture(NaiveDate),
    #[error("no day selected")]
    NoDaySelected,
    #[error("schedule template has no shift")]
    EmptyTemplate,
    #[error("schedule template name cannot be empty")]
    EmptyTemplateName,
    #[error("Can not {action} shift in the past")]
    ShiftInPast { action: ShiftAction, date: NaiveDate },
    #[error("Invalid staff")]
    InvalidStaff(StaffId),
    #[error("{error_name}")]
    RuleFailed { rule: String, error_name: String },
}

/// Formulaire à l'origine d'un contrôle de shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftAction {
    Create,
    Edit,
}

impl std::fmt::Display for ShiftAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ShiftAction::Create => "create",
            ShiftAction::Edit => "edit",
        })
    }
}

/// Contrôle d'un shift saisi dans un formulaire avant envoi au backend.
///
/// Dans l'ordre : date passée, staff inconnu du tableau, puis la première
/// règle de `rules` qui échoue. Le shift renvoyé est placé chez `staff` le `date`.
pub fn validate_shift(
    table: &ScheduleTable,
    rules: &RuleSet,
    shift: &Shift,
    staff: StaffId,
    date: NaiveDate,
    action: ShiftAction,
    today: NaiveDate,
) -> Result<NewShift, PlanError> {
    if is_day_in_past(date, today) {
        return Err(PlanError::ShiftInPast { action, date });
    }
    let staff = table.staff(staff).ok_or(PlanError::InvalidStaff(staff))?;

    let mut candidate = shift.clone();
    candidate.date = date;
    candidate.staff_id = Some(staff.staff_id);

    // une date hors de la semaine affichée n'a pas de case : même règles, tableau tel quel
    let evaluation = table
        .cell_for(staff.staff_id, date)
        .and_then(|cell| evaluate_in_cell(table, rules, &candidate, &cell))
        .unwrap_or_else(|| rules.evaluate_shift(&candidate, staff, date, table));
    if let Some(failure) = evaluation.first_failure() {
        debug_event!(shift = %candidate.shift_id, rule = %failure.id, "shift refused");
        return Err(PlanError::RuleFailed {
            rule: failure.id.clone(),
            error_name: failure.error_name.clone(),
        });
    }
    Ok(NewShift::from_shift(&candidate, date, candidate.published))
}

/// Copie d'un shift vers d'autres jours de sa semaine, éventuellement
/// répétée chaque semaine jusqu'à `until`.
#[derive(Debug, Clone, Default)]
pub struct CopyRequest {
    pub days: Vec<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub publish: bool,
}

pub fn copy_shift(
    shift: &Shift,
    request: &CopyRequest,
    today: NaiveDate,
) -> Result<Vec<NewShift>, PlanError> {
    if request.days.is_empty() {
        return Err(PlanError::NoDaySelected);
    }
    let dates = match request.until {
        Some(until) if until <= today => return Err(PlanError::UntilNotInFuture(until)),
        // la date du shift sert de référence : les jours qui la précèdent partent la semaine suivante
        Some(until) => dates_until(&request.days, until, shift.date),
        None => request.days.clone(),
    };
    Ok(dates
        .into_iter()
        .filter(|date| *date != shift.date && !is_day_in_past(*date, today))
        .map(|date| NewShift::from_shift(shift, date, request.publish))
        .collect())
}

/// Rejoue une semaine type sur la semaine de `picked` (même jour de semaine,
/// jamais avant `picked`). Les shifts créés ne sont pas publiés.
pub fn apply_schedule_template(
    template: &ScheduleTemplate,
    picked: NaiveDate,
    today: NaiveDate,
) -> Vec<NewShift> {
    template
        .schedule_shift_templates
        .iter()
        .map(|tpl| NewShift::from_template(tpl, same_weekday(tpl.date, picked)))
        .filter(|shift| !is_day_in_past(shift.date, today))
        .collect()
}

/// Recopie tous les shifts affichés de `source` vers la semaine de `picked`.
pub fn copy_week(source: &ScheduleTable, picked: NaiveDate, today: NaiveDate) -> Vec<NewShift> {
    source
        .cells()
        .into_iter()
        .flat_map(|(cell, _)| source.shifts_in_cell(cell))
        .map(|shift| NewShift::from_shift(shift, same_weekday(shift.date, picked), shift.published))
        .filter(|shift| !is_day_in_past(shift.date, today))
        .collect()
}

/// La semaine de `picked` contient au moins un jour passé : une partie des
/// shifts ne sera pas créée.
pub fn week_has_past_days(picked: NaiveDate, today: NaiveDate) -> bool {
    week_dates(picked)
        .iter()
        .any(|date| is_day_in_past(*date, today))
}

/// Capture les shifts affichés d'un tableau en semaine type.
pub fn capture_week_template(
    table: &ScheduleTable,
    name: &str,
    description: &str,
) -> Result<ScheduleTemplate, PlanError> {
    if name.trim().is_empty() {
        return Err(PlanError::EmptyTemplateName);
    }
    let shifts: Vec<ScheduleShiftTemplate> = table
        .cells()
        .into_iter()
        .flat_map(|(cell, _)| table.shifts_in_cell(cell))
        .map(|shift| ScheduleShiftTemplate {
            schedule_shift_template_id: 0,
            staff_id: shift.staff_id,
            staff_name: shift
                .staff_id
                .and_then(|id| table.staff(id))
                .map(|staff| staff.staff_name.clone()),
            date: shift.date,
            start_time: shift.start_time,
            end_time: shift.end_time,
            name: shift.name.clone(),
            salary_coefficient: shift.salary_coefficient,
            role: shift.role,
        })
        .collect();
    if shifts.is_empty() {
        return Err(PlanError::EmptyTemplate);
    }
    Ok(ScheduleTemplate {
        schedule_template_id: 0,
        name: name.trim().to_string(),
        description: description.to_string(),
        schedule_shift_templates: shifts,
    })
}
