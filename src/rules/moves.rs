use super::{
    find_overlapping_shifts, overlaps_leave_request, NoLeaveOverlap, NoOverlappingShift, Rule,
    RoleMatches, RuleResult,
};
use crate::calendar::is_day_in_past;
use crate::model::ShiftId;
use crate::table::{CellId, ScheduleTable, TableError};
use chrono::NaiveDate;

pub const ATTENDANCE_TAKEN: &str = "attendance-taken";
pub const SHIFT_IN_PAST: &str = "shift-in-past";
pub const MOVE_TO_PAST: &str = "move-to-past";

/// Raisons qui interdisent de déplacer `shift` vers `target` (glisser-déposer).
///
/// Ordre : pointage déjà fait, congé sur la case cible, shift passé, cible
/// passée, rôle, chevauchement. Un shift ou une cible dans le passé arrête
/// l'analyse. Liste vide : déplacement autorisé.
pub fn move_errors(
    table: &ScheduleTable,
    shift: ShiftId,
    target: &CellId,
    today: NaiveDate,
) -> Result<Vec<RuleResult>, TableError> {
    let moving = table.shift(shift).ok_or(TableError::UnknownShift(shift))?;
    let info = table
        .cell_info(target)
        .ok_or_else(|| TableError::UnknownCell(target.to_string()))?;
    let staff = table
        .staff(info.staff_id)
        .ok_or_else(|| TableError::UnknownCell(target.to_string()))?;

    let mut errors = Vec::new();

    if moving.attendance_taken() {
        errors.push(RuleResult::failed(
            ATTENDANCE_TAKEN,
            "Cannot move a shift that has been taken attendance",
        ));
    }

    if overlaps_leave_request(table, staff.staff_id, info.date) {
        errors.push(failure_of(&NoLeaveOverlap));
    }

    if is_day_in_past(moving.date, today) {
        errors.push(RuleResult::failed(SHIFT_IN_PAST, "Can not modify a shift in the past"));
        return Ok(errors);
    }

    if is_day_in_past(info.date, today) {
        errors.push(RuleResult::failed(MOVE_TO_PAST, "Can not move a shift to the past"));
        return Ok(errors);
    }

    if !moving.role.accepts(staff.role) {
        errors.push(failure_of(&RoleMatches));
    }

    let mut shifts = table.shifts_in_cell(target);
    shifts.push(moving);
    if find_overlapping_shifts(shifts).contains(&shift) {
        errors.push(failure_of(&NoOverlappingShift));
    }

    Ok(errors)
}

fn failure_of(rule: &dyn Rule) -> RuleResult {
    RuleResult::of(rule, false)
}
