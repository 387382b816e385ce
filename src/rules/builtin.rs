use super::{find_overlapping_shifts, Rule, RuleContext};
use crate::model::{ApprovalStatus, StaffId};
use crate::table::{CellId, ScheduleTable};
use chrono::NaiveDate;

pub const ROLE_MATCHES: &str = "role-matches";
pub const NO_OVERLAPPING_SHIFT: &str = "no-overlapping-shift";
pub const NO_LEAVE_OVERLAP: &str = "no-leave-overlap";

/// Le rôle requis par le shift correspond à celui du staff (ou `ALL_ROLES`).
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleMatches;

impl Rule for RoleMatches {
    fn id(&self) -> &str {
        ROLE_MATCHES
    }
    fn error_name(&self) -> &str {
        "Staff's role does not match"
    }
    fn description(&self) -> &str {
        "Does this shift's required role matches with the staff's role?"
    }
    fn check(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.shift.role.accepts(ctx.staff.role)
    }
}

/// Le shift ne chevauche aucun autre shift de la case (staff, date).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOverlappingShift;

impl Rule for NoOverlappingShift {
    fn id(&self) -> &str {
        NO_OVERLAPPING_SHIFT
    }
    fn error_name(&self) -> &str {
        "Overlapping shifts"
    }
    fn description(&self) -> &str {
        "Does this shift overlap with an existing shift?"
    }
    fn check(&self, ctx: &RuleContext<'_>) -> bool {
        let cell = CellId::new(ctx.staff, ctx.date);
        let mut shifts = ctx.table.shifts_in_cell(&cell);
        shifts.push(ctx.shift);
        !find_overlapping_shifts(shifts).contains(&ctx.shift.shift_id)
    }
}

/// Le staff n'a pas de congé approuvé couvrant la date.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLeaveOverlap;

impl Rule for NoLeaveOverlap {
    fn id(&self) -> &str {
        NO_LEAVE_OVERLAP
    }
    fn error_name(&self) -> &str {
        "Overlap with leave request"
    }
    fn description(&self) -> &str {
        "Does this shift overlap with a leave request?"
    }
    fn check(&self, ctx: &RuleContext<'_>) -> bool {
        !overlaps_leave_request(ctx.table, ctx.staff.staff_id, ctx.date)
    }
}

/// Un congé approuvé du staff couvre `date` (bornes incluses).
pub fn overlaps_leave_request(table: &ScheduleTable, staff: StaffId, date: NaiveDate) -> bool {
    table.leave_requests().iter().any(|leave| {
        leave.staff_id == staff && leave.status == ApprovalStatus::Approved && leave.covers(date)
    })
}
