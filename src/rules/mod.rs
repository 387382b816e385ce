//! Règles de validité d'un shift dans le tableau de planning.
//!
//! Chaque règle est un prédicat indépendant sur (shift, staff, date, tableau).
//! Un `RuleSet` les évalue toutes, dans l'ordre, sans court-circuit : un
//! shift est en violation dès qu'une règle échoue.

mod builtin;
mod moves;
mod overlap;

pub use builtin::{
    overlaps_leave_request, NoLeaveOverlap, NoOverlappingShift, RoleMatches, NO_LEAVE_OVERLAP,
    NO_OVERLAPPING_SHIFT, ROLE_MATCHES,
};
pub use moves::{move_errors, ATTENDANCE_TAKEN, MOVE_TO_PAST, SHIFT_IN_PAST};
pub use overlap::find_overlapping_shifts;

use crate::model::{Shift, ShiftId, Staff, StaffId};
use crate::table::{CellId, ScheduleTable};
use chrono::NaiveDate;
use serde::Serialize;

/// Entrées communes à toutes les règles.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub shift: &'a Shift,
    pub staff: &'a Staff,
    pub date: NaiveDate,
    pub table: &'a ScheduleTable,
}

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn error_name(&self) -> &str;
    fn description(&self) -> &str;
    /// `true` si la règle est respectée.
    fn check(&self, ctx: &RuleContext<'_>) -> bool;
}

/// Règle ad hoc construite à partir d'une closure.
pub struct FnRule<F> {
    id: String,
    error_name: String,
    description: String,
    predicate: F,
}

impl<F> FnRule<F>
where
    F: Fn(&RuleContext<'_>) -> bool + Send + Sync,
{
    pub fn new<I, E, D>(id: I, error_name: E, description: D, predicate: F) -> Self
    where
        I: Into<String>,
        E: Into<String>,
        D: Into<String>,
    {
        Self {
            id: id.into(),
            error_name: error_name.into(),
            description: description.into(),
            predicate,
        }
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&RuleContext<'_>) -> bool + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }
    fn error_name(&self) -> &str {
        &self.error_name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn check(&self, ctx: &RuleContext<'_>) -> bool {
        (self.predicate)(ctx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub id: String,
    pub error_name: String,
    pub description: String,
    pub passed: bool,
}

impl RuleResult {
    fn of(rule: &dyn Rule, passed: bool) -> Self {
        Self {
            id: rule.id().to_string(),
            error_name: rule.error_name().to_string(),
            description: rule.description().to_string(),
            passed,
        }
    }

    pub(crate) fn failed<I: Into<String>, E: Into<String>>(id: I, error_name: E) -> Self {
        Self {
            id: id.into(),
            error_name: error_name.into(),
            description: String::new(),
            passed: false,
        }
    }
}

/// Résultat complet pour un shift placé dans une case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub shift: ShiftId,
    pub staff: StaffId,
    pub date: NaiveDate,
    pub results: Vec<RuleResult>,
}

impl Evaluation {
    pub fn is_violation(&self) -> bool {
        self.results.iter().any(|r| !r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn first_failure(&self) -> Option<&RuleResult> {
        self.failures().next()
    }
}

/// Liste ordonnée de règles.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(RoleMatches),
                Box::new(NoOverlappingShift),
                Box::new(NoLeaveOverlap),
            ],
        }
    }
}

impl RuleSet {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn push<R: Rule + 'static>(&mut self, rule: R) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.id())
    }

    /// Évalue toutes les règles, dans l'ordre, même après un échec.
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Evaluation {
        let results: Vec<RuleResult> = self
            .rules
            .iter()
            .map(|rule| {
                let passed = rule.check(ctx);
                if !passed {
                    debug_event!(
                        rule = rule.id(),
                        shift = %ctx.shift.shift_id,
                        staff = %ctx.staff.staff_id,
                        date = %ctx.date,
                        "shift rule failed"
                    );
                }
                RuleResult::of(rule.as_ref(), passed)
            })
            .collect();
        Evaluation {
            shift: ctx.shift.shift_id,
            staff: ctx.staff.staff_id,
            date: ctx.date,
            results,
        }
    }

    /// Raccourci : évalue `shift` comme s'il était placé chez `staff` le `date`.
    pub fn evaluate_shift(
        &self,
        shift: &Shift,
        staff: &Staff,
        date: NaiveDate,
        table: &ScheduleTable,
    ) -> Evaluation {
        self.evaluate(&RuleContext {
            shift,
            staff,
            date,
            table,
        })
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

/// Évalue chaque shift affiché et met en cache les résultats dans le tableau.
/// Les évaluations sont renvoyées dans l'ordre des cases puis des shifts.
pub fn evaluate_table(table: &mut ScheduleTable, rules: &RuleSet) -> Vec<Evaluation> {
    let evaluations: Vec<Evaluation> = {
        let view: &ScheduleTable = table;
        view.cells()
            .into_iter()
            .filter_map(|(cell, _)| {
                let info = view.cell_info(cell)?;
                let staff = view.staff(info.staff_id)?;
                Some((cell, staff, info.date))
            })
            .flat_map(|(cell, staff, date)| {
                view.shifts_in_cell(cell)
                    .into_iter()
                    .map(move |shift| rules.evaluate_shift(shift, staff, date, view))
            })
            .collect()
    };
    for evaluation in &evaluations {
        table.set_rule_results(evaluation.shift, evaluation.results.clone());
    }
    evaluations
}

/// Évalue un shift (éventuellement brouillon) pour une case donnée du tableau.
pub fn evaluate_in_cell(
    table: &ScheduleTable,
    rules: &RuleSet,
    shift: &Shift,
    cell: &CellId,
) -> Option<Evaluation> {
    let info = table.cell_info(cell)?;
    let staff = table.staff(info.staff_id)?;
    Some(rules.evaluate_shift(shift, staff, info.date, table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApprovalStatus, LeaveRequest, LeaveRequestId, LeaveType, Role};
    use crate::table::Snapshot;
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }
    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn leave(staff: u64, start: NaiveDate, end: NaiveDate, status: ApprovalStatus) -> LeaveRequest {
        LeaveRequest {
            leave_request_id: LeaveRequestId(1),
            staff_id: StaffId(staff),
            leave_type: LeaveType::Vacation,
            start_date: start,
            end_date: end,
            reason: String::new(),
            status,
        }
    }

    fn table() -> ScheduleTable {
        let mut alice = Staff::new(1, "Alice", "alice", Role::Cashier);
        alice.shifts = vec![Shift::draft("morning", d(2024, 1, 10), t(8), t(12), Role::Cashier)
            .with_id(1)
            .assigned_to(StaffId(1))];
        alice.leave_requests = vec![
            leave(1, d(2024, 1, 10), d(2024, 1, 12), ApprovalStatus::Approved),
            leave(1, d(2024, 1, 15), d(2024, 1, 15), ApprovalStatus::Pending),
        ];
        let dates = (8..=16).map(|day| d(2024, 1, day)).collect();
        ScheduleTable::from_snapshot(Snapshot {
            dates,
            staffs: vec![alice, Staff::new(2, "Bob", "bob", Role::Guard)],
            holidays: Vec::new(),
        })
    }

    #[test]
    fn leave_overlap_is_inclusive_on_both_ends() {
        let table = table();
        for day in [10, 11, 12] {
            assert!(overlaps_leave_request(&table, StaffId(1), d(2024, 1, day)), "day {day}");
        }
        for day in [9, 13] {
            assert!(!overlaps_leave_request(&table, StaffId(1), d(2024, 1, day)), "day {day}");
        }
        assert!(!overlaps_leave_request(&table, StaffId(2), d(2024, 1, 11)));
    }

    #[test]
    fn pending_leave_does_not_block() {
        assert!(!overlaps_leave_request(&table(), StaffId(1), d(2024, 1, 15)));
    }

    #[test]
    fn every_rule_is_reported_even_after_a_failure() {
        let table = table();
        let alice = table.staff(StaffId(1)).unwrap();
        // mauvais rôle, chevauche "morning", pendant un congé
        let draft = Shift::draft("guard", d(2024, 1, 10), t(11), t(15), Role::Guard);
        let eval = RuleSet::default().evaluate_shift(&draft, alice, d(2024, 1, 10), &table);

        assert!(eval.is_violation());
        let ids: Vec<_> = eval.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![ROLE_MATCHES, NO_OVERLAPPING_SHIFT, NO_LEAVE_OVERLAP]);
        assert_eq!(eval.failures().count(), 3);
        assert_eq!(eval.first_failure().unwrap().error_name, "Staff's role does not match");
    }

    #[test]
    fn clean_placement_passes_all_rules() {
        let table = table();
        let bob = table.staff(StaffId(2)).unwrap();
        let draft = Shift::draft("gate", d(2024, 1, 10), t(11), t(15), Role::AllRoles);
        let eval = RuleSet::default().evaluate_shift(&draft, bob, d(2024, 1, 10), &table);
        assert!(!eval.is_violation());
        assert_eq!(eval.results.len(), 3);
    }

    #[test]
    fn custom_rules_run_after_builtins() {
        let table = table();
        let bob = table.staff(StaffId(2)).unwrap();
        let mut rules = RuleSet::default();
        rules.push(FnRule::new(
            "published-locked",
            "Published shift",
            "Is this shift still a draft?",
            |ctx: &RuleContext<'_>| !ctx.shift.published,
        ));
        let mut draft = Shift::draft("gate", d(2024, 1, 9), t(11), t(15), Role::Guard);
        draft.published = true;
        let eval = rules.evaluate_shift(&draft, bob, d(2024, 1, 9), &table);
        assert_eq!(rules.len(), 4);
        assert_eq!(eval.results.last().unwrap().id, "published-locked");
        assert_eq!(eval.failures().count(), 1);
    }

    #[test]
    fn evaluate_table_caches_results() {
        let mut table = table();
        let evaluations = evaluate_table(&mut table, &RuleSet::default());
        assert_eq!(evaluations.len(), 1);
        // "morning" tombe pendant le congé d'Alice
        assert!(evaluations[0].is_violation());
        let cached = table.rule_results(ShiftId(1)).unwrap();
        assert!(!cached[2].passed);
        assert!(cached[0].passed && cached[1].passed);
    }

    #[test]
    fn evaluate_in_unknown_cell_is_none() {
        let table = table();
        let stranger = Staff::new(9, "X", "x", Role::Admin);
        let draft = Shift::draft("x", d(2024, 1, 9), t(1), t(2), Role::Admin);
        let cell = CellId::new(&stranger, d(2024, 1, 9));
        assert!(evaluate_in_cell(&table, &RuleSet::default(), &draft, &cell).is_none());
    }

    #[test]
    fn evaluate_in_cell_uses_the_cell_staff_and_date() {
        let table = table();
        let draft = Shift::draft("late", d(2024, 1, 9), t(10), t(14), Role::AllRoles);

        let bob_cell = table.cell_for(StaffId(2), d(2024, 1, 9)).unwrap();
        let eval = evaluate_in_cell(&table, &RuleSet::default(), &draft, &bob_cell).unwrap();
        assert_eq!((eval.staff, eval.date), (StaffId(2), d(2024, 1, 9)));
        assert!(!eval.is_violation());

        // même brouillon chez Alice le 10 : chevauche "morning" et tombe pendant le congé
        let alice_cell = table.cell_for(StaffId(1), d(2024, 1, 10)).unwrap();
        let eval = evaluate_in_cell(&table, &RuleSet::default(), &draft, &alice_cell).unwrap();
        let failed: Vec<_> = eval.failures().map(|r| r.id.as_str()).collect();
        assert_eq!(failed, vec![NO_OVERLAPPING_SHIFT, NO_LEAVE_OVERLAP]);
    }
}
