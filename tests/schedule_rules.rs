#![forbid(unsafe_code)]
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use ministore_schedule::{
    calendar::{dates_until_strings, week_date_strings},
    evaluate_table,
    model::{ApprovalStatus, LeaveRequestId, LeaveType},
    rules::{NO_LEAVE_OVERLAP, NO_OVERLAPPING_SHIFT, ROLE_MATCHES},
    same_weekday, week_dates, LeaveRequest, Role, RuleSet, ScheduleTable, Shift, ShiftId, Snapshot,
    Staff, StaffId,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

#[test]
fn week_window_holds_for_a_whole_year() {
    let mut date = d(2024, 1, 1);
    while date.year() == 2024 {
        let days = week_dates(date);
        assert_eq!(days[0].weekday(), Weekday::Mon);
        assert_eq!(days[6].weekday(), Weekday::Sun);
        assert_eq!(days[6] - days[0], Duration::days(6));
        assert!(days[0] <= date && date <= days[6]);
        date += Duration::days(1);
    }
}

#[test]
fn unreadable_week_input_is_today() {
    let today = d(2024, 2, 29);
    assert_eq!(week_date_strings(Some("31/02/2024"), today), week_date_strings(None, today));
    assert_eq!(week_date_strings(None, today)[0], "2024-02-26");
}

#[test]
fn projection_never_repeats_today_nor_passes_until() {
    let today = d(2024, 1, 10);
    let got = dates_until_strings(&[today, d(2024, 1, 11)], d(2024, 1, 24), today);
    assert_eq!(got, vec!["2024-01-17", "2024-01-24", "2024-01-11", "2024-01-18"]);
}

#[test]
fn same_weekday_boundary() {
    // lundi contre lundi : même date
    assert_eq!(same_weekday(d(2024, 1, 1), d(2024, 1, 8)), d(2024, 1, 8));
    // lundi contre jeudi : lundi suivant
    assert_eq!(same_weekday(d(2024, 1, 1), d(2024, 1, 11)), d(2024, 1, 15));
}

fn week_table() -> ScheduleTable {
    let mut alice = Staff::new(1, "Alice", "alice", Role::Cashier);
    alice.shifts = vec![
        Shift::draft("open", d(2024, 1, 9), t(8), t(14), Role::Cashier)
            .with_id(1)
            .assigned_to(StaffId(1)),
        Shift::draft("double", d(2024, 1, 9), t(12), t(18), Role::Cashier)
            .with_id(2)
            .assigned_to(StaffId(1)),
        Shift::draft("on-leave", d(2024, 1, 12), t(8), t(14), Role::Cashier)
            .with_id(3)
            .assigned_to(StaffId(1)),
    ];
    alice.leave_requests = vec![LeaveRequest {
        leave_request_id: LeaveRequestId(1),
        staff_id: StaffId(1),
        leave_type: LeaveType::Vacation,
        start_date: d(2024, 1, 10),
        end_date: d(2024, 1, 12),
        reason: String::new(),
        status: ApprovalStatus::Approved,
    }];
    let mut gus = Staff::new(2, "Gus", "gus", Role::Guard);
    gus.shifts = vec![Shift::draft("till", d(2024, 1, 9), t(8), t(14), Role::Cashier)
        .with_id(4)
        .assigned_to(StaffId(2))];
    ScheduleTable::from_snapshot(Snapshot {
        dates: week_dates(d(2024, 1, 10)).to_vec(),
        staffs: vec![alice, gus],
        holidays: Vec::new(),
    })
}

fn failed_ids(table: &ScheduleTable, id: u64) -> Vec<String> {
    table
        .rule_results(ShiftId(id))
        .unwrap()
        .iter()
        .filter(|r| !r.passed)
        .map(|r| r.id.clone())
        .collect()
}

#[test]
fn whole_table_evaluation_flags_each_violation() {
    let mut table = week_table();
    let evaluations = evaluate_table(&mut table, &RuleSet::default());
    assert_eq!(evaluations.len(), 4);
    assert!(evaluations.iter().all(|e| e.results.len() == 3));

    assert_eq!(failed_ids(&table, 1), vec![NO_OVERLAPPING_SHIFT]);
    assert_eq!(failed_ids(&table, 2), vec![NO_OVERLAPPING_SHIFT]);
    assert_eq!(failed_ids(&table, 3), vec![NO_LEAVE_OVERLAP]);
    assert_eq!(failed_ids(&table, 4), vec![ROLE_MATCHES]);
}

#[test]
fn leave_bounds_are_inclusive_for_drafts() {
    let table = week_table();
    let alice = table.staff(StaffId(1)).unwrap();
    let rules = RuleSet::default();
    for (day, blocked) in [(9, false), (10, true), (11, true), (12, true), (13, false)] {
        let date = d(2024, 1, day);
        let draft = Shift::draft("late", date, t(19), t(23), Role::AllRoles);
        let eval = rules.evaluate_shift(&draft, alice, date, &table);
        assert_eq!(eval.is_violation(), blocked, "2024-01-{day}");
    }
}
