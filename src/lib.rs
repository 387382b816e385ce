#![forbid(unsafe_code)]
//! MiniStore schedule : outils de planning hebdomadaire des shifts.
//!
//! - Fenêtre de semaine ISO, projection hebdomadaire, même jour de semaine.
//! - Tableau de planning en mémoire (personne × jour).
//! - Règles de validité d'un shift, évaluées toutes, sans court-circuit.
//! - Copie de shifts, semaines types, copie de semaine.
//! - Fonctions pures : la date du jour est toujours un paramètre.

#[cfg(feature = "logging")]
macro_rules! debug_event {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! debug_event {
    ($($arg:tt)*) => {};
}

pub mod api;
pub mod calendar;
pub mod io;
pub mod model;
pub mod planning;
pub mod rules;
pub mod storage;
pub mod table;
pub mod timefmt;

pub use calendar::{
    dates_until, parse_date, resolve_date, same_weekday, week_bounds, week_dates, DateFallback,
    InvalidDate,
};
pub use model::{
    LeaveRequest, NewShift, Role, ScheduleShiftTemplate, ScheduleTemplate, Shift, ShiftId, Staff,
    StaffId,
};
pub use planning::{
    apply_schedule_template, copy_shift, copy_week, validate_shift, CopyRequest, PlanError,
    ShiftAction,
};
pub use rules::{evaluate_table, move_errors, Evaluation, Rule, RuleContext, RuleResult, RuleSet};
pub use storage::{JsonStorage, Storage, TemplateStore};
pub use table::{CellId, ScheduleTable, Snapshot, TableError};
