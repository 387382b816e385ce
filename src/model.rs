use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifiant fort pour Staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(pub u64);

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifiant fort pour Shift. `ShiftId::DRAFT` désigne un shift pas encore enregistré.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShiftId(pub u64);

impl ShiftId {
    pub const DRAFT: ShiftId = ShiftId(0);
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaveRequestId(pub u64);

/// Rôle requis par un shift ou tenu par un membre du staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    AllRoles,
    Admin,
    Manager,
    Cashier,
    Guard,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::AllRoles => "All roles",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Cashier => "Cashier",
            Role::Guard => "Guard",
        }
    }

    /// Un shift ouvert à tous les rôles accepte n'importe qui.
    pub fn accepts(self, staff_role: Role) -> bool {
        self == Role::AllRoles || self == staff_role
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// `CASHIER`, `cashier` ou `all-roles` : même forme que sur le fil, casse libre.
impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ALL_ROLES" => Ok(Role::AllRoles),
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "CASHIER" => Ok(Role::Cashier),
            "GUARD" => Ok(Role::Guard),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffStatus {
    Active,
    Disabled,
}

/// Statut commun aux demandes (congés, remplacements, feuilles de temps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    Vacation,
    Sick,
    Other,
}

/// Membre du staff, tel que renvoyé par `/shift-planning` (shifts et congés imbriqués).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub staff_id: StaffId,
    pub staff_name: String,
    pub username: String,
    pub role: Role,
    pub status: StaffStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_days: Option<String>,
    #[serde(default)]
    pub leave_balance: u32,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub leave_requests: Vec<LeaveRequest>,
}

impl Staff {
    pub fn new<N: Into<String>, U: Into<String>>(id: u64, name: N, username: U, role: Role) -> Self {
        Self {
            staff_id: StaffId(id),
            staff_name: name.into(),
            username: username.into(),
            role,
            status: StaffStatus::Active,
            work_days: None,
            leave_balance: 0,
            shifts: Vec::new(),
            leave_requests: Vec::new(),
        }
    }
}

/// Période de congé ; les deux bornes sont incluses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub leave_request_id: LeaveRequestId,
    pub staff_id: StaffId,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
    pub status: ApprovalStatus,
}

impl LeaveRequest {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub timesheet_id: u64,
    pub shift_id: ShiftId,
    pub staff_id: StaffId,
    pub check_in_time: NaiveDateTime,
    #[serde(default)]
    pub check_out_time: Option<NaiveDateTime>,
    pub status: ApprovalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftCoverRequest {
    pub shift_cover_request_id: u64,
    pub shift_id: ShiftId,
    pub staff_id: StaffId,
    #[serde(default)]
    pub note: String,
    pub status: ApprovalStatus,
}

fn default_coefficient() -> f64 {
    1.0
}

/// Créneau de travail d'une journée. `end_time <= start_time` signifie un shift de nuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(default)]
    pub shift_id: ShiftId,
    #[serde(default)]
    pub staff_id: Option<StaffId>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub published: bool,
    #[serde(default = "default_coefficient")]
    pub salary_coefficient: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timesheet: Option<Timesheet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_cover_request: Option<ShiftCoverRequest>,
}

impl Shift {
    /// Shift brouillon (id `DRAFT`, non publié, non assigné).
    pub fn draft<N: Into<String>>(
        name: N,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        role: Role,
    ) -> Self {
        Self {
            shift_id: ShiftId::DRAFT,
            staff_id: None,
            date,
            start_time,
            end_time,
            name: name.into(),
            role,
            published: false,
            salary_coefficient: default_coefficient(),
            timesheet: None,
            shift_cover_request: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.shift_id = ShiftId(id);
        self
    }

    pub fn assigned_to(mut self, staff: StaffId) -> Self {
        self.staff_id = Some(staff);
        self
    }

    pub fn is_overnight(&self) -> bool {
        self.end_time <= self.start_time
    }

    /// Le pointage a déjà été fait sur ce shift.
    pub fn attendance_taken(&self) -> bool {
        self.timesheet.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub holiday_id: u64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub coefficient: f64,
}

impl Holiday {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Modèle de shift réutilisable (nom, horaires, rôle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTemplate {
    pub shift_template_id: u64,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "default_coefficient")]
    pub salary_coefficient: f64,
    pub role: Role,
}

impl ShiftTemplate {
    /// Brouillon pré-rempli pour `date`, comme le formulaire de création.
    pub fn draft(&self, date: NaiveDate) -> Shift {
        let mut shift = Shift::draft(
            self.name.clone(),
            date,
            self.start_time,
            self.end_time,
            self.role,
        );
        shift.salary_coefficient = self.salary_coefficient;
        shift
    }
}

/// Semaine type enregistrée, rejouable sur une autre semaine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTemplate {
    pub schedule_template_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule_shift_templates: Vec<ScheduleShiftTemplate>,
}

impl ScheduleTemplate {
    pub fn num_of_shifts(&self) -> usize {
        self.schedule_shift_templates.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleShiftTemplate {
    #[serde(default)]
    pub schedule_shift_template_id: u64,
    #[serde(default)]
    pub staff_id: Option<StaffId>,
    #[serde(default)]
    pub staff_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_coefficient")]
    pub salary_coefficient: f64,
    pub role: Role,
}

/// Corps d'un `POST /shifts/add/multiple` : un shift sans identifiant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShift {
    pub date: NaiveDate,
    pub staff_id: Option<StaffId>,
    pub published: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub name: String,
    pub salary_coefficient: f64,
    pub role: Role,
}

impl NewShift {
    /// Reprend les champs d'un shift existant pour une autre date.
    pub fn from_shift(shift: &Shift, date: NaiveDate, published: bool) -> Self {
        Self {
            date,
            staff_id: shift.staff_id,
            published,
            start_time: shift.start_time,
            end_time: shift.end_time,
            name: shift.name.clone(),
            salary_coefficient: shift.salary_coefficient,
            role: shift.role,
        }
    }

    pub fn from_template(tpl: &ScheduleShiftTemplate, date: NaiveDate) -> Self {
        Self {
            date,
            staff_id: tpl.staff_id,
            published: false,
            start_time: tpl.start_time,
            end_time: tpl.end_time,
            name: tpl.name.clone(),
            salary_coefficient: tpl.salary_coefficient,
            role: tpl.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_wire_format_is_camel_case() {
        let json = r#"{
            "shiftId": 7, "staffId": 3, "date": "2024-01-10",
            "startTime": "22:00:00", "endTime": "06:00:00",
            "name": "Night", "role": "GUARD", "published": true,
            "salaryCoefficient": 1.5
        }"#;
        let shift: Shift = serde_json::from_str(json).unwrap();
        assert_eq!(shift.shift_id, ShiftId(7));
        assert_eq!(shift.staff_id, Some(StaffId(3)));
        assert_eq!(shift.role, Role::Guard);
        assert!(shift.is_overnight());
        assert!(!shift.attendance_taken());
    }

    #[test]
    fn all_roles_accepts_everyone() {
        assert!(Role::AllRoles.accepts(Role::Cashier));
        assert!(Role::Guard.accepts(Role::Guard));
        assert!(!Role::Guard.accepts(Role::Manager));
    }

    #[test]
    fn roles_parse_from_cli_spelling() {
        assert_eq!("cashier".parse::<Role>(), Ok(Role::Cashier));
        assert_eq!("ALL_ROLES".parse::<Role>(), Ok(Role::AllRoles));
        assert_eq!("all-roles".parse::<Role>(), Ok(Role::AllRoles));
        assert!("boss".parse::<Role>().is_err());
    }

    #[test]
    fn shift_template_prefills_a_draft() {
        let tpl: ShiftTemplate = serde_json::from_str(
            r#"{"shiftTemplateId": 3, "name": "Evening", "startTime": "17:00:00",
                "endTime": "22:00:00", "salaryCoefficient": 1.2, "role": "GUARD"}"#,
        )
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let shift = tpl.draft(date);
        assert_eq!(shift.shift_id, ShiftId::DRAFT);
        assert_eq!((shift.date, shift.role), (date, Role::Guard));
        assert_eq!(shift.name, "Evening");
        assert_eq!(shift.salary_coefficient, 1.2);
        assert!(!shift.published);
    }
}
