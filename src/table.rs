use crate::model::{Holiday, LeaveRequest, Shift, ShiftId, Staff, StaffId};
use crate::rules::RuleResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Données brutes d'une page de planning (réponse de `/shift-planning` + dates affichées).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub dates: Vec<NaiveDate>,
    pub staffs: Vec<Staff>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

/// Case du tableau : une personne, un jour. Forme texte `{staffId}-{username}-{date}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(String);

impl CellId {
    pub fn new(staff: &Staff, date: NaiveDate) -> Self {
        let mut id = itoa::Buffer::new();
        Self(format!(
            "{}-{}-{}",
            id.format(staff.staff_id.0),
            staff.username,
            date.format("%Y-%m-%d")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellInfo {
    pub staff_id: StaffId,
    pub date: NaiveDate,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown shift: {0}")]
    UnknownShift(ShiftId),
    #[error("unknown cell: {0}")]
    UnknownCell(String),
    #[error("shift {0} already exists")]
    DuplicateShift(ShiftId),
}

/// Tableau de planning en mémoire : shifts indexés, cases (personne × jour),
/// congés de la période et résultats de règles par shift.
///
/// Reconstruit à chaque chargement de page ; un seul écrivain.
#[derive(Debug, Clone, Default)]
pub struct ScheduleTable {
    shifts: HashMap<ShiftId, Shift>,
    cells: HashMap<CellId, Vec<ShiftId>>,
    cell_infos: HashMap<CellId, CellInfo>,
    dates: Vec<NaiveDate>,
    staffs: Vec<Staff>,
    holidays: Vec<Holiday>,
    leave_requests: Vec<LeaveRequest>,
    shift_rules: HashMap<ShiftId, Vec<RuleResult>>,
}

impl ScheduleTable {
    /// Indexe un snapshot. Les shifts et congés imbriqués dans chaque `Staff`
    /// sont déplacés dans le tableau ; un shift hors des dates affichées reste
    /// accessible par id mais n'occupe aucune case.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let Snapshot {
            dates,
            mut staffs,
            holidays,
        } = snapshot;
        let mut table = Self {
            dates,
            holidays,
            ..Self::default()
        };

        for staff in staffs.iter_mut() {
            let shifts = std::mem::take(&mut staff.shifts);
            for date in &table.dates {
                let cell = CellId::new(staff, *date);
                table.cell_infos.insert(
                    cell.clone(),
                    CellInfo {
                        staff_id: staff.staff_id,
                        date: *date,
                    },
                );
                let ids = shifts
                    .iter()
                    .filter(|s| s.date == *date)
                    .map(|s| s.shift_id)
                    .collect();
                table.cells.insert(cell, ids);
            }
            for shift in shifts {
                table.shifts.insert(shift.shift_id, shift);
            }
            table
                .leave_requests
                .append(&mut std::mem::take(&mut staff.leave_requests));
        }
        table.staffs = staffs;

        debug_event!(
            shifts = table.shifts.len(),
            cells = table.cells.len(),
            leave_requests = table.leave_requests.len(),
            "schedule table built"
        );
        table
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }
    pub fn staffs(&self) -> &[Staff] {
        &self.staffs
    }
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }
    pub fn leave_requests(&self) -> &[LeaveRequest] {
        &self.leave_requests
    }

    pub fn shift(&self, id: ShiftId) -> Option<&Shift> {
        self.shifts.get(&id)
    }
    pub fn shifts(&self) -> impl Iterator<Item = &Shift> {
        self.shifts.values()
    }
    pub fn staff(&self, id: StaffId) -> Option<&Staff> {
        self.staffs.iter().find(|s| s.staff_id == id)
    }
    pub fn find_staff_by_username(&self, username: &str) -> Option<&Staff> {
        self.staffs.iter().find(|s| s.username == username)
    }

    pub fn holiday_on(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.iter().find(|h| h.covers(date))
    }

    pub fn cell_info(&self, cell: &CellId) -> Option<&CellInfo> {
        self.cell_infos.get(cell)
    }

    /// Case d'une personne pour un jour affiché.
    pub fn cell_for(&self, staff: StaffId, date: NaiveDate) -> Option<CellId> {
        let staff = self.staff(staff)?;
        let cell = CellId::new(staff, date);
        self.cell_infos.contains_key(&cell).then_some(cell)
    }

    /// Case contenant le shift, s'il est affiché.
    pub fn cell_of(&self, shift: ShiftId) -> Option<&CellId> {
        self.cells
            .iter()
            .find(|(_, ids)| ids.contains(&shift))
            .map(|(cell, _)| cell)
    }

    /// Shifts d'une case, dans l'ordre de la case. Case inconnue : liste vide.
    pub fn shifts_in_cell(&self, cell: &CellId) -> Vec<&Shift> {
        self.cells
            .get(cell)
            .map(|ids| ids.iter().filter_map(|id| self.shifts.get(id)).collect())
            .unwrap_or_default()
    }

    /// Toutes les cases, triées par identifiant pour un rendu stable.
    pub fn cells(&self) -> Vec<(&CellId, &[ShiftId])> {
        let mut out: Vec<_> = self
            .cells
            .iter()
            .map(|(cell, ids)| (cell, ids.as_slice()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// Ajoute un shift enregistré dans la case (staff, date) correspondante.
    pub fn insert_shift(&mut self, shift: Shift) -> Result<CellId, TableError> {
        if self.shifts.contains_key(&shift.shift_id) {
            return Err(TableError::DuplicateShift(shift.shift_id));
        }
        let cell = shift
            .staff_id
            .and_then(|staff| self.cell_for(staff, shift.date))
            .ok_or_else(|| TableError::UnknownCell(format!("{:?}@{}", shift.staff_id, shift.date)))?;
        let id = shift.shift_id;
        self.shifts.insert(id, shift);
        self.cells.entry(cell.clone()).or_default().push(id);
        self.sort_cell(&cell);
        Ok(cell)
    }

    /// Déplace un shift vers une autre case ; staff et date suivent la case.
    pub fn move_shift(&mut self, id: ShiftId, target: &CellId) -> Result<(), TableError> {
        let info = *self
            .cell_infos
            .get(target)
            .ok_or_else(|| TableError::UnknownCell(target.to_string()))?;
        let shift = self.shifts.get_mut(&id).ok_or(TableError::UnknownShift(id))?;
        shift.staff_id = Some(info.staff_id);
        shift.date = info.date;

        for ids in self.cells.values_mut() {
            ids.retain(|s| *s != id);
        }
        self.cells.entry(target.clone()).or_default().push(id);
        self.sort_cell(target);
        self.shift_rules.remove(&id);
        Ok(())
    }

    pub fn remove_shift(&mut self, id: ShiftId) -> Result<Shift, TableError> {
        let shift = self.shifts.remove(&id).ok_or(TableError::UnknownShift(id))?;
        for ids in self.cells.values_mut() {
            ids.retain(|s| *s != id);
        }
        self.shift_rules.remove(&id);
        Ok(shift)
    }

    pub fn rule_results(&self, id: ShiftId) -> Option<&[RuleResult]> {
        self.shift_rules.get(&id).map(Vec::as_slice)
    }

    pub fn set_rule_results(&mut self, id: ShiftId, results: Vec<RuleResult>) {
        self.shift_rules.insert(id, results);
    }

    fn sort_cell(&mut self, cell: &CellId) {
        let shifts = &self.shifts;
        if let Some(ids) = self.cells.get_mut(cell) {
            ids.sort_by_key(|id| shifts.get(id).map(|s| s.start_time));
        }
    }
}
