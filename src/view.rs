//! The cycle assignment view.
//!
//! One [`CycleView`] exists per browser session. It owns the full record set
//! fetched at session start and all transient UI state: the selected hatim,
//! per-cüz input buffers, the "recently updated" and "editing" flags, the
//! admin flag and the admin password field.
//!
//! The records of the selected hatim are never stored separately; they are
//! derived with [`filter_by_cycle`] whenever they are needed.
//!
//! Remote effects are not performed here. A name submission is split into
//! [`CycleView::prepare_submit`], which reads the input buffer, and
//! [`CycleView::apply_update`], which is called by the web layer only once the
//! remote resource has confirmed the update.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::cuz::{Cuz, HATIM_COUNT, PartKey};
use crate::error::ViewError;

/// A blocking message shown to the user on the next render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    FinishPreviousHatim,
    WrongPassword,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::FinishPreviousHatim => {
                "Lütfen önceki cüzü tamamlayın, ardından bir sonraki cüze geçebilirsiniz."
            }
            Notice::WrongPassword => "Yanlis sifre",
        }
    }
}

/// A name update read from the input buffer, waiting for remote confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub id: String,
    pub key: PartKey,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct CycleView {
    records: Vec<Cuz>,
    selected_hatim: u8,
    name_inputs: HashMap<PartKey, String>,
    updated: HashSet<PartKey>,
    editing: HashSet<PartKey>,
    is_admin: bool,
    admin_password: String,
    show_password: bool,
    notice: Option<Notice>,
}

/// Records of one hatim, sorted by cüz number.
pub fn filter_by_cycle(records: &[Cuz], hatim: u8) -> Vec<&Cuz> {
    let mut filtered: Vec<&Cuz> = records
        .iter()
        .filter(|cuz| cuz.hatim_number == hatim)
        .collect();
    filtered.sort_by_key(|cuz| cuz.cuz_number);
    filtered
}

/// A hatim is complete when every one of its cüz has a name.
pub fn is_hatim_complete(records: &[Cuz], hatim: u8) -> bool {
    records
        .iter()
        .filter(|cuz| cuz.hatim_number == hatim)
        .all(Cuz::is_taken)
}

pub fn are_previous_hatims_complete(records: &[Cuz], hatim: u8) -> bool {
    (1..hatim).all(|previous| is_hatim_complete(records, previous))
}

impl CycleView {
    pub fn new() -> Self {
        CycleView {
            selected_hatim: 1,
            ..Default::default()
        }
    }

    /// Replaces the record set with a freshly fetched one and shows hatim 1.
    pub fn load(&mut self, mut records: Vec<Cuz>) {
        records.sort_by_key(|cuz| cuz.cuz_number);
        self.records = records;
        self.selected_hatim = 1;
    }

    pub fn records(&self) -> &[Cuz] {
        &self.records
    }

    pub fn selected_hatim(&self) -> u8 {
        self.selected_hatim
    }

    pub fn visible(&self) -> Vec<&Cuz> {
        filter_by_cycle(&self.records, self.selected_hatim)
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn select_hatim(&mut self, hatim: u8) -> Result<(), ViewError> {
        if hatim == 0 || hatim > HATIM_COUNT {
            return Err(ViewError::InvalidHatim(hatim));
        }
        if !are_previous_hatims_complete(&self.records, hatim) {
            self.notice = Some(Notice::FinishPreviousHatim);
            return Err(ViewError::PreviousHatimIncomplete { requested: hatim });
        }
        self.selected_hatim = hatim;
        Ok(())
    }

    pub fn edit_name(&mut self, key: PartKey, text: &str) {
        self.name_inputs.insert(key, text.to_string());
    }

    pub fn name_input(&self, key: PartKey) -> Option<&str> {
        self.name_inputs.get(&key).map(String::as_str)
    }

    pub fn find(&self, id: &str) -> Result<&Cuz, ViewError> {
        self.records
            .iter()
            .find(|cuz| cuz.id == id)
            .ok_or_else(|| ViewError::UnknownRecord(id.to_string()))
    }

    /// Reads the trimmed input buffer of a cüz. An empty name is allowed and
    /// clears the assignment.
    pub fn prepare_submit(&self, id: &str) -> Result<PendingUpdate, ViewError> {
        let cuz = self.find(id)?;
        let key = cuz.key();
        if cuz.is_taken() && !self.editing.contains(&key) {
            return Err(ViewError::NotEditable(id.to_string()));
        }
        let name = self
            .name_inputs
            .get(&key)
            .map(|input| input.trim().to_string())
            .unwrap_or_default();
        Ok(PendingUpdate {
            id: id.to_string(),
            key,
            name,
        })
    }

    /// Applies a confirmed update and raises the "recently updated" flag.
    pub fn apply_update(&mut self, update: &PendingUpdate) {
        for cuz in self.records.iter_mut().filter(|cuz| cuz.id == update.id) {
            cuz.person_name = Some(update.name.clone());
        }
        self.updated.insert(update.key);
    }

    /// Ends the "recently updated" window of a cüz.
    pub fn finish_update(&mut self, key: PartKey) {
        self.updated.remove(&key);
        self.editing.remove(&key);
        self.name_inputs.remove(&key);
    }

    pub fn is_recently_updated(&self, key: PartKey) -> bool {
        self.updated.contains(&key)
    }

    pub fn is_editing(&self, key: PartKey) -> bool {
        self.editing.contains(&key)
    }

    pub fn set_admin_password(&mut self, password: &str) {
        self.admin_password = password.to_string();
    }

    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    /// Checks the password buffer with `verify`. The check is a convenience
    /// gate for this page only; the records backend grants nothing based on it.
    pub fn admin_login(&mut self, verify: impl FnOnce(&str) -> bool) -> Result<(), ViewError> {
        if verify(&self.admin_password) {
            self.is_admin = true;
            Ok(())
        } else {
            self.notice = Some(Notice::WrongPassword);
            Err(ViewError::WrongPassword)
        }
    }

    pub fn enter_edit_mode(&mut self, id: &str) -> Result<(), ViewError> {
        if !self.is_admin {
            return Err(ViewError::NotAdmin);
        }
        let cuz = self.find(id)?;
        let key = cuz.key();
        let current = cuz.name().to_string();
        self.editing.insert(key);
        self.name_inputs.insert(key, current);
        Ok(())
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let hatims = (1..=HATIM_COUNT)
            .map(|number| HatimTab {
                number,
                selected: number == self.selected_hatim,
                locked: !are_previous_hatims_complete(&self.records, number),
            })
            .collect();

        let rows = self
            .visible()
            .into_iter()
            .map(|cuz| {
                let key = cuz.key();
                let updated = self.updated.contains(&key);
                let button_label = if updated {
                    "Güncellendi"
                } else if cuz.is_taken() {
                    "Güncelle"
                } else {
                    "Ekle"
                };
                CuzRow {
                    id: cuz.id.clone(),
                    cuz_number: cuz.cuz_number,
                    person_name: cuz.name().to_string(),
                    show_input: self.editing.contains(&key) || !cuz.is_taken(),
                    input_value: self
                        .name_input(key)
                        .unwrap_or_else(|| cuz.name())
                        .to_string(),
                    updated,
                    button_label,
                    clickable: self.is_admin,
                }
            })
            .collect();

        ViewSnapshot {
            selected_hatim: self.selected_hatim,
            hatims,
            rows,
            is_admin: self.is_admin,
            show_password: self.show_password,
            admin_password: self.admin_password.clone(),
            notice: self.notice.map(Notice::message),
        }
    }
}

/// Everything needed to render the page, as plain data.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub selected_hatim: u8,
    pub hatims: Vec<HatimTab>,
    pub rows: Vec<CuzRow>,
    pub is_admin: bool,
    pub show_password: bool,
    pub admin_password: String,
    pub notice: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HatimTab {
    pub number: u8,
    pub selected: bool,
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CuzRow {
    pub id: String,
    pub cuz_number: u32,
    pub person_name: String,
    pub show_input: bool,
    pub input_value: String,
    pub updated: bool,
    pub button_label: &'static str,
    pub clickable: bool,
}
