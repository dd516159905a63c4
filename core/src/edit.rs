//! The in-progress draft behind the "add" and "update" forms.
//!
//! # Design
//! At most one draft exists at a time. Staging a commit never mutates the
//! draft: the timestamped payload is a copy, so a failed commit leaves the
//! user's input exactly as it was. Every begin/cancel bumps an epoch, which
//! lets the sync controller tell whether the draft it submitted is still the
//! one on screen when the response comes back.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::SyncError;
use crate::types::{timestamp, CreateRecord, Record};

/// Draft for a record that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecord {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Creating(NewRecord),
    Editing { id: i64, draft: Record },
}

/// Editable form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
}

impl FromStr for Field {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "email" => Ok(Field::Email),
            other => Err(SyncError::UnknownField(other.to_string())),
        }
    }
}

/// A timestamped payload ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedCommit {
    Create(CreateRecord),
    Update { id: i64, record: Record },
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    state: EditState,
    epoch: u64,
}

impl EditSession {
    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, EditState::Idle)
    }

    pub fn begin_create(&mut self) {
        self.replace(EditState::Creating(NewRecord::default()));
    }

    /// Starts editing a copy of `record`. `None` means nothing is selected
    /// and leaves the session as it was.
    pub fn begin_edit(&mut self, record: Option<&Record>) {
        let Some(record) = record else {
            tracing::debug!("edit requested with no selection");
            return;
        };
        self.replace(EditState::Editing {
            id: record.id,
            draft: record.clone(),
        });
    }

    pub fn update_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        let (name, email) = match &mut self.state {
            EditState::Idle => return,
            EditState::Creating(draft) => (&mut draft.name, &mut draft.email),
            EditState::Editing { draft, .. } => (&mut draft.name, &mut draft.email),
        };
        match field {
            Field::Name => *name = value,
            Field::Email => *email = value,
        }
    }

    pub fn cancel(&mut self) {
        self.replace(EditState::Idle);
    }

    /// Builds the payload for the active draft, stamped with `now`. Returns
    /// `None` while idle.
    pub fn stage(&self, now: DateTime<Utc>) -> Option<StagedCommit> {
        let current_time = timestamp(now);
        match &self.state {
            EditState::Idle => None,
            EditState::Creating(draft) => Some(StagedCommit::Create(CreateRecord {
                name: draft.name.clone(),
                email: draft.email.clone(),
                current_time,
            })),
            EditState::Editing { id, draft } => Some(StagedCommit::Update {
                id: *id,
                record: Record {
                    current_time,
                    ..draft.clone()
                },
            }),
        }
    }

    /// Returns to idle after a successful commit, unless the draft was
    /// replaced or cancelled since `epoch` was read.
    pub fn finish(&mut self, epoch: u64) -> bool {
        if self.epoch != epoch {
            return false;
        }
        self.replace(EditState::Idle);
        true
    }

    fn replace(&mut self, state: EditState) {
        self.state = state;
        self.epoch += 1;
    }
}
