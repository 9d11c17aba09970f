//! Labelled registry of live engine sessions.
//!
//! Labels are matched case-insensitively with whitespace ignored, so
//! `"Oregon"`, `"oregon "` and `"ore gon"` all name the same session. Each
//! registration takes a new slot; deleting a session tombstones its slot
//! instead of removing it, so slot indices are never reused.

use crate::engine::QueryHandle;
use crate::error::RegistryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do when a new session's label is already active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with [`RegistryError::DuplicateLabel`].
    #[default]
    Reject,
    /// Tombstone the existing session and register the new one.
    Replace,
}

/// Lookup key for a label: lowercase, all whitespace removed.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

enum SlotState<H> {
    Active(H),
    Tombstoned,
}

struct Slot<H> {
    label: String,
    state: SlotState<H>,
    created_at: DateTime<Utc>,
}

impl<H> Slot<H> {
    fn is_active(&self) -> bool {
        matches!(self.state, SlotState::Active(_))
    }

    /// Display form of a deleted label, as it appears in logs.
    fn dead_marker(&self) -> String {
        format!("x-{}-x", self.label)
    }
}

/// One registry slot, for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSummary {
    /// 1-based slot index.
    pub index: usize,
    pub label: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Ordered session slots, a label index over the active ones, and a
/// "current" pointer to the last session created or switched to.
pub struct SessionRegistry<H> {
    slots: Vec<Slot<H>>,
    aliases: HashMap<String, usize>,
    current: Option<usize>,
    policy: DuplicatePolicy,
}

impl<H> SessionRegistry<H> {
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            slots: Vec::new(),
            aliases: HashMap::new(),
            current: None,
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Register `handle` under `label` and make it current.
    ///
    /// Returns the new 1-based slot index.
    pub fn register(&mut self, label: &str, handle: H) -> Result<usize, RegistryError> {
        let key = normalize_label(label);
        if key.is_empty() {
            return Err(RegistryError::EmptyLabel);
        }

        if let Some(&existing) = self.aliases.get(&key) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(RegistryError::DuplicateLabel {
                        label: label.to_string(),
                    });
                }
                DuplicatePolicy::Replace => {
                    tracing::debug!("Replacing session '{}' in slot {}", label, existing + 1);
                    self.tombstone(existing);
                }
            }
        }

        let pos = self.slots.len();
        self.slots.push(Slot {
            label: label.to_string(),
            state: SlotState::Active(handle),
            created_at: Utc::now(),
        });
        self.aliases.insert(key, pos);
        self.current = Some(pos);
        Ok(pos + 1)
    }

    /// Look up a session by label (or 1-based index) and make it current.
    pub fn switch(&mut self, label: &str) -> Result<&mut H, RegistryError> {
        let pos = self.resolve(label)?;
        self.current = Some(pos);
        self.active_mut(pos)
            .ok_or_else(|| RegistryError::NotFound {
                label: label.to_string(),
            })
    }

    /// Look up a session without changing the current pointer.
    pub fn get(&self, label: &str) -> Result<&H, RegistryError> {
        let pos = self.resolve(label)?;
        match self.slots.get(pos).map(|slot| &slot.state) {
            Some(SlotState::Active(handle)) => Ok(handle),
            _ => Err(RegistryError::NotFound {
                label: label.to_string(),
            }),
        }
    }

    /// The session last created or switched to.
    pub fn current(&mut self) -> Result<&mut H, RegistryError> {
        let pos = self.current.ok_or(RegistryError::NoCurrent)?;
        self.active_mut(pos).ok_or(RegistryError::NoCurrent)
    }

    /// 1-based index of the current session.
    pub fn current_index(&self) -> Option<usize> {
        self.current.map(|pos| pos + 1)
    }

    /// Tombstone the session under `label`.
    ///
    /// Returns `Ok(false)` when the label is missing and `ignore_missing` is
    /// set; the condition is logged instead of raised.
    pub fn delete(&mut self, label: &str, ignore_missing: bool) -> Result<bool, RegistryError> {
        match self.resolve(label) {
            Ok(pos) => {
                self.tombstone(pos);
                Ok(true)
            }
            Err(err) if ignore_missing => {
                tracing::info!("{}", err);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Drop every slot, including tombstones, and reset the current pointer.
    pub fn delete_all(&mut self) {
        tracing::debug!("Removing all {} session slots", self.slots.len());
        self.slots.clear();
        self.aliases.clear();
        self.current = None;
    }

    /// Every slot in index order, tombstones included.
    pub fn list(&self) -> Vec<SlotSummary> {
        self.slots
            .iter()
            .enumerate()
            .map(|(pos, slot)| SlotSummary {
                index: pos + 1,
                label: slot.label.clone(),
                active: slot.is_active(),
                created_at: slot.created_at,
            })
            .collect()
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a label, falling back to a 1-based slot index.
    fn resolve(&self, label: &str) -> Result<usize, RegistryError> {
        if let Some(&pos) = self.aliases.get(&normalize_label(label)) {
            return Ok(pos);
        }
        label
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| index.checked_sub(1))
            .filter(|&pos| self.slots.get(pos).is_some_and(Slot::is_active))
            .ok_or_else(|| RegistryError::NotFound {
                label: label.to_string(),
            })
    }

    fn active_mut(&mut self, pos: usize) -> Option<&mut H> {
        match self.slots.get_mut(pos).map(|slot| &mut slot.state) {
            Some(SlotState::Active(handle)) => Some(handle),
            _ => None,
        }
    }

    /// Drop the handle, release the alias and keep the slot.
    fn tombstone(&mut self, pos: usize) {
        if let Some(slot) = self.slots.get_mut(pos) {
            slot.state = SlotState::Tombstoned;
            tracing::debug!("Deleted session {} (slot {})", slot.dead_marker(), pos + 1);
        }
        self.aliases.retain(|_, p| *p != pos);
        if self.current == Some(pos) {
            self.current = None;
        }
    }
}

impl<H: QueryHandle> SessionRegistry<H> {
    /// Register `handle` under `label`, or under the handle's region when no
    /// label is given. Returns the label used.
    pub fn create(&mut self, label: Option<&str>, handle: H) -> Result<String, RegistryError> {
        let label = match label {
            Some(label) => label.to_string(),
            None => handle.region().to_string(),
        };
        self.register(&label, handle)?;
        Ok(label)
    }
}

impl<H> Default for SessionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
