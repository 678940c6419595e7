//! Ordered selection of rig elements with an active element.

use igde_core::Handle;

use crate::elements::RigElement;
use crate::error::{Result, RigError};

/// Selected elements of one kind in selection order plus the active one.
///
/// The active element is always a member or `None`. Adding to an empty
/// selection activates the added element; removing the active element
/// activates the first remaining one.
pub struct ElementSelection<T> {
    selected: Vec<Handle<T>>,
    active: Option<Handle<T>>,
}

impl<T> Default for ElementSelection<T> {
    fn default() -> Self {
        Self {
            selected: Vec::new(),
            active: None,
        }
    }
}

impl<T: RigElement> ElementSelection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: Handle<T>) -> bool {
        self.selected.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = Handle<T>> + '_ {
        self.selected.iter().copied()
    }

    pub fn active(&self) -> Option<Handle<T>> {
        self.active
    }

    /// Add an element; adding a member again does nothing.
    pub fn add(&mut self, id: Handle<T>) -> Result<()> {
        if id.is_null() {
            return Err(RigError::Null(T::KIND));
        }
        if self.contains(id) {
            return Ok(());
        }
        self.selected.push(id);
        if self.active.is_none() {
            self.active = Some(id);
        }
        Ok(())
    }

    pub fn remove(&mut self, id: Handle<T>) -> Result<()> {
        let index = self
            .selected
            .iter()
            .position(|&s| s == id)
            .ok_or(RigError::NotSelected {
                kind: T::KIND,
                bits: id.to_bits(),
            })?;
        self.selected.remove(index);
        if self.active == Some(id) {
            self.active = self.selected.first().copied();
        }
        Ok(())
    }

    pub fn remove_all(&mut self) {
        self.selected.clear();
        self.active = None;
    }

    /// Make a member the active element, or clear the active element.
    pub fn set_active(&mut self, id: Option<Handle<T>>) -> Result<()> {
        if let Some(id) = id {
            if !self.contains(id) {
                return Err(RigError::NotSelected {
                    kind: T::KIND,
                    bits: id.to_bits(),
                });
            }
        }
        self.active = id;
        Ok(())
    }
}
