//! Window and modal stacks with contiguous z-index repair.

use surface_contract::SurfaceId;

use crate::error::StackError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One entry in a stack.
pub struct StackSlot {
    /// Stacked surface.
    pub id: SurfaceId,
    /// Assigned z-index.
    pub z_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Owns the window stack and the modal stack.
///
/// Window `i` always carries `z_index == window_base + i`. Modals sit at
/// `modal_base + position`, which keeps the whole modal stack above every window.
pub struct StackRegistry {
    window_base: u32,
    modal_base: u32,
    windows: Vec<StackSlot>,
    modals: Vec<StackSlot>,
}

impl StackRegistry {
    /// Creates empty stacks with the given z-index bases.
    pub fn new(window_base: u32, modal_base: u32) -> Self {
        Self {
            window_base,
            modal_base,
            windows: Vec::new(),
            modals: Vec::new(),
        }
    }

    /// Appends a surface to the top of its stack and returns the assigned z-index.
    pub fn add(&mut self, id: SurfaceId, modal: bool) -> u32 {
        if modal {
            let z_index = self.modal_base + self.modals.len() as u32;
            self.modals.push(StackSlot { id, z_index });
            z_index
        } else {
            let z_index = self.windows.len() as u32 + self.window_base;
            self.windows.push(StackSlot { id, z_index });
            z_index
        }
    }

    /// Removes a surface from whichever stack holds it.
    ///
    /// Window removal splices at the position implied by the surface's z-index and reassigns
    /// z-indexes from that position upward.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotInStack`] when the surface is in neither stack.
    pub fn remove(&mut self, id: SurfaceId) -> Result<(), StackError> {
        if let Some(index) = self.modals.iter().position(|slot| slot.id == id) {
            self.modals.remove(index);
            return Ok(());
        }

        let Some(actual) = self.windows.iter().position(|slot| slot.id == id) else {
            return Err(StackError::NotInStack(id));
        };
        let implied = self.windows[actual]
            .z_index
            .checked_sub(self.window_base)
            .map(|i| i as usize);
        let index = match implied {
            Some(index) if index == actual => index,
            _ => {
                tracing::warn!(
                    surface_id = %id,
                    z_index = self.windows[actual].z_index,
                    position = actual,
                    "window z-index out of sync with stack position"
                );
                actual
            }
        };
        self.windows.remove(index);
        for (i, slot) in self.windows.iter_mut().enumerate().skip(index) {
            slot.z_index = i as u32 + self.window_base;
        }
        Ok(())
    }

    /// Returns whether either stack holds the surface.
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: SurfaceId) -> Option<&StackSlot> {
        self.modals
            .iter()
            .chain(self.windows.iter())
            .find(|slot| slot.id == id)
    }

    /// z-index of a stacked surface.
    pub fn z_index(&self, id: SurfaceId) -> Option<u32> {
        self.position(id).map(|slot| slot.z_index)
    }

    /// Top modal if any modal is open, else top window.
    pub fn topmost(&self) -> Option<SurfaceId> {
        self.topmost_modal().or_else(|| self.topmost_window())
    }

    /// Top of the window stack.
    pub fn topmost_window(&self) -> Option<SurfaceId> {
        self.windows.last().map(|slot| slot.id)
    }

    /// Top of the modal stack.
    pub fn topmost_modal(&self) -> Option<SurfaceId> {
        self.modals.last().map(|slot| slot.id)
    }

    /// Returns whether `id` is the top window.
    pub fn is_topmost_window(&self, id: SurfaceId) -> bool {
        self.topmost_window() == Some(id)
    }

    /// Window stack, bottom to top.
    pub fn windows(&self) -> &[StackSlot] {
        &self.windows
    }

    /// Modal stack, bottom to top.
    pub fn modals(&self) -> &[StackSlot] {
        &self.modals
    }

    /// Window ids ordered top to bottom.
    pub fn windows_top_down(&self) -> Vec<SurfaceId> {
        self.windows.iter().rev().map(|slot| slot.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn z_indexes(stack: &StackRegistry) -> Vec<(u64, u32)> {
        stack.windows().iter().map(|s| (s.id.0, s.z_index)).collect()
    }

    #[test]
    fn removing_a_middle_window_repairs_indexes_above_it() {
        let mut stack = StackRegistry::new(10, 1999);
        for id in 1..=4 {
            stack.add(SurfaceId(id), false);
        }
        stack.remove(SurfaceId(2)).expect("present");
        assert_eq!(z_indexes(&stack), vec![(1, 10), (3, 11), (4, 12)]);
        assert_eq!(stack.topmost(), Some(SurfaceId(4)));
    }

    #[test]
    fn modals_sit_above_windows_and_win_topmost() {
        let mut stack = StackRegistry::new(10, 1999);
        stack.add(SurfaceId(1), false);
        assert_eq!(stack.add(SurfaceId(2), true), 1999);
        assert_eq!(stack.add(SurfaceId(3), true), 2000);
        stack.add(SurfaceId(4), false);
        assert_eq!(stack.topmost(), Some(SurfaceId(3)));
        assert_eq!(stack.topmost_window(), Some(SurfaceId(4)));

        stack.remove(SurfaceId(3)).expect("present");
        stack.remove(SurfaceId(2)).expect("present");
        assert_eq!(stack.topmost(), Some(SurfaceId(4)));
    }

    #[test]
    fn removing_an_absent_surface_is_reported() {
        let mut stack = StackRegistry::new(10, 1999);
        stack.add(SurfaceId(1), false);
        assert_eq!(
            stack.remove(SurfaceId(9)),
            Err(StackError::NotInStack(SurfaceId(9)))
        );
        assert_eq!(z_indexes(&stack), vec![(1, 10)]);
    }

    proptest! {
        #[test]
        fn window_z_indexes_stay_contiguous(ops in prop::collection::vec((any::<bool>(), 0u64..12), 0..64)) {
            let mut stack = StackRegistry::new(10, 1999);
            for (is_add, id) in ops {
                let id = SurfaceId(id);
                if is_add {
                    if !stack.contains(id) {
                        stack.add(id, false);
                    }
                } else {
                    let _ = stack.remove(id);
                }
                for (i, slot) in stack.windows().iter().enumerate() {
                    prop_assert_eq!(slot.z_index, i as u32 + 10);
                }
            }
        }
    }
}
