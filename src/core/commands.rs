//! The in-memory scripting archive.

use super::Composite;
use crate::guid::ShortGuid;
use crate::util::{Error, Result};

/// Index of each reserved composite in [`Commands::entry_points`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryPoint {
    /// Level root.
    Root = 0,
    /// Globally instanced script.
    Global = 1,
    /// Pause menu script.
    PauseMenu = 2,
}

/// A loaded `commands.pak`: every composite plus the three entry points.
///
/// Encoding always serializes current state; there is no dirty tracking.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Commands {
    pub entry_points: [ShortGuid; 3],
    composites: Vec<Composite>,
}

impl Commands {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// All composites in archive order.
    pub fn composites(&self) -> &[Composite] {
        &self.composites
    }

    pub fn composites_mut(&mut self) -> impl Iterator<Item = &mut Composite> + '_ {
        self.composites.iter_mut()
    }

    pub fn num_composites(&self) -> usize {
        self.composites.len()
    }

    /// Find a composite by id.
    pub fn composite(&self, id: ShortGuid) -> Option<&Composite> {
        self.composites.iter().find(|c| c.id == id)
    }

    pub fn composite_mut(&mut self, id: ShortGuid) -> Option<&mut Composite> {
        self.composites.iter_mut().find(|c| c.id == id)
    }

    /// Find a composite by display name.
    pub fn composite_by_name(&self, name: &str) -> Option<&Composite> {
        self.composites.iter().find(|c| c.name == name)
    }

    /// Composite referenced by an entry point, if present.
    pub fn entry_composite(&self, entry: EntryPoint) -> Option<&Composite> {
        self.composite(self.entry_points[entry as usize])
    }

    pub fn set_entry_point(&mut self, entry: EntryPoint, id: ShortGuid) {
        self.entry_points[entry as usize] = id;
    }

    /// Append a composite; ids must be unique within the archive.
    pub fn add_composite(&mut self, composite: Composite) -> Result<&mut Composite> {
        if self.composite(composite.id).is_some() {
            return Err(Error::DuplicateComposite(composite.id));
        }
        self.composites.push(composite);
        let last = self.composites.len() - 1;
        Ok(&mut self.composites[last])
    }

    /// Remove a composite by id.
    pub fn remove_composite(&mut self, id: ShortGuid) -> Result<Composite> {
        let index = self
            .composites
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::CompositeNotFound(id.to_string()))?;
        Ok(self.composites.remove(index))
    }
}
