//! Entity paths and the hash chains derived from them.
//!
//! A path walks from an entity in the current composite down through nested
//! composite instances to a target entity. On disk it is terminated by
//! [`ShortGuid::INVALID`]; in memory the terminator is implicit.
//!
//! The checksum and instance id functions reproduce the engine's own
//! derivation bit for bit. Overrides and proxies only resolve at runtime if
//! these match.

use std::fmt;

use smallvec::SmallVec;

use crate::guid::{GuidCache, ShortGuid};

/// Ordered walk of entity ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EntityPath {
    ids: SmallVec<[ShortGuid; 8]>,
}

impl EntityPath {
    /// Empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ids, dropping a trailing terminator if present.
    pub fn from_ids(ids: impl IntoIterator<Item = ShortGuid>) -> Self {
        let mut ids: SmallVec<[ShortGuid; 8]> = ids.into_iter().collect();
        if ids.last() == Some(&ShortGuid::INVALID) {
            ids.pop();
        }
        Self { ids }
    }

    /// Build from ids exactly as given.
    pub fn from_slice(ids: &[ShortGuid]) -> Self {
        Self { ids: SmallVec::from_slice(ids) }
    }

    /// Ids without the terminator.
    #[inline]
    pub fn ids(&self) -> &[ShortGuid] {
        &self.ids
    }

    /// Append an id.
    pub fn push(&mut self, id: ShortGuid) {
        self.ids.push(id);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of stored words, terminator included.
    #[inline]
    pub fn stored_len(&self) -> usize {
        self.ids.len() + 1
    }

    /// Ids as stored, terminator included.
    pub fn stored_ids(&self) -> impl Iterator<Item = ShortGuid> + '_ {
        self.ids.iter().copied().chain(std::iter::once(ShortGuid::INVALID))
    }

    /// Entity the path points at.
    pub fn target(&self) -> Option<ShortGuid> {
        self.ids.last().copied()
    }

    /// Render with names from the cache, e.g. `Door_01/LogicGate`.
    pub fn render(&self, cache: &GuidCache) -> String {
        self.ids
            .iter()
            .map(|id| cache.find_string(*id))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Checksum stored beside overrides: the ids folded back to front with
    /// [`ShortGuid::combine`].
    pub fn generate_path_hash(&self) -> ShortGuid {
        self.ids
            .iter()
            .rev()
            .fold(ShortGuid::INVALID, |acc, id| id.combine(acc))
    }

    /// Runtime id of the composite instance the path walks into.
    ///
    /// With `has_internal_entity_id` the last id is an entity inside that
    /// instance and is excluded from the chain; otherwise every id is an
    /// instance anchor.
    pub fn generate_composite_instance_id(&self, has_internal_entity_id: bool) -> ShortGuid {
        let anchors = if has_internal_entity_id && !self.ids.is_empty() {
            &self.ids[..self.ids.len() - 1]
        } else {
            &self.ids[..]
        };
        anchors
            .iter()
            .fold(ShortGuid::INITIALISER_BASE, |acc, id| id.combine(acc))
    }

    /// Runtime id of the zone entity this path points at.
    pub fn generate_zone_id(&self) -> ShortGuid {
        let instance = self.generate_composite_instance_id(true);
        let pointed = self.target().unwrap_or(ShortGuid::INVALID);
        ShortGuid::new(
            1u32
                .wrapping_add(instance.value())
                .wrapping_add(pointed.value()),
        )
    }
}

impl FromIterator<ShortGuid> for EntityPath {
    fn from_iter<T: IntoIterator<Item = ShortGuid>>(iter: T) -> Self {
        Self::from_ids(iter)
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}
