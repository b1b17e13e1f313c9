//! Composites: named, independently addressable entity graphs.
//!
//! Entity ids are unique across all collections of a composite. Incoming
//! links are never indexed; they are found by scanning every entity's
//! outgoing links.

use tracing::trace;

use super::{
    AliasEntity, DataType, Entity, EntityKind, EntityPath, EntityVariant, FunctionEntity, Link,
    OverrideEntity, ProxyEntity, ResourceReference, VariableEntity,
};
use crate::guid::ShortGuid;
use crate::util::{Error, Result};

/// Named graph of entities.
#[derive(Clone, Debug, PartialEq)]
pub struct Composite {
    pub id: ShortGuid,
    pub name: String,
    /// Two header words with unknown meaning, round-tripped untouched.
    pub unknown: [u32; 2],
    /// References owned by the composite itself.
    pub resources: Vec<ResourceReference>,
    entities: Vec<Entity>,
}

impl Composite {
    /// Create an empty composite.
    pub fn new(id: ShortGuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            unknown: [0; 2],
            resources: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Create an empty composite whose id is the hash of its name.
    pub fn from_name(name: &str) -> Self {
        Self::new(ShortGuid::from_name(name), name)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Find an entity in any collection.
    pub fn entity(&self, id: ShortGuid) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: ShortGuid) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ShortGuid) -> bool {
        self.entity(id).is_some()
    }

    /// Every entity, in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.iter_mut()
    }

    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }

    /// Entities of one collection.
    pub fn of_variant(&self, variant: EntityVariant) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().filter(move |e| e.variant() == variant)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.of_variant(EntityVariant::Variable)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.of_variant(EntityVariant::Function)
    }

    pub fn overrides(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.of_variant(EntityVariant::Override)
    }

    pub fn proxies(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.of_variant(EntityVariant::Proxy)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.of_variant(EntityVariant::Alias)
    }

    /// Placeholders for ids that links or parameters mention but no block
    /// declares.
    pub fn unresolved(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.of_variant(EntityVariant::Unresolved)
    }

    // ------------------------------------------------------------------
    // Entity editing
    // ------------------------------------------------------------------

    /// Insert a fully built entity.
    pub fn insert_entity(&mut self, entity: Entity) -> Result<&mut Entity> {
        if self.contains(entity.id) {
            return Err(Error::DuplicateEntity { composite: self.id, entity: entity.id });
        }
        self.entities.push(entity);
        let last = self.entities.len() - 1;
        Ok(&mut self.entities[last])
    }

    pub fn add_variable(
        &mut self,
        id: ShortGuid,
        parameter: ShortGuid,
        data_type: DataType,
    ) -> Result<&mut Entity> {
        let kind = EntityKind::Variable(VariableEntity { parameter, data_type });
        self.insert_entity(Entity::new(id, kind))
    }

    pub fn add_function(&mut self, id: ShortGuid, function: ShortGuid) -> Result<&mut Entity> {
        let kind = EntityKind::Function(FunctionEntity::new(function));
        self.insert_entity(Entity::new(id, kind))
    }

    pub fn add_proxy(
        &mut self,
        id: ShortGuid,
        target_type: ShortGuid,
        path: EntityPath,
    ) -> Result<&mut Entity> {
        let kind = EntityKind::Proxy(ProxyEntity { target_type, path });
        self.insert_entity(Entity::new(id, kind))
    }

    /// Add an override; its checksum is computed from the path.
    pub fn add_override(&mut self, id: ShortGuid, path: EntityPath) -> Result<&mut Entity> {
        let kind = EntityKind::Override(OverrideEntity::new(path));
        self.insert_entity(Entity::new(id, kind))
    }

    pub fn add_alias(&mut self, id: ShortGuid, path: EntityPath) -> Result<&mut Entity> {
        let kind = EntityKind::Alias(AliasEntity { path });
        self.insert_entity(Entity::new(id, kind))
    }

    /// Get an entity, creating an unresolved placeholder if it is missing.
    pub(crate) fn ensure_entity(&mut self, id: ShortGuid) -> &mut Entity {
        let index = match self.entities.iter().position(|e| e.id == id) {
            Some(index) => index,
            None => {
                self.entities.push(Entity::unresolved(id));
                self.entities.len() - 1
            }
        };
        &mut self.entities[index]
    }

    /// Order entities by numeric id, the order they are encoded in.
    pub fn sort_entities(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }

    /// Remove an entity and every link pointing at it.
    pub fn remove_entity(&mut self, id: ShortGuid) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        let removed = self.entities.remove(index);
        for entity in &mut self.entities {
            entity.links.retain(|l| l.target_entity != id);
        }
        Some(removed)
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// Connect `source_parameter` on `from` to `target_parameter` on `to`.
    ///
    /// Both entities must exist. The returned link id is derived from the
    /// endpoints and is unique within the composite.
    pub fn add_link(
        &mut self,
        from: ShortGuid,
        source_parameter: ShortGuid,
        to: ShortGuid,
        target_parameter: ShortGuid,
    ) -> Result<ShortGuid> {
        if !self.contains(to) {
            return Err(Error::EntityNotFound(to));
        }
        if !self.contains(from) {
            return Err(Error::EntityNotFound(from));
        }

        let link_id = self.next_link_id(from, source_parameter, to, target_parameter);
        let link = Link::new(link_id, source_parameter, to, target_parameter);
        if let Some(entity) = self.entity_mut(from) {
            entity.links.push(link);
        }
        trace!("Linked {} -> {} as {}", from, to, link_id);
        Ok(link_id)
    }

    fn next_link_id(
        &self,
        from: ShortGuid,
        source_parameter: ShortGuid,
        to: ShortGuid,
        target_parameter: ShortGuid,
    ) -> ShortGuid {
        let mut seed = [0u8; 20];
        seed[0..4].copy_from_slice(&from.to_bytes());
        seed[4..8].copy_from_slice(&source_parameter.to_bytes());
        seed[8..12].copy_from_slice(&to.to_bytes());
        seed[12..16].copy_from_slice(&target_parameter.to_bytes());

        let mut salt = 0u32;
        loop {
            seed[16..20].copy_from_slice(&salt.to_le_bytes());
            let id = ShortGuid::from_bytes(shortguid_hash::generate_bytes(&seed));
            if !id.is_invalid() && !self.link_exists(id) {
                return id;
            }
            salt = salt.wrapping_add(1);
        }
    }

    fn link_exists(&self, link_id: ShortGuid) -> bool {
        self.entities.iter().any(|e| e.link(link_id).is_some())
    }

    /// Remove a link from whichever entity owns it.
    pub fn remove_link(&mut self, link_id: ShortGuid) -> Option<Link> {
        self.entities.iter_mut().find_map(|e| e.remove_link(link_id))
    }

    /// Outgoing links of `entity` leaving from `source_parameter`.
    pub fn links_out(&self, entity: ShortGuid, source_parameter: ShortGuid) -> Vec<Link> {
        self.entity(entity)
            .map(|e| e.links_out(source_parameter).copied().collect())
            .unwrap_or_default()
    }

    /// Links arriving at `target_parameter` on `entity`, seen from the
    /// target: the source parameter is the local one and the target entity
    /// is the link's origin.
    pub fn links_in(&self, entity: ShortGuid, target_parameter: ShortGuid) -> Vec<Link> {
        self.incoming(entity)
            .filter(|l| l.source_parameter == target_parameter)
            .collect()
    }

    /// Every link arriving at `entity`, seen from the target.
    pub fn all_links_in(&self, entity: ShortGuid) -> Vec<Link> {
        self.incoming(entity).collect()
    }

    fn incoming(&self, entity: ShortGuid) -> impl Iterator<Item = Link> + '_ {
        self.entities.iter().flat_map(move |origin| {
            origin
                .links
                .iter()
                .filter(move |l| l.target_entity == entity)
                .map(move |l| Link {
                    id: l.id,
                    source_parameter: l.target_parameter,
                    target_entity: origin.id,
                    target_parameter: l.source_parameter,
                })
        })
    }

    /// True if `entity` has any outgoing or incoming link.
    pub fn has_links(&self, entity: ShortGuid) -> bool {
        let outgoing = self.entity(entity).is_some_and(|e| !e.links.is_empty());
        outgoing || self.incoming(entity).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FunctionType, ParameterData, ParameterUsage};

    fn id(name: &str) -> ShortGuid {
        ShortGuid::from_name(name)
    }

    fn sample() -> Composite {
        let mut c = Composite::from_name("TestComposite");
        c.add_function(id("A"), FunctionType::LogicGate.id()).unwrap();
        c.add_variable(id("B"), id("value"), DataType::Float).unwrap();
        c
    }

    #[test]
    fn test_unique_ids() {
        let mut c = sample();
        let err = c.add_alias(id("A"), EntityPath::new()).unwrap_err();
        assert!(matches!(err, Error::DuplicateEntity { .. }));
        assert_eq!(c.num_entities(), 2);
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let c = sample();
        assert!(c.entity(id("nope")).is_none());
        assert_eq!(c.functions().count(), 1);
        assert_eq!(c.variables().count(), 1);
        assert_eq!(c.overrides().count(), 0);
    }

    #[test]
    fn test_links_in_swaps_roles() {
        let mut c = sample();
        let link_id = c.add_link(id("A"), id("out"), id("B"), id("value")).unwrap();

        let outgoing = c.links_out(id("A"), id("out"));
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].id, link_id);

        let incoming = c.links_in(id("B"), id("value"));
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].id, link_id);
        assert_eq!(incoming[0].source_parameter, id("value"));
        assert_eq!(incoming[0].target_entity, id("A"));
        assert_eq!(incoming[0].target_parameter, id("out"));

        assert!(c.has_links(id("A")));
        assert!(c.has_links(id("B")));
        assert!(c.links_in(id("B"), id("other")).is_empty());
    }

    #[test]
    fn test_multigraph_links() {
        let mut c = sample();
        let first = c.add_link(id("A"), id("out"), id("B"), id("value")).unwrap();
        let second = c.add_link(id("A"), id("out"), id("B"), id("value")).unwrap();
        assert_ne!(first, second);
        assert_eq!(c.links_in(id("B"), id("value")).len(), 2);

        assert!(c.remove_link(first).is_some());
        assert_eq!(c.all_links_in(id("B")).len(), 1);
        assert!(c.remove_link(first).is_none());
    }

    #[test]
    fn test_add_link_requires_entities() {
        let mut c = sample();
        let err = c.add_link(id("A"), id("out"), id("missing"), id("in")).unwrap_err();
        assert!(matches!(err, Error::EntityNotFound(_)));
    }

    #[test]
    fn test_remove_entity_drops_incoming_links() {
        let mut c = sample();
        c.add_link(id("A"), id("out"), id("B"), id("value")).unwrap();
        assert!(c.remove_entity(id("B")).is_some());
        assert!(c.entity(id("A")).unwrap().links.is_empty());
        assert!(!c.has_links(id("A")));
    }

    #[test]
    fn test_ensure_entity_placeholder() {
        let mut c = sample();
        c.ensure_entity(id("ghost"))
            .add_parameter(id("x"), ParameterData::Integer(3), ParameterUsage::Input);
        assert_eq!(c.unresolved().count(), 1);
        // Existing entities are not replaced.
        c.ensure_entity(id("A"));
        assert_eq!(c.num_entities(), 3);
        assert_eq!(c.entity(id("A")).unwrap().variant(), EntityVariant::Function);
    }
}
