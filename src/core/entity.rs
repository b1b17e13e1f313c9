//! Entities: the nodes of a composite graph.
//!
//! Every entity has an id, outgoing links and parameters. What it *is* lives
//! in [`EntityKind`], a closed set the codec switches on exhaustively.

use super::{
    AnimationTrack, DataType, EntityPath, FunctionType, Parameter, ParameterData, ParameterUsage,
    ResourceKind, ResourceReference, Timeline, TriggerSequence,
};
use crate::guid::ShortGuid;

/// Directed edge from a parameter on the owning entity to a parameter on
/// `target_entity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    pub id: ShortGuid,
    pub source_parameter: ShortGuid,
    pub target_entity: ShortGuid,
    pub target_parameter: ShortGuid,
}

impl Link {
    pub fn new(
        id: ShortGuid,
        source_parameter: ShortGuid,
        target_entity: ShortGuid,
        target_parameter: ShortGuid,
    ) -> Self {
        Self { id, source_parameter, target_entity, target_parameter }
    }
}

/// Pin exposed when the composite is instanced elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableEntity {
    pub parameter: ShortGuid,
    pub data_type: DataType,
}

/// Call of a built-in function or of another composite.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionEntity {
    pub function: ShortGuid,
    pub resources: Vec<ResourceReference>,
    pub timeline: Timeline,
}

impl FunctionEntity {
    /// Create a call; animation and trigger-sequence functions get an empty
    /// timeline of the matching kind.
    pub fn new(function: ShortGuid) -> Self {
        let timeline = match FunctionType::from_id(function) {
            Some(FunctionType::CAGEAnimation) => Timeline::Animation(AnimationTrack::default()),
            Some(FunctionType::TriggerSequence) => {
                Timeline::TriggerSequence(TriggerSequence::default())
            }
            _ => Timeline::None,
        };
        Self { function, resources: Vec::new(), timeline }
    }

    /// Built-in function type, `None` for composite calls and unknown ids.
    pub fn function_type(&self) -> Option<FunctionType> {
        FunctionType::from_id(self.function)
    }

    /// Attach a reference owned by `owner` (the entity id).
    pub fn add_resource(&mut self, owner: ShortGuid, kind: ResourceKind) -> &mut ResourceReference {
        self.resources.push(ResourceReference::new(kind, owner));
        let last = self.resources.len() - 1;
        &mut self.resources[last]
    }
}

/// Stand-in for an entity inside a differently scoped composite instance.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyEntity {
    pub target_type: ShortGuid,
    pub path: EntityPath,
}

/// Parameter override applied to a nested entity.
#[derive(Clone, Debug, PartialEq)]
pub struct OverrideEntity {
    pub path: EntityPath,
    pub checksum: ShortGuid,
}

impl OverrideEntity {
    /// Create with a freshly computed checksum.
    pub fn new(path: EntityPath) -> Self {
        let checksum = path.generate_path_hash();
        Self { path, checksum }
    }

    /// Recompute the checksum from the path.
    pub fn refresh_checksum(&mut self) {
        self.checksum = self.path.generate_path_hash();
    }

    /// Check the stored checksum against the path.
    pub fn is_checksum_valid(&self) -> bool {
        self.checksum == self.path.generate_path_hash()
    }
}

/// Another name for a nested entity.
#[derive(Clone, Debug, PartialEq)]
pub struct AliasEntity {
    pub path: EntityPath,
}

/// What an entity is.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Variable(VariableEntity),
    Function(FunctionEntity),
    Proxy(ProxyEntity),
    Override(OverrideEntity),
    Alias(AliasEntity),
    /// Referenced by links or parameters but declared nowhere.
    Unresolved,
}

/// Discriminant of [`EntityKind`], one per composite collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityVariant {
    Variable,
    Function,
    Proxy,
    Override,
    Alias,
    Unresolved,
}

/// Node of a composite.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: ShortGuid,
    pub kind: EntityKind,
    /// Outgoing links.
    pub links: Vec<Link>,
    pub parameters: Vec<Parameter>,
}

impl Entity {
    pub fn new(id: ShortGuid, kind: EntityKind) -> Self {
        Self { id, kind, links: Vec::new(), parameters: Vec::new() }
    }

    /// Placeholder for an id nothing declares.
    pub fn unresolved(id: ShortGuid) -> Self {
        Self::new(id, EntityKind::Unresolved)
    }

    pub fn variant(&self) -> EntityVariant {
        match &self.kind {
            EntityKind::Variable(_) => EntityVariant::Variable,
            EntityKind::Function(_) => EntityVariant::Function,
            EntityKind::Proxy(_) => EntityVariant::Proxy,
            EntityKind::Override(_) => EntityVariant::Override,
            EntityKind::Alias(_) => EntityVariant::Alias,
            EntityKind::Unresolved => EntityVariant::Unresolved,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableEntity> {
        match &self.kind {
            EntityKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionEntity> {
        match &self.kind {
            EntityKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut FunctionEntity> {
        match &mut self.kind {
            EntityKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_proxy(&self) -> Option<&ProxyEntity> {
        match &self.kind {
            EntityKind::Proxy(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_override(&self) -> Option<&OverrideEntity> {
        match &self.kind {
            EntityKind::Override(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_override_mut(&mut self) -> Option<&mut OverrideEntity> {
        match &mut self.kind {
            EntityKind::Override(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&AliasEntity> {
        match &self.kind {
            EntityKind::Alias(a) => Some(a),
            _ => None,
        }
    }

    /// Path of a proxy, override or alias.
    pub fn path(&self) -> Option<&EntityPath> {
        match &self.kind {
            EntityKind::Proxy(p) => Some(&p.path),
            EntityKind::Override(o) => Some(&o.path),
            EntityKind::Alias(a) => Some(&a.path),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Get a parameter by name.
    pub fn parameter(&self, name: ShortGuid) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn parameter_mut(&mut self, name: ShortGuid) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    /// Add a parameter, replacing the value of an existing one with the
    /// same name in place.
    pub fn add_parameter(
        &mut self,
        name: ShortGuid,
        data: ParameterData,
        usage: ParameterUsage,
    ) -> &mut Parameter {
        self.set_parameter(Parameter::with_usage(name, data, usage))
    }

    /// Insert a full parameter, overwriting by name.
    pub fn set_parameter(&mut self, parameter: Parameter) -> &mut Parameter {
        match self.parameters.iter().position(|p| p.name == parameter.name) {
            Some(index) => {
                self.parameters[index] = parameter;
                &mut self.parameters[index]
            }
            None => {
                self.parameters.push(parameter);
                let last = self.parameters.len() - 1;
                &mut self.parameters[last]
            }
        }
    }

    /// Remove a parameter by name.
    pub fn remove_parameter(&mut self, name: ShortGuid) -> Option<Parameter> {
        let index = self.parameters.iter().position(|p| p.name == name)?;
        Some(self.parameters.remove(index))
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// Outgoing links leaving from `source_parameter`.
    pub fn links_out(&self, source_parameter: ShortGuid) -> impl Iterator<Item = &Link> + '_ {
        self.links.iter().filter(move |l| l.source_parameter == source_parameter)
    }

    pub fn link(&self, link_id: ShortGuid) -> Option<&Link> {
        self.links.iter().find(|l| l.id == link_id)
    }

    /// Remove an outgoing link by its id.
    pub fn remove_link(&mut self, link_id: ShortGuid) -> Option<Link> {
        let index = self.links.iter().position(|l| l.id == link_id)?;
        Some(self.links.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> ShortGuid {
        ShortGuid::from_name(name)
    }

    #[test]
    fn test_function_timeline_by_type() {
        let anim = FunctionEntity::new(FunctionType::CAGEAnimation.id());
        assert!(matches!(anim.timeline, Timeline::Animation(_)));

        let seq = FunctionEntity::new(FunctionType::TriggerSequence.id());
        assert!(matches!(seq.timeline, Timeline::TriggerSequence(_)));

        let door = FunctionEntity::new(FunctionType::Door.id());
        assert_eq!(door.timeline, Timeline::None);
        assert_eq!(door.function_type(), Some(FunctionType::Door));

        let composite_call = FunctionEntity::new(id("MyComposite"));
        assert_eq!(composite_call.function_type(), None);
    }

    #[test]
    fn test_parameter_overwrite() {
        let mut e = Entity::new(id("A"), EntityKind::Function(FunctionEntity::new(FunctionType::Delay.id())));
        e.add_parameter(id("delay"), ParameterData::Float(1.0), ParameterUsage::Input);
        e.add_parameter(id("enabled"), ParameterData::Bool(true), ParameterUsage::Input);
        e.add_parameter(id("delay"), ParameterData::Float(2.5), ParameterUsage::Internal);

        assert_eq!(e.parameters.len(), 2);
        let delay = e.parameter(id("delay")).unwrap();
        assert_eq!(delay.data, ParameterData::Float(2.5));
        assert_eq!(delay.usage, ParameterUsage::Internal);
        // Overwrite keeps the original slot.
        assert_eq!(e.parameters[0].name, id("delay"));

        assert!(e.remove_parameter(id("delay")).is_some());
        assert!(e.remove_parameter(id("delay")).is_none());
        assert_eq!(e.parameters.len(), 1);
    }

    #[test]
    fn test_links_out() {
        let mut e = Entity::unresolved(id("A"));
        e.links.push(Link::new(id("l1"), id("out"), id("B"), id("in")));
        e.links.push(Link::new(id("l2"), id("out"), id("C"), id("in")));
        e.links.push(Link::new(id("l3"), id("other"), id("C"), id("in")));

        assert_eq!(e.links_out(id("out")).count(), 2);
        assert_eq!(e.links_out(id("missing")).count(), 0);
        assert_eq!(e.remove_link(id("l2")).map(|l| l.target_entity), Some(id("C")));
        assert_eq!(e.links_out(id("out")).count(), 1);
    }

    #[test]
    fn test_override_checksum() {
        let path = EntityPath::from_ids([id("A"), id("B")]);
        let mut o = OverrideEntity::new(path);
        assert!(o.is_checksum_valid());
        o.path.push(id("C"));
        assert!(!o.is_checksum_valid());
        o.refresh_checksum();
        assert!(o.is_checksum_valid());
    }

    #[test]
    fn test_variant_and_path() {
        let alias = Entity::new(id("X"), EntityKind::Alias(AliasEntity { path: EntityPath::from_ids([id("Y")]) }));
        assert_eq!(alias.variant(), EntityVariant::Alias);
        assert_eq!(alias.path().and_then(|p| p.target()), Some(id("Y")));
        assert!(Entity::unresolved(id("Z")).path().is_none());
    }
}
