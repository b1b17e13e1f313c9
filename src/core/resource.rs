//! Resource references from script data to renderable/physics assets.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::guid::ShortGuid;
use crate::util::{hash_vec3, vec3_bits_eq, Error, Result, Vec3};

/// Kind of asset a [`ResourceReference`] points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    RenderableInstance,
    CollisionMapping,
    DynamicPhysicsSystem,
    ExclusiveMasterStateResource,
    NavMeshBarrierResource,
    TraversalSegment,
    AnimatedModel,
    CharacterAttributeSet,
}

impl ResourceKind {
    /// All resource kinds.
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::RenderableInstance,
        ResourceKind::CollisionMapping,
        ResourceKind::DynamicPhysicsSystem,
        ResourceKind::ExclusiveMasterStateResource,
        ResourceKind::NavMeshBarrierResource,
        ResourceKind::TraversalSegment,
        ResourceKind::AnimatedModel,
        ResourceKind::CharacterAttributeSet,
    ];

    /// Name hashed to produce the tag.
    pub const fn name(self) -> &'static str {
        match self {
            ResourceKind::RenderableInstance => "RENDERABLE_INSTANCE",
            ResourceKind::CollisionMapping => "COLLISION_MAPPING",
            ResourceKind::DynamicPhysicsSystem => "DYNAMIC_PHYSICS_SYSTEM",
            ResourceKind::ExclusiveMasterStateResource => "EXCLUSIVE_MASTER_STATE_RESOURCE",
            ResourceKind::NavMeshBarrierResource => "NAV_MESH_BARRIER_RESOURCE",
            ResourceKind::TraversalSegment => "TRAVERSAL_SEGMENT",
            ResourceKind::AnimatedModel => "ANIMATED_MODEL",
            ResourceKind::CharacterAttributeSet => "CHARACTER_ATTRIBUTE_SET",
        }
    }

    /// Stored kind tag.
    pub const fn tag(self) -> ShortGuid {
        ShortGuid::new(match self {
            ResourceKind::RenderableInstance => 0x45C826F1,
            ResourceKind::CollisionMapping => 0x6354DEC6,
            ResourceKind::DynamicPhysicsSystem => 0x88924138,
            ResourceKind::ExclusiveMasterStateResource => 0xE9F81618,
            ResourceKind::NavMeshBarrierResource => 0xE0C87D7E,
            ResourceKind::TraversalSegment => 0x916BB129,
            ResourceKind::AnimatedModel => 0xFD3D9265,
            ResourceKind::CharacterAttributeSet => 0x82D77019,
        })
    }

    /// Look up a stored tag.
    pub fn from_tag(tag: ShortGuid) -> Result<ResourceKind> {
        Self::ALL
            .into_iter()
            .find(|k| k.tag() == tag)
            .ok_or(Error::UnknownResourceKind(tag))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-specific integer fields of a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourcePayload {
    /// Range of model instances in the level's renderable table.
    Renderable { index: u32, count: u32 },
    /// Two words whose meaning is unknown; round-tripped untouched.
    Opaque { a: u32, b: u32 },
}

impl ResourcePayload {
    /// Default payload for a kind.
    pub fn for_kind(kind: ResourceKind) -> Self {
        Self::from_words(kind, 0, 0)
    }

    /// Interpret the two stored words for a kind.
    pub fn from_words(kind: ResourceKind, a: u32, b: u32) -> Self {
        match kind {
            ResourceKind::RenderableInstance => Self::Renderable { index: a, count: b },
            _ => Self::Opaque { a, b },
        }
    }

    /// The two stored words.
    pub fn to_words(self) -> (u32, u32) {
        match self {
            Self::Renderable { index, count } => (index, count),
            Self::Opaque { a, b } => (a, b),
        }
    }
}

/// Pointer from script data to an asset.
///
/// `resource_id` names the owner: either the entity that carries the
/// reference or the id stored in a `resource` parameter value.
#[derive(Clone, Copy, Debug)]
pub struct ResourceReference {
    pub position: Vec3,
    pub rotation: Vec3,
    pub resource_id: ShortGuid,
    pub kind: ResourceKind,
    pub payload: ResourcePayload,
}

impl ResourceReference {
    /// Create a reference with zero offsets and a default payload.
    pub fn new(kind: ResourceKind, resource_id: ShortGuid) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            resource_id,
            kind,
            payload: ResourcePayload::for_kind(kind),
        }
    }

    /// Create a renderable-instance reference.
    pub fn renderable(resource_id: ShortGuid, index: u32, count: u32) -> Self {
        Self {
            payload: ResourcePayload::Renderable { index, count },
            ..Self::new(ResourceKind::RenderableInstance, resource_id)
        }
    }
}

impl PartialEq for ResourceReference {
    fn eq(&self, other: &Self) -> bool {
        vec3_bits_eq(self.position, other.position)
            && vec3_bits_eq(self.rotation, other.rotation)
            && self.resource_id == other.resource_id
            && self.kind == other.kind
            && self.payload == other.payload
    }
}

impl Eq for ResourceReference {}

impl Hash for ResourceReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_vec3(self.position, state);
        hash_vec3(self.rotation, state);
        self.resource_id.hash(state);
        self.kind.hash(state);
        self.payload.hash(state);
    }
}
