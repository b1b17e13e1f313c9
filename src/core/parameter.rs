//! Parameter values.
//!
//! A parameter is a named, typed value attached to an entity. Values are
//! stored once per archive in a deduplicated pool, so equality and hashing
//! here are by value: floats compare by bit pattern, exactly as they encode.

use std::hash::{Hash, Hasher};

use super::{DataType, ResourceReference};
use crate::guid::ShortGuid;
use crate::util::{f32_bits_eq, hash_vec3, vec3_bits_eq, Vec3};

/// Name of the parameter that owns resource references.
pub const RESOURCE_PARAMETER: &str = "resource";

/// Position + euler rotation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        vec3_bits_eq(self.position, other.position) && vec3_bits_eq(self.rotation, other.rotation)
    }
}

impl Eq for Transform {}

impl Hash for Transform {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_vec3(self.position, state);
        hash_vec3(self.rotation, state);
    }
}

/// A parameter value.
#[derive(Clone, Debug)]
pub enum ParameterData {
    Transform(Transform),
    Integer(i32),
    Float(f32),
    Bool(bool),
    String(String),
    Vector(Vec3),
    Enum { enum_type: ShortGuid, index: i32 },
    EnumString { enum_type: ShortGuid, value: String },
    Spline(Vec<Transform>),
    /// Resource id plus the references that resolve to it.
    Resource {
        resource_id: ShortGuid,
        references: Vec<ResourceReference>,
    },
}

impl ParameterData {
    /// Type tag of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            ParameterData::Transform(_) => DataType::Transform,
            ParameterData::Integer(_) => DataType::Integer,
            ParameterData::Float(_) => DataType::Float,
            ParameterData::Bool(_) => DataType::Bool,
            ParameterData::String(_) => DataType::String,
            ParameterData::Vector(_) => DataType::Vector,
            ParameterData::Enum { .. } => DataType::Enum,
            ParameterData::EnumString { .. } => DataType::EnumString,
            ParameterData::Spline(_) => DataType::Spline,
            ParameterData::Resource { .. } => DataType::Resource,
        }
    }

    /// Resource value with no references yet.
    pub fn resource(resource_id: ShortGuid) -> Self {
        ParameterData::Resource { resource_id, references: Vec::new() }
    }

    /// The value as it is stored in the pool.
    ///
    /// Resource references are written to the composite, not the pool, so
    /// two resource values with the same id share one pool entry.
    pub fn pooled(&self) -> ParameterData {
        match self {
            ParameterData::Resource { resource_id, .. } => Self::resource(*resource_id),
            other => other.clone(),
        }
    }
}

impl PartialEq for ParameterData {
    fn eq(&self, other: &Self) -> bool {
        use ParameterData::*;
        match (self, other) {
            (Transform(a), Transform(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => f32_bits_eq(*a, *b),
            (Bool(a), Bool(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Vector(a), Vector(b)) => vec3_bits_eq(*a, *b),
            (Enum { enum_type: ta, index: ia }, Enum { enum_type: tb, index: ib }) => {
                ta == tb && ia == ib
            }
            (
                EnumString { enum_type: ta, value: va },
                EnumString { enum_type: tb, value: vb },
            ) => ta == tb && va == vb,
            (Spline(a), Spline(b)) => a == b,
            (
                Resource { resource_id: ia, references: ra },
                Resource { resource_id: ib, references: rb },
            ) => ia == ib && ra == rb,
            _ => false,
        }
    }
}

impl Eq for ParameterData {}

impl Hash for ParameterData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ParameterData::Transform(t) => t.hash(state),
            ParameterData::Integer(v) => v.hash(state),
            ParameterData::Float(v) => v.to_bits().hash(state),
            ParameterData::Bool(v) => v.hash(state),
            ParameterData::String(v) => v.hash(state),
            ParameterData::Vector(v) => hash_vec3(*v, state),
            ParameterData::Enum { enum_type, index } => {
                enum_type.hash(state);
                index.hash(state);
            }
            ParameterData::EnumString { enum_type, value } => {
                enum_type.hash(state);
                value.hash(state);
            }
            ParameterData::Spline(points) => points.hash(state),
            ParameterData::Resource { resource_id, references } => {
                resource_id.hash(state);
                references.hash(state);
            }
        }
    }
}

/// How a parameter is used by its entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ParameterUsage {
    #[default]
    Input,
    Output,
    Internal,
}

impl ParameterUsage {
    /// Stored value.
    pub const fn to_u32(self) -> u32 {
        match self {
            ParameterUsage::Input => 0,
            ParameterUsage::Output => 1,
            ParameterUsage::Internal => 2,
        }
    }

    /// Interpret a stored value.
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(ParameterUsage::Input),
            1 => Some(ParameterUsage::Output),
            2 => Some(ParameterUsage::Internal),
            _ => None,
        }
    }
}

/// Named value on an entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: ShortGuid,
    pub data: ParameterData,
    pub usage: ParameterUsage,
}

impl Parameter {
    pub fn new(name: ShortGuid, data: ParameterData) -> Self {
        Self { name, data, usage: ParameterUsage::Input }
    }

    pub fn with_usage(name: ShortGuid, data: ParameterData, usage: ParameterUsage) -> Self {
        Self { name, data, usage }
    }
}
