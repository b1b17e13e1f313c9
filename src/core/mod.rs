//! Core layer - the in-memory graph model.
//!
//! This module provides:
//! - [`Commands`] - A whole archive: composites plus entry points
//! - [`Composite`] - A named entity graph
//! - [`Entity`] / [`EntityKind`] - Graph nodes (variables, functions, proxies, overrides, aliases)
//! - [`Link`] - Parameter-to-parameter edges
//! - [`Parameter`] / [`ParameterData`] - Typed values
//! - [`ResourceReference`] - Asset references owned by entities, parameters or composites
//! - [`EntityPath`] - Entity walks and the hash chains derived from them
//! - [`Timeline`] - Keyframe and trigger data of animation/trigger-sequence functions

mod commands;
mod composite;
mod data_type;
mod entity;
mod function_type;
mod parameter;
mod path;
mod resource;
mod timeline;

pub use commands::{Commands, EntryPoint};
pub use composite::Composite;
pub use data_type::DataType;
pub use entity::{
    AliasEntity, Entity, EntityKind, EntityVariant, FunctionEntity, Link, OverrideEntity,
    ProxyEntity, VariableEntity,
};
pub use function_type::FunctionType;
pub use parameter::{Parameter, ParameterData, ParameterUsage, Transform, RESOURCE_PARAMETER};
pub use path::EntityPath;
pub use resource::{ResourceKind, ResourcePayload, ResourceReference};
pub use timeline::{
    AnimationTrack, EventKeyframe, EventSet, Keyframe, KeyframeHeader, KeyframeSet, Timeline,
    Trigger, TriggerEvent, TriggerSequence,
};
