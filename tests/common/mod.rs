//! Shared helpers for integration tests.

#![allow(dead_code)]

use cathode::core::{
    Commands, Composite, DataType, FunctionType, ParameterData, ParameterUsage, ResourceKind,
    ResourceReference, RESOURCE_PARAMETER,
};
use cathode::{EntityPath, ShortGuid};

/// Route library logs to the test output. Set `RUST_LOG=cathode=trace` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn id(name: &str) -> ShortGuid {
    ShortGuid::from_name(name)
}

pub fn to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Replace every word-aligned occurrence of `old` with `new`.
pub fn replace_word(bytes: &mut [u8], old: u32, new: u32) -> usize {
    let mut hits = 0;
    for chunk in bytes.chunks_exact_mut(4) {
        if chunk == old.to_le_bytes() {
            chunk.copy_from_slice(&new.to_le_bytes());
            hits += 1;
        }
    }
    hits
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
/// Little-endian word at byte offset `pos`.
pub fn word_at(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

/// Sort entities the way decoding does so graphs compare equal.
pub fn canonical(mut commands: Commands) -> Commands {
    for composite in commands.composites_mut() {
        composite.sort_entities();
    }
    commands
}

/// Two composites exercising every entity kind, resources and timelines.
pub fn sample_commands() -> Commands {
    let mut commands = Commands::new();

    let mut door = Composite::from_name("Door_Logic");
    door.unknown = [3, 0xFFFF_FFFF];
    door.add_variable(id("is_open"), id("is_open"), DataType::Bool).unwrap();
    door.add_function(id("Gate"), FunctionType::LogicGate.id())
        .unwrap()
        .add_parameter(id("allow"), ParameterData::Bool(false), ParameterUsage::Input);
    door.add_link(id("Gate"), id("on_true"), id("is_open"), id("is_open")).unwrap();
    let door_id = door.id;
    commands.add_composite(door).unwrap();

    let mut level = Composite::from_name("Level_Root");
    level
        .add_function(id("Door_01"), door_id)
        .unwrap()
        .add_parameter(id("position"), ParameterData::Vector(glam::Vec3::new(1.0, 2.0, 3.0)), ParameterUsage::Input);
    level
        .add_function(id("Timer"), FunctionType::Delay.id())
        .unwrap()
        .add_parameter(id("delay"), ParameterData::Float(2.5), ParameterUsage::Input);
    level
        .add_function(id("Counter"), FunctionType::Counter.id())
        .unwrap()
        .add_parameter(id("label"), ParameterData::String("door counter".into()), ParameterUsage::Internal);
    level.add_link(id("Timer"), id("finished"), id("Door_01"), id("trigger")).unwrap();
    level.add_link(id("Counter"), id("on_full"), id("Timer"), id("trigger")).unwrap();

    let nested = EntityPath::from_ids([id("Door_01"), id("Gate")]);
    level
        .add_override(id("Gate_Override"), nested.clone())
        .unwrap()
        .add_parameter(id("allow"), ParameterData::Bool(true), ParameterUsage::Input);
    level.add_proxy(id("Gate_Proxy"), FunctionType::LogicGate.id(), nested.clone()).unwrap();
    level.add_alias(id("Gate_Alias"), nested).unwrap();

    let model = id("Crate_Model");
    level
        .add_function(model, FunctionType::ModelReference.id())
        .unwrap()
        .as_function_mut()
        .unwrap()
        .resources
        .push(ResourceReference::renderable(model, 12, 2));

    let physics = ShortGuid::new(0x00C0_FFEE);
    level
        .add_function(id("Crate_Physics"), FunctionType::PhysicsSystem.id())
        .unwrap()
        .add_parameter(
            id(RESOURCE_PARAMETER),
            ParameterData::Resource {
                resource_id: physics,
                references: vec![ResourceReference::new(ResourceKind::DynamicPhysicsSystem, physics)],
            },
            ParameterUsage::Input,
        );
    level
        .resources
        .push(ResourceReference::new(ResourceKind::ExclusiveMasterStateResource, level.id));

    let level_id = level.id;
    commands.add_composite(level).unwrap();
    commands.entry_points = [level_id, ShortGuid::INVALID, ShortGuid::INVALID];
    commands
}
