//! Decode edge cases: placeholders, corrupt input and I/O failures.

mod common;

use cathode::core::{
    DataType, EntityVariant, FunctionType, Link, ParameterUsage, ResourceKind, ResourceReference,
};
use cathode::prelude::*;
use common::*;

#[test]
fn test_unknown_link_target_materialized() {
    init_tracing();
    let mut commands = Commands::new();
    let c = commands.add_composite(Composite::from_name("Ghosts")).unwrap();
    c.add_function(id("A"), FunctionType::LogicGate.id())
        .unwrap()
        .links
        .push(Link::new(ShortGuid::new(0x42), id("out"), id("ghost"), id("in")));

    let cache = GuidCache::new();
    let decoded = Commands::from_bytes(&commands.to_bytes().unwrap(), &cache).unwrap();
    let c = &decoded.composites()[0];
    let ghost = c.entity(id("ghost")).expect("Placeholder must exist");
    assert_eq!(ghost.variant(), EntityVariant::Unresolved);
    assert_eq!(c.unresolved().count(), 1);
    assert_eq!(c.links_in(id("ghost"), id("in")).len(), 1);

    // The placeholder owns nothing, so the link survives another pass.
    let again = Commands::from_bytes(&decoded.to_bytes().unwrap(), &cache).unwrap();
    assert_eq!(again, decoded);
}

#[test]
fn test_parameters_on_undeclared_entity() {
    let mut commands = Commands::new();
    let c = commands.add_composite(Composite::from_name("Loose")).unwrap();
    c.insert_entity(Entity::unresolved(id("loose")))
        .unwrap()
        .add_parameter(id("speed"), ParameterData::Float(3.0), ParameterUsage::Input);

    let cache = GuidCache::new();
    let decoded = Commands::from_bytes(&commands.to_bytes().unwrap(), &cache).unwrap();
    let loose = decoded.composites()[0].entity(id("loose")).unwrap();
    assert_eq!(loose.variant(), EntityVariant::Unresolved);
    assert_eq!(loose.parameter(id("speed")).map(|p| &p.data), Some(&ParameterData::Float(3.0)));
}

fn integer_archive() -> Vec<u8> {
    let mut commands = Commands::new();
    commands
        .add_composite(Composite::from_name("Ints"))
        .unwrap()
        .add_function(id("A"), FunctionType::Counter.id())
        .unwrap()
        .add_parameter(id("count"), ParameterData::Integer(7), ParameterUsage::Input);
    commands.to_bytes().unwrap()
}

#[test]
fn test_truncated_archive() {
    let bytes = integer_archive();
    let cache = GuidCache::new();
    for len in [0, 20, bytes.len() - 4] {
        let err = Commands::from_bytes(&bytes[..len], &cache).unwrap_err();
        assert!(err.is_structural(), "len {}: {}", len, err);
        assert!(!err.is_io());
    }
}

#[test]
fn test_huge_table_counts_rejected() {
    let cache = GuidCache::new();
    // Pool count, then composite count, far beyond the 32-byte stream.
    for header in [[0, 0, 0, 0, u32::MAX, 0, 0, 0], [0, 0, 0, 0, 0, 0, u32::MAX, 0]] {
        let err = Commands::from_bytes(&to_bytes(&header), &cache).unwrap_err();
        assert!(err.is_structural(), "{:?}: {}", header, err);
    }
}

#[test]
fn test_unknown_data_type_tag() {
    let mut bytes = integer_archive();
    // First pooled value follows the header.
    bytes[32..36].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
    let err = Commands::from_bytes(&bytes, &GuidCache::new()).unwrap_err();
    assert!(matches!(err, Error::UnknownDataType(tag) if tag == ShortGuid::new(0xDEAD_BEEF)));
}

#[test]
fn test_bool_out_of_range() {
    let mut commands = Commands::new();
    commands
        .add_composite(Composite::from_name("Bools"))
        .unwrap()
        .add_function(id("A"), FunctionType::LogicGate.id())
        .unwrap()
        .add_parameter(id("allow"), ParameterData::Bool(true), ParameterUsage::Input);
    let mut bytes = commands.to_bytes().unwrap();
    bytes[36] = 2;
    let err = Commands::from_bytes(&bytes, &GuidCache::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidStructure(_)));
}

#[test]
fn test_unknown_resource_kind() {
    let mut commands = Commands::new();
    let c = commands.add_composite(Composite::from_name("Res")).unwrap();
    c.resources.push(ResourceReference::new(ResourceKind::TraversalSegment, c.id));
    let mut bytes = commands.to_bytes().unwrap();
    let tag = ResourceKind::TraversalSegment.tag().value();
    assert_eq!(replace_word(&mut bytes, tag, 0x0BAD_0BAD), 1);
    let err = Commands::from_bytes(&bytes, &GuidCache::new()).unwrap_err();
    assert!(matches!(err, Error::UnknownResourceKind(_)));
}

#[test]
fn test_unknown_function_type() {
    let mut commands = Commands::new();
    commands
        .add_composite(Composite::from_name("Calls"))
        .unwrap()
        .add_function(id("A"), FunctionType::Delay.id())
        .unwrap();
    let mut bytes = commands.to_bytes().unwrap();
    assert_eq!(replace_word(&mut bytes, FunctionType::Delay.id().value(), 0x1234_5678), 1);

    let cache = GuidCache::new();
    let strict = ReadOptions::default().with_function_validation(true);
    let err = Commands::from_bytes_opts(&bytes, &strict, &cache).unwrap_err();
    match err {
        Error::UnknownFunctionType { entity, function, .. } => {
            assert_eq!(entity, id("A"));
            assert_eq!(function, ShortGuid::new(0x1234_5678));
        }
        other => panic!("unexpected error {:?}", other),
    }

    let decoded = Commands::from_bytes(&bytes, &cache).unwrap();
    let a = decoded.composites()[0].entity(id("A")).unwrap();
    assert_eq!(a.as_function().map(|f| f.function), Some(ShortGuid::new(0x1234_5678)));
}

#[test]
fn test_unlisted_builtin_decodes_by_default() {
    let unlisted = id("PlayEnvironmentAnimation");
    assert!(FunctionType::from_id(unlisted).is_none());

    let mut commands = Commands::new();
    commands
        .add_composite(Composite::from_name("Builtins"))
        .unwrap()
        .add_function(id("Env"), unlisted)
        .unwrap();
    let decoded = Commands::from_bytes(&commands.to_bytes().unwrap(), &GuidCache::new()).unwrap();
    let env = decoded.composites()[0].entity(id("Env")).unwrap();
    assert_eq!(env.as_function().map(|f| f.function), Some(unlisted));
}

#[test]
fn test_composite_call_is_a_known_function() {
    let mut commands = Commands::new();
    let inner = commands.add_composite(Composite::from_name("Inner")).unwrap().id;
    commands
        .add_composite(Composite::from_name("Outer"))
        .unwrap()
        .add_function(id("Instance"), inner)
        .unwrap();
    let bytes = commands.to_bytes().unwrap();
    let strict = ReadOptions::default().with_function_validation(true);
    assert!(Commands::from_bytes_opts(&bytes, &strict, &GuidCache::new()).is_ok());
}

#[test]
fn test_duplicate_entity_ids() {
    let mut commands = Commands::new();
    let c = commands.add_composite(Composite::from_name("Dupes")).unwrap();
    c.add_variable(id("B"), id("value"), DataType::Integer).unwrap();
    c.add_function(id("A"), FunctionType::Delay.id()).unwrap();
    let mut bytes = commands.to_bytes().unwrap();
    assert_eq!(replace_word(&mut bytes, id("A").value(), id("B").value()), 1);

    let err = Commands::from_bytes(&bytes, &GuidCache::new()).unwrap_err();
    assert!(matches!(err, Error::DuplicateEntity { entity, .. } if entity == id("B")));
}

#[test]
fn test_name_registration_optional() {
    let bytes = integer_archive();
    let cache = GuidCache::new();
    let opts = ReadOptions::default().with_name_registration(false);
    Commands::from_bytes_opts(&bytes, &opts, &cache).unwrap();
    assert!(cache.is_empty());

    Commands::from_bytes(&bytes, &cache).unwrap();
    assert_eq!(cache.lookup(id("Ints")).as_deref(), Some("Ints"));
}

#[test]
fn test_override_without_checksum_uses_path_hash() {
    let path = EntityPath::from_ids([id("Door_01"), id("Gate")]);
    let mut commands = Commands::new();
    let c = commands.add_composite(Composite::from_name("Overrides")).unwrap();
    c.add_override(id("O"), path.clone()).unwrap();
    if let Some(o) = c.entity_mut(id("O")).and_then(|e| e.as_override_mut()) {
        o.checksum = ShortGuid::new(1);
    }

    // Clear the checksum block's descriptor pair.
    let mut bytes = commands.to_bytes().unwrap();
    let table = word_at(&bytes, 20) as usize * 4;
    let descriptor = word_at(&bytes, table) as usize * 4;
    let pair = descriptor + 4 * 8;
    bytes[pair..pair + 8].fill(0);

    let decoded = Commands::from_bytes(&bytes, &GuidCache::new()).unwrap();
    let o = decoded.composites()[0].entity(id("O")).unwrap().as_override().unwrap();
    assert_eq!(o.checksum, path.generate_path_hash());
    // The checksum block is written again on the next encode.
    assert_ne!(decoded.to_bytes().unwrap(), bytes);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let err = Commands::open(dir.path().join("commands.pak"), &GuidCache::new()).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
    assert!(err.is_io());
    assert!(!err.is_structural());
}
