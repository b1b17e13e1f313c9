//! Archive decoding.
//!
//! Decoding runs in two phases. Every block of every composite is first
//! parsed into flat per-kind record arenas ([`RawComposite`]); nothing is
//! linked yet and all offsets have been followed. The arenas are then
//! reconciled into [`Composite`] graphs in a fixed order, since checksum,
//! resource and timeline attachment all need the entities to exist.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use super::format::*;
use super::options::ReadOptions;
use super::read_util::*;
use crate::core::{
    AliasEntity, AnimationTrack, Commands, Composite, DataType, Entity, EntityKind, EntityPath,
    FunctionEntity, FunctionType, Link, OverrideEntity, Parameter, ParameterData, ParameterUsage,
    ProxyEntity, ResourceKind, ResourcePayload, ResourceReference, Timeline, TriggerSequence,
    VariableEntity, RESOURCE_PARAMETER,
};
use crate::guid::{GuidCache, ShortGuid};
use crate::util::{Error, Result};

/// Fixed archive header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PakHeader {
    pub entry_points: [ShortGuid; NUM_ENTRY_POINTS],
    pub pool_table: (u32, u32),
    pub composite_table: (u32, u32),
}

impl PakHeader {
    pub fn parse(view: &ByteView<'_>) -> Result<Self> {
        if view.len() < HEADER_SIZE as u64 {
            return Err(Error::UnexpectedEof(view.len()));
        }
        let mut cur = view.records(0, 1, HEADER_SIZE)?;
        let entry_points = [cur.guid()?, cur.guid()?, cur.guid()?];
        let pool_table = (cur.u32()?, cur.u32()?);
        let composite_table = (cur.u32()?, cur.u32()?);
        Ok(Self { entry_points, pool_table, composite_table })
    }
}

/// `{name, usage, pool offset}` as stored.
struct RawParameter {
    name: ShortGuid,
    usage: ParameterUsage,
    pool_word: u32,
}

/// One composite's records, parsed but not reconciled.
#[derive(Default)]
struct RawComposite {
    id: ShortGuid,
    name: String,
    unknown: [u32; 2],
    links: Vec<(ShortGuid, Vec<Link>)>,
    parameters: Vec<(ShortGuid, Vec<RawParameter>)>,
    overrides: Vec<(ShortGuid, EntityPath)>,
    checksums: Vec<(ShortGuid, ShortGuid)>,
    variables: Vec<(ShortGuid, VariableEntity)>,
    proxies: Vec<(ShortGuid, ProxyEntity)>,
    functions: Vec<(ShortGuid, ShortGuid)>,
    resources: Vec<ResourceReference>,
    animations: Vec<(ShortGuid, AnimationTrack)>,
    trigger_sequences: Vec<(ShortGuid, TriggerSequence)>,
    aliases: Vec<(ShortGuid, EntityPath)>,
}

/// Decode a whole archive from bytes.
pub(crate) fn decode(data: &[u8], opts: &ReadOptions, cache: &GuidCache) -> Result<Commands> {
    let view = ByteView::new(data);
    let header = PakHeader::parse(&view)?;
    debug!(
        "Decoding archive: {} bytes, {} pooled values, {} composites",
        data.len(),
        header.pool_table.1,
        header.composite_table.1
    );

    let pool = read_pool(&view, header.pool_table)?;

    let mut table = view.records(header.composite_table.0, header.composite_table.1, WORD as usize)?;
    let mut raws = Vec::with_capacity(header.composite_table.1 as usize);
    for _ in 0..header.composite_table.1 {
        raws.push(read_composite(&view, table.u32()?)?);
    }

    let mut commands = Commands::new();
    commands.entry_points = header.entry_points;
    for raw in raws {
        let composite = reconcile(raw, &pool)?;
        debug!(
            "Composite {} ({}): {} entities, {} composite resources",
            composite.name,
            composite.id,
            composite.num_entities(),
            composite.resources.len()
        );
        commands.add_composite(composite)?;
    }

    if opts.validate_function_types {
        validate_function_types(&commands)?;
    }
    if opts.register_names {
        register_names(&commands, cache);
    }
    Ok(commands)
}

/// Read the pool table into a map from entry word offset to value.
fn read_pool(view: &ByteView<'_>, table: (u32, u32)) -> Result<HashMap<u32, ParameterData>> {
    let mut cur = view.records(table.0, table.1, WORD as usize)?;
    let mut pool = HashMap::with_capacity(table.1 as usize);
    for _ in 0..table.1 {
        let word = cur.u32()?;
        pool.insert(word, read_pool_entry(view, word)?);
    }
    trace!("Read {} pooled values", pool.len());
    Ok(pool)
}

// ============================================================================
// Phase 1: blocks into arenas
// ============================================================================

fn read_composite(view: &ByteView<'_>, descriptor_word: u32) -> Result<RawComposite> {
    let mut table = view.records(descriptor_word, NUM_BLOCKS as u32, 8)?;
    let mut blocks = [(0u32, 0u32); NUM_BLOCKS];
    for block in blocks.iter_mut() {
        *block = (table.u32()?, table.u32()?);
    }

    let mut raw = RawComposite::default();
    for kind in BlockKind::ALL {
        let (word, count) = blocks[kind as usize];
        trace!("Block {:?}: {} records at word {}", kind, count, word);
        let mut cur = view.records(word, count, kind.record_size())?;
        for _ in 0..count {
            read_record(view, kind, &mut cur, &mut raw)?;
        }
        if kind == BlockKind::Header && count != 1 {
            return Err(Error::invalid(format!(
                "Composite at word {} has {} header records",
                descriptor_word, count
            )));
        }
    }
    Ok(raw)
}

fn read_record(
    view: &ByteView<'_>,
    kind: BlockKind,
    cur: &mut RecordCursor<'_>,
    raw: &mut RawComposite,
) -> Result<()> {
    match kind {
        BlockKind::Header => {
            raw.id = cur.guid()?;
            let name_word = cur.u32()?;
            let name_len = cur.u32()?;
            raw.name = read_string(view, name_word, name_len)?;
            raw.unknown = [cur.u32()?, cur.u32()?];
        }
        BlockKind::EntityLinks => {
            let entity = cur.guid()?;
            let list_word = cur.u32()?;
            let list_count = cur.u32()?;
            let mut list = view.records(list_word, list_count, LINK_ENTRY_SIZE)?;
            let mut links = Vec::with_capacity(list_count as usize);
            for _ in 0..list_count {
                links.push(Link::new(list.guid()?, list.guid()?, list.guid()?, list.guid()?));
            }
            raw.links.push((entity, links));
        }
        BlockKind::EntityParameters => {
            let entity = cur.guid()?;
            let list_word = cur.u32()?;
            let list_count = cur.u32()?;
            let mut list = view.records(list_word, list_count, PARAMETER_ENTRY_SIZE)?;
            let mut params = Vec::with_capacity(list_count as usize);
            for _ in 0..list_count {
                let name = list.guid()?;
                let usage_value = list.u32()?;
                let usage = ParameterUsage::from_u32(usage_value).ok_or_else(|| {
                    Error::invalid(format!(
                        "Parameter {} on {} has usage {}",
                        name, entity, usage_value
                    ))
                })?;
                params.push(RawParameter { name, usage, pool_word: list.u32()? });
            }
            raw.parameters.push((entity, params));
        }
        BlockKind::EntityOverrides => {
            let entity = cur.guid()?;
            let path_word = cur.u32()?;
            let path_len = cur.u32()?;
            raw.overrides.push((entity, read_path(view, path_word, path_len)?));
        }
        BlockKind::OverrideChecksums => {
            raw.checksums.push((cur.guid()?, cur.guid()?));
        }
        BlockKind::ExposedVariables => {
            let entity = cur.guid()?;
            let parameter = cur.guid()?;
            let data_type = DataType::from_tag(cur.guid()?)?;
            raw.variables.push((entity, VariableEntity { parameter, data_type }));
        }
        BlockKind::EntityProxies => {
            let entity = cur.guid()?;
            let target_type = cur.guid()?;
            let path_word = cur.u32()?;
            let path_len = cur.u32()?;
            let path = read_path(view, path_word, path_len)?;
            raw.proxies.push((entity, ProxyEntity { target_type, path }));
        }
        BlockKind::EntityFunctions => {
            raw.functions.push((cur.guid()?, cur.guid()?));
        }
        BlockKind::ResourceReferences => {
            let position = cur.vec3()?;
            let rotation = cur.vec3()?;
            let resource_id = cur.guid()?;
            let kind = ResourceKind::from_tag(cur.guid()?)?;
            let payload = ResourcePayload::from_words(kind, cur.u32()?, cur.u32()?);
            raw.resources.push(ResourceReference { position, rotation, resource_id, kind, payload });
        }
        BlockKind::AnimationData => {
            let (entity, sub) = read_sub_block(view, cur)?;
            raw.animations.push((entity, read_animation(&sub)?));
        }
        BlockKind::TriggerSequenceData => {
            let (entity, sub) = read_sub_block(view, cur)?;
            raw.trigger_sequences.push((entity, read_trigger_sequence(&sub)?));
        }
        BlockKind::EntityAliases => {
            let entity = cur.guid()?;
            let path_word = cur.u32()?;
            let path_len = cur.u32()?;
            raw.aliases.push((entity, read_path(view, path_word, path_len)?));
        }
    }
    Ok(())
}

/// `{entity, sub_offset, sub_words}` to a view rooted at the sub-block.
fn read_sub_block<'a>(
    view: &ByteView<'a>,
    cur: &mut RecordCursor<'_>,
) -> Result<(ShortGuid, ByteView<'a>)> {
    let entity = cur.guid()?;
    let word = cur.u32()?;
    let words = cur.u32()?;
    let len = (words as usize)
        .checked_mul(WORD as usize)
        .ok_or_else(|| Error::invalid(format!("Sub-block of {} is too large", entity)))?;
    Ok((entity, view.sub(word_to_pos(word), len)?))
}

// ============================================================================
// Phase 2: reconciliation
// ============================================================================

fn reconcile(raw: RawComposite, pool: &HashMap<u32, ParameterData>) -> Result<Composite> {
    // Encode always writes a checksum record, so an override without one
    // falls back to its path hash and will not re-encode byte for byte.
    let stored: HashSet<ShortGuid> = raw.checksums.iter().map(|(id, _)| *id).collect();
    let unchecked = raw.overrides.iter().filter(|(id, _)| !stored.contains(id)).count();
    if unchecked > 0 {
        debug!(
            "Composite {}: {} overrides without a stored checksum, using path hashes",
            raw.id, unchecked
        );
    }

    let mut composite = Composite::new(raw.id, raw.name);
    composite.unknown = raw.unknown;

    // Declared entities.
    for (id, variable) in raw.variables {
        composite.insert_entity(Entity::new(id, EntityKind::Variable(variable)))?;
    }
    for (id, function) in raw.functions {
        composite.insert_entity(Entity::new(id, EntityKind::Function(FunctionEntity::new(function))))?;
    }
    for (id, path) in raw.overrides {
        composite.insert_entity(Entity::new(id, EntityKind::Override(OverrideEntity::new(path))))?;
    }
    for (id, proxy) in raw.proxies {
        composite.insert_entity(Entity::new(id, EntityKind::Proxy(proxy)))?;
    }
    for (id, path) in raw.aliases {
        composite.insert_entity(Entity::new(id, EntityKind::Alias(AliasEntity { path })))?;
    }

    // Stored checksums win over the computed ones.
    for (id, checksum) in raw.checksums {
        let target = composite
            .entity_mut(id)
            .and_then(|e| e.as_override_mut())
            .ok_or_else(|| Error::invalid(format!("Checksum for non-override entity {}", id)))?;
        target.checksum = checksum;
    }

    for (id, links) in raw.links {
        for link in &links {
            materialize(&mut composite, link.target_entity, "link target");
        }
        materialize(&mut composite, id, "link owner");
        composite.ensure_entity(id).links.extend(links);
    }

    for (id, params) in raw.parameters {
        materialize(&mut composite, id, "parameter owner");
        let entity = composite.ensure_entity(id);
        for param in params {
            let data = pool.get(&param.pool_word).cloned().ok_or_else(|| {
                Error::invalid(format!(
                    "Parameter {} on {} points at word {} outside the pool",
                    param.name, id, param.pool_word
                ))
            })?;
            entity.set_parameter(Parameter::with_usage(param.name, data, param.usage));
        }
    }

    composite.sort_entities();
    attach_resources(&mut composite, raw.resources);

    let mut timelines = HashSet::new();
    for (id, track) in raw.animations {
        attach_timeline(
            &mut composite,
            &mut timelines,
            id,
            FunctionType::CAGEAnimation,
            Timeline::Animation(track),
        )?;
    }
    for (id, seq) in raw.trigger_sequences {
        attach_timeline(
            &mut composite,
            &mut timelines,
            id,
            FunctionType::TriggerSequence,
            Timeline::TriggerSequence(seq),
        )?;
    }

    Ok(composite)
}

/// Create a placeholder for an id no block declares.
fn materialize(composite: &mut Composite, id: ShortGuid, role: &str) {
    if !composite.contains(id) {
        warn!(
            "Composite {}: {} {} is not declared, adding placeholder",
            composite.id, role, id
        );
        composite.ensure_entity(id);
    }
}

/// Give every reference exactly one owner: the function entity with that
/// id, else the first `resource` parameter holding that id, else the
/// composite.
fn attach_resources(composite: &mut Composite, resources: Vec<ResourceReference>) {
    let resource_name = ShortGuid::from_name(RESOURCE_PARAMETER);
    let mut fallback = 0usize;

    for reference in resources {
        let owner = reference.resource_id;
        if let Some(function) = composite.entity_mut(owner).and_then(|e| e.as_function_mut()) {
            function.resources.push(reference);
            continue;
        }

        let holder = composite.entities_mut().find_map(|e| {
            e.parameter_mut(resource_name).and_then(|p| match &mut p.data {
                ParameterData::Resource { resource_id, references } if *resource_id == owner => {
                    Some(references)
                }
                _ => None,
            })
        });
        match holder {
            Some(references) => references.push(reference),
            None => {
                fallback += 1;
                composite.resources.push(reference);
            }
        }
    }

    if fallback > 0 {
        debug!(
            "Composite {}: {} resource references kept at composite level",
            composite.id, fallback
        );
    }
}

/// Each function takes at most one timeline record.
fn attach_timeline(
    composite: &mut Composite,
    attached: &mut HashSet<ShortGuid>,
    id: ShortGuid,
    expected: FunctionType,
    timeline: Timeline,
) -> Result<()> {
    if !attached.insert(id) {
        return Err(Error::invalid(format!(
            "Composite {}: second {} timeline record for {}",
            composite.id, expected, id
        )));
    }
    let function = composite
        .entity_mut(id)
        .and_then(|e| e.as_function_mut())
        .filter(|f| f.function == expected.id())
        .ok_or_else(|| {
            Error::invalid(format!("Timeline data for {} which is not a {}", id, expected))
        })?;
    function.timeline = timeline;
    Ok(())
}

/// Every function must call a built-in or a composite of this archive.
fn validate_function_types(commands: &Commands) -> Result<()> {
    let composite_ids: HashSet<ShortGuid> = commands.composites().iter().map(|c| c.id).collect();
    for composite in commands.composites() {
        for entity in composite.functions() {
            let Some(function) = entity.as_function() else { continue };
            let known = FunctionType::from_id(function.function).is_some()
                || composite_ids.contains(&function.function);
            if !known {
                return Err(Error::UnknownFunctionType {
                    composite: composite.id,
                    entity: entity.id,
                    function: function.function,
                });
            }
        }
    }
    Ok(())
}

fn register_names(commands: &Commands, cache: &GuidCache) {
    for composite in commands.composites() {
        cache.insert(&composite.name, composite.id);
        for entity in composite.entities() {
            for param in &entity.parameters {
                match &param.data {
                    ParameterData::String(s) | ParameterData::EnumString { value: s, .. } => {
                        cache.generate(s);
                    }
                    _ => {}
                }
            }
        }
    }
    trace!("Name cache holds {} entries", cache.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_too_short() {
        let bytes = [0u8; 16];
        let view = ByteView::new(&bytes);
        assert!(matches!(PakHeader::parse(&view), Err(Error::UnexpectedEof(16))));
    }

    #[test]
    fn test_header_fields() {
        let words: [u32; 8] = [1, 2, 3, 10, 4, 20, 5, 0];
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let header = PakHeader::parse(&ByteView::new(&bytes)).unwrap();
        assert_eq!(header.entry_points[2], ShortGuid::new(3));
        assert_eq!(header.pool_table, (10, 4));
        assert_eq!(header.composite_table, (20, 5));
    }

    #[test]
    fn test_resource_tiers() {
        let mut c = Composite::from_name("Res");
        let func_id = ShortGuid::from_name("Model");
        c.add_function(func_id, FunctionType::ModelReference.id()).unwrap();
        let holder = ShortGuid::from_name("Holder");
        let res_id = ShortGuid::new(0x1234);
        c.add_function(holder, FunctionType::Door.id())
            .unwrap()
            .add_parameter(
                ShortGuid::from_name(RESOURCE_PARAMETER),
                ParameterData::resource(res_id),
                ParameterUsage::Input,
            );

        attach_resources(
            &mut c,
            vec![
                ResourceReference::renderable(func_id, 0, 1),
                ResourceReference::new(ResourceKind::CollisionMapping, res_id),
                ResourceReference::new(ResourceKind::NavMeshBarrierResource, ShortGuid::new(9)),
            ],
        );

        assert_eq!(c.entity(func_id).unwrap().as_function().unwrap().resources.len(), 1);
        let param = c.entity(holder).unwrap().parameter(ShortGuid::from_name("resource")).unwrap();
        match &param.data {
            ParameterData::Resource { references, .. } => assert_eq!(references.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c.resources.len(), 1);
        assert_eq!(c.resources[0].resource_id, ShortGuid::new(9));
    }

    #[test]
    fn test_timeline_requires_matching_function() {
        let mut c = Composite::from_name("T");
        let id = ShortGuid::from_name("Seq");
        c.add_function(id, FunctionType::Door.id()).unwrap();
        let err = attach_timeline(
            &mut c,
            &mut HashSet::new(),
            id,
            FunctionType::TriggerSequence,
            Timeline::TriggerSequence(TriggerSequence::default()),
        )
        .unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_second_timeline_record_rejected() {
        let mut c = Composite::from_name("T");
        let id = ShortGuid::from_name("Seq");
        c.add_function(id, FunctionType::TriggerSequence.id()).unwrap();
        let mut attached = HashSet::new();
        let seq = || Timeline::TriggerSequence(TriggerSequence::default());

        attach_timeline(&mut c, &mut attached, id, FunctionType::TriggerSequence, seq()).unwrap();
        let err = attach_timeline(&mut c, &mut attached, id, FunctionType::TriggerSequence, seq())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStructure(_)));
    }
}
