//! Archive encoding.
//!
//! Everything is written in a single pass. Indirect data (names, link and
//! parameter lists, paths, timeline sub-blocks) goes out before the records
//! that point at it, so every offset is known when its record is written.
//! Only the header's two table pairs are patched afterwards.

use std::io::{Seek, Write};
use std::path::Path;

use tracing::{debug, trace};

use super::pool::ParameterPool;
use super::stream::OStream;
use super::write_util::*;
use crate::core::{
    Commands, Composite, Entity, EntityKind, FunctionType, ParameterData, ResourceReference,
    Timeline, RESOURCE_PARAMETER,
};
use crate::guid::ShortGuid;
use crate::pak::format::*;
use crate::pak::options::WriteOptions;
use crate::util::{Error, Result};

impl Commands {
    /// Write the archive to a file with default options.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_opts(path, &WriteOptions::default())
    }

    pub fn save_opts(&self, path: impl AsRef<Path>, opts: &WriteOptions) -> Result<()> {
        let path = path.as_ref();
        debug!("Saving {}", path.display());
        let mut out = OStream::create(path)?;
        encode(self, opts, &mut out)?;
        out.flush()
    }

    /// Encode the archive into memory with default options.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_opts(&WriteOptions::default())
    }

    pub fn to_bytes_opts(&self, opts: &WriteOptions) -> Result<Vec<u8>> {
        let mut out = OStream::memory();
        encode(self, opts, &mut out)?;
        Ok(out.into_bytes())
    }
}

/// Encode a whole archive.
pub(crate) fn encode<W: Write + Seek>(
    commands: &Commands,
    opts: &WriteOptions,
    out: &mut OStream<W>,
) -> Result<()> {
    // Header placeholder; the table pairs are patched at the end.
    for id in commands.entry_points {
        out.write_guid(id)?;
    }
    out.write_bytes(&[0u8; HEADER_SIZE - NUM_ENTRY_POINTS * WORD as usize])?;

    let mut pool = ParameterPool::collect(commands);
    pool.write(out)?;

    let mut descriptors = Vec::with_capacity(commands.num_composites());
    for composite in commands.composites() {
        descriptors.push(write_composite(out, composite, &pool, opts)?);
    }

    let pool_table = (out.word()?, count_u32(pool.len())?);
    for word in pool.words() {
        out.write_u32(*word)?;
    }
    let composite_table = (out.word()?, count_u32(descriptors.len())?);
    for word in &descriptors {
        out.write_u32(*word)?;
    }

    out.seek(POOL_TABLE_POS)?;
    out.write_pair(pool_table)?;
    out.write_pair(composite_table)?;
    let size = out.seek_end()?;

    debug!(
        "Encoded {} composites, {} pooled values, {} bytes",
        descriptors.len(),
        pool.len(),
        size
    );
    Ok(())
}

/// Write one composite's blocks followed by its descriptor table.
///
/// Returns the descriptor table's word offset.
fn write_composite<W: Write + Seek>(
    out: &mut OStream<W>,
    composite: &Composite,
    pool: &ParameterPool,
    opts: &WriteOptions,
) -> Result<u32> {
    let mut entities: Vec<&Entity> = composite.entities().iter().collect();
    entities.sort_by_key(|e| e.id);

    let mut table = [(0u32, 0u32); NUM_BLOCKS];
    for kind in BlockKind::ALL {
        let block = write_block(out, kind, composite, &entities, pool, opts)?;
        trace!("Block {:?}: {} records at word {}", kind, block.1, block.0);
        table[kind as usize] = block;
    }

    let descriptor_word = out.word()?;
    for pair in table {
        out.write_pair(pair)?;
    }
    trace!("Composite {} descriptor table at word {}", composite.id, descriptor_word);
    Ok(descriptor_word)
}

/// Start a block of `count` records, returning its descriptor pair.
fn block_start<W: Write + Seek>(out: &OStream<W>, count: usize) -> Result<(u32, u32)> {
    if count == 0 {
        return Ok((0, 0));
    }
    Ok((out.word()?, count_u32(count)?))
}

fn write_block<W: Write + Seek>(
    out: &mut OStream<W>,
    kind: BlockKind,
    composite: &Composite,
    entities: &[&Entity],
    pool: &ParameterPool,
    opts: &WriteOptions,
) -> Result<(u32, u32)> {
    match kind {
        BlockKind::Header => {
            let (name_word, name_len) = write_string(out, &composite.name)?;
            let block = block_start(out, 1)?;
            out.write_guid(composite.id)?;
            out.write_pair((name_word, name_len))?;
            out.write_u32(composite.unknown[0])?;
            out.write_u32(composite.unknown[1])?;
            Ok(block)
        }

        BlockKind::EntityLinks => {
            let owners: Vec<&Entity> = entities.iter().copied().filter(|e| !e.links.is_empty()).collect();
            let mut lists = Vec::with_capacity(owners.len());
            for entity in &owners {
                let word = out.word()?;
                for link in &entity.links {
                    out.write_guid(link.id)?;
                    out.write_guid(link.source_parameter)?;
                    out.write_guid(link.target_entity)?;
                    out.write_guid(link.target_parameter)?;
                }
                lists.push((word, count_u32(entity.links.len())?));
            }
            let block = block_start(out, owners.len())?;
            for (entity, list) in owners.iter().zip(lists) {
                out.write_guid(entity.id)?;
                out.write_pair(list)?;
            }
            Ok(block)
        }

        BlockKind::EntityParameters => {
            let owners: Vec<&Entity> =
                entities.iter().copied().filter(|e| !e.parameters.is_empty()).collect();
            let mut lists = Vec::with_capacity(owners.len());
            for entity in &owners {
                let word = out.word()?;
                for param in &entity.parameters {
                    let pool_word = pool.word_of(&param.data).ok_or(Error::PoolEntryMissing {
                        entity: entity.id,
                        parameter: param.name,
                    })?;
                    out.write_guid(param.name)?;
                    out.write_u32(param.usage.to_u32())?;
                    out.write_u32(pool_word)?;
                }
                lists.push((word, count_u32(entity.parameters.len())?));
            }
            let block = block_start(out, owners.len())?;
            for (entity, list) in owners.iter().zip(lists) {
                out.write_guid(entity.id)?;
                out.write_pair(list)?;
            }
            Ok(block)
        }

        BlockKind::EntityOverrides | BlockKind::EntityAliases => {
            let owners: Vec<&Entity> = entities
                .iter()
                .copied()
                .filter(|e| match &e.kind {
                    EntityKind::Override(_) => kind == BlockKind::EntityOverrides,
                    EntityKind::Alias(_) => kind == BlockKind::EntityAliases,
                    _ => false,
                })
                .collect();
            let mut paths = Vec::with_capacity(owners.len());
            for entity in &owners {
                if let Some(path) = entity.path() {
                    paths.push(write_path(out, path)?);
                }
            }
            let block = block_start(out, owners.len())?;
            for (entity, path) in owners.iter().zip(paths) {
                out.write_guid(entity.id)?;
                out.write_pair(path)?;
            }
            Ok(block)
        }

        BlockKind::OverrideChecksums => {
            let overrides: Vec<_> = entities
                .iter()
                .filter_map(|e| e.as_override().map(|o| (e.id, o)))
                .collect();
            let block = block_start(out, overrides.len())?;
            for (id, o) in overrides {
                let checksum = if opts.refresh_override_checksums {
                    o.path.generate_path_hash()
                } else {
                    o.checksum
                };
                out.write_guid(id)?;
                out.write_guid(checksum)?;
            }
            Ok(block)
        }

        BlockKind::ExposedVariables => {
            let variables: Vec<_> = entities
                .iter()
                .filter_map(|e| e.as_variable().map(|v| (e.id, v)))
                .collect();
            let block = block_start(out, variables.len())?;
            for (id, v) in variables {
                out.write_guid(id)?;
                out.write_guid(v.parameter)?;
                out.write_guid(v.data_type.tag())?;
            }
            Ok(block)
        }

        BlockKind::EntityProxies => {
            let proxies: Vec<_> = entities
                .iter()
                .filter_map(|e| e.as_proxy().map(|p| (e.id, p)))
                .collect();
            let mut paths = Vec::with_capacity(proxies.len());
            for (_, proxy) in &proxies {
                paths.push(write_path(out, &proxy.path)?);
            }
            let block = block_start(out, proxies.len())?;
            for ((id, proxy), path) in proxies.iter().zip(paths) {
                out.write_guid(*id)?;
                out.write_guid(proxy.target_type)?;
                out.write_pair(path)?;
            }
            Ok(block)
        }

        BlockKind::EntityFunctions => {
            let functions: Vec<_> = entities
                .iter()
                .filter_map(|e| e.as_function().map(|f| (e.id, f.function)))
                .collect();
            let block = block_start(out, functions.len())?;
            for (id, function) in functions {
                out.write_guid(id)?;
                out.write_guid(function)?;
            }
            Ok(block)
        }

        BlockKind::ResourceReferences => {
            let references = collect_resources(composite, entities)?;
            let block = block_start(out, references.len())?;
            for r in references {
                out.write_vec3(r.position)?;
                out.write_vec3(r.rotation)?;
                out.write_guid(r.resource_id)?;
                out.write_guid(r.kind.tag())?;
                let (a, b) = r.payload.to_words();
                out.write_u32(a)?;
                out.write_u32(b)?;
            }
            Ok(block)
        }

        BlockKind::AnimationData | BlockKind::TriggerSequenceData => {
            let mut subs = Vec::new();
            for entity in entities {
                let Some(function) = entity.as_function() else { continue };
                let bytes = match (&function.timeline, kind) {
                    (Timeline::Animation(track), BlockKind::AnimationData) if !track.is_empty() => {
                        check_timeline_owner(entity, function.function, FunctionType::CAGEAnimation)?;
                        encode_animation(track)?
                    }
                    (Timeline::TriggerSequence(seq), BlockKind::TriggerSequenceData)
                        if !seq.is_empty() =>
                    {
                        check_timeline_owner(entity, function.function, FunctionType::TriggerSequence)?;
                        encode_trigger_sequence(seq)?
                    }
                    _ => continue,
                };
                let word = out.word()?;
                out.write_bytes(&bytes)?;
                subs.push((entity.id, word, count_u32(bytes.len() / WORD as usize)?));
            }
            let block = block_start(out, subs.len())?;
            for (id, word, words) in subs {
                out.write_guid(id)?;
                out.write_pair((word, words))?;
            }
            Ok(block)
        }
    }
}

/// Composite-level references, then function-owned, then parameter-owned.
fn collect_resources<'a>(
    composite: &'a Composite,
    entities: &[&'a Entity],
) -> Result<Vec<&'a ResourceReference>> {
    let resource_name = ShortGuid::from_name(RESOURCE_PARAMETER);
    let mut references = Vec::new();

    for r in &composite.resources {
        check_resource_holder(composite, entities, Holder::Composite, r)?;
        references.push(r);
    }
    for entity in entities {
        if let Some(function) = entity.as_function() {
            for r in &function.resources {
                check_resource_holder(composite, entities, Holder::Function(entity.id), r)?;
                references.push(r);
            }
        }
    }
    for entity in entities {
        for param in &entity.parameters {
            let ParameterData::Resource { references: owned, .. } = &param.data else { continue };
            // Only a `resource` parameter is searched when references are attached on decode.
            let holder = if param.name == resource_name {
                Holder::Parameter(entity.id)
            } else {
                Holder::Detached(entity.id)
            };
            for r in owned {
                check_resource_holder(composite, entities, holder, r)?;
                references.push(r);
            }
        }
    }
    Ok(references)
}

/// Where a resource reference lives in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Holder {
    Composite,
    Function(ShortGuid),
    Parameter(ShortGuid),
    /// A resource-typed parameter that is not named `resource`
    Detached(ShortGuid),
}

impl Holder {
    fn id(self, composite: &Composite) -> ShortGuid {
        match self {
            Holder::Composite => composite.id,
            Holder::Function(id) | Holder::Parameter(id) | Holder::Detached(id) => id,
        }
    }
}

/// The holder decoding assigns to a reference: the function with the
/// reference's id, else the first entity whose `resource` parameter has
/// that id, else the composite.
fn decoded_holder(entities: &[&Entity], resource_id: ShortGuid) -> Holder {
    if entities.iter().any(|e| e.id == resource_id && e.as_function().is_some()) {
        return Holder::Function(resource_id);
    }
    let resource_name = ShortGuid::from_name(RESOURCE_PARAMETER);
    entities
        .iter()
        .find(|e| {
            matches!(
                e.parameter(resource_name).map(|p| &p.data),
                Some(ParameterData::Resource { resource_id: id, .. }) if *id == resource_id
            )
        })
        .map_or(Holder::Composite, |e| Holder::Parameter(e.id))
}

fn check_resource_holder(
    composite: &Composite,
    entities: &[&Entity],
    holder: Holder,
    reference: &ResourceReference,
) -> Result<()> {
    if decoded_holder(entities, reference.resource_id) != holder {
        return Err(Error::MisplacedResource {
            composite: composite.id,
            holder: holder.id(composite),
            resource: reference.resource_id,
        });
    }
    Ok(())
}

/// Timeline data only decodes back onto a function of the matching type.
fn check_timeline_owner(
    entity: &Entity,
    function: ShortGuid,
    expected: FunctionType,
) -> Result<()> {
    if function != expected.id() {
        return Err(Error::invalid(format!(
            "Entity {} carries {} timeline data but calls {}",
            entity.id, expected, function
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityPath, ParameterUsage};
    use crate::guid::GuidCache;
    use crate::pak::options::ReadOptions;

    fn id(name: &str) -> ShortGuid {
        ShortGuid::from_name(name)
    }

    #[test]
    fn test_header_patched() {
        let mut commands = Commands::new();
        commands.add_composite(Composite::from_name("Only")).unwrap();
        commands.entry_points[0] = id("Only");

        let bytes = commands.to_bytes().unwrap();
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(&bytes[0..4], &id("Only").to_bytes());
        // No pooled values, one composite.
        assert_eq!(u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]), 0);
        assert_eq!(u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]), 1);
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_refresh_checksums() {
        let mut commands = Commands::new();
        let c = commands.add_composite(Composite::from_name("Ovr")).unwrap();
        let path = EntityPath::from_ids([id("Inner"), id("Target")]);
        let expected = path.generate_path_hash();
        c.add_override(id("O"), path).unwrap();
        if let Some(o) = c.entity_mut(id("O")).and_then(|e| e.as_override_mut()) {
            o.checksum = ShortGuid::new(1);
        }

        let cache = GuidCache::new();
        let opts = ReadOptions::default().with_function_validation(false);

        let kept = Commands::from_bytes_opts(&commands.to_bytes().unwrap(), &opts, &cache).unwrap();
        let o = kept.composites()[0].entity(id("O")).unwrap().as_override().unwrap();
        assert_eq!(o.checksum, ShortGuid::new(1));

        let bytes = commands
            .to_bytes_opts(&WriteOptions::new().with_refreshed_checksums(true))
            .unwrap();
        let refreshed = Commands::from_bytes_opts(&bytes, &opts, &cache).unwrap();
        let o = refreshed.composites()[0].entity(id("O")).unwrap().as_override().unwrap();
        assert_eq!(o.checksum, expected);
    }

    #[test]
    fn test_timeline_on_wrong_function_rejected() {
        let mut commands = Commands::new();
        let c = commands.add_composite(Composite::from_name("Bad")).unwrap();
        c.add_function(id("F"), FunctionType::Door.id()).unwrap();
        if let Some(f) = c.entity_mut(id("F")).and_then(|e| e.as_function_mut()) {
            f.timeline = Timeline::TriggerSequence(crate::core::TriggerSequence {
                triggers: Vec::new(),
                events: vec![crate::core::TriggerEvent {
                    event: ShortGuid::new(1),
                    start_event: ShortGuid::new(2),
                    end_event: ShortGuid::new(3),
                }],
            });
        }
        assert!(commands.to_bytes().unwrap_err().is_structural());
    }

    #[test]
    fn test_parameter_words_point_into_pool() {
        let mut commands = Commands::new();
        let c = commands.add_composite(Composite::from_name("P")).unwrap();
        c.add_function(id("F"), FunctionType::Door.id())
            .unwrap()
            .add_parameter(id("n"), ParameterData::Integer(42), ParameterUsage::Input);

        let bytes = commands.to_bytes().unwrap();
        // First pooled value sits right after the header.
        assert_eq!(&bytes[32..36], &crate::core::DataType::Integer.tag().to_bytes());
        assert_eq!(&bytes[36..40], &42i32.to_le_bytes());
    }
}
