//! Archive format constants and structures.

use crate::util::{Error, Result};

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 32;

/// Number of entry point ids at the start of the header.
pub const NUM_ENTRY_POINTS: usize = 3;

/// Offset of the parameter pool table `(offset, count)` pair.
pub const POOL_TABLE_POS: u64 = 12;

/// Offset of the composite table `(offset, count)` pair.
pub const COMPOSITE_TABLE_POS: u64 = 20;

/// Size of one stored word; every offset in the format counts words.
pub const WORD: u64 = 4;

/// Blocks of a composite, in the order they are written and decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Header = 0,
    EntityLinks = 1,
    EntityParameters = 2,
    EntityOverrides = 3,
    OverrideChecksums = 4,
    ExposedVariables = 5,
    EntityProxies = 6,
    EntityFunctions = 7,
    ResourceReferences = 8,
    AnimationData = 9,
    TriggerSequenceData = 10,
    EntityAliases = 11,
}

impl BlockKind {
    /// All block kinds in stored order.
    pub const ALL: [BlockKind; NUM_BLOCKS] = [
        BlockKind::Header,
        BlockKind::EntityLinks,
        BlockKind::EntityParameters,
        BlockKind::EntityOverrides,
        BlockKind::OverrideChecksums,
        BlockKind::ExposedVariables,
        BlockKind::EntityProxies,
        BlockKind::EntityFunctions,
        BlockKind::ResourceReferences,
        BlockKind::AnimationData,
        BlockKind::TriggerSequenceData,
        BlockKind::EntityAliases,
    ];

    /// Size of one record of this block in bytes.
    pub const fn record_size(self) -> usize {
        match self {
            BlockKind::Header => HEADER_RECORD_SIZE,
            BlockKind::EntityLinks => 12,
            BlockKind::EntityParameters => 12,
            BlockKind::EntityOverrides => 12,
            BlockKind::OverrideChecksums => 8,
            BlockKind::ExposedVariables => 12,
            BlockKind::EntityProxies => 16,
            BlockKind::EntityFunctions => 8,
            BlockKind::ResourceReferences => RESOURCE_RECORD_SIZE,
            BlockKind::AnimationData => 12,
            BlockKind::TriggerSequenceData => 12,
            BlockKind::EntityAliases => 12,
        }
    }
}

/// Number of `(offset, count)` descriptors per composite.
pub const NUM_BLOCKS: usize = 12;

/// Size of the composite descriptor table in bytes.
pub const DESCRIPTOR_TABLE_SIZE: usize = NUM_BLOCKS * 8;

/// `{id, name_offset, name_len, unknown0, unknown1}`.
pub const HEADER_RECORD_SIZE: usize = 20;

/// `{link_id, source_param, target_entity, target_param}`.
pub const LINK_ENTRY_SIZE: usize = 16;

/// `{name, usage, pool_offset}`.
pub const PARAMETER_ENTRY_SIZE: usize = 12;

/// `{position(3f), rotation(3f), resource_id, kind, a, b}`.
pub const RESOURCE_RECORD_SIZE: usize = 40;

/// Transform payload: position + rotation.
pub const TRANSFORM_SIZE: usize = 24;

// Animation sub-block.
pub const ANIM_TABLE_WORDS: usize = 6;
pub const ANIM_HEADER_SIZE: usize = 28;
pub const KEYFRAME_SET_SIZE: usize = 20;
pub const KEYFRAME_SIZE: usize = 20;
pub const EVENT_SET_SIZE: usize = 12;
pub const EVENT_KEYFRAME_SIZE: usize = 16;

// Trigger sequence sub-block.
pub const TRIGGER_TABLE_WORDS: usize = 4;
pub const TRIGGER_SIZE: usize = 12;
pub const TRIGGER_EVENT_SIZE: usize = 12;

/// Convert a stored word offset to a byte position.
#[inline]
pub const fn word_to_pos(word: u32) -> u64 {
    word as u64 * WORD
}

/// Convert a byte position to a stored word offset.
#[inline]
pub fn pos_to_word(pos: u64) -> Result<u32> {
    if pos % WORD != 0 {
        return Err(Error::Misaligned(pos));
    }
    u32::try_from(pos / WORD)
        .map_err(|_| Error::invalid(format!("Position {} beyond word range", pos)))
}

/// Bytes taken by a NUL-terminated string padded to a word boundary.
#[inline]
pub const fn padded_string_len(len: usize) -> usize {
    (len + 1).div_ceil(WORD as usize) * WORD as usize
}
