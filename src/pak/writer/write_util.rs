//! Writing utilities shared by the archive and timeline encoders.

use std::io::{Seek, Write};

use super::stream::OStream;
use crate::core::{AnimationTrack, EntityPath, ParameterData, TriggerSequence};
use crate::pak::format::{ANIM_TABLE_WORDS, TRIGGER_TABLE_WORDS, WORD};
use crate::util::{Error, Result};

/// Convert a length to a stored count.
pub(crate) fn count_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::invalid(format!("Count {} exceeds u32", len)))
}

/// Write a NUL-terminated, word-padded string at the current position.
///
/// Returns `(word offset, byte length)`.
pub(crate) fn write_string<W: Write + Seek>(out: &mut OStream<W>, s: &str) -> Result<(u32, u32)> {
    let word = out.word()?;
    out.write_bytes(s.as_bytes())?;
    out.write_bytes(&[0])?;
    out.align()?;
    Ok((word, count_u32(s.len())?))
}

/// Write a path with its terminator at the current position.
///
/// Returns `(word offset, stored length)`.
pub(crate) fn write_path<W: Write + Seek>(out: &mut OStream<W>, path: &EntityPath) -> Result<(u32, u32)> {
    let word = out.word()?;
    for id in path.stored_ids() {
        out.write_guid(id)?;
    }
    Ok((word, count_u32(path.stored_len())?))
}

/// Write one pool entry: type tag then payload.
pub(crate) fn write_pool_entry<W: Write + Seek>(out: &mut OStream<W>, data: &ParameterData) -> Result<()> {
    out.write_guid(data.data_type().tag())?;
    match data {
        ParameterData::Transform(t) => out.write_transform(t),
        ParameterData::Integer(v) => out.write_i32(*v),
        ParameterData::Float(v) => out.write_f32(*v),
        ParameterData::Bool(v) => out.write_u32(u32::from(*v)),
        ParameterData::String(s) => {
            out.write_u32(count_u32(s.len())?)?;
            out.write_bytes(s.as_bytes())?;
            out.write_bytes(&[0])?;
            out.align()
        }
        ParameterData::Vector(v) => out.write_vec3(*v),
        ParameterData::Enum { enum_type, index } => {
            out.write_guid(*enum_type)?;
            out.write_i32(*index)
        }
        ParameterData::EnumString { enum_type, value } => {
            out.write_guid(*enum_type)?;
            out.write_u32(count_u32(value.len())?)?;
            out.write_bytes(value.as_bytes())?;
            out.write_bytes(&[0])?;
            out.align()
        }
        ParameterData::Spline(points) => {
            out.write_u32(count_u32(points.len())?)?;
            for point in points {
                out.write_transform(point)?;
            }
            Ok(())
        }
        ParameterData::Resource { resource_id, .. } => out.write_guid(*resource_id),
    }
}

// ============================================================================
// Timeline sub-blocks
// ============================================================================

/// Patch a sub-block's `(offset, count)` table, then return to the end.
fn patch_table<W: Write + Seek>(out: &mut OStream<W>, table: &[(u32, u32)]) -> Result<()> {
    out.seek(0)?;
    for pair in table {
        out.write_pair(*pair)?;
    }
    out.seek_end()?;
    Ok(())
}

/// Build an animation sub-block. Offsets inside are relative to its start.
pub(crate) fn encode_animation(track: &AnimationTrack) -> Result<Vec<u8>> {
    let mut out = OStream::memory();
    out.write_bytes(&[0u8; ANIM_TABLE_WORDS * WORD as usize])?;

    let mut paths = Vec::with_capacity(track.headers.len());
    for header in &track.headers {
        paths.push(write_path(&mut out, &header.connected_entity)?);
    }
    let headers_word = out.word()?;
    for (header, (path_word, path_len)) in track.headers.iter().zip(paths) {
        out.write_guid(header.id)?;
        out.write_guid(header.parameter)?;
        out.write_u32(header.track_kind)?;
        out.write_guid(header.keyframe_set)?;
        out.write_u32(path_word)?;
        out.write_u32(path_len)?;
        out.write_u32(header.unknown)?;
    }

    let mut keyframe_lists = Vec::with_capacity(track.keyframe_sets.len());
    for set in &track.keyframe_sets {
        let word = out.word()?;
        for kf in &set.keyframes {
            out.write_f32(kf.time)?;
            out.write_f32(kf.value)?;
            out.write_f32(kf.tangent_in)?;
            out.write_f32(kf.tangent_out)?;
            out.write_u32(kf.flags)?;
        }
        keyframe_lists.push((word, count_u32(set.keyframes.len())?));
    }
    let sets_word = out.word()?;
    for (set, list) in track.keyframe_sets.iter().zip(keyframe_lists) {
        out.write_guid(set.id)?;
        out.write_f32(set.min_value)?;
        out.write_f32(set.max_value)?;
        out.write_pair(list)?;
    }

    let mut event_lists = Vec::with_capacity(track.event_sets.len());
    for set in &track.event_sets {
        let word = out.word()?;
        for ev in &set.keyframes {
            out.write_f32(ev.time)?;
            out.write_guid(ev.forward_event)?;
            out.write_guid(ev.reverse_event)?;
            out.write_u32(ev.unknown)?;
        }
        event_lists.push((word, count_u32(set.keyframes.len())?));
    }
    let events_word = out.word()?;
    for (set, list) in track.event_sets.iter().zip(event_lists) {
        out.write_guid(set.id)?;
        out.write_pair(list)?;
    }

    patch_table(
        &mut out,
        &[
            (headers_word, count_u32(track.headers.len())?),
            (sets_word, count_u32(track.keyframe_sets.len())?),
            (events_word, count_u32(track.event_sets.len())?),
        ],
    )?;
    Ok(out.into_bytes())
}

/// Build a trigger-sequence sub-block.
pub(crate) fn encode_trigger_sequence(seq: &TriggerSequence) -> Result<Vec<u8>> {
    let mut out = OStream::memory();
    out.write_bytes(&[0u8; TRIGGER_TABLE_WORDS * WORD as usize])?;

    let mut paths = Vec::with_capacity(seq.triggers.len());
    for trigger in &seq.triggers {
        paths.push(write_path(&mut out, &trigger.path)?);
    }
    let triggers_word = out.word()?;
    for (trigger, path) in seq.triggers.iter().zip(paths) {
        out.write_f32(trigger.timing)?;
        out.write_pair(path)?;
    }

    let events_word = out.word()?;
    for event in &seq.events {
        out.write_guid(event.event)?;
        out.write_guid(event.start_event)?;
        out.write_guid(event.end_event)?;
    }

    patch_table(
        &mut out,
        &[
            (triggers_word, count_u32(seq.triggers.len())?),
            (events_word, count_u32(seq.events.len())?),
        ],
    )?;
    Ok(out.into_bytes())
}
