//! Low-level archive reading utilities.
//!
//! Everything here works on a bounds-checked [`ByteView`]. Timeline
//! sub-blocks get their own view so that their relative offsets resolve
//! against the sub-block start.

use byteorder::{ByteOrder, LittleEndian};

use super::format::*;
use crate::core::{
    AnimationTrack, DataType, EntityPath, EventKeyframe, EventSet, Keyframe, KeyframeHeader,
    KeyframeSet, ParameterData, Transform, Trigger, TriggerEvent, TriggerSequence,
};
use crate::guid::ShortGuid;
use crate::util::{Error, Result, Vec3};

/// Bounds-checked view over archive bytes.
#[derive(Clone, Copy)]
pub(crate) struct ByteView<'a> {
    data: &'a [u8],
}

impl<'a> ByteView<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Borrow `len` bytes at `pos`.
    pub fn slice(&self, pos: u64, len: usize) -> Result<&'a [u8]> {
        let end = pos
            .checked_add(len as u64)
            .ok_or(Error::UnexpectedEof(u64::MAX))?;
        if end > self.len() {
            return Err(Error::UnexpectedEof(end));
        }
        Ok(&self.data[pos as usize..end as usize])
    }

    /// Sub-view whose position 0 is `pos` here.
    pub fn sub(&self, pos: u64, len: usize) -> Result<ByteView<'a>> {
        Ok(ByteView::new(self.slice(pos, len)?))
    }

    pub fn u32_at(&self, pos: u64) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.slice(pos, 4)?))
    }

    /// Cursor over `count` records of `size` bytes starting at `word`.
    ///
    /// The whole range is checked up front so a corrupt count cannot make
    /// us allocate or loop past the end of the stream.
    pub fn records(&self, word: u32, count: u32, size: usize) -> Result<RecordCursor<'a>> {
        let pos = word_to_pos(word);
        let total = (count as usize)
            .checked_mul(size)
            .ok_or_else(|| Error::invalid(format!("Record count {} overflows", count)))?;
        self.slice(pos, total)?;
        Ok(RecordCursor { view: *self, pos })
    }
}

/// Sequential little-endian reader over a [`ByteView`].
pub(crate) struct RecordCursor<'a> {
    view: ByteView<'a>,
    pos: u64,
}

impl<'a> RecordCursor<'a> {
    pub fn u32(&mut self) -> Result<u32> {
        let v = self.view.u32_at(self.pos)?;
        self.pos += WORD;
        Ok(v)
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(self.u32()? as i32)
    }

    pub fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.u32()?))
    }

    pub fn guid(&mut self) -> Result<ShortGuid> {
        Ok(ShortGuid::new(self.u32()?))
    }

    pub fn vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }

    pub fn transform(&mut self) -> Result<Transform> {
        Ok(Transform::new(self.vec3()?, self.vec3()?))
    }

    /// Read a length-prefixed inline string and skip its padding.
    pub fn inline_string(&mut self) -> Result<String> {
        let len = self.u32()? as usize;
        let bytes = self.view.slice(self.pos, len)?;
        let s = String::from_utf8(bytes.to_vec())?;
        self.pos += padded_string_len(len) as u64;
        Ok(s)
    }
}

/// Read a string stored at `word` with `len` bytes.
pub(crate) fn read_string(view: &ByteView<'_>, word: u32, len: u32) -> Result<String> {
    if len == 0 {
        return Ok(String::new());
    }
    let bytes = view.slice(word_to_pos(word), len as usize)?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// Read a path of `len` stored ids (terminator included) at `word`.
pub(crate) fn read_path(view: &ByteView<'_>, word: u32, len: u32) -> Result<EntityPath> {
    let mut cursor = view.records(word, len, WORD as usize)?;
    let mut ids = Vec::with_capacity(len as usize);
    for _ in 0..len {
        ids.push(cursor.guid()?);
    }
    if ids.pop() != Some(ShortGuid::INVALID) {
        return Err(Error::invalid(format!(
            "Path at word {} is not terminated",
            word
        )));
    }
    Ok(EntityPath::from_slice(&ids))
}

// ============================================================================
// Parameter pool
// ============================================================================

/// Decode one pooled value at `word`.
pub(crate) fn read_pool_entry(view: &ByteView<'_>, word: u32) -> Result<ParameterData> {
    let mut cur = view.records(word, 1, WORD as usize)?;
    let tag = cur.guid()?;
    let data_type = DataType::from_tag(tag)?;

    let data = match data_type {
        DataType::Transform => ParameterData::Transform(cur.transform()?),
        DataType::Integer => ParameterData::Integer(cur.i32()?),
        DataType::Float => ParameterData::Float(cur.f32()?),
        DataType::Bool => match cur.u32()? {
            0 => ParameterData::Bool(false),
            1 => ParameterData::Bool(true),
            other => {
                return Err(Error::invalid(format!(
                    "Bool value {} at word {}",
                    other, word
                )))
            }
        },
        DataType::String => ParameterData::String(cur.inline_string()?),
        DataType::Vector => ParameterData::Vector(cur.vec3()?),
        DataType::Enum => ParameterData::Enum {
            enum_type: cur.guid()?,
            index: cur.i32()?,
        },
        DataType::EnumString => ParameterData::EnumString {
            enum_type: cur.guid()?,
            value: cur.inline_string()?,
        },
        DataType::Spline => {
            let count = cur.u32()?;
            // Bound the count against the remaining bytes before reserving.
            let first = word_to_pos(word) + 2 * WORD;
            view.slice(first, (count as usize).saturating_mul(TRANSFORM_SIZE))?;
            let mut points = Vec::with_capacity(count as usize);
            for _ in 0..count {
                points.push(cur.transform()?);
            }
            ParameterData::Spline(points)
        }
        DataType::Resource => ParameterData::resource(cur.guid()?),
        DataType::Object | DataType::None => {
            return Err(Error::invalid(format!(
                "Pooled value at word {} has non-value type {}",
                word, data_type
            )))
        }
    };
    Ok(data)
}

// ============================================================================
// Timeline sub-blocks
// ============================================================================

/// Read the `(relative offset, count)` table at the start of a sub-block.
fn read_sub_table<const N: usize>(sub: &ByteView<'_>) -> Result<[(u32, u32); N]> {
    let mut cur = sub.records(0, N as u32, 8)?;
    let mut table = [(0u32, 0u32); N];
    for entry in table.iter_mut() {
        *entry = (cur.u32()?, cur.u32()?);
    }
    Ok(table)
}

/// Decode an animation sub-block.
pub(crate) fn read_animation(sub: &ByteView<'_>) -> Result<AnimationTrack> {
    let [headers, sets, events] = read_sub_table::<3>(sub)?;
    let mut track = AnimationTrack::default();

    let mut cur = sub.records(headers.0, headers.1, ANIM_HEADER_SIZE)?;
    for _ in 0..headers.1 {
        let id = cur.guid()?;
        let parameter = cur.guid()?;
        let track_kind = cur.u32()?;
        let keyframe_set = cur.guid()?;
        let path_word = cur.u32()?;
        let path_len = cur.u32()?;
        let unknown = cur.u32()?;
        track.headers.push(KeyframeHeader {
            id,
            parameter,
            track_kind,
            keyframe_set,
            connected_entity: read_path(sub, path_word, path_len)?,
            unknown,
        });
    }

    let mut cur = sub.records(sets.0, sets.1, KEYFRAME_SET_SIZE)?;
    for _ in 0..sets.1 {
        let id = cur.guid()?;
        let min_value = cur.f32()?;
        let max_value = cur.f32()?;
        let kf_word = cur.u32()?;
        let kf_count = cur.u32()?;

        let mut kf = sub.records(kf_word, kf_count, KEYFRAME_SIZE)?;
        let mut keyframes = Vec::with_capacity(kf_count as usize);
        for _ in 0..kf_count {
            keyframes.push(Keyframe {
                time: kf.f32()?,
                value: kf.f32()?,
                tangent_in: kf.f32()?,
                tangent_out: kf.f32()?,
                flags: kf.u32()?,
            });
        }
        track.keyframe_sets.push(KeyframeSet { id, min_value, max_value, keyframes });
    }

    let mut cur = sub.records(events.0, events.1, EVENT_SET_SIZE)?;
    for _ in 0..events.1 {
        let id = cur.guid()?;
        let ev_word = cur.u32()?;
        let ev_count = cur.u32()?;

        let mut ev = sub.records(ev_word, ev_count, EVENT_KEYFRAME_SIZE)?;
        let mut keyframes = Vec::with_capacity(ev_count as usize);
        for _ in 0..ev_count {
            keyframes.push(EventKeyframe {
                time: ev.f32()?,
                forward_event: ev.guid()?,
                reverse_event: ev.guid()?,
                unknown: ev.u32()?,
            });
        }
        track.event_sets.push(EventSet { id, keyframes });
    }

    Ok(track)
}

/// Decode a trigger-sequence sub-block.
pub(crate) fn read_trigger_sequence(sub: &ByteView<'_>) -> Result<TriggerSequence> {
    let [triggers, events] = read_sub_table::<2>(sub)?;
    let mut seq = TriggerSequence::default();

    let mut cur = sub.records(triggers.0, triggers.1, TRIGGER_SIZE)?;
    for _ in 0..triggers.1 {
        let timing = cur.f32()?;
        let path_word = cur.u32()?;
        let path_len = cur.u32()?;
        seq.triggers.push(Trigger { timing, path: read_path(sub, path_word, path_len)? });
    }

    let mut cur = sub.records(events.0, events.1, TRIGGER_EVENT_SIZE)?;
    for _ in 0..events.1 {
        seq.events.push(TriggerEvent {
            event: cur.guid()?,
            start_event: cur.guid()?,
            end_event: cur.guid()?,
        });
    }

    Ok(seq)
}
