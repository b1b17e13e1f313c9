//! Timeline data carried by `CAGEAnimation` and `TriggerSequence` functions.

use super::EntityPath;
use crate::guid::ShortGuid;

/// One animated float channel key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    pub tangent_in: f32,
    pub tangent_out: f32,
    /// Interpolation flags, not decoded.
    pub flags: u32,
}

/// Keyframes sharing one value range.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeSet {
    pub id: ShortGuid,
    pub min_value: f32,
    pub max_value: f32,
    pub keyframes: Vec<Keyframe>,
}

/// Binds a keyframe set to a parameter on some (possibly nested) entity.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeHeader {
    pub id: ShortGuid,
    pub parameter: ShortGuid,
    pub track_kind: u32,
    pub keyframe_set: ShortGuid,
    pub connected_entity: EntityPath,
    pub unknown: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventKeyframe {
    pub time: f32,
    pub forward_event: ShortGuid,
    pub reverse_event: ShortGuid,
    pub unknown: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EventSet {
    pub id: ShortGuid,
    pub keyframes: Vec<EventKeyframe>,
}

/// Timeline of a `CAGEAnimation` entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationTrack {
    pub headers: Vec<KeyframeHeader>,
    pub keyframe_sets: Vec<KeyframeSet>,
    pub event_sets: Vec<EventSet>,
}

impl AnimationTrack {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.keyframe_sets.is_empty() && self.event_sets.is_empty()
    }
}

/// Fires the entity at `path` after `timing` seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Trigger {
    pub timing: f32,
    pub path: EntityPath,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerEvent {
    pub event: ShortGuid,
    pub start_event: ShortGuid,
    pub end_event: ShortGuid,
}

/// Timeline of a `TriggerSequence` entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerSequence {
    pub triggers: Vec<Trigger>,
    pub events: Vec<TriggerEvent>,
}

impl TriggerSequence {
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty() && self.events.is_empty()
    }
}

/// Timeline slot of a function entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Timeline {
    #[default]
    None,
    Animation(AnimationTrack),
    TriggerSequence(TriggerSequence),
}

impl Timeline {
    /// True when there is nothing to write for this entity.
    pub fn is_empty(&self) -> bool {
        match self {
            Timeline::None => true,
            Timeline::Animation(track) => track.is_empty(),
            Timeline::TriggerSequence(seq) => seq.is_empty(),
        }
    }

    pub fn as_animation(&self) -> Option<&AnimationTrack> {
        match self {
            Timeline::Animation(track) => Some(track),
            _ => None,
        }
    }

    pub fn as_trigger_sequence(&self) -> Option<&TriggerSequence> {
        match self {
            Timeline::TriggerSequence(seq) => Some(seq),
            _ => None,
        }
    }
}
