//! Built-in function types.
//!
//! Function entities invoke either one of these engine functions or another
//! composite of the same archive. Ids are `ShortGuid::from_name(name)`.

use std::fmt;

use crate::guid::ShortGuid;

macro_rules! define_function_types {
    ($($variant:ident => ($name:literal, $id:literal),)*) => {
        /// Engine function a [`FunctionEntity`](super::FunctionEntity) can invoke.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum FunctionType {
            $($variant,)*
        }

        impl FunctionType {
            /// Every built-in function type.
            pub const ALL: &'static [FunctionType] = &[$(FunctionType::$variant,)*];

            /// Engine name of the function.
            pub const fn name(self) -> &'static str {
                match self {
                    $(FunctionType::$variant => $name,)*
                }
            }

            /// Stored id of the function.
            pub const fn id(self) -> ShortGuid {
                match self {
                    $(FunctionType::$variant => ShortGuid::new($id),)*
                }
            }

            /// Look up a stored function id.
            pub fn from_id(id: ShortGuid) -> Option<FunctionType> {
                match id.value() {
                    $($id => Some(FunctionType::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_function_types! {
    CAGEAnimation => ("CAGEAnimation", 0x20EE4CF2),
    TriggerSequence => ("TriggerSequence", 0x7EAE9BF4),
    Zone => ("Zone", 0x724DD8E4),
    ZoneLink => ("ZoneLink", 0xB01C1C35),
    ZoneExclusionLink => ("ZoneExclusionLink", 0x71C82F06),
    ZoneLoaded => ("ZoneLoaded", 0xB2F8A6BD),
    ScriptVariable => ("ScriptVariable", 0x95FD9140),
    EntityMethodInterface => ("EntityMethodInterface", 0x67460DA7),
    Character => ("Character", 0xF7E6471B),
    Door => ("Door", 0xEDDA5A13),
    LogicGate => ("LogicGate", 0x987CA4A5),
    LogicAll => ("LogicAll", 0x0AC56947),
    LogicOnce => ("LogicOnce", 0xBE4F270D),
    LogicSwitch => ("LogicSwitch", 0x52156148),
    Counter => ("Counter", 0xC1ED9682),
    Delay => ("Delay", 0xF502FDA7),
    Checkpoint => ("Checkpoint", 0xCBEA4D38),
    FloatAdd => ("FloatAdd", 0x16A1A211),
    FloatMultiply => ("FloatMultiply", 0x14273C9C),
    FloatCompare => ("FloatCompare", 0x537C695A),
    IntegerAdd => ("IntegerAdd", 0xEE5C3AE7),
    VariableBool => ("VariableBool", 0x21EA65D5),
    VariableInt => ("VariableInt", 0x957B9F80),
    VariableFloat => ("VariableFloat", 0x7005EA85),
    VariableString => ("VariableString", 0x6207151B),
    VariableVector => ("VariableVector", 0x85B140D1),
    VariableEnum => ("VariableEnum", 0x3F0CD2DC),
    VariableFilterObject => ("VariableFilterObject", 0xBF57A074),
    ModelReference => ("ModelReference", 0x20BD68D5),
    EnvironmentModelReference => ("EnvironmentModelReference", 0x2777DDDB),
    PhysicsSystem => ("PhysicsSystem", 0xBDCBCF01),
    CollisionBarrier => ("CollisionBarrier", 0xF48E7572),
    NavMeshBarrier => ("NavMeshBarrier", 0x57CFC4F2),
    PlayerTriggerBox => ("PlayerTriggerBox", 0xCE8EAAAA),
    TriggerSimple => ("TriggerSimple", 0x602BD5E6),
    SoundObject => ("SoundObject", 0xBA4EB6F5),
    Sound => ("Sound", 0xF1F1EE6A),
    LightReference => ("LightReference", 0xFCE290E6),
    ParticleEmitterReference => ("ParticleEmitterReference", 0x3D42B434),
    CameraShake => ("CameraShake", 0xA3562253),
    ObjectiveManager => ("ObjectiveManager", 0xDE1EE4DE),
    SetPosition => ("SetPosition", 0x15192263),
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
