//! Parameter data types.
//!
//! The archive tags every pooled value and every exposed variable with the
//! ShortGuid of an upper-case type name. The tags below are
//! `ShortGuid::from_name(name)` for each name.

use std::fmt;

use crate::guid::ShortGuid;
use crate::util::{Error, Result};

/// Value type of a parameter or exposed variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Transform,
    Integer,
    Float,
    Bool,
    String,
    Vector,
    Enum,
    EnumString,
    Spline,
    Resource,
    /// Entity reference; only valid as a variable's declared type.
    Object,
    /// Untyped pin; only valid as a variable's declared type.
    None,
}

impl DataType {
    /// All data types in tag-table order.
    pub const ALL: [DataType; 12] = [
        DataType::Transform,
        DataType::Integer,
        DataType::Float,
        DataType::Bool,
        DataType::String,
        DataType::Vector,
        DataType::Enum,
        DataType::EnumString,
        DataType::Spline,
        DataType::Resource,
        DataType::Object,
        DataType::None,
    ];

    /// Name hashed to produce the tag.
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Transform => "TRANSFORM",
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Bool => "BOOL",
            DataType::String => "STRING",
            DataType::Vector => "VECTOR",
            DataType::Enum => "ENUM",
            DataType::EnumString => "ENUM_STRING",
            DataType::Spline => "SPLINE",
            DataType::Resource => "RESOURCE",
            DataType::Object => "OBJECT",
            DataType::None => "NONE",
        }
    }

    /// Stored type tag.
    pub const fn tag(self) -> ShortGuid {
        ShortGuid::new(match self {
            DataType::Transform => 0xD70659A0,
            DataType::Integer => 0x245BF5A1,
            DataType::Float => 0x1A1CD56F,
            DataType::Bool => 0xB5B0971F,
            DataType::String => 0x8BE68240,
            DataType::Vector => 0xA1D36582,
            DataType::Enum => 0xBE054183,
            DataType::EnumString => 0x3114DD69,
            DataType::Spline => 0x90CB0573,
            DataType::Resource => 0xA15C4782,
            DataType::Object => 0x05F96DD0,
            DataType::None => 0x80353387,
        })
    }

    /// Look up a stored tag.
    pub fn from_tag(tag: ShortGuid) -> Result<DataType> {
        Self::ALL
            .into_iter()
            .find(|dt| dt.tag() == tag)
            .ok_or(Error::UnknownDataType(tag))
    }

    /// Check if values of this type can live in the parameter pool.
    pub const fn is_poolable(self) -> bool {
        !matches!(self, DataType::Object | DataType::None)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
