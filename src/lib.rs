//! # Cathode
//!
//! Reader and writer for the CATHODE engine's compiled scripting archive
//! (`commands.pak`).
//!
//! The archive is a forest of composites: named graphs of entities wired
//! together by parameter links. Names are stored only as 32-bit
//! [`ShortGuid`] hashes; a [`GuidCache`] maps them back to strings for
//! display.
//!
//! ## Modules
//!
//! - [`util`] - Errors and math helpers
//! - [`guid`] - ShortGuid identifiers and the name cache
//! - [`core`] - The in-memory graph model and path hash chains
//! - [`pak`] - Binary decode/encode
//!
//! ## Example
//!
//! ```no_run
//! use cathode::prelude::*;
//!
//! let cache = GuidCache::with_known_names();
//! let mut commands = Commands::open("commands.pak", &cache)?;
//! for composite in commands.composites() {
//!     println!("{}: {} entities", composite.name, composite.num_entities());
//! }
//! commands.set_entry_point(EntryPoint::Root, ShortGuid::from_name("MyLevel"));
//! commands.save("commands_edited.pak")?;
//! # Ok::<(), cathode::Error>(())
//! ```

pub mod util;
pub mod guid;
pub mod core;
pub mod pak;

// Re-export commonly used types
pub use crate::core::{Commands, Composite, Entity, EntityKind, EntityPath, Parameter, ParameterData};
pub use guid::{GuidCache, ShortGuid};
pub use pak::{ReadOptions, WriteOptions};
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::*;
    pub use crate::guid::{GuidCache, ShortGuid};
    pub use crate::pak::{ReadOptions, WriteOptions};
    pub use crate::util::{Error, Result};
}
