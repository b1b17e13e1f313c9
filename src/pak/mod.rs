//! Binary codec for `commands.pak`.
//!
//! All fields are little-endian 32-bit words. Every stored offset counts
//! words, not bytes.
//!
//! ## File Structure
//!
//! ```text
//! +----------------------+
//! | Entry points         |  3 x ShortGuid
//! +----------------------+
//! | Pool table           |  (offset, count) @12
//! +----------------------+
//! | Composite table      |  (offset, count) @20
//! +----------------------+
//! | Reserved             |  1 word
//! +----------------------+
//! | Pooled values        |  tag + payload each
//! +----------------------+
//! | Composite 0 blocks   |
//! | Composite 0 table    |  12 x (offset, count)
//! | ...                  |
//! +----------------------+
//! | Pool offsets         |
//! | Composite offsets    |
//! +----------------------+
//! ```

mod decode;
mod format;
mod options;
mod read_util;
mod reader;
pub mod writer;

pub use format::*;
pub use options::{ReadOptions, WriteOptions};
pub use writer::OStream;
