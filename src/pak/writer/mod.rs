//! Archive writer.
//!
//! - `stream` - position-tracking output over any `Write + Seek`
//! - `pool` - deduplicated parameter values
//! - `write_util` - strings, paths, pool entries and timeline sub-blocks
//! - `archive` - the encoder and `Commands::save`/`to_bytes`

mod archive;
mod pool;
mod stream;
mod write_util;

pub use stream::OStream;
