//! Deduplicated parameter value pool.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Seek, Write};

use tracing::trace;

use super::stream::OStream;
use super::write_util::write_pool_entry;
use crate::core::{Commands, ParameterData};
use crate::util::Result;

/// Pool key of a value: resource values are pooled without references.
fn pool_key(data: &ParameterData) -> Cow<'_, ParameterData> {
    match data {
        ParameterData::Resource { references, .. } if !references.is_empty() => {
            Cow::Owned(data.pooled())
        }
        _ => Cow::Borrowed(data),
    }
}

/// Every distinct value of an archive, in first-appearance order.
#[derive(Default)]
pub(crate) struct ParameterPool {
    values: Vec<ParameterData>,
    index: HashMap<ParameterData, usize>,
    words: Vec<u32>,
}

impl ParameterPool {
    /// Collect values over composites, entities by id, then parameters.
    pub fn collect(commands: &Commands) -> Self {
        let mut pool = Self::default();
        for composite in commands.composites() {
            let mut entities: Vec<_> = composite.entities().iter().collect();
            entities.sort_by_key(|e| e.id);
            for entity in entities {
                for param in &entity.parameters {
                    pool.insert(&param.data);
                }
            }
        }
        pool
    }

    fn insert(&mut self, data: &ParameterData) {
        let key = pool_key(data);
        if self.index.contains_key(key.as_ref()) {
            return;
        }
        let value = key.into_owned();
        self.index.insert(value.clone(), self.values.len());
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Write every value and remember where it landed.
    pub fn write<W: Write + Seek>(&mut self, out: &mut OStream<W>) -> Result<()> {
        self.words.clear();
        for value in &self.values {
            self.words.push(out.word()?);
            write_pool_entry(out, value)?;
        }
        trace!("Wrote {} pooled values", self.values.len());
        Ok(())
    }

    /// Word offsets of the written entries, in pool order.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Word offset of a value, once written.
    pub fn word_of(&self, data: &ParameterData) -> Option<u32> {
        let index = *self.index.get(pool_key(data).as_ref())?;
        self.words.get(index).copied()
    }
}
