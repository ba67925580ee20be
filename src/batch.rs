//! Parallel batch operations
//!
//! Operations share no state, so independent documents can be processed on
//! Rayon's pool. Results come back in input order, one per document; a
//! failure on one document does not affect the others.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::engine::Engine;
use crate::error::Result;
use crate::toc::TocItem;

/// Apply `op` to every document in parallel
pub fn map_documents<F, T>(inputs: &[&[u8]], op: F) -> Vec<Result<T>>
where
    F: Fn(&[u8]) -> Result<T> + Sync + Send,
    T: Send,
{
    inputs.par_iter().map(|&input| op(input)).collect()
}

impl Engine {
    /// Post-process every document in parallel
    pub fn post_process_batch(&self, inputs: &[&[u8]]) -> Vec<Result<Vec<u8>>> {
        map_documents(inputs, |input| self.post_process(input))
    }

    /// Renumber articles of every document in parallel
    pub fn renumber_articles_batch(&self, inputs: &[&[u8]]) -> Vec<Result<Vec<u8>>> {
        map_documents(inputs, |input| self.renumber_articles(input))
    }

    /// Build the outline of every document in parallel
    pub fn build_toc_batch(&self, inputs: &[&[u8]]) -> Vec<Result<Vec<TocItem>>> {
        map_documents(inputs, |input| self.build_toc(input))
    }

    /// Substitute references in every document in parallel
    pub fn update_references_batch(
        &self,
        inputs: &[&[u8]],
        references: &HashMap<String, String>,
    ) -> Vec<Result<Vec<u8>>> {
        map_documents(inputs, |input| self.update_references(input, references))
    }
}
