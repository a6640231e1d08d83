//! Per-run export state
//!
//! One `ExportContext` is constructed fresh for every export call and
//! threaded through the pipeline, so nothing leaks between runs.

use mprkit_core::{Contour, Operation};
use std::collections::BTreeSet;

/// Accumulated contours, operations, and tools for one export run
#[derive(Debug, Default)]
pub struct ExportContext {
    contour_counter: u32,
    /// Contours in creation order
    pub contours: Vec<Contour>,
    /// Operation records in execution order
    pub operations: Vec<Operation>,
    /// Tool numbers referenced by any operation
    pub tools_used: BTreeSet<u32>,
}

impl ExportContext {
    /// Create an empty context. Contour ids start at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next sequential contour id
    pub fn next_contour_id(&mut self) -> u32 {
        self.contour_counter += 1;
        self.contour_counter
    }

    /// True when the run produced no geometry and no operations
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty() && self.operations.is_empty()
    }
}
