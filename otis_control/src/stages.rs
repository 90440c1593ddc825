//! Lift stage selection: bounded index cursor + ordered setpoint table.

use heapless::Vec as FixedVec;
use otis_common::consts::MAX_STAGES;

/// Bounded cursor over the stage list.
///
/// Starts at 0. `advance`/`retreat` move by exactly one and are silent
/// no-ops at the boundaries — a rejected move is not an error. The cursor
/// holds no motor handles; it only selects which setpoint to push.
#[derive(Debug, Clone)]
pub struct StageIndex {
    index: usize,
    len: usize,
}

impl StageIndex {
    /// Cursor over `len` stages, starting at index 0.
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// Current index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move up one stage. Returns the new index, or `None` at the top.
    pub fn advance(&mut self) -> Option<usize> {
        if self.index + 1 < self.len {
            self.index += 1;
            Some(self.index)
        } else {
            None
        }
    }

    /// Move down one stage. Returns the new index, or `None` at the bottom.
    pub fn retreat(&mut self) -> Option<usize> {
        if self.index > 0 {
            self.index -= 1;
            Some(self.index)
        } else {
            None
        }
    }

    #[inline]
    pub fn at_top(&self) -> bool {
        self.index + 1 >= self.len
    }

    #[inline]
    pub fn at_bottom(&self) -> bool {
        self.index == 0
    }
}

/// Immutable ordered table of stage setpoints [motor units].
///
/// Construction is the startup gate for the stage list: an empty or
/// non-ascending list is rejected here, fatally, before any task starts.
#[derive(Debug, Clone)]
pub struct StageTable {
    stages: FixedVec<f64, MAX_STAGES>,
}

impl StageTable {
    /// Build from an ordered setpoint list.
    pub fn new(stages: &[f64]) -> Result<Self, String> {
        if stages.is_empty() {
            return Err("stage table must not be empty".to_string());
        }
        for pair in stages.windows(2) {
            if pair[0] >= pair[1] {
                return Err(format!(
                    "stage table must be strictly ascending ({} >= {})",
                    pair[0], pair[1]
                ));
            }
        }
        let stages = FixedVec::from_slice(stages)
            .map_err(|_| format!("stage table holds at most {MAX_STAGES} stages"))?;
        Ok(Self { stages })
    }

    /// Number of stages.
    #[inline]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Setpoint for the given stage index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.stages.get(index).copied()
    }

    /// The stowed (index 0) setpoint. The table is never empty.
    #[inline]
    pub fn first(&self) -> f64 {
        self.stages.first().copied().unwrap_or(0.0)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
