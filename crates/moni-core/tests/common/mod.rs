//! Scripted attribute source shared by cache/render tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use moni_core::{AttributeSource, GridBounds, MoniError, RawCell, Result};

/// Fixed grid of raw cells with a walk counter.
pub struct ScriptedSource {
    bounds: GridBounds,
    cells: Mutex<Vec<RawCell>>,
    walks: AtomicUsize,
    fail: AtomicBool,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new(rows: usize, cols: usize, cells: Vec<RawCell>) -> Self {
        assert_eq!(cells.len(), rows * cols, "cell count must match grid");
        Self {
            bounds: GridBounds::new(rows, cols),
            cells: Mutex::new(cells),
            walks: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            delay: None,
        }
    }

    /// Sleep on every walk to widen refresh races.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn walks(&self) -> usize {
        self.walks.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_cell(&self, idx: usize, cell: RawCell) {
        self.cells.lock().unwrap()[idx] = cell;
    }
}

impl AttributeSource for ScriptedSource {
    fn grid_bounds(&self) -> Result<GridBounds> {
        self.walks.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            std::thread::sleep(d);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(MoniError::Enumeration("source offline".into()));
        }
        Ok(self.bounds)
    }

    fn cell_at(&self, row: usize, col: usize) -> Result<RawCell> {
        Ok(self.cells.lock().unwrap()[row * self.bounds.cols + col])
    }
}

/// The 2x2 grid: counter 1 = 5, gauge 2 = 7, two empty cells.
pub fn two_by_two() -> ScriptedSource {
    ScriptedSource::new(
        2,
        2,
        vec![
            RawCell::new(1, 0, 5),
            RawCell::EMPTY,
            RawCell::new(2, 1, 7),
            RawCell::EMPTY,
        ],
    )
}
