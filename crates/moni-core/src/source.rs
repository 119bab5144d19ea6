//! Attribute sources.
//!
//! A source exposes a bounded `rows x cols` grid of raw cells. The cache walks
//! the whole grid on every refresh, so implementations must be cheap to read
//! (in-memory or shared-memory tables).

use std::sync::{Mutex, PoisonError};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::attr::{AttrKind, Attribute, RawCell};
use crate::error::{MoniError, Result};

/// Grid dimensions. `0 x 0` is valid and yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridBounds {
    pub rows: usize,
    pub cols: usize,
}

impl GridBounds {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn cells(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }
}

/// Read-side contract of an attribute table.
pub trait AttributeSource: Send + Sync {
    fn grid_bounds(&self) -> Result<GridBounds>;

    /// Cell at `(row, col)`. Cells with `id <= 0` are empty.
    fn cell_at(&self, row: usize, col: usize) -> Result<RawCell>;
}

/// Enumerate the whole grid (row-major), keeping only valid attributes.
pub fn walk(source: &dyn AttributeSource) -> Result<Vec<Attribute>> {
    let bounds = source.grid_bounds()?;
    let mut out = Vec::new();
    for row in 0..bounds.rows {
        for col in 0..bounds.cols {
            if let Some(attr) = Attribute::from_raw(source.cell_at(row, col)?) {
                out.push(attr);
            }
        }
    }
    Ok(out)
}

/// Fixed-size in-process attribute table.
///
/// Attributes land in row `id % rows` and take the first free column of that
/// row. Reporters update cells through `add`/`set`; the exporter reads them
/// through `AttributeSource`.
pub struct MemoryGrid {
    bounds: GridBounds,
    cells: Vec<Mutex<RawCell>>,
    // id -> cell index
    index: DashMap<u64, usize>,
}

impl MemoryGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        let bounds = GridBounds::new(rows, cols);
        let cells = (0..bounds.cells()).map(|_| Mutex::new(RawCell::EMPTY)).collect();
        Self {
            bounds,
            cells,
            index: DashMap::new(),
        }
    }

    /// Counter report: create the counter on first use, then add `delta`.
    pub fn add(&self, id: i64, delta: i64) -> Result<()> {
        self.update(id, delta, AttrKind::Counter, |cur, d| cur.saturating_add(d))
    }

    /// Gauge report: create or overwrite.
    pub fn set(&self, id: i64, value: i64) -> Result<()> {
        self.update(id, value, AttrKind::Gauge, |_, v| v)
    }

    /// Number of attributes currently stored.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn update(&self, id: i64, value: i64, kind: AttrKind, apply: impl Fn(i64, i64) -> i64) -> Result<()> {
        if id <= 0 {
            return Err(MoniError::InvalidReport(format!("attribute id must be positive: {id}")));
        }
        if value < 0 {
            return Err(MoniError::InvalidReport(format!("negative value for attribute {id}: {value}")));
        }

        // The entry guard serializes reporters of the same id, so a slot is claimed once.
        let slot = match self.index.entry(id as u64) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let slot = self.claim(id, kind)?;
                e.insert(slot);
                slot
            }
        };

        let mut cell = self.cells[slot].lock().unwrap_or_else(PoisonError::into_inner);
        if cell.kind != kind.as_raw() {
            return Err(MoniError::InvalidReport(format!(
                "attribute {id} is a {}, not a {}",
                AttrKind::from_raw(cell.kind).map_or("unknown", AttrKind::type_name),
                kind.type_name()
            )));
        }
        cell.value = apply(cell.value, value);
        Ok(())
    }

    fn claim(&self, id: i64, kind: AttrKind) -> Result<usize> {
        if self.bounds.rows == 0 || self.bounds.cols == 0 {
            return Err(MoniError::GridFull { row: 0 });
        }
        let row = (id as u64 % self.bounds.rows as u64) as usize;
        for col in 0..self.bounds.cols {
            let slot = row * self.bounds.cols + col;
            let mut cell = self.cells[slot].lock().unwrap_or_else(PoisonError::into_inner);
            if cell.id <= 0 {
                *cell = RawCell::new(id, kind.as_raw(), 0);
                return Ok(slot);
            }
        }
        Err(MoniError::GridFull { row })
    }
}

impl AttributeSource for MemoryGrid {
    fn grid_bounds(&self) -> Result<GridBounds> {
        Ok(self.bounds)
    }

    fn cell_at(&self, row: usize, col: usize) -> Result<RawCell> {
        if row >= self.bounds.rows || col >= self.bounds.cols {
            return Err(MoniError::Enumeration(format!(
                "cell ({row}, {col}) outside {}x{} grid",
                self.bounds.rows, self.bounds.cols
            )));
        }
        let cell = self.cells[row * self.bounds.cols + col]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(*cell)
    }
}
