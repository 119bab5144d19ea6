//! Attribute model.
//!
//! A source hands out untyped `RawCell` triples; only cells passing the
//! validity rule become `Attribute`s.

/// Metric kind of an attribute. Wire values: 0 = counter, 1 = gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Counter,
    Gauge,
}

impl AttrKind {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(AttrKind::Counter),
            1 => Some(AttrKind::Gauge),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            AttrKind::Counter => 0,
            AttrKind::Gauge => 1,
        }
    }

    /// Metric name suffix (`monitor_<id>_<suffix>`).
    pub fn metric_suffix(self) -> &'static str {
        match self {
            AttrKind::Counter => "total",
            AttrKind::Gauge => "value",
        }
    }

    /// Name used on the `# TYPE` line.
    pub fn type_name(self) -> &'static str {
        match self {
            AttrKind::Counter => "counter",
            AttrKind::Gauge => "gauge",
        }
    }
}

/// One grid cell as reported by a source. `id <= 0` marks an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCell {
    pub id: i64,
    pub kind: i32,
    pub value: i64,
}

impl RawCell {
    pub const EMPTY: RawCell = RawCell { id: 0, kind: 0, value: 0 };

    pub fn new(id: i64, kind: i32, value: i64) -> Self {
        Self { id, kind, value }
    }
}

/// A validated attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub id: u64,
    pub kind: AttrKind,
    pub value: u64,
}

impl Attribute {
    /// Apply the validity rule: id > 0, kind in {0, 1}, value >= 0.
    pub fn from_raw(cell: RawCell) -> Option<Self> {
        if cell.id <= 0 || cell.value < 0 {
            return None;
        }
        let kind = AttrKind::from_raw(cell.kind)?;
        Some(Self {
            id: cell.id as u64,
            kind,
            value: cell.value as u64,
        })
    }

    pub fn metric_name(&self) -> String {
        format!("monitor_{}_{}", self.id, self.kind.metric_suffix())
    }
}
