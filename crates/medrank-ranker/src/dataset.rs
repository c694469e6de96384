//! School records and the loaders that produce them.
//!
//! Loaders own every data-quality concern: formatted strings are coerced
//! to numbers, unparseable values become missing, and columns that don't
//! match the attribute registry are dropped. The normaliser only ever sees
//! registry attributes with finite values or gaps.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use medrank_common::{CostView, MedrankError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::attributes::Attribute;

/// Column holding the institution's display name.
pub const NAME_COLUMN: &str = "AAMC_Institution";
/// Accepted when [`NAME_COLUMN`] is absent.
pub const FALLBACK_NAME_COLUMN: &str = "name";
/// Suffix marking the out-of-state variant of a cost column.
pub const OUT_OF_STATE_SUFFIX: &str = " (Out-of-State)";

/// One institution. A missing attribute is simply absent from `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolRecord {
    pub name: String,
    #[serde(default)]
    pub values: BTreeMap<Attribute, f64>,
    /// Out-of-state cost figures, where they differ from in-state ones.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub out_of_state: BTreeMap<Attribute, f64>,
}

impl SchoolRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
            out_of_state: BTreeMap::new(),
        }
    }

    /// Set an attribute value. Non-finite values are stored as missing.
    pub fn with(mut self, attr: Attribute, value: f64) -> Self {
        self.set(attr, Some(value));
        self
    }

    /// Set the out-of-state variant of a cost attribute. Non-finite values are ignored.
    pub fn with_out_of_state(mut self, attr: Attribute, value: f64) -> Self {
        self.set_out_of_state(attr, Some(value));
        self
    }

    pub fn set_out_of_state(&mut self, attr: Attribute, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.out_of_state.insert(attr, v);
        }
    }

    pub fn set(&mut self, attr: Attribute, value: Option<f64>) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                self.values.insert(attr, v);
            }
            None => {
                self.values.remove(&attr);
            }
        }
    }

    /// Present, finite raw value, or `None` when missing.
    pub fn value(&self, attr: Attribute) -> Option<f64> {
        self.values.get(&attr).copied().filter(|v| v.is_finite())
    }

    fn effective(&self, view: CostView) -> SchoolRecord {
        let mut record = SchoolRecord {
            name: self.name.clone(),
            values: self.values.clone(),
            out_of_state: BTreeMap::new(),
        };
        if view == CostView::OutOfState {
            for (&attr, &value) in &self.out_of_state {
                record.set(attr, Some(value));
            }
        }
        record
    }
}

/// An ordered, immutable snapshot of school records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<SchoolRecord>,
}

impl Dataset {
    pub fn new(records: Vec<SchoolRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SchoolRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchoolRecord> {
        self.records.iter()
    }

    /// Effective dataset for a cost view.
    ///
    /// Out-of-state figures replace in-state ones where a record carries
    /// them; records without one keep their in-state figure. The result is
    /// a distinct dataset: normalisation stats must be computed on it, never
    /// reused from another view.
    pub fn effective(&self, view: CostView) -> Dataset {
        Dataset {
            records: self.records.iter().map(|r| r.effective(view)).collect(),
        }
    }

    // ── Loaders ──────────────────────────────────────────────────────────────

    /// Load a dataset file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Self::from_csv_path(path),
            Some("json") => Self::from_json_path(path),
            other => Err(MedrankError::Config(format!(
                "unsupported dataset extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Parse CSV with a header row. Every cell is run through [`coerce_numeric`].
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();
        let columns = ColumnMap::from_headers(headers.iter())?;

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            let name = row.get(columns.name).unwrap_or_default().trim();
            let mut record = SchoolRecord::new(name);
            for (idx, cell) in row.iter().enumerate() {
                match columns.slots.get(&idx) {
                    Some(Slot::InState(attr)) => record.set(*attr, coerce_numeric(cell)),
                    Some(Slot::OutOfState(attr)) => record.set_out_of_state(*attr, coerce_numeric(cell)),
                    None => {}
                }
            }
            records.push(record);
        }

        info!(schools = records.len(), "Loaded CSV dataset");
        Ok(Self { records })
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a JSON array of flat objects keyed by dataset column.
    ///
    /// Numbers are taken as-is, strings are coerced, anything else is missing.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_str(json)?;
        let mut ignored: BTreeMap<String, usize> = BTreeMap::new();

        let records: Vec<SchoolRecord> = rows
            .iter()
            .map(|row| {
                let name = row
                    .get(NAME_COLUMN)
                    .or_else(|| row.get(FALLBACK_NAME_COLUMN))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .trim();
                let mut record = SchoolRecord::new(name);
                for (key, value) in row {
                    match classify_column(key) {
                        Some(Slot::InState(attr)) => record.set(attr, json_number(value)),
                        Some(Slot::OutOfState(attr)) => record.set_out_of_state(attr, json_number(value)),
                        None if key == NAME_COLUMN || key == FALLBACK_NAME_COLUMN => {}
                        None => *ignored.entry(key.clone()).or_default() += 1,
                    }
                }
                record
            })
            .collect();

        for key in ignored.keys() {
            debug!(column = %key, "Ignoring column not in attribute registry");
        }
        info!(schools = records.len(), "Loaded JSON dataset");
        Ok(Self { records })
    }
}

/// Coerce a formatted cell (`"$45,000"`, `"12.5%"`, `" 3.81 "`) to a number.
///
/// Everything except digits, `.` and `-` is stripped before parsing. Empty
/// or unparseable input, and non-finite results, are missing. Malformed
/// numbers such as `"1.2.3"` are missing rather than truncated to a prefix.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => coerce_numeric(s),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    InState(Attribute),
    OutOfState(Attribute),
}

fn classify_column(header: &str) -> Option<Slot> {
    let header = header.trim();
    if let Some(base) = header.strip_suffix(OUT_OF_STATE_SUFFIX) {
        return Attribute::from_key(base)
            .ok()
            .filter(Attribute::has_out_of_state_variant)
            .map(Slot::OutOfState);
    }
    Attribute::from_key(header).ok().map(Slot::InState)
}

struct ColumnMap {
    name: usize,
    slots: BTreeMap<usize, Slot>,
}

impl ColumnMap {
    fn from_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Result<Self> {
        let headers: Vec<&str> = headers.collect();
        let name = headers
            .iter()
            .position(|h| h.trim() == NAME_COLUMN)
            .or_else(|| headers.iter().position(|h| h.trim() == FALLBACK_NAME_COLUMN))
            .ok_or_else(|| {
                MedrankError::Config(format!(
                    "dataset has no '{NAME_COLUMN}' or '{FALLBACK_NAME_COLUMN}' column"
                ))
            })?;

        let mut slots = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            match classify_column(header) {
                Some(slot) => {
                    slots.insert(idx, slot);
                }
                None if idx != name => {
                    debug!(column = %header, "Ignoring column not in attribute registry");
                }
                None => {}
            }
        }
        Ok(Self { name, slots })
    }
}
