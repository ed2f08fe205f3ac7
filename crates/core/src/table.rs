//! Tables: the rows-with-named-columns payload
//!
//! Every request and response is a [`Table`]: table-level metadata, an
//! ordered list of columns, and rows of nullable cells aligned with the
//! columns. Row order is significant; batch reads rely on it to line rows up
//! with their input ids.
//!
//! ## Serialized form
//!
//! Rows serialize as objects keyed by column name with null cells omitted,
//! so an all-null row is `{}` and still occupies its position:
//!
//! ```json
//! {"meta": {}, "cols": [{"name": "id"}, {"name": "dis"}],
//!  "rows": [{"id": {"Ref": {"id": "a"}}, "dis": {"Str": "A"}}, {}]}
//! ```
//!
//! When `cols` is omitted it is derived from the rows.

use serde::{Deserialize, Serialize};

use crate::dict::Dict;
use crate::history::HistoryItem;
use crate::types::EntityId;
use crate::value::{Number, Value};

/// A named column with optional column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within a table
    pub name: String,
    /// Column metadata
    #[serde(default, skip_serializing_if = "Dict::is_empty")]
    pub meta: Dict,
}

impl Column {
    /// Column without metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: Dict::new(),
        }
    }
}

/// Ordered rows of nullable cells under named columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TableRepr", into = "TableRepr")]
pub struct Table {
    meta: Dict,
    cols: Vec<Column>,
    rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    /// Table with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the table metadata
    pub fn with_meta(mut self, meta: Dict) -> Self {
        self.meta = meta;
        self
    }

    /// Table metadata
    pub fn meta(&self) -> &Dict {
        &self.meta
    }

    /// Columns in order
    pub fn cols(&self) -> &[Column] {
        &self.cols
    }

    /// Column by name
    pub fn col(&self, name: &str) -> Option<&Column> {
        self.cols.iter().find(|c| c.name == name)
    }

    /// Whether a column exists
    pub fn has_col(&self, name: &str) -> bool {
        self.col(name).is_some()
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row by index
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            cols: &self.cols,
            cells,
        })
    }

    /// Iterate rows in order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row {
            cols: &self.cols,
            cells,
        })
    }

    /// Every row as a Dict (null cells dropped)
    pub fn to_dicts(&self) -> Vec<Dict> {
        self.rows().map(|r| r.to_dict()).collect()
    }

    /// One-row table holding the tags of `dict`
    pub fn from_dict(dict: &Dict) -> Self {
        Self::from_dicts(std::iter::once(dict))
    }

    /// Table with one row per dict
    ///
    /// Columns are the union of all tag names; `id` comes first when any
    /// row has it, the rest follow in order of first appearance.
    pub fn from_dicts<I, D>(dicts: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<Dict>,
    {
        Self::from_optional_dicts(dicts.into_iter().map(Some))
    }

    /// Table with one row per entry, `None` entries becoming all-null rows
    ///
    /// Used wherever rows must stay positionally aligned with an input list.
    pub fn from_optional_dicts<I, D>(dicts: I) -> Self
    where
        I: IntoIterator<Item = Option<D>>,
        D: AsRef<Dict>,
    {
        let dicts: Vec<Option<D>> = dicts.into_iter().collect();
        let cols = union_columns(dicts.iter().flatten().map(AsRef::as_ref));
        let rows = dicts
            .iter()
            .map(|d| match d {
                Some(d) => cells_for(&cols, d.as_ref()),
                None => vec![None; cols.len()],
            })
            .collect();
        Self {
            meta: Dict::new(),
            cols,
            rows,
        }
    }

    /// History table: meta `id`, `hisStart`, `hisEnd` plus `ts, val` rows
    pub fn from_history(meta: Dict, items: &[HistoryItem]) -> Self {
        let mut b = TableBuilder::new();
        b.meta(meta);
        b.add_col("ts");
        b.add_col("val");
        for item in items {
            b.add_row(vec![
                Some(Value::DateTime(item.ts.clone())),
                Some(item.val.clone()),
            ]);
        }
        b.build()
    }
}

/// Borrowed view of one table row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cols: &'a [Column],
    cells: &'a [Option<Value>],
}

impl<'a> Row<'a> {
    /// Cell value by column name, `None` when null or no such column
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let idx = self.cols.iter().position(|c| c.name == name)?;
        self.cells.get(idx).and_then(Option::as_ref)
    }

    /// Whether the named cell is non-null
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether the named cell is null or missing
    pub fn missing(&self, name: &str) -> bool {
        !self.has(name)
    }

    /// Str cell value
    pub fn get_str(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Number cell value
    pub fn get_number(&self, name: &str) -> Option<&'a Number> {
        self.get(name).and_then(Value::as_number)
    }

    /// Id of the `id` cell, if it is a Ref
    pub fn id(&self) -> Option<&'a EntityId> {
        self.get("id")
            .and_then(Value::as_entity_ref)
            .map(|r| &r.id)
    }

    /// Non-null cells as a Dict
    pub fn to_dict(&self) -> Dict {
        self.cols
            .iter()
            .zip(self.cells.iter())
            .filter_map(|(col, cell)| cell.as_ref().map(|v| (col.name.clone(), v.clone())))
            .collect()
    }
}

/// Incremental table construction
///
/// ```
/// use haystack_core::{TableBuilder, Value};
///
/// let mut b = TableBuilder::new();
/// b.add_col("name");
/// b.add_col("summary");
/// b.add_row(vec![Some(Value::str("about")), Some(Value::str("Summary"))]);
/// let table = b.build();
/// assert_eq!(table.num_rows(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    meta: Dict,
    cols: Vec<Column>,
    rows: Vec<Vec<Option<Value>>>,
}

impl TableBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table metadata
    pub fn meta(&mut self, meta: Dict) -> &mut Self {
        self.meta = meta;
        self
    }

    /// Append a column
    pub fn add_col(&mut self, name: impl Into<String>) -> &mut Self {
        self.cols.push(Column::new(name));
        self
    }

    /// Append a row
    ///
    /// Cells beyond the column count are dropped and short rows are padded
    /// with nulls; either case is a caller bug and asserts in debug builds.
    pub fn add_row(&mut self, mut cells: Vec<Option<Value>>) -> &mut Self {
        debug_assert_eq!(cells.len(), self.cols.len(), "row width != column count");
        cells.resize(self.cols.len(), None);
        self.rows.push(cells);
        self
    }

    /// Finish the table
    pub fn build(self) -> Table {
        Table {
            meta: self.meta,
            cols: self.cols,
            rows: self.rows,
        }
    }
}

fn union_columns<'a>(dicts: impl Iterator<Item = &'a Dict>) -> Vec<Column> {
    let mut names: Vec<&str> = Vec::new();
    let mut has_id = false;
    for dict in dicts {
        for name in dict.names() {
            if name == "id" {
                has_id = true;
            } else if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    let mut cols = Vec::with_capacity(names.len() + 1);
    if has_id {
        cols.push(Column::new("id"));
    }
    cols.extend(names.into_iter().map(Column::new));
    cols
}

fn cells_for(cols: &[Column], dict: &Dict) -> Vec<Option<Value>> {
    cols.iter().map(|c| dict.get(&c.name).cloned()).collect()
}

// ============================================================================
// Serialized representation
// ============================================================================

#[derive(Serialize, Deserialize)]
struct TableRepr {
    #[serde(default, skip_serializing_if = "Dict::is_empty")]
    meta: Dict,
    #[serde(default)]
    cols: Vec<Column>,
    #[serde(default)]
    rows: Vec<Dict>,
}

impl From<TableRepr> for Table {
    fn from(repr: TableRepr) -> Self {
        let mut cols = repr.cols;
        for col in union_columns(repr.rows.iter()) {
            if !cols.iter().any(|c| c.name == col.name) {
                cols.push(col);
            }
        }
        let rows = repr.rows.iter().map(|d| cells_for(&cols, d)).collect();
        Table {
            meta: repr.meta,
            cols,
            rows,
        }
    }
}

impl From<Table> for TableRepr {
    fn from(table: Table) -> Self {
        let rows = table.to_dicts();
        TableRepr {
            meta: table.meta,
            cols: table.cols,
            rows,
        }
    }
}
