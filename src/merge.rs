//! Left joins of the sales fact table with its store and item dimensions.

use std::collections::HashMap;
use std::fmt;

use crate::domain::{Table, Value};
use crate::error::PipelineError;

pub const STORE_KEY: &str = "store_id";
pub const ITEM_KEY: &str = "item_id";

/// Foreign-key column names as the fact table's source spells them.
#[derive(Debug, Clone)]
pub struct ForeignKeys {
    pub store: String,
    pub item: String,
}

impl Default for ForeignKeys {
    fn default() -> Self {
        // The REST API's sales records use `store` / `item`.
        Self {
            store: "store".to_string(),
            item: "item".to_string(),
        }
    }
}

/// Hashable form of a join-key cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl JoinKey {
    /// `None` for null cells, which never match.
    fn from_value(value: &Value) -> Option<JoinKey> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(JoinKey::Bool(*b)),
            Value::Int(i) => Some(JoinKey::Int(*i)),
            // Integral floats (e.g. `3.0` from a CSV) join with integer keys.
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Some(JoinKey::Int(*f as i64))
            }
            Value::Float(f) => Some(JoinKey::Text(format!("{f:?}"))),
            Value::Text(s) => Some(JoinKey::Text(s.clone())),
        }
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKey::Int(i) => write!(f, "{i}"),
            JoinKey::Bool(b) => write!(f, "{b}"),
            JoinKey::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// Merge sales with stores and items using the API's key names.
pub fn merge(sales: &Table, items: &Table, stores: &Table) -> Result<Table, PipelineError> {
    merge_with_keys(sales, items, stores, &ForeignKeys::default())
}

/// Rename the fact table's foreign keys to `store_id` / `item_id`, then
/// left-join stores and items onto it.
///
/// The result has exactly `sales.len()` rows in sales order.
pub fn merge_with_keys(
    sales: &Table,
    items: &Table,
    stores: &Table,
    keys: &ForeignKeys,
) -> Result<Table, PipelineError> {
    let mut facts = sales.clone();
    canonicalize_key(&mut facts, &keys.store, STORE_KEY);
    canonicalize_key(&mut facts, &keys.item, ITEM_KEY);

    let with_stores = left_join(&facts, "sales", stores, "stores", STORE_KEY)?;
    left_join(&with_stores, "sales", items, "items", ITEM_KEY)
}

fn canonicalize_key(table: &mut Table, from: &str, to: &str) {
    if from != to && !table.has_column(to) {
        table.rename_column(from, to);
    }
}

/// Left outer join of `left` with `right` on `key`.
///
/// `right` must have unique keys; a repeated key is an `AmbiguousJoinKey`
/// error rather than a row fan-out. The right key column is not repeated in
/// the output, and right columns whose names already exist are suffixed with
/// `_<right_name>`. Unmatched rows get nulls.
pub fn left_join(
    left: &Table,
    left_name: &str,
    right: &Table,
    right_name: &str,
    key: &str,
) -> Result<Table, PipelineError> {
    let left_key = left.require_column(left_name, key)?;
    let right_key = right.require_column(right_name, key)?;

    let mut index: HashMap<JoinKey, usize> = HashMap::with_capacity(right.len());
    for (row_idx, row) in right.rows().iter().enumerate() {
        let Some(k) = JoinKey::from_value(&row[right_key]) else {
            continue;
        };
        if index.contains_key(&k) {
            return Err(PipelineError::AmbiguousJoinKey {
                table: right_name.to_string(),
                column: key.to_string(),
                key: k.to_string(),
            });
        }
        index.insert(k, row_idx);
    }

    let mut columns = left.columns().to_vec();
    let mut carried = Vec::with_capacity(right.columns().len().saturating_sub(1));
    for (col_idx, name) in right.columns().iter().enumerate() {
        if col_idx == right_key {
            continue;
        }
        let out_name = if columns.contains(name) {
            format!("{name}_{right_name}")
        } else {
            name.clone()
        };
        columns.push(out_name);
        carried.push(col_idx);
    }

    let mut joined = Table::new(columns);
    let rows = joined.rows_mut();
    rows.reserve(left.len());
    for row in left.rows() {
        let matched = JoinKey::from_value(&row[left_key])
            .and_then(|k| index.get(&k))
            .map(|&r| &right.rows()[r]);

        let mut out = Vec::with_capacity(row.len() + carried.len());
        out.extend(row.iter().cloned());
        out.extend(
            carried
                .iter()
                .map(|&c| matched.map(|m| m[c].clone()).unwrap_or(Value::Null)),
        );
        rows.push(out);
    }

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let mut t = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            t.push_row(row).unwrap();
        }
        t
    }

    fn fixtures() -> (Table, Table, Table) {
        let sales = table(
            &["store", "item", "sale_amount"],
            vec![
                vec![Value::Int(1), Value::Int(10), Value::Int(5)],
                vec![Value::Int(2), Value::Int(11), Value::Int(7)],
            ],
        );
        let stores = table(
            &["store_id", "name"],
            vec![
                vec![Value::Int(1), Value::from("A")],
                vec![Value::Int(2), Value::from("B")],
            ],
        );
        let items = table(
            &["item_id", "item_name"],
            vec![
                vec![Value::Int(10), Value::from("X")],
                vec![Value::Int(11), Value::from("Y")],
            ],
        );
        (sales, items, stores)
    }

    #[test]
    fn merges_sales_with_stores_and_items() {
        let (sales, items, stores) = fixtures();
        let merged = merge(&sales, &items, &stores).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.columns(), ["store_id", "item_id", "sale_amount", "name", "item_name"]);
        assert_eq!(merged.get(0, "name"), Some(&Value::from("A")));
        assert_eq!(merged.get(0, "item_name"), Some(&Value::from("X")));
        assert_eq!(merged.get(1, "name"), Some(&Value::from("B")));
        assert_eq!(merged.get(1, "item_name"), Some(&Value::from("Y")));
    }

    #[test]
    fn unmatched_rows_are_kept_with_nulls() {
        let (mut sales, items, stores) = fixtures();
        sales.push_row(vec![Value::Int(9), Value::Null, Value::Int(1)]).unwrap();

        let merged = merge(&sales, &items, &stores).unwrap();
        assert_eq!(merged.len(), sales.len());
        assert_eq!(merged.get(2, "name"), Some(&Value::Null));
        assert_eq!(merged.get(2, "item_name"), Some(&Value::Null));
    }

    #[test]
    fn duplicate_dimension_key_is_rejected() {
        let (sales, items, mut stores) = fixtures();
        stores.push_row(vec![Value::Int(2), Value::from("B2")]).unwrap();

        let err = merge(&sales, &items, &stores).unwrap_err();
        match err {
            PipelineError::AmbiguousJoinKey { table, column, key } => {
                assert_eq!(table, "stores");
                assert_eq!(column, "store_id");
                assert_eq!(key, "2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn integral_float_keys_match_integer_keys() {
        let (mut sales, items, stores) = fixtures();
        sales.rows_mut()[0][0] = Value::Float(1.0);

        let merged = merge(&sales, &items, &stores).unwrap();
        assert_eq!(merged.get(0, "name"), Some(&Value::from("A")));
    }

    #[test]
    fn colliding_dimension_columns_get_suffixed() {
        let (sales, _, stores) = fixtures();
        let items = table(
            &["item_id", "name"],
            vec![vec![Value::Int(10), Value::from("widget")]],
        );

        let merged = merge(&sales, &items, &stores).unwrap();
        assert_eq!(merged.columns(), ["store_id", "item_id", "sale_amount", "name", "name_items"]);
        assert_eq!(merged.get(0, "name_items"), Some(&Value::from("widget")));
        assert_eq!(merged.get(1, "name_items"), Some(&Value::Null));
    }

    #[test]
    fn missing_key_column_is_reported() {
        let (sales, items, _) = fixtures();
        let stores = table(&["id", "name"], vec![]);

        let err = merge(&sales, &items, &stores).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { ref table, .. } if table == "stores"));
    }
}
