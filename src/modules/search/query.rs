use serde_json::{json, Value};

use crate::core::{AppError, Result};

/// Lower-bound mode of the timestamp range filter.
///
/// The initial page includes the window start (`gte`); continuation
/// pages resume strictly after the last fetched record (`gt`) so the
/// previous page's final record is not fetched twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowerBound {
    Inclusive,
    Exclusive,
}

/// Build a page query from a base template: sets the page size and the
/// timestamp range at `query.bool.filter[0].range.<timestamp_field>`.
/// Switching bound modes clears the opposite lower-bound marker left by
/// a previous build. The caller guarantees `range_start <= range_end`.
pub fn build_query(
    base: &Value,
    page_size: usize,
    timestamp_field: &str,
    range_start: &str,
    range_end: &str,
    lower_bound: LowerBound,
) -> Result<Value> {
    let mut query = base.clone();

    query
        .as_object_mut()
        .ok_or_else(|| AppError::configuration("query template is not an object"))?
        .insert("size".to_string(), json!(page_size));

    let range_filter = query
        .pointer_mut(&format!("/query/bool/filter/0/range/{}", timestamp_field))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| {
            AppError::configuration(format!(
                "query template has no range filter on `{}`",
                timestamp_field
            ))
        })?;

    match lower_bound {
        LowerBound::Inclusive => {
            range_filter.remove("gt");
            range_filter.insert("gte".to_string(), json!(range_start));
        }
        LowerBound::Exclusive => {
            range_filter.remove("gte");
            range_filter.insert("gt".to_string(), json!(range_start));
        }
    }
    range_filter.insert("lt".to_string(), json!(range_end));

    Ok(query)
}
