use crate::{
    error::FilterError,
    filter::{Filter, Group, Join},
};
use itertools::Itertools;

/// Combine sibling filters into one equivalent filter with minimal nesting.
///
/// Every input is validated first; malformed joins fail fast with a
/// [`FilterError`]. Empty groups are skipped. A lone survivor is returned
/// as a deep copy with its join untouched, so a dataset-provided filter
/// next to an empty user-editable filter passes through unwrapped.
/// Otherwise the survivors combine under `and`: an included group already
/// joined by `and` (or holding at most one entry) has its entries spliced
/// into the combined list, while `or`-joined groups, negated groups and
/// bare conditions nest as single entries so their meaning is preserved.
///
/// Inputs are never mutated and the result never aliases them.
///
/// # Examples
///
/// ```rust
/// use cohort_filter::{filter_join, Filter};
///
/// let cohort: Filter = serde_json::from_str(r#"{
///     "type": "tvslst", "in": true, "join": "", "lst": [
///         {"type": "tvs", "tvs": {"term": {"id": "subcohort"}, "values": [{"key": "SJLIFE"}]}}
///     ]
/// }"#).unwrap();
/// let user: Filter = serde_json::from_str(r#"{
///     "type": "tvslst", "in": true, "join": "and", "lst": [
///         {"type": "tvs", "tvs": {"term": {"id": "sex"}, "values": [{"key": 1}]}},
///         {"type": "tvs", "tvs": {"term": {"id": "agedx"}, "ranges": [{"stop": 5, "stopinclusive": true, "startunbounded": true}]}}
///     ]
/// }"#).unwrap();
///
/// let combined = filter_join(&[cohort, user]).unwrap();
///
/// assert_eq!(combined.condition_count(), 3);
/// ```
pub fn filter_join(filters: &[Filter]) -> Result<Filter, FilterError> {
    if filters.is_empty() {
        return Err(FilterError::EmptyJoin);
    }
    for filter in filters {
        filter.validate()?;
    }

    let survivors = filters
        .iter()
        .filter(|filter| !filter.is_empty())
        .collect_vec();
    match survivors.as_slice() {
        [] => Ok(Filter::Tvslst(Group::empty())),
        [only] => Ok((*only).clone()),
        _ => {
            let mut lst = Vec::with_capacity(survivors.len());
            for filter in survivors {
                match filter {
                    Filter::Tvslst(group) if group.included && group.join != Join::Or => {
                        lst.extend(group.lst.iter().cloned());
                    }
                    other => lst.push(other.clone()),
                }
            }
            Ok(Filter::Tvslst(Group::new(Join::And, lst)))
        }
    }
}
