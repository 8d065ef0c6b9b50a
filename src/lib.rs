//! A recursive boolean-expression tree for cohort filters, together with the
//! two pure rewrites the surrounding application relies on: canonical
//! normalization and sibling joining.
//!
//! A filter is either a `tvs` condition (one vocabulary term plus the set of
//! accepted values or numeric ranges, optionally negated) or a `tvslst` group
//! (an ordered list of sub-filters joined by `and`/`or`, optionally negated).
//! Trees are immutable values: every operation takes its input by reference
//! and returns a freshly allocated tree.
//!
//! # Examples
//!
//! Normalizing a session-state filter before building a server query:
//!
//! ```
//! use cohort_filter::{filter_join, normal_root, Filter};
//!
//! // a dataset-provided hidden filter next to the user-editable part
//! let raw: Filter = serde_json::from_str(r#"{
//!     "type": "tvslst",
//!     "in": true,
//!     "join": "and",
//!     "lst": [
//!         {"type": "tvslst", "in": true, "join": "", "tag": "filterUiRoot", "lst": [
//!             {"type": "tvs", "tvs": {"term": {"id": "sex", "name": "Sex"}, "values": [{"key": 1}]}}
//!         ]},
//!         {"type": "tvslst", "in": true, "join": "and", "lst": [
//!             {"type": "tvs", "tvs": {"term": {"id": "diaggrp"}, "values": [{"key": "ALL"}]}},
//!             {"type": "tvs", "tvs": {"term": {"id": "agedx"}, "ranges": [
//!                 {"stop": 5, "stopinclusive": true, "startunbounded": true}
//!             ]}}
//!         ]}
//!     ]
//! }"#).unwrap();
//!
//! // single-entry and same-join groups collapse into one flat `and` list
//! let canonical = normal_root(&raw);
//! assert_eq!(canonical.condition_count(), 3);
//! assert!(canonical.find_by_tag("filterUiRoot").is_none());
//!
//! // combining sibling filters picks the minimal nesting as well
//! let combined = filter_join(&[canonical.clone(), canonical]).unwrap();
//! assert_eq!(combined.condition_count(), 6);
//! ```
//!
//! # Wire format
//!
//! The tree is the wire and persistence format. It serializes verbatim to the
//! JSON shape stored in session-save files and URL-embedded session state:
//!
//! * `type` discriminates `tvs` conditions from `tvslst` groups;
//! * `tvs` carries `term` (opaque vocabulary payload), `values` or `ranges`,
//!   and the `isnot` negation flag;
//! * `tvslst` carries `in` (defaults to `true`; `false` negates the group),
//!   `join` (`"and"`, `"or"` or `""`) and the ordered `lst` of children;
//! * `tag` and `$id` are opaque markers owned by the surrounding application.
//!   The algorithms carry them along or strip them, but never interpret them.
//!
//! # Invariants
//!
//! A group with fewer than two entries must have `join == ""` and a group
//! with two or more entries must be joined by `and` or `or`.
//! [`Filter::validate`] checks the invariants recursively and [`filter_join`]
//! rejects malformed inputs, since those signal a bug in the caller rather
//! than a recoverable condition.
mod error;
mod filter;
mod join;
mod normalize;
#[cfg(test)]
mod test_utils;
mod tvs;

pub use crate::{
    error::FilterError,
    filter::{Filter, Group, Join, TvsItem},
    join::filter_join,
    normalize::normal_root,
    tvs::{NumericRange, TermValue, Tvs},
};
