use crate::{error::FilterError, tvs::Tvs};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    ops::Not,
};

/// A filter expression: either a single term-value-set condition or a group
/// of sub-filters combined by a boolean operator.
///
/// The tree doubles as the wire format. It serializes to the JSON shape the
/// surrounding application persists in session state, discriminated by the
/// `"type"` field (`"tvs"` for conditions, `"tvslst"` for groups):
///
/// ```rust
/// use cohort_filter::Filter;
///
/// let filter: Filter = serde_json::from_str(r#"{
///     "type": "tvslst",
///     "in": true,
///     "join": "and",
///     "lst": [
///         {"type": "tvs", "tvs": {"term": {"id": "sex"}, "values": [{"key": 1}]}},
///         {"type": "tvs", "tvs": {"term": {"id": "diaggrp"}, "values": [{"key": "ALL"}], "isnot": true}}
///     ]
/// }"#).unwrap();
///
/// assert_eq!(filter.condition_count(), 2);
/// assert!(filter.validate().is_ok());
/// ```
///
/// Negation is expressed through [`Not`]: `!filter` flips the `isnot` flag
/// of a condition and the `in` flag of a group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Filter {
    #[serde(rename = "tvs")]
    Tvs(TvsItem),
    #[serde(rename = "tvslst")]
    Tvslst(Group),
}

impl Filter {
    /// Wrap a condition into a leaf filter.
    pub fn tvs(tvs: Tvs) -> Self {
        Self::Tvs(TvsItem::new(tvs))
    }

    /// Whether this filter is a group with no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Tvslst(group) if group.lst.is_empty())
    }

    /// Check the join/list invariants of every group in the tree.
    ///
    /// A group with fewer than two entries must have no join operator and a
    /// group with two or more entries must be joined by `and` or `or`.
    /// Violations signal malformed upstream state and fail fast.
    pub fn validate(&self) -> Result<(), FilterError> {
        match self {
            Self::Tvs(_) => Ok(()),
            Self::Tvslst(group) => {
                let entries = group.lst.len();
                match group.join {
                    Join::None if entries > 1 => Err(FilterError::MissingJoin { entries }),
                    Join::And | Join::Or if entries < 2 => Err(FilterError::ExtraJoin {
                        join: group.join,
                        entries,
                    }),
                    _ => group.lst.iter().try_for_each(Self::validate),
                }
            }
        }
    }

    /// Find the first subtree carrying the given tag, depth first.
    ///
    /// Tags are opaque markers (such as `filterUiRoot` or `cohortFilter`)
    /// that the surrounding application uses to relocate specific subtrees.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Filter> {
        if self.tag() == Some(tag) {
            return Some(self);
        }
        match self {
            Self::Tvs(_) => None,
            Self::Tvslst(group) => group.lst.iter().find_map(|child| child.find_by_tag(tag)),
        }
    }

    /// Find the subtree carrying the given `$id` handle, depth first.
    pub fn find_by_id(&self, id: &serde_json::Value) -> Option<&Filter> {
        let own = match self {
            Self::Tvs(item) => item.id.as_ref(),
            Self::Tvslst(group) => group.id.as_ref(),
        };
        if own == Some(id) {
            return Some(self);
        }
        match self {
            Self::Tvs(_) => None,
            Self::Tvslst(group) => group.lst.iter().find_map(|child| child.find_by_id(id)),
        }
    }

    /// The number of leaf conditions in the tree.
    pub fn condition_count(&self) -> usize {
        match self {
            Self::Tvs(_) => 1,
            Self::Tvslst(group) => group.lst.iter().map(Self::condition_count).sum(),
        }
    }

    /// Recursively remove the `$id` handles the UI layer attaches for DOM
    /// binding.
    pub fn strip_ids(&mut self) {
        match self {
            Self::Tvs(item) => item.id = None,
            Self::Tvslst(group) => {
                group.id = None;
                group.lst.iter_mut().for_each(Self::strip_ids);
            }
        }
    }

    /// Recursively remove the semantic tags.
    pub fn strip_tags(&mut self) {
        match self {
            Self::Tvs(item) => item.tag = None,
            Self::Tvslst(group) => {
                group.tag = None;
                group.lst.iter_mut().for_each(Self::strip_tags);
            }
        }
    }

    fn tag(&self) -> Option<&str> {
        match self {
            Self::Tvs(item) => item.tag.as_deref(),
            Self::Tvslst(group) => group.tag.as_deref(),
        }
    }
}

impl Not for Filter {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Tvs(item) => Self::Tvs(!item),
            Self::Tvslst(group) => Self::Tvslst(!group),
        }
    }
}

impl Display for Filter {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Tvs(item) => write!(formatter, "{}", item.tvs),
            Self::Tvslst(group) => write!(formatter, "{group}"),
        }
    }
}

/// A condition leaf together with the opaque markers the UI layer attaches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TvsItem {
    pub tvs: Tvs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
}

impl TvsItem {
    pub fn new(tvs: Tvs) -> Self {
        Self {
            tvs,
            tag: None,
            id: None,
        }
    }
}

impl Not for TvsItem {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self {
            tvs: !self.tvs,
            ..self
        }
    }
}

/// An ordered list of sub-filters combined by [`Join`], optionally negated.
///
/// `included == false` negates the group's combined predicate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "in", default = "default_in")]
    pub included: bool,
    #[serde(default)]
    pub join: Join,
    #[serde(default)]
    pub lst: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
}

impl Group {
    pub fn new(join: Join, lst: Vec<Filter>) -> Self {
        Self {
            included: true,
            join,
            lst,
            tag: None,
            id: None,
        }
    }

    /// A group with no entries and no join operator.
    pub fn empty() -> Self {
        Self::new(Join::None, vec![])
    }

    /// Wrap filters into a group, picking `and` for two or more entries and
    /// no join otherwise.
    pub fn wrap(lst: Vec<Filter>) -> Self {
        let join = if lst.len() > 1 { Join::And } else { Join::None };
        Self::new(join, lst)
    }
}

impl Not for Group {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self {
            included: !self.included,
            ..self
        }
    }
}

impl Display for Group {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        let separator = match self.join {
            Join::And => " and ",
            Join::Or => " or ",
            Join::None => ", ",
        };
        let body = self
            .lst
            .iter()
            .map(|child| match child {
                Filter::Tvslst(inner) if inner.lst.len() > 1 && inner.included => {
                    format!("({inner})")
                }
                other => other.to_string(),
            })
            .join(separator);
        if self.included {
            write!(formatter, "{body}")
        } else {
            write!(formatter, "not ({body})")
        }
    }
}

/// The boolean operator combining the entries of a [`Group`].
///
/// `None` (the empty string on the wire) is only valid for groups with
/// fewer than two entries.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Join {
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[default]
    #[serde(rename = "")]
    None,
}

impl Display for Join {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::And => write!(formatter, "and"),
            Self::Or => write!(formatter, "or"),
            Self::None => Ok(()),
        }
    }
}

fn default_in() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::filters::{and, lone, or, tvs},
        tvs::TermValue,
    };
    use serde_json::json;

    const A_TAG: &str = "filterUiRoot";

    #[test]
    fn can_parse_a_session_state_filter() {
        let filter: Filter = serde_json::from_str(
            r#"{
                "type": "tvslst",
                "in": true,
                "join": "or",
                "tag": "filterUiRoot",
                "lst": [
                    {"type": "tvs", "$id": 3, "tvs": {"term": {"id": "sex"}, "values": [{"key": 1, "label": "Male"}]}},
                    {"type": "tvslst", "in": false, "join": "", "lst": [
                        {"type": "tvs", "tvs": {"term": {"id": "agedx"}, "ranges": [{"start": 1, "stop": 5}]}}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let Filter::Tvslst(group) = &filter else {
            panic!("expected a group");
        };
        assert!(group.included);
        assert_eq!(Join::Or, group.join);
        assert_eq!(Some(A_TAG.to_owned()), group.tag);
        assert_eq!(2, group.lst.len());
        assert_eq!(2, filter.condition_count());
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn default_the_inclusion_and_join_fields_when_absent() {
        let filter: Filter = serde_json::from_str(r#"{"type": "tvslst", "lst": []}"#).unwrap();

        let Filter::Tvslst(group) = &filter else {
            panic!("expected a group");
        };
        assert!(group.included);
        assert_eq!(Join::None, group.join);
        assert!(filter.is_empty());
    }

    #[test]
    fn serialize_a_condition_with_the_wire_field_names() {
        let mut item = TvsItem::new(!Tvs::with_values(
            json!({ "id": "diaggrp" }),
            vec![TermValue::new(json!("ALL"))],
        ));
        item.id = Some(json!(7));

        let serialized = serde_json::to_value(Filter::Tvs(item)).unwrap();

        assert_eq!(
            json!({
                "type": "tvs",
                "$id": 7,
                "tvs": { "term": { "id": "diaggrp" }, "isnot": true, "values": [{ "key": "ALL" }] }
            }),
            serialized
        );
    }

    #[test]
    fn survive_a_serialization_round_trip() {
        let filter = or!(tvs!("diaggrp"), and!(tvs!("sex"), !tvs!("agedx")));

        let serialized = serde_json::to_string(&filter).unwrap();

        assert_eq!(filter, serde_json::from_str(&serialized).unwrap());
    }

    #[test]
    fn reject_an_unknown_node_type() {
        let result = serde_json::from_str::<Filter>(r#"{"type": "tvsgrp", "lst": []}"#);

        assert!(result.is_err());
    }

    #[test]
    fn can_find_a_subtree_by_tag() {
        let mut hidden = and!(tvs!("diaggrp"), tvs!("agedx"));
        if let Filter::Tvslst(group) = &mut hidden {
            group.tag = Some(A_TAG.to_owned());
        }
        let root = or!(tvs!("sex"), hidden.clone());

        assert_eq!(Some(&hidden), root.find_by_tag(A_TAG));
    }

    #[test]
    fn return_nothing_when_no_subtree_carries_the_tag() {
        let root = or!(tvs!("sex"), tvs!("diaggrp"));

        assert_eq!(None, root.find_by_tag(A_TAG));
    }

    #[test]
    fn can_find_a_subtree_by_id() {
        let mut leaf = tvs!("sex");
        if let Filter::Tvs(item) = &mut leaf {
            item.id = Some(json!("pill-3"));
        }
        let root = and!(tvs!("diaggrp"), leaf.clone());

        assert_eq!(Some(&leaf), root.find_by_id(&json!("pill-3")));
        assert_eq!(None, root.find_by_id(&json!("pill-4")));
    }

    #[test]
    fn can_strip_the_ui_markers() {
        let mut root: Filter = serde_json::from_str(
            r#"{
                "type": "tvslst", "$id": 1, "tag": "cohortFilter", "join": "", "lst": [
                    {"type": "tvs", "$id": 2, "tag": "pinned",
                     "tvs": {"term": {"id": "sex"}, "values": [{"key": 1}]}}
                ]
            }"#,
        )
        .unwrap();

        root.strip_ids();
        root.strip_tags();

        assert_eq!(None, root.find_by_id(&json!(2)));
        assert_eq!(None, root.find_by_tag("pinned"));
        assert_eq!(None, root.find_by_tag("cohortFilter"));
    }

    #[test]
    fn negating_a_group_flips_its_inclusion() {
        let filter = and!(tvs!("diaggrp"), tvs!("agedx"));

        let Filter::Tvslst(group) = !filter.clone() else {
            panic!("expected a group");
        };
        assert!(!group.included);
        assert_eq!(filter, !Filter::Tvslst(group));
    }

    #[test]
    fn return_an_error_when_a_small_group_carries_a_join() {
        let filter = Filter::Tvslst(Group::new(Join::And, vec![tvs!("sex")]));

        assert_eq!(
            Err(FilterError::ExtraJoin {
                join: Join::And,
                entries: 1
            }),
            filter.validate()
        );
    }

    #[test]
    fn return_an_error_when_a_large_group_is_missing_a_join() {
        let filter = Filter::Tvslst(Group::new(Join::None, vec![tvs!("sex"), tvs!("agedx")]));

        assert_eq!(
            Err(FilterError::MissingJoin { entries: 2 }),
            filter.validate()
        );
    }

    #[test]
    fn validate_nested_groups() {
        let malformed = Group::new(Join::Or, vec![tvs!("diaggrp")]);
        let filter = and!(tvs!("sex"), lone!(Filter::Tvslst(malformed)));

        assert_eq!(
            Err(FilterError::ExtraJoin {
                join: Join::Or,
                entries: 1
            }),
            filter.validate()
        );
    }

    #[test]
    fn can_render_a_readable_expression() {
        let filter = and!(tvs!("sex", 1), !or!(tvs!("diaggrp", "ALL"), tvs!("agedx", 5)));

        assert_eq!(
            r#"sex in [1] and not (diaggrp in ["ALL"] or agedx in [5])"#,
            filter.to_string()
        );
    }
}
