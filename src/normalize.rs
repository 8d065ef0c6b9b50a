use crate::filter::{Filter, Group};

/// Rewrite a filter tree into its canonical, minimal-nesting equivalent.
///
/// The returned tree preserves the logical meaning and child order of the
/// input, never aliases it, is always rooted at a group and carries no
/// `tag`/`$id` markers. It is the form handed to server query builders:
///
/// * groups with no entries are dropped from their parent's list;
/// * a group with a single entry is replaced by that entry, absorbing the
///   group's negation (a condition flips `isnot`, a group flips `in`);
/// * an included child group joined like its parent is flattened into the
///   parent's list.
///
/// Children are rewritten before their parent, so multi-level collapses
/// cascade in one pass.
///
/// # Examples
///
/// ```rust
/// use cohort_filter::{normal_root, Filter};
///
/// let raw: Filter = serde_json::from_str(r#"{
///     "type": "tvslst",
///     "in": true,
///     "join": "and",
///     "lst": [
///         {"type": "tvslst", "in": true, "join": "", "tag": "filterUiRoot", "lst": []},
///         {"type": "tvs", "tvs": {"term": {"id": "sex"}, "values": [{"key": 1}]}}
///     ]
/// }"#).unwrap();
///
/// let canonical = normal_root(&raw);
///
/// // the empty user-editable group is gone and the condition was hoisted
/// assert_eq!(canonical.condition_count(), 1);
/// assert!(canonical.find_by_tag("filterUiRoot").is_none());
/// ```
pub fn normal_root(raw: &Filter) -> Filter {
    match normalize(raw.clone()) {
        root @ Filter::Tvslst(_) => root,
        leaf => Filter::Tvslst(Group::wrap(vec![leaf])),
    }
}

fn normalize(filter: Filter) -> Filter {
    match filter {
        Filter::Tvs(mut item) => {
            item.tag = None;
            item.id = None;
            Filter::Tvs(item)
        }
        Filter::Tvslst(group) => normalize_group(group),
    }
}

fn normalize_group(group: Group) -> Filter {
    let mut lst: Vec<Filter> = group
        .lst
        .into_iter()
        .map(normalize)
        .filter(|child| !child.is_empty())
        .collect();
    if lst.is_empty() {
        return Filter::Tvslst(Group::empty());
    }
    if lst.len() == 1 {
        // a lone entry absorbs its parent's negation
        let only = lst.remove(0);
        return if group.included { only } else { !only };
    }
    let mut flattened = Vec::with_capacity(lst.len());
    for child in lst {
        match child {
            Filter::Tvslst(inner) if inner.included && inner.join == group.join => {
                flattened.extend(inner.lst);
            }
            other => flattened.push(other),
        }
    }
    Filter::Tvslst(Group {
        included: group.included,
        join: group.join,
        lst: flattened,
        tag: None,
        id: None,
    })
}
