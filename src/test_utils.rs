pub mod filters {
    macro_rules! tvs {
        ($name:expr) => {
            tvs!($name, "ALL")
        };
        ($name:expr, $key:expr) => {
            Filter::Tvs(TvsItem::new(Tvs::with_values(
                serde_json::json!({ "id": $name, "name": $name, "type": "categorical" }),
                vec![TermValue::new(serde_json::json!($key))],
            )))
        };
    }

    macro_rules! and {
        ($($child:expr),+ $(,)?) => {
            Filter::Tvslst(Group::new(Join::And, vec![$($child),+]))
        };
    }

    macro_rules! or {
        ($($child:expr),+ $(,)?) => {
            Filter::Tvslst(Group::new(Join::Or, vec![$($child),+]))
        };
    }

    macro_rules! lone {
        ($child:expr) => {
            Filter::Tvslst(Group::new(Join::None, vec![$child]))
        };
    }

    macro_rules! empty {
        () => {
            Filter::Tvslst(Group::empty())
        };
    }

    pub(crate) use and;
    pub(crate) use empty;
    pub(crate) use lone;
    pub(crate) use or;
    pub(crate) use tvs;
}
