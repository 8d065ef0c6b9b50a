use cohort_filter::{filter_join, normal_root, Filter};

const SESSION_FILTER: &str = r#"{
    "type": "tvslst",
    "in": true,
    "join": "and",
    "lst": [
        {"type": "tvslst", "in": true, "join": "", "tag": "filterUiRoot", "lst": [
            {"type": "tvs", "$id": 1, "tvs": {
                "term": {"id": "sex", "name": "Sex", "type": "categorical"},
                "values": [{"key": 1, "label": "Male"}]
            }}
        ]},
        {"type": "tvslst", "in": true, "join": "and", "tag": "cohortFilter", "lst": [
            {"type": "tvs", "tvs": {
                "term": {"id": "diaggrp", "name": "Diagnosis Group", "type": "categorical"},
                "values": [{"key": "ALL", "label": "Acute lymphoblastic leukemia"}]
            }},
            {"type": "tvs", "tvs": {
                "term": {"id": "agedx", "name": "Age at diagnosis", "type": "float"},
                "ranges": [{"stop": 5, "stopinclusive": true, "startunbounded": true}]
            }}
        ]}
    ]
}"#;

const HIDDEN_FILTER: &str = r#"{
    "type": "tvslst",
    "in": true,
    "join": "",
    "lst": [
        {"type": "tvs", "tvs": {
            "term": {"id": "subcohort", "name": "Subcohort", "type": "categorical"},
            "values": [{"key": "SJLIFE"}]
        }}
    ]
}"#;

fn main() {
    // Parse the filter the way it is stored in session state
    let raw: Filter = serde_json::from_str(SESSION_FILTER).unwrap();
    println!("raw:       {raw}");

    // Collapse it into the canonical form used for server queries
    let canonical = normal_root(&raw);
    println!("canonical: {canonical}");

    // Combine it with a dataset-provided hidden filter
    let hidden: Filter = serde_json::from_str(HIDDEN_FILTER).unwrap();
    let combined = filter_join(&[hidden, canonical]).unwrap();
    println!("combined:  {combined}");

    println!("{}", serde_json::to_string_pretty(&combined).unwrap());
}
