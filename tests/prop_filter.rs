use docrel::query::filter::compile;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

proptest! {
    #[test]
    fn equality_filters_bind_one_param_per_field(
        fields in proptest::collection::btree_map("[a-z]{1,6}", "[a-zA-Z0-9 ]{0,12}", 0..6)
    ) {
        let map: Map<String, Value> =
            fields.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect();
        let compiled = compile(&Value::Object(map.clone()), 1).unwrap();
        prop_assert_eq!(compiled.params.len(), map.len());
        prop_assert_eq!(compiled.clause.is_none(), map.is_empty());
        if let Some(clause) = &compiled.clause {
            // Placeholders are contiguous from $1 and literals never leak
            // into statement text.
            prop_assert_eq!(clause.matches('$').count(), compiled.params.len());
            for i in 1..=compiled.params.len() {
                let placeholder = format!("${i}");
                prop_assert!(clause.contains(&placeholder));
            }
        }
    }

    #[test]
    fn in_lists_bind_one_param_per_element(
        values in proptest::collection::vec("[a-z0-9]{0,8}", 0..8)
    ) {
        let filter = json!({"status": {"$in": values.clone()}});
        let compiled = compile(&filter, 1).unwrap();
        prop_assert_eq!(compiled.params.len(), values.len());
        if values.is_empty() {
            prop_assert_eq!(compiled.clause.as_deref(), Some("FALSE"));
        }
    }

    #[test]
    fn starting_index_shifts_every_placeholder(start in 1usize..20) {
        let compiled = compile(&json!({"a": "x", "b": "y"}), start).unwrap();
        let clause = compiled.clause.unwrap();
        let first = format!("${start}");
        prop_assert!(clause.contains(&first));
        let second = format!("${}", start + 1);
        prop_assert!(clause.contains(&second));
        prop_assert_eq!(compiled.params.len(), 2);
    }
}
