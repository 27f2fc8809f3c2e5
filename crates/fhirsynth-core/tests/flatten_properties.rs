use fhirsynth_core::{
    CaseStyle, FieldDescriptor, FieldType, FlattenConfig, ModelCatalog, PrimitiveKind,
    ResourceModel, flatten, to_case,
};
use proptest::prelude::*;

const TYPE_NAMES: [&str; 3] = ["Alpha", "Beta", "Gamma"];

/// Identifiers built from words of two or more letters, joined by `_` or by
/// capitalisation. Adjacent single-letter words merge under a camel round trip.
fn arb_identifier() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-z]{2,6}", any::<bool>()), 1..5).prop_map(|words| {
        let mut out = String::new();
        for (idx, (word, underscore)) in words.into_iter().enumerate() {
            if idx > 0 && underscore {
                out.push('_');
                out.push_str(&word);
            } else if idx > 0 {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    out.push(first.to_ascii_uppercase());
                    out.extend(chars);
                }
            } else {
                out.push_str(&word);
            }
        }
        out
    })
}

fn arb_inner_type() -> impl Strategy<Value = FieldType> {
    prop_oneof![
        Just(FieldType::Primitive(PrimitiveKind::String)),
        Just(FieldType::Primitive(PrimitiveKind::Boolean)),
        Just(FieldType::Unknown),
        Just(FieldType::named("Opaque")),
        (0..TYPE_NAMES.len()).prop_map(|idx| FieldType::named(TYPE_NAMES[idx])),
    ]
}

fn arb_field_type() -> impl Strategy<Value = FieldType> {
    (arb_inner_type(), any::<bool>(), any::<bool>()).prop_map(|(inner, list, optional)| {
        let ty = if list { FieldType::list(inner) } else { inner };
        if optional { FieldType::optional(ty) } else { ty }
    })
}

fn arb_model(name: &'static str) -> impl Strategy<Value = ResourceModel> {
    prop::collection::vec(("[a-z]{1,6}", arb_field_type()), 0..5).prop_map(move |fields| {
        ResourceModel::new(
            name,
            fields
                .into_iter()
                .map(|(field, ty)| FieldDescriptor::new(field, ty))
                .collect(),
        )
    })
}

fn arb_catalog() -> impl Strategy<Value = ModelCatalog> {
    (arb_model("Alpha"), arb_model("Beta"), arb_model("Gamma"))
        .prop_map(|(a, b, c)| [a, b, c].into_iter().collect())
}

/// Upper bound on emitted columns: every level multiplies fan-out by the
/// widest a single field can get.
fn column_bound(catalog: &ModelCatalog, root: &ResourceModel, config: &FlattenConfig) -> usize {
    let fan_out = catalog
        .iter()
        .map(|(_, model)| model.fields.len())
        .chain(std::iter::once(root.fields.len()))
        .max()
        .unwrap_or(0);
    let per_field = config.max_array_items.max(1);
    let branching = fan_out * per_field;
    (0..config.max_depth)
        .map(|level| branching.saturating_pow(level as u32 + 1))
        .fold(0usize, usize::saturating_add)
}

proptest! {
    #[test]
    fn flatten_is_bounded_and_deterministic(
        catalog in arb_catalog(),
        root in arb_model("Root"),
        max_depth in 0usize..4,
        max_array_items in 0usize..3,
    ) {
        let config = FlattenConfig::default()
            .with_max_depth(max_depth)
            .with_max_array_items(max_array_items);

        let first = flatten(&root, &catalog, &config);
        let second = flatten(&root, &catalog, &config);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.len() <= column_bound(&catalog, &root, &config));
        if max_depth == 0 {
            prop_assert!(first.is_empty());
        }
    }

    #[test]
    fn case_transform_is_idempotent(name in arb_identifier()) {
        for style in [CaseStyle::Snake, CaseStyle::Camel, CaseStyle::Pascal] {
            let once = to_case(&name, &style);
            prop_assert_eq!(to_case(&once, &style), once);
        }
    }
}
