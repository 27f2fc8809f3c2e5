use serde::{Deserialize, Serialize};

/// Scalar value kinds a leaf column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Integer,
    Decimal,
    Boolean,
    Null,
}

/// Type of a resource field.
///
/// `Optional` and `List` wrap another type and may nest in any order.
/// `Named` refers to another model by type name; whether that name is a
/// composite type is decided by a [`TypeCatalog`](crate::TypeCatalog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum FieldType {
    Primitive(PrimitiveKind),
    Named(String),
    Optional(Box<FieldType>),
    List(Box<FieldType>),
    /// No type information could be resolved for the field.
    Unknown,
}

/// Result of stripping every `Optional` and `List` layer from a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnwrappedType<'a> {
    pub is_optional: bool,
    pub is_list: bool,
    pub inner: &'a FieldType,
}

impl FieldType {
    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    pub fn list(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    pub fn named(name: impl Into<String>) -> Self {
        FieldType::Named(name.into())
    }

    /// Strip wrappers in any nesting order and merge their flags.
    ///
    /// `Optional<List<T>>`, `List<Optional<T>>` and deeper mixes all report a
    /// single `(is_optional, is_list)` pair with `T` as the inner type.
    pub fn strip_wrappers(&self) -> UnwrappedType<'_> {
        let mut is_optional = false;
        let mut is_list = false;
        let mut current = self;
        loop {
            match current {
                FieldType::Optional(inner) => {
                    is_optional = true;
                    current = inner;
                }
                FieldType::List(inner) => {
                    is_list = true;
                    current = inner;
                }
                _ => {
                    return UnwrappedType {
                        is_optional,
                        is_list,
                        inner: current,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_wrappers_merges_flags_in_any_order() {
        let inner = FieldType::named("HumanName");
        let cases = [
            FieldType::optional(FieldType::list(inner.clone())),
            FieldType::list(FieldType::optional(inner.clone())),
            FieldType::optional(FieldType::list(FieldType::optional(FieldType::list(
                inner.clone(),
            )))),
        ];

        for case in &cases {
            let unwrapped = case.strip_wrappers();
            assert!(unwrapped.is_optional);
            assert!(unwrapped.is_list);
            assert_eq!(unwrapped.inner, &inner);
        }
    }

    #[test]
    fn strip_wrappers_bare_type_has_no_flags() {
        let ty = FieldType::Primitive(PrimitiveKind::Boolean);
        let unwrapped = ty.strip_wrappers();
        assert!(!unwrapped.is_optional);
        assert!(!unwrapped.is_list);
        assert_eq!(unwrapped.inner, &ty);
    }
}
