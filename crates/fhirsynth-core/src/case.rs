//! Naming-convention transforms applied to generated column names.

use crate::config::CaseStyle;

/// Convert `name` to the given case style.
///
/// `CaseStyle::Preserve` returns the input unchanged.
pub fn to_case(name: &str, style: &CaseStyle) -> String {
    match style {
        CaseStyle::Snake => to_snake_case(name),
        CaseStyle::Camel => to_camel_case(name),
        CaseStyle::Pascal => to_pascal_case(name),
        CaseStyle::Preserve(_) => name.to_string(),
    }
}

/// Convert to `snake_case`.
///
/// An underscore goes before every uppercase character (other than the
/// first) that follows a lowercase character or precedes one, so acronym
/// runs stay together except at their trailing boundary:
/// `XMLParser` becomes `xml_parser`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (idx, ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && idx > 0 {
            let prev_lower = chars[idx - 1].is_lowercase();
            let next_lower = chars.get(idx + 1).is_some_and(|next| next.is_lowercase());
            if prev_lower || next_lower {
                out.push('_');
            }
        }
        out.extend(ch.to_lowercase());
    }

    out
}

/// Convert to `camelCase`.
pub fn to_camel_case(name: &str) -> String {
    let snake = to_snake_case(name);
    let mut parts = snake.split('_');
    let mut out = parts.next().unwrap_or_default().to_lowercase();
    for part in parts {
        out.push_str(&capitalize(part));
    }
    out
}

/// Convert to `PascalCase`.
pub fn to_pascal_case(name: &str) -> String {
    to_snake_case(name).split('_').map(capitalize).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_splits_camel_and_acronym_boundaries() {
        assert_eq!(to_snake_case("patientGivenName"), "patient_given_name");
        assert_eq!(to_snake_case("XMLParser"), "xml_parser");
        assert_eq!(to_snake_case("modifierExtension"), "modifier_extension");
        assert_eq!(to_snake_case("address_0_line"), "address_0_line");
        assert_eq!(to_snake_case("HTTP"), "http");
    }

    #[test]
    fn camel_and_pascal_from_snake() {
        assert_eq!(to_camel_case("patient_given_name"), "patientGivenName");
        assert_eq!(to_pascal_case("patient_given_name"), "PatientGivenName");
        assert_eq!(to_camel_case("name_0_given_1"), "name0Given1");
        assert_eq!(to_pascal_case("telecom_2_system"), "Telecom2System");
    }

    #[test]
    fn single_letter_and_leading_underscore_segments_are_not_stable() {
        assert_eq!(to_pascal_case("a_b_c"), "ABC");
        assert_eq!(to_pascal_case("ABC"), "Abc");
        assert_eq!(to_camel_case("_id"), "Id");
        assert_eq!(to_camel_case("Id"), "id");
        assert_eq!(to_pascal_case("value_0_x"), "Value0X");
        assert_eq!(to_pascal_case("Value0X"), "Value0x");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        for style in [
            CaseStyle::Snake,
            CaseStyle::Camel,
            CaseStyle::Pascal,
            CaseStyle::Preserve("kebab".to_string()),
        ] {
            assert_eq!(to_case("", &style), "");
        }
    }

    #[test]
    fn preserve_is_identity() {
        let style = CaseStyle::Preserve("as-is".to_string());
        assert_eq!(to_case("birthDate_0", &style), "birthDate_0");
    }
}
