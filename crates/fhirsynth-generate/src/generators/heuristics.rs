use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use super::{GeneratedValue, Generator, GeneratorRegistry, GeneratorState};

const GIVEN_NAMES: &[&str] = &[
    "John", "Jane", "Michael", "Sarah", "David", "Lisa", "Robert", "Mary", "James", "Jennifer",
];
const FAMILY_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
];
const EMAIL_NAMES: &[&str] = &["john", "jane", "mike", "sarah"];
const EMAIL_DOMAINS: &[&str] = &["example.com", "test.org", "demo.net"];
const STREET_NAMES: &[&str] = &["Main", "Oak", "First", "Second"];
const CITIES: &[&str] = &[
    "New York",
    "Los Angeles",
    "Chicago",
    "Houston",
    "Phoenix",
    "Philadelphia",
];
const STATES: &[&str] = &["NY", "CA", "IL", "TX", "AZ", "PA"];
const COUNTRIES: &[&str] = &["US", "CA", "GB", "AU"];
const GENDERS: &[&str] = &["male", "female", "other", "unknown"];
const LANGUAGES: &[&str] = &["en", "es", "fr", "de"];
const CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";

const PATIENT_STATUSES: &[&str] = &["active", "inactive", "entered-in-error"];
const OBSERVATION_STATUSES: &[&str] = &["final", "preliminary", "amended"];
const GENERIC_STATUSES: &[&str] = &["active", "inactive", "completed", "draft"];

/// Registers the column-name heuristics in match order.
pub(super) fn register(registry: &mut GeneratorRegistry) {
    registry.register_generator(Box::new(IdGenerator));
    registry.register_generator(Box::new(ResourceTypeGenerator));
    registry.register_generator(Box::new(UuidGenerator));
    registry.register_generator(Box::new(StatusGenerator));
    registry.register_generator(Box::new(FlagGenerator));
    registry.register_generator(Box::new(BirthDateGenerator));
    registry.register_generator(Box::new(DateGenerator));
    registry.register_generator(Box::new(ChoiceGenerator {
        id: "fhir.given_name",
        terms: &["given", "first"],
        values: GIVEN_NAMES,
    }));
    registry.register_generator(Box::new(ChoiceGenerator {
        id: "fhir.family_name",
        terms: &["family", "last"],
        values: FAMILY_NAMES,
    }));
    registry.register_generator(Box::new(EmailGenerator));
    registry.register_generator(Box::new(PhoneGenerator));
    registry.register_generator(Box::new(StreetGenerator));
    registry.register_generator(Box::new(ChoiceGenerator {
        id: "fhir.city",
        terms: &["city"],
        values: CITIES,
    }));
    registry.register_generator(Box::new(ChoiceGenerator {
        id: "fhir.state",
        terms: &["state"],
        values: STATES,
    }));
    registry.register_generator(Box::new(PostalCodeGenerator));
    registry.register_generator(Box::new(ChoiceGenerator {
        id: "fhir.country",
        terms: &["country"],
        values: COUNTRIES,
    }));
    registry.register_generator(Box::new(ChoiceGenerator {
        id: "fhir.gender",
        terms: &["gender"],
        values: GENDERS,
    }));
    registry.register_generator(Box::new(ChoiceGenerator {
        id: "fhir.language",
        terms: &["language"],
        values: LANGUAGES,
    }));
    registry.register_generator(Box::new(ChoiceGenerator {
        id: "fhir.system",
        terms: &["system"],
        values: &[CODE_SYSTEM],
    }));
    registry.register_generator(Box::new(CodeGenerator));
    registry.register_generator(Box::new(SequenceTextGenerator {
        id: "fhir.display",
        terms: &["display"],
        prefix: "Display Text",
    }));
    registry.register_generator(Box::new(QuantityGenerator));
    registry.register_generator(Box::new(SequenceTextGenerator {
        id: "fhir.text",
        terms: &["text", "description", "note"],
        prefix: "Sample text content",
    }));
    registry.register_generator(Box::new(UrlGenerator));
    registry.register_generator(Box::new(VersionGenerator));
    registry.register_generator(Box::new(NameGenerator));
}

fn contains_any(column: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| column.contains(term))
}

fn pick(values: &[&str], rng: &mut dyn RngCore) -> String {
    values.choose(rng).copied().unwrap_or_default().to_string()
}

struct IdGenerator;

impl Generator for IdGenerator {
    fn id(&self) -> &'static str {
        "fhir.id"
    }

    fn matches(&self, column: &str) -> bool {
        column == "id" || column.ends_with("_id")
    }

    fn generate(&self, state: &mut GeneratorState, _rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Text(state.next_unique_id())
    }
}

struct ResourceTypeGenerator;

impl Generator for ResourceTypeGenerator {
    fn id(&self) -> &'static str {
        "fhir.resource_type"
    }

    fn matches(&self, column: &str) -> bool {
        column == "resource_type"
    }

    fn generate(&self, state: &mut GeneratorState, _rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Text(state.resource_type().to_string())
    }
}

struct UuidGenerator;

impl Generator for UuidGenerator {
    fn id(&self) -> &'static str {
        "fhir.uuid"
    }

    fn matches(&self, column: &str) -> bool {
        contains_any(column, &["identifier", "uuid", "reference"])
    }

    fn generate(&self, _state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        let mut bytes = [0_u8; 16];
        rng.fill_bytes(&mut bytes);
        GeneratedValue::Uuid(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
    }
}

struct StatusGenerator;

impl Generator for StatusGenerator {
    fn id(&self) -> &'static str {
        "fhir.status"
    }

    fn matches(&self, column: &str) -> bool {
        column.contains("status")
    }

    fn generate(&self, state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        let values = match state.resource_type() {
            "Patient" => PATIENT_STATUSES,
            "Observation" => OBSERVATION_STATUSES,
            _ => GENERIC_STATUSES,
        };
        GeneratedValue::Text(pick(values, rng))
    }
}

struct FlagGenerator;

impl Generator for FlagGenerator {
    fn id(&self) -> &'static str {
        "fhir.flag"
    }

    fn matches(&self, column: &str) -> bool {
        contains_any(column, &["active", "deceased", "implicit_rules"])
    }

    fn generate(&self, _state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Bool(rng.random_bool(0.5))
    }
}

fn is_temporal(column: &str) -> bool {
    contains_any(column, &["date", "time"])
}

struct BirthDateGenerator;

impl Generator for BirthDateGenerator {
    fn id(&self) -> &'static str {
        "fhir.birth_date"
    }

    fn matches(&self, column: &str) -> bool {
        is_temporal(column) && column.contains("birth")
    }

    fn generate(&self, _state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        let year = rng.random_range(1920..=2020);
        let month = rng.random_range(1..=12);
        let day = rng.random_range(1..=28);
        match chrono::NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => GeneratedValue::Date(date),
            None => GeneratedValue::Text(format!("{year:04}-{month:02}-{day:02}")),
        }
    }
}

struct DateGenerator;

impl Generator for DateGenerator {
    fn id(&self) -> &'static str {
        "fhir.date"
    }

    fn matches(&self, column: &str) -> bool {
        is_temporal(column)
    }

    fn generate(&self, state: &mut GeneratorState, _rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Date(state.base_date())
    }
}

/// Picks uniformly from a fixed value list.
struct ChoiceGenerator {
    id: &'static str,
    terms: &'static [&'static str],
    values: &'static [&'static str],
}

impl Generator for ChoiceGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn matches(&self, column: &str) -> bool {
        contains_any(column, self.terms)
    }

    fn generate(&self, _state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Text(pick(self.values, rng))
    }
}

/// `{prefix} {counter}`.
struct SequenceTextGenerator {
    id: &'static str,
    terms: &'static [&'static str],
    prefix: &'static str,
}

impl Generator for SequenceTextGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn matches(&self, column: &str) -> bool {
        contains_any(column, self.terms)
    }

    fn generate(&self, state: &mut GeneratorState, _rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Text(format!("{} {}", self.prefix, state.counter()))
    }
}

struct EmailGenerator;

impl Generator for EmailGenerator {
    fn id(&self) -> &'static str {
        "fhir.email"
    }

    fn matches(&self, column: &str) -> bool {
        column.contains("email")
    }

    fn generate(&self, state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        let name = pick(EMAIL_NAMES, rng);
        let domain = pick(EMAIL_DOMAINS, rng);
        GeneratedValue::Text(format!("{name}{}@{domain}", state.counter()))
    }
}

struct PhoneGenerator;

impl Generator for PhoneGenerator {
    fn id(&self) -> &'static str {
        "fhir.phone"
    }

    fn matches(&self, column: &str) -> bool {
        column.contains("phone")
    }

    fn generate(&self, _state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        let area: u32 = rng.random_range(200..=999);
        let exchange: u32 = rng.random_range(200..=999);
        let line: u32 = rng.random_range(1000..=9999);
        GeneratedValue::Text(format!("+1-{area}-{exchange}-{line}"))
    }
}

struct StreetGenerator;

impl Generator for StreetGenerator {
    fn id(&self) -> &'static str {
        "fhir.street"
    }

    fn matches(&self, column: &str) -> bool {
        contains_any(column, &["line", "street"])
    }

    fn generate(&self, _state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        let number: u32 = rng.random_range(100..=9999);
        let street = pick(STREET_NAMES, rng);
        GeneratedValue::Text(format!("{number} {street} St"))
    }
}

struct PostalCodeGenerator;

impl Generator for PostalCodeGenerator {
    fn id(&self) -> &'static str {
        "fhir.postal_code"
    }

    fn matches(&self, column: &str) -> bool {
        contains_any(column, &["postal", "zip"])
    }

    fn generate(&self, _state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Text(rng.random_range(10000..=99999_u32).to_string())
    }
}

struct CodeGenerator;

impl Generator for CodeGenerator {
    fn id(&self) -> &'static str {
        "fhir.code"
    }

    fn matches(&self, column: &str) -> bool {
        column.contains("code")
    }

    fn generate(&self, _state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Text(format!("CODE-{}", rng.random_range(1000..=9999_u32)))
    }
}

struct QuantityGenerator;

impl Generator for QuantityGenerator {
    fn id(&self) -> &'static str {
        "fhir.quantity"
    }

    fn matches(&self, column: &str) -> bool {
        column.contains("value") && contains_any(column, &["quantity", "integer"])
    }

    fn generate(&self, _state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Int(rng.random_range(1..=100))
    }
}

struct UrlGenerator;

impl Generator for UrlGenerator {
    fn id(&self) -> &'static str {
        "fhir.url"
    }

    fn matches(&self, column: &str) -> bool {
        column.contains("url")
    }

    fn generate(&self, state: &mut GeneratorState, _rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Text(format!("https://example.com/resource/{}", state.counter()))
    }
}

struct VersionGenerator;

impl Generator for VersionGenerator {
    fn id(&self) -> &'static str {
        "fhir.version"
    }

    fn matches(&self, column: &str) -> bool {
        column.contains("version")
    }

    fn generate(&self, _state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue {
        let minor: u8 = rng.random_range(0..=9);
        let patch: u8 = rng.random_range(0..=9);
        GeneratedValue::Text(format!("1.{minor}.{patch}"))
    }
}

struct NameGenerator;

impl Generator for NameGenerator {
    fn id(&self) -> &'static str {
        "fhir.name"
    }

    fn matches(&self, column: &str) -> bool {
        contains_any(column, &["name", "title"])
    }

    fn generate(&self, state: &mut GeneratorState, _rng: &mut dyn RngCore) -> GeneratedValue {
        GeneratedValue::Text(format!(
            "Sample {} {}",
            state.resource_type(),
            state.counter()
        ))
    }
}
