use std::collections::HashSet;

use chrono::NaiveDate;
use rand::RngCore;
use serde_json::Value;

mod heuristics;

/// Generated value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(String),
    Date(NaiveDate),
}

impl GeneratedValue {
    pub fn to_csv(&self) -> String {
        match self {
            GeneratedValue::Null => String::new(),
            GeneratedValue::Bool(value) => value.to_string(),
            GeneratedValue::Int(value) => value.to_string(),
            GeneratedValue::Text(value) | GeneratedValue::Uuid(value) => value.clone(),
            GeneratedValue::Date(value) => value.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            GeneratedValue::Null => Value::Null,
            GeneratedValue::Bool(value) => Value::Bool(*value),
            GeneratedValue::Int(value) => Value::from(*value),
            GeneratedValue::Text(value) | GeneratedValue::Uuid(value) => {
                Value::String(value.clone())
            }
            GeneratedValue::Date(value) => Value::String(value.format("%Y-%m-%d").to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(value) | GeneratedValue::Uuid(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Mutable state shared by the generators of one run.
///
/// `counter` advances on every generated value, which keeps sequence-based
/// values (ids, display texts) unique across columns and records.
#[derive(Debug, Clone)]
pub struct GeneratorState {
    resource_type: String,
    resource_lower: String,
    counter: u64,
    used_ids: HashSet<String>,
    base_date: NaiveDate,
}

impl GeneratorState {
    pub fn new(resource_type: impl Into<String>, base_date: NaiveDate) -> Self {
        let resource_type = resource_type.into();
        Self {
            resource_lower: resource_type.to_lowercase(),
            resource_type,
            counter: 0,
            used_ids: HashSet::new(),
            base_date,
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn base_date(&self) -> NaiveDate {
        self.base_date
    }

    fn advance(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    /// Next `{resource}-{counter:06}` id that has not been handed out.
    fn next_unique_id(&mut self) -> String {
        loop {
            let id = format!("{}-{:06}", self.resource_lower, self.counter);
            if self.used_ids.insert(id.clone()) {
                return id;
            }
            self.counter += 1;
        }
    }
}

/// A value generator selected by column name.
pub trait Generator: Send + Sync {
    /// Stable identifier used in reports.
    fn id(&self) -> &'static str;

    /// Whether this generator serves the (lower-cased) column name.
    fn matches(&self, column: &str) -> bool;

    fn generate(&self, state: &mut GeneratorState, rng: &mut dyn RngCore) -> GeneratedValue;
}

/// Ordered set of generators; the first match wins.
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn Generator>>,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            generators: Vec::new(),
        };
        heuristics::register(&mut registry);
        registry
    }

    pub fn register_generator(&mut self, generator: Box<dyn Generator>) {
        self.generators.push(generator);
    }

    /// Generator serving `column`, if any heuristic matches.
    pub fn resolve(&self, column: &str) -> Option<&dyn Generator> {
        let column = column.to_lowercase();
        self.generators
            .iter()
            .find(|generator| generator.matches(&column))
            .map(|generator| generator.as_ref())
    }

    /// Resolve generators for every column once.
    pub fn plan_columns<'a, I>(&'a self, columns: I) -> ColumnPlan<'a>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let slots = columns
            .into_iter()
            .map(|column| self.resolve(column.as_ref()))
            .collect();
        ColumnPlan { slots }
    }

    /// Generate one value for `column`.
    pub fn generate_value(
        &self,
        column: &str,
        state: &mut GeneratorState,
        rng: &mut dyn RngCore,
    ) -> GeneratedValue {
        run_slot(self.resolve(column), state, rng)
    }
}

/// Generators resolved per column, in column order.
pub struct ColumnPlan<'a> {
    slots: Vec<Option<&'a dyn Generator>>,
}

impl<'a> ColumnPlan<'a> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Generator ids per column; `None` marks a column without a heuristic.
    pub fn generator_ids(&self) -> impl Iterator<Item = Option<&'static str>> + '_ {
        self.slots.iter().map(|slot| slot.map(|generator| generator.id()))
    }

    /// Generate one record with a value per column.
    pub fn generate_record(
        &self,
        state: &mut GeneratorState,
        rng: &mut dyn RngCore,
    ) -> Vec<GeneratedValue> {
        self.slots
            .iter()
            .map(|slot| run_slot(*slot, state, rng))
            .collect()
    }
}

fn run_slot(
    slot: Option<&dyn Generator>,
    state: &mut GeneratorState,
    rng: &mut dyn RngCore,
) -> GeneratedValue {
    state.advance();
    match slot {
        Some(generator) => generator.generate(state, rng),
        None => GeneratedValue::Text(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn state(resource: &str) -> GeneratorState {
        GeneratorState::new(resource, NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"))
    }

    #[test]
    fn ids_follow_counter_and_stay_unique() {
        let registry = GeneratorRegistry::new();
        let mut state = state("Patient");
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let first = registry.generate_value("id", &mut state, &mut rng);
        assert_eq!(first, GeneratedValue::Text("patient-000001".to_string()));

        let second = registry.generate_value("text_id", &mut state, &mut rng);
        assert_eq!(second, GeneratedValue::Text("patient-000002".to_string()));
        assert_eq!(state.counter(), 2);
    }

    #[test]
    fn colliding_id_bumps_counter() {
        let mut state = state("Patient");
        state.used_ids.insert("patient-000001".to_string());
        state.counter = 1;
        assert_eq!(state.next_unique_id(), "patient-000002");
        assert_eq!(state.counter(), 2);
    }

    #[test]
    fn unmatched_column_is_empty_text_and_still_counts() {
        let registry = GeneratorRegistry::new();
        let mut state = state("Patient");
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        assert!(registry.resolve("multiple_birth_integer").is_none());
        let value = registry.generate_value("multiple_birth_integer", &mut state, &mut rng);
        assert_eq!(value, GeneratedValue::Text(String::new()));
        assert_eq!(state.counter(), 1);
    }

    #[test]
    fn rule_order_prefers_earlier_heuristics() {
        let registry = GeneratorRegistry::new();
        let id_of = |column: &str| registry.resolve(column).map(|generator| generator.id());

        assert_eq!(id_of("id"), Some("fhir.id"));
        assert_eq!(id_of("resource_type"), Some("fhir.resource_type"));
        assert_eq!(id_of("identifier_0_value"), Some("fhir.uuid"));
        assert_eq!(id_of("text_status"), Some("fhir.status"));
        assert_eq!(id_of("implicit_rules"), Some("fhir.flag"));
        assert_eq!(id_of("birth_date"), Some("fhir.birth_date"));
        assert_eq!(id_of("meta_last_updated"), Some("fhir.date"));
        assert_eq!(id_of("name_0_given_0"), Some("fhir.given_name"));
        assert_eq!(id_of("name_0_family"), Some("fhir.family_name"));
        assert_eq!(id_of("telecom_0_system"), Some("fhir.system"));
        assert_eq!(id_of("address_0_postal_code"), Some("fhir.postal_code"));
        assert_eq!(id_of("value_quantity_value"), Some("fhir.quantity"));
        assert_eq!(id_of("code_text"), Some("fhir.code"));
        assert_eq!(id_of("note_0_author_string"), Some("fhir.text"));
        assert_eq!(id_of("photo_0_url"), Some("fhir.url"));
        assert_eq!(id_of("meta_version_id"), Some("fhir.id"));
        assert_eq!(id_of("name_0_prefix_0"), Some("fhir.name"));
        assert_eq!(id_of("multiple_birth_integer"), None);
    }
}
