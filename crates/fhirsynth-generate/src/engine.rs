use std::path::PathBuf;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use fhirsynth_core::{ColumnList, FlattenConfig, ResourceModel, TypeCatalog, column_list};

use crate::errors::GenerationError;
use crate::generators::{GeneratorRegistry, GeneratorState};
use crate::model::{GenerateOptions, GenerationReport};
use crate::output::{default_output_path, open_writer};

const PROGRESS_INTERVAL: u64 = 10_000;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub output_path: PathBuf,
    pub columns: ColumnList,
    pub report: GenerationReport,
}

/// Entry point for generating a dataset for one resource type.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Output file the run writes to, resolved against the current time when
    /// no explicit path is configured.
    pub fn output_path(&self, resource_type: &str) -> PathBuf {
        match &self.options.path {
            Some(path) => path.clone(),
            None => default_output_path(
                &self.options.out_dir,
                resource_type,
                self.options.count,
                self.options.format,
                chrono::Local::now().naive_local(),
            ),
        }
    }

    pub fn run(
        &self,
        resource: &ResourceModel,
        catalog: &dyn TypeCatalog,
        flatten: &FlattenConfig,
    ) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        let columns = column_list(resource, catalog, flatten);
        if columns.is_empty() {
            return Err(GenerationError::NoColumns(resource.name.clone()));
        }

        let output_path = self.output_path(&resource.name);
        let format = self.options.format;
        let seed = hash_seed(self.options.seed, &resource.name);

        info!(
            run_id = %run_id,
            resource = %resource.name,
            columns = columns.len(),
            records = self.options.count,
            format = %format,
            seed = self.options.seed,
            "generation started"
        );

        let registry = GeneratorRegistry::new();
        let plan = registry.plan_columns(&columns);
        let mut report = GenerationReport::new(run_id.clone(), resource.name.clone(), format);
        report.columns = columns.len();
        for id in plan.generator_ids() {
            match id {
                Some(id) => report.record_generator_usage(id),
                None => report.record_fallback(),
            }
        }
        debug!(
            resource = %resource.name,
            fallback_columns = report.fallback_count,
            "generators resolved"
        );

        let mut state = GeneratorState::new(resource.name.clone(), self.options.base_date);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut writer = open_writer(&output_path, format)?;
        writer.write_header(columns.as_slice())?;

        for index in 0..self.options.count {
            let record = plan.generate_record(&mut state, &mut rng);
            writer.write_record(&record)?;
            let written = index + 1;
            if written % PROGRESS_INTERVAL == 0 {
                info!(
                    resource = %resource.name,
                    records = written,
                    total = self.options.count,
                    "generation progress"
                );
            }
        }

        report.bytes_written = writer.finish()?;
        report.records = self.options.count;
        report.output_path = output_path.clone();
        report.duration_ms = start.elapsed().as_millis();

        info!(
            run_id = %run_id,
            resource = %resource.name,
            records = report.records,
            bytes = report.bytes_written,
            duration_ms = report.duration_ms as u64,
            path = %output_path.display(),
            "generation finished"
        );

        Ok(GenerationResult {
            output_path,
            columns,
            report,
        })
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
