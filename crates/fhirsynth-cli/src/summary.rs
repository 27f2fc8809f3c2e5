use std::io::{self, Write};

use fhirsynth_generate::GenerationReport;

/// Record count from which the compression estimate is printed.
const COMPRESSION_REPORT_THRESHOLD: u64 = 100_000;

pub fn write_summary<W: Write>(out: &mut W, report: &GenerationReport) -> io::Result<()> {
    writeln!(out, "\nGeneration complete")?;
    writeln!(out, "  Resource type: {}", report.resource_type)?;
    writeln!(out, "  Records: {}", group_thousands(report.records))?;
    writeln!(out, "  Columns: {}", report.columns)?;
    writeln!(out, "  Format: {}", report.format)?;
    writeln!(out, "  Output: {}", report.output_path.display())?;
    writeln!(out, "  File size: {:.1} KB", report.size_kb())?;
    if report.records >= COMPRESSION_REPORT_THRESHOLD {
        if let Some(ratio) = report.compression_ratio() {
            writeln!(out, "  Estimated compression ratio: {ratio:.1}x")?;
        }
    }
    if report.fallback_count > 0 {
        writeln!(out, "  Columns left empty: {}", report.fallback_count)?;
    }
    Ok(())
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
