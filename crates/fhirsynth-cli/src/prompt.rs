use std::io::{self, BufRead, Write};

use fhirsynth_generate::OutputFormat;
use thiserror::Error;

pub const RESOURCES_PER_PAGE: usize = 15;

const FORMAT_CHOICES: [(OutputFormat, &str); 4] = [
    (
        OutputFormat::ParquetZstd,
        "Parquet with ZSTD compression (recommended, smallest files)",
    ),
    (OutputFormat::Parquet, "Parquet with Snappy compression (fast, larger files)"),
    (OutputFormat::Csv, "Comma-separated values (universal compatibility)"),
    (OutputFormat::Ndjson, "JSON Lines, one object per record"),
];

const COUNT_CHOICES: [(u64, &str); 7] = [
    (10, "10 records (quick test)"),
    (100, "100 records (small dataset)"),
    (1_000, "1,000 records (medium dataset)"),
    (10_000, "10K records (large dataset)"),
    (100_000, "100K records (very large)"),
    (1_000_000, "1M records (massive dataset)"),
    (10_000_000, "10M records (enterprise scale)"),
];
const DEFAULT_COUNT_CHOICE: usize = 3;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("selection aborted")]
    Quit,
    #[error("nothing to select")]
    Empty,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Line-oriented prompts over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Paginated pick from `items`; `n`/`p` change page, `q` aborts.
    pub fn select_resource(&mut self, items: &[&str]) -> Result<String, PromptError> {
        if items.is_empty() {
            return Err(PromptError::Empty);
        }
        let total_pages = items.len().div_ceil(RESOURCES_PER_PAGE);
        let mut page = 1;

        loop {
            writeln!(self.output, "\nSelect FHIR resource type")?;
            writeln!(self.output, "{}", "=".repeat(60))?;
            let start = (page - 1) * RESOURCES_PER_PAGE;
            let end = (start + RESOURCES_PER_PAGE).min(items.len());
            for (index, item) in items.iter().enumerate().take(end).skip(start) {
                writeln!(self.output, "{:3}. {item}", index + 1)?;
            }
            writeln!(self.output, "\nPage {page} of {total_pages}")?;

            let mut navigation = Vec::new();
            if page > 1 {
                navigation.push("p) Previous page");
            }
            if page < total_pages {
                navigation.push("n) Next page");
            }
            navigation.push("q) Quit");
            writeln!(self.output, "Navigation: {}", navigation.join(" | "))?;

            let prompt = format!("Enter number (1-{}) or navigation option: ", items.len());
            let choice = self.read_choice(&prompt)?.to_lowercase();
            match choice.as_str() {
                "p" if page > 1 => page -= 1,
                "n" if page < total_pages => page += 1,
                "q" => return Err(PromptError::Quit),
                _ => match choice.parse::<usize>() {
                    Ok(number) if (1..=items.len()).contains(&number) => {
                        return Ok(items[number - 1].to_string());
                    }
                    Ok(_) => writeln!(
                        self.output,
                        "Please enter a number between 1 and {}",
                        items.len()
                    )?,
                    Err(_) => {
                        writeln!(self.output, "Please enter a valid number or navigation option")?
                    }
                },
            }
        }
    }

    pub fn select_format(&mut self) -> Result<OutputFormat, PromptError> {
        writeln!(self.output, "\nSelect output format")?;
        writeln!(self.output, "{}", "=".repeat(60))?;
        let descriptions: Vec<&str> = FORMAT_CHOICES.iter().map(|(_, text)| *text).collect();
        let index = self.select_numbered(&descriptions, 1, "format")?;
        Ok(FORMAT_CHOICES[index].0)
    }

    pub fn select_count(&mut self) -> Result<u64, PromptError> {
        writeln!(self.output, "\nSelect number of records")?;
        writeln!(self.output, "{}", "=".repeat(60))?;
        let descriptions: Vec<&str> = COUNT_CHOICES.iter().map(|(_, text)| *text).collect();
        let index = self.select_numbered(&descriptions, DEFAULT_COUNT_CHOICE, "count")?;
        Ok(COUNT_CHOICES[index].0)
    }

    /// Numbered menu; empty input picks `default` (1-based). Returns a 0-based index.
    fn select_numbered(
        &mut self,
        descriptions: &[&str],
        default: usize,
        label: &str,
    ) -> Result<usize, PromptError> {
        for (index, description) in descriptions.iter().enumerate() {
            writeln!(self.output, "{}. {description}", index + 1)?;
        }
        let prompt = format!("Select {label} (1-{}) [{default}]: ", descriptions.len());
        loop {
            let choice = self.read_choice(&prompt)?;
            if choice.is_empty() {
                return Ok(default - 1);
            }
            match choice.parse::<usize>() {
                Ok(number) if (1..=descriptions.len()).contains(&number) => {
                    return Ok(number - 1);
                }
                Ok(_) => writeln!(
                    self.output,
                    "Please enter a number between 1 and {}",
                    descriptions.len()
                )?,
                Err(_) => writeln!(self.output, "Please enter a valid number")?,
            }
        }
    }

    /// End of input aborts the selection.
    fn read_choice(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.output, "\n{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Quit);
        }
        Ok(line.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prompter(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    fn names(count: usize) -> Vec<String> {
        (1..=count).map(|index| format!("Resource{index:02}")).collect()
    }

    #[test]
    fn pages_forward_and_back_before_selecting() {
        let owned = names(40);
        let items: Vec<&str> = owned.iter().map(String::as_str).collect();
        let mut prompter = prompter("n\nn\nn\np\n17\n");

        let selected = prompter.select_resource(&items).expect("selection");
        assert_eq!(selected, "Resource17");

        let output = String::from_utf8(prompter.output).expect("utf8");
        assert!(output.contains("Page 1 of 3"));
        assert!(output.contains("Page 3 of 3"));
        assert!(output.contains(" 31. Resource31"));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        let owned = names(5);
        let items: Vec<&str> = owned.iter().map(String::as_str).collect();
        let mut prompter = prompter("0\nabc\n6\n2\n");

        assert_eq!(prompter.select_resource(&items).expect("selection"), "Resource02");
        let output = String::from_utf8(prompter.output).expect("utf8");
        assert!(output.contains("between 1 and 5"));
        assert!(output.contains("valid number or navigation option"));
    }

    #[test]
    fn quit_and_eof_abort() {
        let items = ["Patient"];
        assert!(matches!(
            prompter("q\n").select_resource(&items),
            Err(PromptError::Quit)
        ));
        assert!(matches!(
            prompter("").select_resource(&items),
            Err(PromptError::Quit)
        ));
        assert!(matches!(
            prompter("").select_resource(&[]),
            Err(PromptError::Empty)
        ));
    }

    #[test]
    fn format_and_count_use_defaults_on_empty_input() {
        let mut prompter = prompter("\n\n");
        assert_eq!(prompter.select_format().expect("format"), OutputFormat::ParquetZstd);
        assert_eq!(prompter.select_count().expect("count"), 1_000);
    }

    #[test]
    fn numbered_choices_map_to_values() {
        let mut prompter = prompter("2\n4\n9\n6\n");
        assert_eq!(prompter.select_format().expect("format"), OutputFormat::Parquet);
        assert_eq!(prompter.select_format().expect("format"), OutputFormat::Ndjson);
        assert_eq!(prompter.select_count().expect("count"), 1_000_000);
    }
}
