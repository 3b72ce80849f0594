//! The end-to-end metadata extraction pipeline.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use arcio::cdx::{CdxEntry, CdxFileWriter, CdxFormat, CdxWriteError};

use crate::cdx::{CdxExtractor, CdxSource};
use crate::harvest::{self, HarvestJobSource};
use crate::interval::CsvUrlIntervalReader;
use crate::metadata::MetadataWriter;
use crate::wid::CsvWidReader;

/// The supported input CSV dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDialect {
    /// The WID dialect: `discriminator;#;url;date;location;filename`.
    Wid,
    /// The URL-interval dialect: `discriminator;url;earliest;latest`.
    UrlInterval,
}

impl FromStr for InputDialect {
    type Err = PipelineError;

    fn from_str(raw: &str) -> Result<Self, PipelineError> {
        if raw.eq_ignore_ascii_case("WID") {
            Ok(InputDialect::Wid)
        } else if raw.eq_ignore_ascii_case("URL") {
            Ok(InputDialect::UrlInterval)
        } else {
            Err(PipelineError::UnknownDialect(raw.to_owned()))
        }
    }
}

/// The supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The `;`-separated metadata export, optionally with job columns.
    Csv,
    /// A classical CDX index file.
    Cdx,
}

impl OutputFormat {
    /// Parse the output-format argument; an empty value selects the CSV
    /// default.
    pub fn from_arg(raw: &str) -> Result<Self, PipelineError> {
        if raw.is_empty() || raw.eq_ignore_ascii_case("CSV") {
            Ok(OutputFormat::Csv)
        } else if raw.eq_ignore_ascii_case("CDX") {
            Ok(OutputFormat::Cdx)
        } else {
            Err(PipelineError::UnknownOutputFormat(raw.to_owned()))
        }
    }
}

/// Fatal pipeline failures.
///
/// Everything here aborts the run; recoverable row- and entry-level problems
/// are logged and skipped inside the stages instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input file does not exist or is not a regular file.
    #[error("the input file '{}' does not exist or is not a file", .0.display())]
    InputMissing(PathBuf),
    /// The output path is already occupied; refusing to overwrite.
    #[error("the location for the output file '{}' is not vacant", .0.display())]
    OutputOccupied(PathBuf),
    /// CDX export cannot carry harvest job columns, so combining the two is
    /// a configuration error.
    #[error(
        "cannot export in CDX format while harvest job extraction is enabled; \
         turn off job extraction or change the output format"
    )]
    ConflictingOutput,
    /// The input dialect argument was not recognized.
    #[error("unknown input dialect '{0}' (expected 'WID' or 'URL')")]
    UnknownDialect(String),
    /// The output format argument was not recognized.
    #[error("unknown output format '{0}' (expected 'CSV' or 'CDX')")]
    UnknownOutputFormat(String),
    /// An entry could not be serialized to the CDX output.
    #[error(transparent)]
    CdxWrite(#[from] CdxWriteError),
    /// An I/O failure reading the input or writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Resolves a file of identifiers against a CDX index and writes the result.
///
/// The pipeline is readers → extractor → (correlator →) writer. All remote
/// lookups are best effort per §entry; the run only fails on configuration
/// errors and output I/O.
pub struct MetadataPipeline<S> {
    input: PathBuf,
    extractor: CdxExtractor<S>,
    jobs: Option<Box<dyn HarvestJobSource>>,
    output: PathBuf,
}

impl<S: CdxSource> MetadataPipeline<S> {
    pub fn new(
        input: PathBuf,
        extractor: CdxExtractor<S>,
        jobs: Option<Box<dyn HarvestJobSource>>,
        output: PathBuf,
    ) -> Self {
        MetadataPipeline {
            input,
            extractor,
            jobs,
            output,
        }
    }

    /// Run the pipeline.
    ///
    /// Configuration problems (conflicting output mode, missing input,
    /// occupied output path) are rejected before any input is read or any
    /// output is created, so a failed run leaves no partial file behind.
    pub fn run(&self, dialect: InputDialect, format: OutputFormat) -> Result<(), PipelineError> {
        if format == OutputFormat::Cdx && self.jobs.is_some() {
            return Err(PipelineError::ConflictingOutput);
        }
        if !self.input.is_file() {
            return Err(PipelineError::InputMissing(self.input.clone()));
        }
        if self.output.exists() {
            return Err(PipelineError::OutputOccupied(self.output.clone()));
        }

        let entries = self.collect_entries(dialect)?;
        info!("resolved {} CDX entries from '{}'", entries.len(), self.input.display());

        match format {
            OutputFormat::Csv => self.write_metadata(&entries)?,
            OutputFormat::Cdx => {
                let mut writer = CdxFileWriter::create(&self.output, CdxFormat::canonical())?;
                writer.write_entries(&entries)?;
                writer.finish()?;
            }
        }
        Ok(())
    }

    fn collect_entries(&self, dialect: InputDialect) -> Result<Vec<CdxEntry>, PipelineError> {
        match dialect {
            InputDialect::Wid => {
                let wids = CsvWidReader::new(&self.input).extract_all()?;
                Ok(self.extractor.retrieve_for_wids(&wids))
            }
            InputDialect::UrlInterval => {
                let intervals = CsvUrlIntervalReader::new(&self.input).extract_all()?;
                let mut entries = Vec::new();
                for interval in &intervals {
                    entries.extend(self.extractor.retrieve_for_interval(interval));
                }
                Ok(entries)
            }
        }
    }

    fn write_metadata(&self, entries: &[CdxEntry]) -> Result<(), PipelineError> {
        let file = File::create(&self.output)?;
        let mut writer = MetadataWriter::new(BufWriter::new(file))?;
        for entry in entries {
            let job = harvest::correlate(entry, self.jobs.as_deref());
            writer.write_entry(entry, job.as_ref())?;
        }
        writer.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dialect_and_format_arguments_parse_case_insensitively() {
        assert_eq!("wid".parse::<InputDialect>().unwrap(), InputDialect::Wid);
        assert_eq!("URL".parse::<InputDialect>().unwrap(), InputDialect::UrlInterval);
        assert!("XML".parse::<InputDialect>().is_err());

        assert_eq!(OutputFormat::from_arg("cdx").unwrap(), OutputFormat::Cdx);
        assert_eq!(OutputFormat::from_arg("CSV").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_arg("").unwrap(), OutputFormat::Csv);
        assert!(OutputFormat::from_arg("xlsx").is_err());
    }
}
