//! Whole-book conversion: unpack, rewrite every content document, repack.

use std::path::Path;

use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::transform::{DocumentTransformer, TransformStats};

/// What a conversion touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Members in the container.
    pub members: usize,
    /// Content documents that were rewritten.
    pub documents: usize,
    /// Totals over all documents.
    pub stats: TransformStats,
}

/// Converts EPUB bytes to their bionic-reading variant.
///
/// # Example
///
/// ```no_run
/// use bionic_epub::{Config, Converter};
///
/// let converter = Converter::new(Config::default().with_emphasis_tag("strong"))?;
/// let epub = std::fs::read("book.epub")?;
/// let converted = converter.convert(&epub)?;
/// std::fs::write("book.bionic.epub", converted)?;
/// # Ok::<(), bionic_epub::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    config: Config,
    transformer: DocumentTransformer,
}

impl Converter {
    /// Create a converter after validating `config`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let transformer = DocumentTransformer::new(&config);
        Ok(Self {
            config,
            transformer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert a whole container. Either every document is rewritten and
    /// the new archive returned, or the first failure is.
    pub fn convert(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        self.convert_with_cancel(bytes, &CancellationToken::new())
            .map(|(out, _)| out)
    }

    /// Like [`convert`](Self::convert), checking `cancel` before each
    /// document and returning what was done.
    pub fn convert_with_cancel(
        &self,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<(Vec<u8>, ConversionReport)> {
        let mut container =
            Container::load(bytes)?.with_compression_level(self.config.compression_level);
        let report = self.convert_container(&mut container, cancel)?;
        cancel.check()?;
        let out = container.pack()?;

        info!(
            members = report.members,
            documents = report.documents,
            words = report.stats.words,
            "converted container"
        );
        Ok((out, report))
    }

    /// Rewrite the content documents of an already loaded container in place.
    pub fn convert_container(
        &self,
        container: &mut Container,
        cancel: &CancellationToken,
    ) -> Result<ConversionReport> {
        let documents: Vec<String> = container
            .paths()
            .filter(|path| self.config.is_document(path))
            .map(str::to_string)
            .collect();

        let mut report = ConversionReport {
            members: container.len(),
            ..Default::default()
        };

        for path in documents {
            cancel.check()?;

            let (out, stats) = {
                let Some(member) = container.get(&path) else {
                    continue;
                };
                let text = member.text()?;
                self.transformer
                    .transform_with_stats(&text)
                    .map_err(|source| Error::Parse {
                        path: path.clone(),
                        source,
                    })?
            };

            debug!(path = %path, words = stats.words, "rewrote document");
            container.set(path, out);
            report.documents += 1;
            report.stats += stats;
        }

        Ok(report)
    }

    /// Convert the EPUB at `input` and write the result to `output`.
    ///
    /// Nothing is written unless the whole conversion succeeds.
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<ConversionReport> {
        let bytes = std::fs::read(input)?;
        let (converted, report) = self.convert_with_cancel(&bytes, &CancellationToken::new())?;
        std::fs::write(output, converted)?;
        Ok(report)
    }
}

impl Default for Converter {
    fn default() -> Self {
        let config = Config::default();
        let transformer = DocumentTransformer::new(&config);
        Self {
            config,
            transformer,
        }
    }
}

/// Convert EPUB bytes with the default settings.
pub fn convert(bytes: &[u8]) -> Result<Vec<u8>> {
    Converter::default().convert(bytes)
}

/// Convert the EPUB at `input` with the default settings and write the
/// result to `output`.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<ConversionReport> {
    Converter::default().convert_file(input, output)
}

/// Suggested name for the converted copy of `input`:
/// `book.epub` becomes `book.bionic.epub`.
pub fn output_file_name(input: &str) -> String {
    let stem = input
        .len()
        .checked_sub(".epub".len())
        .and_then(|at| Some((input.get(..at)?, input.get(at..)?)))
        .filter(|(_, ext)| ext.eq_ignore_ascii_case(".epub"))
        .map_or(input, |(stem, _)| stem);
    format!("{stem}.bionic.epub")
}
