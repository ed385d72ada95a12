//! Output file naming.

use std::path::{Path, PathBuf};

use crate::config::SplitConfig;

/// Where chunks of one source are written and what they are called.
///
/// Names follow `<prefix><base><NN>.<ext>`, where `base` is the source file
/// name with its last extension removed and `NN` is the chunk ordinal padded
/// with zeros to `width` digits.
///
/// # Example
///
/// ```
/// use linesplit::{OutputLayout, SplitConfig};
///
/// let layout = OutputLayout::for_source("data/ratings.csv", "out", &SplitConfig::default());
/// assert_eq!(layout.file_name(3), "tmp_ratings03.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: PathBuf,
    stem: String,
    extension: String,
    width: usize,
}

impl OutputLayout {
    /// Builds the layout for `source` using the naming options in `config`.
    pub fn for_source(
        source: impl AsRef<Path>,
        dir: impl Into<PathBuf>,
        config: &SplitConfig,
    ) -> Self {
        let file_name = source
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::new(dir, format!("{}{}", config.prefix(), base_name(&file_name)))
            .with_extension(config.extension())
            .with_width(config.ordinal_width())
    }

    /// Creates a layout with an explicit stem, `csv` extension and width 2.
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            extension: crate::config::DEFAULT_EXTENSION.to_string(),
            width: crate::config::DEFAULT_ORDINAL_WIDTH,
        }
    }

    /// Sets the extension; an empty extension drops the trailing dot.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the minimum number of ordinal digits.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Returns the output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the name shared by every output file before the ordinal.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Returns the file name for chunk `ordinal`.
    pub fn file_name(&self, ordinal: usize) -> String {
        if self.extension.is_empty() {
            format!("{}{:0width$}", self.stem, ordinal, width = self.width)
        } else {
            format!(
                "{}{:0width$}.{}",
                self.stem,
                ordinal,
                self.extension,
                width = self.width
            )
        }
    }

    /// Returns the full destination path for chunk `ordinal`.
    pub fn path_for(&self, ordinal: usize) -> PathBuf {
        self.dir.join(self.file_name(ordinal))
    }
}

/// Strips the last `.ext` from a file name.
///
/// A leading dot alone does not count as an extension.
fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => &file_name[..pos],
        _ => file_name,
    }
}
