//! Cross-file aggregation

use std::path::Path;

use super::TelegramExportParser;
use crate::application::errors::ExportError;
use crate::domain::entities::ResultBundle;

/// Parse every file on its own and union the three categories across files.
///
/// Fails on the first file that cannot be read or parsed.
pub fn process_many<P: AsRef<Path>>(files: &[P]) -> Result<ResultBundle, ExportError> {
    let parser = TelegramExportParser::new();
    let mut combined = ResultBundle::default();

    for file in files {
        let file = file.as_ref();
        let bundle = parser.parse_file(file)?;
        tracing::debug!(
            "{}: {} participants, {} mentions, {} channels",
            file.display(),
            bundle.participants.len(),
            bundle.mentions.len(),
            bundle.channels.len()
        );
        combined.merge(bundle);
    }

    Ok(combined)
}
