use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::university::{UniversityRecord, BASE_COLUMNS, EXTENDED_COLUMNS};

pub const EXPORT_FILE_NAME: &str = "university_applications.csv";

/// Header row plus one row per record. Extended cost/outcome columns are
/// emitted only when some record in the set carries them.
pub fn records_to_csv(records: &[UniversityRecord]) -> Result<String> {
    let with_extended = records.iter().any(UniversityRecord::has_extended_columns);
    let mut writer = csv::Writer::from_writer(vec![]);

    let mut header = BASE_COLUMNS.to_vec();
    if with_extended {
        header.extend(EXTENDED_COLUMNS);
    }
    writer.write_record(&header)?;

    for record in records {
        let mut row = record.base_values().to_vec();
        if with_extended {
            row.extend(
                record
                    .extended_values()
                    .iter()
                    .map(|v| v.unwrap_or_default().to_string()),
            );
        }
        writer.write_record(&row)?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn export_csv(records: &[UniversityRecord], path: &Path) -> Result<PathBuf> {
    let content = records_to_csv(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating export directory: {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("failed writing CSV export: {}", path.display()))?;
    info!("exported {} records to {}", records.len(), path.display());
    Ok(path.to_path_buf())
}
