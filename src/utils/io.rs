use crate::types::errors::Error;
use crate::types::models::RunSummary;
use std::path::Path;

/// Save the run summary to a JSON file
pub fn save_summary(summary: &RunSummary, output_path: &Path) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(output_path, json)?;
    Ok(())
}
