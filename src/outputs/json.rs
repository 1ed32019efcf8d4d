//! JSON sidecar output.
//!
//! The JSON-LD documents embedded in the page are also written to
//! `structured-data.json` in the output directory, pretty-printed with
//! non-ASCII characters kept as-is.

use serde_json::Value;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

pub const STRUCTURED_DATA_FILE: &str = "structured-data.json";

/// Write `data` to `{output_dir}/structured-data.json`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir))]
pub async fn write_structured_data(data: &Value, output_dir: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(data)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(%output_dir, error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = Path::new(output_dir).join(STRUCTURED_DATA_FILE);
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote structured data");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_structured_data_pretty_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let data = json!({"website": {"name": "Café Finance"}});
        write_structured_data(&data, out).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join(STRUCTURED_DATA_FILE)).unwrap();
        assert!(written.contains("Café Finance"));
        assert!(written.contains("\n  \"website\""));
    }
}
