//! Partition seed table loading.
//!
//! The seed table enumerates the bursts to catalog and the corner-reflector
//! network each one belongs to. It needs at least the `burst_id` and
//! `cr_network` columns; other columns are ignored.

use cv_error::{CatalogError, CvError, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::record::Partition;

const BURST_ID_COLUMN: &str = "burst_id";
const NETWORK_COLUMN: &str = "cr_network";

/// Load partitions from a seed CSV file.
///
/// A missing file is a configuration error: partitions cannot be inferred.
/// Rows repeating an earlier burst id are dropped.
pub fn load_partitions(path: &Path) -> Result<Vec<Partition>> {
    if !path.is_file() {
        return Err(CvError::Config(format!(
            "Partition seed file {} not found",
            path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| CatalogError::Read(format!("Failed to open {}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| CatalogError::Parse(format!("Failed to parse CSV headers: {e}")))?
        .clone();

    let column = |name: &str| {
        headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
            CatalogError::Schema(format!(
                "Column '{}' not found in {} headers: {:?}",
                name,
                path.display(),
                headers.iter().collect::<Vec<_>>()
            ))
        })
    };
    let burst_idx = column(BURST_ID_COLUMN)?;
    let network_idx = column(NETWORK_COLUMN)?;

    let mut seen = HashSet::new();
    let mut partitions = Vec::new();

    for (line_num, record) in reader.records().enumerate() {
        // +2 for 1-indexed lines and the header row
        let line = line_num + 2;
        let record = record
            .map_err(|e| CatalogError::Parse(format!("{} line {line}: {e}", path.display())))?;

        let burst_id = record.get(burst_idx).unwrap_or("").trim();
        let network = record.get(network_idx).unwrap_or("").trim();

        if burst_id.is_empty() || network.is_empty() {
            return Err(CatalogError::Parse(format!(
                "{} line {line}: empty burst_id or cr_network",
                path.display()
            ))
            .into());
        }

        if !seen.insert(burst_id.to_string()) {
            debug!(line, burst_id, "Skipping repeated burst id");
            continue;
        }

        partitions.push(Partition::new(burst_id, network));
    }

    info!(
        path = %path.display(),
        partitions = partitions.len(),
        "Loaded partition seed"
    );

    Ok(partitions)
}

/// Keep only the partitions whose burst id is in `burst_ids`.
///
/// An empty selection keeps every partition.
pub fn select_partitions(partitions: Vec<Partition>, burst_ids: &[String]) -> Vec<Partition> {
    if burst_ids.is_empty() {
        return partitions;
    }

    let wanted: HashSet<&str> = burst_ids.iter().map(String::as_str).collect();
    let selected: Vec<Partition> = partitions
        .into_iter()
        .filter(|p| wanted.contains(p.burst_id.as_str()))
        .collect();

    for burst_id in burst_ids {
        if !selected.iter().any(|p| &p.burst_id == burst_id) {
            warn!(burst_id = %burst_id, "Requested burst id not present in seed file");
        }
    }

    selected
}
