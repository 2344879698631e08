//! Parsing of pip's `--report` JSON output.
//!
//! Only the slice of the report the engine needs is modeled: the
//! `install` array and each entry's `metadata.name`, `metadata.version`
//! and `metadata.summary`. Everything else in the document is ignored.

use serde::Deserialize;

use defer_core::{InstallReport, PackageChange};

#[derive(Debug, Deserialize)]
struct RawReport {
    #[serde(default)]
    install: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    metadata: RawMetadata,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    name: String,
    version: String,
    #[serde(default)]
    summary: String,
}

/// Parse a pip install report into the packages it would add.
pub fn parse_report(content: &str) -> Result<InstallReport, serde_json::Error> {
    let raw: RawReport = serde_json::from_str(content)?;
    let pending = raw
        .install
        .into_iter()
        .map(|item| PackageChange {
            name: item.metadata.name,
            version: item.metadata.version,
            summary: item.metadata.summary,
        })
        .collect();
    Ok(InstallReport { pending })
}
