//! Report persistence: pretty JSON on disk, one file per company.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use scout_shared::{CompanyReport, Result, ScoutError};

/// File name suffix shared by every saved report.
pub const REPORT_SUFFIX: &str = "_report.json";

/// Serialize a report as pretty-printed JSON.
pub fn to_json(report: &CompanyReport) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| ScoutError::parse(format!("report serialization failed: {e}")))
}

/// `<company name with whitespace replaced by '_'>_report.json`.
///
/// Path separators are replaced too so the report always lands in the
/// chosen directory.
pub fn report_file_name(company: &str) -> String {
    let stem: String = company
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    let stem = if stem.is_empty() { "company" } else { &stem };
    format!("{stem}{REPORT_SUFFIX}")
}

/// Write `report` to `path`, replacing any existing file.
///
/// Goes through a temp file in the same directory so a crash never leaves
/// a half-written report behind.
#[instrument(skip(report), fields(path = %path.display()))]
pub fn save(report: &CompanyReport, path: &Path) -> Result<()> {
    let json = to_json(report)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ScoutError::validation(format!("not a file path: {}", path.display())))?;
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, json).map_err(|e| ScoutError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(ScoutError::io(path, e));
    }

    debug!("wrote report");
    Ok(())
}

/// Save into `dir` under [`report_file_name`], creating `dir` if needed.
pub fn save_to_dir(report: &CompanyReport, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| ScoutError::io(dir, e))?;
    let path = dir.join(report_file_name(&report.company_name));
    save(report, &path)?;
    Ok(path)
}

/// Read a report previously written by [`save`].
pub fn load(path: &Path) -> Result<CompanyReport> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| ScoutError::parse(format!("{}: invalid report: {e}", path.display())))
}
