//! Attempt-log audit artifacts.
//!
//! A finished run can be persisted as `<dir>/<run_id>/attempts.json` next to
//! `<dir>/<run_id>/attempts.digest`, the SHA-256 hex of the JSON bytes.
//! Reading verifies the digest before deserializing.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::domain::{EvalLoopError, FinalResult, Result};
use crate::obs::UnitSpan;

const LOG_FILE: &str = "attempts.json";
const DIGEST_FILE: &str = "attempts.digest";

/// SHA-256 hex digest of `data`.
pub fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Persist the attempt log of `final_result`. Returns the JSON path.
pub fn write_attempt_log(final_result: &FinalResult, dir: &Path) -> Result<PathBuf> {
    let _span = UnitSpan::enter(&final_result.run_id, final_result.kind);

    let run_dir = dir.join(&final_result.run_id);
    std::fs::create_dir_all(&run_dir)?;

    let log_path = run_dir.join(LOG_FILE);
    let json = serde_json::to_vec_pretty(final_result)?;
    let digest = content_digest(&json);

    std::fs::write(&log_path, &json)?;
    std::fs::write(run_dir.join(DIGEST_FILE), digest.as_bytes())?;

    tracing::debug!(path = %log_path.display(), digest = %digest, "attempt log written");
    Ok(log_path)
}

/// Read `<dir>/<run_id>/attempts.json`, failing on a digest mismatch.
pub fn read_attempt_log(run_id: &str, dir: &Path) -> Result<FinalResult> {
    let run_dir = dir.join(run_id);
    let json = std::fs::read(run_dir.join(LOG_FILE))?;
    let expected = std::fs::read_to_string(run_dir.join(DIGEST_FILE))?;
    let expected = expected.trim();

    let actual = content_digest(&json);
    if expected != actual {
        return Err(EvalLoopError::DigestMismatch {
            expected: expected.to_string(),
            actual,
        });
    }

    Ok(serde_json::from_slice(&json)?)
}
