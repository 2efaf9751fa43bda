// File: src/persistence.rs
use crate::core::model::TrainedModel;
use crate::error::{Result, TriageError};
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

pub const ARTIFACT_MAGIC: [u8; 4] = *b"TTRG";
pub const ARTIFACT_VERSION: u32 = 1;

/// Written ahead of the model body so a schema change is detected before
/// bincode tries to decode an incompatible layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ArtifactHeader {
    magic: [u8; 4],
    format_version: u32,
}

/// Writes the model to `path` atomically: the bytes go to a temp file in the
/// same directory, which is then renamed over the target.
pub fn save_to_disk(model: &TrainedModel, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let header = ArtifactHeader { magic: ARTIFACT_MAGIC, format_version: ARTIFACT_VERSION };
    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, &header)?;
        bincode::serialize_into(&mut writer, model)?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;

    temp_file.persist(path).map_err(|e| TriageError::Io(e.error))?;
    debug!(path = %path.display(), "artifact written");
    Ok(())
}

/// Decoding settings matching `bincode::serialize_into`, with every length
/// prefix capped at `limit` bytes so a damaged artifact cannot request an
/// allocation larger than the file itself.
fn bounded_decoder(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(limit)
}

pub fn load_from_disk(path: &Path) -> Result<TrainedModel> {
    let file = File::open(path)?;
    let limit = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let header: ArtifactHeader = bounded_decoder(limit)
        .deserialize_from(&mut reader)
        .map_err(|e| TriageError::CorruptArtifact(format!("unreadable header: {e}")))?;
    if header.magic != ARTIFACT_MAGIC {
        return Err(TriageError::CorruptArtifact("not a triage model artifact".into()));
    }
    if header.format_version != ARTIFACT_VERSION {
        return Err(TriageError::UnsupportedVersion {
            found: header.format_version,
            expected: ARTIFACT_VERSION,
        });
    }

    let model: TrainedModel = bounded_decoder(limit).deserialize_from(&mut reader)?;
    model.validate()?;
    Ok(model)
}
