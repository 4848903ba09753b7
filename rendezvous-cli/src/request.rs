//! Participant request files and result output shared by every command.

use std::io::{BufReader, Write};

use camino::Utf8Path;
use rendezvous_core::Participant;
use rendezvous_fs::{file_is_file, open_utf8_file, write_utf8_file};
use serde::{Deserialize, Serialize};

use crate::CliError;

/// JSON payload read from the request file.
///
/// ```json
/// { "participants": [{ "id": "a", "lat": 25.03, "lng": 121.56, "travelMode": "transit" }] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ParticipantsRequest {
    pub(crate) participants: Vec<Participant>,
}

/// Check that `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads the participants from a JSON-encoded [`ParticipantsRequest`].
pub(crate) fn load_participants(path: &Utf8Path) -> Result<Vec<Participant>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let request: ParticipantsRequest =
        serde_json::from_reader(reader).map_err(|source| CliError::ParseRequest {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(request.participants)
}

/// Write `result` as pretty JSON to `output` when given, else to `writer`.
pub(crate) fn write_result<T>(
    result: &T,
    output: Option<&Utf8Path>,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    T: Serialize,
{
    let mut payload = serde_json::to_string_pretty(result).map_err(CliError::SerialiseResult)?;
    payload.push('\n');
    match output {
        Some(path) => {
            write_utf8_file(path, payload.as_bytes()).map_err(|source| {
                CliError::WriteOutputFile {
                    path: path.to_path_buf(),
                    source,
                }
            })
        }
        None => writer
            .write_all(payload.as_bytes())
            .map_err(CliError::WriteOutput),
    }
}
