//! Dump-and-upload orchestration.

use std::path::PathBuf;

use serde::Serialize;

use crate::archive::{self, ArchiveSummary};
use crate::command_source::CommandSource;
use crate::error::{Error, Result};
use crate::http::{AutoValidatorClient, UploadReport};
use crate::paths;
use crate::realm::Realm;
use crate::runner::{self, CommandRun};
use crate::subnet::{self, ResolvedSubnet};

#[derive(Debug, Clone)]
pub struct DumpRequest {
    pub subnet_identifier: String,
    pub realm: Realm,
    pub note: String,
    pub output_dir: PathBuf,
}

/// Local half of a run: resolved subnet, executed commands, archive.
#[derive(Debug, Clone, Serialize)]
pub struct DumpArtifacts {
    pub subnet: ResolvedSubnet,
    pub commands: Vec<CommandRun>,
    pub archive: ArchiveSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct DumpReport {
    #[serde(flatten)]
    pub artifacts: DumpArtifacts,
    pub realm: Realm,
    pub upload: UploadReport,
}

/// Resolve the subnet, fetch its commands, run them and archive the output.
///
/// An empty command list is an error and nothing is executed.
pub fn dump(request: &DumpRequest, source: &dyn CommandSource) -> Result<DumpArtifacts> {
    let subnet = subnet::resolve_codename(&request.subnet_identifier)?;
    let codename = subnet.codename.as_str();

    let commands = source.commands(codename)?;
    if commands.is_empty() {
        tracing::error!("Subnet dumper commands of {} not found.", codename);
        return Err(Error::commands_not_found(codename));
    }
    tracing::info!(
        "Subnet dumper commands of {} retrieved successfully. {:?}",
        codename,
        commands
    );

    let runs = runner::run_commands(&commands, codename, &request.output_dir)?;

    let files: Vec<PathBuf> = runs.iter().map(|r| r.output_file.clone()).collect();
    let archive_path = paths::archive_file(&request.output_dir, codename);
    let archive = archive::create_archive(&files, &archive_path)?;

    Ok(DumpArtifacts {
        subnet,
        commands: runs,
        archive,
    })
}

/// Full run: [`dump`], then a signed upload of the archive.
pub fn dump_and_upload(
    request: &DumpRequest,
    source: &dyn CommandSource,
    client: &AutoValidatorClient<'_>,
) -> Result<DumpReport> {
    let artifacts = dump(request, source)?;

    log_status!(
        "upload",
        "Uploading {} to {}",
        artifacts.archive.path.display(),
        client.base_url()
    );
    let upload = client.upload_archive(
        &artifacts.archive.path,
        &request.note,
        &artifacts.subnet.codename,
    )?;

    Ok(DumpReport {
        artifacts,
        realm: request.realm,
        upload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_source::StaticCommandSource;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn unknown_subnet_aborts_before_running_anything() {
        let dir = TempDir::new().unwrap();
        let request = DumpRequest {
            subnet_identifier: "no-such-subnet".to_string(),
            realm: Realm::Mainnet,
            note: String::new(),
            output_dir: dir.path().to_path_buf(),
        };

        let err = dump(&request, &StaticCommandSource::new(BTreeMap::new())).unwrap_err();

        assert_eq!(err.code.as_str(), "commands.not_found");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn path_like_identifier_stays_inside_output_dir() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("out");
        let mut table = BTreeMap::new();
        table.insert("evil".to_string(), vec!["echo hi".to_string()]);

        let request = DumpRequest {
            subnet_identifier: "../evil".to_string(),
            realm: Realm::Mainnet,
            note: String::new(),
            output_dir: dir.clone(),
        };

        let artifacts = dump(&request, &StaticCommandSource::new(table)).unwrap();

        assert_eq!(artifacts.subnet.codename, "evil");
        assert_eq!(artifacts.archive.path, dir.join("evil-output.zip"));
        assert!(dir.join("evil_1.txt").exists());
        // Only the output dir itself was created under the root.
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn blank_identifier_is_rejected() {
        let dir = TempDir::new().unwrap();
        let request = DumpRequest {
            subnet_identifier: "--".to_string(),
            realm: Realm::Mainnet,
            note: String::new(),
            output_dir: dir.path().to_path_buf(),
        };

        let err = dump(&request, &StaticCommandSource::builtin()).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }
}
