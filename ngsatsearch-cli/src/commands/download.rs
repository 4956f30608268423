//! Download command - fetch one or more scenes into the download directory.
//!
//! Distinct scenes are downloaded in parallel on a rayon pool sized by
//! `--jobs`; each scene itself downloads sequentially.

use ngsatsearch::{CatalogResponse, DownloadRequest, SatelliteCatalog};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use super::common::{combined_exit_code, open_catalog, print_json, GlobalArgs};
use super::progress::{bar_callback, DownloadBars};
use crate::error::CliError;

/// Arguments for the download command.
pub struct DownloadArgs {
    pub identifiers: Vec<String>,
    pub bands: Option<Vec<String>>,
    pub custom_name: Option<String>,
    pub metadata: bool,
    pub extra_files: bool,
    pub jobs: usize,
    pub progress: bool,
}

/// Envelope of one scene, tagged with its identifier.
#[derive(Debug, Serialize)]
struct DownloadReport {
    identifier: String,
    #[serde(flatten)]
    response: CatalogResponse<Vec<String>>,
}

impl DownloadArgs {
    fn validate(&self) -> Result<(), CliError> {
        if self.jobs == 0 {
            return Err(CliError::Args("--jobs must be at least 1".to_string()));
        }
        if self.custom_name.is_some() && self.identifiers.len() > 1 {
            return Err(CliError::Args(
                "--custom-name applies to a single identifier".to_string(),
            ));
        }
        Ok(())
    }

    fn request(&self) -> DownloadRequest {
        let mut request = DownloadRequest::new()
            .with_metadata(self.metadata)
            .with_extra_files(self.extra_files);
        if let Some(bands) = &self.bands {
            request = request.with_bands(bands.iter().cloned());
        }
        if let Some(name) = &self.custom_name {
            request = request.with_custom_name(name.clone());
        }
        request
    }
}

/// Run the download command.
pub fn run(global: &GlobalArgs, args: DownloadArgs) -> Result<i32, CliError> {
    args.validate()?;
    let catalog = open_catalog(global)?;
    let request = args.request();
    let bars = DownloadBars::new(args.progress);

    let workers = args.jobs.min(args.identifiers.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("download-{}", i))
        .build()
        .map_err(|e| CliError::Args(format!("cannot start {} download workers: {}", workers, e)))?;
    info!(scenes = args.identifiers.len(), workers, "starting downloads");

    let reports: Vec<DownloadReport> = pool.install(|| {
        args.identifiers
            .par_iter()
            .map(|identifier| download_one(&catalog, &request, &bars, identifier))
            .collect()
    });
    bars.clear();

    let code = combined_exit_code(reports.iter().map(|r| &r.response.status));
    match reports.as_slice() {
        [single] => print_json(&single.response)?,
        _ => print_json(&reports)?,
    }
    Ok(code)
}

fn download_one(
    catalog: &SatelliteCatalog,
    request: &DownloadRequest,
    bars: &DownloadBars,
    identifier: &str,
) -> DownloadReport {
    let bar = bars.add(identifier);
    let request = request.clone().with_progress(bar_callback(bar.clone()));

    let response = catalog.download(identifier, &request);
    bar.finish_and_clear();

    DownloadReport {
        identifier: identifier.to_string(),
        response,
    }
}
