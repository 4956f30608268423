//! Google Cloud Storage public datasets backend.
//!
//! There is no search API: scenes are addressed directly by paths derived
//! from their identifiers, and every band is a separate object. A download
//! is therefore a multi-asset plan written into a per-scene directory.
//!
//! # URL Pattern
//!
//! - Landsat: `{base}/gcp-public-data-landsat/{sensor}/01/{path}/{row}/{id}/{id}_B{band}.TIF`
//! - Sentinel-2: `{base}/gcp-public-data-sentinel-2/[L2/]tiles/{zone}/{band}/{square}/{id}.SAFE/{image}.jp2`
//!
//! Sentinel-2 image paths are not derivable from the identifier alone; they
//! are read from the product metadata file (`MTD_MSIL1C.xml` or
//! `MTD_MSIL2A.xml`).

mod layout;
mod manifest;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::condition::SearchCondition;
use crate::download::{AssetPlan, DownloadOutcome, DownloadRequest};
use crate::error::{CatalogError, CatalogResult};
use crate::http::{HttpClient, HttpRequest};
use crate::platform::Platform;
use crate::provider::rules::{infer_platform, IdentifierRule, LANDSAT_RULES, SENTINEL_2_RULES};
use crate::provider::{Provider, ServiceKind};
use crate::scene::SceneIdentifier;

use layout::{bands_for, normalize_band, ProcessingLevel, SceneLocation};
use manifest::ImageFiles;

/// Public storage endpoint.
const BASE_URL: &str = "http://storage.googleapis.com";

const IDENTIFIER_RULES: &[&[IdentifierRule]] = &[LANDSAT_RULES, SENTINEL_2_RULES];

/// Datasets mirrored in the public buckets. None takes search options.
pub const PLATFORMS: &[Platform] = &[
    Platform {
        name: "LANDSAT_8_C1",
        options: &[],
    },
    Platform {
        name: "LANDSAT_ETM_C1",
        options: &[],
    },
    Platform {
        name: "LANDSAT_TM_C1",
        options: &[],
    },
    Platform {
        name: "SENTINEL_2_L1C",
        options: &[],
    },
    Platform {
        name: "SENTINEL_2_L2A",
        options: &[],
    },
];

/// A scene resolved to its bucket location.
struct ResolvedScene {
    platform: &'static str,
    location: SceneLocation,
    url: String,
}

/// Google Cloud public dataset client. No authentication.
pub struct GoogleCloudProvider<C: HttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: HttpClient> GoogleCloudProvider<C> {
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Points the provider at another storage endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn resolve(&self, identifier: &SceneIdentifier) -> CatalogResult<ResolvedScene> {
        let id = identifier.as_str();
        let platform = infer_platform(IDENTIFIER_RULES, id)?;
        let location = match platform {
            "SENTINEL_2_L1C" => SceneLocation::sentinel2(id, ProcessingLevel::L1C)?,
            "SENTINEL_2_L2A" => SceneLocation::sentinel2(id, ProcessingLevel::L2A)?,
            _ => SceneLocation::landsat(id)?,
        };
        let url = location.scene_url(&self.base_url, id);
        debug!(identifier = id, platform, url = %url, "resolved bucket location");

        Ok(ResolvedScene {
            platform,
            location,
            url,
        })
    }

    /// Band labels to fetch, validated against the platform's band table.
    fn requested_bands(
        &self,
        platform: &'static str,
        request: &DownloadRequest,
    ) -> CatalogResult<Vec<String>> {
        let available = bands_for(platform);
        let Some(bands) = &request.bands else {
            return Ok(available.iter().map(|b| b.to_string()).collect());
        };

        bands
            .iter()
            .map(|band| {
                let normalized = normalize_band(band);
                if available.contains(&normalized.as_str()) {
                    Ok(normalized)
                } else {
                    Err(CatalogError::InvalidOption {
                        platform: platform.to_string(),
                        option: "bands".to_string(),
                        reason: format!(
                            "band '{}' does not exist (available: {})",
                            band,
                            available.join(", ")
                        ),
                    })
                }
            })
            .collect()
    }

    /// Fetches and parses the Sentinel-2 product metadata.
    ///
    /// Any answer other than 200 or 404 is treated as a temporary ban.
    fn image_files(&self, metadata_url: &str) -> CatalogResult<ImageFiles> {
        let response = self.http_client.get(&HttpRequest::get(metadata_url))?;
        match response.status {
            200 => ImageFiles::parse(&response.text()?),
            404 => Err(CatalogError::DatasetNotFound(metadata_url.to_string())),
            status => Err(CatalogError::ServiceUnavailable(format!(
                "product metadata answered HTTP {}",
                status
            ))),
        }
    }

    fn plan(&self, scene: &ResolvedScene, id: &str, request: &DownloadRequest) -> CatalogResult<AssetPlan> {
        let bands = self.requested_bands(scene.platform, request)?;
        let mut plan = AssetPlan::new();

        match &scene.location {
            SceneLocation::Landsat { .. } => {
                for band in &bands {
                    plan.push_url(format!("{}/{}_B{}.TIF", scene.url, id, band));
                }
                if request.metadata {
                    plan.push_url(format!("{}/{}_MTL.txt", scene.url, id));
                    plan.push_url(format!("{}/{}_ANG.txt", scene.url, id));
                }
            }
            SceneLocation::Sentinel2 { level, .. } => {
                let metadata_url = format!("{}/{}", scene.url, level.metadata_file());
                let files = self.image_files(&metadata_url)?;

                for band in &bands {
                    match files.image_for_band(*level, band) {
                        Some(image) => plan.push_url(format!("{}/{}.jp2", scene.url, image)),
                        None => warn!(identifier = id, band = %band, "band not declared in product metadata"),
                    }
                }
                if request.metadata {
                    plan.push_url(metadata_url);
                    plan.push_url(format!("{}/manifest.safe", scene.url));
                }
                if request.extra_files && *level == ProcessingLevel::L2A {
                    match files.cloud_mask() {
                        Some(mask) => plan.push_url(format!("{}/{}", scene.url, mask)),
                        None => warn!(identifier = id, "no granule directory for cloud mask"),
                    }
                }
            }
        }

        Ok(plan)
    }

    fn metadata_url(&self, scene: &ResolvedScene, id: &str) -> String {
        match &scene.location {
            SceneLocation::Landsat { .. } => format!("{}/{}_MTL.txt", scene.url, id),
            SceneLocation::Sentinel2 { level, .. } => {
                format!("{}/{}", scene.url, level.metadata_file())
            }
        }
    }
}

impl<C: HttpClient> Provider for GoogleCloudProvider<C> {
    fn service(&self) -> ServiceKind {
        ServiceKind::GoogleCloud
    }

    fn platforms(&self) -> &'static [Platform] {
        PLATFORMS
    }

    /// Validates the condition; the buckets cannot be searched.
    fn search(&self, condition: &SearchCondition) -> CatalogResult<Vec<SceneIdentifier>> {
        let platform = condition.validate(PLATFORMS)?;
        info!(platform = platform.name, "object storage has no search API, returning no scenes");
        Ok(Vec::new())
    }

    fn download(
        &self,
        identifier: &SceneIdentifier,
        request: &DownloadRequest,
        directory: &Path,
    ) -> CatalogResult<DownloadOutcome> {
        let scene = self.resolve(identifier)?;
        let scene_name = request.file_name(scene.platform, identifier.to_string())?;
        let scene_dir = directory.join(scene_name);
        let plan = self.plan(&scene, identifier.as_str(), request)?;
        debug!(identifier = %identifier, assets = plan.len(), "download plan ready");

        let outcome = plan.execute(&self.http_client, &scene_dir, request.progress.as_ref())?;

        info!(
            identifier = %identifier,
            status = ?outcome.status,
            files = outcome.files.len(),
            planned = plan.len(),
            "scene download finished"
        );
        Ok(outcome)
    }

    fn metadata(&self, identifier: &SceneIdentifier) -> CatalogResult<String> {
        let scene = self.resolve(identifier)?;
        let url = self.metadata_url(&scene, identifier.as_str());

        self.http_client
            .get(&HttpRequest::get(url))?
            .error_for_status("metadata")?
            .text()
    }
}
