//! Configuration for the catalog and its command-line front end.
//!
//! - [`ConfigFile`]: the user's INI file, one struct per section
//! - [`CatalogConfig`]: the resolved runtime configuration, built with
//!   `with_*` methods
//!
//! ```ini
//! [catalog]
//! service = copernicus        ; copernicus | earthexplorer | google_cloud
//! download_directory = ~/satellite
//!
//! [credentials]
//! username = alice
//! password = secret
//!
//! [http]
//! timeout_secs = 300
//! connect_timeout_secs = 30
//! ```

mod catalog;
mod file;
mod parser;
mod settings;

pub use catalog::CatalogConfig;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CatalogSettings, ConfigFile, CredentialSettings, HttpFileSettings, DEFAULT_DOWNLOAD_DIRECTORY,
};
