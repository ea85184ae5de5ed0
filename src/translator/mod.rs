//! Translation between the Tekton Hub and Artifact Hub vocabularies
//!
//! # Modules
//!
//! - [`version`]: simplified (`0.4`) <-> full (`0.4.0`) version strings
//! - [`catalog`]: catalog names and resource kinds
//! - [`response`]: Artifact Hub payloads to Tekton Hub resources

pub mod catalog;
pub mod response;
pub mod version;

pub use catalog::CatalogTranslator;
pub use response::ResponseTranslator;
pub use version::{VersionError, VersionTranslator};
