//! Wire models for both sides of the proxy
//!
//! - [`artifacthub`]: documents consumed from the Artifact Hub API
//! - [`tektonhub`]: documents produced for Tekton Hub API clients

pub mod artifacthub;
pub mod tektonhub;
