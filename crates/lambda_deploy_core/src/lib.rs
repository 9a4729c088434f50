//! Provider-agnostic function deployment primitives.
//!
//! This crate owns packaging, the deployment configuration, the provider
//! contract, and the five-step deployment pipeline. It intentionally excludes
//! AWS SDK concerns; `lambda_deploy_aws` supplies the real provider.

pub mod archive;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory_provider;
pub mod pipeline;
pub mod provider;
