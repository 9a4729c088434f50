//! AWS-oriented adapter and entry point for the deployment pipeline.
//!
//! This crate owns the `aws-sdk-lambda` integration and the command line
//! surface; all pipeline behavior lives in `lambda_deploy_core`.

pub mod adapters;
pub mod cli;
