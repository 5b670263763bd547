//! IBM Cloud Object Storage backend using IAM API-key authentication

mod client;
mod error_document;
mod token;

pub use client::{CosIamAdapter, CosSettings};
pub use error_document::ErrorDocument;
pub use token::IamTokenProvider;
