//! Policy document synthesis.

pub mod policy_builder;

pub use policy_builder::{
    bucket_object_document, bucket_objects_resource, build_single_statement,
    lambda_trust_document, logs_write_document,
};
