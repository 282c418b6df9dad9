//! Fluent bcrypt API
//!
//! Actions take data as arguments:
//! `Bcrypt::hasher().with_cost(12).hash(password).await`

pub mod builder;

pub use builder::{BcryptBuilder, BcryptBuilderWithHandler};
