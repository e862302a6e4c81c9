//! Integration tests for cv-catalog.
//!
//! Most tests run the builder against in-memory listing and geometry doubles.
//! The LocalStack tests are marked `#[ignore]` and need a running endpoint:
//!
//! ```bash
//! LOCALSTACK_ENDPOINT=http://localhost:4566 cargo test -p cv-catalog -- --ignored
//! ```

mod builder_test;
