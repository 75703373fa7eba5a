//! Cross-crate integration tests.

mod helpers;

mod layers_test;
mod lifecycle_test;
mod plugins_test;
mod sandbox_test;
