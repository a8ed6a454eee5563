//! Fixture data for the back-office functional tests
//!
//! Static records that feed the suites with filter inputs and expected
//! substrings:
//! - demo addresses installed with the shop ([`address`])
//! - import sample files and the header line each one documents ([`sample_files`])
//! - data-driven filter cases, built-in or loaded from YAML ([`cases`])

pub mod address;
pub mod cases;
pub mod error;
pub mod sample_files;

pub use address::Address;
pub use cases::{FilterCase, FilterCaseSet, FilterKind};
pub use error::{FixtureError, FixtureResult};
pub use sample_files::SampleFileKind;
