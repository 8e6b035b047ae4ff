//! # pcae-core: Foundational Types for the Configuration & Audit Engine
//!
//! Leaf crate of the workspace. Every other `pcae-*` crate depends on it and
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for tenant identity.** [`CountryCode`] and
//!    [`IndustryCode`] reject blank input at construction, so a
//!    [`TenantKey`] always names a resolvable (country, industry) scope.
//!
//! 2. **`CanonicalBytes` newtype.** All digest computation flows through
//!    [`CanonicalBytes::new()`]. Audit hashes are never computed over raw
//!    `serde_json::to_vec()` output.
//!
//! 3. **Injected time.** Components that reason about expiry or stamp
//!    events take a [`Clock`] so tests can drive time with [`ManualClock`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pcae-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod clock;
pub mod digest;
pub mod error;
pub mod tenant;

pub use canonical::CanonicalBytes;
pub use clock::{Clock, ManualClock, SystemClock};
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CryptoError, PcaeError, ValidationError};
pub use tenant::{CountryCode, IndustryCode, TenantKey};
