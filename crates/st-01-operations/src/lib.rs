//! # Operations
//!
//! The operation model of the protocol: parsing the four operation kinds,
//! validating their deltas and signed data, and applying document patches.
//!
//! ## Operation Kinds
//!
//! | Kind | Authorized by | Carries a delta | Next commitments |
//! |------|---------------|-----------------|------------------|
//! | create | nobody (self-certifying suffix) | yes | recovery and update |
//! | update | update key | yes | update |
//! | recover | recovery key | yes | recovery and update |
//! | deactivate | recovery key | no | none |
//!
//! ## Module Structure
//!
//! ```text
//! st-01-operations/
//! ├── domain/
//! │   ├── operation.rs    # Operation sum type, anchored and ingestion parsing
//! │   ├── delta.rs        # {patches, updateCommitment}
//! │   ├── suffix_data.rs  # {deltaHash, recoveryCommitment}, unique suffix
//! │   ├── signed_data.rs  # JWS payloads of signed operations
//! │   ├── patches.rs      # Document patch actions
//! │   ├── document.rs     # Document state and entry validation
//! │   ├── long_form.rs    # Short and long form identifiers
//! │   ├── validation.rs   # Multihash, reveal value, CAS URI checks
//! │   └── errors.rs       # Mapping into protocol error codes
//! └── request.rs          # Builders for signed requests
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod request;

pub use domain::delta::Delta;
pub use domain::document::{DocumentState, PublicKeyEntry, PublicKeyPurpose, ServiceEntry};
pub use domain::long_form::{long_form_did, Did};
pub use domain::operation::{
    CreateOperation, DeactivateOperation, Operation, RecoverOperation, UpdateOperation,
};
pub use domain::patches::{apply_patches, DocumentPatch};
pub use domain::signed_data::{
    DeactivateSignedData, RecoverSignedData, SignedData, UpdateSignedData,
};
pub use domain::suffix_data::{compute_unique_suffix, SuffixData};
pub use domain::validation::{
    canonicalize_then_hash_then_encode, commitment_for_key, commitment_from_reveal_value,
    validate_cas_uri, validate_did_suffix, validate_encoded_multihash,
};
pub use request::{
    create_request, deactivate_request, recover_request, update_request, KeySet, OperationRequest,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
