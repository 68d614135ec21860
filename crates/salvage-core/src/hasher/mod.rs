pub mod fingerprint;

pub use fingerprint::{fingerprint_data, fingerprint_file, ContentFingerprint};
