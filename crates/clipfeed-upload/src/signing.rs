//! Request signing for authenticated host calls.
//!
//! signature = hex(SHA-256(sorted "key=value" pairs joined by "&" || api_secret))

use sha2::{Digest, Sha256};

pub const SIGNATURE_ALGORITHM: &str = "sha256";

/// Sign `params`. Empty values are skipped; keys are sorted before joining.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> =
        params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Form fields for a destroy call. `api_key` and the signature fields are not signed.
pub fn signed_destroy_fields(
    public_id: &str,
    timestamp: i64,
    api_key: &str,
    api_secret: &str,
) -> Vec<(String, String)> {
    let signed = [
        ("public_id", public_id.to_string()),
        ("timestamp", timestamp.to_string()),
    ];
    let signature = sign_params(&signed, api_secret);

    vec![
        ("public_id".to_string(), public_id.to_string()),
        ("timestamp".to_string(), timestamp.to_string()),
        ("api_key".to_string(), api_key.to_string()),
        ("signature".to_string(), signature),
        (
            "signature_algorithm".to_string(),
            SIGNATURE_ALGORITHM.to_string(),
        ),
    ]
}
