use sha1::{Digest, Sha1};

/// Signs upload parameters the way the media store expects.
///
/// Parameters are sorted by name, empty values dropped, joined as
/// `k1=v1&k2=v2`, the API secret appended, and the result SHA-1 hashed.
/// `file`, `api_key`, `resource_type` and `cloud_name` must not be passed in.
#[must_use]
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!("{:x}", Sha1::digest(format!("{joined}{api_secret}").as_bytes()))
}
