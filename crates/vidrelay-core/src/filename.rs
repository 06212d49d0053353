//! Filename handling for `Content-Disposition` headers.
//!
//! Inbound: backends announce the artifact name with
//! `filename="..."` (often raw UTF-8) or, less often, only the RFC 5987
//! `filename*=UTF-8''...` form. Outbound: always the RFC 5987 form.

/// Extract a filename from a `Content-Disposition` header value.
///
/// A plain `filename=` parameter wins; quote characters are stripped and the
/// value ends at the next `;`. When only `filename*=` is present its value is
/// percent-decoded after dropping the `charset'lang'` prefix.
///
/// Returns `None` when neither parameter yields a non-empty name.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    if let Some((_, rest)) = value.split_once("filename=") {
        let raw = rest.split(';').next().unwrap_or_default();
        let name: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '"' && *c != '\'')
            .collect();
        if !name.is_empty() {
            return Some(name);
        }
    }

    let (_, rest) = value.split_once("filename*=")?;
    let raw = rest.split(';').next().unwrap_or_default().trim();
    let encoded = raw.rsplit("''").next().unwrap_or(raw);
    let decoded = urlencoding::decode(encoded).ok()?;
    let name = decoded.trim_matches('"');
    (!name.is_empty()).then(|| name.to_string())
}

/// Percent-encode a filename for the `filename*` parameter.
///
/// Only ASCII alphanumerics and `-_.~` are left as is.
pub fn encode_filename(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

/// Build the `Content-Disposition` value used for relayed artifacts.
pub fn attachment_disposition(name: &str) -> String {
    format!("attachment; filename*=UTF-8''{}", encode_filename(name))
}
