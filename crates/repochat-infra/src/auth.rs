//! OAuth callback token extraction.
//!
//! After the user authorizes the app, the service redirects back with an
//! `access_token` query parameter. That parameter is read exactly once, at
//! connect time, and held in process memory for the rest of the run --
//! nothing is persisted.

use secrecy::SecretString;
use url::Url;

/// Extract the `access_token` query parameter from an OAuth callback URL.
///
/// Returns `None` when the URL does not parse, the parameter is absent, or
/// its value is empty.
pub fn extract_access_token(callback_url: &str) -> Option<SecretString> {
    let parsed = Url::parse(callback_url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_extracts_token() {
        let token =
            extract_access_token("http://127.0.0.1:3000/?access_token=gho_abc123").unwrap();
        assert_eq!(token.expose_secret(), "gho_abc123");
    }

    #[test]
    fn test_extracts_token_among_other_params() {
        let token = extract_access_token(
            "http://127.0.0.1:3000/callback?state=xyz&access_token=gho_abc123&scope=repo",
        )
        .unwrap();
        assert_eq!(token.expose_secret(), "gho_abc123");
    }

    #[test]
    fn test_missing_token_is_none() {
        assert!(extract_access_token("http://127.0.0.1:3000/?code=abc").is_none());
        assert!(extract_access_token("http://127.0.0.1:3000/").is_none());
    }

    #[test]
    fn test_empty_token_is_none() {
        assert!(extract_access_token("http://127.0.0.1:3000/?access_token=").is_none());
    }

    #[test]
    fn test_unparseable_url_is_none() {
        assert!(extract_access_token("not a url").is_none());
    }
}
