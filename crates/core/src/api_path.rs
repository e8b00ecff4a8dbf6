//! Backend base-URL resolution and request path building.
//!
//! The base is resolved once at startup (see `ClientConfig` in
//! `sheetport-client`) and handed to the HTTP client explicitly. When no
//! explicit base is configured, requests go through the `/api` proxy
//! prefix of the configured origin.

use url::Url;

use crate::error::CoreError;

/// Path prefix used on the origin when no explicit API base is set.
pub const PROXY_PREFIX: &str = "api";

/// Resolved root URL of the backend API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    root: Url,
}

impl ApiBase {
    /// Resolve the API root.
    ///
    /// A non-empty `api_base` wins (a trailing `/` is ignored); otherwise the
    /// root is `<origin>/api`.
    pub fn resolve(api_base: Option<&str>, origin: &str) -> Result<Self, CoreError> {
        let explicit = api_base.map(str::trim).filter(|s| !s.is_empty());

        let root = match explicit {
            Some(base) => parse_root(base.trim_end_matches('/'))?,
            None => {
                let mut root = parse_root(origin.trim_end_matches('/'))?;
                root.path_segments_mut()
                    .map_err(|()| cannot_be_base(origin))?
                    .pop_if_empty()
                    .push(PROXY_PREFIX);
                root
            }
        };

        Ok(Self { root })
    }

    /// Build an absolute endpoint URL from path segments.
    ///
    /// Each segment is percent-encoded, so identifiers containing `/`, spaces
    /// or other reserved characters stay inside their own segment.
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        url
    }

    /// The resolved root as a string, without a trailing slash.
    pub fn as_str(&self) -> &str {
        self.root.as_str().trim_end_matches('/')
    }
}

impl std::fmt::Display for ApiBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_root(raw: &str) -> Result<Url, CoreError> {
    let url = Url::parse(raw).map_err(|e| CoreError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(cannot_be_base(raw));
    }
    Ok(url)
}

fn cannot_be_base(raw: &str) -> CoreError {
    CoreError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: "URL cannot carry a path".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn explicit_base_is_used_verbatim() {
        let base = ApiBase::resolve(Some("http://backend:8080"), "http://ignored").unwrap();
        assert_eq!(
            base.endpoint(&["imports", "excel"]).as_str(),
            "http://backend:8080/imports/excel"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_dropped() {
        let base = ApiBase::resolve(Some("http://backend:8080/v1/"), "http://ignored").unwrap();
        assert_eq!(base.as_str(), "http://backend:8080/v1");
        assert_eq!(
            base.endpoint(&["queries"]).as_str(),
            "http://backend:8080/v1/queries"
        );
    }

    #[test]
    fn missing_base_falls_back_to_proxy_prefix() {
        let base = ApiBase::resolve(None, "http://localhost:5173").unwrap();
        assert_eq!(
            base.endpoint(&["query", "sql"]).as_str(),
            "http://localhost:5173/api/query/sql"
        );
    }

    #[test]
    fn blank_base_counts_as_unset() {
        let base = ApiBase::resolve(Some("   "), "http://localhost:5173/").unwrap();
        assert_eq!(base.as_str(), "http://localhost:5173/api");
    }

    #[test]
    fn identifiers_are_percent_encoded() {
        let base = ApiBase::resolve(Some("http://b"), "http://o").unwrap();
        assert_eq!(
            base.endpoint(&["imports", "a b/c"]).as_str(),
            "http://b/imports/a%20b%2Fc"
        );
    }

    #[test]
    fn unparseable_base_is_rejected() {
        assert_matches!(
            ApiBase::resolve(Some("not a url"), "http://o"),
            Err(CoreError::InvalidBaseUrl { .. })
        );
        assert_matches!(
            ApiBase::resolve(Some("mailto:someone@example.com"), "http://o"),
            Err(CoreError::InvalidBaseUrl { .. })
        );
    }
}
