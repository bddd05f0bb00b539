//! HTTP access to provider REST APIs.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::{HeaderMap, LINK};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::{ProviderKind, VcsError};

/// Boxed future returned by transports and services.
pub type VcsFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, VcsError>> + Send + 'a>>;

/// Query parameters of a request.
pub type QueryParams<'a> = &'a [(&'a str, String)];

/// HTTP request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound on fetched pages for a single listing.
pub const MAX_PAGES: usize = 100;

/// One `<target>; params` entry of a `Link` header.
static LINK_VALUE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*<([^>]*)>(.*)$").ok());

/// Authenticated JSON GET access to a provider API.
///
/// Paths are relative to the API base (e.g. `/projects/1/merge_requests`).
pub trait Transport: Send + Sync {
    /// Fetches one JSON document.
    fn get<'a>(&'a self, path: &'a str, params: QueryParams<'a>) -> VcsFuture<'a, Value>;

    /// Fetches every page of a listing, returning page bodies in order.
    fn get_paginated<'a>(
        &'a self,
        path: &'a str,
        params: QueryParams<'a>,
    ) -> VcsFuture<'a, Vec<Value>>;
}

/// [`Transport`] backed by `reqwest`.
///
/// Authentication follows the provider: `PRIVATE-TOKEN` for GitLab, a bearer
/// token for GitHub and Bitbucket. Page links come from the `Link` header,
/// GitLab's `x-next-page` header or a Bitbucket-style `next` body field.
pub struct HttpTransport {
    client: Client,
    provider: ProviderKind,
    api_base: String,
    token: Option<String>,
    max_pages: usize,
}

impl HttpTransport {
    /// Creates a transport for `provider` rooted at `api_base`.
    pub fn new(
        provider: ProviderKind,
        api_base: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, VcsError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("dx-scan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VcsError::Transport(format!("failed to build HTTP client: {e}")))?;

        let api_base = api_base.into().trim_end_matches('/').to_string();
        Url::parse(&api_base)
            .map_err(|e| VcsError::InvalidRepositoryUri(format!("{api_base}: {e}")))?;

        Ok(Self {
            client,
            provider,
            api_base,
            token,
            max_pages: MAX_PAGES,
        })
    }

    /// Sets the page limit for paginated listings.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// API base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str, params: QueryParams<'_>) -> Result<Url, VcsError> {
        let raw = format!("{}/{}", self.api_base, path.trim_start_matches('/'));
        let mut url =
            Url::parse(&raw).map_err(|e| VcsError::Transport(format!("invalid URL {raw}: {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<(HeaderMap, Value), VcsError> {
        debug!(provider = %self.provider, url = %url, "Sending provider request");

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = match self.provider {
                ProviderKind::GitLab => request.header("PRIVATE-TOKEN", token),
                ProviderKind::GitHub | ProviderKind::Bitbucket => request.bearer_auth(token),
            };
        }
        if self.provider == ProviderKind::GitHub {
            request = request.header("Accept", "application/vnd.github+json");
        }

        let response = request
            .send()
            .await
            .map_err(|e| VcsError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| VcsError::Transport(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            warn!(provider = %self.provider, url = %url, %status, "Provider request failed");
            return Err(VcsError::from_status(status.as_u16(), url.path(), &text));
        }

        let body = serde_json::from_str(&text)
            .map_err(|e| VcsError::malformed(self.provider.name(), format!("{url}: {e}")))?;
        debug!(
            provider = %self.provider,
            url = %url,
            bytes = text.len(),
            "Received provider response"
        );
        Ok((headers, body))
    }
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, path: &'a str, params: QueryParams<'a>) -> VcsFuture<'a, Value> {
        Box::pin(async move {
            let url = self.endpoint(path, params)?;
            let (_, body) = self.fetch(url).await?;
            Ok(body)
        })
    }

    /// Follows page links until they run out.
    ///
    /// Fails with [`VcsError::Pagination`] when a link points at a page that
    /// was already fetched, or when more than the page limit would be needed.
    fn get_paginated<'a>(
        &'a self,
        path: &'a str,
        params: QueryParams<'a>,
    ) -> VcsFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let mut pages = Vec::new();
            let mut visited = HashSet::new();
            let mut next = Some(self.endpoint(path, params)?);

            while let Some(url) = next.take() {
                if !visited.insert(url.clone()) {
                    warn!(
                        provider = %self.provider,
                        path,
                        url = %url,
                        "Page link repeats an earlier page"
                    );
                    return Err(VcsError::Pagination {
                        resource: path.to_string(),
                        reason: format!("page link {url} was already fetched"),
                    });
                }
                if pages.len() >= self.max_pages {
                    warn!(
                        provider = %self.provider,
                        path,
                        max = self.max_pages,
                        "Listing exceeds the page limit"
                    );
                    return Err(VcsError::Pagination {
                        resource: path.to_string(),
                        reason: format!("more than {} pages", self.max_pages),
                    });
                }
                let (headers, body) = self.fetch(url.clone()).await?;
                next = next_page(&url, &headers, &body);
                pages.push(body);
            }

            info!(
                provider = %self.provider,
                path,
                pages = pages.len(),
                "Fetched paginated listing"
            );
            Ok(pages)
        })
    }
}

/// Finds the URL of the page following `current`, if any.
pub fn next_page(current: &Url, headers: &HeaderMap, body: &Value) -> Option<Url> {
    if let Some(link) = headers.get(LINK).and_then(|v| v.to_str().ok()) {
        if let Some(url) = parse_next_link(link) {
            return Some(url);
        }
    }

    if let Some(page) = headers
        .get("x-next-page")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        let mut url = current.clone();
        let retained: Vec<(String, String)> = current
            .query_pairs()
            .filter(|(k, _)| k != "page")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair("page", page);
        return Some(url);
    }

    body.get("next")
        .and_then(Value::as_str)
        .and_then(|next| Url::parse(next).ok())
}

/// Extracts the target whose `rel` includes `next` from an RFC 8288 `Link`
/// header.
pub fn parse_next_link(header: &str) -> Option<Url> {
    let re = LINK_VALUE.as_ref()?;
    header
        .split(',')
        .filter_map(|part| re.captures(part))
        .find(|caps| has_next_rel(&caps[2]))
        .and_then(|caps| Url::parse(&caps[1]).ok())
}

/// `rel` holds space-separated relation types, compared case-insensitively.
fn has_next_rel(params: &str) -> bool {
    params
        .split(';')
        .filter_map(|param| param.split_once('='))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case("rel"))
        .any(|(_, value)| {
            value
                .trim()
                .trim_matches('"')
                .split_whitespace()
                .any(|token| token.eq_ignore_ascii_case("next"))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    use super::*;

    #[test]
    fn link_header_next() {
        let header = [
            r#"<https://api.github.com/repos/o/r/pulls?page=1>; rel="prev""#,
            r#"<https://api.github.com/repos/o/r/pulls?page=3>; rel="next""#,
            r#"<https://api.github.com/repos/o/r/pulls?page=9>; rel="last""#,
        ]
        .join(", ");
        assert_eq!(
            parse_next_link(&header).unwrap().as_str(),
            "https://api.github.com/repos/o/r/pulls?page=3"
        );
        assert!(parse_next_link(r#"<https://x/y?page=1>; rel="first""#).is_none());
    }

    #[test]
    fn link_rel_is_a_token_list() {
        assert_eq!(
            parse_next_link(r#"<https://x/y?page=2>; rel="prev next""#)
                .unwrap()
                .as_str(),
            "https://x/y?page=2"
        );
        assert_eq!(
            parse_next_link("<https://x/y?page=4>; title=\"more\"; rel=next")
                .unwrap()
                .as_str(),
            "https://x/y?page=4"
        );
        assert!(parse_next_link(r#"<https://x/y?page=8>; rel="next-archive""#).is_none());
        assert!(parse_next_link(r#"<https://x/y?page=8>; rel="nextish prev""#).is_none());
    }

    #[test]
    fn gitlab_next_page_header_replaces_page() {
        let current =
            Url::parse("https://gitlab.com/api/v4/projects/1/issues?per_page=100&page=1").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-next-page", "2".parse().unwrap());
        let next = next_page(&current, &headers, &Value::Null).unwrap();
        assert_eq!(next.query(), Some("per_page=100&page=2"));

        headers.insert("x-next-page", "".parse().unwrap());
        assert!(next_page(&current, &headers, &Value::Null).is_none());
    }

    #[test]
    fn body_next_field() {
        let current = Url::parse("https://api.bitbucket.org/2.0/repositories/o/r/commits").unwrap();
        let body = json!({
            "values": [],
            "next": "https://api.bitbucket.org/2.0/repositories/o/r/commits?page=2"
        });
        assert_eq!(
            next_page(&current, &HeaderMap::new(), &body)
                .unwrap()
                .query(),
            Some("page=2")
        );
    }

    #[tokio::test]
    async fn follows_link_headers_in_order() {
        let server = MockServer::start().await;
        let page2 = format!("{}/items?page=2", server.uri());

        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([3])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("per_page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", format!("<{page2}>; rel=\"next\"").as_str())
                    .set_body_json(json!([1, 2])),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(ProviderKind::GitHub, server.uri(), None).unwrap();
        let pages = transport
            .get_paginated("/items", &[("per_page", "2".to_string())])
            .await
            .unwrap();
        assert_eq!(pages, vec![json!([1, 2]), json!([3])]);
    }

    #[tokio::test]
    async fn self_referencing_link_is_an_error() {
        let server = MockServer::start().await;
        let page1 = format!("{}/items?page=1", server.uri());
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", format!("<{page1}>; rel=\"next\"").as_str())
                    .set_body_json(json!([1])),
            )
            .expect(2)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(ProviderKind::GitHub, server.uri(), None).unwrap();
        let result = transport.get_paginated("/items", &[]).await;
        assert!(matches!(
            result,
            Err(VcsError::Pagination { ref resource, .. }) if resource == "/items"
        ));
    }

    /// Answers every page with a link to the following one.
    struct EndlessPages;

    impl Respond for EndlessPages {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let page: u32 = request
                .url
                .query_pairs()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(1);
            ResponseTemplate::new(200)
                .insert_header("x-next-page", (page + 1).to_string().as_str())
                .set_body_json(json!([page]))
        }
    }

    #[tokio::test]
    async fn page_limit_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(EndlessPages)
            .expect(3)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(ProviderKind::GitLab, server.uri(), None)
            .unwrap()
            .with_max_pages(3);
        let err = transport.get_paginated("/items", &[]).await.unwrap_err();
        assert_eq!(
            err,
            VcsError::Pagination {
                resource: "/items".to_string(),
                reason: "more than 3 pages".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn listing_at_the_page_limit_completes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([2])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-next-page", "2")
                    .set_body_json(json!([1])),
            )
            .with_priority(10)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(ProviderKind::GitLab, server.uri(), None)
            .unwrap()
            .with_max_pages(2);
        let pages = transport.get_paginated("/items", &[]).await.unwrap();
        assert_eq!(pages, vec![json!([1]), json!([2])]);
    }

    #[tokio::test]
    async fn gitlab_sends_private_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/group%2Frepo"))
            .and(header("PRIVATE-TOKEN", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(
            ProviderKind::GitLab,
            server.uri(),
            Some("secret".to_string()),
        )
        .unwrap();
        let body = transport.get("/projects/group%2Frepo", &[]).await.unwrap();
        assert_eq!(body["id"], 7);
    }

    #[tokio::test]
    async fn maps_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(path("/unauthorized"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
            .mount(&server)
            .await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(ProviderKind::GitHub, server.uri(), None).unwrap();
        assert!(matches!(
            transport.get("/unauthorized", &[]).await,
            Err(VcsError::Authorization { status: 401, .. })
        ));
        assert!(matches!(
            transport.get("/missing", &[]).await,
            Err(VcsError::NotFound(_))
        ));
        assert!(matches!(
            transport.get("/broken", &[]).await,
            Err(VcsError::Transport(_))
        ));
        assert!(matches!(
            transport.get("/garbage", &[]).await,
            Err(VcsError::MalformedResponse {
                provider: "github",
                ..
            })
        ));
    }

    #[test]
    fn rejects_invalid_api_base() {
        assert!(matches!(
            HttpTransport::new(ProviderKind::GitLab, "not a url", None),
            Err(VcsError::InvalidRepositoryUri(_))
        ));
    }
}
