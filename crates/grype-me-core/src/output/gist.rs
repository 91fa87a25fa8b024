//! Publishing badge JSON and the Markdown report to an existing gist.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ActionError, Result};
use crate::report::markdown::truncate;

const USER_AGENT: &str = concat!("grype-me/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BODY_LIMIT: usize = 200;
const ENDPOINT_BADGE_BASE: &str = "https://img.shields.io/endpoint?url=";

/// Names of the files written to the gist for one scan mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GistFilenames {
    pub badge: String,
    pub report: String,
    pub raw: String,
}

/// `<base>.json`, `<base>.md` and `<base>-grype.json`, where `base` is
/// `custom` or `grype-<scan_mode>`.
pub fn gist_filenames(custom: &str, scan_mode: &str) -> GistFilenames {
    let base = match custom.trim() {
        "" => format!("grype-{scan_mode}"),
        name => name.to_string(),
    };
    GistFilenames {
        badge: format!("{base}.json"),
        report: format!("{base}.md"),
        raw: format!("{base}-grype.json"),
    }
}

/// URLs produced by a successful update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GistResult {
    pub gist_url: String,
    /// shields.io endpoint pointing at the badge file.
    pub badge_url: Option<String>,
    /// Gist page anchored at the report file.
    pub report_url: Option<String>,
}

#[derive(Serialize)]
struct GistUpdate<'a> {
    files: BTreeMap<&'a str, GistFileContent<'a>>,
}

#[derive(Serialize)]
struct GistFileContent<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct GistResponse {
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    files: BTreeMap<String, GistFileInfo>,
}

#[derive(Deserialize)]
struct GistFileInfo {
    #[serde(default)]
    raw_url: String,
}

pub struct GistClient {
    http: Client,
    token: String,
    base_url: String,
}

impl GistClient {
    /// `base_url` is the REST API root, e.g. `https://api.github.com`.
    pub fn new(token: impl Into<String>, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            token: token.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Overwrite `files` (name to content) in gist `gist_id`.
    ///
    /// `names` identifies which entries are the badge and the report so
    /// their URLs can be derived from the response.
    pub fn update_gist(
        &self,
        gist_id: &str,
        names: &GistFilenames,
        files: &BTreeMap<String, String>,
    ) -> Result<GistResult> {
        let body = GistUpdate {
            files: files
                .iter()
                .map(|(name, content)| (name.as_str(), GistFileContent { content }))
                .collect(),
        };

        let url = format!("{}/gists/{gist_id}", self.base_url);
        debug!("PATCH {url} ({} files)", files.len());

        let response = self
            .http
            .patch(&url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(CONTENT_TYPE, "application/json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(ActionError::GistApi {
                status: status.as_u16(),
                body: truncate(&text, ERROR_BODY_LIMIT),
            });
        }

        let parsed: GistResponse =
            serde_json::from_str(&text).map_err(|e| ActionError::GistApi {
                status: status.as_u16(),
                body: format!("unreadable response: {e}"),
            })?;

        let badge_url = parsed
            .files
            .get(&names.badge)
            .filter(|f| !f.raw_url.is_empty())
            .map(|f| endpoint_badge_url(&f.raw_url));

        let anchor = gist_file_anchor(&names.report);
        let report_url = (!parsed.html_url.is_empty() && !anchor.is_empty())
            .then(|| format!("{}#{anchor}", parsed.html_url));

        Ok(GistResult {
            gist_url: parsed.html_url,
            badge_url,
            report_url,
        })
    }
}

/// shields.io endpoint badge for a gist raw URL, pinned to the latest
/// revision.
pub fn endpoint_badge_url(raw_url: &str) -> String {
    format!("{ENDPOINT_BADGE_BASE}{}", strip_commit_hash(raw_url))
}

/// `.../raw/<sha>/<file>` becomes `.../raw/<file>`. Anything else is
/// returned unchanged.
pub fn strip_commit_hash(raw_url: &str) -> String {
    const MARKER: &str = "/raw/";

    let Some(idx) = raw_url.find(MARKER) else {
        return raw_url.to_string();
    };
    let (prefix, rest) = raw_url.split_at(idx + MARKER.len());

    match rest.split_once('/') {
        Some((_, file)) => format!("{prefix}{file}"),
        None => raw_url.to_string(),
    }
}

/// Fragment GitHub assigns to a file on the gist page.
///
/// `"My Report (Nightly).md"` becomes `"file-my-report-nightly-md"`. A name
/// with no letters or digits still gets the bare `"file"` anchor; only an
/// empty name yields `""`.
pub fn gist_file_anchor(filename: &str) -> String {
    if filename.is_empty() {
        return String::new();
    }

    let mut slug = String::with_capacity(filename.len());
    for c in filename.chars().flat_map(char::to_lowercase) {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if c == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(c);
    }

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "file".to_string()
    } else {
        format!("file-{slug}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn filenames_default_to_scan_mode() {
        assert_eq!(
            gist_filenames("", "release"),
            GistFilenames {
                badge: "grype-release.json".into(),
                report: "grype-release.md".into(),
                raw: "grype-release-grype.json".into(),
            }
        );
        assert_eq!(gist_filenames("nightly", "head").report, "nightly.md");
    }

    #[test]
    fn strips_commit_hash_after_raw() {
        let raw = "https://gist.githubusercontent.com/u/abc/raw/0123beef/grype-head.json";
        assert_eq!(
            strip_commit_hash(raw),
            "https://gist.githubusercontent.com/u/abc/raw/grype-head.json"
        );
    }

    #[test]
    fn leaves_urls_without_hash_alone() {
        let plain = "https://gist.githubusercontent.com/u/abc/raw/file.json";
        assert_eq!(strip_commit_hash(plain), plain);

        let other = "https://example.com/x.json";
        assert_eq!(strip_commit_hash(other), other);
    }

    #[test]
    fn endpoint_url_wraps_stable_raw_url() {
        let url = endpoint_badge_url("https://gist.githubusercontent.com/u/abc/raw/sha/b.json");
        assert_eq!(
            url,
            concat!(
                "https://img.shields.io/endpoint?url=",
                "https://gist.githubusercontent.com/u/abc/raw/b.json"
            )
        );
    }

    #[test]
    fn anchors_follow_github_slugging() {
        assert_eq!(gist_file_anchor("grype-release.md"), "file-grype-release-md");
        assert_eq!(
            gist_file_anchor("My Report (Nightly).md"),
            "file-my-report-nightly-md"
        );
        assert_eq!(gist_file_anchor("scan_results.v2.md"), "file-scan-results-v2-md");
        assert_eq!(gist_file_anchor(""), "");
    }

    #[test]
    fn separator_only_names_still_get_an_anchor() {
        assert_eq!(gist_file_anchor("..."), "file");
        assert_eq!(gist_file_anchor(" - _"), "file");
        assert!(gist_file_anchor("é.md").starts_with("file"));
    }

    fn files() -> (GistFilenames, BTreeMap<String, String>) {
        let names = gist_filenames("", "head");
        let mut files = BTreeMap::new();
        files.insert(names.badge.clone(), r#"{"schemaVersion":1}"#.to_string());
        files.insert(names.report.clone(), "# report".to_string());
        (names, files)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_gist_patches_files_and_derives_urls() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/gists/abc123"))
            .and(header("Authorization", "token secret"))
            .and(header("Accept", "application/vnd.github+json"))
            .and(header("X-GitHub-Api-Version", "2022-11-28"))
            .and(body_partial_json(json!({
                "files": {
                    "grype-head.md": {"content": "# report"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "html_url": "https://gist.github.com/u/abc123",
                "files": {
                    "grype-head.json": {
                        "raw_url": "https://gist.githubusercontent.com/u/abc123/raw/f00d/grype-head.json"
                    },
                    "grype-head.md": {
                        "raw_url": "https://gist.githubusercontent.com/u/abc123/raw/f00d/grype-head.md"
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let base = server.uri();
        let result = tokio::task::spawn_blocking(move || {
            let (names, files) = files();
            GistClient::new("secret", &base)?.update_gist("abc123", &names, &files)
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(result.gist_url, "https://gist.github.com/u/abc123");
        assert_eq!(
            result.badge_url.as_deref(),
            Some(concat!(
                "https://img.shields.io/endpoint?url=",
                "https://gist.githubusercontent.com/u/abc123/raw/grype-head.json"
            ))
        );
        assert_eq!(
            result.report_url.as_deref(),
            Some("https://gist.github.com/u/abc123#file-grype-head-md")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_success_status_is_gist_api_error() {
        let server = MockServer::start().await;
        let long_body = "x".repeat(500);

        Mock::given(method("PATCH"))
            .and(path("/gists/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string(long_body))
            .mount(&server)
            .await;

        let base = server.uri();
        let err = tokio::task::spawn_blocking(move || {
            let (names, files) = files();
            GistClient::new("secret", &base)?.update_gist("missing", &names, &files)
        })
        .await
        .unwrap()
        .unwrap_err();

        match err {
            ActionError::GistApi { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body.chars().count(), 200);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_badge_file_in_response_yields_no_badge_url() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/gists/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "html_url": "https://gist.github.com/u/abc123",
                "files": {}
            })))
            .mount(&server)
            .await;

        let base = format!("{}/", server.uri());
        let result = tokio::task::spawn_blocking(move || {
            let (names, files) = files();
            GistClient::new("secret", &base)?.update_gist("abc123", &names, &files)
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(result.badge_url, None);
        assert!(result.report_url.is_some());
    }
}
