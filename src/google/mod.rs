//! Google web search.
//!
//! Result pages are plain HTML. Each organic hit sits in a
//! `<div class="g">` container holding an `<a href>` with an `<h3>` title,
//! and a `<span>` snippet nested in a `<div>`.

pub mod options;
pub mod url;

use std::io::Read;

use clap::{CommandFactory, Parser};
use flate2::read::GzDecoder;
use reqwest::blocking::{Client, Response};
use reqwest::header::{
    HeaderMap, ACCEPT, CONTENT_ENCODING, CONTENT_TYPE, COOKIE, HOST, REFERER, SET_COOKIE,
    USER_AGENT,
};
use reqwest::StatusCode;

use crate::document::Document;
use crate::element::Element;
use crate::encoding;
use crate::engine::{Engine, SearchResult};
use crate::error::{Error, Result};
use crate::matcher::Match;

pub use options::GoogleOptions;

/// Registry name.
pub const ENGINE_NAME: &str = "google";

pub const VERSION: &str = "v1.1.4";

/// The Google search engine.
#[derive(Debug, Clone, Default)]
pub struct GoogleEngine {
    options: GoogleOptions,
}

impl GoogleEngine {
    #[must_use]
    pub fn new(options: GoogleOptions) -> Self {
        Self { options }
    }

    /// Registry constructor.
    #[must_use]
    pub fn boxed() -> Box<dyn Engine> {
        Box::new(Self::default())
    }

    #[must_use]
    pub fn options(&self) -> &GoogleOptions {
        &self.options
    }

    /// Visits the home page to collect session cookies, the way a browser
    /// would before its first search. Failures only cost the cookies.
    fn fetch_session(&self, client: &Client, host: &str) -> (Vec<String>, Option<String>) {
        let home = format!("https://{host}/");
        match client
            .get(&home)
            .header(USER_AGENT, &self.options.user_agent)
            .send()
        {
            Ok(response) => {
                let cookies = response
                    .headers()
                    .get_all(SET_COOKIE)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .filter_map(|v| v.split(';').next())
                    .map(str::trim)
                    .filter(|pair| pair.contains('='))
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                tracing::debug!(count = cookies.len(), "collected session cookies");
                (cookies, Some(response.url().to_string()))
            }
            Err(err) => {
                tracing::warn!(error = %err, url = %home, "could not fetch session cookies");
                (Vec::new(), None)
            }
        }
    }
}

impl Engine for GoogleEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn version(&self) -> &'static str {
        VERSION
    }

    fn description(&self) -> &'static str {
        "Searches in google search engine"
    }

    fn usage(&self) -> String {
        GoogleOptions::command().render_help().to_string()
    }

    fn configure(&mut self, args: &[String]) -> Result<()> {
        let options =
            GoogleOptions::try_parse_from(args).map_err(|e| Error::InvalidOption(e.to_string()))?;
        if options.full_query().is_none() {
            return Err(Error::MissingQuery);
        }
        self.options = options;
        Ok(())
    }

    fn verbose(&self) -> bool {
        self.options.verbose
    }

    fn search(&self) -> Result<Response> {
        let url = url::search_url(&self.options)?;
        let host = format!("www.google{}", self.options.normalized_tld());

        let client = Client::builder().timeout(self.options.timeout).build()?;

        let (mut cookies, referer) = if self.options.cookies.is_empty() {
            self.fetch_session(&client, &host)
        } else {
            (Vec::new(), None)
        };
        cookies.extend(self.options.cookies.iter().map(|(k, v)| format!("{k}={v}")));

        let mut request = client
            .get(url.clone())
            .header(USER_AGENT, &self.options.user_agent)
            .header("DNT", "1")
            .header(ACCEPT, "text/html")
            .header("Alt-Used", &host)
            .header(HOST, &host);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }
        for (key, value) in &self.options.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if !cookies.is_empty() {
            request = request.header(COOKIE, cookies.join("; "));
        }
        let request = request.build()?;

        if self.options.verbose {
            eprintln!("|  {url}\n");
            print_headers("|>", request.headers());
        }

        tracing::debug!(url = %url, "sending search request");
        let response = client.execute(request)?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN {
            return Err(Error::Blocked(status.as_u16()));
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "unexpected search response status");
        }

        if self.options.verbose {
            eprintln!();
            print_headers("|<", response.headers());
            eprintln!();
        }

        Ok(response)
    }

    fn parse_response(&self, response: Response) -> Result<Vec<SearchResult>> {
        let content_encoding = header_str(response.headers(), CONTENT_ENCODING).map(str::to_string);
        let content_type = header_str(response.headers(), CONTENT_TYPE).map(str::to_string);

        let raw = response.bytes()?;
        let html = decode_body(&raw, content_encoding.as_deref(), content_type.as_deref())?;
        self.parse_html(&html)
    }

    fn parse_html(&self, html: &str) -> Result<Vec<SearchResult>> {
        let doc = Document::parse(html)?;
        Ok(extract_results(&doc))
    }
}

/// `<div class="g">`
#[must_use]
pub fn result_container() -> Match {
    Match::tag("div").with_attr("class", "g")
}

/// Extracts one [`SearchResult`] per result container, in page order.
#[must_use]
pub fn extract_results(doc: &Document) -> Vec<SearchResult> {
    let mut results = Vec::new();
    doc.for_each_match(&result_container(), |container| {
        results.push(extract_result(container));
    });
    tracing::debug!(count = results.len(), "extracted search results");
    results
}

/// Reads title, link and snippet from a result container. Missing parts
/// come back as empty strings.
#[must_use]
pub fn extract_result(container: Element<'_>) -> SearchResult {
    let title = container
        .find(&Match::tag("h3").with_parent(Match::tag("a")))
        .map(|e| e.text())
        .unwrap_or_default();

    let description = container
        .find(&Match::tag("span").with_parent(Match::tag("div")))
        .map(|e| e.text())
        .unwrap_or_default();

    let url = container
        .find(&Match::tag("a"))
        .map(|a| url::filter_url(a.attr("href")))
        .unwrap_or_default();

    SearchResult {
        url,
        title,
        description,
    }
}

fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn print_headers(prefix: &str, headers: &HeaderMap) {
    for (name, value) in headers {
        eprintln!("{prefix} {}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
}

/// Turns a raw response body into text.
///
/// A `gzip` content coding is undone first, then the bytes are transcoded
/// using the `Content-Type` charset, a `<meta>` declaration or UTF-8, in
/// that order.
pub fn decode_body(
    body: &[u8],
    content_encoding: Option<&str>,
    content_type: Option<&str>,
) -> Result<String> {
    let gzipped = content_encoding
        .is_some_and(|v| v.eq_ignore_ascii_case("gzip") || v.eq_ignore_ascii_case("x-gzip"));
    let html = if gzipped {
        encoding::transcode_with_header(&gunzip(body)?, content_type)
    } else {
        encoding::transcode_with_header(body, content_type)
    };
    Ok(html)
}

fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::Encoding(format!("gzip body: {e}")))?;
    tracing::debug!(compressed = data.len(), bytes = out.len(), "decompressed response body");
    Ok(out)
}
