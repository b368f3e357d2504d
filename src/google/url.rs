//! Search URL generation and result link cleanup.

use url::Url;

use super::options::GoogleOptions;
use crate::error::{Error, Result};

/// Google asks for a few more results than wanted; some containers are
/// ads or widgets without a usable link.
const EXTRA_RESULTS: u32 = 3;

/// Builds `https://www.google{tld}/search?...` for the configured query.
///
/// Parameters are emitted in alphabetical order: `cr`, `lr`, `num`, `q`,
/// `safe`, `start`.
pub fn search_url(options: &GoogleOptions) -> Result<Url> {
    let query = options.full_query().ok_or(Error::MissingQuery)?;
    let tld = options.normalized_tld();

    let mut url = Url::parse(&format!("https://www.google{tld}/search"))
        .map_err(|e| Error::InvalidOption(format!("tld {tld:?}: {e}")))?;

    {
        let mut pairs = url.query_pairs_mut();
        if let Some(country) = options.country.as_deref().filter(|c| !c.is_empty()) {
            pairs.append_pair("cr", country);
        }
        if let Some(lang) = options.lang.as_deref().filter(|l| !l.is_empty()) {
            pairs.append_pair("lr", &format!("lang_{lang}"));
        }
        pairs.append_pair("num", &(options.num + EXTRA_RESULTS).to_string());
        pairs.append_pair("q", &query);
        pairs.append_pair("safe", if options.safe { "on" } else { "off" });
        if options.start != 0 {
            pairs.append_pair("start", &options.start.to_string());
        }
    }

    Ok(url)
}

/// Turns the `href` of a result link into the URL shown to the user.
///
/// - empty stays empty
/// - links back to `/search` (related searches, pagination) become empty
/// - `/url?q=...` redirects resolve to their target
/// - Google Translate proxies resolve to their `u` parameter
/// - anything else, including unparsable input, is returned unchanged
#[must_use]
pub fn filter_url(href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }

    let relative = href.starts_with('/') && !href.starts_with("//");
    let parsed = if relative {
        Url::parse("https://www.google.com/").and_then(|base| base.join(href))
    } else {
        Url::parse(href)
    };
    let Ok(parsed) = parsed else {
        return href.to_string();
    };

    if parsed.path() == "/search" {
        return String::new();
    }

    if relative && parsed.path() == "/url" {
        return query_param(&parsed, "q")
            .or_else(|| query_param(&parsed, "url"))
            .unwrap_or_default();
    }

    if parsed
        .host_str()
        .is_some_and(|host| host.contains("translate.google.com"))
    {
        return query_param(&parsed, "u").unwrap_or_default();
    }

    href.to_string()
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(query: &str) -> GoogleOptions {
        GoogleOptions {
            query: vec![query.to_string()],
            ..GoogleOptions::default()
        }
    }

    #[test]
    fn test_default_search_url() {
        let url = search_url(&options("rust")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.google.com/search?num=13&q=rust&safe=off"
        );
    }

    #[test]
    fn test_search_url_all_parameters() {
        let opts = GoogleOptions {
            query: vec!["annual report".into()],
            filetype: Some("pdf".into()),
            lang: Some("en".into()),
            country: Some("countryUS".into()),
            safe: true,
            start: 20,
            num: 5,
            tld: "co.uk".into(),
            ..GoogleOptions::default()
        };
        assert_eq!(
            search_url(&opts).unwrap().as_str(),
            "https://www.google.co.uk/search?cr=countryUS&lr=lang_en&num=8&q=annual+report+filetype%3Apdf&safe=on&start=20"
        );
    }

    #[test]
    fn test_search_url_requires_query() {
        assert!(matches!(
            search_url(&GoogleOptions::default()),
            Err(Error::MissingQuery)
        ));
    }

    #[test]
    fn test_search_url_bad_tld() {
        let opts = GoogleOptions {
            tld: "bad tld".into(),
            ..options("x")
        };
        assert!(matches!(search_url(&opts), Err(Error::InvalidOption(_))));
    }

    #[test]
    fn test_filter_url_passthrough() {
        assert_eq!(filter_url("http://x.test/p"), "http://x.test/p");
        assert_eq!(filter_url("https://rust-lang.org/"), "https://rust-lang.org/");
    }

    #[test]
    fn test_filter_url_empty() {
        assert_eq!(filter_url(""), "");
    }

    #[test]
    fn test_filter_url_search_links_dropped() {
        assert_eq!(filter_url("/search?q=related&tbm=isch"), "");
        assert_eq!(filter_url("https://www.google.com/search?q=x"), "");
    }

    #[test]
    fn test_filter_url_redirect() {
        assert_eq!(
            filter_url("/url?q=https://example.org/page%3Fa%3D1&sa=U&ved=xyz"),
            "https://example.org/page?a=1"
        );
        assert_eq!(filter_url("/url?sa=t&url=https://example.org/"), "https://example.org/");
    }

    #[test]
    fn test_filter_url_translate() {
        assert_eq!(
            filter_url("https://translate.google.com/translate?hl=en&u=https://example.de/seite"),
            "https://example.de/seite"
        );
        assert_eq!(filter_url("https://translate.google.com/translate?hl=en"), "");
    }

    #[test]
    fn test_filter_url_unparsable_unchanged() {
        assert_eq!(filter_url("not a url"), "not a url");
        assert_eq!(filter_url("javascript:void(0)"), "javascript:void(0)");
    }
}
