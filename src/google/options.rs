//! Command-line options for the Google engine.

use std::time::Duration;

use clap::Parser;

/// Sent when no `-U` is given.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:91.0) Gecko/20100101 Firefox/91.0";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Options accepted by `dorkali google [OPTIONS] QUERY...`.
///
/// Defaults match [`GoogleOptions::default`].
#[derive(Debug, Clone, Parser)]
#[command(
    name = "google",
    no_binary_name = true,
    about = "Searches in google search engine"
)]
pub struct GoogleOptions {
    /// Print the request URL and request/response headers to stderr
    #[arg(short = 'v', long, help_heading = "Output Options")]
    pub verbose: bool,

    /// Send a cookie to google, e.g. -C 'KEY=VALUE' (repeatable). Without
    /// any, cookies are first fetched from the google home page
    #[arg(
        short = 'C',
        long = "cookie",
        value_name = "COOKIE",
        value_parser = parse_cookie,
        help_heading = "Request Options"
    )]
    pub cookies: Vec<(String, String)>,

    /// Pass a custom header, e.g. -H 'KEY: VALUE' (repeatable)
    #[arg(
        short = 'H',
        long = "header",
        value_name = "HEADER",
        value_parser = parse_header,
        help_heading = "Request Options"
    )]
    pub headers: Vec<(String, String)>,

    /// User-Agent header
    #[arg(
        short = 'U',
        long = "user-agent",
        default_value = DEFAULT_USER_AGENT,
        help_heading = "Request Options"
    )]
    pub user_agent: String,

    /// Maximum time allowed for each request, e.g. 500ms, 10s, 1m
    #[arg(
        short = 't',
        long,
        value_name = "DURATION",
        default_value = "20s",
        value_parser = parse_timeout,
        help_heading = "Request Options"
    )]
    pub timeout: Duration,

    /// Number of results
    #[arg(short = 'n', long = "num", default_value_t = 10, help_heading = "Search Options")]
    pub num: u32,

    /// Offset of the first result
    #[arg(long, default_value_t = 0, help_heading = "Search Options")]
    pub start: u32,

    /// Safe search
    #[arg(long, help_heading = "Search Options")]
    pub safe: bool,

    /// Top level domain, e.g. .com or co.uk
    #[arg(long, default_value = ".com", help_heading = "Search Options")]
    pub tld: String,

    /// Restrict results to a language, e.g. en
    #[arg(long, help_heading = "Search Options")]
    pub lang: Option<String>,

    /// Country or region to focus the search on, e.g. countryUS
    #[arg(long, help_heading = "Search Options")]
    pub country: Option<String>,

    /// Adds inurl:TEXT to the query
    #[arg(long, value_name = "TEXT", help_heading = "Query Helpers")]
    pub inurl: Option<String>,

    /// Adds intext:TEXT to the query
    #[arg(long, value_name = "TEXT", help_heading = "Query Helpers")]
    pub intext: Option<String>,

    /// Adds filetype:TEXT to the query
    #[arg(long, value_name = "TEXT", help_heading = "Query Helpers")]
    pub filetype: Option<String>,

    /// Adds ext:TEXT to the query
    #[arg(long, value_name = "TEXT", help_heading = "Query Helpers")]
    pub ext: Option<String>,

    /// Words to search for
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,
}

impl Default for GoogleOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            cookies: Vec::new(),
            headers: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            num: 10,
            start: 0,
            safe: false,
            tld: ".com".to_string(),
            lang: None,
            country: None,
            inurl: None,
            intext: None,
            filetype: None,
            ext: None,
            query: Vec::new(),
        }
    }
}

impl GoogleOptions {
    /// The query words plus every query helper, or `None` without a query.
    #[must_use]
    pub fn full_query(&self) -> Option<String> {
        let mut query = self.query.join(" ").trim().to_string();
        if query.is_empty() {
            return None;
        }

        let helpers = [
            ("inurl", &self.inurl),
            ("intext", &self.intext),
            ("filetype", &self.filetype),
            ("ext", &self.ext),
        ];
        for (operator, value) in helpers {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push(' ');
                query.push_str(operator);
                query.push(':');
                query.push_str(value);
            }
        }
        Some(query)
    }

    /// The top level domain with a leading dot; `.com` when empty.
    #[must_use]
    pub fn normalized_tld(&self) -> String {
        let tld = self.tld.trim();
        if tld.is_empty() {
            ".com".to_string()
        } else if tld.starts_with('.') {
            tld.to_string()
        } else {
            format!(".{tld}")
        }
    }
}

fn split_pair(s: &str, separator: char) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once(separator)
        .ok_or_else(|| format!("expected KEY{separator}VALUE, got {s:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_cookie(s: &str) -> Result<(String, String), String> {
    split_pair(s, '=')
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    split_pair(s, ':')
}

/// Parses `500ms`, `20s`, `1.5m`, `1h` or a bare number of seconds.
pub fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration {s:?}"))?;
    let seconds = match unit {
        "" | "s" => value,
        "ms" => value / 1000.0,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => return Err(format!("unknown duration unit {unit:?} in {s:?}")),
    };
    Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> GoogleOptions {
        GoogleOptions::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults_match_clap_defaults() {
        let parsed = parse(&[]);
        let default = GoogleOptions::default();

        assert_eq!(parsed.user_agent, default.user_agent);
        assert_eq!(parsed.timeout, default.timeout);
        assert_eq!(parsed.num, default.num);
        assert_eq!(parsed.start, default.start);
        assert_eq!(parsed.tld, default.tld);
        assert!(!parsed.safe && !parsed.verbose);
        assert!(parsed.full_query().is_none());
    }

    #[test]
    fn test_full_option_set() {
        let opts = parse(&[
            "-v", "-C", "NID=abc", "-C", "CONSENT = YES+", "-H", "X-Test: 1", "-U", "curl/8",
            "-t", "5s", "-n", "20", "--start", "10", "--safe", "--tld", "de", "--lang", "de",
            "--country", "countryDE", "--inurl", "admin", "rust", "book",
        ]);

        assert!(opts.verbose);
        assert_eq!(
            opts.cookies,
            vec![
                ("NID".to_string(), "abc".to_string()),
                ("CONSENT".to_string(), "YES+".to_string())
            ]
        );
        assert_eq!(opts.headers, vec![("X-Test".to_string(), "1".to_string())]);
        assert_eq!(opts.user_agent, "curl/8");
        assert_eq!(opts.timeout, Duration::from_secs(5));
        assert_eq!(opts.num, 20);
        assert_eq!(opts.start, 10);
        assert!(opts.safe);
        assert_eq!(opts.normalized_tld(), ".de");
        assert_eq!(opts.full_query().as_deref(), Some("rust book inurl:admin"));
    }

    #[test]
    fn test_header_value_may_contain_separator() {
        let opts = parse(&["-H", "Referer: https://x.test/", "q"]);
        assert_eq!(
            opts.headers,
            vec![("Referer".to_string(), "https://x.test/".to_string())]
        );
    }

    #[test]
    fn test_malformed_cookie_rejected() {
        assert!(GoogleOptions::try_parse_from(["-C", "novalue", "q"]).is_err());
    }

    #[test]
    fn test_query_helpers_in_order() {
        let opts = GoogleOptions {
            query: vec!["report".into()],
            inurl: Some("files".into()),
            intext: Some("budget".into()),
            filetype: Some("pdf".into()),
            ext: Some("pdf".into()),
            ..GoogleOptions::default()
        };
        assert_eq!(
            opts.full_query().as_deref(),
            Some("report inurl:files intext:budget filetype:pdf ext:pdf")
        );
    }

    #[test]
    fn test_normalized_tld() {
        let mut opts = GoogleOptions::default();
        assert_eq!(opts.normalized_tld(), ".com");
        opts.tld = String::new();
        assert_eq!(opts.normalized_tld(), ".com");
        opts.tld = "co.uk".into();
        assert_eq!(opts.normalized_tld(), ".co.uk");
    }

    #[test]
    fn test_parse_timeout_units() {
        assert_eq!(parse_timeout("20s"), Ok(Duration::from_secs(20)));
        assert_eq!(parse_timeout("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_timeout("1m"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_timeout("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_timeout("1.5s"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_timeout("7"), Ok(Duration::from_secs(7)));
        assert!(parse_timeout("10 days").is_err());
        assert!(parse_timeout("-1s").is_err());
        assert!(parse_timeout("").is_err());
    }
}
