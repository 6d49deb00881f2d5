//! Domain filter handed back to external-dns
//!
//! The provider never filters on its own; external-dns asks for the
//! configured filter and applies it before computing changes. Matching is
//! still offered here so callers embedding the engine can use the same rules.

use regex::Regex;
use serde::Serialize;

use crate::config::DomainFilterConfig;
use crate::error::{Error, Result};

/// Include/exclude rules on DNS names
///
/// Two modes, chosen at construction:
/// - **List**: suffix lists of included and excluded domains
/// - **Regex**: an include and/or exclude regular expression
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    include: Vec<String>,
    exclude: Vec<String>,
    regex_include: Option<Regex>,
    regex_exclude: Option<Regex>,
}

impl DomainFilter {
    /// List-mode filter
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include: include.iter().map(|d| normalize(d)).filter(|d| !d.is_empty()).collect(),
            exclude: exclude.iter().map(|d| normalize(d)).filter(|d| !d.is_empty()).collect(),
            regex_include: None,
            regex_exclude: None,
        }
    }

    /// Regex-mode filter
    pub fn regex(include: Option<Regex>, exclude: Option<Regex>) -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            regex_include: include,
            regex_exclude: exclude,
        }
    }

    /// Whether the filter is in regex mode
    pub fn is_regex(&self) -> bool {
        self.regex_include.is_some() || self.regex_exclude.is_some()
    }

    /// Whether a DNS name passes the filter
    ///
    /// In list mode a name matches an entry when it equals the entry or is
    /// a subdomain of it; an entry with a leading dot only matches
    /// subdomains. An empty include list matches everything. Exclusions
    /// always win.
    pub fn matches(&self, dns_name: &str) -> bool {
        let name = normalize(dns_name);

        if self.is_regex() {
            if self.regex_exclude.as_ref().is_some_and(|exclude| exclude.is_match(&name)) {
                return false;
            }
            return self
                .regex_include
                .as_ref()
                .is_none_or(|include| include.is_match(&name));
        }

        if !self.include.is_empty() && !self.include.iter().any(|d| suffix_match(d, &name)) {
            return false;
        }
        !self.exclude.iter().any(|d| suffix_match(d, &name))
    }
}

impl TryFrom<&DomainFilterConfig> for DomainFilter {
    type Error = Error;

    fn try_from(config: &DomainFilterConfig) -> Result<Self> {
        if config.uses_regex() {
            let compile = |pattern: &Option<String>| {
                pattern
                    .as_deref()
                    .map(Regex::new)
                    .transpose()
                    .map_err(|e| Error::config(format!("invalid domain filter regex: {e}")))
            };
            return Ok(Self::regex(
                compile(&config.regex_include)?,
                compile(&config.regex_exclude)?,
            ));
        }

        Ok(Self::new(config.include.clone(), config.exclude.clone()))
    }
}

// Webhook wire shape: {"include": [...], "exclude": [...], "regexInclude": "...", "regexExclude": "..."}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DomainFilterWire<'a> {
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    include: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    exclude: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    regex_include: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    regex_exclude: Option<&'a str>,
}

impl Serialize for DomainFilter {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        DomainFilterWire {
            include: &self.include,
            exclude: &self.exclude,
            regex_include: self.regex_include.as_ref().map(Regex::as_str),
            regex_exclude: self.regex_exclude.as_ref().map(Regex::as_str),
        }
        .serialize(serializer)
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_lowercase()
}

fn suffix_match(entry: &str, name: &str) -> bool {
    match entry.strip_prefix('.') {
        Some(parent) => name.ends_with(&format!(".{parent}")),
        None => name == entry || name.ends_with(&format!(".{entry}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = DomainFilter::default();
        assert!(filter.matches("anything.example.com"));
        assert!(!filter.is_regex());
    }

    #[test]
    fn test_include_suffix() {
        let filter = DomainFilter::new(strings(&["example.com"]), Vec::new());
        assert!(filter.matches("example.com"));
        assert!(filter.matches("www.example.com."));
        assert!(filter.matches("WWW.Example.COM"));
        assert!(!filter.matches("notexample.com"));
        assert!(!filter.matches("example.org"));
    }

    #[test]
    fn test_leading_dot_matches_subdomains_only() {
        let filter = DomainFilter::new(strings(&[".example.com"]), Vec::new());
        assert!(filter.matches("www.example.com"));
        assert!(!filter.matches("example.com"));
    }

    #[test]
    fn test_exclude_wins() {
        let filter = DomainFilter::new(strings(&["example.com"]), strings(&["internal.example.com"]));
        assert!(filter.matches("www.example.com"));
        assert!(!filter.matches("db.internal.example.com"));
    }

    #[test]
    fn test_regex_mode() {
        let filter = DomainFilter::regex(
            Some(Regex::new(r"\.testing$").unwrap()),
            Some(Regex::new(r"^private\.").unwrap()),
        );
        assert!(filter.is_regex());
        assert!(filter.matches("a.testing"));
        assert!(!filter.matches("private.testing"));
        assert!(!filter.matches("a.example.com"));
    }

    #[test]
    fn test_config_prefers_regex() {
        let config = DomainFilterConfig {
            include: strings(&["example.com"]),
            exclude: Vec::new(),
            regex_include: Some(r"\.testing$".to_string()),
            regex_exclude: None,
        };

        let filter = DomainFilter::try_from(&config).unwrap();
        assert!(filter.is_regex());
        assert!(!filter.matches("www.example.com"));
    }

    #[test]
    fn test_config_bad_regex() {
        let config = DomainFilterConfig {
            regex_exclude: Some("[".to_string()),
            ..Default::default()
        };
        assert!(matches!(DomainFilter::try_from(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_serialize_list_filter() {
        let filter = DomainFilter::new(strings(&["example.com"]), Vec::new());
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({"include": ["example.com"]}));
    }

    #[test]
    fn test_serialize_regex_filter() {
        let filter = DomainFilter::regex(None, Some(Regex::new("^skip").unwrap()));
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({"regexExclude": "^skip"}));
    }
}
