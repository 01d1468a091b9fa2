//! Display-name cleanup for fund listings.
//!
//! The upstream scheme list carries a few known defects: a stray leading
//! word ("as", "name"), the literal word "Scheme", and header rows whose name
//! is the column title "Name". The rules below target exactly those tokens.
//! Records are only dropped from display lists; lookups by code are unaffected.

use crate::domain::FundIdentity;

/// Explicit blocklists. Matching is always on whole tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeRules {
    /// Leading tokens removed once, case-insensitively.
    pub strip_prefixes: Vec<String>,
    /// Tokens removed anywhere in the name (case-sensitive).
    pub strip_words: Vec<String>,
    /// A name containing any of these tokens (case-sensitive) is discarded.
    pub placeholder_tokens: Vec<String>,
}

impl Default for SanitizeRules {
    fn default() -> Self {
        Self {
            strip_prefixes: vec!["as".to_string(), "name".to_string()],
            strip_words: vec!["Scheme".to_string()],
            placeholder_tokens: vec!["Name".to_string()],
        }
    }
}

/// Clean one fund's display name, or `None` when it should not be listed.
pub fn sanitize(fund: &FundIdentity, rules: &SanitizeRules) -> Option<FundIdentity> {
    let name = strip_prefix_token(fund.name.trim_start(), &rules.strip_prefixes);

    let tokens: Vec<&str> = name
        .split_whitespace()
        .filter(|t| !rules.strip_words.iter().any(|w| w == *t))
        .collect();

    if tokens.is_empty() || tokens.iter().any(|t| rules.placeholder_tokens.iter().any(|p| p == *t)) {
        return None;
    }

    Some(FundIdentity {
        code: fund.code.clone(),
        name: tokens.join(" "),
    })
}

/// Sanitize a listing, keeping input order and dropping discarded entries.
pub fn sanitize_all(funds: &[FundIdentity], rules: &SanitizeRules) -> Vec<FundIdentity> {
    funds.iter().filter_map(|f| sanitize(f, rules)).collect()
}

/// Remove the first matching prefix when it is followed by whitespace or the end of the name.
fn strip_prefix_token<'a>(name: &'a str, prefixes: &[String]) -> &'a str {
    for prefix in prefixes {
        let Some(head) = name.get(..prefix.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(prefix) {
            continue;
        }
        let rest = &name[prefix.len()..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return rest;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(code: &str, name: &str) -> Option<FundIdentity> {
        sanitize(&FundIdentity::new(code, name), &SanitizeRules::default())
    }

    #[test]
    fn strips_leading_boilerplate_token() {
        assert_eq!(clean("X", "as Axis Bluechip"), Some(FundIdentity::new("X", "Axis Bluechip")));
        assert_eq!(clean("X", "AS  Axis Bluechip "), Some(FundIdentity::new("X", "Axis Bluechip")));
        assert_eq!(clean("X", "name HDFC Top 100"), Some(FundIdentity::new("X", "HDFC Top 100")));
    }

    #[test]
    fn prefix_must_be_a_whole_token() {
        assert_eq!(
            clean("X", "Aspire Growth Fund"),
            Some(FundIdentity::new("X", "Aspire Growth Fund"))
        );
        assert_eq!(
            clean("X", "Nameless Value Fund"),
            Some(FundIdentity::new("X", "Nameless Value Fund"))
        );
    }

    #[test]
    fn discards_placeholders_and_empty_names() {
        assert_eq!(clean("Y", "Name"), None);
        assert_eq!(clean("Y", "Scheme Name"), None);
        assert_eq!(clean("Y", "as"), None);
        assert_eq!(clean("Y", "   "), None);
    }

    #[test]
    fn removes_scheme_word_and_collapses_spaces() {
        assert_eq!(
            clean("Z", "Axis Liquid Scheme  Direct Plan"),
            Some(FundIdentity::new("Z", "Axis Liquid Direct Plan"))
        );
    }

    #[test]
    fn custom_rules_replace_defaults() {
        let rules = SanitizeRules {
            strip_prefixes: vec![],
            strip_words: vec![],
            placeholder_tokens: vec!["N/A".to_string()],
        };
        let kept = sanitize(&FundIdentity::new("A", "as Fund"), &rules);
        assert_eq!(kept.map(|f| f.name), Some("as Fund".to_string()));
        assert!(sanitize(&FundIdentity::new("B", "N/A"), &rules).is_none());
    }

    #[test]
    fn sanitize_all_keeps_order() {
        let funds = vec![
            FundIdentity::new("1", "as Alpha"),
            FundIdentity::new("2", "Name"),
            FundIdentity::new("3", "Beta"),
        ];
        let out = sanitize_all(&funds, &SanitizeRules::default());
        let codes: Vec<&str> = out.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "3"]);
    }
}
