//! Shared argument helpers.
//!
//! Argument containers themselves live next to each command; this module
//! holds the parsing they have in common: `KEY[=VALUE]` tokens for volume
//! identifiers and repeatable map flags.

use std::collections::HashMap;

use clap::{ArgMatches, FromArgMatches};

use crate::error::CscError;

/// Split a `KEY[=VALUE]` token.  A bare key maps to the empty string; only
/// the first `=` separates key from value.
pub fn split_key_value(token: &str) -> (String, String) {
    match token.split_once('=') {
        Some((k, v)) => (k.to_owned(), v.to_owned()),
        None => (token.to_owned(), String::new()),
    }
}

/// `clap` value parser for repeatable `KEY[=VALUE]` flags.
pub fn parse_key_value(token: &str) -> Result<(String, String), String> {
    Ok(split_key_value(token))
}

/// Collect pairs into a map; later duplicates overwrite earlier ones.
pub fn to_map<K, V, I>(pairs: I) -> HashMap<String, String>
where
    K: AsRef<str>,
    V: AsRef<str>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
        .collect()
}

/// Build a volume identifier map from positional `KEY[=VALUE]` tokens.
pub fn parse_volume_id<S: AsRef<str>>(tokens: &[S]) -> HashMap<String, String> {
    to_map(tokens.iter().map(|t| split_key_value(t.as_ref())))
}

/// Like [`parse_volume_id`] but rejects an empty token list.
pub fn require_volume_id<S: AsRef<str>>(
    tokens: &[S],
) -> Result<HashMap<String, String>, CscError> {
    if tokens.is_empty() {
        return Err(CscError::usage("missing volume ID"));
    }
    Ok(parse_volume_id(tokens))
}

/// `Some(map)` when at least one pair was supplied.
pub fn non_empty_map(pairs: &[(String, String)]) -> Option<HashMap<String, String>> {
    if pairs.is_empty() {
        None
    } else {
        Some(to_map(pairs.iter().map(|(k, v)| (k, v))))
    }
}

/// Populate an argument container from parsed matches.
pub fn from_matches<A: FromArgMatches>(matches: &ArgMatches) -> Result<A, CscError> {
    A::from_arg_matches(matches).map_err(|e| CscError::usage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_keys_map_to_empty_values() {
        let id = parse_volume_id(&["name=vol-1", "zone", "path=/a=b"]);
        assert_eq!(id.len(), 3);
        assert_eq!(id["name"], "vol-1");
        assert_eq!(id["zone"], "");
        assert_eq!(id["path"], "/a=b");
    }

    #[test]
    fn later_duplicates_overwrite() {
        let id = parse_volume_id(&["id=1", "id=2", "id"]);
        assert_eq!(id.len(), 1);
        assert_eq!(id["id"], "");

        let id = parse_volume_id(&["id", "id=7"]);
        assert_eq!(id["id"], "7");
    }

    #[test]
    fn empty_token_list_is_a_usage_error() {
        let err = require_volume_id::<String>(&[]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn empty_pairs_are_absent() {
        assert!(non_empty_map(&[]).is_none());
        let map = non_empty_map(&[("a".into(), "1".into()), ("a".into(), "2".into())])
            .expect("present");
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], "2");
    }
}
