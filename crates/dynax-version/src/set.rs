//! Version sets and range selection.

use std::collections::HashSet;

use semver::{Comparator, Op, Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::requested::parse_loose;

/// Published version strings of one package, without duplicates.
///
/// Insertion order is whatever the registry document used; selection
/// functions impose semver ordering themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionSet {
    versions: Vec<String>,
}

impl VersionSet {
    pub fn new<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let versions = versions
            .into_iter()
            .map(Into::into)
            .filter(|v: &String| seen.insert(v.clone()))
            .collect();
        Self { versions }
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn contains(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().map(String::as_str)
    }

    /// Valid semver members matching `req`, highest precedence first.
    pub fn matching(&self, req: &VersionReq) -> Vec<String> {
        let mut matched: Vec<(Version, &String)> = self
            .versions
            .iter()
            .filter_map(|raw| Version::parse(raw).ok().map(|v| (v, raw)))
            .filter(|(v, _)| req.matches(v))
            .collect();
        matched.sort_by(|(a, _), (b, _)| b.cmp(a));
        matched.into_iter().map(|(_, raw)| raw.clone()).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for VersionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Highest version compatible with `base` under caret rules (`^base`).
///
/// `base` must be a full version (a leading `v` or `=` is tolerated).
/// Returns `None` when nothing matches or `base` is not a version. Members
/// that are not valid semver never match.
pub fn latest_compatible(base: &str, versions: &VersionSet) -> Option<String> {
    let base = parse_loose(base)?;
    versions.matching(&caret(&base)).into_iter().next()
}

fn caret(base: &Version) -> VersionReq {
    VersionReq {
        comparators: vec![Comparator {
            op: Op::Caret,
            major: base.major,
            minor: Some(base.minor),
            patch: Some(base.patch),
            pre: base.pre.clone(),
        }],
    }
}

/// Every member satisfying `range`, highest precedence first.
pub fn satisfying(range: &str, versions: &VersionSet) -> Result<Vec<String>> {
    let req = VersionReq::parse(range).map_err(|source| Error::InvalidRange {
        range: range.to_owned(),
        source,
    })?;
    Ok(versions.matching(&req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> VersionSet {
        VersionSet::new(["1.0.0", "1.2.0", "1.5.3", "2.0.0"])
    }

    #[test]
    fn compatible_picks_highest_in_major() {
        assert_eq!(latest_compatible("1.2.0", &sample()).as_deref(), Some("1.5.3"));
    }

    #[test]
    fn compatible_none_when_major_missing() {
        assert_eq!(latest_compatible("3.0.0", &sample()), None);
    }

    #[test]
    fn compatible_uses_precedence_not_lexical_order() {
        let set = VersionSet::new(["1.9.0", "1.10.0", "1.2.0"]);
        assert_eq!(latest_compatible("1.0.0", &set).as_deref(), Some("1.10.0"));
    }

    #[test]
    fn compatible_ignores_invalid_members() {
        let set = VersionSet::new(["1.0.0", "not-a-version", "1.1"]);
        assert_eq!(latest_compatible("1.0.0", &set).as_deref(), Some("1.0.0"));
    }

    #[test]
    fn compatible_with_invalid_base_is_none() {
        assert_eq!(latest_compatible("banana", &sample()), None);
    }

    #[test]
    fn compatible_requires_full_base_version() {
        assert_eq!(latest_compatible("1", &sample()), None);
        assert_eq!(latest_compatible("1.2", &sample()), None);
        assert_eq!(latest_compatible("^1.0.0", &sample()), None);
    }

    #[test]
    fn compatible_base_cannot_smuggle_extra_comparators() {
        assert_eq!(latest_compatible("1.0.0, <1.3.0", &sample()), None);
        assert_eq!(latest_compatible("1.0.0 || 2.0.0", &sample()), None);
    }

    #[test]
    fn compatible_tolerates_prefixed_base() {
        assert_eq!(latest_compatible("v1.2.0", &sample()).as_deref(), Some("1.5.3"));
        assert_eq!(latest_compatible(" =1.2.0 ", &sample()).as_deref(), Some("1.5.3"));
    }

    #[test]
    fn compatible_on_empty_set_is_none() {
        assert_eq!(latest_compatible("1.0.0", &VersionSet::default()), None);
    }

    #[test]
    fn prerelease_excluded_from_other_release_lines() {
        let set = VersionSet::new(["1.0.0", "1.1.0-beta.1"]);
        assert_eq!(latest_compatible("1.0.0", &set).as_deref(), Some("1.0.0"));
    }

    #[test]
    fn satisfying_sorts_descending() {
        let matched = satisfying(">=1.0.0, <2.0.0", &sample()).unwrap();
        assert_eq!(matched, vec!["1.5.3", "1.2.0", "1.0.0"]);
    }

    #[test]
    fn satisfying_accepts_wildcards() {
        let matched = satisfying("1.*", &sample()).unwrap();
        assert_eq!(matched.first().map(String::as_str), Some("1.5.3"));
    }

    #[test]
    fn satisfying_rejects_garbage_range() {
        let err = satisfying("not a range", &sample()).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn duplicates_are_dropped() {
        let set = VersionSet::new(["1.0.0", "1.0.0", "2.0.0"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("2.0.0"));
    }

    fn version_strategy() -> impl Strategy<Value = String> {
        (0u64..4, 0u64..12, 0u64..12).prop_map(|(a, b, c)| format!("{a}.{b}.{c}"))
    }

    proptest! {
        #[test]
        fn compatible_result_dominates_all_matches(
            versions in proptest::collection::vec(version_strategy(), 0..24),
            base in version_strategy(),
        ) {
            let set = VersionSet::new(versions);
            let req = VersionReq::parse(&format!("^{base}")).unwrap();
            match latest_compatible(&base, &set) {
                Some(best) => {
                    let best = Version::parse(&best).unwrap();
                    prop_assert!(req.matches(&best));
                    for candidate in set.iter() {
                        let candidate = Version::parse(candidate).unwrap();
                        if req.matches(&candidate) {
                            prop_assert!(candidate <= best);
                        }
                    }
                }
                None => {
                    for candidate in set.iter() {
                        prop_assert!(!req.matches(&Version::parse(candidate).unwrap()));
                    }
                }
            }
        }
    }
}
