//! Verification schemes and the registry resolving them by identifier.
//!
//! A scheme fixes the maximum number of groups, whether a group may mix
//! categories, and which relative orders of categories are accepted. The
//! accepted orders are every order-preserving subsequence of the scheme's
//! base order, so any category may be absent but present ones keep their
//! relative position.

use crate::error::SetupError;
use crate::models::ImportKind;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identifier of a built-in scheme. Names arrive as plain strings from the
/// CLI and the config file and are resolved through `SchemeRegistry::resolve_name`.
pub enum SchemeId {
    StdLocalThirdParty,
    StdThirdPartyLocal,
}

impl SchemeId {
    pub const ALL: [SchemeId; 2] = [SchemeId::StdLocalThirdParty, SchemeId::StdThirdPartyLocal];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemeId::StdLocalThirdParty => "stdLocalThirdParty",
            SchemeId::StdThirdPartyLocal => "stdThirdPartyLocal",
        }
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeId {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemeId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| SetupError::UnknownScheme(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable policy shared read-only by every file verification of a run.
pub struct Scheme {
    pub id: SchemeId,
    pub max_groups: usize,
    pub allow_mixed: bool,
    pub allowed_orderings: Vec<Vec<ImportKind>>,
}

impl Scheme {
    /// Build a scheme accepting every ordered subsequence of `base_order`.
    pub fn ordered(id: SchemeId, max_groups: usize, allow_mixed: bool, base_order: Vec<ImportKind>) -> Self {
        let allowed_orderings = ordered_subsequences(&base_order);
        Self {
            id,
            max_groups,
            allow_mixed,
            allowed_orderings,
        }
    }

    /// Human-readable names of `kinds`, as printed in order violations.
    pub fn category_names(&self, kinds: &[ImportKind]) -> Vec<&'static str> {
        kinds.iter().map(|k| k.name()).collect()
    }

    /// Whether the observed per-group kinds equal one allowed ordering.
    pub fn accepts(&self, observed: &[ImportKind]) -> bool {
        self.allowed_orderings.iter().any(|allowed| {
            allowed.len() == observed.len()
                && observed.iter().zip(allowed).all(|(o, a)| o.satisfies(*a))
        })
    }
}

fn ordered_subsequences(base: &[ImportKind]) -> Vec<Vec<ImportKind>> {
    let mut out: Vec<Vec<ImportKind>> = (0u32..(1 << base.len()))
        .map(|mask| {
            base.iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, k)| *k)
                .collect()
        })
        .collect();
    out.sort_by_key(|o: &Vec<ImportKind>| o.len());
    out
}

/// Closed mapping from scheme identifier to its shared definition.
#[derive(Debug, Clone)]
pub struct SchemeRegistry {
    schemes: BTreeMap<SchemeId, Arc<Scheme>>,
}

impl SchemeRegistry {
    /// Registry holding the two built-in three-group schemes.
    pub fn builtin() -> Self {
        use ImportKind::{Local, Std, ThirdParty};
        let mut schemes = BTreeMap::new();
        for scheme in [
            Scheme::ordered(SchemeId::StdLocalThirdParty, 3, false, vec![Std, Local, ThirdParty]),
            Scheme::ordered(SchemeId::StdThirdPartyLocal, 3, false, vec![Std, ThirdParty, Local]),
        ] {
            schemes.insert(scheme.id, Arc::new(scheme));
        }
        Self { schemes }
    }

    pub fn resolve(&self, id: SchemeId) -> Result<Arc<Scheme>, SetupError> {
        self.schemes
            .get(&id)
            .cloned()
            .ok_or_else(|| SetupError::UnknownScheme(id.to_string()))
    }

    pub fn resolve_name(&self, name: &str) -> Result<Arc<Scheme>, SetupError> {
        self.resolve(name.parse()?)
    }
}
