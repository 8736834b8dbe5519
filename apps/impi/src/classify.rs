//! Import path classification.
//!
//! Go standard library paths never contain a dot in their first element,
//! so "no dot anywhere" is taken to mean standard library. Anything dotted is
//! local when it starts with the configured prefix and third party otherwise.
//! Without a prefix the two cannot be told apart.

use crate::models::ImportKind;

/// Classify `path` against `local_prefix` (empty means unset).
pub fn classify(path: &str, local_prefix: &str) -> ImportKind {
    if !path.contains('.') {
        return ImportKind::Std;
    }
    if local_prefix.is_empty() {
        return ImportKind::LocalOrThirdParty;
    }
    if path.starts_with(local_prefix) {
        ImportKind::Local
    } else {
        ImportKind::ThirdParty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undotted_paths_are_std_regardless_of_prefix() {
        for p in ["fmt", "net/http", "C", "golang_org/x/net"] {
            assert_eq!(classify(p, ""), ImportKind::Std);
            assert_eq!(classify(p, "github.com/acme/app"), ImportKind::Std);
        }
    }

    #[test]
    fn dotted_paths_split_on_prefix() {
        let prefix = "github.com/pavius/impi";
        assert_eq!(classify("github.com/pavius/impi/a", prefix), ImportKind::Local);
        assert_eq!(classify("github.com/pavius/impi", prefix), ImportKind::Local);
        assert_eq!(classify("github.com/another/3rdparty", prefix), ImportKind::ThirdParty);
        assert_eq!(classify("golang.org/x/sync/errgroup", prefix), ImportKind::ThirdParty);
    }

    #[test]
    fn dotted_path_without_prefix_is_ambiguous() {
        assert_eq!(classify("github.com/some/thirdparty", ""), ImportKind::LocalOrThirdParty);
    }
}
