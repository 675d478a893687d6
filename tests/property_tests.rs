use cfgvault::tracking::ConfigFileEntry;
use cfgvault::tracking::entry::HASH_SHORT_LEN;
use cfgvault::utils::paths::lexical_clean;
use proptest::prelude::*;
use std::path::{Component, Path, PathBuf};

fn relative_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9_.-]{1,12}", 1..5).prop_map(|parts| {
        parts
            .into_iter()
            .map(|p| if p == "." || p == ".." { "dot".to_string() } else { p })
            .collect::<Vec<_>>()
            .join("/")
    })
}

proptest! {
    #[test]
    fn test_hash_is_deterministic(path in relative_path()) {
        // Test invariant: identity depends only on the relative path
        let a = ConfigFileEntry::from_parts(path.clone(), 0o644, false).unwrap();
        let b = ConfigFileEntry::from_parts(path, 0o600, true).unwrap();

        prop_assert_eq!(a.hash(), b.hash());
        prop_assert_eq!(a.hash().len(), 32);
        prop_assert!(a.hash().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        prop_assert_eq!(a.hash_short().len(), HASH_SHORT_LEN);
        prop_assert!(a.hash().starts_with(&a.hash_short()));
    }

    #[test]
    fn test_lexical_clean_is_idempotent(parts in prop::collection::vec(
        prop_oneof![Just(".".to_string()), Just("..".to_string()), "[a-z]{1,6}"],
        0..8
    )) {
        let path = PathBuf::from("/").join(parts.join("/"));
        let once = lexical_clean(&path);

        prop_assert_eq!(lexical_clean(&once), once.clone());
        prop_assert!(once.is_absolute());
        prop_assert!(once
            .components()
            .all(|c| matches!(c, Component::RootDir | Component::Normal(_))));
    }

    #[test]
    fn test_escaping_paths_are_rejected(depth in 1usize..4, tail in "[a-z]{1,8}") {
        let path = format!("{}{tail}", "../".repeat(depth));
        prop_assert!(ConfigFileEntry::from_parts(path, 0o644, false).is_err());
        prop_assert!(ConfigFileEntry::from_parts(Path::new("/").join(&tail), 0o644, false).is_err());
    }
}
