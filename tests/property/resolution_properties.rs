use std::collections::HashSet;

use castlist::normalize::normalize;
use castlist::{similarity_ratio, EntityResolver, RawMention, ResolverConfig};
use proptest::prelude::*;

fn mention_name() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => "[A-Z][a-z]{1,7}( [A-Z][a-z]{1,7}){0,2}",
        2 => prop::sample::select(vec![
            "Shin", "Shinei Nouzen", "Lena", "Vladilena Milizé", "Vladilena Milize",
            "REAPER", "Kurena", "Theo",
        ])
        .prop_map(str::to_string),
        1 => prop::sample::select(vec!["idiot", "the Captain", "soldiers", "   ", ""])
            .prop_map(str::to_string),
    ]
}

fn mentions() -> impl Strategy<Value = Vec<RawMention>> {
    prop::collection::vec(mention_name().prop_map(RawMention::new), 0..24)
}

proptest! {
    #[test]
    fn every_surviving_mention_has_exactly_one_owner(input in mentions()) {
        let resolver = EntityResolver::new(ResolverConfig::default()).unwrap();
        let res = resolver.resolve_detailed(&input);
        let dropped: HashSet<usize> = res.dropped.iter().map(|d| d.index).collect();

        for (index, mention) in input.iter().enumerate() {
            let owners = res.characters.iter().filter(|c| c.answers_to(&mention.name)).count();
            if dropped.contains(&index) {
                prop_assert_eq!(owners, 0, "dropped {:?} leaked into output", mention.name);
            } else {
                prop_assert_eq!(owners, 1, "{:?} owned {} times", mention.name, owners);
            }
        }
    }

    #[test]
    fn characters_are_well_formed(input in mentions()) {
        let resolver = EntityResolver::new(ResolverConfig::default()).unwrap();
        let out = resolver.resolve(&input);

        let mut ids = HashSet::new();
        for c in &out {
            prop_assert!(!c.aliases.is_empty());
            prop_assert!(c.aliases.contains(&c.name));
            prop_assert!(c.character_id.as_str().starts_with("char_"));
            prop_assert!(ids.insert(c.character_id.clone()), "duplicate id {}", c.character_id);

            let keys: HashSet<String> = c.aliases.iter().map(|a| normalize(a)).collect();
            prop_assert_eq!(keys.len(), c.aliases.len(), "aliases repeat after normalization");
        }
    }

    #[test]
    fn resolution_is_deterministic(input in mentions()) {
        let resolver = EntityResolver::new(ResolverConfig::default()).unwrap();
        let first = serde_json::to_string(&resolver.resolve(&input)).unwrap();
        let second = serde_json::to_string(&resolver.resolve(&input)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn summary_accounts_for_every_mention(input in mentions()) {
        let resolver = EntityResolver::new(ResolverConfig::default()).unwrap();
        let s = resolver.resolve_detailed(&input).summary;
        prop_assert_eq!(s.input, input.len());
        prop_assert_eq!(s.malformed + s.filtered + s.clustered, s.input);
        prop_assert!(s.characters <= s.clustered);
    }

    #[test]
    fn ratio_is_bounded_and_reflexive(a in ".{0,24}", b in ".{0,24}") {
        let r = similarity_ratio(&a, &b);
        prop_assert!((0.0..=1.0).contains(&r));
        prop_assert!((similarity_ratio(&a, &a) - 1.0).abs() < 1e-12);
    }
}
