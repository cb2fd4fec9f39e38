use std::collections::HashMap;
use std::path::PathBuf;

use castlist::extraction::parse_mentions;
use castlist::normalize::normalize;
use castlist::{
    CastlistError, ConfigError, DropReason, EntityResolver, MatchReason, NoiseKind, PatternGroup,
    RawMention, ResolvedCharacter, ResolverConfig, Role,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn default_resolver() -> EntityResolver {
    EntityResolver::new(ResolverConfig::default()).unwrap()
}

fn names(list: &[&str]) -> Vec<RawMention> {
    list.iter().map(|n| RawMention::new(*n)).collect()
}

fn alias_lists(characters: &[ResolvedCharacter]) -> Vec<Vec<&str>> {
    characters
        .iter()
        .map(|c| c.aliases.iter().map(String::as_str).collect())
        .collect()
}

#[test]
fn no_merge_needed() {
    let out = default_resolver().resolve(&names(&["Aragorn", "Legolas"]));
    assert_eq!(alias_lists(&out), vec![vec!["Aragorn"], vec!["Legolas"]]);
    assert_eq!(out[0].character_id.as_str(), "char_aragorn");
    assert_eq!(out[1].character_id.as_str(), "char_legolas");
}

#[test]
fn fuzzy_merge_of_diacritic_variant() {
    let resolver = default_resolver();
    assert_eq!(
        resolver
            .matcher()
            .match_reason("Vladilena Milizé", "Vladilena Milize", "", ""),
        Some(MatchReason::Fuzzy)
    );

    let out = resolver.resolve(&names(&["Vladilena Milizé", "Vladilena Milize"]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].aliases, vec!["Vladilena Milizé", "Vladilena Milize"]);
}

#[test]
fn substring_nickname_merges_under_full_name() {
    let out = default_resolver().resolve(&names(&["Lena", "Vladilena Milizé"]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].name, "Vladilena Milizé");
    assert_eq!(out[0].aliases, vec!["Lena", "Vladilena Milizé"]);
}

#[test]
fn title_mention_is_dropped() {
    let res = default_resolver().resolve_detailed(&names(&["the Captain", "Shinei Nouzen"]));
    assert_eq!(res.characters.len(), 1);
    assert_eq!(res.characters[0].name, "Shinei Nouzen");
    assert_eq!(res.characters[0].aliases, vec!["Shinei Nouzen"]);
    assert_eq!(
        res.dropped[0].reason,
        DropReason::NonCharacter(NoiseKind::Title)
    );
}

#[test]
fn blacklisted_name_never_becomes_an_alias() {
    // "idiot" would otherwise link to "Idiota" through the fuzzy rule.
    let out = default_resolver().resolve(&names(&["idiot", "Idiota", "idiot"]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].aliases, vec!["Idiota"]);
    assert!(!out.iter().any(|c| c.answers_to("idiot")));
}

#[test]
fn identical_mentions_are_idempotent() {
    let out = default_resolver().resolve(&names(&["Anju Emma", "Anju Emma"]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].aliases, vec!["Anju Emma"]);
}

#[test]
fn transitive_chain_through_pattern_group() {
    let config = ResolverConfig::default()
        .with_pattern_group(PatternGroup::new("shin", ["shin", "undertaker"]));
    let resolver = EntityResolver::new(config).unwrap();

    // No single rule links Undertaker to Shinei Nouzen directly.
    assert!(!resolver
        .matcher()
        .are_same("Undertaker", "Shinei Nouzen", "", ""));

    let out = resolver.resolve(&names(&["Shin", "Undertaker", "Shinei Nouzen"]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].aliases, vec!["Shin", "Undertaker", "Shinei Nouzen"]);
}

#[test]
fn primary_prefers_full_name_over_callsign() {
    let config = ResolverConfig::default()
        .with_pattern_group(PatternGroup::new("shin", ["reaper", "shin"]));
    let resolver = EntityResolver::new(config).unwrap();

    let out = resolver.resolve(&names(&["REAPER", "Shinei Nouzen", "Shin"]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].name, "Shinei Nouzen");
    assert_ne!(out[0].name, "REAPER");
}

#[test]
fn cross_reference_in_description_links_names() {
    let mentions = vec![
        RawMention::new("Fido").with_description("A Scavenger that follows Spearhead"),
        RawMention::new("the Scavenger").with_description("Picks up the pieces"),
        RawMention::new("Pawn").with_description("Shin's old friend, mentioned as Fido's maker"),
    ];
    let res = default_resolver().resolve_detailed(&mentions);
    assert!(res
        .edges
        .iter()
        .any(|e| e.reason == MatchReason::CrossReference && (e.a, e.b) == (0, 2)));
}

#[test]
fn resolving_twice_is_byte_identical() {
    let payload = std::fs::read_to_string(fixture("eighty_six_mentions.json")).unwrap();
    let mentions = parse_mentions(&payload).unwrap();
    let resolver =
        EntityResolver::new(ResolverConfig::from_path(fixture("eighty_six_config.json")).unwrap())
            .unwrap();

    let first = serde_json::to_string(&resolver.resolve(&mentions)).unwrap();
    let second = serde_json::to_string(&resolver.resolve(&mentions)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn eighty_six_fixture_resolves_to_main_cast() {
    let payload = std::fs::read_to_string(fixture("eighty_six_mentions.json")).unwrap();
    let mentions = parse_mentions(&payload).unwrap();
    assert_eq!(mentions.len(), 14);

    let config = ResolverConfig::from_path(fixture("eighty_six_config.json")).unwrap();
    let res = EntityResolver::new(config).unwrap().resolve_detailed(&mentions);

    let by_id: HashMap<&str, &ResolvedCharacter> = res
        .characters
        .iter()
        .map(|c| (c.character_id.as_str(), c))
        .collect();
    let ids: Vec<&str> = res
        .characters
        .iter()
        .map(|c| c.character_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "char_shinei_nouzen",
            "char_vladilena_milizé",
            "char_raiden_shuga",
            "char_kurena_kukumila",
            "char_theoto_rikka",
        ]
    );

    let shin = by_id["char_shinei_nouzen"];
    assert_eq!(shin.aliases, vec!["Shinei Nouzen", "Undertaker"]);
    assert_eq!(shin.role, Role::Protagonist);
    assert_eq!(
        shin.description,
        "Captain of Spearhead Squadron, callsign Undertaker"
    );

    let lena = by_id["char_vladilena_milizé"];
    assert_eq!(lena.name, "Vladilena Milizé");
    assert_eq!(lena.aliases, vec!["Vladilena Milizé", "Lena", "Handler One"]);

    assert_eq!(by_id["char_kurena_kukumila"].aliases, vec!["Kurena Kukumila", "Kurena"]);
    assert_eq!(by_id["char_kurena_kukumila"].role, Role::Supporting);
    assert_eq!(by_id["char_theoto_rikka"].aliases, vec!["Theoto Rikka", "Theo"]);

    let summary = res.summary;
    assert_eq!(summary.input, 14);
    assert_eq!(summary.malformed, 0);
    assert_eq!(summary.filtered, 4);
    assert_eq!(summary.clustered, 10);
    assert_eq!(summary.characters, 5);
    assert_eq!(summary.names_merged(), 5);

    let dropped: Vec<(&str, DropReason)> = res
        .dropped
        .iter()
        .map(|d| (d.name.as_str(), d.reason))
        .collect();
    assert_eq!(
        dropped,
        vec![
            ("the Captain", DropReason::NonCharacter(NoiseKind::Title)),
            ("Eighty-Six", DropReason::NonCharacter(NoiseKind::Group)),
            ("idiot", DropReason::NonCharacter(NoiseKind::Blacklisted)),
            ("Spearhead Squadron", DropReason::NonCharacter(NoiseKind::Group)),
        ]
    );
}

#[test]
fn fixture_output_is_a_partition_of_surviving_mentions() {
    let payload = std::fs::read_to_string(fixture("eighty_six_mentions.json")).unwrap();
    let mentions = parse_mentions(&payload).unwrap();
    let resolver =
        EntityResolver::new(ResolverConfig::from_path(fixture("eighty_six_config.json")).unwrap())
            .unwrap();
    let res = resolver.resolve_detailed(&mentions);

    let dropped: Vec<usize> = res.dropped.iter().map(|d| d.index).collect();
    for (index, mention) in mentions.iter().enumerate() {
        let owners = res
            .characters
            .iter()
            .filter(|c| c.answers_to(&mention.name))
            .count();
        if dropped.contains(&index) {
            assert_eq!(owners, 0, "{} was dropped but is an alias", mention.name);
        } else {
            assert_eq!(owners, 1, "{} must belong to exactly one character", mention.name);
        }
    }
    assert!(res.characters.iter().all(|c| !c.aliases.is_empty()));
}

#[test]
fn strict_config_changes_merging_filtering_and_ids() {
    let config = ResolverConfig::from_path(fixture("strict_config.json")).unwrap();
    assert!(config.blacklist.title_patterns.is_empty());
    let strict = EntityResolver::new(config).unwrap();

    let mentions = names(&["Katherine", "Katharine", "the Captain", "the narrator"]);

    // Default threshold merges the spelling variants.
    let relaxed = default_resolver().resolve(&mentions);
    assert_eq!(relaxed.len(), 1);

    let out = strict.resolve(&mentions);
    let ids: Vec<&str> = out.iter().map(|c| c.character_id.as_str()).collect();
    assert_eq!(ids, vec!["person_katherine", "person_katharine", "person_the_captain"]);
}

#[test]
fn invalid_pattern_in_config_file_fails_construction() {
    let config = ResolverConfig::from_path(fixture("bad_pattern_config.json")).unwrap();
    let err = EntityResolver::new(config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    assert!(CastlistError::from(err).is_config());
}

#[test]
fn missing_config_file_is_an_io_error() {
    let err = ResolverConfig::from_path(fixture("does_not_exist.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn no_characters_is_a_valid_outcome() {
    let resolver = default_resolver();
    assert!(resolver.resolve(&[]).is_empty());
    assert!(resolver
        .resolve(&names(&["idiot", "the soldiers", "   "]))
        .is_empty());
}

#[test]
fn aliases_keep_display_form() {
    let out = default_resolver().resolve(&names(&["  Kurena   Kukumila ", "kurena kukumila"]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].aliases, vec!["Kurena Kukumila"]);
    assert_eq!(normalize(&out[0].name), "kurena kukumila");
}
