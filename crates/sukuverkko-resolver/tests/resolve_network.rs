//! End-to-end resolution over a small synthetic source compendium.

use sukuverkko_cache::FamilyCache;
use sukuverkko_core::types::{Couple, Family, Person};
use sukuverkko_core::FamilyId;
use sukuverkko_extract::MockStructuredExtractor;
use sukuverkko_names::NameEquivalence;
use sukuverkko_resolver::{resolve_family_network, ResolverContext};
use sukuverkko_text::SourceText;

const SOURCE: &str = "\
KORPI 3, p. 40\nAntti Korpi, b. 1670\n\n\
KORPI 6, p. 120\nMatti Korpi, b. 1700\n\n\
KORPI 9, p. 150\nLiisa Korpi, b. 1730\n\n\
KORPI 12, p. 180\nAntti Korvela, b. 1728\n";

fn main_family() -> Family {
    let mut couple = Couple {
        husband: Person {
            name: "Matti".to_string(),
            birth_date: Some("1700".to_string()),
            as_child: Some(FamilyId::new("KORPI 3")),
            ..Person::unknown_placeholder()
        },
        wife: Person::unknown_placeholder(),
        marriage_date: None,
        full_marriage_date: None,
        children: vec![],
        children_died_infancy: None,
        couple_notes: vec![],
    };
    couple.children.push(Person {
        name: "Liisa".to_string(),
        birth_date: Some("1730".to_string()),
        spouse: Some("Antti Korvela".to_string()),
        as_parent: Some(FamilyId::new("KORPI 9")),
        ..Person::unknown_placeholder()
    });
    Family {
        family_id: FamilyId::new("KORPI 6"),
        page_references: vec!["120".to_string()],
        couples: vec![couple],
        notes: vec![],
        note_definitions: Default::default(),
    }
}

fn korpi_3_response() -> &'static str {
    r#"{"couples": [{"husband": {"name":"Heikki"}, "wife": {"name":"Maria"},
       "children": [{"name":"Matti","birthDate":"1700"}]}]}"#
}

fn korpi_9_response() -> &'static str {
    r#"{"couples": [{"husband": {"name":"Antti Korvela","birthDate":"1728","asChild":"KORPI 12"},
       "wife": {"name":"Liisa","birthDate":"1730"}}]}"#
}

fn korpi_12_response() -> &'static str {
    r#"{"couples": [{"husband": {"name":"Yrjo Korvela"}, "wife": {"name":"Kaisa"},
       "children": [{"name":"Antti Korvela","birthDate":"1728"}]}]}"#
}

#[tokio::test]
async fn resolves_as_child_as_parent_and_spouse_as_child_in_one_pass() {
    let source = SourceText::from_string(SOURCE.to_string());
    let extractor = MockStructuredExtractor::new()
        .with_response("KORPI 3", korpi_3_response())
        .with_response("KORPI 9", korpi_9_response())
        .with_response("KORPI 12", korpi_12_response());
    let names = NameEquivalence::load_default();
    let dir = tempfile::tempdir().unwrap();
    let cache = FamilyCache::new(dir.path().join("families.json"));

    let ctx = ResolverContext::new(&source, &extractor, &names, &cache);
    let (network, stats) = resolve_family_network(main_family(), &ctx).await;

    let matti = &network.main_family.couples[0].husband;
    let as_child = network.get_as_child_family(matti).expect("matti's as-child family resolved");
    assert_eq!(as_child.family_id, FamilyId::new("KORPI 3"));

    let liisa = &network.main_family.couples[0].children[0];
    let as_parent = network.get_as_parent_family(liisa).expect("liisa's as-parent family resolved");
    assert_eq!(as_parent.family_id, FamilyId::new("KORPI 9"));

    let spouse_as_child = network
        .get_spouse_as_child_family("Antti Korvela")
        .expect("antti korvela's as-child family resolved via spouse pass");
    assert_eq!(spouse_as_child.family_id, FamilyId::new("KORPI 12"));

    assert_eq!(stats.resolved_by_family_id, 3);
    assert_eq!(stats.unresolved, 0);
}

#[tokio::test]
async fn unresolvable_reference_is_recorded_but_does_not_fail_the_call() {
    let source = SourceText::from_string("KORPI 6, p. 120\nMatti Korpi, b. 1700\n".to_string());
    let extractor = MockStructuredExtractor::new();
    let names = NameEquivalence::load_default();
    let dir = tempfile::tempdir().unwrap();
    let cache = FamilyCache::new(dir.path().join("families.json"));

    let mut family = main_family();
    family.couples[0].husband.as_child = Some(FamilyId::new("NONEXISTENT 1"));

    let ctx = ResolverContext::new(&source, &extractor, &names, &cache);
    let (network, stats) = resolve_family_network(family, &ctx).await;

    assert!(stats.unresolved >= 1);
    let matti = &network.main_family.couples[0].husband;
    assert!(network.get_as_child_family(matti).is_none());
}
