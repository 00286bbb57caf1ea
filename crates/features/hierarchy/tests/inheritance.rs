use proptest::prelude::*;
use psn_domain::config::AttributeDefaults;
use psn_domain::{Domain, DomainAttributes, DomainId};
use psn_hierarchy::{DomainConfigResolver, DomainReader, EffectiveConfig, ValueSource};

fn attributes() -> impl Strategy<Value = DomainAttributes> {
    (
        proptest::option::of(prop::sample::select(vec!["MD5", "SHA1", "XXHASH", "RANDOM"])),
        proptest::option::of(1_usize..64),
        proptest::option::of(any::<bool>()),
        proptest::option::of("[a-z]{0,8}"),
        proptest::option::of(0_i64..1000),
    )
        .prop_map(|(algorithm, length, padding, salt, counter)| DomainAttributes {
            algorithm: algorithm.map(str::to_owned),
            pseudonym_length: length,
            padding_enabled: padding,
            salt,
            consecutive_counter: counter,
            ..DomainAttributes::default()
        })
}

fn tree(attrs: Vec<DomainAttributes>) -> Vec<Domain> {
    attrs
        .into_iter()
        .enumerate()
        .map(|(i, a)| {
            let id = i as u64 + 1;
            let domain = if id == 1 {
                Domain::root(id, format!("d{id}"), format!("D{id}-"))
            } else {
                Domain::child(id, format!("d{id}"), format!("D{id}-"), id - 1)
            };
            domain.with_attributes(a)
        })
        .collect()
}

fn same_values(a: &EffectiveConfig, b: &EffectiveConfig) -> bool {
    a.algorithm.value == b.algorithm.value
        && a.pseudonym_length.value == b.pseudonym_length.value
        && a.padding_enabled.value == b.padding_enabled.value
        && a.salt.value == b.salt.value
        && a.consecutive_counter.value == b.consecutive_counter.value
        && a.alphabet.value == b.alphabet.value
}

proptest! {
    #[test]
    fn child_without_local_values_equals_parent(chain in prop::collection::vec(attributes(), 1..6)) {
        let mut domains = tree(chain);
        let parent_id = DomainId(domains.len() as u64);
        let child_id = DomainId(parent_id.0 + 1);
        domains.push(Domain::child(child_id, "child", "C-", parent_id));

        let resolver = DomainConfigResolver::default();
        let child = resolver.resolve(&domains, child_id).unwrap();
        let parent = resolver.resolve(&domains, parent_id).unwrap();

        prop_assert!(same_values(&child, &parent));
        prop_assert!(child.algorithm.inherited());
        prop_assert!(child.salt.inherited());
        prop_assert!(child.pseudonym_length.inherited());
    }

    #[test]
    fn local_values_win_regardless_of_ancestors(
        chain in prop::collection::vec(attributes(), 1..6),
        length in 1_usize..64,
        salt in "[A-Z]{1,6}",
    ) {
        let mut domains = tree(chain);
        let parent_id = DomainId(domains.len() as u64);
        let child_id = DomainId(parent_id.0 + 1);
        domains.push(Domain::child(child_id, "child", "C-", parent_id).with_attributes(
            DomainAttributes {
                pseudonym_length: Some(length),
                salt: Some(salt.clone()),
                ..DomainAttributes::default()
            },
        ));

        let child = DomainConfigResolver::default().resolve(&domains, child_id).unwrap();

        prop_assert_eq!(child.pseudonym_length.value, length);
        prop_assert_eq!(&child.salt.value, &salt);
        prop_assert!(!child.pseudonym_length.inherited());
        prop_assert!(!child.salt.inherited());
    }
}

#[test]
fn unset_attributes_come_from_configured_defaults() {
    let defaults = AttributeDefaults {
        algorithm: "XXHASH".to_owned(),
        pseudonym_length: 12,
        ..AttributeDefaults::default()
    };
    let domains = vec![Domain::root(1, "root", "R-")];
    let cfg = DomainConfigResolver::new(defaults).resolve_by_name(&domains, "root").unwrap();

    assert_eq!(cfg.algorithm.value, "XXHASH");
    assert_eq!(cfg.algorithm.source, ValueSource::Default);
    assert_eq!(cfg.pseudonym_length.value, 12);
    assert!(cfg.add_check_digit.value);
}

#[test]
fn ancestor_change_is_visible_on_next_resolution() {
    let mut domains = vec![
        Domain::root(1, "root", "R-").with_attributes(DomainAttributes {
            algorithm: Some("MD5".to_owned()),
            ..DomainAttributes::default()
        }),
        Domain::child(2, "leaf", "L-", 1),
    ];
    let resolver = DomainConfigResolver::default();
    assert_eq!(resolver.resolve(&domains, DomainId(2)).unwrap().algorithm.value, "MD5");

    domains[0].attributes.algorithm = Some("SHA1".to_owned());
    assert_eq!(resolver.resolve(&domains, DomainId(2)).unwrap().algorithm.value, "SHA1");
    assert!(domains.domain(DomainId(2)).unwrap().attributes.algorithm.is_none());
}
