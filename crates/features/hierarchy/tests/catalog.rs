use chrono::{TimeZone, Utc};
use psn_domain::config::{AttributeDefaults, DomainSeed};
use psn_domain::{AttributeSet, DomainAttributes, DomainId, DomainPatch};
use psn_hierarchy::{DomainCatalog, DomainReader, HierarchyError, NewDomain};

fn tree() -> (DomainCatalog, DomainId, DomainId, DomainId) {
    let catalog = DomainCatalog::new();
    let root = catalog.create(NewDomain::new("root", "R-")).unwrap().id;
    let mid = catalog.create(NewDomain::new("mid", "M-").parent(root)).unwrap().id;
    let leaf = catalog.create(NewDomain::new("leaf", "L-").parent(mid)).unwrap().id;
    (catalog, root, mid, leaf)
}

#[test]
fn create_assigns_ids_and_validates() {
    let (catalog, root, _, _) = tree();
    assert_eq!(catalog.len(), 3);

    let dup = catalog.create(NewDomain::new("mid", "X-").parent(root)).unwrap_err();
    assert!(matches!(dup, HierarchyError::DuplicateName { .. }));

    let orphan = catalog.create(NewDomain::new("orphan", "O-").parent(DomainId(99))).unwrap_err();
    assert!(matches!(orphan, HierarchyError::NotFound { .. }));

    let spaced = catalog.create(NewDomain::new("spaced", "S -")).unwrap_err();
    assert!(matches!(spaced, HierarchyError::Validation { .. }));

    let bad_alphabet = NewDomain::new("alpha", "A-").attributes(DomainAttributes {
        alphabet: Some("ABCA".to_owned()),
        ..DomainAttributes::default()
    });
    assert!(matches!(catalog.create(bad_alphabet), Err(HierarchyError::Validation { .. })));

    let window = NewDomain::new("window", "W-").attributes(DomainAttributes {
        valid_from: Some(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()),
        valid_to: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
        ..DomainAttributes::default()
    });
    let err = catalog.create(window).unwrap_err();
    assert_eq!(err.context_str(), Some("Domain window"));

    let short = NewDomain::new("short", "S-").attributes(DomainAttributes {
        pseudonym_length: Some(1),
        check_digit_counts_toward_length: Some(true),
        ..DomainAttributes::default()
    });
    assert!(catalog.create(short).is_err());
}

#[test]
fn ancestors_children_and_descendants() {
    let (catalog, root, mid, leaf) = tree();

    let ancestors: Vec<DomainId> = catalog.ancestors(leaf).unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ancestors, vec![root, mid]);
    assert_eq!(catalog.children(root).len(), 1);

    let below: Vec<DomainId> = catalog.descendants(root).iter().map(|d| d.id).collect();
    assert_eq!(below, vec![mid, leaf]);
    assert!(matches!(catalog.ancestors(DomainId(42)), Err(HierarchyError::NotFound { .. })));
}

#[test]
fn recursive_update_reports_failing_descendants() {
    let (catalog, root, mid, leaf) = tree();
    let counts =
        DomainAttributes { check_digit_counts_toward_length: Some(true), ..Default::default() };
    catalog.update(leaf, &DomainPatch::set(counts), false).unwrap();

    let patch = DomainPatch::set(DomainAttributes {
        pseudonym_length: Some(1),
        algorithm: Some("MD5".to_owned()),
        ..Default::default()
    });
    let report = catalog.update(root, &patch, true).unwrap();

    assert_eq!(report.updated, vec![root, mid]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, leaf);
    assert!(!report.is_complete());
    assert_eq!(catalog.domain(mid).unwrap().attributes.algorithm.as_deref(), Some("MD5"));
    assert!(catalog.domain(leaf).unwrap().attributes.algorithm.is_none());
}

#[test]
fn effective_validity_window_spans_the_chain() {
    let catalog = DomainCatalog::new();
    let start = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
    let early_end = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let root = catalog
        .create(NewDomain::new("root", "R-").attributes(DomainAttributes {
            valid_from: Some(start),
            ..Default::default()
        }))
        .unwrap()
        .id;

    let child = NewDomain::new("child", "C-").parent(root).attributes(DomainAttributes {
        valid_to: Some(early_end),
        ..Default::default()
    });
    let err = catalog.create(child).unwrap_err();
    assert!(matches!(err, HierarchyError::Validation { .. }));
    assert_eq!(err.context_str(), Some("Domain child"));

    let late_end = Utc.with_ymd_and_hms(2028, 1, 1, 0, 0, 0).unwrap();
    let child = catalog
        .create(NewDomain::new("child", "C-").parent(root).attributes(DomainAttributes {
            valid_to: Some(late_end),
            ..Default::default()
        }))
        .unwrap()
        .id;

    let later_start = Utc.with_ymd_and_hms(2029, 1, 1, 0, 0, 0).unwrap();
    let patch =
        DomainPatch::set(DomainAttributes { valid_from: Some(later_start), ..Default::default() });
    for recursive in [false, true] {
        let err = catalog.update(root, &patch, recursive).unwrap_err();
        assert!(matches!(err, HierarchyError::Validation { .. }));
    }
    assert_eq!(catalog.domain(root).unwrap().attributes.valid_from, Some(start));
    assert!(catalog.domain(child).unwrap().attributes.valid_from.is_none());
}

#[test]
fn defaults_bound_the_validity_window() {
    let defaults = AttributeDefaults {
        valid_to: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
        ..AttributeDefaults::default()
    };
    let catalog = DomainCatalog::with_defaults(defaults).unwrap();
    let late = NewDomain::new("late", "L-").attributes(DomainAttributes {
        valid_from: Some(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()),
        ..Default::default()
    });
    assert!(matches!(catalog.create(late), Err(HierarchyError::Validation { .. })));
}

#[test]
fn invalid_defaults_are_rejected() {
    let zero = AttributeDefaults { pseudonym_length: 0, ..AttributeDefaults::default() };
    let err = DomainCatalog::with_defaults(zero).unwrap_err();
    assert!(matches!(err, HierarchyError::Validation { .. }));
    assert_eq!(err.context_str(), Some("System defaults"));

    let repeated = AttributeDefaults { alphabet: "ABA".to_owned(), ..AttributeDefaults::default() };
    assert!(DomainCatalog::from_seeds(&[], repeated).is_err());

    let empty = AttributeDefaults { alphabet: String::new(), ..AttributeDefaults::default() };
    assert!(DomainCatalog::with_defaults(empty).is_err());
}

#[test]
fn update_clears_local_values() {
    let (catalog, root, _, _) = tree();
    let set =
        DomainPatch::set(DomainAttributes { salt: Some("s".to_owned()), ..Default::default() });
    catalog.update(root, &set, false).unwrap();
    assert!(catalog.domain(root).unwrap().attributes.salt.is_some());

    catalog.update(root, &DomainPatch::clear(AttributeSet::SALT), false).unwrap();
    assert!(catalog.domain(root).unwrap().attributes.salt.is_none());
}

#[test]
fn delete_requires_recursion_for_inner_nodes() {
    let (catalog, root, mid, leaf) = tree();

    let err = catalog.delete(mid, false).unwrap_err();
    assert!(matches!(err, HierarchyError::HasChildren { .. }));

    let removed = catalog.delete(mid, true).unwrap();
    assert_eq!(removed, vec![leaf, mid]);
    assert_eq!(catalog.list().len(), 1);
    assert!(catalog.domain(root).is_some());
}

#[test]
fn seeds_load_in_any_order() {
    let seed = |name: &str, parent: Option<&str>| DomainSeed {
        name: name.to_owned(),
        prefix: format!("{}-", name.to_uppercase()),
        parent: parent.map(str::to_owned),
        description: None,
        attributes: DomainAttributes::default(),
    };
    let seeds = [seed("leaf", Some("mid")), seed("mid", Some("root")), seed("root", None)];
    let catalog = DomainCatalog::from_seeds(&seeds, AttributeDefaults::default()).unwrap();

    let leaf = catalog.domain_by_name("leaf").unwrap();
    let names: Vec<String> =
        catalog.ancestors(leaf.id).unwrap().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["root", "mid"]);

    let missing =
        DomainCatalog::from_seeds(&[seed("lost", Some("nowhere"))], AttributeDefaults::default())
            .unwrap_err();
    assert!(matches!(missing, HierarchyError::NotFound { .. }));
}
