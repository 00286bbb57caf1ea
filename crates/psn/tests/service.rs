use psn::PseudonymService;
use psn::domain::config::{DomainSeed, ServiceConfig};
use psn::domain::{DomainAttributes, DomainId};
use psn::hierarchy::{DomainReader, HierarchyError};
use psn::pseudonym::CounterStore;

fn seed(name: &str, prefix: &str, parent: Option<&str>, attributes: DomainAttributes) -> DomainSeed {
    DomainSeed {
        name: name.to_owned(),
        prefix: prefix.to_owned(),
        parent: parent.map(str::to_owned),
        description: None,
        attributes,
    }
}

fn config(data_dir: &std::path::Path) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.storage.data_dir = data_dir.to_path_buf();
    config.domains = vec![
        seed("site", "S-", Some("study"), DomainAttributes::default()),
        seed(
            "study",
            "ST-",
            None,
            DomainAttributes {
                algorithm: Some("CONSECUTIVE".to_owned()),
                pseudonym_length: Some(8),
                consecutive_counter: Some(10),
                ..DomainAttributes::default()
            },
        ),
    ];
    config
}

#[tokio::test]
async fn counters_survive_a_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(&tmp.path().join("data"));

    let service = PseudonymService::init(&config).await.unwrap();
    assert_eq!(service.catalog().len(), 2);
    let first = service.pseudonymizer().issue("site", "p1", "MRN").await.unwrap();
    assert_eq!(first.record.counter, Some(11));
    assert!(first.record.pseudonym.starts_with("S-00000011"));
    drop(service);

    let restarted = PseudonymService::init(&config).await.unwrap();
    let second = restarted.pseudonymizer().issue("site", "p2", "MRN").await.unwrap();
    assert_eq!(second.record.counter, Some(12));
}

#[tokio::test]
async fn recursive_delete_drops_records_and_counters() {
    let tmp = tempfile::tempdir().unwrap();
    let service = PseudonymService::init(&config(tmp.path())).await.unwrap();
    let study = service.catalog().domain_by_name("study").unwrap().id;
    let site = service.catalog().domain_by_name("site").unwrap().id;

    service.pseudonymizer().issue("site", "p1", "MRN").await.unwrap();
    let err = service.delete_domain(study, false).await.unwrap_err();
    assert!(matches!(
        err,
        psn::PsnError::Hierarchy { source: HierarchyError::HasChildren { .. }, .. }
    ));

    let removed = service.delete_domain(study, true).await.unwrap();
    assert_eq!(removed, vec![site, study]);
    assert!(service.catalog().list().is_empty());
    assert!(service.pseudonymizer().records().is_empty());
    assert_eq!(service.pseudonymizer().counters().get(site).await.unwrap(), None);
    assert_eq!(service.pseudonymizer().counters().get(DomainId(99)).await.unwrap(), None);
}

#[tokio::test]
async fn zero_default_length_fails_start_up() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = config(tmp.path());
    config.defaults.pseudonym_length = 0;

    let err = PseudonymService::init(&config).await.unwrap_err();
    assert!(matches!(
        err,
        psn::PsnError::Hierarchy { source: HierarchyError::Validation { .. }, .. }
    ));
}
