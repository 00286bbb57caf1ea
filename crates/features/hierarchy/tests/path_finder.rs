use psn_domain::{Domain, DomainId};
use psn_hierarchy::DomainPathFinder;

fn chain() -> Vec<Domain> {
    vec![Domain::root(1, "A", "A-"), Domain::child(2, "B", "B-", 1), Domain::child(3, "C", "C-", 2)]
}

fn names(path: Option<Vec<&Domain>>) -> Option<Vec<&str>> {
    path.map(|p| p.into_iter().map(|d| d.name.as_str()).collect())
}

#[test]
fn walks_down_and_up_a_chain() {
    let domains = chain();
    let finder = DomainPathFinder::new(&domains);

    assert_eq!(names(finder.find_path("A", "C")), Some(vec!["A", "B", "C"]));
    assert_eq!(names(finder.find_path("C", "A")), Some(vec!["C", "B", "A"]));
}

#[test]
fn unknown_names_are_not_found() {
    let domains = chain();
    let finder = DomainPathFinder::new(&domains);

    assert!(finder.find_path("A", "Z").is_none());
    assert!(finder.find_path("Z", "A").is_none());
}

#[test]
fn separate_trees_are_not_connected() {
    let mut domains = chain();
    domains.push(Domain::root(10, "X", "X-"));
    domains.push(Domain::child(11, "Y", "Y-", 10));
    let finder = DomainPathFinder::new(&domains);

    assert!(finder.find_path("C", "Y").is_none());
    assert_eq!(finder.find_id_path("Y", "X"), Some(vec![DomainId(11), DomainId(10)]));
}

#[test]
fn sibling_branches_meet_at_common_ancestor() {
    let domains = vec![
        Domain::root(1, "hospital", "H-"),
        Domain::child(2, "cardiology", "CA-", 1),
        Domain::child(3, "oncology", "ON-", 1),
        Domain::child(4, "trial-17", "T17-", 2),
        Domain::child(5, "trial-42", "T42-", 3),
        Domain::child(6, "biobank", "BB-", 3),
    ];
    let finder = DomainPathFinder::new(&domains);

    assert_eq!(
        names(finder.find_path("trial-17", "biobank")),
        Some(vec!["trial-17", "cardiology", "hospital", "oncology", "biobank"])
    );
}

#[test]
fn cyclic_parent_pointers_terminate() {
    let domains = vec![
        Domain::child(1, "A", "A-", 3),
        Domain::child(2, "B", "B-", 1),
        Domain::child(3, "C", "C-", 2),
        Domain::root(4, "lonely", "L-"),
    ];
    let finder = DomainPathFinder::new(&domains);

    assert_eq!(names(finder.find_path("A", "C")), Some(vec!["A", "B", "C"]));
    assert!(finder.find_path("A", "lonely").is_none());
}
