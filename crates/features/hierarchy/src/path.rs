//! Path between two domains of one tree.

use fxhash::{FxHashMap, FxHashSet};
use psn_domain::{Domain, DomainId};

/// Finds the unique path between two domains, addressed by name.
///
/// Indices are built once in [`DomainPathFinder::new`]. The search is a depth-first walk that
/// tries a node's children before its parent and visits each node at most once, so it
/// terminates on a forest and on corrupted, cyclic input alike.
#[derive(Debug)]
pub struct DomainPathFinder<'a> {
    by_id: FxHashMap<DomainId, &'a Domain>,
    by_name: FxHashMap<&'a str, &'a Domain>,
    children: FxHashMap<DomainId, Vec<&'a Domain>>,
}

impl<'a> DomainPathFinder<'a> {
    #[must_use]
    pub fn new(domains: &'a [Domain]) -> Self {
        let mut by_id = FxHashMap::default();
        let mut by_name = FxHashMap::default();
        let mut children: FxHashMap<DomainId, Vec<&'a Domain>> = FxHashMap::default();

        for domain in domains {
            by_id.insert(domain.id, domain);
            by_name.insert(domain.name.as_str(), domain);
            if let Some(parent) = domain.parent_id {
                children.entry(parent).or_default().push(domain);
            }
        }

        Self { by_id, by_name, children }
    }

    /// Domains from `source` to `destination`, both included.
    ///
    /// Returns `None` when a name is unknown or the two domains sit in different trees.
    #[must_use]
    pub fn find_path(&self, source: &str, destination: &str) -> Option<Vec<&'a Domain>> {
        let start = *self.by_name.get(source)?;
        let goal = self.by_name.get(destination)?.id;

        let mut visited = FxHashSet::default();
        visited.insert(start.id);
        // Each frame is a node on the candidate path and the index of its next neighbour.
        let mut stack: Vec<(&'a Domain, usize)> = vec![(start, 0)];

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            if node.id == goal {
                return Some(stack.iter().map(|(d, _)| *d).collect());
            }

            let next = self.neighbour(node, top.1);
            top.1 += 1;
            match next {
                Some(step) => {
                    if visited.insert(step.id) {
                        stack.push((step, 0));
                    }
                },
                None => {
                    stack.pop();
                },
            }
        }

        None
    }

    /// Like [`Self::find_path`] but returns only the ids.
    #[must_use]
    pub fn find_id_path(&self, source: &str, destination: &str) -> Option<Vec<DomainId>> {
        self.find_path(source, destination).map(|path| path.iter().map(|d| d.id).collect())
    }

    // Neighbour `index` of `node`: children first, then the parent, then none.
    fn neighbour(&self, node: &Domain, index: usize) -> Option<&'a Domain> {
        let children = self.children.get(&node.id).map_or(&[][..], Vec::as_slice);
        match index.checked_sub(children.len()) {
            None => Some(children[index]),
            Some(0) => node.parent_id.and_then(|p| self.by_id.get(&p).copied()),
            Some(_) => None,
        }
    }
}
