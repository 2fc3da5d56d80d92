use crate::classset::ClassSet;
use rustc_hash::FxHashMap;

/// A set of sites sharing one computational pattern at an internal tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatClass {
    /// Dense id, assigned in parse order
    pub id: u32,
    /// Row (internal node) the class was read from
    pub node: u32,
    /// Label within that row
    pub label: u32,
    /// Member sites, ascending
    pub sites: Vec<u32>,
}

/// Sites `[0, num_sites)` and the repeat classes (hyperedges) over them
#[derive(Debug, Clone)]
pub struct Hypergraph {
    num_sites: usize,
    classes: Vec<RepeatClass>,
}

/// The classes incident to a group of sites, plus those sites.
///
/// Equality compares only the class set: two records over the same classes are the same
/// signature no matter which sites they carry.
#[derive(Debug, Clone)]
pub struct Signature {
    pub classes: ClassSet,
    pub sites: Vec<u32>,
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.classes == other.classes
    }
}

impl Eq for Signature {}

impl Hypergraph {
    /// Build from explicit classes. Class ids are reassigned densely in the given order.
    pub fn from_classes(num_sites: usize, classes: Vec<RepeatClass>) -> Self {
        let classes = classes
            .into_iter()
            .enumerate()
            .map(|(id, mut class)| {
                class.id = id as u32;
                class.sites.sort_unstable();
                class.sites.dedup();
                class
            })
            .collect();
        Self { num_sites, classes }
    }

    /// Build from plain member lists, one class per list
    pub fn from_site_lists(num_sites: usize, lists: Vec<Vec<u32>>) -> Self {
        let classes = lists
            .into_iter()
            .enumerate()
            .map(|(i, sites)| RepeatClass {
                id: i as u32,
                node: 0,
                label: i as u32,
                sites,
            })
            .collect();
        Self::from_classes(num_sites, classes)
    }

    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[RepeatClass] {
        &self.classes
    }

    /// Per-site incidence sets, built from the class → sites inverted index
    pub fn site_signatures(&self) -> Vec<ClassSet> {
        let m = self.classes.len();
        let mut signatures = vec![ClassSet::new(m); self.num_sites];
        for class in &self.classes {
            for &site in &class.sites {
                signatures[site as usize].insert(class.id);
            }
        }
        signatures
    }

    /// Distinct site signatures, sites with identical class sets merged.
    /// Ordered by each signature's smallest site.
    pub fn signatures(&self) -> Vec<Signature> {
        let mut index: FxHashMap<ClassSet, usize> = FxHashMap::default();
        let mut signatures: Vec<Signature> = Vec::new();

        for (site, classes) in self.site_signatures().into_iter().enumerate() {
            match index.get(&classes) {
                Some(&i) => signatures[i].sites.push(site as u32),
                None => {
                    index.insert(classes.clone(), signatures.len());
                    signatures.push(Signature {
                        classes,
                        sites: vec![site as u32],
                    });
                }
            }
        }

        signatures
    }

    /// Largest single-site signature size (cm)
    pub fn max_degree(&self) -> usize {
        let mut degree = vec![0usize; self.num_sites];
        for class in &self.classes {
            for &site in &class.sites {
                degree[site as usize] += 1;
            }
        }
        degree.into_iter().max().unwrap_or(0)
    }

    /// Classes incident to any of `sites`
    pub fn classes_of(&self, sites: &[u32], site_signatures: &[ClassSet]) -> ClassSet {
        let mut out = ClassSet::new(self.classes.len());
        for &site in sites {
            out.union_with(&site_signatures[site as usize]);
        }
        out
    }

    /// Repeat class count of a site group: the number of distinct classes it touches
    pub fn rcc(&self, sites: &[u32], site_signatures: &[ClassSet]) -> usize {
        self.classes_of(sites, site_signatures).len()
    }

    /// Number of classes touched by at least one site; no grouping can cost less in total
    pub fn used_classes(&self) -> usize {
        self.classes.iter().filter(|c| !c.sites.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_example() -> Hypergraph {
        Hypergraph::from_site_lists(
            6,
            vec![vec![0, 1, 2], vec![3, 4], vec![1, 5], vec![2, 4, 5]],
        )
    }

    #[test]
    fn test_site_signatures() {
        let hg = worked_example();
        let sigs = hg.site_signatures();
        assert_eq!(sigs[0].to_vec(), vec![0]);
        assert_eq!(sigs[1].to_vec(), vec![0, 2]);
        assert_eq!(sigs[5].to_vec(), vec![2, 3]);
        assert_eq!(hg.max_degree(), 2);
    }

    #[test]
    fn test_identical_signatures_are_merged() {
        let hg = Hypergraph::from_site_lists(4, vec![vec![0, 2], vec![1, 3], vec![0, 1, 2, 3]]);
        let sigs = hg.signatures();
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].sites, vec![0, 2]);
        assert_eq!(sigs[1].sites, vec![1, 3]);
        assert_eq!(sigs[0].classes.to_vec(), vec![0, 2]);
    }

    #[test]
    fn test_signature_equality_ignores_sites() {
        let a = Signature {
            classes: ClassSet::from_ids(4, [1, 2]),
            sites: vec![0],
        };
        let b = Signature {
            classes: ClassSet::from_ids(4, [2, 1]),
            sites: vec![7, 8],
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_rcc() {
        let hg = worked_example();
        let sigs = hg.site_signatures();
        assert_eq!(hg.rcc(&[0], &sigs), 1);
        assert_eq!(hg.rcc(&[1, 5], &sigs), 3);
        assert_eq!(hg.rcc(&[], &sigs), 0);
        assert_eq!(hg.used_classes(), 4);
    }
}
