/// Handle to one mesh element, the value that crosses the query/UI
/// boundary. Ordering is lexicographic on (kind, index) so handles can live
/// in sorted sets and maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeshElement {
    /// No selection. Queries that find nothing return this.
    #[default]
    None,
    Face(usize),
    Vertex(usize),
    Edge(usize),
}

impl MeshElement {
    pub fn is_valid(&self) -> bool {
        !matches!(self, MeshElement::None)
    }

    pub fn index(&self) -> Option<usize> {
        match *self {
            MeshElement::None => None,
            MeshElement::Face(idx) | MeshElement::Vertex(idx) | MeshElement::Edge(idx) => Some(idx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn validity() {
        assert!(!MeshElement::None.is_valid());
        assert!(MeshElement::Face(0).is_valid());
        assert_eq!(MeshElement::None.index(), None);
        assert_eq!(MeshElement::Edge(3).index(), Some(3));
    }

    #[test]
    fn lexicographic_ordering() {
        assert!(MeshElement::None < MeshElement::Face(0));
        assert!(MeshElement::Face(9) < MeshElement::Vertex(0));
        assert!(MeshElement::Vertex(1) < MeshElement::Vertex(2));
        assert!(MeshElement::Vertex(usize::MAX) < MeshElement::Edge(0));

        let set = BTreeSet::from([
            MeshElement::Edge(0),
            MeshElement::Face(1),
            MeshElement::Face(0),
            MeshElement::None,
        ]);
        let sorted = set.into_iter().collect::<Vec<_>>();
        assert_eq!(
            sorted,
            vec![
                MeshElement::None,
                MeshElement::Face(0),
                MeshElement::Face(1),
                MeshElement::Edge(0),
            ]
        );
    }
}
