#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// A feature observed in two views, first view first.
///
/// The features can be points, such as a `Point2` or a keypoint, or image lines.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FeatureMatch<P>(pub P, pub P);

/// A feature observed in three views, in view order.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FeatureTriple<P>(pub P, pub P, pub P);

#[cfg(feature = "alloc")]
impl<P: Clone> FeatureMatch<P> {
    /// Splits a set of matches into one list of features per view.
    pub fn split(matches: &[Self]) -> (Vec<P>, Vec<P>) {
        matches
            .iter()
            .map(|FeatureMatch(a, b)| (a.clone(), b.clone()))
            .unzip()
    }
}

#[cfg(feature = "alloc")]
impl<P: Clone> FeatureTriple<P> {
    /// Splits a set of triples into one list of features per view.
    pub fn split(triples: &[Self]) -> (Vec<P>, Vec<P>, Vec<P>) {
        let mut first = Vec::with_capacity(triples.len());
        let mut second = Vec::with_capacity(triples.len());
        let mut third = Vec::with_capacity(triples.len());
        for FeatureTriple(a, b, c) in triples {
            first.push(a.clone());
            second.push(b.clone());
            third.push(c.clone());
        }
        (first, second, third)
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_view_order() {
        let triples = [FeatureTriple(1, 2, 3), FeatureTriple(4, 5, 6)];
        let (a, b, c) = FeatureTriple::split(&triples);
        assert_eq!(a, [1, 4]);
        assert_eq!(b, [2, 5]);
        assert_eq!(c, [3, 6]);

        let matches = [FeatureMatch('a', 'b'), FeatureMatch('c', 'd')];
        assert_eq!(FeatureMatch::split(&matches), (alloc::vec!['a', 'c'], alloc::vec!['b', 'd']));
    }
}
