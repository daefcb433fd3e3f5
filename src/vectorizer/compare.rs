use indexmap::IndexMap;
use num::Num;

/// Sparse term -> weight vector. Absent terms weigh 0.
pub type SparseVec<N = f64> = IndexMap<String, N>;

pub trait Compare<N>
where
    N: Num + Copy,
{
    /// dot product over shared keys
    /// d(a, b) = Σ(a_i * b_i)
    fn dot(vec: &SparseVec<N>, other: &SparseVec<N>) -> f64;
    /// Euclidean norm
    /// ||a|| = sqrt(Σ(a_i^2))
    fn norm(vec: &SparseVec<N>) -> f64;
    /// cosine similarity
    /// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
    fn cosine_similarity(vec: &SparseVec<N>, other: &SparseVec<N>) -> f64;
    /// Euclidean distance over the union of keys
    /// d(a, b) = sqrt(Σ((a_i - b_i)^2))
    fn euclidean_distance(vec: &SparseVec<N>, other: &SparseVec<N>) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCompare;

impl<N> Compare<N> for DefaultCompare
where
    N: Num + Copy + Into<f64>,
{
    #[inline]
    fn dot(vec: &SparseVec<N>, other: &SparseVec<N>) -> f64 {
        // walk the smaller map
        let (small, large) = if vec.len() <= other.len() { (vec, other) } else { (other, vec) };
        small
            .iter()
            .filter_map(|(term, &a)| large.get(term).map(|&b| Into::<f64>::into(a) * Into::<f64>::into(b)))
            .sum()
    }

    #[inline]
    fn norm(vec: &SparseVec<N>) -> f64 {
        vec.values()
            .map(|&v| {
                let v: f64 = v.into();
                v * v
            })
            .sum::<f64>()
            .sqrt()
    }

    #[inline]
    fn cosine_similarity(vec: &SparseVec<N>, other: &SparseVec<N>) -> f64 {
        if vec.is_empty() || other.is_empty() {
            return 0.0;
        }
        let norm_a = <Self as Compare<N>>::norm(vec);
        let norm_b = <Self as Compare<N>>::norm(other);
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        let cos = <Self as Compare<N>>::dot(vec, other) / (norm_a * norm_b);
        // rounding can push identical vectors a hair past 1
        cos.min(1.0)
    }

    fn euclidean_distance(vec: &SparseVec<N>, other: &SparseVec<N>) -> f64 {
        let mut sum = 0.0;
        for (term, &a) in vec.iter() {
            let b: f64 = other.get(term).map_or(0.0, |&b| b.into());
            let diff = Into::<f64>::into(a) - b;
            sum += diff * diff;
        }
        for (term, &b) in other.iter() {
            if !vec.contains_key(term) {
                let b: f64 = b.into();
                sum += b * b;
            }
        }
        sum.sqrt()
    }
}

/// Cosine similarity of two sparse vectors.
///
/// Returns 0.0 when either side is empty or has zero norm, and exactly 0.0 for
/// disjoint key sets. For non-negative weights the result is within [0, 1].
#[inline]
pub fn cosine_similarity<N>(vec_a: &SparseVec<N>, vec_b: &SparseVec<N>) -> f64
where
    N: Num + Copy + Into<f64>,
{
    <DefaultCompare as Compare<N>>::cosine_similarity(vec_a, vec_b)
}
