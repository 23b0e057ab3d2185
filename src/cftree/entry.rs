use super::K;

/// A clustering feature: the additive sufficient statistics BIRCH uses to
/// summarize a set of points without retaining them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CFEntry {
    pub n: u64,
    pub linear_sum: [f64; K],
    pub square_sum: [f64; K],
}

impl CFEntry {
    pub fn empty() -> Self {
        CFEntry { n: 0, linear_sum: [0.0; K], square_sum: [0.0; K] }
    }

    pub fn from_point(v: [f64; K]) -> Self {
        let mut square_sum = [0.0; K];
        for i in 0..K {
            square_sum[i] = v[i] * v[i];
        }
        CFEntry { n: 1, linear_sum: v, square_sum }
    }

    /// CF(A ∪ B) — additive merge. `CFEntry::merge` never loses precision
    /// beyond ordinary floating-point summation: `n`, `linear_sum`, and
    /// `square_sum` are each summed componentwise.
    pub fn merge(&self, other: &CFEntry) -> CFEntry {
        let mut linear_sum = [0.0; K];
        let mut square_sum = [0.0; K];
        for i in 0..K {
            linear_sum[i] = self.linear_sum[i] + other.linear_sum[i];
            square_sum[i] = self.square_sum[i] + other.square_sum[i];
        }
        CFEntry { n: self.n + other.n, linear_sum, square_sum }
    }

    pub fn centroid(&self) -> [f64; K] {
        let mut c = [0.0; K];
        if self.n == 0 {
            return c;
        }
        let n = self.n as f64;
        for i in 0..K {
            c[i] = self.linear_sum[i] / n;
        }
        c
    }

    /// The standard BIRCH subcluster radius: the RMS distance of member
    /// points from the centroid, derived purely from the CF's sufficient
    /// statistics.
    pub fn radius(&self) -> f64 {
        if self.n <= 1 {
            return 0.0;
        }
        let n = self.n as f64;
        let mut sum_sq_dev = 0.0;
        for i in 0..K {
            sum_sq_dev += self.square_sum[i] - (self.linear_sum[i] * self.linear_sum[i]) / n;
        }
        (sum_sq_dev / n).max(0.0).sqrt()
    }

    pub fn distance_to(&self, other: &CFEntry) -> f64 {
        euclidean(&self.centroid(), &other.centroid())
    }
}

pub fn euclidean(a: &[f64; K], b: &[f64; K]) -> f64 {
    let mut sum = 0.0;
    for i in 0..K {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum.sqrt()
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn v(x: f64) -> [f64; K] {
        [x, x, x, x, x, x]
    }

    #[test]
    fn additivity_holds_for_merge() {
        let a = CFEntry::from_point(v(1.0)).merge(&CFEntry::from_point(v(2.0)));
        let b = CFEntry::from_point(v(3.0)).merge(&CFEntry::from_point(v(4.0)));
        let merged = a.merge(&b);

        let direct = CFEntry::from_point(v(1.0))
            .merge(&CFEntry::from_point(v(2.0)))
            .merge(&CFEntry::from_point(v(3.0)))
            .merge(&CFEntry::from_point(v(4.0)));

        assert_eq!(merged.n, direct.n);
        assert_eq!(merged.linear_sum, direct.linear_sum);
        assert_eq!(merged.square_sum, direct.square_sum);
        assert_eq!(merged.n, 4);
    }

    #[test]
    fn single_point_has_zero_radius() {
        let e = CFEntry::from_point(v(5.0));
        assert_eq!(e.radius(), 0.0);
    }

    #[test]
    fn radius_grows_with_spread() {
        let tight = CFEntry::from_point(v(0.0)).merge(&CFEntry::from_point(v(0.1)));
        let wide = CFEntry::from_point(v(0.0)).merge(&CFEntry::from_point(v(10.0)));
        assert!(wide.radius() > tight.radius());
    }

    #[test]
    fn centroid_is_mean() {
        let e = CFEntry::from_point(v(0.0)).merge(&CFEntry::from_point(v(10.0)));
        let centroid = e.centroid();
        for i in 0..K {
            assert!(approx_eq!(f64, centroid[i], 5.0));
        }
    }
}
