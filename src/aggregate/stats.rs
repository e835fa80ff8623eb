use serde::Serialize;
use statrs::statistics::{Data, OrderStatistics, Statistics};

/// 描述性统计，对应 count / mean / median / min / max / std
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// 样本标准差 (ddof=1)，少于两个值时为空
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

/// 线性插值分位数；输入需已排序
/// statrs 的 percentile 估计方式不同，这里自己插值
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn describe(values: &[f64]) -> SummaryStats {
    let v = sorted(values);
    let count = v.len();
    if count == 0 {
        return SummaryStats::default();
    }
    // statrs 的 std_dev 即样本标准差 (n-1)
    let std = if count > 1 { Some(v.iter().std_dev()) } else { None };
    let mean = v.iter().mean();
    let min = v.first().copied();
    let max = v.last().copied();
    let mut data = Data::new(v);
    SummaryStats {
        count,
        mean: Some(mean),
        median: Some(data.median()),
        min,
        max,
        std,
    }
}

/// 等宽分箱，最后一个箱包含上界
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let v = sorted(values);
    let (Some(&min), Some(&max)) = (v.first(), v.last()) else {
        return Vec::new();
    };
    let bins = bins.max(1);
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: v.len(),
        }];
    }
    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();
    for x in v {
        let idx = (((x - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantile(values: &[f64], q: f64) -> Option<f64> {
        quantile_sorted(&sorted(values), q)
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile(&v, 0.0), 1.0));
        assert!(close(quantile(&v, 1.0), 4.0));
        assert!(close(quantile(&v, 0.5), 2.5));
        assert!(close(quantile(&v, 0.25), 1.75));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn describe_matches_sample_statistics() {
        let s = describe(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.count, 8);
        assert!(close(s.mean, 5.0));
        assert!(close(s.median, 4.5));
        assert!(close(s.min, 2.0));
        assert!(close(s.max, 9.0));
        assert!(close(s.std, (32.0f64 / 7.0).sqrt()));
    }

    #[test]
    fn describe_empty_and_single() {
        assert_eq!(describe(&[]), SummaryStats::default());
        let one = describe(&[3.0]);
        assert_eq!(one.count, 1);
        assert_eq!(one.std, None);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = histogram(&values, 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins[19].upper, 99.0);
        assert_eq!(bins[0].count, 5);
        assert!(histogram(&[], 20).is_empty());
        assert_eq!(histogram(&[4.0, 4.0], 20).len(), 1);
    }
}
