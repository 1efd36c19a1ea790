use super::models::{Segment, TimeInterval};

/// 將場景變換點轉換為連續、不重疊且滿足最短長度的片段
///
/// 三個步驟：
/// 1. 以變換點切出初始格線 `[0, t1), [t1, t2), ..., [tn, total)`
/// 2. 由左至右合併：目前片段不足 `min_duration` 就吸收下一段
/// 3. 結尾仍過短時併入前一段，最後丟棄仍不足最短長度的片段
///
/// 非空結果必定覆蓋 `[0, total_duration)`；影片本身短於 `min_duration` 時回傳空列表。
#[must_use]
pub fn build_segments(boundaries: &[f64], total_duration: f64, min_duration: f64) -> Vec<TimeInterval> {
    if !total_duration.is_finite() || total_duration <= 0.0 {
        return Vec::new();
    }

    let grid = build_grid(boundaries, total_duration);
    let merged = merge_short_forward(&grid, min_duration);

    absorb_short_tail(merged, min_duration)
        .into_iter()
        .filter(|interval| interval.duration() >= min_duration)
        .collect()
}

/// 依順序編號（從 1 開始）
#[must_use]
pub fn number_segments(intervals: Vec<TimeInterval>) -> Vec<Segment> {
    intervals
        .into_iter()
        .enumerate()
        .map(|(i, interval)| Segment {
            index: i + 1,
            interval,
        })
        .collect()
}

/// 片段之間的內部切點
#[must_use]
pub fn cut_points(intervals: &[TimeInterval]) -> Vec<f64> {
    intervals.iter().skip(1).map(|interval| interval.start).collect()
}

/// 只有落在 `(0, total)` 內的點才是切點，0 與 total 是隱含的外框
fn build_grid(boundaries: &[f64], total_duration: f64) -> Vec<TimeInterval> {
    let mut cuts: Vec<f64> = boundaries
        .iter()
        .copied()
        .filter(|&t| t.is_finite() && t > 0.0 && t < total_duration)
        .collect();
    cuts.sort_by(f64::total_cmp);
    cuts.push(total_duration);

    // 重複的切點會產生零長度區間，TimeInterval::new 直接濾掉
    cuts.into_iter()
        .scan(0.0, |prev, cut| {
            let start = *prev;
            *prev = cut;
            Some(TimeInterval::new(start, cut))
        })
        .flatten()
        .collect()
}

/// 最後一段不論長短都會輸出，交給 `absorb_short_tail` 處理
fn merge_short_forward(grid: &[TimeInterval], min_duration: f64) -> Vec<TimeInterval> {
    let Some((&first, rest)) = grid.split_first() else {
        return Vec::new();
    };

    let (mut merged, current) =
        rest.iter()
            .fold((Vec::new(), first), |(mut merged, current), next| {
                if current.duration() < min_duration {
                    let extended = TimeInterval {
                        start: current.start,
                        end: next.end,
                    };
                    (merged, extended)
                } else {
                    merged.push(current);
                    (merged, *next)
                }
            });

    merged.push(current);
    merged
}

fn absorb_short_tail(mut merged: Vec<TimeInterval>, min_duration: f64) -> Vec<TimeInterval> {
    let tail_is_short = merged
        .last()
        .is_some_and(|last| last.duration() < min_duration);

    if merged.len() >= 2
        && tail_is_short
        && let Some(last) = merged.pop()
        && let Some(previous) = merged.last_mut()
    {
        previous.end = last.end;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(intervals: &[TimeInterval]) -> Vec<(f64, f64)> {
        intervals.iter().map(|i| (i.start, i.end)).collect()
    }

    fn assert_partition(intervals: &[TimeInterval], total: f64) {
        let first = intervals.first().unwrap();
        let last = intervals.last().unwrap();
        assert_eq!(first.start, 0.0);
        assert_eq!(last.end, total);
        for pair in intervals.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].start < pair[1].start);
        }
    }

    /// 固定種子的線性同餘產生器，讓隨機測試可重現
    struct Lcg(u64);

    impl Lcg {
        fn next_f64(&mut self) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    #[test]
    fn test_no_boundaries_single_segment() {
        assert_eq!(spans(&build_segments(&[], 10.0, 5.0)), vec![(0.0, 10.0)]);
    }

    #[test]
    fn test_short_file_yields_nothing() {
        assert!(build_segments(&[], 3.0, 5.0).is_empty());
        assert!(build_segments(&[1.0, 2.0], 3.0, 5.0).is_empty());
    }

    #[test]
    fn test_worked_example() {
        let result = build_segments(&[2.0, 4.0, 9.0], 10.0, 3.0);
        assert_eq!(spans(&result), vec![(0.0, 4.0), (4.0, 10.0)]);
    }

    #[test]
    fn test_non_positive_duration() {
        assert!(build_segments(&[1.0], 0.0, 1.0).is_empty());
        assert!(build_segments(&[1.0], -5.0, 1.0).is_empty());
        assert!(build_segments(&[1.0], f64::NAN, 1.0).is_empty());
    }

    #[test]
    fn test_outer_boundaries_are_not_cuts() {
        let result = build_segments(&[0.0, 10.0, 12.0, -1.0], 10.0, 5.0);
        assert_eq!(spans(&result), vec![(0.0, 10.0)]);
    }

    #[test]
    fn test_unsorted_and_duplicate_boundaries() {
        let result = build_segments(&[20.0, 10.0, 10.0, 20.0], 30.0, 5.0);
        assert_eq!(spans(&result), vec![(0.0, 10.0), (10.0, 20.0), (20.0, 30.0)]);
    }

    #[test]
    fn test_long_segments_untouched() {
        let result = build_segments(&[6.0, 12.0], 18.0, 5.0);
        assert_eq!(spans(&result), vec![(0.0, 6.0), (6.0, 12.0), (12.0, 18.0)]);
    }

    #[test]
    fn test_short_leading_segments_merge_forward() {
        let result = build_segments(&[1.0, 2.0, 3.0, 10.0], 20.0, 5.0);
        assert_eq!(spans(&result), vec![(0.0, 10.0), (10.0, 20.0)]);
    }

    #[test]
    fn test_short_tail_merges_backward() {
        let result = build_segments(&[8.0, 16.0], 18.0, 5.0);
        assert_eq!(spans(&result), vec![(0.0, 8.0), (8.0, 18.0)]);
    }

    #[test]
    fn test_exact_minimum_is_accepted() {
        let result = build_segments(&[5.0], 10.0, 5.0);
        assert_eq!(spans(&result), vec![(0.0, 5.0), (5.0, 10.0)]);
    }

    #[test]
    fn test_number_segments_is_one_based() {
        let segments = number_segments(build_segments(&[6.0], 12.0, 5.0));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].index, 1);
        assert_eq!(segments[1].index, 2);
        assert_eq!(segments[1].interval.start, 6.0);
    }

    #[test]
    fn test_dense_boundaries_never_violate_minimum() {
        // 每 0.1 秒一個變換點，前段會一路合併直到超過最短長度
        let boundaries: Vec<f64> = (1..1000).map(|i| f64::from(i) * 0.1).collect();
        let result = build_segments(&boundaries, 100.0, 5.0);

        assert!(!result.is_empty());
        assert_partition(&result, 100.0);
        for interval in &result {
            assert!(interval.duration() >= 5.0);
        }
    }

    #[test]
    fn test_random_boundaries_properties() {
        let mut rng = Lcg(0x5eed);

        for _ in 0..500 {
            let total = 1.0 + rng.next_f64() * 120.0;
            let min = 0.5 + rng.next_f64() * 15.0;
            let count = (rng.next_f64() * 40.0) as usize;
            let boundaries: Vec<f64> = (0..count)
                .map(|_| rng.next_f64() * (total + 4.0) - 2.0)
                .collect();

            let result = build_segments(&boundaries, total, min);

            if total < min {
                assert!(result.is_empty(), "total={total} min={min}");
                continue;
            }

            assert_partition(&result, total);
            for interval in &result {
                assert!(interval.duration() >= min, "total={total} min={min}");
            }

            // 以自身的切點重新計算，結果不變
            let again = build_segments(&cut_points(&result), total, min);
            assert_eq!(again, result);
        }
    }
}
