//! Span tree assembly: root detection, depth-first ordering and start time
//! normalization over the spans of every loaded segment.

use crate::core::TraceStackSpan;
use ahash::{AHashMap, AHashSet};

/// Orders `spans` as a forest and rebases start times on the earliest span.
///
/// Roots keep their working-set order; each is followed by its descendants
/// in depth-first pre-order, children in working-set order. A child already
/// on the current path is skipped, and nothing deeper than `max_depth`
/// below a root is emitted. Spans only reachable through a cycle have no
/// root and are dropped.
pub fn assemble(mut spans: Vec<TraceStackSpan>, max_depth: usize) -> Vec<TraceStackSpan> {
    if spans.is_empty() {
        return spans;
    }

    let roots = mark_roots(&mut spans);
    let children = children_index(&spans);

    let mut order = Vec::with_capacity(spans.len());
    for &root in &roots {
        walk(&spans, &children, root, max_depth, &mut order);
    }

    // A span reachable through several parents is emitted under each of them.
    let mut ordered: Vec<TraceStackSpan> = order.into_iter().map(|idx| spans[idx].clone()).collect();
    normalize_start_times(&mut ordered);
    ordered
}

/// Flags every span whose parent key matches no span in the set and
/// returns their indices in order.
pub(crate) fn mark_roots(spans: &mut [TraceStackSpan]) -> Vec<usize> {
    let roots: Vec<usize> = {
        let keys: AHashSet<&str> = spans.iter().map(|s| s.segment_span_id.as_str()).collect();
        spans
            .iter()
            .enumerate()
            .filter(|(_, span)| !keys.contains(span.segment_parent_span_id.as_str()))
            .map(|(idx, _)| idx)
            .collect()
    };

    for &idx in &roots {
        spans[idx].is_root = true;
    }
    roots
}

fn children_index(spans: &[TraceStackSpan]) -> AHashMap<&str, Vec<usize>> {
    let mut children: AHashMap<&str, Vec<usize>> = AHashMap::with_capacity(spans.len());
    for (idx, span) in spans.iter().enumerate() {
        children
            .entry(span.segment_parent_span_id.as_str())
            .or_default()
            .push(idx);
    }
    children
}

/// A span on the current path whose children are being visited.
struct Frame<'a> {
    key: &'a str,
    depth: usize,
    kids: &'a [usize],
    next: usize,
}

/// Depth-first pre-order from `root`, on an explicit stack so arbitrarily
/// deep traces cannot exhaust the thread stack.
fn walk<'a>(
    spans: &'a [TraceStackSpan],
    children: &'a AHashMap<&'a str, Vec<usize>>,
    root: usize,
    max_depth: usize,
    order: &mut Vec<usize>,
) {
    let mut path: AHashSet<&'a str> = AHashSet::new();
    let mut stack: Vec<Frame<'a>> = Vec::new();

    let mut visit = move |idx: usize, depth: usize, path: &mut AHashSet<&'a str>, stack: &mut Vec<Frame<'a>>| {
        order.push(idx);

        let key = spans[idx].segment_span_id.as_str();
        let Some(kids) = children.get(key) else {
            return;
        };
        if depth >= max_depth {
            tracing::warn!(segment_span_id = key, max_depth, "span tree too deep, truncating");
            return;
        }

        path.insert(key);
        stack.push(Frame {
            key,
            depth,
            kids: kids.as_slice(),
            next: 0,
        });
    };

    visit(root, 0, &mut path, &mut stack);

    while let Some(frame) = stack.last_mut() {
        let Some(&child) = frame.kids.get(frame.next) else {
            path.remove(frame.key);
            stack.pop();
            continue;
        };
        frame.next += 1;
        let (parent, depth) = (frame.key, frame.depth);

        let child_key = spans[child].segment_span_id.as_str();
        if path.contains(child_key) {
            tracing::warn!(
                segment_span_id = child_key,
                parent,
                "cyclic segment reference, skipping"
            );
            continue;
        }
        visit(child, depth + 1, &mut path, &mut stack);
    }
}

/// Subtracts the minimum start time from every span.
pub(crate) fn normalize_start_times(spans: &mut [TraceStackSpan]) {
    let Some(min_start_time) = spans.iter().map(|s| s.start_time).min() else {
        return;
    };
    for span in spans.iter_mut() {
        span.start_time = span.start_time.saturating_sub(min_start_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn span(key: &str, parent: &str, start_time: i64) -> TraceStackSpan {
        TraceStackSpan {
            span_id: 0,
            parent_span_id: -1,
            segment_span_id: key.to_string(),
            segment_parent_span_id: parent.to_string(),
            start_time,
            operation_name: String::new(),
            application_code: String::new(),
            cost: 1,
            is_root: false,
        }
    }

    fn keys(spans: &[TraceStackSpan]) -> Vec<&str> {
        spans.iter().map(|s| s.segment_span_id.as_str()).collect()
    }

    #[test]
    fn test_chain_has_single_root() {
        let spans = vec![span("C", "B", 30), span("A", "none", 10), span("B", "A", 20)];

        let ordered = assemble(spans, 16);

        assert_eq!(keys(&ordered), vec!["A", "B", "C"]);
        assert!(ordered[0].is_root);
        assert!(!ordered[1].is_root);
        assert!(!ordered[2].is_root);
    }

    #[test]
    fn test_children_keep_working_set_order() {
        let spans = vec![
            span("root", "-", 0),
            span("b", "root", 5),
            span("a", "root", 1),
            span("b1", "b", 6),
            span("a1", "a", 2),
        ];

        let ordered = assemble(spans, 16);
        assert_eq!(keys(&ordered), vec!["root", "b", "b1", "a", "a1"]);
    }

    #[test]
    fn test_roots_in_discovery_order() {
        let spans = vec![span("y", "gone", 3), span("x", "lost", 4), span("x1", "x", 5)];

        let ordered = assemble(spans, 16);
        assert_eq!(keys(&ordered), vec!["y", "x", "x1"]);
        assert!(ordered[0].is_root && ordered[1].is_root);
    }

    #[test]
    fn test_start_times_rebased_on_minimum() {
        let spans = vec![span("A", "-", 1_000), span("B", "A", 1_250), span("C", "A", 1_100)];

        let ordered = assemble(spans, 16);
        let starts: Vec<i64> = ordered.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![0, 250, 100]);
    }

    #[test]
    fn test_cycle_below_root_terminates() {
        // B and C point at each other; B also has the root as a parent.
        let spans = vec![span("A", "-", 0), span("B", "A", 1), span("C", "B", 2), span("B", "C", 3)];

        let ordered = assemble(spans, 64);
        assert_eq!(keys(&ordered), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_pure_cycle_has_no_root() {
        let spans = vec![span("A", "B", 0), span("B", "A", 1)];
        assert!(assemble(spans, 64).is_empty());
    }

    #[test]
    fn test_depth_limit_truncates() {
        let spans = vec![span("A", "-", 0), span("B", "A", 1), span("C", "B", 2), span("D", "C", 3)];

        let ordered = assemble(spans, 2);
        assert_eq!(keys(&ordered), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_very_deep_chain_does_not_exhaust_stack() {
        let depth: i32 = 200_000;
        let mut spans = vec![span("s0", "-", 0)];
        for i in 1..depth {
            spans.push(span(&format!("s{i}"), &format!("s{}", i - 1), i64::from(i)));
        }

        let ordered = assemble(spans, 1_000_000);

        assert_eq!(ordered.len(), depth as usize);
        assert_eq!(ordered[0].segment_span_id, "s0");
        assert_eq!(ordered[depth as usize - 1].segment_span_id, format!("s{}", depth - 1));
    }

    #[test]
    fn test_siblings_after_deep_branch_keep_order() {
        let spans = vec![
            span("root", "-", 0),
            span("a", "root", 1),
            span("a1", "a", 2),
            span("a2", "a1", 3),
            span("b", "root", 4),
        ];

        let ordered = assemble(spans, 16);
        assert_eq!(keys(&ordered), vec!["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_extreme_start_times_saturate() {
        let spans = vec![span("A", "-", i64::MIN), span("B", "A", i64::MAX)];

        let ordered = assemble(spans, 16);
        let starts: Vec<i64> = ordered.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![0, i64::MAX]);
    }

    #[test]
    fn test_empty_input() {
        assert!(assemble(Vec::new(), 16).is_empty());
        let mut none: Vec<TraceStackSpan> = Vec::new();
        normalize_start_times(&mut none);
    }
}
