//! Bounded-concurrency chunked batch runner.
//!
//! The work list is processed in fixed-size chunks: operations within a
//! chunk run concurrently (`join_all` over in-flight futures, not threads),
//! chunks run sequentially, and the progress callback fires once per
//! completed chunk with `(completed_so_far, total)`. Result order matches
//! input order; completion order within a chunk is unspecified.

use futures::future::join_all;

/// Run `operation` over `items`, at most `chunk_size` in flight at a time.
pub async fn run_chunked<T, R, F, Fut, P>(
    items: Vec<T>,
    chunk_size: usize,
    mut progress: P,
    operation: F,
) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
    P: FnMut(usize, usize),
{
    let total = items.len();
    let chunk_size = chunk_size.max(1);
    let mut results = Vec::with_capacity(total);
    let mut remaining = items.into_iter();

    loop {
        let chunk: Vec<T> = remaining.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        let outcomes = join_all(chunk.into_iter().map(&operation)).await;
        results.extend(outcomes);
        progress(results.len(), total);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[tokio::test]
    async fn preserves_input_order() {
        let results = run_chunked(vec![1, 2, 3, 4, 5, 6, 7], 3, |_, _| {}, |n| async move {
            n * 10
        })
        .await;
        assert_eq!(results, vec![10, 20, 30, 40, 50, 60, 70]);
    }

    #[tokio::test]
    async fn progress_fires_per_chunk() {
        let ticks = RefCell::new(Vec::new());
        let _ = run_chunked(
            (0..7).collect(),
            5,
            |done, total| ticks.borrow_mut().push((done, total)),
            |n: u32| async move { n },
        )
        .await;
        assert_eq!(*ticks.borrow(), vec![(5, 7), (7, 7)]);
    }

    #[tokio::test]
    async fn empty_input_no_progress() {
        let ticks = RefCell::new(0u32);
        let results = run_chunked(
            Vec::<u32>::new(),
            5,
            |_, _| *ticks.borrow_mut() += 1,
            |n| async move { n },
        )
        .await;
        assert!(results.is_empty());
        assert_eq!(*ticks.borrow(), 0);
    }

    #[tokio::test]
    async fn zero_chunk_size_treated_as_one() {
        let ticks = RefCell::new(Vec::new());
        let _ = run_chunked(
            vec![1, 2],
            0,
            |done, total| ticks.borrow_mut().push((done, total)),
            |n: u32| async move { n },
        )
        .await;
        assert_eq!(*ticks.borrow(), vec![(1, 2), (2, 2)]);
    }
}
