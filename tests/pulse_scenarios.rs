//! End-to-end pulse scheduling scenarios.
//!
//! Per-unit failure isolation is a deliberate choice: a failing or
//! panicking unit is recorded in its own outcome and the rest of the run
//! continues.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use pulse_rank::error::{PulseRankError, Result};
use pulse_rank::prelude::*;
use pulse_rank::pulse::{SchedulerPhase, run_pulses};

#[tokio::test]
async fn test_doubling_never_overlaps() -> Result<()> {
    let active = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));

    let report = {
        let active = Arc::clone(&active);
        let overlaps = Arc::clone(&overlaps);
        run_pulses(
            vec![1, 2, 3, 4, 5],
            move |x: i32| {
                let active = Arc::clone(&active);
                let overlaps = Arc::clone(&overlaps);
                async move {
                    if active.fetch_add(1, Ordering::SeqCst) > 0 {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    tokio::task::yield_now().await;
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(x * 2)
                }
            },
            PulseConfig::new(2, 1)?,
        )
        .await?
    };

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(report.stats.peak_active, 1);
    assert_eq!(report.into_results()?, vec![2, 4, 6, 8, 10]);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_output_is_index_aligned_under_contention() -> Result<()> {
    let scheduler = PulseScheduler::new(PulseConfig::new(7, 3)?)?;
    let dataset: Vec<u64> = (0..50).collect();

    let report = scheduler
        .run(dataset.clone(), |x| async move {
            tokio::time::sleep(Duration::from_micros((x * 37) % 500)).await;
            Ok(x * x)
        })
        .await;

    assert_eq!(report.len(), dataset.len());
    assert!(report.stats.peak_active <= 3);
    assert_eq!(report.stats.pulses_completed, 8);
    let expected: Vec<u64> = dataset.iter().map(|x| x * x).collect();
    assert_eq!(report.into_results()?, expected);

    Ok(())
}

#[tokio::test]
async fn test_pulse_waits_for_previous_pulse_to_finish() -> Result<()> {
    let scheduler = PulseScheduler::new(PulseConfig::new(3, 3)?)?;
    // (unit, finished) in the order events happen.
    let events = Arc::new(Mutex::new(Vec::new()));

    let report = {
        let events = Arc::clone(&events);
        scheduler
            .run((0..9usize).collect::<Vec<_>>(), move |x| {
                let events = Arc::clone(&events);
                async move {
                    events.lock().push((x, false));
                    // Earlier units of a pulse sleep longest.
                    tokio::time::sleep(Duration::from_millis((3 - x as u64 % 3) * 2)).await;
                    events.lock().push((x, true));
                    Ok(x)
                }
            })
            .await
    };
    assert!(report.is_complete_success());

    let events = events.lock().clone();
    assert_eq!(events.len(), 18);
    for (at, &(unit, finished)) in events.iter().enumerate() {
        let pulse = unit / 3;
        if finished || pulse == 0 {
            continue;
        }
        let previous_done = events[..at]
            .iter()
            .filter(|&&(u, f)| f && u / 3 == pulse - 1)
            .count();
        assert_eq!(previous_done, 3, "unit {unit} started before pulse {} drained", pulse - 1);
    }
    assert_eq!(scheduler.phase(), SchedulerPhase::Done);

    Ok(())
}

#[tokio::test]
async fn test_failures_do_not_abort_siblings() -> Result<()> {
    let scheduler = PulseScheduler::new(PulseConfig::new(4, 2)?)?;
    let report = scheduler
        .run((0..8).collect::<Vec<i32>>(), |x| async move {
            match x % 4 {
                1 => Err(PulseRankError::malformed(format!("bad item {x}"))),
                3 => panic!("item {x} panicked"),
                _ => Ok(x),
            }
        })
        .await;

    assert_eq!(report.stats.units_succeeded, 4);
    assert_eq!(report.stats.units_failed, 4);
    assert_eq!(scheduler.active_count(), 0);

    let failed: Vec<(usize, bool)> = report
        .failures()
        .iter()
        .map(|f| (f.id, f.panicked))
        .collect();
    assert_eq!(
        failed,
        vec![(1, false), (3, true), (5, false), (7, true)]
    );
    let ok: Vec<i32> = report.successes().map(|(_, v)| *v).collect();
    assert_eq!(ok, vec![0, 2, 4, 6]);

    match report.into_results() {
        Err(PulseRankError::UnitFailure { id, .. }) => assert_eq!(id, 1),
        other => panic!("expected unit failure, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_cancel_while_waiting_for_slot() -> Result<()> {
    let scheduler = PulseScheduler::new(PulseConfig::new(10, 1)?)?;
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let report = scheduler
        .run_with_cancel(
            (0..10).collect::<Vec<i32>>(),
            |x| async move {
                tokio::time::sleep(Duration::from_millis(15)).await;
                Ok(x)
            },
            &cancel,
        )
        .await;

    assert!(report.outcomes[0].is_completed());
    assert!(report.outcomes.last().is_some_and(UnitOutcome::is_cancelled));
    assert!(report.stats.units_cancelled > 0);
    assert_eq!(
        report.stats.units_succeeded + report.stats.units_cancelled,
        10
    );

    Ok(())
}

#[tokio::test]
async fn test_runs_on_one_scheduler_are_serialized() -> Result<()> {
    let scheduler = Arc::new(PulseScheduler::new(PulseConfig::new(4, 2)?)?);

    let run = |offset: i32| {
        let scheduler = Arc::clone(&scheduler);
        async move {
            scheduler
                .run((0..8).map(|x| x + offset).collect::<Vec<i32>>(), |x| async move {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    Ok(x)
                })
                .await
        }
    };
    let (a, b) = tokio::join!(run(0), run(100));

    assert!(a.stats.peak_active <= 2);
    assert!(b.stats.peak_active <= 2);
    assert_eq!(a.into_results()?, (0..8).collect::<Vec<_>>());
    assert_eq!(b.into_results()?, (100..108).collect::<Vec<_>>());

    Ok(())
}

#[test]
fn test_blocking_scheduler_matches_async_contract() -> Result<()> {
    let scheduler = BlockingPulseScheduler::new(PulseConfig::new(2, 1)?)?;
    let report = scheduler.run(vec![1, 2, 3, 4, 5], |x| Ok(x * 2));

    assert_eq!(report.stats.peak_active, 1);
    assert_eq!(report.into_results()?, vec![2, 4, 6, 8, 10]);

    Ok(())
}

#[test]
fn test_search_engine_queries_through_blocking_scheduler() -> Result<()> {
    let docs: Vec<Document> = ["Boston", "Boston", "Cambridge", "Salem"]
        .iter()
        .map(|c| Document::builder().add_text("city", *c).build())
        .collect();
    let engine = Bm25Engine::build(&docs, SearchConfig::new(["city"]))?;

    let scheduler = BlockingPulseScheduler::new(PulseConfig::new(2, 2)?)?;
    let queries = vec!["boston", "cambridge", "portland"];
    let hits = scheduler.map(queries, |q| engine.search_hits(q))?;

    assert_eq!(hits[0].len(), 2);
    assert_eq!(hits[1].len(), 1);
    assert_eq!(hits[1][0].doc_index, 2);
    assert!(hits[2].is_empty());

    Ok(())
}
