//! Integration tests for research runs.
//!
//! All tests run on a paused tokio clock, so the scripted pauses advance
//! virtually and each run completes instantly in wall time.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use tokio::sync::mpsc::UnboundedReceiver;

use research_simulator::config::Config;
use research_simulator::error::{ResearchError, SynthesisError, SynthesisResult};
use research_simulator::research::{
    PhaseScript, ResearchController, ResearchPhase, ResearchReport, ResearchSource,
    ResearchState, ResearchSynthesizer, RunOutcome, ScriptStep, TemplateSynthesizer,
};

fn drain(events: &mut UnboundedReceiver<ResearchState>) -> Vec<ResearchState> {
    let mut out = Vec::new();
    while let Ok(state) = events.try_recv() {
        out.push(state);
    }
    out
}

fn distinct_phases(states: &[ResearchState]) -> Vec<ResearchPhase> {
    let mut phases: Vec<ResearchPhase> = Vec::new();
    for state in states {
        if phases.last() != Some(&state.phase) {
            phases.push(state.phase);
        }
    }
    phases
}

struct FailingSources;

impl ResearchSynthesizer for FailingSources {
    fn discover_sources(
        &self,
        _topic: &str,
        _rng: &mut StdRng,
    ) -> SynthesisResult<Vec<ResearchSource>> {
        Err(SynthesisError::Sources {
            message: "index unavailable".to_string(),
        })
    }

    fn compile_report(
        &self,
        topic: &str,
        sources: &[ResearchSource],
    ) -> SynthesisResult<ResearchReport> {
        TemplateSynthesizer::new().compile_report(topic, sources)
    }
}

struct PanickingReport;

impl ResearchSynthesizer for PanickingReport {
    fn discover_sources(
        &self,
        topic: &str,
        rng: &mut StdRng,
    ) -> SynthesisResult<Vec<ResearchSource>> {
        TemplateSynthesizer::new().discover_sources(topic, rng)
    }

    fn compile_report(
        &self,
        _topic: &str,
        _sources: &[ResearchSource],
    ) -> SynthesisResult<ResearchReport> {
        panic!("report template corrupted")
    }
}

#[tokio::test(start_paused = true)]
async fn test_phases_visited_in_order() {
    for seed in 0..10 {
        let controller = ResearchController::new(&Config::default().with_seed(seed));
        let mut events = controller.take_events();
        let outcome = controller
            .start_research("Distributed Tracing")
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert!(outcome.is_completed());

        let states = drain(&mut events);
        assert_eq!(distinct_phases(&states), ResearchPhase::SEQUENCE);
    }
}

#[tokio::test(start_paused = true)]
async fn test_progress_non_decreasing_and_ends_at_100() {
    let controller = ResearchController::new(&Config::default().with_seed(3));
    let mut events = controller.take_events();
    controller
        .start_research("Edge Computing")
        .unwrap()
        .wait()
        .await
        .unwrap();

    let states = drain(&mut events);
    assert!(states.windows(2).all(|w| w[0].progress <= w[1].progress));
    assert_eq!(states.last().unwrap().progress, 100);
}

#[tokio::test(start_paused = true)]
async fn test_source_count_fixed_after_search() {
    for seed in 0..10 {
        let controller = ResearchController::new(&Config::default().with_seed(seed));
        let mut events = controller.take_events();
        controller
            .start_research("Edge Computing")
            .unwrap()
            .wait()
            .await
            .unwrap();

        let states = drain(&mut events);
        let after_search: Vec<usize> = states
            .iter()
            .skip_while(|s| s.phase != ResearchPhase::Analyzing)
            .map(|s| s.sources.len())
            .collect();
        assert!(!after_search.is_empty());
        let count = after_search[0];
        assert!((8..=12).contains(&count), "count {}", count);
        assert!(after_search.iter().all(|n| *n == count));
    }
}

#[tokio::test(start_paused = true)]
async fn test_report_only_at_completion() {
    let controller = ResearchController::new(&Config::default().with_seed(8));
    let mut events = controller.take_events();
    controller
        .start_research("Edge Computing")
        .unwrap()
        .wait()
        .await
        .unwrap();

    let states = drain(&mut events);
    for state in &states {
        assert_eq!(
            state.report.is_some(),
            state.phase == ResearchPhase::Complete
        );
    }
    assert_eq!(states.iter().filter(|s| s.report.is_some()).count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_graph_databases_scenario() {
    let controller = ResearchController::new(&Config::default().with_seed(2024));
    let outcome = controller
        .start_research("Graph Databases")
        .unwrap()
        .wait()
        .await
        .unwrap();

    let state = outcome.state().unwrap();
    assert!((8..=12).contains(&state.sources.len()));
    assert!(state
        .sources
        .iter()
        .all(|s| s.title.contains("Graph Databases")));

    let report = state.report.as_ref().unwrap();
    assert_eq!(report.title, "Technical Analysis: Graph Databases");
    assert!(report.executive_summary.contains("Graph Databases"));
    assert!(report
        .executive_summary
        .contains(&format!("{} sources", state.sources.len())));
}

#[tokio::test(start_paused = true)]
async fn test_visible_sources_ranked_by_credibility() {
    let controller = ResearchController::new(&Config::default().with_seed(17));
    let outcome = controller
        .start_research("Vector Search")
        .unwrap()
        .wait()
        .await
        .unwrap();

    let sources = &outcome.state().unwrap().sources;
    assert!(sources
        .windows(2)
        .all(|w| w[0].credibility >= w[1].credibility));
}

#[tokio::test(start_paused = true)]
async fn test_new_run_supersedes_in_flight_run() {
    let controller = ResearchController::new(&Config::default().with_seed(1));
    let mut events = controller.take_events();

    let first = controller.start_research("Quantum Computing").unwrap();
    // Mid-way through source discovery.
    tokio::time::sleep(Duration::from_millis(4000)).await;
    assert_eq!(
        controller.current().unwrap().phase,
        ResearchPhase::Searching
    );

    let second = controller.start_research("Graph Databases").unwrap();
    assert!(second.wait().await.unwrap().is_completed());
    assert_eq!(first.wait().await.unwrap(), RunOutcome::Cancelled);

    // Let any leftover timers fire.
    tokio::time::sleep(Duration::from_secs(60)).await;

    let current = controller.current().unwrap();
    assert_eq!(current.topic, "Graph Databases");
    assert_eq!(current.phase, ResearchPhase::Complete);

    let states = drain(&mut events);
    let completed: Vec<_> = states
        .iter()
        .filter(|s| s.phase == ResearchPhase::Complete)
        .collect();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].topic, "Graph Databases");

    let handover = states.iter().position(|s| s.run_id == 2).unwrap();
    assert!(states[handover..].iter().all(|s| s.run_id == 2));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_resubmission_keeps_latest_topic() {
    let controller = ResearchController::new(&Config::default());
    let mut handles = Vec::new();
    for topic in ["A", "B", "C", "D"] {
        handles.push(controller.start_research(topic).unwrap());
    }

    let last = handles.pop().unwrap();
    assert!(last.wait().await.unwrap().is_completed());
    for handle in handles {
        assert_eq!(handle.wait().await.unwrap(), RunOutcome::Cancelled);
    }
    assert_eq!(controller.current().unwrap().topic, "D");
}

#[tokio::test(start_paused = true)]
async fn test_empty_topic_leaves_state_untouched() {
    let controller = ResearchController::new(&Config::default().with_seed(4));
    let handle = controller.start_research("Rust").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let before = controller.current();

    assert!(matches!(
        controller.start_research(""),
        Err(ResearchError::EmptyTopic)
    ));
    assert!(matches!(
        controller.start_research(" \t\n"),
        Err(ResearchError::EmptyTopic)
    ));
    assert_eq!(controller.current(), before);
    assert!(handle.wait().await.unwrap().is_completed());
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_run_stays_idle() {
    let controller = ResearchController::new(&Config::default());
    let handle = controller.start_research("Rust").unwrap();
    tokio::time::sleep(Duration::from_millis(3000)).await;

    controller.reset();
    assert_eq!(handle.wait().await.unwrap(), RunOutcome::Cancelled);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(controller.current().is_none());

    let again = controller.start_research("Go").unwrap();
    assert!(again.wait().await.unwrap().is_completed());
    assert_eq!(controller.current().unwrap().topic, "Go");
}

#[tokio::test(start_paused = true)]
async fn test_watch_subscribers_observe_completion() {
    let controller = ResearchController::new(&Config::default().with_seed(6));
    let mut a = controller.subscribe();
    let mut b = controller.subscribe();
    controller.start_research("Rust").unwrap();

    for rx in [&mut a, &mut b] {
        let state = rx
            .wait_for(|s| s.as_ref().map(|s| s.is_finished()).unwrap_or(false))
            .await
            .unwrap()
            .clone();
        assert_eq!(state.unwrap().phase, ResearchPhase::Complete);
    }
}

#[tokio::test(start_paused = true)]
async fn test_synthesis_failure_ends_in_failed_state() {
    let controller = ResearchController::new(&Config::default())
        .with_synthesizer(Arc::new(FailingSources));
    let mut events = controller.take_events();

    let outcome = controller
        .start_research("Rust")
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Failed(_)));

    let current = controller.current().unwrap();
    assert_eq!(current.phase, ResearchPhase::Failed);
    assert!(current.report.is_none());
    assert!(current.sources.is_empty());
    assert!(current
        .error
        .as_deref()
        .unwrap()
        .contains("index unavailable"));

    let states = drain(&mut events);
    assert_eq!(states.last().unwrap().phase, ResearchPhase::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_synthesizer_panic_ends_in_failed_state() {
    let controller = ResearchController::new(&Config::default().with_seed(5))
        .with_synthesizer(Arc::new(PanickingReport));
    let mut events = controller.take_events();
    let mut watcher = controller.subscribe();

    let outcome = controller
        .start_research("Rust")
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Failed(_)));

    tokio::time::sleep(Duration::from_secs(120)).await;

    let current = controller.current().unwrap();
    assert_eq!(current.phase, ResearchPhase::Failed);
    assert_eq!(current.progress, 90);
    assert!(current.report.is_none());
    assert!((8..=12).contains(&current.sources.len()));
    assert!(current
        .error
        .as_deref()
        .unwrap()
        .contains("report template corrupted"));
    assert!(current.status.starts_with("Research failed: "));

    let finished = watcher
        .wait_for(|s| s.as_ref().map(|s| s.is_finished()).unwrap_or(false))
        .await
        .unwrap()
        .clone();
    assert_eq!(finished.unwrap(), current);

    let states = drain(&mut events);
    assert_eq!(states.last().unwrap(), &current);

    // A crashed run does not block the next one.
    let again = controller.start_research("Go").unwrap().wait().await.unwrap();
    assert_eq!(again.state().unwrap().run_id, 2);
    assert_eq!(controller.current().unwrap().topic, "Go");
    assert_eq!(controller.current().unwrap().phase, ResearchPhase::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_custom_script_is_honoured() {
    let script = PhaseScript::new(vec![
        ScriptStep::DiscoverSources {
            progress_from: 10,
            progress_to: 90,
            pause_per_source: Duration::ZERO,
        },
        ScriptStep::Complete { status: "Done" },
    ]);
    let controller = ResearchController::new(&Config::default().with_seed(12)).with_script(script);
    let outcome = controller
        .start_research("Rust")
        .unwrap()
        .wait()
        .await
        .unwrap();

    let state = outcome.state().unwrap();
    assert_eq!(state.status, "Done");
    assert_eq!(state.progress, 100);
}
