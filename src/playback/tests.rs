use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::catalog::{PreviewEntry, TrackDescriptor, demo_tracks};
use crate::config::PlaybackSettings;
use crate::lookup::{LookupError, LookupHit, PreviewIndex, TrackLookup};

use super::testing::{FakeOutput, Script, ScriptedSink};
use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn resolver(sink: &Arc<ScriptedSink>, lookup: Option<Arc<dyn TrackLookup>>) -> PlaybackResolver {
    PlaybackResolver::new(
        CandidateGenerator::default(),
        SourceProbe::new(ms(200), ms(5)),
        sink.clone(),
        lookup,
    )
}

fn controller(output: &FakeOutput) -> PlayerController<FakeOutput> {
    PlayerController::new(demo_tracks(), output.clone(), SimProfile::default())
}

/// Load `index`, resolve it synchronously and apply the result.
fn load_and_resolve(
    c: &mut PlayerController<FakeOutput>,
    r: &PlaybackResolver,
    index: usize,
    auto_play: bool,
) {
    let job = c.load_track(index, auto_play).unwrap();
    finish(c, r, job);
}

fn finish(c: &mut PlayerController<FakeOutput>, r: &PlaybackResolver, job: ResolveJob) {
    let resolved = r.run(job).expect("load is current");
    assert!(c.apply_resolution(resolved));
}

struct BrokenLookup;

impl TrackLookup for BrokenLookup {
    fn search(&self, _: &str, _: &str) -> Result<Option<LookupHit>, LookupError> {
        Err(LookupError::Unavailable("offline".to_string()))
    }
}

// --- resolver ---

#[test]
fn first_reachable_candidate_costs_exactly_k_plus_one_probes() {
    let track = TrackDescriptor::new("Gul", "Anuv Jain", "./images/gul.jpg")
        .with_source("media/gul-master.flac");
    let candidates: Vec<String> = CandidateGenerator::default().generate(&track, None).collect();
    assert_eq!(candidates.len(), 6);

    for (k, winner) in candidates.iter().enumerate() {
        let sink = Arc::new(ScriptedSink::new().with(winner, Script::Loads(Some(secs(200)))));
        let r = resolver(&sink, None);
        let ticket = LoadGeneration::new().bump();

        let result = r.resolve(&track, &ticket).unwrap();
        assert_eq!(result.mode, PlaybackMode::Real);
        assert_eq!(result.source_uri.as_deref(), Some(winner.as_str()));
        assert_eq!(result.duration_hint, Some(secs(200)));
        assert_eq!(sink.attempts(), candidates[..=k].to_vec());
    }
}

#[test]
fn exhausted_candidates_resolve_to_simulated() {
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let track = demo_tracks().remove(1);
    let ticket = LoadGeneration::new().bump();

    let result = r.resolve(&track, &ticket).unwrap();
    assert_eq!(result, ResolutionResult::simulated());
    let expected: Vec<String> = CandidateGenerator::default().generate(&track, None).collect();
    assert_eq!(sink.attempts(), expected);
}

#[test]
fn timed_out_and_rejected_candidates_are_skipped() {
    let track = TrackDescriptor::new("Gul", "Anuv Jain", "./images/gul.jpg").with_source("a.mp3");
    let sink = Arc::new(
        ScriptedSink::new()
            .with("a.mp3", Script::Hangs)
            .with("./images/gul.mp3", Script::Throws)
            .with("./images/gul.m4a", Script::Loads(None)),
    );
    let r = PlaybackResolver::new(
        CandidateGenerator::default(),
        SourceProbe::new(ms(30), ms(5)),
        sink.clone(),
        None,
    );

    let result = r.resolve(&track, &LoadGeneration::new().bump()).unwrap();
    assert_eq!(result.source_uri.as_deref(), Some("./images/gul.m4a"));
    assert_eq!(sink.attempts().len(), 3);
}

#[test]
fn failing_lookup_only_skips_the_preview_tier() {
    let sink = Arc::new(ScriptedSink::new().with("audio/gul.mp3", Script::Loads(None)));
    let r = resolver(&sink, Some(Arc::new(BrokenLookup)));
    let track = demo_tracks().remove(1);

    let result = r.resolve(&track, &LoadGeneration::new().bump()).unwrap();
    assert_eq!(result.source_uri.as_deref(), Some("audio/gul.mp3"));
    assert_eq!(sink.attempts(), vec!["audio/gul.mp3".to_string()]);
}

#[test]
fn preview_hit_carries_cover_override() {
    let index = PreviewIndex::new(&[PreviewEntry {
        title: "Gul".into(),
        artist: "Anuv Jain".into(),
        preview_url: Some("https://previews.example/gul.m4a".into()),
        album_cover: Some("https://covers.example/gul-600.jpg".into()),
    }]);
    let track = demo_tracks().remove(1);

    let sink = Arc::new(
        ScriptedSink::new().with("https://previews.example/gul.m4a", Script::Loads(Some(secs(30)))),
    );
    let r = resolver(&sink, Some(Arc::new(index)));
    let result = r.resolve(&track, &LoadGeneration::new().bump()).unwrap();
    assert_eq!(result.source_uri.as_deref(), Some("https://previews.example/gul.m4a"));
    assert_eq!(
        result.cover_override.as_deref(),
        Some("https://covers.example/gul-600.jpg")
    );

    // Preview fails; the declared source wins and the artwork still changes.
    let sink = Arc::new(ScriptedSink::new().with("audio/gul.mp3", Script::Loads(None)));
    let index = PreviewIndex::new(&[PreviewEntry {
        title: "Gul".into(),
        artist: "Anuv Jain".into(),
        preview_url: Some("https://previews.example/gul.m4a".into()),
        album_cover: Some("https://covers.example/gul-600.jpg".into()),
    }]);
    let r = resolver(&sink, Some(Arc::new(index)));
    let result = r.resolve(&track, &LoadGeneration::new().bump()).unwrap();
    assert_eq!(result.source_uri.as_deref(), Some("audio/gul.mp3"));
    assert_eq!(
        result.cover_override.as_deref(),
        Some("https://covers.example/gul-600.jpg")
    );

    // A hit without a preview leaves the catalog cover alone.
    let sink = Arc::new(ScriptedSink::new());
    let index = PreviewIndex::new(&[PreviewEntry {
        title: "Gul".into(),
        artist: "Anuv Jain".into(),
        preview_url: None,
        album_cover: Some("https://covers.example/gul-600.jpg".into()),
    }]);
    let r = resolver(&sink, Some(Arc::new(index)));
    let result = r.resolve(&track, &LoadGeneration::new().bump()).unwrap();
    assert_eq!(result.mode, PlaybackMode::Simulated);
    assert_eq!(result.cover_override, None);
}

#[test]
fn superseded_job_is_not_probed() {
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let generation = LoadGeneration::new();
    let ticket = generation.bump();
    generation.bump();

    assert_eq!(r.resolve(&demo_tracks()[0], &ticket), None);
    assert!(sink.attempts().is_empty());
}

// --- probe ---

#[test]
fn probe_times_out_on_a_silent_sink() {
    let sink = ScriptedSink::new().with("slow.mp3", Script::Hangs);
    let probe = SourceProbe::new(ms(40), ms(5));

    let started = Instant::now();
    let outcome = probe.probe("slow.mp3", &sink, &LoadGeneration::new().bump());
    assert_eq!(outcome, ProbeOutcome::TimedOut);
    assert!(started.elapsed() >= ms(40));
}

#[test]
fn probe_is_cancelled_when_its_load_is_superseded() {
    let sink = ScriptedSink::new().with("slow.mp3", Script::Hangs);
    let probe = SourceProbe::new(secs(10), ms(5));
    let generation = LoadGeneration::new();
    let ticket = generation.bump();

    let bumper = generation.clone();
    let handle = thread::spawn(move || {
        thread::sleep(ms(30));
        bumper.bump();
    });

    let started = Instant::now();
    assert_eq!(probe.probe("slow.mp3", &sink, &ticket), ProbeOutcome::Cancelled);
    assert!(started.elapsed() < secs(5));
    handle.join().unwrap();
}

#[test]
fn probe_reports_success_failure_and_rejection() {
    let sink = ScriptedSink::new()
        .with("ok.mp3", Script::Loads(Some(secs(3))))
        .with("late.mp3", Script::After(ms(20), Box::new(Script::Loads(None))))
        .with("bad.mp3", Script::Errors)
        .with("http://x/y.mp3", Script::Throws);
    let probe = SourceProbe::new(ms(500), ms(5));
    let ticket = LoadGeneration::new().bump();

    assert_eq!(
        probe.probe("ok.mp3", &sink, &ticket),
        ProbeOutcome::Success(ProbedSource {
            uri: "ok.mp3".to_string(),
            duration: Some(secs(3)),
        })
    );
    assert!(matches!(
        probe.probe("late.mp3", &sink, &ticket),
        ProbeOutcome::Success(_)
    ));
    assert_eq!(probe.probe("bad.mp3", &sink, &ticket), ProbeOutcome::Failure);
    assert_eq!(probe.probe("http://x/y.mp3", &sink, &ticket), ProbeOutcome::Failure);
}

// --- controller ---

#[test]
fn simulated_duration_follows_track_index() {
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let out = FakeOutput::new();
    let mut c = controller(&out);

    for index in 0..demo_tracks().len() {
        load_and_resolve(&mut c, &r, index, false);
        let state = c.state();
        assert_eq!(state.mode, Some(PlaybackMode::Simulated));
        assert_eq!(state.duration, secs(180 + (index as u64 % 5) * 30));
        assert_eq!(state.current_time, Duration::ZERO);
        assert_eq!(c.phase(), PlayerPhase::PausedSimulated);
    }
    assert!(out.get(|s| s.opened.is_empty()));
}

#[test]
fn track_without_candidates_falls_straight_to_simulated() {
    let mut tracks = demo_tracks();
    tracks[2] = TrackDescriptor::new("Alag Asman", "Anuv Jain", "./images/alagasman.bmp");
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let mut c = PlayerController::new(tracks, FakeOutput::new(), SimProfile::default());

    load_and_resolve(&mut c, &r, 2, true);
    assert!(sink.attempts().is_empty());
    assert_eq!(c.state().mode, Some(PlaybackMode::Simulated));
    assert_eq!(c.state().duration, secs(240));
    assert_eq!(c.phase(), PlayerPhase::PlayingSimulated);
    assert!(c.sim_running());
}

#[test]
fn oversized_simulated_profile_still_plays() {
    let profile = SimProfile {
        base: secs(180),
        step: secs(u64::MAX / 2),
        variants: 5,
    };
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let mut c = PlayerController::new(demo_tracks(), FakeOutput::new(), profile);

    load_and_resolve(&mut c, &r, 3, true);
    assert_eq!(c.phase(), PlayerPhase::PlayingSimulated);
    assert_eq!(c.state().duration, Duration::MAX);

    c.seek(SeekTarget::Percent(100.0));
    assert_eq!(c.state().current_time, Duration::MAX);
    c.tick();
    assert_eq!(c.phase(), PlayerPhase::Loading);
}

#[test]
fn declared_source_plays_for_real() {
    let sink = Arc::new(
        ScriptedSink::new().with("audio/diewithasmile.mp3", Script::Loads(Some(secs(251)))),
    );
    let r = resolver(&sink, None);
    let out = FakeOutput::new();
    let mut c = controller(&out);

    load_and_resolve(&mut c, &r, 0, true);
    assert_eq!(sink.attempts(), vec!["audio/diewithasmile.mp3".to_string()]);
    assert_eq!(c.phase(), PlayerPhase::PlayingReal);
    assert_eq!(c.state().mode, Some(PlaybackMode::Real));
    assert!(c.state().is_playing);
    assert_eq!(c.state().duration, secs(251));
    assert!(out.get(|s| s.playing));
    assert_eq!(out.get(|s| s.opened.clone()), vec!["audio/diewithasmile.mp3".to_string()]);
}

#[test]
fn rejected_autoplay_leaves_transport_paused() {
    let sink = Arc::new(ScriptedSink::new().with("audio/gul.mp3", Script::Loads(None)));
    let r = resolver(&sink, None);
    let out = FakeOutput::refusing_play();
    let mut c = controller(&out);

    load_and_resolve(&mut c, &r, 1, true);
    assert_eq!(c.phase(), PlayerPhase::PausedReal);
    assert_eq!(c.state().mode, Some(PlaybackMode::Real));
    assert!(!c.state().is_playing);

    // The user can retry once the platform allows it.
    out.set(|s| s.refuse_play = false);
    c.toggle_play();
    assert_eq!(c.phase(), PlayerPhase::PlayingReal);
}

#[test]
fn output_that_cannot_open_falls_back_to_simulated() {
    let sink = Arc::new(ScriptedSink::new().with("audio/gul.mp3", Script::Loads(None)));
    let r = resolver(&sink, None);
    let out = FakeOutput::new();
    out.set(|s| s.refuse_open = true);
    let mut c = controller(&out);

    load_and_resolve(&mut c, &r, 1, true);
    assert_eq!(c.phase(), PlayerPhase::PlayingSimulated);
    assert_eq!(c.state().duration, secs(210));
}

#[test]
fn seek_half_way_in_simulated_mode_is_exact() {
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let mut c = controller(&FakeOutput::new());

    for index in 0..5 {
        load_and_resolve(&mut c, &r, index, true);
        c.seek(SeekTarget::Percent(50.0));
        assert_eq!(c.state().current_time, c.state().duration / 2);
    }
}

#[test]
fn real_seek_maps_percent_onto_known_duration() {
    let sink = Arc::new(ScriptedSink::new().with("audio/gul.mp3", Script::Loads(None)));
    let r = resolver(&sink, None);
    let out = FakeOutput::new();
    out.set(|s| s.decoded_duration = Some(secs(200)));
    let mut c = controller(&out);

    load_and_resolve(&mut c, &r, 1, true);
    c.seek(SeekTarget::Percent(50.0));
    c.seek(SeekTarget::Absolute(secs(900)));
    assert_eq!(out.get(|s| s.seeks.clone()), vec![secs(100), secs(200)]);
    assert_eq!(c.state().current_time, secs(200));
}

#[test]
fn unknown_real_duration_grows_with_position() {
    let sink = Arc::new(ScriptedSink::new().with("audio/gul.mp3", Script::Loads(None)));
    let r = resolver(&sink, None);
    let out = FakeOutput::new();
    let mut c = controller(&out);

    load_and_resolve(&mut c, &r, 1, true);
    assert_eq!(c.state().duration, Duration::ZERO);

    out.set(|s| s.position = secs(12));
    assert!(c.poll_media().is_none());
    assert_eq!(c.state().current_time, secs(12));
    assert_eq!(c.state().duration, secs(12));

    // No duration means a percent seek can only go to the start.
    c.seek(SeekTarget::Percent(80.0));
    assert_eq!(out.get(|s| s.seeks.clone()), vec![Duration::ZERO]);
}

#[test]
fn next_and_prev_wrap_around() {
    let mut c = controller(&FakeOutput::new());
    let last = demo_tracks().len() - 1;

    c.load_track(last, false);
    assert_eq!(c.next().unwrap().index, 0);
    assert_eq!(c.state().track_index, 0);
    assert_eq!(c.prev().unwrap().index, last);
    assert_eq!(c.state().track_index, last);
}

#[test]
fn empty_playlist_has_nothing_to_load() {
    let mut c = PlayerController::new(Vec::new(), FakeOutput::new(), SimProfile::default());
    assert!(c.load_track(0, true).is_none());
    assert!(c.next().is_none());
    assert!(c.prev().is_none());
    assert!(c.toggle_play().is_none());
    assert_eq!(c.phase(), PlayerPhase::Idle);
}

#[test]
fn simulated_track_advances_after_its_estimate() {
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let mut c = controller(&FakeOutput::new());

    load_and_resolve(&mut c, &r, 0, true);
    for _ in 0..179 {
        assert!(c.tick().is_none());
    }
    assert_eq!(c.state().current_time, secs(179));

    let job = c.tick().expect("advance to next track");
    assert_eq!(job.index, 1);
    assert_eq!(c.phase(), PlayerPhase::Loading);
    assert_eq!(c.state().track_index, 1);
    assert!(!c.sim_running());
}

#[test]
fn paused_simulated_track_does_not_advance() {
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let mut c = controller(&FakeOutput::new());

    load_and_resolve(&mut c, &r, 0, true);
    c.tick();
    c.toggle_play();
    assert_eq!(c.phase(), PlayerPhase::PausedSimulated);
    for _ in 0..500 {
        assert!(c.tick().is_none());
    }
    assert_eq!(c.state().current_time, secs(1));

    c.toggle_play();
    assert_eq!(c.phase(), PlayerPhase::PlayingSimulated);
    c.tick();
    assert_eq!(c.state().current_time, secs(2));
}

#[test]
fn real_track_end_advances() {
    let sink = Arc::new(ScriptedSink::new().with("audio/gul.mp3", Script::Loads(None)));
    let r = resolver(&sink, None);
    let out = FakeOutput::new();
    let mut c = controller(&out);

    load_and_resolve(&mut c, &r, 1, true);
    out.set(|s| s.finished = true);
    let job = c.poll_media().expect("advance to next track");
    assert_eq!(job.index, 2);
}

#[test]
fn stale_resolution_is_discarded() {
    let sink = Arc::new(ScriptedSink::new().with("audio/jotum.mp3", Script::Loads(None)));
    let r = resolver(&sink, None);
    let out = FakeOutput::new();
    let mut c = controller(&out);

    let first = c.load_track(1, true).unwrap();
    let second = c.load_track(5, true).unwrap();

    // The superseded worker gives up without reporting.
    assert!(r.run(first.clone()).is_none());

    // Even a result that slipped through is ignored.
    let late = Resolved {
        ticket: first.ticket,
        index: first.index,
        result: ResolutionResult::real("audio/gul.mp3", None),
    };
    assert!(!c.apply_resolution(late));
    assert_eq!(c.phase(), PlayerPhase::Loading);

    finish(&mut c, &r, second);
    assert_eq!(c.state().track_index, 5);
    assert_eq!(out.get(|s| s.opened.clone()), vec!["audio/jotum.mp3".to_string()]);
}

#[test]
fn stop_cancels_the_pending_load() {
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let mut c = controller(&FakeOutput::new());

    let job = c.load_track(3, true).unwrap();
    c.stop();
    assert!(r.run(job.clone()).is_none());
    let late = Resolved {
        ticket: job.ticket,
        index: 3,
        result: ResolutionResult::simulated(),
    };
    assert!(!c.apply_resolution(late));
    assert_eq!(c.phase(), PlayerPhase::Idle);
    assert_eq!(c.state().mode, None);
}

#[test]
fn toggle_while_loading_flips_autoplay() {
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let mut c = controller(&FakeOutput::new());

    let job = c.load_track(0, true).unwrap();
    assert!(c.toggle_play().is_none());
    finish(&mut c, &r, job);
    assert_eq!(c.phase(), PlayerPhase::PausedSimulated);
}

#[test]
fn toggle_from_idle_loads_current_track() {
    let mut c = controller(&FakeOutput::new());
    let job = c.toggle_play().expect("idle toggle starts a load");
    assert_eq!(job.index, 0);
    assert!(job.auto_play);
    assert_eq!(c.phase(), PlayerPhase::Loading);
}

#[test]
fn handle_routes_commands() {
    let mut c = controller(&FakeOutput::new());
    let job = c.handle(PlayerCmd::Load { index: 12, auto_play: false }).unwrap();
    assert_eq!(job.index, 2);
    assert!(c.handle(PlayerCmd::Stop).is_none());
    assert_eq!(c.phase(), PlayerPhase::Idle);
}

#[test]
fn snapshot_reflects_now_playing() {
    let sink = Arc::new(ScriptedSink::new());
    let r = resolver(&sink, None);
    let mut c = controller(&FakeOutput::new());

    load_and_resolve(&mut c, &r, 9, true);
    let snap = c.snapshot();
    assert_eq!(snap.now_playing.title, "Perfect");
    assert_eq!(snap.now_playing.cover, "./images/perfect.jpg");
    assert_eq!(snap.phase, PlayerPhase::PlayingSimulated);
    assert_eq!(snap.state.track_index, 9);
}

// --- player thread ---

fn wait_for(player: &Player, pred: impl Fn(&PlayerSnapshot) -> bool) -> PlayerSnapshot {
    let deadline = Instant::now() + secs(3);
    loop {
        let snap = player.snapshot();
        if pred(&snap) || Instant::now() >= deadline {
            return snap;
        }
        thread::sleep(ms(5));
    }
}

fn fast_settings() -> PlaybackSettings {
    PlaybackSettings {
        tick_ms: 5,
        media_poll_ms: 5,
        sim_base_secs: 3,
        sim_step_secs: 0,
        sim_variants: 1,
        ..PlaybackSettings::default()
    }
}

#[test]
fn player_thread_auto_advances_simulated_tracks() {
    let sink = Arc::new(ScriptedSink::new());
    let out = FakeOutput::new();
    let player = Player::spawn(demo_tracks(), resolver(&sink, None), &fast_settings(), move || out)
        .unwrap();

    player.send(PlayerCmd::Load { index: 0, auto_play: true }).unwrap();
    let snap = wait_for(&player, |s| s.state.track_index >= 1);
    assert!(snap.state.track_index >= 1);

    player.quit();
    assert_eq!(player.snapshot().phase, PlayerPhase::Idle);
    assert!(player.send(PlayerCmd::Next).is_err());
}

#[test]
fn player_thread_keeps_only_the_latest_load() {
    let sink = Arc::new(ScriptedSink::new().with(
        "audio/diewithasmile.mp3",
        Script::After(ms(100), Box::new(Script::Loads(None))),
    ));
    let out = FakeOutput::new();
    let handle = out.clone();
    let settings = PlaybackSettings {
        probe_timeout_ms: 1000,
        probe_cancel_poll_ms: 5,
        ..fast_settings()
    };
    let r = PlaybackResolver::new(
        CandidateGenerator::default(),
        SourceProbe::new(ms(settings.probe_timeout_ms), ms(settings.probe_cancel_poll_ms)),
        sink.clone(),
        None,
    );
    let player = Player::spawn(demo_tracks(), r, &settings, move || out).unwrap();

    player.send(PlayerCmd::Load { index: 0, auto_play: true }).unwrap();
    player.send(PlayerCmd::Load { index: 9, auto_play: false }).unwrap();

    let snap = wait_for(&player, |s| s.phase == PlayerPhase::PausedSimulated);
    assert_eq!(snap.state.track_index, 9);

    // Give the abandoned probe time to finish; it must not take over.
    thread::sleep(ms(200));
    let snap = player.snapshot();
    assert_eq!(snap.state.track_index, 9);
    assert_eq!(snap.state.mode, Some(PlaybackMode::Simulated));
    assert!(handle.get(|s| s.opened.is_empty()));
}
