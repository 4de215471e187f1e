//! Integration tests for the playback controller.
//!
//! All tests run on paused tokio time, so the 100ms resume delay, the 250ms
//! busy backoff and the 15s watchdog elapse instantly and deterministically.
//! The scripted engine never finishes an utterance by itself; each test ends
//! utterances explicitly (or lets the watchdog do it).

mod common;

use std::sync::Arc;
use std::time::Duration;

use sadak_core::Settings;
use sadak_speech::{
    ChunkOutcome, EngineErrorKind, PlaybackController, PlaybackPhase, SkipReason, SpeechConfig,
    SpeechContext, SpeechEvent, SpeechHandle,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

use common::{
    MemorySettings, ScriptedEngine, drain_ready, next_dispatch, next_event, next_finished,
    settings_service, voice,
};

fn start(
    engine: &Arc<ScriptedEngine>,
    language: &str,
) -> (SpeechHandle, mpsc::UnboundedReceiver<SpeechEvent>) {
    let context = SpeechContext::new(true, language);
    context.unlock_audio();
    PlaybackController::spawn(
        Arc::clone(engine) as Arc<dyn sadak_speech::SpeechEngine>,
        context,
        SpeechConfig::default(),
        None,
    )
}

#[tokio::test(start_paused = true)]
async fn messages_are_spoken_one_after_another() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, mut events) = start(&engine, "en");

    assert_eq!(handle.speak("Hello"), 1);
    assert_eq!(handle.speak("World"), 1);

    let (first, text, locale, voice_used) = next_dispatch(&mut events).await;
    assert_eq!(text, "Hello");
    assert_eq!(locale, "en-US");
    assert_eq!(voice_used, Some(voice("en-US")));
    assert_eq!(engine.spoken_texts(), vec!["Hello"]);
    assert_eq!(handle.phase(), PlaybackPhase::Speaking);

    let ended_at = Instant::now();
    engine.finish(first);

    let (second, text, _, _) = next_dispatch(&mut events).await;
    assert_eq!(text, "World");
    assert_ne!(first, second);
    assert!(ended_at.elapsed() >= Duration::from_millis(100));
    assert_eq!(engine.spoken_texts(), vec!["Hello", "World"]);

    engine.finish(second);
    handle.wait_idle().await.unwrap();
    assert_eq!(engine.spoken_texts(), vec!["Hello", "World"]);
}

#[tokio::test(start_paused = true)]
async fn long_text_is_spoken_chunk_by_chunk_in_order() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, mut events) = start(&engine, "en");
    let text = "Traffic is slow near Kalanki. ".repeat(12);

    let queued = handle.speak(&text);
    assert!(queued > 1);

    let mut spoken = Vec::new();
    for _ in 0..queued {
        let (id, chunk, _, _) = next_dispatch(&mut events).await;
        assert!(chunk.chars().count() <= 150);
        spoken.push(chunk);
        engine.finish(id);
    }
    handle.wait_idle().await.unwrap();

    assert_eq!(engine.spoken_texts(), spoken);
    let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    assert_eq!(strip(&spoken.concat()), strip(&text));
}

#[tokio::test(start_paused = true)]
async fn cancel_discards_queued_chunks() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, mut events) = start(&engine, "en");

    handle.speak("Alpha");
    handle.speak("Bravo");
    handle.speak("Charlie");
    let (alpha, _, _, _) = next_dispatch(&mut events).await;

    handle.cancel();
    handle.speak("Delta");

    assert_eq!(
        next_finished(&mut events).await,
        (alpha, ChunkOutcome::Cancelled)
    );
    let (delta, text, _, _) = next_dispatch(&mut events).await;
    assert_eq!(text, "Delta");
    assert!(engine.cancel_count() >= 1);

    // A late end event for the cancelled utterance must not end Delta.
    engine.finish(alpha);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.phase(), PlaybackPhase::Speaking);

    engine.finish(delta);
    handle.wait_idle().await.unwrap();
    assert_eq!(engine.spoken_texts(), vec!["Alpha", "Delta"]);
}

#[tokio::test(start_paused = true)]
async fn watchdog_recovers_from_a_hung_engine() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, mut events) = start(&engine, "en");

    handle.speak("Hello");
    handle.speak("World");
    let (hello, _, _, _) = next_dispatch(&mut events).await;
    let dispatched_at = Instant::now();

    // Never finish "Hello".
    assert_eq!(
        next_finished(&mut events).await,
        (hello, ChunkOutcome::TimedOut)
    );
    assert!(dispatched_at.elapsed() >= Duration::from_secs(15));
    assert!(engine.cancel_count() >= 1);

    let (world, text, _, _) = next_dispatch(&mut events).await;
    assert_eq!(text, "World");
    assert!(dispatched_at.elapsed() < Duration::from_secs(16));

    engine.finish(world);
    handle.wait_idle().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn residual_engine_speech_defers_dispatch() {
    let engine = ScriptedEngine::with_default_voices();
    engine.set_speaking(true);
    let (handle, mut events) = start(&engine, "en");
    let start_time = Instant::now();

    handle.speak("Hello");
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(engine.spoken_texts().is_empty());
    assert_eq!(handle.phase(), PlaybackPhase::Idle);

    engine.set_speaking(false);
    let (id, text, _, _) = next_dispatch(&mut events).await;
    assert_eq!(text, "Hello");
    assert!(start_time.elapsed() >= Duration::from_millis(250));

    engine.finish(id);
    handle.wait_idle().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn nepali_uses_nepali_voice() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, mut events) = start(&engine, "np");

    handle.speak("नमस्ते");
    let (id, _, locale, voice_used) = next_dispatch(&mut events).await;
    assert_eq!(locale, "ne-NP");
    assert_eq!(voice_used, Some(voice("ne-NP")));
    assert_eq!(engine.last_utterance().unwrap().voice, Some(voice("ne-NP")));

    engine.finish(id);
    handle.wait_idle().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn nepali_without_voice_is_skipped() {
    let engine = ScriptedEngine::new(vec![voice("en-US"), voice("hi-IN")]);
    let (handle, mut events) = start(&engine, "np");

    handle.speak("नमस्ते");
    loop {
        match next_event(&mut events).await {
            SpeechEvent::Skipped { reason, .. } => {
                assert_eq!(
                    reason,
                    SkipReason::VoiceUnavailable {
                        locale: "ne-NP".to_string()
                    }
                );
                break;
            }
            SpeechEvent::Dispatched { .. } => panic!("chunk must not reach the engine"),
            _ => {}
        }
    }

    handle.wait_idle().await.unwrap();
    assert!(engine.spoken_texts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn language_change_applies_to_next_chunk() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, mut events) = start(&engine, "en");

    handle.speak("First");
    handle.speak("Second");
    let (first, _, locale, _) = next_dispatch(&mut events).await;
    assert_eq!(locale, "en-US");

    handle.context().set_language("np");
    engine.finish(first);

    let (second, text, locale, _) = next_dispatch(&mut events).await;
    assert_eq!(text, "Second");
    assert_eq!(locale, "ne-NP");

    engine.finish(second);
    handle.wait_idle().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn permission_error_disables_and_persists_voice_output() {
    let engine = ScriptedEngine::with_default_voices();
    let repo = MemorySettings::with(Settings::with_defaults());
    let context = SpeechContext::new(true, "en");
    context.unlock_audio();
    let (handle, mut events) = PlaybackController::spawn(
        Arc::clone(&engine) as Arc<dyn sadak_speech::SpeechEngine>,
        context,
        SpeechConfig::default(),
        Some(settings_service(&repo)),
    );

    handle.speak("One");
    handle.speak("Two");
    let (one, _, _, _) = next_dispatch(&mut events).await;
    engine.fail(one, EngineErrorKind::NotAllowed);

    assert_eq!(
        next_finished(&mut events).await,
        (one, ChunkOutcome::Failed(EngineErrorKind::NotAllowed))
    );
    handle.wait_idle().await.unwrap();

    assert!(!handle.is_voice_response_enabled());
    assert_eq!(repo.stored().voice_response_enabled, Some(false));
    assert_eq!(engine.spoken_texts(), vec!["One"]);
    assert_eq!(handle.speak("Three"), 0);

    let skipped = drain_ready(&mut events).into_iter().any(|event| {
        matches!(
            event,
            SpeechEvent::Skipped {
                reason: SkipReason::VoiceDisabled,
                ..
            }
        )
    });
    assert!(skipped, "queued chunk should be dropped once voice is off");
}

#[tokio::test(start_paused = true)]
async fn engine_error_resets_engine_and_continues() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, mut events) = start(&engine, "en");

    handle.speak("One");
    handle.speak("Two");
    let (one, _, _, _) = next_dispatch(&mut events).await;
    engine.fail(one, EngineErrorKind::AudioBusy);

    let (two, text, _, _) = next_dispatch(&mut events).await;
    assert_eq!(text, "Two");
    assert_eq!(engine.cancel_count(), 1);
    assert!(handle.is_voice_response_enabled());

    engine.finish(two);
    handle.wait_idle().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn rejected_speak_call_is_recovered() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, mut events) = start(&engine, "en");
    engine.fail_next_speak();

    handle.speak("One");
    handle.speak("Two");

    let (one, _, _, _) = next_dispatch(&mut events).await;
    assert_eq!(
        next_finished(&mut events).await,
        (one, ChunkOutcome::Rejected)
    );
    let (two, text, _, _) = next_dispatch(&mut events).await;
    assert_eq!(text, "Two");

    engine.finish(two);
    handle.wait_idle().await.unwrap();
    assert_eq!(engine.spoken_texts(), vec!["Two"]);
}

#[tokio::test(start_paused = true)]
async fn speech_is_gated_until_first_gesture() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, _events) = PlaybackController::spawn(
        Arc::clone(&engine) as Arc<dyn sadak_speech::SpeechEngine>,
        SpeechContext::new(true, "en"),
        SpeechConfig::default(),
        None,
    );

    assert_eq!(handle.speak("Too early"), 0);

    assert!(handle.unlock_audio());
    assert!(!handle.unlock_audio());
    handle.wait_idle().await.unwrap();

    assert_eq!(engine.prime_count(), 1);
    assert!(engine.spoken_texts().is_empty());
    assert_eq!(handle.speak("Now"), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_waiting_for_voices_drops_the_chunk() {
    let engine = ScriptedEngine::new(Vec::new());
    let (handle, mut events) = start(&engine, "en");

    handle.speak("Hello");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.phase(), PlaybackPhase::Dispatching);

    handle.cancel();
    handle.wait_idle().await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(engine.spoken_texts().is_empty());

    // Voice readiness timed out empty; English is spoken with the default voice.
    handle.speak("World");
    let (id, text, locale, voice_used) = next_dispatch(&mut events).await;
    assert_eq!(text, "World");
    assert_eq!(locale, "en-US");
    assert_eq!(voice_used, None);
    engine.finish(id);
    handle.wait_idle().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn late_voice_list_is_used_once_published() {
    let engine = ScriptedEngine::new(Vec::new());
    let (handle, mut events) = start(&engine, "np");

    handle.speak("नमस्ते");
    tokio::time::sleep(Duration::from_millis(300)).await;
    engine.set_voices(vec![voice("ne-NP")]);

    let (id, _, _, voice_used) = next_dispatch(&mut events).await;
    assert_eq!(voice_used, Some(voice("ne-NP")));
    engine.finish(id);
    handle.wait_idle().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn finished_chunk_watchdog_does_not_fire_during_next_chunk() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, mut events) = start(&engine, "en");

    handle.speak("Hello");
    handle.speak("World");
    let (hello, _, _, _) = next_dispatch(&mut events).await;
    let hello_at = Instant::now();

    tokio::time::sleep(Duration::from_secs(14)).await;
    engine.finish(hello);
    assert_eq!(
        next_finished(&mut events).await,
        (hello, ChunkOutcome::Completed)
    );

    let (world, _, _, _) = next_dispatch(&mut events).await;
    let world_at = Instant::now();
    let cancels = engine.cancel_count();

    // Well past the first chunk's 15s bound.
    tokio::time::sleep_until(hello_at + Duration::from_secs(20)).await;
    assert_eq!(engine.cancel_count(), cancels);
    assert!(
        !drain_ready(&mut events)
            .iter()
            .any(|event| matches!(event, SpeechEvent::Finished { .. })),
        "second chunk must still be speaking"
    );
    assert_eq!(handle.phase(), PlaybackPhase::Speaking);

    // Only its own watchdog ends it.
    assert_eq!(
        next_finished(&mut events).await,
        (world, ChunkOutcome::TimedOut)
    );
    assert!(world_at.elapsed() >= Duration::from_secs(15));
    assert_eq!(engine.cancel_count(), cancels + 1);
    handle.wait_idle().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn phase_watch_follows_playback() {
    let engine = ScriptedEngine::with_default_voices();
    let (handle, mut events) = start(&engine, "en");
    let mut phase = handle.watch_phase();
    assert_eq!(*phase.borrow_and_update(), PlaybackPhase::Idle);

    handle.speak("Hello");
    let (id, _, _, _) = next_dispatch(&mut events).await;
    assert_eq!(*phase.borrow_and_update(), PlaybackPhase::Speaking);

    engine.finish(id);
    phase
        .wait_for(|current| *current == PlaybackPhase::Idle)
        .await
        .unwrap();
    handle.wait_idle().await.unwrap();
}
