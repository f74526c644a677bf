use crate::e2e::helpers;

use helpers::mocks::pcm_payload;
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sprachgenerator::domain::speech::{SpeakerRole, SynthesisError};
use std::time::Duration;
use test_context::test_context;

const MESSAGE_EMPTY_TEXT: &str = "Bitte geben Sie einen Text ein.";
const MESSAGE_GENERATION_FAILED: &str = "Fehler: Die Sprachgenerierung ist fehlgeschlagen.";

fn single(text: &str) -> Value {
    json!({
        "text": text,
        "voice_id": "f1",
        "accent_id": "de",
        "mode": "single"
    })
}

fn dialogue(text: &str) -> Value {
    json!({
        "text": text,
        "voice_id": "f2",
        "voice_b_id": "m2",
        "accent_id": "at",
        "mode": "dialogue"
    })
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_and_play_single_voice(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/speech/generate", &single("Hallo!"))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["status"], "playing");
    assert!(body["playback_id"].is_string());
    assert_eq!(body["from_cache"], false);

    let requests = ctx.repository.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].speaker_voice_map.len(), 1);
    assert_eq!(requests[0].speaker_voice_map[&SpeakerRole::A], "Kore");
    assert!(requests[0].prompt_text.ends_with("\n\nHallo!"));

    let started = ctx.sink.started();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].samples, vec![0, 100, -100, 0]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_dialogue_with_two_voices(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/speech/generate",
            &dialogue("Sprecher A: Grüß Gott!\nSprecher B: Servus, wie geht's?"),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let request = &ctx.repository.requests()[0];
    assert_eq!(request.speaker_voice_map[&SpeakerRole::A], "Kore");
    assert_eq!(request.speaker_voice_map[&SpeakerRole::B], "Puck");
    assert!(request
        .prompt_text
        .ends_with("Sprecher A: Grüß Gott!\nSprecher B: Servus, wie geht's?"));
    assert!(request.prompt_text.contains("österreichischen"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text_without_calling_backend(ctx: &TestContext) {
    for text in ["", "   \n  "] {
        let response = ctx
            .client
            .post("/api/speech/generate", &single(text))
            .await
            .unwrap();

        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error("validation", MESSAGE_EMPTY_TEXT);
    }

    assert_eq!(ctx.repository.calls(), 0);
    assert!(ctx.sink.started().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_dialogue_without_second_voice(ctx: &TestContext) {
    let mut request = dialogue("Sprecher A: Hallo.\nSprecher B: Hi.");
    request.as_object_mut().unwrap().remove("voice_b_id");

    let response = ctx
        .client
        .post("/api/speech/generate", &request)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error("validation", "Ungültige Eingabe");
    assert_eq!(ctx.repository.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_voice(ctx: &TestContext) {
    let mut request = single("Hallo!");
    request["voice_id"] = json!("x99");

    let response = ctx
        .client
        .post("/api/speech/generate", &request)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error("validation", "x99");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_dialogue_without_speaker_markers(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/speech/generate", &dialogue("Einfach nur ein Satz."))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error("parse", "Ungültiger Dialog");
    assert_eq!(ctx.repository.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_json(ctx: &TestContext) {
    let response = ctx
        .client
        .post_raw("/api/speech/generate", "{not json")
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(ctx.repository.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_quota_exhaustion(ctx: &TestContext) {
    ctx.repository.push_response(
        Duration::ZERO,
        Err(SynthesisError::from_status(429, "Resource has been exhausted")),
    );

    let response = ctx
        .client
        .post("/api/speech/generate", &single("Hallo!"))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::TOO_MANY_REQUESTS)
        .assert_error("quota", MESSAGE_GENERATION_FAILED);
    assert!(ctx.sink.started().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_rejected_credentials_as_bad_gateway(ctx: &TestContext) {
    ctx.repository.push_response(
        Duration::ZERO,
        Err(SynthesisError::from_status(403, "API key not valid")),
    );

    let response = ctx
        .client
        .post("/api/speech/generate", &single("Hallo!"))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error("auth", MESSAGE_GENERATION_FAILED);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_undecodable_audio(ctx: &TestContext) {
    let mut payload = pcm_payload(&[1, 2]);
    payload.raw_bytes.pop();
    ctx.repository.push_response(Duration::ZERO, Ok(payload));

    let response = ctx
        .client
        .post("/api/speech/generate", &single("Hallo!"))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error("decode", MESSAGE_GENERATION_FAILED);
    assert!(ctx.sink.started().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_only_play_the_latest_of_concurrent_generations(ctx: &TestContext) {
    // Whichever request reaches the backend first is the slow one
    ctx.repository
        .push_response(Duration::from_millis(500), Ok(pcm_payload(&[1, 1])));
    ctx.repository
        .push_response(Duration::from_millis(10), Ok(pcm_payload(&[2, 2])));

    let first = single("Erster Text");
    let second = single("Zweiter Text");
    let (a, b) = tokio::join!(
        ctx.client.post("/api/speech/generate", &first),
        ctx.client.post("/api/speech/generate", &second),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    a.assert_status(StatusCode::OK);
    b.assert_status(StatusCode::OK);

    let mut statuses = vec![
        a.body.as_ref().unwrap()["status"].as_str().unwrap().to_string(),
        b.body.as_ref().unwrap()["status"].as_str().unwrap().to_string(),
    ];
    statuses.sort();
    assert_eq!(statuses, vec!["playing", "superseded"]);

    let started = ctx.sink.started();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].samples, vec![2, 2]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stop_previous_playback_on_new_generation(ctx: &TestContext) {
    ctx.client
        .post("/api/speech/generate", &single("Eins"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
    ctx.client
        .post("/api/speech/generate", &single("Zwei"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let handles = ctx.sink.handles();
    assert_eq!(handles.len(), 2);
    assert!(!handles[0].is_active());
    assert!(handles[1].is_active());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_status_while_generating(ctx: &TestContext) {
    ctx.repository
        .push_response(Duration::from_millis(400), Ok(pcm_payload(&[5])));

    let client = ctx.client.clone();
    let generation =
        tokio::spawn(async move { client.post("/api/speech/generate", &single("Hallo!")).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let during = ctx.client.get("/api/speech/status").await.unwrap();
    during.assert_status(StatusCode::OK);
    let body = during.body.as_ref().unwrap();
    assert_eq!(body["generating"], true);
    assert_eq!(body["stage"], "synthesizing");

    generation.await.unwrap().unwrap().assert_status(StatusCode::OK);

    let after = ctx.client.get("/api/speech/status").await.unwrap();
    let body = after.body.as_ref().unwrap();
    assert_eq!(body["generating"], false);
    assert_eq!(body["stage"], "idle");
    assert_eq!(body["playing"], true);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stop_playback(ctx: &TestContext) {
    ctx.client
        .post("/api/speech/generate", &single("Hallo!"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx.client.post_empty("/api/speech/stop").await.unwrap();
    response.assert_status(StatusCode::NO_CONTENT);

    let status = ctx.client.get("/api/speech/status").await.unwrap();
    assert_eq!(status.body.as_ref().unwrap()["playing"], false);
    assert!(!ctx.sink.handles()[0].is_active());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_discard_generation_stopped_in_flight(ctx: &TestContext) {
    ctx.repository
        .push_response(Duration::from_millis(400), Ok(pcm_payload(&[5])));

    let client = ctx.client.clone();
    let generation =
        tokio::spawn(async move { client.post("/api/speech/generate", &single("Hallo!")).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    ctx.client
        .post_empty("/api/speech/stop")
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    let response = generation.await.unwrap().unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body.as_ref().unwrap()["status"], "superseded");
    assert!(ctx.sink.started().is_empty());
}
