use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_all_voices(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices").await.unwrap();
    response.assert_status(StatusCode::OK);

    let voices: Vec<Value> = response.json().unwrap();
    assert_eq!(voices.len(), 20);

    let first = &voices[0];
    assert_eq!(first["id"], "f1");
    assert_eq!(first["display_name"], "Lena");
    assert_eq!(first["gender"], "female");
    assert_eq!(first["gender_label"], "Weiblich");
    assert_eq!(first["style_label"], "Klar (A1 Niveau)");
    assert_eq!(first["default"], true);

    let defaults = voices.iter().filter(|v| v["default"] == true).count();
    assert_eq!(defaults, 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_filter_voices_by_gender(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices?gender=male").await.unwrap();
    response.assert_status(StatusCode::OK);

    let voices: Vec<Value> = response.json().unwrap();
    assert_eq!(voices.len(), 10);
    assert!(voices.iter().all(|v| v["gender"] == "male"));
    assert_eq!(voices[0]["id"], "m1");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_gender_filter(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices?gender=robot").await.unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_accents(ctx: &TestContext) {
    let response = ctx.client.get("/api/accents").await.unwrap();
    response.assert_status(StatusCode::OK);

    let accents: Vec<Value> = response.json().unwrap();
    let ids: Vec<&str> = accents.iter().filter_map(|a| a["id"].as_str()).collect();
    assert_eq!(ids, vec!["de", "at", "ch"]);
    assert_eq!(accents[0]["default"], true);
}
