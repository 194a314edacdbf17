mod common;

use common::spawn_app;
use serde_json::{json, Value};

async fn post_chirp(app: &common::TestApp, token: &str, body: &str) -> reqwest::Response {
    app.client
        .post(&format!("{}/api/chirps", &app.address))
        .bearer_auth(token)
        .json(&json!({ "body": body }))
        .send()
        .await
        .expect("Failed to execute request.")
}

#[tokio::test]
async fn create_chirp_requires_valid_access_token() {
    let app = spawn_app().await;

    let anonymous = app
        .post_json("/api/chirps", &json!({ "body": "hello" }))
        .await;
    assert_eq!(401, anonymous.status().as_u16());

    let forged = post_chirp(&app, "not.a.jwt", "hello").await;
    assert_eq!(401, forged.status().as_u16());

    let chirps: Value = app
        .client
        .get(&format!("{}/api/chirps", &app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(chirps.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_chirp_is_attributed_to_the_token_owner() {
    let app = spawn_app().await;
    let login = app.logged_in_user("saul@bcs.com", "itsallgood").await;

    let response = post_chirp(&app, login["token"].as_str().unwrap(), "What a kerfuffle").await;
    assert_eq!(201, response.status().as_u16());

    let chirp: Value = response.json().await.unwrap();
    assert_eq!(chirp["user_id"], login["id"]);
    assert_eq!(chirp["body"], "What a ****");
}

#[tokio::test]
async fn create_chirp_rejects_long_body() {
    let app = spawn_app().await;
    let login = app.logged_in_user("saul@bcs.com", "itsallgood").await;

    let response = post_chirp(&app, login["token"].as_str().unwrap(), &"a".repeat(141)).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn list_and_get_chirps() {
    let app = spawn_app().await;
    let login = app.logged_in_user("saul@bcs.com", "itsallgood").await;
    let token = login["token"].as_str().unwrap();

    let first: Value = post_chirp(&app, token, "first").await.json().await.unwrap();
    let second: Value = post_chirp(&app, token, "second").await.json().await.unwrap();

    let list: Value = app
        .client
        .get(&format!("{}/api/chirps", &app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], first["id"]);
    assert_eq!(list[1]["id"], second["id"]);

    let fetched = app
        .client
        .get(&format!("{}/api/chirps/{}", &app.address, second["id"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    assert_eq!(200, fetched.status().as_u16());
    let fetched: Value = fetched.json().await.unwrap();
    assert_eq!(fetched["body"], "second");
}

#[tokio::test]
async fn get_chirp_handles_unknown_and_malformed_ids() {
    let app = spawn_app().await;

    let unknown = app
        .client
        .get(&format!("{}/api/chirps/{}", &app.address, uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(404, unknown.status().as_u16());

    let malformed = app
        .client
        .get(&format!("{}/api/chirps/not-a-uuid", &app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(400, malformed.status().as_u16());
}

#[tokio::test]
async fn validate_chirp_cleans_profanity() {
    let app = spawn_app().await;

    let response = app
        .post_json(
            "/api/validate_chirp",
            &json!({ "body": "I had something interesting for breakfast Sharbert fornax!" }),
        )
        .await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["cleaned_body"],
        "I had something interesting for breakfast **** fornax!"
    );
}

#[tokio::test]
async fn validate_chirp_rejects_long_body() {
    let app = spawn_app().await;

    let response = app
        .post_json("/api/validate_chirp", &json!({ "body": "x".repeat(141) }))
        .await;

    assert_eq!(400, response.status().as_u16());
}
