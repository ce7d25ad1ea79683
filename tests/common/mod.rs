#![allow(dead_code)]

use gardenglow::prelude::*;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ROSE: &str = "rose@example.com";
pub const BASIL: &str = "basil@example.com";

/// Client pointed at the mock server for both the REST API and accounts
pub fn client_for(server: &MockServer) -> (GardenGlow, UnboundedReceiver<Notice>) {
    let options = ClientOptions::default()
        .with_api_url(&server.uri())
        .with_auth_url(&server.uri())
        .with_auth_api_key("test_api_key");
    let (notifier, notices) = Notifier::channel();
    let client = GardenGlow::new(options).unwrap().with_notifier(notifier);
    (client, notices)
}

pub async fn mount_sign_in(server: &MockServer, email: &str, name: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(body_partial_json(json!({ "email": email })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": format!("uid-{}", name),
            "email": email,
            "displayName": name,
            "idToken": "id-token",
            "refreshToken": "refresh-token",
            "expiresIn": "3600"
        })))
        .mount(server)
        .await;
}

/// Sign `email` in through the mocked identity provider
pub async fn sign_in(client: &GardenGlow, server: &MockServer, email: &str, name: &str) {
    mount_sign_in(server, email, name).await;
    client.session().sign_in(email, "Garden#2024").await.unwrap();
}

pub fn tip_json(id: &str, owner: &str, likes: u64, liked_by: &[&str]) -> Value {
    json!({
        "_id": id,
        "title": format!("Tip {}", id),
        "description": "Water deeply and less often so roots grow down into cooler soil.",
        "category": "Water Management",
        "difficulty": "Easy",
        "image": "https://i.ibb.co/water.png",
        "author": "Rose",
        "email": owner,
        "date": "2025-05-01T10:00:00Z",
        "availability": "Public",
        "likes": likes,
        "likedBy": liked_by,
        "comments": []
    })
}

pub async fn mount_tip(server: &MockServer, tip: Value) {
    let id = tip["_id"].as_str().unwrap().to_string();
    Mock::given(method("GET"))
        .and(path(format!("/tips/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(tip))
        .mount(server)
        .await;
}

pub fn drain(notices: &mut UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut drained = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        drained.push(notice);
    }
    drained
}
