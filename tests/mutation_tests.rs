mod common;

use std::time::Duration;

use common::*;
use gardenglow::browse::ListView;
use gardenglow::detail::DetailView;
use gardenglow::mutation::{CommentOutcome, LikeOutcome, MutationState};
use gardenglow::prelude::*;
use gardenglow::validation::ValidationError;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn loaded_detail(client: &GardenGlow, id: &str) -> gardenglow::detail::TipDetail {
    let detail = client.detail();
    match detail.load(id).await {
        DetailView::Loaded(_) => detail,
        other => panic!("tip {} did not load: {:?}", id, other),
    }
}

#[tokio::test]
async fn test_like_reconciles_to_server_values() {
    let server = MockServer::start().await;
    let (client, mut notices) = client_for(&server);
    sign_in(&client, &server, "a@x.com", "Ash").await;
    mount_tip(&server, tip_json("t1", ROSE, 5, &[])).await;

    Mock::given(method("PATCH"))
        .and(path("/tips/t1/like"))
        .and(body_json(json!({ "userEmail": "a@x.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "likes": 6,
            "likedBy": ["a@x.com"],
            "message": "Tip liked"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = loaded_detail(&client, "t1").await;
    let outcome = client.engine(detail.store()).toggle_like("t1").await.unwrap();

    assert_eq!(outcome, LikeOutcome::Reconciled { likes: 6, liked: true });
    let tip = detail.store().get("t1").await.unwrap();
    assert_eq!(tip.likes, 6);
    assert!(tip.is_liked_by("a@x.com"));
    assert_eq!(tip.likes as usize, tip.liked_by.len());

    let notices = drain(&mut notices);
    assert!(notices.iter().any(|n| n.title == "Liked!"));
}

#[tokio::test]
async fn test_server_decision_wins_over_optimistic_guess() {
    let server = MockServer::start().await;
    let (client, _notices) = client_for(&server);
    sign_in(&client, &server, "a@x.com", "Ash").await;
    mount_tip(&server, tip_json("t1", ROSE, 1, &["b@x.com"])).await;

    // The server treats the request as a no-op and reports someone else's like.
    Mock::given(method("PATCH"))
        .and(path("/tips/t1/like"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "likes": 2,
            "likedBy": ["b@x.com", "c@x.com"]
        })))
        .mount(&server)
        .await;

    let detail = loaded_detail(&client, "t1").await;
    let outcome = client.engine(detail.store()).toggle_like("t1").await.unwrap();

    assert_eq!(outcome, LikeOutcome::Reconciled { likes: 2, liked: false });
    let tip = detail.store().get("t1").await.unwrap();
    assert_eq!(tip.likes, 2);
    assert!(!tip.is_liked_by("a@x.com"));
    assert!(tip.is_liked_by("c@x.com"));
}

#[tokio::test]
async fn test_failed_like_rolls_back_exactly() {
    let server = MockServer::start().await;
    let (client, mut notices) = client_for(&server);
    sign_in(&client, &server, "a@x.com", "Ash").await;
    mount_tip(&server, tip_json("t1", ROSE, 5, &[])).await;

    Mock::given(method("PATCH"))
        .and(path("/tips/t1/like"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Internal Server Error" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let detail = loaded_detail(&client, "t1").await;
    let engine = client.engine(detail.store());
    drain(&mut notices);

    let err = engine.toggle_like("t1").await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let tip = detail.store().get("t1").await.unwrap();
    assert_eq!(tip.likes, 5);
    assert!(tip.liked_by.is_empty());
    assert_eq!(engine.like_state("t1"), MutationState::Idle);

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Error);
    assert_eq!(
        notices[0].text,
        "Failed to update like status. Please try again."
    );
}

#[tokio::test]
async fn test_network_failure_rolls_back_like_http_failure() {
    let server = MockServer::start().await;
    let (client, _notices) = client_for(&server);
    mount_tip(&server, tip_json("t1", ROSE, 3, &["a@x.com", "b@x.com", "c@x.com"])).await;
    let detail = loaded_detail(&client, "t1").await;
    let before = detail.store().get("t1").await.unwrap();

    // Nothing listens on the API port of this client.
    let options = ClientOptions::default()
        .with_api_url("http://127.0.0.1:1")
        .with_auth_url(&server.uri())
        .with_auth_api_key("test_api_key");
    let (notifier, mut notices) = Notifier::channel();
    let offline = GardenGlow::new(options).unwrap().with_notifier(notifier);
    sign_in(&offline, &server, "a@x.com", "Ash").await;

    let err = offline.engine(detail.store()).toggle_like("t1").await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert_eq!(detail.store().get("t1").await.unwrap(), before);
    assert_eq!(drain(&mut notices)[0].kind, NoticeKind::Error);
}

#[tokio::test]
async fn test_duplicate_like_is_ignored_while_pending() {
    let server = MockServer::start().await;
    let (client, _notices) = client_for(&server);
    sign_in(&client, &server, "a@x.com", "Ash").await;
    mount_tip(&server, tip_json("t1", ROSE, 5, &[])).await;

    Mock::given(method("PATCH"))
        .and(path("/tips/t1/like"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "likes": 6, "likedBy": ["a@x.com"] }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let detail = loaded_detail(&client, "t1").await;
    let engine = client.engine(detail.store());

    let (first, second) = tokio::join!(engine.toggle_like("t1"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(engine.like_state("t1"), MutationState::Pending);
        // The optimistic update is visible while the request is in flight.
        assert_eq!(detail.store().get("t1").await.unwrap().likes, 6);
        engine.toggle_like("t1").await
    });

    assert_eq!(
        first.unwrap(),
        LikeOutcome::Reconciled { likes: 6, liked: true }
    );
    assert_eq!(second.unwrap(), LikeOutcome::Ignored);
    assert_eq!(engine.like_state("t1"), MutationState::Idle);
}

#[tokio::test]
async fn test_engines_of_one_client_share_pending_likes() {
    let server = MockServer::start().await;
    let (client, _notices) = client_for(&server);
    sign_in(&client, &server, "a@x.com", "Ash").await;
    mount_tip(&server, tip_json("t1", ROSE, 5, &[])).await;

    Mock::given(method("PATCH"))
        .and(path("/tips/t1/like"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "likes": 6, "likedBy": ["a@x.com"] }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let detail = loaded_detail(&client, "t1").await;
    let first_engine = client.engine(detail.store());
    let second_engine = client.engine(detail.store());

    let (first, second) = tokio::join!(first_engine.toggle_like("t1"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(second_engine.like_state("t1"), MutationState::Pending);
        second_engine.toggle_like("t1").await
    });

    assert_eq!(
        first.unwrap(),
        LikeOutcome::Reconciled { likes: 6, liked: true }
    );
    assert_eq!(second.unwrap(), LikeOutcome::Ignored);
    assert_eq!(detail.store().get("t1").await.unwrap().likes, 6);
}

#[tokio::test]
async fn test_failed_like_keeps_values_reloaded_meanwhile() {
    let server = MockServer::start().await;
    let (client, _notices) = client_for(&server);
    sign_in(&client, &server, "a@x.com", "Ash").await;

    Mock::given(method("GET"))
        .and(path("/tips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([tip_json("t1", ROSE, 5, &[])])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([tip_json(
            "t1",
            ROSE,
            42,
            &["b@x.com"]
        )])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/tips/t1/like"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let browse = client.browse();
    browse.refresh().await;
    let engine = client.engine(browse.store());

    let (liked, reloaded) = tokio::join!(engine.toggle_like("t1"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        browse.refresh().await
    });

    assert!(liked.is_err());
    assert!(matches!(reloaded, ListView::Results(1)));
    let tip = browse.store().get("t1").await.unwrap();
    assert_eq!(tip.likes, 42);
    assert!(tip.is_liked_by("b@x.com"));
    assert!(!tip.is_liked_by("a@x.com"));
}

#[tokio::test]
async fn test_likes_on_different_tips_proceed_concurrently() {
    let server = MockServer::start().await;
    let (client, _notices) = client_for(&server);
    sign_in(&client, &server, "a@x.com", "Ash").await;

    Mock::given(method("GET"))
        .and(path("/tips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            tip_json("t1", ROSE, 0, &[]),
            tip_json("t2", ROSE, 4, &["a@x.com"]),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/tips/t1/like"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "likes": 1, "likedBy": ["a@x.com"] }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/tips/t2/like"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "likes": 3, "likedBy": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let browse = client.browse();
    browse.refresh().await;
    let engine = client.engine(browse.store());

    let (one, two) = tokio::join!(engine.toggle_like("t1"), engine.toggle_like("t2"));
    assert_eq!(one.unwrap(), LikeOutcome::Reconciled { likes: 1, liked: true });
    assert_eq!(two.unwrap(), LikeOutcome::Reconciled { likes: 3, liked: false });
}

#[tokio::test]
async fn test_toggling_twice_alternates() {
    let server = MockServer::start().await;
    let (client, mut notices) = client_for(&server);
    sign_in(&client, &server, "a@x.com", "Ash").await;
    mount_tip(&server, tip_json("t1", ROSE, 0, &[])).await;

    Mock::given(method("PATCH"))
        .and(path("/tips/t1/like"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "likes": 1, "likedBy": ["a@x.com"] })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/tips/t1/like"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "likes": 0, "likedBy": [] })))
        .mount(&server)
        .await;

    let detail = loaded_detail(&client, "t1").await;
    let engine = client.engine(detail.store());
    drain(&mut notices);

    assert_eq!(
        engine.toggle_like("t1").await.unwrap(),
        LikeOutcome::Reconciled { likes: 1, liked: true }
    );
    assert_eq!(
        engine.toggle_like("t1").await.unwrap(),
        LikeOutcome::Reconciled { likes: 0, liked: false }
    );

    let titles: Vec<String> = drain(&mut notices).into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["Liked!", "Unliked!"]);
}

#[tokio::test]
async fn test_anonymous_like_sends_nothing() {
    let server = MockServer::start().await;
    let (client, mut notices) = client_for(&server);
    client.session().resolve(None).await;
    mount_tip(&server, tip_json("t1", ROSE, 5, &[])).await;

    Mock::given(method("PATCH"))
        .and(path("/tips/t1/like"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let detail = loaded_detail(&client, "t1").await;
    let before = detail.store().get("t1").await.unwrap();

    let outcome = client.engine(detail.store()).toggle_like("t1").await.unwrap();
    assert_eq!(outcome, LikeOutcome::LoginRequired);
    assert_eq!(detail.store().get("t1").await.unwrap(), before);

    let notices = drain(&mut notices);
    assert_eq!(notices[0].title, "Please Login");
    assert_eq!(notices[0].text, "You need to be logged in to like tips");
}

#[tokio::test]
async fn test_like_on_unknown_tip() {
    let server = MockServer::start().await;
    let (client, _notices) = client_for(&server);
    sign_in(&client, &server, "a@x.com", "Ash").await;

    let engine = client.engine(&TipStore::new());
    assert!(matches!(
        engine.toggle_like("missing").await,
        Err(Error::UnknownTip(id)) if id == "missing"
    ));
    assert_eq!(engine.like_state("missing"), MutationState::Idle);
}

#[tokio::test]
async fn test_whitespace_comment_is_rejected() {
    let server = MockServer::start().await;
    let (client, mut notices) = client_for(&server);
    sign_in(&client, &server, ROSE, "Rose").await;
    mount_tip(&server, tip_json("t1", ROSE, 0, &[])).await;

    Mock::given(method("POST"))
        .and(path("/tips/t1/comment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let detail = loaded_detail(&client, "t1").await;
    drain(&mut notices);

    let err = client
        .engine(detail.store())
        .submit_comment("t1", "   \n\t ")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::EmptyComment)));

    let notices = drain(&mut notices);
    assert_eq!(notices[0].kind, NoticeKind::Warning);
    assert_eq!(notices[0].title, "Empty Comment");
}

#[tokio::test]
async fn test_comment_is_appended_after_confirmation() {
    let server = MockServer::start().await;
    let (client, _notices) = client_for(&server);
    sign_in(&client, &server, BASIL, "Basil").await;
    mount_tip(&server, tip_json("t1", ROSE, 0, &[])).await;

    Mock::given(method("POST"))
        .and(path("/tips/t1/comment"))
        .and(body_partial_json(json!({
            "userEmail": BASIL,
            "userName": "Basil",
            "userPhoto": "https://i.ibb.co/5GzXkwq/user.png",
            "comment": "Works for peppers too"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "comments": [{
                "userEmail": BASIL,
                "userName": "Basil",
                "userPhoto": "https://i.ibb.co/5GzXkwq/user.png",
                "comment": "Works for peppers too",
                "date": "2025-05-02T08:30:00Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = loaded_detail(&client, "t1").await;
    let outcome = client
        .engine(detail.store())
        .submit_comment("t1", "  Works for peppers too  ")
        .await
        .unwrap();

    assert_eq!(outcome, CommentOutcome::Posted(1));
    let tip = detail.store().get("t1").await.unwrap();
    assert_eq!(tip.comments[0].comment, "Works for peppers too");
}

#[tokio::test]
async fn test_failed_comment_leaves_comments_untouched() {
    let server = MockServer::start().await;
    let (client, mut notices) = client_for(&server);
    sign_in(&client, &server, BASIL, "Basil").await;
    mount_tip(&server, tip_json("t1", ROSE, 0, &[])).await;

    Mock::given(method("POST"))
        .and(path("/tips/t1/comment"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let detail = loaded_detail(&client, "t1").await;
    drain(&mut notices);
    let engine = client.engine(detail.store());

    assert!(engine.submit_comment("t1", "Nice").await.is_err());
    assert!(detail.store().get("t1").await.unwrap().comments.is_empty());
    assert_eq!(engine.comment_state("t1"), MutationState::Idle);
    assert_eq!(drain(&mut notices)[0].text, "Failed to add comment");
}
