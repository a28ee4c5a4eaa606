use agora_api::app::build_app;
use agora_api::config::AppConfig;
use agora_auth::SigningKey;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use futures_util::{SinkExt, StreamExt};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message as WsMessage;

const TEST_SECRET: &str = "404e635266556a586e3272357538782f413f4428472b4b6250645367566b5970";

struct TestServer {
    base_url: String,
    ws_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let config = AppConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            signing_key: SigningKey::from_hex(TEST_SECRET).unwrap(),
            token_ttl: ChronoDuration::minutes(10),
        };
        let app = build_app(&config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            ws_url: format!("ws://{}", addr),
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn adult_dob() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 6, 15).unwrap()
}

async fn register(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    email: &str,
    dob: NaiveDate,
) -> reqwest::Response {
    client
        .post(format!("{}/api/auth/register", base_url))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "hunter22",
            "dateOfBirth": dob.to_string(),
        }))
        .send()
        .await
        .unwrap()
}

/// Returns (bearer token, user id) for a freshly registered user.
async fn register_and_login(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
) -> (String, String) {
    let res = register(
        client,
        base_url,
        username,
        &format!("{}@example.com", username),
        adult_dob(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({ "username": username, "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    (
        body["token"].as_str().unwrap().to_string(),
        body["id"].as_str().unwrap().to_string(),
    )
}

/// Mint a token directly with the server's secret, bypassing login. Used to
/// exercise role checks without an admin-bootstrap endpoint.
fn mint_token(user_id: &str, username: &str, roles: &[&str]) -> String {
    let now = Utc::now();
    let claims = json!({
        "sub": username,
        "id": user_id,
        "roles": roles,
        "isAdult": true,
        "iat": now.timestamp(),
        "exp": (now + ChronoDuration::minutes(10)).timestamp(),
    });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&hex::decode(TEST_SECRET).unwrap()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn duplicate_username_and_email_are_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = register(&client, &server.base_url, "alice", "alice@example.com", adult_dob()).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Same username, different email.
    let res = register(&client, &server.base_url, "alice", "other@example.com", adult_dob()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "username taken");

    // Same email, different username.
    let res = register(&client, &server.base_url, "alice2", "alice@example.com", adult_dob()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "email taken");
}

#[tokio::test]
async fn underage_registration_is_rejected_and_leaves_no_record() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let twelve_years_ago = Utc::now().date_naive() - ChronoDuration::days(12 * 365);
    let res = register(&client, &server.base_url, "kid", "kid@example.com", twelve_years_ago).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Nothing was stored, so login is an authentication failure.
    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "username": "kid", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_token_with_identity_claims() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, id) = register_and_login(&client, &server.base_url, "bob").await;

    let mut validation = jsonwebtoken::Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let decoded = jsonwebtoken::decode::<Value>(
        &token,
        &jsonwebtoken::DecodingKey::from_secret(&hex::decode(TEST_SECRET).unwrap()),
        &validation,
    )
    .expect("server-issued token must verify under the configured secret");

    assert_eq!(decoded.claims["sub"], "bob");
    assert_eq!(decoded.claims["id"], id.as_str());
    assert_eq!(decoded.claims["roles"], json!(["USER"]));
    assert_eq!(decoded.claims["isAdult"], json!(true));

    // The token works against a protected endpoint.
    let res = client
        .get(format!("{}/api/users/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let profile: Value = res.json().await.unwrap();
    assert_eq!(profile["username"], "bob");
    assert_eq!(profile["email"], "bob@example.com");
    assert_eq!(profile["isAdult"], json!(true));
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register_and_login(&client, &server.base_url, "carol").await;

    let wrong_password = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "username": "carol", "password": "not-it" }))
        .send()
        .await
        .unwrap();
    let unknown_user = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "username": "nobody", "password": "not-it" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_user.json().await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn exempt_paths_never_reject_regardless_of_token() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (valid_token, _) = register_and_login(&client, &server.base_url, "alice").await;

    for path in ["/health", "/api/test/ping"] {
        // No token, a garbage token, and a valid token all pass untouched.
        let anonymous = client.get(format!("{}{}", server.base_url, path));
        let garbage = client
            .get(format!("{}{}", server.base_url, path))
            .bearer_auth("not.a.jwt");
        let valid = client
            .get(format!("{}{}", server.base_url, path))
            .bearer_auth(&valid_token);
        for req in [anonymous, garbage, valid] {
            let res = req.send().await.unwrap();
            assert_eq!(res.status(), StatusCode::OK, "path {} must stay open", path);
        }
    }
}

#[tokio::test]
async fn invalid_token_degrades_to_anonymous_and_guard_rejects() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // No token at all.
    let res = client
        .get(format!("{}/api/users/me", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Garbage token is treated exactly like no token.
    let res = client
        .get(format!("{}/api/users/me", server.base_url))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_endpoints_require_the_admin_role() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (user_token, user_id) = register_and_login(&client, &server.base_url, "dave").await;

    let res = client
        .get(format!("{}/api/admin/users", server.base_url))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let admin_token = mint_token(&user_id, "dave", &["ADMIN"]);
    let res = client
        .get(format!("{}/api/admin/users", server.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let users: Value = res.json().await.unwrap();
    assert_eq!(users.as_array().unwrap().len(), 1);

    // Role update round-trips through the admin surface.
    let res = client
        .put(format!("{}/api/admin/users/{}/roles", server.base_url, user_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "roles": ["USER", "MODERATOR"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let profile: Value = res.json().await.unwrap();
    assert_eq!(profile["roles"], json!(["USER", "MODERATOR"]));

    // Empty role set is invalid.
    let res = client
        .put(format!("{}/api/admin/users/{}/roles", server.base_url, user_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "roles": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_updates_respect_ownership() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (erin_token, erin_id) = register_and_login(&client, &server.base_url, "erin").await;
    let (frank_token, _) = register_and_login(&client, &server.base_url, "frank").await;

    // Frank cannot edit Erin's profile.
    let res = client
        .put(format!("{}/api/users/{}", server.base_url, erin_id))
        .bearer_auth(&frank_token)
        .json(&json!({ "email": "hijacked@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Erin can, and the new email must not collide with Frank's.
    let res = client
        .put(format!("{}/api/users/{}", server.base_url, erin_id))
        .bearer_auth(&erin_token)
        .json(&json!({ "email": "frank@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(format!("{}/api/users/{}", server.base_url, erin_id))
        .bearer_auth(&erin_token)
        .json(&json!({ "email": "erin-new@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let profile: Value = res.json().await.unwrap();
    assert_eq!(profile["email"], "erin-new@example.com");
}

async fn connect_ws(server: &TestServer, token: &str) -> tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
> {
    let url = format!("{}/ws?token={}", server.ws_url, token);
    let (ws, _) = tokio_tungstenite::connect_async(url)
        .await
        .expect("websocket handshake failed");
    ws
}

async fn next_text(
    ws: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for websocket frame")
            .expect("websocket closed unexpectedly")
            .expect("websocket read error");
        if let WsMessage::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn direct_message_reaches_exactly_sender_and_receiver() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (alice_token, alice_id) = register_and_login(&client, &server.base_url, "alice").await;
    let (bob_token, bob_id) = register_and_login(&client, &server.base_url, "bob").await;
    let (carol_token, carol_id) = register_and_login(&client, &server.base_url, "carol").await;

    let mut alice_ws = connect_ws(&server, &alice_token).await;
    let mut bob_ws = connect_ws(&server, &bob_token).await;
    let mut carol_ws = connect_ws(&server, &carol_token).await;

    // Spoofed sender field: the router must attribute the message to Alice.
    let frame = json!({ "to": bob_id, "content": "hi bob", "sender": carol_id }).to_string();
    alice_ws.send(WsMessage::Text(frame)).await.unwrap();

    let delivered = next_text(&mut bob_ws).await;
    assert_eq!(delivered["sender"], alice_id.as_str());
    assert_eq!(delivered["receiver"], bob_id.as_str());
    assert_eq!(delivered["content"], "hi bob");
    assert_eq!(delivered["read"], json!(false));

    // The sender gets the same record echoed to its own address.
    let echoed = next_text(&mut alice_ws).await;
    assert_eq!(echoed["id"], delivered["id"]);

    // Carol is not one of the two addresses and must see nothing.
    let silence =
        tokio::time::timeout(Duration::from_millis(300), carol_ws.next()).await;
    assert!(silence.is_err(), "third party must not observe the delivery");
}

#[tokio::test]
async fn websocket_reports_errors_in_band() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (alice_token, _) = register_and_login(&client, &server.base_url, "alice").await;

    // Unauthenticated connect: the upgrade succeeds (the gate never rejects),
    // then the connection reports the failure and closes.
    let url = format!("{}/ws", server.ws_url);
    let (mut anon_ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    let err = next_text(&mut anon_ws).await;
    assert_eq!(err["error"], "not authenticated");

    let mut alice_ws = connect_ws(&server, &alice_token).await;

    // Unknown receiver.
    let ghost = uuid_like_but_absent();
    let frame = json!({ "to": ghost, "content": "hello?" }).to_string();
    alice_ws.send(WsMessage::Text(frame)).await.unwrap();
    let err = next_text(&mut alice_ws).await;
    assert_eq!(err["error"], "receiver not found");

    // Malformed frame.
    alice_ws
        .send(WsMessage::Text("not json".to_string()))
        .await
        .unwrap();
    let err = next_text(&mut alice_ws).await;
    assert_eq!(err["error"], "malformed frame");
}

fn uuid_like_but_absent() -> String {
    "00000000-0000-7000-8000-000000000000".to_string()
}

#[tokio::test]
async fn message_history_and_read_receipts() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (alice_token, _) = register_and_login(&client, &server.base_url, "alice").await;
    let (bob_token, bob_id) = register_and_login(&client, &server.base_url, "bob").await;

    let mut alice_ws = connect_ws(&server, &alice_token).await;
    let mut bob_ws = connect_ws(&server, &bob_token).await;

    for content in ["one", "two"] {
        let frame = json!({ "to": bob_id, "content": content }).to_string();
        alice_ws.send(WsMessage::Text(frame)).await.unwrap();
        next_text(&mut alice_ws).await;
        next_text(&mut bob_ws).await;
    }

    // Bob sees the conversation with Alice, oldest first.
    let alice_id = {
        let res = client
            .get(format!("{}/api/users/by-name/alice", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    };
    let res = client
        .get(format!("{}/api/messages/{}", server.base_url, alice_id))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let history: Value = res.json().await.unwrap();
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["content"], "one");
    assert_eq!(history[1]["content"], "two");

    // Bob marks both as read; Alice marking the same ids changes nothing.
    let ids: Vec<&str> = history.iter().map(|m| m["id"].as_str().unwrap()).collect();
    let res = client
        .post(format!("{}/api/messages/read", server.base_url))
        .bearer_auth(&bob_token)
        .json(&json!({ "messageIds": ids }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["updated"], json!(2));

    let res = client
        .post(format!("{}/api/messages/read", server.base_url))
        .bearer_auth(&alice_token)
        .json(&json!({ "messageIds": ids }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["updated"], json!(0));
}
