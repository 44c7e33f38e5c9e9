use std::sync::{Arc, Mutex, Once};

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use megafuel_core::types::{GetWhitelistArgs, WhitelistArgs, WhitelistType};
use megafuel_core::{CallContext, ClientConfig, ClientError, SponsorClient, TransportOptions};

const POLICY_P1: &str = "72191372-5550-4cf6-956e-b70d1e4786cf";

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("megafuel_core=debug")),
            )
            .with_target(true)
            .with_test_writer()
            .try_init();
    });
}

// ==============================================================================
// Local JSON-RPC Server
// ==============================================================================

#[derive(Debug, Clone)]
struct CapturedRequest {
    policy_uuid: Option<String>,
    user_agent: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl Captured {
    fn snapshot(&self) -> Vec<CapturedRequest> {
        self.requests.lock().expect("capture log poisoned").clone()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

async fn handle_rpc(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    captured
        .requests
        .lock()
        .expect("capture log poisoned")
        .push(CapturedRequest {
            policy_uuid: header(&headers, "x-megafuel-policy-uuid"),
            user_agent: header(&headers, "user-agent"),
            body: body.clone(),
        });

    let id = body["id"].clone();
    let reply = match body["method"].as_str().unwrap_or_default() {
        "eth_chainId" => json!({"jsonrpc": "2.0", "id": id, "result": "0x61"}),
        "pm_addToWhitelist" => json!({"jsonrpc": "2.0", "id": id, "result": true}),
        "pm_getBundleByUuid" => json!({"jsonrpc": "2.0", "id": id, "result": null}),
        // Malformed envelope: neither `result` nor `error`.
        "pm_getWhitelist" => json!({"jsonrpc": "2.0", "id": id}),
        "eth_sendRawTransaction" => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32000, "message": "nonce too low"},
        }),
        other => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32601, "message": format!("method {other} not found")},
        }),
    };
    Json(reply)
}

async fn spawn_server() -> (String, Captured) {
    let captured = Captured::default();
    let app = axum::Router::new()
        .route("/", post(handle_rpc))
        .with_state(captured.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("test listener must bind");
    let addr = listener.local_addr().expect("listener must have an address");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("test server must run");
    });
    (format!("http://{addr}/"), captured)
}

async fn dual_client(transport: TransportOptions) -> (SponsorClient, Captured, Captured) {
    let (user_url, user) = spawn_server().await;
    let (sponsor_url, sponsor) = spawn_server().await;
    let config = ClientConfig::new(user_url)
        .with_sponsor_url(sponsor_url)
        .with_transport(transport);
    let client = SponsorClient::connect(&config)
        .await
        .expect("client must connect");
    (client, user, sponsor)
}

// ==============================================================================
// Tests
// ==============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn whitelist_add_is_one_sponsor_request_with_policy_header() {
    init_tracing();
    let (client, user, sponsor) = dual_client(TransportOptions::default()).await;
    let policy = Uuid::parse_str(POLICY_P1).expect("policy uuid must parse");

    let added = client
        .add_to_whitelist(
            &CallContext::new(),
            &WhitelistArgs {
                policy_uuid: policy,
                whitelist_type: WhitelistType::ToAccountWhitelist,
                values: vec!["0xABC0000000000000000000000000000000000001".to_owned()],
            },
        )
        .await
        .expect("whitelist add must succeed");
    assert!(added);

    assert!(user.snapshot().is_empty(), "user endpoint must not be contacted");
    let requests = sponsor.snapshot();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.policy_uuid.as_deref(), Some(POLICY_P1));
    assert_eq!(request.body["jsonrpc"], json!("2.0"));
    assert_eq!(request.body["method"], json!("pm_addToWhitelist"));
    assert_eq!(
        request.body["params"],
        json!([{
            "policyUuid": POLICY_P1,
            "whitelistType": "ToAccountWhitelist",
            "values": ["0xABC0000000000000000000000000000000000001"],
        }])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn user_agent_override_does_not_stick_to_the_endpoint() {
    init_tracing();
    let transport = TransportOptions {
        user_agent: Some("megafuel-core-test".to_owned()),
        ..TransportOptions::default()
    };
    let (client, user, sponsor) = dual_client(transport).await;

    let first = client
        .chain_id(&CallContext::new().with_user_agent("wallet/9.9"))
        .await
        .expect("first chain id");
    let second = client
        .chain_id(&CallContext::new())
        .await
        .expect("second chain id");
    assert_eq!(first.to_u64(), Some(97));
    assert_eq!(first, second);

    assert!(sponsor.snapshot().is_empty());
    let requests = user.snapshot();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].user_agent.as_deref(), Some("wallet/9.9"));
    assert_eq!(requests[1].user_agent.as_deref(), Some("megafuel-core-test"));
    assert!(requests.iter().all(|r| r.policy_uuid.is_none()));
}

#[tokio::test(flavor = "multi_thread")]
async fn policy_scoped_call_goes_to_sponsor_server() {
    init_tracing();
    let (client, user, sponsor) = dual_client(TransportOptions::default()).await;

    client
        .chain_id(&CallContext::new().with_policy(POLICY_P1))
        .await
        .expect("policy-scoped chain id");

    assert!(user.snapshot().is_empty());
    let requests = sponsor.snapshot();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].policy_uuid.as_deref(), Some(POLICY_P1));
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_error_object_is_surfaced_with_code() {
    init_tracing();
    let (client, user, _) = dual_client(TransportOptions::default()).await;

    let err = client
        .send_raw_transaction(&CallContext::new(), &alloy_primitives::Bytes::from(vec![0xf8u8, 0x6b]))
        .await
        .expect_err("remote error must surface");
    assert_eq!(err.remote_code(), Some(-32000));
    assert!(err.to_string().contains("nonce too low"));
    assert_eq!(user.snapshot().len(), 1, "no retry after remote error");
}

#[tokio::test(flavor = "multi_thread")]
async fn null_result_is_an_absent_record() {
    init_tracing();
    let (client, user, _) = dual_client(TransportOptions::default()).await;
    let bundle_uuid = Uuid::parse_str(POLICY_P1).expect("bundle uuid must parse");

    let bundle = client
        .get_bundle_by_uuid(&CallContext::new(), bundle_uuid)
        .await
        .expect("null result is a valid reply");
    assert!(bundle.is_none());
    assert_eq!(user.snapshot().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn reply_without_result_or_error_is_invalid_response() {
    init_tracing();
    let (client, _, sponsor) = dual_client(TransportOptions::default()).await;
    let policy = Uuid::parse_str(POLICY_P1).expect("policy uuid must parse");

    let err = client
        .get_whitelist(
            &CallContext::new(),
            &GetWhitelistArgs {
                policy_uuid: policy,
                whitelist_type: WhitelistType::FromAccountWhitelist,
                offset: 0,
                limit: 10,
            },
        )
        .await
        .expect_err("empty envelope must not be reported as success");
    assert!(matches!(
        err,
        ClientError::Rpc(megafuel_core::RpcError::InvalidResponse(ref message))
            if message.contains("neither result nor error")
    ));
    assert_eq!(sponsor.snapshot().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_endpoint_is_a_transport_error() {
    init_tracing();
    // Port 9 (discard) is not expected to accept HTTP on loopback.
    let config = ClientConfig::new("http://127.0.0.1:9/");
    let client = SponsorClient::connect(&config)
        .await
        .expect("HTTP dial only validates the URL");

    let err = client
        .chain_id(&CallContext::new())
        .await
        .expect_err("unreachable endpoint must fail");
    assert!(matches!(err, ClientError::Rpc(megafuel_core::RpcError::Transport(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_sponsor_url_fails_construction() {
    init_tracing();
    let config = ClientConfig::new("http://127.0.0.1:9/").with_sponsor_url("ws://sponsor.example");
    let err = SponsorClient::connect(&config)
        .await
        .err()
        .expect("ws scheme must be rejected");
    assert!(matches!(err, ClientError::DialFailure { target, .. } if target == "ws://sponsor.example"));
}
