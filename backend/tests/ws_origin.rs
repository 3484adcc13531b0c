//! Origin validation on the toast WebSocket handshake.

use std::sync::Arc;

use actix_http::Request;
use actix_web::http::header::HeaderValue;
use actix_web::{
    App,
    body::BoxBody,
    dev::{Service, ServiceResponse},
    http::{StatusCode, header},
    test::{self, TestRequest},
    web,
};
use backend::domain::LiveToastFeed;
use backend::inbound::ws;
use backend::inbound::ws::state::WsState;
use backend::test_support::in_memory_collections;
use rstest::{fixture, rstest};

// Sample Sec-WebSocket-Key from RFC 6455 section 1.3.
const RFC6455_SAMPLE_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";

const ALLOWED: [&str; 2] = ["https://alumni.example", "http://localhost:3000"];

#[fixture]
fn ws_state() -> WsState {
    let collections = in_memory_collections();
    WsState::new(Arc::new(LiveToastFeed::new(&collections)), ALLOWED)
}

async fn init_app(
    state: WsState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(ws::ws_entry),
    )
    .await
}

fn handshake_request() -> TestRequest {
    TestRequest::get()
        .uri("/ws")
        .insert_header((header::UPGRADE, "websocket"))
        .insert_header((header::CONNECTION, "Upgrade"))
        .insert_header((header::SEC_WEBSOCKET_VERSION, "13"))
        .insert_header((header::SEC_WEBSOCKET_KEY, RFC6455_SAMPLE_KEY))
}

#[derive(Debug, Clone, Copy)]
enum OriginCase {
    Missing,
    Unlisted,
    /// Same host on another scheme.
    WrongScheme,
    /// Same host on another port.
    WrongPort,
    Multiple,
    /// 0x80 is not valid UTF-8.
    NotUtf8,
}

fn request_for(case: OriginCase) -> Request {
    let request = handshake_request();
    match case {
        OriginCase::Missing => request,
        OriginCase::Unlisted => request.insert_header((header::ORIGIN, "https://evil.example")),
        OriginCase::WrongScheme => {
            request.insert_header((header::ORIGIN, "http://alumni.example"))
        }
        OriginCase::WrongPort => request.insert_header((header::ORIGIN, "http://localhost:3001")),
        OriginCase::Multiple => request
            .append_header((header::ORIGIN, "https://alumni.example"))
            .append_header((header::ORIGIN, "http://localhost:3000")),
        OriginCase::NotUtf8 => {
            let invalid = HeaderValue::from_bytes(&[0x80]).expect("opaque header value");
            request.insert_header((header::ORIGIN, invalid))
        }
    }
    .to_request()
}

#[rstest]
#[case("https://alumni.example")]
#[case("http://localhost:3000")]
#[actix_web::test]
async fn upgrades_listed_origins(ws_state: WsState, #[case] origin: &str) {
    let app = init_app(ws_state).await;

    let request = handshake_request()
        .insert_header((header::ORIGIN, origin))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(
        response.status(),
        StatusCode::SWITCHING_PROTOCOLS,
        "origin {origin}"
    );
}

#[rstest]
#[case(OriginCase::Missing, StatusCode::FORBIDDEN)]
#[case(OriginCase::Unlisted, StatusCode::FORBIDDEN)]
#[case(OriginCase::WrongScheme, StatusCode::FORBIDDEN)]
#[case(OriginCase::WrongPort, StatusCode::FORBIDDEN)]
#[case(OriginCase::Multiple, StatusCode::BAD_REQUEST)]
#[case(OriginCase::NotUtf8, StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn rejects_other_origin_headers(
    ws_state: WsState,
    #[case] case: OriginCase,
    #[case] expected: StatusCode,
) {
    let app = init_app(ws_state).await;

    let response = test::call_service(&app, request_for(case)).await;
    assert_eq!(response.status(), expected, "{case:?}");
}
