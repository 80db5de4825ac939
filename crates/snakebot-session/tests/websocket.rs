//! End-to-end tests against an in-process WebSocket device.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use snakebot_core::{Command, Direction};
use snakebot_session::{ConnectionState, Session, SessionConfig, SessionHandle, WsConnector};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

const TIMEOUT: Duration = Duration::from_secs(5);

/// What the emulated device observed.
#[derive(Debug, PartialEq)]
enum Seen {
    Text(Value),
    Close(Option<u16>),
}

/// Boot a device that answers `move` with a status frame, `ping` with
/// `pong`, and closes normally on `stop`.
async fn boot_device() -> (u16, mpsc::UnboundedReceiver<Seen>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    let _device = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(message)) = ws.next().await {
            match message {
                Message::Text(text) => {
                    let value: Value = serde_json::from_str(text.as_str()).unwrap();
                    let kind = value["type"].as_str().unwrap_or_default().to_string();
                    let _ = tx.send(Seen::Text(value));
                    match kind.as_str() {
                        "move" => {
                            let status = json!({
                                "type": "status",
                                "connected": true,
                                "motorA": 200,
                                "motorB": 200,
                                "presence": false,
                                "hotPixels": 0,
                                "maxTemp": 24.0,
                                "ambientTemp": 22.5,
                                "pixels": vec![22.5; 64],
                            });
                            ws.send(Message::Text(status.to_string().into())).await.unwrap();
                        }
                        "ping" => {
                            ws.send(Message::Text(r#"{"type":"pong"}"#.into())).await.unwrap();
                        }
                        "stop" => {
                            let frame = CloseFrame {
                                code: CloseCode::Normal,
                                reason: "stopping".into(),
                            };
                            let _ = ws.close(Some(frame)).await;
                        }
                        _ => {}
                    }
                }
                Message::Close(frame) => {
                    let _ = tx.send(Seen::Close(frame.map(|f| u16::from(f.code))));
                    break;
                }
                _ => {}
            }
        }
    });

    (port, rx)
}

async fn connect(port: u16) -> SessionHandle {
    let session = Session::spawn(SessionConfig::default(), Arc::new(WsConnector::new()));
    session.connect("127.0.0.1", port);
    let _ = timeout(
        TIMEOUT,
        session.wait_for(|s| s.state == ConnectionState::Connected),
    )
    .await
    .expect("connect timed out")
    .unwrap();
    session
}

#[tokio::test]
async fn move_round_trip_updates_status() {
    let (port, mut seen) = boot_device().await;
    let session = connect(port).await;

    session.send(Command::move_to(Direction::Forward, 200));
    let frame = timeout(TIMEOUT, seen.recv()).await.unwrap().unwrap();
    assert_eq!(
        frame,
        Seen::Text(json!({"type": "move", "direction": "forward", "speed": 200}))
    );

    let snapshot = timeout(TIMEOUT, session.wait_for(|s| s.last_status.is_some()))
        .await
        .unwrap()
        .unwrap();
    let status = snapshot.last_status.unwrap();
    assert!((status.motor_a - 200.0).abs() < f64::EPSILON);
    assert!(status.thermal_grid().is_some());
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let (port, mut seen) = boot_device().await;
    let session = connect(port).await;

    session.send(Command::ping());
    let frame = timeout(TIMEOUT, seen.recv()).await.unwrap().unwrap();
    assert_eq!(frame, Seen::Text(json!({"type": "ping"})));
    let _ = timeout(
        TIMEOUT,
        session.wait_for(|s| s.logs.iter().any(|e| e.message == "Pong received")),
    )
    .await
    .unwrap()
    .unwrap();
}

#[tokio::test]
async fn device_close_lands_in_disconnected() {
    let (port, _seen) = boot_device().await;
    let session = connect(port).await;

    session.send(Command::stop());
    let snapshot = timeout(
        TIMEOUT,
        session.wait_for(|s| s.state == ConnectionState::Disconnected),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(
        snapshot
            .logs
            .iter()
            .any(|e| e.message == "Channel closed. Code: 1000, Reason: stopping")
    );
}

#[tokio::test]
async fn disconnect_sends_normal_close() {
    let (port, mut seen) = boot_device().await;
    let session = connect(port).await;

    session.disconnect();
    let frame = timeout(TIMEOUT, seen.recv()).await.unwrap().unwrap();
    assert_eq!(frame, Seen::Close(Some(1000)));
    assert_eq!(session.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn unreachable_device_reports_error_then_closure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let session = Session::spawn(SessionConfig::default(), Arc::new(WsConnector::new()));
    session.connect("127.0.0.1", port);

    let snapshot = timeout(
        TIMEOUT,
        session.wait_for(|s| s.state == ConnectionState::Disconnected && s.last_error.is_some()),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(
        snapshot.last_error.as_deref(),
        Some("Connection error - check debug logs")
    );
    assert!(
        snapshot
            .logs
            .iter()
            .any(|e| e.message.contains("Abnormal closure"))
    );
}
