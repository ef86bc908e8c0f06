
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use loadstream::protocol::{ProgressMessage, ResultMessage};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use support_server::{spawn_http_server, start_server, unreachable_url};

type Observer = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RUN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
struct Observed {
    progress: Vec<ProgressMessage>,
    results: Vec<ResultMessage>,
    progress_after_result: bool,
    close_code: Option<CloseCode>,
}

async fn connect(url: &str) -> Result<Observer, String> {
    let (ws, _response) = connect_async(url)
        .await
        .map_err(|err| format!("connect failed: {}", err))?;
    Ok(ws)
}

async fn send_config(ws: &mut Observer, config: &serde_json::Value) -> Result<(), String> {
    ws.send(Message::Text(config.to_string()))
        .await
        .map_err(|err| format!("send config failed: {}", err))
}

async fn observe(ws: &mut Observer) -> Result<Observed, String> {
    let read_all = async {
        let mut observed = Observed::default();
        while let Some(frame) = ws.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(_) => break,
            };
            match frame {
                Message::Text(text) => {
                    let value: serde_json::Value = serde_json::from_str(&text)
                        .map_err(|err| format!("invalid JSON from server: {}", err))?;
                    if value.get("total_requests").is_some() {
                        let result = serde_json::from_value(value)
                            .map_err(|err| format!("invalid result: {}", err))?;
                        observed.results.push(result);
                    } else {
                        observed.progress_after_result |= !observed.results.is_empty();
                        let progress = serde_json::from_value(value)
                            .map_err(|err| format!("invalid progress: {}", err))?;
                        observed.progress.push(progress);
                    }
                }
                Message::Close(frame) => {
                    observed.close_code = frame.map(|frame| frame.code);
                    break;
                }
                Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok::<Observed, String>(observed)
    };
    tokio::time::timeout(RUN_TIMEOUT, read_all)
        .await
        .map_err(|_elapsed| "timed out waiting for the run".to_owned())?
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn e2e_run_against_live_target() -> Result<(), String> {
    let (target, _target_server) = spawn_http_server()?;
    let server = start_server(&[]).await?;

    let mut ws = connect(&format!("{}/stress-test", server.ws_base)).await?;
    send_config(
        &mut ws,
        &serde_json::json!({"url": target, "requests": 100, "concurrency": 10}),
    )
    .await?;
    let observed = observe(&mut ws).await?;

    if observed.progress.len() != 100 || observed.progress_after_result {
        return Err(format!(
            "Expected 100 progress messages before the result, got {}",
            observed.progress.len()
        ));
    }
    let result = match observed.results.as_slice() {
        [result] => result,
        other => return Err(format!("Expected one result, got {:?}", other)),
    };
    if result.total_requests != 100 || result.success != 100 || result.failures != 0 {
        return Err(format!("Unexpected result: {:?}", result));
    }
    if result.resource_usage.len() != 100 || result.duration == 0 {
        return Err(format!("Unexpected samples or duration: {:?}", result));
    }
    if observed.close_code != Some(CloseCode::Normal) {
        return Err(format!("Unexpected close: {:?}", observed.close_code));
    }

    drop(server.shutdown_tx.send(()));
    server
        .handle
        .await
        .map_err(|err| format!("server task failed: {}", err))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn e2e_unreachable_target_counts_failures() -> Result<(), String> {
    let target = unreachable_url()?;
    let server = start_server(&[]).await?;

    let mut ws = connect(&format!("{}/stress-test", server.ws_base)).await?;
    send_config(
        &mut ws,
        &serde_json::json!({"url": target, "requests": 100, "concurrency": 10}),
    )
    .await?;
    let observed = observe(&mut ws).await?;

    match observed.results.as_slice() {
        [result] if result.success == 0 && result.failures == 100 => Ok(()),
        other => Err(format!("Unexpected results: {:?}", other)),
    }
}

#[tokio::test]
async fn e2e_wrong_path_is_not_upgraded() -> Result<(), String> {
    let server = start_server(&[]).await?;
    match connect_async(format!("{}/elsewhere", server.ws_base)).await {
        Err(tungstenite::Error::Http(response)) if response.status().as_u16() == 404 => Ok(()),
        Err(err) => Err(format!("Expected a 404 response, got {}", err)),
        Ok(_) => Err("Upgrade on the wrong path should fail".to_owned()),
    }
}

#[tokio::test]
async fn e2e_custom_route_is_served() -> Result<(), String> {
    let server = start_server(&["--path", "/load"]).await?;
    let mut ws = connect(&format!("{}/load", server.ws_base)).await?;
    send_config(
        &mut ws,
        &serde_json::json!({"url": "http://127.0.0.1:1", "requests": 2, "concurrency": 0}),
    )
    .await?;
    let observed = observe(&mut ws).await?;
    if observed.close_code != Some(CloseCode::Policy) {
        return Err(format!("Expected a policy close, got {:?}", observed.close_code));
    }
    Ok(())
}

#[tokio::test]
async fn e2e_invalid_config_gets_no_result() -> Result<(), String> {
    let server = start_server(&["--max-requests", "50"]).await?;
    let mut ws = connect(&format!("{}/stress-test", server.ws_base)).await?;
    send_config(
        &mut ws,
        &serde_json::json!({"url": "http://127.0.0.1:1", "requests": 100, "concurrency": 10}),
    )
    .await?;
    let observed = observe(&mut ws).await?;

    if !observed.results.is_empty() || !observed.progress.is_empty() {
        return Err(format!("Rejected config started a run: {:?}", observed));
    }
    if observed.close_code != Some(CloseCode::Policy) {
        return Err(format!("Expected a policy close, got {:?}", observed.close_code));
    }
    Ok(())
}

#[tokio::test]
async fn e2e_shutdown_stops_accepting() -> Result<(), String> {
    let server = start_server(&[]).await?;
    if server.shutdown_tx.send(()).is_err() {
        return Err("shutdown channel closed".to_owned());
    }
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .map_err(|_elapsed| "server did not stop".to_owned())?
        .map_err(|err| format!("server task failed: {}", err))?;

    if connect(&format!("{}/stress-test", server.ws_base)).await.is_ok() {
        return Err("Server still accepting after shutdown".to_owned());
    }
    Ok(())
}
