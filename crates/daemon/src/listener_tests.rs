use tokio::io::BufReader;
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Notify};
use tsk_core::Config;
use tsk_wire::{read_message, write_message, Request};

use super::*;
use crate::lifecycle::{DaemonState, Paths};

fn paths_in(dir: &tempfile::TempDir) -> Paths {
    let state_dir = dir.path().to_path_buf();
    Paths {
        socket_path: state_dir.join("daemon.sock"),
        lock_path: state_dir.join("daemon.pid"),
        heartbeat_path: state_dir.join("daemon.heartbeat"),
        db_path: state_dir.join("tsk.db"),
        state_dir,
    }
}

async fn spawn_daemon(dir: &tempfile::TempDir) -> (Arc<ListenCtx>, mpsc::UnboundedReceiver<Option<String>>, std::path::PathBuf) {
    let paths = paths_in(dir);
    let socket_path = paths.socket_path.clone();
    let (state, listener) = DaemonState::startup(paths, Config::default()).expect("startup");

    let (sync_tx, sync_rx) = mpsc::unbounded_channel();
    let ctx = Arc::new(ListenCtx { state: Arc::new(state), sync_tx, shutdown: Arc::new(Notify::new()) });

    tokio::spawn(run(ctx.clone(), listener));

    (ctx, sync_rx, socket_path)
}

async fn roundtrip(socket_path: &std::path::Path, request: Request) -> Response {
    let stream = UnixStream::connect(socket_path).await.expect("connect");
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    write_message(&mut write_half, &request).await.expect("write");
    read_message(&mut reader).await.expect("read")
}

#[tokio::test]
async fn status_reports_no_backends_when_none_configured() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_ctx, _sync_rx, socket_path) = spawn_daemon(&dir).await;

    let response = roundtrip(&socket_path, Request::Status).await;

    assert!(response.is_ok());
    assert_eq!(response.sync_count, Some(0));
    assert_eq!(response.backend_states, Some(Default::default()));
}

#[tokio::test]
async fn notify_forwards_the_target_backend_on_the_sync_channel() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_ctx, mut sync_rx, socket_path) = spawn_daemon(&dir).await;

    let response = roundtrip(&socket_path, Request::Notify { data: Some("work".into()) }).await;

    assert!(response.is_ok());
    assert_eq!(sync_rx.recv().await, Some(Some("work".to_string())));
}

#[tokio::test]
async fn stop_acknowledges_and_trips_the_shutdown_signal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_ctx, _sync_rx, socket_path) = spawn_daemon(&dir).await;

    let response = roundtrip(&socket_path, Request::Stop).await;

    assert!(response.is_ok());
    assert!(!response.running);
}
