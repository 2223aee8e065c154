//! Tests for the driver service lifecycle.
//!
//! Real child processes are spawned from small shell scripts standing in for
//! the driver executables. Readiness is answered by a `FakeDriverServer`
//! bound to the port handed to the service.

#![cfg(unix)]

use std::time::{Duration, Instant};

use winium_core::{DriverService, DriverVariant, ServiceConfig, WiniumError};
use winium_test_utils::{
    EXITING_DRIVER_SCRIPT, FakeDriverServer, fake_driver_dir, init_tracing, read_recorded_args,
    recording_driver_script,
};

const DESKTOP_EXE: &str = "Winium.Desktop.Driver.exe";

fn fast_config() -> ServiceConfig {
    ServiceConfig {
        start_timeout_ms: 2_000,
        stop_timeout_ms: 1_000,
        poll_interval_ms: 20,
        ..ServiceConfig::default()
    }
}

// ===========================================================================
// start / stop
// ===========================================================================

#[tokio::test]
async fn start_passes_arguments_and_stop_terminates() {
    init_tracing();
    let server = FakeDriverServer::start().await;
    let args_dir = tempfile::tempdir().unwrap();
    let args_file = args_dir.path().join("args.txt");
    let (dir, _) = fake_driver_dir(DESKTOP_EXE, &recording_driver_script(&args_file)).unwrap();

    let service = DriverService::desktop(dir.path())
        .unwrap()
        .with_port(server.port())
        .with_verbose_logging(true)
        .with_log_path("/tmp/winium.log")
        .with_config(fast_config());

    service.start().await.unwrap();
    assert!(service.is_running().await);

    let args = read_recorded_args(&args_file).await.unwrap();
    assert_eq!(
        args,
        format!("--port={} --verbose --log-path=/tmp/winium.log", server.port())
    );
    assert!(!server.requests_to("/status").is_empty());

    let began = Instant::now();
    service.stop().await.unwrap();
    assert!(began.elapsed() < Duration::from_secs(1), "SIGTERM should end the child");
    assert!(!service.is_running().await);
}

#[tokio::test]
async fn stopped_service_cannot_restart() {
    let server = FakeDriverServer::start().await;
    let args_dir = tempfile::tempdir().unwrap();
    let (dir, _) = fake_driver_dir(
        DESKTOP_EXE,
        &recording_driver_script(&args_dir.path().join("args.txt")),
    )
    .unwrap();
    let service = DriverService::desktop(dir.path())
        .unwrap()
        .with_port(server.port())
        .with_config(fast_config());

    service.start().await.unwrap();
    let err = service.start().await.unwrap_err();
    assert!(matches!(err, WiniumError::AlreadyRunning(p) if p == server.port()));

    service.stop().await.unwrap();
    service.stop().await.unwrap();
    let err = service.start().await.unwrap_err();
    assert!(matches!(err, WiniumError::ServiceStopped(_)));
}

#[tokio::test]
async fn silent_flag_is_forwarded() {
    let server = FakeDriverServer::start().await;
    let args_dir = tempfile::tempdir().unwrap();
    let args_file = args_dir.path().join("args.txt");
    let (dir, _) = fake_driver_dir(
        DriverVariant::StoreApps.executable_file_name(),
        &recording_driver_script(&args_file),
    )
    .unwrap();

    let service = DriverService::store_apps(dir.path())
        .unwrap()
        .with_port(server.port())
        .with_suppress_initial_diagnostic_information(true)
        .with_config(fast_config());
    service.start().await.unwrap();

    let args = read_recorded_args(&args_file).await.unwrap();
    assert_eq!(args, format!("--port={} --silent", server.port()));
    service.stop().await.unwrap();
}

// ===========================================================================
// Startup failures
// ===========================================================================

#[tokio::test]
async fn never_ready_driver_times_out_and_is_killed() {
    init_tracing();
    let args_dir = tempfile::tempdir().unwrap();
    let (dir, _) = fake_driver_dir(
        DESKTOP_EXE,
        &recording_driver_script(&args_dir.path().join("args.txt")),
    )
    .unwrap();

    // Nothing listens on the service port, so readiness never succeeds.
    let service = DriverService::desktop(dir.path())
        .unwrap()
        .with_config(ServiceConfig {
            start_timeout_ms: 300,
            ..fast_config()
        });

    let err = service.start().await.unwrap_err();
    assert!(
        matches!(err, WiniumError::StartupTimeout { port, .. } if port == service.port()),
        "unexpected error: {err}"
    );
    assert!(!service.is_running().await);
    assert!(matches!(
        service.start().await.unwrap_err(),
        WiniumError::ServiceStopped(_)
    ));
}

#[tokio::test]
async fn exiting_driver_reports_process_exit() {
    let (dir, _) = fake_driver_dir(DESKTOP_EXE, EXITING_DRIVER_SCRIPT).unwrap();
    let service = DriverService::desktop(dir.path())
        .unwrap()
        .with_config(fast_config());

    let err = service.start().await.unwrap_err();
    match err {
        WiniumError::ProcessExited { status } => assert!(status.contains('3'), "{status}"),
        other => panic!("expected ProcessExited, got {other}"),
    }
}

#[tokio::test]
async fn missing_executable_names_download_url() {
    let dir = tempfile::tempdir().unwrap();
    let service = DriverService::silverlight(dir.path()).unwrap();
    let err = service.start().await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("WindowsPhoneDriver.OuterDriver.exe"), "{message}");
    assert!(message.contains("winphonedriver/releases"), "{message}");
}

#[tokio::test]
async fn unknown_variant_name_spawns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let err = DriverService::for_variant_name("android", dir.path()).unwrap_err();
    assert!(matches!(err, WiniumError::Configuration(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
