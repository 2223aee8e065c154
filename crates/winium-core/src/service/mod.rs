//! Lifecycle of a native Winium driver process.
//!
//! A [`DriverService`] owns at most one child process bound to a port picked
//! by [`find_free_port`]. The state machine is:
//!
//! ```text
//! Idle --start()--> Running --stop()--> Stopped
//!   |                  ^
//!   +--(start fails)---+--> Stopped
//! ```
//!
//! A stopped service cannot be started again. State transitions are
//! serialised through an internal mutex; the child is killed if the service
//! is dropped while still running.

pub mod port;
pub mod variant;

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::error::WiniumError;

pub use port::find_free_port;
pub use variant::{DEFAULT_DOWNLOAD_URL, DriverVariant};

#[derive(Debug)]
enum ServiceState {
    Idle,
    Running(Child),
    Stopped,
}

/// Arguments every driver understands: the port it must listen on.
pub fn base_arguments(port: u16) -> Vec<String> {
    vec![format!("--port={port}")]
}

/// A locally launched Winium driver.
#[derive(Debug)]
pub struct DriverService {
    executable_dir: PathBuf,
    executable_file_name: String,
    port: u16,
    download_url: &'static str,
    suppress_initial_diagnostic_information: bool,
    verbose_logging: bool,
    log_path: Option<PathBuf>,
    config: ServiceConfig,
    state: Mutex<ServiceState>,
}

impl DriverService {
    fn new(
        executable_dir: PathBuf,
        executable_file_name: String,
        download_url: &'static str,
    ) -> Result<Self, WiniumError> {
        let port = find_free_port().map_err(WiniumError::PortAllocation)?;
        Ok(Self {
            executable_dir,
            executable_file_name,
            port,
            download_url,
            suppress_initial_diagnostic_information: false,
            verbose_logging: false,
            log_path: None,
            config: ServiceConfig::default(),
            state: Mutex::new(ServiceState::Idle),
        })
    }

    /// Service for `Winium.Desktop.Driver.exe` in `executable_dir`.
    pub fn desktop(executable_dir: impl Into<PathBuf>) -> Result<Self, WiniumError> {
        Self::for_variant(DriverVariant::Desktop, executable_dir)
    }

    /// Service for `Winium.StoreApps.Driver.exe` in `executable_dir`.
    pub fn store_apps(executable_dir: impl Into<PathBuf>) -> Result<Self, WiniumError> {
        Self::for_variant(DriverVariant::StoreApps, executable_dir)
    }

    /// Service for `WindowsPhoneDriver.OuterDriver.exe` in `executable_dir`.
    pub fn silverlight(executable_dir: impl Into<PathBuf>) -> Result<Self, WiniumError> {
        Self::for_variant(DriverVariant::Silverlight, executable_dir)
    }

    /// Service for an arbitrarily named driver executable.
    pub fn default_service(
        executable_dir: impl Into<PathBuf>,
        executable_file_name: impl Into<String>,
    ) -> Result<Self, WiniumError> {
        Self::new(
            executable_dir.into(),
            executable_file_name.into(),
            DEFAULT_DOWNLOAD_URL,
        )
    }

    pub fn for_variant(
        variant: DriverVariant,
        executable_dir: impl Into<PathBuf>,
    ) -> Result<Self, WiniumError> {
        Self::new(
            executable_dir.into(),
            variant.executable_file_name().to_string(),
            variant.download_url(),
        )
    }

    /// Service for a variant given by name (`"desktop"`, `"store-apps"`,
    /// `"silverlight"`). Unknown names fail before any port is allocated.
    pub fn for_variant_name(
        name: &str,
        executable_dir: impl Into<PathBuf>,
    ) -> Result<Self, WiniumError> {
        let variant: DriverVariant = name.parse()?;
        Self::for_variant(variant, executable_dir)
    }

    /// Bind to a specific port instead of the allocated one.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Pass `--silent` and discard the driver's stdout/stderr.
    pub fn with_suppress_initial_diagnostic_information(mut self, suppress: bool) -> Self {
        self.suppress_initial_diagnostic_information = suppress;
        self
    }

    /// Pass `--verbose`.
    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    /// Pass `--log-path=<path>`. An empty path clears the setting.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.log_path = (!path.as_os_str().is_empty()).then_some(path);
        self
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn executable_dir(&self) -> &Path {
        &self.executable_dir
    }

    pub fn executable_file_name(&self) -> &str {
        &self.executable_file_name
    }

    pub fn executable_path(&self) -> PathBuf {
        self.executable_dir.join(&self.executable_file_name)
    }

    pub fn download_url(&self) -> &'static str {
        self.download_url
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Base URL commands are sent to, e.g. `http://127.0.0.1:9999/`.
    pub fn service_url(&self) -> String {
        format!("http://{}:{}/", self.config.host, self.port)
    }

    /// Driver arguments: `--port=N [--silent] [--verbose] [--log-path=P]`.
    ///
    /// The optional flags always appear in this order, whatever order they
    /// were configured in.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = base_arguments(self.port);
        if self.suppress_initial_diagnostic_information {
            args.push("--silent".to_string());
        }
        if self.verbose_logging {
            args.push("--verbose".to_string());
        }
        if let Some(path) = &self.log_path {
            args.push(format!("--log-path={}", path.display()));
        }
        args
    }

    /// [`DriverService::arguments`] joined with single spaces.
    pub fn command_line(&self) -> String {
        self.arguments().join(" ")
    }

    /// Launch the driver and wait until it answers `GET /status`.
    ///
    /// # Errors
    ///
    /// - [`WiniumError::AlreadyRunning`] / [`WiniumError::ServiceStopped`]
    ///   when the service is not idle.
    /// - [`WiniumError::ExecutableNotFound`] when the executable is missing.
    /// - [`WiniumError::Spawn`], [`WiniumError::ProcessExited`] or
    ///   [`WiniumError::StartupTimeout`] when the child cannot be brought up.
    ///   The child is killed before the error is returned and the service
    ///   is left stopped.
    pub async fn start(&self) -> Result<(), WiniumError> {
        let mut state = self.state.lock().await;
        match *state {
            ServiceState::Idle => {}
            ServiceState::Running(_) => return Err(WiniumError::AlreadyRunning(self.port)),
            ServiceState::Stopped => return Err(WiniumError::ServiceStopped(self.port)),
        }

        let path = self.executable_path();
        if !path.is_file() {
            return Err(WiniumError::ExecutableNotFound {
                path,
                download_url: self.download_url,
            });
        }

        let args = self.arguments();
        info!(
            executable = %path.display(),
            port = self.port,
            args = ?args,
            "starting driver service"
        );

        let mut cmd = Command::new(&path);
        cmd.args(&args)
            .current_dir(&self.executable_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if self.suppress_initial_diagnostic_information {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let mut child = cmd.spawn().map_err(|source| WiniumError::Spawn {
            path: path.clone(),
            source,
        })?;

        match self.wait_until_ready(&mut child, &path).await {
            Ok(()) => {
                info!(port = self.port, pid = child.id(), "driver service ready");
                *state = ServiceState::Running(child);
                Ok(())
            }
            Err(e) => {
                warn!(port = self.port, error = %e, "driver service failed to start");
                if let Err(kill_err) = child.kill().await {
                    debug!(port = self.port, error = %kill_err, "kill after failed start");
                }
                *state = ServiceState::Stopped;
                Err(e)
            }
        }
    }

    /// Poll the readiness endpoint until it answers, the child exits, or the
    /// start timeout elapses.
    async fn wait_until_ready(&self, child: &mut Child, path: &Path) -> Result<(), WiniumError> {
        let timeout = self.config.start_timeout();
        let deadline = Instant::now() + timeout;
        let status_url = format!("{}status", self.service_url());
        let client = reqwest::Client::builder()
            .timeout(self.config.poll_interval().max(Duration::from_millis(500)))
            .build()
            .map_err(winium_remote::RemoteError::from)?;

        loop {
            let exited = child.try_wait().map_err(|source| WiniumError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;
            if let Some(status) = exited {
                return Err(WiniumError::ProcessExited {
                    status: status.to_string(),
                });
            }

            match client.get(&status_url).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    debug!(port = self.port, status = %response.status(), "driver not ready yet");
                }
                Err(e) => {
                    debug!(port = self.port, error = %e, "driver not reachable yet");
                }
            }

            if Instant::now() >= deadline {
                return Err(WiniumError::StartupTimeout {
                    port: self.port,
                    timeout,
                });
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    /// Terminate the driver: SIGTERM, wait up to the stop timeout, then kill.
    ///
    /// Stopping an idle or already stopped service does nothing.
    pub async fn stop(&self) -> Result<(), WiniumError> {
        let mut state = self.state.lock().await;
        match std::mem::replace(&mut *state, ServiceState::Stopped) {
            ServiceState::Running(child) => {
                terminate(child, self.port, self.config.stop_timeout()).await;
                info!(port = self.port, "driver service stopped");
            }
            ServiceState::Idle => {
                *state = ServiceState::Idle;
                debug!(port = self.port, "stop called on a service that was never started");
            }
            ServiceState::Stopped => {
                debug!(port = self.port, "stop called on an already stopped service");
            }
        }
        Ok(())
    }

    /// OS process id of the running child, if any.
    pub async fn pid(&self) -> Option<u32> {
        match &*self.state.lock().await {
            ServiceState::Running(child) => child.id(),
            _ => None,
        }
    }

    /// Whether the child process is currently alive.
    pub async fn is_running(&self) -> bool {
        let mut state = self.state.lock().await;
        let ServiceState::Running(child) = &mut *state else {
            return false;
        };
        let probe = child.try_wait();
        match &probe {
            Ok(None) => {}
            Ok(Some(status)) => {
                warn!(port = self.port, %status, "driver process exited unexpectedly");
            }
            Err(e) => {
                warn!(port = self.port, error = %e, "error checking driver process status");
            }
        }
        if child_still_owned(&probe) {
            return true;
        }
        *state = ServiceState::Stopped;
        false
    }
}

/// A failed `try_wait` says nothing about the child, so it stays owned (and
/// reported running) until `stop` reaps it.
fn child_still_owned(probe: &std::io::Result<Option<ExitStatus>>) -> bool {
    !matches!(probe, Ok(Some(_)))
}

async fn terminate(mut child: Child, port: u16, timeout: Duration) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: pid is a child we spawned and have not yet reaped.
            let ret = unsafe { libc::kill(pid as i32, libc::SIGTERM) };
            if ret != 0 {
                warn!(pid, "SIGTERM failed, proceeding to SIGKILL");
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = child.start_kill() {
            warn!(port, error = %e, "failed to signal driver process");
        }
    }

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            debug!(port, %status, "driver process exited");
        }
        _ => {
            warn!(port, "driver process did not exit in time, killing");
            if let Err(e) = child.kill().await {
                warn!(port, error = %e, "failed to kill driver process");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> DriverService {
        DriverService::desktop("/opt/winium").unwrap().with_port(9999)
    }

    #[test]
    fn desktop_service_paths() {
        let svc = DriverService::desktop("/opt/winium").unwrap();
        assert_eq!(svc.executable_file_name(), "Winium.Desktop.Driver.exe");
        assert_eq!(
            svc.executable_path(),
            PathBuf::from("/opt/winium/Winium.Desktop.Driver.exe")
        );
        assert_eq!(
            svc.download_url(),
            "https://github.com/2gis/Winium.Desktop/releases"
        );
        assert_ne!(svc.port(), 0);
    }

    #[test]
    fn factories_bind_variant_executables() {
        let store = DriverService::store_apps("d").unwrap();
        assert_eq!(store.executable_file_name(), "Winium.StoreApps.Driver.exe");
        let silverlight = DriverService::silverlight("d").unwrap();
        assert_eq!(
            silverlight.executable_file_name(),
            "WindowsPhoneDriver.OuterDriver.exe"
        );
        assert_eq!(
            silverlight.download_url(),
            "https://github.com/2gis/winphonedriver/releases"
        );
    }

    #[test]
    fn default_service_uses_generic_download_url() {
        let svc = DriverService::default_service("d", "Custom.Driver.exe").unwrap();
        assert_eq!(svc.executable_file_name(), "Custom.Driver.exe");
        assert_eq!(svc.download_url(), "https://github.com/2gis/Winium");
    }

    #[test]
    fn for_variant_name_rejects_unknown() {
        let err = DriverService::for_variant_name("firefox", "d").unwrap_err();
        assert!(matches!(err, WiniumError::Configuration(_)));
    }

    #[test]
    fn base_command_line_has_only_port() {
        assert_eq!(service().command_line(), "--port=9999");
    }

    #[test]
    fn all_flags_in_fixed_order() {
        let svc = service()
            .with_log_path("C:\\logs\\winium.log")
            .with_verbose_logging(true)
            .with_suppress_initial_diagnostic_information(true);
        assert_eq!(
            svc.command_line(),
            "--port=9999 --silent --verbose --log-path=C:\\logs\\winium.log"
        );
    }

    #[test]
    fn flag_order_independent_of_setter_order() {
        let a = service()
            .with_suppress_initial_diagnostic_information(true)
            .with_verbose_logging(true)
            .with_log_path("/tmp/w.log");
        let b = service()
            .with_log_path("/tmp/w.log")
            .with_verbose_logging(true)
            .with_suppress_initial_diagnostic_information(true);
        assert_eq!(a.arguments(), b.arguments());
    }

    #[test]
    fn empty_log_path_is_ignored() {
        let svc = service().with_log_path("");
        assert_eq!(svc.command_line(), "--port=9999");
    }

    #[test]
    fn verbose_only() {
        let svc = service().with_verbose_logging(true);
        assert_eq!(svc.arguments(), vec!["--port=9999", "--verbose"]);
    }

    #[test]
    fn service_url_uses_configured_host() {
        let svc = service().with_config(ServiceConfig {
            host: "localhost".to_string(),
            ..ServiceConfig::default()
        });
        assert_eq!(svc.service_url(), "http://localhost:9999/");
    }

    #[tokio::test]
    async fn start_without_executable_fails() {
        let dir = tempfile::tempdir().unwrap();
        let svc = DriverService::desktop(dir.path()).unwrap();
        let err = svc.start().await.unwrap_err();
        match err {
            WiniumError::ExecutableNotFound { path, download_url } => {
                assert_eq!(path, dir.path().join("Winium.Desktop.Driver.exe"));
                assert_eq!(download_url, DriverVariant::Desktop.download_url());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!svc.is_running().await);
    }

    #[test]
    fn failed_liveness_check_keeps_child_owned() {
        let probe = Err(std::io::Error::other("wait failed"));
        assert!(child_still_owned(&probe));
        assert!(child_still_owned(&Ok(None)));
    }

    #[cfg(unix)]
    #[test]
    fn exited_child_is_released() {
        use std::os::unix::process::ExitStatusExt;
        assert!(!child_still_owned(&Ok(Some(ExitStatus::from_raw(0)))));
    }

    #[tokio::test]
    async fn stop_on_idle_service_is_noop() {
        let svc = service();
        svc.stop().await.unwrap();
        assert!(!svc.is_running().await);
    }
}
