//! Launcher for the VnCoreNLP segmentation server.
//!
//! The server is a pre-built Java archive. The launcher starts it in the
//! VnCoreNLP directory with inherited stdio, waits for it to exit (also
//! after Ctrl-C) and then reports that it stopped. It never touches the
//! filesystem itself.

use crate::config::toml_config::AppConfig;
use crate::utils::error::{EtlError, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitStatus;
use tokio::process::Command;

pub const STOPPED_MESSAGE: &str = "VnCoreNLP server has stopped.";
pub const PAUSE_PROMPT: &str = "Press Enter to close...";

/// Fixed invocation of the server; `Default` is the stock
/// `java -Xmx2g -jar VnCoreNLP-1.2.jar -p 9000 -a wseg` inside `vncorenlp/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub working_dir: PathBuf,
    pub program: String,
    pub max_heap: String,
    pub jar: String,
    pub port: u16,
    pub annotators: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ServerSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            working_dir: PathBuf::from(&config.paths.vncorenlp_dir),
            program: config.vncorenlp.java.clone(),
            max_heap: config.vncorenlp.max_heap.clone(),
            jar: config.vncorenlp.jar.clone(),
            port: config.vncorenlp.port,
            annotators: config.vncorenlp.annotators.clone(),
        }
    }
}

impl ServerSettings {
    pub fn args(&self) -> Vec<String> {
        vec![
            format!("-Xmx{}", self.max_heap),
            "-jar".to_string(),
            self.jar.clone(),
            "-p".to_string(),
            self.port.to_string(),
            "-a".to_string(),
            self.annotators.clone(),
        ]
    }

    pub fn command_line(&self) -> String {
        format!("{} {}", self.program, self.args().join(" "))
    }
}

pub struct ServerLauncher {
    settings: ServerSettings,
}

impl ServerLauncher {
    pub fn new(settings: ServerSettings) -> Self {
        Self { settings }
    }

    /// Spawns the server and waits for it to exit.
    ///
    /// A non-zero exit of the server is not an error here; only a failure to
    /// start the program at all is. Ctrl-C reaches the server through the
    /// shared process group, so the launcher swallows it and keeps waiting.
    pub async fn run(&self) -> Result<ExitStatus> {
        tracing::info!(
            "🚀 Starting VnCoreNLP server in {}: {}",
            self.settings.working_dir.display(),
            self.settings.command_line()
        );

        let mut child = Command::new(&self.settings.program)
            .args(self.settings.args())
            .current_dir(&self.settings.working_dir)
            .spawn()
            .map_err(|e| EtlError::ProcessError {
                program: self.settings.program.clone(),
                message: e.to_string(),
            })?;

        let status = loop {
            tokio::select! {
                status = child.wait() => break status?,
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => tracing::info!("⏹ Interrupt received, waiting for the server to shut down"),
                    Err(e) => {
                        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                        break child.wait().await?;
                    }
                },
            }
        };

        tracing::info!("VnCoreNLP server exited with {}", status);
        Ok(status)
    }

    /// Runs the server and writes [`STOPPED_MESSAGE`] to `out` once it has exited,
    /// whether or not it could be started.
    pub async fn run_and_report<W: Write>(&self, out: &mut W) -> Result<ExitStatus> {
        let result = self.run().await;
        writeln!(out, "{}", STOPPED_MESSAGE)?;
        out.flush()?;
        result
    }
}

/// Prints [`PAUSE_PROMPT`] and blocks until one line (or EOF) is read.
pub fn wait_for_keypress<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> std::io::Result<()> {
    write!(out, "{}", PAUSE_PROMPT)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}
