//! WiFi network discovery through NetworkManager's `nmcli`.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use matterhub_app::ports::NetworkScanner;
use matterhub_domain::command::CommandOutcome;
use matterhub_domain::error::{CommandFailedError, MatterHubError};

use crate::config::ChipToolConfig;
use crate::error::ChipToolError;

const SCAN_ARGS: [&str; 6] = ["-t", "-f", "SSID", "dev", "wifi", "list"];

/// [`NetworkScanner`] running `nmcli -t -f SSID dev wifi list`.
#[derive(Debug, Clone)]
pub struct NmcliScanner {
    program: PathBuf,
}

impl NmcliScanner {
    #[must_use]
    pub fn new(config: &ChipToolConfig) -> Self {
        Self {
            program: config.nmcli_path.clone(),
        }
    }

    async fn run(&self) -> Result<Vec<String>, MatterHubError> {
        let output = Command::new(&self.program)
            .args(SCAN_ARGS)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ChipToolError::Spawn {
                path: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let outcome = output
                .status
                .code()
                .map_or(CommandOutcome::Terminated, CommandOutcome::Exited);
            return Err(CommandFailedError {
                command: format!("nmcli {}", SCAN_ARGS.join(" ")),
                outcome,
            }
            .into());
        }

        Ok(parse_ssids(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl NetworkScanner for NmcliScanner {
    fn scan(&self) -> impl Future<Output = Result<Vec<String>, MatterHubError>> + Send {
        async move {
            let result = self.run().await;
            match &result {
                Ok(ssids) => tracing::debug!(count = ssids.len(), "wifi scan completed"),
                Err(err) => tracing::warn!(error = %err, "wifi scan failed"),
            }
            result
        }
    }
}

/// Distinct, non-blank SSIDs from terse `nmcli` output, sorted.
///
/// Terse mode escapes `:` and `\` with a backslash; those escapes are undone.
#[must_use]
pub fn parse_ssids(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| unescape(line.trim()))
        .filter(|ssid| !ssid.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
