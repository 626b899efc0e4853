use anyhow::Result;
use std::process::Command;

use super::common::TestEnvironment;

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Run the `osdetect` binary against the environment's config file.
pub fn run_osdetect_command(env: &TestEnvironment, args: &[&str]) -> Result<CommandOutput> {
    run_osdetect_command_with_env(env, args, &[])
}

/// Like [`run_osdetect_command`], with extra environment variables set.
pub fn run_osdetect_command_with_env(
    env: &TestEnvironment,
    args: &[&str],
    vars: &[(&str, &str)],
) -> Result<CommandOutput> {
    let output = Command::new(env!("CARGO_BIN_EXE_osdetect"))
        .envs(vars.iter().copied())
        .arg("--no-color")
        .arg("--config")
        .arg(env.config_path())
        .args(args)
        .current_dir(env.path())
        .output()?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Parse the first JSON event on stdout.
pub fn json_event(output: &CommandOutput) -> Result<serde_json::Value> {
    let line = output
        .stdout
        .lines()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no output; stderr: {}", output.stderr))?;
    Ok(serde_json::from_str(line)?)
}
