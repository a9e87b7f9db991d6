// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Local process execution with combined output capture

use crate::error::{KrustletError, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Run `cmd` to completion, feeding `stdin` if given, and return stdout followed by
/// stderr split into lines. A non-zero exit status is an error carrying that output.
pub async fn combined_output_lines(mut cmd: Command, stdin: Option<&str>) -> Result<Vec<String>> {
    let rendered = render(&cmd);

    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| KrustletError::Spawn {
        command: rendered.clone(),
        source,
    })?;

    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        pipe.write_all(input.as_bytes())
            .await
            .map_err(|source| KrustletError::Spawn {
                command: rendered.clone(),
                source,
            })?;
        // closing the pipe signals EOF to the child
        drop(pipe);
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|source| KrustletError::Spawn {
            command: rendered.clone(),
            source,
        })?;

    let mut lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect();
    lines.extend(
        String::from_utf8_lossy(&output.stderr)
            .lines()
            .map(str::to_string),
    );

    if !output.status.success() {
        return Err(KrustletError::CommandFailed {
            command: rendered,
            status: output.status.to_string(),
            output: lines.join("\n"),
        });
    }

    Ok(lines)
}

fn render(cmd: &Command) -> String {
    let std_cmd = cmd.as_std();
    std::iter::once(std_cmd.get_program())
        .chain(std_cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
