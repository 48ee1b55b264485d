// Fast IP Change - External Command Execution
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! External command execution.
//!
//! Every OS tool invocation goes through [`CommandRunner`], so tests can
//! script tool output without touching the machine. Output is decoded from
//! the console code page when it is not valid UTF-8.

use std::io;
use std::process::Command;

use encoding_rs::{Encoding, SHIFT_JIS};
use once_cell::sync::Lazy;
use tracing::debug;

/// Hide the console window of child processes on Windows.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured result of one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero.
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    #[cfg(test)]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given text on stdout.
    ///
    /// netsh reports most errors on stdout, so that is where they go here too.
    #[cfg(test)]
    pub fn failed(exit_code: i32, stdout: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Stdout and stderr joined and trimmed, for error details.
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (false, false) => format!("{stdout}\n{stderr}"),
            (false, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (true, true) => match self.exit_code {
                Some(code) => format!("exit status {code}"),
                None => "terminated by signal".to_string(),
            },
        }
    }
}

/// Runs external programs and captures their output.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and wait for it to exit.
    ///
    /// `Err` means the process could not be started; a non-zero exit is
    /// reported through [`CommandOutput::success`].
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

/// Runs real processes with [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        debug!("Running: {}", display_command(program, args));

        let mut cmd = Command::new(program);
        cmd.args(args);
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let output = cmd.output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: decode_output(&output.stdout),
            stderr: decode_output(&output.stderr),
        })
    }
}

/// Render an invocation for log lines.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.contains(' ') {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

/// Console code page encoding, queried once.
static NATIVE_ENCODING: Lazy<&'static Encoding> = Lazy::new(|| {
    let encoding = query_console_code_page()
        .and_then(codepage::to_encoding)
        .unwrap_or(SHIFT_JIS);
    debug!("Native output encoding: {}", encoding.name());
    encoding
});

/// Encoding used for tool output that is not valid UTF-8.
pub fn native_encoding() -> &'static Encoding {
    *NATIVE_ENCODING
}

/// Decode raw tool output to text.
pub fn decode_output(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => decode_with(bytes, native_encoding()),
    }
}

/// Decode bytes with a specific encoding, replacing invalid sequences.
pub fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("Output contained bytes invalid in {}", encoding.name());
    }
    text.into_owned()
}

/// Ask `chcp` for the active console code page.
fn query_console_code_page() -> Option<u16> {
    if !cfg!(windows) {
        return None;
    }
    let mut cmd = Command::new("chcp");
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    let output = cmd.output().ok()?;
    parse_code_page(&String::from_utf8_lossy(&output.stdout))
}

/// Extract the code page number from `chcp` output in any language.
fn parse_code_page(text: &str) -> Option<u16> {
    let digits: String = text
        .trim()
        .chars()
        .rev()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.chars().rev().collect::<String>().parse().ok()
}
