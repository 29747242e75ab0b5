//! Runtime facts folded into the assembled system instruction (§4.2).

use std::path::Path;

/// Point-in-time facts about the environment the agent is running in.
pub struct RuntimeFacts {
    cwd: String,
    date: String,
    os: &'static str,
    sandboxed: bool,
    vcs_present: bool,
}

impl RuntimeFacts {
    /// Collect the facts for `cwd`.
    pub fn gather(cwd: &Path) -> Self {
        Self {
            cwd: cwd.display().to_string(),
            date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            os: std::env::consts::OS,
            sandboxed: is_sandboxed(),
            vcs_present: cwd.join(".git").exists(),
        }
    }

    /// Render the facts as the block appended to the system instruction.
    pub fn render(&self) -> String {
        format!(
            "Today's date is {date}.\n\
             You are operating in the directory: {cwd}.\n\
             Operating system: {os}.\n\
             Sandboxed execution: {sandboxed}.\n\
             Version control detected in this directory: {vcs}.",
            date = self.date,
            cwd = self.cwd,
            os = self.os,
            sandboxed = yes_no(self.sandboxed),
            vcs = yes_no(self.vcs_present),
        )
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn is_sandboxed() -> bool {
    std::env::var_os("RELAY_SANDBOX").is_some() || Path::new("/.dockerenv").exists()
}
