use std::path::{Path, PathBuf};
use std::process::Command;

use crate::foundation::error::{HimawariError, HimawariResult};

/// Label the agent is registered under.
pub const AGENT_LABEL: &str = "com.himawari-live-wallpaper";

/// A launchd agent that re-runs the pipeline every `interval_secs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchAgent {
    /// launchd `Label`.
    pub label: String,
    /// Executable followed by its arguments.
    pub program_arguments: Vec<String>,
    /// launchd `StartInterval`.
    pub interval_secs: u64,
    /// File launchd redirects stdout to.
    pub stdout_path: PathBuf,
    /// File launchd redirects stderr to.
    pub stderr_path: PathBuf,
    /// Where the plist is installed.
    pub plist_path: PathBuf,
}

impl LaunchAgent {
    /// Agent for the current user, rooted at `$HOME/Library`.
    pub fn for_current_user(
        program_arguments: Vec<String>,
        interval_minutes: u32,
    ) -> HimawariResult<Self> {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| HimawariError::config("HOME is not set"))?;
        Ok(Self::under_home(&home, program_arguments, interval_minutes))
    }

    /// Agent rooted at `home/Library`.
    pub fn under_home(home: &Path, program_arguments: Vec<String>, interval_minutes: u32) -> Self {
        let library = home.join("Library");
        let logs = library.join("Logs");
        Self {
            label: AGENT_LABEL.to_string(),
            program_arguments,
            interval_secs: u64::from(interval_minutes) * 60,
            stdout_path: logs.join(format!("{AGENT_LABEL}.out")),
            stderr_path: logs.join(format!("{AGENT_LABEL}.err")),
            plist_path: library
                .join("LaunchAgents")
                .join(format!("{AGENT_LABEL}.plist")),
        }
    }

    /// The agent's property list XML.
    pub fn render_plist(&self) -> String {
        let args: String = self
            .program_arguments
            .iter()
            .map(|a| format!("        <string>{}</string>\n", xml_escape(a)))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{label}</string>
    <key>ProgramArguments</key>
    <array>
{args}    </array>
    <key>StartInterval</key>
    <integer>{interval}</integer>
    <key>RunAtLoad</key>
    <true/>
    <key>StandardOutPath</key>
    <string>{stdout}</string>
    <key>StandardErrorPath</key>
    <string>{stderr}</string>
</dict>
</plist>
"#,
            label = xml_escape(&self.label),
            interval = self.interval_secs,
            stdout = xml_escape(&self.stdout_path.to_string_lossy()),
            stderr = xml_escape(&self.stderr_path.to_string_lossy()),
        )
    }

    /// Write the plist and load it with `launchctl`.
    pub fn install(&self) -> HimawariResult<()> {
        for dir in [self.plist_path.parent(), self.stdout_path.parent()]
            .into_iter()
            .flatten()
        {
            std::fs::create_dir_all(dir).map_err(|e| {
                HimawariError::persistence(format!("create '{}': {e}", dir.display()))
            })?;
        }
        std::fs::write(&self.plist_path, self.render_plist()).map_err(|e| {
            HimawariError::persistence(format!(
                "write '{}': {e}",
                self.plist_path.display()
            ))
        })?;
        launchctl("load", &self.plist_path)?;
        tracing::info!(label = %self.label, plist = %self.plist_path.display(), "launch agent installed");
        Ok(())
    }

    /// Unload and remove the agent. Returns `false` if it was not installed.
    pub fn uninstall(&self) -> HimawariResult<bool> {
        if !self.plist_path.exists() {
            return Ok(false);
        }
        // An agent that is not currently loaded is still removed.
        if let Err(e) = launchctl("unload", &self.plist_path) {
            tracing::warn!(error = %e, "launchctl unload failed");
        }
        std::fs::remove_file(&self.plist_path).map_err(|e| {
            HimawariError::persistence(format!(
                "remove '{}': {e}",
                self.plist_path.display()
            ))
        })?;
        tracing::info!(label = %self.label, "launch agent uninstalled");
        Ok(true)
    }
}

fn launchctl(verb: &str, plist: &Path) -> HimawariResult<()> {
    let status = Command::new("launchctl")
        .arg(verb)
        .arg(plist)
        .status()
        .map_err(|e| HimawariError::sink(format!("failed to spawn launchctl: {e}")))?;
    if !status.success() {
        return Err(HimawariError::sink(format!(
            "launchctl {verb} '{}' exited with {status}",
            plist.display()
        )));
    }
    Ok(())
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/launchd.rs"]
mod tests;
