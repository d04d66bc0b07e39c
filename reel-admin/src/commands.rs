//! Subcommand execution
//!
//! Each invocation is one admin session: the catalog is loaded first (as
//! on page load), and gated commands unlock the panel once.

use crate::cli::{Command, VideoArgs};
use anyhow::Result;
use reel_common::sources::RemoteCredentials;
use reel_common::{AdminPanel, PublishOutcome, SubmitOutcome, VideoInput};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

pub struct AdminSession {
    panel: AdminPanel,
    exports_dir: PathBuf,
    password: Option<String>,
}

impl AdminSession {
    /// `password` of `None` means prompt on stdin when a gated command runs
    pub fn new(panel: AdminPanel, exports_dir: PathBuf, password: Option<String>) -> Self {
        Self {
            panel,
            exports_dir,
            password,
        }
    }

    pub fn panel(&self) -> &AdminPanel {
        &self.panel
    }

    pub async fn execute(&mut self, command: &Command, out: &mut dyn Write) -> Result<()> {
        self.panel.load().await;
        debug!(command = ?command, "Executing command");

        match command {
            Command::Load => {
                let catalog = self.panel.catalog();
                let source = catalog
                    .load_source()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "nothing".to_string());
                writeln!(out, "Loaded {} videos from {}", catalog.len(), source)?;
            }
            Command::List { json } => self.list(*json, out)?,
            Command::Add(args) => {
                self.unlock()?;
                let outcome = self.panel.submit(&args.apply_to(VideoInput::default()))?;
                writeln!(out, "Added {}", outcome.record().id)?;
            }
            Command::Edit { target, changes } => self.edit(target, changes, out)?,
            Command::Remove { id } => {
                self.unlock()?;
                let existed = self.panel.catalog().contains(id);
                self.panel.remove(id)?;
                if existed {
                    writeln!(out, "Removed {}", id)?;
                } else {
                    writeln!(out, "No video with ID {}; nothing removed", id)?;
                }
            }
            Command::Export { out: dir } => {
                self.unlock()?;
                let artifact = self.panel.export()?;
                let path = artifact.write_to(dir.as_deref().unwrap_or(self.exports_dir.as_path()))?;
                writeln!(
                    out,
                    "Exported {} videos to {}",
                    self.panel.catalog().len(),
                    path.display()
                )?;
            }
            Command::Publish => {
                self.unlock()?;
                match self.panel.publish().await? {
                    PublishOutcome::SyncedRemotely => {
                        writeln!(out, "Published {} videos to the remote document", self.panel.catalog().len())?;
                    }
                    PublishOutcome::DownloadedForManualUpload(artifact) => {
                        let path = artifact.write_to(&self.exports_dir)?;
                        writeln!(
                            out,
                            "Remote sync unavailable; upload {} to the repository by hand",
                            path.display()
                        )?;
                    }
                }
            }
            Command::Credentials { gist_id, token } => {
                self.unlock()?;
                self.panel.save_credentials(&RemoteCredentials {
                    document_id: gist_id.clone(),
                    token: token.clone(),
                })?;
                writeln!(out, "Saved remote credentials")?;
            }
        }
        Ok(())
    }

    fn list(&self, json: bool, out: &mut dyn Write) -> Result<()> {
        let videos = self.panel.catalog().render_order();
        if json {
            serde_json::to_writer_pretty(&mut *out, &videos)?;
            writeln!(out)?;
            return Ok(());
        }

        if videos.is_empty() {
            writeln!(out, "No videos")?;
        }
        for video in videos {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                video.id, video.name, video.category, video.role
            )?;
        }
        Ok(())
    }

    fn edit(&mut self, target: &str, changes: &VideoArgs, out: &mut dyn Write) -> Result<()> {
        self.unlock()?;
        let form = changes.apply_to(self.panel.begin_edit(target)?.clone());

        match self.panel.submit(&form)? {
            SubmitOutcome::Updated {
                previous_id,
                record,
            } if previous_id != record.id => {
                writeln!(out, "Updated {} (now {})", previous_id, record.id)?;
            }
            outcome => writeln!(out, "Updated {}", outcome.record().id)?,
        }
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        let password = self.password.clone();
        self.panel
            .open(|| password.or_else(|| prompt_password(&mut std::io::stdin().lock())))?;
        info!("Admin panel unlocked");
        Ok(())
    }
}

/// Read one line from `input` as the password
fn prompt_password(input: &mut dyn BufRead) -> Option<String> {
    eprint!("Admin password: ");
    let _ = std::io::stderr().flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}
