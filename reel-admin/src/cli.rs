//! Command-line arguments for reel-admin

use clap::{Args, Parser, Subcommand};
use reel_common::VideoInput;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reel-admin")]
#[command(about = "Manage the portfolio reel video catalog")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the platform config dir)
    #[arg(short, long, env = "REEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Folder holding the local cache and exports
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Admin password; prompted for on stdin when absent
    #[arg(long, env = "REEL_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load the catalog and report which source won
    Load,

    /// List videos, newest first
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a video
    Add(VideoArgs),

    /// Edit an existing video; unset fields keep their current value
    Edit {
        /// ID of the video to edit
        #[arg(value_name = "ID")]
        target: String,

        #[command(flatten)]
        changes: VideoArgs,
    },

    /// Remove a video
    Remove {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Write the catalog as videos.json
    Export {
        /// Output directory (defaults to <root>/exports)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Push the catalog to the remote document, or export it for manual upload
    Publish,

    /// Store remote write credentials
    Credentials {
        #[arg(long)]
        gist_id: String,

        #[arg(long)]
        token: String,
    },
}

/// Video form fields
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoArgs {
    /// YouTube video ID
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub role: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

impl VideoArgs {
    /// Overlay the given fields onto `form`
    pub fn apply_to(&self, mut form: VideoInput) -> VideoInput {
        let overlay = |field: &mut Option<String>, value: &Option<String>| {
            if value.is_some() {
                field.clone_from(value);
            }
        };
        overlay(&mut form.id, &self.id);
        overlay(&mut form.name, &self.name);
        overlay(&mut form.category, &self.category);
        overlay(&mut form.role, &self.role);
        overlay(&mut form.description, &self.description);
        form
    }
}
