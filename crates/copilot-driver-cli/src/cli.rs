use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "Write a Python function to calculate factorial using recursion.";

#[derive(Parser, Debug)]
#[command(name = "copilot-driver")]
#[command(about = "🤖 Drive GitHub Copilot Chat in VS Code and accept its code")]
#[command(
    long_about = "Launches VS Code on a project folder, installs its requirements.txt in the integrated terminal, sends a prompt to Copilot Chat in Agent mode and presses Ctrl+Enter once a vision model sees the Keep button enabled.\n\nVision credentials are read from AZURE_OPENAI_ENDPOINT with AZURE_OPENAI_API_KEY or AZURE_OPENAI_AD_TOKEN, or from OPENAI_API_KEY. A .env file in the working directory is loaded first."
)]
pub struct Args {
    /// Project folder to open (default: ~/pyauto-gui-samples/project1)
    #[clap(long, env = "COPILOT_DRIVER_PROJECT")]
    pub project_folder: Option<PathBuf>,

    /// Use this VS Code executable instead of searching for one
    #[clap(long, env = "COPILOT_DRIVER_CODE_PATH")]
    pub code_path: Option<PathBuf>,

    /// Prompt typed into Copilot Chat
    #[clap(long, env = "COPILOT_DRIVER_PROMPT", default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// Seconds to wait for the Keep button
    #[clap(long, default_value_t = 120)]
    pub keep_max_wait: u64,

    /// Seconds between Keep button checks
    #[clap(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    pub keep_interval: u64,

    /// Seconds to wait for pip to finish
    #[clap(long, default_value_t = 300)]
    pub install_max_wait: u64,

    /// Seconds between installation checks
    #[clap(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub install_interval: u64,

    /// Save every captured frame as PNG into this directory
    #[clap(long, value_name = "DIR")]
    pub save_frames: Option<PathBuf>,

    /// Do not install requirements.txt
    #[clap(long)]
    pub skip_install: bool,
}

impl Args {
    /// The folder to open, falling back to the home-relative default
    pub fn resolve_project_folder(&self) -> Option<PathBuf> {
        self.project_folder.clone().or_else(|| {
            dirs::home_dir().map(|home| home.join("pyauto-gui-samples").join("project1"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reproduce_the_script() {
        let args = Args::try_parse_from(["copilot-driver"]).unwrap();
        assert_eq!(args.prompt, DEFAULT_PROMPT);
        assert_eq!(args.keep_max_wait, 120);
        assert_eq!(args.keep_interval, 3);
        assert_eq!(args.install_max_wait, 300);
        assert_eq!(args.install_interval, 10);
        assert!(!args.skip_install);
        assert!(args.save_frames.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "copilot-driver",
            "--project-folder",
            "/work/demo",
            "--keep-interval",
            "5",
            "--skip-install",
            "--save-frames",
            "frames",
        ])
        .unwrap();
        assert_eq!(
            args.resolve_project_folder(),
            Some(PathBuf::from("/work/demo"))
        );
        assert_eq!(args.keep_interval, 5);
        assert!(args.skip_install);
        assert_eq!(args.save_frames, Some(PathBuf::from("frames")));
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Args::try_parse_from(["copilot-driver", "--keep-interval", "0"]).is_err());
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
