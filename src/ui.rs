// UI layer: the conversion flow (pick a file, upload it, report the reply)
// and the interactive menu that drives it. Terminal interaction sits behind
// the `Frontend` trait so the flow can be exercised without a terminal.

use crate::api::{ApiClient, UploadOutcome};
use crate::conversion::ConversionType;
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

pub const NO_FILE_SELECTED: &str = "No file selected. Please try again.";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong!";
pub const PROCESSING_FAILED: &str =
    "An error occurred while processing your file. Please try again.";
const CONVERSION_FINISHED: &str = "Conversion finished.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Error,
}

/// Everything the flow needs from the user's side of the screen.
pub trait Frontend {
    /// Ask for one file suitable for `ty`. `None` means the user picked
    /// nothing.
    fn pick_file(&self, ty: &ConversionType) -> Result<Option<PathBuf>>;

    /// Show a message to the user.
    fn alert(&self, level: AlertLevel, message: &str);

    /// Present a converted result (URL or local path).
    fn open(&self, target: &str) -> Result<()>;
}

/// How one interaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    NoFile,
    Converted { opened: Option<String> },
    Rejected,
    Failed,
}

impl Report {
    pub fn is_success(&self) -> bool {
        matches!(self, Report::Converted { .. })
    }

    /// Process exit status of a one-shot `convert` run.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Run one conversion: pick a file for `ty`, upload it and report the
/// server's answer. At most one file is sent; nothing is sent when no file
/// was picked.
pub fn select_conversion(api: &ApiClient, frontend: &dyn Frontend, ty: &ConversionType) -> Report {
    let file = match frontend.pick_file(ty) {
        Ok(Some(file)) => file,
        Ok(None) => {
            frontend.alert(AlertLevel::Error, NO_FILE_SELECTED);
            return Report::NoFile;
        }
        // A picker that cannot run (no display, no TTY) leaves the user with
        // no file, so it gets the same alert; the cause goes to the log.
        Err(e) => {
            error!(error = %format!("{:#}", e), "file selection failed");
            frontend.alert(AlertLevel::Error, NO_FILE_SELECTED);
            return Report::NoFile;
        }
    };
    convert_file(api, frontend, ty, &file)
}

/// Upload an already chosen file and report the reply.
pub fn convert_file(
    api: &ApiClient,
    frontend: &dyn Frontend,
    ty: &ConversionType,
    file: &Path,
) -> Report {
    if !ty.accepts(file) {
        warn!(
            file = %file.display(),
            accepted = %ty.accept_types(),
            "file extension does not match the conversion type, sending anyway"
        );
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Converting {}...", file.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = api.upload(file, ty);
    spinner.finish_and_clear();

    match result {
        Ok(UploadOutcome::Converted { message, path }) => {
            info!(path = ?path, "conversion succeeded");
            frontend.alert(
                AlertLevel::Info,
                message.as_deref().unwrap_or(CONVERSION_FINISHED),
            );
            let opened = path.map(|p| resolve_result_target(api.base_url(), &p));
            if let Some(target) = &opened {
                if let Err(e) = frontend.open(target) {
                    error!(target = %target, error = %format!("{:#}", e), "failed to open result");
                }
            }
            Report::Converted { opened }
        }
        Ok(UploadOutcome::Rejected { status, error }) => {
            warn!(%status, error = ?error, "server rejected the upload");
            frontend.alert(
                AlertLevel::Error,
                error.as_deref().unwrap_or(SOMETHING_WENT_WRONG),
            );
            Report::Rejected
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "upload failed");
            frontend.alert(AlertLevel::Error, PROCESSING_FAILED);
            Report::Failed
        }
    }
}

/// Turn the `path` of a reply into something openable. URLs and paths
/// that exist locally are used as-is; anything else is taken relative to
/// the server.
pub fn resolve_result_target(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if Path::new(path).exists() {
        return path.to_string();
    }
    format!("{}/{}", base_url, path.trim_start_matches('/'))
}

/// Terminal implementation: native file dialog (or typed path), coloured
/// alerts, results handed to the desktop opener.
pub struct TerminalFrontend {
    /// Use the native file dialog instead of a typed path.
    pub use_dialog: bool,
    /// Open results with the default application instead of printing them.
    pub open_results: bool,
}

impl Frontend for TerminalFrontend {
    fn pick_file(&self, ty: &ConversionType) -> Result<Option<PathBuf>> {
        if self.use_dialog {
            let mut dialog = rfd::FileDialog::new().set_title(&ty.label());
            let exts = ty.extensions();
            if !exts.is_empty() {
                dialog = dialog.add_filter(&ty.accept_types(), exts);
            }
            return Ok(dialog.pick_file());
        }

        // `Input` with an empty answer stands for a cancelled selection.
        let raw: String = Input::new()
            .with_prompt(format!("File to convert ({})", ty.accept_types()))
            .allow_empty(true)
            .validate_with(|input: &String| -> Result<(), &'static str> {
                if input.trim().is_empty() || Path::new(input.trim()).is_file() {
                    Ok(())
                } else {
                    Err("No such file")
                }
            })
            .interact_text()?;
        let raw = raw.trim();
        Ok((!raw.is_empty()).then(|| PathBuf::from(raw)))
    }

    fn alert(&self, level: AlertLevel, message: &str) {
        match level {
            AlertLevel::Info => println!("{}", message.green().bold()),
            AlertLevel::Error => println!("{}", message.red().bold()),
        }
    }

    fn open(&self, target: &str) -> Result<()> {
        if self.open_results {
            open::that(target)?;
            println!("Opened {}", target);
        } else {
            println!("Result: {}", target);
        }
        Ok(())
    }
}

/// Main interactive menu: one entry per conversion, plus a free tag and
/// "Exit". Loops until the user exits.
pub fn main_menu(api: &ApiClient, frontend: &dyn Frontend) -> Result<()> {
    let mut items: Vec<String> = ConversionType::KNOWN.iter().map(|t| t.label()).collect();
    items.push("Other file".into());
    items.push("Exit".into());
    let other = ConversionType::KNOWN.len();

    println!("Converting through {}", api.base_url());
    loop {
        // `Select` shows a keyboard-navigable list in the terminal.
        let selection = Select::new()
            .with_prompt("Choose a conversion")
            .items(&items)
            .default(0)
            .interact()?;
        let ty = if selection < other {
            ConversionType::KNOWN[selection].clone()
        } else if selection == other {
            let tag: String = Input::new().with_prompt("Conversion type").interact_text()?;
            match tag.trim().parse::<ConversionType>() {
                Ok(ty) => ty,
                Err(e) => {
                    frontend.alert(AlertLevel::Error, &e.to_string());
                    continue;
                }
            }
        } else {
            break;
        };
        select_conversion(api, frontend, &ty);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conversions_exit_cleanly() {
        let converted = Report::Converted { opened: None };
        assert!(converted.is_success());
        assert_eq!(converted.exit_code(), 0);
        assert_eq!(
            Report::Converted { opened: Some("http://localhost:5000/a.pdf".into()) }.exit_code(),
            0
        );
        for report in [Report::NoFile, Report::Rejected, Report::Failed] {
            assert!(!report.is_success());
            assert_eq!(report.exit_code(), 1);
        }
    }

    #[test]
    fn urls_are_kept() {
        assert_eq!(
            resolve_result_target("http://localhost:5000", "https://cdn.example.com/a.pdf"),
            "https://cdn.example.com/a.pdf"
        );
    }

    #[test]
    fn server_paths_are_joined_to_base() {
        assert_eq!(
            resolve_result_target("http://localhost:5000", "/static/pdf/definitely-missing-xyz.pdf"),
            "http://localhost:5000/static/pdf/definitely-missing-xyz.pdf"
        );
        assert_eq!(
            resolve_result_target("http://localhost:5000", "static/pdf/missing-xyz.pdf"),
            "http://localhost:5000/static/pdf/missing-xyz.pdf"
        );
    }

    #[test]
    fn existing_local_paths_are_kept() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        assert_eq!(resolve_result_target("http://localhost:5000", &path), path);
    }
}
