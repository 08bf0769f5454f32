//! Terminal driver — stdin/stdout REPL over the app shell for local testing.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{App, user_message};
use crate::backend::{Credentials, PhotoFile};
use crate::navigation::ViewSelection;
use crate::wizard::{FieldMap, UploadOutcome, WizardSnapshot};

const HELP: &str = "\
Commands:
  go <path>                 navigate
  login <email> <password>  log in
  logout                    log out
  set <key> <value>         edit a field of the current form step
  next [key=value ...]      validate this step and continue
  upload <file>             upload a photo for the current step
  submit                    publish the finished form
  whoami                    show the logged-in user
  reload                    re-read the stored session
  quit                      exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Go(String),
    Login { email: String, password: String },
    Logout,
    Set { key: String, value: Value },
    Next(FieldMap),
    Upload(PathBuf),
    Submit,
    WhoAmI,
    Reload,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "go" if !rest.is_empty() => Ok(Self::Go(rest.to_string())),
            "go" => Err("usage: go <path>".into()),
            "login" => match rest.split_whitespace().collect::<Vec<_>>()[..] {
                [email, password] => Ok(Self::Login {
                    email: email.to_string(),
                    password: password.to_string(),
                }),
                _ => Err("usage: login <email> <password>".into()),
            },
            "logout" => Ok(Self::Logout),
            "set" => match rest.split_once(char::is_whitespace) {
                Some((key, value)) => Ok(Self::Set {
                    key: key.to_string(),
                    value: parse_value(value.trim()),
                }),
                None => Err("usage: set <key> <value>".into()),
            },
            "next" => {
                let mut fields = FieldMap::new();
                for pair in rest.split_whitespace() {
                    let (key, value) = pair
                        .split_once('=')
                        .ok_or_else(|| format!("expected key=value, got {pair:?}"))?;
                    fields.insert(key.to_string(), parse_value(value));
                }
                Ok(Self::Next(fields))
            }
            "upload" if !rest.is_empty() => Ok(Self::Upload(PathBuf::from(rest))),
            "upload" => Err("usage: upload <file>".into()),
            "submit" => Ok(Self::Submit),
            "whoami" => Ok(Self::WhoAmI),
            "reload" => Ok(Self::Reload),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "/quit" => Ok(Self::Quit),
            other => Err(format!("unknown command {other:?}, try 'help'")),
        }
    }
}

/// Bare words become strings; anything that parses as JSON keeps its type.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Guess an upload's content type from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

pub struct Cli {
    app: App,
}

impl Cli {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Read commands from stdin until EOF or `quit`.
    pub async fn run(&self) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        eprintln!("{}", self.describe_view().await);
        eprint!("> ");

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        eprint!("> ");
                        continue;
                    }
                    match Command::parse(&line) {
                        Ok(Command::Quit) => break,
                        Ok(command) => println!("\n{}\n", self.execute(command).await),
                        Err(usage) => eprintln!("{usage}"),
                    }
                    eprint!("> ");
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    }

    /// Run one command and render its result.
    pub async fn execute(&self, command: Command) -> String {
        match command {
            Command::Go(path) => {
                self.app.navigate(&path).await;
                self.describe_view().await
            }
            Command::Login { email, password } => {
                match self.app.login(Credentials::new(email, password)).await {
                    Ok(_) => self.describe_view().await,
                    Err(e) => format!("Login failed: {}", user_message(&e)),
                }
            }
            Command::Logout => {
                self.app.logout().await;
                self.describe_view().await
            }
            Command::Set { key, value } => match self.app.update_field(&key, value).await {
                Ok(wizard) => describe_wizard(&wizard),
                Err(e) => user_message(&e),
            },
            Command::Next(fields) => match self.app.advance(fields).await {
                Ok(wizard) => describe_wizard(&wizard),
                Err(e) => user_message(&e),
            },
            Command::Upload(path) => self.upload(&path).await,
            Command::Submit => match self.app.submit_wizard().await {
                Ok(receipt) => format!("Published as {}\n{}", receipt.id, self.describe_view().await),
                Err(e) => format!("Could not publish: {}", user_message(&e)),
            },
            Command::WhoAmI => match self.app.session().await {
                Some(session) => format!("{} ({}, {})", session.display_name, session.user_id, session.role),
                None => "Not logged in".to_string(),
            },
            Command::Reload => {
                self.app.reload_session().await;
                self.describe_view().await
            }
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        }
    }

    async fn upload(&self, path: &Path) -> String {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => return format!("Cannot read {}: {e}", path.display()),
        };
        let file = PhotoFile {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "photo".to_string()),
            content_type: content_type_for(path).to_string(),
            bytes,
        };

        eprintln!("⏳ Uploading {}...", file.file_name);
        match self.app.upload_photo(file).await {
            Ok(UploadOutcome::Advanced { .. }) => match self.app.wizard().await {
                Some(wizard) => format!("✅ Uploaded\n{}", describe_wizard(&wizard)),
                None => "✅ Uploaded".to_string(),
            },
            Ok(UploadOutcome::Failed { message }) => format!("❌ Upload failed: {message}"),
            Ok(UploadOutcome::Stale) => "Upload finished after the form was closed".to_string(),
            Err(e) => user_message(&e),
        }
    }

    async fn describe_view(&self) -> String {
        let snapshot = self.app.snapshot().await;
        let mut out = match &snapshot.selection {
            ViewSelection::Render {
                layout,
                view,
                params,
            } => {
                let mut line = format!("[{layout:?}] {view} at {}", snapshot.path);
                if !params.is_empty() {
                    if let Ok(json) = serde_json::to_string(params) {
                        line.push_str(&format!(" {json}"));
                    }
                }
                line
            }
            ViewSelection::RedirectToLogin { return_to } => {
                format!("Please log in to continue to {return_to}")
            }
        };
        if let Some(ref wizard) = snapshot.wizard {
            out.push('\n');
            out.push_str(&describe_wizard(wizard));
        }
        out
    }
}

fn describe_wizard(wizard: &WizardSnapshot) -> String {
    let mut out = format!(
        "Step {}/{}: {}",
        wizard.step, wizard.total_steps, wizard.step_title
    );
    if !wizard.accumulated.is_empty() {
        if let Ok(json) = serde_json::to_string(&wizard.accumulated) {
            out.push_str(&format!("\n  so far: {json}"));
        }
    }
    if let Some(ref error) = wizard.error {
        out.push_str(&format!("\n  ⚠️  {error}"));
    }
    out
}
