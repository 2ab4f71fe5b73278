use std::io::{self, BufRead, Write};

use clap::{Args, Subcommand};

use crate::config::{Setting, StoredConfig, config_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring the Jira integration.");
    println!("Enter keeps the current value, '-' clears it.");
    println!("The token is stored in plain text in the config file.");
    println!();

    let mut prompter = Prompter {
        input: io::stdin().lock(),
        output: io::stdout(),
    };
    for setting in Setting::ALL {
        prompter.apply(&prompt_label(setting), cfg.slot_mut(setting), setting.is_secret())?;
    }

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    for line in describe(&cfg) {
        println!("{line}");
    }
    Ok(())
}

fn prompt_label(setting: Setting) -> String {
    match setting {
        Setting::Url => format!("{} (e.g., https://jira.example.com)", setting.label()),
        Setting::Token => format!("{} or password", setting.label()),
        _ => setting.label().to_string(),
    }
}

/// `label: value` lines, secrets masked, with the override variable named.
fn describe(cfg: &StoredConfig) -> Vec<String> {
    Setting::ALL
        .into_iter()
        .map(|setting| {
            let value = match cfg.get(setting) {
                value if setting.is_secret() => mask_secret(value),
                value => display_value(value).to_string(),
            };
            format!("{}: {value} (env {})", setting.label(), setting.env_var())
        })
        .collect()
}

/// Reads answers line by line; stdin/stdout in the wizard, buffers in tests.
struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn apply(&mut self, field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
        match self.ask(field, target.as_deref(), secret)? {
            PromptAction::Keep => {}
            PromptAction::Clear => *target = None,
            PromptAction::Set(value) => *target = Some(value),
        }
        Ok(())
    }

    fn ask(&mut self, field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
        match (current, secret) {
            (Some(_), true) => write!(self.output, "{field} [****] (Enter to keep, '-' to clear): ")?,
            (Some(value), false) => write!(
                self.output,
                "{field} [{value}] (Enter to keep, '-' to clear): "
            )?,
            (None, _) => write!(self.output, "{field} (Enter to skip): ")?,
        }
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(match line.trim() {
            "" => PromptAction::Keep,
            "-" => PromptAction::Clear,
            value => PromptAction::Set(value.to_string()),
        })
    }
}

const NOT_SET: &str = "<not set>";

fn display_value(value: Option<&str>) -> &str {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => NOT_SET,
    }
}

/// Keeps three characters on each side of secrets long enough to hide a middle.
fn mask_secret(value: Option<&str>) -> String {
    let Some(secret) = value.filter(|secret| !secret.is_empty()) else {
        return NOT_SET.to_string();
    };
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{head}***{tail}")
}

enum PromptAction {
    Keep,
    Clear,
    Set(String),
}
