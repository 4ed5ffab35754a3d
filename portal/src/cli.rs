use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use portal_prefs::{
    Environment, EnvironmentSignals, FileStorage, MemoryEnvironment,
    PreferencesError, PreferencesStore, PresetId, Prompt, ScriptedPrompt,
    SettingKey, SettingValue, Storage,
};

use crate::config;
use crate::output;
use crate::prompt::TerminalPrompt;

/// Manage dashboard preferences of the student portal.
#[derive(Debug, Parser)]
#[command(name = "portal", version, about)]
pub(crate) struct Cli {
    /// Preferences file; defaults to ~/.config/portal/preferences.json.
    #[arg(long, global = true, env = "PORTAL_PREFERENCES_PATH")]
    pub(crate) storage: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) signals: SignalArgs,
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Host signals normally supplied by the browser or desktop shell.
#[derive(Debug, Clone, Args)]
pub(crate) struct SignalArgs {
    /// Pretend the system prefers a dark color scheme.
    #[arg(long, global = true)]
    pub(crate) prefers_dark: bool,
    /// Pretend the system asks for reduced motion.
    #[arg(long, global = true)]
    pub(crate) reduced_motion: bool,
    /// Viewport width in pixels used for breakpoint flags.
    #[arg(long, global = true)]
    pub(crate) viewport_width: Option<u32>,
}

impl SignalArgs {
    pub(crate) fn to_signals(&self) -> EnvironmentSignals {
        let defaults = EnvironmentSignals::default();
        EnvironmentSignals {
            prefers_dark: self.prefers_dark,
            reduced_motion: self.reduced_motion,
            viewport_width: self
                .viewport_width
                .unwrap_or(defaults.viewport_width),
        }
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print every setting with its current value.
    Show,
    /// Print a single setting.
    Get { name: String },
    /// Change a single setting.
    Set { name: String, value: String },
    /// Restore every setting to its default.
    Reset {
        /// Skip the confirmation question.
        #[arg(long)]
        yes: bool,
    },
    /// Manage saved theme presets.
    #[command(subcommand)]
    Themes(ThemesCommand),
    /// Print all settings as a JSON object.
    Export,
    /// Apply settings from a JSON object file.
    Import { path: PathBuf },
    /// Print the resolved style variables and classes.
    Projection,
}

#[derive(Debug, Subcommand)]
pub(crate) enum ThemesCommand {
    List,
    /// Save the current look as a new preset.
    Save {
        /// Preset name; asked interactively when omitted.
        #[arg(long)]
        name: Option<String>,
    },
    Apply { id: String },
    Delete { id: String },
}

pub(crate) fn run(cli: Cli) -> Result<()> {
    let path = config::storage_path(cli.storage);
    log::debug!("using preferences file {}", path.display());

    let mut store = PreferencesStore::new(
        FileStorage::new(&path),
        MemoryEnvironment::new(),
    );
    store.set_signals(cli.signals.to_signals());
    store.hydrate();

    let stdout = io::stdout();
    let outcome = execute(&mut store, cli.command, &mut stdout.lock());
    let written = store.close();
    log::debug!("flushed {written} preference writes");
    outcome
}

pub(crate) fn execute<S, E, W>(
    store: &mut PreferencesStore<S, E>,
    command: Command,
    out: &mut W,
) -> Result<()>
where
    S: Storage,
    E: Environment,
    W: Write,
{
    match command {
        Command::Show => output::write_settings(out, store.preferences())?,
        Command::Get { name } => {
            let key = setting_key(&name)?;
            writeln!(out, "{}", store.get(key))?;
        },
        Command::Set { name, value } => {
            let key = setting_key(&name)?;
            let value = SettingValue::parse_for(key, &value)?;
            store.set(key, value)?;
            writeln!(out, "{} = {}", key, store.get(key))?;
        },
        Command::Reset { yes } => {
            let mut prompt = prompt_for(yes.then(ScriptedPrompt::confirming));
            if store.reset_to_defaults(prompt.as_mut()) {
                writeln!(out, "preferences reset to defaults")?;
            } else {
                writeln!(out, "reset cancelled")?;
            }
        },
        Command::Themes(command) => execute_themes(store, command, out)?,
        Command::Export => {
            let payload =
                serde_json::to_string_pretty(&store.export_settings())?;
            writeln!(out, "{payload}")?;
        },
        Command::Import { path } => {
            let raw = fs::read_to_string(&path).with_context(|| {
                format!("failed to read {}", path.display())
            })?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| {
                    format!("failed to parse {}", path.display())
                })?;
            let applied = store.import_settings(&value)?;
            writeln!(out, "imported {applied} settings")?;
        },
        Command::Projection => output::write_projection(
            out,
            store.projection(),
            store.signals(),
        )?,
    }

    Ok(())
}

fn execute_themes<S, E, W>(
    store: &mut PreferencesStore<S, E>,
    command: ThemesCommand,
    out: &mut W,
) -> Result<()>
where
    S: Storage,
    E: Environment,
    W: Write,
{
    match command {
        ThemesCommand::List => output::write_themes(out, store.themes())?,
        ThemesCommand::Save { name } => {
            let mut prompt = prompt_for(name.map(ScriptedPrompt::named));
            match store.save_current_theme(prompt.as_mut()) {
                Some(id) => writeln!(out, "saved theme {id}")?,
                None => writeln!(out, "no theme saved")?,
            }
        },
        ThemesCommand::Apply { id } => {
            let id = PresetId::new(id);
            if store.apply_theme(&id) {
                writeln!(out, "applied theme {id}")?;
            } else {
                writeln!(out, "no saved theme with id {id}")?;
            }
        },
        ThemesCommand::Delete { id } => {
            let id = PresetId::new(id);
            if store.delete_theme(&id) {
                writeln!(out, "deleted theme {id}")?;
            } else {
                writeln!(out, "no saved theme with id {id}")?;
            }
        },
    }

    Ok(())
}

fn setting_key(name: &str) -> Result<SettingKey, PreferencesError> {
    SettingKey::from_name(name)
        .ok_or_else(|| PreferencesError::UnknownSetting(name.to_string()))
}

fn prompt_for(scripted: Option<ScriptedPrompt>) -> Box<dyn Prompt> {
    match scripted {
        Some(prompt) => Box::new(prompt),
        None => Box::new(TerminalPrompt),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use portal_prefs::{
        ColorScheme, MemoryEnvironment, MemoryStorage, PreferencesStore,
        SequentialIds,
    };

    use super::{Cli, Command, ThemesCommand, execute};

    fn run_command(
        store: &mut PreferencesStore<MemoryStorage, MemoryEnvironment>,
        args: &[&str],
    ) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(args).expect("arguments should parse");
        let mut out = Vec::new();
        execute(store, cli.command, &mut out)?;
        Ok(String::from_utf8(out).expect("output should be utf-8"))
    }

    fn memory_store() -> PreferencesStore<MemoryStorage, MemoryEnvironment> {
        PreferencesStore::load(MemoryStorage::new(), MemoryEnvironment::new())
            .with_id_generator(SequentialIds::default())
    }

    #[test]
    fn given_global_flags_when_parsed_then_signals_are_resolved() {
        let cli = Cli::try_parse_from([
            "portal",
            "projection",
            "--prefers-dark",
            "--viewport-width",
            "700",
            "--storage",
            "/tmp/prefs.json",
        ])
        .expect("arguments should parse");

        let signals = cli.signals.to_signals();
        assert!(signals.prefers_dark);
        assert!(!signals.reduced_motion);
        assert_eq!(signals.viewport_width, 700);
        assert_eq!(cli.storage, Some(PathBuf::from("/tmp/prefs.json")));
        assert!(matches!(cli.command, Command::Projection));
    }

    #[test]
    fn given_themes_save_without_name_when_parsed_then_name_is_none() {
        let cli = Cli::try_parse_from(["portal", "themes", "save"])
            .expect("arguments should parse");

        assert!(matches!(
            cli.command,
            Command::Themes(ThemesCommand::Save { name: None })
        ));
    }

    #[test]
    fn given_set_command_when_executed_then_store_changes() {
        let mut store = memory_store();

        let output =
            run_command(&mut store, &["portal", "set", "colorScheme", "dark"])
                .expect("set should succeed");

        assert_eq!(output, "colorScheme = dark\n");
        assert_eq!(store.preferences().color_scheme(), ColorScheme::Dark);
        assert_eq!(store.pending_writes(), 1);
    }

    #[test]
    fn given_out_of_range_value_when_set_then_error_and_store_unchanged() {
        let mut store = memory_store();

        let result =
            run_command(&mut store, &["portal", "set", "fontSize", "40"]);

        assert!(result.is_err());
        assert_eq!(store.preferences().font_size(), 16);
        assert_eq!(store.pending_writes(), 0);
    }

    #[test]
    fn given_unknown_setting_when_get_then_error_names_it() {
        let mut store = memory_store();

        let err = run_command(&mut store, &["portal", "get", "wallpaper"])
            .expect_err("unknown settings are rejected");

        assert!(err.to_string().contains("wallpaper"));
    }

    #[test]
    fn given_named_save_when_listed_then_theme_is_shown() {
        let mut store = memory_store();
        run_command(&mut store, &["portal", "set", "accentColor", "#ff0000"])
            .expect("set should succeed");

        let saved = run_command(
            &mut store,
            &["portal", "themes", "save", "--name", "Exam week"],
        )
        .expect("save should succeed");
        let listed = run_command(&mut store, &["portal", "themes", "list"])
            .expect("list should succeed");

        assert_eq!(saved, "saved theme theme-1\n");
        assert!(listed.contains("theme-1"));
        assert!(listed.contains("Exam week"));
        assert!(listed.contains("#ff0000"));
    }

    #[test]
    fn given_missing_theme_when_applied_or_deleted_then_notice_only() {
        let mut store = memory_store();
        store.set_color_scheme(ColorScheme::Dark);

        let applied =
            run_command(&mut store, &["portal", "themes", "apply", "nope"])
                .expect("unknown ids are not an error");
        let deleted =
            run_command(&mut store, &["portal", "themes", "delete", "nope"])
                .expect("unknown ids are not an error");

        assert_eq!(applied, "no saved theme with id nope\n");
        assert_eq!(deleted, "no saved theme with id nope\n");
        assert_eq!(store.preferences().color_scheme(), ColorScheme::Dark);
    }

    #[test]
    fn given_reset_with_yes_when_executed_then_defaults_return() {
        let mut store = memory_store();
        store.set_color_scheme(ColorScheme::Dark);

        let output = run_command(&mut store, &["portal", "reset", "--yes"])
            .expect("reset should succeed");

        assert_eq!(output, "preferences reset to defaults\n");
        assert_eq!(store.preferences().color_scheme(), ColorScheme::System);
    }

    #[test]
    fn given_export_when_executed_then_json_has_every_setting() {
        let mut store = memory_store();

        let output = run_command(&mut store, &["portal", "export"])
            .expect("export should succeed");
        let value: serde_json::Value =
            serde_json::from_str(&output).expect("export should be json");

        assert_eq!(value["colorScheme"], "system");
        assert_eq!(value["sidebarWidth"], 280);
        assert_eq!(value["animationsEnabled"], true);
    }
}
