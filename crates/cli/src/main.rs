// facetbar CLI - faceted search over CSV/JSON tables, headless

mod chip_args;
mod exit_codes;
mod input;
mod replay;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use facetbar_config::Settings;
use facetbar_engine::{FacetSession, MemoryTable, Row, SessionOptions, Suggestion, ValueIndex};

use exit_codes::{EXIT_ERROR, EXIT_INPUT_PARSE, EXIT_SCRIPT, EXIT_SUCCESS, EXIT_USAGE};
use input::Format;

#[derive(Parser)]
#[command(name = "facetbar")]
#[command(about = "Faceted search over tabular data: value index, suggestions, chip filters")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (defaults to the per-user settings.json)
    #[arg(long, env = "FACETBAR_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads a table.
#[derive(clap::Args)]
struct TableArgs {
    /// Input file (CSV, TSV or JSON array of objects)
    file: PathBuf,

    /// Input format (inferred from the extension when omitted)
    #[arg(long, short = 'f')]
    from: Option<Format>,

    /// Parse numbers and booleans in CSV/TSV cells
    #[arg(long)]
    infer: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the distinct values of every column, with row counts
    #[command(after_help = "\
Examples:
  facetbar index stocks.csv
  facetbar index stocks.json --json | jq '.columns.sector'")]
    Index {
        #[command(flatten)]
        table: TableArgs,

        /// Apply chips before indexing. Repeatable.
        #[arg(long, value_name = "CHIP")]
        chip: Vec<String>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Print grouped suggestions for partial input
    #[command(after_help = "\
Examples:
  facetbar suggest stocks.csv mo
  facetbar suggest stocks.csv mo --chip sector=Auto
  facetbar suggest stocks.csv te --json")]
    Suggest {
        #[command(flatten)]
        table: TableArgs,

        /// Text typed into the search input
        text: String,

        /// Chip applied before suggesting. COL=VALUE for a known column, else global text. Repeatable.
        #[arg(long, value_name = "CHIP")]
        chip: Vec<String>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the rows that pass the chips
    #[command(after_help = "\
Examples:
  facetbar filter stocks.csv --chip sector=Auto
  facetbar filter stocks.csv --chip sector=Auto --chip sector=Tech
  facetbar filter stocks.csv --chip ford --json")]
    Filter {
        #[command(flatten)]
        table: TableArgs,

        /// Chip to apply. COL=VALUE for a known column, else global text. Repeatable.
        #[arg(long, value_name = "CHIP")]
        chip: Vec<String>,

        /// Output JSON instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// Replay a JSON event script through a session
    #[command(after_help = "\
Examples:
  facetbar replay stocks.csv script.json
  facetbar replay stocks.csv script.json --verify
  facetbar replay stocks.csv script.json --json | jq '.steps[-1]'")]
    Replay {
        #[command(flatten)]
        table: TableArgs,

        /// Event script ({\"steps\": [...]})
        script: PathBuf,

        /// Fail if the final state disagrees with the script's "expect" block
        #[arg(long)]
        verify: bool,

        /// Output JSON transcript
        #[arg(long)]
        json: bool,

        /// Only print the final step
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Show the settings file location and effective settings
    Config {
        /// Write the effective settings back to the settings file
        #[arg(long)]
        write: bool,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("FACETBAR_GIT_HASH"), ")",
        "\nengine:  facetbar-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("FACETBAR_TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_settings(cli.settings.as_deref()).and_then(|settings| match cli.command {
        Commands::Index { table, chip, json } => cmd_index(&settings, table, chip, json),
        Commands::Suggest { table, text, chip, json } => {
            cmd_suggest(&settings, table, text, chip, json)
        }
        Commands::Filter { table, chip, json } => cmd_filter(&settings, table, chip, json),
        Commands::Replay { table, script, verify, json, quiet } => {
            cmd_replay(&settings, table, script, verify, json, quiet)
        }
        Commands::Config { write, json } => {
            cmd_config(&settings, cli.settings.as_deref(), write, json)
        }
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT_PARSE, message: msg.into(), hint: None }
    }

    pub fn script(msg: impl Into<String>) -> Self {
        Self { code: EXIT_SCRIPT, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => std::env::var("FACETBAR_LOG")
            .ok()
            .and_then(|s| s.parse::<log::LevelFilter>().ok())
            .unwrap_or(log::LevelFilter::Warn),
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(io::stderr())
        .apply();

    if let Err(e) = result {
        eprintln!("warning: logging disabled: {}", e);
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Settings::load_from(path).map_err(|e| CliError::args(e.to_string())),
        None => Ok(Settings::load()),
    }
}

fn session_options(settings: &Settings) -> SessionOptions {
    SessionOptions {
        commit_on_enter: settings.commit_on_enter,
        commit_on_blur: settings.commit_on_blur,
        backspace_removes_last: settings.backspace_removes_last,
    }
}

/// Load the table and open a session with the `--chip` arguments applied.
fn open_session(
    settings: &Settings,
    table: &TableArgs,
    chip_args: &[String],
) -> Result<FacetSession<MemoryTable>, CliError> {
    let rows = input::load_rows(&table.file, table.from, table.infer || settings.infer_types)?;
    let columns = input::column_order(&rows);
    let chips = chip_args::parse_chips(chip_args, &columns)?;

    let mut session = FacetSession::new(MemoryTable::new(rows), session_options(settings));
    warn_unmatched_chips(session.index(), &chips);
    if !chips.is_empty() {
        session.replace_chips(chips);
    }
    Ok(session)
}

/// Column chips whose value no row holds can only hide everything.
fn warn_unmatched_chips(index: &ValueIndex, chips: &[Suggestion]) {
    for chip in chips.iter().filter(|c| !c.is_global()) {
        if index.has_column(chip.column_name()) && !index.contains(chip.column_name(), chip.value()) {
            log::warn!("no row has {}", chip);
        }
    }
}

fn chip_label(chip: &Suggestion, settings: &Settings) -> String {
    if chip.is_global() {
        format!("{}: \"{}\"", settings.global_label(), chip.value())
    } else {
        chip.to_string()
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::io(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_index(settings: &Settings, table: TableArgs, chips: Vec<String>, json: bool) -> Result<(), CliError> {
    let session = open_session(settings, &table, &chips)?;
    let index = session.index();

    if json {
        return print_json(&index_to_json(index));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_index(&mut out, index, settings).map_err(|e| CliError::io(e.to_string()))
}

fn index_to_json(index: &ValueIndex) -> serde_json::Value {
    let columns: serde_json::Map<String, serde_json::Value> = index
        .columns()
        .map(|column| {
            let entries: Vec<serde_json::Value> = index
                .entries(column)
                .into_iter()
                .map(|entry| serde_json::json!({"value": entry.value, "count": entry.count}))
                .collect();
            (column.to_string(), serde_json::Value::Array(entries))
        })
        .collect();

    serde_json::json!({
        "rows": index.row_count(),
        "columns": columns,
    })
}

fn write_index<W: Write>(out: &mut W, index: &ValueIndex, settings: &Settings) -> io::Result<()> {
    writeln!(out, "{} row(s), {} column(s)", index.row_count(), index.column_count())?;
    for column in index.columns() {
        let entries = index.entries(column);
        writeln!(out, "{} ({} value(s))", column, entries.len())?;
        for entry in entries.iter().take(settings.max_visible) {
            if settings.show_counts {
                writeln!(out, "  {:<24} {}", entry.value, entry.count)?;
            } else {
                writeln!(out, "  {}", entry.value)?;
            }
        }
        if entries.len() > settings.max_visible {
            writeln!(out, "  ... {} more", entries.len() - settings.max_visible)?;
        }
    }
    Ok(())
}

fn cmd_suggest(
    settings: &Settings,
    table: TableArgs,
    text: String,
    chips: Vec<String>,
    json: bool,
) -> Result<(), CliError> {
    let mut session = open_session(settings, &table, &chips)?;
    session.text_changed(text.as_str());
    let groups = session.grouped_suggestions();

    if json {
        let value = serde_json::json!({
            "input": text,
            "chips": session.chips(),
            "free_text": groups.is_empty() && !text.is_empty(),
            "groups": groups,
        });
        return print_json(&value);
    }

    if groups.is_empty() {
        if !text.is_empty() {
            println!(
                "no matches; Enter would add {}",
                chip_label(&Suggestion::global(text.as_str()), settings)
            );
        }
        return Ok(());
    }

    let index = session.index();
    for group in &groups {
        println!("{}", group.column);
        for value in group.values.iter().take(settings.max_visible) {
            if settings.show_counts {
                println!("  {:<24} {}", value, index.count(&group.column, value));
            } else {
                println!("  {}", value);
            }
        }
        if group.values.len() > settings.max_visible {
            println!("  ... {} more", group.values.len() - settings.max_visible);
        }
    }
    Ok(())
}

fn cmd_filter(settings: &Settings, table: TableArgs, chips: Vec<String>, json: bool) -> Result<(), CliError> {
    let session = open_session(settings, &table, &chips)?;
    let rows: Vec<Row> = session.table().visible_rows();

    let spec = session.filter_spec();
    if spec.is_empty() {
        log::info!("no filters, all {} row(s) visible", rows.len());
    } else {
        log::info!(
            "{} column filter(s), {} global term(s): {} of {} row(s) visible{}",
            spec.column_filters.len(),
            spec.global_terms.len(),
            rows.len(),
            session.table().row_count(),
            if session.table().is_filtered() { "" } else { " (nothing hidden)" }
        );
    }

    if json {
        let value = serde_json::Value::Array(rows.iter().map(input::row_to_json).collect());
        return print_json(&value);
    }

    // Header comes from every row so an empty result is still valid CSV
    let columns = input::column_order(session.table().rows());
    let stdout = io::stdout();
    input::write_csv(stdout.lock(), &columns, &rows)
}

fn cmd_replay(
    settings: &Settings,
    table: TableArgs,
    script_path: PathBuf,
    verify: bool,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let script = replay::load_script(&script_path)?;
    let rows = input::load_rows(&table.file, table.from, table.infer || settings.infer_types)?;
    let result = replay::run_script(rows, &script, session_options(settings));

    if json {
        let value = serde_json::to_value(&result).map_err(|e| CliError::io(e.to_string()))?;
        print_json(&value)?;
    } else {
        let shown = if quiet {
            result.steps.len().saturating_sub(1)
        } else {
            0
        };
        for step in &result.steps[shown..] {
            let chips: Vec<String> = step.chips.iter().map(|c| chip_label(c, settings)).collect();
            println!(
                "{:>3}  visible={:<5} input={:?}  chips=[{}]",
                step.step,
                step.visible,
                step.input,
                chips.join(", ")
            );
        }
        if !quiet {
            println!(
                "{} step(s), {} session event(s): {} chip change(s), {} filter application(s), {} index rebuild(s)",
                result.steps.len(),
                result.events.total,
                result.events.chips_changed,
                result.events.filters_applied,
                result.events.index_rebuilt
            );
        }
    }

    if verify {
        if script.expect.is_none() {
            return Err(CliError::args("--verify needs an \"expect\" block in the script"));
        }
        if !result.verified() {
            return Err(CliError::script(format!(
                "replay verification failed: {}",
                result.mismatches.join("; ")
            )));
        }
        if !json {
            println!("verified");
        }
    }
    Ok(())
}

fn cmd_config(settings: &Settings, explicit: Option<&Path>, write: bool, json: bool) -> Result<(), CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Settings::config_path(),
    };
    if write {
        settings.save_to(&path).map_err(|e| CliError::io(e.to_string()))?;
        log::info!("wrote {}", path.display());
    }
    let path = path.display().to_string();

    if json {
        let value = serde_json::json!({
            "path": path,
            "settings": settings,
        });
        return print_json(&value);
    }

    println!("settings: {}", path);
    let value = serde_json::to_value(settings).map_err(|e| CliError::io(e.to_string()))?;
    if let serde_json::Value::Object(map) = value {
        for (key, value) in map {
            println!("  {:<28} {}", key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stocks() -> Vec<Row> {
        vec![
            Row::new().with("ticker", "F").with("sector", "Auto"),
            Row::new().with("ticker", "GM").with("sector", "Auto"),
            Row::new().with("ticker", "AAPL").with("sector", "Tech"),
        ]
    }

    #[test]
    fn test_write_index_caps_values() {
        let index = ValueIndex::build(&stocks());
        let settings = Settings { max_visible: 1, ..Settings::default() };
        let mut out = Vec::new();
        write_index(&mut out, &index, &settings).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("3 row(s), 2 column(s)\n"));
        assert!(text.contains("sector (2 value(s))"));
        // Most frequent value first
        assert!(text.contains("  Auto"));
        assert!(!text.contains("  Tech"));
        assert!(text.contains("... 1 more"));
    }

    #[test]
    fn test_index_json_shape() {
        let index = ValueIndex::build(&stocks());
        let value = index_to_json(&index);
        assert_eq!(value["rows"], 3);
        assert_eq!(value["columns"]["sector"][0], serde_json::json!({"value": "Auto", "count": 2}));
    }

    #[test]
    fn test_chip_label_uses_global_label() {
        let settings = Settings { global_label: "any".to_string(), ..Settings::default() };
        assert_eq!(chip_label(&Suggestion::global("x"), &settings), "any: \"x\"");
        assert_eq!(chip_label(&Suggestion::column("sector", "Auto"), &settings), "sector: Auto");
    }

    #[test]
    fn test_session_options_follow_settings() {
        let settings = Settings { commit_on_blur: false, ..Settings::default() };
        let options = session_options(&settings);
        assert!(!options.commit_on_blur);
        assert!(options.commit_on_enter);
    }
}
