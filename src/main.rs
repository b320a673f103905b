mod report;

use dermascribe::export::RoutineExport;
use dermascribe::rules::{defaults, glossary};
use dermascribe::{DEFAULT_RULES, LoadOptions, Product, RuleTable, analyze_verbose_with, routine};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DERMASCRIBE_LOG";

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(config) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).try_init();
}

fn run(config: CliConfig) -> Result<(), String> {
    let loaded;
    let rules: &RuleTable = match &config.rules_path {
        Some(path) => {
            let options = LoadOptions { strict: config.strict };
            loaded = RuleTable::from_path(path, &options).map_err(|err| format!("error: {err}"))?;
            &loaded
        }
        None => &DEFAULT_RULES,
    };

    let products = match config.mode {
        Mode::Glossary { query, concerns } => {
            let concerns: Vec<&str> = concerns.iter().map(String::as_str).collect();
            let hits = glossary::search(rules, &query, &concerns);
            if config.json {
                let keys: Vec<&str> = hits.iter().map(|p| p.key.as_str()).collect();
                println!("{}", serde_json::to_string_pretty(&keys).map_err(|err| format!("error: {err}"))?);
            } else {
                report::print_glossary(&hits, config.color);
            }
            return Ok(());
        }
        Mode::Sample => defaults::sample_routine(),
        Mode::Routine(source) => read_routine(&source)?,
    };

    if products.len() < 2 {
        tracing::warn!(products = products.len(), "routine has fewer than two products");
    }

    let res = analyze_verbose_with(&products, rules);

    if config.json {
        let json = serde_json::to_string_pretty(&res.analysis).map_err(|err| format!("error: {err}"))?;
        println!("{json}");
    } else {
        let details = config.verbose.then_some(&res.details);
        report::print_analysis(&res.analysis, details, config.color);
    }

    if let Some(path) = &config.export_path {
        let export = RoutineExport::new(&products, Some(res.analysis), chrono::Utc::now());
        let json = export.to_json_pretty().map_err(|err| format!("error: {err}"))?;
        std::fs::write(path, json).map_err(|err| format!("error: failed to write {}: {err}", path.display()))?;
        tracing::info!(path = %path.display(), "export written");
    }

    Ok(())
}

fn read_routine(source: &Source) -> Result<Vec<Product>, String> {
    let (text, origin) = match source {
        Source::File(path) => (
            std::fs::read_to_string(path).map_err(|err| format!("error: failed to read {}: {err}", path.display()))?,
            path.display().to_string(),
        ),
        Source::Stdin => (read_stdin_input()?, "stdin".to_string()),
    };
    if text.trim().is_empty() {
        return Err(format!("error: no routine in {origin}"));
    }
    routine::from_json_str(&text).map_err(|err| format!("error: invalid routine in {origin}: {err}"))
}

enum Source {
    File(PathBuf),
    Stdin,
}

enum Mode {
    Routine(Source),
    Sample,
    Glossary { query: String, concerns: Vec<String> },
}

struct CliConfig {
    mode: Mode,
    rules_path: Option<PathBuf>,
    strict: bool,
    json: bool,
    verbose: bool,
    export_path: Option<PathBuf>,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<PathBuf> = None;
    let mut sample = false;
    let mut glossary_query: Option<String> = None;
    let mut concerns: Vec<String> = Vec::new();
    let mut rules_path: Option<PathBuf> = None;
    let mut export_path: Option<PathBuf> = None;
    let mut strict = false;
    let mut json = false;
    let mut verbose = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("dermascribe {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--strict" => strict = true,
            "--json" => json = true,
            "--verbose" | "-v" => verbose = true,
            "--sample" => sample = true,
            "--rules" => rules_path = Some(PathBuf::from(expect_value(&mut args, "--rules")?)),
            "--export" => export_path = Some(PathBuf::from(expect_value(&mut args, "--export")?)),
            "--glossary" => glossary_query = Some(expect_value(&mut args, "--glossary")?),
            "--concern" => concerns.push(expect_value(&mut args, "--concern")?),
            "--input" | "-i" => set_input(expect_value(&mut args, "--input")?, &mut input)?,
            _ if arg.starts_with("--rules=") => rules_path = Some(PathBuf::from(arg.trim_start_matches("--rules="))),
            _ if arg.starts_with("--export=") => export_path = Some(PathBuf::from(arg.trim_start_matches("--export="))),
            _ if arg.starts_with("--glossary=") => {
                glossary_query = Some(arg.trim_start_matches("--glossary=").to_string())
            }
            _ if arg.starts_with("--concern=") => concerns.push(arg.trim_start_matches("--concern=").to_string()),
            _ if arg.starts_with("--input=") => {
                set_input(arg.trim_start_matches("--input=").to_string(), &mut input)?
            }
            "-" => set_input(arg, &mut input)?,
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => set_input(arg, &mut input)?,
        }
    }

    if !concerns.is_empty() && glossary_query.is_none() {
        glossary_query = Some(String::new());
    }

    let mode = match (glossary_query, sample, input) {
        (Some(query), false, None) => Mode::Glossary { query, concerns },
        (None, true, None) => Mode::Sample,
        (None, false, Some(path)) if path.as_os_str() == "-" => Mode::Routine(Source::Stdin),
        (None, false, Some(path)) => Mode::Routine(Source::File(path)),
        (None, false, None) => Mode::Routine(Source::Stdin),
        _ => return Err("error: --glossary, --sample and a routine input are mutually exclusive".to_string()),
    };

    if matches!(mode, Mode::Routine(Source::Stdin)) && io::stdin().is_terminal() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { mode, rules_path, strict, json, verbose, export_path, color })
}

fn set_input(value: String, input: &mut Option<PathBuf>) -> Result<(), String> {
    if input.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *input = Some(PathBuf::from(value));
    Ok(())
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("error: {flag} expects a value"))
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "dermascribe {version}

Skincare routine analyser: ingredient interactions, essential gaps and an
AM/PM application order.

Usage:
  dermascribe [OPTIONS] [<routine.json>]
  dermascribe [OPTIONS] --input <routine.json>
  dermascribe [OPTIONS] --sample
  dermascribe [OPTIONS] --glossary <query> [--concern <name>...]

The routine is a JSON array of products ({{name, brand, category,
ingredients}}) or an object with a \"products\" field, such as a previous
export. Reads stdin when no input is given; \"-\" also means stdin.

Options:
  -i, --input <path>         Routine JSON file.
  --sample                   Analyse the built-in sample routine.
  --rules <path>             Rule table JSON. Default: built-in table.
  --strict                   Reject rule tables with validation issues.
  --json                     Print the analysis as JSON.
  -v, --verbose              Also print per-product actives and timings.
  --export <path>            Write the routine and its analysis to <path>.
  --glossary <query>         Search ingredient profiles by key or name.
  --concern <name>           Only show profiles targeting <name> (repeatable).
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}            Log filter (tracing EnvFilter syntax). Default: warn

Exit codes:
  0  Success.
  1  Rule table, routine or I/O error.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV,
    )
}
