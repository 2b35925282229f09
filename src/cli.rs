//! Command line front end
//!
//! ```text
//! wikihouse make <model.json> [--format svg|dxf] [--out PATH] [--settings FILE] [--no-rotate] [--skip-invalid]
//! wikihouse preview <model.json> [--format svg|dxf] [--settings FILE] [--no-rotate] [--skip-invalid]
//! wikihouse settings show [--settings FILE] [--defaults] [--unit mm|in]
//! wikihouse settings set KEY=VALUE... [--settings FILE] [--unit mm|in]
//! ```

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use wikihouse_core::{format_length, parse_length, DisplayUnit, Length};
use wikihouse_fabricate::{
    default_output_path, Fabricator, GeometryPolicy, Mode, ModelDocument, OutputFormat,
    RotationPolicy,
};
use wikihouse_settings::{
    default_settings_path, SettingKey, SettingsController, SettingsError, SettingsSource,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Make {
        model: PathBuf,
        out: Option<PathBuf>,
    },
    Preview {
        model: PathBuf,
    },
    SettingsShow {
        defaults: bool,
    },
    SettingsSet {
        assignments: Vec<(String, String)>,
    },
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub command: Command,
    pub format: Option<OutputFormat>,
    pub settings: Option<PathBuf>,
    pub rotation: RotationPolicy,
    pub geometry_policy: GeometryPolicy,
    pub unit: DisplayUnit,
}

pub fn usage() -> &'static str {
    "Usage:
  wikihouse make <model.json> [--format svg|dxf] [--out PATH] [--settings FILE] [--no-rotate] [--skip-invalid]
  wikihouse preview <model.json> [--format svg|dxf] [--settings FILE] [--no-rotate] [--skip-invalid]
  wikihouse settings show [--settings FILE] [--defaults] [--unit mm|in]
  wikihouse settings set KEY=VALUE... [--settings FILE] [--unit mm|in]

Settings keys: sheet_height sheet_width sheet_depth padding margin font_height
"
}

fn value<'a>(it: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a String> {
    it.next()
        .with_context(|| format!("{flag} needs a value\n\n{}", usage()))
}

/// Parse `argv` (including the program name)
pub fn parse_args(argv: &[String]) -> Result<Args> {
    let mut format = None;
    let mut settings = None;
    let mut out = None;
    let mut rotation = RotationPolicy::Auto;
    let mut geometry_policy = GeometryPolicy::Abort;
    let mut unit = DisplayUnit::Millimeters;
    let mut defaults = false;
    let mut positional: Vec<&String> = Vec::new();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => positional.insert(0, a),
            "--version" | "-V" => positional.insert(0, a),
            "--format" => {
                let v = value(&mut it, "--format")?;
                format = Some(v.parse::<OutputFormat>().map_err(anyhow::Error::msg)?);
            }
            "--out" | "-o" => out = Some(PathBuf::from(value(&mut it, "--out")?)),
            "--settings" => settings = Some(PathBuf::from(value(&mut it, "--settings")?)),
            "--unit" => unit = value(&mut it, "--unit")?.parse()?,
            "--no-rotate" => rotation = RotationPolicy::None,
            "--skip-invalid" => geometry_policy = GeometryPolicy::Skip,
            "--defaults" => defaults = true,
            flag if flag.starts_with('-') => bail!("unknown option: {flag}\n\n{}", usage()),
            _ => positional.push(a),
        }
    }

    let words: Vec<&str> = positional.iter().map(|s| s.as_str()).collect();
    let command = match words.as_slice() {
        [] | ["--help" | "-h", ..] | ["help", ..] => Command::Help,
        ["--version" | "-V", ..] => Command::Version,
        ["make", model] => Command::Make {
            model: PathBuf::from(model),
            out,
        },
        ["preview", model] => Command::Preview {
            model: PathBuf::from(model),
        },
        ["settings", "show"] | ["settings"] => Command::SettingsShow { defaults },
        ["settings", "set", rest @ ..] if !rest.is_empty() => Command::SettingsSet {
            assignments: rest
                .iter()
                .map(|kv| {
                    kv.split_once('=')
                        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                        .with_context(|| format!("expected KEY=VALUE, got '{kv}'"))
                })
                .collect::<Result<_>>()?,
        },
        _ => bail!("unrecognised command\n\n{}", usage()),
    };

    Ok(Args {
        command,
        format,
        settings,
        rotation,
        geometry_policy,
        unit,
    })
}

fn open_settings(path: Option<&Path>) -> Result<SettingsController> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_settings_path()?,
    };
    debug!(path = %path.display(), "Using settings file");
    SettingsController::open(&path)
        .with_context(|| format!("failed to read settings from {}", path.display()))
}

fn fabricator(args: &Args, store: &SettingsController, format: OutputFormat) -> Fabricator {
    Fabricator::new(store.settings().clone())
        .with_format(format)
        .with_rotation(args.rotation)
        .with_geometry_policy(args.geometry_policy)
}

fn load_model(path: &Path) -> Result<ModelDocument> {
    ModelDocument::load(path).with_context(|| format!("failed to load model {}", path.display()))
}

fn print_settings(
    out: &mut dyn Write,
    values: &BTreeMap<String, f64>,
    unit: DisplayUnit,
) -> Result<()> {
    for key in SettingKey::ALL {
        if let Some(v) = values.get(key.as_str()) {
            let text = format_length(Length::new(*v, unit), unit);
            let note = if key.is_derived() { "  (derived)" } else { "" };
            writeln!(out, "{:<20} {text} {}{note}", key.as_str(), unit.label())?;
        }
    }
    Ok(())
}

/// Run the command line with `argv`, writing user output to `out`
pub fn run(argv: &[String], out: &mut dyn Write) -> Result<()> {
    let args = parse_args(argv)?;

    match &args.command {
        Command::Help => write!(out, "{}", usage())?,
        Command::Version => writeln!(
            out,
            "wikihouse {} ({})",
            crate::VERSION,
            crate::BUILD_DATE
        )?,
        Command::Make { model, out: target } => {
            let store = open_settings(args.settings.as_deref())?;
            let doc = load_model(model)?;
            let format = args
                .format
                .or_else(|| target.as_deref().and_then(OutputFormat::from_path))
                .unwrap_or_default();
            let path = target
                .clone()
                .unwrap_or_else(|| default_output_path(model, &doc.title, format));

            let run = fabricator(&args, &store, format).run(&doc.entities, Mode::Save { path })?;
            let report = &run.report;
            writeln!(
                out,
                "Wrote {} ({} panels on {} sheets, {:.1}% material use)",
                run.path().map(Path::display).map(|d| d.to_string()).unwrap_or_default(),
                report.panels,
                report.sheets,
                report.utilisation * 100.0
            )?;
            for skipped in &report.skipped {
                writeln!(out, "Skipped {skipped}")?;
            }
        }
        Command::Preview { model } => {
            let store = open_settings(args.settings.as_deref())?;
            let doc = load_model(model)?;
            let format = args.format.unwrap_or_default();
            let run = fabricator(&args, &store, format).run(&doc.entities, Mode::Preview)?;
            out.write_all(run.bytes().unwrap_or_default())?;
        }
        Command::SettingsShow { defaults } => {
            let store = open_settings(args.settings.as_deref())?;
            let source = if *defaults {
                SettingsSource::Default
            } else {
                SettingsSource::Current
            };
            print_settings(out, &store.fetch(source, args.unit), args.unit)?;
        }
        Command::SettingsSet { assignments } => {
            let mut store = open_settings(args.settings.as_deref())?;
            let mut values = BTreeMap::new();
            for (key, text) in assignments {
                let key: SettingKey = key.parse()?;
                let length = parse_length(text, args.unit).map_err(|source| {
                    SettingsError::InvalidValue {
                        key: key.to_string(),
                        source,
                    }
                })?;
                values.insert(key.to_string(), length.to(args.unit));
            }
            store.update(&values, args.unit)?;
            store.save()?;
            print_settings(out, &store.fetch(SettingsSource::Current, args.unit), args.unit)?;
        }
    }

    Ok(())
}
