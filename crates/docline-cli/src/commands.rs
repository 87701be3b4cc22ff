use std::path::{Path as FsPath, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use docline_diff::{compute_diff, normalize, DiffOptions};
use docline_history::{Snapshot, VersionChain};
use docline_patch::{apply_change_sequence, decode_changes, encode_changes};
use docline_sdk::DoclineConfig;
use docline_types::{Change, DiffRecord, Op, Value};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Diff(args) => cmd_diff(args, format),
        Command::Apply(args) => cmd_apply(args),
        Command::Normalize(args) => cmd_normalize(args),
        Command::Replay(args) => cmd_replay(args, format),
        Command::Compare(args) => cmd_compare(args, format),
    }
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let changes = diff_files(&args)?;
    print_changes(&changes, format)
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let patched = apply_file(&args)?;
    println!("{}", serde_json::to_string_pretty(&patched)?);
    Ok(())
}

fn cmd_normalize(args: NormalizeArgs) -> anyhow::Result<()> {
    let normalized = normalize_file(&args)?;
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

fn cmd_replay(args: ReplayArgs, format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = replay_files(&args)?;
    match format {
        OutputFormat::Json => {
            let out = json!({"version": snapshot.version, "document": snapshot.document});
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!(
                "{} version {} ({} diffs applied)",
                "✓".green().bold(),
                snapshot.version.to_string().yellow(),
                snapshot.applied
            );
            println!("{}", serde_json::to_string_pretty(&snapshot.document)?);
        }
    }
    Ok(())
}

fn cmd_compare(args: CompareArgs, format: OutputFormat) -> anyhow::Result<()> {
    let changes = compare_files(&args)?;
    print_changes(&changes, format)
}

// ---- Operations ----

pub(crate) fn diff_files(args: &DiffArgs) -> anyhow::Result<Vec<Change>> {
    let options = diff_options(&args.settings)?;
    let old = read_json(&args.old)?;
    let new = read_json(&args.new)?;
    Ok(compute_diff(&old, &new, &options)?)
}

pub(crate) fn apply_file(args: &ApplyArgs) -> anyhow::Result<Value> {
    let target = read_json(&args.target)?;
    let changes = decode_changes(&read_json(&args.changes)?)
        .with_context(|| format!("decoding {}", args.changes.display()))?;
    debug!(changes = changes.len(), "applying change sequence");
    Ok(apply_change_sequence(&changes, &target)?)
}

pub(crate) fn normalize_file(args: &NormalizeArgs) -> anyhow::Result<Value> {
    let options = diff_options(&args.settings)?;
    let document = read_json(&args.document)?;
    Ok(normalize(&document, &options)?.to_value())
}

pub(crate) fn replay_files(args: &ReplayArgs) -> anyhow::Result<Snapshot> {
    let base = read_json(&args.base)?;
    let records = read_records(&args.diffs)?;
    let chain = VersionChain::new(&base, 0, &records)?;
    let version = args.at.unwrap_or_else(|| chain.head_version());
    Ok(chain.snapshot(version)?)
}

pub(crate) fn compare_files(args: &CompareArgs) -> anyhow::Result<Vec<Change>> {
    let options = diff_options(&args.settings)?;
    let base = read_json(&args.base)?;
    let records = read_records(&args.diffs)?;
    let chain = VersionChain::new(&base, 0, &records)?;
    Ok(chain.compare(args.from, args.to, &options)?)
}

// ---- Helpers ----

/// Config-file settings for `--type`, extended by any `--exclude` paths.
fn diff_options(settings: &DiffSettings) -> anyhow::Result<DiffOptions> {
    let config = match &settings.config {
        Some(path) => DoclineConfig::load(path)?,
        None => DoclineConfig::default(),
    };
    let mut options = match &settings.type_name {
        Some(type_name) => config.diff_options(type_name)?,
        None => DiffOptions::default(),
    };
    for raw in &settings.exclude {
        options.exclusions.insert_field_path(raw)?;
    }
    Ok(options)
}

fn read_json(path: &FsPath) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Each file is either a JSON array of changes, taking its position as the
/// version, or an object with `version` and `changes`.
fn read_records(paths: &[PathBuf]) -> anyhow::Result<Vec<DiffRecord>> {
    paths
        .iter()
        .enumerate()
        .map(|(index, path)| {
            let encoded = read_json(path)?;
            let (version, changes) = match &encoded {
                Value::Array(_) => (index as u64 + 1, &encoded),
                Value::Object(fields) => {
                    let Some(version) = fields.get("version").and_then(Value::as_u64) else {
                        bail!("{}: missing numeric \"version\"", path.display());
                    };
                    let Some(changes) = fields.get("changes") else {
                        bail!("{}: missing \"changes\"", path.display());
                    };
                    (version, changes)
                }
                _ => bail!("{}: expected a change array or diff record", path.display()),
            };
            let changes = decode_changes(changes)
                .with_context(|| format!("decoding {}", path.display()))?;
            Ok(DiffRecord::new(version, changes))
        })
        .collect()
}

fn print_changes(changes: &[Change], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&encode_changes(changes)?)?);
        }
        OutputFormat::Text if changes.is_empty() => println!("No changes."),
        OutputFormat::Text => {
            for change in changes {
                println!("{}", render_change(change));
            }
        }
    }
    Ok(())
}

fn render_change(change: &Change) -> String {
    let op = match change.op {
        Op::Add => "+ add".green(),
        Op::Remove => "- remove".red(),
        Op::Replace => "~ replace".yellow(),
    };
    let path = if change.path.is_root() {
        "(root)".to_string()
    } else {
        change.path.to_string()
    };
    let mut line = format!("{op} {}", path.bold());
    if let Some(value) = &change.value {
        line.push_str(&format!(" = {value}"));
    }
    if !change.item_ids.is_empty() {
        line.push_str(&format!(" {}", format!("[{}]", change.item_ids.join(", ")).dimmed()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use docline_types::Path;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }

    fn alice(toys: Value) -> Value {
        json!({"id": "1", "name": "Alice", "toys": toys})
    }

    #[test]
    fn diff_then_apply_files() {
        let dir = TempDir::new().unwrap();
        let old = alice(json!([{"id": "toy1", "name": "Car"}, {"id": "toy2", "name": "Doll"}]));
        let new = alice(json!([{"id": "toy2", "name": "Robot"}]));
        let old_path = write(&dir, "old.json", &old);
        let new_path = write(&dir, "new.json", &new);

        let changes = diff_files(&DiffArgs {
            old: old_path.clone(),
            new: new_path,
            settings: DiffSettings::default(),
        })
        .unwrap();
        assert_eq!(changes.len(), 2);

        // Apply onto a reordered copy of the old document.
        let reordered =
            alice(json!([{"id": "toy2", "name": "Doll"}, {"id": "toy1", "name": "Car"}]));
        let target = write(&dir, "target.json", &reordered);
        let changes_path = write(&dir, "changes.json", &encode_changes(&changes).unwrap());
        let patched = apply_file(&ApplyArgs {
            target,
            changes: changes_path,
        })
        .unwrap();
        assert_eq!(patched, new);
    }

    #[test]
    fn exclusions_from_flags_and_config_combine() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("docline.toml");
        fs::write(&config, "[types.person]\nexclude = [\"updatedAt\"]\n").unwrap();
        let old = write(&dir, "old.json", &json!({"updatedAt": 1, "note": "a", "n": 1}));
        let new = write(&dir, "new.json", &json!({"updatedAt": 2, "note": "b", "n": 1}));

        let changes = diff_files(&DiffArgs {
            old,
            new,
            settings: DiffSettings {
                exclude: vec!["note".into()],
                config: Some(config),
                type_name: Some("person".into()),
            },
        })
        .unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn normalize_keys_identifiable_arrays() {
        let dir = TempDir::new().unwrap();
        let document = write(&dir, "doc.json", &alice(json!([{"id": "t1", "name": "Car"}])));
        let normalized = normalize_file(&NormalizeArgs {
            document,
            settings: DiffSettings::default(),
        })
        .unwrap();
        assert_eq!(normalized["toys"], json!({"t1": {"id": "t1", "name": "Car"}}));
    }

    #[test]
    fn replay_and_compare_diff_files() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "base.json", &json!({}));
        let v1 = write(
            &dir,
            "v1.json",
            &json!([{"op": "add", "path": "/toys", "value": []}]),
        );
        let v2 = write(
            &dir,
            "v2.json",
            &json!({"version": 2, "changes": [
                {"op": "add", "path": "/toys/k", "value": {"id": "k", "name": "Kite"}, "itemIds": ["k"]},
            ]}),
        );
        let diffs = vec![v1, v2];

        let snapshot = replay_files(&ReplayArgs {
            base: base.clone(),
            diffs: diffs.clone(),
            at: None,
        })
        .unwrap();
        assert_eq!(snapshot.version, 2);
        assert_eq!(snapshot.document, json!({"toys": [{"id": "k", "name": "Kite"}]}));

        let at_one = replay_files(&ReplayArgs {
            base: base.clone(),
            diffs: diffs.clone(),
            at: Some(1),
        })
        .unwrap();
        assert_eq!(at_one.document, json!({"toys": []}));

        let changes = compare_files(&CompareArgs {
            base,
            diffs,
            from: 1,
            to: 2,
            settings: DiffSettings::default(),
        })
        .unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, Path::parse("/toys/k").unwrap());
    }

    #[test]
    fn unknown_op_in_changes_file_fails() {
        let dir = TempDir::new().unwrap();
        let target = write(&dir, "doc.json", &json!({}));
        let changes = write(&dir, "changes.json", &json!([{"op": "move", "path": "/a"}]));
        let err = apply_file(&ApplyArgs { target, changes }).unwrap_err();
        assert!(format!("{err:#}").contains("move"));
    }

    #[test]
    fn rendered_change_names_op_and_ids() {
        colored::control::set_override(false);
        let change = Change::remove(Path::parse("/toys/toy1").unwrap(), vec!["toy1".into()]);
        assert_eq!(render_change(&change), "- remove /toys/toy1 [toy1]");
    }
}
