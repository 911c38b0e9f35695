use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use sharpfix::analysis::{analyze_document, try_autofix_all, Diagnostic};
use sharpfix::cancel::CancellationToken;
use sharpfix::config::{discover, load_from_path, Config, Severity};
use sharpfix::edit::{Edit, EditResult};
use sharpfix::refactor::{collect_actions, RefactoringContext, RefactoringId};
use sharpfix::safety::{is_build_output, WorkspaceGuard};
use sharpfix::semantics::WorkspaceModel;
use sharpfix::solution::Solution;
use sharpfix::syntax::parse;
use sharpfix::text::{LineIndex, TextSpan};
use sharpfix::validate::pooled;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "sharpfix")]
#[command(about = "C# refactorings and namespace style fixes", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: nearest sharpfix.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report style diagnostics
    Check {
        /// Files or directories (default: current directory)
        paths: Vec<PathBuf>,

        /// Print one JSON object per diagnostic
        #[arg(long)]
        json: bool,
    },

    /// Fix style diagnostics in place
    Fix {
        paths: Vec<PathBuf>,

        /// Show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// List the code actions available at a position
    Actions {
        file: PathBuf,

        /// Byte offset of the selection
        #[arg(long)]
        offset: usize,

        /// Length of the selection in bytes
        #[arg(long, default_value_t = 0)]
        length: usize,

        /// Root whose .cs files are loaded for references (default: current directory)
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },

    /// Invoke one code action and write the result
    Apply {
        file: PathBuf,

        #[arg(long)]
        offset: usize,

        #[arg(long, default_value_t = 0)]
        length: usize,

        /// Refactoring id, as listed by `sharpfix rules`
        #[arg(long)]
        action: String,

        #[arg(short, long)]
        workspace: Option<PathBuf>,

        #[arg(short = 'n', long)]
        dry_run: bool,

        #[arg(short, long)]
        diff: bool,
    },

    /// List refactorings and whether they are enabled
    Rules,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SHARPFIX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let code = match cli.command {
        Commands::Check { paths, json } => cmd_check(&config, &paths, json, &cancel)?,
        Commands::Fix {
            paths,
            dry_run,
            diff,
        } => cmd_fix(&config, &paths, dry_run, diff, &cancel)?,
        Commands::Actions {
            file,
            offset,
            length,
            workspace,
        } => cmd_actions(config, &file, TextSpan::from_len(offset, length), workspace, cancel).await?,
        Commands::Apply {
            file,
            offset,
            length,
            action,
            workspace,
            dry_run,
            diff,
        } => {
            let target = ActionTarget {
                file,
                selection: TextSpan::from_len(offset, length),
                workspace,
            };
            cmd_apply(config, target, &action, dry_run, diff, cancel).await?
        }
        Commands::Rules => cmd_rules(&config),
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Explicit `--config`, else the nearest `sharpfix.toml`, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover(&env::current_dir()?),
    };
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            Ok(load_from_path(&path)?)
        }
        None => Ok(Config::default()),
    }
}

/// Every `.cs` file named by `paths`, directories searched recursively
/// with build output skipped.
fn discover_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let roots = if paths.is_empty() {
        vec![env::current_dir()?]
    } else {
        paths.to_vec()
    };
    let mut files = Vec::new();
    for root in roots {
        if root.is_file() {
            files.push(root);
            continue;
        }
        if !root.exists() {
            bail!("no such file or directory: {}", root.display());
        }
        for entry in WalkDir::new(&root) {
            let entry = entry?;
            let path = entry.path();
            let relative = path.strip_prefix(&root).unwrap_or(path);
            if entry.file_type().is_file()
                && path.extension().and_then(|s| s.to_str()) == Some("cs")
                && !is_build_output(relative)
            {
                files.push(path.to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("\n{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (fixed)", file.display()).dimmed());
    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => format!(" {change}").normal(),
        };
        print!("{line}");
    }
}

fn print_diagnostic(path: &Path, index: &LineIndex, diagnostic: &Diagnostic) {
    let rendered = diagnostic.render(&path.display().to_string(), index);
    let line = match diagnostic.severity {
        Severity::Error => rendered.red(),
        Severity::Warning => rendered.yellow(),
        Severity::Info | Severity::Hidden => rendered.normal(),
    };
    println!("{line}");
}

fn cmd_check(
    config: &Config,
    paths: &[PathBuf],
    json: bool,
    cancel: &CancellationToken,
) -> Result<i32> {
    let mut reported = 0;
    for file in discover_sources(paths)? {
        let text = fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let tree = parse(&text).tree;
        let index = tree.line_index();
        for diagnostic in analyze_document(&tree, config, cancel)? {
            if diagnostic.severity == Severity::Hidden {
                continue;
            }
            if json {
                let record = serde_json::json!({
                    "file": file.display().to_string(),
                    "position": diagnostic.location(&index),
                    "diagnostic": diagnostic,
                });
                println!("{record}");
            } else {
                print_diagnostic(&file, &index, &diagnostic);
            }
            reported += 1;
        }
    }
    if json {
        return Ok(if reported == 0 { 0 } else { 1 });
    }
    if reported == 0 {
        println!("{}", "No diagnostics.".green());
        Ok(0)
    } else {
        println!("\n{} diagnostic(s)", format!("{reported}").yellow());
        Ok(1)
    }
}

/// Check a rewritten document and write it through a verified edit.
fn write_document(
    guard: &WorkspaceGuard,
    edit: &Edit,
    original: &str,
    updated: &str,
) -> Result<EditResult> {
    pooled::validate_edit(original, updated)
        .with_context(|| format!("refusing to write {}", edit.file.display()))?;
    guard.revalidate(&edit.file)?;
    Ok(edit.apply()?)
}

fn cmd_fix(
    config: &Config,
    paths: &[PathBuf],
    dry_run: bool,
    show_diff: bool,
    cancel: &CancellationToken,
) -> Result<i32> {
    let guard = WorkspaceGuard::new(env::current_dir()?)?;
    if dry_run {
        println!("{}", "[DRY RUN - nothing is written]".cyan());
    }

    let mut fixed = 0;
    let mut unfixed = 0;
    let mut failed = 0;
    for file in discover_sources(paths)? {
        let file = match guard.validate_path(&file) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                failed += 1;
                continue;
            }
        };
        let original = fs::read_to_string(&file)?;
        let tree = parse(&original).tree;
        let (edits, unfixable) = try_autofix_all(&file, &tree, config, cancel)?;

        for item in &unfixable {
            println!(
                "{} {}: {} ({})",
                "⊘".cyan(),
                file.display(),
                item.diagnostic.message,
                item.reason.dimmed()
            );
            unfixed += 1;
        }
        let Some(edit) = edits.first() else {
            continue;
        };
        let updated = edit.apply_to_str(&original)?;
        if show_diff {
            display_diff(&file, &original, &updated);
        }
        if dry_run {
            println!("{} {}: would fix", "✓".green(), file.display());
            fixed += 1;
            continue;
        }
        match write_document(&guard, edit, &original, &updated) {
            Ok(_) => {
                println!("{} {}: fixed", "✓".green(), file.display());
                fixed += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {:#}", "✗".red(), file.display(), e);
                failed += 1;
            }
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  {} fixed", format!("{fixed}").green());
    println!("  {} not fixable", format!("{unfixed}").cyan());
    println!("  {} failed", format!("{failed}").red());
    Ok(if failed > 0 { 1 } else { 0 })
}

struct ActionTarget {
    file: PathBuf,
    selection: TextSpan,
    workspace: Option<PathBuf>,
}

/// Load the workspace's `.cs` files into a solution and build the
/// refactoring context for `target`.
fn load_context(config: Config, target: &ActionTarget, cancel: CancellationToken) -> Result<RefactoringContext> {
    let root = match &target.workspace {
        Some(root) => root.clone(),
        None => env::current_dir()?,
    };
    let file = target
        .file
        .canonicalize()
        .with_context(|| format!("cannot open {}", target.file.display()))?;
    let mut sources = discover_sources(std::slice::from_ref(&root))?
        .into_iter()
        .filter_map(|path| path.canonicalize().ok())
        .collect::<Vec<_>>();
    if !sources.contains(&file) {
        sources.push(file.clone());
    }

    let mut solution = Solution::new();
    let mut document = None;
    for path in sources {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let id = solution.add_document(path.clone(), &text);
        if path == file {
            document = Some(id);
        }
    }
    let Some(document) = document else {
        bail!("{} was not loaded", file.display());
    };
    let text_len = solution
        .document(document)
        .map(|doc| doc.text().len())
        .unwrap_or_default();
    if target.selection.end() > text_len {
        bail!(
            "selection {} is past the end of {} ({} bytes)",
            target.selection,
            file.display(),
            text_len
        );
    }
    debug!(documents = solution.len(), "solution loaded");

    let semantics = WorkspaceModel::shared(solution.clone());
    Ok(
        RefactoringContext::new(solution, document, target.selection, semantics)
            .with_config(Arc::new(config))
            .with_cancellation(cancel),
    )
}

async fn cmd_actions(
    config: Config,
    file: &Path,
    selection: TextSpan,
    workspace: Option<PathBuf>,
    cancel: CancellationToken,
) -> Result<i32> {
    let target = ActionTarget {
        file: file.to_path_buf(),
        selection,
        workspace,
    };
    let ctx = load_context(config, &target, cancel)?;
    let actions = collect_actions(&ctx).await?;
    if actions.is_empty() {
        println!("{}", "No actions available.".dimmed());
        return Ok(0);
    }
    for action in &actions {
        println!("{}  {}", action.id().to_string().cyan(), action.title());
    }
    Ok(0)
}

async fn cmd_apply(
    config: Config,
    target: ActionTarget,
    action_id: &str,
    dry_run: bool,
    show_diff: bool,
    cancel: CancellationToken,
) -> Result<i32> {
    let wanted: RefactoringId = action_id.parse()?;
    let ctx = load_context(config, &target, cancel.clone())?;
    let actions = collect_actions(&ctx).await?;
    let Some(action) = actions.into_iter().find(|action| action.id() == wanted) else {
        eprintln!(
            "{} {} is not available at {} in {}",
            "✗".red(),
            wanted,
            target.selection,
            target.file.display()
        );
        return Ok(1);
    };

    let updated = action.invoke(cancel).await?;
    let guard = WorkspaceGuard::new(match &target.workspace {
        Some(root) => root.clone(),
        None => env::current_dir()?,
    })?;

    let mut failed = 0;
    for id in updated.changed_documents(&ctx.solution) {
        let (Some(before), Some(after)) = (ctx.solution.document(id), updated.document(id)) else {
            continue;
        };
        let path = before.path();
        let Some(edit) = Edit::between(path, before.text(), after.text()) else {
            continue;
        };
        if show_diff {
            display_diff(path, before.text(), after.text());
        }
        if dry_run {
            println!("{} {}: would change", "✓".green(), path.display());
            continue;
        }
        let written = guard
            .validate_path(path)
            .map_err(anyhow::Error::from)
            .and_then(|_| write_document(&guard, &edit, before.text(), after.text()));
        match written {
            Ok(_) => println!("{} {}: {}", "✓".green(), path.display(), action.title()),
            Err(e) => {
                eprintln!("{} {}: {:#}", "✗".red(), path.display(), e);
                failed += 1;
            }
        }
    }
    Ok(if failed > 0 { 1 } else { 0 })
}

fn cmd_rules(config: &Config) -> i32 {
    for id in RefactoringId::ALL {
        let state = if config.is_refactoring_enabled(id) {
            "enabled".green()
        } else {
            "disabled".red()
        };
        println!("{:<44} {:<9} {}", id.as_str(), state, id.description().dimmed());
    }
    0
}
