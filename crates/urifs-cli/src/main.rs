//! urifs command-line tool.
//!
//! Glob, walk, copy and remove across registered backends by URI.
//!
//! Usage:
//!   urifs glob '*/b/c/*/W???d/x/file[1-2].txt' --base ./D --captures
//!   urifs glob 'proj://src/*.rs' --limit 10
//!   urifs walk proj://src -p '*.rs' -p '*.toml'
//!   urifs cp mem://notes proj://backup
//!   urifs rm -r proj://backup
//!
//! Extra backends come from `<config dir>/urifs/backends.toml` or `--config`.
//! Ctrl-C cancels the running traversal.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use urifs_kernel::{
    GlobEngine, Handle, Registry, RegistryConfig, VfsError, WalkEntry, WalkOptions, copy_tree,
    remove_tree, walk,
};

/// URI-addressed filesystem tool.
#[derive(Parser, Debug)]
#[command(name = "urifs", version)]
#[command(about = "Glob, walk and copy across URI-addressed backends")]
struct Args {
    /// Backend config file (default: <config dir>/urifs/backends.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand a glob pattern
    Glob {
        pattern: String,

        /// Base URI for relative patterns
        #[arg(long, default_value = ".")]
        base: String,

        /// Stop after this many matches
        #[arg(long)]
        limit: Option<usize>,

        /// Cancel after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the names each wildcard matched
        #[arg(long)]
        captures: bool,
    },

    /// Recursively list a directory
    Walk {
        uri: String,

        /// Only show entries whose name matches; all directories are still searched (repeatable)
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,

        /// Maximum depth (1 = direct children)
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// List a directory
    Ls { uri: String },

    /// Show whether a URI exists and its kind
    Stat { uri: String },

    /// Print file contents
    Cat { uri: String },

    /// Copy a file or tree, possibly across backends
    Cp {
        src: String,
        dst: String,

        /// Only copy files whose name matches, at any depth (repeatable)
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,
    },

    /// Remove a file, or a tree with -r
    Rm {
        uri: String,

        #[arg(short, long)]
        recursive: bool,
    },

    /// List registered backends
    Backends,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries results.
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let registry = Registry::global();
    load_config(&registry, args.config.as_deref()).await?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted, cancelling");
                cancel.cancel();
            }
        }
    });

    match args.command {
        Command::Glob {
            pattern,
            base,
            limit,
            timeout,
            captures,
        } => glob(&registry, &pattern, &base, limit, timeout, captures, cancel).await,
        Command::Walk {
            uri,
            patterns,
            max_depth,
        } => {
            let mut options = WalkOptions::new()
                .with_patterns(&patterns)
                .context("invalid --pattern")?
                .with_cancel(cancel);
            options.max_depth = max_depth;
            walk(&resolve(&registry, &uri)?, &options, |entry: &WalkEntry| -> Result<()> {
                let indent = "  ".repeat(entry.depth.saturating_sub(1));
                println!("{indent}{}\t{}", entry.kind, entry.handle);
                Ok(())
            })
            .await
        }
        Command::Ls { uri } => {
            let handle = resolve(&registry, &uri)?;
            let entries = handle
                .list()
                .await
                .with_context(|| format!("listing {handle}"))?;
            for entry in entries {
                let suffix = if entry.kind.is_dir() { "/" } else { "" };
                println!("{}{suffix}", entry.name);
            }
            Ok(())
        }
        Command::Stat { uri } => {
            let handle = resolve(&registry, &uri)?;
            match handle.stat().await? {
                Some(kind) => {
                    println!("{handle}\t{kind}");
                    Ok(())
                }
                None => bail!("{handle}: not found"),
            }
        }
        Command::Cat { uri } => {
            let handle = resolve(&registry, &uri)?;
            let reader = handle
                .backend()
                .reader()
                .with_context(|| format!("{} cannot be read", handle.backend().prefix()))?;
            let data = reader
                .read_all(handle.path())
                .await
                .with_context(|| format!("reading {handle}"))?;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&data).await?;
            stdout.flush().await?;
            Ok(())
        }
        Command::Cp { src, dst, patterns } => {
            let src = resolve(&registry, &src)?;
            let dst = resolve(&registry, &dst)?;
            let options = WalkOptions::new()
                .with_patterns(&patterns)
                .context("invalid --pattern")?
                .with_cancel(cancel);
            let copied = copy_tree(&src, &dst, &options)
                .await
                .with_context(|| format!("copying {src} to {dst}"))?;
            tracing::info!(copied, "copy complete");
            Ok(())
        }
        Command::Rm { uri, recursive } => {
            let handle = resolve(&registry, &uri)?;
            if recursive {
                let removed = remove_tree(&handle, cancel)
                    .await
                    .with_context(|| format!("removing {handle}"))?;
                tracing::info!(removed, "remove complete");
            } else {
                let writer = handle
                    .backend()
                    .writer()
                    .with_context(|| format!("{} is read-only", handle.backend().prefix()))?;
                writer
                    .remove(handle.path())
                    .await
                    .with_context(|| format!("removing {handle}"))?;
            }
            Ok(())
        }
        Command::Backends => {
            for info in registry.backends() {
                let mode = if info.read_only { "ro" } else { "rw" };
                println!("{}\t{mode}", info.prefix);
            }
            Ok(())
        }
    }
}

/// Register backends from the explicit config file, or the default one if
/// it exists.
async fn load_config(registry: &Registry, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match RegistryConfig::default_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(()),
        },
    };

    let config = RegistryConfig::load(&path)
        .await
        .with_context(|| format!("loading {}", path.display()))?;
    let count = config.apply(registry)?;
    tracing::debug!(count, path = %path.display(), "registered configured backends");
    Ok(())
}

fn resolve(registry: &Registry, uri: &str) -> Result<Handle> {
    let handle = registry.handle(uri);
    if handle.is_invalid() {
        bail!("no backend for {uri:?}");
    }
    Ok(handle)
}

async fn glob(
    registry: &Arc<Registry>,
    pattern: &str,
    base: &str,
    limit: Option<usize>,
    timeout: Option<u64>,
    show_captures: bool,
    cancel: CancellationToken,
) -> Result<()> {
    if let Some(secs) = timeout {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::warn!(secs, "glob timed out");
            cancel.cancel();
        });
    }

    let engine = GlobEngine::new(Arc::clone(registry));
    // Absolute patterns ignore the base, so an unroutable base is not fatal.
    let base = registry.handle(base);
    let stream = engine
        .glob_str(&base, pattern, cancel)
        .with_context(|| format!("compiling {pattern:?}"))?;

    let mut stream = stream.take(limit.unwrap_or(usize::MAX));
    let mut count = 0usize;
    while let Some(item) = stream.next().await {
        match item {
            Ok(m) if show_captures => println!("{}\t{}", m.handle, m.captures.join("\t")),
            Ok(m) => println!("{}", m.handle),
            Err(VfsError::Cancelled) => {
                tracing::warn!(count, "glob cancelled");
                bail!("cancelled after {count} matches");
            }
            Err(e) => return Err(e).context("glob failed"),
        }
        count += 1;
    }

    tracing::debug!(count, "glob complete");
    Ok(())
}
