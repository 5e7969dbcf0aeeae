use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::mpsc;

use gcode_plot::config::{Args, Config};
use gcode_plot::geometry::{pen_position, summarize, Progress, ProgressSummary};
use gcode_plot::{Diagnostic, GCodeDocument, Node, PlaybackCursor, ProfileStats};

/// Everything printed for one load of the program
#[derive(Debug, Serialize)]
struct Report<'a> {
    program: &'a Path,
    stats: &'a ProfileStats,
    cursor: PlaybackCursor,
    resume_line: Option<usize>,
    progress: ProgressSummary,
    pen_position: Option<(f64, f64)>,
    diagnostics: &'a [Diagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<Vec<NodeReport>>,
}

#[derive(Debug, Serialize)]
struct NodeReport {
    #[serde(flatten)]
    node: Node,
    progress: Progress,
}

/// Events from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    ProgramChanged,
    WatcherError(notify::Error),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .init();

    let config = Config::from_args(args)?;
    match &config.settings_path {
        Some(path) => log::info!("Using machine settings from {}", path.display()),
        None => log::debug!("Using built-in machine settings"),
    }

    let mut document = load_in_background(GCodeDocument::new(), &config).await?;
    print_report(&mut document, &config)?;

    if config.watch {
        watch(document, &config).await?;
    }

    Ok(())
}

/// Load off the async thread; the document is handed back when done
async fn load_in_background(mut document: GCodeDocument, config: &Config) -> Result<GCodeDocument> {
    let path = config.program.clone();
    let settings = config.settings.clone();

    tokio::task::spawn_blocking(move || -> Result<GCodeDocument> {
        document
            .load_file(&path, &settings)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        Ok(document)
    })
    .await
    .context("G-code loader task failed")?
}

fn print_report(document: &mut GCodeDocument, config: &Config) -> Result<()> {
    let settings = &config.settings;

    let resume_line = config.resume_from.map(|line| {
        let resume = document.find_last_pen_lift_before(line, &settings.pen_up_command());
        document.seek(resume);
        resume
    });

    let cursor = document.cursor();
    let position = cursor.lines_processed;
    let look_ahead = settings.look_ahead_segments;
    let nodes = document.nodes(settings);

    let node_reports = config.show_nodes.then(|| {
        nodes
            .iter()
            .map(|node| NodeReport {
                node: *node,
                progress: node.progress(position, look_ahead),
            })
            .filter(|r| r.progress.is_visible(settings.draw_all_while_running))
            .collect()
    });

    let report = Report {
        program: &config.program,
        stats: document.stats(),
        cursor,
        resume_line,
        progress: summarize(&nodes, position, look_ahead),
        pen_position: pen_position(&nodes, position),
        diagnostics: document.diagnostics(),
        nodes: node_reports,
    };

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }

    Ok(())
}

fn print_text(report: &Report<'_>) {
    println!("{}", report.program.display());
    println!(
        "  lines:     {} (cursor at {})",
        report.cursor.total_lines, report.cursor.lines_processed
    );
    println!("  segments:  {}", report.stats.segment_count);
    println!("  length:    {:.1} mm", report.stats.estimated_length_mm);
    println!("  time:      {}", format_duration(report.stats.estimated_time_ms));
    if let Some(line) = report.resume_line {
        println!("  resume at: line {}", line);
    }
    if let Some((x, y)) = report.pen_position {
        println!("  pen at:    {:.2}, {:.2}", x, y);
    }
    println!(
        "  progress:  {} executed, {} upcoming, {} future",
        report.progress.executed, report.progress.upcoming, report.progress.future
    );

    for diagnostic in report.diagnostics {
        println!(
            "  line {}: '{}' ({})",
            diagnostic.line, diagnostic.content, diagnostic.message
        );
    }

    for entry in report.nodes.iter().flatten() {
        match entry.node {
            Node::Position {
                from_x,
                from_y,
                to_x,
                to_y,
                color,
                source_line,
            } => println!(
                "  {:>6} {:<9} {} ({:.3}, {:.3}) -> ({:.3}, {:.3})",
                source_line,
                format!("{:?}", entry.progress),
                color,
                from_x,
                from_y,
                to_x,
                to_y
            ),
            Node::ToolChange { color, source_line } => println!(
                "  {:>6} {:<9} {} tool change",
                source_line,
                format!("{:?}", entry.progress),
                color
            ),
        }
    }
}

/// `h:mm:ss` from milliseconds
fn format_duration(ms: f64) -> String {
    let total = Duration::try_from_secs_f64(ms / 1000.0)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// Reload and report whenever the program file changes, until Ctrl-C
async fn watch(mut document: GCodeDocument, config: &Config) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let file_name = config.program.file_name().map(|n| n.to_os_string());

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let EventKind::Create(_) | EventKind::Modify(_) = event.kind {
                    if event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == file_name.as_deref())
                    {
                        let _ = tx.send(WatcherEvent::ProgramChanged);
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(WatcherEvent::WatcherError(e));
            }
        },
        notify::Config::default().with_poll_interval(Duration::from_secs(1)),
    )?;

    // editors often replace the file, so watch its directory
    let dir = config
        .program
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    log::info!("Watching {} for changes", config.program.display());

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(WatcherEvent::ProgramChanged) => {
                    document = match load_in_background(document, config).await {
                        Ok(document) => document,
                        Err(e) => {
                            log::error!("{:#}", e);
                            GCodeDocument::new()
                        }
                    };
                    // one save tends to fire several events
                    while rx.try_recv().is_ok() {}

                    if document.is_loaded() {
                        print_report(&mut document, config)?;
                    }
                }
                Some(WatcherEvent::WatcherError(e)) => log::error!("File watcher error: {}", e),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
