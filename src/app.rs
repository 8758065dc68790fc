use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::catalog::{self, CatalogFilter};
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::cms::{self, ClientOptions, CmsClient};
use crate::config::{self, ConfigFile};
use crate::matrix::{BudgetIndicator, Variant, DEFAULT_UPLOAD_PREFIX};
use crate::output::{self, OutputFormat, ViewOptions};
use crate::store::{Action, MatrixState, SelectionPolicy};
use crate::utils::{self, CellRef};

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("matrixview={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Source {
    Api(String),
    File(String),
}

#[derive(Clone, Debug)]
struct RunConfig {
    source: Source,
    matrix: Option<String>,
    selections: Vec<CellRef>,
    variant: Option<Variant>,
    policy: SelectionPolicy,
    media_base_url: Option<String>,
    upload_prefix: String,
    timeout: usize,
    proxy: Option<String>,
    list: bool,
    filter: CatalogFilter,
    output: Option<String>,
    output_format: Option<OutputFormat>,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let source = if let Some(input) = args.input {
        Source::File(config::expand_tilde_string(&input))
    } else if let Some(api_url) = args.api_url {
        Source::Api(api_url.trim().to_string())
    } else if let Some(input) = cfg.input {
        Source::File(config::expand_tilde_string(&input))
    } else {
        Source::Api(
            cfg.api_url
                .unwrap_or_else(|| cms::DEFAULT_API_URL.to_string())
                .trim()
                .to_string(),
        )
    };
    if let Source::Api(url) = &source {
        if reqwest::Url::parse(url).is_err() {
            return Err(format!("invalid URL: {url}"));
        }
    }

    let matrix = args
        .matrix
        .or(cfg.matrix)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    let selections = args
        .select
        .iter()
        .map(|raw| utils::parse_cell_ref(raw))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid --select: {e}"))?;

    let variant_raw = args
        .variant
        .or(cfg.variant)
        .unwrap_or_else(|| "auto".to_string());
    let variant = utils::parse_variant(&variant_raw)
        .map_err(|e| format!("invalid variant '{variant_raw}': {e}"))?;

    let policy = SelectionPolicy {
        lock_first_column: args.lock_first_column || cfg.lock_first_column.unwrap_or(false),
    };

    let media_base_url = args
        .media_base_url
        .or(cfg.media_base_url)
        .or_else(|| match &source {
            Source::Api(url) => cms::media_base_from_api(url),
            Source::File(_) => None,
        });
    let upload_prefix = args
        .upload_prefix
        .or(cfg.upload_prefix)
        .unwrap_or_else(|| DEFAULT_UPLOAD_PREFIX.to_string());

    let date = match args.date.as_deref() {
        Some(raw) => Some(catalog::parse_date(raw).map_err(|e| e.to_string())?),
        None => None,
    };
    let filter = CatalogFilter {
        query: args.search,
        date,
    };
    let list = args.list || filter.query.is_some() || filter.date.is_some();
    if list && !selections.is_empty() {
        return Err("--select cannot be combined with --list/--search/--date".to_string());
    }

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format_raw = args.output_format.or(cfg.output_format);
    let output_format = match output_format_raw.as_deref() {
        Some(raw) => Some(
            OutputFormat::parse(raw)
                .ok_or_else(|| format!("invalid output format '{raw}'"))?,
        ),
        None => None,
    };

    Ok(RunConfig {
        source,
        matrix,
        selections,
        variant,
        policy,
        media_base_url,
        upload_prefix,
        timeout,
        proxy,
        list,
        filter,
        output,
        output_format,
        no_color,
    })
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

async fn load_state(run: &RunConfig) -> Result<MatrixState, String> {
    let state = MatrixState::new(run.matrix.clone(), run.policy, run.variant);
    match &run.source {
        Source::Api(url) => {
            let client = CmsClient::new(ClientOptions {
                api_url: url.clone(),
                timeout_seconds: run.timeout,
                proxy: run.proxy.clone(),
            })
            .map_err(|e| e.to_string())?;
            let pb = spinner(format!("fetching {url}"));
            let state = state.sync(&client).await;
            pb.finish_and_clear();
            Ok(state)
        }
        Source::File(path) => {
            let records = cms::load_collection_file(path)
                .await
                .map_err(|e| e.to_string())?;
            Ok(state.reduce(Action::Loaded(records)))
        }
    }
}

async fn write_output(path: &str, rendered: &[u8]) -> Result<(), String> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(rendered)
        .await
        .map_err(|_| "failed to write output file".to_string())?;
    Ok(())
}

fn resolve_format(run: &RunConfig) -> OutputFormat {
    run.output_format
        .or_else(|| run.output.as_deref().and_then(output::infer_format_from_path))
        .unwrap_or(OutputFormat::Text)
}

fn budget_summary(budget: &BudgetIndicator) -> String {
    let band = match budget {
        BudgetIndicator::Point { color: Some(c), .. } => c.to_string(),
        BudgetIndicator::Range {
            gradient: Some(g), ..
        } => g.name(),
        _ => "n/a (no total price)".to_string(),
    };
    format!(
        "estimated={} utilization={} indicator={}",
        output::estimated_label(budget),
        output::utilization_label(budget),
        band
    )
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let source_label = match &run.source {
        Source::Api(url) => url.clone(),
        Source::File(path) => format!("file {path}"),
    };
    format_kv_line("Source", &source_label);

    let mut state = load_state(&run).await?;
    if let Some(err) = state.last_error() {
        return Err(format!("Error fetching matrix data: {err}"));
    }

    let format = resolve_format(&run);

    if run.list {
        let matched = catalog::apply_filter(state.records(), &run.filter);
        let entries = catalog::entries(&matched);
        format_kv_line(
            "Catalog",
            &format!("{} of {} matrices", entries.len(), state.records().len()),
        );
        println!();
        print!("{}", output::render_catalog_text(&entries));
        if let Some(path) = run.output.as_deref() {
            write_output(path, &output::render_catalog(&entries, format)).await?;
        }
        return Ok(());
    }

    let Some(grid) = state.grid() else {
        return Err(
            match catalog::find_by_title(state.records(), run.matrix.as_deref()) {
                Err(e) => e.to_string(),
                Ok(_) => "no matrix to display".to_string(),
            },
        );
    };
    let (columns, rows) = (grid.display_columns(), grid.display_rows());

    for cell in run.selections.iter() {
        let (col, row) = cell.to_index();
        if col >= columns || row >= rows {
            return Err(format!(
                "cell {}:{} is outside the {}x{} grid",
                cell.col, cell.row, columns, rows
            ));
        }
        if !run.policy.allows(col) {
            eprintln!(
                "{}{}{} cell {}:{} is in the locked first column, selection ignored",
                "[".bold().white(),
                "WRN".bold().yellow(),
                "]".bold().white(),
                cell.col,
                cell.row
            );
        }
        state = state.reduce(Action::ToggleCell { col, row });
    }
    debug!(selected = state.selection().len(), "selection applied");

    let grid = state
        .grid()
        .ok_or_else(|| "no matrix to display".to_string())?;
    format_kv_line(
        "Matrix",
        &format!(
            "{} variant={} size={}x{} locked_first_column={}",
            grid.title,
            grid.variant.label(),
            columns,
            rows,
            format_bool(run.policy.lock_first_column)
        ),
    );

    let view = output::build_view(
        grid,
        state.selection(),
        &ViewOptions {
            upload_prefix: run.upload_prefix.clone(),
            media_base_url: run.media_base_url.clone(),
            policy: run.policy,
        },
    );
    format_kv_line("Budget", &budget_summary(&view.budget));
    println!();
    print!("{}", output::render_text(&view));

    if let Some(path) = run.output.as_deref() {
        write_output(path, &output::render(&view, format)).await?;
        format_kv_line("Output", path);
    }

    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_tracing(args.verbose);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));

    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine config path".to_string())?;
        config::ensure_default_config_file(&path)?;
        format_kv_line("Config", &path.display().to_string());
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
