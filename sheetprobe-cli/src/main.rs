mod display;
mod logging;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sheetprobe_core::colors::CatppuccinExt;
use sheetprobe_core::output::{get_formatter, OutputFormat};
use sheetprobe_core::sweep::{ProgressCallback, SweepProgress};
use sheetprobe_core::workbook::DomainEntry;
use sheetprobe_core::{
    ProbeClient, ProbeSettings, Scheme, SheetSource, SweepConfig, SweepExecutor, WorkbookSweep,
    Workbook,
};

use crate::display::CheckSpinner;

#[derive(Parser)]
#[command(name = "sheetprobe")]
#[command(about = "Check the HTTPS status of domains listed in spreadsheet worksheets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (human or json)
    #[arg(short, long, default_value = "human", global = true)]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every domain in the configured worksheets
    Run(RunArgs),
    /// Check domains given on the command line
    Check {
        /// Domains to check
        #[arg(required = true)]
        domains: Vec<String>,
        /// Request timeout in seconds
        #[arg(short, long, default_value_t = 10)]
        timeout: u64,
        /// Use http:// instead of https://
        #[arg(long)]
        http: bool,
    },
    /// List the worksheets of a workbook
    Sheets {
        /// Workbook file (xlsx, xlsm, xlsb, xls, ods)
        workbook: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Config file (defaults to sheetprobe.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Workbook file (xlsx, xlsm, xlsb, xls, ods)
    #[arg(short, long)]
    workbook: Option<PathBuf>,
    /// Worksheet to check; repeat for several (default: all worksheets)
    #[arg(short, long = "sheet")]
    sheets: Vec<String>,
    /// Domain column as a letter (B) or 1-based number (2)
    #[arg(long)]
    column: Option<String>,
    /// Log file results are appended to
    #[arg(short, long)]
    log_file: Option<PathBuf>,
    /// Request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,
    /// Requests in flight at once
    #[arg(long)]
    concurrency: Option<usize>,
    /// Passes per worksheet (default 0: rescan until a pass ends on an empty run)
    #[arg(long)]
    passes: Option<u32>,
    /// Seconds to wait between passes over the same worksheet
    #[arg(long)]
    pass_delay: Option<u64>,
    /// Use http:// instead of https://
    #[arg(long)]
    http: bool,
    /// Print one line per domain instead of a progress bar
    #[arg(long)]
    no_progress: bool,
}

impl RunArgs {
    /// Layer command-line values over the config file
    fn apply(&self, config: &mut SweepConfig) -> sheetprobe_core::Result<()> {
        if let Some(ref workbook) = self.workbook {
            config.workbook = Some(workbook.clone());
        }
        if !self.sheets.is_empty() {
            config.worksheets = self.sheets.clone();
        }
        if let Some(ref column) = self.column {
            config.domain_column = column.parse()?;
        }
        if let Some(ref log_file) = self.log_file {
            config.log_file = log_file.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(passes) = self.passes {
            config.passes = passes;
        }
        if let Some(pass_delay) = self.pass_delay {
            config.pass_delay_secs = pass_delay;
        }
        if self.http {
            config.scheme = Scheme::Http;
        }
        Ok(())
    }

    fn load_config(&self) -> sheetprobe_core::Result<SweepConfig> {
        let mut config = match self.config {
            Some(ref path) => SweepConfig::load_from_file(path)?,
            None => SweepConfig::load_default()?,
        };
        self.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let output_format: OutputFormat = cli.format.parse().unwrap_or_default();

    if let Err(e) = execute_command(cli.command, output_format).await {
        eprintln!("{} {:#}", "Error:".ctp_red(), e);
        std::process::exit(1);
    }
}

async fn execute_command(command: Commands, output_format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => run_sweep(args, output_format).await,
        Commands::Check {
            domains,
            timeout,
            http,
        } => {
            logging::init(None)?;
            check_domains(domains, timeout, http, output_format).await
        }
        Commands::Sheets { workbook } => {
            logging::init(None)?;
            list_sheets(workbook, output_format)
        }
    }
}

async fn run_sweep(args: RunArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = args.load_config()?;
    logging::init(Some(&config.log_file))?;

    let Some(ref workbook_path) = config.workbook else {
        anyhow::bail!("no workbook given");
    };
    let mut workbook = Workbook::open(workbook_path)?;

    let client = ProbeClient::new(config.probe_settings())?;
    let executor = SweepExecutor::new(client).with_concurrency(config.concurrency);
    let sweep = WorkbookSweep::new(executor, config.sweep_plan());

    let progress_bar = if args.no_progress {
        None
    } else {
        let pb = display::sweep_progress_bar();
        display::set_sweep_progress_bar(pb.clone());
        Some(pb)
    };

    let callback: ProgressCallback = match progress_bar {
        Some(ref pb) => {
            let pb = pb.clone();
            Box::new(move |event: SweepProgress<'_>| match event {
                SweepProgress::Checking { domain } => {
                    pb.set_message(format!("Checking domain: {}", domain));
                }
                SweepProgress::Checked {
                    completed, total, ..
                } => {
                    pb.set_length(total as u64);
                    pb.set_position(completed as u64);
                }
            })
        }
        None => Box::new(move |event: SweepProgress<'_>| {
            if let SweepProgress::Checking { domain } = event {
                // Keep stdout clean for JSON output
                match output_format {
                    OutputFormat::Human => println!("Checking domain: {}", domain),
                    OutputFormat::Json => eprintln!("Checking domain: {}", domain),
                }
            }
        }),
    };

    let report = sweep.run(&mut workbook, Some(&callback)).await;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
        display::clear_sweep_progress_bar();
    }

    let formatter = get_formatter(output_format);
    println!("{}", formatter.format_report(&report));

    Ok(())
}

async fn check_domains(
    domains: Vec<String>,
    timeout: u64,
    http: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let settings = ProbeSettings::new()
        .with_timeout(std::time::Duration::from_secs(timeout.max(1)))
        .with_scheme(if http { Scheme::Http } else { Scheme::Https });
    let executor = SweepExecutor::new(ProbeClient::new(settings)?);

    let entries: Vec<DomainEntry> = domains
        .into_iter()
        .enumerate()
        .map(|(i, domain)| DomainEntry {
            row: i as u32 + 1,
            domain,
        })
        .collect();

    let spinner = CheckSpinner::new(entries.len());
    let callback = spinner.progress_callback();
    let mut results = executor.execute(entries, Some(&callback)).await;
    spinner.finish();
    results.sort_by_key(|r| r.row);

    match output_format {
        OutputFormat::Json => {
            let probes: Vec<_> = results.iter().map(|r| &r.probe).collect();
            println!("{}", serde_json::to_string_pretty(&probes)?);
        }
        OutputFormat::Human => {
            let formatter = get_formatter(output_format);
            for result in &results {
                println!("{}", formatter.format_probe(&result.probe));
            }
        }
    }

    Ok(())
}

fn list_sheets(path: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let workbook = Workbook::open(&path)?;
    let names = workbook.sheet_names();

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Human => {
            println!("{}", workbook.path().display().to_string().lavender());
            for name in &names {
                println!("  {}", name.sky());
            }
        }
    }

    Ok(())
}
