use std::ffi::OsString;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use log::{debug, error, LevelFilter};

use net_analyzer::pipeline;
use net_analyzer::report::BANNER;
use net_analyzer::{AnalyzerConfig, AnalyzerError, GraphConfig, Result};

const USAGE: &str = "usage: net_analyzer [csv-file]";

/// Summarize a Wireshark CSV export: hosts, ports, MACs, protocols and who
/// talks to whom.
#[derive(Parser, Debug)]
#[command(name = "net_analyzer", version, about)]
struct Cli {
    /// CSV exported from Wireshark
    #[arg(value_name = "CSV_FILE")]
    input: PathBuf,

    /// Directory for the report and graph files
    #[arg(short = 'o', long = "output-dir", default_value = "./output")]
    output_dir: PathBuf,

    /// Skip the connection graph
    #[arg(long = "no-graph")]
    no_graph: bool,

    /// Render the graph to PNG with Graphviz `dot`
    #[arg(long = "render-png", conflicts_with = "no_graph")]
    render_png: bool,

    /// Also write nx.html, an interactive view of the graph
    #[arg(long = "interactive", conflicts_with = "no_graph")]
    interactive: bool,

    /// More log output (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

impl Cli {
    fn config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            output_dir: self.output_dir.clone(),
            graph: GraphConfig {
                enabled: !self.no_graph,
                render_png: self.render_png,
                interactive: self.interactive,
                ..GraphConfig::default()
            },
            ..AnalyzerConfig::default()
        }
    }
}

fn parse_cli() -> Result<Cli> {
    parse_cli_from(std::env::args_os())
}

fn parse_cli_from<I, T>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            process::exit(0);
        }
        _ => AnalyzerError::UsageError(e.to_string()),
    })
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
}

fn main() {
    println!("{}", BANNER);

    let cli = match parse_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    init_logging(&cli);
    debug!("CLI arguments: {:?}", cli);

    let start = Instant::now();

    match pipeline::run(&cli.input, &cli.config()) {
        Ok(output) => {
            println!("[+] {} packets analyzed", output.records_analyzed);
            println!("[+] report: {}", output.report.display());
            for file in &output.graph_files {
                println!("[+] graph: {}", file.display());
            }
            println!("[+] time taken: {:?}", start.elapsed());
        }
        Err(e) => {
            error!("analysis of {} failed: {}", cli.input.display(), e);
            eprintln!("[!] {}", e);
            process::exit(1);
        }
    }
}
