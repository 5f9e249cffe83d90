use serde::Serialize;
use springbox::{LayoutConfig, LayoutEngine};
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(springbox::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<springbox::Error> for CliError {
    fn from(value: springbox::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Layout,
    Resolve,
    Check,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    out: Option<String>,
    config: Option<String>,
    pretty: bool,
    keep: bool,
    seed: Option<u64>,
    scale: Option<f64>,
    viewport_width: Option<f64>,
    viewport_height: Option<f64>,
    margin: Option<f64>,
    max_passes: Option<usize>,
    max_iterations: Option<usize>,
}

#[derive(Serialize)]
struct CheckOut {
    nodes: usize,
    edges: usize,
    overlaps: usize,
    margin: f64,
}

fn usage() -> &'static str {
    "springbox-cli\n\
\n\
USAGE:\n\
  springbox-cli [layout] [--keep] [--seed <n>] [--scale <s>] [--viewport-width <w>] [--viewport-height <h>] [--margin <m>] [--max-passes <n>] [--max-iterations <n>] [--config <json>] [--out <path>] [<path>|-]\n\
  springbox-cli resolve [--margin <m>] [--max-passes <n>] [--config <json>] [--out <path>] [<path>|-]\n\
  springbox-cli check [--margin <m>] [--config <json>] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the graph is read from stdin.\n\
  - layout runs the spring layout followed by overlap removal; --keep warm-starts from the\n\
    current positions instead of a random placement.\n\
  - resolve only removes overlaps.\n\
  - check prints a JSON report: node, edge and overlap counts.\n\
  - Flags override values loaded with --config.\n\
"
}

fn flag_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_num<T: std::str::FromStr>(raw: &str) -> Result<T, CliError> {
    raw.trim().parse::<T>().map_err(|_| CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "resolve" => args.command = Command::Resolve,
            "check" => args.command = Command::Check,
            "--pretty" => args.pretty = true,
            "--keep" => args.keep = true,
            "--seed" => args.seed = Some(parse_num(flag_value(&mut it)?)?),
            "--scale" => args.scale = Some(parse_num(flag_value(&mut it)?)?),
            "--viewport-width" => args.viewport_width = Some(parse_num(flag_value(&mut it)?)?),
            "--viewport-height" => args.viewport_height = Some(parse_num(flag_value(&mut it)?)?),
            "--margin" => args.margin = Some(parse_num(flag_value(&mut it)?)?),
            "--max-passes" => args.max_passes = Some(parse_num(flag_value(&mut it)?)?),
            "--max-iterations" => args.max_iterations = Some(parse_num(flag_value(&mut it)?)?),
            "--config" => args.config = Some(flag_value(&mut it)?.clone()),
            "--out" => args.out = Some(flag_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn build_config(args: &Args) -> Result<LayoutConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(scale) = args.scale {
        config.scale = scale;
    }
    if let Some(w) = args.viewport_width {
        config.viewport.width = w;
    }
    if let Some(h) = args.viewport_height {
        config.viewport.height = h;
    }
    if let Some(margin) = args.margin {
        config.overlap.margin = margin;
    }
    if let Some(max_passes) = args.max_passes {
        config.overlap.max_passes = max_passes;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.spring.max_iterations = max_iterations;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<(), CliError> {
    let config = build_config(&args)?;
    let text = read_input(args.input.as_deref())?;

    let mut engine = LayoutEngine::new(config)?;
    engine.load_from_text(&text)?;

    match args.command {
        Command::Layout => {
            let report = engine.relayout(args.keep)?;
            if !report.overlaps.converged {
                eprintln!(
                    "warning: {} overlaps left after {} passes",
                    engine.count_overlaps(),
                    report.overlaps.passes
                );
            }
            write_text(&engine.to_text(), args.out.as_deref())
        }
        Command::Resolve => {
            let outcome = engine.remove_overlaps();
            if !outcome.converged {
                eprintln!(
                    "warning: {} overlaps left after {} passes",
                    engine.count_overlaps(),
                    outcome.passes
                );
            }
            write_text(&engine.to_text(), args.out.as_deref())
        }
        Command::Check => {
            let graph = engine.graph();
            let report = CheckOut {
                nodes: graph.len(),
                edges: graph.edge_count(),
                overlaps: engine.count_overlaps(),
                margin: engine.overlap_removal().margin(),
            };
            write_json(&report, args.pretty)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
