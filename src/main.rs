use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tablesim::core::config::{SandboxConfig, DEFAULT_CONFIG_PATH};
use tablesim::dsl::{execute_line, execute_script_with, DslOutput, Session};
use tablesim::server::start_server;
use tablesim::utils::parsing::bracket_balance;
use tablesim::{read_dataset, Dataset, Sandbox, SandboxError};
use toon_format::encode_default;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tablesim")]
#[command(version = "0.1")]
#[command(about = "tablesim: migration parser and query sandbox", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./tablesim.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable
    Display,
    /// TOON (machine-readable)
    Toon,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start REPL (default)
    Repl {
        /// JSON file with the starting dataset ({"table": [rows]})
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "display")]
        format: OutputFormat,
    },
    /// Run a script file
    Run {
        file: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "display")]
        format: OutputFormat,
    },
    /// Parse a migration file and print its tables
    Parse {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "display")]
        format: OutputFormat,
    },
    /// Interpret a single query against a dataset file
    Query {
        text: String,
        #[arg(long)]
        data: PathBuf,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Start HTTP server
    Serve {
        /// Overrides the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write a default tablesim.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let sandbox = match &cli.config {
        Some(path) => Sandbox::from_config_file(path)?,
        None => Sandbox::new(SandboxConfig::load()),
    };

    match cli.command {
        Some(Commands::Run { file, data, format }) => {
            let content = fs::read_to_string(&file)?;
            let mut session = Session::with_dataset(sandbox, load_dataset(data.as_ref())?);
            let result = execute_script_with(&mut session, &content, |output| print_output(&output, format));
            if let Err(e) = result {
                eprintln!("{}: {}", "Error".red(), e);
                std::process::exit(1);
            }
        }
        Some(Commands::Parse { file, format }) => {
            let content = fs::read_to_string(&file)?;
            let tables = sandbox.parse_schema(&content);
            if tables.is_empty() {
                eprintln!("{}", "No table declarations found".yellow());
            }
            print_output(&DslOutput::Tables(tables), format);
        }
        Some(Commands::Query { text, data, format }) => {
            let dataset = read_dataset(&data)?;
            let result = sandbox.interpret(&text, &dataset);
            print_output(&DslOutput::Result(result), format);
        }
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(sandbox.config().server.port);
            start_server(Arc::new(sandbox), port).await?;
        }
        Some(Commands::Init) => {
            handle_init()?;
        }
        Some(Commands::Repl { data, format }) => {
            let session = Session::with_dataset(sandbox, load_dataset(data.as_ref())?);
            run_repl(session, format)?;
        }
        None => {
            run_repl(Session::new(sandbox), OutputFormat::Display)?;
        }
    }

    Ok(())
}

fn load_dataset(path: Option<&PathBuf>) -> Result<Dataset, SandboxError> {
    path.map_or_else(|| Ok(Dataset::new()), read_dataset)
}

fn print_output(output: &DslOutput, format: OutputFormat) {
    match format {
        OutputFormat::Display => println!("{}", output),
        OutputFormat::Toon => {
            let toon = encode_default(output).unwrap_or_else(|e| format!("Error encoding TOON: {}", e));
            println!("{}", toon);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(output)
                .unwrap_or_else(|e| format!("Error encoding JSON: {}", e));
            println!("{}", json);
        }
    }
}

fn handle_init() -> Result<(), Box<dyn std::error::Error>> {
    if !std::path::Path::new(DEFAULT_CONFIG_PATH).exists() {
        fs::write(DEFAULT_CONFIG_PATH, SandboxConfig::default_toml())?;
        println!("Created default configuration: {}", DEFAULT_CONFIG_PATH.green());
    } else {
        println!(
            "Configuration file already exists: {}",
            DEFAULT_CONFIG_PATH.yellow()
        );
    }

    println!("{}", "Initialization complete.".bold().blue());
    Ok(())
}

fn run_repl(mut session: Session, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mut rl = DefaultEditor::new()?;
    let history_path = ".tablesim_history";

    if rl.load_history(history_path).is_err() {
        // No history yet
    }

    println!("{}", "tablesim REPL v0.1".bold().blue());
    println!(
        "Declare tables with Schema::create / CREATE TABLE, then query them. {} lists tables.",
        "SHOW TABLES".yellow()
    );
    println!("Type 'EXIT' or use Ctrl-D to quit.");

    let mut current_cmd = String::new();
    let mut balance = 0;
    let mut start_line = 1;
    let mut line_no = 0;

    loop {
        let prompt = if balance == 0 { ">_>  " } else { " ..  " };
        let readline = rl.readline(prompt);

        match readline {
            Ok(line) => {
                line_no += 1;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                if current_cmd.is_empty() && trimmed.eq_ignore_ascii_case("EXIT") {
                    break;
                }

                rl.add_history_entry(trimmed)?;

                if current_cmd.is_empty() {
                    start_line = line_no;
                } else {
                    current_cmd.push('\n');
                }
                current_cmd.push_str(trimmed);
                balance += bracket_balance(trimmed);

                if balance <= 0 {
                    match execute_line(&mut session, &current_cmd, start_line) {
                        Ok(output) => {
                            if !matches!(output, DslOutput::None) {
                                print_output(&output, format);
                            }
                        }
                        Err(e) => {
                            eprintln!("{}: {}", "Error".red(), e);
                        }
                    }
                    current_cmd.clear();
                    balance = 0;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                current_cmd.clear();
                balance = 0;
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(history_path);
    Ok(())
}
