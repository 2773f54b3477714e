// crustree: full-fidelity C syntax trees in the terminal

use std::fs;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser as ClapParser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crustree::config::Config;
use crustree::parser::{Lexer, ParsedFile, Parser, SyntaxTree};
use crustree::printer::{print_errors, print_tokens, print_tree};
use crustree::ui::App;

#[derive(Debug, ClapParser)]
#[command(
    name = "crustree",
    version,
    about = "Lex and parse C files into a full-fidelity syntax tree"
)]
struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the token stream, one token per line
    Tokens(FileArgs),
    /// Print the syntax tree, then any recorded parse errors
    Tree(FileArgs),
    /// Browse the syntax tree interactively
    View(FileArgs),
}

#[derive(Debug, Args)]
struct FileArgs {
    /// C source file
    file: PathBuf,

    /// Leave space, tab and newline nodes out
    #[arg(long)]
    hide_whitespace: bool,

    /// Leave comment nodes out
    #[arg(long)]
    hide_comments: bool,

    /// Never emit ANSI colour codes
    #[arg(long)]
    no_color: bool,

    /// Recorded parse errors kept before the rest are dropped
    #[arg(long, value_name = "N", default_value_t = crustree::parser::error::MAX_PARSE_ERRORS)]
    max_errors: usize,

    /// Append fatal errors to this file as well as stderr
    #[arg(long, value_name = "PATH", env = "CRUSTREE_ERROR_LOG")]
    error_log: Option<PathBuf>,
}

impl FileArgs {
    fn config(&self) -> Config {
        Config {
            show_whitespace: !self.hide_whitespace,
            show_comments: !self.hide_comments,
            color: !self.no_color && io::stdout().is_terminal(),
            max_errors: self.max_errors,
            error_log: self.error_log.clone(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Tokens(args) => {
            let source = read_source(&args.file);
            let config = args.config();
            let tokens = Lexer::new(&source).tokenize();
            info!("{} tokens in {}", tokens.len(), args.file.display());

            let mut out = BufWriter::new(io::stdout().lock());
            print_tokens(&mut out, &tokens, &config.print_options())?;
            out.flush()?;
        }
        Command::Tree(args) => {
            let source = read_source(&args.file);
            let config = args.config();
            let file = parse_or_exit(&source, &args.file, &config)?;
            log_statistics(&file.tree);

            let mut out = BufWriter::new(io::stdout().lock());
            print_tree(&mut out, &file.tree, &config.print_options())?;
            print_errors(&mut out, &file.errors)?;
            out.flush()?;
        }
        Command::View(args) => {
            let source = read_source(&args.file);
            let config = args.config();
            let file = parse_or_exit(&source, &args.file, &config)?;
            log_statistics(&file.tree);
            run_viewer(file, &config)?;
        }
    }

    Ok(())
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "crustree=info",
        1 => "crustree=debug",
        _ => "crustree=trace",
    }
}

fn read_source(path: &Path) -> Vec<u8> {
    match fs::read(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Parse `source`; a fatal error is reported and ends the process with status 1.
fn parse_or_exit<'src>(
    source: &'src [u8],
    path: &Path,
    config: &Config,
) -> io::Result<ParsedFile<'src>> {
    match Parser::new(source)
        .with_error_capacity(config.max_errors)
        .parse_file()
    {
        Ok(file) => Ok(file),
        Err(err) => {
            config.report_fatal(path, &err)?;
            eprintln!("Fatal: {}: {}", path.display(), err);
            std::process::exit(1);
        }
    }
}

fn log_statistics(tree: &SyntaxTree<'_>) {
    let mut counts: Vec<_> = tree.kind_counts().into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.to_string().cmp(&b.0.to_string())));

    let summary = counts
        .iter()
        .map(|(kind, count)| format!("{kind}={count}"))
        .collect::<Vec<_>>()
        .join(" ");
    info!("{} nodes: {}", tree.len(), summary);
}

fn run_viewer(file: ParsedFile<'_>, config: &Config) -> io::Result<()> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(file, config.print_options());
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }
    Ok(())
}
