mod app;
mod help;
mod logging;
mod logo;
mod picker;
mod session;
mod theme;
use crate::app::App;
use crate::logging::init_file_logger;
use crate::picker::Margins;
use crate::session::FileSession;
use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::io;
use std::path::PathBuf;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(Options),
    Help,
    Version,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Options {
    today: Option<Date>,
    session: Option<PathBuf>,
    role: Option<String>,
    margins: Margins,
    log_file: Option<PathBuf>,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = Options::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Long("session") => opts.session = Some(PathBuf::from(parser.value()?)),
                Arg::Long("role") => opts.role = Some(parser.value()?.string()?),
                Arg::Long("gap") => opts.margins.gap = parser.value()?.parse()?,
                Arg::Long("edge") => opts.margins.edge = parser.value()?.parse()?,
                Arg::Long("log-file") => opts.log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if opts.today.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&value, &YMD_FMT) {
                        Ok(d) => opts.today = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => {
                if let Some(path) = &opts.log_file {
                    init_file_logger(path)?;
                }
                let today = match opts.today {
                    Some(d) => d,
                    None => OffsetDateTime::now_local()
                        .context("failed to determine local date")?
                        .date(),
                };
                log::info!("Starting with today = {today}");
                let mut app = App::new(today, opts.margins);
                if opts.today.is_none() {
                    app = app.with_clock(local_today);
                }
                if let Some(path) = opts.session {
                    app = app.with_session(Box::new(FileSession::new(path)), opts.role);
                }
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    app.run(terminal).context("failed to run application")?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: ppms-picker [<options>] [YYYY-MM-DD]");
                println!();
                println!("Day & week picker popups for the PPMS production-management client");
                println!();
                println!("Options:");
                println!("  --session FILE    Check the session recorded in FILE before showing");
                println!("                    the form");
                println!("  --role ROLE       Require the logged-in user to have ROLE");
                println!("  --gap N           Cells between a picker and its trigger [default: 1]");
                println!("  --edge N          Minimum cells between a picker and the left edge of");
                println!("                    the screen [default: 1]");
                println!("  --log-file FILE   Write log messages to FILE");
                println!("  -h, --help        Display this help message and exit");
                println!("  -V, --version     Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn local_today() -> Option<Date> {
    OffsetDateTime::now_local().ok().map(OffsetDateTime::date)
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = execute!(io::stdout(), EnableMouseCapture)
        .context("failed to enable mouse capture")
        .and_then(|()| func(terminal));
    // Restore the terminal even if something above failed
    let _ = execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();
    r
}
