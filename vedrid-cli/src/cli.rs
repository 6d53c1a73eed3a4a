use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use std::{fmt, process::ExitCode, sync::Arc};

use vedrid_core::{
    Config, Coordinate, Orchestrator, Outcome, SearchResult, Services,
    map::MapClickReceiver,
    view::{self, Action},
};

use crate::{
    render,
    terminal::{OutputFormat, TerminalMap, TerminalSurface},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "vedrid", version, about = "Hourly weather forecast for a place")]
pub struct Cli {
    /// Print the output area as HTML instead of text.
    #[arg(long, global = true)]
    pub html: bool,

    /// Log more (-v debug, -vv trace). `RUST_LOG` overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the user agent, home position and map zoom.
    Configure,

    /// List the predefined locations.
    List,

    /// Look up a place by name and show its forecast.
    Show {
        /// Place name, e.g. "Vík í Mýrdal".
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Show the forecast for a predefined location.
    Place {
        /// Title as printed by `vedrid list`.
        title: String,
    },

    /// Show the forecast for the configured home position.
    Here,

    /// Show the forecast for a coordinate, as if clicked on the map.
    At {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },

    /// Pick locations from a menu until you quit.
    Interactive,
}

/// The orchestrator wired to terminal output.
struct App {
    orchestrator: Arc<Orchestrator>,
    clicks: MapClickReceiver,
    map: TerminalMap,
}

impl App {
    fn new(config: &Config, format: OutputFormat) -> anyhow::Result<Self> {
        let services = Services::from_config(config).context("Failed to set up weather services")?;
        tracing::debug!(
            forecast = %config.forecast_url,
            geocode = %config.geocode_url,
            home = config.home.is_some(),
            "services configured"
        );
        let map = TerminalMap::new(format);

        let (orchestrator, clicks) = Orchestrator::new(
            services,
            Arc::new(TerminalSurface::new(format)),
            Box::new(map.clone()),
            config.map.clone(),
        );

        Ok(Self { orchestrator: Arc::new(orchestrator), clicks, map })
    }

    /// Run one of the one-shot search commands.
    async fn search(&self, command: Command, config: &Config) -> anyhow::Result<Outcome> {
        let outcome = match command {
            Command::Show { name } => self.orchestrator.search_by_name(&name.join(" ")).await,
            Command::Place { title } => {
                let location = config.location(&title).ok_or_else(|| {
                    anyhow!("Unknown location '{title}'.\nHint: run `vedrid list` to see the choices.")
                })?;
                self.orchestrator.search_predefined(location).await
            }
            Command::Here => self.orchestrator.search_my_location().await,
            Command::At { lat, lng } => self.orchestrator.on_map_clicked(lat, lng).await,
            Command::Configure | Command::List | Command::Interactive => Outcome::Ignored,
        };

        Ok(outcome)
    }
}

impl Cli {
    pub fn format(&self) -> OutputFormat {
        if self.html { OutputFormat::Html } else { OutputFormat::Text }
    }

    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let format = self.format();

        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::List => {
                list(&Config::load()?);
                Ok(ExitCode::SUCCESS)
            }
            Command::Interactive => {
                let config = Config::load()?;
                interactive(App::new(&config, format)?, &config).await?;
                Ok(ExitCode::SUCCESS)
            }
            search => {
                let config = Config::load()?;
                let outcome = App::new(&config, format)?.search(search, &config).await?;
                Ok(if failed(&outcome) { ExitCode::FAILURE } else { ExitCode::SUCCESS })
            }
        }
    }
}

fn failed(outcome: &Outcome) -> bool {
    matches!(outcome, Outcome::Rendered(SearchResult::Error(_)))
}

fn list(config: &Config) {
    for location in &config.locations {
        match location.coord {
            Some(coord) => println!("{:<20} {coord}", location.title),
            None => println!("{:<20} (staðsetning tækis)", location.title),
        }
    }
}

/// One entry of the interactive menu.
#[derive(Debug, Clone)]
enum Choice {
    Page(String, Action),
    ClickMap,
    Quit,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Page(label, Action::SubmitName) => write!(f, "{label} að stað…"),
            Choice::Page(label, _) => f.write_str(label),
            Choice::ClickMap => f.write_str("Velja punkt á korti…"),
            Choice::Quit => f.write_str("Hætta"),
        }
    }
}

/// Treat Esc and Ctrl-C as "back out", everything else as a real error.
fn cancelled<T>(res: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn interactive(mut app: App, config: &Config) -> anyhow::Result<()> {
    let shell = view::app_shell(&config.locations);
    if let Some(header) = shell.find_all("header").first() {
        println!("{}", render::to_text(&view::Node::Element((*header).clone())));
    }

    let actions = shell.actions();

    loop {
        let mut choices: Vec<Choice> = actions
            .iter()
            .map(|(label, action)| Choice::Page(label.clone(), *action))
            .collect();
        if app.map.is_mounted() {
            choices.push(Choice::ClickMap);
        }
        choices.push(Choice::Quit);

        let Some(choice) = cancelled(Select::new("Veldu stað", choices).prompt())? else {
            break;
        };

        match choice {
            Choice::Page(_, Action::Search(idx)) => {
                if let Some(location) = config.locations.get(idx) {
                    app.orchestrator.search_predefined(location).await;
                }
            }
            Choice::Page(_, Action::SearchMyLocation) => {
                app.orchestrator.search_my_location().await;
            }
            Choice::Page(_, Action::SubmitName) => {
                if let Some(name) = cancelled(Text::new("Leita að stað:").prompt())? {
                    app.orchestrator.search_by_name(&name).await;
                }
            }
            Choice::ClickMap => click_map(&mut app).await?,
            Choice::Quit => break,
        }
    }

    Ok(())
}

/// Read a coordinate and report it as a click on the mounted map.
async fn click_map(app: &mut App) -> anyhow::Result<()> {
    let Some(lat) = cancelled(CustomType::<f64>::new("Breiddargráða:").prompt())? else {
        return Ok(());
    };
    let Some(lng) = cancelled(CustomType::<f64>::new("Lengdargráða:").prompt())? else {
        return Ok(());
    };

    if !app.map.click(lat, lng) {
        return Ok(());
    }

    if let Some(click) = app.clicks.recv().await {
        app.orchestrator.on_map_clicked(click.lat, click.lng).await;
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.user_agent = Text::new("User agent (sent to Nominatim):")
        .with_default(&config.user_agent)
        .prompt()?;

    let set_home = Confirm::new("Set a home position for `vedrid here`?")
        .with_default(config.home.is_some())
        .prompt()?;

    if set_home {
        let lat = CustomType::<f64>::new("Latitude:")
            .with_default(config.home.map_or(64.1355, |h| h.lat))
            .prompt()?;
        let lng = CustomType::<f64>::new("Longitude:")
            .with_default(config.home.map_or(-21.8954, |h| h.lng))
            .prompt()?;
        config.set_home(Coordinate::new(lat, lng)?);
    } else {
        config.home = None;
    }

    config.map.zoom = CustomType::<u8>::new("Map zoom level:")
        .with_default(config.map.zoom)
        .prompt()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn at_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["vedrid", "at", "-33.8688", "151.2093"]).unwrap();
        match cli.command {
            Command::At { lat, lng } => {
                assert_eq!(lat, -33.8688);
                assert_eq!(lng, 151.2093);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn show_joins_words_and_html_is_global() {
        let cli = Cli::try_parse_from(["vedrid", "show", "Vík", "í", "Mýrdal", "--html"]).unwrap();
        assert_eq!(cli.format(), OutputFormat::Html);
        match cli.command {
            Command::Show { name } => assert_eq!(name.join(" "), "Vík í Mýrdal"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn show_requires_a_name() {
        assert!(Cli::try_parse_from(["vedrid", "show"]).is_err());
    }

    #[test]
    fn error_outcome_fails_the_process() {
        let err = Outcome::Rendered(SearchResult::Error("Gat ekki fundið staðsetningu".into()));
        assert!(failed(&err));
        assert!(!failed(&Outcome::Ignored));
        assert!(!failed(&Outcome::Superseded));
    }

    #[test]
    fn menu_labels() {
        assert_eq!(Choice::Page("Leita".into(), Action::SubmitName).to_string(), "Leita að stað…");
        assert_eq!(Choice::Page("Tokyo".into(), Action::Search(4)).to_string(), "Tokyo");
    }
}
