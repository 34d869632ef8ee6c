use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Text};
use std::sync::Arc;

use weathermap_core::{Config, Coordinate, Session, View, coord};

use crate::terminal::{MapHandle, TerminalDisplay, TerminalMapFactory, TerminalSurface};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weathermap",
    version,
    about = "Explore current weather anywhere on Earth"
)]
pub struct Cli {
    /// Weather API key; overrides the configured one.
    #[arg(
        long,
        global = true,
        env = "WEATHERMAP_API_KEY",
        hide_env_values = true
    )]
    pub api_key: Option<String>,

    /// Drop results of clicks superseded by a newer click.
    #[arg(long, global = true)]
    pub latest_click_wins: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weather API key in the config file.
    Configure,

    /// Open the map and click a coordinate.
    Click {
        #[arg(allow_hyphen_values = true, value_parser = parse_latitude)]
        latitude: f64,
        #[arg(allow_hyphen_values = true, value_parser = parse_longitude)]
        longitude: f64,
    },

    /// Look up a city and show its weather.
    Search {
        /// City name, e.g. "New York".
        city: Vec<String>,
    },

    /// Interactive session: home, map, click LAT LON, search CITY, quit.
    Explore,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(key) = self.api_key {
            config.set_weather_api_key(key);
        }
        if self.latest_click_wins {
            config.session.latest_click_wins = true;
        }

        match self.command {
            Command::Configure => configure(config),
            Command::Click {
                latitude,
                longitude,
            } => {
                let (session, _) = build_session(&config)?;
                session.show(View::Map).await?;
                // Outcome is already on screen.
                let _ = session.click(Coordinate::new(latitude, longitude)).await;
                Ok(())
            }
            Command::Search { city } => {
                let (session, _) = build_session(&config)?;
                match session.search(&city.join(" ")).await {
                    // Recoverable failures were already shown to the user.
                    Err(err) if !err.is_recoverable() => Err(err.into()),
                    _ => Ok(()),
                }
            }
            Command::Explore => explore(&config).await,
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let key = Password::new("Weather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to remove the stored key")
        .prompt()?;

    config.set_weather_api_key(key);
    config.save()?;

    let path = Config::config_file_path()?;
    if config.is_weather_configured() {
        println!("API key saved to {}", path.display());
    } else {
        println!("API key removed from {}", path.display());
    }
    Ok(())
}

fn build_session(config: &Config) -> anyhow::Result<(Arc<Session>, MapHandle)> {
    let factory = TerminalMapFactory::default();
    let handle = factory.handle();

    let (session, clicks) = Session::from_config(
        config,
        Box::new(factory),
        Arc::new(TerminalSurface),
        Arc::new(TerminalDisplay),
    )?;
    let session = Arc::new(session);

    tokio::spawn(session.clone().dispatch_clicks(clicks));

    if !config.is_weather_configured() {
        eprintln!("warning: no weather API key configured, run `weathermap configure`");
    }
    Ok((session, handle))
}

#[derive(Debug, PartialEq)]
enum Input {
    Show(View),
    Click(Coordinate),
    Search(String),
    Quit,
}

fn parse_input(line: &str) -> anyhow::Result<Option<Input>> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let input = match word.to_lowercase().as_str() {
        "" => return Ok(None),
        "quit" | "exit" => Input::Quit,
        "search" => Input::Search(rest.to_string()),
        "click" => {
            let mut parts = rest
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|p| !p.is_empty());
            let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
                anyhow::bail!("usage: click LAT LON");
            };
            let lat = parse_latitude(lat)?;
            let lon = parse_longitude(lon)?;
            Input::Click(Coordinate::new(lat, lon))
        }
        other => Input::Show(View::try_from(other)?),
    };
    Ok(Some(input))
}

fn parse_latitude(text: &str) -> anyhow::Result<f64> {
    let value = parse_number(text, "latitude")?;
    coord::check_latitude(value)
}

fn parse_longitude(text: &str) -> anyhow::Result<f64> {
    let value = parse_number(text, "longitude")?;
    coord::check_longitude(value)
}

fn parse_number(text: &str, name: &str) -> anyhow::Result<f64> {
    text.trim()
        .parse()
        .with_context(|| format!("invalid {name} '{text}'"))
}

async fn explore(config: &Config) -> anyhow::Result<()> {
    let (session, map) = build_session(config)?;

    loop {
        // The prompt blocks; keep it off the runtime so fetches keep running.
        let line = tokio::task::spawn_blocking(|| {
            Text::new("weathermap>")
                .with_help_message("home | map | click LAT LON | search CITY | quit")
                .prompt()
        })
        .await??;

        let input = match parse_input(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err:#}");
                continue;
            }
        };

        match input {
            Input::Quit => break,
            Input::Show(view) => session.show(view).await?,
            Input::Search(city) => match session.search(&city).await {
                Err(err) if !err.is_recoverable() => return Err(err.into()),
                _ => {}
            },
            Input::Click(at) => {
                if session.active_view() != View::Map {
                    eprintln!("open the map first");
                } else if !map.click(at) {
                    eprintln!("map is not ready yet");
                }
            }
        }
    }

    Ok(())
}
