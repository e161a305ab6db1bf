use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clima_core::{AppError, Config};
use clima_ui::atmosphere::{self, Atmosphere};
use clima_ui::render::summary_line;
use clima_ui::{Dashboard, DisplayList, FileStore, HeadlessMap, MapWidget, UiEvent};
use clima_weather::{
    Coordinates, Endpoints, FixedLocation, LocationSource, TemperatureUnit, UnsupportedLocation,
    WeatherProvider,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const HELP: &str = "\
comandos:
  <cidade>          buscar e carregar
  ?<texto>          sugestões para o texto
  :pick N           escolher a sugestão N
  :history CIDADE   recarregar do histórico
  :unit c|f         unidade de temperatura
  :here             usar a localização configurada
  :map LAT LON      clicar no mapa
  :next / :prev     navegar no carrossel
  :quit             sair";

#[derive(Parser, Debug)]
#[command(name = "clima", version, about = "Clima: busca de cidades, previsão de 7 dias e mapa")]
struct Cli {
    /// City to load on start
    city: Option<String>,

    /// Temperature unit
    #[arg(long, value_enum)]
    unit: Option<UnitArg>,

    /// Write the rendered page here instead of stdout
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Device latitude for "use my location"
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Device longitude for "use my location"
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep reading commands from stdin (the default without a city or coordinates)
    #[arg(long, short)]
    interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UnitArg {
    C,
    F,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::C => TemperatureUnit::Celsius,
            UnitArg::F => TemperatureUnit::Fahrenheit,
        }
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Events(Vec<UiEvent>),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some(text) = line.strip_prefix('?') {
        return Some(Command::Events(vec![UiEvent::Input(text.to_string())]));
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Some(Command::Events(vec![
            UiEvent::Input(line.to_string()),
            UiEvent::KeyEnter,
        ]));
    };

    let mut parts = rest.split_whitespace();
    let event = match parts.next()? {
        "quit" | "q" => return Some(Command::Quit),
        "help" | "h" => return Some(Command::Help),
        "here" => UiEvent::UseLocation,
        "next" => UiEvent::CarouselNext,
        "prev" => UiEvent::CarouselPrev,
        "pick" => {
            let n: usize = parts.next()?.parse().ok()?;
            UiEvent::PickSuggestion(n.checked_sub(1)?)
        }
        "history" => {
            let city = parts.collect::<Vec<_>>().join(" ");
            if city.is_empty() {
                return None;
            }
            UiEvent::PickHistory(city)
        }
        "unit" => match parts.next()? {
            "c" | "C" => UiEvent::ToggleUnit(TemperatureUnit::Celsius),
            "f" | "F" => UiEvent::ToggleUnit(TemperatureUnit::Fahrenheit),
            _ => return None,
        },
        "map" => {
            let latitude: f64 = parts.next()?.parse().ok()?;
            let longitude: f64 = parts.next()?.parse().ok()?;
            UiEvent::MapClick {
                latitude,
                longitude,
            }
        }
        _ => return None,
    };
    Some(Command::Events(vec![event]))
}

fn build_provider(config: &Config) -> Result<WeatherProvider> {
    let endpoints = Endpoints {
        geocoding: config.api.geocoding_url.clone(),
        reverse_geocoding: config.api.reverse_geocoding_url.clone(),
        forecast: config.api.forecast_url.clone(),
    };
    WeatherProvider::with_options(
        endpoints,
        &config.api.language,
        Duration::from_secs(config.api.timeout_secs),
    )
    .context("Failed to create weather client")
}

fn write_page(out: Option<&Path>, html: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, html)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", html);
            Ok(())
        }
    }
}

fn print_summary<W: MapWidget>(dashboard: &Dashboard<W>) {
    let state = dashboard.state();
    if let Some((place, data)) = state.current_place().zip(state.current_data()) {
        println!("{}", summary_line(data, place, state.unit()));
    }
    if let Some(toast) = dashboard.page().toast() {
        println!("{} {}", toast.kind.icon(), toast.message);
    }
}

/// Forward stdin lines to the dashboard until `:quit` or EOF
async fn read_commands(events: mpsc::Sender<UiEvent>, cancel: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read stdin: {}", e);
                break;
            }
        };
        match parse_command(&line) {
            Some(Command::Events(batch)) => {
                for event in batch {
                    if events.send(event).await.is_err() {
                        return;
                    }
                }
            }
            Some(Command::Help) => println!("{}", HELP),
            Some(Command::Quit) => break,
            None => println!("comando inválido (:help)"),
        }
    }
    cancel.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    clima_core::init()?;

    let loaded = match &cli.config {
        Some(path) => clima_core::App::from_path(path),
        None => clima_core::App::new(),
    };
    let mut app = match loaded {
        Ok(app) => app,
        Err(e) => {
            let err = AppError::from(e);
            eprintln!("{}", err.user_message());
            return Err(err.into());
        }
    };
    let config = app.shared_config();
    tracing::info!("Clima started (storage: {})", config.storage_path().display());

    let provider = Arc::new(build_provider(&config)?);
    let position = cli
        .lat
        .zip(cli.lon)
        .or_else(|| config.location.coordinates());
    let location: Arc<dyn LocationSource> = match position {
        Some((latitude, longitude)) => {
            Arc::new(FixedLocation(Coordinates::new(latitude, longitude)))
        }
        None => Arc::new(UnsupportedLocation),
    };
    let store = FileStore::open(config.storage_path());
    let map = HeadlessMap::new();

    let mut dashboard = Dashboard::new(
        config.clone(),
        provider,
        location,
        Box::new(store),
        map.clone(),
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted");
                cancel.cancel();
            }
        });
    }

    let atmosphere_task = tokio::spawn(atmosphere::run(
        Atmosphere::new(
            f64::from(config.ui.viewport_width),
            f64::from(config.ui.viewport_height),
        ),
        DisplayList::default(),
        dashboard.subscribe_scene(),
        cancel.child_token(),
    ));

    if let Some(unit) = cli.unit {
        dashboard.handle_event(UiEvent::ToggleUnit(unit.into()), tokio::time::Instant::now());
    }
    if let Some(city) = &cli.city {
        dashboard.handle_event(UiEvent::Input(city.clone()), tokio::time::Instant::now());
        dashboard.handle_event(UiEvent::KeyEnter, tokio::time::Instant::now());
    } else if cli.lat.is_some() {
        dashboard.handle_event(UiEvent::UseLocation, tokio::time::Instant::now());
    }
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = dashboard.settle() => {}
    }

    let interactive = cli.interactive || (cli.city.is_none() && cli.lat.is_none());
    if interactive {
        let (events_tx, events_rx) = mpsc::channel(32);
        tokio::spawn(read_commands(events_tx, cancel.clone()));

        if let Some(out) = cli.out.clone() {
            let mut page = dashboard.subscribe_page();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        changed = page.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            let html = page.borrow_and_update().clone();
                            if let Err(e) = write_page(Some(&out), &html) {
                                tracing::warn!("{:#}", e);
                            }
                        }
                    }
                }
            });
        }

        print_summary(&dashboard);
        dashboard = dashboard.run(events_rx, cancel.clone()).await;
    }

    print_summary(&dashboard);
    let html = dashboard.subscribe_page().borrow().clone();
    write_page(cli.out.as_deref(), &html)?;

    cancel.cancel();
    match atmosphere_task.await {
        Ok(canvas) => tracing::debug!("Atmosphere drew {} frames", canvas.frames),
        Err(e) => tracing::warn!("Atmosphere task failed: {}", e),
    }
    if let Some(center) = map.center() {
        tracing::debug!("Map centred on {:.4}, {:.4}", center.latitude, center.longitude);
    }

    app.shutdown()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_plain_text_searches() {
        assert_eq!(
            parse_command("  São Paulo "),
            Some(Command::Events(vec![
                UiEvent::Input("São Paulo".into()),
                UiEvent::KeyEnter
            ]))
        );
    }

    #[test]
    fn test_question_mark_only_types() {
        assert_eq!(
            parse_command("?Lis"),
            Some(Command::Events(vec![UiEvent::Input("Lis".into())]))
        );
    }

    #[test]
    fn test_colon_commands() {
        assert_eq!(
            parse_command(":pick 2"),
            Some(Command::Events(vec![UiEvent::PickSuggestion(1)]))
        );
        assert_eq!(parse_command(":pick 0"), None);
        assert_eq!(
            parse_command(":map 38.7 -9.1"),
            Some(Command::Events(vec![UiEvent::MapClick {
                latitude: 38.7,
                longitude: -9.1
            }]))
        );
        assert_eq!(
            parse_command(":unit f"),
            Some(Command::Events(vec![UiEvent::ToggleUnit(
                TemperatureUnit::Fahrenheit
            )]))
        );
        assert_eq!(
            parse_command(":history Rio de Janeiro"),
            Some(Command::Events(vec![UiEvent::PickHistory(
                "Rio de Janeiro".into()
            )]))
        );
        assert_eq!(parse_command(":quit"), Some(Command::Quit));
        assert_eq!(parse_command(":bogus"), None);
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn test_cli_parses_negative_coordinates() {
        let cli = Cli::try_parse_from(["clima", "--lat", "38.7", "--lon", "-9.1"]).unwrap();
        assert_eq!(cli.lat, Some(38.7));
        assert_eq!(cli.lon, Some(-9.1));
        assert!(cli.city.is_none());

        assert!(Cli::try_parse_from(["clima", "--lat", "38.7"]).is_err());
    }
}
