use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blueprinter::config::Settings;
use blueprinter::floorplan::FloorPlanRequest;
use blueprinter::projection::ProjectionRequest;
use blueprinter::request::{Response, Route, dispatch};
use blueprinter::robot::RobotRequest;
use blueprinter::{Engine, FsSink};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_CONFIG: u8 = 1;
const EXIT_CLIENT_ERROR: u8 = 2;

/// Render floor-plan blueprints, investment projections and robot schematics
#[derive(Parser, Debug)]
#[command(name = "blueprinter")]
#[command(version)]
#[command(about = "Render parametric blueprints and charts to PNG", long_about = None)]
struct Args {
    /// Settings file (TOML or YAML)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory artifacts are written to (overrides the settings file)
    #[arg(short, long, value_name = "DIR", global = true)]
    output_dir: Option<PathBuf>,

    /// Directory with extra font files for labels (overrides the settings file)
    #[arg(long, value_name = "DIR", global = true)]
    fonts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// House floor-plan blueprint (house_blueprint.png)
    House {
        #[arg(long, default_value_t = FloorPlanRequest::DEFAULT_FLOORS, allow_negative_numbers = true)]
        floors: i64,

        /// Rooms per floor
        #[arg(long, default_value_t = FloorPlanRequest::DEFAULT_ROOMS, allow_negative_numbers = true)]
        rooms: i64,

        #[arg(long, default_value_t = FloorPlanRequest::DEFAULT_SQFT, allow_negative_numbers = true)]
        sqft: i64,
    },

    /// Investment projection chart (crypto_plan.png)
    Crypto {
        #[arg(long, default_value = ProjectionRequest::DEFAULT_ASSET_TYPE)]
        investment_type: String,

        /// Budget in rupees
        #[arg(long, default_value_t = ProjectionRequest::DEFAULT_BUDGET, allow_negative_numbers = true)]
        budget: f64,
    },

    /// Robot schematic (robot_model.png)
    Robot {
        #[arg(long, default_value = RobotRequest::DEFAULT_ROBOT_TYPE)]
        robot_type: String,
    },

    /// Dispatch a JSON request body to a route, e.g. `generate_house`
    Request {
        #[arg(value_name = "ROUTE")]
        route: Route,

        /// JSON body file (use "-" for stdin)
        #[arg(value_name = "INPUT", default_value = "-")]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blueprinter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut settings = match args.config {
        Some(ref path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                error!("{}", e);
                return ExitCode::from(EXIT_CONFIG);
            }
        },
        None => Settings::default(),
    };
    if let Some(dir) = args.output_dir {
        settings.output_dir = dir;
    }
    if let Some(dir) = args.fonts_dir {
        settings.fonts_dir = Some(dir);
    }

    let engine = Engine::from_settings(&settings);
    let sink = FsSink::with_public_prefix(&settings.output_dir, &settings.public_prefix);

    let response = match args.command {
        Command::House {
            floors,
            rooms,
            sqft,
        } => Response::from_result(engine.render_floor_plan(floors, rooms, sqft, &sink)),
        Command::Crypto {
            investment_type,
            budget,
        } => Response::from_result(engine.render_projection(&investment_type, budget, &sink)),
        Command::Robot { robot_type } => {
            Response::from_result(engine.render_robot_schematic(&robot_type, &sink))
        }
        Command::Request { route, input } => match read_body(&input) {
            Ok(body) => dispatch(&engine, &sink, route, &body),
            Err(message) => Response::Error { error: message },
        },
    };

    match serde_json::to_string(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if response.is_error() {
        ExitCode::from(EXIT_CLIENT_ERROR)
    } else {
        ExitCode::SUCCESS
    }
}

fn read_body(input: &Path) -> Result<serde_json::Value, String> {
    let raw = if input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .map_err(|e| format!("Failed to read request body: {}", e))?
    };

    serde_json::from_str(&raw).map_err(|e| format!("Invalid JSON body: {}", e))
}
