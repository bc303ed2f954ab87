//! CLI entry point for the Vanga house price predictor.
//!
//! Provides subcommands for requesting a prediction, rendering a saved
//! prediction response, and showing the static pages.

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use vanga_predict::{
    app::App,
    config::Config,
    error::SubmitError,
    export::Exporter,
    form::{FormField, FormInput, HouseType},
    infra::prediction::PredictionClient,
    model::PredictionResult,
    output::{print_json, render_form, render_result},
    pages,
    routes::Route,
};

#[derive(Parser)]
#[command(name = "vanga_predict")]
#[command(about = "Predict house prices with the Vanga Realestate model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit the property form to the prediction service
    Predict {
        #[command(flatten)]
        form: FormArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Prediction endpoint (overrides PREDICT_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,

        /// Request timeout in seconds (overrides PREDICT_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Render a saved prediction response without contacting the service
    Show {
        /// JSON body previously returned by the prediction endpoint
        #[arg(value_name = "RESPONSE_JSON")]
        response: PathBuf,

        #[command(flatten)]
        form: FormArgs,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Print a static page by path (/, /home, /about, /search, /error)
    Page {
        #[arg(value_name = "PATH", default_value = "/")]
        path: String,
    },
}

#[derive(Args)]
struct FormArgs {
    /// Street address of the property
    #[arg(long)]
    address: Option<String>,

    /// Number of bathrooms
    #[arg(long)]
    bathrooms: Option<String>,

    /// Number of bedrooms
    #[arg(long)]
    bedrooms: Option<String>,

    /// Number of carparks
    #[arg(long)]
    carpark: Option<String>,

    /// Type of house
    #[arg(long, value_enum)]
    house_type: Option<HouseTypeArg>,

    /// Building area in square metres
    #[arg(long)]
    building_area: Option<String>,

    /// Land size in square metres
    #[arg(long)]
    landsize: Option<String>,
}

impl FormArgs {
    fn fill(self, form: &mut FormInput) {
        let values = [
            (FormField::Address, self.address),
            (FormField::Bathrooms, self.bathrooms),
            (FormField::Bedrooms, self.bedrooms),
            (FormField::Carpark, self.carpark),
            (
                FormField::HouseType,
                self.house_type.map(|t| HouseType::from(t).as_str().to_string()),
            ),
            (FormField::BuildingArea, self.building_area),
            (FormField::Landsize, self.landsize),
        ];
        for (field, value) in values {
            if let Some(value) = value {
                form.set_field(field, value.trim());
            }
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum HouseTypeArg {
    Townhouse,
    House,
    Unit,
}

impl From<HouseTypeArg> for HouseType {
    fn from(arg: HouseTypeArg) -> Self {
        match arg {
            HouseTypeArg::Townhouse => HouseType::Townhouse,
            HouseTypeArg::House => HouseType::House,
            HouseTypeArg::Unit => HouseType::Unit,
        }
    }
}

#[derive(Args)]
struct ViewArgs {
    /// Year to chart the monthly median price for
    #[arg(short, long)]
    year: Option<i32>,

    /// Export the result view to report.pdf
    #[arg(long, default_value_t = false)]
    export: bool,

    /// Also save the result view as report.png
    #[arg(long, default_value_t = false)]
    png: bool,

    /// Log the raw prediction as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Directory for exported files (overrides EXPORT_DIR)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _log_guard = init_tracing();
    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Predict {
            form,
            view,
            endpoint,
            timeout_secs,
        } => {
            if let Some(endpoint) = endpoint {
                config.endpoint = endpoint;
            }
            if let Some(secs) = timeout_secs {
                config.timeout = Duration::from_secs(secs.max(1));
            }

            let mut app = App::new();
            app.navigate(Route::Search);
            form.fill(app.form_mut());

            let client = PredictionClient::from_config(&config)?;
            info!(endpoint = %client.endpoint(), "Loading, please wait...");

            match app.submit(&client).await {
                Ok(_) => {}
                Err(SubmitError::Validation(e)) => {
                    println!("{}", render_form(&app));
                    bail!(e);
                }
                Err(e) => bail!(e),
            }

            present(&mut app, view, &config).await?;
        }
        Commands::Show {
            response,
            form,
            view,
        } => {
            let result = PredictionResult::from_slice(&std::fs::read(&response)?)?;

            let mut app = App::new();
            app.navigate(Route::Search);
            form.fill(app.form_mut());

            let submission = match app.begin_submit() {
                Ok(s) => s,
                Err(e) => {
                    println!("{}", render_form(&app));
                    bail!(e);
                }
            };
            app.finish_submit(submission, Ok(result));

            present(&mut app, view, &config).await?;
        }
        Commands::Page { path } => {
            let mut app = App::new();
            let route = app.open(&path)?;
            let body = match route {
                Route::Home => pages::home(),
                Route::About => pages::about(),
                Route::Error => pages::error_page(),
                Route::Search | Route::Predict => render_form(&app),
            };
            println!("{}\n\n{body}\n{}", pages::navbar(), pages::footer());
        }
    }

    Ok(())
}

/// Shows whatever page the submission ended on and runs requested exports.
async fn present(app: &mut App, view: ViewArgs, config: &Config) -> Result<()> {
    if app.route() != Route::Predict {
        println!("{}", pages::error_page());
        bail!("prediction failed: {:?}", app.request_state());
    }
    let Some(page) = app.result_page_mut() else {
        bail!("result page has no prediction");
    };

    if let Some(year) = view.year {
        if !page.years().contains(&year) {
            warn!(year, available = ?page.years(), "No median prices for selected year");
        }
        page.select_year(year);
    }

    println!("{}", render_result(page));

    if view.json {
        print_json(page.result())?;
    }

    if view.export || view.png {
        let dir = view.out_dir.unwrap_or_else(|| config.export_dir.clone());
        std::fs::create_dir_all(&dir)?;
        let exporter = Exporter::new(dir);

        if view.export {
            match exporter.export_current_view(page).await {
                Ok(path) => println!("Report saved to {}", path.display()),
                Err(e) => {
                    error!(error = %e, "Export failed");
                    return Err(e.into());
                }
            }
        }
        if view.png {
            let path = exporter.export_snapshot(page).await?;
            println!("Snapshot saved to {}", path.display());
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/vanga_predict.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("vanga_predict.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    guard
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}
