//! Command line front end: lists states and municipalities and writes the
//! map and climate charts of one municipality.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use municlima::{
    daily_table, monthly_table, ClientConfig, MuniClima, Session, State, StatusLine,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "municlima", about = "Climate of Brazilian municipalities")]
struct Cli {
    /// TOML file overriding service URLs, cache size and date window
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable states
    States,
    /// List the municipalities of a state
    Municipalities {
        /// UF abbreviation (e.g., "MT")
        #[arg(long)]
        state: String,
    },
    /// Write the map and monthly charts of one municipality
    Report {
        /// UF abbreviation (e.g., "MT")
        #[arg(long)]
        state: String,
        /// Municipality name as listed by `municipalities`
        #[arg(long, conflicts_with = "code", required_unless_present = "code")]
        municipality: Option<String>,
        /// Seven-digit IBGE municipality code
        #[arg(long)]
        code: Option<u32>,
        /// Start and end date (YYYY-MM-DD). Defaults to the configured range.
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        dates: Option<Vec<NaiveDate>>,
        /// Directory receiving the HTML files
        #[arg(long, default_value = "report")]
        out: PathBuf,
        /// Daily rows to print after the monthly table
        #[arg(long, default_value = "10")]
        rows: usize,
    },
}

fn print_status(lines: Vec<StatusLine>) {
    for line in lines {
        eprintln!("{line}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    let client = MuniClima::with_config(config)?;

    match cli.command {
        Commands::States => {
            println!("{:<4} IBGE", "UF");
            println!("{}", "-".repeat(9));
            for state in State::all() {
                println!("{:<4} {}", state, state.ibge_code());
            }
        }
        Commands::Municipalities { state } => {
            let directory = client.municipalities(State::from_code(&state)?).await;
            if let Some(failure) = &directory.failure {
                eprintln!("aviso: {failure}");
            }
            println!("{:<8} NOME", "CÓDIGO");
            println!("{}", "-".repeat(40));
            for municipality in &directory.municipalities {
                println!("{:<8} {}", municipality.id, municipality.name);
            }
        }
        Commands::Report {
            state,
            municipality,
            code,
            dates,
            out,
            rows,
        } => {
            let mut session = Session::new(&client);
            let result = async {
                session.select_state(State::from_code(&state)?).await?;
                if let Some(dates) = &dates {
                    session.select_dates(dates).await?;
                }
                match (&municipality, code) {
                    (Some(name), _) => session.select_municipality(name).await,
                    (None, Some(id)) => session.select_municipality_code(id).await,
                    (None, None) => Err(municlima::MuniClimaError::NoMunicipalitySelected),
                }
            }
            .await;
            print_status(session.drain_status());
            result?;

            let rendered_at = chrono::Local::now().naive_local();
            let report = session.render(&out, rendered_at)?;
            println!("Gerado em {}", rendered_at.format("%Y-%m-%d %H:%M:%S"));
            println!("Mapa: {}", report.map.display());
            for chart in &report.charts {
                println!("Gráfico: {}", chart.display());
            }

            if let Some(climate) = session.climate() {
                println!();
                print!("{}", monthly_table(&climate.aggregates)?);
                println!();
                println!("Dados Climáticos");
                println!("{}", daily_table(&climate.series.frame()?, rows)?);
            }
        }
    }

    Ok(())
}
