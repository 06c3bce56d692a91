use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use academy::access::plan_course_entries;
use academy::api::{self, SecurityConfig};
use academy::config::AcademyConfig;
use academy::db::{self, Database};
use academy::grading::AutoGrader;
use academy::models::{Course, PlanCourseEntry};
use academy::store::CourseStore;

#[derive(Parser)]
#[command(name = "academy")]
#[command(about = "Development plans and sequential course access for HR e-learning")]
struct Cli {
    /// SQLite database file (overrides config and ACADEMY_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Import or export the course catalogue as JSON
    Courses {
        #[command(subcommand)]
        command: CourseCommands,
    },
    /// Print an employee's development plan with access state
    Plan {
        employee_id: Uuid,
    },
}

#[derive(Subcommand)]
enum CourseCommands {
    /// Write every course, archived included, to a JSON file
    Export { file: PathBuf },
    /// Insert or replace courses from a JSON file
    Import { file: PathBuf },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "academy=debug,tower_http=debug".into()),
    );

    // Logs go to stderr so command output on stdout stays clean.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database(cli_path: Option<PathBuf>, config: &AcademyConfig) -> Result<Database> {
    let path = match cli_path.or_else(|| config.db_path.clone()) {
        Some(path) => path,
        None => db::default_path()?,
    };
    let db = Database::open(path)?;
    db.migrate()?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AcademyConfig::load();
    let db = open_database(cli.db, &config)?;

    match cli.command {
        Some(Commands::Serve { port }) => {
            serve(db, &config, port.unwrap_or(config.port)).await?;
        }
        Some(Commands::Courses { command }) => match command {
            CourseCommands::Export { file } => {
                let courses = db.load()?;
                let json = serde_json::to_string_pretty(&courses)?;
                std::fs::write(&file, json)
                    .with_context(|| format!("Failed to write {}", file.display()))?;
                println!("Exported {} courses to {}", courses.len(), file.display());
            }
            CourseCommands::Import { file } => {
                let content = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let courses: Vec<Course> =
                    serde_json::from_str(&content).context("Failed to parse course file")?;
                db.save(&courses)?;
                println!("Imported {} courses from {}", courses.len(), file.display());
            }
        },
        Some(Commands::Plan { employee_id }) => {
            let employee = db
                .get_employee(employee_id)?
                .ok_or_else(|| anyhow::anyhow!("Employee {} not found", employee_id))?;
            let courses = db.load()?;

            println!("{}", employee.full_name);
            let entries = plan_course_entries(&employee, &courses);
            if entries.is_empty() {
                println!("  (no courses assigned)");
            }
            for entry in entries {
                match entry {
                    PlanCourseEntry::Available(c) => {
                        print!(
                            "  {:>3}. {:<40} {:>3}%  {}",
                            c.order,
                            c.course.title,
                            c.progress,
                            c.stage.as_str()
                        );
                        match c.access_status.reason {
                            Some(reason) => println!("  ({})", reason),
                            None => println!(),
                        }
                    }
                    PlanCourseEntry::Missing { course_id, order } => {
                        println!("  {:>3}. <missing course {}>", order, course_id);
                    }
                }
            }
        }
        None => {
            serve(db, &config, config.port).await?;
        }
    }

    Ok(())
}

async fn serve(db: Database, config: &AcademyConfig, port: u16) -> Result<()> {
    let security = SecurityConfig::from_env();
    if security.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    }

    let app = api::create_router_with(db, AutoGrader::new(config.pass_score), security);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Academy server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
