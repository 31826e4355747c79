use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use checkin::db::init_db;
use checkin::service::teachers;

#[derive(Debug, Parser)]
#[command(name = "manage_teachers")]
#[command(about = "Create, update or delete teacher accounts")]
struct Args {
    /// Defaults to DATABASE_URL, then the server's default database
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Create a teacher; the password is read from stdin
    Create { username: String },
    /// Replace a teacher's password; the new password is read from stdin
    Update { username: String },
    /// Delete a teacher
    Delete { username: String },
}

fn read_password(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:sunday_school.db".to_string());
    let pool = init_db(&database_url)
        .await
        .with_context(|| format!("opening database {database_url}"))?;

    match args.action {
        Action::Create { username } => {
            let password = read_password("Enter password: ")?;
            teachers::create_teacher(&pool, &username, &password).await?;
            println!("Teacher {username} created successfully.");
        }
        Action::Update { username } => {
            let password = read_password("Enter new password: ")?;
            if teachers::update_password(&pool, &username, &password).await? {
                println!("Password for {username} updated successfully.");
            } else {
                println!("Teacher {username} not found.");
            }
        }
        Action::Delete { username } => {
            if teachers::delete_teacher(&pool, &username).await? {
                println!("Teacher {username} deleted successfully.");
            } else {
                println!("Teacher {username} not found.");
            }
        }
    }

    Ok(())
}
