//! `petdir` command line front end.
//!
//! Usage:
//!   petdir add-cat --name Tom --weight 4.2
//!   petdir add-dog --name Rex --wags-tail
//!   petdir add-owner --age 30 --cat <id> --dog <id>
//!   petdir list [--type cat|dog]
//!   petdir cat <id> | petdir dog <id>
//!   petdir cats-weight | dogs-weight | happy-dogs
//!   petdir top-owners <age>
//!
//! Results are printed as JSON on stdout.

use anyhow::Context;
use clap::{Parser, Subcommand};
use petdir_core::config::DEFAULT_DB_FILE_NAME;
use petdir_core::db::open_db;
use petdir_core::{
    default_log_level, init_logging, parse_pet_id, CreateCat, CreateDog, CreateOwner, DocumentId,
    PetType, PetsService, ServiceConfig, ServiceError, SqliteDocumentStore,
};
use serde_json::to_value;
use std::path::PathBuf;
use std::process::ExitCode;

const NOT_FOUND_EXIT_CODE: u8 = 4;
const FAILURE_EXIT_CODE: u8 = 1;

#[derive(Parser)]
#[command(name = "petdir")]
#[command(about = "Cats, dogs and their owners in a SQLite document store")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "PETDIR_DB_PATH", default_value = DEFAULT_DB_FILE_NAME, global = true)]
    db: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, env = "PETDIR_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, env = "PETDIR_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a new cat
    AddCat {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        breed: Option<String>,
        #[arg(long)]
        weight: Option<f64>,
    },
    /// Store a new dog
    AddDog {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        breed: Option<String>,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        wags_tail: bool,
    },
    /// Seed an owner referencing existing pets
    AddOwner {
        #[arg(long, allow_negative_numbers = true)]
        age: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "cat")]
        cats: Vec<DocumentId>,
        #[arg(long = "dog")]
        dogs: Vec<DocumentId>,
    },
    /// List pets, optionally of one kind
    List {
        #[arg(long = "type")]
        pet_type: Option<PetType>,
    },
    /// Show one cat
    Cat { id: String },
    /// Show one dog
    Dog { id: String },
    /// Total weight of all cats
    CatsWeight,
    /// Total weight of all dogs
    DogsWeight,
    /// Names of dogs that wag their tail
    HappyDogs,
    /// Top three pet-count groups, keeping owners of the given age
    TopOwners {
        #[arg(allow_negative_numbers = true)]
        age: i64,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_status_for(&err))
        }
    }
}

/// Process exit status for a failed command: 4 for lookups that matched
/// nothing, 1 for everything else.
fn exit_status_for(err: &anyhow::Error) -> u8 {
    let not_found = err
        .downcast_ref::<ServiceError>()
        .is_some_and(ServiceError::is_not_found);
    if not_found {
        NOT_FOUND_EXIT_CODE
    } else {
        FAILURE_EXIT_CODE
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        db,
        log_level,
        log_dir,
        command,
    } = cli;

    let config = ServiceConfig {
        db_path: db,
        log_level: log_level.unwrap_or_else(|| default_log_level().to_string()),
        log_dir,
    }
    .validate()
    .map_err(anyhow::Error::msg)?;

    if let Some(dir) = &config.log_dir {
        init_logging(&config.log_level, &dir.to_string_lossy()).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    let store = SqliteDocumentStore::try_new(&conn)?;
    let service = PetsService::new(store);

    let output = match command {
        Commands::AddCat {
            name,
            age,
            breed,
            weight,
        } => to_value(service.add_cat(&CreateCat {
            name,
            age,
            breed,
            weight,
        })?)?,
        Commands::AddDog {
            name,
            age,
            breed,
            weight,
            wags_tail,
        } => to_value(service.add_dog(&CreateDog {
            name,
            age,
            breed,
            weight,
            wags_tail,
        })?)?,
        Commands::AddOwner {
            age,
            name,
            cats,
            dogs,
        } => to_value(service.add_owner(&CreateOwner {
            name,
            age,
            cats,
            dogs,
        })?)?,
        Commands::List { pet_type } => to_value(service.find_all(pet_type)?)?,
        Commands::Cat { id } => {
            to_value(service.find_cat_by_id(parse_pet_id(PetType::Cat, &id)?)?)?
        }
        Commands::Dog { id } => {
            to_value(service.find_dog_by_id(parse_pet_id(PetType::Dog, &id)?)?)?
        }
        Commands::CatsWeight => to_value(service.get_cats_weight()?)?,
        Commands::DogsWeight => to_value(service.get_dogs_weight()?)?,
        Commands::HappyDogs => to_value(service.get_happy_dogs()?)?,
        Commands::TopOwners { age } => to_value(service.get_top_three_pet_owners_at_age(age)?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{exit_status_for, run, Cli, FAILURE_EXIT_CODE, NOT_FOUND_EXIT_CODE};
    use clap::Parser;
    use std::path::Path;

    fn run_with_db(db: &Path, args: &[&str]) -> anyhow::Result<()> {
        let db = db.to_str().unwrap();
        let mut argv = vec!["petdir", "--db", db];
        argv.extend_from_slice(args);
        run(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn unknown_id_exits_with_not_found_status() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("pets.sqlite3");

        let err = run_with_db(&db, &["dog", "5f0c1f8e-52a4-4c57-9d4a-0f6b5b1f2a11"]).unwrap_err();
        assert_eq!(exit_status_for(&err), NOT_FOUND_EXIT_CODE);
        assert_eq!(err.to_string(), "Dog with given id can not be found");
    }

    #[test]
    fn malformed_id_exits_with_not_found_status() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("pets.sqlite3");

        let err = run_with_db(&db, &["cat", "not-an-id"]).unwrap_err();
        assert_eq!(exit_status_for(&err), NOT_FOUND_EXIT_CODE);
        assert_eq!(err.to_string(), "Cat with given id can not be found");
    }

    #[test]
    fn other_failures_exit_with_generic_status() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("pets.sqlite3");

        let err = run_with_db(&db, &["add-cat", "--name", "  "]).unwrap_err();
        assert_eq!(exit_status_for(&err), FAILURE_EXIT_CODE);

        let err = run_with_db(&db, &["--log-level", "loud", "list"]).unwrap_err();
        assert_eq!(exit_status_for(&err), FAILURE_EXIT_CODE);
    }

    #[test]
    fn successful_commands_share_one_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("pets.sqlite3");

        run_with_db(&db, &["add-dog", "--name", "Rex", "--wags-tail"]).unwrap();
        run_with_db(&db, &["happy-dogs"]).unwrap();
        run_with_db(&db, &["top-owners", "30"]).unwrap();
        assert!(db.exists());
    }
}
