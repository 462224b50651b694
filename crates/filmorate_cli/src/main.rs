//! Catalog smoke entry point.
//!
//! # Responsibility
//! - Select the storage backend once from `FILMORATE_*` environment.
//! - Report reference data and entity counts from that backend.

use filmorate_core::db::open_db;
use filmorate_core::{
    init_logging, CatalogConfig, FilmRepository, FilmService, MemoryFilmRepository,
    MemoryReferenceCatalog, MemoryUserRepository, ReferenceRepository, ReferenceService,
    SqliteFilmRepository, SqliteReferenceRepository, SqliteUserRepository, StorageBackend,
    UserRepository, UserService,
};
use log::{error, info};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("filmorate: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CatalogConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    println!("filmorate_core version={}", filmorate_core::core_version());
    info!("event=cli_run module=cli status=start backend={:?}", config.backend);

    match &config.backend {
        StorageBackend::Memory => {
            let catalog = MemoryReferenceCatalog::seeded();
            let users = MemoryUserRepository::new();
            let films = MemoryFilmRepository::new(catalog.clone(), users.clone());
            report("memory", catalog, films, users)
        }
        StorageBackend::Sqlite { path } => {
            let conn = open_db(path)?;
            report(
                "sqlite",
                SqliteReferenceRepository::try_new(&conn)?,
                SqliteFilmRepository::try_new(&conn)?,
                SqliteUserRepository::try_new(&conn)?,
            )
        }
    }
}

fn report<R, F, U>(backend: &str, reference: R, films: F, users: U) -> Result<(), Box<dyn Error>>
where
    R: ReferenceRepository,
    F: FilmRepository,
    U: UserRepository + Clone,
{
    let reference = ReferenceService::new(reference);
    let film_service = FilmService::new(films, users.clone());
    let user_service = UserService::new(users);

    let mpa = reference
        .list_mpa()?
        .into_iter()
        .map(|mpa| mpa.name)
        .collect::<Vec<_>>();
    let genres = reference
        .list_genres()?
        .into_iter()
        .map(|genre| genre.name)
        .collect::<Vec<_>>();

    println!("backend={backend}");
    println!("mpa={}", mpa.join(","));
    println!("genres={}", genres.join(","));
    println!("films={}", film_service.find_all()?.len());
    println!("users={}", user_service.find_all()?.len());
    Ok(())
}
