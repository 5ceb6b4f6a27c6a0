//! Basic example of the Wasil container.

use std::sync::Arc;

use wasil::{Container, Injectable, Must, Provider, Result, capability};

// === Define your traits and types ===

pub trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

capability!(Logger);

#[derive(Default, Injectable)]
#[inject(provides(Logger))]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

#[derive(Clone, Default, Injectable)]
struct Config {
    database_url: String,
    debug: bool,
}

#[derive(Default, Injectable)]
struct Database {
    config: Option<Arc<Config>>,
    logger: Option<Arc<dyn Logger>>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        if let Some(logger) = &self.logger {
            logger.log(&format!("Executing: {sql}"));
        }
        let url = self.config.as_ref().map_or("<unconfigured>", |c| c.database_url.as_str());
        format!("Results from {url}")
    }
}

#[derive(Default, Injectable)]
struct UserRepository {
    #[inject(named = "primary")]
    db: Option<Arc<Database>>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        match &self.db {
            Some(db) => db.query(&format!("SELECT * FROM users WHERE id = {id}")),
            None => "no database".to_string(),
        }
    }
}

#[derive(Default, Injectable)]
struct UserService {
    repo: Option<Arc<UserRepository>>,
    logger: Option<Arc<dyn Logger>>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        if let Some(logger) = &self.logger {
            logger.log(&format!("Getting user {id}"));
        }
        self.repo.as_ref().map_or_else(String::new, |repo| repo.find_user(id))
    }
}

// === Group storage registrations ===

struct StorageProvider;

impl Provider for StorageProvider {
    fn register(&self, container: &Container) -> Result<()> {
        container.add_named::<Arc<Database>, Database>("primary")?;
        container.add::<Arc<UserRepository>, UserRepository>()
    }
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter("wasil_container=debug")
        .init();

    let container = Container::new();

    // Config: pre-built instance, copied on every resolve
    container.add_instance::<Arc<Config>, _>(Config {
        database_url: "postgres://localhost/myapp".to_string(),
        debug: true,
    })?;
    // Logger: singleton behind a capability
    container.add::<Arc<dyn Logger>, ConsoleLogger>()?;
    // Database + UserRepository: singletons
    container.add_provider(&StorageProvider)?;
    // UserService: transient (new each time)
    container.must_add_transient::<Arc<UserService>, UserService>();

    println!("✅ Container built successfully!");
    println!("{container:?}");

    let config: Arc<Config> = container.get()?;
    println!("📋 Config: database_url={}, debug={}", config.database_url, config.debug);

    let service: Arc<UserService> = container.get()?;
    println!("👤 {}", service.get_user(42));

    let service2: Arc<UserService> = container.get()?;
    println!("👤 {}", service2.get_user(7));

    for registration in container.registrations() {
        tracing::info!(
            service = %registration.service,
            namespace = %registration.namespace,
            lifetime = %registration.lifetime,
            "Registration"
        );
    }

    println!("\n🎉 Everything works!");
    Ok(())
}
