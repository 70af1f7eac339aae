//! Service boundary example
//!
//! Builds the development logging system, routes a few requests through a
//! handler, translates the failures into client responses and shows what
//! landed in the log file.
//!
//! Run with: cargo run --example service_boundary

use rust_log_router::prelude::*;
use rust_log_router::info;

struct AppService {
    logger: Logger,
}

impl AppService {
    fn new(logger: &Logger) -> Self {
        Self {
            logger: logger.child(LogContext::new().with_field("component", "AppService")),
        }
    }

    fn get_hello(&self) -> String {
        self.logger.info("about to say hello");
        "Hello World!".to_string()
    }

    fn get_user(&self, id: u32) -> std::result::Result<String, HttpException> {
        info!(self.logger, "looking up user {}", id);
        match id {
            1 => Ok("ada".to_string()),
            0 => Err(HttpException::bad_request("user id must be positive")),
            _ => Err(HttpException::not_found(format!("user {} not found", id))),
        }
    }
}

fn main() -> Result<()> {
    println!("=== Rust Log Router - Service Boundary Example ===\n");

    let log_file = std::env::temp_dir().join("rust_log_router_demo.log");
    let _ = std::fs::remove_file(&log_file);

    let system = LoggingSystem::from_config(
        LoggingConfig::development(log_file.to_string_lossy()),
        LevelTable::standard(),
    )?;
    system.capture().install()?;

    let service = AppService::new(system.logger());
    let translator = system.translator();

    println!("1. Successful requests:");
    println!("   GET /        -> {}", service.get_hello());
    if let Ok(user) = service.get_user(1) {
        println!("   GET /users/1 -> {}", user);
    }

    println!("\n2. Failed requests become uniform error bodies:");
    for id in [0, 7] {
        let path = format!("/users/{}", id);
        if let Err(e) = service.get_user(id) {
            let response = translator.translate(&e, &RequestContext::new(&path).with_method("GET"));
            println!("   GET {:<9}-> {}", path, response.to_json());
        }
    }

    println!("\n3. A panic caught at the boundary:");
    let outcome = std::panic::catch_unwind(|| -> u8 { panic!("handler bug") });
    if let Err(payload) = outcome {
        let response = translator.translate_panic(payload.as_ref(), &RequestContext::new("/boom"));
        println!("   GET /boom     -> {}", response.to_json());
    }

    system.flush()?;

    println!("\n4. Log file {}:", log_file.display());
    for line in std::fs::read_to_string(&log_file)?.lines() {
        println!("   {}", line);
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
