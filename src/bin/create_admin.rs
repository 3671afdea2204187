//! Creates an admin account. Self-registration can't, so this is how the first one gets made.
//!
//! Connects to the database named by `DATABASE_URL`.

use anyhow::{Context, Result};
use diesel::{Connection, PgConnection};
use dialoguer::{Input, Password};
use log::info;
use serde_json::json;

use minecarbon::db_types::Role;
use minecarbon::store::PgStore;
use minecarbon::users::Users;
use minecarbon::validate;
use minecarbon::CoreError;

fn main() -> Result<()> {
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set")?;
    let mut conn = PgConnection::establish(&database_url)
        .with_context(|| format!("Couldn't connect to {}", database_url))?;

    let username: String = Input::new()
        .with_prompt("Admin username")
        .interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords don't match")
        .interact()?;

    let credentials = validate::credentials(&json!({ "username": username, "password": password }))?;
    let username = credentials.username.clone();

    let mut store = PgStore::new(&mut conn);
    match Users::new(&mut store).create(credentials, Role::Admin) {
        Ok(user) => {
            info!("Admin {} created with id {}", user.username, user.id);
            Ok(())
        }
        Err(CoreError::Conflict(_)) => {
            println!("A user named {} already exists", username);
            Ok(())
        }
        Err(e) => Err(e).context("Couldn't create admin"),
    }
}
