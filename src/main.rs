use log::{error, info};
use rocket::fairing::{AdHoc, Fairing, Info, Kind};
use rocket::http::Header;
use rocket::serde::json::Json;
use rocket::{Build, Error, Request, Response, Rocket};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use minecarbon::auth::AuthConfig;
use minecarbon::db::MinecarbonDbConn;
use minecarbon::emissions::{DerivationFactors, EmissionFactors};
use routes::*;

mod routes;

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, PUT, PATCH, DELETE, OPTIONS"));
        response.set_header(Header::new("Access-Control-Allow-Headers", "Authorization, Content-Type"));
    }
}

/// Reads an optional table of factors, falling back to the defaults when it isn't configured.
fn configured<T: DeserializeOwned + Default>(rocket: &Rocket<Build>, key: &str) -> Result<T, rocket::figment::Error> {
    if rocket.figment().contains(key) {
        rocket.figment().extract_inner(key)
    } else {
        Ok(T::default())
    }
}

fn factors_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Emission factors", |rocket| async move {
        let emission = configured::<EmissionFactors>(&rocket, "emission_factors");
        let derivation = configured::<DerivationFactors>(&rocket, "derivation_factors");

        match (emission, derivation) {
            (Ok(emission), Ok(derivation)) => {
                info!("Using emission factors {:?}", emission);
                info!("Using derivation factors {:?}", derivation);
                Ok(rocket.manage(emission).manage(derivation))
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("Invalid factor configuration: {}", e);
                Err(rocket)
            }
        }
    })
}

fn error_body(message: &str) -> Json<Value> {
    Json(json!({ "error": message }))
}

#[rocket::catch(400)]
fn bad_request() -> Json<Value> {
    error_body("Malformed request body")
}

#[rocket::catch(401)]
fn unauthorized() -> Json<Value> {
    error_body("Please authenticate")
}

#[rocket::catch(403)]
fn forbidden() -> Json<Value> {
    error_body("Forbidden")
}

#[rocket::catch(404)]
fn not_found() -> Json<Value> {
    error_body("Not found")
}

#[rocket::catch(422)]
fn unprocessable() -> Json<Value> {
    error_body("Malformed request body")
}

#[rocket::catch(500)]
fn internal_error() -> Json<Value> {
    error_body("Internal server error")
}

// Using main as an entry point instead of rocket::launch to keep the launch error handling explicit
#[rocket::main]
async fn main() -> Result<(), Error> {
    let _ = rocket::build()
        .mount("/", rocket::routes![index, preflight])
        .mount("/api/emissions", rocket::routes![
            create_emission, emission_stats, mine_emissions, get_emission, update_emission,
            delete_emission, calculate_emissions,
        ])
        .mount("/api/mines", rocket::routes![create_mine, list_mines, get_mine, update_mine, delete_mine])
        .mount("/api/mining-operations", rocket::routes![
            create_operation, mine_operations, get_operation, operation_emissions,
            derive_operation_emissions, update_operation, delete_operation,
        ])
        .mount("/api/users", rocket::routes![register, login, current_user, list_users, update_user_role, delete_user])
        .register("/", rocket::catchers![bad_request, unauthorized, forbidden, not_found, unprocessable, internal_error])
        .attach(MinecarbonDbConn::fairing())
        .attach(AdHoc::config::<AuthConfig>())
        .attach(factors_fairing())
        .attach(CORS)
        .attach(AdHoc::on_liftoff("Minecarbon", |rocket| Box::pin(async move {
            info!("Emissions service listening on {}:{}", rocket.config().address, rocket.config().port);
        })))
        .launch().await?;
    Ok(())
}
