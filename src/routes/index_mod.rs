use rocket::serde::json::Json;
use serde_json::{json, Value};

#[rocket::get("/")]
pub fn index() -> Json<Value> {
    Json(json!({ "status": "Server is running" }))
}

/// Lets browsers through the CORS preflight for any path. The headers come from the fairing.
#[rocket::options("/<_..>")]
pub fn preflight() {}
