use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use minecarbon::auth::{AuthenticatedUser, Permission};
use minecarbon::db::{Emission, MinecarbonDbConn};
use minecarbon::emissions::{compute_total, EmissionFactors, EmissionRecords, EmissionStatistics};
use minecarbon::store::PgStore;
use minecarbon::{validate, CoreError};
use crate::routes::ApiError;

#[rocket::post("/", data = "<body>")]
pub async fn create_emission(
    conn: MinecarbonDbConn,
    user: AuthenticatedUser,
    factors: &State<EmissionFactors>,
    body: Json<Value>,
) -> Result<Created<Json<Emission>>, ApiError> {
    user.require(Permission::WriteEmissions)?;
    let submission = validate::emission_submission(&body)?;
    let factors = *factors.inner();

    let emission = conn.run(move |c| {
        let mut store = PgStore::new(c);
        EmissionRecords::new(&mut store, &factors).create(submission)
    }).await?;

    Ok(Created::new(format!("/api/emissions/{}", emission.id)).body(Json(emission)))
}

// Outranks /<id> so "stats" is never tried as an id
#[rocket::get("/stats?<mine_id>", rank = 1)]
pub async fn emission_stats(
    conn: MinecarbonDbConn,
    _user: AuthenticatedUser,
    factors: &State<EmissionFactors>,
    mine_id: Option<&str>,
) -> Result<Json<EmissionStatistics>, ApiError> {
    // Taken raw so a malformed filter is an error instead of silently meaning "all mines"
    let mine_id = validate::optional_id_param("mine_id", mine_id)?;
    let factors = *factors.inner();

    let stats = conn.run(move |c| {
        let mut store = PgStore::new(c);
        EmissionRecords::new(&mut store, &factors).statistics(mine_id)
    }).await?;

    Ok(Json(stats))
}

#[rocket::get("/mine/<mine_id>")]
pub async fn mine_emissions(
    conn: MinecarbonDbConn,
    _user: AuthenticatedUser,
    factors: &State<EmissionFactors>,
    mine_id: i32,
) -> Result<Json<Vec<Emission>>, ApiError> {
    let factors = *factors.inner();

    let emissions = conn.run(move |c| {
        let mut store = PgStore::new(c);
        EmissionRecords::new(&mut store, &factors).list_for_mine(mine_id)
    }).await?;

    Ok(Json(emissions))
}

#[rocket::get("/<id>", rank = 2)]
pub async fn get_emission(
    conn: MinecarbonDbConn,
    _user: AuthenticatedUser,
    factors: &State<EmissionFactors>,
    id: i32,
) -> Result<Json<Emission>, ApiError> {
    let factors = *factors.inner();

    let emission = conn.run(move |c| {
        let mut store = PgStore::new(c);
        EmissionRecords::new(&mut store, &factors).get(id)
    }).await?;

    Ok(Json(emission))
}

#[rocket::put("/<id>", data = "<body>")]
pub async fn update_emission(
    conn: MinecarbonDbConn,
    user: AuthenticatedUser,
    factors: &State<EmissionFactors>,
    id: i32,
    body: Json<Value>,
) -> Result<Json<Emission>, ApiError> {
    user.require(Permission::WriteEmissions)?;
    let update = validate::emission_update(&body)?;
    let factors = *factors.inner();

    let emission = conn.run(move |c| {
        let mut store = PgStore::new(c);
        EmissionRecords::new(&mut store, &factors).update(id, update)
    }).await?;

    Ok(Json(emission))
}

#[rocket::delete("/<id>")]
pub async fn delete_emission(
    conn: MinecarbonDbConn,
    user: AuthenticatedUser,
    factors: &State<EmissionFactors>,
    id: i32,
) -> Result<Json<Value>, ApiError> {
    user.require(Permission::WriteEmissions)?;
    let factors = *factors.inner();

    conn.run(move |c| {
        let mut store = PgStore::new(c);
        EmissionRecords::new(&mut store, &factors).delete(id)
    }).await?;

    Ok(Json(json!({ "message": "Emission record deleted" })))
}

/// Computes a total without storing anything.
#[rocket::post("/calculate", data = "<body>")]
pub async fn calculate_emissions(
    _user: AuthenticatedUser,
    factors: &State<EmissionFactors>,
    body: Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let input = validate::emission_input(&body)?;
    let total = compute_total(&input, factors.inner());
    if !total.is_finite() {
        return Err(CoreError::NonFiniteTotal { entity: "emission calculation", total }.into());
    }

    Ok(Json(json!({ "total_emissions": total })))
}
