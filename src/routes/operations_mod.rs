use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use minecarbon::auth::{AuthenticatedUser, Permission};
use minecarbon::db::MinecarbonDbConn;
use minecarbon::emissions::{DerivationFactors, EmissionFactors, OperationEstimate};
use minecarbon::operations::{checked_estimate, MiningOperation, OperationRecords};
use minecarbon::store::PgStore;
use minecarbon::validate;
use crate::routes::ApiError;

#[rocket::post("/", data = "<body>")]
pub async fn create_operation(
    conn: MinecarbonDbConn,
    user: AuthenticatedUser,
    body: Json<Value>,
) -> Result<Created<Json<MiningOperation>>, ApiError> {
    user.require(Permission::WriteOperations)?;
    let submission = validate::operation_submission(&body)?;

    let operation = conn.run(move |c| {
        OperationRecords::new(&mut PgStore::new(c)).create(submission)
    }).await?;

    Ok(Created::new(format!("/api/mining-operations/{}", operation.id)).body(Json(operation)))
}

// Outranks /<id>/emissions, which would otherwise also match /mine/<mine_id>
#[rocket::get("/mine/<mine_id>", rank = 1)]
pub async fn mine_operations(conn: MinecarbonDbConn, _user: AuthenticatedUser, mine_id: i32) -> Result<Json<Vec<MiningOperation>>, ApiError> {
    let operations = conn.run(move |c| {
        OperationRecords::new(&mut PgStore::new(c)).list_for_mine(mine_id)
    }).await?;

    Ok(Json(operations))
}

#[rocket::get("/<id>")]
pub async fn get_operation(conn: MinecarbonDbConn, _user: AuthenticatedUser, id: i32) -> Result<Json<MiningOperation>, ApiError> {
    let operation = conn.run(move |c| {
        OperationRecords::new(&mut PgStore::new(c)).get(id)
    }).await?;

    Ok(Json(operation))
}

/// What the operation would contribute as an emission record. Nothing is stored.
#[rocket::get("/<id>/emissions", rank = 2)]
pub async fn operation_emissions(
    conn: MinecarbonDbConn,
    _user: AuthenticatedUser,
    derivation: &State<DerivationFactors>,
    factors: &State<EmissionFactors>,
    id: i32,
) -> Result<Json<OperationEstimate>, ApiError> {
    let derivation = *derivation.inner();
    let factors = *factors.inner();

    let estimate = conn.run(move |c| {
        OperationRecords::new(&mut PgStore::new(c)).estimate(id, &derivation, &factors)
    }).await?;

    Ok(Json(estimate))
}

#[rocket::post("/derive", data = "<body>")]
pub async fn derive_operation_emissions(
    _user: AuthenticatedUser,
    derivation: &State<DerivationFactors>,
    factors: &State<EmissionFactors>,
    body: Json<Value>,
) -> Result<Json<OperationEstimate>, ApiError> {
    let details = validate::operation_details(&body)?;
    let estimate = checked_estimate(&details, derivation.inner(), factors.inner())?;

    Ok(Json(estimate))
}

#[rocket::put("/<id>", data = "<body>")]
pub async fn update_operation(
    conn: MinecarbonDbConn,
    user: AuthenticatedUser,
    id: i32,
    body: Json<Value>,
) -> Result<Json<MiningOperation>, ApiError> {
    user.require(Permission::WriteOperations)?;
    let details = validate::operation_details(&body)?;

    let operation = conn.run(move |c| {
        OperationRecords::new(&mut PgStore::new(c)).update(id, details)
    }).await?;

    Ok(Json(operation))
}

#[rocket::delete("/<id>")]
pub async fn delete_operation(conn: MinecarbonDbConn, user: AuthenticatedUser, id: i32) -> Result<Json<Value>, ApiError> {
    user.require(Permission::WriteOperations)?;

    conn.run(move |c| {
        OperationRecords::new(&mut PgStore::new(c)).delete(id)
    }).await?;

    Ok(Json(json!({ "message": "Mining operation deleted" })))
}
