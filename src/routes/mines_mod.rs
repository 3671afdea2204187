use rocket::response::status::Created;
use rocket::serde::json::Json;
use serde_json::{json, Value};

use minecarbon::auth::{AuthenticatedUser, Permission};
use minecarbon::db::{Mine, MinecarbonDbConn};
use minecarbon::mines::Mines;
use minecarbon::store::PgStore;
use minecarbon::validate;
use crate::routes::ApiError;

#[rocket::post("/", data = "<body>")]
pub async fn create_mine(conn: MinecarbonDbConn, user: AuthenticatedUser, body: Json<Value>) -> Result<Created<Json<Mine>>, ApiError> {
    user.require(Permission::ManageMines)?;
    let fields = validate::mine_fields(&body)?;

    let mine = conn.run(move |c| {
        Mines::new(&mut PgStore::new(c)).create(fields)
    }).await?;

    Ok(Created::new(format!("/api/mines/{}", mine.id)).body(Json(mine)))
}

#[rocket::get("/")]
pub async fn list_mines(conn: MinecarbonDbConn, _user: AuthenticatedUser) -> Result<Json<Vec<Mine>>, ApiError> {
    let mines = conn.run(|c| {
        Mines::new(&mut PgStore::new(c)).list()
    }).await?;

    Ok(Json(mines))
}

#[rocket::get("/<id>")]
pub async fn get_mine(conn: MinecarbonDbConn, _user: AuthenticatedUser, id: i32) -> Result<Json<Mine>, ApiError> {
    let mine = conn.run(move |c| {
        Mines::new(&mut PgStore::new(c)).get(id)
    }).await?;

    Ok(Json(mine))
}

#[rocket::put("/<id>", data = "<body>")]
pub async fn update_mine(conn: MinecarbonDbConn, user: AuthenticatedUser, id: i32, body: Json<Value>) -> Result<Json<Mine>, ApiError> {
    user.require(Permission::ManageMines)?;
    let fields = validate::mine_fields(&body)?;

    let mine = conn.run(move |c| {
        Mines::new(&mut PgStore::new(c)).update(id, fields)
    }).await?;

    Ok(Json(mine))
}

#[rocket::delete("/<id>")]
pub async fn delete_mine(conn: MinecarbonDbConn, user: AuthenticatedUser, id: i32) -> Result<Json<Value>, ApiError> {
    user.require(Permission::DeleteMines)?;

    conn.run(move |c| {
        Mines::new(&mut PgStore::new(c)).delete(id)
    }).await?;

    Ok(Json(json!({ "message": "Mine deleted" })))
}
