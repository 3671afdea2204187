use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;
use serde_json::{json, Value};

use minecarbon::auth::{issue_token, AuthConfig, AuthenticatedUser, Permission};
use minecarbon::db::{MinecarbonDbConn, User};
use minecarbon::store::PgStore;
use minecarbon::users::Users;
use minecarbon::validate;
use crate::routes::ApiError;

#[derive(Serialize)]
pub struct Session {
    user: User,
    token: String,
}

impl Session {
    fn start(user: User, config: &AuthConfig) -> Result<Self, ApiError> {
        let token = issue_token(&user, config)?;
        Ok(Session { user, token })
    }
}

#[rocket::post("/register", data = "<body>")]
pub async fn register(conn: MinecarbonDbConn, config: &State<AuthConfig>, body: Json<Value>) -> Result<Created<Json<Session>>, ApiError> {
    let credentials = validate::credentials(&body)?;
    let role = validate::role(&body)?;

    let user = conn.run(move |c| {
        Users::new(&mut PgStore::new(c)).register(credentials, role)
    }).await?;

    let location = format!("/api/users/{}", user.id);
    Ok(Created::new(location).body(Json(Session::start(user, config)?)))
}

#[rocket::post("/login", data = "<body>")]
pub async fn login(conn: MinecarbonDbConn, config: &State<AuthConfig>, body: Json<Value>) -> Result<Json<Session>, ApiError> {
    let credentials = validate::credentials(&body)?;

    let user = conn.run(move |c| {
        Users::new(&mut PgStore::new(c)).login(&credentials)
    }).await?;

    Ok(Json(Session::start(user, config)?))
}

#[rocket::get("/me")]
pub async fn current_user(conn: MinecarbonDbConn, user: AuthenticatedUser) -> Result<Json<User>, ApiError> {
    let id = user.id;
    let user = conn.run(move |c| {
        Users::new(&mut PgStore::new(c)).get(id)
    }).await?;

    Ok(Json(user))
}

#[rocket::get("/")]
pub async fn list_users(conn: MinecarbonDbConn, user: AuthenticatedUser) -> Result<Json<Vec<User>>, ApiError> {
    user.require(Permission::ManageUsers)?;

    let users = conn.run(|c| {
        Users::new(&mut PgStore::new(c)).list()
    }).await?;

    Ok(Json(users))
}

#[rocket::patch("/<id>/role", data = "<body>")]
pub async fn update_user_role(conn: MinecarbonDbConn, user: AuthenticatedUser, id: i32, body: Json<Value>) -> Result<Json<User>, ApiError> {
    user.require(Permission::ManageUsers)?;
    let role = validate::role(&body)?;

    let updated = conn.run(move |c| {
        Users::new(&mut PgStore::new(c)).update_role(id, role)
    }).await?;

    Ok(Json(updated))
}

#[rocket::delete("/<id>")]
pub async fn delete_user(conn: MinecarbonDbConn, user: AuthenticatedUser, id: i32) -> Result<Json<Value>, ApiError> {
    user.require(Permission::ManageUsers)?;

    conn.run(move |c| {
        Users::new(&mut PgStore::new(c)).delete(id)
    }).await?;

    Ok(Json(json!({ "message": "User deleted" })))
}
