//! Demo auth service placed behind the gateway.
//!
//! Every reply is an envelope. Credentials are only checked for presence;
//! tokens are random and never verified.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::Query,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

use nebula_gateway::config::ObservabilityConfig;
use nebula_gateway::observability::logging;
use nebula_gateway::http::response::TIMESTAMP_FORMAT;
use nebula_gateway::Envelope;

#[derive(Parser, Debug)]
#[command(name = "mock-auth", about = "Demo auth service speaking the envelope contract")]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:8081")]
    bind: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LoginRequest {
    user_name: String,
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    user_id: u32,
    user_name: &'static str,
    email: &'static str,
    avatar: &'static str,
    roles: Vec<&'static str>,
    buttons: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GreetingQuery {
    name: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Serialize)]
struct Page<T> {
    records: Vec<T>,
    current: u32,
    size: u32,
    total: u64,
}

impl<T> Page<T> {
    fn first(records: Vec<T>) -> Self {
        Self {
            total: records.len() as u64,
            records,
            current: 1,
            size: 10,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserItem {
    id: u32,
    avatar: String,
    status: &'static str,
    user_name: &'static str,
    user_gender: &'static str,
    nick_name: &'static str,
    user_phone: &'static str,
    user_email: &'static str,
    user_roles: Vec<&'static str>,
    create_by: &'static str,
    create_time: &'static str,
    update_by: &'static str,
    update_time: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleItem {
    role_id: u32,
    role_name: &'static str,
    role_code: &'static str,
    description: &'static str,
    enabled: bool,
    create_time: &'static str,
}

#[derive(Debug, Serialize)]
struct AuthButton {
    title: &'static str,
    #[serde(rename = "authMark")]
    mark: &'static str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct MenuMeta {
    title: &'static str,
    icon: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    roles: Vec<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    keep_alive: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_hide: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_hide_tab: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    auth_list: Vec<AuthButton>,
}

#[derive(Debug, Serialize)]
struct Menu {
    id: u32,
    path: &'static str,
    name: &'static str,
    component: &'static str,
    meta: MenuMeta,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Menu>,
}

fn app() -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/user/info", get(user_info))
        .route("/hello", get(hello))
        .route("/hello/personal", get(hello_personal))
        .route("/api/user/list", get(user_list))
        .route("/api/role/list", get(role_list))
        .route("/api/v3/system/menus", get(menus))
}

async fn login(body: Bytes) -> Response {
    let request: LoginRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed login request");
            return Envelope::<()>::validation_error("Malformed login request").into_response();
        }
    };

    if request.user_name.trim().is_empty() {
        return Envelope::<()>::validation_error("Username cannot be blank").into_response();
    }
    if request.password.trim().is_empty() {
        return Envelope::<()>::validation_error("Password cannot be blank").into_response();
    }

    tracing::info!(user = %request.user_name, "Login successful");
    let tokens = LoginResponse {
        token: format!("Bearer {}", Uuid::new_v4().simple()),
        refresh_token: format!("Refresh-{}", Uuid::new_v4().simple()),
    };
    Envelope::success_with_message(tokens, "Login successful").into_response()
}

async fn user_info() -> Response {
    let info = UserInfo {
        user_id: 1,
        user_name: "admin",
        email: "admin@nebula.com",
        avatar: "https://ui-avatars.com/api/?name=Admin&background=0D8ABC&color=fff",
        roles: vec!["R_SUPER", "R_ADMIN"],
        buttons: vec!["add", "edit", "delete"],
    };
    Envelope::success(info).into_response()
}

fn avatar(name: &str, background: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background={}&color=fff",
        name, background
    )
}

async fn user_list() -> Response {
    tracing::info!("Fetching user list");
    let user = |id, name: &str, background: &str| UserItem {
        id,
        avatar: avatar(name, background),
        status: "1",
        user_name: "",
        user_gender: "1",
        nick_name: "",
        user_phone: "",
        user_email: "",
        user_roles: vec!["R_USER"],
        create_by: "admin",
        create_time: "",
        update_by: "admin",
        update_time: "",
    };
    let users = vec![
        UserItem {
            user_name: "admin",
            nick_name: "Super Administrator",
            user_phone: "13800138000",
            user_email: "admin@nebula.com",
            user_roles: vec!["R_SUPER", "R_ADMIN"],
            create_by: "system",
            create_time: "2024-01-01 10:00:00",
            update_time: "2024-01-15 10:00:00",
            ..user(1, "John+Doe", "0D8ABC")
        },
        UserItem {
            user_name: "jane.smith",
            user_gender: "2",
            nick_name: "Regular User",
            user_phone: "13800138001",
            user_email: "jane@nebula.com",
            create_time: "2024-01-05 10:00:00",
            update_time: "2024-01-10 10:00:00",
            ..user(2, "Jane+Smith", "FF6B6B")
        },
        UserItem {
            status: "2",
            user_name: "bob.johnson",
            nick_name: "Test User",
            user_phone: "13800138002",
            user_email: "bob@nebula.com",
            create_time: "2024-01-08 10:00:00",
            update_time: "2024-01-12 10:00:00",
            ..user(3, "Bob+Johnson", "4ECDC4")
        },
    ];
    Envelope::success(Page::first(users)).into_response()
}

async fn role_list() -> Response {
    tracing::info!("Fetching role list");
    let role = |role_id, role_name, role_code, description| RoleItem {
        role_id,
        role_name,
        role_code,
        description,
        enabled: true,
        create_time: "2024-01-01 10:00:00",
    };
    let roles = vec![
        role(1, "Super Administrator", "R_SUPER", "All permissions"),
        role(2, "Administrator", "R_ADMIN", "Partial management permissions"),
        role(3, "Regular User", "R_USER", "Regular user permissions"),
    ];
    Envelope::success(Page::first(roles)).into_response()
}

async fn menus() -> Response {
    tracing::info!("Fetching menu list");
    let dashboard = Menu {
        id: 1,
        path: "/dashboard",
        name: "Dashboard",
        component: "/index/index",
        meta: MenuMeta {
            title: "menus.home.title",
            icon: "ri:dashboard-3-line",
            ..Default::default()
        },
        children: Vec::new(),
    };
    let page = |id, path, name, component, meta| Menu {
        id,
        path,
        name,
        component,
        meta,
        children: Vec::new(),
    };
    let system = Menu {
        id: 10,
        path: "/system",
        name: "System",
        component: "/index/index",
        meta: MenuMeta {
            title: "menus.system.title",
            icon: "ri:user-3-line",
            roles: vec!["R_SUPER", "R_ADMIN"],
            ..Default::default()
        },
        children: vec![
            page(11, "user", "User", "/system/user", MenuMeta {
                title: "menus.system.user",
                icon: "ri:user-line",
                keep_alive: true,
                roles: vec!["R_SUPER", "R_ADMIN"],
                ..Default::default()
            }),
            page(12, "role", "Role", "/system/role", MenuMeta {
                title: "menus.system.role",
                icon: "ri:user-settings-line",
                keep_alive: true,
                roles: vec!["R_SUPER"],
                ..Default::default()
            }),
            page(13, "user-center", "UserCenter", "/system/user-center", MenuMeta {
                title: "menus.system.userCenter",
                icon: "ri:user-line",
                keep_alive: true,
                is_hide: true,
                is_hide_tab: true,
                ..Default::default()
            }),
            page(14, "menu", "Menus", "/system/menu", MenuMeta {
                title: "menus.system.menu",
                icon: "ri:menu-line",
                keep_alive: true,
                roles: vec!["R_SUPER"],
                auth_list: vec![
                    AuthButton { title: "Add", mark: "add" },
                    AuthButton { title: "Edit", mark: "edit" },
                    AuthButton { title: "Delete", mark: "delete" },
                ],
                ..Default::default()
            }),
        ],
    };
    Envelope::success(vec![dashboard, system]).into_response()
}

fn now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

async fn hello() -> Response {
    let greeting = format!("Hello from Nebula Auth Service! Current time: {}", now());
    Envelope::success_with_message(greeting, "Hello request successful").into_response()
}

async fn hello_personal(Query(query): Query<GreetingQuery>) -> Response {
    let name = query
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "Guest".to_string());
    let greeting = format!(
        "Hello {}! Welcome to Nebula Auth Service. Current time: {}",
        name,
        now()
    );
    Envelope::success_with_message(greeting, "Personalized hello request successful")
        .into_response()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&ObservabilityConfig::default())?;

    let addr: SocketAddr = cli.bind.parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "mock-auth listening");

    axum::serve(listener, app())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
