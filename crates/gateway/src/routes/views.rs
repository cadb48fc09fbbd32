use {
    askama::Template,
    axum::{Router, extract::State, response::Html, routing::get},
};

use tienda_protocol::Product;

use crate::{error::ApiError, server::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/chat", get(chat))
        .route("/login", get(login))
        .route("/register", get(register))
}

#[derive(Template)]
#[template(path = "index.html")]
struct HomeTemplate {
    products: Vec<Product>,
}

#[derive(Template)]
#[template(path = "chat.html")]
struct ChatTemplate;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate;

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate;

fn render(template: impl Template) -> Result<Html<String>, ApiError> {
    template
        .render()
        .map(Html)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

async fn home(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let products = state.bridge.gateways.catalog.list_all().await?;
    render(HomeTemplate { products })
}

async fn chat() -> Result<Html<String>, ApiError> {
    render(ChatTemplate)
}

async fn login() -> Result<Html<String>, ApiError> {
    render(LoginTemplate)
}

async fn register() -> Result<Html<String>, ApiError> {
    render(RegisterTemplate)
}
