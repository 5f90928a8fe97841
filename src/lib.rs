// src/lib.rs

pub mod auth;
pub mod catalog;
pub mod chrome;
pub mod config;
pub mod dates;
pub mod error;
pub mod handlers;
pub mod modal;
pub mod notification_handlers;
pub mod notifications;
pub mod profile;
pub mod profile_handlers;
pub mod request_form;
pub mod request_handlers;
pub mod requests;
pub mod review_handlers;
pub mod selection;
pub mod store;
pub mod submission;
pub mod users;
pub mod views;

use auth::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;

/// Define todas as rotas da aplicação.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Rotas principais e de autenticação
        .route("/", get(handlers::login_page))
        .route("/login", post(handlers::login_handler))
        .route("/logout", post(handlers::logout_handler))
        .route("/main", get(handlers::main_handler))
        .route("/relatorios", get(handlers::reports_handler))

        // Formulário de solicitação
        .route("/solicitacao", get(request_handlers::request_form_page))
        .route("/solicitacao/funcionarios", get(request_handlers::selected_employees_handler))
        .route("/solicitacao/funcionarios/adicionar", post(request_handlers::add_employee_handler))
        .route("/solicitacao/funcionarios/selecionar", post(request_handlers::select_employee_handler))
        .route("/solicitacao/funcionarios/remover", post(request_handlers::remove_employee_handler))
        .route("/solicitacao/horas", post(request_handlers::hours_step_handler))
        .route("/solicitacao/enviar", post(request_handlers::submit_handler))
        .route("/solicitacao/cancelar", post(request_handlers::cancel_handler))

        // Requisições e análise do gestor
        .route("/requisicoes", get(review_handlers::requests_page))
        .route("/requisicoes/{id}", get(review_handlers::request_detail_page))
        .route("/requisicoes/{id}/aprovar", post(review_handlers::approve_handler))
        .route("/requisicoes/{id}/negar", post(review_handlers::deny_handler))

        // Notificações
        .route(
            "/notificacoes",
            get(notification_handlers::notifications_page).post(notification_handlers::add_notification_handler),
        )
        .route("/notificacoes/lidas", post(notification_handlers::mark_all_read_handler))
        .route("/notificacoes/{index}/lida", post(notification_handlers::mark_read_handler))

        // Perfil
        .route("/perfil", get(profile_handlers::profile_page).post(profile_handlers::save_profile_handler))

        .with_state(state)
        .layer(CookieManagerLayer::new())
}
