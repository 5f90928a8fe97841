// src/views/mod.rs

pub mod home;
pub mod login;
pub mod notifications;
pub mod profile;
pub mod request_form;
pub mod requests;

use crate::auth::{AppState, AuthSession};
use crate::chrome;
use crate::config::PortalConfig;
use crate::modal::Modal;
use axum::response::Html;

const CSS: &str = r#"
    :root {
        --primary-color: #0d6efd;
        --primary-dark: #0a58ca;
        --background-color: #f5f6f8;
        --card-background: #ffffff;
        --text-color: #212529;
        --text-light: #6c757d;
        --border-color: #dee2e6;
        --shadow: 0 2px 4px rgba(0,0,0,0.08), 0 2px 10px rgba(0,0,0,0.06);
        --success-color: #198754;
        --warning-color: #ffc107;
        --danger-color: #dc3545;
        --info-color: #0dcaf0;
    }
    body {
        font-family: 'Roboto', -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
        background-color: var(--background-color);
        color: var(--text-color);
        margin: 0;
        line-height: 1.5;
    }
    a { color: var(--primary-color); }
    .d-flex { display: flex; } .align-items-center { align-items: center; }
    .justify-content-between { justify-content: space-between; }
    .justify-content-center { justify-content: center; } .justify-content-end { justify-content: flex-end; }
    .gap-2 { gap: 8px; } .m-0 { margin: 0; } .mb-0 { margin-bottom: 0; } .mb-1 { margin-bottom: 4px; } .mt-2 { margin-top: 8px; }
    .small { font-size: 0.875em; } .text-muted { color: var(--text-light); } .text-center { text-align: center; }
    .text-primary { color: var(--primary-color); } .d-block { display: block; } .flex-grow-1 { flex-grow: 1; }
    .opacity-75 { opacity: 0.75; } .h4 { font-size: 1.4em; } .p-3 { padding: 16px; }

    .topo { background: var(--card-background); padding: 12px 24px; border-bottom: 1px solid var(--border-color); }
    .brand { text-decoration: none; color: var(--text-color); }
    .layout { display: grid; grid-template-columns: 240px 1fr; min-height: calc(100vh - 64px); }
    @media (max-width: 900px) { .layout { grid-template-columns: 1fr; } }
    .menu-lateral { background: #1f2937; color: #e5e7eb; padding: 20px; }
    .menu-lateral h3 { margin-top: 0; font-size: 1em; text-transform: uppercase; letter-spacing: 1px; color: #9ca3af; }
    .menu-lateral nav { display: flex; flex-direction: column; gap: 4px; }
    .menu-lateral a { color: #e5e7eb; text-decoration: none; padding: 8px 12px; border-radius: 6px; }
    .menu-lateral a:hover { background: #374151; }
    .menu-lateral a.active { background: var(--primary-color); color: white; font-weight: 500; }
    .conteudo { padding: 24px; }

    .card {
        background-color: var(--card-background);
        border-radius: 8px;
        box-shadow: var(--shadow);
        padding: 24px;
        margin-bottom: 20px;
    }
    .card-title { font-size: 1.2em; font-weight: 500; margin: 0 0 16px 0; padding-bottom: 12px; border-bottom: 1px solid var(--border-color); }
    .btn {
        padding: 8px 18px; border: 1px solid transparent; border-radius: 4px; text-decoration: none;
        font-weight: 500; cursor: pointer; display: inline-block; text-align: center; font-size: 14px;
        background: #e9ecef; color: var(--text-color);
    }
    .btn:disabled { opacity: 0.5; cursor: not-allowed; }
    .btn-sm { padding: 4px 10px; font-size: 13px; }
    .btn-primary { background-color: var(--primary-color); color: white; }
    .btn-primary:hover { background-color: var(--primary-dark); }
    .btn-secondary { background-color: #6c757d; color: white; }
    .btn-danger { background-color: var(--danger-color); color: white; }
    .btn-success { background-color: var(--success-color); color: white; }
    .btn-outline-secondary { background: transparent; border-color: #6c757d; color: #6c757d; }
    .btn-close { text-decoration: none; font-size: 1.4em; color: var(--text-light); }

    label { display: block; font-weight: 500; margin-top: 12px; }
    input[type="text"], input[type="email"], input[type="password"], input[type="date"], input[type="number"], select, textarea {
        width: 100%; padding: 10px; margin: 6px 0; border: 1px solid var(--border-color);
        border-radius: 4px; box-sizing: border-box; font-size: 15px; background: white;
    }
    .border-danger { border-color: var(--danger-color) !important; }
    .stepper { display: flex; gap: 6px; align-items: center; max-width: 220px; }
    .stepper input { text-align: center; }
    .linha-funcionario { display: flex; gap: 8px; align-items: center; }
    .acoes { display: flex; gap: 10px; justify-content: flex-end; margin-top: 20px; }
    .alert { padding: 12px 16px; border-radius: 6px; margin-top: 12px; }
    .alert-danger { background: #f8d7da; color: #842029; }
    .alert-success { background: #d1e7dd; color: #0f5132; }

    .badge { display: inline-block; padding: 2px 7px; border-radius: 10px; font-size: 11px; font-weight: 700; color: white; }
    .bg-danger { background: var(--danger-color); } .bg-primary { background: var(--primary-color); }
    .dropdown { position: relative; }
    .dropdown summary { list-style: none; }
    .dropdown-menu {
        position: absolute; right: 0; z-index: 10; width: 340px; background: white;
        border: 1px solid var(--border-color); border-radius: 8px; box-shadow: var(--shadow); padding: 8px 0;
    }
    .dropdown-header { display: flex; justify-content: space-between; margin: 0; padding: 6px 16px; font-size: 0.85em; }
    .dropdown-item { display: block; width: 100%; padding: 6px 16px; background: none; border: none; cursor: pointer; text-decoration: none; }
    .dropdown-divider { border-top: 1px solid var(--border-color); margin: 6px 0; }
    .notification-item { padding: 6px 16px; }
    .notification-button { all: unset; cursor: pointer; display: block; width: 100%; }

    .item-list { list-style: none; padding: 0; margin: 0; }
    .item-list li { padding: 12px 0; border-bottom: 1px solid #f0f0f0; }
    .item-list li:last-child { border-bottom: none; }
    table { width: 100%; border-collapse: collapse; }
    th, td { text-align: left; padding: 10px; border-bottom: 1px solid var(--border-color); }
    .status-tag { padding: 3px 10px; border-radius: 12px; font-size: 12px; font-weight: 500; color: white; text-transform: uppercase; display: inline-block; }
    .status-pendente { background-color: var(--warning-color); color: #000; }
    .status-aprovada { background-color: var(--success-color); }
    .status-negada { background-color: var(--danger-color); }

    .modal-backdrop-portal {
        position: fixed; inset: 0; background: rgba(0,0,0,0.45); display: flex;
        align-items: center; justify-content: center; z-index: 100;
    }
    .modal-card { background: white; border-radius: 10px; width: min(480px, 92vw); box-shadow: var(--shadow); }
    .modal-header { display: flex; justify-content: space-between; align-items: center; padding: 16px 20px 0; }
    .modal-title { margin: 0; font-size: 1.15em; }
    .modal-body { padding: 12px 20px; }
    .modal-footer { gap: 8px; padding: 0 20px 16px; }
    .text-warning { color: var(--warning-color); } .text-danger { color: var(--danger-color); }
    .text-success { color: var(--success-color); } .text-info { color: var(--info-color); } .me-2 { margin-right: 8px; }

    .login-body { background: var(--background-color); }
    .login-container { max-width: 400px; margin: 10vh auto; }
    .login-card { background: var(--card-background); border-radius: 12px; box-shadow: 0 10px 25px rgba(0,0,0,0.1); padding: 48px; }
    .login-header h1 { margin: 0 0 8px 0; font-size: 1.6em; text-align: center; }
    .info-box { background: #f1f1f1; padding: 10px; border-radius: 6px; margin-top: 25px; font-size: 13px; color: var(--text-light); }
"#;

pub fn render_page(title: &str, content: String, body_class: &str) -> Html<String> {
    Html(format!(
        r#"
        <!DOCTYPE html>
        <html lang="pt-BR">
        <head>
            <meta charset="UTF-8">
            <meta name="viewport" content="width=device-width, initial-scale=1.0">
            <title>{title} - Fortes Engenharia</title>
            <link rel="preconnect" href="https://fonts.googleapis.com">
            <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
            <link href="https://fonts.googleapis.com/css2?family=Roboto:wght@400;500;700&display=swap" rel="stylesheet">
            <link href="https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.3/font/bootstrap-icons.min.css" rel="stylesheet">
            <style>{CSS}</style>
        </head>
        <body class="{body_class}">{content}</body>
        </html>
        "#,
        title = crate::modal::escape_html(title),
    ))
}

/// Página autenticada: cabeçalho, menu lateral, conteúdo e um diálogo opcional.
pub async fn render_shell(
    state: &AppState,
    session: &AuthSession,
    title: &str,
    current_path: &str,
    content: String,
    dialog: Option<String>,
) -> Html<String> {
    let header = chrome::render_header(state, session, title, current_path).await;
    let sidebar = chrome::render_sidebar(state, session, current_path).await;
    render_page(
        title,
        format!(
            r#"{header}<div class="layout">{sidebar}<main class="conteudo">{content}</main></div>{dialog}"#,
            dialog = dialog.unwrap_or_default()
        ),
        "",
    )
}

/// Diálogo rico ou, se desligado na configuração, o nativo do navegador.
pub fn dialog(config: &PortalConfig, modal: &Modal, action: Option<&str>, hidden: &[(&str, &str)]) -> String {
    if config.rich_dialogs {
        modal.render(action, hidden)
    } else {
        modal.render_native_script(action, hidden)
    }
}
