// src/chrome.rs

//! # Cabeçalho e menu lateral
//!
//! Os fragmentos `header.html` e `sidebar.html` são lidos da pasta de
//! fragmentos a cada página. Se a leitura falhar, usa-se uma versão
//! embutida equivalente, para que a página nunca dependa do ficheiro.

use crate::auth::{AppState, AuthSession};
use crate::modal::escape_html;
use crate::notifications::{self, Notification};
use crate::users::{ROLE_ENCARREGADO, ROLE_GESTOR};
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;

pub const HEADER_FRAGMENT: &str = "header.html";
pub const SIDEBAR_FRAGMENT: &str = "sidebar.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub href: &'static str,
    pub label: &'static str,
}

pub const HOME_PATH: &str = "/main";
pub const REQUESTS_PATH: &str = "/requisicoes";
pub const NEW_REQUEST_PATH: &str = "/solicitacao";
pub const REPORTS_PATH: &str = "/relatorios";
pub const PROFILE_PATH: &str = "/perfil";

pub const NAV: [NavEntry; 5] = [
    NavEntry { href: HOME_PATH, label: "🏠 Início" },
    NavEntry { href: REQUESTS_PATH, label: "📂 Requisições" },
    NavEntry { href: NEW_REQUEST_PATH, label: "➕ Nova Solicitação" },
    NavEntry { href: REPORTS_PATH, label: "📊 Relatórios" },
    NavEntry { href: PROFILE_PATH, label: "👤 Perfil" },
];

/// Menu visível para um papel: o Gestor não cria solicitações e o
/// Encarregado não vê a lista de requisições. Outros papéis veem tudo.
pub fn nav_for_role(role: Option<&str>) -> Vec<NavEntry> {
    NAV.iter()
        .copied()
        .filter(|entry| match role {
            Some(ROLE_GESTOR) => entry.href != NEW_REQUEST_PATH,
            Some(ROLE_ENCARREGADO) => entry.href != REQUESTS_PATH,
            _ => true,
        })
        .collect()
}

const FALLBACK_HEADER: &str = r#"
<header class="d-flex align-items-center justify-content-between p-3 border-bottom">
    <div class="d-flex align-items-center gap-2">
        <a href="/main" class="brand" aria-label="Fortes Engenharia"><strong>Fortes Engenharia</strong></a>
        <button class="btn btn-outline-secondary btn-sm" type="button" onclick="window.history.back()">Voltar</button>
    </div>
    <h1 class="h4 m-0" id="pageTitle">{{title}}</h1>
    <div class="header-right d-flex align-items-center gap-2">
        {{notifications}}
        {{logout}}
    </div>
</header>
"#;

const FALLBACK_SIDEBAR: &str = r#"
<aside class="menu-lateral">
    <h3>Horas Extras</h3>
    <nav>{{nav}}</nav>
</aside>
"#;

async fn load_fragment(dir: &Path, name: &str, fallback: &'static str) -> String {
    let path = dir.join(name);
    match fs::read_to_string(&path).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "fragmento indisponível, a usar a versão embutida");
            fallback.to_string()
        }
    }
}

/// Sino de notificações: contador e menu com as três mais recentes.
pub fn render_notifications(list: &[Notification], current_path: &str) -> String {
    let badge = match notifications::badge_label(list.iter().filter(|n| !n.read).count()) {
        Some(label) => format!(r#"<span class="badge rounded-pill bg-danger" id="badgeNotificacoes">{label}</span>"#),
        None => String::new(),
    };
    let view = notifications::dropdown(list);
    let back = escape_html(current_path);

    let mut items = String::new();
    if view.recent.is_empty() {
        items.push_str(
            r#"<div class="px-3 py-2 text-center text-muted" id="emptyNotifications"><p class="mb-0 small mt-2">Nenhuma notificação</p></div>"#,
        );
    } else {
        let more = if view.more > 0 { format!("+{} mais", view.more) } else { String::new() };
        let _ = write!(
            items,
            r#"<h6 class="dropdown-header"><span>Notificações Recentes</span> <small class="text-muted">{more}</small></h6>"#
        );
        for (index, n) in &view.recent {
            let item = notification_item(n);
            if n.read {
                let _ = write!(items, r#"<div class="notification-item opacity-75">{item}</div>"#);
            } else {
                let _ = write!(
                    items,
                    r#"<form method="POST" action="/notificacoes/{index}/lida" class="notification-item">
                        <input type="hidden" name="voltar" value="{back}">
                        <button type="submit" class="notification-button">{item}</button>
                    </form>"#
                );
            }
        }
        items.push_str(r#"<div class="dropdown-divider"></div>"#);
        if view.show_view_all {
            items.push_str(r#"<a class="dropdown-item text-center small text-primary" href="/notificacoes">Ver todas as notificações</a>"#);
        }
        if view.show_mark_all {
            let _ = write!(
                items,
                r#"<form method="POST" action="/notificacoes/lidas"><input type="hidden" name="voltar" value="{back}">
                    <button type="submit" class="dropdown-item text-center small">Marcar todas como lidas</button></form>"#
            );
        }
    }

    format!(
        r#"<details class="dropdown" id="btnNotificacoes"><summary class="btn btn-outline-secondary btn-sm" title="Notificações">🔔 {badge}</summary>
            <div class="dropdown-menu" id="notificationsDropdown">{items}</div></details>"#
    )
}

fn notification_item(n: &Notification) -> String {
    let new_badge = if n.read { "" } else { r#"<span class="badge bg-primary">Nova</span>"# };
    format!(
        r#"<div class="d-flex gap-2"><i class="bi bi-{icon}"></i><div class="flex-grow-1">
            <strong class="d-block small">{title}</strong> {new_badge}
            <p class="mb-1 small text-muted">{message}</p><small class="text-muted">{date}</small></div></div>"#,
        icon = n.kind.icon(),
        title = escape_html(&n.title),
        message = escape_html(&n.message),
        date = if n.date.is_empty() { "Hoje".to_string() } else { escape_html(&n.date) },
    )
}

fn render_logout(rich_dialogs: bool) -> String {
    let confirm = if rich_dialogs { "" } else { r#" onsubmit="return window.confirm('Deseja sair do sistema?')""# };
    let answer = if rich_dialogs { "" } else { r#"<input type="hidden" name="resposta" value="yes">"# };
    format!(
        r#"<form method="POST" action="/logout"{confirm}>{answer}<button class="btn btn-outline-secondary btn-sm" type="submit" id="btnSair">Sair</button></form>"#
    )
}

/// Destino de regresso enviado pelos formulários do cabeçalho; só caminhos
/// locais são aceites. Os navegadores tratam `\` como `/`, por isso uma barra
/// invertida ou um carácter de controlo recusam o destino.
pub fn safe_back(voltar: Option<&str>, fallback: &'static str) -> String {
    match voltar.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.chars().any(|c| c == '\\' || c.is_control()) =>
        {
            path.to_string()
        }
        _ => fallback.to_string(),
    }
}

pub fn render_nav(role: Option<&str>, current_path: &str) -> String {
    let mut html = String::new();
    for entry in nav_for_role(role) {
        let active = if entry.href == current_path { r#" class="active""# } else { "" };
        let _ = write!(html, r#"<a href="{}"{active}>{}</a>"#, entry.href, entry.label);
    }
    html
}

pub async fn render_header(state: &AppState, session: &AuthSession, title: &str, current_path: &str) -> String {
    let template = load_fragment(&state.config.fragments_dir, HEADER_FRAGMENT, FALLBACK_HEADER).await;
    let list = state.inbox(&session.email).list().await;
    // As notificações trazem texto do utilizador: entram por último.
    template
        .replace("{{title}}", &escape_html(title))
        .replace("{{logout}}", &render_logout(state.config.rich_dialogs))
        .replace("{{notifications}}", &render_notifications(&list, current_path))
}

pub async fn render_sidebar(state: &AppState, session: &AuthSession, current_path: &str) -> String {
    let template = load_fragment(&state.config.fragments_dir, SIDEBAR_FRAGMENT, FALLBACK_SIDEBAR).await;
    template.replace("{{nav}}", &render_nav(Some(&session.role), current_path))
}
