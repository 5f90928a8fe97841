// src/views/home.rs

use crate::auth::AuthSession;
use crate::chrome;
use crate::modal::{escape_html, Modal, ModalKind};
use std::fmt::Write as _;

pub fn home_content(session: &AuthSession) -> String {
    let mut links = String::new();
    for entry in chrome::nav_for_role(Some(&session.role)) {
        if entry.href == chrome::HOME_PATH {
            continue;
        }
        let _ = write!(links, r#"<a href="{}" class="btn btn-primary">{}</a> "#, entry.href, entry.label);
    }
    format!(
        r#"
        <div class="card">
            <h2 class="card-title">Bem-vindo ao Portal de Horas Extras</h2>
            <p id="userRole">Você está logado como: {role}</p>
            <p class="text-muted small">{email}</p>
            <div class="d-flex gap-2">{links}</div>
        </div>
        "#,
        role = escape_html(&session.role),
        email = escape_html(&session.email),
    )
}

/// Aviso mostrado por cima do início ao abrir "Relatórios".
pub fn reports_modal() -> Modal {
    Modal::alert(
        "Recurso em desenvolvimento",
        "<p>Banco de dados ainda não integrado. Função de Relatórios será liberada em uma futura versão.</p>",
        ModalKind::Info,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_role_and_role_links() {
        let session = AuthSession { email: "gestor@fortes.com".into(), role: "Gestor".into(), remember: false };
        let html = home_content(&session);
        assert!(html.contains("Você está logado como: Gestor"));
        assert!(html.contains(r#"href="/requisicoes""#));
        assert!(!html.contains(r#"href="/solicitacao""#));
    }
}
