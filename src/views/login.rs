// src/views/login.rs

use super::render_page;
use crate::modal::escape_html;
use crate::users::{LoginError, LoginFocus};
use axum::response::Html;
use chrono::{Datelike, Local};

pub fn login_page(error: Option<&LoginError>, username: &str, remember: bool) -> Html<String> {
    let error_html = error
        .map(|e| format!(r#"<div class="alert alert-danger" id="formAlert" role="alert">{}</div>"#, escape_html(&e.to_string())))
        .unwrap_or_default();

    // Foco depois de um erro: utilizador desconhecido volta ao e-mail, senha
    // errada foca e seleciona a senha.
    let focus = error.and_then(LoginError::focus);
    let (username_focus, password_focus, select_script) = match focus {
        Some(LoginFocus::Password) => (
            "",
            " autofocus",
            "<script>document.getElementById('password').select();</script>",
        ),
        _ => (" autofocus", "", ""),
    };
    let checked = if remember { " checked" } else { "" };
    let year = Local::now().year();

    let content = format!(
        r#"
        <div class="login-container">
            <div class="login-card">
                <div class="login-header">
                    <h1>Fortes Engenharia</h1>
                    <p class="text-muted text-center">Portal de Horas Extras</p>
                </div>
                <form method="POST" action="/login" id="loginForm" novalidate>
                    <label for="username">Usuário ou e-mail</label>
                    <input type="email" name="username" id="username" value="{username}" autocomplete="username"{username_focus}>
                    <label for="password">Senha</label>
                    <input type="password" name="password" id="password" autocomplete="current-password"{password_focus}>
                    <label><input type="checkbox" name="remember" id="rememberMe" value="on"{checked}> Lembrar-me</label>
                    {error_html}
                    <button type="submit" class="btn btn-primary" style="width: 100%; margin-top: 16px;">Entrar</button>
                </form>
                <div class="info-box">Utilize as credenciais fornecidas pelo seu gestor.</div>
                <p class="text-muted small text-center">&copy; <span id="year">{year}</span> Fortes Engenharia</p>
            </div>
        </div>
        {select_script}
        "#,
        username = escape_html(username),
    );
    render_page("Login", content, "login-body")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_password_focuses_and_selects_password() {
        let Html(html) = login_page(Some(&LoginError::WrongPassword), "gestor@fortes.com", false);
        assert!(html.contains(r#"autocomplete="current-password" autofocus"#));
        assert!(html.contains("getElementById('password').select()"));
        assert!(html.contains("Usuário ou senha incorretos."));
        assert!(html.contains(r#"value="gestor@fortes.com""#));
    }

    #[test]
    fn unknown_user_focuses_identifier() {
        let Html(html) = login_page(Some(&LoginError::UnknownUser), "x", true);
        assert!(html.contains(r#"autocomplete="username" autofocus"#));
        assert!(!html.contains(".select()"));
        assert!(html.contains(r#"value="on" checked"#));
    }
}
