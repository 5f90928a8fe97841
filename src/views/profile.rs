// src/views/profile.rs

use crate::modal::escape_html;

pub fn profile_content(current_email: &str, error: Option<&str>) -> String {
    let alert = error
        .map(|e| format!(r#"<div class="alert alert-danger" id="formAlert" role="alert">{}</div>"#, escape_html(e)))
        .unwrap_or_default();
    format!(
        r#"
        <form method="POST" action="/perfil" id="profileForm" class="card" novalidate>
            <h2 class="card-title">Meu Perfil</h2>
            <label for="currentEmail">E-mail atual</label>
            <input type="email" id="currentEmail" value="{email}" readonly>
            <label for="newEmail">Novo e-mail</label>
            <input type="email" name="new_email" id="newEmail" autocomplete="off">
            <label for="confirmEmail">Confirmar novo e-mail</label>
            <input type="email" name="confirm_email" id="confirmEmail" autocomplete="off">
            <label for="newPassword">Nova senha</label>
            <input type="password" name="new_password" id="newPassword" autocomplete="new-password">
            <label for="confirmPassword">Confirmar nova senha</label>
            <input type="password" name="confirm_password" id="confirmPassword" autocomplete="new-password">
            <label for="currentPassword">Senha atual</label>
            <input type="password" name="current_password" id="currentPassword" autocomplete="current-password">
            {alert}
            <div class="acoes">
                <a href="/perfil" class="btn btn-secondary" id="btnCancel">Cancelar</a>
                <button type="submit" class="btn btn-primary">Salvar alterações</button>
            </div>
        </form>
        "#,
        email = escape_html(current_email),
    )
}
