//! Login page

use axum::response::Html;

use super::layout;
use crate::session::PageContext;

pub fn login_page(ctx: &PageContext) -> Html<String> {
    let body = r#"<div class="form-box">
    <h2>Login</h2>
    <form action="/login" method="post">
        <p><label>Email: <input type="email" name="email" required autofocus></label></p>
        <p><label>Senha: <input type="password" name="senha" required autocomplete="current-password"></label></p>
        <button type="submit">Entrar</button>
    </form>
    </div>"#;

    layout("Login", ctx, "", body)
}
