//! Server-rendered HTML
//!
//! Pages are assembled with `format!` around a shared layout. Every value
//! that came from a user or the database goes through [`escape`].

use axum::http::StatusCode;
use axum::response::Html;

use crate::session::PageContext;

pub mod contacts;
pub mod login;

pub use contacts::{contact_form_page, contact_list_page, ContactFormMode, ListMode};
pub use login::login_page;

/// Escape text for HTML element content and quoted attribute values
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn nav(ctx: &PageContext, search: &str) -> String {
    let account = match &ctx.user {
        Some(user) => format!(
            r#"<span class="greeting">Olá {}, bem-vindo de volta!</span>
            <a class="button" href="/logout">Sair</a>"#,
            escape(&user.name)
        ),
        None => r#"<a class="button" href="/login">Entrar</a>"#.to_string(),
    };

    format!(
        r#"<nav>
        <div class="logo">Agenda</div>
        <ul class="nav-items">
            <li><a href="/contacts/search">Pesquisar</a></li>
            <li><a href="/contacts">Lista</a></li>
            <li><a href="/contacts/new">Incluir</a></li>
        </ul>
        <form class="search-box" action="/contacts/search" method="get">
            <input type="search" name="q" placeholder="Pesquisar por nome" value="{search}">
            <button type="submit">Buscar</button>
        </form>
        <div class="account">{account}</div>
    </nav>"#,
        search = escape(search),
        account = account,
    )
}

fn flash(ctx: &PageContext) -> String {
    match &ctx.flash {
        Some(flash) => format!(
            r#"<p class="alert {}">{}</p>"#,
            flash.level.css_class(),
            escape(&flash.message)
        ),
        None => String::new(),
    }
}

/// Full page: head, navigation, flash message and `body`
///
/// `body` must already be escaped.
pub fn layout(title: &str, ctx: &PageContext, search: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <link rel="stylesheet" href="/static/agenda.css">
    <script src="/static/agenda.js" defer></script>
    <title>{title}</title>
</head>
<body>
    {nav}
    <main>
    {flash}
    {body}
    </main>
</body>
</html>"#,
        title = escape(title),
        nav = nav(ctx, search),
        flash = flash(ctx),
        body = body,
    ))
}

/// Minimal standalone page for errors that escape a handler
pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <link rel="stylesheet" href="/static/agenda.css">
    <title>Erro {code}</title>
</head>
<body>
    <main>
    <p class="alert alert-error">{message}</p>
    <p><a href="/contacts">Voltar para a lista</a></p>
    </main>
</body>
</html>"#,
        code = status.as_u16(),
        message = escape(message),
    ))
}
