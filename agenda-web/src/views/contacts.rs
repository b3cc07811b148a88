//! Contact list and contact form pages

use agenda_common::db::Contact;
use axum::response::Html;

use super::{escape, layout};
use crate::session::PageContext;

/// Which page the list is rendered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    All,
    Search,
}

pub enum ContactFormMode<'a> {
    Create,
    Edit(&'a Contact),
}

fn optional(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_default()
}

fn contact_card(contact: &Contact) -> String {
    let photo = match &contact.photo {
        Some(path) => format!(
            r#"<img src="{}" alt="Foto de {}">"#,
            escape(path),
            escape(&contact.name)
        ),
        None => r#"<span class="no-photo">Sem foto</span>"#.to_string(),
    };
    let birth_date = contact
        .birth_date
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default();

    format!(
        r#"<div class="box" id="contact-{id}">
        <p class="photo">{photo}</p>
        <p>Código: {id}</p>
        <p>Nome: {name}</p>
        <p>Email: {email}</p>
        <p>Telefone: {phone}</p>
        <p>Data/Nasc: {birth_date}</p>
        <p>CPF: {cpf}</p>
        <div class="actions">
            <a href="/contacts/{id}/edit">Alterar</a>
            <form method="post" action="/contacts/{id}/delete" data-confirm="Deseja excluir o registro {id}?">
                <button type="submit">Excluir</button>
            </form>
        </div>
    </div>"#,
        id = contact.id,
        photo = photo,
        name = escape(&contact.name),
        email = escape(&contact.email),
        phone = optional(contact.phone.as_deref()),
        birth_date = birth_date,
        cpf = optional(contact.cpf.as_deref()),
    )
}

/// List (or search results) page
pub fn contact_list_page(
    ctx: &PageContext,
    contacts: &[Contact],
    query: &str,
    mode: ListMode,
) -> Html<String> {
    let query = query.trim();
    let heading = match mode {
        ListMode::All => "<h2>Contatos cadastrados</h2>".to_string(),
        ListMode::Search => format!(
            r#"<h2>Pesquisar contatos</h2>
    <form class="search-page" action="/contacts/search" method="get">
        <input type="search" name="q" value="{}" placeholder="Nome ou parte do nome" autofocus>
        <button type="submit">Pesquisar</button>
    </form>"#,
            escape(query)
        ),
    };

    let cards = if contacts.is_empty() {
        if query.is_empty() {
            r#"<p class="empty">Nenhum contato cadastrado.</p>"#.to_string()
        } else {
            format!(
                r#"<p class="empty">Nenhum contato encontrado para "{}".</p>"#,
                escape(query)
            )
        }
    } else {
        contacts.iter().map(contact_card).collect::<Vec<_>>().join("\n")
    };

    let body = format!(
        r#"{heading}
    <section class="contacts">
    {cards}
    </section>"#
    );

    let title = match mode {
        ListMode::All => "Lista de contatos",
        ListMode::Search => "Pesquisar contatos",
    };
    layout(title, ctx, query, &body)
}

/// Creation or edit form
pub fn contact_form_page(ctx: &PageContext, mode: ContactFormMode<'_>) -> Html<String> {
    let (title, action, submit, current) = match mode {
        ContactFormMode::Create => ("Cadastrar contato", "/contacts".to_string(), "Enviar", None),
        ContactFormMode::Edit(c) => (
            "Alterar cadastro",
            format!("/contacts/{}", c.id),
            "Atualizar",
            Some(c),
        ),
    };

    let value = |f: fn(&Contact) -> Option<String>| {
        current.and_then(f).map(|v| escape(&v)).unwrap_or_default()
    };
    let name = value(|c| Some(c.name.clone()));
    let email = value(|c| Some(c.email.clone()));
    let phone = value(|c| c.phone.clone());
    let birth_date = value(|c| c.birth_date.map(|d| d.format("%Y-%m-%d").to_string()));
    let cpf = value(|c| c.cpf.clone());

    let password_hint = if current.is_some() {
        r#" placeholder="Deixe em branco para manter a senha atual""#
    } else {
        ""
    };

    let current_photo = match current.and_then(|c| c.photo.as_deref()) {
        Some(path) => format!(
            r#"<p class="photo">Foto atual:<br><img src="{}" alt="Foto atual"></p>"#,
            escape(path)
        ),
        None => String::new(),
    };

    let body = format!(
        r#"<div class="form-box">
    <h2>{title}</h2>
    <form action="{action}" method="post" enctype="multipart/form-data">
        <p><label>Nome: <input type="text" name="nome" value="{name}" required maxlength="120"></label></p>
        <p><label>Email: <input type="email" name="email" value="{email}" required></label></p>
        <p><label>Senha: <input type="password" name="senha" autocomplete="new-password"{password_hint}></label></p>
        <p><label>Telefone: <input type="tel" name="telefone" value="{phone}" placeholder="(00)00000-0000" data-mask="phone"></label></p>
        <p><label>Data de nascimento: <input type="date" name="data" value="{birth_date}"></label></p>
        <p><label>CPF: <input type="text" name="cpf" value="{cpf}" placeholder="000.000.000-00" data-mask="cpf"></label></p>
        {current_photo}
        <p><label class="file">Enviar foto <input type="file" name="foto" accept="image/jpeg,image/png,image/gif,image/webp"></label></p>
        <button type="submit">{submit}</button>
    </form>
    </div>"#
    );

    layout(title, ctx, "", &body)
}
