use askama::Template;
use axum::{Form, extract::State, response::Html};
use serde::Deserialize;

use crate::error::DirectoryError;
use crate::router::DirectoryState;
use crate::views::{AddEmailPage, EmailsPage};

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub user_keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct AddEntryForm {
    pub username: String,
    pub useremail: String,
}

/// GET / -> empty search form.
pub async fn search_page() -> Result<Html<String>, DirectoryError> {
    Ok(Html(EmailsPage::empty().render()?))
}

/// POST / -> substring lookup on `user_keyword`.
pub async fn search_entries(
    State(state): State<DirectoryState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, DirectoryError> {
    let entries = state.directory.lookup(&form.user_keyword).await?;
    let page = EmailsPage {
        keyword: &form.user_keyword,
        name_emails: &entries,
        show_result: true,
    };
    Ok(Html(page.render()?))
}

/// GET /add -> empty add-entry form.
pub async fn add_page() -> Result<Html<String>, DirectoryError> {
    Ok(Html(AddEmailPage::empty().render()?))
}

/// POST /add -> insert `username` / `useremail` and report the outcome.
pub async fn add_entry(
    State(state): State<DirectoryState>,
    Form(form): Form<AddEntryForm>,
) -> Result<Html<String>, DirectoryError> {
    let outcome = state
        .directory
        .insert(&form.username, &form.useremail)
        .await?;
    let message = outcome.to_string();
    let page = AddEmailPage {
        result_html: &message,
        show_result: true,
    };
    Ok(Html(page.render()?))
}
