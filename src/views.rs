//! HTML pages rendered by the directory routes.

use askama::Template;

use crate::db::DirectoryEntry;

#[derive(Template)]
#[template(path = "emails.html")]
pub struct EmailsPage<'a> {
    pub keyword: &'a str,
    pub name_emails: &'a [DirectoryEntry],
    pub show_result: bool,
}

impl EmailsPage<'_> {
    pub fn empty() -> Self {
        EmailsPage {
            keyword: "",
            name_emails: &[],
            show_result: false,
        }
    }
}

#[derive(Template)]
#[template(path = "add-email.html")]
pub struct AddEmailPage<'a> {
    pub result_html: &'a str,
    pub show_result: bool,
}

impl AddEmailPage<'_> {
    pub fn empty() -> Self {
        AddEmailPage {
            result_html: "",
            show_result: false,
        }
    }
}
