//! HTML pages of the shell.
//!
//! Pages are plain strings: a shared layout (navbar, main, footer) around a
//! small form or the dashboard placeholder. Anything that came from a user
//! or a service goes through [`escape`].

use crate::gate::Route;
use crate::session::User;

use super::ShellConfig;

const BRAND: &str = "Deepfake<span class=\"accent\">Hunter</span>";
const FOOTER: &str = "&copy; 2024 AI Detector Pro. Secure &amp; Private.";

/// Escape text for HTML element and attribute content.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn navbar(config: &ShellConfig, user: Option<&User>) -> String {
    let account = user.map_or_else(String::new, |user| {
        format!(
            r#"<div class="account"><span class="user">{name}</span><form method="post" action="{logout}"><button type="submit" class="btn-outline">Log out</button></form></div>"#,
            name = escape(&user.first_name),
            logout = escape(&config.logout_href()),
        )
    });

    format!(r#"<nav><div class="container"><div class="brand">{BRAND}</div>{account}</div></nav>"#)
}

fn layout(config: &ShellConfig, title: &str, user: Option<&User>, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{title} | Deepfake Hunter</title></head>
<body>
{nav}
<main>{main}</main>
<footer>{FOOTER}</footer>
</body>
</html>
"#,
        title = escape(title),
        nav = navbar(config, user),
    )
}

fn error_banner(error: Option<&str>) -> String {
    error.map_or_else(String::new, |message| {
        format!(r#"<p class="alert" role="alert">{}</p>"#, escape(message))
    })
}

#[must_use]
pub fn login_page(config: &ShellConfig, user: Option<&User>, error: Option<&str>) -> String {
    let main = format!(
        r#"<h1>Sign in</h1>{banner}<form method="post" action="{action}"><label>Username <input name="username" autocomplete="username" required></label><label>Password <input name="password" type="password" autocomplete="current-password" required></label><button type="submit">Continue</button></form>"#,
        banner = error_banner(error),
        action = escape(&config.href(Route::Login)),
    );
    layout(config, "Sign in", user, &main)
}

#[must_use]
pub fn biometric_page(config: &ShellConfig, user: &User, error: Option<&str>) -> String {
    let main = format!(
        r#"<h1>Verify it's you, {name}</h1>{banner}<form method="post" action="{action}"><input type="hidden" name="proof" id="proof"><button type="submit">Verify</button></form>"#,
        name = escape(&user.first_name),
        banner = error_banner(error),
        action = escape(&config.href(Route::Biometric)),
    );
    layout(config, "Biometric verification", Some(user), &main)
}

#[must_use]
pub fn dashboard_page(config: &ShellConfig, user: &User) -> String {
    let main = format!(
        r#"<h1>Welcome back, {name}</h1><section id="dashboard"></section>"#,
        name = escape(&user.first_name),
    );
    layout(config, "Dashboard", Some(user), &main)
}
