//! Minimal server-rendered pages
//!
//! The UI is deliberately thin: a chat page whose script drives the JSON
//! API, and a login form. Anything richer belongs in the static assets.

pub const INDEX_HTML: &str = include_str!("../../static/index.html");

const LOGIN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Login - Chat Gateway</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <main class="login">
    <h1>Chat Gateway</h1>
    <!--ERROR-->
    <form method="post" action="/login">
      <label>Username <input type="text" name="username" autocomplete="username" required></label>
      <label>Password <input type="password" name="password" autocomplete="current-password" required></label>
      <button type="submit">Sign in</button>
    </form>
  </main>
</body>
</html>
"#;

pub const NOT_FOUND_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Not Found</title></head>
<body><main><h1>404</h1><p>Page not found. <a href="/">Home</a></p></main></body>
</html>
"#;

/// Render the login page, optionally with an error banner
pub fn render_login(error: Option<&str>) -> String {
    let banner = match error {
        Some(message) => format!(r#"<p class="error">{}</p>"#, escape(message)),
        None => String::new(),
    };
    LOGIN_TEMPLATE.replace("<!--ERROR-->", &banner)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
