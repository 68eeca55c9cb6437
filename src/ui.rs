//! Sign-in pages. Everything past sign-in is served as JSON.

pub fn render_login() -> String {
    render_auth_page(
        "Sign in",
        "/login",
        LOGIN_FIELDS,
        r#"New here? <a href="/register">Create an account</a>"#,
    )
}

pub fn render_register() -> String {
    render_auth_page(
        "Create account",
        "/register",
        REGISTER_FIELDS,
        r#"Already registered? <a href="/login">Sign in</a>"#,
    )
}

fn render_auth_page(title: &str, action: &str, fields: &str, footer: &str) -> String {
    AUTH_HTML
        .replace("{{TITLE}}", title)
        .replace("{{ACTION}}", action)
        .replace("{{FIELDS}}", fields)
        .replace("{{FOOTER}}", footer)
}

const LOGIN_FIELDS: &str = r#"
      <label>Username <input name="username" autocomplete="username" required /></label>
      <label>Password <input name="password" type="password" autocomplete="current-password" required /></label>"#;

const REGISTER_FIELDS: &str = r#"
      <label>Username <input name="username" autocomplete="username" required /></label>
      <label>Email <input name="email" type="email" autocomplete="email" required /></label>
      <label>Password <input name="password" type="password" minlength="6" autocomplete="new-password" required /></label>
      <label>Confirm password <input name="confirm_password" type="password" minlength="6" autocomplete="new-password" required /></label>"#;

const AUTH_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} · BerrySweet</title>
  <style>
    :root {
      --berry: #e8436d;
      --berry-dark: #b8284e;
      --cream: #fff5f7;
      --ink: #3a2a30;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 24px 60px rgba(184, 40, 78, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      display: grid;
      place-items: center;
      padding: 32px 18px;
      background: radial-gradient(circle at top, #ffd1dc, transparent 60%),
        linear-gradient(135deg, var(--cream), #ffe3ea 70%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
    }

    main {
      width: min(420px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 32px;
    }

    h1 {
      margin: 0 0 20px;
      color: var(--berry-dark);
    }

    form {
      display: grid;
      gap: 14px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 14px;
    }

    input {
      padding: 10px 12px;
      border: 1px solid #f3b6c6;
      border-radius: 12px;
      font-size: 15px;
    }

    button {
      padding: 12px;
      border: none;
      border-radius: 999px;
      background: var(--berry);
      color: white;
      font-size: 15px;
      cursor: pointer;
    }

    button:hover {
      background: var(--berry-dark);
    }

    p {
      margin: 18px 0 0;
      font-size: 14px;
    }

    a {
      color: var(--berry-dark);
    }
  </style>
</head>
<body>
  <main>
    <h1>🍓 {{TITLE}}</h1>
    <form method="post" action="{{ACTION}}">{{FIELDS}}
      <button type="submit">{{TITLE}}</button>
    </form>
    <p>{{FOOTER}}</p>
  </main>
</body>
</html>
"#;
