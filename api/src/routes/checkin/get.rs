use axum::{
    extract::Query,
    response::Html,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Session id from the scanned link.
    pub s: i64,
    /// Session secret from the scanned link.
    pub c: String,
}

/// GET /api/checkin?s={session_id}&c={secret}
///
/// The page a scanned QR code lands on. It only passes the session id and
/// secret through to the submission endpoint; the browser supplies the
/// coordinates and the bearer token.
pub async fn checkin_page(Query(q): Query<PageQuery>) -> Html<String> {
    // The secret is generated hex, but escape it anyway since it echoes
    // back user-controlled input.
    let secret: String = q
        .c
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
        .collect();
    let session_id = q.s;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Class check-in</title>
</head>
<body>
  <h1>Class check-in</h1>
  <p id="status">Requesting your location&hellip;</p>
  <script>
    const sessionId = {session_id};
    const secret = "{secret}";
    const status = document.getElementById("status");

    navigator.geolocation.getCurrentPosition(async (pos) => {{
      status.textContent = "Submitting check-in…";
      try {{
        const res = await fetch(`/api/checkin/${{sessionId}}?c=${{secret}}`, {{
          method: "POST",
          headers: {{
            "Content-Type": "application/json",
            "Authorization": "Bearer " + (localStorage.getItem("token") || ""),
          }},
          body: JSON.stringify({{
            latitude: pos.coords.latitude,
            longitude: pos.coords.longitude,
          }}),
        }});
        const json = await res.json();
        status.textContent = json.message;
      }} catch (err) {{
        status.textContent = "Check-in failed, please try again.";
      }}
    }}, () => {{
      status.textContent = "Location permission is required to check in.";
    }});
  </script>
</body>
</html>
"#
    ))
}
