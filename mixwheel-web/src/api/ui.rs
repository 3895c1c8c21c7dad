//! HTML page rendering
//!
//! Pages are assembled with `format!` around a shared layout. Anything that
//! originates from the catalog or the user (playlist names, track titles,
//! artist names) goes through [`html_escape`] first.

use axum::response::Html;
use mixwheel_common::{decode_key_mode, EnrichedTrack, Result};

use crate::catalog::Playlist;

const STYLE: &str = r#"
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
        }
        header {
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 20px;
            margin-bottom: 30px;
            display: flex;
            justify-content: space-between;
            align-items: center;
        }
        h1 {
            font-size: 26px;
            color: #1db954;
        }
        .build-info {
            color: #888;
            font-family: 'Courier New', monospace;
            font-size: 13px;
        }
        .container {
            padding: 0 20px 40px 20px;
        }
        table {
            width: 100%;
            border-collapse: collapse;
            margin-bottom: 30px;
        }
        th, td {
            padding: 8px 10px;
            border-bottom: 1px solid #333;
            text-align: left;
        }
        th {
            color: #888;
            font-weight: 600;
        }
        .camelot {
            font-family: 'Courier New', monospace;
            color: #1db954;
        }
        .missing {
            color: #e0a040;
        }
        label {
            display: block;
            margin: 12px 0 4px 0;
        }
        input[type=text], select {
            width: 100%;
            max-width: 480px;
            padding: 8px;
            background: #2a2a2a;
            color: #e0e0e0;
            border: 1px solid #3a3a3a;
        }
        button, .button {
            display: inline-block;
            margin-top: 16px;
            padding: 10px 18px;
            background: #1db954;
            color: #111;
            border: none;
            text-decoration: none;
            font-weight: 600;
            cursor: pointer;
        }
        .actions {
            margin: 10px 0 30px 0;
        }
"#;

/// Escape text for inclusion in HTML element content or attribute values
pub fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Wrap page content in the shared layout
fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - MixWheel</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <h1>MixWheel</h1>
        <div class="build-info">v{version} [{git_hash}] &middot; <a href="/auth/logout">Log out</a></div>
    </header>
    <div class="container">
{body}
    </div>
</body>
</html>
"#,
        title = html_escape(title),
        style = STYLE,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        body = body,
    ))
}

/// Landing page after the OAuth redirect
///
/// The implicit grant returns the token in the URL fragment, which never
/// reaches the server; the script lifts it into a form post.
pub fn start_page() -> Html<String> {
    let body = r#"
        <h2>Connecting your Spotify account&hellip;</h2>
        <form id="token-form" method="post" action="/auth/callback">
            <input type="hidden" name="access_token" id="access_token">
        </form>
        <script>
            (function () {
                const params = new URLSearchParams(window.location.hash.substring(1));
                const error = params.get("error");
                if (error) {
                    window.location.replace("/auth/fail?error=" + encodeURIComponent(error));
                    return;
                }
                const token = params.get("access_token");
                if (!token) {
                    window.location.replace("/auth/fail?error=unexpected");
                    return;
                }
                document.getElementById("access_token").value = token;
                document.getElementById("token-form").submit();
            })();
        </script>
"#;
    layout("Connecting", body)
}

/// Playlist selection form
pub fn playlists_page(playlists: &[Playlist]) -> Html<String> {
    let options: String = playlists
        .iter()
        .map(|p| {
            let count = p.tracks.as_ref().map(|t| t.total).unwrap_or(0);
            format!(
                "                <option value=\"{}\">{} ({} tracks)</option>\n",
                html_escape(&p.id),
                html_escape(&p.name),
                count
            )
        })
        .collect();

    let body = if playlists.is_empty() {
        "        <p>No playlists found on this account.</p>\n".to_string()
    } else {
        format!(
            r#"        <h2>Choose a playlist</h2>
        <form method="post" action="/flow/tracks">
            <label for="playlist">Playlist</label>
            <select name="playlist" id="playlist">
{options}            </select>
            <button type="submit">Load tracks</button>
        </form>
"#,
            options = options
        )
    };

    layout("Playlists", &body)
}

fn missing_section(missing: &[String]) -> String {
    if missing.is_empty() {
        return String::new();
    }
    let items: String = missing
        .iter()
        .map(|label| format!("            <li>{}</li>\n", html_escape(label)))
        .collect();
    format!(
        r#"        <h3 class="missing">{} track(s) without audio features</h3>
        <ul class="missing">
{}        </ul>
"#,
        missing.len(),
        items
    )
}

fn track_row(index: usize, track: &EnrichedTrack, camelot: Option<&str>) -> Result<String> {
    let decoded = decode_key_mode(track.features.key, track.features.mode)?;
    let camelot_cell = camelot
        .map(|code| format!("<td class=\"camelot\">{}</td>", code))
        .unwrap_or_default();
    Ok(format!(
        "                <tr><td>{}</td><td>{}</td><td>{}</td><td>{} {}</td>{}<td>{:.1}</td></tr>\n",
        index + 1,
        html_escape(&track.track.artist_names().join(", ")),
        html_escape(&track.track.name),
        decoded.key_name,
        decoded.mode_name,
        camelot_cell,
        track.tempo()
    ))
}

/// Tracks of the chosen playlist, in playlist order
pub fn tracks_page(tracks: &[EnrichedTrack], missing: &[String]) -> Result<Html<String>> {
    let mut rows = String::new();
    for (i, track) in tracks.iter().enumerate() {
        rows.push_str(&track_row(i, track, None)?);
    }

    let body = format!(
        r#"        <h2>{count} tracks</h2>
        <div class="actions"><a class="button" href="/flow/tracks/organized">Organize</a></div>
        <table>
            <thead>
                <tr><th>#</th><th>Artists</th><th>Title</th><th>Key</th><th>Tempo</th></tr>
            </thead>
            <tbody>
{rows}            </tbody>
        </table>
{missing}"#,
        count = tracks.len(),
        rows = rows,
        missing = missing_section(missing)
    );

    Ok(layout("Tracks", &body))
}

/// Sequenced tracks with their wheel positions
pub fn sorted_page(tracks: &[EnrichedTrack], missing: &[String]) -> Result<Html<String>> {
    let mut rows = String::new();
    for (i, track) in tracks.iter().enumerate() {
        let camelot = track.compatibility_class()?.camelot();
        rows.push_str(&track_row(i, track, Some(&camelot))?);
    }

    let body = format!(
        r#"        <h2>Organized: {count} tracks</h2>
        <div class="actions"><a class="button" href="/flow/create">Save</a></div>
        <table>
            <thead>
                <tr><th>#</th><th>Artists</th><th>Title</th><th>Key</th><th>Wheel</th><th>Tempo</th></tr>
            </thead>
            <tbody>
{rows}            </tbody>
        </table>
{missing}"#,
        count = tracks.len(),
        rows = rows,
        missing = missing_section(missing)
    );

    Ok(layout("Organized", &body))
}

/// Save form: overwrite the source playlist or create a new one
pub fn create_page() -> Html<String> {
    let body = r#"        <h2>Save the organized tracks</h2>
        <div class="actions">
            <a class="button" href="/api/overwrite-playlist">Overwrite the original playlist</a>
        </div>
        <h3>Or create a new playlist</h3>
        <form method="post" action="/api/create-playlist">
            <label for="playlist_name">Name</label>
            <input type="text" name="playlist_name" id="playlist_name" required>
            <label for="playlist_description">Description</label>
            <input type="text" name="playlist_description" id="playlist_description">
            <button type="submit">Create playlist</button>
        </form>
"#;
    layout("Save", body)
}
