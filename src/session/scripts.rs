//! Page scripts injected by the shell.
//!
//! The hydration script embeds persisted cookies inside a JavaScript template
//! literal, so every `\`, backtick and `${` in the cookie string is escaped
//! before interpolation.

use crate::session::types::SessionSnapshot;

/// Posts cookies and session storage back to the host as a `storageSync`
/// message. Injected after every navigation-state change.
pub const SYNC_STORAGE_SCRIPT: &str = r#"(() => {
  try {
    if (!window.ReactNativeWebView || !window.ReactNativeWebView.postMessage) {
      return;
    }
    const sessionPayload = {};
    try {
      for (let i = 0; i < sessionStorage.length; i += 1) {
        const key = sessionStorage.key(i);
        sessionPayload[key] = sessionStorage.getItem(key);
      }
    } catch (err) {}
    window.ReactNativeWebView.postMessage(JSON.stringify({
      type: 'storageSync',
      cookies: document.cookie || '',
      session: sessionPayload,
    }));
  } catch (err) {}
})();"#;

/// Escape a value for use inside a JavaScript template literal.
pub fn escape_for_template_literal(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// Script run before content loads on every navigation: restores cookies and
/// session storage from the snapshot.
pub fn hydration_script(snapshot: &SessionSnapshot) -> String {
    let cookies = escape_for_template_literal(&snapshot.cookies);
    let session = serde_json::Value::Object(snapshot.session.clone()).to_string();
    format!(
        r#"(() => {{
  try {{
    const cookieInput = `{cookies}`;
    if (cookieInput) {{
      cookieInput.split(';').forEach((pair) => {{
        const trimmed = pair.trim();
        if (trimmed) {{
          document.cookie = trimmed;
        }}
      }});
    }}
    const sessionData = {session};
    if (sessionData && typeof sessionData === 'object') {{
      Object.keys(sessionData).forEach((key) => {{
        try {{
          sessionStorage.setItem(key, sessionData[key]);
        }} catch (e) {{}}
      }});
    }}
  }} catch (e) {{}}
}})();"#
    )
}
