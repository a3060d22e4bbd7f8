//! Reload script injection into HTML pages.

use crate::live_reload::EVENTS_PATH;

/// Closing body tag the script is inserted before.
const BODY_CLOSE: &str = "</body>";

/// Build the reload bootstrap script for the given host and port.
pub(crate) fn reload_script(host: &str, port: u16) -> String {
    format!(
        r#"<script>new WebSocket("ws://{host}:{port}{EVENTS_PATH}").onmessage = () => location.reload();</script>"#
    )
}

/// Insert `script` before the last `</body>`, or append it when there is none.
pub(crate) fn inject_script(html: &str, script: &str) -> String {
    let mut out = String::with_capacity(html.len() + script.len());

    match html.rfind(BODY_CLOSE) {
        Some(index) => {
            out.push_str(&html[..index]);
            out.push_str(script);
            out.push_str(&html[index..]);
        }
        None => {
            out.push_str(html);
            out.push_str(script);
        }
    }

    out
}
