//! The privileged-host boundary: heading-link formatting and the system
//! clipboard.
//!
//! The panel itself never touches the clipboard or resolves note titles; it
//! sends a [`HostRequest`] across this boundary and the host does the rest.
//! A failed resolution is logged and the request is dropped: nothing is
//! copied and nothing propagates back to the panel.

use std::io::{Write, stdout};

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Requests the panel may send to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostRequest {
    #[serde(rename_all = "camelCase")]
    CopyHeadingLink {
        note_id: String,
        heading_text: String,
        heading_anchor: String,
    },
}

/// Parse a request envelope as received from the panel's message layer.
///
/// # Errors
/// Returns a deserialization error for unknown request types or missing
/// fields.
pub fn parse_request(json: &str) -> Result<HostRequest, serde_json::Error> {
    serde_json::from_str(json)
}

/// Resolves a note id to its display title.
pub trait NoteResolver {
    fn note_title(&self, note_id: &str) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("unknown note id {0:?}")]
    UnknownNote(String),
    #[error("clipboard write failed: {0}")]
    Clipboard(#[from] std::io::Error),
}

/// Handle a host request. Copy failures surface as `Err` for the caller's
/// status line; an unresolvable note is logged here and swallowed into the
/// same error path so the panel stays a no-op.
pub fn handle_request(
    request: &HostRequest,
    resolver: &impl NoteResolver,
) -> Result<String, LinkError> {
    match request {
        HostRequest::CopyHeadingLink {
            note_id,
            heading_text,
            heading_anchor,
        } => {
            let title = resolver.note_title(note_id).ok_or_else(|| {
                tracing::warn!(%note_id, "dropping copy request for unresolvable note");
                LinkError::UnknownNote(note_id.clone())
            })?;
            let link = heading_link(heading_text, &title, note_id, heading_anchor);
            copy_to_clipboard(&link)?;
            Ok(link)
        }
    }
}

/// Format a heading link: `[text @ title](:/noteId#anchor)`.
pub fn heading_link(heading_text: &str, note_title: &str, note_id: &str, anchor: &str) -> String {
    format!(
        "[{} @ {}](:/{note_id}#{anchor})",
        escape_label(heading_text),
        escape_label(note_title),
    )
}

/// Backslash-escape backslashes and square brackets in a link label.
fn escape_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn copy_to_clipboard(text: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        if copy_to_pbcopy(text).is_ok() {
            return Ok(());
        }
    }
    copy_to_clipboard_osc52(text)
}

#[cfg(target_os = "macos")]
fn copy_to_pbcopy(text: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new("pbcopy").stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other("pbcopy failed"))
    }
}

fn copy_to_clipboard_osc52(text: &str) -> std::io::Result<()> {
    let osc = osc52_sequence(text);
    let mut out = stdout();
    out.write_all(osc.as_bytes())?;
    out.flush()
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}
