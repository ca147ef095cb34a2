//! Text for the terminal. Everything here is pure so it can be tested
//! without a terminal.

use std::fmt::Write;
use time::UtcOffset;
use crate::authenticator::{AuthError, AuthMode, Authenticator, Notice};
use crate::backend::{Backend, BackendError};
use crate::data::Note;
use crate::workspace::{count_label, format_timestamp, Phase, Workspace, WorkspaceError};

pub const LOADING: &str = "Checking for a saved session...\n";
pub const EMAIL_PROMPT: &str = "Email: ";
pub const PASSWORD_PROMPT: &str = "Password: ";
pub const COMMAND_PROMPT: &str = "> ";
pub const EMPTY_STATE: &str = "You have no notes yet. Add one with `add <text>`.\n";
pub const SAVING: &str = "Saving...\n";
pub const DELETE_USAGE: &str = "Usage: del <n>, where n is the number shown next to the note.\n";

pub const AUTHENTICATOR_HELP: &str = "\
Type your email address, or one of:
  :login     switch to signing in
  :register  switch to creating an account
  :quit      exit
";

pub const WORKSPACE_HELP: &str = "\
Commands:
  add <text>  create a note (without text, retry the unsaved draft)
  del <n>     delete note number n
  dismiss     hide the error message
  logout      sign out
  quit        exit
  help        show this message
";

pub fn authenticator(authenticator: &Authenticator) -> String {
    let mut out = String::new();
    match authenticator.mode() {
        AuthMode::Login => out.push_str("\n== Sign in ==  (:register to create an account)\n"),
        AuthMode::Register => out.push_str("\n== Create an account ==  (:login to sign in)\n"),
    }
    if let Some(notice) = authenticator.notice() {
        let _ = writeln!(out, "{}", notice_message(notice));
    }
    if let Some(e) = authenticator.error() {
        let _ = writeln!(out, "! {}", auth_error(e));
    }
    out
}

pub fn busy(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::Login => "Signing in...\n",
        AuthMode::Register => "Creating the account...\n",
    }
}

pub fn notice_message(notice: Notice) -> &'static str {
    match notice {
        Notice::CheckEmail =>
            "Account created. Check your email for a confirmation link, then sign in.",
        Notice::AccountCreated =>
            "Account created. You can sign in now.",
    }
}

pub fn auth_error(e: &AuthError) -> String {
    match e {
        AuthError::Validation(e) => e.to_string(),
        AuthError::Backend(e) => backend_error(e),
    }
}

pub fn workspace_error(e: &WorkspaceError) -> String {
    match e {
        WorkspaceError::Validation(e) => e.to_string(),
        WorkspaceError::Backend(e) => backend_error(e),
    }
}

/// User facing text for each kind; service wording is only kept for
/// rejections that explain themselves.
pub fn backend_error(e: &BackendError) -> String {
    match e {
        BackendError::InvalidCredentials => "Wrong email or password.".to_owned(),
        BackendError::EmailNotConfirmed =>
            "The email address is not confirmed yet, follow the link in the confirmation email.".to_owned(),
        BackendError::UserAlreadyExists => "An account with this email already exists.".to_owned(),
        BackendError::WeakPassword(reason) => format!("The password is too weak: {reason}"),
        BackendError::NotAuthenticated | BackendError::SessionExpired =>
            "Your session has ended, please sign in again.".to_owned(),
        BackendError::AccessDenied => "You are not allowed to do that.".to_owned(),
        BackendError::NotFound => "It doesn't exist anymore.".to_owned(),
        BackendError::RateLimited => "Too many attempts, try again later.".to_owned(),
        BackendError::Rejected(reason) => format!("The request was rejected: {reason}"),
        BackendError::ServiceUnavailable(_) =>
            "The service is unavailable right now, try again later.".to_owned(),
        BackendError::Service { status, .. } => format!("The service failed (HTTP {status})."),
        BackendError::Network(_) => "Could not reach the service, check your connection.".to_owned(),
        BackendError::UnexpectedResponse(_) => "The service sent a response we don't understand.".to_owned(),
    }
}

pub fn workspace<B: Backend>(workspace: &Workspace<B>, offset: UtcOffset) -> String {
    let mut out = String::new();
    match workspace.user() {
        Some(user) => { let _ = writeln!(out, "\n== Notes of {} ==", user.email); },
        None => out.push_str("\n== Notes ==\n"),
    }
    if let Some(e) = workspace.error() {
        let _ = writeln!(out, "! {}  (`dismiss` to hide)", workspace_error(e));
    }
    if workspace.phase() == Phase::Loading {
        out.push_str("Loading notes...\n");
        return out
    }
    let notes = workspace.notes();
    if notes.is_empty() {
        out.push_str(EMPTY_STATE);
    } else {
        for (i, note) in notes.as_slice().iter().enumerate() {
            out.push_str(&note_entry(i + 1, note, offset));
        }
    }
    let _ = writeln!(out, "-- {} --", count_label(notes.len()));
    if !workspace.draft().trim().is_empty() {
        let _ = writeln!(out, "Unsaved draft: {}  (`add` to retry)", workspace.draft().trim());
    }
    out
}

fn note_entry(number: usize, note: &Note, offset: UtcOffset) -> String {
    let mut out = format!("{number:>3}. {}\n", format_timestamp(note.created_at, offset));
    for line in note.content.lines() {
        let _ = writeln!(out, "     {line}");
    }
    out
}

pub fn delete_prompt(note: &Note) -> String {
    let preview: String = note.content
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(40)
        .collect();
    format!("Delete \"{preview}\"? [y/N] ")
}

pub fn no_such_note(number: &str) -> String {
    format!("There is no note number {number}.\n")
}

pub fn unknown_command(command: &str) -> String {
    format!("Unknown command `{command}`, type `help` for the list.\n")
}
