use std::io;
use std::sync::Arc;
use log::{debug, info};
use time::UtcOffset;
use crate::authenticator::{AuthMode, AuthOutcome, Authenticator};
use crate::backend::Backend;
use crate::session_controller::{SessionController, View};
use crate::terminal::{render, Console, ConsoleConfirm};
use crate::workspace::{ViewLifetime, Workspace};


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UiSettings {
    pub max_note_length: usize,
    pub local_offset: UtcOffset,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Flow {
    Switch,
    Quit,
}

#[derive(Debug, Eq, PartialEq)]
enum Command<'a> {
    Empty,
    Add(Option<&'a str>),
    Delete(&'a str),
    Dismiss,
    Logout,
    Quit,
    Help,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Command<'a> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));
        match word {
            "" => Command::Empty,
            "add" | "a" => Command::Add(Some(rest).filter(|r| !r.is_empty())),
            "del" | "delete" | "rm" => Command::Delete(rest),
            "dismiss" => Command::Dismiss,
            "logout" => Command::Logout,
            "quit" | "exit" | "q" => Command::Quit,
            "help" | "?" => Command::Help,
            other => Command::Unknown(other),
        }
    }
}

/// Runs the session controller and its views until the user quits or the
/// input ends.
pub async fn run<B: Backend, C: Console>(
    backend: Arc<B>,
    settings: UiSettings,
    console: &mut C,
) -> io::Result<()> {
    let mut controller = SessionController::new(backend);
    console.write(render::LOADING)?;
    controller.start().await;

    let result = loop {
        let flow = match controller.view() {
            View::Loading => Ok(
                match controller.next_change().await {
                    Some(_) => Flow::Switch,
                    None => Flow::Quit,
                }
            ),
            View::Authenticator => authenticator_view(&mut controller, console).await,
            View::Workspace => workspace_view(&mut controller, settings, console).await,
        };
        match flow {
            Ok(Flow::Switch) => debug!("switching to {:?}", controller.view()),
            Ok(Flow::Quit) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    controller.shutdown();
    info!("bye");
    result
}

async fn authenticator_view<B: Backend, C: Console>(
    controller: &mut SessionController<B>,
    console: &mut C,
) -> io::Result<Flow> {
    let mut authenticator = Authenticator::new();
    console.write(render::AUTHENTICATOR_HELP)?;
    loop {
        console.write(&render::authenticator(&authenticator))?;
        console.write(render::EMAIL_PROMPT)?;
        let line = tokio::select! {
            line = console.read_line() => line?,
            change = controller.next_change() => match change {
                Some(View::Authenticator) => continue,
                Some(_) => return Ok(Flow::Switch),
                None => return Ok(Flow::Quit),
            },
        };
        let Some(line) = line else {
            return Ok(Flow::Quit)
        };
        let email = line.trim();
        match email {
            "" => continue,
            ":quit" | ":q" => return Ok(Flow::Quit),
            ":login" => {
                authenticator.set_mode(AuthMode::Login);
                continue
            },
            ":register" => {
                authenticator.set_mode(AuthMode::Register);
                continue
            },
            ":help" => {
                console.write(render::AUTHENTICATOR_HELP)?;
                continue
            },
            command if command.starts_with(':') => {
                console.write(&render::unknown_command(command))?;
                continue
            },
            _ => {},
        }

        console.write(render::PASSWORD_PROMPT)?;
        let Some(password) = console.read_password().await? else {
            return Ok(Flow::Quit)
        };
        console.write(render::busy(authenticator.mode()))?;
        let outcome = authenticator
            .submit(controller.context(), email, &password)
            .await;
        if let AuthOutcome::Authenticated(user) = outcome {
            console.write(&format!("Signed in as {}.\n", user.email))?;
            return Ok(Flow::Switch)
        }
    }
}

async fn workspace_view<B: Backend, C: Console>(
    controller: &mut SessionController<B>,
    settings: UiSettings,
    console: &mut C,
) -> io::Result<Flow> {
    let mut workspace = Workspace::new(
        controller.context().clone(),
        settings.max_note_length,
    );
    let lifetime = workspace.lifetime();
    if while_signed_in(controller, &lifetime, workspace.mount()).await.is_none() {
        return Ok(Flow::Switch)
    }

    loop {
        console.write(&render::workspace(&workspace, settings.local_offset))?;
        console.write(render::COMMAND_PROMPT)?;
        let Some(line) = while_signed_in(controller, &lifetime, console.read_line()).await else {
            return Ok(Flow::Switch)
        };
        let Some(line) = line? else {
            return Ok(Flow::Quit)
        };
        match Command::parse(&line) {
            Command::Empty => {},
            Command::Add(text) => {
                if let Some(text) = text {
                    workspace.set_draft(text);
                }
                if !workspace.draft().trim().is_empty() {
                    console.write(render::SAVING)?;
                }
                if while_signed_in(controller, &lifetime, workspace.create_note()).await.is_none() {
                    return Ok(Flow::Switch)
                }
            },
            Command::Delete("") => console.write(render::DELETE_USAGE)?,
            Command::Delete(number) => {
                let id = number
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| workspace.notes().as_slice().get(i))
                    .map(|note| note.id);
                match id {
                    None => console.write(&render::no_such_note(number))?,
                    Some(id) => {
                        let mut confirm = ConsoleConfirm::new(console);
                        let deletion = workspace.delete_note(id, &mut confirm);
                        if while_signed_in(controller, &lifetime, deletion).await.is_none() {
                            return Ok(Flow::Switch)
                        }
                    },
                }
            },
            Command::Dismiss => workspace.dismiss_error(),
            Command::Logout => {
                workspace.logout().await;
                return Ok(Flow::Switch)
            },
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => console.write(render::WORKSPACE_HELP)?,
            Command::Unknown(word) => console.write(&render::unknown_command(word))?,
        }
        if controller.view() != View::Workspace {
            return Ok(Flow::Switch)
        }
    }
}

/// Drives `future` while still applying session notifications. Once the
/// user is no longer signed in the view's lifetime ends and `None` is
/// returned.
async fn while_signed_in<B: Backend, F: Future>(
    controller: &mut SessionController<B>,
    lifetime: &ViewLifetime,
    future: F,
) -> Option<F::Output> {
    tokio::pin!(future);
    loop {
        tokio::select! {
            biased;
            change = controller.next_change() => {
                if change != Some(View::Workspace) {
                    debug!("the session changed, leaving the workspace");
                    lifetime.end();
                    return None
                }
            },
            output = &mut future => return Some(output),
        }
    }
}
