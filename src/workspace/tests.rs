use std::sync::Arc;
use time::macros::{datetime, offset};
use crate::data::ValidationError;
use crate::session_controller::{SessionController, View};
use crate::testing::FakeBackend;
use super::*;

const NOW: OffsetDateTime = datetime!(2026-10-15 12:00 UTC);

fn fixed_clock() -> OffsetDateTime {
    NOW
}

struct Answer {
    agree: bool,
    asked: usize,
}

#[async_trait]
impl Confirm for Answer {
    async fn confirm_delete(&mut self, _note: &Note) -> bool {
        self.asked += 1;
        self.agree
    }
}

fn yes() -> Answer {
    Answer { agree: true, asked: 0 }
}

struct Setup {
    backend: Arc<FakeBackend>,
    controller: SessionController<FakeBackend>,
    user: User,
}

impl Setup {
    async fn new() -> Setup {
        let backend = Arc::new(FakeBackend::new());
        let user = backend.add_account("a@b.com", "secret1");
        backend.sign_in_silently(&user);
        let mut controller = SessionController::new(backend.clone());
        controller.start().await;
        assert_eq!(controller.view(), View::Workspace);
        Setup { backend, controller, user }
    }

    fn workspace(&self) -> Workspace<FakeBackend> {
        Workspace::with_clock(self.controller.context().clone(), 1024, fixed_clock)
    }

    async fn mounted(&self) -> Workspace<FakeBackend> {
        let mut workspace = self.workspace();
        assert_eq!(workspace.mount().await, ActionOutcome::Applied);
        workspace
    }
}

fn contents<B: Backend>(workspace: &Workspace<B>) -> Vec<&str> {
    workspace.notes().as_slice().iter().map(|n| n.content.as_str()).collect()
}

fn assert_strictly_descending<B: Backend>(workspace: &Workspace<B>) {
    let notes = workspace.notes().as_slice();
    assert!(
        notes.windows(2).all(|w| w[0].created_at > w[1].created_at),
        "not strictly descending: {notes:#?}",
    );
}

#[tokio::test]
async fn mount_lists_only_own_notes() {
    let setup = Setup::new().await;
    let stranger = setup.backend.add_account("c@d.com", "secret2");
    setup.backend.add_note(&setup.user, "old", NOW - Duration::HOUR);
    setup.backend.add_note(&stranger, "foreign", NOW - Duration::MINUTE);
    setup.backend.add_note(&setup.user, "new", NOW - Duration::MINUTE);

    let workspace = setup.mounted().await;

    assert_eq!(workspace.phase(), Phase::Ready);
    assert_eq!(workspace.user(), Some(&setup.user));
    assert_eq!(contents(&workspace), ["new", "old"]);
    assert_strictly_descending(&workspace);
    assert_eq!(
        setup.backend.calls(),
        vec!["get_current_session", "get_current_user", "list_notes"],
    );
}

#[tokio::test]
async fn failed_mount_still_leaves_loading() {
    let setup = Setup::new().await;
    setup.backend.fail_next("list_notes", BackendError::ServiceUnavailable(502));
    let mut workspace = setup.workspace();
    assert_eq!(workspace.phase(), Phase::Loading);

    assert_eq!(workspace.mount().await, ActionOutcome::Failed);

    assert_eq!(workspace.phase(), Phase::Ready);
    assert_eq!(
        workspace.error(),
        Some(&WorkspaceError::Backend(BackendError::ServiceUnavailable(502))),
    );
    assert!(workspace.notes().is_empty());

    workspace.dismiss_error();
    assert!(workspace.error().is_none());
}

#[tokio::test]
async fn mount_without_a_user() {
    let setup = Setup::new().await;
    setup.backend.state().session = None;
    let mut workspace = setup.workspace();

    assert_eq!(workspace.mount().await, ActionOutcome::Skipped);

    assert_eq!(workspace.phase(), Phase::Ready);
    assert_eq!(setup.backend.call_count("list_notes"), 0);
}

#[tokio::test]
async fn blank_drafts_are_not_submitted() {
    let setup = Setup::new().await;
    let mut workspace = setup.mounted().await;

    for draft in ["", "   ", "\n\t "] {
        workspace.set_draft(draft);
        assert_eq!(workspace.create_note().await, ActionOutcome::Skipped);
    }

    assert_eq!(setup.backend.call_count("create_note"), 0);
    assert!(workspace.notes().is_empty());
    assert!(workspace.error().is_none());
}

#[tokio::test]
async fn created_note_goes_first() {
    let setup = Setup::new().await;
    setup.backend.add_note(&setup.user, "earlier", NOW - Duration::HOUR);
    let mut workspace = setup.mounted().await;

    workspace.set_draft("  buy milk ");
    assert_eq!(workspace.create_note().await, ActionOutcome::Applied);

    assert_eq!(contents(&workspace), ["buy milk", "earlier"]);
    let created = &workspace.notes().as_slice()[0];
    assert_eq!(created.owner_id, setup.user.id);
    assert_eq!(created.created_at, NOW);
    assert_eq!(workspace.draft(), "");
    assert_eq!(workspace.phase(), Phase::Ready);
}

#[tokio::test]
async fn failed_create_keeps_the_draft() {
    let setup = Setup::new().await;
    setup.backend.add_note(&setup.user, "earlier", NOW - Duration::HOUR);
    let mut workspace = setup.mounted().await;
    setup.backend.fail_next("create_note", BackendError::Network("timed out".to_owned()));

    workspace.set_draft("buy milk");
    assert_eq!(workspace.create_note().await, ActionOutcome::Failed);

    assert_eq!(workspace.draft(), "buy milk");
    assert_eq!(contents(&workspace), ["earlier"]);
    assert_eq!(
        workspace.error(),
        Some(&WorkspaceError::Backend(BackendError::Network("timed out".to_owned()))),
    );

    assert_eq!(workspace.create_note().await, ActionOutcome::Applied);
    assert_eq!(contents(&workspace), ["buy milk", "earlier"]);
    assert!(workspace.error().is_none());
}

#[tokio::test]
async fn oversized_note_is_rejected_locally() {
    let setup = Setup::new().await;
    let mut workspace = setup.mounted().await;

    workspace.set_draft("x".repeat(1025));
    assert_eq!(workspace.create_note().await, ActionOutcome::Failed);

    assert_eq!(
        workspace.error(),
        Some(&WorkspaceError::Validation(ValidationError::ContentTooLong { max: 1024 })),
    );
    assert_eq!(setup.backend.call_count("create_note"), 0);
}

#[tokio::test]
async fn lagging_clock_keeps_the_order() {
    let setup = Setup::new().await;
    setup.backend.add_note(&setup.user, "from the future", NOW + Duration::HOUR);
    let mut workspace = setup.mounted().await;

    for text in ["one", "two"] {
        workspace.set_draft(text);
        assert_eq!(workspace.create_note().await, ActionOutcome::Applied);
    }

    assert_eq!(contents(&workspace), ["two", "one", "from the future"]);
    assert_strictly_descending(&workspace);
}

#[tokio::test]
async fn newest_note_at_the_end_of_time() {
    let setup = Setup::new().await;
    let last = datetime!(9999-12-31 23:59:59.9995 UTC);
    setup.backend.add_note(&setup.user, "last", last);
    let mut workspace = setup.mounted().await;

    workspace.set_draft("hello");
    assert_eq!(workspace.create_note().await, ActionOutcome::Applied);

    assert_eq!(contents(&workspace), ["last", "hello"]);
    assert_eq!(workspace.notes().as_slice()[1].created_at, NOW);
    assert_strictly_descending(&workspace);
}

#[tokio::test]
async fn dropped_create_leaves_the_editor_usable() {
    let setup = Setup::new().await;
    let mut workspace = setup.mounted().await;
    let _gate = setup.backend.hold_next("create_note");
    workspace.set_draft("buy milk");

    tokio::select! {
        biased;
        _ = workspace.create_note() => panic!("the held create completed"),
        _ = tokio::task::yield_now() => {},
    }
    assert_eq!(workspace.phase(), Phase::Ready);
    assert_eq!(workspace.draft(), "buy milk");

    assert_eq!(workspace.create_note().await, ActionOutcome::Applied);
    assert_eq!(contents(&workspace), ["buy milk"]);
    assert_eq!(setup.backend.call_count("create_note"), 2);
}

#[tokio::test]
async fn create_clears_a_stale_error() {
    let setup = Setup::new().await;
    let note = setup.backend.add_note(&setup.user, "stubborn", NOW - Duration::HOUR);
    let mut workspace = setup.mounted().await;
    setup.backend.fail_next("delete_note", BackendError::AccessDenied);
    assert_eq!(workspace.delete_note(note.id, &mut yes()).await, ActionOutcome::Failed);
    assert!(workspace.error().is_some());

    let lifetime = workspace.lifetime();
    let gate = setup.backend.hold_next("create_note");
    workspace.set_draft("next");
    let (outcome, _) = tokio::join!(
        workspace.create_note(),
        async {
            lifetime.end();
            gate.notify_one();
        },
    );

    assert_eq!(outcome, ActionOutcome::Abandoned);
    assert!(workspace.error().is_none());
}

#[tokio::test]
async fn delete_removes_once() {
    let setup = Setup::new().await;
    let doomed = setup.backend.add_note(&setup.user, "doomed", NOW - Duration::MINUTE);
    setup.backend.add_note(&setup.user, "kept", NOW - Duration::HOUR);
    let mut workspace = setup.mounted().await;
    let mut answer = yes();

    assert_eq!(workspace.delete_note(doomed.id, &mut answer).await, ActionOutcome::Applied);
    assert_eq!(contents(&workspace), ["kept"]);

    assert_eq!(workspace.delete_note(doomed.id, &mut answer).await, ActionOutcome::Skipped);
    assert_eq!(setup.backend.call_count("delete_note"), 1);
    assert_eq!(answer.asked, 1);

    assert_eq!(workspace.mount().await, ActionOutcome::Applied);
    assert_eq!(contents(&workspace), ["kept"]);
}

#[tokio::test]
async fn unknown_ids_are_not_sent() {
    let setup = Setup::new().await;
    let mut workspace = setup.mounted().await;

    assert_eq!(
        workspace.delete_note(Uuid::nil(), &mut yes()).await,
        ActionOutcome::Skipped,
    );
    assert_eq!(setup.backend.call_count("delete_note"), 0);
}

#[tokio::test]
async fn delete_needs_confirmation() {
    let setup = Setup::new().await;
    let note = setup.backend.add_note(&setup.user, "keep me", NOW);
    let mut workspace = setup.mounted().await;
    let mut answer = Answer { agree: false, asked: 0 };

    assert_eq!(workspace.delete_note(note.id, &mut answer).await, ActionOutcome::Skipped);

    assert_eq!(answer.asked, 1);
    assert_eq!(workspace.notes().len(), 1);
    assert_eq!(setup.backend.call_count("delete_note"), 0);
}

#[tokio::test]
async fn failed_delete_leaves_the_list() {
    let setup = Setup::new().await;
    let note = setup.backend.add_note(&setup.user, "stubborn", NOW);
    let mut workspace = setup.mounted().await;
    setup.backend.fail_next("delete_note", BackendError::AccessDenied);

    assert_eq!(workspace.delete_note(note.id, &mut yes()).await, ActionOutcome::Failed);

    assert_eq!(contents(&workspace), ["stubborn"]);
    assert_eq!(workspace.error(), Some(&WorkspaceError::Backend(BackendError::AccessDenied)));
}

#[tokio::test]
async fn teardown_discards_a_pending_create() {
    let setup = Setup::new().await;
    let mut workspace = setup.mounted().await;
    let lifetime = workspace.lifetime();
    let gate = setup.backend.hold_next("create_note");
    workspace.set_draft("too late");

    let (outcome, _) = tokio::join!(
        workspace.create_note(),
        async {
            lifetime.end();
            gate.notify_one();
        },
    );

    assert_eq!(outcome, ActionOutcome::Abandoned);
    assert!(workspace.notes().is_empty());
    assert_eq!(workspace.draft(), "too late");
    assert!(workspace.error().is_none());
}

#[tokio::test]
async fn teardown_before_mount() {
    let setup = Setup::new().await;
    let mut workspace = setup.workspace();
    workspace.tear_down();

    assert_eq!(workspace.mount().await, ActionOutcome::Abandoned);
    assert_eq!(setup.backend.call_count("get_current_user"), 0);
}

#[tokio::test]
async fn logout_signs_out() {
    let setup = Setup::new().await;
    setup.backend.add_note(&setup.user, "x", NOW);
    let mut workspace = setup.mounted().await;

    assert_eq!(workspace.logout().await, ActionOutcome::Applied);

    assert_eq!(setup.controller.view(), View::Authenticator);
    assert_eq!(setup.backend.call_count("sign_out"), 1);
    assert!(workspace.notes().is_empty());
    assert!(workspace.lifetime().is_ended());
}

#[tokio::test]
async fn failed_logout_still_signs_out() {
    let setup = Setup::new().await;
    let mut workspace = setup.mounted().await;
    setup.backend.fail_next("sign_out", BackendError::Network("down".to_owned()));

    assert_eq!(workspace.logout().await, ActionOutcome::Failed);

    assert_eq!(setup.controller.view(), View::Authenticator);
}

#[test]
fn long_timestamps() {
    let timestamp = datetime!(2026-10-15 17:50 UTC);
    assert_eq!(format_timestamp(timestamp, UtcOffset::UTC), "15 October 2026, 17:50");
    assert_eq!(
        format_timestamp(datetime!(2026-10-15 15:50 UTC), offset!(+2)),
        "15 October 2026, 17:50",
    );
    assert_eq!(
        format_timestamp(datetime!(2026-01-01 00:05 UTC), offset!(-1)),
        "31 December 2025, 23:05",
    );
}

#[test]
fn note_counts() {
    assert_eq!(count_label(0), "0 notes");
    assert_eq!(count_label(1), "1 note");
    assert_eq!(count_label(12), "12 notes");
}
