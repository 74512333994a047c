use std::path::PathBuf;
use std::sync::Arc;

use assess_core::model::{Answer, AssessmentId, AttemptId, MediaUri, QuestionType};
use assess_core::navigator::Navigation;
use dioxus::prelude::*;
use dioxus_router::{Link, Navigator, use_navigator};
use services::{
    AnswerPayload, AssessmentLoopService, AssessmentService, UploadSimulator, probe_media,
};

use crate::context::{AppContext, AttemptSlot, Flash};
use crate::routes::Route;
use crate::views::attempt::{ensure_attempt, use_redirect_when_missing};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    QuestionSlot, QuestionVm, SectionInput, SectionPhase, SectionStep, SectionVm,
    display_answer, format_datetime,
};

#[component]
pub fn SectionView(assessment_id: u64, section: QuestionType) -> Element {
    let ctx = use_context::<AppContext>();
    let slot = use_context::<AttemptSlot>().0;
    let mut flash = use_context::<Flash>().0;
    let navigator = use_navigator();
    let assessment_loop = ctx.assessment_loop();
    let uploads = ctx.uploads();

    let mut vm = use_signal(|| SectionVm::new(section));
    use_effect(use_reactive((&section,), move |(section,)| {
        if vm.peek().section() != section {
            vm.set(SectionVm::new(section));
        }
    }));

    let loop_for_resource = Arc::clone(&assessment_loop);
    let resource = use_resource(move || {
        let assessment_loop = loop_for_resource.clone();
        async move {
            ensure_attempt(&assessment_loop, slot, AssessmentId::new(assessment_id)).await
        }
    });
    use_redirect_when_missing(resource);
    let state = view_state_from_resource(&resource);

    let on_next = use_callback(move |()| {
        let current = {
            let slot = slot.peek();
            slot.as_ref().and_then(|session| {
                vm.peek()
                    .current_question(session)
                    .map(|question| (session.attempt_id(), question))
            })
        };
        let Some((attempt_id, question)) = current else {
            return;
        };

        if question.is_answered() {
            let (navigation, next) = slot.peek().as_ref().map_or(
                (Navigation::Unresolved, None),
                |session| {
                    (
                        session.navigate_from(Some(&question.id)),
                        QuestionSlot::after(session, &question.id),
                    )
                },
            );
            let step = vm.write().skip(navigation, next);
            follow_step(navigator, assessment_id, step);
            return;
        }

        let parsed = vm.peek().input_for(question.question_type);
        let input = match parsed {
            Ok(input) => input,
            Err(message) => {
                vm.write().fail(message);
                return;
            }
        };
        if !vm.write().begin_submit() {
            return;
        }

        let assessment_loop = Arc::clone(&assessment_loop);
        spawn(async move {
            let payload = match input {
                SectionInput::Text(text) => AnswerPayload::Text(text),
                SectionInput::MediaPath(path) => {
                    match upload_media(uploads, vm, attempt_id, &question, path).await {
                        Ok(uri) => AnswerPayload::Media(uri),
                        Err(message) => {
                            vm.write().fail(message);
                            return;
                        }
                    }
                }
            };

            let recorded = record_answer(slot, &question, payload);
            let (navigation, next, answers) = match recorded {
                Ok(recorded) => recorded,
                Err(message) => {
                    vm.write().fail(message);
                    return;
                }
            };

            let save = assessment_loop.save_progress(attempt_id, &answers).await;
            if let Some(warning) = save.warning() {
                flash.set(Some(warning.to_owned()));
            }
            let step = vm.write().saved(navigation, next);
            follow_step(navigator, assessment_id, step);
        });
    });

    let (page, current_vm) = {
        let stored_vm = vm.read();
        let current_vm = if stored_vm.section() == section {
            stored_vm.clone()
        } else {
            SectionVm::new(section)
        };
        let page = slot
            .read()
            .as_ref()
            .map(|session| SectionPage::build(session, &current_vm));
        (page, current_vm)
    };

    rsx! {
        div { class: "page section-page",
            header { class: "section-header",
                h2 { "{section.label()}" }
                if let Some(page) = page.as_ref() {
                    span { class: "section-progress", "{page.progress_label}" }
                }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "field-error", "{err.message()}" }
                    Link { to: Route::Home {}, "Back to assessments" }
                },
                ViewState::Ready(()) => rsx! {
                    if let Some(page) = page {
                        p { class: "section-progress", "Started {page.started_label}" }
                        if let Some(question) = page.question {
                            QuestionCard {
                                question,
                                vm: current_vm,
                                on_draft: move |value: String| vm.write().set_draft(value),
                                on_media_path: move |value: String| vm.write().set_media_path(value),
                                on_next,
                            }
                        } else {
                            p { "There are no questions in this section." }
                        }
                        div { class: "actions",
                            Link { to: Route::Review { assessment_id }, "Review answers" }
                        }
                    } else {
                        p { "{ViewError::Unknown.message()}" }
                    }
                },
            }
        }
    }
}

/// Render data for the section page, computed from the attempt and page state.
struct SectionPage {
    question: Option<QuestionVm>,
    progress_label: String,
    started_label: String,
}

impl SectionPage {
    fn build(session: &AssessmentService, vm: &SectionVm) -> Self {
        let progress = session.progress();
        Self {
            question: vm.current_question(session),
            progress_label: format!(
                "{} of {} answered ({}%)",
                progress.answered,
                progress.total,
                progress.percent()
            ),
            started_label: format_datetime(session.started_at()),
        }
    }
}

#[component]
fn QuestionCard(
    question: QuestionVm,
    vm: SectionVm,
    on_draft: EventHandler<String>,
    on_media_path: EventHandler<String>,
    on_next: Callback<()>,
) -> Element {
    let busy = vm.phase() == SectionPhase::Submitting;
    let upload_percent = vm.upload_progress().map(|p| p.percent());
    let button_label = match (busy, upload_percent) {
        (true, Some(percent)) => format!("Uploading {percent}%"),
        (true, None) => "Saving...".to_string(),
        (false, _) if question.is_answered() => "Next".to_string(),
        (false, _) if question.question_type.is_media() => "Upload and continue".to_string(),
        (false, _) => "Save and continue".to_string(),
    };
    let stored = question
        .stored_answer
        .as_deref()
        .map(|raw| display_answer(question.question_type, raw));
    let name = format!("choice-{}", question.id);

    rsx! {
        div { class: "question",
            p { class: "section-progress", "{question.position_label()}" }
            div { class: "question__prompt", dangerous_inner_html: "{question.prompt_html}" }

            if let Some(stored) = stored {
                p { class: "section-progress", "You already answered this question." }
                div { class: "answer-readonly", "{stored}" }
            } else {
                match question.question_type {
                    QuestionType::Mcq => rsx! {
                        ul { class: "choices",
                            for choice in question.choices.iter() {
                                ChoiceOption {
                                    key: "{choice}",
                                    choice: choice.clone(),
                                    name: name.clone(),
                                    selected: vm.draft() == choice.as_str(),
                                    disabled: busy,
                                    on_select: on_draft,
                                }
                            }
                        }
                    },
                    QuestionType::ShortAnswer => rsx! {
                        textarea {
                            class: "answer-input",
                            disabled: busy,
                            value: "{vm.draft()}",
                            oninput: move |evt| on_draft.call(evt.value()),
                        }
                    },
                    QuestionType::Audio | QuestionType::Video => rsx! {
                        label { "Path to your recording" }
                        input {
                            class: "media-path",
                            r#type: "text",
                            placeholder: "/path/to/recording",
                            disabled: busy,
                            value: "{vm.media_path()}",
                            oninput: move |evt| on_media_path.call(evt.value()),
                        }
                        if let Some(percent) = upload_percent {
                            progress { class: "upload-progress", max: "100", value: "{percent}" }
                        }
                    },
                }
            }

            if let Some(error) = vm.error() {
                p { class: "field-error", role: "alert", "{error}" }
            }

            div { class: "actions",
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: busy,
                    onclick: move |_| on_next.call(()),
                    "{button_label}"
                }
            }
        }
    }
}

#[component]
fn ChoiceOption(
    choice: String,
    name: String,
    selected: bool,
    disabled: bool,
    on_select: EventHandler<String>,
) -> Element {
    let value = choice.clone();
    rsx! {
        li {
            label {
                input {
                    r#type: "radio",
                    name: "{name}",
                    value: "{choice}",
                    checked: selected,
                    disabled: disabled,
                    onchange: move |_| on_select.call(value.clone()),
                }
                " {choice}"
            }
        }
    }
}

fn follow_step(navigator: Navigator, assessment_id: u64, step: SectionStep) {
    match step {
        SectionStep::Section(section) => {
            let _ = navigator.push(Route::Section {
                assessment_id,
                section,
            });
        }
        SectionStep::Review => {
            let _ = navigator.push(Route::Review { assessment_id });
        }
        SectionStep::NextQuestion | SectionStep::Stay => {}
    }
}

async fn upload_media(
    uploads: UploadSimulator,
    mut vm: Signal<SectionVm>,
    attempt_id: AttemptId,
    question: &QuestionVm,
    path: PathBuf,
) -> Result<MediaUri, String> {
    let file = probe_media(&path).await.map_err(|err| err.to_string())?;
    uploads
        .upload(
            &file,
            question.question_type,
            attempt_id,
            &question.id,
            |progress| vm.write().set_upload_progress(progress),
        )
        .await
        .map_err(|err| err.to_string())
}

/// Validate and store the answer in the attempt. Returns the navigation
/// decision, the question it points at, and the full answer list to mirror
/// to saved progress.
fn record_answer(
    mut slot: Signal<Option<AssessmentService>>,
    question: &QuestionVm,
    payload: AnswerPayload,
) -> Result<(Navigation, Option<QuestionSlot>, Vec<Answer>), String> {
    let mut guard = slot.write();
    let session = guard
        .as_mut()
        .ok_or_else(|| ViewError::Unknown.message().to_string())?;
    let (_, navigation) = AssessmentLoopService::record_local(session, &question.id, payload)
        .map_err(|err| err.to_string())?;
    let next = QuestionSlot::after(session, &question.id);
    Ok((navigation, next, session.store().answers().to_vec()))
}
