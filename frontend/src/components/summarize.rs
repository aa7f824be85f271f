use bareminimum_shared::formatting::truncate_text;
use bareminimum_shared::validation::{DEFAULT_QUIZ_QUESTIONS, MAX_QUIZ_QUESTIONS, MIN_QUIZ_QUESTIONS};
use bareminimum_shared::{
    OutputType, Quiz, QuizQuestion, SourceType, SummarizeOptions, SummarizeResult, Summary,
    SummaryLength, SummaryStyle, WireChoice,
};
use leptos::html;
use leptos::prelude::*;

use crate::api::SummarizeInput;
use crate::state::AppState;

/// Summarize view: source picker, options, and the latest result.
#[component]
pub fn SummarizePanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <main class="summarize-area">
            <SummarizeForm />
            {move || {
                state.summarize.with(|s| s.is_loading()).then(|| {
                    view! { <div class="loading">"Processing…"</div> }
                })
            }}
            {move || {
                state.summarize.with(|s| s.error().map(str::to_string)).map(|err| {
                    view! { <div class="error-banner">{err}</div> }
                })
            }}
            {move || {
                state.summarize.with(|s| s.result().cloned()).map(|result| match result {
                    SummarizeResult::Summary(summary) => view! { <SummaryView summary=summary /> }.into_any(),
                    SummarizeResult::Quiz(quiz) => view! { <QuizView quiz=quiz /> }.into_any(),
                })
            }}
            <RawResponse />
        </main>
    }
}

#[component]
fn SummarizeForm() -> impl IntoView {
    let state = expect_context::<AppState>();

    let source = RwSignal::new(SourceType::Text);
    let text = RwSignal::new(String::new());
    let page_range = RwSignal::new(String::new());
    let video_url = RwSignal::new(String::new());
    let include_timestamps = RwSignal::new(true);
    let file_input: NodeRef<html::Input> = NodeRef::new();

    let output_type = RwSignal::new(OutputType::default().as_str().to_string());
    let summary_length = RwSignal::new(SummaryLength::default().as_str().to_string());
    let summary_style = RwSignal::new(SummaryStyle::default().as_str().to_string());
    let focus_topics = RwSignal::new(String::new());
    let num_questions = RwSignal::new(DEFAULT_QUIZ_QUESTIONS.to_string());
    let (form_error, set_form_error) = signal(None::<String>);

    let submit = move |_| {
        let output = output_type.get_untracked();
        let length = summary_length.get_untracked();
        let style = summary_style.get_untracked();
        let topics = focus_topics.get_untracked();
        let count = num_questions.get_untracked();
        let options = SummarizeOptions::from_fields(|name| match name {
            "output_type" => Some(output.as_str()),
            "summary_length" => Some(length.as_str()),
            "summary_style" => Some(style.as_str()),
            "focus_topics" => Some(topics.as_str()),
            "num_quiz_questions" => Some(count.as_str()),
            _ => None,
        });

        let input = match source.get_untracked() {
            SourceType::Text => Some(SummarizeInput::Text(text.get_untracked())),
            SourceType::Pdf => file_input
                .get_untracked()
                .and_then(|el| el.files())
                .and_then(|files| files.get(0))
                .map(|file| SummarizeInput::Pdf {
                    file,
                    page_range: page_range.get_untracked(),
                }),
            SourceType::Youtube => Some(SummarizeInput::Youtube {
                video_url: video_url.get_untracked(),
                include_timestamps: include_timestamps.get_untracked(),
            }),
        };

        let result = match (input, options) {
            (None, _) => Err("Please upload a valid PDF file.".to_string()),
            (_, Err(e)) => Err(e.message),
            (Some(input), Ok(options)) => {
                state.submit_summary(input, options).map_err(|e| e.message)
            }
        };
        set_form_error.set(result.err());
    };

    let source_tab = move |tab: SourceType, label: &'static str| {
        view! {
            <button
                class="source-tab"
                class:active=move || source.get() == tab
                on:click=move |_| {
                    source.set(tab);
                    set_form_error.set(None);
                }
            >
                {label}
            </button>
        }
    };

    view! {
        <div class="summarize-form">
            <div class="source-tabs">
                {source_tab(SourceType::Text, "Text")}
                {source_tab(SourceType::Pdf, "PDF")}
                {source_tab(SourceType::Youtube, "YouTube")}
            </div>

            {move || match source.get() {
                SourceType::Text => view! {
                    <textarea
                        rows="8"
                        placeholder="Paste the text to summarize"
                        prop:value=text
                        on:input=move |ev| text.set(event_target_value(&ev))
                    />
                }.into_any(),
                SourceType::Pdf => view! {
                    <div class="pdf-fields">
                        <input type="file" accept="application/pdf" node_ref=file_input />
                        <input
                            type="text"
                            placeholder="Pages, e.g. 1-5,10,15-20 (blank for all)"
                            prop:value=page_range
                            on:input=move |ev| page_range.set(event_target_value(&ev))
                        />
                    </div>
                }.into_any(),
                SourceType::Youtube => view! {
                    <div class="youtube-fields">
                        <input
                            type="url"
                            placeholder="https://www.youtube.com/watch?v=…"
                            prop:value=video_url
                            on:input=move |ev| video_url.set(event_target_value(&ev))
                        />
                        <label>
                            <input
                                type="checkbox"
                                prop:checked=include_timestamps
                                on:change=move |ev| include_timestamps.set(event_target_checked(&ev))
                            />
                            "Include timestamps"
                        </label>
                    </div>
                }.into_any(),
            }}

            <div class="options-row">
                {choice_select("Output", choices::<OutputType>(), output_type)}
                {choice_select("Length", choices::<SummaryLength>(), summary_length)}
                {choice_select("Style", choices::<SummaryStyle>(), summary_style)}
            </div>
            <div class="options-row">
                <input
                    type="text"
                    placeholder="Focus topics, comma-separated (optional)"
                    prop:value=focus_topics
                    on:input=move |ev| focus_topics.set(event_target_value(&ev))
                />
                {move || {
                    (output_type.get() == OutputType::Quiz.as_str()).then(|| {
                        view! {
                            <label>
                                "Questions"
                                <input
                                    type="number"
                                    min=MIN_QUIZ_QUESTIONS.to_string()
                                    max=MAX_QUIZ_QUESTIONS.to_string()
                                    prop:value=num_questions
                                    on:input=move |ev| num_questions.set(event_target_value(&ev))
                                />
                            </label>
                        }
                    })
                }}
            </div>

            {move || form_error.get().map(|err| view! { <div class="field-error">{err}</div> })}

            <div class="form-actions">
                <button
                    class="send-btn"
                    on:click=submit
                    disabled=move || state.summarize.with(|s| s.is_loading())
                >
                    {move || if state.summarize.with(|s| s.is_loading()) { "Processing…" } else { "Summarize" }}
                </button>
                <button class="clear-btn" on:click=move |_| state.clear_summary()>
                    "Clear"
                </button>
            </div>
        </div>
    }
}

fn choices<C: WireChoice>() -> Vec<&'static str> {
    C::ALL.iter().map(|c| c.as_str()).collect()
}

fn choice_select(label: &'static str, options: Vec<&'static str>, value: RwSignal<String>) -> impl IntoView {
    view! {
        <label class="choice">
            {label}
            <select
                prop:value=value
                on:change=move |ev| value.set(event_target_value(&ev))
            >
                {options
                    .into_iter()
                    .map(|option| view! { <option value=option>{option.replace('_', " ")}</option> })
                    .collect_view()}
            </select>
        </label>
    }
}

/// Source metadata rows shared by summaries and quizzes.
#[component]
fn SourceDetails(result: SummarizeResult) -> impl IntoView {
    let source_type = result.source_type();
    let fields = result.source_info().display_fields(source_type);

    view! {
        <dl class="source-info">
            <dt>"Source"</dt>
            <dd>{source_type.as_str()}</dd>
            {fields
                .into_iter()
                .map(|(label, value)| {
                    view! {
                        <dt>{label}</dt>
                        <dd>{truncate_text(&value, 80)}</dd>
                    }
                })
                .collect_view()}
        </dl>
    }
}

#[component]
fn SummaryView(summary: Summary) -> impl IntoView {
    let key_points = summary.key_points.clone();
    let sections = summary.sections.clone().unwrap_or_default();
    let paragraphs: Vec<String> = summary
        .summary
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    let generated = summary.timestamp.clone();

    view! {
        <section class="result summary-result">
            <SourceDetails result=SummarizeResult::Summary(summary) />
            <div class="summary-text">
                {paragraphs.into_iter().map(|p| view! { <p>{p}</p> }).collect_view()}
            </div>
            {(!key_points.is_empty()).then(|| view! {
                <h3>"Key points"</h3>
                <ul class="key-points">
                    {key_points.into_iter().map(|k| view! { <li>{k}</li> }).collect_view()}
                </ul>
            })}
            {(!sections.is_empty()).then(|| view! {
                <h3>"Sections"</h3>
                <ul class="sections">
                    {sections
                        .into_iter()
                        .map(|s| view! {
                            <li>
                                <span class="section-time">{s.time}</span>
                                " "
                                <span>{s.text}</span>
                            </li>
                        })
                        .collect_view()}
                </ul>
            })}
            <div class="generated-at">{generated}</div>
        </section>
    }
}

#[component]
fn QuizView(quiz: Quiz) -> impl IntoView {
    let questions = quiz.questions.clone();

    view! {
        <section class="result quiz-result">
            <SourceDetails result=SummarizeResult::Quiz(quiz) />
            {questions
                .into_iter()
                .enumerate()
                .map(|(index, question)| view! { <QuestionCard index=index question=question /> })
                .collect_view()}
        </section>
    }
}

/// One quiz question. The correct answer is revealed once an option is picked.
#[component]
fn QuestionCard(index: usize, question: QuizQuestion) -> impl IntoView {
    let picked = RwSignal::new(None::<usize>);
    let correct = question.correct_answer;
    let explanation = question.explanation.clone();

    view! {
        <div class="quiz-question">
            <h4>{format!("{}. {}", index + 1, question.question)}</h4>
            <ul class="quiz-options">
                {question
                    .options
                    .into_iter()
                    .enumerate()
                    .map(|(i, option)| view! {
                        <li
                            class="quiz-option"
                            class:correct=move || picked.get().is_some() && correct == Some(i)
                            class:incorrect=move || {
                                picked.get() == Some(i) && correct.is_some_and(|c| c != i)
                            }
                            on:click=move |_| picked.set(Some(i))
                        >
                            {option}
                        </li>
                    })
                    .collect_view()}
            </ul>
            {move || {
                picked.get().map(|choice| {
                    let verdict = match correct {
                        Some(answer) if answer == choice => "Correct!",
                        Some(_) => "Not quite.",
                        None => "No answer was provided for this question.",
                    };
                    view! {
                        <div class="quiz-feedback">
                            <strong>{verdict}</strong>
                            {explanation.clone().map(|e| view! { <p>{e}</p> })}
                        </div>
                    }
                })
            }}
        </div>
    }
}

/// Last upstream payload, for diagnosing unrecognized responses.
#[component]
fn RawResponse() -> impl IntoView {
    let state = expect_context::<AppState>();

    move || {
        state
            .summarize
            .with(|s| s.raw_response().map(|raw| serde_json::to_string_pretty(raw).unwrap_or_default()))
            .map(|pretty| {
                view! {
                    <details class="raw-response">
                        <summary>"Raw response"</summary>
                        <pre>{pretty}</pre>
                    </details>
                }
            })
    }
}
